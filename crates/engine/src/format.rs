// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime string formatting for the `FMT` directive family.

/// Apply a printf-style format to positional string arguments.
///
/// Supported verbs: `%s` and `%v` substitute the next argument verbatim,
/// `%d` re-parses it as an integer, `%%` is a literal percent. A verb
/// with no argument left renders as `%!<verb>(MISSING)`; `%d` over a
/// non-numeric argument renders as `%!d(string=<arg>)`. Unrecognized
/// verbs pass through untouched, and surplus arguments are ignored.
pub fn sprintf(format: &str, args: &[String]) -> String {
    let mut out = String::with_capacity(format.len());
    let mut next = 0usize;
    let mut chars = format.chars();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('%') => out.push('%'),
            Some(verb @ ('s' | 'v')) => match args.get(next) {
                Some(arg) => {
                    out.push_str(arg);
                    next += 1;
                }
                None => out.push_str(&format!("%!{verb}(MISSING)")),
            },
            Some('d') => match args.get(next) {
                Some(arg) => {
                    match arg.parse::<i64>() {
                        Ok(n) => out.push_str(&n.to_string()),
                        Err(_) => out.push_str(&format!("%!d(string={arg})")),
                    }
                    next += 1;
                }
                None => out.push_str("%!d(MISSING)"),
            },
            Some(other) => {
                out.push('%');
                out.push(other);
            }
            None => out.push('%'),
        }
    }
    out
}

#[cfg(test)]
#[path = "format_tests.rs"]
mod tests;
