// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Build variable expansion.

use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Regex for `$name` (shell identifier alphabet) or `${anything}`.
// Allow expect here as the regex is compile-time verified to be valid
#[allow(clippy::expect_used)]
static VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$(?:\{([^}]*)\}|([A-Za-z_][A-Za-z0-9_]*))")
        .expect("constant regex pattern is valid")
});

/// Substitute `$name` and `${name}` references from the vars map.
///
/// Unknown names expand to the literal `$name`: the dollar is preserved
/// and the identifier is left bare (braces dropped), so a plan can pass
/// `$HOME` through to the shell untouched while still expanding its own
/// variables.
pub fn expand(input: &str, vars: &HashMap<String, String>) -> String {
    if !input.contains('$') {
        return input.to_string();
    }
    VAR_PATTERN
        .replace_all(input, |caps: &Captures| {
            let name = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
            match vars.get(name) {
                Some(val) => val.clone(),
                None => format!("${name}"),
            }
        })
        .to_string()
}

#[cfg(test)]
#[path = "expand_tests.rs"]
mod tests;
