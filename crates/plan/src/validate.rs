// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Safe-command validation for shell-executing directives.
//!
//! Deny-by-enumeration: a command is rejected when it is empty, has
//! unbalanced quotes, or matches any pattern in the deny table. The
//! table is a guardrail against shell control constructs and obviously
//! destructive commands, not an isolation boundary; real isolation is
//! the container path (`BOX`/`USE`).

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// Errors from command validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidateError {
    #[error("empty command")]
    Empty,
    #[error("unmatched single quotes in command")]
    UnbalancedSingle,
    #[error("unmatched double quotes in command")]
    UnbalancedDouble,
    #[error("command contains {0}, which is not allowed")]
    Disallowed(&'static str),
}

/// Deny table source: pattern → human-readable rejection reason.
///
/// Checked in order; the first match wins. The keyword and control-flow
/// alternations are deliberately raw substring matches, while command
/// names are anchored as whole words.
const DENY_TABLE: &[(&str, &str)] = &[
    (r"^\||\|$", "command begins or ends with a pipe '|'"),
    (r"\|\|", "OR operator '||'"),
    ("&&", "AND operator '&&'"),
    ("`", "backticks '`'"),
    ("#", "comments '#'"),
    (";", "semicolons ';'"),
    (">|>>", "output redirection '>' or '>>'"),
    ("<|<<", "input redirection '<' or '<<'"),
    ("&", "background execution operator '&'"),
    (r"\$\(|\)", "command substitution '$(...)'"),
    (r"\{|\}", "brace expansion '{}'"),
    (r"\[\[|\]\]", "conditional expression '[[...]]'"),
    (r"export|source|\.|sudo|eval|exec|alias|function", "disallowed keywords"),
    (r"if|then|else|fi|for|while|do|done|case|esac", "control structures"),
    ("~", "tilde '~' for home directory expansion"),
    (r"\\", "backslash '\\'"),
    (r"\$\{.*\}", "variable expansion '${...}'"),
    (r"\(\(.*\)\)", "arithmetic expansion '(())'"),
    (r":[p]?[:=?+.-]", "parameter expansion operators"),
    (r"\btime\b", "'time' command prefix"),
    (r"\bnohup\b", "'nohup' command prefix"),
    (r"\bxargs\b", "'xargs' command"),
    (r"\benv\b", "'env' command"),
    (r"\bnice\b", "'nice' command prefix"),
    (r"\btrap\b", "'trap' command"),
    (r"\bcommand\b", "'command' built-in"),
    (r"\bset\b", "'set' built-in"),
    (r"\bunset\b", "'unset' built-in"),
    (r"\bwait\b", "'wait' built-in"),
    (r"\bkill\b", "'kill' command"),
    (r"\bcron\b", "cron-related commands"),
    (r"\bat\b", "'at' command"),
    (r"\bchmod\b", "'chmod' command"),
    (r"\bchown\b", "'chown' command"),
    (r"\bchgrp\b", "'chgrp' command"),
    (r"\bmkdir\b", "'mkdir' command"),
    (r"\brm\b", "'rm' command"),
    (r"\bmv\b", "'mv' command"),
    (r"\bcp\b", "'cp' command"),
    (r"\bln\b", "'ln' command"),
    (r"\btouch\b", "'touch' command"),
    (r"\bdd\b", "'dd' command"),
    (r"\bfind\b", "'find' command"),
    (r"\bgrep\b", "'grep' command"),
    (r"\bsed\b", "'sed' command"),
    (r"\bawk\b", "'awk' command"),
    (r"\bperl\b", "'perl' command"),
    (r"\bpython\b", "'python' command"),
    (r"\bruby\b", "'ruby' command"),
    (r"\bcurl\b", "'curl' command"),
    (r"\bwget\b", "'wget' command"),
    (r"\bnc\b", "'nc' (netcat) command"),
    (r"\bnetstat\b", "'netstat' command"),
    (r"\bss\b", "'ss' command"),
    (r"\biptables\b", "'iptables' command"),
    (r"\bufw\b", "'ufw' command"),
    (r"\bsystemctl\b", "'systemctl' command"),
    (r"\bservice\b", "'service' command"),
    (r"\bjournalctl\b", "'journalctl' command"),
    (r"\blogin\b", "'login' command"),
    (r"\bsu\b", "'su' command"),
    (r"\bpasswd\b", "'passwd' command"),
    (r"\buseradd\b", "'useradd' command"),
    (r"\buserdel\b", "'userdel' command"),
    (r"\bmodprobe\b", "'modprobe' command"),
    (r"\binsmod\b", "'insmod' command"),
    (r"\brmmod\b", "'rmmod' command"),
    (r"\bdmesg\b", "'dmesg' command"),
    (r"\bbase64\b", "'base64' command"),
];

// Allow expect here as every pattern is compile-time verified to be valid
#[allow(clippy::expect_used)]
static DENY_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    DENY_TABLE
        .iter()
        .map(|(pattern, reason)| {
            (Regex::new(pattern).expect("constant deny pattern is valid"), *reason)
        })
        .collect()
});

/// Validate a shell command string against the deny policy.
///
/// Returns the first matching rejection reason.
pub fn validate(command: &str) -> Result<(), ValidateError> {
    let command = command.trim();
    if command.is_empty() {
        return Err(ValidateError::Empty);
    }
    if command.matches('\'').count() % 2 != 0 {
        return Err(ValidateError::UnbalancedSingle);
    }
    if command.matches('"').count() % 2 != 0 {
        return Err(ValidateError::UnbalancedDouble);
    }
    for (pattern, reason) in DENY_PATTERNS.iter() {
        if pattern.is_match(command) {
            return Err(ValidateError::Disallowed(reason));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;
