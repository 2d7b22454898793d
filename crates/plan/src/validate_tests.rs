// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

// =============================================================================
// accepted commands
// =============================================================================

#[test]
fn accepts_plain_echo() {
    assert_eq!(validate("echo hello world"), Ok(()));
}

#[test]
fn accepts_quoted_strings() {
    assert_eq!(validate("echo 'hello world'"), Ok(()));
    assert_eq!(validate(r#"echo "hello world""#), Ok(()));
}

#[test]
fn accepts_pwd() {
    assert_eq!(validate("pwd"), Ok(()));
}

// =============================================================================
// structural rejections
// =============================================================================

#[test]
fn rejects_empty_and_whitespace() {
    assert_eq!(validate(""), Err(ValidateError::Empty));
    assert_eq!(validate("   "), Err(ValidateError::Empty));
}

#[test]
fn rejects_unbalanced_quotes() {
    assert_eq!(validate("echo 'oops"), Err(ValidateError::UnbalancedSingle));
    assert_eq!(validate(r#"echo "oops"#), Err(ValidateError::UnbalancedDouble));
}

// =============================================================================
// deny table
// =============================================================================

#[test]
fn rejects_rm_as_whole_word() {
    let err = validate("rm -rf /tmp/x").unwrap_err();
    assert_eq!(err, ValidateError::Disallowed("'rm' command"));
    assert_eq!(err.to_string(), "command contains 'rm' command, which is not allowed");
}

#[test]
fn whole_word_tokens_do_not_match_inside_words() {
    // "formatted" contains "at" but not as a word... it also trips the
    // raw "for" control-structure substring first, so pick words that
    // avoid every substring pattern too.
    assert_eq!(validate("echo harmless"), Ok(()));
    assert_eq!(validate("echo csved"), Ok(()));
}

#[test]
fn rejects_shell_control_operators() {
    assert_eq!(validate("true && echo y").unwrap_err(), ValidateError::Disallowed("AND operator '&&'"));
    assert_eq!(validate("echo x &").unwrap_err(), ValidateError::Disallowed("background execution operator '&'"));
    assert_eq!(validate("echo one; echo two").unwrap_err(), ValidateError::Disallowed("semicolons ';'"));
    assert_eq!(validate("| head").unwrap_err(), ValidateError::Disallowed("command begins or ends with a pipe '|'"));
}

#[test]
fn interior_pipes_are_not_denied() {
    // Only a leading or trailing pipe and '||' are in the table; a plain
    // pipeline passes.
    assert_eq!(validate("echo a | tr a b"), Ok(()));
}

#[test]
fn rejects_redirection() {
    assert_eq!(
        validate("echo x > out").unwrap_err(),
        ValidateError::Disallowed("output redirection '>' or '>>'")
    );
    assert_eq!(
        validate("read x < in").unwrap_err(),
        ValidateError::Disallowed("input redirection '<' or '<<'")
    );
}

#[test]
fn rejects_substitution_and_expansion() {
    assert_eq!(
        validate("echo `id`").unwrap_err(),
        ValidateError::Disallowed("backticks '`'")
    );
    assert_eq!(
        validate("echo $(id)").unwrap_err(),
        ValidateError::Disallowed("command substitution '$(...)'")
    );
    assert_eq!(
        validate("echo ${PATH}").unwrap_err(),
        ValidateError::Disallowed("brace expansion '{}'")
    );
}

#[test]
fn rejects_keywords_as_substrings() {
    // The keyword alternation is a raw substring match, dots included.
    assert_eq!(validate("sudo true").unwrap_err(), ValidateError::Disallowed("disallowed keywords"));
    assert_eq!(validate("echo v1.2").unwrap_err(), ValidateError::Disallowed("disallowed keywords"));
}

#[test]
fn rejects_control_structures_as_substrings() {
    assert_eq!(validate("echo done").unwrap_err(), ValidateError::Disallowed("control structures"));
    assert_eq!(validate("echo elifant").unwrap_err(), ValidateError::Disallowed("control structures"));
}

#[test]
fn first_matching_reason_wins() {
    // Matches both '||' and '&&' territory; the pipe rule sits first.
    let err = validate("| x ||").unwrap_err();
    assert_eq!(err, ValidateError::Disallowed("command begins or ends with a pipe '|'"));
}

#[test]
fn rejects_home_and_backslash() {
    assert_eq!(
        validate("echo ~").unwrap_err(),
        ValidateError::Disallowed("tilde '~' for home directory expansion")
    );
    assert_eq!(
        validate(r"echo a\b").unwrap_err(),
        ValidateError::Disallowed("backslash '\\'")
    );
}

#[test]
fn rejects_parameter_expansion_operators() {
    assert_eq!(
        validate("echo a:-b").unwrap_err(),
        ValidateError::Disallowed("parameter expansion operators")
    );
}
