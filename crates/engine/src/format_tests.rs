// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

#[test]
fn substitutes_strings_in_order() {
    assert_eq!(sprintf("%s-%s", &args(&["a", "b"])), "a-b");
}

#[test]
fn v_verb_is_verbatim() {
    assert_eq!(sprintf("%v!", &args(&["x"])), "x!");
}

#[test]
fn d_verb_parses_integers() {
    assert_eq!(sprintf("n=%d", &args(&["42"])), "n=42");
    assert_eq!(sprintf("n=%d", &args(&["-7"])), "n=-7");
}

#[test]
fn d_verb_non_numeric_reports_type() {
    assert_eq!(sprintf("%d", &args(&["abc"])), "%!d(string=abc)");
}

#[test]
fn percent_escape() {
    assert_eq!(sprintf("100%%", &args(&[])), "100%");
}

#[test]
fn missing_argument_is_marked() {
    assert_eq!(sprintf("%s and %s", &args(&["only"])), "only and %!s(MISSING)");
}

#[test]
fn surplus_arguments_are_ignored() {
    assert_eq!(sprintf("%s", &args(&["a", "b", "c"])), "a");
}

#[test]
fn unknown_verbs_pass_through() {
    assert_eq!(sprintf("%q %s", &args(&["x"])), "%q x");
}

#[test]
fn trailing_percent_is_literal() {
    assert_eq!(sprintf("50%", &args(&[])), "50%");
}
