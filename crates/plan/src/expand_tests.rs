// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::collections::HashMap;

fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

#[test]
fn expands_bare_reference() {
    assert_eq!(expand("hello $NAME", &vars(&[("NAME", "world")])), "hello world");
}

#[test]
fn expands_braced_reference() {
    assert_eq!(expand("hello ${NAME}!", &vars(&[("NAME", "world")])), "hello world!");
}

#[test]
fn unknown_name_keeps_dollar_and_bare_identifier() {
    let empty = HashMap::new();
    assert_eq!(expand("echo $UNDEFINED", &empty), "echo $UNDEFINED");
    // Braces are dropped for unknown names.
    assert_eq!(expand("echo ${UNDEFINED}", &empty), "echo $UNDEFINED");
}

#[test]
fn adjacent_known_and_unknown() {
    assert_eq!(expand("echo $X$Y", &vars(&[("X", "1")])), "echo 1$Y");
}

#[test]
fn identifier_stops_at_non_word_char() {
    assert_eq!(expand("$A/b", &vars(&[("A", "x")])), "x/b");
    assert_eq!(expand("$A-suffix", &vars(&[("A", "x")])), "x-suffix");
}

#[test]
fn braced_name_may_contain_anything_up_to_brace() {
    assert_eq!(expand("${a.b-c}", &vars(&[("a.b-c", "v")])), "v");
}

#[test]
fn dollar_without_identifier_passes_through() {
    let empty = HashMap::new();
    assert_eq!(expand("cost: $ 5", &empty), "cost: $ 5");
    assert_eq!(expand("trailing $", &empty), "trailing $");
}

#[test]
fn no_references_is_identity() {
    let empty = HashMap::new();
    assert_eq!(expand("plain text", &empty), "plain text");
    assert_eq!(expand("", &empty), "");
}

#[test]
fn expansion_is_single_pass() {
    // A value containing a reference is not re-expanded.
    let v = vars(&[("A", "$B"), ("B", "deep")]);
    assert_eq!(expand("$A", &v), "$B");
}
