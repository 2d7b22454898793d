// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn scope() -> BuildScope {
    BuildScope::new(&BuildId::new("build-1"), &WorkerId::from_index(0), PathBuf::from("/work"))
}

#[test]
fn seeds_identity_vars() {
    let scope = scope();
    assert_eq!(scope.var("BUILD_ID").as_deref(), Some("build-1"));
    assert_eq!(scope.var("WORKER_NODE").as_deref(), Some("worker-0"));
}

#[test]
fn expand_reads_vars() {
    let scope = scope();
    scope.set_var("NAME", "world");
    assert_eq!(scope.expand("hello $NAME"), "hello world");
    assert_eq!(scope.expand("id=$BUILD_ID"), "id=build-1");
}

#[test]
fn env_snapshot_is_isolated() {
    let scope = scope();
    scope.set_env("K", "1");
    let mut snap = scope.env_snapshot();
    snap.insert("K".to_string(), "2".to_string());
    assert_eq!(scope.env_snapshot().get("K").map(String::as_str), Some("1"));
}

#[test]
fn resolve_joins_relative_paths_against_cwd() {
    let scope = scope();
    assert_eq!(scope.resolve("a/b"), PathBuf::from("/work/a/b"));
    assert_eq!(scope.resolve("./a"), PathBuf::from("/work/a"));
    assert_eq!(scope.resolve("/abs/x"), PathBuf::from("/abs/x"));
}

#[test]
fn resolve_tracks_cwd_changes() {
    let scope = scope();
    scope.set_cwd(PathBuf::from("/work/a"));
    assert_eq!(scope.resolve("b"), PathBuf::from("/work/a/b"));
}

#[test]
fn box_registry_roundtrip() {
    let scope = scope();
    assert!(scope.box_image("alpine").is_none());
    scope.register_box("alpine", BoxImage { repo: "alpine".into(), tag: "3".into() });
    let image = scope.box_image("alpine").unwrap();
    assert_eq!(image.reference(), "alpine:3");
}

#[test]
fn container_cell_caches_per_box() {
    let scope = scope();
    assert!(scope.container_id("alpine").is_none());
    scope.set_container_id("alpine", "abc123");
    assert_eq!(scope.container_id("alpine").as_deref(), Some("abc123"));
    assert!(scope.container_id("other").is_none());
}

// =============================================================================
// clean_path
// =============================================================================

#[test]
fn clean_path_drops_cur_dir() {
    assert_eq!(clean_path(Path::new("./a/./b")), PathBuf::from("a/b"));
}

#[test]
fn clean_path_folds_parent_dirs() {
    assert_eq!(clean_path(Path::new("a/b/../c")), PathBuf::from("a/c"));
    assert_eq!(clean_path(Path::new("/a/../b")), PathBuf::from("/b"));
}

#[test]
fn clean_path_keeps_leading_parents() {
    assert_eq!(clean_path(Path::new("../x")), PathBuf::from("../x"));
    assert_eq!(clean_path(Path::new("../../x")), PathBuf::from("../../x"));
}

#[test]
fn clean_path_root_stays_root() {
    assert_eq!(clean_path(Path::new("/..")), PathBuf::from("/"));
    assert_eq!(clean_path(Path::new("/")), PathBuf::from("/"));
}

#[test]
fn clean_path_empty_becomes_dot() {
    assert_eq!(clean_path(Path::new("")), PathBuf::from("."));
    assert_eq!(clean_path(Path::new("a/..")), PathBuf::from("."));
}
