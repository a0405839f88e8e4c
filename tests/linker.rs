// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

mod helpers;

use helpers::{make_change_set, make_file, make_hunk, region, single_line_edit};
use untangle::domain::{EdgeKind, Node, NodeKind, RefGraph};
use untangle::services::linker::HunkLinker;
use untangle::services::similarity::NormalizedLevenshtein;

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn hunk_node(graph: &mut RefGraph, name: &str, hunk_index: &str) -> petgraph::graph::NodeIndex {
    let mut node = Node::new(NodeKind::Function, name.to_string(), 1, 3);
    node.mark_in_hunk(hunk_index.to_string());
    graph.add_node(node)
}

// ─── Hard links ──────────────────────────────────────────────────────────────

#[test]
fn call_edge_links_def_and_use() {
    // foo() signature edit in file 0, call site edit in file 1
    let mut base = RefGraph::new();
    let foo = hunk_node(&mut base, "src/a.rs::foo", "0:0");
    let bar = hunk_node(&mut base, "src/b.rs::bar", "1:0");
    base.add_edge(bar, foo, EdgeKind::Calls);

    let mut current = RefGraph::new();
    let foo = hunk_node(&mut current, "src/a.rs::foo", "0:0");
    let bar = hunk_node(&mut current, "src/b.rs::bar", "1:0");
    current.add_edge(bar, foo, EdgeKind::Calls);

    let change_set = make_change_set(vec![
        single_line_edit(0, "src/a.rs", "fn foo() {}", "fn foo(x: i32) {}"),
        single_line_edit(1, "src/b.rs", "foo();", "foo(1);"),
    ]);
    let linker = HunkLinker::new(&change_set, 0.618, &NormalizedLevenshtein);
    let pairs = linker.hard_links(&base, &current);

    assert_eq!(pairs.len(), 1, "expected exactly one hard link");
    assert!(pairs.contains(&((0, 0), (1, 0))));
}

#[test]
fn one_version_witnessing_the_path_is_sufficient() {
    // a rename severs the reference in the current version
    let mut base = RefGraph::new();
    let old_name = hunk_node(&mut base, "src/a.rs::old_name", "0:0");
    let caller = hunk_node(&mut base, "src/b.rs::caller", "1:0");
    base.add_edge(caller, old_name, EdgeKind::Calls);

    let mut current = RefGraph::new();
    hunk_node(&mut current, "src/a.rs::new_name", "0:0");
    hunk_node(&mut current, "src/b.rs::caller", "1:0");

    let change_set = make_change_set(vec![
        single_line_edit(0, "src/a.rs", "fn old_name() {}", "fn new_name() {}"),
        single_line_edit(1, "src/b.rs", "old_name();", "new_name();"),
    ]);
    let linker = HunkLinker::new(&change_set, 0.618, &NormalizedLevenshtein);
    let pairs = linker.hard_links(&base, &current);

    assert!(
        pairs.contains(&((0, 0), (1, 0))),
        "base-only path should still produce a hard link"
    );
}

#[test]
fn hard_links_are_independent_of_edge_direction_and_order() {
    let change_set = make_change_set(vec![
        single_line_edit(0, "src/a.rs", "fn a() {}", "fn a(x: u8) {}"),
        single_line_edit(1, "src/b.rs", "a();", "a(0);"),
        single_line_edit(2, "src/c.rs", "b();", "b(0);"),
    ]);
    let linker = HunkLinker::new(&change_set, 0.618, &NormalizedLevenshtein);

    let mut forward = RefGraph::new();
    let a = hunk_node(&mut forward, "a", "0:0");
    let b = hunk_node(&mut forward, "b", "1:0");
    let c = hunk_node(&mut forward, "c", "2:0");
    forward.add_edge(a, b, EdgeKind::Calls);
    forward.add_edge(b, c, EdgeKind::Reads);

    // reversed insertion order and flipped directions
    let mut reversed = RefGraph::new();
    let c = hunk_node(&mut reversed, "c", "2:0");
    let b = hunk_node(&mut reversed, "b", "1:0");
    let a = hunk_node(&mut reversed, "a", "0:0");
    reversed.add_edge(c, b, EdgeKind::Reads);
    reversed.add_edge(b, a, EdgeKind::Calls);

    let empty = RefGraph::new();
    let from_forward = linker.hard_links(&forward, &empty);
    let from_reversed = linker.hard_links(&reversed, &empty);

    assert_eq!(from_forward, from_reversed);
}

#[test]
fn nodes_in_the_same_hunk_produce_no_link() {
    let mut base = RefGraph::new();
    let first = hunk_node(&mut base, "src/a.rs::f", "0:0");
    let second = hunk_node(&mut base, "src/a.rs::g", "0:0");
    base.add_edge(first, second, EdgeKind::Calls);

    let change_set = make_change_set(vec![single_line_edit(0, "src/a.rs", "x", "y")]);
    let linker = HunkLinker::new(&change_set, 0.618, &NormalizedLevenshtein);
    let pairs = linker.hard_links(&base, &RefGraph::new());

    assert!(pairs.is_empty(), "same-hunk nodes must not self-link");
}

// ─── Soft links ──────────────────────────────────────────────────────────────

#[test]
fn systematic_edit_forms_a_triangle() {
    // the same one-line replacement in three files
    let change_set = make_change_set(vec![
        single_line_edit(0, "src/a.rs", "x = 1;", "x = 2;"),
        single_line_edit(1, "src/b.rs", "x = 1;", "x = 2;"),
        single_line_edit(2, "src/c.rs", "x = 1;", "x = 2;"),
    ]);
    let linker = HunkLinker::new(&change_set, 0.618, &NormalizedLevenshtein);
    let links = linker.soft_links();

    assert_eq!(links.len(), 3, "three identical hunks should pairwise link");
    for link in &links {
        assert_eq!(link.weight, 1.0);
    }
}

#[test]
fn mismatched_snippet_lengths_are_pruned() {
    // identical text, but file 1's current side carries an extra line;
    // no similarity may be computed for any pair
    let h0 = make_hunk(
        0,
        0,
        region("src/a.rs", 1, &["x = 1;"]),
        region("src/a.rs", 1, &["x = 2;"]),
    );
    let h1 = make_hunk(
        1,
        0,
        region("src/b.rs", 1, &["x = 1;"]),
        region("src/b.rs", 1, &["x = 2;", "y = 2;"]),
    );
    let change_set = make_change_set(vec![
        make_file(0, "src/a.rs", vec![h0]),
        make_file(1, "src/b.rs", vec![h1]),
    ]);

    let linker = HunkLinker::new(&change_set, 0.0, &NormalizedLevenshtein);
    assert!(
        linker.soft_links().is_empty(),
        "length mismatch must prune the pair regardless of content or threshold"
    );
}

#[test]
fn below_threshold_pairs_are_dropped() {
    let change_set = make_change_set(vec![
        single_line_edit(0, "src/a.rs", "aaaaaaaa", "bbbbbbbb"),
        single_line_edit(1, "src/b.rs", "cccccccc", "dddddddd"),
    ]);
    let linker = HunkLinker::new(&change_set, 0.618, &NormalizedLevenshtein);
    assert!(linker.soft_links().is_empty());
}

#[test]
fn non_source_hunks_are_bypassed() {
    let change_set = make_change_set(vec![
        single_line_edit(0, "config.toml", "value = 1", "value = 2"),
        single_line_edit(1, "settings.toml", "value = 1", "value = 2"),
    ]);
    let linker = HunkLinker::new(&change_set, 0.618, &NormalizedLevenshtein);
    assert!(
        linker.soft_links().is_empty(),
        "non-source hunks never enter the similarity pass"
    );
}
