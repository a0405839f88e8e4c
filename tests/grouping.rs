// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

mod helpers;

use helpers::{all_group_keys, make_change_set, single_line_edit};
use untangle::domain::{EdgeKind, Group, IntentLabel, Node, NodeKind, RefGraph};
use untangle::services::grouper::{EngineOptions, GroupEngine};
use untangle::services::similarity::NormalizedLevenshtein;

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn hunk_node(graph: &mut RefGraph, name: &str, hunk_index: &str) -> petgraph::graph::NodeIndex {
    let mut node = Node::new(NodeKind::Function, name.to_string(), 1, 3);
    node.mark_in_hunk(hunk_index.to_string());
    graph.add_node(node)
}

fn options(process_non_source: bool) -> EngineOptions {
    EngineOptions {
        process_non_source_changes: process_non_source,
        ..EngineOptions::default()
    }
}

// ─── Scenarios ───────────────────────────────────────────────────────────────

#[test]
fn singleton_change_forms_one_group() {
    // one private edit, no callers: one node, zero edges, one group
    let change_set = make_change_set(vec![single_line_edit(
        0,
        "src/lib.rs",
        "let x = 1;",
        "let x = 2;",
    )]);
    let (base, current) = (RefGraph::new(), RefGraph::new());

    let mut engine = GroupEngine::new("repo", "repo", options(false));
    let groups = engine.analyze(&change_set, &base, &current, &NormalizedLevenshtein);

    assert_eq!(groups.len(), 1);
    assert_eq!(groups["group0"].diff_hunk_ids, vec!["file-0:hunk-0-0"]);
    assert_eq!(engine.graph_size(), (1, 0));
}

#[test]
fn linked_hunks_group_together() {
    let change_set = make_change_set(vec![
        single_line_edit(0, "src/a.rs", "fn foo() {}", "fn foo(x: i32) {}"),
        single_line_edit(1, "src/b.rs", "foo();", "foo(1);"),
    ]);

    let mut base = RefGraph::new();
    let foo = hunk_node(&mut base, "src/a.rs::foo", "0:0");
    let caller = hunk_node(&mut base, "src/b.rs::bar", "1:0");
    base.add_edge(caller, foo, EdgeKind::Calls);

    let mut engine = GroupEngine::new("repo", "repo", options(false));
    let groups = engine.analyze(&change_set, &base, &RefGraph::new(), &NormalizedLevenshtein);

    assert_eq!(groups.len(), 1, "both hunks belong to one group");
    assert_eq!(
        groups["group0"].diff_hunk_ids,
        vec!["file-0:hunk-0-0", "file-1:hunk-1-0"]
    );
    let (_, edges) = engine.graph_size();
    assert_eq!(edges, 1, "one deduplicated hard edge");
}

#[test]
fn systematic_edit_groups_all_three() {
    let change_set = make_change_set(vec![
        single_line_edit(0, "src/a.rs", "x = 1;", "x = 2;"),
        single_line_edit(1, "src/b.rs", "x = 1;", "x = 2;"),
        single_line_edit(2, "src/c.rs", "x = 1;", "x = 2;"),
    ]);

    let mut engine = GroupEngine::new("repo", "repo", options(false));
    let groups = engine
        .analyze(
            &change_set,
            &RefGraph::new(),
            &RefGraph::new(),
            &NormalizedLevenshtein,
        )
        .clone();

    let (nodes, edges) = engine.graph_size();
    assert_eq!(nodes, 3);
    assert_eq!(edges, 3, "identical snippets form a soft triangle");
    assert_eq!(groups.len(), 1);
    assert_eq!(groups["group0"].diff_hunk_ids.len(), 3);
}

#[test]
fn mixed_change_set_orders_groups_deterministically() {
    // non-source hunk + linked pair + isolated hunk
    let change_set = make_change_set(vec![
        single_line_edit(0, "config.toml", "value = 1", "value = 2"),
        single_line_edit(1, "src/a.rs", "fn foo() {}", "fn foo(x: i32) {}"),
        single_line_edit(2, "src/b.rs", "foo();", "foo(1);"),
        single_line_edit(3, "src/other.rs", "unrelated();", "unrelated(true);"),
    ]);

    let mut base = RefGraph::new();
    let foo = hunk_node(&mut base, "src/a.rs::foo", "1:0");
    let caller = hunk_node(&mut base, "src/b.rs::bar", "2:0");
    base.add_edge(caller, foo, EdgeKind::Calls);

    let mut engine = GroupEngine::new("repo", "repo", options(true));
    let groups = engine.analyze(&change_set, &base, &RefGraph::new(), &NormalizedLevenshtein);

    assert_eq!(groups.len(), 3);
    assert_eq!(groups["group0"].diff_hunk_ids, vec!["file-0:hunk-0-0"]);
    assert_eq!(
        groups["group1"].diff_hunk_ids,
        vec!["file-1:hunk-1-0", "file-2:hunk-2-0"]
    );
    assert_eq!(groups["group2"].diff_hunk_ids, vec!["file-3:hunk-3-0"]);
    assert_eq!(groups["group0"].intent_label, Some(IntentLabel::Config));
}

// ─── Partition law ───────────────────────────────────────────────────────────

#[test]
fn groups_partition_the_hunk_set() {
    let change_set = make_change_set(vec![
        single_line_edit(0, "config.toml", "a = 1", "a = 2"),
        single_line_edit(1, "src/a.rs", "x = 1;", "x = 2;"),
        single_line_edit(2, "src/b.rs", "x = 1;", "x = 2;"),
        single_line_edit(3, "src/c.rs", "different();", "changed();"),
    ]);

    let mut engine = GroupEngine::new("repo", "repo", options(true));
    let groups = engine.analyze(
        &change_set,
        &RefGraph::new(),
        &RefGraph::new(),
        &NormalizedLevenshtein,
    );

    let mut emitted = all_group_keys(groups);
    emitted.sort();
    let mut expected: Vec<String> = change_set
        .diff_files
        .iter()
        .flat_map(|f| f.diff_hunks.iter())
        .map(|h| h.composite_id())
        .collect();
    expected.sort();

    assert_eq!(emitted, expected, "every hunk in exactly one group");
}

#[test]
fn disabled_non_source_processing_omits_those_hunks() {
    let change_set = make_change_set(vec![
        single_line_edit(0, "config.toml", "a = 1", "a = 2"),
        single_line_edit(1, "src/a.rs", "x = 1;", "x = 2;"),
    ]);

    let mut engine = GroupEngine::new("repo", "repo", options(false));
    let groups = engine.analyze(
        &change_set,
        &RefGraph::new(),
        &RefGraph::new(),
        &NormalizedLevenshtein,
    );

    let keys = all_group_keys(groups);
    assert_eq!(keys, vec!["file-1:hunk-1-0"]);
}

#[test]
fn non_source_group_exists_only_with_non_source_hunks() {
    let change_set = make_change_set(vec![single_line_edit(0, "src/a.rs", "x", "y")]);

    let mut engine = GroupEngine::new("repo", "repo", options(true));
    let groups = engine.analyze(
        &change_set,
        &RefGraph::new(),
        &RefGraph::new(),
        &NormalizedLevenshtein,
    );

    assert_eq!(groups.len(), 1);
    assert_eq!(groups["group0"].diff_hunk_ids, vec!["file-0:hunk-0-0"]);
}

// ─── Recoverable failures ────────────────────────────────────────────────────

#[test]
fn unknown_hunk_reference_is_skipped_with_a_diagnostic() {
    let change_set = make_change_set(vec![single_line_edit(0, "src/a.rs", "x", "y")]);

    // a graph node tagged with a hunk key the change model never issued
    let mut base = RefGraph::new();
    let real = hunk_node(&mut base, "src/a.rs::f", "0:0");
    let ghost = hunk_node(&mut base, "src/phantom.rs::g", "9:9");
    base.add_edge(real, ghost, EdgeKind::Calls);

    let mut engine = GroupEngine::new("repo", "repo", options(false));
    let groups = engine.analyze(&change_set, &base, &RefGraph::new(), &NormalizedLevenshtein);

    assert_eq!(all_group_keys(groups), vec!["file-0:hunk-0-0"]);
    assert_eq!(
        engine.diagnostics().len(),
        1,
        "the malformed reference is recorded, not fatal"
    );
}

// ─── Determinism ─────────────────────────────────────────────────────────────

#[test]
fn repeated_runs_serialize_identically() {
    let change_set = make_change_set(vec![
        single_line_edit(0, "config.toml", "a = 1", "a = 2"),
        single_line_edit(1, "src/a.rs", "x = 1;", "x = 2;"),
        single_line_edit(2, "src/b.rs", "x = 1;", "x = 2;"),
        single_line_edit(3, "src/c.rs", "isolated();", "alone();"),
    ]);

    let run = || {
        let mut engine = GroupEngine::new("repo", "repo", options(true));
        let groups = engine.analyze(
            &change_set,
            &RefGraph::new(),
            &RefGraph::new(),
            &NormalizedLevenshtein,
        );
        serde_json::to_string_pretty(groups).unwrap()
    };

    assert_eq!(run(), run(), "identical inputs must yield identical JSON");
}

// ─── Serialization round-trip ────────────────────────────────────────────────

#[test]
fn group_json_round_trips() {
    let change_set = make_change_set(vec![single_line_edit(0, "src/a.rs", "x", "y")]);

    let mut engine = GroupEngine::new("repo-id", "repo-name", options(false));
    let groups = engine.analyze(
        &change_set,
        &RefGraph::new(),
        &RefGraph::new(),
        &NormalizedLevenshtein,
    );

    let group = &groups["group0"];
    let json = serde_json::to_string(group).unwrap();
    assert!(json.contains("\"repoID\""), "camelCase field names expected");
    assert!(json.contains("\"diffHunkIDs\""));

    let back: Group = serde_json::from_str(&json).unwrap();
    assert_eq!(&back, group);
}

// ─── Empty input ─────────────────────────────────────────────────────────────

#[test]
fn empty_change_set_yields_empty_map() {
    let change_set = make_change_set(vec![]);
    let mut engine = GroupEngine::new("repo", "repo", options(true));
    let groups = engine.analyze(
        &change_set,
        &RefGraph::new(),
        &RefGraph::new(),
        &NormalizedLevenshtein,
    );
    assert!(groups.is_empty());
}
