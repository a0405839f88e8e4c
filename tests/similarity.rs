// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

mod helpers;

use helpers::{make_hunk, region};
use untangle::services::similarity::{estimate_similarity, NormalizedLevenshtein, Similarity};

// ─── Metric contract ─────────────────────────────────────────────────────────

#[test]
fn identical_inputs_score_one() {
    let metric = NormalizedLevenshtein;
    assert_eq!(metric.score("let x = compute();", "let x = compute();"), 1.0);
}

#[test]
fn disjoint_inputs_score_zero() {
    let metric = NormalizedLevenshtein;
    assert_eq!(metric.score("aaaaaa", "zzzzzz"), 0.0);
}

#[test]
fn metric_is_symmetric() {
    let metric = NormalizedLevenshtein;
    let forward = metric.score("x = 1;", "x = 2;");
    let backward = metric.score("x = 2;", "x = 1;");
    assert_eq!(forward, backward, "similarity must not depend on argument order");
}

#[test]
fn empty_pair_scores_one() {
    assert_eq!(NormalizedLevenshtein.score("", ""), 1.0);
}

#[test]
fn single_edit_scales_by_length() {
    let score = NormalizedLevenshtein.score("x = 1;", "x = 2;");
    assert!((score - (1.0 - 1.0 / 6.0)).abs() < 1e-9);
}

#[test]
fn metric_stays_in_unit_range() {
    let metric = NormalizedLevenshtein;
    for (a, b) in [
        ("", ""),
        ("short", "a much longer line of code"),
        ("fn main() {}", "fn main() { run(); }"),
    ] {
        let score = metric.score(a, b);
        assert!((0.0..=1.0).contains(&score), "score {score} out of range for {a:?} vs {b:?}");
    }
}

// ─── Hunk-level estimation ───────────────────────────────────────────────────

#[test]
fn hunk_self_similarity_is_one() {
    let hunk = make_hunk(
        0,
        0,
        region("src/a.rs", 3, &["x = 1;"]),
        region("src/a.rs", 3, &["x = 2;"]),
    );
    let score = estimate_similarity(&hunk, &hunk, &NormalizedLevenshtein);
    assert_eq!(score, 1.0);
}

#[test]
fn estimate_averages_both_sides_and_rounds() {
    // base sides identical (1.0), current sides disjoint (0.0) -> 0.5
    let h1 = make_hunk(
        0,
        0,
        region("src/a.rs", 1, &["same line"]),
        region("src/a.rs", 1, &["aaaa"]),
    );
    let h2 = make_hunk(
        1,
        0,
        region("src/b.rs", 1, &["same line"]),
        region("src/b.rs", 1, &["zzzz"]),
    );
    let score = estimate_similarity(&h1, &h2, &NormalizedLevenshtein);
    assert_eq!(score, 0.5);
}

#[test]
fn estimate_is_rounded_to_two_decimals() {
    let h1 = make_hunk(
        0,
        0,
        region("src/a.rs", 1, &["abcdef"]),
        region("src/a.rs", 1, &["abcdef"]),
    );
    let h2 = make_hunk(
        1,
        0,
        region("src/b.rs", 1, &["abcdxx"]),
        region("src/b.rs", 1, &["abcdef"]),
    );
    // base: 1 - 2/6 = 0.666..; current: 1.0; mean = 0.8333.. -> 0.83
    let score = estimate_similarity(&h1, &h2, &NormalizedLevenshtein);
    assert_eq!(score, 0.83);
}
