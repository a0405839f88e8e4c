// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

use std::collections::BTreeSet;

use tracing::debug;

use crate::domain::{ChangeSet, RefGraph};
use crate::services::similarity::{estimate_similarity, Similarity};

/// Positional hunk key: (fileIndex, hunkIndex).
pub type HunkKey = (usize, usize);

/// A similarity link between two hunks, normalized so `a < b`.
#[derive(Debug, Clone, PartialEq)]
pub struct SoftLink {
    pub a: HunkKey,
    pub b: HunkKey,
    pub weight: f64,
}

/// Derives the two inter-hunk relations over the built graphs and the
/// change model. Strictly sequential and deterministic.
pub struct HunkLinker<'a> {
    change_set: &'a ChangeSet,
    threshold: f64,
    metric: &'a dyn Similarity,
}

impl<'a> HunkLinker<'a> {
    pub fn new(change_set: &'a ChangeSet, threshold: f64, metric: &'a dyn Similarity) -> Self {
        Self {
            change_set,
            threshold,
            metric,
        }
    }

    /// Hunk pairs whose entities are reachably related in at least one
    /// version. Either version witnessing a path is sufficient: a
    /// rename or move may sever the path on one side.
    pub fn hard_links(&self, base: &RefGraph, current: &RefGraph) -> BTreeSet<(HunkKey, HunkKey)> {
        let mut pairs: BTreeSet<(HunkKey, HunkKey)> = BTreeSet::new();
        pairs.extend(base.connected_hunk_pairs());
        pairs.extend(current.connected_hunk_pairs());
        debug!(count = pairs.len(), "hard links derived");
        pairs
    }

    /// Hunk pairs whose snippets are near-identical on both sides.
    ///
    /// Pairs with mismatched snippet lengths are pruned before any
    /// similarity is computed.
    pub fn soft_links(&self) -> Vec<SoftLink> {
        let hunks = self.change_set.source_hunks();
        let mut links = Vec::new();

        for i in 0..hunks.len() {
            for j in (i + 1)..hunks.len() {
                let (h1, h2) = (hunks[i], hunks[j]);
                if h1.base.code_snippet.len() != h2.base.code_snippet.len()
                    || h1.current.code_snippet.len() != h2.current.code_snippet.len()
                {
                    continue;
                }
                let weight = estimate_similarity(h1, h2, self.metric);
                if weight >= self.threshold {
                    links.push(SoftLink {
                        a: (h1.file_index, h1.index),
                        b: (h2.file_index, h2.index),
                        weight,
                    });
                }
            }
        }

        debug!(count = links.len(), "soft links derived");
        links
    }
}
