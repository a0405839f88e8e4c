// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

use serde::{Deserialize, Serialize};

/// A diff hunk as a vertex of the diff-hunk graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffNode {
    pub unique_index: String,
    pub composite_id: String,
}

impl std::fmt::Display for DiffNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.unique_index)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiffEdgeKind {
    /// Reference-level dependency witnessed by at least one version.
    Hard,
    /// Textual similarity above the configured threshold.
    Soft,
}

/// A link between two distinct hunks, weighted in [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct DiffEdge {
    pub kind: DiffEdgeKind,
    pub weight: f64,
}

impl std::fmt::Display for DiffEdge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            DiffEdgeKind::Hard => write!(f, "hard"),
            DiffEdgeKind::Soft => write!(f, "soft {:.2}", self.weight),
        }
    }
}
