// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

use std::collections::BTreeMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::unionfind::UnionFind;
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};

/// Kind of program entity a reference-graph node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    File,
    Function,
    Method,
    Struct,
    Enum,
    Trait,
    Interface,
    Class,
    Const,
    TypeAlias,
}

/// Relationship between two program entities.
///
/// Structural edges express containment/declaration; non-structural
/// edges express use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    Declares,
    Contains,
    Extends,
    Implements,
    Calls,
    Reads,
    Writes,
    ReferencesType,
    OverridesTarget,
}

impl EdgeKind {
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::Declares | Self::Contains | Self::Extends | Self::Implements
        )
    }
}

/// A program entity in one version of the working set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub kind: NodeKind,
    pub qualified_name: String,
    pub start_line: usize,
    pub end_line: usize,
    /// True iff the entity's source range overlaps some diff hunk.
    pub in_diff_hunk: bool,
    /// `"<fileIndex>:<hunkIndex>"` of the first overlapping hunk.
    pub hunk_index: Option<String>,
}

impl Node {
    pub fn new(kind: NodeKind, qualified_name: String, start_line: usize, end_line: usize) -> Self {
        Self {
            kind,
            qualified_name,
            start_line,
            end_line,
            in_diff_hunk: false,
            hunk_index: None,
        }
    }

    pub fn mark_in_hunk(&mut self, hunk_index: String) {
        self.in_diff_hunk = true;
        self.hunk_index = Some(hunk_index);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub kind: EdgeKind,
}

/// Directed typed graph of program entities for one version.
///
/// Node ids are assigned in insertion order, so identical inputs produce
/// identical graphs. Edges hold node indices, never references.
#[derive(Debug, Default)]
pub struct RefGraph {
    graph: DiGraph<Node, Edge>,
}

impl RefGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: Node) -> NodeIndex {
        self.graph.add_node(node)
    }

    pub fn add_edge(&mut self, from: NodeIndex, to: NodeIndex, kind: EdgeKind) {
        self.graph.add_edge(from, to, Edge { kind });
    }

    pub fn node(&self, index: NodeIndex) -> &Node {
        &self.graph[index]
    }

    pub fn node_mut(&mut self, index: NodeIndex) -> &mut Node {
        &mut self.graph[index]
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Node indices in id order.
    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    /// Hunk-tagged nodes, in id order.
    pub fn hunk_nodes(&self) -> Vec<NodeIndex> {
        self.graph
            .node_indices()
            .filter(|&i| self.graph[i].in_diff_hunk)
            .collect()
    }

    /// Pairs of distinct hunk indices whose entities are connected by an
    /// undirected path in this graph.
    ///
    /// Connectivity is computed once with a union-find seeded by every
    /// edge, visiting vertices in id order; pairs come out normalized to
    /// ascending (fileIndex, hunkIndex) order.
    pub fn connected_hunk_pairs(&self) -> Vec<((usize, usize), (usize, usize))> {
        let mut components: UnionFind<usize> = UnionFind::new(self.graph.node_count());
        for edge in self.graph.edge_references() {
            components.union(edge.source().index(), edge.target().index());
        }

        // component root -> distinct hunk keys, kept sorted
        let mut hunks_by_root: BTreeMap<usize, Vec<(usize, usize)>> = BTreeMap::new();
        for index in self.hunk_nodes() {
            let node = &self.graph[index];
            let Some(key) = node
                .hunk_index
                .as_deref()
                .and_then(super::change::parse_unique_index)
            else {
                continue;
            };
            let root = components.find(index.index());
            let entry = hunks_by_root.entry(root).or_default();
            if !entry.contains(&key) {
                entry.push(key);
            }
        }

        let mut pairs = Vec::new();
        for keys in hunks_by_root.values_mut() {
            keys.sort_unstable();
            for i in 0..keys.len() {
                for j in (i + 1)..keys.len() {
                    pairs.push((keys[i], keys[j]));
                }
            }
        }
        pairs
    }
}
