// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use petgraph::graph::NodeIndex;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::domain::{DiffFile, EdgeKind, FileType, Node, NodeKind, RefGraph, Version};
use crate::error::{EngineDiagnostic, Error, Result};
use crate::services::parser::{self, ParsedFile};

/// One version's reference graph plus the recoverable failures hit
/// while building it.
#[derive(Debug, Default)]
pub struct BuildOutcome {
    pub graph: RefGraph,
    pub diagnostics: Vec<EngineDiagnostic>,
}

/// Build the reference graph for one snapshot directory.
///
/// Files are processed in fileIndex order; a file that cannot be read
/// or parsed contributes no nodes and a diagnostic. An empty graph is a
/// valid outcome. The cancellation token is checked between files; a
/// cancelled build returns without publishing a partial graph.
pub fn build_reference_graph(
    snapshot_dir: &Path,
    diff_files: &[DiffFile],
    version: Version,
    cancel: &CancellationToken,
) -> Result<BuildOutcome> {
    let mut outcome = BuildOutcome::default();
    let mut parsed: Vec<(&DiffFile, ParsedFile)> = Vec::new();

    for file in diff_files {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let FileType::Source(language) = file.file_type else {
            continue;
        };

        let path = snapshot_dir.join(&file.relative_path);
        if !path.exists() {
            // added files have no base snapshot, deleted ones no current
            continue;
        }
        let source = match fs::read_to_string(&path) {
            Ok(source) => source,
            Err(e) => {
                outcome.diagnostics.push(EngineDiagnostic::ParseFailure {
                    path: file.relative_path.clone(),
                    detail: e.to_string(),
                });
                continue;
            }
        };

        match parser::parse_source(&file.relative_path, &source, language) {
            Some(result) => parsed.push((file, result)),
            None => outcome.diagnostics.push(EngineDiagnostic::ParseFailure {
                path: file.relative_path.clone(),
                detail: "parser produced no syntax tree".into(),
            }),
        }
    }

    if cancel.is_cancelled() {
        return Err(Error::Cancelled);
    }

    // pass 1: nodes and structural edges, plus the cross-file
    // declaration table for name resolution
    let mut decls_by_name: BTreeMap<String, Vec<NodeIndex>> = BTreeMap::new();
    let mut indices: Vec<(NodeIndex, Vec<NodeIndex>)> = Vec::with_capacity(parsed.len());

    for (file, result) in &parsed {
        let line_count = file.content(version).lines().count().max(1);
        let mut file_node = Node::new(NodeKind::File, result.relative_path.clone(), 1, line_count);
        project_onto_hunks(&mut file_node, file, version);
        let file_node_index = outcome.graph.add_node(file_node);

        let mut decl_indices = Vec::with_capacity(result.declarations.len());
        for decl in &result.declarations {
            let mut node = Node::new(
                decl.kind,
                decl.qualified_name.clone(),
                decl.start_line,
                decl.end_line,
            );
            project_onto_hunks(&mut node, file, version);
            let index = outcome.graph.add_node(node);
            decls_by_name
                .entry(decl.name.clone())
                .or_default()
                .push(index);
            decl_indices.push(index);
        }

        for (i, decl) in result.declarations.iter().enumerate() {
            match decl.parent {
                Some(parent) => {
                    outcome
                        .graph
                        .add_edge(decl_indices[parent], decl_indices[i], EdgeKind::Contains)
                }
                None => outcome
                    .graph
                    .add_edge(file_node_index, decl_indices[i], EdgeKind::Declares),
            }
        }

        indices.push((file_node_index, decl_indices));
    }

    // pass 2: name-resolved reference edges, deduplicated per
    // (source, target, kind)
    let mut seen: HashSet<(NodeIndex, NodeIndex, EdgeKind)> = HashSet::new();
    for ((_, result), (file_node_index, decl_indices)) in parsed.iter().zip(&indices) {
        for reference in &result.references {
            let from = reference
                .origin
                .map(|i| decl_indices[i])
                .unwrap_or(*file_node_index);
            let Some(targets) = decls_by_name.get(&reference.name) else {
                continue;
            };
            for &to in targets {
                if to == from {
                    continue;
                }
                if seen.insert((from, to, reference.kind)) {
                    outcome.graph.add_edge(from, to, reference.kind);
                }
            }
        }
    }

    debug!(
        nodes = outcome.graph.node_count(),
        edges = outcome.graph.edge_count(),
        failures = outcome.diagnostics.len(),
        "reference graph built"
    );

    Ok(outcome)
}

/// Mark the node when its source range overlaps a hunk of its file in
/// this version; the first overlapping hunk in index order wins.
fn project_onto_hunks(node: &mut Node, file: &DiffFile, version: Version) {
    for hunk in &file.diff_hunks {
        if hunk
            .region(version)
            .overlaps(node.start_line, node.end_line)
        {
            node.mark_in_hunk(hunk.unique_index());
            return;
        }
    }
}
