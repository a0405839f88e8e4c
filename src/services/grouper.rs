// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use petgraph::dot::Dot;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::unionfind::UnionFind;
use petgraph::visit::EdgeRef;
use tracing::{debug, info};

use crate::domain::{
    parse_composite_id, parse_unique_index, ChangeSet, DiffEdge, DiffEdgeKind, DiffFile, DiffHunk,
    DiffNode, Group, IntentLabel, RefGraph,
};
use crate::error::{EngineDiagnostic, Result};
use crate::services::linker::{HunkKey, HunkLinker};
use crate::services::similarity::Similarity;

/// Engine tuning knobs. `distance_threshold` and `detect_refactorings`
/// are accepted and validated but currently have no effect.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub similarity_threshold: f64,
    pub distance_threshold: u8,
    pub detect_refactorings: bool,
    pub process_non_source_changes: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.618,
            distance_threshold: 0,
            detect_refactorings: false,
            process_non_source_changes: false,
        }
    }
}

/// One-call analysis surface over materialized snapshots: build both
/// reference graphs under the deadline, then link and group.
///
/// Returns the group map plus all recoverable diagnostics from the
/// builders and the engine.
pub async fn analyze(
    repo_id: &str,
    repo_name: &str,
    options: EngineOptions,
    deadline_secs: u64,
    change_set: &ChangeSet,
    base_dir: &Path,
    current_dir: &Path,
) -> Result<(BTreeMap<String, Group>, Vec<EngineDiagnostic>)> {
    let orchestrator = crate::services::orchestrator::Orchestrator::new(deadline_secs);
    let (base, current) = orchestrator
        .build_snapshots(base_dir, current_dir, &change_set.diff_files)
        .await?;

    let mut engine = GroupEngine::new(repo_id, repo_name, options);
    engine.analyze(
        change_set,
        &base.graph,
        &current.graph,
        &crate::services::similarity::NormalizedLevenshtein,
    );

    let mut diagnostics = base.diagnostics;
    diagnostics.extend(current.diagnostics);
    diagnostics.extend(engine.diagnostics().to_vec());
    Ok((engine.groups().clone(), diagnostics))
}

/// Owns the diff-hunk graph and partitions hunks into groups via
/// connected components. All per-run state lives on the engine value;
/// nothing survives across runs.
pub struct GroupEngine {
    repo_id: String,
    repo_name: String,
    options: EngineOptions,
    graph: DiGraph<DiffNode, DiffEdge>,
    node_by_key: BTreeMap<HunkKey, NodeIndex>,
    groups: BTreeMap<String, Group>,
    diagnostics: Vec<EngineDiagnostic>,
}

impl GroupEngine {
    pub fn new(repo_id: &str, repo_name: &str, options: EngineOptions) -> Self {
        Self {
            repo_id: repo_id.to_string(),
            repo_name: repo_name.to_string(),
            options,
            graph: DiGraph::new(),
            node_by_key: BTreeMap::new(),
            groups: BTreeMap::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Partition the change set into groups using the two reference
    /// graphs. Every input hunk lands in exactly one group (non-source
    /// hunks only when enabled).
    pub fn analyze(
        &mut self,
        change_set: &ChangeSet,
        base: &RefGraph,
        current: &RefGraph,
        metric: &dyn Similarity,
    ) -> &BTreeMap<String, Group> {
        if change_set.is_empty() {
            info!("nothing to commit, working tree clean");
            return &self.groups;
        }
        if change_set.hunk_count() == 0 {
            info!("changes exist, but not in file contents");
            return &self.groups;
        }
        if self.options.distance_threshold > 0 || self.options.detect_refactorings {
            debug!(
                distance_threshold = self.options.distance_threshold,
                detect_refactorings = self.options.detect_refactorings,
                "reserved options set; no effect in this release"
            );
        }

        self.reserve_non_source_group(change_set);

        for hunk in change_set.source_hunks() {
            let node = DiffNode {
                unique_index: hunk.unique_index(),
                composite_id: hunk.composite_id(),
            };
            let index = self.graph.add_node(node);
            self.node_by_key.insert((hunk.file_index, hunk.index), index);
        }

        let linker = HunkLinker::new(change_set, self.options.similarity_threshold, metric);
        for (a, b) in linker.hard_links(base, current) {
            self.add_link(a, b, DiffEdgeKind::Hard, 1.0);
        }
        for link in linker.soft_links() {
            self.add_link(link.a, link.b, DiffEdgeKind::Soft, link.weight);
        }

        self.emit_groups(change_set);
        &self.groups
    }

    pub fn groups(&self) -> &BTreeMap<String, Group> {
        &self.groups
    }

    pub fn diagnostics(&self) -> &[EngineDiagnostic] {
        &self.diagnostics
    }

    /// (nodes, edges) of the diff-hunk graph.
    pub fn graph_size(&self) -> (usize, usize) {
        (self.graph.node_count(), self.graph.edge_count())
    }

    /// All non-source hunks become the reserved first group.
    fn reserve_non_source_group(&mut self, change_set: &ChangeSet) {
        if !self.options.process_non_source_changes {
            return;
        }
        let keys: Vec<String> = change_set
            .non_source_hunks()
            .iter()
            .map(|h| h.composite_id())
            .collect();
        if !keys.is_empty() {
            self.push_group(keys, change_set);
        }
    }

    /// Insert one edge between two distinct hunks, deduplicated per
    /// unordered pair and kind. Self-links are forbidden by
    /// construction.
    fn add_link(&mut self, a: HunkKey, b: HunkKey, kind: DiffEdgeKind, weight: f64) {
        if a == b {
            return;
        }
        let (Some(&na), Some(&nb)) = (self.node_by_key.get(&a), self.node_by_key.get(&b)) else {
            let (file, hunk) = if self.node_by_key.contains_key(&a) { b } else { a };
            self.diagnostics.push(EngineDiagnostic::InvalidIdentifier {
                id: format!("{file}:{hunk}"),
            });
            return;
        };
        let duplicate = self
            .graph
            .edges_connecting(na, nb)
            .chain(self.graph.edges_connecting(nb, na))
            .any(|e| e.weight().kind == kind);
        if !duplicate {
            self.graph.add_edge(na, nb, DiffEdge { kind, weight });
        }
    }

    /// Connected components over the undirected view, in deterministic
    /// order: components sorted by their smallest (fileIndex,
    /// hunkIndex); size >= 2 components first, then one bucket with all
    /// singletons.
    fn emit_groups(&mut self, change_set: &ChangeSet) {
        let mut components: UnionFind<usize> = UnionFind::new(self.graph.node_count());
        for edge in self.graph.edge_references() {
            components.union(edge.source().index(), edge.target().index());
        }

        let mut by_root: BTreeMap<usize, Vec<NodeIndex>> = BTreeMap::new();
        for index in self.graph.node_indices() {
            by_root
                .entry(components.find(index.index()))
                .or_default()
                .push(index);
        }

        let key_of = |graph: &DiGraph<DiffNode, DiffEdge>, index: NodeIndex| {
            parse_unique_index(&graph[index].unique_index).unwrap_or((usize::MAX, usize::MAX))
        };

        let mut ordered: Vec<Vec<NodeIndex>> = by_root.into_values().collect();
        for members in &mut ordered {
            members.sort_by_key(|&i| key_of(&self.graph, i));
        }
        ordered.sort_by_key(|members| key_of(&self.graph, members[0]));

        let mut singletons: Vec<String> = Vec::new();
        for members in ordered {
            let keys: Vec<String> = members
                .iter()
                .map(|&i| self.graph[i].composite_id.clone())
                .collect();
            if keys.len() > 1 {
                self.push_group(keys, change_set);
            } else {
                singletons.extend(keys);
            }
        }

        if !singletons.is_empty() {
            self.push_group(singletons, change_set);
        }

        info!(groups = self.groups.len(), "grouping finished");
    }

    fn push_group(&mut self, keys: Vec<String>, change_set: &ChangeSet) {
        let group_id = format!("group{}", self.groups.len());
        let mut group = Group::new(&self.repo_id, &self.repo_name, group_id.clone(), keys);
        group.intent_label = Some(self.infer_intent(&group.diff_hunk_ids, change_set));
        self.groups.insert(group_id, group);
    }

    fn infer_intent(&mut self, keys: &[String], change_set: &ChangeSet) -> IntentLabel {
        let mut files: Vec<&DiffFile> = Vec::new();
        let mut hunks: Vec<&DiffHunk> = Vec::new();
        for key in keys {
            let Some((file_id, hunk_id)) = parse_composite_id(key) else {
                self.diagnostics
                    .push(EngineDiagnostic::InvalidIdentifier { id: key.clone() });
                continue;
            };
            if let Some(file) = change_set.diff_files.iter().find(|f| f.file_id == file_id) {
                if !files.iter().any(|f| f.file_id == file.file_id) {
                    files.push(file);
                }
            }
            if let Some(hunk) = change_set.hunks_by_id.get(hunk_id) {
                hunks.push(hunk);
            }
        }
        IntentLabel::infer(&files, &hunks)
    }

    /// DOT snapshot of the diff-hunk graph, for debugging.
    pub fn export_dot(&self) -> String {
        format!("{}", Dot::new(&self.graph))
    }

    /// One JSON document per group under `generated_groups/`, plus an
    /// editable copy under `manual_groups/`.
    pub fn export_results(&self, out_dir: &Path) -> Result<()> {
        let generated = out_dir.join("generated_groups");
        let manual = out_dir.join("manual_groups");
        fs::create_dir_all(&generated)?;
        fs::create_dir_all(&manual)?;

        for (group_id, group) in &self.groups {
            let json = serde_json::to_string_pretty(group)?;
            fs::write(generated.join(format!("{group_id}.json")), &json)?;
            fs::write(manual.join(format!("{group_id}.json")), &json)?;
        }

        fs::write(out_dir.join("diff_graph.dot"), self.export_dot())?;
        Ok(())
    }

    /// Assemble an applicable patch per selected group from the raw
    /// diffs, hunks of one file kept together under its headers.
    pub fn export_patches(
        &mut self,
        out_dir: &Path,
        selected: &[String],
        change_set: &ChangeSet,
    ) -> Result<()> {
        let patches = out_dir.join("patches");
        fs::create_dir_all(&patches)?;

        let files_by_id: HashMap<&str, &DiffFile> = change_set
            .diff_files
            .iter()
            .map(|f| (f.file_id.as_str(), f))
            .collect();

        for group_id in selected {
            let Some(group) = self.groups.get(group_id) else {
                continue;
            };

            // hunks of the same file stay together, file order preserved
            let mut hunks_by_file: BTreeMap<usize, Vec<&DiffHunk>> = BTreeMap::new();
            let mut invalid: Vec<String> = Vec::new();
            for key in &group.diff_hunk_ids {
                let resolved = parse_composite_id(key).and_then(|(file_id, hunk_id)| {
                    let file = files_by_id.get(file_id)?;
                    let hunk = change_set.hunks_by_id.get(hunk_id)?;
                    Some((file.file_index, hunk))
                });
                match resolved {
                    Some((file_index, hunk)) => {
                        hunks_by_file.entry(file_index).or_default().push(hunk)
                    }
                    None => invalid.push(key.clone()),
                }
            }
            for id in invalid {
                self.diagnostics
                    .push(EngineDiagnostic::InvalidIdentifier { id });
            }

            let mut patch = String::new();
            for (file_index, hunks) in hunks_by_file {
                let file = &change_set.diff_files[file_index];
                for header in &file.raw_headers {
                    patch.push_str(header);
                    patch.push('\n');
                }
                for hunk in hunks {
                    for line in &hunk.raw_diff {
                        patch.push_str(line);
                        patch.push('\n');
                    }
                }
            }

            fs::write(patches.join(format!("{group_id}.patch")), patch)?;
        }

        Ok(())
    }
}
