// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Which side of a change a line range or snippet belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Version {
    Base,
    Current,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeStatus {
    Added,
    Modified,
    Deleted,
}

/// Languages we can parse into a reference graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    Rust,
    TypeScript,
    Python,
    Go,
    JavaScript,
}

impl Language {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        match ext {
            "rs" => Some(Self::Rust),
            "ts" | "tsx" => Some(Self::TypeScript),
            "py" => Some(Self::Python),
            "go" => Some(Self::Go),
            "js" | "jsx" => Some(Self::JavaScript),
            _ => None,
        }
    }
}

/// Source files feed the reference-graph build; everything else is
/// grouped wholesale (or dropped, depending on configuration).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileType {
    Source(Language),
    NonSource,
}

impl FileType {
    pub fn from_path(path: &Path) -> Self {
        match Language::from_path(path) {
            Some(lang) => Self::Source(lang),
            None => Self::NonSource,
        }
    }

    pub fn is_source(&self) -> bool {
        matches!(self, Self::Source(_))
    }
}

/// Coarse file role, used for intent labeling of finished groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileCategory {
    Source,
    Test,
    Config,
    Docs,
    Build,
    Other,
}

impl FileCategory {
    pub fn from_path(path: &Path) -> Self {
        let path_str = path.to_string_lossy();
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        if name.contains("_test.")
            || name.contains(".test.")
            || name.contains("_spec.")
            || path.starts_with("tests/")
            || path_str.contains("/tests/")
            || path_str.contains("/test/")
        {
            return Self::Test;
        }

        if path.starts_with("docs/")
            || path_str.contains("/docs/")
            || matches!(ext, "md" | "rst" | "txt")
        {
            return Self::Docs;
        }

        if path.starts_with(".github/")
            || path_str.contains("/.github/")
            || matches!(
                name,
                "Dockerfile" | "docker-compose.yml" | "Makefile" | "justfile" | ".dockerignore"
            )
        {
            return Self::Build;
        }

        if matches!(
            name,
            "Cargo.toml"
                | "Cargo.lock"
                | "package.json"
                | "package-lock.json"
                | "tsconfig.json"
                | "pyproject.toml"
                | ".gitignore"
                | "go.mod"
                | "go.sum"
        ) {
            return Self::Config;
        }

        if Language::from_path(path).is_some() {
            return Self::Source;
        }

        match ext {
            "toml" | "yaml" | "yml" | "json" | "ini" | "env" => Self::Config,
            _ => Self::Other,
        }
    }
}

/// One side of a diff hunk: a contiguous line range in one version of a
/// file, together with the lines themselves.
///
/// An empty region (pure insertion or deletion on the other side) has an
/// empty snippet and `end_line < start_line`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HunkRegion {
    pub relative_path: String,
    pub start_line: usize,
    pub end_line: usize,
    pub code_snippet: Vec<String>,
}

impl HunkRegion {
    pub fn new(relative_path: &str, start_line: usize, lines: Vec<String>) -> Self {
        let end_line = if lines.is_empty() {
            start_line.saturating_sub(1)
        } else {
            start_line + lines.len() - 1
        };
        Self {
            relative_path: relative_path.to_string(),
            start_line,
            end_line,
            code_snippet: lines,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.code_snippet.is_empty()
    }

    /// Closed-interval overlap against a source line range.
    pub fn overlaps(&self, start_line: usize, end_line: usize) -> bool {
        !self.is_empty() && start_line <= self.end_line && end_line >= self.start_line
    }

    pub fn joined(&self) -> String {
        self.code_snippet.join("\n")
    }
}

/// A contiguous changed region of one file, carrying both its pre-change
/// and post-change text. At least one side is non-empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffHunk {
    pub diff_hunk_id: String,
    pub file_id: String,
    pub file_index: usize,
    pub index: usize,
    pub base: HunkRegion,
    pub current: HunkRegion,
    pub raw_diff: Vec<String>,
}

impl DiffHunk {
    /// Positional identifier: `"<fileIndex>:<hunkIndex>"`.
    pub fn unique_index(&self) -> String {
        format!("{}:{}", self.file_index, self.index)
    }

    /// Opaque identifier: `"<fileID>:<diffHunkID>"`.
    pub fn composite_id(&self) -> String {
        format!("{}:{}", self.file_id, self.diff_hunk_id)
    }

    pub fn region(&self, version: Version) -> &HunkRegion {
        match version {
            Version::Base => &self.base,
            Version::Current => &self.current,
        }
    }

    /// Changed-line counts as (additions, deletions).
    pub fn churn(&self) -> (usize, usize) {
        (self.current.code_snippet.len(), self.base.code_snippet.len())
    }
}

/// Parse `"<fileIndex>:<hunkIndex>"` back into ordinals.
pub fn parse_unique_index(index: &str) -> Option<(usize, usize)> {
    let (file, hunk) = index.split_once(':')?;
    Some((file.parse().ok()?, hunk.parse().ok()?))
}

/// Parse `"<fileID>:<diffHunkID>"` into its two opaque halves.
pub fn parse_composite_id(id: &str) -> Option<(&str, &str)> {
    match id.split_once(':') {
        Some((file, hunk)) if !file.is_empty() && !hunk.is_empty() => Some((file, hunk)),
        _ => None,
    }
}

/// One changed file with its ordered, non-overlapping hunks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffFile {
    pub file_id: String,
    pub file_index: usize,
    pub file_type: FileType,
    pub status: ChangeStatus,
    pub relative_path: String,
    pub base_content: String,
    pub current_content: String,
    /// `diff --git` header lines, kept verbatim for patch export.
    pub raw_headers: Vec<String>,
    pub diff_hunks: Vec<DiffHunk>,
}

impl DiffFile {
    pub fn category(&self) -> FileCategory {
        FileCategory::from_path(Path::new(&self.relative_path))
    }

    pub fn content(&self, version: Version) -> &str {
        match version {
            Version::Base => &self.base_content,
            Version::Current => &self.current_content,
        }
    }
}

/// The full change model for one analysis run.
#[derive(Debug, Default, Clone)]
pub struct ChangeSet {
    pub diff_files: Vec<DiffFile>,
    pub hunks_by_id: HashMap<String, DiffHunk>,
}

impl ChangeSet {
    pub fn new(diff_files: Vec<DiffFile>) -> Self {
        let hunks_by_id = diff_files
            .iter()
            .flat_map(|f| f.diff_hunks.iter())
            .map(|h| (h.diff_hunk_id.clone(), h.clone()))
            .collect();
        Self {
            diff_files,
            hunks_by_id,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.diff_files.is_empty()
    }

    pub fn hunk_count(&self) -> usize {
        self.diff_files.iter().map(|f| f.diff_hunks.len()).sum()
    }

    /// Hunks of source files, in (fileIndex, hunkIndex) order.
    pub fn source_hunks(&self) -> Vec<&DiffHunk> {
        self.diff_files
            .iter()
            .filter(|f| f.file_type.is_source())
            .flat_map(|f| f.diff_hunks.iter())
            .collect()
    }

    /// Hunks of non-source files, in (fileIndex, hunkIndex) order.
    pub fn non_source_hunks(&self) -> Vec<&DiffHunk> {
        self.diff_files
            .iter()
            .filter(|f| !f.file_type.is_source())
            .flat_map(|f| f.diff_hunks.iter())
            .collect()
    }

    /// Resolve a positional index to its opaque composite key.
    pub fn composite_for_index(&self, file_index: usize, hunk_index: usize) -> Option<String> {
        let file = self.diff_files.get(file_index)?;
        let hunk = file.diff_hunks.get(hunk_index)?;
        Some(format!("{}:{}", file.file_id, hunk.diff_hunk_id))
    }
}
