// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
// SPDX-License-Identifier: GPL-3.0-only

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use uuid::Uuid;

use crate::domain::{ChangeSet, ChangeStatus, DiffFile, DiffHunk, FileType, HunkRegion};
use crate::error::{Error, Result};

// Hunk headers: `@@ -start[,count] +start[,count] @@`, counts optional
static HUNK_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@@\s*-(\d+)(?:,(\d+))?\s+\+(\d+)(?:,(\d+))?\s*@@").unwrap());

/// Enumerates changes from a git repository, either the working tree
/// against HEAD or one named commit against its parent.
pub struct ChangeSource {
    repo: gix::Repository,
    work_dir: PathBuf,
}

impl ChangeSource {
    /// Walk upward from the current directory to the enclosing
    /// repository. Grouping needs a checkout to diff against, so a bare
    /// repository is rejected here.
    pub fn discover() -> Result<Self> {
        let repo = gix::discover(".").map_err(|_| Error::NotAGitRepo)?;

        let work_dir = repo
            .work_dir()
            .ok_or_else(|| Error::Git("bare repository: no working tree to group".into()))?
            .to_path_buf();

        Ok(Self { repo, work_dir })
    }

    /// A half-finished merge mixes conflict markers into the diff;
    /// refuse to group until it is resolved or aborted.
    pub fn check_state(&self) -> Result<()> {
        if matches!(self.repo.state(), Some(gix::state::InProgress::Merge)) {
            return Err(Error::MergeInProgress);
        }
        Ok(())
    }

    pub fn repo_name(&self) -> String {
        self.work_dir
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("repository")
            .to_string()
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// All tracked changes between HEAD and the working tree.
    pub fn analyze_working_tree(&self) -> Result<ChangeSet> {
        self.check_state()?;
        self.collect("HEAD", None)
    }

    /// The changes one commit introduced over its first parent.
    pub fn analyze_commit(&self, rev: &str) -> Result<ChangeSet> {
        self.collect(&format!("{rev}^"), Some(rev))
    }

    /// Shared walk: name-status listing, then per-file diff and both
    /// content versions. `target` None means the working tree.
    fn collect(&self, base_rev: &str, target: Option<&str>) -> Result<ChangeSet> {
        let mut name_status = vec!["diff", "--name-status", "--no-renames", base_rev];
        if let Some(rev) = target {
            name_status.push(rev);
        }
        let listing = self.run_git(&name_status)?;

        let mut diff_files = Vec::new();

        for line in listing.lines() {
            if line.is_empty() {
                continue;
            }
            let parts: Vec<&str> = line.splitn(2, '\t').collect();
            if parts.len() != 2 {
                continue;
            }

            let status = match parts[0] {
                "A" => ChangeStatus::Added,
                "M" => ChangeStatus::Modified,
                "D" => ChangeStatus::Deleted,
                _ => continue,
            };

            let relative_path = parts[1].to_string();
            if Self::is_non_text_path(Path::new(&relative_path)) {
                continue;
            }

            let mut diff_args = vec!["diff", "--no-ext-diff", "--unified=0", base_rev];
            if let Some(rev) = target {
                diff_args.push(rev);
            }
            diff_args.push("--");
            diff_args.push(&relative_path);
            let raw_diff = self.run_git(&diff_args)?;

            let base_content = self
                .show(&format!("{base_rev}:{relative_path}"))
                .unwrap_or_default();
            let current_content = match target {
                Some(rev) => self
                    .show(&format!("{rev}:{relative_path}"))
                    .unwrap_or_default(),
                None => std::fs::read_to_string(self.work_dir.join(&relative_path))
                    .unwrap_or_default(),
            };

            let file_index = diff_files.len();
            let file_id = Uuid::new_v4().to_string();
            let (raw_headers, hunks) =
                parse_file_diff(&raw_diff, &relative_path, &file_id, file_index);

            diff_files.push(DiffFile {
                file_id,
                file_index,
                file_type: FileType::from_path(Path::new(&relative_path)),
                status,
                relative_path,
                base_content,
                current_content,
                raw_headers,
                diff_hunks: hunks,
            });
        }

        Ok(ChangeSet::new(diff_files))
    }

    fn run_git(&self, args: &[&str]) -> Result<String> {
        let output = std::process::Command::new("git")
            .args(args)
            .current_dir(&self.work_dir)
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Git(stderr.to_string()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Object content at `<rev>:<path>`, None when absent there.
    fn show(&self, spec: &str) -> Option<String> {
        let output = std::process::Command::new("git")
            .args(["show", spec])
            .current_dir(&self.work_dir)
            .output()
            .ok()?;

        if output.status.success() {
            String::from_utf8(output.stdout).ok()
        } else {
            None
        }
    }

    /// Assets that cannot carry line-based hunks. Textual non-source
    /// files still flow through as non-source changes; these never
    /// yield a usable diff at all, so they are dropped before hunk
    /// extraction.
    fn is_non_text_path(path: &Path) -> bool {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        matches!(
            ext,
            // build artifacts of the ecosystems we parse
            "so" | "dylib" | "rlib" | "a" | "wasm" | "pyc"
                // bundled media and fonts
                | "png" | "jpg" | "jpeg" | "gif" | "ico" | "woff" | "woff2"
                // packaged archives
                | "zip" | "tar" | "gz" | "tgz" | "jar"
        )
    }
}

/// Split one file's zero-context unified diff into its header lines and
/// its hunks. With no context lines, each hunk's line ranges delimit
/// exactly the changed regions of both versions.
pub fn parse_file_diff(
    diff: &str,
    relative_path: &str,
    file_id: &str,
    file_index: usize,
) -> (Vec<String>, Vec<DiffHunk>) {
    struct RawHunk {
        base_start: usize,
        current_start: usize,
        base_lines: Vec<String>,
        current_lines: Vec<String>,
        raw: Vec<String>,
    }

    let mut headers: Vec<String> = Vec::new();
    let mut raw_hunks: Vec<RawHunk> = Vec::new();

    for line in diff.lines() {
        if let Some(caps) = HUNK_REGEX.captures(line) {
            let base_start = caps.get(1).and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
            let current_start = caps.get(3).and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
            raw_hunks.push(RawHunk {
                base_start,
                current_start,
                base_lines: Vec::new(),
                current_lines: Vec::new(),
                raw: vec![line.to_string()],
            });
        } else if let Some(hunk) = raw_hunks.last_mut() {
            hunk.raw.push(line.to_string());
            if let Some(removed) = line.strip_prefix('-') {
                hunk.base_lines.push(removed.to_string());
            } else if let Some(added) = line.strip_prefix('+') {
                hunk.current_lines.push(added.to_string());
            }
        } else {
            headers.push(line.to_string());
        }
    }

    let hunks = raw_hunks
        .into_iter()
        .enumerate()
        .map(|(index, raw)| DiffHunk {
            diff_hunk_id: Uuid::new_v4().to_string(),
            file_id: file_id.to_string(),
            file_index,
            index,
            base: HunkRegion::new(relative_path, raw.base_start, raw.base_lines),
            current: HunkRegion::new(relative_path, raw.current_start, raw.current_lines),
            raw_diff: raw.raw,
        })
        .collect();

    (headers, hunks)
}
