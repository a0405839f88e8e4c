// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

use std::path::Path;

use untangle::domain::{ChangeSet, ChangeStatus, DiffFile, DiffHunk, FileType, HunkRegion};

/// Build a hunk region starting at `start_line` from literal lines.
#[allow(dead_code)]
pub fn region(path: &str, start_line: usize, lines: &[&str]) -> HunkRegion {
    HunkRegion::new(path, start_line, lines.iter().map(|s| s.to_string()).collect())
}

/// A hunk with deterministic test identifiers derived from its indices.
#[allow(dead_code)]
pub fn make_hunk(file_index: usize, index: usize, base: HunkRegion, current: HunkRegion) -> DiffHunk {
    DiffHunk {
        diff_hunk_id: format!("hunk-{file_index}-{index}"),
        file_id: format!("file-{file_index}"),
        file_index,
        index,
        base,
        current,
        raw_diff: Vec::new(),
    }
}

/// A DiffFile whose type follows its path extension.
#[allow(dead_code)]
pub fn make_file(file_index: usize, path: &str, hunks: Vec<DiffHunk>) -> DiffFile {
    DiffFile {
        file_id: format!("file-{file_index}"),
        file_index,
        file_type: FileType::from_path(Path::new(path)),
        status: ChangeStatus::Modified,
        relative_path: path.to_string(),
        base_content: String::new(),
        current_content: String::new(),
        raw_headers: Vec::new(),
        diff_hunks: hunks,
    }
}

/// A one-hunk source file where both versions replace a single line.
#[allow(dead_code)]
pub fn single_line_edit(file_index: usize, path: &str, before: &str, after: &str) -> DiffFile {
    let hunk = make_hunk(
        file_index,
        0,
        region(path, 1, &[before]),
        region(path, 1, &[after]),
    );
    make_file(file_index, path, vec![hunk])
}

#[allow(dead_code)]
pub fn make_change_set(files: Vec<DiffFile>) -> ChangeSet {
    ChangeSet::new(files)
}

/// Every composite key across all groups, in emission order.
#[allow(dead_code)]
pub fn all_group_keys(
    groups: &std::collections::BTreeMap<String, untangle::domain::Group>,
) -> Vec<String> {
    groups
        .values()
        .flat_map(|g| g.diff_hunk_ids.iter().cloned())
        .collect()
}
