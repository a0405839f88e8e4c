// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::{ChangeSet, Version};
use crate::error::Result;

/// Writes the two versions of the affected files into mirror
/// directories, so each builder can read its snapshot from disk under
/// the same relative paths the hunks carry.
pub struct SnapshotWriter {
    root: PathBuf,
}

impl SnapshotWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns `(base_dir, current_dir)`. Files absent in a version
    /// (added or deleted) are simply not written there.
    pub fn materialize(&self, change_set: &ChangeSet) -> Result<(PathBuf, PathBuf)> {
        let base_dir = self.root.join("base");
        let current_dir = self.root.join("current");

        for (version, dir) in [(Version::Base, &base_dir), (Version::Current, &current_dir)] {
            for file in &change_set.diff_files {
                let content = file.content(version);
                if content.is_empty() {
                    continue;
                }
                let path = dir.join(&file.relative_path);
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&path, content)?;
            }
        }

        debug!(
            base = %base_dir.display(),
            current = %current_dir.display(),
            files = change_set.diff_files.len(),
            "snapshots materialized"
        );
        Ok((base_dir, current_dir))
    }
}
