// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

use serde::{Deserialize, Serialize};

use super::change::{DiffFile, DiffHunk, FileCategory};

/// Coarse intent of a group, inferred from its member files and churn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntentLabel {
    Feature,
    Fix,
    Refactor,
    Docs,
    Test,
    Config,
    Other,
}

impl IntentLabel {
    /// Category vote over the group members: uniform non-source
    /// categories win outright, otherwise churn decides.
    pub fn infer(files: &[&DiffFile], hunks: &[&DiffHunk]) -> Self {
        if files.is_empty() {
            return Self::Other;
        }

        let categories: Vec<_> = files.iter().map(|f| f.category()).collect();

        if categories.iter().all(|c| *c == FileCategory::Docs) {
            return Self::Docs;
        }
        if categories.iter().all(|c| *c == FileCategory::Test) {
            return Self::Test;
        }
        if categories
            .iter()
            .all(|c| matches!(c, FileCategory::Config | FileCategory::Build))
        {
            return Self::Config;
        }

        let (additions, deletions) = hunks.iter().fold((0, 0), |(a, d), h| {
            let (add, del) = h.churn();
            (a + add, d + del)
        });

        if deletions > additions * 2 {
            return Self::Refactor;
        }
        if additions < 20 && deletions < 20 {
            return Self::Fix;
        }
        Self::Feature
    }
}

impl std::fmt::Display for IntentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Feature => "feature",
            Self::Fix => "fix",
            Self::Refactor => "refactor",
            Self::Docs => "docs",
            Self::Test => "test",
            Self::Config => "config",
            Self::Other => "other",
        };
        f.write_str(s)
    }
}

/// A set of hunks intended to be committed together.
///
/// The serialized shape is stable; consumers round-trip groups without
/// loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    #[serde(rename = "repoID")]
    pub repo_id: String,
    #[serde(rename = "repoName")]
    pub repo_name: String,
    #[serde(rename = "groupID")]
    pub group_id: String,
    /// Composite `fileID:diffHunkID` keys, ordered by (fileIndex, hunkIndex).
    #[serde(rename = "diffHunkIDs")]
    pub diff_hunk_ids: Vec<String>,
    #[serde(rename = "intentLabel", skip_serializing_if = "Option::is_none")]
    pub intent_label: Option<IntentLabel>,
    #[serde(rename = "commitMsg", skip_serializing_if = "Option::is_none")]
    pub commit_msg: Option<String>,
    #[serde(
        rename = "recommendedCommitMsgs",
        skip_serializing_if = "Option::is_none"
    )]
    pub recommended_commit_msgs: Option<Vec<String>>,
}

impl Group {
    pub fn new(repo_id: &str, repo_name: &str, group_id: String, diff_hunk_ids: Vec<String>) -> Self {
        Self {
            repo_id: repo_id.to_string(),
            repo_name: repo_name.to_string(),
            group_id,
            diff_hunk_ids,
            intent_label: None,
            commit_msg: None,
            recommended_commit_msgs: None,
        }
    }
}
