// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

// miette's Diagnostic derive generates code that triggers this false positive
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    #[error("Not a git repository")]
    #[diagnostic(
        code(untangle::git::not_repo),
        help("Run this command inside a git repository")
    )]
    NotAGitRepo,

    #[error("Merge in progress")]
    #[diagnostic(
        code(untangle::git::merge),
        help("Complete or abort the merge: git merge --abort")
    )]
    MergeInProgress,

    #[error("Reference-graph build exceeded the {seconds}s deadline")]
    #[diagnostic(
        code(untangle::build::timeout),
        help("Raise build_deadline_secs, or analyze a smaller change set")
    )]
    BuildTimeout { seconds: u64 },

    #[error("Reference-graph builder failed: {0}")]
    #[diagnostic(code(untangle::build::failure))]
    Builder(String),

    #[error("Operation cancelled by user")]
    Cancelled,

    #[error("Configuration error: {0}")]
    #[diagnostic(code(untangle::config::error))]
    Config(String),

    #[error("Git error: {0}")]
    #[diagnostic(code(untangle::git::error))]
    Git(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(untangle::export::serialize))]
    Serialize(#[from] serde_json::Error),

    #[error("Dialog error: {0}")]
    Dialog(String),
}

impl From<dialoguer::Error> for Error {
    fn from(e: dialoguer::Error) -> Self {
        Error::Dialog(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Recoverable per-item failures, surfaced alongside successful output
/// rather than aborting the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineDiagnostic {
    /// One file could not be read or parsed; it contributes no nodes.
    ParseFailure { path: String, detail: String },
    /// A malformed composite key or positional index; the hunk is skipped.
    InvalidIdentifier { id: String },
}

impl std::fmt::Display for EngineDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ParseFailure { path, detail } => {
                write!(f, "parse failure in {path}: {detail}")
            }
            Self::InvalidIdentifier { id } => write!(f, "invalid identifier: {id}"),
        }
    }
}
