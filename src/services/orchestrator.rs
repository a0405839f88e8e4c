// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::domain::{DiffFile, Version};
use crate::error::{Error, Result};
use crate::services::builder::{self, BuildOutcome};

/// Runs the base and current reference-graph builds concurrently under
/// one shared wall-clock deadline.
pub struct Orchestrator {
    deadline: Duration,
    cancel: CancellationToken,
}

impl Orchestrator {
    pub fn new(deadline_secs: u64) -> Self {
        Self::with_cancel(deadline_secs, CancellationToken::new())
    }

    pub fn with_cancel(deadline_secs: u64, cancel: CancellationToken) -> Self {
        Self {
            deadline: Duration::from_secs(deadline_secs),
            cancel,
        }
    }

    /// Build both versions from their snapshot directories.
    pub async fn build_snapshots(
        &self,
        base_dir: &Path,
        current_dir: &Path,
        diff_files: &[DiffFile],
    ) -> Result<(BuildOutcome, BuildOutcome)> {
        let files: Arc<[DiffFile]> = diff_files.to_vec().into();

        let base = snapshot_worker(base_dir.to_path_buf(), Arc::clone(&files), Version::Base);
        let current = snapshot_worker(current_dir.to_path_buf(), files, Version::Current);
        self.run_pair(base, current).await
    }

    /// Drive two independent builder closures to completion.
    ///
    /// Each worker runs on the blocking pool and owns its inputs; the
    /// two never share mutable state. One timeout bounds the pair: on
    /// expiry the cancellation token fires, in-flight work is abandoned
    /// and the run fails with a timeout error. A worker panic is a
    /// builder failure.
    pub async fn run_pair<B, C>(&self, base: B, current: C) -> Result<(BuildOutcome, BuildOutcome)>
    where
        B: FnOnce(CancellationToken) -> Result<BuildOutcome> + Send + 'static,
        C: FnOnce(CancellationToken) -> Result<BuildOutcome> + Send + 'static,
    {
        let base_task = tokio::task::spawn_blocking({
            let cancel = self.cancel.child_token();
            move || base(cancel)
        });
        let current_task = tokio::task::spawn_blocking({
            let cancel = self.cancel.child_token();
            move || current(cancel)
        });

        let joined = tokio::time::timeout(self.deadline, async {
            let base = base_task.await;
            let current = current_task.await;
            (base, current)
        })
        .await;

        let (base, current) = match joined {
            Ok(pair) => pair,
            Err(_) => {
                self.cancel.cancel();
                warn!(
                    deadline_secs = self.deadline.as_secs(),
                    "reference-graph build deadline expired"
                );
                return Err(Error::BuildTimeout {
                    seconds: self.deadline.as_secs(),
                });
            }
        };

        let base = unwrap_worker(base)?;
        let current = unwrap_worker(current)?;
        debug!(
            base_nodes = base.graph.node_count(),
            current_nodes = current.graph.node_count(),
            "both reference graphs ready"
        );
        Ok((base, current))
    }
}

fn snapshot_worker(
    dir: PathBuf,
    files: Arc<[DiffFile]>,
    version: Version,
) -> impl FnOnce(CancellationToken) -> Result<BuildOutcome> + Send + 'static {
    move |cancel| builder::build_reference_graph(&dir, &files, version, &cancel)
}

fn unwrap_worker(
    joined: std::result::Result<Result<BuildOutcome>, tokio::task::JoinError>,
) -> Result<BuildOutcome> {
    match joined {
        Ok(Ok(outcome)) => Ok(outcome),
        Ok(Err(Error::Cancelled)) => Err(Error::Cancelled),
        Ok(Err(e)) => Err(Error::Builder(e.to_string())),
        Err(join_error) => Err(Error::Builder(join_error.to_string())),
    }
}
