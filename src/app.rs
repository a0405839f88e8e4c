// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

use std::io::IsTerminal;
use std::path::PathBuf;

use console::style;
use dialoguer::Confirm;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::domain::ChangeSet;
use crate::error::{Error, Result};
use crate::services::{
    git::ChangeSource,
    grouper::{EngineOptions, GroupEngine},
    orchestrator::Orchestrator,
    similarity::NormalizedLevenshtein,
    snapshot::SnapshotWriter,
};

pub struct App {
    cli: Cli,
    config: Config,
    cancel_token: CancellationToken,
}

impl App {
    pub fn new(cli: Cli) -> Result<Self> {
        let config = Config::load(&cli)?;
        debug!(
            similarity_threshold = config.similarity_threshold,
            build_deadline_secs = config.build_deadline_secs,
            process_non_source = config.process_non_source_changes,
            "config loaded"
        );
        let cancel_token = CancellationToken::new();
        Ok(Self {
            cli,
            config,
            cancel_token,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup Ctrl+C handler with CancellationToken
        let cancel = self.cancel_token.clone();
        tokio::spawn(async move {
            signal::ctrl_c().await.ok();
            cancel.cancel();
        });

        // Handle subcommands
        if let Some(ref cmd) = self.cli.command {
            return self.handle_command(cmd);
        }

        self.group_changes().await
    }

    async fn group_changes(&mut self) -> Result<()> {
        if self.cancel_token.is_cancelled() {
            return Err(Error::Cancelled);
        }

        // Step 1: Enumerate the change set
        self.print_status("Collecting changes...");

        let source = ChangeSource::discover()?;
        let change_set = match self.cli.commit {
            Some(ref rev) => source.analyze_commit(rev)?,
            None => source.analyze_working_tree()?,
        };

        if change_set.is_empty() {
            self.print_info("Nothing to group: no changed files.");
            return Ok(());
        }
        if change_set.hunk_count() == 0 {
            self.print_info("Changes exist, but not in file contents.");
            return Ok(());
        }

        self.print_info(&format!(
            "{} files with {} hunks detected",
            change_set.diff_files.len(),
            change_set.hunk_count()
        ));

        let repo_name = self
            .config
            .repo_name
            .clone()
            .unwrap_or_else(|| source.repo_name());
        let out_dir = self.output_dir(&source);

        // Step 2: Materialize both snapshots
        self.print_status("Materializing snapshots...");
        let writer = SnapshotWriter::new(out_dir.join("snapshots"));
        let (base_dir, current_dir) = writer.materialize(&change_set)?;

        if self.cancel_token.is_cancelled() {
            return Err(Error::Cancelled);
        }

        // Step 3: Build the two reference graphs under one deadline
        self.print_status("Building reference graphs...");
        let orchestrator = Orchestrator::with_cancel(
            self.config.build_deadline_secs,
            self.cancel_token.child_token(),
        );
        let (base, current) = orchestrator
            .build_snapshots(&base_dir, &current_dir, &change_set.diff_files)
            .await?;

        for diagnostic in base.diagnostics.iter().chain(&current.diagnostics) {
            warn!(%diagnostic, "builder diagnostic");
        }

        // Step 4: Link hunks and emit groups
        self.print_status("Linking and grouping hunks...");
        let options = EngineOptions {
            similarity_threshold: self.config.similarity_threshold,
            distance_threshold: self.config.distance_threshold,
            detect_refactorings: self.config.detect_refactorings,
            process_non_source_changes: self.config.process_non_source_changes,
        };
        let mut engine = GroupEngine::new(&repo_name, &repo_name, options);
        engine.analyze(&change_set, &base.graph, &current.graph, &NormalizedLevenshtein);

        for diagnostic in engine.diagnostics() {
            warn!(%diagnostic, "grouping diagnostic");
        }

        self.print_groups(&engine, &change_set);

        if self.cli.dry_run {
            return Ok(());
        }

        // Step 5: Export groups, graph snapshot and patches
        if !self.confirm_export(&out_dir)? {
            return Err(Error::Cancelled);
        }

        engine.export_results(&out_dir)?;
        let group_ids: Vec<String> = engine.groups().keys().cloned().collect();
        engine.export_patches(&out_dir, &group_ids, &change_set)?;

        self.print_info(&format!("Results written to {}", out_dir.display()));
        Ok(())
    }

    fn output_dir(&self, source: &ChangeSource) -> PathBuf {
        self.config
            .output_dir
            .clone()
            .unwrap_or_else(|| source.work_dir().join(".untangle"))
    }

    fn print_groups(&self, engine: &GroupEngine, change_set: &ChangeSet) {
        let (nodes, edges) = engine.graph_size();
        eprintln!();
        eprintln!(
            "{}",
            style(format!(
                "{} groups from {} hunks ({} linked pairs)",
                engine.groups().len(),
                nodes,
                edges
            ))
            .bold()
        );

        for (group_id, group) in engine.groups() {
            let label = group
                .intent_label
                .map(|l| l.to_string())
                .unwrap_or_else(|| "?".into());
            eprintln!(
                "  {} [{}] {} hunks",
                style(group_id).cyan(),
                label,
                group.diff_hunk_ids.len()
            );
            for key in &group.diff_hunk_ids {
                if let Some(path) = member_path(key, change_set) {
                    eprintln!("      {path}");
                }
            }
        }
        eprintln!();
    }

    fn confirm_export(&self, out_dir: &std::path::Path) -> Result<bool> {
        let interactive = std::io::stdout().is_terminal() && std::io::stdin().is_terminal();
        if self.cli.yes || !interactive {
            return Ok(true);
        }
        Ok(Confirm::new()
            .with_prompt(format!("Write groups and patches to {}?", out_dir.display()))
            .default(true)
            .interact()?)
    }

    fn handle_command(&self, cmd: &Commands) -> Result<()> {
        match cmd {
            Commands::Init => {
                let path = Config::create_default()?;
                self.print_info(&format!("Config created at {}", path.display()));
                Ok(())
            }
            Commands::Config => {
                let rendered = toml::to_string_pretty(&self.config)
                    .map_err(|e| Error::Config(e.to_string()))?;
                println!("{rendered}");
                if let Some(path) = Config::config_path() {
                    eprintln!("# file: {}", path.display());
                }
                Ok(())
            }
            Commands::Doctor => self.doctor(),
            Commands::Completions { shell } => {
                use clap::CommandFactory;
                let mut cmd = Cli::command();
                clap_complete::generate(*shell, &mut cmd, "untangle", &mut std::io::stdout());
                Ok(())
            }
        }
    }

    fn doctor(&self) -> Result<()> {
        eprintln!("{}", style("untangle doctor").bold());

        let git_ok = std::process::Command::new("git")
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false);
        eprintln!("  git binary:    {}", if git_ok { "ok" } else { "MISSING" });

        match ChangeSource::discover() {
            Ok(source) => {
                eprintln!("  repository:    {}", source.work_dir().display());
                eprintln!("  repo name:     {}", source.repo_name());
            }
            Err(_) => eprintln!("  repository:    not inside a git repository"),
        }

        eprintln!(
            "  config file:   {}",
            Config::config_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "unavailable".into())
        );
        eprintln!(
            "  threshold:     {:.3}",
            self.config.similarity_threshold
        );
        eprintln!("  deadline:      {}s", self.config.build_deadline_secs);
        Ok(())
    }

    fn print_status(&self, msg: &str) {
        eprintln!("{} {}", style("::").cyan().bold(), msg);
    }

    fn print_info(&self, msg: &str) {
        eprintln!("{} {}", style("->").green(), msg);
    }
}

fn member_path(composite: &str, change_set: &ChangeSet) -> Option<String> {
    let (file_id, _) = crate::domain::parse_composite_id(composite)?;
    change_set
        .diff_files
        .iter()
        .find(|f| f.file_id == file_id)
        .map(|f| f.relative_path.clone())
}
