// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "untangle")]
#[command(version)]
#[command(about = "Decompose tangled working-tree changes into atomic commit groups", long_about = None)]
pub struct Cli {
    /// Analyze a specific commit instead of the working tree
    #[arg(short, long)]
    pub commit: Option<String>,

    /// Similarity threshold for soft links (0.0 - 1.0)
    #[arg(short = 't', long, env = "UNTANGLE_SIMILARITY_THRESHOLD")]
    pub threshold: Option<f64>,

    /// Include non-source changes as their own group
    #[arg(long)]
    pub process_non_source: bool,

    /// Graph build deadline in seconds
    #[arg(long)]
    pub deadline: Option<u64>,

    /// Output directory for group, graph and patch files
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Auto-confirm export without prompting
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Print groups only, don't write anything
    #[arg(long)]
    pub dry_run: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Initialize config file
    Init,
    /// Show current configuration
    Config,
    /// Check configuration and environment
    Doctor,
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
