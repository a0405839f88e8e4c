// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::cli::Cli;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// SOFT edge cutoff; similarities below this are discarded
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,

    /// Reserved aggregation level: 0 = hunk, 1 = member, 2 = class,
    /// 3 = package. Only 0 is implemented.
    #[serde(default)]
    pub distance_threshold: u8,

    /// Reserved pass-through to a future refactoring hook
    #[serde(default)]
    pub detect_refactorings: bool,

    /// When true, non-source hunks form their own first group; when
    /// false they are omitted from the output entirely
    #[serde(default)]
    pub process_non_source_changes: bool,

    /// Wall-clock bound over both reference-graph builds
    #[serde(default = "default_build_deadline_secs")]
    pub build_deadline_secs: u64,

    /// Repository display name; defaults to the work dir name
    #[serde(default)]
    pub repo_name: Option<String>,

    /// Where group JSON, the graph snapshot, and patches are written
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

fn default_similarity_threshold() -> f64 {
    0.618
}

fn default_build_deadline_secs() -> u64 {
    600
}

impl Default for Config {
    fn default() -> Self {
        Self {
            similarity_threshold: default_similarity_threshold(),
            distance_threshold: 0,
            detect_refactorings: false,
            process_non_source_changes: false,
            build_deadline_secs: default_build_deadline_secs(),
            repo_name: None,
            output_dir: None,
        }
    }
}

impl Config {
    /// Load with priority: CLI > ENV > file > defaults
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut config = Self::load_from_file()?;
        config.apply_env();
        config.apply_cli(cli);
        config.validate()?;
        Ok(config)
    }

    pub fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "untangle").map(|dirs| dirs.config_dir().to_path_buf())
    }

    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("config.toml"))
    }

    fn load_from_file() -> Result<Self> {
        let Some(path) = Self::config_path() else {
            return Ok(Self::default());
        };

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        toml::from_str(&content).map_err(|e| Error::Config(e.to_string()))
    }

    fn apply_env(&mut self) {
        if let Some(t) = env_parse::<f64>("UNTANGLE_SIMILARITY_THRESHOLD") {
            self.similarity_threshold = t;
        }
        if let Some(d) = env_parse::<u8>("UNTANGLE_DISTANCE_THRESHOLD") {
            self.distance_threshold = d;
        }
        if let Some(s) = env_parse::<u64>("UNTANGLE_BUILD_DEADLINE_SECS") {
            self.build_deadline_secs = s;
        }
        if let Ok(v) = std::env::var("UNTANGLE_PROCESS_NON_SOURCE") {
            self.process_non_source_changes = matches!(v.as_str(), "1" | "true" | "yes");
        }
        if let Ok(name) = std::env::var("UNTANGLE_REPO_NAME") {
            self.repo_name = Some(name);
        }
    }

    fn apply_cli(&mut self, cli: &Cli) {
        if let Some(threshold) = cli.threshold {
            self.similarity_threshold = threshold;
        }
        if cli.process_non_source {
            self.process_non_source_changes = true;
        }
        if let Some(deadline) = cli.deadline {
            self.build_deadline_secs = deadline;
        }
        if let Some(ref output) = cli.output {
            self.output_dir = Some(output.clone());
        }
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(Error::Config(format!(
                "similarity_threshold must be within 0.0..=1.0, got {}",
                self.similarity_threshold
            )));
        }
        if self.distance_threshold > 3 {
            return Err(Error::Config(format!(
                "distance_threshold must be one of 0, 1, 2, 3, got {}",
                self.distance_threshold
            )));
        }
        if self.build_deadline_secs == 0 {
            return Err(Error::Config(
                "build_deadline_secs must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Create default config file with secure permissions
    pub fn create_default() -> Result<PathBuf> {
        let Some(dir) = Self::config_dir() else {
            return Err(Error::Config("Cannot determine config directory".into()));
        };

        fs::create_dir_all(&dir)?;

        let path = dir.join("config.toml");
        let content = r#"# Untangle Configuration

# Similarity cutoff for soft links between hunks (0.0 - 1.0)
similarity_threshold = 0.618

# Reserved aggregation level: 0 = hunk, 1 = member, 2 = class, 3 = package.
# Only 0 currently has an effect.
distance_threshold = 0

# Reserved: pass changes through a refactoring-detection hook
detect_refactorings = false

# Group non-source changes (configs, docs, data) as their own first group.
# When false they are left out of the result entirely.
process_non_source_changes = false

# Wall-clock bound in seconds over both reference-graph builds
build_deadline_secs = 600

# Repository display name written into group files
# repo_name = "my-project"

# Where results are written; defaults to .untangle inside the repository
# output_dir = "/tmp/untangle-out"
"#;

        fs::write(&path, content)?;

        // Set secure permissions (0600)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&path, perms)?;
        }

        Ok(path)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}
