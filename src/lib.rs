// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

//! Untangle - commit group generator
//!
//! This crate analyzes the uncommitted changes of a git repository,
//! builds reference graphs of the affected code in both versions, links
//! related diff hunks, and partitions them into cohesive commit groups.

pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod services;

pub use app::App;
pub use cli::Cli;
pub use config::Config;
pub use error::{EngineDiagnostic, Error, Result};
