// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

pub mod builder;
pub mod git;
pub mod grouper;
pub mod linker;
pub mod orchestrator;
pub mod parser;
pub mod similarity;
pub mod snapshot;
