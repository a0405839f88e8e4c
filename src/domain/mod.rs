// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

mod change;
mod diffgraph;
mod graph;
mod group;

pub use change::*;
pub use diffgraph::*;
pub use graph::*;
pub use group::*;
