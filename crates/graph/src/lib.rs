// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! Component dependency tree assembly and install/uninstall set
//! resolution: turns an unordered bag of [`Component`] records plus a
//! user's check/uncheck choices into an ordered, reason-annotated plan.

mod check;
mod component;
mod dag;
mod error;
mod reason;
mod resolve;

pub use check::{initial_check_state, CheckState};
pub use component::{parent_name, strip_version_suffix, Component};
pub use dag::Dag;
pub use error::GraphError;
pub use reason::Reason;
pub use resolve::{
    install_order, replacements_for, resolve_install_set, resolve_uninstall_set, uninstall_order, Replacement,
};
