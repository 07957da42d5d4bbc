// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! Executes an ordered install (or uninstall) list against the
//! operation registry: per-component admin elevation, backup/perform
//! with a Retry/Ignore/Cancel dialog policy, reverse-order rollback on
//! failure, and the on-disk `packages.xml` record of what landed.

mod admin;
mod archives;
mod component;
mod decision;
mod error;
mod progress;
mod runtime;
mod stop_processes;
mod undo_log;

pub mod packages;

pub use admin::{AdminRights, Guard};
pub use archives::stage_component_archives;
pub use component::{InstallState, RuntimeComponent};
pub use decision::{ChannelPrompter, Decision, FixedPrompter, Prompter};
pub use error::RuntimeError;
pub use progress::{Event, ProgressCoordinator};
pub use runtime::{InstallOutcome, InstallRuntime, REGISTER_FOR_UNINSTALLATION};
pub use stop_processes::stop_processes_for_updates;
pub use undo_log::{sort_by_install_order, UndoLogEntry};
