// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! Top-level session wiring: opens a payload, resolves the component
//! graph, drives the install/uninstall runtime, and persists settings --
//! the one crate the `cli` binary talks to.

mod components_xml;
mod error;
mod session;

pub use components_xml::{ComponentDescriptor, ComponentEntry};
pub use error::Error;
pub use session::{AutoPrompter, Engine, NullScriptHost, ScriptHost};
