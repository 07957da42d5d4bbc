// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

use ops::Operation;

/// Whether a component's install-time side effects have actually landed
/// on disk. Distinct from [`graph::CheckState`], which only tracks
/// whether the UI has the component ticked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallState {
    NotInstalled,
    Installed,
    Uninstalled,
}

/// The runtime's view of a component: everything [`graph::Component`]
/// carries for dependency resolution, plus the operation list and
/// execution flags the installer needs to actually apply it.
#[derive(Debug, Clone)]
pub struct RuntimeComponent {
    pub name: String,
    pub version: String,
    pub display_name: String,
    pub description: String,
    pub is_virtual: bool,
    pub is_forced: bool,
    pub is_essential: bool,
    pub uncompressed_size: u64,
    pub requires_admin: bool,
    pub stop_processes: Vec<String>,
    pub install_state: InstallState,
    pub operations: Vec<Operation>,
}

impl RuntimeComponent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: String::new(),
            display_name: String::new(),
            description: String::new(),
            is_virtual: false,
            is_forced: false,
            is_essential: false,
            uncompressed_size: 0,
            requires_admin: false,
            stop_processes: Vec::new(),
            install_state: InstallState::NotInstalled,
            operations: Vec::new(),
        }
    }
}
