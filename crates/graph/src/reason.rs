// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

/// Why a component ended up scheduled for install or uninstall.
/// Carried alongside every addition so the UI can explain itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    UserSelected,
    DependencyOf(String),
    AutoDependency,
    NoLongerAutoRequired,
}
