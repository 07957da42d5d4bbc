// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

use thiserror::Error;

/// Errors raised while assembling the component tree or resolving an
/// install/uninstall set.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("component {wanted:?} depends on {dependency:?}, which is not present in the component set")]
    UnresolvedDependency { wanted: String, dependency: String },

    #[error("dependency cycle between {a:?} and {b:?}")]
    DependencyCycle { a: String, b: String },

    #[error("recursive dependency chain detected at {0:?}")]
    Recursion(String),
}
