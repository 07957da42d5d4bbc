// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! Writes the maintenance tool: the installer stub plus a freshly built
//! undo log, trailer, and (empty) component index, staged as `<dest>.new`
//! pending the platform-specific rename that puts it in place of the
//! previous executable.

mod error;
mod operations_list;
mod rename;
mod writer;

pub use error::UninstallError;
pub use operations_list::{decode_operations, encode_operations};
pub use rename::PlatformRename;
pub use writer::UninstallerWriter;

#[cfg(not(windows))]
pub use rename::UnixRename;
#[cfg(windows)]
pub use rename::WindowsRename;

/// The [`PlatformRename`] appropriate for the platform this is built for.
#[cfg(not(windows))]
pub fn platform_rename() -> impl PlatformRename {
    UnixRename
}

#[cfg(windows)]
pub fn platform_rename() -> impl PlatformRename {
    WindowsRename
}
