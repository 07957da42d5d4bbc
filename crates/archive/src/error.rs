// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("io error reading archive: {0}")]
    Io(#[from] io::Error),

    #[error("payload layout error: {0}")]
    Layout(#[from] payload::LayoutError),

    #[error("zip error materializing directory source {0:?}: {1}")]
    Zip(PathBuf, #[source] zip::result::ZipError),

    #[error("archive is read-only, cannot open {0:?} for writing")]
    ReadOnly(PathBuf),

    #[error("archive source path does not exist: {0:?}")]
    MissingSource(PathBuf),
}
