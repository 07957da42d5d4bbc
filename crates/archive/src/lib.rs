// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! Random-access reading of per-component archives.
//!
//! An [`Archive`] is either *mounted* -- a byte range inside a shared
//! payload file handle -- or *materialized* -- a path on disk, possibly a
//! directory that is zipped lazily on first read. Neither variant is
//! writable once it has been placed in a container.

mod error;
mod materialized;
mod mounted;
mod store;

pub use error::ArchiveError;
pub use materialized::MaterializedArchive;
pub use mounted::MountedArchive;
pub use store::ArchiveStore;

use std::{io::Read, path::PathBuf};

/// A named byte blob shipped inside a component.
pub enum Archive {
    Mounted(MountedArchive),
    Materialized(MaterializedArchive),
    /// Built in memory, e.g. freshly zipped metadata not yet spilled to
    /// disk. Read-only like every other variant.
    InMemory { name: Vec<u8>, bytes: Vec<u8> },
}

impl Archive {
    pub fn name(&self) -> &[u8] {
        match self {
            Archive::Mounted(m) => &m.name,
            Archive::Materialized(m) => &m.name,
            Archive::InMemory { name, .. } => name,
        }
    }

    /// Total size of the archive's bytes, computing a lazy zip if the
    /// materialized source is a directory that hasn't been zipped yet.
    pub fn size(&mut self) -> Result<u64, ArchiveError> {
        match self {
            Archive::Mounted(m) => Ok(m.range.length),
            Archive::Materialized(m) => m.size(),
            Archive::InMemory { bytes, .. } => Ok(bytes.len() as u64),
        }
    }

    /// Open a reader over the archive's bytes.
    pub fn open(&mut self) -> Result<Box<dyn Read + '_>, ArchiveError> {
        match self {
            Archive::Mounted(m) => Ok(Box::new(m.reader())),
            Archive::Materialized(m) => Ok(Box::new(m.open()?)),
            Archive::InMemory { bytes, .. } => Ok(Box::new(std::io::Cursor::new(bytes.as_slice()))),
        }
    }

    /// Release any temp files created by a lazy directory zip.
    pub fn close(&mut self) {
        if let Archive::Materialized(m) = self {
            m.close();
        }
    }

    /// Archives are always read-only once placed in a container; this
    /// exists so callers that generically dispatch open/open_write get a
    /// typed error instead of a missing method.
    pub fn open_write(&self) -> Result<std::convert::Infallible, ArchiveError> {
        let path = match self {
            Archive::Mounted(m) => PathBuf::from(String::from_utf8_lossy(&m.name).into_owned()),
            Archive::Materialized(m) => PathBuf::from(String::from_utf8_lossy(&m.name).into_owned()),
            Archive::InMemory { name, .. } => PathBuf::from(String::from_utf8_lossy(name).into_owned()),
        };
        Err(ArchiveError::ReadOnly(path))
    }
}
