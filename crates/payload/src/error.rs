// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("magic cookie not found in the last {searched} bytes of {0:?}", searched = .1)]
    MagicNotFound(std::path::PathBuf, u64),

    #[error("trailer arithmetic out of range at offset {offset}: {reason}")]
    CorruptTrailer { offset: u64, reason: &'static str },

    #[error("unknown magic marker value {0}")]
    UnknownMarker(i64),

    #[error("component index count mismatch: header said {expected}, trailer said {found}")]
    CorruptIndex { expected: u64, found: u64 },

    #[error("component {name:?} byte range falls outside the data block")]
    SegmentOutOfRange { name: Vec<u8> },
}
