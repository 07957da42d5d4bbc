// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum UninstallError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("reading stub payload: {0}")]
    Layout(#[from] payload::LayoutError),

    #[error("serializing operation: {0}")]
    Operation(#[from] ops::OperationError),

    #[error("truncated operation list")]
    TruncatedOperationList,

    #[error("operation list count mismatch: header said {expected}, trailer said {found}")]
    CorruptOperationList { expected: u64, found: u64 },
}
