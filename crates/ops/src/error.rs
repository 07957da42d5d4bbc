// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

use thiserror::Error;

/// Failure kind an operation reports from `perform`/`undo`. The
/// runtime treats each kind differently: `InvalidArguments` stops the
/// current op and moves on, `UserDefined` triggers the Retry/Ignore/
/// Cancel dialog, `Fatal` aborts the whole session.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("operation {op:?} is missing or has malformed arguments: {message}")]
    InvalidArguments { op: String, message: String },

    #[error("operation {op:?} failed: {message}")]
    UserDefined { op: String, message: String },

    #[error("operation {op:?} failed fatally: {message}")]
    Fatal { op: String, message: String },

    #[error("unknown operation kind {0:?}")]
    UnknownKind(String),
}

impl OperationError {
    pub fn invalid(op: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            op: op.into(),
            message: message.into(),
        }
    }

    pub fn user_defined(op: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UserDefined {
            op: op.into(),
            message: message.into(),
        }
    }

    pub fn fatal(op: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fatal {
            op: op.into(),
            message: message.into(),
        }
    }
}
