// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

use thiserror::Error;

#[derive(Debug, Error, Clone)]
#[error("{message}")]
pub struct FileTaskError {
    pub message: String,
}

impl FileTaskError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for FileTaskError {
    fn from(e: std::io::Error) -> Self {
        Self::new(e.to_string())
    }
}
