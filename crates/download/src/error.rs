// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

use thiserror::Error;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthKind {
    Server,
    Proxy,
}

#[derive(Debug, Error)]
#[error("authentication required ({kind:?}) realm={realm:?} host={host:?}")]
pub struct AuthenticationRequiredError {
    pub kind: AuthKind,
    pub realm: Option<String>,
    pub host: Option<String>,
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("redirect loop visiting {0}")]
    RedirectLoop(Url),

    #[error(transparent)]
    AuthenticationRequired(#[from] AuthenticationRequiredError),

    #[error("checksum mismatch for {url}: expected {expected}, found {found}")]
    ChecksumMismatch {
        url: Url,
        expected: String,
        found: String,
    },

    #[error("pause is not supported for network transfers")]
    PauseNotSupported,
}
