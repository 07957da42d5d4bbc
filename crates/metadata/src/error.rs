// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid repository url: {0}")]
    Url(#[from] url::ParseError),

    #[error("malformed Updates.xml from {repo}: {source}")]
    Xml {
        repo: String,
        #[source]
        source: quick_xml::DeError,
    },

    #[error("downloading {repo}'s Updates.xml failed after retries: {message}")]
    XmlFetchExhausted { repo: String, message: String },

    #[error("downloading archives failed: {0}")]
    ArchiveFetch(String),

    #[error("extracting {archive:?} failed: {message}")]
    Extract { archive: std::path::PathBuf, message: String },

    #[error("job canceled")]
    Canceled,
}
