// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

use thiserror::Error;

/// Aggregates every sub-crate's own error type behind one `?`-friendly
/// enum, the way `boulder::cli::Error` aggregates `build::Error`,
/// `profile::Error`, `env::Error` and so on. Exit-code mapping lives in
/// [`exit_code`], not on the variants themselves.
#[derive(Debug, Error)]
pub enum Error {
    #[error("component graph error: {0}")]
    Graph(#[from] graph::GraphError),

    #[error("operation error: {0}")]
    Operation(#[from] ops::OperationError),

    #[error("{0}")]
    Runtime(#[from] runtime::RuntimeError),

    #[error("uninstaller writer error: {0}")]
    Uninstall(#[from] uninstall::UninstallError),

    #[error("payload layout error: {0}")]
    Layout(#[from] payload::LayoutError),

    #[error("archive error: {0}")]
    Archive(#[from] archive::ArchiveError),

    #[error("metadata fetch error: {0}")]
    Metadata(#[from] metadata::MetadataError),

    #[error("saving engine settings: {0}")]
    SaveSettings(#[from] config::SaveError),

    #[error("malformed components.xml: {0}")]
    ComponentsXml(#[from] quick_xml::DeError),

    #[error("serializing components.xml: {0}")]
    ComponentsXmlWrite(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no local component descriptor found in the payload's first metadata resource")]
    MissingComponentDescriptor,

    #[error("the user canceled")]
    Canceled,
}

impl Error {
    /// Maps onto the exit codes a running installer/uninstaller binary
    /// returns: 2 for a user cancellation, 1 for everything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Canceled => 2,
            Error::Runtime(runtime::RuntimeError::Canceled { .. }) => 2,
            Error::Metadata(metadata::MetadataError::Canceled) => 2,
            _ => 1,
        }
    }
}
