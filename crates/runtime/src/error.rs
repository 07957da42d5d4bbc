// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("{component}: operation {op} failed and the user canceled: {message}")]
    Canceled { component: String, op: String, message: String },

    #[error("{0} still running, aborting update")]
    ProcessesRunning(String),

    #[error("component graph error: {0}")]
    Graph(#[from] graph::GraphError),

    #[error("unknown operation kind {0:?}")]
    UnknownOperation(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed packages.xml: {0}")]
    Xml(String),

    #[error("serializing packages.xml: {0}")]
    XmlWrite(String),
}
