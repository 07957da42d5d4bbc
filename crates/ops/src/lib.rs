// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! The install/uninstall operation contract: a generic [`Operation`]
//! envelope (name, arguments, named values) dispatched through a
//! [`Registry`] of built-in kinds. Operations serialize to the XML
//! form the undo log stores alongside each entry's `varbytes op_name`.

mod builtin;
mod error;
mod kind;
mod operation;
mod registry;
mod xml;

pub use error::OperationError;
pub use kind::ALL as KIND_NAMES;
pub use kind::*;
pub use operation::{Context, EngineValues, Operation};
pub use registry::{Handlers, Registry};
pub use xml::{from_xml, to_xml};
