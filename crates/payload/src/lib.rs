// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! The appended binary payload format.
//!
//! Installer and uninstaller executables carry a random-access container
//! glued to the tail of the file: metadata resource segments, per-component
//! archive segments, a component index, and a small fixed trailer anchored
//! by a magic cookie. This crate implements the reader (cookie discovery,
//! trailer parsing, component index lookup) and the writer (trailer +
//! index encoding) for that layout.

mod cookie;
mod error;
mod index;
mod io_ext;
mod layout;
mod writer;

pub use cookie::{MagicCookie, MagicMarker};
pub use error::LayoutError;
pub use index::{encode_component_index, read_component_index, ArchiveEntry, Component, ComponentIndex};
pub use layout::{open, BinaryLayout, ByteRange, Reader, MAX_COOKIE_SEARCH};
pub use writer::{write_trailer, TrailerInput};
