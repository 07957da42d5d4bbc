// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! Cancelable, pausable, progress-reporting file tasks. A task is driven
//! by a [`TaskHandle`] supplied by its caller rather than owning its own
//! cancellation state, so a coordinator elsewhere in the process can
//! cancel or pause a task pool it did not itself construct.

mod copy;
mod error;
mod handle;

pub use copy::{path_after_cancel_is_hidden, CopyFileTask, FileTaskResult, BLOCK_SIZE};
pub use error::FileTaskError;
pub use handle::{Handle, Progress, TaskHandle};
