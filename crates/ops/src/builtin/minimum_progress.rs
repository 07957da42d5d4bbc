// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

use crate::error::OperationError;
use crate::operation::{Context, Operation};
use crate::registry::Handlers;

/// Carries no filesystem effect; exists purely so a component's op
/// list always has something to report progress against even when
/// every real operation finished instantly.
pub const HANDLERS: Handlers = Handlers {
    backup,
    perform,
    undo,
};

fn backup(_op: &mut Operation, _ctx: &mut dyn Context) -> Result<(), OperationError> {
    Ok(())
}

fn perform(_op: &mut Operation, _ctx: &mut dyn Context) -> Result<bool, OperationError> {
    Ok(true)
}

fn undo(_op: &mut Operation, _ctx: &mut dyn Context) -> Result<bool, OperationError> {
    Ok(true)
}
