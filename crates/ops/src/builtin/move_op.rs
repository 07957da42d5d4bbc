// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

use std::fs;

use crate::error::OperationError;
use crate::operation::{Context, Operation};
use crate::registry::Handlers;

pub const HANDLERS: Handlers = Handlers {
    backup,
    perform,
    undo,
};

fn backup(_op: &mut Operation, _ctx: &mut dyn Context) -> Result<(), OperationError> {
    Ok(())
}

fn perform(op: &mut Operation, _ctx: &mut dyn Context) -> Result<bool, OperationError> {
    let src = op
        .argument(0)
        .ok_or_else(|| OperationError::invalid("Move", "missing source argument"))?
        .to_string();
    let dst = op
        .argument(1)
        .ok_or_else(|| OperationError::invalid("Move", "missing destination argument"))?
        .to_string();

    match fs::rename(&src, &dst) {
        Ok(()) => {
            op.set_value("_cross_device", "false");
        }
        Err(_) => {
            fs::copy(&src, &dst).map_err(|e| OperationError::user_defined("Move", e.to_string()))?;
            fs::remove_file(&src).map_err(|e| OperationError::user_defined("Move", e.to_string()))?;
            op.set_value("_cross_device", "true");
        }
    }
    Ok(true)
}

fn undo(op: &mut Operation, _ctx: &mut dyn Context) -> Result<bool, OperationError> {
    let src = op
        .argument(0)
        .ok_or_else(|| OperationError::invalid("Move", "missing source argument"))?
        .to_string();
    let dst = op
        .argument(1)
        .ok_or_else(|| OperationError::invalid("Move", "missing destination argument"))?
        .to_string();

    if op.value("_cross_device") == Some("true") {
        fs::copy(&dst, &src).map_err(|e| OperationError::user_defined("Move", e.to_string()))?;
        fs::remove_file(&dst).map_err(|e| OperationError::user_defined("Move", e.to_string()))?;
    } else {
        fs::rename(&dst, &src).map_err(|e| OperationError::user_defined("Move", e.to_string()))?;
    }
    Ok(true)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::operation::EngineValues;

    #[test]
    fn move_then_undo_restores_the_source() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("a.txt");
        let dst = tmp.path().join("b.txt");
        fs::write(&src, b"contents").unwrap();

        let mut op = Operation::with_arguments("Move", vec![src.display().to_string(), dst.display().to_string()]);
        let mut ctx = EngineValues::default();

        perform(&mut op, &mut ctx).unwrap();
        assert!(!src.exists());
        assert!(dst.exists());

        undo(&mut op, &mut ctx).unwrap();
        assert!(src.exists());
        assert!(!dst.exists());
    }
}
