// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

use std::fs;
use std::path::Path;

use crate::builtin::util::sibling_tempfile;
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
    let path = op
        .argument(0)
        .ok_or_else(|| OperationError::invalid("Delete", "missing path argument"))?
        .to_string();
    let stash = sibling_tempfile(Path::new(&path)).map_err(|e| OperationError::user_defined("Delete", e.to_string()))?;
    fs::rename(&path, &stash).map_err(|e| OperationError::user_defined("Delete", e.to_string()))?;
    op.set_value("_stash_path", stash.display().to_string());
    Ok(true)
}

fn undo(op: &mut Operation, _ctx: &mut dyn Context) -> Result<bool, OperationError> {
    let path = op
        .argument(0)
        .ok_or_else(|| OperationError::invalid("Delete", "missing path argument"))?
        .to_string();
    let Some(stash) = op.value("_stash_path").map(str::to_string) else {
        return Ok(true);
    };
    fs::rename(&stash, &path).map_err(|e| OperationError::user_defined("Delete", e.to_string()))?;
    Ok(true)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::operation::EngineValues;

    #[test]
    fn delete_then_undo_restores_the_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("doomed.txt");
        fs::write(&path, b"contents").unwrap();

        let mut op = Operation::with_arguments("Delete", vec![path.display().to_string()]);
        let mut ctx = EngineValues::default();

        perform(&mut op, &mut ctx).unwrap();
        assert!(!path.exists());

        undo(&mut op, &mut ctx).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"contents");
    }
}
