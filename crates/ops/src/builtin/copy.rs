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

fn backup(op: &mut Operation, _ctx: &mut dyn Context) -> Result<(), OperationError> {
    if op.value("_backup_of_existing_destination").is_some() {
        return Ok(());
    }
    let dst = op
        .argument(1)
        .ok_or_else(|| OperationError::invalid("Copy", "missing destination argument"))?
        .to_string();
    let dst_path = Path::new(&dst);
    if dst_path.exists() {
        let stash = sibling_tempfile(dst_path).map_err(|e| OperationError::user_defined("Copy", e.to_string()))?;
        fs::copy(dst_path, &stash).map_err(|e| OperationError::user_defined("Copy", e.to_string()))?;
        op.set_value("_backup_of_existing_destination", stash.display().to_string());
    }
    Ok(())
}

fn perform(op: &mut Operation, _ctx: &mut dyn Context) -> Result<bool, OperationError> {
    let src = op
        .argument(0)
        .ok_or_else(|| OperationError::invalid("Copy", "missing source argument"))?;
    let dst = op
        .argument(1)
        .ok_or_else(|| OperationError::invalid("Copy", "missing destination argument"))?;
    fs::copy(src, dst).map_err(|e| OperationError::user_defined("Copy", e.to_string()))?;
    Ok(true)
}

fn undo(op: &mut Operation, _ctx: &mut dyn Context) -> Result<bool, OperationError> {
    let dst = op
        .argument(1)
        .ok_or_else(|| OperationError::invalid("Copy", "missing destination argument"))?
        .to_string();
    if let Some(backup) = op.value("_backup_of_existing_destination").map(str::to_string) {
        fs::rename(&backup, &dst).or_else(|_| fs::copy(&backup, &dst).map(|_| ()).and_then(|_| fs::remove_file(&backup)))
            .map_err(|e| OperationError::user_defined("Copy", e.to_string()))?;
    } else {
        let _ = fs::remove_file(&dst);
    }
    Ok(true)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::operation::EngineValues;

    #[test]
    fn backup_then_undo_restores_pre_existing_destination() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("src.txt");
        let dst = tmp.path().join("dst.txt");
        fs::write(&src, b"new").unwrap();
        fs::write(&dst, b"old").unwrap();

        let mut op = Operation::with_arguments("Copy", vec![src.display().to_string(), dst.display().to_string()]);
        let mut ctx = EngineValues::default();

        backup(&mut op, &mut ctx).unwrap();
        perform(&mut op, &mut ctx).unwrap();
        assert_eq!(fs::read(&dst).unwrap(), b"new");

        undo(&mut op, &mut ctx).unwrap();
        assert_eq!(fs::read(&dst).unwrap(), b"old");
    }

    #[test]
    fn undo_deletes_copy_when_destination_did_not_pre_exist() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("src.txt");
        let dst = tmp.path().join("dst.txt");
        fs::write(&src, b"new").unwrap();

        let mut op = Operation::with_arguments("Copy", vec![src.display().to_string(), dst.display().to_string()]);
        let mut ctx = EngineValues::default();

        backup(&mut op, &mut ctx).unwrap();
        perform(&mut op, &mut ctx).unwrap();
        undo(&mut op, &mut ctx).unwrap();
        assert!(!dst.exists());
    }
}
