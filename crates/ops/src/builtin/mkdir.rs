// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

use std::fs;
use std::path::{Path, PathBuf};

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
        .ok_or_else(|| OperationError::invalid("Mkdir", "missing path argument"))?;
    let path = PathBuf::from(path);

    let mut missing = Vec::new();
    let mut cursor: Option<&Path> = Some(path.as_path());
    while let Some(p) = cursor {
        if p.exists() {
            break;
        }
        missing.push(p.to_path_buf());
        cursor = p.parent();
    }

    fs::create_dir_all(&path).map_err(|e| OperationError::user_defined("Mkdir", e.to_string()))?;

    let created = missing
        .iter()
        .rev()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join("\n");
    op.set_value("_created_dirs", created);
    Ok(true)
}

fn undo(op: &mut Operation, _ctx: &mut dyn Context) -> Result<bool, OperationError> {
    let Some(created) = op.value("_created_dirs").map(str::to_string) else {
        return Ok(true);
    };
    for dir in created.lines().rev() {
        let _ = fs::remove_dir(dir);
    }
    Ok(true)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::operation::EngineValues;

    #[test]
    fn creates_and_removes_only_dirs_it_made() {
        let tmp = tempfile::tempdir().unwrap();
        let pre_existing = tmp.path().join("already-here");
        fs::create_dir(&pre_existing).unwrap();
        let nested = pre_existing.join("a").join("b");

        let mut op = Operation::with_arguments("Mkdir", vec![nested.display().to_string()]);
        let mut ctx = EngineValues::default();

        perform(&mut op, &mut ctx).unwrap();
        assert!(nested.is_dir());

        undo(&mut op, &mut ctx).unwrap();
        assert!(!nested.exists());
        assert!(pre_existing.is_dir());
    }
}
