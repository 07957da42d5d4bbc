// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

use std::fs;
use std::path::{Path, PathBuf};

use log::trace;

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
    let src = PathBuf::from(
        op.argument(0)
            .ok_or_else(|| OperationError::invalid("CopyDirectory", "missing source argument"))?,
    );
    let dst = PathBuf::from(
        op.argument(1)
            .ok_or_else(|| OperationError::invalid("CopyDirectory", "missing destination argument"))?,
    );

    let mut created = Vec::new();
    copy_recursive(&src, &dst, &mut created).map_err(|e| OperationError::user_defined("CopyDirectory", e.to_string()))?;

    let manifest = created
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join("\n");
    op.set_value("_created_files", manifest);
    Ok(true)
}

fn copy_recursive(src: &Path, dst: &Path, created: &mut Vec<PathBuf>) -> std::io::Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_recursive(&entry.path(), &target, created)?;
        } else {
            fs::copy(entry.path(), &target)?;
            trace!("copied {:?} -> {target:?}", entry.path());
            created.push(target);
        }
    }
    Ok(())
}

fn undo(op: &mut Operation, _ctx: &mut dyn Context) -> Result<bool, OperationError> {
    let Some(manifest) = op.value("_created_files").map(str::to_string) else {
        return Ok(true);
    };
    for file in manifest.lines() {
        let _ = fs::remove_file(file);
    }
    Ok(true)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::operation::EngineValues;

    #[test]
    fn copies_nested_directories_and_undo_removes_every_created_file() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("src");
        fs::create_dir_all(src.join("nested")).unwrap();
        fs::write(src.join("top.txt"), b"a").unwrap();
        fs::write(src.join("nested").join("deep.txt"), b"b").unwrap();
        let dst = tmp.path().join("dst");

        let mut op = Operation::with_arguments(
            "CopyDirectory",
            vec![src.display().to_string(), dst.display().to_string()],
        );
        let mut ctx = EngineValues::default();

        perform(&mut op, &mut ctx).unwrap();
        assert_eq!(fs::read(dst.join("top.txt")).unwrap(), b"a");
        assert_eq!(fs::read(dst.join("nested").join("deep.txt")).unwrap(), b"b");

        undo(&mut op, &mut ctx).unwrap();
        assert!(!dst.join("top.txt").exists());
        assert!(!dst.join("nested").join("deep.txt").exists());
    }
}
