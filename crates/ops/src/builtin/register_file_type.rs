// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

use std::path::PathBuf;

use crate::builtin::util::{read_kv_file, write_kv_file};
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

fn associations_path(ctx: &dyn Context) -> PathBuf {
    ctx.config_root().join("file_associations.conf")
}

fn perform(op: &mut Operation, ctx: &mut dyn Context) -> Result<bool, OperationError> {
    let ext = op
        .argument(0)
        .ok_or_else(|| OperationError::invalid("RegisterFileType", "missing ext argument"))?
        .to_string();
    let command = op
        .argument(1)
        .ok_or_else(|| OperationError::invalid("RegisterFileType", "missing command argument"))?
        .to_string();

    let path = associations_path(ctx);
    let mut values = read_kv_file(&path);
    match values.insert(ext.clone(), command) {
        Some(old) => op.set_value("_oldvalue", old),
        None => op.set_value("_oldvalue_absent", "true"),
    }
    write_kv_file(&path, &values).map_err(|e| OperationError::user_defined("RegisterFileType", e.to_string()))?;
    Ok(true)
}

fn undo(op: &mut Operation, ctx: &mut dyn Context) -> Result<bool, OperationError> {
    let ext = op
        .argument(0)
        .ok_or_else(|| OperationError::invalid("RegisterFileType", "missing ext argument"))?
        .to_string();

    let path = associations_path(ctx);
    let mut values = read_kv_file(&path);
    if op.value("_oldvalue_absent") == Some("true") {
        values.remove(&ext);
    } else if let Some(old) = op.value("_oldvalue").map(str::to_string) {
        values.insert(ext, old);
    }
    write_kv_file(&path, &values).map_err(|e| OperationError::user_defined("RegisterFileType", e.to_string()))?;
    Ok(true)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::operation::EngineValues;

    #[test]
    fn registering_a_new_extension_is_fully_reverted_on_undo() {
        let tmp = tempfile::tempdir().unwrap();
        let mut op = Operation::with_arguments(
            "RegisterFileType",
            vec![".ifw-test-ext".to_string(), "notepad %1".to_string()],
        );
        let mut ctx = EngineValues::with_config_root(tmp.path().to_path_buf());

        perform(&mut op, &mut ctx).unwrap();
        assert_eq!(
            read_kv_file(&associations_path(&ctx)).get(".ifw-test-ext").map(String::as_str),
            Some("notepad %1")
        );

        undo(&mut op, &mut ctx).unwrap();
        assert!(read_kv_file(&associations_path(&ctx)).get(".ifw-test-ext").is_none());
    }
}
