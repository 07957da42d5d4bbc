// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

use std::path::{Path, PathBuf};

use crate::builtin::util::{read_kv_file, write_kv_file};
use crate::error::OperationError;
use crate::operation::{Context, Operation};
use crate::registry::Handlers;

pub const GLOBAL_HANDLERS: Handlers = Handlers {
    backup,
    perform: perform_global,
    undo: undo_global,
};

pub const SETTINGS_HANDLERS: Handlers = Handlers {
    backup,
    perform: perform_settings,
    undo: undo_settings,
};

fn backup(_op: &mut Operation, _ctx: &mut dyn Context) -> Result<(), OperationError> {
    Ok(())
}

fn global_config_path(ctx: &dyn Context, company: &str, app: &str) -> PathBuf {
    ctx.config_root().join(company).join(format!("{app}.conf"))
}

fn persist(op: &mut Operation, kind: &str, path: &Path, key: &str, value: &str) -> Result<bool, OperationError> {
    let mut values = read_kv_file(path);
    match values.insert(key.to_string(), value.to_string()) {
        Some(old) => op.set_value("_oldvalue", old),
        None => op.set_value("_oldvalue_absent", "true"),
    }
    write_kv_file(path, &values).map_err(|e| OperationError::user_defined(kind, e.to_string()))?;
    Ok(true)
}

fn restore(op: &mut Operation, kind: &str, path: &Path, key: &str) -> Result<bool, OperationError> {
    let mut values = read_kv_file(path);
    if op.value("_oldvalue_absent") == Some("true") {
        values.remove(key);
    } else if let Some(old) = op.value("_oldvalue").map(str::to_string) {
        values.insert(key.to_string(), old);
    }
    write_kv_file(path, &values).map_err(|e| OperationError::user_defined(kind, e.to_string()))?;
    Ok(true)
}

fn perform_global(op: &mut Operation, ctx: &mut dyn Context) -> Result<bool, OperationError> {
    let company = op
        .argument(0)
        .ok_or_else(|| OperationError::invalid("GlobalConfig", "missing company argument"))?
        .to_string();
    let app = op
        .argument(1)
        .ok_or_else(|| OperationError::invalid("GlobalConfig", "missing app argument"))?
        .to_string();
    let key = op
        .argument(2)
        .ok_or_else(|| OperationError::invalid("GlobalConfig", "missing key argument"))?
        .to_string();
    let value = op
        .argument(3)
        .ok_or_else(|| OperationError::invalid("GlobalConfig", "missing value argument"))?
        .to_string();

    let path = global_config_path(ctx, &company, &app);
    persist(op, "GlobalConfig", &path, &key, &value)
}

fn undo_global(op: &mut Operation, ctx: &mut dyn Context) -> Result<bool, OperationError> {
    let company = op.argument(0).unwrap_or_default().to_string();
    let app = op.argument(1).unwrap_or_default().to_string();
    let key = op.argument(2).unwrap_or_default().to_string();
    let path = global_config_path(ctx, &company, &app);
    restore(op, "GlobalConfig", &path, &key)
}

fn perform_settings(op: &mut Operation, _ctx: &mut dyn Context) -> Result<bool, OperationError> {
    let file = op
        .argument(0)
        .ok_or_else(|| OperationError::invalid("Settings", "missing file argument"))?
        .to_string();
    let key = op
        .argument(1)
        .ok_or_else(|| OperationError::invalid("Settings", "missing key argument"))?
        .to_string();
    let value = op
        .argument(2)
        .ok_or_else(|| OperationError::invalid("Settings", "missing value argument"))?
        .to_string();

    persist(op, "Settings", Path::new(&file), &key, &value)
}

fn undo_settings(op: &mut Operation, _ctx: &mut dyn Context) -> Result<bool, OperationError> {
    let file = op.argument(0).unwrap_or_default().to_string();
    let key = op.argument(1).unwrap_or_default().to_string();
    restore(op, "Settings", Path::new(&file), &key)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::operation::EngineValues;
    use std::fs;

    #[test]
    fn settings_snapshot_old_value_and_restore_it() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("settings.conf");
        fs::write(&file, "key=original\n").unwrap();

        let mut op = Operation::with_arguments(
            "Settings",
            vec![file.display().to_string(), "key".to_string(), "updated".to_string()],
        );
        let mut ctx = EngineValues::default();

        perform_settings(&mut op, &mut ctx).unwrap();
        assert_eq!(read_kv_file(&file).get("key").map(String::as_str), Some("updated"));

        undo_settings(&mut op, &mut ctx).unwrap();
        assert_eq!(read_kv_file(&file).get("key").map(String::as_str), Some("original"));
    }

    #[test]
    fn settings_undo_removes_a_key_that_was_absent_before() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("settings.conf");

        let mut op = Operation::with_arguments(
            "Settings",
            vec![file.display().to_string(), "brandnew".to_string(), "value".to_string()],
        );
        let mut ctx = EngineValues::default();

        perform_settings(&mut op, &mut ctx).unwrap();
        undo_settings(&mut op, &mut ctx).unwrap();
        assert!(read_kv_file(&file).get("brandnew").is_none());
    }
}
