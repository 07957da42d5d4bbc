// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

use std::fs;

use crate::error::OperationError;
use crate::operation::{Context, Operation};
use crate::registry::Handlers;

/// In-place substring replace. Undo is a deliberate no-op: there's no
/// reliable way to invert an arbitrary text substitution once other
/// edits may have touched the same file.
pub const HANDLERS: Handlers = Handlers {
    backup,
    perform: perform_text,
    undo: undo_noop,
};

/// In-place whole-line replace, matched by substring containment.
/// Shares the same no-undo policy as `Replace`.
pub const LINE_HANDLERS: Handlers = Handlers {
    backup,
    perform: perform_line,
    undo: undo_noop,
};

fn backup(_op: &mut Operation, _ctx: &mut dyn Context) -> Result<(), OperationError> {
    Ok(())
}

fn args(op: &Operation, kind: &str) -> Result<(&str, &str, &str), OperationError> {
    let file = op
        .argument(0)
        .ok_or_else(|| OperationError::invalid(kind, "missing file argument"))?;
    let pattern = op
        .argument(1)
        .ok_or_else(|| OperationError::invalid(kind, "missing pattern argument"))?;
    let replacement = op
        .argument(2)
        .ok_or_else(|| OperationError::invalid(kind, "missing replacement argument"))?;
    Ok((file, pattern, replacement))
}

fn perform_text(op: &mut Operation, _ctx: &mut dyn Context) -> Result<bool, OperationError> {
    let (file, pattern, replacement) = args(op, "Replace")?;
    let contents = fs::read_to_string(file).map_err(|e| OperationError::user_defined("Replace", e.to_string()))?;
    let replaced = contents.replace(pattern, replacement);
    fs::write(file, replaced).map_err(|e| OperationError::user_defined("Replace", e.to_string()))?;
    Ok(true)
}

fn perform_line(op: &mut Operation, _ctx: &mut dyn Context) -> Result<bool, OperationError> {
    let (file, pattern, replacement) = args(op, "LineReplace")?;
    let contents = fs::read_to_string(file).map_err(|e| OperationError::user_defined("LineReplace", e.to_string()))?;
    let trailing_newline = contents.ends_with('\n');

    let replaced: Vec<&str> = contents
        .lines()
        .map(|line| if line.contains(pattern) { replacement } else { line })
        .collect();
    let mut out = replaced.join("\n");
    if trailing_newline {
        out.push('\n');
    }

    fs::write(file, out).map_err(|e| OperationError::user_defined("LineReplace", e.to_string()))?;
    Ok(true)
}

fn undo_noop(_op: &mut Operation, _ctx: &mut dyn Context) -> Result<bool, OperationError> {
    Ok(true)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::operation::EngineValues;

    #[test]
    fn replace_substitutes_every_occurrence() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        fs::write(tmp.path(), "foo bar foo").unwrap();
        let mut op = Operation::with_arguments(
            "Replace",
            vec![tmp.path().display().to_string(), "foo".to_string(), "baz".to_string()],
        );
        let mut ctx = EngineValues::default();
        perform_text(&mut op, &mut ctx).unwrap();
        assert_eq!(fs::read_to_string(tmp.path()).unwrap(), "baz bar baz");
    }

    #[test]
    fn line_replace_swaps_whole_matching_lines() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        fs::write(tmp.path(), "keep\nversion=1.0\nkeep\n").unwrap();
        let mut op = Operation::with_arguments(
            "LineReplace",
            vec![
                tmp.path().display().to_string(),
                "version=".to_string(),
                "version=2.0".to_string(),
            ],
        );
        let mut ctx = EngineValues::default();
        perform_line(&mut op, &mut ctx).unwrap();
        assert_eq!(fs::read_to_string(tmp.path()).unwrap(), "keep\nversion=2.0\nkeep\n");
    }
}
