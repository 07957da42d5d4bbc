// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

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

fn perform(_op: &mut Operation, _ctx: &mut dyn Context) -> Result<bool, OperationError> {
    Ok(true)
}

fn undo(op: &mut Operation, _ctx: &mut dyn Context) -> Result<bool, OperationError> {
    let Some(csv) = op.argument(0) else {
        return Ok(true);
    };
    let wanted: Vec<&str> = csv.split(',').map(str::trim).filter(|s| !s.is_empty()).collect();
    if wanted.is_empty() {
        return Ok(true);
    }

    let running = running_process_names();
    let matches: Vec<&str> = wanted
        .into_iter()
        .filter(|w| running.iter().any(|r| r.eq_ignore_ascii_case(w)))
        .collect();

    if matches.is_empty() {
        Ok(true)
    } else {
        Err(OperationError::user_defined(
            "FakeStopProcessForUpdate",
            matches.join(","),
        ))
    }
}

#[cfg(target_os = "linux")]
fn running_process_names() -> Vec<String> {
    let mut names = Vec::new();
    let Ok(entries) = std::fs::read_dir("/proc") else {
        return names;
    };
    for entry in entries.flatten() {
        if entry.file_name().to_string_lossy().parse::<u32>().is_err() {
            continue;
        }
        if let Ok(comm) = std::fs::read_to_string(entry.path().join("comm")) {
            names.push(comm.trim().to_string());
        }
    }
    names
}

#[cfg(not(target_os = "linux"))]
fn running_process_names() -> Vec<String> {
    Vec::new()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::operation::EngineValues;

    #[test]
    fn no_matching_process_names_is_a_clean_undo() {
        let mut op = Operation::with_arguments(
            "FakeStopProcessForUpdate",
            vec!["definitely-not-a-real-process-name".to_string()],
        );
        let mut ctx = EngineValues::default();
        assert!(undo(&mut op, &mut ctx).unwrap());
    }
}
