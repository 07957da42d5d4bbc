// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

use std::process::Command;

use retry::delay::Fixed;
use retry::retry;

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

fn run_once(exe: &str, args: &[String]) -> Result<String, String> {
    let output = Command::new(exe).args(args).output().map_err(|e| e.to_string())?;
    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if stdout.is_empty() {
        Err("process produced no output".to_string())
    } else {
        Ok(stdout)
    }
}

fn perform(op: &mut Operation, ctx: &mut dyn Context) -> Result<bool, OperationError> {
    let key = op
        .argument(0)
        .ok_or_else(|| OperationError::invalid("ConsumeOutput", "missing key argument"))?
        .to_string();
    let exe = op
        .argument(1)
        .ok_or_else(|| OperationError::invalid("ConsumeOutput", "missing exe argument"))?
        .to_string();
    let extra_args: Vec<String> = op.arguments().get(2..).unwrap_or_default().to_vec();

    let stdout = retry(Fixed::from_millis(500).take(3), || run_once(&exe, &extra_args))
        .unwrap_or_default();

    ctx.set_engine_value(&key, stdout);
    Ok(true)
}

fn undo(_op: &mut Operation, _ctx: &mut dyn Context) -> Result<bool, OperationError> {
    Ok(true)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::operation::EngineValues;

    #[test]
    fn captures_stdout_onto_the_engine_key() {
        let mut op = Operation::with_arguments(
            "ConsumeOutput",
            vec!["greeting".to_string(), "echo".to_string(), "hello".to_string()],
        );
        let mut ctx = EngineValues::default();
        perform(&mut op, &mut ctx).unwrap();
        assert_eq!(ctx.engine_value("greeting"), Some("hello"));
    }
}
