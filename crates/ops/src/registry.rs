// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

use std::collections::HashMap;

use crate::builtin;
use crate::error::OperationError;
use crate::kind;
use crate::operation::{Context, Operation};

type BackupFn = fn(&mut Operation, &mut dyn Context) -> Result<(), OperationError>;
type PerformFn = fn(&mut Operation, &mut dyn Context) -> Result<bool, OperationError>;
type UndoFn = fn(&mut Operation, &mut dyn Context) -> Result<bool, OperationError>;

/// The three functions a kind plugs into the registry with. `backup`
/// must be idempotent -- the runtime may call it more than once before
/// `perform` runs.
#[derive(Clone, Copy)]
pub struct Handlers {
    pub backup: BackupFn,
    pub perform: PerformFn,
    pub undo: UndoFn,
}

/// Process-wide registry mapping an operation kind name to its
/// handlers. Populated at engine startup, before any undo log is
/// read, so every name that might appear in a serialized log round-
/// trips to working behavior.
pub struct Registry(HashMap<&'static str, Handlers>);

impl Registry {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    pub fn register(&mut self, kind: &'static str, handlers: Handlers) {
        self.0.insert(kind, handlers);
    }

    pub fn with_builtin_operations() -> Self {
        let mut registry = Self::new();
        registry.register(kind::MKDIR, builtin::mkdir::HANDLERS);
        registry.register(kind::COPY, builtin::copy::HANDLERS);
        registry.register(kind::MOVE, builtin::move_op::HANDLERS);
        registry.register(kind::DELETE, builtin::delete::HANDLERS);
        registry.register(kind::COPY_DIRECTORY, builtin::copy_directory::HANDLERS);
        registry.register(kind::REPLACE, builtin::replace::HANDLERS);
        registry.register(kind::LINE_REPLACE, builtin::replace::LINE_HANDLERS);
        registry.register(kind::EXTRACT, builtin::extract::HANDLERS);
        registry.register(kind::GLOBAL_CONFIG, builtin::config::GLOBAL_HANDLERS);
        registry.register(kind::SETTINGS, builtin::config::SETTINGS_HANDLERS);
        registry.register(
            kind::CREATE_LOCAL_REPOSITORY,
            builtin::local_repository::HANDLERS,
        );
        registry.register(kind::CONSUME_OUTPUT, builtin::consume_output::HANDLERS);
        registry.register(kind::REGISTER_FILE_TYPE, builtin::register_file_type::HANDLERS);
        registry.register(
            kind::FAKE_STOP_PROCESS_FOR_UPDATE,
            builtin::fake_stop_process::HANDLERS,
        );
        registry.register(kind::MINIMUM_PROGRESS, builtin::minimum_progress::HANDLERS);
        registry
    }

    pub fn is_known(&self, kind: &str) -> bool {
        self.0.contains_key(kind)
    }

    fn handlers(&self, op: &Operation) -> Result<Handlers, OperationError> {
        self.0
            .get(op.name())
            .copied()
            .ok_or_else(|| OperationError::UnknownKind(op.name().to_string()))
    }

    pub fn backup(&self, op: &mut Operation, ctx: &mut dyn Context) -> Result<(), OperationError> {
        (self.handlers(op)?.backup)(op, ctx)
    }

    pub fn perform(&self, op: &mut Operation, ctx: &mut dyn Context) -> Result<bool, OperationError> {
        (self.handlers(op)?.perform)(op, ctx)
    }

    pub fn undo(&self, op: &mut Operation, ctx: &mut dyn Context) -> Result<bool, OperationError> {
        (self.handlers(op)?.undo)(op, ctx)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::with_builtin_operations()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::operation::EngineValues;

    #[test]
    fn every_builtin_kind_is_registered() {
        let registry = Registry::with_builtin_operations();
        for name in kind::ALL {
            assert!(registry.is_known(name), "{name} missing from registry");
        }
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let registry = Registry::with_builtin_operations();
        let mut op = Operation::new("NoSuchThing");
        let mut ctx = EngineValues::default();
        assert!(registry.perform(&mut op, &mut ctx).is_err());
    }
}
