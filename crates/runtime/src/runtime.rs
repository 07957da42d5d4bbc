// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

use std::collections::BTreeSet;

use ops::{Context, Operation, OperationError, Registry};

use crate::admin::AdminRights;
use crate::component::RuntimeComponent;
use crate::decision::{Decision, Prompter};
use crate::error::RuntimeError;
use crate::progress::{Event, ProgressCoordinator};
use crate::stop_processes::stop_processes_for_updates;
use crate::undo_log::UndoLogEntry;

/// The name the runtime gives the marker entry it appends once a
/// component's real operations have all completed -- not a registered
/// operation kind, so [`Registry::is_known`] reports it unknown and
/// rollback skips straight past it without calling `undo`.
pub const REGISTER_FOR_UNINSTALLATION: &str = "RegisterForUninstallation";

/// What an `install()` call produced: the undo log to persist (handed
/// to the uninstaller writer) and whether any essential operation fired.
pub struct InstallOutcome {
    pub undo_log: Vec<UndoLogEntry>,
    pub hard_restart_required: bool,
}

/// `decide`'s answer once Cancel has already been turned into an `Err`
/// -- narrower than [`Decision`] so the call sites that loop on it don't
/// need an unreachable `Cancel` arm.
enum Retryable {
    Retry,
    Ignore,
}

/// Drives the install list through the operation registry: per-component
/// admin elevation, backup/perform with Retry/Ignore/Cancel, and
/// reverse-order rollback of the current session's own undo entries on
/// any failure. Holds no state of its own across calls besides the
/// admin-rights reference count.
pub struct InstallRuntime<'a> {
    registry: &'a Registry,
    progress: ProgressCoordinator,
    admin: AdminRights,
    prompter: &'a dyn Prompter,
}

impl<'a> InstallRuntime<'a> {
    pub fn new(registry: &'a Registry, progress: ProgressCoordinator, prompter: &'a dyn Prompter) -> Self {
        Self {
            registry,
            progress,
            admin: AdminRights::new(),
            prompter,
        }
    }

    /// Runs every component's operations in the order given (already a
    /// dependency-respecting install order from `graph::install_order`).
    /// On any unrecoverable failure, every entry appended to the undo
    /// log during this call is undone, in reverse, before the error is
    /// returned.
    pub fn install(&self, components: &mut [RuntimeComponent], ctx: &mut dyn Context) -> Result<InstallOutcome, RuntimeError> {
        for component in components.iter() {
            self.begin_installation(component);
        }

        let wanted: BTreeSet<String> = components.iter().flat_map(|c| c.stop_processes.iter().cloned()).collect();
        stop_processes_for_updates(&wanted, self.prompter)?;

        let mut undo_log = Vec::new();
        for component in components.iter_mut() {
            if let Err(err) = self.install_component(component, ctx, &mut undo_log) {
                self.progress.report(Event::RollbackStarted);
                self.rollback(&mut undo_log, ctx);
                return Err(err);
            }
        }

        let hard_restart_required = undo_log.iter().any(|entry| entry.operation.essential());
        Ok(InstallOutcome { undo_log, hard_restart_required })
    }

    fn begin_installation(&self, component: &RuntimeComponent) {
        self.progress.report(Event::Message(format!("preparing {}", component.name)));
    }

    fn install_component(
        &self,
        component: &mut RuntimeComponent,
        ctx: &mut dyn Context,
        undo_log: &mut Vec<UndoLogEntry>,
    ) -> Result<(), RuntimeError> {
        self.progress.report(Event::ComponentStarted { name: component.name.clone() });

        // Elevation is scoped to the component: every operation it owns
        // runs under one elevation, released the moment the component
        // finishes unless the next component needs it too (the count
        // never drops to zero between them in that case).
        let _guard = component.requires_admin.then(|| self.admin.gain());

        for op in component.operations.iter_mut() {
            if self.run_one_operation(&component.name, op, ctx)? {
                undo_log.push(UndoLogEntry {
                    owning_component: Some(component.name.clone()),
                    operation: op.clone(),
                });
            }
        }

        if !component.stop_processes.is_empty() {
            let marker = Operation::with_arguments(ops::FAKE_STOP_PROCESS_FOR_UPDATE, vec![component.stop_processes.join(",")]);
            undo_log.push(UndoLogEntry {
                owning_component: Some(component.name.clone()),
                operation: marker,
            });
        }

        undo_log.push(UndoLogEntry {
            owning_component: Some(component.name.clone()),
            operation: Operation::with_arguments(REGISTER_FOR_UNINSTALLATION, vec![component.name.clone(), component.version.clone()]),
        });

        self.progress.report(Event::ComponentFinished { name: component.name.clone() });
        Ok(())
    }

    /// Runs one operation's backup then perform step, with the
    /// Retry/Ignore/Cancel dialog policy on `UserDefined` failures.
    /// Returns whether the operation actually completed -- `Ignore`
    /// skips it without adding it to the undo log, since there is
    /// nothing to undo for an operation that never ran.
    fn run_one_operation(&self, component_name: &str, op: &mut Operation, ctx: &mut dyn Context) -> Result<bool, RuntimeError> {
        self.progress.report(Event::OperationStarted {
            component: component_name.to_string(),
            operation: op.name().to_string(),
        });

        loop {
            match self.registry.backup(op, ctx) {
                Ok(()) => break,
                Err(err) => match self.decide(component_name, op.name(), err)? {
                    Retryable::Retry => continue,
                    Retryable::Ignore => return Ok(false),
                },
            }
        }

        let performed = loop {
            match self.registry.perform(op, ctx) {
                Ok(done) => break done,
                Err(err) => match self.decide(component_name, op.name(), err)? {
                    Retryable::Retry => continue,
                    Retryable::Ignore => break false,
                },
            }
        };

        self.progress.report(Event::OperationFinished {
            component: component_name.to_string(),
            operation: op.name().to_string(),
        });

        Ok(performed)
    }

    /// Classifies an operation failure and, for the retryable kind,
    /// blocks on the prompter. `InvalidArguments`/`Fatal` never reach
    /// the user -- they indicate a malformed install list, not a
    /// transient condition a retry could fix.
    fn decide(&self, component_name: &str, op_name: &str, err: OperationError) -> Result<Retryable, RuntimeError> {
        match err {
            OperationError::UserDefined { message, .. } => {
                match self.prompter.ask(&format!("{component_name}: {op_name} failed: {message}")) {
                    Decision::Retry => Ok(Retryable::Retry),
                    Decision::Ignore => Ok(Retryable::Ignore),
                    Decision::Cancel => Err(RuntimeError::Canceled {
                        component: component_name.to_string(),
                        op: op_name.to_string(),
                        message,
                    }),
                }
            }
            other => Err(RuntimeError::Canceled {
                component: component_name.to_string(),
                op: op_name.to_string(),
                message: other.to_string(),
            }),
        }
    }

    /// Undoes every entry appended to `undo_log` during the current
    /// session, in reverse order, coercing Cancel to Ignore throughout
    /// -- rollback itself must run to completion. Entries from a prior
    /// session, and pseudo-operations the registry doesn't know, are
    /// left untouched.
    pub fn rollback(&self, undo_log: &mut Vec<UndoLogEntry>, ctx: &mut dyn Context) {
        while let Some(entry) = undo_log.pop() {
            if !self.registry.is_known(entry.operation.name()) {
                continue;
            }
            let mut op = entry.operation;
            loop {
                match self.registry.undo(&mut op, ctx) {
                    Ok(_) => break,
                    Err(err) => {
                        let component = entry.owning_component.as_deref().unwrap_or("<unowned>");
                        match self.prompter.ask(&format!("{component}: undoing {} failed: {err}", op.name())) {
                            Decision::Retry => continue,
                            Decision::Ignore | Decision::Cancel => break,
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use ops::EngineValues;

    fn succeeding_component(name: &str) -> RuntimeComponent {
        let mut component = RuntimeComponent::new(name);
        component.version = "1.0.0".to_string();
        component.operations.push(Operation::new(ops::MINIMUM_PROGRESS));
        component
    }

    #[test]
    fn install_runs_every_component_and_records_register_markers() {
        let registry = Registry::with_builtin_operations();
        let (progress, _rx) = ProgressCoordinator::new();
        let prompter = crate::decision::FixedPrompter(Decision::Cancel);
        let runtime = InstallRuntime::new(&registry, progress, &prompter);

        let mut components = vec![succeeding_component("a"), succeeding_component("b")];
        let mut ctx = EngineValues::default();

        let outcome = runtime.install(&mut components, &mut ctx).unwrap();
        let markers: Vec<&str> = outcome
            .undo_log
            .iter()
            .filter(|e| e.operation.name() == REGISTER_FOR_UNINSTALLATION)
            .map(|e| e.owning_component.as_deref().unwrap())
            .collect();
        assert_eq!(markers, vec!["a", "b"]);
        assert!(!outcome.hard_restart_required);
    }

    #[test]
    fn a_canceled_component_rolls_back_everything_done_so_far() {
        let registry = Registry::with_builtin_operations();
        let (progress, _rx) = ProgressCoordinator::new();
        let prompter = crate::decision::FixedPrompter(Decision::Cancel);
        let runtime = InstallRuntime::new(&registry, progress, &prompter);

        let mut failing = RuntimeComponent::new("broken");
        failing.operations = vec![Operation::new("NoSuchOperation")];

        let mut components = vec![succeeding_component("a"), failing];
        let mut ctx = EngineValues::default();

        let err = runtime.install(&mut components, &mut ctx).unwrap_err();
        assert!(matches!(err, RuntimeError::Canceled { .. }));
    }
}
