// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! Wires the sub-crates into the data flow `BinaryLayout` -> `ComponentGraph`
//! (+ `MetadataJob` in online mode) -> `InstallRuntime` -> `UninstallerWriter`:
//! one `Engine` per running process, the way `boulder::Env` bundles its own
//! collaborators (`config::Manager`, resolved cache/data dirs) behind a
//! single handle the CLI layer drives.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use ops::{Operation, Registry};
use runtime::{Decision, InstallRuntime, Prompter, UndoLogEntry};

use crate::components_xml::{self, ComponentDescriptor};
use crate::error::Error;

/// The component-hook script layer named out of scope: a real
/// installer runs author-supplied script callbacks to decide each
/// component's operation list. This crate defines the narrow boundary
/// and ships a no-op implementation; a production build substitutes
/// its own.
pub trait ScriptHost {
    fn operations_for(&self, component_name: &str) -> Vec<Operation>;
}

/// The script host used when nothing richer is wired in: components
/// get no generated operations, useful for tests and for `--runoperation`
/// style single-operation invocations that bypass component scripting
/// entirely.
pub struct NullScriptHost;

impl ScriptHost for NullScriptHost {
    fn operations_for(&self, _component_name: &str) -> Vec<Operation> {
        Vec::new()
    }
}

/// A decided Retry/Ignore/Cancel answer baked in ahead of time, for
/// headless runs (`--checkupdates`, automation scripts) that must never
/// block on a human.
pub struct AutoPrompter(pub Decision);

impl Prompter for AutoPrompter {
    fn ask(&self, _message: &str) -> Decision {
        self.0
    }
}

/// An open installer session: the payload, its component descriptor,
/// and the settings manager, ready to plan and run an install or
/// uninstall.
pub struct Engine {
    exe_path: PathBuf,
    layout: payload::BinaryLayout,
    store: archive::ArchiveStore,
    descriptor: ComponentDescriptor,
    registry: Registry,
    settings_manager: config::Manager,
}

impl Engine {
    /// Opens the payload appended to `exe_path` (or its companion
    /// `.dat` file), reads the component descriptor out of the first
    /// metadata resource segment, and builds the archive store over the
    /// remaining component-indexed binary segments.
    pub fn open(exe_path: impl Into<PathBuf>, program: &str) -> Result<Self, Error> {
        let exe_path = exe_path.into();
        let (mut reader, layout) = payload::open(&exe_path)?;

        let descriptor_bytes = read_first_resource(&mut reader, &layout)?;
        let descriptor = components_xml::parse(&descriptor_bytes)?;

        let store = archive::ArchiveStore::open_payload(reader, &layout)?;

        let settings_manager = if is_root() {
            config::Manager::system("/", program)
        } else {
            config::Manager::user(program).expect("user config dir unavailable")
        };

        Ok(Self {
            exe_path,
            layout,
            store,
            descriptor,
            registry: Registry::with_builtin_operations(),
            settings_manager,
        })
    }

    pub fn graph_components(&self) -> Vec<graph::Component> {
        self.descriptor.components.iter().map(|c| c.to_graph_component()).collect()
    }

    pub async fn load_settings(&self) -> config::EngineSettings {
        self.settings_manager.load().await.unwrap_or_default()
    }

    pub async fn save_settings(&self, settings: &config::EngineSettings) -> Result<(), Error> {
        self.settings_manager.save("settings", settings).await?;
        Ok(())
    }

    /// Resolves the install set from the user's checked component
    /// names and returns it in dependency-respecting install order,
    /// per `graph::install_order`.
    pub fn plan_install(&self, user_checked: &[String]) -> Result<Vec<String>, Error> {
        let components = self.graph_components();
        let set = graph::resolve_install_set(&components, user_checked)?;
        let scheduled: HashSet<String> = set.into_keys().collect();
        Ok(graph::install_order(&components, &scheduled)?)
    }

    /// Stages every planned component's archives into `work_dir`, asks
    /// `scripts` for each component's operation list, and runs them
    /// through the registry. On success, persists `packages.xml`,
    /// rewrites the component descriptor's installed flags, and writes
    /// a fresh maintenance tool at `uninstaller_path` carrying the
    /// resulting undo log.
    pub fn install(
        &mut self,
        order: &[String],
        work_dir: &Path,
        scripts: &dyn ScriptHost,
        ctx: &mut dyn ops::Context,
        prompter: &dyn Prompter,
        uninstaller_stub: &Path,
        uninstaller_path: &Path,
        packages_path: &Path,
    ) -> Result<runtime::InstallOutcome, Error> {
        let mut components = Vec::with_capacity(order.len());
        for name in order {
            let entry = self
                .descriptor
                .components
                .iter()
                .find(|c| c.name == *name)
                .expect("install_order only returns known component names");

            let mut component = entry.to_runtime_component();
            runtime::stage_component_archives(&self.store, entry.name.as_bytes(), &work_dir.join(&entry.name))?;
            component.operations = scripts.operations_for(&entry.name);
            components.push(component);
        }

        let (progress, _progress_rx) = runtime::ProgressCoordinator::new();
        let install_runtime = InstallRuntime::new(&self.registry, progress, prompter);
        let outcome = install_runtime.install(&mut components, ctx)?;

        let mut packages = runtime::packages::Packages::read(packages_path)?;
        for name in order {
            if let Some(entry) = self.descriptor.components.iter_mut().find(|c| &c.name == name) {
                entry.set_installed(true);
            }
            packages.record_installed(runtime::packages::InstalledComponent {
                name: name.clone(),
                version: components.iter().find(|c| &c.name == name).map(|c| c.version.clone()).unwrap_or_default(),
                install_date: chrono::Local::now().date_naive(),
            });
        }
        packages.persist(packages_path)?;

        let sorted = runtime::sort_by_install_order(outcome.undo_log.clone(), order);
        let bare_operations: Vec<Operation> = sorted.into_iter().map(|entry| entry.operation).collect();
        let descriptor_bytes = components_xml::to_xml(&self.descriptor)?;

        uninstall::UninstallerWriter::new(uninstaller_stub).write(
            uninstaller_path,
            &bare_operations,
            Some(descriptor_bytes.as_slice()),
        )?;

        Ok(outcome)
    }

    /// Reverses every operation recorded in this maintenance tool's own
    /// undo log, in install order reversed, coercing Cancel to Ignore --
    /// the same rollback routine `install` uses on a mid-session
    /// failure, seeded here from a persisted log instead of a fresh one.
    pub fn uninstall(&self, ctx: &mut dyn ops::Context, prompter: &dyn Prompter) -> Result<(), Error> {
        let (mut reader, layout) = payload::open(&self.exe_path)?;
        let range = layout.operations_range();
        let bytes = read_range(&mut reader, range)?;
        let operations = uninstall::decode_operations(&bytes)?;

        let mut undo_log: Vec<UndoLogEntry> = operations
            .into_iter()
            .map(|operation| UndoLogEntry { owning_component: None, operation })
            .collect();

        let (progress, _rx) = runtime::ProgressCoordinator::new();
        let install_runtime = InstallRuntime::new(&self.registry, progress, prompter);
        install_runtime.rollback(&mut undo_log, ctx);
        Ok(())
    }
}

fn is_root() -> bool {
    nix::unistd::Uid::effective().is_root()
}

fn read_first_resource(reader: &mut payload::Reader, layout: &payload::BinaryLayout) -> Result<Vec<u8>, Error> {
    let Some(range) = layout.metadata_resource_segments.first() else {
        return Err(Error::MissingComponentDescriptor);
    };
    read_range(reader, *range)
}

fn read_range(reader: &mut payload::Reader, range: payload::ByteRange) -> Result<Vec<u8>, Error> {
    use std::io::{Read, Seek, SeekFrom};

    reader.file.seek(SeekFrom::Start(range.offset))?;
    let mut buf = vec![0u8; range.length as usize];
    reader.file.read_exact(&mut buf)?;
    Ok(buf)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn null_script_host_yields_no_operations() {
        assert!(NullScriptHost.operations_for("anything").is_empty());
    }

    #[test]
    fn auto_prompter_always_answers_the_fixed_decision() {
        let prompter = AutoPrompter(Decision::Ignore);
        assert_eq!(prompter.ask("anything"), Decision::Ignore);
    }
}
