// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

use std::collections::HashMap;
use std::path::PathBuf;

/// Host-provided state operations can read and write: the engine's
/// key/value store (`ConsumeOutput` publishes its captured stdout here,
/// `GlobalConfig`/`Settings` read and write named files under here)
/// plus whatever admin-rights bookkeeping the runtime layers on top.
pub trait Context {
    fn set_engine_value(&mut self, key: &str, value: String);
    fn engine_value(&self, key: &str) -> Option<&str>;

    /// Base directory for host-wide settings files (`GlobalConfig`,
    /// `RegisterFileType`). Defaults to the OS config directory;
    /// override to redirect built-in operations elsewhere, e.g. a
    /// scratch directory in tests.
    fn config_root(&self) -> PathBuf {
        dirs::config_dir().unwrap_or_else(|| PathBuf::from("."))
    }
}

/// A minimal in-memory [`Context`], used directly by simple callers and
/// by tests; the runtime crate wraps a richer context around the same
/// trait.
#[derive(Debug, Default)]
pub struct EngineValues {
    values: HashMap<String, String>,
    config_root: Option<PathBuf>,
}

impl EngineValues {
    /// Redirects `config_root()` away from the real OS config
    /// directory, e.g. to a tempdir in tests.
    pub fn with_config_root(config_root: PathBuf) -> Self {
        Self {
            values: HashMap::new(),
            config_root: Some(config_root),
        }
    }
}

impl Context for EngineValues {
    fn set_engine_value(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value);
    }

    fn engine_value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    fn config_root(&self) -> PathBuf {
        self.config_root
            .clone()
            .unwrap_or_else(|| dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")))
    }
}

/// One entry in an install or undo log. Every operation kind shares the
/// same shape -- a name plus a flat argument list and a named-value
/// bag -- and is given meaning only by the registry's dispatch on
/// `name`. Keys starting with `_` are private backup state a kind
/// stashes in `backup()` for its own `undo()` to consume; they are not
/// part of the kind's declared arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Operation {
    name: String,
    arguments: Vec<String>,
    named_values: HashMap<String, String>,
    essential: bool,
}

impl Operation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: Vec::new(),
            named_values: HashMap::new(),
            essential: false,
        }
    }

    pub fn with_arguments(name: impl Into<String>, arguments: Vec<String>) -> Self {
        let mut op = Self::new(name);
        op.arguments = arguments;
        op
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    pub fn set_arguments(&mut self, arguments: Vec<String>) {
        self.arguments = arguments;
    }

    pub fn argument(&self, index: usize) -> Option<&str> {
        self.arguments.get(index).map(String::as_str)
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.named_values.get(key).map(String::as_str)
    }

    pub fn set_value(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.named_values.insert(key.into(), value.into());
    }

    pub fn remove_value(&mut self, key: &str) -> Option<String> {
        self.named_values.remove(key)
    }

    pub fn named_values(&self) -> &HashMap<String, String> {
        &self.named_values
    }

    pub fn essential(&self) -> bool {
        self.essential
    }

    pub fn set_essential(&mut self, essential: bool) {
        self.essential = essential;
    }
}
