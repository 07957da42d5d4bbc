// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! Argument shape: one flat set of flags selecting a headless mode,
//! mirroring the way `boulder::cli::Global` carries shared options
//! alongside its own subcommand -- except here the flags themselves
//! pick the mode, the same shape the framework's real `installer`/
//! `uninstaller`/`maintenancetool` binaries take.

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use url::Url;

#[derive(Debug, Parser)]
#[command(name = "installer", version, about = "Installer framework command line front end")]
pub struct Cli {
    /// Headless update check: exit 0 if updates are available, 1 otherwise.
    #[arg(long = "checkupdates")]
    pub check_updates: bool,

    /// Invoke one registered operation directly: NAME followed by its arguments.
    #[arg(long = "runoperation", num_args = 1.., value_name = "NAME ARGS")]
    pub run_operation: Option<Vec<String>>,

    /// Undo one registered operation directly: NAME followed by its arguments.
    #[arg(long = "undooperation", num_args = 1.., value_name = "NAME ARGS")]
    pub undo_operation: Option<Vec<String>>,

    /// Embed a new installer stub into this binary and self-replace.
    #[arg(long = "update-installerbase", value_name = "PATH")]
    pub update_installerbase: Option<PathBuf>,

    /// Emit a local repository synthesized from an installer's payload.
    #[arg(long = "dump-binary-data")]
    pub dump_binary_data: bool,

    #[arg(short = 'o', value_name = "OUT", requires = "dump_binary_data")]
    pub dump_out: Option<PathBuf>,

    #[arg(short = 'i', value_name = "IN", requires = "dump_binary_data")]
    pub dump_in: Option<PathBuf>,

    /// Read the appended payload from PATH instead of argv[0].
    #[arg(long = "binarydatafile", value_name = "PATH")]
    pub binary_data_file: Option<PathBuf>,

    #[arg(long = "addRepository", value_delimiter = ',', value_name = "URL,URL,...")]
    pub add_repository: Vec<Url>,

    #[arg(long = "addTempRepository", value_delimiter = ',', value_name = "URL,URL,...")]
    pub add_temp_repository: Vec<Url>,

    #[arg(long = "setTempRepository", value_delimiter = ',', value_name = "URL,URL,...")]
    pub set_temp_repository: Vec<Url>,

    /// Load an automation script; equivalent to the trailing `Script=PATH`.
    #[arg(long = "script", value_name = "PATH")]
    pub script: Option<PathBuf>,

    #[arg(long = "no-force-installations")]
    pub no_force_installations: bool,

    /// Emit a repository next to the installation for later offline updates.
    #[arg(long = "create-offline-repository")]
    pub create_offline_repository: bool,

    #[arg(short = 'v', long = "verbose", global = true, action = ArgAction::SetTrue)]
    pub verbose: bool,

    /// Serve the elevated-filesystem RPC; spawned internally, not user-facing.
    #[arg(long = "startserver", num_args = 2, value_names = ["PORT", "KEY"], hide = true)]
    pub start_server: Option<Vec<String>>,

    /// Trailing `KEY=VALUE` pairs, fed into the engine's key/value store.
    /// `Script=PATH` is recognized here too, equivalent to `--script`.
    #[arg(value_name = "KEY=VALUE", action = ArgAction::Append)]
    pub key_values: Vec<String>,
}

impl Cli {
    pub fn script_path(&self) -> Option<PathBuf> {
        self.script.clone().or_else(|| {
            self.key_values.iter().find_map(|kv| {
                let (key, value) = kv.split_once('=')?;
                (key == "Script").then(|| PathBuf::from(value))
            })
        })
    }
}
