// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! The names the registry dispatches on. An [`crate::Operation`] carries
//! one of these as its `name()`; the registry maps it back to the
//! built-in backup/perform/undo functions in [`crate::builtin`].

pub const MKDIR: &str = "Mkdir";
pub const COPY: &str = "Copy";
pub const MOVE: &str = "Move";
pub const DELETE: &str = "Delete";
pub const COPY_DIRECTORY: &str = "CopyDirectory";
pub const REPLACE: &str = "Replace";
pub const LINE_REPLACE: &str = "LineReplace";
pub const EXTRACT: &str = "Extract";
pub const GLOBAL_CONFIG: &str = "GlobalConfig";
pub const SETTINGS: &str = "Settings";
pub const CREATE_LOCAL_REPOSITORY: &str = "CreateLocalRepository";
pub const CONSUME_OUTPUT: &str = "ConsumeOutput";
pub const REGISTER_FILE_TYPE: &str = "RegisterFileType";
pub const FAKE_STOP_PROCESS_FOR_UPDATE: &str = "FakeStopProcessForUpdate";
pub const MINIMUM_PROGRESS: &str = "MinimumProgress";

pub const ALL: &[&str] = &[
    MKDIR,
    COPY,
    MOVE,
    DELETE,
    COPY_DIRECTORY,
    REPLACE,
    LINE_REPLACE,
    EXTRACT,
    GLOBAL_CONFIG,
    SETTINGS,
    CREATE_LOCAL_REPOSITORY,
    CONSUME_OUTPUT,
    REGISTER_FILE_TYPE,
    FAKE_STOP_PROCESS_FOR_UPDATE,
    MINIMUM_PROGRESS,
];
