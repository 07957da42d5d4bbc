// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

pub mod config;
pub mod consume_output;
pub mod copy;
pub mod copy_directory;
pub mod delete;
pub mod extract;
pub mod fake_stop_process;
pub mod local_repository;
pub mod minimum_progress;
pub mod mkdir;
pub mod move_op;
pub mod register_file_type;
pub mod replace;
mod util;
