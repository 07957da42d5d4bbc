// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

use std::collections::BTreeSet;

use crate::decision::{Decision, Prompter};
use crate::error::RuntimeError;

/// Collects the union of every scheduled component's `stop_processes`,
/// polls for matching running processes, and prompts Retry/Ignore/
/// Cancel if any are found. Retry re-polls; Ignore proceeds anyway;
/// Cancel surfaces [`RuntimeError::ProcessesRunning`].
pub fn stop_processes_for_updates(wanted: &BTreeSet<String>, prompter: &dyn Prompter) -> Result<(), RuntimeError> {
    if wanted.is_empty() {
        return Ok(());
    }

    loop {
        let running = running_process_names();
        let matches: Vec<&String> = wanted.iter().filter(|w| running.iter().any(|r| r.eq_ignore_ascii_case(w))).collect();

        if matches.is_empty() {
            return Ok(());
        }

        let names = matches.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(", ");
        match prompter.ask(&format!("the following processes must be closed before continuing: {names}")) {
            Decision::Retry => continue,
            Decision::Ignore => return Ok(()),
            Decision::Cancel => return Err(RuntimeError::ProcessesRunning(names)),
        }
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
    use crate::decision::FixedPrompter;

    #[test]
    fn no_wanted_processes_is_an_immediate_no_op() {
        let prompter = FixedPrompter(Decision::Cancel);
        assert!(stop_processes_for_updates(&BTreeSet::new(), &prompter).is_ok());
    }

    #[test]
    fn nonexistent_process_name_never_blocks() {
        let mut wanted = BTreeSet::new();
        wanted.insert("definitely-not-a-real-process-name".to_string());
        let prompter = FixedPrompter(Decision::Cancel);
        assert!(stop_processes_for_updates(&wanted, &prompter).is_ok());
    }
}
