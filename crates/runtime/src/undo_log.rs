// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

use ops::Operation;

/// One entry appended to the undo log. `owning_component` is `None` for
/// the handful of pseudo-operations the runtime itself appends (e.g. a
/// future global cleanup step) rather than a specific component.
#[derive(Debug, Clone)]
pub struct UndoLogEntry {
    pub owning_component: Option<String>,
    pub operation: Operation,
}

/// Persists the log in dependency order of owning components --
/// components with no owner first, then every other entry ordered by
/// `install_order`'s position -- so a naive reverse walk during
/// uninstall undoes children before the parents they depended on.
pub fn sort_by_install_order(entries: Vec<UndoLogEntry>, install_order: &[String]) -> Vec<UndoLogEntry> {
    let position = |name: &str| install_order.iter().position(|n| n == name);

    let mut owned: Vec<UndoLogEntry> = Vec::new();
    let mut unowned: Vec<UndoLogEntry> = Vec::new();
    for entry in entries {
        match &entry.owning_component {
            Some(_) => owned.push(entry),
            None => unowned.push(entry),
        }
    }

    owned.sort_by_key(|entry| {
        entry
            .owning_component
            .as_deref()
            .and_then(position)
            .unwrap_or(usize::MAX)
    });

    unowned.into_iter().chain(owned).collect()
}

#[cfg(test)]
mod test {
    use super::*;

    fn entry(owner: Option<&str>, op_name: &str) -> UndoLogEntry {
        UndoLogEntry {
            owning_component: owner.map(str::to_string),
            operation: Operation::new(op_name),
        }
    }

    #[test]
    fn unowned_entries_come_first_then_owned_ones_in_install_order() {
        let entries = vec![entry(Some("b"), "Mkdir"), entry(None, "MinimumProgress"), entry(Some("a"), "Copy")];
        let sorted = sort_by_install_order(entries, &["a".to_string(), "b".to_string()]);

        assert_eq!(sorted[0].owning_component, None);
        assert_eq!(sorted[1].owning_component, Some("a".to_string()));
        assert_eq!(sorted[2].owning_component, Some("b".to_string()));
    }
}
