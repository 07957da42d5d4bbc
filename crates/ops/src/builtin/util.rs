// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A tempfile in the same directory as `path`, so a later rename stays
/// on one filesystem. The caller owns the returned path; nothing
/// cleans it up automatically.
pub fn sibling_tempfile(path: &Path) -> io::Result<PathBuf> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."));
    let named = tempfile::Builder::new().prefix(".ops-").tempfile_in(dir)?;
    let (_file, path) = named.keep()?;
    Ok(path)
}

/// Reads a flat `key=value` settings file; a missing file is an empty
/// map, not an error.
pub fn read_kv_file(path: &Path) -> HashMap<String, String> {
    let Ok(contents) = fs::read_to_string(path) else {
        return HashMap::new();
    };
    contents
        .lines()
        .filter_map(|line| line.split_once('='))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub fn write_kv_file(path: &Path, values: &HashMap<String, String>) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut entries: Vec<_> = values.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    let body = entries.into_iter().map(|(k, v)| format!("{k}={v}\n")).collect::<String>();
    fs::write(path, body)
}
