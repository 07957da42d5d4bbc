// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

use std::io;
use std::path::{Path, PathBuf};

use archive::ArchiveStore;
use fs_err as fs;

/// Extracts every archive shipped for `component_name` into
/// `dest_dir/<archive name>`, mirroring `ops::builtin::local_repository`'s
/// own read-then-copy loop. Operations that reference a component's
/// payload by path (`Copy`, `Extract`, ...) are built against this
/// staged directory rather than reaching back into the shared payload
/// file handle themselves.
pub fn stage_component_archives(store: &ArchiveStore, component_name: &[u8], dest_dir: &Path) -> io::Result<Vec<PathBuf>> {
    fs::create_dir_all(dest_dir)?;
    let mut staged = Vec::new();

    let archives = store
        .archives_for(component_name)
        .map_err(|e| io::Error::other(e.to_string()))?;

    for mut archive in archives {
        let name = String::from_utf8_lossy(archive.name()).into_owned();
        let out_path = dest_dir.join(&name);
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut reader = archive.open().map_err(|e| io::Error::other(e.to_string()))?;
        let mut out_file = fs::File::create(&out_path)?;
        io::copy(&mut reader, &mut out_file)?;
        drop(reader);
        archive.close();
        staged.push(out_path);
    }

    Ok(staged)
}

#[cfg(test)]
mod test {
    use super::*;
    use payload::ComponentIndex;

    #[test]
    fn unknown_component_stages_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let store = ArchiveStore::new(tmp.reopen().unwrap(), ComponentIndex::new());

        let staged = stage_component_archives(&store, b"nope", dir.path()).unwrap();
        assert!(staged.is_empty());
        assert!(dir.path().exists());
    }
}
