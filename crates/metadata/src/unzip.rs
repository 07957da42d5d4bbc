// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

use std::{
    fs::File,
    path::{Path, PathBuf},
};

use crate::error::MetadataError;

/// Extracts a downloaded `*meta.7z` (a zip container, despite the
/// traditional extension) into `dest_dir`, which is created if absent.
pub fn extract(archive_path: &Path, dest_dir: &Path) -> Result<(), MetadataError> {
    std::fs::create_dir_all(dest_dir)?;

    let file = File::open(archive_path)?;
    let mut zip = zip::ZipArchive::new(file).map_err(|e| MetadataError::Extract {
        archive: archive_path.to_path_buf(),
        message: e.to_string(),
    })?;

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i).map_err(|e| MetadataError::Extract {
            archive: archive_path.to_path_buf(),
            message: e.to_string(),
        })?;

        let Some(relative) = entry.enclosed_name() else {
            continue;
        };
        let out_path: PathBuf = dest_dir.join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&out_path)?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&out_path)?;
        std::io::copy(&mut entry, &mut out)?;
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;

    #[test]
    fn extracts_a_flat_archive() {
        let dir = tempfile::tempdir().unwrap();
        let archive_path = dir.path().join("x.7z");

        let file = File::create(&archive_path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = zip::write::FileOptions::<()>::default();
        writer.start_file("meta/package.xml", options).unwrap();
        writer.write_all(b"<Package/>").unwrap();
        writer.finish().unwrap();

        let dest = dir.path().join("out");
        extract(&archive_path, &dest).unwrap();

        assert!(dest.join("meta/package.xml").exists());
    }
}
