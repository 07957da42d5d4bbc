// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

use std::{
    fs::File,
    io::{BufReader, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};

use log::debug;

use crate::error::ArchiveError;

/// An archive materialized at a filesystem path. When `source` is a
/// directory it is zipped lazily into a temp file on first read; a plain
/// file source is read as-is.
pub struct MaterializedArchive {
    pub name: Vec<u8>,
    source: PathBuf,
    zipped: Option<tempfile::NamedTempFile>,
}

impl MaterializedArchive {
    pub fn new(name: Vec<u8>, source: PathBuf) -> Self {
        Self {
            name,
            source,
            zipped: None,
        }
    }

    pub fn size(&mut self) -> Result<u64, ArchiveError> {
        self.ensure_ready()?;
        if let Some(zipped) = &self.zipped {
            Ok(zipped.as_file().metadata()?.len())
        } else {
            Ok(std::fs::metadata(&self.source)?.len())
        }
    }

    pub fn open(&mut self) -> Result<BufReader<File>, ArchiveError> {
        self.ensure_ready()?;
        let file = if let Some(zipped) = &self.zipped {
            let mut f = zipped.reopen()?;
            f.seek(SeekFrom::Start(0))?;
            f
        } else {
            File::open(&self.source)?
        };
        Ok(BufReader::new(file))
    }

    pub fn close(&mut self) {
        self.zipped = None;
    }

    fn ensure_ready(&mut self) -> Result<(), ArchiveError> {
        if self.zipped.is_some() {
            return Ok(());
        }
        if !self.source.exists() {
            return Err(ArchiveError::MissingSource(self.source.clone()));
        }
        if self.source.is_dir() {
            debug!("zipping directory source {:?}", self.source);
            self.zipped = Some(zip_directory(&self.source)?);
        }
        Ok(())
    }
}

fn zip_directory(dir: &Path) -> Result<tempfile::NamedTempFile, ArchiveError> {
    let tmp = tempfile::NamedTempFile::new()?;
    let mut writer = zip::ZipWriter::new(tmp.reopen()?);
    let options = zip::write::FileOptions::<()>::default()
        .compression_method(zip::CompressionMethod::Deflated);

    for entry in walkdir(dir) {
        let relative = entry
            .strip_prefix(dir)
            .expect("walked entry must be under its root")
            .to_string_lossy()
            .replace('\\', "/");

        if entry.is_dir() {
            writer
                .add_directory(format!("{relative}/"), options)
                .map_err(|e| ArchiveError::Zip(dir.to_path_buf(), e))?;
            continue;
        }

        writer
            .start_file(relative, options)
            .map_err(|e| ArchiveError::Zip(dir.to_path_buf(), e))?;
        let mut src = File::open(&entry)?;
        std::io::copy(&mut src, &mut writer)?;
    }

    writer
        .finish()
        .map_err(|e| ArchiveError::Zip(dir.to_path_buf(), e))?
        .flush()?;

    Ok(tmp)
}

fn walkdir(root: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                out.push(path.clone());
                stack.push(path);
            } else {
                out.push(path);
            }
        }
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Read;

    #[test]
    fn plain_file_source_reads_directly() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"hello").unwrap();
        let mut archive = MaterializedArchive::new(b"a".to_vec(), tmp.path().to_path_buf());
        assert_eq!(archive.size().unwrap(), 5);
        let mut out = String::new();
        archive.open().unwrap().read_to_string(&mut out).unwrap();
        assert_eq!(out, "hello");
    }

    #[test]
    fn directory_source_is_zipped_lazily() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("file.txt"), b"payload").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub/nested.txt"), b"nested").unwrap();

        let mut archive = MaterializedArchive::new(b"dir".to_vec(), dir.path().to_path_buf());
        assert!(archive.size().unwrap() > 0);

        let mut zip = zip::ZipArchive::new(archive.open().unwrap()).unwrap();
        assert!(zip.by_name("file.txt").is_ok());
        assert!(zip.by_name("sub/nested.txt").is_ok());

        archive.close();
    }

    #[test]
    fn missing_source_errors() {
        let mut archive = MaterializedArchive::new(b"x".to_vec(), PathBuf::from("/no/such/path"));
        assert!(matches!(archive.size(), Err(ArchiveError::MissingSource(_))));
    }
}
