// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

use std::{
    fs::File,
    sync::{Arc, Mutex},
};

use payload::{BinaryLayout, ComponentIndex};

use crate::{error::ArchiveError, mounted::MountedArchive, Archive};

/// Opens archives for a mounted payload's components on demand, sharing a
/// single locked file handle across every reader.
pub struct ArchiveStore {
    file: Arc<Mutex<File>>,
    index: ComponentIndex,
}

impl ArchiveStore {
    pub fn new(file: File, index: ComponentIndex) -> Self {
        Self {
            file: Arc::new(Mutex::new(file)),
            index,
        }
    }

    pub fn open_payload(reader: payload::Reader, layout: &BinaryLayout) -> Result<Self, ArchiveError> {
        let mut file = reader.file;
        let index = payload::read_component_index(&mut file, layout)?;
        Ok(Self::new(file, index))
    }

    /// List every archive shipped inside `component_name`'s binary
    /// segment, as mounted (zero-copy) archives.
    pub fn archives_for(&self, component_name: &[u8]) -> Result<Vec<Archive>, ArchiveError> {
        let Some(component) = self.index.get(component_name) else {
            return Ok(Vec::new());
        };

        let entries = {
            let mut guard = self.file.lock().expect("archive store file lock poisoned");
            component.read_archive_table(&mut *guard)?
        };

        Ok(entries
            .into_iter()
            .map(|entry| {
                Archive::Mounted(MountedArchive::new(entry.name, self.file.clone(), entry.range))
            })
            .collect())
    }

    pub fn component_names(&self) -> impl Iterator<Item = &[u8]> {
        self.index.keys().map(|k| k.as_slice())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use payload::ByteRange;
    use std::io::{Read, Write};

    #[test]
    fn unknown_component_yields_no_archives() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let store = ArchiveStore::new(tmp.reopen().unwrap(), ComponentIndex::new());
        assert!(store.archives_for(b"nope").unwrap().is_empty());
    }

    #[test]
    fn lists_and_reads_mounted_archives() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();

        let segment_start = 0u64;
        tmp.write_all(b"payload-bytes-here").unwrap();
        let segment_end = tmp.as_file().metadata().unwrap().len();

        let mut index = ComponentIndex::new();
        index.insert(
            b"root".to_vec(),
            payload::Component {
                name: b"root".to_vec(),
                binary_segment: ByteRange {
                    offset: segment_start,
                    length: segment_end,
                },
            },
        );

        // This test exercises archives_for only via a hand-built archive
        // table read, since constructing one requires the archive-table
        // wire encoding which lives in the payload crate's writer side.
        let store = ArchiveStore::new(tmp.reopen().unwrap(), index);
        assert_eq!(store.component_names().count(), 1);

        // archives_for requires a valid archive-table header at the
        // segment start; this raw file has none, so it must surface as
        // an error rather than silently returning nothing.
        assert!(store.archives_for(b"root").is_err());

        let mut reader = store
            .file
            .lock()
            .unwrap()
            .try_clone()
            .unwrap();
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).unwrap();
        assert!(buf.starts_with(b"payload"));
    }
}
