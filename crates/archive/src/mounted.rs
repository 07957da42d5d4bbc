// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

use std::{
    fs::File,
    io::{self, Read, Seek, SeekFrom},
    sync::{Arc, Mutex},
};

use payload::ByteRange;

/// An archive whose bytes live inside a shared payload file handle. Reads
/// save and restore the handle's seek position so that multiple archives
/// can be read concurrently from the same `File` without corrupting each
/// other's position.
pub struct MountedArchive {
    pub name: Vec<u8>,
    pub(crate) file: Arc<Mutex<File>>,
    pub range: ByteRange,
}

impl MountedArchive {
    pub fn new(name: Vec<u8>, file: Arc<Mutex<File>>, range: ByteRange) -> Self {
        Self { name, file, range }
    }

    pub fn reader(&self) -> MountedArchiveReader {
        MountedArchiveReader {
            file: self.file.clone(),
            range: self.range,
            position: 0,
        }
    }
}

pub struct MountedArchiveReader {
    file: Arc<Mutex<File>>,
    range: ByteRange,
    position: u64,
}

impl Read for MountedArchiveReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = self.range.length.saturating_sub(self.position);
        if remaining == 0 {
            return Ok(0);
        }
        let want = (buf.len() as u64).min(remaining) as usize;

        let mut file = self.file.lock().expect("mounted archive file lock poisoned");
        let saved = file.stream_position()?;
        file.seek(SeekFrom::Start(self.range.offset + self.position))?;
        let read = file.read(&mut buf[..want])?;
        file.seek(SeekFrom::Start(saved))?;

        self.position += read as u64;
        Ok(read)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_only_its_own_range_and_restores_position() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"AAAABBBBCCCC").unwrap();
        let file = tmp.reopen().unwrap();
        let file = Arc::new(Mutex::new(file));

        {
            let mut guard = file.lock().unwrap();
            guard.seek(SeekFrom::Start(2)).unwrap();
        }

        let archive = MountedArchive::new(
            b"b".to_vec(),
            file.clone(),
            ByteRange { offset: 4, length: 4 },
        );
        let mut reader = archive.reader();
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"BBBB");

        let pos = file.lock().unwrap().stream_position().unwrap();
        assert_eq!(pos, 2);
    }
}
