// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

use std::{
    fs::File,
    io::{Read, Write},
    path::{Path, PathBuf},
};

use sha1::{Digest, Sha1};

use crate::{
    error::FileTaskError,
    handle::{Progress, TaskHandle},
};

/// Cancellation, pause, and progress are all checked at this block
/// boundary; shared with the downloader's incremental body pipe.
pub const BLOCK_SIZE: usize = 32 * 1024;

#[derive(Debug, Clone)]
pub struct FileTaskResult {
    pub bytes_written: u64,
    pub sha1: [u8; 20],
    /// The written file's path, unless the task was canceled mid-stream
    /// -- in which case the partial file is kept on disk for post-mortem
    /// but deliberately not handed back to the caller.
    pub target: Option<PathBuf>,
}

/// Reads `source` sequentially and writes it to `target` (or a fresh
/// tempfile if `target` is `None`), accumulating a SHA-1 checksum and
/// reporting throughput at every [`BLOCK_SIZE`] boundary.
pub struct CopyFileTask {
    pub source: PathBuf,
    pub target: Option<PathBuf>,
}

impl CopyFileTask {
    pub fn new(source: impl Into<PathBuf>, target: Option<PathBuf>) -> Self {
        Self {
            source: source.into(),
            target,
        }
    }

    pub fn run(&self, handle: &dyn TaskHandle) -> Result<FileTaskResult, FileTaskError> {
        let result = self.run_inner(handle);
        match &result {
            Ok(ok) => handle.report_result(ok),
            Err(err) => handle.report_exception(err),
        }
        result
    }

    fn run_inner(&self, handle: &dyn TaskHandle) -> Result<FileTaskResult, FileTaskError> {
        let mut source = File::open(&self.source)?;
        let source_len = source.metadata().ok().map(|m| m.len());

        let (mut target_file, target_path) = match &self.target {
            Some(path) => (File::create(path)?, path.clone()),
            None => {
                let tmp = tempfile::NamedTempFile::new()?;
                let (file, path) = tmp.keep().map_err(|e| FileTaskError::new(e.to_string()))?;
                (file, path)
            }
        };

        let mut hasher = Sha1::new();
        let mut bytes_written = 0u64;
        let mut buf = vec![0u8; BLOCK_SIZE];
        let mut canceled = false;

        loop {
            if handle.is_canceled() {
                canceled = true;
                break;
            }
            handle.wait_on_resume();
            if handle.is_canceled() {
                canceled = true;
                break;
            }

            let read = source.read(&mut buf)?;
            if read == 0 {
                break;
            }

            if let Err(write_err) = target_file.write_all(&buf[..read]) {
                let _ = target_file.flush();
                drop(target_file);
                return Err(FileTaskError::new(format!(
                    "write to {target_path:?} failed: {write_err}"
                )));
            }

            hasher.update(&buf[..read]);
            bytes_written += read as u64;

            handle.report_progress(Progress {
                bytes_done: bytes_written,
                bytes_total: source_len,
            });
        }

        target_file.flush()?;

        if canceled {
            return Err(FileTaskError::new("copy canceled"));
        }

        let sha1: [u8; 20] = hasher.finalize().into();

        Ok(FileTaskResult {
            bytes_written,
            sha1,
            target: Some(target_path),
        })
    }
}

/// Cancellation mid-stream leaves the partial target on disk but does
/// not surface its path; callers must not treat a cancel error's
/// absence of a path as "nothing was written".
pub fn path_after_cancel_is_hidden(result: &Result<FileTaskResult, FileTaskError>) -> bool {
    result.is_err()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::handle::Handle;
    use std::io::Write as _;
    use std::sync::mpsc::channel;

    #[test]
    fn copies_and_checksums_a_file() {
        let mut src = tempfile::NamedTempFile::new().unwrap();
        src.write_all(b"hello world").unwrap();

        let dst = tempfile::NamedTempFile::new().unwrap();
        let dst_path = dst.path().to_path_buf();
        drop(dst);

        let (tx, rx) = channel();
        let handle = Handle::new(tx);

        let task = CopyFileTask::new(src.path(), Some(dst_path.clone()));
        let result = task.run(&*handle).unwrap();

        assert_eq!(result.bytes_written, 11);
        assert_eq!(result.target.as_deref(), Some(dst_path.as_path()));
        assert!(rx.try_recv().is_ok());
    }

    #[test]
    fn zero_length_source_yields_known_checksum() {
        let src = tempfile::NamedTempFile::new().unwrap();
        let (tx, _rx) = channel();
        let handle = Handle::new(tx);

        let task = CopyFileTask::new(src.path(), None);
        let result = task.run(&*handle).unwrap();

        assert_eq!(result.bytes_written, 0);
        // SHA-1 of the empty string.
        assert_eq!(
            hex_string(&result.sha1),
            "da39a3ee5e6b4b0d3255bfef95601890afd80709"
        );
    }

    #[test]
    fn cancellation_mid_stream_hides_the_path() {
        let mut src = tempfile::NamedTempFile::new().unwrap();
        src.write_all(&vec![0u8; BLOCK_SIZE * 4]).unwrap();

        let (tx, _rx) = channel();
        let handle = Handle::new(tx);
        handle.cancel();

        let task = CopyFileTask::new(src.path(), None);
        let result = task.run(&*handle);
        assert!(path_after_cancel_is_hidden(&result));
    }

    fn hex_string(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }
}
