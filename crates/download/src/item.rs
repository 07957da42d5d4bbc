// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

use std::path::PathBuf;

use url::Url;

#[derive(Debug, Clone)]
pub struct Credential {
    pub username: String,
    pub password: String,
}

/// One file to fetch. `source` is replaced in place as redirects are
/// followed; `credential` is taken (set to `None`) the first time it is
/// applied so a repeated 401 fails instead of retrying forever.
#[derive(Debug, Clone)]
pub struct FileTaskItem {
    pub source: Url,
    pub target: PathBuf,
    pub expected_sha1: Option<[u8; 20]>,
    pub credential: Option<Credential>,
}

impl FileTaskItem {
    pub fn new(source: Url, target: impl Into<PathBuf>) -> Self {
        Self {
            source,
            target: target.into(),
            expected_sha1: None,
            credential: None,
        }
    }

    /// Tolerant-missing-file handling only applies to `Updates.xml`
    /// index fetches; every other 404 is a real failure.
    pub fn is_tolerant_missing(&self) -> bool {
        self.source.path().ends_with("Updates.xml")
    }
}

#[derive(Debug, Clone)]
pub struct FileTaskResult {
    pub item_index: usize,
    pub bytes_written: u64,
    pub sha1: [u8; 20],
    pub skipped: bool,
}
