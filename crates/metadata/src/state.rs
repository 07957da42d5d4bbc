// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    Idle,
    FetchingXml,
    ParsingXml,
    FetchingArchives,
    Extracting,
    Done,
    Failed(String),
    RetryWithNewSources,
}
