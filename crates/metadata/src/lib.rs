// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! Fetches and parses every enabled repository's `Updates.xml`, applies
//! any repository add/remove/replace actions it carries, downloads the
//! resulting package metadata archives, and extracts them -- the full
//! `Idle -> FetchingXml -> ParsingXml -> FetchingArchives -> Extracting
//! -> Done` state machine, with `RetryWithNewSources` looping phase one
//! when the repository set changes underneath it.

mod error;
mod job;
mod repository;
mod state;
mod unzip;
mod xml;

pub use error::MetadataError;
pub use job::{JobOutcome, MetadataJob};
pub use repository::{PackagePlan, RepoPlan, Repository};
pub use state::JobState;
pub use xml::{PackageUpdate, RepositoryAction, RepositoryUpdate, Updates};
