// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

use url::Url;

#[derive(Debug, Clone)]
pub struct Repository {
    pub id: String,
    pub url: Url,
    pub enabled: bool,
}

impl Repository {
    pub fn new(id: impl Into<String>, url: Url) -> Self {
        Self {
            id: id.into(),
            url,
            enabled: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PackagePlan {
    pub name: String,
    pub version: String,
    pub expected_sha1: Option<[u8; 20]>,
}

#[derive(Debug, Clone, Default)]
pub struct RepoPlan {
    pub packages: Vec<PackagePlan>,
}
