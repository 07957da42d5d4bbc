// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! Engine-wide settings: the one `Config` domain every installer built on
//! this crate saves through `Manager` -- temp directory override,
//! repository list, proxy, and the `--no-force-installations` flag's
//! persisted value, the same way `moss`'s `repository::Map` or
//! `boulder`'s `profile::Map` each own one domain.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::Config;

/// HTTP(S) proxy credentials for repository fetches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyConfig {
    pub url: Url,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Persisted engine settings, loaded once at startup and saved back
/// whenever the CLI is given a flag that should survive to the next run
/// (`--addRepository`, `--setTempRepository`, `--no-force-installations`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineSettings {
    #[serde(default)]
    pub temp_dir: Option<PathBuf>,
    #[serde(default)]
    pub repositories: Vec<Url>,
    #[serde(default)]
    pub proxy: Option<ProxyConfig>,
    #[serde(default)]
    pub no_force_installations: bool,
}

impl EngineSettings {
    pub fn add_repository(&mut self, url: Url) {
        if !self.repositories.contains(&url) {
            self.repositories.push(url);
        }
    }
}

impl Config for EngineSettings {
    fn domain() -> String {
        "engine".into()
    }

    /// Later files win on scalar fields (temp dir, proxy, the force
    /// flag); repository lists are unioned, matching `moss`'s
    /// `repository::Map` merge -- an admin override shouldn't silently
    /// drop vendor-shipped repositories.
    fn merge(self, other: Self) -> Self {
        let mut repositories = self.repositories;
        for url in other.repositories {
            if !repositories.contains(&url) {
                repositories.push(url);
            }
        }

        Self {
            temp_dir: other.temp_dir.or(self.temp_dir),
            repositories,
            proxy: other.proxy.or(self.proxy),
            no_force_installations: self.no_force_installations || other.no_force_installations,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn url(s: &str) -> Url {
        s.parse().unwrap()
    }

    #[test]
    fn domain_is_engine() {
        assert_eq!(EngineSettings::domain(), "engine");
    }

    #[test]
    fn merge_unions_repositories_without_duplicates() {
        let mut a = EngineSettings::default();
        a.add_repository(url("https://a.example/repo"));
        let mut b = EngineSettings::default();
        b.add_repository(url("https://a.example/repo"));
        b.add_repository(url("https://b.example/repo"));

        let merged = a.merge(b);
        assert_eq!(merged.repositories.len(), 2);
    }

    #[test]
    fn merge_prefers_the_later_scalar_values() {
        let a = EngineSettings {
            no_force_installations: false,
            ..Default::default()
        };
        let b = EngineSettings {
            no_force_installations: true,
            ..Default::default()
        };
        assert!(a.merge(b).no_force_installations);
    }

    #[test]
    fn merge_keeps_the_earlier_temp_dir_when_the_later_has_none() {
        let a = EngineSettings {
            temp_dir: Some(PathBuf::from("/var/tmp/engine")),
            ..Default::default()
        };
        let b = EngineSettings::default();
        assert_eq!(a.merge(b).temp_dir, Some(PathBuf::from("/var/tmp/engine")));
    }
}
