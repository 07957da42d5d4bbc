// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

use std::path::Path;

use chrono::NaiveDate;
use fs_err as fs;
use serde::{Deserialize, Serialize};

use crate::error::RuntimeError;

/// The on-disk record of what's currently installed, mirroring the
/// component graph's notion of `installed` with the version and date
/// each component landed. Read at startup to seed `graph::Component`'s
/// `installed` flags; rewritten after every completed component.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename = "Packages")]
pub struct Packages {
    #[serde(rename = "Package", default)]
    pub components: Vec<InstalledComponent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstalledComponent {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Version")]
    pub version: String,
    #[serde(rename = "InstallDate")]
    pub install_date: NaiveDate,
}

impl Packages {
    pub fn read(path: &Path) -> Result<Self, RuntimeError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let xml = fs::read_to_string(path)?;
        quick_xml::de::from_str(&xml).map_err(|e| RuntimeError::Xml(e.to_string()))
    }

    /// Inserts or updates `component`'s entry, then persists the whole
    /// file via write-`.new` / fsync / rename so a crash mid-write never
    /// leaves a half-written `packages.xml` behind.
    pub fn record_installed(&mut self, component: InstalledComponent) {
        self.components.retain(|c| c.name != component.name);
        self.components.push(component);
        self.components.sort_by(|a, b| a.name.cmp(&b.name));
    }

    pub fn record_uninstalled(&mut self, name: &str) {
        self.components.retain(|c| c.name != name);
    }

    pub fn is_installed(&self, name: &str) -> bool {
        self.components.iter().any(|c| c.name == name)
    }

    pub fn persist(&self, path: &Path) -> Result<(), RuntimeError> {
        let xml = quick_xml::se::to_string(self).map_err(|e| RuntimeError::XmlWrite(e.to_string()))?;
        let tmp_path = path.with_extension("xml.new");
        {
            let mut tmp = fs::File::create(&tmp_path)?;
            use std::io::Write;
            tmp.write_all(xml.as_bytes())?;
            tmp.sync_all()?;
        }
        fs::rename(&tmp_path, path)?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn round_trips_through_persist_and_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("packages.xml");

        let mut packages = Packages::default();
        packages.record_installed(InstalledComponent {
            name: "core".to_string(),
            version: "1.0.0".to_string(),
            install_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        });
        packages.persist(&path).unwrap();

        let read_back = Packages::read(&path).unwrap();
        assert!(read_back.is_installed("core"));
        assert_eq!(read_back.components[0].version, "1.0.0");
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let packages = Packages::read(&dir.path().join("packages.xml")).unwrap();
        assert!(packages.components.is_empty());
    }

    #[test]
    fn record_uninstalled_drops_the_entry() {
        let mut packages = Packages::default();
        packages.record_installed(InstalledComponent {
            name: "core".to_string(),
            version: "1.0.0".to_string(),
            install_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        });
        packages.record_uninstalled("core");
        assert!(!packages.is_installed("core"));
    }
}
