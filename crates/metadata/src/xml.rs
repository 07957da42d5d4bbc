// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

use serde::Deserialize;

/// The root of a repository's `Updates.xml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename = "Updates")]
pub struct Updates {
    #[serde(rename = "Checksum", default)]
    pub checksum: bool,
    #[serde(rename = "PackageUpdate", default)]
    pub package_updates: Vec<PackageUpdate>,
    #[serde(rename = "RepositoryUpdate", default)]
    pub repository_updates: Vec<RepositoryUpdate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PackageUpdate {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Version")]
    pub remote_version: String,
    #[serde(rename = "Sha1", default)]
    pub sha1: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryUpdate {
    #[serde(rename = "@action")]
    pub action: RepositoryAction,
    #[serde(rename = "Url")]
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepositoryAction {
    Add,
    Remove,
    Replace,
}

pub fn parse(repo: &str, xml: &str) -> Result<Updates, crate::error::MetadataError> {
    quick_xml::de::from_str(xml).map_err(|source| crate::error::MetadataError::Xml {
        repo: repo.to_string(),
        source,
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_package_and_repository_updates() {
        let xml = r#"
            <Updates>
                <Checksum>true</Checksum>
                <PackageUpdate>
                    <Name>core</Name>
                    <Version>1.2.3</Version>
                    <Sha1>deadbeef</Sha1>
                </PackageUpdate>
                <RepositoryUpdate action="add">
                    <Url>https://example.com/mirror/</Url>
                </RepositoryUpdate>
            </Updates>
        "#;

        let updates = parse("repo", xml).unwrap();
        assert!(updates.checksum);
        assert_eq!(updates.package_updates.len(), 1);
        assert_eq!(updates.package_updates[0].name, "core");
        assert_eq!(updates.repository_updates.len(), 1);
        assert_eq!(updates.repository_updates[0].action, RepositoryAction::Add);
    }

    #[test]
    fn missing_checksum_element_defaults_false() {
        let xml = "<Updates></Updates>";
        let updates = parse("repo", xml).unwrap();
        assert!(!updates.checksum);
    }
}
