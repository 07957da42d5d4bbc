// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! The local component descriptor carried in a payload's first metadata
//! resource segment -- the thing `graph::Component` and
//! `runtime::RuntimeComponent` are built from at startup, and the thing
//! rewritten back into that same segment by the uninstaller writer's
//! resource override once install state changes. Parsed the same way
//! `metadata::xml::Updates` is: `quick-xml`'s serde integration over a
//! small typed-row struct.

use serde::{Deserialize, Serialize};

use crate::error::Error;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename = "Components")]
pub struct ComponentDescriptor {
    #[serde(rename = "Component", default)]
    pub components: Vec<ComponentEntry>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ComponentEntry {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Version", default)]
    pub version: String,
    #[serde(rename = "DisplayName", default)]
    pub display_name: String,
    #[serde(rename = "Description", default)]
    pub description: String,
    #[serde(rename = "Dependencies", default)]
    pub dependencies: String,
    #[serde(rename = "AutoDependOn", default)]
    pub auto_depend: String,
    #[serde(rename = "Replaces", default)]
    pub replaces: String,
    #[serde(rename = "StopProcesses", default)]
    pub stop_processes: String,
    #[serde(rename = "TriState", default)]
    pub tri_state: bool,
    #[serde(rename = "Default", default)]
    pub is_default: bool,
    #[serde(rename = "Installer", default)]
    pub is_installer: bool,
    #[serde(rename = "Virtual", default)]
    pub is_virtual: bool,
    #[serde(rename = "Forced", default)]
    pub is_forced: bool,
    #[serde(rename = "Essential", default)]
    pub is_essential: bool,
    #[serde(rename = "RequiresAdminRights", default)]
    pub requires_admin: bool,
    #[serde(rename = "UncompressedSize", default)]
    pub uncompressed_size: u64,
    #[serde(rename = "SortPriority", default)]
    pub sort_priority: i64,
    #[serde(rename = "Installed", default)]
    pub installed: bool,
}

/// Splits one of the descriptor's comma-separated list fields
/// (`Dependencies`, `AutoDependOn`, `Replaces`, `StopProcesses`),
/// matching the wire convention QtIFW-derived `components.xml` files
/// use for the same fields.
fn split_list(value: &str) -> Vec<String> {
    value.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect()
}

fn join_list(values: &[String]) -> String {
    values.join(",")
}

impl ComponentEntry {
    pub fn to_graph_component(&self) -> graph::Component {
        graph::Component {
            name: self.name.clone(),
            dependencies: split_list(&self.dependencies),
            auto_depend: split_list(&self.auto_depend),
            replaces: split_list(&self.replaces),
            tri_state: self.tri_state,
            is_default: self.is_default,
            is_installer: self.is_installer,
            installed: self.installed,
            sort_priority: self.sort_priority,
        }
    }

    pub fn to_runtime_component(&self) -> runtime::RuntimeComponent {
        let mut component = runtime::RuntimeComponent::new(&self.name);
        component.version = self.version.clone();
        component.display_name = self.display_name.clone();
        component.description = self.description.clone();
        component.is_virtual = self.is_virtual;
        component.is_forced = self.is_forced;
        component.is_essential = self.is_essential;
        component.uncompressed_size = self.uncompressed_size;
        component.requires_admin = self.requires_admin;
        component.stop_processes = split_list(&self.stop_processes);
        component.install_state = if self.installed {
            runtime::InstallState::Installed
        } else {
            runtime::InstallState::NotInstalled
        };
        component
    }

    pub fn set_installed(&mut self, installed: bool) {
        self.installed = installed;
    }
}

pub fn parse(bytes: &[u8]) -> Result<ComponentDescriptor, Error> {
    let xml = String::from_utf8_lossy(bytes);
    Ok(quick_xml::de::from_str(&xml)?)
}

pub fn to_xml(descriptor: &ComponentDescriptor) -> Result<Vec<u8>, Error> {
    let xml = quick_xml::se::to_string(descriptor).map_err(|e| Error::ComponentsXmlWrite(e.to_string()))?;
    Ok(xml.into_bytes())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_dependency_and_flag_fields() {
        let xml = r#"
            <Components>
                <Component>
                    <Name>core</Name>
                    <Version>1.0.0</Version>
                    <Dependencies>base,runtime-1.2</Dependencies>
                    <Default>true</Default>
                    <Installer>true</Installer>
                </Component>
            </Components>
        "#;

        let descriptor = parse(xml.as_bytes()).unwrap();
        assert_eq!(descriptor.components.len(), 1);
        let entry = &descriptor.components[0];

        let component = entry.to_graph_component();
        assert_eq!(component.name, "core");
        assert_eq!(component.dependencies, vec!["base", "runtime-1.2"]);
        assert!(component.is_default);
        assert!(component.is_installer);
    }

    #[test]
    fn round_trips_through_to_xml_and_back() {
        let mut descriptor = ComponentDescriptor::default();
        let mut entry = ComponentEntry {
            name: "core".into(),
            ..Default::default()
        };
        entry.dependencies = join_list(&["base".to_string(), "runtime".to_string()]);
        entry.installed = true;
        descriptor.components.push(entry);

        let xml = to_xml(&descriptor).unwrap();
        let reparsed = parse(&xml).unwrap();

        assert_eq!(reparsed.components.len(), 1);
        assert_eq!(reparsed.components[0].name, "core");
        assert!(reparsed.components[0].installed);
        assert_eq!(reparsed.components[0].to_graph_component().dependencies, vec!["base", "runtime"]);
    }
}
