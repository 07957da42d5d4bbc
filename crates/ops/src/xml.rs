// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

use serde::{Deserialize, Serialize};

use crate::error::OperationError;
use crate::operation::Operation;

#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(rename = "operation")]
struct Wire {
    #[serde(rename = "argument", default)]
    arguments: Vec<String>,
    #[serde(rename = "value", default)]
    named_values: Vec<NamedValue>,
}

#[derive(Debug, Serialize, Deserialize)]
struct NamedValue {
    #[serde(rename = "@key")]
    key: String,
    #[serde(rename = "$text")]
    text: String,
}

/// Serializes an operation's arguments and named values -- not its
/// name, which is carried alongside as `varbytes op_name` in the undo
/// log and looked up in the registry before this is ever parsed.
pub fn to_xml(op: &Operation) -> Result<String, OperationError> {
    let mut named_values: Vec<NamedValue> = op
        .named_values()
        .iter()
        .map(|(key, text)| NamedValue {
            key: key.clone(),
            text: text.clone(),
        })
        .collect();
    named_values.sort_by(|a, b| a.key.cmp(&b.key));

    let wire = Wire {
        arguments: op.arguments().to_vec(),
        named_values,
    };
    quick_xml::se::to_string(&wire).map_err(|e| OperationError::invalid(op.name(), e.to_string()))
}

pub fn from_xml(name: &str, xml: &str) -> Result<Operation, OperationError> {
    let wire: Wire = quick_xml::de::from_str(xml).map_err(|e| OperationError::invalid(name, e.to_string()))?;
    let mut op = Operation::with_arguments(name, wire.arguments);
    for nv in wire.named_values {
        op.set_value(nv.key, nv.text);
    }
    Ok(op)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn round_trips_arguments_and_named_values() {
        let mut op = Operation::with_arguments("Copy", vec!["/a".to_string(), "/b".to_string()]);
        op.set_value("_backup_of_existing_destination", "/tmp/x");

        let xml = to_xml(&op).unwrap();
        let parsed = from_xml("Copy", &xml).unwrap();

        assert_eq!(parsed.arguments(), op.arguments());
        assert_eq!(
            parsed.value("_backup_of_existing_destination"),
            Some("/tmp/x")
        );
    }
}
