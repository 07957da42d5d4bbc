// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! The operation list's wire shape: `count | (name, xml){count} | count`.
//! Every entry is a `varbytes` name next to a `varbytes` XML blob of its
//! arguments and named values, framed by a leading and trailing count so
//! it can be sanity-checked from either end the way the component index
//! is.

use ops::Operation;

use crate::error::UninstallError;

fn write_i64(buf: &mut Vec<u8>, value: i64) {
    buf.extend_from_slice(&value.to_le_bytes());
}

fn write_varbytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    write_i64(buf, bytes.len() as i64);
    buf.extend_from_slice(bytes);
}

fn read_i64(bytes: &[u8], pos: &mut usize) -> Result<i64, UninstallError> {
    let slice = bytes.get(*pos..*pos + 8).ok_or(UninstallError::TruncatedOperationList)?;
    *pos += 8;
    Ok(i64::from_le_bytes(slice.try_into().unwrap()))
}

fn read_varbytes<'a>(bytes: &'a [u8], pos: &mut usize) -> Result<&'a [u8], UninstallError> {
    let len = read_i64(bytes, pos)?;
    let len = usize::try_from(len).map_err(|_| UninstallError::TruncatedOperationList)?;
    let slice = bytes.get(*pos..*pos + len).ok_or(UninstallError::TruncatedOperationList)?;
    *pos += len;
    Ok(slice)
}

/// Encodes an ordered operation list for the appended data block. Callers
/// are expected to hand this an already dependency-sorted list (the
/// runtime's undo log, reduced to its bare operations).
pub fn encode_operations(operations: &[Operation]) -> Result<Vec<u8>, UninstallError> {
    let mut buf = Vec::new();
    let count = operations.len() as i64;
    write_i64(&mut buf, count);
    for op in operations {
        let xml = ops::to_xml(op)?;
        write_varbytes(&mut buf, op.name().as_bytes());
        write_varbytes(&mut buf, xml.as_bytes());
    }
    write_i64(&mut buf, count);
    Ok(buf)
}

/// Decodes the bytes `encode_operations` produces. Used by the round-trip
/// test and by anything reading a maintenance tool's own undo log back.
pub fn decode_operations(bytes: &[u8]) -> Result<Vec<Operation>, UninstallError> {
    let mut pos = 0usize;
    let count = read_i64(bytes, &mut pos)?;
    let count = u64::try_from(count).map_err(|_| UninstallError::CorruptOperationList { expected: 0, found: 0 })?;

    let mut operations = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let name = String::from_utf8_lossy(read_varbytes(bytes, &mut pos)?).into_owned();
        let xml = String::from_utf8_lossy(read_varbytes(bytes, &mut pos)?).into_owned();
        operations.push(ops::from_xml(&name, &xml)?);
    }

    let trailing = read_i64(bytes, &mut pos)? as u64;
    if trailing != count {
        return Err(UninstallError::CorruptOperationList {
            expected: count,
            found: trailing,
        });
    }

    Ok(operations)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn round_trips_an_empty_list() {
        let encoded = encode_operations(&[]).unwrap();
        assert_eq!(decode_operations(&encoded).unwrap(), Vec::new());
    }

    #[test]
    fn round_trips_names_arguments_and_named_values() {
        let mut op = Operation::with_arguments("Copy", vec!["/a".to_string(), "/b".to_string()]);
        op.set_value("_backup_of_existing_destination", "/tmp/x");
        let encoded = encode_operations(&[op.clone()]).unwrap();

        let decoded = decode_operations(&encoded).unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].name(), "Copy");
        assert_eq!(decoded[0].arguments(), op.arguments());
        assert_eq!(decoded[0].value("_backup_of_existing_destination"), Some("/tmp/x"));
    }

    #[test]
    fn truncated_trailing_count_is_corrupt() {
        let mut encoded = encode_operations(&[Operation::new("Mkdir")]).unwrap();
        let last = encoded.len() - 8;
        encoded[last..].copy_from_slice(&99i64.to_le_bytes());
        assert!(matches!(
            decode_operations(&encoded),
            Err(UninstallError::CorruptOperationList { .. })
        ));
    }
}
