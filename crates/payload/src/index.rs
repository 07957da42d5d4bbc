// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

use std::{
    collections::BTreeMap,
    io::{Read, Seek, SeekFrom},
};

use crate::{error::LayoutError, io_ext::ReadExt, layout::ByteRange, BinaryLayout};

/// A named archive table entry inside a component's binary segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: Vec<u8>,
    pub range: ByteRange,
}

/// The payload-side view of a component: its name and the byte range of
/// its binary segment (archive table + archive bodies).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub name: Vec<u8>,
    pub binary_segment: ByteRange,
}

impl Component {
    /// Decode this component's archive table (the `archive_count |
    /// (name, offset, length){archive_count}` header at the start of its
    /// binary segment). Archive bodies follow immediately and are
    /// addressed via [`ArchiveEntry::range`], translated to absolute
    /// file offsets the same way the outer trailer translates its own
    /// offsets: relative to the start of this component's binary
    /// segment.
    pub fn read_archive_table<R: Read + Seek>(
        &self,
        reader: &mut R,
    ) -> Result<Vec<ArchiveEntry>, LayoutError> {
        reader.seek(SeekFrom::Start(self.binary_segment.offset))?;
        let archive_count = reader.read_i64()?;
        if archive_count < 0 {
            return Err(LayoutError::CorruptIndex {
                expected: 0,
                found: archive_count as u64,
            });
        }

        let mut entries = Vec::with_capacity(archive_count as usize);
        for _ in 0..archive_count {
            let name = reader.read_varbytes()?;
            let offset = reader.read_i64()? as u64 + self.binary_segment.offset;
            let length = reader.read_i64()? as u64;
            entries.push(ArchiveEntry {
                name,
                range: ByteRange { offset, length },
            });
        }

        Ok(entries)
    }
}

/// `map<bytes, Component>`, sorted stably by name, written twice (count
/// prefix and count suffix) so it can be located from either end of the
/// payload.
pub type ComponentIndex = BTreeMap<Vec<u8>, Component>;

/// Read the component index table located by `layout.component_index`.
pub fn read_component_index<R: Read + Seek>(
    reader: &mut R,
    layout: &BinaryLayout,
) -> Result<ComponentIndex, LayoutError> {
    reader.seek(SeekFrom::Start(layout.component_index.offset))?;

    let count = reader.read_i64()?;
    if count < 0 {
        return Err(LayoutError::CorruptIndex {
            expected: 0,
            found: count as u64,
        });
    }
    let count = count as u64;

    let mut index = ComponentIndex::new();
    for _ in 0..count {
        let name = reader.read_varbytes()?;
        let offset = reader.read_i64()? as u64 + layout.data_block_start;
        let length = reader.read_i64()? as u64;
        index.insert(
            name.clone(),
            Component {
                name,
                binary_segment: ByteRange { offset, length },
            },
        );
    }

    let trailing_count = reader.read_i64()? as u64;
    if trailing_count != count {
        return Err(LayoutError::CorruptIndex {
            expected: count,
            found: trailing_count,
        });
    }

    Ok(index)
}

/// Encode a component index table in the `count | entries | count` wire
/// shape, with offsets relative to `data_block_start`. Used by the
/// uninstaller writer, which always emits an empty index (the
/// maintenance tool ships no new components).
pub fn encode_component_index(
    entries: &[(Vec<u8>, ByteRange)],
    data_block_start: u64,
) -> Vec<u8> {
    use crate::io_ext::WriteExt;

    let mut buf = Vec::new();
    let count = entries.len() as i64;
    buf.write_i64(count).unwrap();
    for (name, range) in entries {
        buf.write_varbytes(name).unwrap();
        buf.write_i64((range.offset - data_block_start) as i64).unwrap();
        buf.write_i64(range.length as i64).unwrap();
    }
    buf.write_i64(count).unwrap();
    buf
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn encode_decode_round_trip() {
        let entries = vec![
            (
                b"root".to_vec(),
                ByteRange {
                    offset: 100,
                    length: 40,
                },
            ),
            (
                b"root.child".to_vec(),
                ByteRange {
                    offset: 140,
                    length: 10,
                },
            ),
        ];
        let data_block_start = 100;
        let encoded = encode_component_index(&entries, data_block_start);

        let layout = BinaryLayout {
            operations: ByteRange { offset: 0, length: 0 },
            data_block_size: encoded.len() as u64,
            data_block_start,
            end_of_data: data_block_start + encoded.len() as u64,
            magic_marker: crate::cookie::MagicMarker::Installer,
            magic_cookie: crate::cookie::MagicCookie::Installer,
            metadata_resource_segments: Vec::new(),
            component_index: ByteRange {
                offset: data_block_start,
                length: encoded.len() as u64,
            },
        };

        let mut cursor = Cursor::new(encoded);
        let index = read_component_index(&mut cursor, &layout).unwrap();

        assert_eq!(index.len(), 2);
        assert!(index.contains_key(b"root".as_slice()));
        assert_eq!(index[b"root.child".as_slice()].binary_segment.offset, 140);
    }

    #[test]
    fn trailing_count_mismatch_is_corrupt() {
        use crate::io_ext::WriteExt;
        let mut buf = Vec::new();
        buf.write_i64(1).unwrap();
        buf.write_varbytes(b"x").unwrap();
        buf.write_i64(0).unwrap();
        buf.write_i64(0).unwrap();
        buf.write_i64(2).unwrap(); // wrong trailing count

        let layout = BinaryLayout {
            operations: ByteRange { offset: 0, length: 0 },
            data_block_size: buf.len() as u64,
            data_block_start: 0,
            end_of_data: buf.len() as u64,
            magic_marker: crate::cookie::MagicMarker::Installer,
            magic_cookie: crate::cookie::MagicCookie::Installer,
            metadata_resource_segments: Vec::new(),
            component_index: ByteRange {
                offset: 0,
                length: buf.len() as u64,
            },
        };

        let mut cursor = Cursor::new(buf);
        let err = read_component_index(&mut cursor, &layout).unwrap_err();
        assert!(matches!(err, LayoutError::CorruptIndex { .. }));
    }
}
