// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

use std::io::{self, Write};

use crate::{
    cookie::{MagicCookie, MagicMarker},
    io_ext::WriteExt,
};

/// Everything needed to append the fixed trailer block (component index
/// pointer, resource-segment array, and the six-field trailer itself) to
/// a stream that has already had its metadata resources, component data
/// segments, and component index table written.
///
/// All offsets here are relative to `data_block_start`, as required by
/// the wire format.
pub struct TrailerInput {
    pub operations_start: i64,
    pub operations_end: i64,
    /// `(offset, length)` for each metadata resource segment, relative to
    /// `data_block_start`.
    pub resources: Vec<(i64, i64)>,
    /// Relative offset of the component index table.
    pub component_index_offset: i64,
    /// Raw, already-encoded component index bytes (`count | entries |
    /// count`). Passed through so callers don't need to duplicate the
    /// encoding; length is taken from `component_index.len()`.
    pub component_index: Vec<u8>,
    pub magic_marker: MagicMarker,
    pub magic_cookie: MagicCookie,
}

/// Append the component index table, the resource-segment array, and the
/// fixed trailer to `writer`, then return `data_block_size`: the total
/// byte span from `data_block_start` (where the caller started writing,
/// before this call) to `end_of_data`.
pub fn write_trailer<W: Write>(mut writer: W, input: &TrailerInput) -> io::Result<u64> {
    let mut written: u64 = 0;

    writer.write_all(&input.component_index)?;
    written += input.component_index.len() as u64;

    writer.write_i64(input.component_index_offset)?;
    writer.write_i64(input.component_index.len() as i64)?;
    written += 16;

    for &(offset, length) in &input.resources {
        writer.write_i64(offset)?;
        writer.write_i64(length)?;
        written += 16;
    }

    writer.write_i64(input.operations_start)?;
    writer.write_i64(input.operations_end)?;
    writer.write_i64(input.resources.len() as i64)?;
    written += 24;

    // `data_block_size` spans the whole trailer too (end_of_data sits
    // right after the magic cookie), so the final three fixed fields
    // count towards it as well.
    written += 24;
    let data_block_size = input.component_index_offset as u64 + written;

    writer.write_i64(data_block_size as i64)?;
    writer.write_i64(input.magic_marker as i64)?;
    writer.write_u64(input.magic_cookie.as_u64())?;

    Ok(data_block_size)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::layout::open;
    use std::io::{Seek, SeekFrom, Write as _};

    #[test]
    fn writes_a_readable_trailer() {
        let mut file = tempfile::NamedTempFile::new().unwrap();

        // A single metadata resource, "hello", starting at relative 0.
        file.write_all(b"hello").unwrap();
        // Empty component index table (count = 0, entries, count = 0).
        let mut component_index = Vec::new();
        component_index.extend_from_slice(&0i64.to_le_bytes());
        component_index.extend_from_slice(&0i64.to_le_bytes());
        let component_index_offset = 5; // right after "hello"

        let input = TrailerInput {
            operations_start: 0,
            operations_end: 0,
            resources: vec![(0, 5)],
            component_index_offset,
            component_index,
            magic_marker: MagicMarker::Installer,
            magic_cookie: MagicCookie::Installer,
        };

        write_trailer(file.as_file_mut(), &input).unwrap();
        file.as_file_mut().seek(SeekFrom::Start(0)).unwrap();

        let path = file.path().to_path_buf();
        drop(file);

        let (_, layout) = open(&path).unwrap();
        assert_eq!(layout.metadata_resource_segments.len(), 1);
        assert_eq!(layout.metadata_resource_segments[0].length, 5);
    }
}
