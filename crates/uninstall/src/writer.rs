// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use fs_err as fs;
use log::debug;
use ops::Operation;
use payload::{ByteRange, MagicCookie, MagicMarker, TrailerInput};

use crate::error::UninstallError;
use crate::operations_list::encode_operations;

/// Produces the maintenance-tool executable: the installer stub (or a
/// downloaded replacement, for self-updates) followed by a freshly built
/// data block carrying the current undo log.
///
/// The new file is written to `<dest>.new` next to `dest`; the deferred
/// rename that puts it in place is [`crate::rename::PlatformRename`]'s job,
/// not this one's -- a running executable may not be able to replace
/// itself immediately, and `write` has no opinion on when that happens.
pub struct UninstallerWriter {
    stub_source: PathBuf,
}

impl UninstallerWriter {
    /// `stub_source` is either a replacement installer stub obtained
    /// during a self-update (`--update-installerbase`) or the currently
    /// running executable / its separated `.dat` file.
    pub fn new(stub_source: impl Into<PathBuf>) -> Self {
        Self {
            stub_source: stub_source.into(),
        }
    }

    /// Writes the new maintenance-tool payload to `<dest>.new`, returning
    /// that path. `resource_override`, when given, replaces metadata
    /// resource segment 0 verbatim (the case where the engine was handed
    /// updated resources during a self-update); every other segment, and
    /// resource 0 itself when no override is given, is copied unchanged
    /// from the stub source.
    pub fn write(
        &self,
        dest: &Path,
        operations: &[Operation],
        resource_override: Option<&[u8]>,
    ) -> Result<PathBuf, UninstallError> {
        let (mut reader, layout) = payload::open(&self.stub_source)?;

        let mut stub = vec![0u8; layout.data_block_start as usize];
        reader.file.seek(SeekFrom::Start(0))?;
        reader.file.read_exact(&mut stub)?;

        let new_path = new_path_for(dest);
        debug!("writing maintenance tool to {new_path:?} from stub {:?}", self.stub_source);
        let mut out = fs::File::create(&new_path)?;
        out.write_all(&stub)?;

        let operations_bytes = encode_operations(operations)?;
        out.write_all(&operations_bytes)?;
        let operations_start = 0i64;
        let operations_end = operations_bytes.len() as i64;
        let mut cursor = operations_bytes.len() as u64;

        let mut resources = Vec::with_capacity(layout.metadata_resource_segments.len());
        for (index, segment) in layout.metadata_resource_segments.iter().enumerate() {
            let bytes = match (index, resource_override) {
                (0, Some(over)) => over.to_vec(),
                _ => read_segment(&mut reader.file, *segment)?,
            };
            out.write_all(&bytes)?;
            resources.push((cursor as i64, bytes.len() as i64));
            cursor += bytes.len() as u64;
        }

        let component_index_offset = cursor as i64;
        // Always empty: the maintenance tool ships no new components,
        // only the undo log for what's already on disk.
        let component_index = payload::encode_component_index(&[], cursor);

        let trailer = TrailerInput {
            operations_start,
            operations_end,
            resources,
            component_index_offset,
            component_index,
            magic_marker: MagicMarker::Uninstaller,
            magic_cookie: MagicCookie::Uninstaller,
        };
        payload::write_trailer(&mut out, &trailer)?;
        out.sync_all()?;

        Ok(new_path)
    }
}

fn read_segment(file: &mut File, segment: ByteRange) -> std::io::Result<Vec<u8>> {
    let mut buf = vec![0u8; segment.length as usize];
    file.seek(SeekFrom::Start(segment.offset))?;
    file.read_exact(&mut buf)?;
    Ok(buf)
}

fn new_path_for(dest: &Path) -> PathBuf {
    match dest.extension() {
        Some(ext) => dest.with_extension(format!("{}.new", ext.to_string_lossy())),
        None => dest.with_extension("new"),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::operations_list::decode_operations;
    use payload::{MagicCookie as Cookie, MagicMarker as Marker};
    use std::io::Write as _;

    fn build_stub_installer(path: &Path) {
        let mut file = File::create(path).unwrap();
        file.write_all(b"#!/bin/sh\n# stub installer body\n").unwrap();

        file.write_all(b"<meta/>").unwrap();
        let resource = (0i64, 7i64);

        let component_index = payload::encode_component_index(&[], 0);
        let component_index_offset = 7i64;

        let trailer = TrailerInput {
            operations_start: 0,
            operations_end: 0,
            resources: vec![resource],
            component_index_offset,
            component_index,
            magic_marker: Marker::Installer,
            magic_cookie: Cookie::Installer,
        };
        payload::write_trailer(&mut file, &trailer).unwrap();
    }

    #[test]
    fn writes_a_maintenance_tool_with_the_given_operations() {
        let dir = tempfile::tempdir().unwrap();
        let stub_path = dir.path().join("installer");
        build_stub_installer(&stub_path);

        let dest = dir.path().join("maintenancetool");
        let writer = UninstallerWriter::new(&stub_path);

        let ops = vec![Operation::with_arguments("Mkdir", vec!["/opt/demo".to_string()])];
        let new_path = writer.write(&dest, &ops, None).unwrap();
        assert_eq!(new_path, dir.path().join("maintenancetool.new"));

        let (mut reader, layout) = payload::open(&new_path).unwrap();
        assert_eq!(layout.magic_marker, Marker::Uninstaller);
        assert_eq!(layout.magic_cookie, Cookie::Uninstaller);
        assert_eq!(layout.metadata_resource_segments.len(), 1);

        let range = layout.operations_range();
        let mut buf = vec![0u8; range.length as usize];
        reader.file.seek(SeekFrom::Start(range.offset)).unwrap();
        reader.file.read_exact(&mut buf).unwrap();

        let decoded = decode_operations(&buf).unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].name(), "Mkdir");
        assert_eq!(decoded[0].argument(0), Some("/opt/demo"));

        let index = payload::read_component_index(&mut reader.file, &layout).unwrap();
        assert!(index.is_empty());
    }

    #[test]
    fn resource_override_replaces_segment_zero_only() {
        let dir = tempfile::tempdir().unwrap();
        let stub_path = dir.path().join("installer");
        build_stub_installer(&stub_path);

        let dest = dir.path().join("maintenancetool");
        let writer = UninstallerWriter::new(&stub_path);
        let new_path = writer.write(&dest, &[], Some(b"<override/>")).unwrap();

        let (mut reader, layout) = payload::open(&new_path).unwrap();
        let segment = layout.metadata_resource_segments[0];
        let mut buf = vec![0u8; segment.length as usize];
        reader.file.seek(SeekFrom::Start(segment.offset)).unwrap();
        reader.file.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"<override/>");
    }
}
