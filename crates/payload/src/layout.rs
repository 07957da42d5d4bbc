// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

use std::{
    fs::File,
    io::{Read, Seek, SeekFrom},
    path::{Path, PathBuf},
};

use log::{debug, trace, warn};

use crate::{
    cookie::{MagicCookie, MagicMarker},
    error::LayoutError,
    io_ext::ReadExt,
};

/// The maximum number of trailing bytes scanned for the magic cookie.
/// Kept at 1 MiB for bit-compatibility with installers produced by prior
/// tooling; widening it is a deliberate choice, not a default to drift on.
pub const MAX_COOKIE_SEARCH: u64 = 1024 * 1024;

/// A byte range, always relative to `data_block_start` once returned from
/// [`BinaryLayout`] accessors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub offset: u64,
    pub length: u64,
}

impl ByteRange {
    pub fn end(&self) -> u64 {
        self.offset + self.length
    }
}

/// The trailer descriptor read from the tail of an executable or
/// companion data file.
#[derive(Debug, Clone)]
pub struct BinaryLayout {
    pub operations: ByteRange,
    pub data_block_size: u64,
    pub data_block_start: u64,
    pub end_of_data: u64,
    pub magic_marker: MagicMarker,
    pub magic_cookie: MagicCookie,
    pub metadata_resource_segments: Vec<ByteRange>,
    pub component_index: ByteRange,
}

impl BinaryLayout {
    /// Absolute operations-log byte range (not relative to the data block
    /// -- callers combining this with archive reads should use
    /// `data_block_start` as the base).
    pub fn operations_range(&self) -> ByteRange {
        ByteRange {
            offset: self.data_block_start + self.operations.offset,
            length: self.operations.length.saturating_sub(self.operations.offset),
        }
    }
}

/// An open payload source: either the executable itself, or its
/// `.dat` companion when the executable is code-signed and cannot carry
/// appended data.
pub struct Reader {
    pub file: File,
    pub identity_path: PathBuf,
    pub data_path: PathBuf,
}

impl Reader {
    fn seek_read_exact(&mut self, pos: u64, buf: &mut [u8]) -> Result<(), LayoutError> {
        self.file.seek(SeekFrom::Start(pos))?;
        self.file.read_exact(buf)?;
        Ok(())
    }
}

/// Locate the trailer and open the payload for `exe_path`, following the
/// companion-`.dat` indirection when the executable's own marker isn't
/// the installer marker.
pub fn open(exe_path: impl AsRef<Path>) -> Result<(Reader, BinaryLayout), LayoutError> {
    let exe_path = exe_path.as_ref();
    let mut file = File::open(exe_path)?;
    let layout = read_trailer(&mut file, exe_path)?;

    if layout.magic_marker == MagicMarker::Installer {
        return Ok((
            Reader {
                file,
                identity_path: exe_path.to_path_buf(),
                data_path: exe_path.to_path_buf(),
            },
            layout,
        ));
    }

    for candidate in companion_dat_candidates(exe_path) {
        if !candidate.exists() {
            continue;
        }
        let mut companion = File::open(&candidate)?;
        match read_trailer(&mut companion, &candidate) {
            Ok(companion_layout) if companion_layout.magic_cookie == MagicCookie::SeparatedData => {
                debug!("using companion data file {candidate:?} for {exe_path:?}");
                return Ok((
                    Reader {
                        file: companion,
                        identity_path: exe_path.to_path_buf(),
                        data_path: candidate,
                    },
                    companion_layout,
                ));
            }
            Ok(_) => continue,
            Err(_) => continue,
        }
    }

    Ok((
        Reader {
            file,
            identity_path: exe_path.to_path_buf(),
            data_path: exe_path.to_path_buf(),
        },
        layout,
    ))
}

/// The `.dat` may sit beside the executable, or one level up in a
/// `Resources` sibling directory on macOS-style app bundles.
fn companion_dat_candidates(exe_path: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    let Some(stem) = exe_path.file_stem() else {
        return out;
    };
    let dat_name = {
        let mut s = stem.to_os_string();
        s.push(".dat");
        s
    };

    if let Some(parent) = exe_path.parent() {
        out.push(parent.join(&dat_name));

        // macOS app bundle: .../Contents/MacOS/App -> .../Contents/Resources/App.dat
        if parent.file_name().map(|n| n == "MacOS").unwrap_or(false) {
            if let Some(contents) = parent.parent() {
                out.push(contents.join("Resources").join(&dat_name));
            }
        }
    }

    out
}

fn read_trailer(file: &mut File, path: &Path) -> Result<BinaryLayout, LayoutError> {
    let file_size = file.metadata()?.len();
    let search_window = MAX_COOKIE_SEARCH.min(file_size);

    let cookie_pos = find_cookie(file, file_size, search_window)
        .ok_or_else(|| LayoutError::MagicNotFound(path.to_path_buf(), search_window))?;

    trace!("magic cookie for {path:?} found at offset {cookie_pos}");

    let magic_cookie = MagicCookie::from_u64({
        file.seek(SeekFrom::Start(cookie_pos))?;
        file.read_u64()?
    })
    .ok_or_else(|| LayoutError::MagicNotFound(path.to_path_buf(), search_window))?;

    const TRAILER_FIELDS: u64 = 5;
    const INDEX_SIZE: u64 = 6 * 8;

    let trailer_start = cookie_pos
        .checked_sub(TRAILER_FIELDS * 8)
        .ok_or(LayoutError::CorruptTrailer {
            offset: cookie_pos,
            reason: "trailer would start before the file",
        })?;

    file.seek(SeekFrom::Start(trailer_start))?;
    let operations_start = file.read_i64()?;
    let operations_end = file.read_i64()?;
    let resource_count = file.read_i64()?;
    let data_block_size = file.read_i64()?;
    let magic_marker_raw = file.read_i64()?;

    if resource_count < 0 || data_block_size < 0 {
        return Err(LayoutError::CorruptTrailer {
            offset: trailer_start,
            reason: "negative resource_count or data_block_size",
        });
    }
    let resource_count = resource_count as u64;
    let data_block_size = data_block_size as u64;

    let magic_marker = MagicMarker::from_i64(magic_marker_raw)
        .ok_or(LayoutError::UnknownMarker(magic_marker_raw))?;

    let end_of_data = cookie_pos + 8;
    let data_block_start = end_of_data
        .checked_sub(data_block_size)
        .ok_or(LayoutError::CorruptTrailer {
            offset: end_of_data,
            reason: "data_block_size larger than end_of_data",
        })?;

    let mut metadata_resource_segments = Vec::with_capacity(resource_count as usize);
    for i in 0..resource_count {
        let pos = end_of_data - INDEX_SIZE - 2 * 8 * (i + 1);
        file.seek(SeekFrom::Start(pos))?;
        let offset = file.read_i64()? as u64 + data_block_start;
        let length = file.read_i64()? as u64;
        metadata_resource_segments.push(ByteRange { offset, length });
    }

    let resource_section_start = end_of_data - INDEX_SIZE - 2 * 8 * resource_count;
    let component_index_offset_pos = resource_section_start
        .checked_sub(16)
        .ok_or(LayoutError::CorruptTrailer {
            offset: resource_section_start,
            reason: "no room for component index offset/length",
        })?;

    file.seek(SeekFrom::Start(component_index_offset_pos))?;
    let component_index_offset = file.read_i64()? as u64 + data_block_start;
    let component_index_length = file.read_i64()? as u64;

    let layout = BinaryLayout {
        operations: ByteRange {
            offset: operations_start as u64,
            length: operations_end as u64,
        },
        data_block_size,
        data_block_start,
        end_of_data,
        magic_marker,
        magic_cookie,
        metadata_resource_segments,
        component_index: ByteRange {
            offset: component_index_offset,
            length: component_index_length,
        },
    };

    validate_segments(&layout, path)?;

    Ok(layout)
}

fn validate_segments(layout: &BinaryLayout, path: &Path) -> Result<(), LayoutError> {
    for segment in &layout.metadata_resource_segments {
        if segment.offset < layout.data_block_start || segment.end() > layout.end_of_data {
            warn!("metadata resource segment in {path:?} falls outside the data block");
            return Err(LayoutError::CorruptTrailer {
                offset: segment.offset,
                reason: "metadata resource segment outside data block",
            });
        }
    }
    if layout.component_index.offset < layout.data_block_start
        || layout.component_index.end() > layout.end_of_data
    {
        return Err(LayoutError::CorruptTrailer {
            offset: layout.component_index.offset,
            reason: "component index outside data block",
        });
    }
    Ok(())
}

/// Scan backward byte-by-byte from the last possible aligned position
/// (`search_window - 8`), decrementing by one byte until a match is found
/// or the window is exhausted. Uses a memory map when one can be built,
/// falling back to a plain sequential read of the tail window otherwise;
/// both paths must agree on the offset found.
fn find_cookie(file: &mut File, file_size: u64, search_window: u64) -> Option<u64> {
    if search_window < 8 {
        return None;
    }

    let window_start = file_size - search_window;

    if let Some(map) = unsafe { memmap2::Mmap::map(&*file) }.ok() {
        let window = &map[window_start as usize..];
        return scan_window(window, window_start, search_window);
    }

    let mut buf = vec![0u8; search_window as usize];
    file.seek(SeekFrom::Start(window_start)).ok()?;
    file.read_exact(&mut buf).ok()?;
    scan_window(&buf, window_start, search_window)
}

fn scan_window(buf: &[u8], window_start: u64, search_window: u64) -> Option<u64> {
    let mut candidate = (search_window - 8) as usize;
    loop {
        let slice = buf.get(candidate..candidate + 8)?;
        let value = u64::from_le_bytes(slice.try_into().ok()?);
        if MagicCookie::from_u64(value).is_some() {
            return Some(window_start + candidate as u64);
        }
        if candidate == 0 {
            return None;
        }
        candidate -= 1;
    }
}

#[cfg(test)]
mod test {
    use std::io::Write;

    use super::*;
    use crate::{io_ext::WriteExt, writer};

    #[test]
    fn finds_cookie_and_parses_trailer() {
        let mut dir_file = tempfile::NamedTempFile::new().unwrap();

        // metadata resource 0
        dir_file.write_all(b"meta-resource-bytes").unwrap();
        let resource_offset = 0i64;
        let resource_length = 20i64;

        // component data segment (empty index: zero components)
        let component_index_offset = dir_file.as_file().metadata().unwrap().len() as i64;
        let mut component_index = Vec::new();
        component_index.write_i64(0).unwrap();
        component_index.write_i64(0).unwrap();

        let trailer = writer::TrailerInput {
            operations_start: 0,
            operations_end: 0,
            resources: vec![(resource_offset, resource_length)],
            component_index_offset,
            component_index,
            magic_marker: MagicMarker::Installer,
            magic_cookie: MagicCookie::Installer,
        };
        let data_block_start = dir_file.as_file().metadata().unwrap().len();
        writer::write_trailer(dir_file.as_file_mut(), &trailer).unwrap();

        let path = dir_file.path().to_path_buf();
        drop(dir_file);

        let (_, layout) = open(&path).unwrap();
        assert_eq!(layout.magic_marker, MagicMarker::Installer);
        assert_eq!(layout.data_block_start, data_block_start);
        assert_eq!(layout.metadata_resource_segments.len(), 1);
        assert_eq!(
            layout.metadata_resource_segments[0],
            ByteRange {
                offset: data_block_start,
                length: 20
            }
        );
    }

    #[test]
    fn missing_cookie_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0u8; 64]).unwrap();
        let path = file.path().to_path_buf();
        drop(file);

        let err = open(&path).unwrap_err();
        assert!(matches!(err, LayoutError::MagicNotFound(_, _)));
    }
}
