// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! Small little-endian read/write helpers, in the style of `stone`'s
//! `ReadExt` trait: every primitive field in the wire format is an LE
//! integer or a length-prefixed byte string (`varbytes`).

use std::io::{self, Read, Write};

pub trait ReadExt: Read {
    fn read_i64(&mut self) -> io::Result<i64> {
        let mut buf = [0u8; 8];
        self.read_exact(&mut buf)?;
        Ok(i64::from_le_bytes(buf))
    }

    fn read_u64(&mut self) -> io::Result<u64> {
        let mut buf = [0u8; 8];
        self.read_exact(&mut buf)?;
        Ok(u64::from_le_bytes(buf))
    }

    fn read_varbytes(&mut self) -> io::Result<Vec<u8>> {
        let len = self.read_i64()?;
        let len = usize::try_from(len).map_err(|_| {
            io::Error::new(io::ErrorKind::InvalidData, "negative varbytes length")
        })?;
        let mut buf = vec![0u8; len];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }
}

impl<R: Read + ?Sized> ReadExt for R {}

pub trait WriteExt: Write {
    fn write_i64(&mut self, value: i64) -> io::Result<()> {
        self.write_all(&value.to_le_bytes())
    }

    fn write_u64(&mut self, value: u64) -> io::Result<()> {
        self.write_all(&value.to_le_bytes())
    }

    fn write_varbytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.write_i64(bytes.len() as i64)?;
        self.write_all(bytes)
    }
}

impl<W: Write + ?Sized> WriteExt for W {}
