// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

use std::fs;
use std::path::{Path, PathBuf};

use zip::ZipArchive;

use crate::error::OperationError;
use crate::operation::{Context, Operation};
use crate::registry::Handlers;

pub const HANDLERS: Handlers = Handlers {
    backup,
    perform,
    undo,
};

fn backup(_op: &mut Operation, _ctx: &mut dyn Context) -> Result<(), OperationError> {
    Ok(())
}

fn perform(op: &mut Operation, _ctx: &mut dyn Context) -> Result<bool, OperationError> {
    let archive = op
        .argument(0)
        .ok_or_else(|| OperationError::invalid("Extract", "missing archive argument"))?;
    let dst = PathBuf::from(
        op.argument(1)
            .ok_or_else(|| OperationError::invalid("Extract", "missing destination argument"))?,
    );

    let extracted = extract_to(Path::new(archive), &dst).map_err(|e| OperationError::user_defined("Extract", e.to_string()))?;
    let manifest = extracted
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join("\n");
    op.set_value("_extracted_manifest", manifest);
    Ok(true)
}

fn extract_to(archive_path: &Path, dest_dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let file = fs::File::open(archive_path)?;
    let mut zip = ZipArchive::new(file).map_err(std::io::Error::other)?;
    let mut extracted = Vec::new();

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i).map_err(std::io::Error::other)?;
        let Some(name) = entry.enclosed_name() else {
            continue;
        };
        let out_path = dest_dir.join(name);

        if entry.is_dir() {
            fs::create_dir_all(&out_path)?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = fs::File::create(&out_path)?;
        std::io::copy(&mut entry, &mut out)?;
        extracted.push(out_path);
    }
    Ok(extracted)
}

fn undo(op: &mut Operation, _ctx: &mut dyn Context) -> Result<bool, OperationError> {
    let Some(manifest) = op.value("_extracted_manifest").map(str::to_string) else {
        return Ok(true);
    };
    for file in manifest.lines() {
        let _ = fs::remove_file(file);
    }
    Ok(true)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::operation::EngineValues;
    use std::io::Write;
    use zip::write::FileOptions;

    #[test]
    fn extract_then_undo_removes_every_entry() {
        let tmp = tempfile::tempdir().unwrap();
        let archive_path = tmp.path().join("bundle.zip");
        {
            let file = fs::File::create(&archive_path).unwrap();
            let mut writer = zip::ZipWriter::new(file);
            writer.start_file("a.txt", FileOptions::<()>::default()).unwrap();
            writer.write_all(b"hello").unwrap();
            writer.finish().unwrap();
        }

        let dst = tmp.path().join("out");
        let mut op = Operation::with_arguments(
            "Extract",
            vec![archive_path.display().to_string(), dst.display().to_string()],
        );
        let mut ctx = EngineValues::default();

        perform(&mut op, &mut ctx).unwrap();
        assert_eq!(fs::read(dst.join("a.txt")).unwrap(), b"hello");

        undo(&mut op, &mut ctx).unwrap();
        assert!(!dst.join("a.txt").exists());
    }
}
