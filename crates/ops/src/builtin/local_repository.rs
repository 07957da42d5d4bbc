// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

use std::fs;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

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
    let installer_path = op
        .argument(0)
        .ok_or_else(|| OperationError::invalid("CreateLocalRepository", "missing installer_path argument"))?
        .to_string();
    let target_dir = PathBuf::from(
        op.argument(1)
            .ok_or_else(|| OperationError::invalid("CreateLocalRepository", "missing target_dir argument"))?,
    );

    let (reader, layout) =
        payload::open(&installer_path).map_err(|e| OperationError::user_defined("CreateLocalRepository", e.to_string()))?;
    let metadata_segments = read_metadata_segments(&installer_path, &layout)
        .map_err(|e| OperationError::user_defined("CreateLocalRepository", e.to_string()))?;
    let store = archive::ArchiveStore::open_payload(reader, &layout)
        .map_err(|e| OperationError::user_defined("CreateLocalRepository", e.to_string()))?;

    fs::create_dir_all(&target_dir).map_err(|e| OperationError::user_defined("CreateLocalRepository", e.to_string()))?;
    let mut created = Vec::new();

    for (i, bytes) in metadata_segments.into_iter().enumerate() {
        let out = target_dir.join(format!("metadata-{i}.bin"));
        fs::write(&out, bytes).map_err(|e| OperationError::user_defined("CreateLocalRepository", e.to_string()))?;
        created.push(out);
    }

    let component_names: Vec<Vec<u8>> = store.component_names().map(|n| n.to_vec()).collect();
    for name in component_names {
        let archives = store
            .archives_for(&name)
            .map_err(|e| OperationError::user_defined("CreateLocalRepository", e.to_string()))?;
        let component_dir = target_dir.join(String::from_utf8_lossy(&name).into_owned());

        for mut archive in archives {
            let out = component_dir.join(String::from_utf8_lossy(archive.name()).into_owned());
            if let Some(parent) = out.parent() {
                fs::create_dir_all(parent).map_err(|e| OperationError::user_defined("CreateLocalRepository", e.to_string()))?;
            }
            let mut reader = archive
                .open()
                .map_err(|e| OperationError::user_defined("CreateLocalRepository", e.to_string()))?;
            let mut out_file =
                fs::File::create(&out).map_err(|e| OperationError::user_defined("CreateLocalRepository", e.to_string()))?;
            std::io::copy(&mut reader, &mut out_file)
                .map_err(|e| OperationError::user_defined("CreateLocalRepository", e.to_string()))?;
            drop(reader);
            archive.close();
            created.push(out);
        }
    }

    let manifest = created.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join("\n");
    op.set_value("_created_files", manifest);
    op.set_value("_created_dir", target_dir.display().to_string());
    Ok(true)
}

fn read_metadata_segments(installer_path: &str, layout: &payload::BinaryLayout) -> std::io::Result<Vec<Vec<u8>>> {
    let mut file = fs::File::open(installer_path)?;
    let mut out = Vec::new();
    for range in &layout.metadata_resource_segments {
        let mut buf = vec![0u8; range.length as usize];
        file.seek(SeekFrom::Start(layout.data_block_start + range.offset))?;
        file.read_exact(&mut buf)?;
        out.push(buf);
    }
    Ok(out)
}

fn undo(op: &mut Operation, _ctx: &mut dyn Context) -> Result<bool, OperationError> {
    if let Some(manifest) = op.value("_created_files").map(str::to_string) {
        for file in manifest.lines() {
            let _ = fs::remove_file(file);
        }
    }
    if let Some(dir) = op.value("_created_dir").map(str::to_string) {
        let _ = fs::remove_dir(Path::new(&dir));
    }
    Ok(true)
}
