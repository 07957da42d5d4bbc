// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! Putting the freshly written `<dest>.new` in place of `dest`. A running
//! executable can rename over itself on Unix, but not on Windows, where
//! the old file stays locked until the process exits -- so the Windows
//! side hands the rename to a detached helper script instead of doing it
//! inline.

use std::path::{Path, PathBuf};

pub trait PlatformRename {
    /// Puts `new_path` in place of `dest`. When `restart_as_updater` is
    /// set, the replaced binary is started again with `--updater` once
    /// the swap lands.
    fn commit(&self, new_path: &Path, dest: &Path, restart_as_updater: bool) -> std::io::Result<()>;
}

#[cfg(not(windows))]
pub struct UnixRename;

#[cfg(not(windows))]
impl Default for UnixRename {
    fn default() -> Self {
        Self
    }
}

#[cfg(not(windows))]
impl PlatformRename for UnixRename {
    fn commit(&self, new_path: &Path, dest: &Path, restart_as_updater: bool) -> std::io::Result<()> {
        fs_err::rename(new_path, dest)?;
        if restart_as_updater {
            std::process::Command::new(dest).arg("--updater").spawn()?;
        }
        Ok(())
    }
}

#[cfg(windows)]
pub struct WindowsRename;

#[cfg(windows)]
impl Default for WindowsRename {
    fn default() -> Self {
        Self
    }
}

#[cfg(windows)]
impl PlatformRename for WindowsRename {
    fn commit(&self, new_path: &Path, dest: &Path, restart_as_updater: bool) -> std::io::Result<()> {
        let script_path = detached_script_path(dest);
        std::fs::write(&script_path, render_script(new_path, dest, restart_as_updater))?;
        std::process::Command::new("cmd")
            .args(["/C", "start", "/min", "", script_path.to_str().unwrap_or_default()])
            .spawn()?;
        Ok(())
    }
}

#[cfg(windows)]
fn detached_script_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_stem().unwrap_or_default().to_os_string();
    name.push("-finish-update.bat");
    dest.with_file_name(name)
}

#[cfg(windows)]
fn render_script(new_path: &Path, dest: &Path, restart_as_updater: bool) -> String {
    let restart = if restart_as_updater {
        format!("start \"\" \"{}\" --updater\r\n", dest.display())
    } else {
        String::new()
    };
    format!(
        "@echo off\r\n\
         ping 127.0.0.1 -n 2 >nul\r\n\
         move /Y \"{new}\" \"{dest}\"\r\n\
         {restart}\
         del \"%~f0\"\r\n",
        new = new_path.display(),
        dest = dest.display(),
        restart = restart,
    )
}

#[cfg(not(windows))]
#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;

    #[test]
    fn renames_the_new_file_over_the_destination() {
        let dir = tempfile::tempdir().unwrap();
        let new_path = dir.path().join("tool.new");
        let dest = dir.path().join("tool");

        std::fs::File::create(&new_path).unwrap().write_all(b"new").unwrap();
        std::fs::File::create(&dest).unwrap().write_all(b"old").unwrap();

        UnixRename.commit(&new_path, &dest, false).unwrap();

        assert!(!new_path.exists());
        assert_eq!(std::fs::read(&dest).unwrap(), b"new");
    }
}
