// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

/// Fixed 64-bit tags anchoring the trailer of an appended binary payload.
///
/// These values are wire format and MUST NOT change: a reader built from a
/// later revision of this crate must still be able to open a payload
/// produced by an earlier one.
#[repr(u64)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MagicCookie {
    /// Installer executable, carries a full component payload.
    Installer = 0xd2c7_1821_29bf_8ed0,
    /// Uninstaller / maintenance tool, carries only the undo log.
    Uninstaller = 0x3924_f12c_8a55_d7b6,
    /// Self-updater role: same trailer shape as the installer, but the
    /// marker field distinguishes intent for `--update-installerbase`.
    Updater = 0x7b0e_4c9a_1f66_33ad,
    /// Payload lives in a companion `.dat` file because the executable is
    /// code-signed and cannot carry appended data.
    SeparatedData = 0x55aa_0f3d_9c27_6e41,
}

impl MagicCookie {
    const ALL: [MagicCookie; 4] = [
        MagicCookie::Installer,
        MagicCookie::Uninstaller,
        MagicCookie::Updater,
        MagicCookie::SeparatedData,
    ];

    pub fn as_u64(self) -> u64 {
        self as u64
    }

    pub fn from_u64(value: u64) -> Option<Self> {
        Self::ALL.into_iter().find(|cookie| cookie.as_u64() == value)
    }
}

/// The role recorded in the trailer's `magic_marker` field.
#[repr(i64)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MagicMarker {
    Installer = 1,
    Uninstaller = 2,
    Updater = 3,
    PackageManager = 4,
}

impl MagicMarker {
    pub fn from_i64(value: i64) -> Option<Self> {
        Some(match value {
            1 => Self::Installer,
            2 => Self::Uninstaller,
            3 => Self::Updater,
            4 => Self::PackageManager,
            _ => return None,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn round_trips_all_variants() {
        for cookie in MagicCookie::ALL {
            assert_eq!(MagicCookie::from_u64(cookie.as_u64()), Some(cookie));
        }
    }

    #[test]
    fn unknown_value_is_none() {
        assert_eq!(MagicCookie::from_u64(0), None);
    }
}
