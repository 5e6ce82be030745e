// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The pure decision half of the stage-3 dispatcher: given whatever the UI
//! left in the boot-command slot (already consumed via
//! `proginfo_api::bootcmd_take`) and whether the flashed application's
//! proginfo record is valid, decide what stage-3 should do. Kept free of
//! any MMIO or asm so it is exercised directly by host unit tests; the
//! `no_std`/`no_main` binary in `main.rs` is the thin, untestable shim
//! that turns a `Decision` into an irreversible jump.

#![cfg_attr(not(test), no_std)]

use proginfo_api::BootMode;

/// What stage-3 does this boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Launch the flashed application.
    BootApp,
    /// Bring up the SD-card directory-browser UI.
    EnterUi,
    /// Enter USB mass-storage firmware-recovery mode.
    EnterUsbUpdate,
    /// Copy the named file into RAM and execute it from there.
    BootRam { filename_ptr: u32 },
}

/// `cmd` is whatever `bootcmd_take` returned (already one-shot: the
/// validity tag has already been cleared by the time this is called).
/// `proginfo_valid` is the live state of the flashed application's
/// program-info record.
pub fn decide(cmd: Option<(BootMode, u32)>, proginfo_valid: bool) -> Decision {
    match cmd {
        Some((BootMode::Sd, _)) => Decision::EnterUi,
        Some((BootMode::Update, _)) => Decision::EnterUsbUpdate,
        Some((BootMode::Ram, arg)) => Decision::BootRam { filename_ptr: arg },
        Some((BootMode::Default, _)) | None => {
            if proginfo_valid {
                Decision::BootApp
            } else {
                Decision::EnterUi
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sd_command_always_enters_ui() {
        assert_eq!(decide(Some((BootMode::Sd, 0)), true), Decision::EnterUi);
        assert_eq!(decide(Some((BootMode::Sd, 0)), false), Decision::EnterUi);
    }

    #[test]
    fn update_command_enters_usb_recovery() {
        assert_eq!(
            decide(Some((BootMode::Update, 0)), true),
            Decision::EnterUsbUpdate
        );
    }

    #[test]
    fn ram_command_carries_its_argument() {
        assert_eq!(
            decide(Some((BootMode::Ram, 0xDEAD_0000)), true),
            Decision::BootRam {
                filename_ptr: 0xDEAD_0000
            }
        );
    }

    #[test]
    fn default_command_boots_app_when_proginfo_valid() {
        assert_eq!(decide(Some((BootMode::Default, 0)), true), Decision::BootApp);
    }

    #[test]
    fn default_command_enters_ui_when_no_app() {
        assert_eq!(decide(Some((BootMode::Default, 0)), false), Decision::EnterUi);
    }

    #[test]
    fn no_command_behaves_like_default() {
        assert_eq!(decide(None, true), Decision::BootApp);
        assert_eq!(decide(None, false), Decision::EnterUi);
    }
}
