// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use flash_orchestrator::Target;
use proginfo_api::ProgInfoLayout;
use uf2::family;

use crate::flash::QspiFlash;

extern "C" {
    /// Provided by the linker script; marks the first address past the
    /// last sector this device's flash part actually has. Reading its
    /// address (not its contents) gives us the byte offset.
    static __flash_end: u8;
}

const FLASH_BASE: u32 = 0x1000_0000;

/// Page address of the application's vector table; `preserve_boot_stub`
/// reserves the page at `FLASH_BASE` for the boot stub, so the app (and its
/// proginfo hole) starts one page later.
pub const APP_VECTOR_TABLE: u32 = FLASH_BASE + uf2::PAGE_SIZE as u32;

/// The platform-A proginfo record sits 0x10 bytes into the vector-table's
/// reserved hole, 28 bytes long including the filename.
const PROGINFO_OFFSET: usize = 0x10;
const PROGINFO_LEN: usize = 28;

/// Address of the proginfo magic word once committed, used by `stage3` to
/// decide whether the flashed application is bootable.
pub const PROGINFO_MAGIC_ADDR: u32 = APP_VECTOR_TABLE + PROGINFO_OFFSET as u32;

pub struct PlatformA {
    flash: QspiFlash,
    flash_end: u32,
}

impl PlatformA {
    /// # Safety
    /// `qspi_regs_base` must be this chip's QSPI controller register base,
    /// and this must be called at most once during start-of-day init.
    pub unsafe fn new(qspi_regs_base: usize) -> Self {
        let flash_end = FLASH_BASE + &__flash_end as *const u8 as u32;
        PlatformA {
            flash: QspiFlash::new(qspi_regs_base),
            flash_end,
        }
    }
}

impl Target for PlatformA {
    type Flash = QspiFlash;

    fn flash(&mut self) -> &mut QspiFlash {
        &mut self.flash
    }

    fn flash_base(&self) -> u32 {
        FLASH_BASE
    }

    fn flash_end(&self) -> u32 {
        self.flash_end
    }

    fn accepted_family(&self) -> uf2::FamilyId {
        family::PLATFORM_A
    }

    fn proginfo_layout(&self) -> ProgInfoLayout {
        ProgInfoLayout::new(APP_VECTOR_TABLE, PROGINFO_OFFSET, PROGINFO_LEN, true)
    }

    fn preserve_boot_stub(&self) -> bool {
        true
    }

    fn boot_stub_len(&self) -> u32 {
        uf2::PAGE_SIZE as u32
    }

    fn commits_proginfo(&self) -> bool {
        true
    }
}
