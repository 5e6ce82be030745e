// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use flash_orchestrator::Target;
use proginfo_api::ProgInfoLayout;
use uf2::family;

use crate::flash::WindowedFlash;
use crate::partition::{Partition, XIP_BASE};

/// This variant has three family IDs, one per core/security-state
/// combination a given boot of the SoC can be running as. Exactly one is
/// live for the lifetime of a `PlatformB`; it is resolved
/// once at construction from whichever boot-time signal (secure/
/// non-secure vector, core ID register, ...) identifies the running core,
/// not re-checked per load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformBCore {
    ArmSecure,
    RiscV,
    ArmNonSecure,
}

impl PlatformBCore {
    fn family(self) -> uf2::FamilyId {
        match self {
            PlatformBCore::ArmSecure => family::PLATFORM_B_ARM_S,
            PlatformBCore::RiscV => family::PLATFORM_B_RISCV,
            PlatformBCore::ArmNonSecure => family::PLATFORM_B_ARM_NS,
        }
    }
}

/// The platform-B proginfo record sits 0x20 bytes into the vector-table's
/// reserved hole; this variant's hole has no room for a filename.
const PROGINFO_OFFSET: usize = 0x20;
const PROGINFO_LEN: usize = 12;

pub struct PlatformB {
    flash: WindowedFlash,
    core: PlatformBCore,
    partition: Partition,
}

impl PlatformB {
    /// # Safety
    /// `flash_regs_base` must be this chip's embedded-flash controller
    /// register base, `partition` must have just been read from the live
    /// partition table by [`crate::read_active_partition`], and this must
    /// be called at most once during start-of-day init — the address
    /// translation window is programmed as a side effect of constructing
    /// the underlying [`WindowedFlash`].
    pub unsafe fn new(flash_regs_base: usize, core: PlatformBCore, partition: Partition) -> Self {
        PlatformB {
            flash: WindowedFlash::new(flash_regs_base, partition),
            core,
            partition,
        }
    }
}

impl Target for PlatformB {
    type Flash = WindowedFlash;

    fn flash(&mut self) -> &mut WindowedFlash {
        &mut self.flash
    }

    fn flash_base(&self) -> u32 {
        XIP_BASE
    }

    fn flash_end(&self) -> u32 {
        XIP_BASE + self.partition.len
    }

    fn accepted_family(&self) -> uf2::FamilyId {
        self.core.family()
    }

    fn proginfo_layout(&self) -> ProgInfoLayout {
        ProgInfoLayout::new(XIP_BASE, PROGINFO_OFFSET, PROGINFO_LEN, false)
    }

    fn preserve_boot_stub(&self) -> bool {
        false
    }

    fn boot_stub_len(&self) -> u32 {
        0
    }

    fn commits_proginfo(&self) -> bool {
        // The boot ROM's partition table, not a proginfo record, is the
        // source of truth for which application is live on this variant;
        // there is nothing for the orchestrator to commit.
        false
    }
}
