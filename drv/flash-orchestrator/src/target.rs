// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use proginfo_api::{FlashDriver, ProgInfoLayout, RamResident};
use uf2::FamilyId;

/// Per-platform capability the orchestrator depends on. `platform-a-target`
/// and `platform-b-target` each provide one concrete implementation;
/// `FlashOrchestrator` itself knows nothing about address translation,
/// vector-hole size, or whether the platform has a filename slot.
pub trait Target {
    type Flash: FlashDriver + RamResident;

    fn flash(&mut self) -> &mut Self::Flash;

    /// Lowest address of the flash chip (`XIP_BASE`). The second-stage
    /// boot stub lives at `[flash_base(), flash_base() + boot_stub_len())`.
    fn flash_base(&self) -> u32;

    /// One past the last byte of flash the application may use. Read once
    /// at start-of-day by the caller (from a linker symbol on platform A,
    /// from the partition table on platform B) and threaded in here at
    /// construction — never a mutable global.
    fn flash_end(&self) -> u32;

    /// The family ID this device's UF2 blocks must carry.
    fn accepted_family(&self) -> FamilyId;

    /// Layout of the program-info record within the application's vector
    /// table.
    fn proginfo_layout(&self) -> ProgInfoLayout;

    /// Whether this platform has a second-stage boot stub that must be
    /// preserved across an update (platform A: yes; platform B: no).
    fn preserve_boot_stub(&self) -> bool;

    /// Length of the boot stub in bytes (0 when `preserve_boot_stub()` is
    /// false).
    fn boot_stub_len(&self) -> u32;

    /// Whether `load()` should perform the proginfo commit (overlay +
    /// reprogram of the first page). Platform A: yes. Platform B: no —
    /// the boot ROM's own partition table is the source of truth for
    /// which application is live, so there is nothing to commit here.
    fn commits_proginfo(&self) -> bool;
}
