// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Partition table lookup and `XIP_BASE` address-translation window setup.
//!
//! Platform B has no linker-fixed flash_end: which half of flash is "the
//! application" depends on which partition the boot ROM chose this boot,
//! recorded in a small table at a fixed flash offset. The loader reads
//! that table once at start-of-day and uses it both to answer
//! `flash_end()` and to program the translation window so that `XIP_BASE`
//! in the orchestrator's address space lands on the chosen partition's
//! first byte.

const PARTITION_TABLE_ADDR: u32 = 0x0000_1000;
const PARTITION_MAGIC: u32 = 0x5054_4142; // "PTAB"
const WINDOW_ALIGN: u32 = 4096;

pub const XIP_BASE: u32 = 0x1000_0000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    /// Physical flash offset of this partition's first byte.
    pub phys_base: u32,
    /// Size of this partition in bytes.
    pub len: u32,
}

/// Reads the two-partition table and reports which one is active. The
/// table's own "active" slot is written by the boot ROM immediately before
/// handing control to the loader; a corrupt or missing table is fatal,
/// mirroring the `InvalidLoader` treatment `flash_end()` gets when absent
/// on either platform.
pub fn read_active_partition(flash_read: impl Fn(u32, &mut [u8])) -> Option<Partition> {
    let mut header = [0u8; 4];
    flash_read(PARTITION_TABLE_ADDR, &mut header);
    if u32::from_le_bytes(header) != PARTITION_MAGIC {
        return None;
    }
    let mut active = [0u8; 1];
    flash_read(PARTITION_TABLE_ADDR + 4, &mut active);
    let slot = if active[0] == 0 { 0 } else { 1 };

    let mut entry = [0u8; 8];
    flash_read(PARTITION_TABLE_ADDR + 8 + slot as u32 * 8, &mut entry);
    let phys_base = u32::from_le_bytes(entry[0..4].try_into().unwrap());
    let len = u32::from_le_bytes(entry[4..8].try_into().unwrap());
    if phys_base % WINDOW_ALIGN != 0 || len == 0 {
        return None;
    }
    Some(Partition { phys_base, len })
}
