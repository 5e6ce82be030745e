// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Family IDs carried in a UF2 block's `file_size_or_id` field when the
//! "family id present" flag (bit 13 of `flags`) is set.

/// 32-bit constant identifying the CPU variant a UF2 block targets.
pub type FamilyId = u32;

/// The small MCU variant: no address-translation unit, 28-byte vector hole.
pub const PLATFORM_A: FamilyId = 0xE48B_FF56;
/// The larger SoC variant, Arm secure world.
pub const PLATFORM_B_ARM_S: FamilyId = 0xE48B_FF59;
/// The larger SoC variant, RISC-V core.
pub const PLATFORM_B_RISCV: FamilyId = 0xE48B_FF5A;
/// The larger SoC variant, Arm non-secure world.
pub const PLATFORM_B_ARM_NS: FamilyId = 0xE48B_FF5B;
/// Used only to tag the silicon-erratum workaround block; never a real
/// flash target.
pub const ABSOLUTE: FamilyId = 0xE48B_FF57;

/// Address used by the silicon-erratum workaround block. A file whose first
/// real block has this family/address/`block_no` combination gets that
/// block stripped by [`crate::Uf2Reader`] before validation ever sees it.
pub const ABSOLUTE_ERRATUM_ADDR: u32 = 0x10FF_FF00;
