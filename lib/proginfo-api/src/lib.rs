// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared types between `flash-orchestrator` and the per-platform target
//! crates: the flash driver traits, the program-info record layout, and
//! the volatile boot-command slot. Plays the role `drv-update-api` plays
//! for Hubris' update servers, minus the IPC wire format — there is no
//! task boundary here, just a trait boundary.

#![cfg_attr(not(test), no_std)]

mod bootcmd;
mod flash;
mod proginfo;

pub use bootcmd::{bootcmd_set, bootcmd_take, BootMode, ScratchRegs};
pub use flash::{FlashDriver, FlashRead, RamResident};
pub use proginfo::{ImageVersion, ProgInfoLayout, PROGINFO_MAGIC};

/// Flash program granularity, shared by every crate in the workspace.
pub const PAGE_SIZE: usize = 256;
/// Flash erase granularity.
pub const SECTOR_SIZE: u32 = 4096;
