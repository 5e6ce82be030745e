// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Streaming parser and validator for the UF2 firmware container format.
//!
//! A UF2 file is a flat sequence of 512-byte blocks, each carrying one
//! 256-byte flash page plus its destination address. This crate reads
//! that sequence one block at a time off a [`reader::BlockSource`] — it
//! never needs the whole file in memory — stripping the silicon-erratum
//! workaround block encoders sometimes prepend, and validating each block
//! against the target's family ID and flash geometry before handing back
//! an address/payload pair ready to write.

#![cfg_attr(not(test), no_std)]

mod block;
pub mod family;
mod reader;
mod validator;

pub use block::{RawUf2Block, MAGIC_END, MAGIC_START_0, MAGIC_START_1, PAGE_SIZE, SECTOR_SIZE};
pub use family::FamilyId;
pub use reader::{BlockSource, Next, Uf2Reader};
pub use validator::{Outcome, RejectReason, SkipReason, ValidatorState};
