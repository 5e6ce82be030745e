// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::block::{RawUf2Block, PAGE_SIZE};
use crate::family::FamilyId;

/// Why a block was passed over without being written anywhere. Not an
/// error: a UF2 file commonly carries blocks for more than one device, and
/// this device only cares about its own.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum SkipReason {
    /// `flags` bit 0 (not-main-flash) is set.
    NotMainFlash,
    /// The block carries a family ID and it isn't ours (this also catches
    /// a misplaced silicon-erratum block that [`crate::Uf2Reader`] didn't
    /// strip because it wasn't in the expected first-block position).
    ForeignFamily(FamilyId),
}

/// Why a block was refused outright. Any one of these aborts the whole
/// load; unlike [`SkipReason`] these indicate the file itself is malformed
/// or targets flash this device doesn't have.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum RejectReason {
    /// Start/end magic words didn't match the UF2 constants.
    BadMagic,
    /// `target_addr` isn't aligned to a page boundary.
    Unaligned(u32),
    /// `payload_size` wasn't exactly one flash page.
    BadPayloadSize(u32),
    /// `num_blocks == 0`, or `block_no >= num_blocks`.
    BlockNoOutOfRange { block_no: u32, num_blocks: u32 },
    /// `target_addr` (or `target_addr + PAGE_SIZE`) falls outside the
    /// flash region this platform exposes for application images.
    OutOfRange(u32),
    /// `num_blocks` changed partway through the file.
    InconsistentNumBlocks { expected: u32, got: u32 },
    /// This block's `block_no` isn't the next one expected.
    OutOfOrder { expected: u32, got: u32 },
    /// This block's `target_addr` doesn't continue the run of
    /// `first_addr + page * block_no` addresses the earlier blocks
    /// established.
    AddressSequenceBroken { expected: u32, got: u32 },
}

/// Result of validating one block against the running [`ValidatorState`].
pub enum Outcome<'a> {
    /// Accepted: write `payload` to `target_addr`.
    Accept {
        target_addr: u32,
        payload: &'a [u8],
    },
    Skip(SkipReason),
    Reject(RejectReason),
}

/// Per-file validation state threaded across every block in a UF2 stream.
/// Constructed fresh for each `load()` call; never reused across files.
pub struct ValidatorState {
    family: FamilyId,
    flash_base: u32,
    flash_end: u32,
    num_blocks: Option<u32>,
    first_addr: Option<u32>,
    next_block_no: u32,
}

impl ValidatorState {
    pub fn new(family: FamilyId, flash_base: u32, flash_end: u32) -> Self {
        ValidatorState {
            family,
            flash_base,
            flash_end,
            num_blocks: None,
            first_addr: None,
            next_block_no: 0,
        }
    }

    /// `num_blocks` promised by the file, once the first block has been
    /// seen. Used by the orchestrator to size the erase range.
    pub fn num_blocks(&self) -> Option<u32> {
        self.num_blocks
    }

    pub fn validate<'a>(&mut self, block: &'a RawUf2Block) -> Outcome<'a> {
        if !block.magics_valid() {
            return Outcome::Reject(RejectReason::BadMagic);
        }

        if block.not_main_flash() {
            return Outcome::Skip(SkipReason::NotMainFlash);
        }

        if block.target_addr % PAGE_SIZE as u32 != 0 {
            return Outcome::Reject(RejectReason::Unaligned(block.target_addr));
        }

        if block.payload_size != PAGE_SIZE as u32 {
            return Outcome::Reject(RejectReason::BadPayloadSize(block.payload_size));
        }

        if block.num_blocks == 0 || block.block_no >= block.num_blocks {
            return Outcome::Reject(RejectReason::BlockNoOutOfRange {
                block_no: block.block_no,
                num_blocks: block.num_blocks,
            });
        }

        if block.family_id_present() && block.file_size_or_id != self.family {
            return Outcome::Skip(SkipReason::ForeignFamily(block.file_size_or_id));
        }

        let end = match block.target_addr.checked_add(PAGE_SIZE as u32) {
            Some(end) => end,
            None => return Outcome::Reject(RejectReason::OutOfRange(block.target_addr)),
        };
        if block.target_addr < self.flash_base || end > self.flash_end {
            return Outcome::Reject(RejectReason::OutOfRange(block.target_addr));
        }

        match self.num_blocks {
            None => self.num_blocks = Some(block.num_blocks),
            Some(expected) if expected != block.num_blocks => {
                return Outcome::Reject(RejectReason::InconsistentNumBlocks {
                    expected,
                    got: block.num_blocks,
                });
            }
            Some(_) => {}
        }

        if block.block_no != self.next_block_no {
            return Outcome::Reject(RejectReason::OutOfOrder {
                expected: self.next_block_no,
                got: block.block_no,
            });
        }

        let first_addr = *self.first_addr.get_or_insert(block.target_addr);
        let expected_addr = first_addr + PAGE_SIZE as u32 * self.next_block_no;
        if block.target_addr != expected_addr {
            return Outcome::Reject(RejectReason::AddressSequenceBroken {
                expected: expected_addr,
                got: block.target_addr,
            });
        }

        self.next_block_no = self.next_block_no.wrapping_add(1);

        Outcome::Accept {
            target_addr: block.target_addr,
            // Checked above: payload_size == PAGE_SIZE.
            payload: block.payload().expect("payload_size already checked"),
        }
    }

    /// Whether every block promised by `num_blocks` has actually arrived.
    /// Call this once the source reports EOF; `false` means the card was
    /// pulled (or the file truncated) before the image finished.
    pub fn complete(&self) -> bool {
        match self.num_blocks {
            Some(n) => self.next_block_no == n,
            None => false,
        }
    }

    /// Whether at least one block has been accepted so far.
    pub fn has_progress(&self) -> bool {
        self.first_addr.is_some()
    }
}
