// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use uf2::{RejectReason, SkipReason};

/// Diagnostic record of everything `load()` does, recorded to a ring
/// buffer for post-mortem inspection. This is strictly additional detail:
/// the public return value of `load()` stays the simple four-way
/// [`crate::LoadOutcome`] the UI needs; `Trace` exists so that when a load
/// fails, whoever is holding a debugger afterward can see exactly why.
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Trace {
    None,
    Started,
    SkippedBlock(SkipReason),
    RejectedBlock(RejectReason),
    Truncated,
    ShortRead,
    NoMatchingBlocks,
    PromisedRangeExceedsFlashEnd { promised_end: u32 },
    EraseStart { addr: u32, len: u32 },
    BootStubPreserved,
    FirstBlockProgrammed { addr: u32 },
    Committed { flash_end: u32 },
    CommitSkippedNotOwned,
    IoError,
    FlashError,
    Done(crate::LoadOutcome),
}

ringbuf::ringbuf!(Trace, 32, Trace::None);

pub(crate) fn trace(entry: Trace) {
    ringbuf::ringbuf_entry!(entry);
}
