// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use proginfo_api::{FlashDriver, FlashRead, PAGE_SIZE, SECTOR_SIZE};
use uf2::{BlockSource, Next, Outcome, Uf2Reader, ValidatorState};

use crate::status::{report_progress, StatusSink};
use crate::target::Target;
use crate::trace::{trace, Trace};

/// The four-way result the UI needs. Internally richer reasons are
/// recorded to the [`Trace`] ring buffer; this return value stays the
/// simple contract callers have always had.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum LoadOutcome {
    /// File fully programmed and committed.
    Loaded,
    /// Well-formed UF2 with no blocks matching this device's family;
    /// nothing written.
    WrongPlatform,
    /// A cross-block or EOF invariant was violated; zero or more pages may
    /// have been programmed, but the proginfo slot reads as "no app".
    Bad,
    /// I/O or flash driver error.
    Unknown,
}

/// Drives one UF2 file from "opened" to "committed or aborted" against a
/// concrete [`Target`].
pub struct FlashOrchestrator<T: Target> {
    target: T,
}

impl<T: Target> FlashOrchestrator<T> {
    pub fn new(target: T) -> Self {
        FlashOrchestrator { target }
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }

    /// Loads one UF2 file read off `source`, optionally recording
    /// `filename` (platform A only) into the committed proginfo record,
    /// and reporting progress to `status` every 100 programmed blocks.
    pub fn load<S, St>(&mut self, source: S, status: &mut St, filename: Option<&[u8]>) -> LoadOutcome
    where
        S: BlockSource,
        St: StatusSink,
    {
        trace(Trace::Started);
        let outcome = self.load_inner(source, status, filename);
        trace(Trace::Done(outcome));
        outcome
    }

    fn load_inner<S, St>(&mut self, source: S, status: &mut St, filename: Option<&[u8]>) -> LoadOutcome
    where
        S: BlockSource,
        St: StatusSink,
    {
        let flash_base = self.target.flash_base();
        let flash_end = self.target.flash_end();
        let family = self.target.accepted_family();
        let layout = self.target.proginfo_layout();

        let mut reader = Uf2Reader::new(source);
        let mut state = ValidatorState::new(family, flash_base, flash_end);

        // Step 3: pull the first Accept-able block, absorbing Skips.
        let (first_addr, mut first_payload) = loop {
            match reader.next() {
                Ok(Next::Eof) => {
                    trace(Trace::NoMatchingBlocks);
                    return LoadOutcome::WrongPlatform;
                }
                Ok(Next::ShortRead) => {
                    trace(Trace::Truncated);
                    return LoadOutcome::Bad;
                }
                Ok(Next::Block(block)) => match state.validate(block) {
                    Outcome::Accept { target_addr, payload } => {
                        let mut buf = [0u8; PAGE_SIZE];
                        buf.copy_from_slice(payload);
                        break (target_addr, buf);
                    }
                    Outcome::Skip(reason) => {
                        trace(Trace::SkippedBlock(reason));
                        continue;
                    }
                    Outcome::Reject(reason) => {
                        trace(Trace::RejectedBlock(reason));
                        return LoadOutcome::Bad;
                    }
                },
                Err(_) => {
                    trace(Trace::IoError);
                    return LoadOutcome::Unknown;
                }
            }
        };

        let num_blocks = state.num_blocks().expect("set by the accepted first block");

        // The file promises more blocks than fit before `flash_end`. Catch
        // this before issuing any erase: every `erase`/`program` call the
        // flash driver sees must already be in range (see the orchestrator's
        // testable properties), so this can't be deferred to the per-block
        // check that will eventually reject the offending block anyway.
        let promised_end = first_addr + num_blocks * PAGE_SIZE as u32;
        if promised_end > flash_end {
            trace(Trace::PromisedRangeExceedsFlashEnd { promised_end });
            return LoadOutcome::Bad;
        }

        // Step 4: erase, sector-rounded, with stub preservation.
        let sector = SECTOR_SIZE;
        let erase_start = first_addr - (first_addr % sector);
        let raw_end = first_addr + num_blocks * PAGE_SIZE as u32;
        let erase_end = (raw_end + sector - 1) / sector * sector;
        let erase_len = erase_end - erase_start;

        let preserve_stub = self.target.preserve_boot_stub()
            && erase_start == flash_base
            && first_addr != flash_base;

        let mut stub_buf = [0u8; PAGE_SIZE];
        if preserve_stub {
            if self.target.flash().read(flash_base, &mut stub_buf).is_err() {
                trace(Trace::FlashError);
                return LoadOutcome::Unknown;
            }
        }

        trace(Trace::EraseStart { addr: erase_start, len: erase_len });
        if self.target.flash().erase(erase_start, erase_len).is_err() {
            trace(Trace::FlashError);
            return LoadOutcome::Unknown;
        }

        if preserve_stub {
            if self.target.flash().program(flash_base, &stub_buf).is_err() {
                trace(Trace::FlashError);
                return LoadOutcome::Unknown;
            }
            trace(Trace::BootStubPreserved);
        }

        // Step 5: program the first block, masking the proginfo hole so
        // it reads as "no app" until commit.
        layout.clear_in_buf(&mut first_payload, first_addr, PAGE_SIZE);
        if self.target.flash().program(first_addr, &first_payload).is_err() {
            trace(Trace::FlashError);
            return LoadOutcome::Unknown;
        }
        trace(Trace::FirstBlockProgrammed { addr: first_addr });

        let mut programmed = 1u32;
        report_progress(status, programmed, num_blocks);

        // Step 6: stream the remaining blocks. A short read is the same EOF
        // signal as a clean zero-byte read; either way, whether that's fine
        // or fatal is decided by `state.complete()` below, not here.
        loop {
            match reader.next() {
                Ok(Next::Eof) => break,
                Ok(Next::ShortRead) => {
                    trace(Trace::ShortRead);
                    break;
                }
                Ok(Next::Block(block)) => match state.validate(block) {
                    Outcome::Accept { target_addr, payload } => {
                        let mut buf = [0u8; PAGE_SIZE];
                        buf.copy_from_slice(payload);
                        layout.clear_in_buf(&mut buf, target_addr, PAGE_SIZE);
                        if self.target.flash().program(target_addr, &buf).is_err() {
                            trace(Trace::FlashError);
                            return LoadOutcome::Unknown;
                        }
                        programmed += 1;
                        if programmed % 100 == 0 {
                            report_progress(status, programmed, num_blocks);
                        }
                    }
                    Outcome::Skip(reason) => {
                        trace(Trace::SkippedBlock(reason));
                    }
                    Outcome::Reject(reason) => {
                        trace(Trace::RejectedBlock(reason));
                        return LoadOutcome::Bad;
                    }
                },
                Err(_) => {
                    trace(Trace::IoError);
                    return LoadOutcome::Unknown;
                }
            }
        }

        // Step 7: EOF check.
        if !state.complete() {
            trace(Trace::Truncated);
            return LoadOutcome::Bad;
        }
        report_progress(status, programmed, num_blocks);

        // Step 8: commit.
        if self.target.commits_proginfo() {
            let mut page = [0u8; PAGE_SIZE];
            if self.target.flash().read(first_addr, &mut page).is_err() {
                trace(Trace::FlashError);
                return LoadOutcome::Unknown;
            }
            layout.set_in_buf(&mut page, first_addr, PAGE_SIZE, flash_end, filename);
            if self.target.flash().program(first_addr, &page).is_err() {
                trace(Trace::FlashError);
                return LoadOutcome::Unknown;
            }
            trace(Trace::Committed { flash_end });
        } else {
            trace(Trace::CommitSkippedNotOwned);
        }

        LoadOutcome::Loaded
    }
}
