// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The state machine that drives one UF2 file from "opened" to
//! "committed or aborted": pull blocks from a [`uf2::BlockSource`],
//! validate, erase, program, and — on success — commit the program-info
//! record. Generic over [`Target`] so the same state machine runs on
//! either platform variant.

#![cfg_attr(not(test), no_std)]

mod orchestrator;
mod status;
mod target;
mod trace;

pub use orchestrator::{FlashOrchestrator, LoadOutcome};
pub use status::{report_progress, NullStatusSink, StatusSink};
pub use target::Target;
pub use trace::Trace;

#[cfg(test)]
mod fakes;
