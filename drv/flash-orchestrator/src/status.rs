// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use core::fmt::Write;
use heapless::String;

/// Advisory progress reporting; the UI renders whatever is set here. Never
/// consulted for correctness.
pub trait StatusSink {
    fn set(&mut self, msg: &str);
}

/// A [`StatusSink`] that discards everything. Used by callers that don't
/// have a UI attached (and by tests that don't care about the strings).
pub struct NullStatusSink;

impl StatusSink for NullStatusSink {
    fn set(&mut self, _msg: &str) {}
}

/// Renders `"Loading {done}/{total}..."` into a no-alloc buffer and hands
/// it to `sink`. Called every 100 programmed blocks, per the external
/// interface contract.
pub fn report_progress<S: StatusSink>(sink: &mut S, done: u32, total: u32) {
    let mut msg: String<64> = String::new();
    // `write!` into a fixed-capacity `heapless::String` only fails if the
    // formatted text overflows the buffer; 64 bytes is ample for two
    // `u32`s and the surrounding text.
    let _ = write!(msg, "Loading {}/{}...", done, total);
    sink.set(&msg);
}
