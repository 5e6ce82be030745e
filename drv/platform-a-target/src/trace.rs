// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Trace {
    None,
    Erase { addr: u32, len: u32 },
    Program { addr: u32 },
    VerifyMismatch { addr: u32 },
}

ringbuf::ringbuf!(Trace, 16, Trace::None);

pub(crate) fn trace(entry: Trace) {
    ringbuf::ringbuf_entry!(entry);
}
