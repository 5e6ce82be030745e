// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ring buffer for instrumenting the flasher without a UART or an allocator.
//!
//! The flasher runs with interrupts disabled around every flash write and
//! has no console; when something goes wrong (a block rejected, an I/O
//! error, an unexpected flash status) the only way to find out why, short
//! of re-running with a debugger attached, is to have recorded it
//! somewhere a debugger can read back after the fact. A ring buffer
//! declared with [`ringbuf!`] is that somewhere: a fixed-size static array
//! of the last `N` entries, with immediate-repeat de-duplication so a tight
//! loop logging the same entry doesn't evict useful history.
//!
//! ```
//! ringbuf!(Trace, 16, Trace::None);
//! ringbuf_entry!(Trace::EraseStart);
//! ```
//!
//! Entries are de-duplicated by `(line, payload)`: recording the same
//! payload from the same call site as the previous entry just bumps a
//! counter on that entry instead of allocating a new slot. This is the
//! `ringbuf!`/`ringbuf_entry!` pair minus the counted-variant and
//! `humility`-introspection machinery that doesn't apply outside a
//! multi-task RTOS; see `DESIGN.md` for what was dropped and why.

#![cfg_attr(not(test), no_std)]

pub use static_cell::StaticCell;

#[cfg(feature = "disabled")]
#[macro_export]
macro_rules! ringbuf {
    ($name:ident, $t:ty, $n:expr, $init:expr, no_dedup) => {
        $crate::ringbuf!($name, $t, $n, $init)
    };
    ($name:ident, $t:ty, $n:expr, $init:expr) => {
        #[allow(dead_code)]
        const _: $t = $init;
        static $name: () = ();
    };
    ($t:ty, $n:expr, $init:expr, no_dedup) => {
        $crate::ringbuf!(__RINGBUF, $t, $n, $init, no_dedup);
    };
    ($t:ty, $n:expr, $init:expr) => {
        $crate::ringbuf!(__RINGBUF, $t, $n, $init);
    };
}

/// Declares a ring buffer in the current module or context.
///
/// `ringbuf!(NAME, Type, N, expr)` makes a ring buffer named `NAME`,
/// holding entries of type `Type`, with room for `N` entries, all
/// initialized to `expr`. The resulting static's type is
/// `StaticCell<Ringbuf<Type, u16, N>>`; omit `NAME` for the common
/// one-ringbuf-per-module case and it defaults to `__RINGBUF`.
#[cfg(not(feature = "disabled"))]
#[macro_export]
macro_rules! ringbuf {
    ($name:ident, $t:ty, $n:expr, $init:expr) => {
        static $name: $crate::StaticCell<$crate::Ringbuf<$t, u16, $n>> =
            $crate::StaticCell::new($crate::Ringbuf {
                last: None,
                buffer: [$crate::RingbufEntry {
                    line: 0,
                    generation: 0,
                    count: 0,
                    payload: $init,
                }; $n],
            });
    };
    ($name:ident, $t:ty, $n:expr, $init:expr, no_dedup) => {
        static $name: $crate::StaticCell<$crate::Ringbuf<$t, (), $n>> =
            $crate::StaticCell::new($crate::Ringbuf {
                last: None,
                buffer: [$crate::RingbufEntry {
                    line: 0,
                    generation: 0,
                    count: (),
                    payload: $init,
                }; $n],
            });
    };
    ($t:ty, $n:expr, $init:expr, no_dedup) => {
        $crate::ringbuf!(__RINGBUF, $t, $n, $init, no_dedup);
    };
    ($t:ty, $n:expr, $init:expr) => {
        $crate::ringbuf!(__RINGBUF, $t, $n, $init);
    };
}

/// Inserts `payload` into the named ring buffer (declared with
/// [`ringbuf!`]). Omit the name to use the module's default `__RINGBUF`.
#[macro_export]
macro_rules! ringbuf_entry {
    ($buf:expr, $payload:expr) => {{
        let (p, buf) = ($payload, &$buf);
        $crate::RecordEntry::record_entry(buf, line!() as u16, p);
    }};
    ($payload:expr) => {
        $crate::ringbuf_entry!(__RINGBUF, $payload);
    };
}

/// A single [`Ringbuf`] entry. When the same `(line, payload)` is recorded
/// back-to-back, `count` is incremented in place instead of consuming a new
/// slot.
#[derive(Debug, Copy, Clone)]
pub struct RingbufEntry<T: Copy, C> {
    pub line: u16,
    pub generation: u16,
    pub payload: T,
    pub count: C,
}

/// A ring buffer of parameterized entry type and size. Constructed via the
/// [`ringbuf!`] macro; not meaningful to build by hand.
#[derive(Debug)]
pub struct Ringbuf<T: Copy, C, const N: usize> {
    pub last: Option<usize>,
    pub buffer: [RingbufEntry<T, C>; N],
}

/// Implemented by the statics produced by [`ringbuf!`] so that
/// [`ringbuf_entry!`] can record into them without knowing their concrete
/// type.
pub trait RecordEntry<T: Copy> {
    fn record_entry(&self, line: u16, payload: T);
}

impl<T: Copy + PartialEq, const N: usize> RecordEntry<T>
    for StaticCell<Ringbuf<T, u16, N>>
{
    fn record_entry(&self, line: u16, payload: T) {
        // If the ring buffer is already borrowed, drop the entry rather
        // than panic. This shouldn't happen on our single-threaded
        // target, but there's no static guarantee of it.
        let Some(mut ring) = self.try_borrow_mut() else {
            return;
        };
        let last = ring.last.unwrap_or(usize::MAX);

        if let Some(ent) = ring.buffer.get_mut(last) {
            if ent.line == line && ent.payload == payload {
                if let Some(new_count) = ent.count.checked_add(1) {
                    ent.count = new_count;
                    return;
                }
            }
        }

        ring.do_record(last, line, 1, payload);
    }
}

impl<T: Copy, const N: usize> RecordEntry<T> for StaticCell<Ringbuf<T, (), N>> {
    fn record_entry(&self, line: u16, payload: T) {
        let Some(mut ring) = self.try_borrow_mut() else {
            return;
        };
        let last = ring.last.unwrap_or(usize::MAX);
        ring.do_record(last, line, (), payload);
    }
}

impl<T: Copy, C, const N: usize> Ringbuf<T, C, N> {
    fn do_record(&mut self, last: usize, line: u16, count: C, payload: T) {
        let ndx = {
            let next = last.wrapping_add(1);
            if next >= self.buffer.len() {
                0
            } else {
                next
            }
        };
        // Safety: `ndx` was just checked against `self.buffer.len()`.
        let ent = unsafe { self.buffer.get_unchecked_mut(ndx) };
        *ent = RingbufEntry {
            line,
            payload,
            count,
            generation: ent.generation.wrapping_add(1),
        };
        self.last = Some(ndx);
    }
}
