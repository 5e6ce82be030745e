// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/// Read-only view onto flash, used both by the full [`FlashDriver`] on
/// target and by the orchestrator's own proginfo/stub readback.
pub trait FlashRead {
    type Error;

    /// Copies `buf.len()` bytes starting at `addr` out of flash.
    fn read(&self, addr: u32, buf: &mut [u8]) -> Result<(), Self::Error>;
}

/// Erase/program/verify for one flash chip. Every method, and every
/// function reachable from it, must be safe to run from RAM with
/// interrupts disabled — see [`RamResident`].
pub trait FlashDriver: FlashRead {
    /// `addr` must be sector-aligned; `len` is rounded up to sector
    /// granularity by the caller before this is invoked. Leaves
    /// `[addr, addr+len)` reading as `0xFF`.
    fn erase(&mut self, addr: u32, len: u32) -> Result<(), Self::Error>;

    /// `addr` must be page-aligned; `buf` is exactly one page
    /// ([`crate::PAGE_SIZE`] bytes).
    fn program(&mut self, addr: u32, buf: &[u8]) -> Result<(), Self::Error>;

    /// Byte-for-byte readback comparison against `buf`.
    fn verify(&self, addr: u32, buf: &[u8]) -> Result<bool, Self::Error>;
}

/// Marker for a [`FlashDriver`] whose `erase`/`program`/`verify` (and
/// everything they call) live in a RAM-resident link section and are safe
/// to invoke with interrupts disabled and flash otherwise unavailable for
/// execution.
///
/// `unsafe` because implementing it is a promise about linker placement
/// the compiler cannot check; `flash-orchestrator` requires
/// `F: FlashDriver + RamResident` so that promise is load-bearing rather
/// than a comment.
pub unsafe trait RamResident {}
