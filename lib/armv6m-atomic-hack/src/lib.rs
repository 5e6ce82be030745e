// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Provides fake atomic read-modify-write operations for situations where you
//! _really_ know what you're doing.
//!
//! Pulling this trait in can cause code written for ARMv7-M and later machines,
//! which have atomic read-modify-write operations, to compile on ARMv6-M. This
//! is, in general, not safe: the program wanted an atomic read-modify-write and
//! you're faking it with a non-atomic sequence. However, in our _specific_ case
//! here, we can do this safely because the only caller, `static-cell`, is used
//! exclusively from single-threaded, interrupts-disabled flash-programming
//! paths where no concurrent borrow can occur.
//!
//! Everything in this crate is conditional on the `armv6m` config, set by this
//! crate's own build script when the target starts with `thumbv6m`, so
//! accidentally including it on armv7m or later won't pull in the bogus
//! implementations.

#![no_std]

#[cfg(armv6m)]
use core::sync::atomic::{AtomicBool, Ordering};

#[cfg(armv6m)]
pub trait AtomicBoolExt {
    fn swap(&self, val: bool, order: Ordering) -> bool;
}

#[cfg(armv6m)]
impl AtomicBoolExt for AtomicBool {
    #[inline]
    fn swap(&self, val: bool, order: Ordering) -> bool {
        let rv = self.load(order);
        self.store(val, order);
        rv
    }
}
