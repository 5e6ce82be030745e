// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![no_std]

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicBool, Ordering};

#[cfg(armv6m)]
use armv6m_atomic_hack::AtomicBoolExt;

/// A `RefCell`-style container for use in a `static`, when only a single
/// borrow needs to happen at any given time.
///
/// This only provides `mut` access, not the many-reader one-writer behavior
/// of `RefCell`: only ever one writer, never concurrently with anything
/// else.
#[derive(Default)]
pub struct StaticCell<T> {
    borrowed: AtomicBool,
    cell: UnsafeCell<T>,
}

impl<T> StaticCell<T> {
    /// Creates a `StaticCell` containing `contents`.
    pub const fn new(contents: T) -> Self {
        Self {
            borrowed: AtomicBool::new(false),
            cell: UnsafeCell::new(contents),
        }
    }

    /// Gets mutable access to the contents of `self`.
    ///
    /// # Panics
    ///
    /// Panics if a `StaticRef` for `self` still exists anywhere in the
    /// program.
    pub fn borrow_mut(&self) -> StaticRef<'_, T> {
        match self.try_borrow_mut() {
            Some(r) => r,
            None => panic!("StaticCell already borrowed"),
        }
    }

    /// Like `borrow_mut`, but returns `None` instead of panicking if the
    /// cell is already borrowed.
    pub fn try_borrow_mut(&self) -> Option<StaticRef<'_, T>> {
        let already_borrowed = self.borrowed.swap(true, Ordering::Acquire);
        if already_borrowed {
            return None;
        }
        // Safety: the swap above ensures we are the only live borrow, so
        // producing an aliasing `&mut` here is sound.
        Some(StaticRef {
            contents: unsafe { &mut *self.cell.get() },
            borrow: &self.borrowed,
        })
    }
}

unsafe impl<T> Sync for StaticCell<T> where for<'a> &'a mut T: Send {}

pub struct StaticRef<'a, T> {
    contents: &'a mut T,
    borrow: &'a AtomicBool,
}

impl<T> core::ops::Deref for StaticRef<'_, T> {
    type Target = T;
    fn deref(&self) -> &T {
        self.contents
    }
}

impl<T> core::ops::DerefMut for StaticRef<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.contents
    }
}

impl<T> Drop for StaticRef<'_, T> {
    fn drop(&mut self) {
        self.borrow.store(false, Ordering::Release);
    }
}
