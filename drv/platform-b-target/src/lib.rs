// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![no_std]

mod flash;
mod partition;
mod target;
mod trace;

pub use flash::{FlashError, WindowedFlash};
pub use partition::{read_active_partition, Partition, XIP_BASE};
pub use target::{PlatformB, PlatformBCore};
