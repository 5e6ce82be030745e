// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Runs on every warm/cold boot, before anything else in flash. Reads the
//! boot-command slot left by the UI (if any), checks whether the flashed
//! application's proginfo record is live, and performs whichever of the
//! four irreversible actions `stage3::decide` names. The decision itself
//! lives in `lib.rs` and is fully unit-tested on the host; everything
//! below is untestable off-target by nature (MMIO, a branch into code
//! this binary didn't link).

#![no_main]
#![no_std]

extern crate panic_halt;

use cortex_m_rt::entry;
use platform_a_target::{APP_VECTOR_TABLE, PROGINFO_MAGIC_ADDR};
use proginfo_api::{bootcmd_take, ScratchRegs, PROGINFO_MAGIC};
use stage3::Decision;

/// Battery-backed scratch register block preserved across a warm reset.
/// Fixed address; there is exactly one instance of this hardware on the
/// board, so no `Target`-style abstraction is needed here the way
/// `flash-orchestrator` needs one for flash.
const SCRATCH_REGS_BASE: usize = 0x5000_0000;

struct MmioScratchRegs;

impl ScratchRegs for MmioScratchRegs {
    fn read(&self) -> [u32; 3] {
        // Safety: `SCRATCH_REGS_BASE` is this board's fixed scratch
        // register block, preserved across warm reset by hardware design.
        unsafe {
            let base = SCRATCH_REGS_BASE as *const u32;
            [
                core::ptr::read_volatile(base),
                core::ptr::read_volatile(base.add(1)),
                core::ptr::read_volatile(base.add(2)),
            ]
        }
    }

    fn write(&mut self, words: [u32; 3]) {
        // Safety: same as `read` above.
        unsafe {
            let base = SCRATCH_REGS_BASE as *mut u32;
            core::ptr::write_volatile(base, words[0]);
            core::ptr::write_volatile(base.add(1), words[1]);
            core::ptr::write_volatile(base.add(2), words[2]);
        }
    }
}

fn proginfo_valid() -> bool {
    // Safety: `PROGINFO_MAGIC_ADDR` is always mapped, whether or not an
    // application is actually resident there; an absent app just reads
    // back as erased flash (`0xFFFFFFFF`), which is not the magic.
    let word = unsafe { core::ptr::read_volatile(PROGINFO_MAGIC_ADDR as *const u32) };
    word == PROGINFO_MAGIC
}

#[entry]
fn main() -> ! {
    let mut regs = MmioScratchRegs;
    let cmd = bootcmd_take(&mut regs);
    let decision = stage3::decide(cmd, proginfo_valid());

    match decision {
        Decision::BootApp => boot_app(),
        Decision::EnterUi => enter_ui(),
        Decision::EnterUsbUpdate => enter_usb_update(),
        Decision::BootRam { filename_ptr } => boot_ram(filename_ptr),
    }
}

/// Address of the Cortex-M `VTOR` register.
const VTOR: usize = 0xE000_ED08;

/// Points `VTOR` at the application's vector table and branches to its
/// reset vector with its stack pointer loaded. Never returns.
fn boot_app() -> ! {
    // Safety: `proginfo_valid()` was checked true by the caller, which is
    // this device's only guarantee that the application region holds a
    // complete, successfully-committed image with a real vector table.
    unsafe {
        core::ptr::write_volatile(VTOR as *mut u32, APP_VECTOR_TABLE);
        cortex_m::asm::bootload(APP_VECTOR_TABLE as *const u32);
    }
}

/// Hands control to the SD-card directory-browser UI. The UI itself (LCD
/// driver, keypad driver, FAT filesystem, SPI-SD driver) is a separate
/// image this symbol jumps into; it carries no flashing logic of its own.
fn enter_ui() -> ! {
    extern "C" {
        fn loader_ui_entry() -> !;
    }
    // Safety: `loader_ui_entry` is provided by the loader image this
    // binary is linked alongside; it never returns.
    unsafe { loader_ui_entry() }
}

/// Enters the USB mass-storage firmware-recovery endpoint, implemented by
/// a separate image.
fn enter_usb_update() -> ! {
    extern "C" {
        fn usb_update_entry() -> !;
    }
    // Safety: see `enter_ui`.
    unsafe { usb_update_entry() }
}

/// Copies the file named by `filename_ptr` (a pointer to a string set by
/// the UI before requesting the warm reset) into RAM and executes it from
/// there. The copy-and-launch machinery lives with the SD/FAT adapters,
/// out of this core's scope.
fn boot_ram(filename_ptr: u32) -> ! {
    extern "C" {
        fn boot_ram_image(filename: *const u8) -> !;
    }
    // Safety: `filename_ptr` was written by the UI via `bootcmd_set`
    // immediately before requesting the warm reset that led here, so it
    // is still valid RAM the UI is responsible for keeping alive.
    unsafe { boot_ram_image(filename_ptr as *const u8) }
}
