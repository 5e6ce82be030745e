// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! RAM-resident erase/program/verify for the larger SoC variant, plus the
//! `XIP_BASE`-to-partition address-translation window.
//!
//! Unlike `platform-a-target`'s `QspiFlash`, every address this driver is
//! handed by `flash-orchestrator` is a *virtual* address in the
//! `[XIP_BASE, XIP_BASE + partition.len)` window; translation to the
//! partition's physical offset happens once, here, before any register
//! write. The orchestrator never sees physical addresses.

use crc::{Crc, CRC_32_ISO_HDLC};
use proginfo_api::{FlashDriver, FlashRead, RamResident, PAGE_SIZE, SECTOR_SIZE};

use crate::partition::{Partition, XIP_BASE};
use crate::trace::{trace, Trace};

const CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum FlashError {
    Alignment,
    OutOfRange,
    Hardware,
}

#[repr(C)]
struct FlashRegs {
    cmd: u32,
    addr: u32,
    data: u32,
    status: u32,
}

/// Talks to the SoC's embedded flash controller, translating the virtual
/// `XIP_BASE`-relative address the orchestrator hands in to the active
/// partition's physical offset before every register access.
pub struct WindowedFlash {
    regs: *mut FlashRegs,
    partition: Partition,
}

// Safety: the caller (platform-b-target's start-of-day init) guarantees
// `regs` points at the flash controller's register block and that no
// other alias to it exists for the lifetime of this value.
unsafe impl Send for WindowedFlash {}

impl WindowedFlash {
    /// # Safety
    /// `regs_base` must be the flash controller's register base address,
    /// and this must be constructed at most once during start-of-day init,
    /// after `partition` has been read from the partition table.
    pub unsafe fn new(regs_base: usize, partition: Partition) -> Self {
        trace(Trace::XipWindowSet {
            partition_base: partition.phys_base,
        });
        WindowedFlash {
            regs: regs_base as *mut FlashRegs,
            partition,
        }
    }

    pub fn partition(&self) -> Partition {
        self.partition
    }

    /// Translates a virtual `[XIP_BASE, XIP_BASE + partition.len)` address
    /// into the partition's physical flash offset.
    fn to_phys(&self, addr: u32) -> Result<u32, FlashError> {
        let virt_offset = addr
            .checked_sub(XIP_BASE)
            .ok_or(FlashError::OutOfRange)?;
        if virt_offset >= self.partition.len {
            return Err(FlashError::OutOfRange);
        }
        self.partition
            .phys_base
            .checked_add(virt_offset)
            .ok_or(FlashError::OutOfRange)
    }

    #[link_section = ".data"]
    #[inline(never)]
    fn wait_ready(&self) {
        // Safety: `self.regs` was established at construction to point at
        // a live flash controller register block.
        unsafe { while core::ptr::read_volatile(&(*self.regs).status) & 1 != 0 {} }
    }
}

impl FlashRead for WindowedFlash {
    type Error = FlashError;

    fn read(&self, addr: u32, buf: &mut [u8]) -> Result<(), FlashError> {
        let phys = self.to_phys(addr)?;
        let src = phys as *const u8;
        // Safety: `to_phys` has already bounds-checked `addr` against the
        // active partition.
        unsafe { core::ptr::copy_nonoverlapping(src, buf.as_mut_ptr(), buf.len()) };
        Ok(())
    }
}

impl FlashDriver for WindowedFlash {
    #[link_section = ".data"]
    #[inline(never)]
    fn erase(&mut self, addr: u32, len: u32) -> Result<(), FlashError> {
        if addr % SECTOR_SIZE != 0 || len % SECTOR_SIZE != 0 {
            return Err(FlashError::Alignment);
        }
        let phys = self.to_phys(addr)?;
        trace(Trace::Erase { addr, len });
        critical_section::with(|_| {
            // Safety: RAM-resident, interrupts disabled by `with`, single
            // writer per the `FlashDriver` contract.
            unsafe {
                let mut offset = 0;
                while offset < len {
                    core::ptr::write_volatile(&mut (*self.regs).addr, phys + offset);
                    core::ptr::write_volatile(&mut (*self.regs).cmd, ERASE_SECTOR_CMD);
                    self.wait_ready();
                    offset += SECTOR_SIZE;
                }
            }
        });
        Ok(())
    }

    #[link_section = ".data"]
    #[inline(never)]
    fn program(&mut self, addr: u32, buf: &[u8]) -> Result<(), FlashError> {
        if addr % PAGE_SIZE as u32 != 0 || buf.len() != PAGE_SIZE {
            return Err(FlashError::Alignment);
        }
        let phys = self.to_phys(addr)?;
        trace(Trace::Program { addr });
        critical_section::with(|_| {
            // Safety: same as `erase` above.
            unsafe {
                for (i, chunk) in buf.chunks_exact(4).enumerate() {
                    let word = u32::from_le_bytes(chunk.try_into().unwrap());
                    core::ptr::write_volatile(&mut (*self.regs).addr, phys + (i as u32) * 4);
                    core::ptr::write_volatile(&mut (*self.regs).data, word);
                    core::ptr::write_volatile(&mut (*self.regs).cmd, PROGRAM_WORD_CMD);
                    self.wait_ready();
                }
            }
        });
        Ok(())
    }

    fn verify(&self, addr: u32, buf: &[u8]) -> Result<bool, FlashError> {
        let mut readback = [0u8; PAGE_SIZE];
        let readback = &mut readback[..buf.len()];
        self.read(addr, readback)?;
        let ok = readback == buf;
        if !ok {
            trace(Trace::VerifyMismatch { addr });
        }
        Ok(ok)
    }
}

// Safety: `erase`/`program` (and everything they call) are placed in
// `.data` above and run with interrupts disabled via `critical_section`.
unsafe impl RamResident for WindowedFlash {}

impl WindowedFlash {
    /// CRC32 over `len` bytes starting at virtual `addr`, an alternative
    /// to a byte-by-byte compare for bulk verification.
    pub fn verify_crc32(&self, addr: u32, len: usize, expected: u32) -> Result<bool, FlashError> {
        let mut digest = CRC32.digest();
        let mut buf = [0u8; PAGE_SIZE];
        let mut done = 0;
        while done < len {
            let n = (len - done).min(PAGE_SIZE);
            self.read(addr + done as u32, &mut buf[..n])?;
            digest.update(&buf[..n]);
            done += n;
        }
        Ok(digest.finalize() == expected)
    }
}

const ERASE_SECTOR_CMD: u32 = 0x20;
const PROGRAM_WORD_CMD: u32 = 0x02;
