// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! RAM-resident erase/program/verify for the on-package NOR flash this
//! MCU executes from. Every function here (and everything it calls) is
//! placed in `.data` so it is already resident in RAM when invoked —
//! calling into flash-resident code while flash is mid-erase or
//! mid-program is undefined on this part.

use crc::{Crc, CRC_32_ISO_HDLC};
use proginfo_api::{FlashDriver, FlashRead, RamResident, PAGE_SIZE, SECTOR_SIZE};

use crate::trace::{trace, Trace};

const CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum FlashError {
    Alignment,
    OutOfRange,
    Hardware,
}

/// Talks to the chip's on-package NOR flash through its memory-mapped
/// register interface. The register addresses are resolved once at
/// construction from a platform-provided base; this type carries no other
/// state.
pub struct QspiFlash {
    regs: *mut QspiRegs,
}

#[repr(C)]
struct QspiRegs {
    cmd: u32,
    addr: u32,
    data: u32,
    status: u32,
}

// Safety: the caller (platform-a-target's start-of-day init) guarantees
// `regs` points at the QSPI controller's register block and that no other
// alias to it exists for the lifetime of this value.
unsafe impl Send for QspiFlash {}

impl QspiFlash {
    /// # Safety
    /// `regs_base` must be the QSPI controller's register base address,
    /// and must not be constructed more than once concurrently.
    pub unsafe fn new(regs_base: usize) -> Self {
        QspiFlash {
            regs: regs_base as *mut QspiRegs,
        }
    }

    #[link_section = ".data"]
    #[inline(never)]
    fn wait_ready(&self) {
        // Safety: `self.regs` was established at construction to point at
        // a live QSPI register block.
        unsafe { while core::ptr::read_volatile(&(*self.regs).status) & 1 != 0 {} }
    }
}

impl FlashRead for QspiFlash {
    type Error = FlashError;

    fn read(&self, addr: u32, buf: &mut [u8]) -> Result<(), FlashError> {
        // The QSPI window is memory-mapped for reads; no RAM-residency
        // requirement here since flash is not being modified.
        let src = addr as *const u8;
        // Safety: callers only ever pass addresses within the chip's
        // mapped flash window, enforced by `flash-orchestrator`'s `Target`
        // bounds checks before any read is issued.
        unsafe { core::ptr::copy_nonoverlapping(src, buf.as_mut_ptr(), buf.len()) };
        Ok(())
    }
}

impl FlashDriver for QspiFlash {
    #[link_section = ".data"]
    #[inline(never)]
    fn erase(&mut self, addr: u32, len: u32) -> Result<(), FlashError> {
        if addr % SECTOR_SIZE != 0 || len % SECTOR_SIZE != 0 {
            return Err(FlashError::Alignment);
        }
        trace(Trace::Erase { addr, len });
        critical_section::with(|_| {
            // Safety: RAM-resident, interrupts disabled by `with`, single
            // writer per the `FlashDriver` contract.
            unsafe {
                let mut offset = 0;
                while offset < len {
                    core::ptr::write_volatile(&mut (*self.regs).addr, addr + offset);
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
        trace(Trace::Program { addr });
        critical_section::with(|_| {
            // Safety: same as `erase` above.
            unsafe {
                for (i, chunk) in buf.chunks_exact(4).enumerate() {
                    let word = u32::from_le_bytes(chunk.try_into().unwrap());
                    core::ptr::write_volatile(&mut (*self.regs).addr, addr + (i as u32) * 4);
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
unsafe impl RamResident for QspiFlash {}

impl QspiFlash {
    /// CRC32 over `len` bytes starting at `addr`, an alternative to a
    /// byte-by-byte compare for bulk verification.
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
