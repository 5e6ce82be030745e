// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host-only fakes used by the scenario tests in `tests.rs`. None of this
//! compiles into the embedded target; it exists purely to let the
//! orchestrator's protocol be exercised without real flash or an SD card.

use proginfo_api::{FlashDriver, FlashRead, RamResident};
use uf2::BlockSource;

/// A `const`-sized in-memory flash, addressed as `[base, base+N)`.
/// `program` ANDs the incoming bytes into the existing contents, the same
/// bit-clear-only semantics real NOR flash has, so a test that tries to
/// set a bit without an intervening erase catches the same class of bug a
/// real chip would silently misbehave on.
pub struct FakeFlash<const N: usize> {
    base: u32,
    mem: [u8; N],
    pub erase_calls: heapless::Vec<(u32, u32), 8>,
    pub program_calls: heapless::Vec<u32, 64>,
}

impl<const N: usize> FakeFlash<N> {
    pub fn new(base: u32) -> Self {
        FakeFlash {
            base,
            mem: [0xFFu8; N],
            erase_calls: heapless::Vec::new(),
            program_calls: heapless::Vec::new(),
        }
    }

    pub fn contents(&self, addr: u32, len: usize) -> &[u8] {
        let start = (addr - self.base) as usize;
        &self.mem[start..start + len]
    }

    pub fn seed(&mut self, addr: u32, bytes: &[u8]) {
        let start = (addr - self.base) as usize;
        self.mem[start..start + bytes.len()].copy_from_slice(bytes);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeFlashError {
    OutOfBounds,
}

impl<const N: usize> FlashRead for FakeFlash<N> {
    type Error = FakeFlashError;

    fn read(&self, addr: u32, buf: &mut [u8]) -> Result<(), FakeFlashError> {
        if addr < self.base || (addr - self.base) as usize + buf.len() > N {
            return Err(FakeFlashError::OutOfBounds);
        }
        let start = (addr - self.base) as usize;
        buf.copy_from_slice(&self.mem[start..start + buf.len()]);
        Ok(())
    }
}

impl<const N: usize> FlashDriver for FakeFlash<N> {
    fn erase(&mut self, addr: u32, len: u32) -> Result<(), FakeFlashError> {
        if addr < self.base || (addr - self.base) as usize + len as usize > N {
            return Err(FakeFlashError::OutOfBounds);
        }
        let start = (addr - self.base) as usize;
        for b in &mut self.mem[start..start + len as usize] {
            *b = 0xFF;
        }
        let _ = self.erase_calls.push((addr, len));
        Ok(())
    }

    fn program(&mut self, addr: u32, buf: &[u8]) -> Result<(), FakeFlashError> {
        if addr < self.base || (addr - self.base) as usize + buf.len() > N {
            return Err(FakeFlashError::OutOfBounds);
        }
        let start = (addr - self.base) as usize;
        for (m, b) in self.mem[start..start + buf.len()].iter_mut().zip(buf) {
            *m &= *b;
        }
        let _ = self.program_calls.push(addr);
        Ok(())
    }

    fn verify(&self, addr: u32, buf: &[u8]) -> Result<bool, FakeFlashError> {
        if addr < self.base || (addr - self.base) as usize + buf.len() > N {
            return Err(FakeFlashError::OutOfBounds);
        }
        let start = (addr - self.base) as usize;
        Ok(&self.mem[start..start + buf.len()] == buf)
    }
}

// Safety: this is host-only test code; there is no RAM/flash execution
// hazard to guard against.
unsafe impl<const N: usize> RamResident for FakeFlash<N> {}

impl<const N: usize> FakeFlash<N> {
    /// CRC32 over `len` bytes starting at `addr`, mirroring the bulk-verify
    /// helper `platform-a-target`/`platform-b-target` expose on real flash.
    pub fn verify_crc32(&self, addr: u32, len: usize, expected: u32) -> bool {
        use crc::{Crc, CRC_32_ISO_HDLC};
        const CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);
        CRC32.checksum(self.contents(addr, len)) == expected
    }
}

/// An in-memory cursor over a constructed list of 512-byte UF2 blocks.
/// Can simulate a short read (truncated file / power loss) after a chosen
/// number of full blocks have been delivered.
pub struct FakeBlockSource {
    blocks: Vec<[u8; 512]>,
    pos: usize,
    short_after: Option<usize>,
    short_count: usize,
}

impl FakeBlockSource {
    pub fn new(blocks: Vec<[u8; 512]>) -> Self {
        FakeBlockSource {
            blocks,
            pos: 0,
            short_after: None,
            short_count: 0,
        }
    }

    /// After `n` full blocks have been read, the next read returns a clean
    /// zero-byte EOF instead of the remaining blocks.
    pub fn truncate_after(mut self, n: usize) -> Self {
        self.short_after = Some(n);
        self.short_count = 0;
        self
    }

    /// After `n` full blocks have been read, the next read returns a
    /// genuine partial count (a card pulled mid-sector-write, rather than a
    /// clean end of file) instead of the remaining blocks.
    pub fn partial_after(mut self, n: usize, count: usize) -> Self {
        assert!(count > 0 && count < 512);
        self.short_after = Some(n);
        self.short_count = count;
        self
    }
}

impl BlockSource for FakeBlockSource {
    type Error = ();

    fn read_block(&mut self, buf: &mut [u8; 512]) -> Result<usize, ()> {
        if let Some(n) = self.short_after {
            if self.pos == n {
                self.short_after = None;
                return Ok(self.short_count);
            }
        }
        if self.pos >= self.blocks.len() {
            return Ok(0);
        }
        *buf = self.blocks[self.pos];
        self.pos += 1;
        Ok(512)
    }
}

/// A [`crate::Target`] wired to a [`FakeFlash`], standing in for either
/// platform depending on how it's configured.
pub struct FakeTarget<const N: usize> {
    pub flash: FakeFlash<N>,
    pub flash_base: u32,
    pub flash_end: u32,
    pub family: uf2::FamilyId,
    pub layout: proginfo_api::ProgInfoLayout,
    pub preserve_boot_stub: bool,
    pub boot_stub_len: u32,
    pub commits_proginfo: bool,
}

impl<const N: usize> crate::Target for FakeTarget<N> {
    type Flash = FakeFlash<N>;

    fn flash(&mut self) -> &mut FakeFlash<N> {
        &mut self.flash
    }

    fn flash_base(&self) -> u32 {
        self.flash_base
    }

    fn flash_end(&self) -> u32 {
        self.flash_end
    }

    fn accepted_family(&self) -> uf2::FamilyId {
        self.family
    }

    fn proginfo_layout(&self) -> proginfo_api::ProgInfoLayout {
        self.layout
    }

    fn preserve_boot_stub(&self) -> bool {
        self.preserve_boot_stub
    }

    fn boot_stub_len(&self) -> u32 {
        self.boot_stub_len
    }

    fn commits_proginfo(&self) -> bool {
        self.commits_proginfo
    }
}

/// Records every message it's given; tests assert against the last one.
#[derive(Default)]
pub struct FakeStatusSink {
    pub messages: Vec<String>,
}

impl crate::StatusSink for FakeStatusSink {
    fn set(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }
}
