// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use zerocopy::FromBytes;

/// First magic word of every UF2 block.
pub const MAGIC_START_0: u32 = 0x0A32_4655;
/// Second magic word of every UF2 block.
pub const MAGIC_START_1: u32 = 0x9E5D_5157;
/// Final magic word of every UF2 block.
pub const MAGIC_END: u32 = 0x0AB1_6F30;

/// Bit 0 of `flags`: this block is not destined for the device's main
/// flash and should be ignored by an application flasher.
pub const FLAG_NOT_MAIN_FLASH: u32 = 1 << 0;
/// Bit 13 of `flags`: `file_size_or_id` carries a family ID rather than a
/// file size.
pub const FLAG_FAMILY_ID_PRESENT: u32 = 1 << 13;

/// Flash program/erase geometry. Fixed for this device; not configurable
/// per file.
pub const PAGE_SIZE: usize = 256;
pub const SECTOR_SIZE: u32 = 4096;

/// One 512-byte UF2 block, bit-exact with the public UF2 specification.
///
/// Every field up through `data` is 4-byte aligned and `data`'s length
/// (476) is itself a multiple of 4, so ordinary `#[repr(C)]` already
/// produces the wire-exact 512-byte layout without `packed`/`Unaligned`.
/// Both the embedded target and the host running the test suite are
/// little-endian, so no byte-swapping is performed when overlaying this
/// struct onto bytes read from the SD card.
#[derive(
    Clone,
    Copy,
    zerocopy_derive::FromBytes,
    zerocopy_derive::IntoBytes,
    zerocopy_derive::Immutable,
    zerocopy_derive::KnownLayout,
)]
#[repr(C)]
pub struct RawUf2Block {
    pub magic_start_0: u32,
    pub magic_start_1: u32,
    pub flags: u32,
    pub target_addr: u32,
    pub payload_size: u32,
    pub block_no: u32,
    pub num_blocks: u32,
    pub file_size_or_id: u32,
    pub data: [u8; 476],
    pub magic_end: u32,
}

static_assertions::const_assert_eq!(core::mem::size_of::<RawUf2Block>(), 512);

impl RawUf2Block {
    /// Overlays `bytes` as a `RawUf2Block` without copying.
    pub fn parse(bytes: &[u8; 512]) -> &RawUf2Block {
        RawUf2Block::ref_from_bytes(bytes).expect("512-byte array always parses")
    }

    pub fn magics_valid(&self) -> bool {
        self.magic_start_0 == MAGIC_START_0
            && self.magic_start_1 == MAGIC_START_1
            && self.magic_end == MAGIC_END
    }

    pub fn not_main_flash(&self) -> bool {
        self.flags & FLAG_NOT_MAIN_FLASH != 0
    }

    pub fn family_id_present(&self) -> bool {
        self.flags & FLAG_FAMILY_ID_PRESENT != 0
    }

    /// The live payload, i.e. `data[..payload_size]`, when `payload_size`
    /// is in range. Callers must separately check `payload_size == PAGE_SIZE`
    /// per the validator's rules; this just guards the slice index.
    pub fn payload(&self) -> Option<&[u8]> {
        let n = self.payload_size as usize;
        self.data.get(..n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(
        magic0: u32,
        magic1: u32,
        flags: u32,
        target_addr: u32,
        payload_size: u32,
        block_no: u32,
        num_blocks: u32,
        file_size_or_id: u32,
        fill: u8,
        magic_end: u32,
    ) -> [u8; 512] {
        let mut buf = [0u8; 512];
        let mut w = 0usize;
        for word in [
            magic0,
            magic1,
            flags,
            target_addr,
            payload_size,
            block_no,
            num_blocks,
            file_size_or_id,
        ] {
            buf[w..w + 4].copy_from_slice(&word.to_le_bytes());
            w += 4;
        }
        for b in &mut buf[32..32 + 476] {
            *b = fill;
        }
        buf[508..512].copy_from_slice(&magic_end.to_le_bytes());
        buf
    }

    #[test]
    fn parses_well_formed_block() {
        let bytes = encode(
            MAGIC_START_0,
            MAGIC_START_1,
            0,
            0x1004_0000,
            256,
            0,
            4,
            0,
            0x41,
            MAGIC_END,
        );
        let blk = RawUf2Block::parse(&bytes);
        assert!(blk.magics_valid());
        assert!(!blk.not_main_flash());
        assert!(!blk.family_id_present());
        assert_eq!(blk.target_addr, 0x1004_0000);
        assert_eq!(blk.payload().unwrap().len(), 256);
        assert!(blk.payload().unwrap().iter().all(|&b| b == 0x41));
    }

    #[test]
    fn rejects_bad_magic() {
        let bytes = encode(
            0xDEAD_BEEF,
            MAGIC_START_1,
            0,
            0,
            256,
            0,
            1,
            0,
            0,
            MAGIC_END,
        );
        assert!(!RawUf2Block::parse(&bytes).magics_valid());
    }

    #[test]
    fn flag_bits() {
        let bytes = encode(
            MAGIC_START_0,
            MAGIC_START_1,
            FLAG_NOT_MAIN_FLASH | FLAG_FAMILY_ID_PRESENT,
            0,
            256,
            0,
            1,
            PLATFORM_A_FOR_TEST,
            0,
            MAGIC_END,
        );
        let blk = RawUf2Block::parse(&bytes);
        assert!(blk.not_main_flash());
        assert!(blk.family_id_present());
    }

    const PLATFORM_A_FOR_TEST: u32 = 0xE48B_FF56;
}
