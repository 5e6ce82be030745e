// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::block::RawUf2Block;
use crate::family;

/// Source of raw 512-byte blocks, in file order. Implemented against the
/// SD card's file-read API on target and against an in-memory cursor in
/// tests.
///
/// A read returning fewer than 512 bytes signals end of file: the final
/// short read (including a zero-length one) is not an error, it's how the
/// caller learns there are no more blocks.
pub trait BlockSource {
    type Error;

    /// Fills as much of `buf` as the source has remaining, returning the
    /// number of bytes written. A return value less than `buf.len()`
    /// means end of file.
    fn read_block(&mut self, buf: &mut [u8; 512]) -> Result<usize, Self::Error>;
}

/// Outcome of pulling the next block out of a [`Uf2Reader`].
pub enum Next<'a> {
    /// A 512-byte block, with `block_no`/`num_blocks` already adjusted for
    /// any stripped erratum block.
    Block(&'a RawUf2Block),
    /// The source is exhausted.
    Eof,
    /// The source returned a short (but non-empty) read: a truncated
    /// file, most likely from a card pulled mid-write.
    ShortRead,
}

/// Wraps a [`BlockSource`] and strips the ABSOLUTE-family silicon-erratum
/// workaround block before any block reaches the validator.
///
/// Some UF2 encoders prepend a single throwaway block
/// (`family_id == ABSOLUTE`, `target_addr == ABSOLUTE_ERRATUM_ADDR`,
/// `block_no == 0`) to route around a flashing-tool defect on other
/// targets. It carries no payload meant for this device's flash and must
/// never reach the validator or the orchestrator. Rather than have every
/// downstream consumer carry an "is this the erratum block" special case,
/// this reader detects it once, up front, and renumbers every subsequent
/// block so `block_no`/`num_blocks` read exactly as they would have had
/// the encoder never inserted it.
pub struct Uf2Reader<S> {
    source: S,
    buf: [u8; 512],
    stripped: bool,
    checked_first_block: bool,
}

impl<S: BlockSource> Uf2Reader<S> {
    pub fn new(source: S) -> Self {
        Uf2Reader {
            source,
            buf: [0u8; 512],
            stripped: false,
            checked_first_block: false,
        }
    }

    pub fn next(&mut self) -> Result<Next<'_>, S::Error> {
        loop {
            let n = self.source.read_block(&mut self.buf)?;
            if n == 0 {
                return Ok(Next::Eof);
            }
            if n < 512 {
                return Ok(Next::ShortRead);
            }

            if !self.checked_first_block {
                self.checked_first_block = true;
                if is_erratum_block(&self.buf) {
                    self.stripped = true;
                    // Discard this block and pull the real first block.
                    continue;
                }
            }

            if self.stripped {
                renumber(&mut self.buf);
            }

            return Ok(Next::Block(RawUf2Block::parse(&self.buf)));
        }
    }
}

fn is_erratum_block(buf: &[u8; 512]) -> bool {
    let blk = RawUf2Block::parse(buf);
    blk.magics_valid()
        && blk.family_id_present()
        && blk.file_size_or_id == family::ABSOLUTE
        && blk.target_addr == family::ABSOLUTE_ERRATUM_ADDR
        && blk.block_no == 0
}

/// Decrements `block_no` and `num_blocks` by one in place, undoing the
/// offset the stripped erratum block introduced.
fn renumber(buf: &mut [u8; 512]) {
    const BLOCK_NO_OFFSET: usize = 20;
    const NUM_BLOCKS_OFFSET: usize = 24;

    let mut block_no = u32::from_le_bytes(
        buf[BLOCK_NO_OFFSET..BLOCK_NO_OFFSET + 4].try_into().unwrap(),
    );
    let mut num_blocks = u32::from_le_bytes(
        buf[NUM_BLOCKS_OFFSET..NUM_BLOCKS_OFFSET + 4]
            .try_into()
            .unwrap(),
    );
    block_no = block_no.saturating_sub(1);
    num_blocks = num_blocks.saturating_sub(1);
    buf[BLOCK_NO_OFFSET..BLOCK_NO_OFFSET + 4].copy_from_slice(&block_no.to_le_bytes());
    buf[NUM_BLOCKS_OFFSET..NUM_BLOCKS_OFFSET + 4].copy_from_slice(&num_blocks.to_le_bytes());
}
