// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::proginfo::PROGINFO_MAGIC;

/// What stage-3 should do on the next boot, written by the UI before it
/// requests a warm reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum BootMode {
    Default = 0,
    Sd = 1,
    Update = 2,
    Ram = 3,
}

impl BootMode {
    fn from_word(word: u32) -> Option<BootMode> {
        match word {
            0 => Some(BootMode::Default),
            1 => Some(BootMode::Sd),
            2 => Some(BootMode::Update),
            3 => Some(BootMode::Ram),
            _ => None,
        }
    }
}

/// Access to the three battery-backed scratch registers that carry the
/// boot command across a warm reset. Implemented against real MMIO on
/// target and against a plain `[u32; 3]` in tests.
pub trait ScratchRegs {
    fn read(&self) -> [u32; 3];
    fn write(&mut self, words: [u32; 3]);
}

/// Writes a command: validity tag, mode, and mode-specific argument (a
/// RAM pointer to a filename string for `Ram`, otherwise unused).
pub fn bootcmd_set<R: ScratchRegs>(regs: &mut R, mode: BootMode, arg: u32) {
    regs.write([PROGINFO_MAGIC, mode as u32, arg]);
}

/// Reads the command once, then unconditionally clears the validity tag so
/// it cannot be consumed a second time, regardless of whether this read
/// found a valid command. Returns `None` if no command was pending.
pub fn bootcmd_take<R: ScratchRegs>(regs: &mut R) -> Option<(BootMode, u32)> {
    let [tag, mode, arg] = regs.read();
    regs.write([0, 0, 0]);
    if tag != PROGINFO_MAGIC {
        return None;
    }
    BootMode::from_word(mode).map(|mode| (mode, arg))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakeScratchRegs {
        words: [u32; 3],
    }

    impl ScratchRegs for FakeScratchRegs {
        fn read(&self) -> [u32; 3] {
            self.words
        }
        fn write(&mut self, words: [u32; 3]) {
            self.words = words;
        }
    }

    #[test]
    fn set_then_take_round_trips() {
        let mut regs = FakeScratchRegs::default();
        bootcmd_set(&mut regs, BootMode::Ram, 0xDEAD_0000);
        assert_eq!(bootcmd_take(&mut regs), Some((BootMode::Ram, 0xDEAD_0000)));
    }

    #[test]
    fn take_clears_validity_tag() {
        let mut regs = FakeScratchRegs::default();
        bootcmd_set(&mut regs, BootMode::Sd, 0);
        bootcmd_take(&mut regs);
        assert_eq!(bootcmd_take(&mut regs), None);
    }

    #[test]
    fn no_command_reads_as_none() {
        let mut regs = FakeScratchRegs::default();
        assert_eq!(bootcmd_take(&mut regs), None);
    }

    #[test]
    fn garbage_mode_reads_as_none_but_still_clears() {
        let mut regs = FakeScratchRegs::default();
        regs.write([PROGINFO_MAGIC, 99, 0]);
        assert_eq!(bootcmd_take(&mut regs), None);
        assert_eq!(regs.read(), [0, 0, 0]);
    }
}
