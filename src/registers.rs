use log::warn;

use crate::memory::{ADDR_MASK, PROGRAM_ADDR};

/// VF doubles as the ALU flag
pub const FLAG: usize = 0xf;

/// how deep subroutines may nest. SUPER-CHIP programs go deeper than the
/// COSMAC VIP allowed (12 levels)
pub const STACK_DEPTH: usize = 64;

/// V0-VF, I and PC. I and PC are 12 bits wide; anything larger is masked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registers {
    pub v: [u8; 16],
    i: u16,
    pc: u16,
}

impl Default for Registers {
    fn default() -> Self {
        Registers {
            v: [0; 16],
            i: PROGRAM_ADDR,
            pc: PROGRAM_ADDR,
        }
    }
}

impl Registers {
    pub fn i(&self) -> u16 {
        self.i
    }

    pub fn set_i(&mut self, value: u16) {
        self.i = value & ADDR_MASK;
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn set_pc(&mut self, value: u16) {
        self.pc = value & ADDR_MASK;
    }

    /// move the PC on by one instruction
    pub fn skip(&mut self) {
        self.set_pc(self.pc.wrapping_add(2));
    }

    /// write the flag register
    pub fn set_flag(&mut self, set: bool) {
        self.v[FLAG] = set as u8;
    }
}

/// Return addresses for 2NNN/00EE. Pushing onto a full stack drops the address.
#[derive(Debug, Clone)]
pub struct CallStack {
    frames: [u16; STACK_DEPTH],
    depth: usize,
}

impl Default for CallStack {
    fn default() -> Self {
        CallStack {
            frames: [0; STACK_DEPTH],
            depth: 0,
        }
    }
}

impl CallStack {
    pub fn push(&mut self, addr: u16) {
        if self.depth == STACK_DEPTH {
            warn!("call stack full, dropping return address {:#05x}", addr);
            return;
        }
        self.frames[self.depth] = addr;
        self.depth += 1;
    }

    pub fn pop(&mut self) -> Option<u16> {
        if self.depth == 0 {
            return None;
        }
        self.depth -= 1;
        Some(self.frames[self.depth])
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_empty(&self) -> bool {
        self.depth == 0
    }

    pub fn clear(&mut self) {
        self.frames = [0; STACK_DEPTH];
        self.depth = 0;
    }
}
