/// # interpreter
///
/// The whole machine lives in one Chip8Interpreter value: memory, registers,
/// call stack, framebuffer, timers, keypad and config. Nothing here talks to
/// a terminal, a speaker or a disk; a driver feeds it key state and elapsed
/// time (see timer::Clock) and reads the framebuffer back out.
///
/// The dispatcher has two states:
///  * Running        -- each step() fetches, decodes and executes one instruction
///  * AwaitingKey(x) -- FX0A is blocking; each step() only checks whether a
///                      key was released this frame, and if so stores it in Vx
///                      and goes back to Running. timers keep ticking meanwhile
use log::{debug, warn};
use std::io;

use crate::config::Config;
use crate::error::{Result, VmError};
use crate::font::FontSet;
use crate::framebuffer::{Framebuffer, Resolution};
use crate::instruction::{Instruction, Opcode};
use crate::keypad::{Keypad, KEY_COUNT};
use crate::memory::{Chip8Memory, MemoryMap, ADDR_MASK, PROGRAM_ADDR};
use crate::registers::{CallStack, Registers, FLAG};
use crate::storage::{self, FlagStore, MemoryFlagStore};
use crate::timer::Timers;

/// two-page hi-res programs start with a jump to 0x260 at 0x200
const HIRES_BOOT_OPCODE: u16 = 0x1260;
const HIRES_BOOT_ENTRY: u16 = 0x2c0;

/// a PC at or past this can't fetch a whole instruction
const LAST_ADDR: u16 = 0x0fff;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Running,
    AwaitingKey { x: u8 },
}

/// What one call to step() did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// an instruction ran (possibly as a no-op)
    Executed(Instruction),
    /// FX0A is still waiting for a key release; nothing else happened
    AwaitingKey,
    /// the PC ran off the end of memory and was put back to 0x200
    Recovered,
    /// 00FD; the program wants to stop
    Exit,
}

/// How much to put back when resetting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ResetKind {
    /// restart the loaded program
    Program,
    /// also forget the program and go back to 64x32
    Unload,
    /// also restore the default configuration
    Emulator,
}

pub struct Chip8Interpreter {
    memory: Chip8Memory,
    regs: Registers,
    stack: CallStack,
    screen: Framebuffer,
    timers: Timers,
    keypad: Keypad,
    config: Config,
    state: State,
    flags: Box<dyn FlagStore>,
    rng: fastrand::Rng,
    loaded: bool,
}

impl Chip8Interpreter {
    /// a blank machine with flag registers kept in memory
    pub fn new(config: Config) -> Chip8Interpreter {
        Chip8Interpreter::with_flag_store(config, Box::new(MemoryFlagStore::new()))
    }

    pub fn with_flag_store(config: Config, flags: Box<dyn FlagStore>) -> Chip8Interpreter {
        Chip8Interpreter {
            memory: Chip8Memory::new(config.font_base),
            regs: Registers::default(),
            stack: CallStack::default(),
            screen: Framebuffer::default(),
            timers: Timers::default(),
            keypad: Keypad::default(),
            config,
            state: State::Running,
            flags,
            rng: fastrand::Rng::new(),
            loaded: false,
        }
    }

    /// load a chip8 program from raw bytes
    pub fn load(&mut self, program: &[u8]) -> Result<()> {
        self.memory.load(program)?;
        self.loaded = true;
        Ok(())
    }

    /// load a chip8 program from anything readable
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<()> {
        self.memory.load_program(reader)?;
        self.loaded = true;
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn reset(&mut self, kind: ResetKind) {
        debug!("reset: {:?}", kind);
        self.regs = Registers::default();
        self.stack.clear();
        self.timers = Timers::default();
        self.keypad.clear();
        self.state = State::Running;
        self.memory.clear_heat();
        if kind >= ResetKind::Unload {
            self.memory.clear();
            self.loaded = false;
            self.screen.set_mode(Resolution::Low);
        }
        if kind >= ResetKind::Emulator {
            self.config = Config::default();
        }
        self.memory.load_font(FontSet::LowRes, self.config.font_base);
        self.screen.clear();
    }

    /// the once-per-frame key state from the input collaborator
    pub fn refresh_keys(&mut self, held: [bool; KEY_COUNT], released: Option<u8>) {
        self.keypad.refresh(held, released);
    }

    /// one 60Hz tick of the delay and sound timers
    pub fn tick_timers(&mut self) {
        self.timers.tick();
        self.memory.cool();
    }

    /// should the tone be playing?
    pub fn tone(&self) -> bool {
        self.timers.tone()
    }

    pub fn reseed(&mut self, seed: u64) {
        self.rng.seed(seed);
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn registers(&self) -> &Registers {
        &self.regs
    }

    pub fn registers_mut(&mut self) -> &mut Registers {
        &mut self.regs
    }

    pub fn stack(&self) -> &CallStack {
        &self.stack
    }

    pub fn memory(&self) -> &Chip8Memory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut Chip8Memory {
        &mut self.memory
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.screen
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    pub fn timers_mut(&mut self) -> &mut Timers {
        &mut self.timers
    }

    pub fn keypad(&self) -> &Keypad {
        &self.keypad
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// quirks and speed can change between instructions
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// the instruction the PC points at, for debuggers
    pub fn current_instruction(&self) -> Instruction {
        Instruction::decode(Opcode::new(self.memory.get_word(self.regs.pc())))
    }

    /// fetch, decode and execute one instruction, or re-poll for a key if
    /// FX0A is waiting. errors are non-fatal: the VM can always step again
    pub fn step(&mut self) -> Result<Step> {
        if let State::AwaitingKey { x } = self.state {
            return Ok(self.poll_key(x));
        }

        let pc = self.regs.pc();
        if pc >= LAST_ADDR {
            warn!("PC ran off the end of memory at {:#05x}, restarting", pc);
            self.regs.set_pc(PROGRAM_ADDR);
            return Ok(Step::Recovered);
        }

        let op = Opcode::new(self.memory.get_word(pc));
        self.memory.touch(pc);
        self.memory.touch(pc + 1);
        if pc + 2 > LAST_ADDR {
            warn!("PC ran off the end of memory at {:#05x}, restarting", pc);
            self.regs.set_pc(PROGRAM_ADDR);
            return Ok(Step::Recovered);
        }
        self.regs.set_pc(pc + 2);

        if pc == PROGRAM_ADDR && op.raw == HIRES_BOOT_OPCODE {
            debug!("two-page hi-res program, switching to 64x64");
            self.screen.set_mode(Resolution::Tall);
            self.regs.set_pc(HIRES_BOOT_ENTRY);
            return Ok(Step::Executed(Instruction::Jump(HIRES_BOOT_ENTRY)));
        }

        self.execute(Instruction::decode(op))
    }

    /// an FX0A is blocking
    fn poll_key(&mut self, x: u8) -> Step {
        match self.keypad.take_released() {
            Some(key) => {
                self.regs.v[x as usize] = key;
                self.state = State::Running;
                Step::Executed(Instruction::AwaitKey(x))
            }
            None => Step::AwaitingKey,
        }
    }

    fn execute(&mut self, instruction: Instruction) -> Result<Step> {
        use Instruction::*;

        let quirks = self.config.quirks;
        if instruction.is_extension() && !quirks.extended_instruction_set {
            return Ok(Step::Executed(instruction));
        }

        match instruction {
            ClearScreen => self.screen.clear(),
            Return => match self.stack.pop() {
                Some(addr) => self.regs.set_pc(addr),
                None => {
                    return Err(VmError::StackUnderflow {
                        pc: self.regs.pc().wrapping_sub(2) & ADDR_MASK,
                    })
                }
            },
            ScrollDown(n) => self.screen.scroll_down(n as usize),
            ScrollUp(n) => self.screen.scroll_up(n as usize),
            ScrollRight => self.screen.scroll_right(),
            ScrollLeft => self.screen.scroll_left(),
            Exit => return Ok(Step::Exit),
            LowRes => self.screen.set_mode(Resolution::Low),
            HighRes => self.screen.set_mode(Resolution::High),
            Jump(addr) => self.regs.set_pc(addr),
            Call(addr) => {
                self.stack.push(self.regs.pc());
                self.regs.set_pc(addr);
            }
            SkipEqImm { x, nn } => self.skip_if(self.vx(x) == nn),
            SkipNeImm { x, nn } => self.skip_if(self.vx(x) != nn),
            SkipEqReg { x, y } => self.skip_if(self.vx(x) == self.vx(y)),
            SkipNeReg { x, y } => self.skip_if(self.vx(x) != self.vx(y)),
            LoadImm { x, nn } => self.set_vx(x, nn),
            // VF isn't touched on overflow
            AddImm { x, nn } => self.set_vx(x, self.vx(x).wrapping_add(nn)),
            Move { x, y } => self.set_vx(x, self.vx(y)),
            Or { x, y } => self.bitwise(x, self.vx(x) | self.vx(y)),
            And { x, y } => self.bitwise(x, self.vx(x) & self.vx(y)),
            Xor { x, y } => self.bitwise(x, self.vx(x) ^ self.vx(y)),
            Add { x, y } => {
                let (sum, carry) = self.vx(x).overflowing_add(self.vx(y));
                self.set_vx(x, sum);
                self.regs.set_flag(carry);
            }
            Sub { x, y } => {
                let (vx, vy) = (self.vx(x), self.vx(y));
                self.set_vx(x, vx.wrapping_sub(vy));
                self.regs.set_flag(vx >= vy);
            }
            SubReverse { x, y } => {
                let (vx, vy) = (self.vx(x), self.vx(y));
                self.set_vx(x, vy.wrapping_sub(vx));
                self.regs.set_flag(vy >= vx);
            }
            ShiftRight { x, y } => {
                let value = if quirks.shift_uses_vy { self.vx(x) } else { self.vx(y) };
                self.set_vx(x, value >> 1);
                self.regs.set_flag(value & 0x01 != 0);
            }
            ShiftLeft { x, y } => {
                let value = if quirks.shift_uses_vy { self.vx(x) } else { self.vx(y) };
                self.set_vx(x, value << 1);
                self.regs.set_flag(value & 0x80 != 0);
            }
            LoadIndex(addr) => self.regs.set_i(addr),
            JumpOffset { x, nnn } => {
                // BXNN: XNN is the same 12 bits as NNN, only the register differs
                let offset = if quirks.jump_uses_vx { self.vx(x) } else { self.vx(0) };
                self.regs.set_pc(nnn + offset as u16);
            }
            Random { x, nn } => {
                let r = self.rng.u8(..);
                self.set_vx(x, r & nn);
            }
            Draw { x, y, n } => self.draw(x, y, n),
            DrawWide { x, y } => {
                if quirks.extended_instruction_set {
                    self.draw_wide(x, y);
                } else {
                    self.draw(x, y, 0);
                }
            }
            SkipKeyHeld(x) => self.skip_if(self.keypad.is_held(self.vx(x))),
            SkipKeyUp(x) => self.skip_if(!self.keypad.is_held(self.vx(x))),
            ReadDelay(x) => self.set_vx(x, self.timers.delay),
            AwaitKey(x) => match self.keypad.take_released() {
                Some(key) => self.set_vx(x, key),
                None => {
                    self.state = State::AwaitingKey { x };
                    return Ok(Step::AwaitingKey);
                }
            },
            SetDelay(x) => self.timers.delay = self.vx(x),
            SetSound(x) => self.timers.sound = self.vx(x),
            AddIndex(x) => {
                let sum = self.regs.i() + self.vx(x) as u16;
                self.regs.set_i(sum);
                self.regs.set_flag(sum > ADDR_MASK);
            }
            LowResGlyph(x) => self.point_at_glyph(FontSet::LowRes, x),
            HighResGlyph(x) => self.point_at_glyph(FontSet::HighRes, x),
            Bcd(x) => {
                let (value, i) = (self.vx(x), self.regs.i());
                for (offset, digit) in [value / 100, value / 10 % 10, value % 10].iter().enumerate() {
                    let addr = i.wrapping_add(offset as u16);
                    self.memory.write(addr, *digit);
                    self.memory.touch(addr);
                }
            }
            Store(x) => {
                let i = self.regs.i();
                self.memory.write_slice(i, &self.regs.v[..=x as usize]);
                self.advance_index(x, quirks.block_transfer_keeps_i);
            }
            Load(x) => {
                let i = self.regs.i();
                self.memory.read_slice(i, &mut self.regs.v[..=x as usize]);
                self.advance_index(x, quirks.block_transfer_keeps_i);
            }
            SaveFlags(x) => {
                if let Err(e) = self.flags.save(&self.regs.v[..=x as usize]) {
                    warn!("couldn't save flag registers: {}", e);
                }
            }
            RestoreFlags(x) => match self.flags.load() {
                Ok(stored) => storage::restore_into(stored, &mut self.regs.v[..=x as usize]),
                Err(e) => warn!("couldn't load flag registers: {}", e),
            },
            Unknown(raw) => {
                if self.config.diagnose_unknown {
                    debug!(
                        "unknown instruction {:04x} at {:#05x}",
                        raw,
                        self.regs.pc().wrapping_sub(2) & ADDR_MASK
                    );
                }
            }
        }
        Ok(Step::Executed(instruction))
    }

    fn vx(&self, x: u8) -> u8 {
        self.regs.v[x as usize]
    }

    fn set_vx(&mut self, x: u8, value: u8) {
        self.regs.v[x as usize] = value;
    }

    fn skip_if(&mut self, condition: bool) {
        if condition {
            self.regs.skip();
        }
    }

    fn bitwise(&mut self, x: u8, value: u8) {
        self.set_vx(x, value);
        if self.config.quirks.reset_flag_on_bitwise_op {
            self.regs.v[FLAG] = 0;
        }
    }

    fn advance_index(&mut self, x: u8, keep: bool) {
        if !keep {
            self.regs.set_i(self.regs.i() + x as u16 + 1);
        }
    }

    fn point_at_glyph(&mut self, set: FontSet, x: u8) {
        let base = self.config.font_base;
        if self.memory.font() != set {
            self.memory.load_font(set, base);
        }
        self.regs.set_i(set.glyph_addr(base, self.vx(x)));
    }

    /// DXYN: n rows of 8 pixels from I
    fn draw(&mut self, x: u8, y: u8, n: u8) {
        let i = self.regs.i();
        let mut rows = [0u8; 15];
        let rows = &mut rows[..n as usize];
        self.memory.read_slice(i, rows);
        for offset in 0..n as u16 {
            self.memory.touch(i.wrapping_add(offset));
        }
        let collision = self.screen.draw_sprite(self.vx(x), self.vx(y), rows);
        self.regs.set_flag(collision);
    }

    /// DXY0: 16 rows of 16 pixels from I
    fn draw_wide(&mut self, x: u8, y: u8) {
        let i = self.regs.i();
        let mut rows = [0u16; 16];
        for (row, bits) in rows.iter_mut().enumerate() {
            let addr = i.wrapping_add(2 * row as u16);
            *bits = self.memory.get_word(addr);
            self.memory.touch(addr);
            self.memory.touch(addr.wrapping_add(1));
        }
        let collision = self.screen.draw_wide_sprite(self.vx(x), self.vx(y), &rows);
        self.regs.set_flag(collision);
    }
}
