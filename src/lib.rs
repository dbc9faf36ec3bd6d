//! A CHIP-8 / SUPER-CHIP virtual machine, with a terminal front end.
//!
//! ## Design
//!
//! * the VM is one value (interpreter::Chip8Interpreter) owning memory,
//!   registers, stack, framebuffer, timers, keypad and config; no globals
//! * it knows nothing about wall-clock time. a Clock turns elapsed time into
//!   60Hz timer ticks and instruction steps, each with its own accumulator,
//!   so changing the CPU speed never changes how fast the timers run
//! * abstract display so can plug alternatives; starting with TUI in-console
//! * input, audio and flag-register storage are traits too, with dummy
//!   implementations for tests
//! * instructions decode into a tagged enum, then execute; the quirks that
//!   differ between CHIP-8 and SUPER-CHIP are read at execute time
//!
//! Model
//!
//! ```text
//! Environment
//!  |-- display, input, sound
//!  |-- interpreter(config, flag store)
//!  |    |-- memory (program, font, heatmap)
//!  |    |-- registers, call stack, timers, keypad
//!  |    `-- framebuffer
//!  |-- clock
//!  `-- main loop, once per frame
//!       |-- frame = input.poll(); act on hotkeys
//!       |-- interpreter.refresh_keys(frame)
//!       |-- clock.advance(elapsed, interpreter, sound)
//!       |     |-- while timer_acc >= 1s: interpreter.tick_timers()
//!       |     `-- while cpu_acc >= 1s: interpreter.step()
//!       `-- display.draw(interpreter.framebuffer())
//! ```

pub mod config;
pub mod display;
pub mod environment;
pub mod error;
pub mod font;
pub mod framebuffer;
pub mod input;
pub mod instruction;
pub mod interpreter;
pub mod keypad;
pub mod memory;
pub mod quirks;
pub mod registers;
pub mod sound;
pub mod storage;
pub mod timer;

pub use config::Config;
pub use error::{Result, VmError};
pub use framebuffer::{Framebuffer, Resolution};
pub use instruction::{Instruction, Opcode};
pub use interpreter::{Chip8Interpreter, ResetKind, State, Step};
pub use quirks::{Preset, Quirks};
pub use timer::{Clock, FrameReport};
