use crossterm::event::{poll, read, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal;
use log::{debug, trace};
use std::collections::{HashMap, VecDeque};
use std::io;
use std::time::Duration;

use crate::keypad::KEY_COUNT;

/// map keys on the left-hand side of a qwerty keyboard to the COSMAC hex
/// keypad, keeping the keypad's layout
const CHIP8_CONVENTIONAL_KEYMAP: [(char, u8); KEY_COUNT] = [
    ('x', 0x00), // x
    ('1', 0x01), // 1
    ('2', 0x02), // 2
    ('3', 0x03), // 3
    ('q', 0x04), // q
    ('w', 0x05), // w
    ('e', 0x06), // e
    ('a', 0x07), // a
    ('s', 0x08), // s
    ('d', 0x09), // d
    ('z', 0x0a), // z
    ('c', 0x0b), // c
    ('4', 0x0c), // 4
    ('r', 0x0d), // r
    ('f', 0x0e), // f
    ('v', 0x0f), // v
];

/// frames a key stays down after the last press/repeat event the terminal
/// sent us. has to outlast the keyboard's autorepeat gap
pub const HOLD_FRAMES: u32 = 12;

/// Things the user can ask the emulator to do, rather than the program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    /// restart the loaded program
    ResetProgram,
    /// forget the program
    Unload,
    /// back to the default configuration too
    ResetEmulator,
    /// next cpu speed preset
    CycleSpeed,
    /// toggle between CHIP-8 and SUPER-CHIP quirks
    TogglePreset,
    /// pause / resume the CPU
    Pause,
    /// run one instruction while paused
    Step,
    /// show / hide the register line
    ToggleDebug,
}

const COMMAND_KEYMAP: [(KeyCode, Command); 9] = [
    (KeyCode::Esc, Command::Quit),
    (KeyCode::Char('k'), Command::ResetProgram),
    (KeyCode::Char('l'), Command::Unload),
    (KeyCode::Char('o'), Command::ResetEmulator),
    (KeyCode::Char('h'), Command::CycleSpeed),
    (KeyCode::Char('p'), Command::TogglePreset),
    (KeyCode::Char('m'), Command::Pause),
    (KeyCode::Char('n'), Command::Step),
    (KeyCode::F(3), Command::ToggleDebug),
];

/// Everything the input device saw since the last poll.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputFrame {
    pub held: [bool; KEY_COUNT],
    pub released: Option<u8>,
    pub commands: Vec<Command>,
}

/// reads the keypad, once per frame
pub trait Input {
    fn poll(&mut self) -> Result<InputFrame, io::Error>;
}

/// Keypad state for devices that only report presses. Each press holds the
/// key for HOLD_FRAMES ticks; when that runs out the key counts as released.
#[derive(Debug, Clone, Default)]
pub struct KeyLatch {
    remaining: [u32; KEY_COUNT],
}

impl KeyLatch {
    pub fn press(&mut self, key: u8) {
        if let Some(r) = self.remaining.get_mut(key as usize) {
            *r = HOLD_FRAMES;
        }
    }

    pub fn held(&self) -> [bool; KEY_COUNT] {
        let mut held = [false; KEY_COUNT];
        for (h, r) in held.iter_mut().zip(self.remaining.iter()) {
            *h = *r > 0;
        }
        held
    }

    /// age every held key by one frame. returns the lowest key that came up
    pub fn tick(&mut self) -> Option<u8> {
        let mut released = None;
        for (key, r) in self.remaining.iter_mut().enumerate() {
            if *r == 1 && released.is_none() {
                released = Some(key as u8);
            }
            *r = r.saturating_sub(1);
        }
        released
    }
}

/// simple implementation of Input, using the terminal. puts the terminal in
/// raw mode for as long as it lives
pub struct StdinInput {
    keymap: HashMap<char, u8>,
    commands: HashMap<KeyCode, Command>,
    latch: KeyLatch,
}

impl StdinInput {
    pub fn new() -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        Ok(StdinInput {
            keymap: HashMap::from(CHIP8_CONVENTIONAL_KEYMAP),
            commands: HashMap::from(COMMAND_KEYMAP),
            latch: KeyLatch::default(),
        })
    }

    fn handle_key(&mut self, evt: KeyEvent, frame: &mut InputFrame) {
        // raw mode swallows the signal, so do ctrl-c ourselves
        if evt.code == KeyCode::Char('c') && evt.modifiers.contains(KeyModifiers::CONTROL) {
            frame.commands.push(Command::Quit);
            return;
        }
        if let KeyCode::Char(ch) = evt.code {
            if let Some(key) = self.keymap.get(&ch.to_ascii_lowercase()) {
                self.latch.press(*key);
                return;
            }
        }
        match self.commands.get(&evt.code) {
            Some(cmd) => frame.commands.push(*cmd),
            None => debug!("can't map {:?} to a COSMAC key", evt.code),
        }
    }
}

impl Input for StdinInput {
    fn poll(&mut self) -> Result<InputFrame, io::Error> {
        let mut frame = InputFrame {
            released: self.latch.tick(),
            ..InputFrame::default()
        };
        while poll(Duration::from_millis(0))? {
            match read()? {
                Event::Key(evt) => self.handle_key(evt, &mut frame),
                other => trace!("ignoring terminal event {:?}", other),
            }
        }
        frame.held = self.latch.held();
        Ok(frame)
    }
}

impl Drop for StdinInput {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// dummy Input implementation for testing; plays back a script of frames,
/// then reports nothing forever
#[derive(Debug, Default)]
pub struct DummyInput {
    frames: VecDeque<InputFrame>,
}

impl DummyInput {
    pub fn new(frames: Vec<InputFrame>) -> Self {
        DummyInput {
            frames: frames.into(),
        }
    }

    /// one frame where `key` comes up, after being held for one frame
    pub fn tap(key: u8) -> Vec<InputFrame> {
        let mut down = InputFrame::default();
        down.held[key as usize % KEY_COUNT] = true;
        let up = InputFrame {
            released: Some(key),
            ..InputFrame::default()
        };
        vec![down, up]
    }
}

impl Input for DummyInput {
    fn poll(&mut self) -> Result<InputFrame, io::Error> {
        Ok(self.frames.pop_front().unwrap_or_default())
    }
}
