/// number of keys on the COSMAC hex keypad
pub const KEY_COUNT: usize = 16;

/// What the input collaborator saw this frame: which keys are down, and the
/// one key (if any) that came up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Keypad {
    held: [bool; KEY_COUNT],
    released: Option<u8>,
}

impl Keypad {
    /// replace the frame's key state. a released index above 0xf is ignored
    pub fn refresh(&mut self, held: [bool; KEY_COUNT], released: Option<u8>) {
        self.held = held;
        self.released = released.filter(|k| (*k as usize) < KEY_COUNT);
    }

    /// is the key down? indices past 0xf are never held
    pub fn is_held(&self, key: u8) -> bool {
        self.held.get(key as usize).copied().unwrap_or(false)
    }

    pub fn released(&self) -> Option<u8> {
        self.released
    }

    /// consume the release edge so only one FX0A sees it
    pub fn take_released(&mut self) -> Option<u8> {
        self.released.take()
    }

    pub fn held(&self) -> &[bool; KEY_COUNT] {
        &self.held
    }

    pub fn clear(&mut self) {
        *self = Keypad::default();
    }
}
