use std::fmt;

/// A fetched 16-bit instruction word, split into the fields opcodes use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode {
    pub raw: u16,
}

impl Opcode {
    pub fn new(raw: u16) -> Self {
        Opcode { raw }
    }

    /// nibbles 1-4, most significant first
    pub fn nibbles(self) -> (u8, u8, u8, u8) {
        (
            (self.raw >> 12) as u8,
            (self.raw >> 8 & 0xf) as u8,
            (self.raw >> 4 & 0xf) as u8,
            (self.raw & 0xf) as u8,
        )
    }

    pub fn x(self) -> u8 {
        (self.raw >> 8 & 0xf) as u8
    }

    pub fn y(self) -> u8 {
        (self.raw >> 4 & 0xf) as u8
    }

    pub fn n(self) -> u8 {
        (self.raw & 0xf) as u8
    }

    /// low byte
    pub fn nn(self) -> u8 {
        (self.raw & 0xff) as u8
    }

    /// low 12 bits
    pub fn nnn(self) -> u16 {
        self.raw & 0x0fff
    }
}

/// Every instruction the dispatcher knows. SUPER-CHIP ones are decoded
/// regardless; whether they do anything is up to the quirks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0
    ClearScreen,
    /// 00EE
    Return,
    /// 00CN
    ScrollDown(u8),
    /// 00DN
    ScrollUp(u8),
    /// 00FB
    ScrollRight,
    /// 00FC
    ScrollLeft,
    /// 00FD
    Exit,
    /// 00FE
    LowRes,
    /// 00FF
    HighRes,
    /// 1NNN
    Jump(u16),
    /// 2NNN
    Call(u16),
    /// 3XNN
    SkipEqImm { x: u8, nn: u8 },
    /// 4XNN
    SkipNeImm { x: u8, nn: u8 },
    /// 5XY0
    SkipEqReg { x: u8, y: u8 },
    /// 6XNN
    LoadImm { x: u8, nn: u8 },
    /// 7XNN
    AddImm { x: u8, nn: u8 },
    /// 8XY0
    Move { x: u8, y: u8 },
    /// 8XY1
    Or { x: u8, y: u8 },
    /// 8XY2
    And { x: u8, y: u8 },
    /// 8XY3
    Xor { x: u8, y: u8 },
    /// 8XY4
    Add { x: u8, y: u8 },
    /// 8XY5
    Sub { x: u8, y: u8 },
    /// 8XY6
    ShiftRight { x: u8, y: u8 },
    /// 8XY7
    SubReverse { x: u8, y: u8 },
    /// 8XYE
    ShiftLeft { x: u8, y: u8 },
    /// 9XY0
    SkipNeReg { x: u8, y: u8 },
    /// ANNN
    LoadIndex(u16),
    /// BNNN, or BXNN with the jump quirk
    JumpOffset { x: u8, nnn: u16 },
    /// CXNN
    Random { x: u8, nn: u8 },
    /// DXYN
    Draw { x: u8, y: u8, n: u8 },
    /// DXY0
    DrawWide { x: u8, y: u8 },
    /// EX9E
    SkipKeyHeld(u8),
    /// EXA1
    SkipKeyUp(u8),
    /// FX07
    ReadDelay(u8),
    /// FX0A
    AwaitKey(u8),
    /// FX15
    SetDelay(u8),
    /// FX18
    SetSound(u8),
    /// FX1E
    AddIndex(u8),
    /// FX29
    LowResGlyph(u8),
    /// FX30
    HighResGlyph(u8),
    /// FX33
    Bcd(u8),
    /// FX55
    Store(u8),
    /// FX65
    Load(u8),
    /// FX75
    SaveFlags(u8),
    /// FX85
    RestoreFlags(u8),
    /// anything else, including 0NNN machine routines
    Unknown(u16),
}

impl Instruction {
    /// dispatch on the family nibble, then on whichever sub-field the family uses
    pub fn decode(op: Opcode) -> Instruction {
        use Instruction::*;
        let (x, y, n, nn, nnn) = (op.x(), op.y(), op.n(), op.nn(), op.nnn());
        match op.nibbles() {
            (0x0, 0x0, 0xe, 0x0) => ClearScreen,
            (0x0, 0x0, 0xe, 0xe) => Return,
            (0x0, 0x0, 0xc, n) => ScrollDown(n),
            (0x0, 0x0, 0xd, n) => ScrollUp(n),
            (0x0, 0x0, 0xf, 0xb) => ScrollRight,
            (0x0, 0x0, 0xf, 0xc) => ScrollLeft,
            (0x0, 0x0, 0xf, 0xd) => Exit,
            (0x0, 0x0, 0xf, 0xe) => LowRes,
            (0x0, 0x0, 0xf, 0xf) => HighRes,
            (0x1, ..) => Jump(nnn),
            (0x2, ..) => Call(nnn),
            (0x3, ..) => SkipEqImm { x, nn },
            (0x4, ..) => SkipNeImm { x, nn },
            (0x5, _, _, 0x0) => SkipEqReg { x, y },
            (0x6, ..) => LoadImm { x, nn },
            (0x7, ..) => AddImm { x, nn },
            (0x8, _, _, 0x0) => Move { x, y },
            (0x8, _, _, 0x1) => Or { x, y },
            (0x8, _, _, 0x2) => And { x, y },
            (0x8, _, _, 0x3) => Xor { x, y },
            (0x8, _, _, 0x4) => Add { x, y },
            (0x8, _, _, 0x5) => Sub { x, y },
            (0x8, _, _, 0x6) => ShiftRight { x, y },
            (0x8, _, _, 0x7) => SubReverse { x, y },
            (0x8, _, _, 0xe) => ShiftLeft { x, y },
            (0x9, _, _, 0x0) => SkipNeReg { x, y },
            (0xa, ..) => LoadIndex(nnn),
            (0xb, ..) => JumpOffset { x, nnn },
            (0xc, ..) => Random { x, nn },
            (0xd, _, _, 0x0) => DrawWide { x, y },
            (0xd, ..) => Draw { x, y, n },
            (0xe, ..) if nn == 0x9e => SkipKeyHeld(x),
            (0xe, ..) if nn == 0xa1 => SkipKeyUp(x),
            (0xf, ..) => match nn {
                0x07 => ReadDelay(x),
                0x0a => AwaitKey(x),
                0x15 => SetDelay(x),
                0x18 => SetSound(x),
                0x1e => AddIndex(x),
                0x29 => LowResGlyph(x),
                0x30 => HighResGlyph(x),
                0x33 => Bcd(x),
                0x55 => Store(x),
                0x65 => Load(x),
                0x75 => SaveFlags(x),
                0x85 => RestoreFlags(x),
                _ => Unknown(op.raw),
            },
            _ => Unknown(op.raw),
        }
    }

    /// only does anything with the extended instruction set enabled
    pub fn is_extension(&self) -> bool {
        use Instruction::*;
        matches!(
            self,
            ScrollDown(_)
                | ScrollUp(_)
                | ScrollRight
                | ScrollLeft
                | Exit
                | LowRes
                | HighRes
                | HighResGlyph(_)
                | SaveFlags(_)
                | RestoreFlags(_)
        )
    }
}

impl From<u16> for Instruction {
    fn from(raw: u16) -> Self {
        Instruction::decode(Opcode::new(raw))
    }
}

/// conventional mnemonics, for the debugger line
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;
        match *self {
            ClearScreen => write!(f, "CLS"),
            Return => write!(f, "RET"),
            ScrollDown(n) => write!(f, "SCD {}", n),
            ScrollUp(n) => write!(f, "SCU {}", n),
            ScrollRight => write!(f, "SCR"),
            ScrollLeft => write!(f, "SCL"),
            Exit => write!(f, "EXIT"),
            LowRes => write!(f, "LOW"),
            HighRes => write!(f, "HIGH"),
            Jump(a) => write!(f, "JP {:03X}", a),
            Call(a) => write!(f, "CALL {:03X}", a),
            SkipEqImm { x, nn } => write!(f, "SE V{:X}, {:02X}", x, nn),
            SkipNeImm { x, nn } => write!(f, "SNE V{:X}, {:02X}", x, nn),
            SkipEqReg { x, y } => write!(f, "SE V{:X}, V{:X}", x, y),
            LoadImm { x, nn } => write!(f, "LD V{:X}, {:02X}", x, nn),
            AddImm { x, nn } => write!(f, "ADD V{:X}, {:02X}", x, nn),
            Move { x, y } => write!(f, "LD V{:X}, V{:X}", x, y),
            Or { x, y } => write!(f, "OR V{:X}, V{:X}", x, y),
            And { x, y } => write!(f, "AND V{:X}, V{:X}", x, y),
            Xor { x, y } => write!(f, "XOR V{:X}, V{:X}", x, y),
            Add { x, y } => write!(f, "ADD V{:X}, V{:X}", x, y),
            Sub { x, y } => write!(f, "SUB V{:X}, V{:X}", x, y),
            ShiftRight { x, y } => write!(f, "SHR V{:X}, V{:X}", x, y),
            SubReverse { x, y } => write!(f, "SUBN V{:X}, V{:X}", x, y),
            ShiftLeft { x, y } => write!(f, "SHL V{:X}, V{:X}", x, y),
            SkipNeReg { x, y } => write!(f, "SNE V{:X}, V{:X}", x, y),
            LoadIndex(a) => write!(f, "LD I, {:03X}", a),
            JumpOffset { nnn, .. } => write!(f, "JP V0, {:03X}", nnn),
            Random { x, nn } => write!(f, "RND V{:X}, {:02X}", x, nn),
            Draw { x, y, n } => write!(f, "DRW V{:X}, V{:X}, {:X}", x, y, n),
            DrawWide { x, y } => write!(f, "DRW V{:X}, V{:X}, 0", x, y),
            SkipKeyHeld(x) => write!(f, "SKP V{:X}", x),
            SkipKeyUp(x) => write!(f, "SKNP V{:X}", x),
            ReadDelay(x) => write!(f, "LD V{:X}, DT", x),
            AwaitKey(x) => write!(f, "LD V{:X}, K", x),
            SetDelay(x) => write!(f, "LD DT, V{:X}", x),
            SetSound(x) => write!(f, "LD ST, V{:X}", x),
            AddIndex(x) => write!(f, "ADD I, V{:X}", x),
            LowResGlyph(x) => write!(f, "LD F, V{:X}", x),
            HighResGlyph(x) => write!(f, "LD HF, V{:X}", x),
            Bcd(x) => write!(f, "LD B, V{:X}", x),
            Store(x) => write!(f, "LD [I], V{:X}", x),
            Load(x) => write!(f, "LD V{:X}, [I]", x),
            SaveFlags(x) => write!(f, "LD R, V{:X}", x),
            RestoreFlags(x) => write!(f, "LD V{:X}, R", x),
            Unknown(op) => write!(f, "DW {:04X}", op),
        }
    }
}
