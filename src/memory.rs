use log::debug;
use std::io;

use crate::error::{Result, VmError};
use crate::font::FontSet;

// NB. addresses are u16 as per the chip-8; lengths are usize to stop endless casting

/// how much RAM we have
pub const RAM_SIZE_BYTES: usize = 4096;

/// where programs are loaded, and where the PC starts
pub const PROGRAM_ADDR: u16 = 0x0200;

/// the largest program that fits between PROGRAM_ADDR and the top of RAM
pub const MAX_PROGRAM_BYTES: usize = RAM_SIZE_BYTES - PROGRAM_ADDR as usize;

/// everything addressable wraps at 4K
pub const ADDR_MASK: u16 = 0x0fff;

/// how much a heatmap cell fades on each 60Hz tick
const HEAT_DECAY: u8 = 5;

/// Represents flat, wrapping memory. Reads and writes never go out of bounds;
/// an address past 0xfff comes back round to 0x000.
pub trait MemoryMap {
    /// read a byte
    fn read(&self, addr: u16) -> u8;

    /// write a byte
    fn write(&mut self, addr: u16, value: u8);

    /// get a two-byte big-endian word (opcodes)
    fn get_word(&self, addr: u16) -> u16 {
        ((self.read(addr) as u16) << 8) | self.read(addr.wrapping_add(1)) as u16
    }

    /// write a chunk of bytes starting at an address
    fn write_slice(&mut self, addr: u16, data: &[u8]) {
        for (offset, byte) in data.iter().enumerate() {
            self.write(addr.wrapping_add(offset as u16), *byte);
        }
    }

    /// copy `buf.len()` bytes out of memory starting at an address
    fn read_slice(&self, addr: u16, buf: &mut [u8]) {
        for (offset, byte) in buf.iter_mut().enumerate() {
            *byte = self.read(addr.wrapping_add(offset as u16));
        }
    }
}

/// Defines the CHIP-8 memory map used here:
///   0x0000-0x01ff  font glyphs (low-res at the configured base, or high-res
///                  filling the whole area)
///   0x0200-0x0fff  program
///
/// alongside it we keep a heatmap of recently touched bytes, for debuggers.
pub struct Chip8Memory {
    bytes: Box<[u8]>,
    heat: Box<[u8]>,
    font: FontSet,
}

impl MemoryMap for Chip8Memory {
    fn read(&self, addr: u16) -> u8 {
        self.bytes[(addr & ADDR_MASK) as usize]
    }

    fn write(&mut self, addr: u16, value: u8) {
        self.bytes[(addr & ADDR_MASK) as usize] = value;
    }
}

impl Chip8Memory {
    /// zeroed memory holding the low-res font at `font_base`
    pub fn new(font_base: u16) -> Self {
        let mut mm = Chip8Memory {
            bytes: vec![0u8; RAM_SIZE_BYTES].into_boxed_slice(),
            heat: vec![0u8; RAM_SIZE_BYTES].into_boxed_slice(),
            font: FontSet::LowRes,
        };
        mm.load_font(FontSet::LowRes, font_base);
        mm
    }

    /// copy a program in at 0x200. memory is untouched if it doesn't fit
    pub fn load(&mut self, program: &[u8]) -> Result<()> {
        if program.len() > MAX_PROGRAM_BYTES {
            return Err(VmError::ProgramTooLarge {
                size: program.len(),
                max: MAX_PROGRAM_BYTES,
            });
        }
        let start = PROGRAM_ADDR as usize;
        self.bytes[start..start + program.len()].copy_from_slice(program);
        Ok(())
    }

    /// read a whole program from anything readable, then load it
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<()> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        self.load(&buf)
    }

    /// zero the interpreter area and put a glyph table in it
    pub fn load_font(&mut self, set: FontSet, lowres_base: u16) {
        self.bytes[..PROGRAM_ADDR as usize].fill(0);
        let base = set.base(lowres_base) as usize;
        let glyphs = set.glyphs();
        self.bytes[base..base + glyphs.len()].copy_from_slice(glyphs);
        if self.font != set {
            debug!("switched to {:?} font", set);
        }
        self.font = set;
    }

    pub fn font(&self) -> FontSet {
        self.font
    }

    /// zero everything, including the font area
    pub fn clear(&mut self) {
        self.bytes.fill(0);
        self.heat.fill(0);
    }

    /// mark a byte as recently accessed
    pub fn touch(&mut self, addr: u16) {
        self.heat[(addr & ADDR_MASK) as usize] = 0xff;
    }

    /// fade every heatmap cell; called once per timer tick
    pub fn cool(&mut self) {
        for cell in self.heat.iter_mut() {
            *cell = cell.saturating_sub(HEAT_DECAY);
        }
    }

    pub fn clear_heat(&mut self) {
        self.heat.fill(0);
    }

    /// how recently each byte was touched; 0xff is this frame, 0 is cold
    pub fn heatmap(&self) -> &[u8] {
        &self.heat
    }

    /// r/o view of all of memory
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::{HIRES_FONT, LOWRES_FONT};

    #[test]
    fn test_memory_zeroed() {
        let m = Chip8Memory::new(0);
        // NB. memory is zeroed from 0x200 because before that we bake in the font
        assert!(m.as_slice()[0x200..].iter().all(|b| *b == 0));
        assert_eq!(m.as_slice()[..80], LOWRES_FONT);
    }

    #[test]
    fn test_font_at_contemporary_base() {
        let m = Chip8Memory::new(0x050);
        assert_eq!(m.as_slice()[0x050..0x0a0], LOWRES_FONT);
        assert!(m.as_slice()[..0x050].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_write_slice_ok() {
        let mut dst = Chip8Memory::new(0);
        dst.clear();
        dst.write_slice(8, &[0, 1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(
            dst.as_slice()[..16],
            [0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 2, 3, 4, 5, 6, 7]
        );
    }

    #[test]
    fn test_addressing_wraps() {
        let mut m = Chip8Memory::new(0);
        m.write(0x1005, 0xaa);
        assert_eq!(m.read(0x005), 0xaa);
        m.write_slice(0x0fff, &[0x12, 0x34]);
        assert_eq!(m.read(0x0fff), 0x12);
        assert_eq!(m.read(0x0000), 0x34);
        assert_eq!(m.get_word(0x0fff), 0x1234);
    }

    #[test]
    fn test_read_word() {
        let mut m = Chip8Memory::new(0);
        m.write_slice(0x300, &[0, 1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(m.get_word(0x304), 0x0405);
    }

    #[test]
    fn test_program_load_ok() -> Result<()> {
        let mut dst = Chip8Memory::new(0);
        let mut prog: &[u8] = &[0x00, 0xe0]; // clear screen
        dst.load_program(&mut prog)?;
        assert_eq!(dst.get_word(0x200), 0x00e0);
        Ok(())
    }

    #[test]
    fn test_program_exactly_fits() -> Result<()> {
        let mut dst = Chip8Memory::new(0);
        dst.load(&[0xab; MAX_PROGRAM_BYTES])?;
        assert_eq!(dst.read(0x0fff), 0xab);
        Ok(())
    }

    #[test]
    fn test_program_too_large_leaves_memory() {
        let mut dst = Chip8Memory::new(0);
        let err = dst.load(&[0xab; MAX_PROGRAM_BYTES + 1]).unwrap_err();
        assert!(matches!(
            err,
            VmError::ProgramTooLarge { size: 3585, max: 3584 }
        ));
        assert!(dst.as_slice()[0x200..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_load_font_replaces_set() {
        let mut m = Chip8Memory::new(0x050);
        m.load_font(FontSet::HighRes, 0x050);
        assert_eq!(m.font(), FontSet::HighRes);
        assert_eq!(m.as_slice()[..0x200], HIRES_FONT);
        m.load_font(FontSet::LowRes, 0x050);
        assert_eq!(m.font(), FontSet::LowRes);
        assert!(m.as_slice()[0x0a0..0x200].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_heat_decays() {
        let mut m = Chip8Memory::new(0);
        m.touch(0x1200);
        assert_eq!(m.heatmap()[0x200], 0xff);
        m.cool();
        assert_eq!(m.heatmap()[0x200], 0xfa);
        for _ in 0..60 {
            m.cool();
        }
        assert_eq!(m.heatmap()[0x200], 0);
    }
}
