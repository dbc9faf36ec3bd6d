/// Which glyph table is currently sitting in the low memory region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontSet {
    /// 4x5 hex digits, five bytes a glyph
    LowRes,
    /// 8x10 hex digits stored as 16x16 sprites (two bytes a row), for DXY0
    HighRes,
}

impl FontSet {
    /// bytes between consecutive glyphs
    pub fn stride(self) -> u16 {
        match self {
            FontSet::LowRes => 5,
            FontSet::HighRes => 16 * 2,
        }
    }

    pub fn glyphs(self) -> &'static [u8] {
        match self {
            FontSet::LowRes => &LOWRES_FONT,
            FontSet::HighRes => &HIRES_FONT,
        }
    }

    /// where this set is loaded, given the configured low-res font base.
    /// the high-res table fills the whole interpreter area so it always
    /// starts at 0x000
    pub fn base(self, lowres_base: u16) -> u16 {
        match self {
            FontSet::LowRes => lowres_base,
            FontSet::HighRes => 0x000,
        }
    }

    /// address of the glyph for the low nibble of `digit`
    pub fn glyph_addr(self, lowres_base: u16, digit: u8) -> u16 {
        self.base(lowres_base) + (digit & 0x0f) as u16 * self.stride()
    }
}

pub const LOWRES_FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

#[rustfmt::skip]
pub const HIRES_FONT: [u8; 512] = [
    0x00, 0x00, 0x3C, 0x00, 0x7E, 0x00, 0xE7, 0x00, 0xC3, 0x00, 0xC3, 0x00, 0xC3, 0x00, 0xC3, 0x00, 0xE7, 0x00, 0x7E, 0x00, 0x3C, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // 0
    0x00, 0x00, 0x18, 0x00, 0x38, 0x00, 0x78, 0x00, 0x58, 0x00, 0x18, 0x00, 0x18, 0x00, 0x18, 0x00, 0x18, 0x00, 0x7E, 0x00, 0x7E, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // 1
    0x00, 0x00, 0x3C, 0x00, 0x7E, 0x00, 0xE7, 0x00, 0x03, 0x00, 0x06, 0x00, 0x0C, 0x00, 0x18, 0x00, 0x30, 0x00, 0xFF, 0x00, 0xFF, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // 2
    0x00, 0x00, 0x3C, 0x00, 0x7E, 0x00, 0xE7, 0x00, 0x03, 0x00, 0x1E, 0x00, 0x1E, 0x00, 0x03, 0x00, 0xE7, 0x00, 0x7E, 0x00, 0x3C, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // 3
    0x00, 0x00, 0x06, 0x00, 0x0E, 0x00, 0x1E, 0x00, 0x36, 0x00, 0x66, 0x00, 0xC6, 0x00, 0xFF, 0x00, 0xFF, 0x00, 0x06, 0x00, 0x06, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // 4
    0x00, 0x00, 0xFF, 0x00, 0xFF, 0x00, 0xC0, 0x00, 0xFC, 0x00, 0xFE, 0x00, 0x03, 0x00, 0x03, 0x00, 0xE7, 0x00, 0x7E, 0x00, 0x3C, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // 5
    0x00, 0x00, 0x3C, 0x00, 0x7E, 0x00, 0xE7, 0x00, 0xC0, 0x00, 0xFC, 0x00, 0xFE, 0x00, 0xE7, 0x00, 0xE7, 0x00, 0x7E, 0x00, 0x3C, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // 6
    0x00, 0x00, 0xFF, 0x00, 0xFF, 0x00, 0x03, 0x00, 0x06, 0x00, 0x0C, 0x00, 0x18, 0x00, 0x30, 0x00, 0x60, 0x00, 0x60, 0x00, 0x60, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // 7
    0x00, 0x00, 0x3C, 0x00, 0x7E, 0x00, 0xE7, 0x00, 0xE7, 0x00, 0x7E, 0x00, 0x7E, 0x00, 0xE7, 0x00, 0xE7, 0x00, 0x7E, 0x00, 0x3C, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // 8
    0x00, 0x00, 0x3C, 0x00, 0x7E, 0x00, 0xE7, 0x00, 0xE7, 0x00, 0x7F, 0x00, 0x3F, 0x00, 0x07, 0x00, 0xE7, 0x00, 0x7E, 0x00, 0x3C, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // 9
    0x00, 0x00, 0x3C, 0x00, 0x7E, 0x00, 0xE7, 0x00, 0xC3, 0x00, 0xC3, 0x00, 0xFF, 0x00, 0xFF, 0x00, 0xC3, 0x00, 0xC3, 0x00, 0xC3, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // A
    0x00, 0x00, 0xFC, 0x00, 0xFE, 0x00, 0xE7, 0x00, 0xE7, 0x00, 0xFE, 0x00, 0xFC, 0x00, 0xE7, 0x00, 0xE7, 0x00, 0xFE, 0x00, 0xFC, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // B
    0x00, 0x00, 0x3C, 0x00, 0x7E, 0x00, 0xE7, 0x00, 0xC0, 0x00, 0xC0, 0x00, 0xC0, 0x00, 0xC0, 0x00, 0xE7, 0x00, 0x7E, 0x00, 0x3C, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // C
    0x00, 0x00, 0xFC, 0x00, 0xFE, 0x00, 0xE7, 0x00, 0xE7, 0x00, 0xE7, 0x00, 0xE7, 0x00, 0xE7, 0x00, 0xE7, 0x00, 0xFE, 0x00, 0xFC, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // D
    0x00, 0x00, 0xFF, 0x00, 0xFF, 0x00, 0xC0, 0x00, 0xC0, 0x00, 0xFE, 0x00, 0xFE, 0x00, 0xC0, 0x00, 0xC0, 0x00, 0xFF, 0x00, 0xFF, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // E
    0x00, 0x00, 0xFF, 0x00, 0xFF, 0x00, 0xC0, 0x00, 0xC0, 0x00, 0xFE, 0x00, 0xFE, 0x00, 0xC0, 0x00, 0xC0, 0x00, 0xC0, 0x00, 0xC0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // F
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glyph_addr_lowres() {
        assert_eq!(FontSet::LowRes.glyph_addr(0x000, 0x0a), 50);
        assert_eq!(FontSet::LowRes.glyph_addr(0x050, 0x01), 0x055);
    }

    #[test]
    fn test_glyph_addr_ignores_high_nibble() {
        assert_eq!(FontSet::LowRes.glyph_addr(0, 0xf3), 15);
        assert_eq!(FontSet::HighRes.glyph_addr(0x050, 0x12), 64);
    }

    #[test]
    fn test_tables_fill_sixteen_glyphs() {
        for set in [FontSet::LowRes, FontSet::HighRes] {
            assert_eq!(set.glyphs().len(), 16 * set.stride() as usize);
        }
    }

    #[test]
    fn test_hires_fits_below_programs() {
        assert!(HIRES_FONT.len() <= 0x200);
    }
}
