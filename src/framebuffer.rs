use log::debug;

/// pixels moved by a horizontal scroll
const HSCROLL_PIXELS: usize = 4;

/// The three screen modes a program can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// 64x32, plain CHIP-8
    Low,
    /// 64x64, the two-page hi-res CHIP-8 variant
    Tall,
    /// 128x64, SUPER-CHIP
    High,
}

impl Resolution {
    pub fn width(self) -> usize {
        match self {
            Resolution::Low | Resolution::Tall => 64,
            Resolution::High => 128,
        }
    }

    pub fn height(self) -> usize {
        match self {
            Resolution::Low => 32,
            Resolution::Tall | Resolution::High => 64,
        }
    }

    pub fn pixel_count(self) -> usize {
        self.width() * self.height()
    }
}

/// 1 bit per pixel screen. The sprite origin wraps round the edges; the
/// pixels of a sprite that run off the edge are clipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    resolution: Resolution,
    pixels: Vec<bool>,
}

impl Default for Framebuffer {
    fn default() -> Self {
        Framebuffer::new(Resolution::Low)
    }
}

impl Framebuffer {
    pub fn new(resolution: Resolution) -> Self {
        Framebuffer {
            resolution,
            pixels: vec![false; resolution.pixel_count()],
        }
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn width(&self) -> usize {
        self.resolution.width()
    }

    pub fn height(&self) -> usize {
        self.resolution.height()
    }

    pub fn clear(&mut self) {
        self.pixels.fill(false);
    }

    /// switch resolution; always leaves a blank screen
    pub fn set_mode(&mut self, resolution: Resolution) {
        if resolution != self.resolution {
            debug!("screen mode {:?} -> {:?}", self.resolution, resolution);
        }
        self.resolution = resolution;
        self.pixels = vec![false; resolution.pixel_count()];
    }

    /// is (x, y) lit? anything off-screen reads as unlit
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        x < self.width() && y < self.height() && self.pixels[y * self.width() + x]
    }

    /// rows of pixels, top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        self.pixels.chunks(self.width())
    }

    /// number of lit pixels
    pub fn lit(&self) -> usize {
        self.pixels.iter().filter(|p| **p).count()
    }

    /// XOR an 8 pixel wide sprite on; true if any lit pixel was turned off
    pub fn draw_sprite(&mut self, x: u8, y: u8, rows: &[u8]) -> bool {
        self.blit(x, y, 8, rows.iter().map(|row| *row as u16))
    }

    /// XOR a 16 pixel wide sprite on (DXY0); true on collision
    pub fn draw_wide_sprite(&mut self, x: u8, y: u8, rows: &[u16]) -> bool {
        self.blit(x, y, 16, rows.iter().copied())
    }

    fn blit(&mut self, x: u8, y: u8, width: usize, rows: impl Iterator<Item = u16>) -> bool {
        let w = self.width();
        let h = self.height();
        let x0 = x as usize % w;
        let y0 = y as usize % h;
        let mut collision = false;
        for (row, bits) in rows.enumerate() {
            let py = y0 + row;
            if py >= h {
                break;
            }
            for col in 0..width {
                let px = x0 + col;
                if px >= w {
                    break;
                }
                if (bits >> (width - 1 - col)) & 1 == 0 {
                    continue;
                }
                let cell = &mut self.pixels[py * w + px];
                collision |= *cell;
                *cell = !*cell;
            }
        }
        collision
    }

    /// move everything down n rows (00CN)
    pub fn scroll_down(&mut self, n: usize) {
        let w = self.width();
        let len = self.pixels.len();
        let shift = (n * w).min(len);
        self.pixels.copy_within(..len - shift, shift);
        self.pixels[..shift].fill(false);
    }

    /// move everything up n rows (00DN)
    pub fn scroll_up(&mut self, n: usize) {
        let w = self.width();
        let len = self.pixels.len();
        let shift = (n * w).min(len);
        self.pixels.copy_within(shift.., 0);
        self.pixels[len - shift..].fill(false);
    }

    /// move everything 4 pixels right (00FB)
    pub fn scroll_right(&mut self) {
        let w = self.width();
        for row in self.pixels.chunks_mut(w) {
            row.copy_within(..w - HSCROLL_PIXELS, HSCROLL_PIXELS);
            row[..HSCROLL_PIXELS].fill(false);
        }
    }

    /// move everything 4 pixels left (00FC)
    pub fn scroll_left(&mut self) {
        let w = self.width();
        for row in self.pixels.chunks_mut(w) {
            row.copy_within(HSCROLL_PIXELS.., 0);
            row[w - HSCROLL_PIXELS..].fill(false);
        }
    }
}
