//! # framebuffer
//!
//! The 64x32 monochrome screen, one byte per pixel holding 0 or 1. Sprites
//! are 8 pixels wide and XORed on; a pixel that goes 1 -> 0 is a collision.
//! Drawing wraps around both edges of the screen.

pub const SCREEN_WIDTH: usize = 64;
pub const SCREEN_HEIGHT: usize = 32;
pub const PIXEL_COUNT: usize = SCREEN_WIDTH * SCREEN_HEIGHT;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    pixels: Box<[u8; PIXEL_COUNT]>,
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Framebuffer {
    pub fn new() -> Self {
        Framebuffer {
            pixels: Box::new([0; PIXEL_COUNT]),
        }
    }

    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    /// pixel at (x, y), wrapping both coordinates onto the screen
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.pixels[Self::index(x, y)]
    }

    pub fn set(&mut self, x: usize, y: usize, on: bool) {
        self.pixels[Self::index(x, y)] = on as u8;
    }

    /// row-major pixels, top left first
    pub fn pixels(&self) -> &[u8] {
        &self.pixels[..]
    }

    pub fn is_blank(&self) -> bool {
        self.pixels.iter().all(|p| *p == 0)
    }

    /// XOR an 8-wide sprite onto the screen with its top left at (x, y);
    /// one byte per row, msb leftmost. returns whether any lit pixel was
    /// switched off
    pub fn draw_sprite(&mut self, x: u8, y: u8, rows: &[u8]) -> bool {
        let mut erased = false;
        for (dy, row) in rows.iter().enumerate() {
            for dx in 0..8 {
                if row & (0x80 >> dx) == 0 {
                    continue;
                }
                let i = Self::index(x as usize + dx, y as usize + dy);
                erased |= self.pixels[i] == 1;
                self.pixels[i] ^= 1;
            }
        }
        erased
    }

    fn index(x: usize, y: usize) -> usize {
        (y % SCREEN_HEIGHT) * SCREEN_WIDTH + (x % SCREEN_WIDTH)
    }
}
