//! NES graphics hardware emulation

pub mod graphics_bus;
pub mod oam;
pub mod palette;
pub mod palette_memory;
pub mod pattern_table;
pub mod pixel_producer;
pub mod ppu;
pub mod ppu_registers;
pub mod render_address;

use crate::hardware::{SCREEN_HEIGHT, SCREEN_WIDTH};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Pixel {
    red: u8,
    green: u8,
    blue: u8,
}

impl Pixel {
    pub const BLACK: Pixel = Pixel::new(0, 0, 0);
    pub const WHITE: Pixel = Pixel::new(0xFF, 0xFF, 0xFF);

    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    pub fn red(&self) -> u8 {
        self.red
    }

    pub fn green(&self) -> u8 {
        self.green
    }

    pub fn blue(&self) -> u8 {
        self.blue
    }

    /// Pixel as RGBA bytes, always opaque
    pub fn rgba(&self) -> [u8; 4] {
        [self.red, self.green, self.blue, 0xFF]
    }
}

/// Representation of a pixel position in a Frame
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FramePixel {
    pub row: usize,
    pub col: usize,
}

/// An image produced by the PPU. Frames default to the NES screen size (see
/// hardware module), debug views use other sizes
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    width: usize,
    height: usize,
    pixels: Vec<Pixel>,
}

impl Frame {
    pub fn new(width: usize, height: usize, color: Pixel) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width * height],
        }
    }

    pub fn black() -> Self {
        Self::new(SCREEN_WIDTH, SCREEN_HEIGHT, Pixel::BLACK)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Out of frame positions are ignored
    pub fn set_pixel(&mut self, pixel: Pixel, position: FramePixel) {
        if position.row < self.height && position.col < self.width {
            self.pixels[position.row * self.width + position.col] = pixel;
        }
    }

    pub fn pixel(&self, position: FramePixel) -> Option<Pixel> {
        if position.row < self.height && position.col < self.width {
            Some(self.pixels[position.row * self.width + position.col])
        } else {
            None
        }
    }

    /// Rows of pixels, top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Pixel]> {
        self.pixels.chunks_exact(self.width)
    }

    /// Row-major RGBA bytes, ready to upload as a texture
    pub fn to_rgba(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|pixel| pixel.rgba()).collect()
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::black()
    }
}
