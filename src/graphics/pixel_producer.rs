//! PPU hardware to produce pixel data, mixing background and sprites
//!
//! Refer to https://www.nesdev.org/wiki/PPU_rendering for more information
//! about this module

use crate::hardware::SPRITES_PER_SCANLINE;
use crate::utils;

use super::oam::OamSprite;

/// PPU's internal set of shift registers and multiplexers responsible of
/// producing pixel data.
///
/// In consists in shifters for background tile pattern and attributes as well
/// as sprite information.
///
/// Priority multiplexers decide how to combine all data to produce the correct
/// pixel.
///
#[derive(Clone, Default)]
pub struct PixelProducer {
    // Background
    pub buffers: Buffers,
    pub shifters: Shifters,

    // Sprites
    /// Up to 8 sprites used for a single scanline
    sprites: Vec<SpriteUnit>,
    /// `sprites[0]` is OAM sprite 0
    sprite_zero_in_line: bool,
}

/// Internal PPU latches that store the next tile while the current one is
/// being drawn
#[derive(Clone, Copy, Default)]
pub struct Buffers {
    pub next_tile_number: u8,
    pub next_attributes: u8,
    pub next_bit_plane_low: u8,
    pub next_bit_plane_high: u8,
}

/// Internal PPU shift registers responsible of producing pixel data.
///
/// Shifters are 16-bit wide, the high 8 bits are used in the current pixels
/// being drawn while the low 8 bits will be used for the next tile
#[derive(Clone, Copy, Default)]
pub struct Shifters {
    pub attributes: (u16, u16),
    pub tile_pattern: (u16, u16),
}

/// A sprite loaded for the current scanline: its X countdown and one row of
/// pattern data, already flipped
#[derive(Clone, Copy, Debug)]
struct SpriteUnit {
    x: u8,
    pattern_low: u8,
    pattern_high: u8,
    attributes: OamSprite,
}

/// A 2-bit pixel (0 is transparent) and the palette it uses
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LayerPixel {
    pub pixel: u8,
    pub palette: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpritePixel {
    pub pixel: u8,
    pub palette: u8,
    pub behind_background: bool,
    pub sprite_zero: bool,
}

/// Result of the priority multiplexer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Composite {
    /// Offset into palette memory ($3F00 relative)
    pub palette_offset: u8,
    /// Opaque sprite 0 pixel over an opaque background pixel
    pub sprite_zero_hit: bool,
}

impl PixelProducer {
    pub fn new() -> Self {
        Self::default()
    }

    // Load shift registers from internal latches (buffers) so next 8 pixels can
    // be drawn by the PPU in the next clock cycles
    pub fn load_shifters(&mut self) {
        self.shifters.tile_pattern.0 =
            (self.shifters.tile_pattern.0 & 0xFF00) | (self.buffers.next_bit_plane_low as u16);
        self.shifters.tile_pattern.1 =
            (self.shifters.tile_pattern.1 & 0xFF00) | (self.buffers.next_bit_plane_high as u16);

        // Attributes are the same for the whole tile, extend them to 8 bits
        let attributes_0 = if utils::bv(self.buffers.next_attributes, 0) == 0 {
            0
        } else {
            0xFF
        };
        self.shifters.attributes.0 = (self.shifters.attributes.0 & 0xFF00) | attributes_0;

        let attributes_1 = if utils::bv(self.buffers.next_attributes, 1) == 0 {
            0
        } else {
            0xFF
        };
        self.shifters.attributes.1 = (self.shifters.attributes.1 & 0xFF00) | attributes_1;
    }

    pub fn update_background_shifters(&mut self) {
        self.shifters.tile_pattern.0 <<= 1;
        self.shifters.tile_pattern.1 <<= 1;
        self.shifters.attributes.0 <<= 1;
        self.shifters.attributes.1 <<= 1;
    }

    /// Sprites count down their X position and, once reached, shift one
    /// pattern bit out per dot
    pub fn update_sprite_shifters(&mut self) {
        for sprite in self.sprites.iter_mut() {
            if sprite.x > 0 {
                sprite.x -= 1;
            } else {
                sprite.pattern_low <<= 1;
                sprite.pattern_high <<= 1;
            }
        }
    }

    /// Replace the sprites drawn in the next scanline. `rows` are the
    /// (low, high) pattern bytes of each sprite row, in the same order as
    /// `sprites`
    pub fn load_sprites(&mut self, sprites: &[OamSprite], rows: &[(u8, u8)], sprite_zero: bool) {
        self.sprites.clear();
        for (sprite, (low, high)) in sprites.iter().zip(rows).take(SPRITES_PER_SCANLINE) {
            let (pattern_low, pattern_high) = if sprite.flip_horizontally() {
                (utils::flip_byte(*low), utils::flip_byte(*high))
            } else {
                (*low, *high)
            };

            self.sprites.push(SpriteUnit {
                x: sprite.x,
                pattern_low,
                pattern_high,
                attributes: *sprite,
            });
        }
        self.sprite_zero_in_line = sprite_zero;
    }

    pub fn clear_sprites(&mut self) {
        self.sprites.clear();
        self.sprite_zero_in_line = false;
    }

    /// Background pixel under the current dot, `fine_x` pixels into the
    /// shifters
    pub fn background_pixel(&self, fine_x: u8) -> LayerPixel {
        let fine_x_bit = 15 - (fine_x & 0x07);

        let pixel = {
            let bit_plane_lo = utils::bv_16(self.shifters.tile_pattern.0, fine_x_bit);
            let bit_plane_hi = utils::bv_16(self.shifters.tile_pattern.1, fine_x_bit);
            (bit_plane_hi << 1) | bit_plane_lo
        };
        let palette = {
            let palette_lo = utils::bv_16(self.shifters.attributes.0, fine_x_bit);
            let palette_hi = utils::bv_16(self.shifters.attributes.1, fine_x_bit);
            (palette_hi << 1) | palette_lo
        };

        LayerPixel { pixel, palette }
    }

    /// First opaque pixel among the active sprites. Lower OAM index wins
    pub fn sprite_pixel(&self) -> Option<SpritePixel> {
        self.sprites
            .iter()
            .enumerate()
            .filter(|(_, sprite)| sprite.x == 0)
            .find_map(|(index, sprite)| {
                let pixel = (utils::bv(sprite.pattern_high, 7) << 1) | utils::bv(sprite.pattern_low, 7);
                if pixel == 0 {
                    return None;
                }
                Some(SpritePixel {
                    pixel,
                    palette: sprite.attributes.palette() + 4,
                    behind_background: sprite.attributes.behind_background(),
                    sprite_zero: index == 0 && self.sprite_zero_in_line,
                })
            })
    }

    /// Priority multiplexer:
    ///
    /// | background | sprite | result                       |
    /// |------------|--------|------------------------------|
    /// | 0          | 0      | backdrop ($3F00)             |
    /// | 0          | 1-3    | sprite                       |
    /// | 1-3        | 0      | background                   |
    /// | 1-3        | 1-3    | sprite priority bit decides  |
    pub fn multiplex(background: LayerPixel, sprite: Option<SpritePixel>) -> Composite {
        let background_offset = (background.palette << 2) | background.pixel;

        match sprite {
            None if background.pixel == 0 => Composite {
                palette_offset: 0,
                sprite_zero_hit: false,
            },
            None => Composite {
                palette_offset: background_offset,
                sprite_zero_hit: false,
            },
            Some(sprite) => {
                let sprite_offset = (sprite.palette << 2) | sprite.pixel;
                if background.pixel == 0 {
                    Composite {
                        palette_offset: sprite_offset,
                        sprite_zero_hit: false,
                    }
                } else {
                    Composite {
                        palette_offset: if sprite.behind_background {
                            background_offset
                        } else {
                            sprite_offset
                        },
                        sprite_zero_hit: sprite.sprite_zero,
                    }
                }
            }
        }
    }
}
