//! Object Attribute Memory (OAM)
//!
//! 256 bytes of sprite descriptions, 64 sprites of 4 bytes each: Y position,
//! tile index, attributes and X position. Before every scanline the PPU
//! looks for the sprites covering the next line and copies up to 8 of them
//! to a secondary buffer.

use crate::hardware::{OAM_SIZE, OAM_SPRITES, SPRITES_PER_SCANLINE};
use crate::interfaces::Memory;
use crate::processor::memory::Ram;
use crate::utils;

#[derive(Clone)]
pub struct Oam {
    memory: Ram,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct OamSprite {
    pub x: u8,
    pub y: u8,
    pub tile: u8,
    pub attributes: u8,
}

impl OamSprite {
    /// Sprite palettes are 4 to 7, only the low bits are stored
    pub fn palette(&self) -> u8 {
        self.attributes & 0b0000_0011
    }

    /// 0 -> front of background, 1 -> behind background
    pub fn behind_background(&self) -> bool {
        utils::bv(self.attributes, 5) > 0
    }

    pub fn flip_horizontally(&self) -> bool {
        utils::bv(self.attributes, 6) > 0
    }

    pub fn flip_vertically(&self) -> bool {
        utils::bv(self.attributes, 7) > 0
    }
}

/// Sprites found for a scanline
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpriteEvaluation {
    /// In OAM order, at most 8
    pub sprites: Vec<OamSprite>,
    /// Sprite 0 is `sprites[0]`
    pub sprite_zero: bool,
    /// More than 8 sprites cover the line
    pub overflow: bool,
}

impl Oam {
    pub fn new() -> Self {
        Self {
            memory: Ram::new(OAM_SIZE),
        }
    }

    pub fn read_sprite(&self, sprite: u8) -> OamSprite {
        let base_addr = ((sprite as usize % OAM_SPRITES) as u16) << 2;

        let y = self.memory.read(base_addr | 0b00);
        let tile = self.memory.read(base_addr | 0b01);
        let attributes = self.memory.read(base_addr | 0b10);
        let x = self.memory.read(base_addr | 0b11);

        OamSprite {
            y,
            tile,
            attributes,
            x,
        }
    }

    /// Find the sprites whose rows include `scanline`. A sprite at Y covers
    /// `height` rows starting at Y
    pub fn evaluate(&self, scanline: i16, height: u8) -> SpriteEvaluation {
        let mut evaluation = SpriteEvaluation::default();

        for index in 0..OAM_SPRITES as u8 {
            let sprite = self.read_sprite(index);
            let row = scanline - sprite.y as i16;
            if !(0..height as i16).contains(&row) {
                continue;
            }

            if evaluation.sprites.len() == SPRITES_PER_SCANLINE {
                evaluation.overflow = true;
                break;
            }

            if index == 0 {
                evaluation.sprite_zero = true;
            }
            evaluation.sprites.push(sprite);
        }

        evaluation
    }

    pub fn as_slice(&self) -> &[u8] {
        self.memory.as_slice()
    }

    pub fn load(&mut self, data: &[u8]) {
        self.memory.load(0, data);
    }
}

impl Default for Oam {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Oam {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for i in 0..OAM_SPRITES as u8 {
            let sprite = self.read_sprite(i);
            sprite.fmt(f)?;
            f.write_str("\n")?;
        }
        Ok(())
    }
}

impl Memory for Oam {
    fn read(&self, address: u16) -> u8 {
        self.memory.read(address)
    }

    fn write(&mut self, address: u16, data: u8) {
        self.memory.write(address, data);
    }

    fn size(&self) -> usize {
        self.memory.size()
    }
}
