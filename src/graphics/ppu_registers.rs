//! PPU registers
//!
//! This module provides a better way to manage PPU register bits and bit
//! groups

use bitflags::bitflags;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PpuRegisters {
    pub ctrl: PpuCtrl,
    pub mask: PpuMask,
    pub status: PpuStatus,
    pub oam_addr: u8,

    /// PPUDATA reads are delayed one access behind through this buffer
    pub data_buffer: u8,

    /// Shared first/second write latch of PPUSCROLL and PPUADDR (`w`)
    pub write_toggle: bool,

    /// Fine X scroll (`x`), 3 bits
    pub fine_x: u8,

    /// Last value driven on the PPU data bus. Unused status bits return it
    pub open_bus: u8,
}

impl Default for PpuRegisters {
    fn default() -> Self {
        Self {
            ctrl: PpuCtrl::empty(),
            mask: PpuMask::empty(),
            status: PpuStatus::empty(),
            oam_addr: 0,
            data_buffer: 0,
            write_toggle: false,
            fine_x: 0,
            open_bus: 0,
        }
    }
}

impl PpuRegisters {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    // PPUCTRL

    #[inline]
    pub fn nmi_enabled(&self) -> bool {
        self.ctrl.contains(PpuCtrl::NMI_ENABLE)
    }

    #[inline]
    pub fn sprite_height(&self) -> u8 {
        if self.ctrl.contains(PpuCtrl::SPRITE_SIZE) {
            16
        } else {
            8
        }
    }

    #[inline]
    pub fn background_pattern_table(&self) -> u8 {
        self.ctrl.contains(PpuCtrl::BACKGROUND_PATTERN_TABLE) as u8
    }

    #[inline]
    pub fn sprite_pattern_table(&self) -> u8 {
        self.ctrl.contains(PpuCtrl::SPRITE_PATTERN_TABLE) as u8
    }

    #[inline]
    pub fn base_nametable(&self) -> u8 {
        self.ctrl.intersection(PpuCtrl::BASE_NAMETABLE_ADDRESS).bits()
    }

    #[inline]
    pub fn vram_address_increment(&self) -> u16 {
        match self.ctrl.contains(PpuCtrl::VRAM_ADDRESS_INCREMENT) {
            false => 1, // going across
            true => 32, // going down
        }
    }

    // PPUMASK

    #[inline]
    pub fn rendering_enabled(&self) -> bool {
        self.background_rendering_enabled() || self.sprite_rendering_enabled()
    }

    #[inline]
    pub fn background_rendering_enabled(&self) -> bool {
        self.mask.contains(PpuMask::BACKGROUND_RENDERING_ENABLE)
    }

    #[inline]
    pub fn sprite_rendering_enabled(&self) -> bool {
        self.mask.contains(PpuMask::SPRITE_RENDERING_ENABLE)
    }

    /// Background hidden at screen column `x` (left edge clipping)
    #[inline]
    pub fn background_clipped(&self, x: usize) -> bool {
        x < 8 && !self.mask.contains(PpuMask::SHOW_BACKGROUND_IN_LEFTMOST_8_PIXELS)
    }

    /// Sprites hidden at screen column `x` (left edge clipping)
    #[inline]
    pub fn sprites_clipped(&self, x: usize) -> bool {
        x < 8 && !self.mask.contains(PpuMask::SHOW_SPRITES_IN_LEFTMOST_8_PIXELS)
    }

    #[inline]
    pub fn grayscale(&self) -> bool {
        self.mask.contains(PpuMask::GRAYSCALE)
    }

    // PPUSTATUS

    #[inline]
    pub fn vertical_blank(&self) -> bool {
        self.status.contains(PpuStatus::VERTICAL_BLANK)
    }

    /// PPUSTATUS value as seen by the CPU: three status bits plus stale open
    /// bus data in the low five bits
    #[inline]
    pub fn status_value(&self) -> u8 {
        self.status.bits() | (self.open_bus & 0x1F)
    }

    /// Registers packed for save states
    pub fn to_bytes(&self) -> [u8; 8] {
        [
            self.ctrl.bits(),
            self.mask.bits(),
            self.status.bits(),
            self.oam_addr,
            self.data_buffer,
            self.write_toggle as u8,
            self.fine_x,
            self.open_bus,
        ]
    }

    pub fn from_bytes(bytes: [u8; 8]) -> Self {
        Self {
            ctrl: PpuCtrl::from_bits_truncate(bytes[0]),
            mask: PpuMask::from_bits_truncate(bytes[1]),
            status: PpuStatus::from_bits_truncate(bytes[2]),
            oam_addr: bytes[3],
            data_buffer: bytes[4],
            write_toggle: bytes[5] != 0,
            fine_x: bytes[6] & 0x07,
            open_bus: bytes[7],
        }
    }
}

bitflags! {
    pub struct PpuCtrl: u8 {
        /// Generate an NMI at the start of the vertical blanking interval
        const NMI_ENABLE = 0b1000_0000;

        /// PPU master/slave select. Unused on a stock console
        const MASTER_SLAVE = 0b0100_0000;

        /// 0: 8x8 pixels; 1: 8x16 pixels
        const SPRITE_SIZE = 0b0010_0000;

        /// Background pattern table address (0 = $0000; 1 = $1000)
        const BACKGROUND_PATTERN_TABLE = 0b0001_0000;

        /// Sprite pattern table address for 8x8 sprites (0: $0000; 1: $1000;
        /// ignored in 8x16 mode)
        const SPRITE_PATTERN_TABLE = 0b0000_1000;

        /// VRAM address increment per CPU read/write of PPUDATA (0: add 1,
        /// going across; 1: add 32, going down)
        const VRAM_ADDRESS_INCREMENT = 0b0000_0100;

        /// Base nametable address (0 = $2000; 1 = $2400; 2 = $2800; 3 = $2C00)
        const BASE_NAMETABLE_ADDRESS = 0b0000_0011;
    }
}

bitflags! {
    pub struct PpuMask: u8 {
        const GRAYSCALE = 0b0000_0001;

        const SHOW_BACKGROUND_IN_LEFTMOST_8_PIXELS = 0b0000_0010;

        const SHOW_SPRITES_IN_LEFTMOST_8_PIXELS = 0b0000_0100;

        const BACKGROUND_RENDERING_ENABLE = 0b0000_1000;

        const SPRITE_RENDERING_ENABLE = 0b0001_0000;

        const EMPHASIZE_RED = 0b0010_0000;
        const EMPHASIZE_GREEN = 0b0100_0000;
        const EMPHASIZE_BLUE = 0b1000_0000;
    }
}

bitflags! {
    pub struct PpuStatus: u8 {
        /// PPU is in vertical blank (VBL) status
        const VERTICAL_BLANK = 0b1000_0000;

        const SPRITE_0_HIT = 0b0100_0000;

        /// Sprite overflow is active whenever more than 8 sprites appear on a
        /// scanline. The real NES had a hardware bug that generate false
        /// positives and negatives, not emulated
        const SPRITE_OVERFLOW = 0b0010_0000;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ctrl_accessors() {
        let mut registers = PpuRegisters::default();
        registers.ctrl = PpuCtrl::from_bits_truncate(0b1011_1110);

        assert!(registers.nmi_enabled());
        assert_eq!(registers.sprite_height(), 16);
        assert_eq!(registers.background_pattern_table(), 1);
        assert_eq!(registers.sprite_pattern_table(), 1);
        assert_eq!(registers.vram_address_increment(), 32);
        assert_eq!(registers.base_nametable(), 2);
    }

    #[test]
    fn test_left_edge_clipping() {
        let mut registers = PpuRegisters::default();
        registers.mask = PpuMask::BACKGROUND_RENDERING_ENABLE | PpuMask::SHOW_SPRITES_IN_LEFTMOST_8_PIXELS;

        assert!(registers.background_clipped(7));
        assert!(!registers.background_clipped(8));
        assert!(!registers.sprites_clipped(0));
    }

    #[test]
    fn test_status_value_carries_open_bus() {
        let mut registers = PpuRegisters::default();
        registers.status = PpuStatus::VERTICAL_BLANK;
        registers.open_bus = 0xFF;
        assert_eq!(registers.status_value(), 0x9F);
    }

    #[test]
    fn test_bytes_round_trip() {
        let mut registers = PpuRegisters::default();
        registers.ctrl = PpuCtrl::NMI_ENABLE;
        registers.fine_x = 5;
        registers.write_toggle = true;
        assert_eq!(PpuRegisters::from_bytes(registers.to_bytes()), registers);
    }
}
