use crate::utils::BitGroup;

/// [`RenderAddress`] represents the loopy registers `v` and `t` (from NES
/// wiki), a VRAM address maintained internally by the PPU while rendering.
///
/// It's a 15-bit address used for both reading and writing PPU memory through
/// PPUDATA ($2007) register. While rendering, its groups describe the
/// scroll position: which tile of which nametable and which row inside the
/// tile is being drawn.
///
/// ```text
/// yyy NN YYYYY XXXXX
/// ||| || ||||| +++++-- coarse X scroll
/// ||| || +++++-------- coarse Y scroll
/// ||| ++-------------- nametable select
/// +++----------------- fine Y scroll
/// ```
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderAddress {
    value: BitGroup<u16>,
}

impl RenderAddress {
    pub const FINE_Y_SCROLL: u16 = 0b0111_0000_0000_0000;
    pub const NAMETABLES_SELECT: u16 = 0b0000_1100_0000_0000;
    pub const VERTICAL_NAMETABLE: u16 = 0b0000_1000_0000_0000;
    pub const HORIZONTAL_NAMETABLE: u16 = 0b0000_0100_0000_0000;
    pub const COARSE_Y_SCROLL: u16 = 0b0000_0011_1110_0000;
    pub const COARSE_X_SCROLL: u16 = 0b0000_0000_0001_1111;

    const HORIZONTAL_BITS: u16 = Self::HORIZONTAL_NAMETABLE | Self::COARSE_X_SCROLL;
    const VERTICAL_BITS: u16 =
        Self::FINE_Y_SCROLL | Self::VERTICAL_NAMETABLE | Self::COARSE_Y_SCROLL;
    const ADDRESS_MASK: u16 = 0x7FFF;

    pub fn value(&self) -> u16 {
        self.value.into()
    }

    pub fn get(&self, group: u16) -> u16 {
        self.value.get(group)
    }

    pub fn set(&mut self, group: u16, value: u8) {
        self.value.set(group, value.into());
    }

    /// First PPUADDR write: bits 8-13. Bit 14 is cleared
    pub fn set_high_byte(&mut self, data: u8) {
        self.value.set(0x7F00, (data & 0x3F).into());
    }

    /// Second PPUADDR write: bits 0-7
    pub fn set_low_byte(&mut self, data: u8) {
        self.value.set(0x00FF, data.into());
    }

    /// PPUDATA access increment, wrapping inside 15 bits
    pub fn increment(&mut self, amount: u16) {
        let value = self.value().wrapping_add(amount) & Self::ADDRESS_MASK;
        self.value = BitGroup::new(value);
    }

    pub fn increment_x(&mut self) {
        if self.get(Self::COARSE_X_SCROLL) == 31 {
            self.set(Self::COARSE_X_SCROLL, 0);
            self.value.toggle(Self::HORIZONTAL_NAMETABLE);
        } else {
            self.value.overflowing_add(Self::COARSE_X_SCROLL, 1);
        }
    }

    pub fn increment_y(&mut self) {
        let fine_y = self.get(Self::FINE_Y_SCROLL);
        if fine_y != 7 {
            self.value.overflowing_add(Self::FINE_Y_SCROLL, 1);
        } else {
            self.set(Self::FINE_Y_SCROLL, 0);

            let coarse_y = self.get(Self::COARSE_Y_SCROLL);
            if coarse_y == 29 {
                self.set(Self::COARSE_Y_SCROLL, 0);
                self.value.toggle(Self::VERTICAL_NAMETABLE);
            } else if coarse_y == 31 {
                // Rows 30 and 31 hold attributes. Scrolling into them wraps
                // without switching nametable
                self.set(Self::COARSE_Y_SCROLL, 0);
            } else {
                self.value.overflowing_add(Self::COARSE_Y_SCROLL, 1);
            }
        }
    }

    /// Reload the horizontal position from `other` (dot 257)
    pub fn copy_horizontal(&mut self, other: RenderAddress) {
        self.copy_bits(other, Self::HORIZONTAL_BITS);
    }

    /// Reload the vertical position from `other` (pre-render dots 280-304)
    pub fn copy_vertical(&mut self, other: RenderAddress) {
        self.copy_bits(other, Self::VERTICAL_BITS);
    }

    fn copy_bits(&mut self, other: RenderAddress, mask: u16) {
        let value = (self.value() & !mask) | (other.value() & mask);
        self.value = BitGroup::new(value);
    }

    /// Nametable byte of the tile under the scroll position
    pub fn tile_address(&self) -> u16 {
        0x2000 | (self.value() & 0x0FFF)
    }

    /// Attribute byte covering the tile under the scroll position
    pub fn attribute_address(&self) -> u16 {
        let value = self.value();
        0x23C0 | (value & 0x0C00) | ((value >> 4) & 0x38) | ((value >> 2) & 0x07)
    }

    /// Shift selecting the 2-bit palette of this tile's 16x16 quadrant inside
    /// the attribute byte
    pub fn attribute_shift(&self) -> u8 {
        let coarse_x = self.get(Self::COARSE_X_SCROLL) as u8;
        let coarse_y = self.get(Self::COARSE_Y_SCROLL) as u8;
        ((coarse_y & 0x02) << 1) | (coarse_x & 0x02)
    }
}

impl From<RenderAddress> for u16 {
    fn from(value: RenderAddress) -> Self {
        value.value.into()
    }
}

impl From<u16> for RenderAddress {
    fn from(value: u16) -> Self {
        Self {
            value: BitGroup::new(value & Self::ADDRESS_MASK),
        }
    }
}
