use crate::graphics::Pixel;

/// NTSC system palette, 64 colors indexed by the 6-bit values stored in
/// palette memory.
///
/// Palette taken from blargg's full palette demo:
/// https://www.nesdev.org/wiki/PPU_palettes
/// http://forums.nesdev.org/viewtopic.php?f=2&t=6484
#[rustfmt::skip]
const SYSTEM_PALETTE: [(u8, u8, u8); 64] = [
    // 0x00
    (84, 84, 84),    (0, 30, 116),    (8, 16, 144),    (48, 0, 136),
    (68, 0, 100),    (92, 0, 48),     (84, 4, 0),      (60, 24, 0),
    (32, 42, 0),     (8, 58, 0),      (0, 64, 0),      (0, 60, 0),
    (0, 50, 60),     (0, 0, 0),       (0, 0, 0),       (0, 0, 0),
    // 0x10
    (152, 150, 152), (8, 76, 196),    (48, 50, 236),   (92, 30, 228),
    (136, 20, 176),  (160, 20, 100),  (152, 34, 32),   (120, 60, 0),
    (84, 90, 0),     (40, 114, 0),    (8, 124, 0),     (0, 118, 40),
    (0, 102, 120),   (0, 0, 0),       (0, 0, 0),       (0, 0, 0),
    // 0x20
    (236, 238, 236), (76, 154, 236),  (120, 124, 236), (176, 98, 236),
    (228, 84, 236),  (236, 88, 180),  (236, 106, 100), (212, 136, 32),
    (160, 170, 0),   (116, 196, 0),   (76, 208, 32),   (56, 204, 108),
    (56, 180, 204),  (60, 60, 60),    (0, 0, 0),       (0, 0, 0),
    // 0x30
    (236, 238, 236), (168, 204, 236), (188, 188, 236), (212, 178, 236),
    (236, 174, 236), (236, 174, 212), (236, 180, 176), (228, 196, 144),
    (204, 210, 120), (180, 222, 120), (168, 226, 144), (152, 226, 180),
    (160, 214, 228), (160, 162, 160), (0, 0, 0),       (0, 0, 0),
];

impl From<u8> for Pixel {
    /// Convert a color to it's RGB representation using NTSC video
    /// encoding. Only the low 6 bits select the color
    fn from(color: u8) -> Self {
        let (red, green, blue) = SYSTEM_PALETTE[(color & 0x3F) as usize];
        Self::new(red, green, blue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_palette() {
        assert_eq!(Pixel::from(0x00), Pixel::new(84, 84, 84));
        assert_eq!(Pixel::from(0x0F), Pixel::BLACK);
        assert_eq!(Pixel::from(0x30), Pixel::new(236, 238, 236));
        // upper bits are ignored
        assert_eq!(Pixel::from(0x41), Pixel::from(0x01));
    }
}
