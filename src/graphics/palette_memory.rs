use crate::hardware::PALETTE_MEMORY_SIZE;
use crate::interfaces::Memory;
use crate::processor::memory::Ram;

/// 32 bytes of palette RAM: four background palettes followed by four
/// sprite palettes of four colors each.
///
/// Entry 0 of every sprite palette ($3F10/$3F14/$3F18/$3F1C) is wired to the
/// same cell as the matching background entry, so they alias each other.
#[derive(Clone)]
pub struct PaletteMemory {
    memory: Ram,
}

impl PaletteMemory {
    pub fn new() -> Self {
        Self {
            memory: Ram::new(PALETTE_MEMORY_SIZE),
        }
    }

    fn physical(address: u16) -> u16 {
        match address & 0x1F {
            0x10 => 0x00,
            0x14 => 0x04,
            0x18 => 0x08,
            0x1C => 0x0C,
            address => address,
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        self.memory.as_slice()
    }

    pub fn load(&mut self, data: &[u8]) {
        self.memory.load(0, data);
    }
}

impl Default for PaletteMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl Memory for PaletteMemory {
    fn read(&self, address: u16) -> u8 {
        self.memory.read(Self::physical(address))
    }

    fn write(&mut self, address: u16, data: u8) {
        // Palette cells are 6 bits wide
        self.memory.write(Self::physical(address), data & 0x3F);
    }

    fn size(&self) -> usize {
        PALETTE_MEMORY_SIZE
    }
}
