//! Graphics Bus
//!
//! 14-bit address space seen by the PPU. See
//! https://www.nesdev.org/wiki/PPU_memory_map for further reference
//!
//! | Range         | Device                                          |
//! |---------------|-------------------------------------------------|
//! | $0000-$1FFF   | pattern tables, cartridge CHR ROM or CHR RAM    |
//! | $2000-$2FFF   | nametables, 2 kB CIRAM mirrored by cartridge    |
//! | $3000-$3EFF   | mirror of $2000-$2EFF                           |
//! | $3F00-$3FFF   | palette memory, 32 bytes mirrored               |
//!
//! Pattern table accesses always go to the cartridge so CHR RAM follows the
//! mapper banks like CHR ROM does.

use crate::cartridge::Cartridge;
use crate::hardware::{
    NAMETABLES_END, NAMETABLES_START, NAMETABLE_SIZE, PALETTE_MEMORY_START, PATTERN_TABLES_END,
    PPU_ADDRESS_MASK,
};
use crate::interfaces::Memory;
use crate::mappers::Mirroring;
use crate::processor::memory::Ram;

use super::palette_memory::PaletteMemory;

#[derive(Clone)]
pub struct GraphicsBus {
    /// Console internal VRAM (CIRAM), two physical nametables
    nametables: Ram,
    palettes: PaletteMemory,
}

impl GraphicsBus {
    pub fn new() -> Self {
        Self {
            nametables: Ram::new(2 * NAMETABLE_SIZE),
            palettes: PaletteMemory::new(),
        }
    }

    /// Read as done by the PPU while rendering or through PPUDATA. Pattern
    /// fetches are visible to the mapper
    pub fn read(&self, cartridge: &mut Cartridge, address: u16) -> u8 {
        let address = address & PPU_ADDRESS_MASK;
        match address {
            0..=PATTERN_TABLES_END => cartridge.ppu_read(address).unwrap_or(0),
            _ => self.peek(cartridge, address),
        }
    }

    /// Side effect free read
    pub fn peek(&self, cartridge: &Cartridge, address: u16) -> u8 {
        let address = address & PPU_ADDRESS_MASK;
        match address {
            0..=PATTERN_TABLES_END => cartridge.ppu_peek(address).unwrap_or(0),
            NAMETABLES_START..=NAMETABLES_END => self
                .nametables
                .read(nametable_offset(cartridge.mirroring(), address)),
            _ => self.palettes.read(address - PALETTE_MEMORY_START),
        }
    }

    pub fn write(&mut self, cartridge: &mut Cartridge, address: u16, data: u8) {
        let address = address & PPU_ADDRESS_MASK;
        match address {
            0..=PATTERN_TABLES_END => {
                cartridge.ppu_write(address, data);
            }
            NAMETABLES_START..=NAMETABLES_END => {
                let offset = nametable_offset(cartridge.mirroring(), address);
                self.nametables.write(offset, data);
            }
            _ => self.palettes.write(address - PALETTE_MEMORY_START, data),
        }
    }

    /// Palette entry, `offset` relative to $3F00
    pub fn palette(&self, offset: u8) -> u8 {
        self.palettes.read(offset as u16)
    }

    pub fn nametables(&self) -> &[u8] {
        self.nametables.as_slice()
    }

    pub fn palettes(&self) -> &[u8] {
        self.palettes.as_slice()
    }

    /// Restore memory contents from a save state
    pub fn load(&mut self, nametables: &[u8], palettes: &[u8]) {
        self.nametables.load(0, nametables);
        self.palettes.load(palettes);
    }
}

impl Default for GraphicsBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Map a nametable address ($2000-$3EFF) to an offset inside the 2 kB CIRAM
fn nametable_offset(mirroring: Mirroring, address: u16) -> u16 {
    let address = (address - NAMETABLES_START) & 0x0FFF;
    let logical = address / NAMETABLE_SIZE as u16;
    let offset = address % NAMETABLE_SIZE as u16;

    let physical = match mirroring {
        // $2000 = $2800, $2400 = $2C00
        Mirroring::Vertical => logical & 0b01,
        // $2000 = $2400, $2800 = $2C00
        Mirroring::Horizontal => logical >> 1,
        Mirroring::OneScreenLow => 0,
        Mirroring::OneScreenHigh => 1,
    };

    physical * NAMETABLE_SIZE as u16 + offset
}
