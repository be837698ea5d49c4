//! NES hardware constants

// Main bus
// --------
//
// Main address space for the NES. CPU, RAM and registers are mapped to this
// space.
//
// Cartridges PRG ROM and RAM are mapped to this space

// Memory - 2kB RAM mirrored 3 times (used by the CPU)
pub const RAM_START: u16 = 0x0000;
pub const RAM_END: u16 = 0x1FFF;
pub const RAM_SIZE: u16 = RAM_END - RAM_START + 1;
pub const RAM_MIRRORS: u16 = 3;
pub const RAM_CHIP_SIZE: usize = (RAM_SIZE / (RAM_MIRRORS + 1)) as usize;

// PPU registers - 8 registers mirrored 1023 times
pub const PPU_REGISTERS_START: u16 = 0x2000;
pub const PPU_REGISTERS_END: u16 = 0x3FFF;

pub const PPUCTRL: u16 = 0x2000;
pub const PPUMASK: u16 = 0x2001;
pub const PPUSTATUS: u16 = 0x2002;
pub const OAMADDR: u16 = 0x2003;
pub const OAMDATA: u16 = 0x2004;
pub const PPUSCROLL: u16 = 0x2005;
pub const PPUADDR: u16 = 0x2006;
pub const PPUDATA: u16 = 0x2007;

// APU and I/O registers
pub const APU_REGISTERS_START: u16 = 0x4000;
pub const APU_REGISTERS_END: u16 = 0x4013;
pub const APU_STATUS: u16 = 0x4015;

// DMA
pub const OAM_DMA: u16 = 0x4014;

// Controllers
pub const CONTROLLER_PORT_1: u16 = 0x4016;
pub const CONTROLLER_PORT_2: u16 = 0x4017;

// Cartridge PRG ROM and RAM space
pub const CARTRIDGE_RAM_START: u16 = 0x6000;
pub const CARTRIDGE_RAM_END: u16 = 0x7FFF;

pub const CARTRIDGE_ROM_START: u16 = 0x8000;
pub const CARTRIDGE_ROM_END: u16 = 0xFFFF;

// Interrupt vectors
pub const NMI_VECTOR: u16 = 0xFFFA;
pub const RESET_VECTOR: u16 = 0xFFFC;
pub const IRQ_VECTOR: u16 = 0xFFFE;

// Stack lives in page one
pub const STACK_BASE: u16 = 0x0100;

// Graphics bus
// ------------
//
// Address space for the PPU and graphics. It's a 14-bit address space
// completely separated from the main bus (used by the CPU).
//
// Cartridges CHR ROM and RAM are usually mapped to this space

// Pattern tables - area of memory that defines the shapes of tiles that make up
// backgrounds and sprites. It's data is also known as CHR (from "character")
// and is attached from the cartridges
pub const PATTERN_TABLES_START: u16 = 0x0000;
pub const PATTERN_TABLES_END: u16 = 0x1FFF;
pub const PATTERN_TABLE_SIZE: usize = 0x1000;

// Nametables - also known as VRAM. Two 1 kB nametables mirrored over a 4
// screen logical space
pub const NAMETABLES_START: u16 = 0x2000;
pub const NAMETABLES_END: u16 = 0x3EFF;
pub const NAMETABLE_SIZE: usize = 0x0400;

// Palettes - 32-byte memory storing which colors should be displayed on the
// screen when sprites and background are combined
pub const PALETTE_MEMORY_START: u16 = 0x3F00;
pub const PALETTE_MEMORY_END: u16 = 0x3FFF;
pub const PALETTE_MEMORY_SIZE: usize = 0x20;

pub const PPU_ADDRESS_MASK: u16 = 0x3FFF;

// Object Attribute Memory - 64 sprites of 4 bytes each
pub const OAM_SPRITES: usize = 64;
pub const OAM_SIZE: usize = OAM_SPRITES * 4;
pub const SPRITES_PER_SCANLINE: usize = 8;

// Timing
// ------

pub const DOTS_PER_SCANLINE: i16 = 341;
pub const PRE_RENDER_SCANLINE: i16 = -1;
pub const VISIBLE_SCANLINES: i16 = 240;
pub const VERTICAL_BLANK_SCANLINE: i16 = 241;
pub const LAST_SCANLINE: i16 = 260;
pub const SCANLINES_PER_FRAME: i16 = LAST_SCANLINE - PRE_RENDER_SCANLINE + 1;

/// PPU clock frequency of an NTSC console
pub const PPU_CLOCK_HZ: f64 = 5_369_318.0;

// Screen
// ------

pub const SCREEN_HEIGHT: usize = 240;
pub const SCREEN_WIDTH: usize = 256;
