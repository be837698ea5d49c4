/// PPU module
///
/// This module emulates the NES Picture Processing Unit (PPU)
///
/// NES PPU registers ($2000-$2007) are mirrored from $2008 to $3FFF. That's
/// because it's address is not completely decoded, that is, the chip ignores
/// one or more address lines. This allows a cheaper hardware (less address
/// lines) and a faster decoding at expense of unused address space.
///
/// The PPU walks a grid of 262 scanlines of 341 dots, one dot per clock:
///
/// - pre-render line (-1): clears the status flags and prefetches the first
///   tiles of the frame
/// - visible lines (0-239): one pixel per dot for dots 1-256 while the
///   tiles and sprites of what comes next are fetched
/// - post-render line (240): idle
/// - vertical blank (241-260): the CPU may safely access PPU memory
///
/// See https://www.nesdev.org/wiki/PPU_rendering
use log::trace;

use crate::cartridge::Cartridge;
use crate::graphics::graphics_bus::GraphicsBus;
use crate::graphics::oam::{Oam, SpriteEvaluation};
use crate::graphics::pattern_table::PatternTableAddress;
use crate::graphics::pixel_producer::{LayerPixel, PixelProducer};
use crate::graphics::ppu_registers::{PpuCtrl, PpuMask, PpuRegisters, PpuStatus};
use crate::graphics::render_address::RenderAddress;
use crate::graphics::{Frame, FramePixel, Pixel};
use crate::hardware::*;
use crate::interfaces::Memory;
use crate::utils;

/// Bytes taken by the PPU registers in a save state
pub const REGISTERS_STATE_SIZE: usize = 16;

const PATTERN_TABLE_IMAGE_SIZE: usize = 128;
const NAMETABLE_COLUMNS: u16 = 32;
const NAMETABLE_ROWS: u16 = 30;
const ATTRIBUTE_TABLE_OFFSET: u16 = 0x03C0;

pub struct Ppu {
    registers: PpuRegisters,

    /// Current VRAM address (`v`)
    vram_address: RenderAddress,
    /// Temporary VRAM address (`t`), top left onscreen tile
    temp_address: RenderAddress,

    memory: GraphicsBus,
    oam: Oam,
    producer: PixelProducer,

    /// Sprites found at dot 257 for the next scanline
    next_line: SpriteEvaluation,

    scanline: i16,
    dot: i16,
    frame_count: u64,

    frame: Frame,
    frame_complete: bool,
    nmi_pending: bool,
}

impl Ppu {
    pub fn new() -> Self {
        Self {
            registers: PpuRegisters::default(),
            vram_address: RenderAddress::default(),
            temp_address: RenderAddress::default(),
            memory: GraphicsBus::new(),
            oam: Oam::new(),
            producer: PixelProducer::new(),
            next_line: SpriteEvaluation::default(),
            scanline: PRE_RENDER_SCANLINE,
            dot: 0,
            frame_count: 0,
            frame: Frame::black(),
            frame_complete: false,
            nmi_pending: false,
        }
    }

    /// Back to the power up state. Memory contents survive
    pub fn reset(&mut self) {
        self.registers.reset();
        self.vram_address = RenderAddress::default();
        self.temp_address = RenderAddress::default();
        self.producer = PixelProducer::new();
        self.next_line = SpriteEvaluation::default();
        self.scanline = PRE_RENDER_SCANLINE;
        self.dot = 0;
        self.frame_complete = false;
        self.nmi_pending = false;
    }

    /// Advance the PPU one dot
    pub fn clock(&mut self, cartridge: &mut Cartridge) {
        if self.scanline < VISIBLE_SCANLINES {
            self.render_cycle(cartridge);
        }

        if self.scanline == VERTICAL_BLANK_SCANLINE && self.dot == 1 {
            self.registers.status.insert(PpuStatus::VERTICAL_BLANK);
            if self.registers.nmi_enabled() {
                self.nmi_pending = true;
            }
        }

        if (0..VISIBLE_SCANLINES).contains(&self.scanline) && (1..=256).contains(&self.dot) {
            self.draw_pixel();
        }

        self.advance();
    }

    /// Work done on the pre-render and visible scanlines
    fn render_cycle(&mut self, cartridge: &mut Cartridge) {
        if self.scanline == PRE_RENDER_SCANLINE && self.dot == 1 {
            self.registers.status.remove(
                PpuStatus::VERTICAL_BLANK | PpuStatus::SPRITE_0_HIT | PpuStatus::SPRITE_OVERFLOW,
            );
            self.producer.clear_sprites();
        }

        if !self.registers.rendering_enabled() {
            return;
        }

        // 321..=336 prefetch the first two tiles of the next line
        if (2..=257).contains(&self.dot) || (321..=337).contains(&self.dot) {
            self.producer.update_background_shifters();
            if self.dot <= 257 {
                self.producer.update_sprite_shifters();
            }
            self.fetch_background(cartridge);
        }

        match self.dot {
            256 => self.vram_address.increment_y(),
            257 => {
                self.producer.load_shifters();
                self.vram_address.copy_horizontal(self.temp_address);
                self.evaluate_sprites();
            }
            260 => cartridge.scanline(),
            280..=304 if self.scanline == PRE_RENDER_SCANLINE => {
                self.vram_address.copy_vertical(self.temp_address);
            }
            340 => self.fetch_sprites(cartridge),
            _ => {}
        }
    }

    /// 8-dot tile fetch cycle: nametable, attribute, pattern low, pattern
    /// high, two dots each
    fn fetch_background(&mut self, cartridge: &mut Cartridge) {
        match (self.dot - 1) % 8 {
            0 => {
                self.producer.load_shifters();
                self.producer.buffers.next_tile_number = self
                    .memory
                    .read(cartridge, self.vram_address.tile_address());
            }
            2 => {
                let attributes = self
                    .memory
                    .read(cartridge, self.vram_address.attribute_address());
                self.producer.buffers.next_attributes =
                    (attributes >> self.vram_address.attribute_shift()) & 0b11;
            }
            4 => {
                let address = self.background_pattern_address();
                self.producer.buffers.next_bit_plane_low = self.memory.read(cartridge, address.into());
            }
            6 => {
                let address = self.background_pattern_address().high_plane();
                self.producer.buffers.next_bit_plane_high =
                    self.memory.read(cartridge, address.into());
            }
            7 => self.vram_address.increment_x(),
            _ => {}
        }
    }

    fn background_pattern_address(&self) -> PatternTableAddress {
        PatternTableAddress::tile_row(
            self.registers.background_pattern_table(),
            self.producer.buffers.next_tile_number,
            self.vram_address.get(RenderAddress::FINE_Y_SCROLL) as u8,
        )
    }

    fn evaluate_sprites(&mut self) {
        if self.scanline < 0 {
            self.next_line = SpriteEvaluation::default();
            return;
        }

        let evaluation = self
            .oam
            .evaluate(self.scanline, self.registers.sprite_height());
        if evaluation.overflow {
            self.registers.status.insert(PpuStatus::SPRITE_OVERFLOW);
        }
        self.next_line = evaluation;
    }

    /// Load pattern rows of the sprites evaluated for the next scanline
    fn fetch_sprites(&mut self, cartridge: &mut Cartridge) {
        let evaluation = std::mem::take(&mut self.next_line);
        let height = self.registers.sprite_height();
        let sprite_table = self.registers.sprite_pattern_table();

        let rows: Vec<(u8, u8)> = evaluation
            .sprites
            .iter()
            .map(|sprite| {
                let mut row = (self.scanline - sprite.y as i16) as u8;
                if sprite.flip_vertically() {
                    row = height - 1 - row;
                }

                // 8x16 sprites take the pattern table from bit 0 of the tile
                // index and use two consecutive tiles
                let (table, tile) = if height == 16 {
                    (sprite.tile & 0x01, (sprite.tile & 0xFE) + (row >> 3))
                } else {
                    (sprite_table, sprite.tile)
                };

                let address = PatternTableAddress::tile_row(table, tile, row & 0x07);
                let low = self.memory.read(cartridge, address.into());
                let high = self.memory.read(cartridge, address.high_plane().into());
                (low, high)
            })
            .collect();

        self.producer
            .load_sprites(&evaluation.sprites, &rows, evaluation.sprite_zero);
    }

    fn draw_pixel(&mut self) {
        let x = (self.dot - 1) as usize;
        let y = self.scanline as usize;

        let background =
            if self.registers.background_rendering_enabled() && !self.registers.background_clipped(x) {
                self.producer.background_pixel(self.registers.fine_x)
            } else {
                LayerPixel::default()
            };

        let sprite =
            if self.registers.sprite_rendering_enabled() && !self.registers.sprites_clipped(x) {
                self.producer.sprite_pixel()
            } else {
                None
            };

        let composite = PixelProducer::multiplex(background, sprite);

        // No hit on the last column
        if composite.sprite_zero_hit && x != SCREEN_WIDTH - 1 {
            self.registers.status.insert(PpuStatus::SPRITE_0_HIT);
        }

        let color = Pixel::from(self.color(composite.palette_offset));
        self.frame.set_pixel(color, FramePixel { row: y, col: x });
    }

    fn advance(&mut self) {
        self.dot += 1;
        if self.dot >= DOTS_PER_SCANLINE {
            self.dot = 0;
            self.scanline += 1;

            if self.scanline > LAST_SCANLINE {
                self.scanline = PRE_RENDER_SCANLINE;
                self.frame_complete = true;
                self.frame_count += 1;
            }
        }
    }

    /// Palette memory entry at `offset`, grayscale applied
    fn color(&self, offset: u8) -> u8 {
        let color = self.memory.palette(offset);
        if self.registers.grayscale() {
            color & 0x30
        } else {
            color
        }
    }

    // Interrupts

    /// An NMI was raised and not delivered yet
    pub fn nmi_pending(&self) -> bool {
        self.nmi_pending
    }

    /// Consume the pending NMI
    pub fn take_nmi(&mut self) -> bool {
        std::mem::take(&mut self.nmi_pending)
    }

    // Frame output

    pub fn frame_complete(&self) -> bool {
        self.frame_complete
    }

    /// Consumers call this after copying the frame
    pub fn acknowledge_frame(&mut self) {
        self.frame_complete = false;
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn scanline(&self) -> i16 {
        self.scanline
    }

    pub fn dot(&self) -> i16 {
        self.dot
    }

    // CPU register ports

    /// CPU read of a PPU register ($2000-$3FFF, mirrored every 8 bytes)
    pub fn cpu_read(&mut self, cartridge: &mut Cartridge, address: u16) -> u8 {
        let data = match address & 0x0007 {
            2 => {
                let data = self.registers.status_value();
                self.registers.status.remove(PpuStatus::VERTICAL_BLANK);
                self.registers.write_toggle = false;
                data
            }
            4 => {
                let data = self.oam.read(self.registers.oam_addr as u16);
                self.registers.oam_addr = self.registers.oam_addr.wrapping_add(1);
                data
            }
            7 => self.read_data(cartridge),
            // write only registers
            _ => self.registers.open_bus,
        };

        trace!("PPU read ${address:04X} -> ${data:02X}");
        self.registers.open_bus = data;
        data
    }

    /// Side effect free variant of [`Ppu::cpu_read`]
    pub fn peek_register(&self, address: u16) -> u8 {
        match address & 0x0007 {
            2 => self.registers.status_value(),
            4 => self.oam.read(self.registers.oam_addr as u16),
            7 => {
                let address = self.vram_address.value() & PPU_ADDRESS_MASK;
                if address >= PALETTE_MEMORY_START {
                    self.color((address & 0x1F) as u8)
                } else {
                    self.registers.data_buffer
                }
            }
            _ => self.registers.open_bus,
        }
    }

    /// CPU write to a PPU register ($2000-$3FFF, mirrored every 8 bytes)
    pub fn cpu_write(&mut self, cartridge: &mut Cartridge, address: u16, data: u8) {
        trace!("PPU write ${address:04X} <- ${data:02X}");
        self.registers.open_bus = data;

        match address & 0x0007 {
            0 => {
                let nmi_was_enabled = self.registers.nmi_enabled();
                self.registers.ctrl = PpuCtrl::from_bits_truncate(data);
                self.temp_address
                    .set(RenderAddress::NAMETABLES_SELECT, self.registers.base_nametable());

                // Enabling NMI in the middle of vertical blank raises it
                // immediately
                if !nmi_was_enabled && self.registers.nmi_enabled() && self.registers.vertical_blank()
                {
                    self.nmi_pending = true;
                }
            }
            1 => self.registers.mask = PpuMask::from_bits_truncate(data),
            2 => {} // read only
            3 => self.registers.oam_addr = data,
            4 => {
                self.oam.write(self.registers.oam_addr as u16, data);
                self.registers.oam_addr = self.registers.oam_addr.wrapping_add(1);
            }
            5 => {
                if !self.registers.write_toggle {
                    self.registers.fine_x = data & 0x07;
                    self.temp_address
                        .set(RenderAddress::COARSE_X_SCROLL, data >> 3);
                } else {
                    self.temp_address
                        .set(RenderAddress::FINE_Y_SCROLL, data & 0x07);
                    self.temp_address
                        .set(RenderAddress::COARSE_Y_SCROLL, data >> 3);
                }
                self.registers.write_toggle = !self.registers.write_toggle;
            }
            6 => {
                if !self.registers.write_toggle {
                    self.temp_address.set_high_byte(data);
                } else {
                    self.temp_address.set_low_byte(data);
                    self.vram_address = self.temp_address;
                }
                self.registers.write_toggle = !self.registers.write_toggle;
            }
            _ => {
                let address = self.vram_address.value();
                self.memory.write(cartridge, address, data);
                self.vram_address
                    .increment(self.registers.vram_address_increment());
            }
        }
    }

    /// PPUDATA reads return the buffered value from the previous read, except
    /// for palettes which are returned right away. The buffer is filled with
    /// the nametable byte "under" the palette then
    fn read_data(&mut self, cartridge: &mut Cartridge) -> u8 {
        let address = self.vram_address.value() & PPU_ADDRESS_MASK;

        let data = if address >= PALETTE_MEMORY_START {
            self.registers.data_buffer = self.memory.read(cartridge, address - 0x1000);
            self.color((address & 0x1F) as u8)
        } else {
            let buffered = self.registers.data_buffer;
            self.registers.data_buffer = self.memory.read(cartridge, address);
            buffered
        };

        self.vram_address
            .increment(self.registers.vram_address_increment());
        data
    }

    // Memory access for debuggers, DMA and save states

    pub fn registers(&self) -> &PpuRegisters {
        &self.registers
    }

    pub fn oam(&self) -> &Oam {
        &self.oam
    }

    pub fn oam_mut(&mut self) -> &mut Oam {
        &mut self.oam
    }

    pub fn memory(&self) -> &GraphicsBus {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut GraphicsBus {
        &mut self.memory
    }

    /// Read PPU address space without side effects
    pub fn peek_vram(&self, cartridge: &Cartridge, address: u16) -> u8 {
        self.memory.peek(cartridge, address)
    }

    pub fn save_registers(&self) -> [u8; REGISTERS_STATE_SIZE] {
        let mut state = [0; REGISTERS_STATE_SIZE];
        state[0..8].copy_from_slice(&self.registers.to_bytes());
        state[8..10].copy_from_slice(&self.vram_address.value().to_le_bytes());
        state[10..12].copy_from_slice(&self.temp_address.value().to_le_bytes());
        state[12..14].copy_from_slice(&self.scanline.to_le_bytes());
        state[14..16].copy_from_slice(&self.dot.to_le_bytes());
        state
    }

    pub fn load_registers(&mut self, state: &[u8; REGISTERS_STATE_SIZE]) {
        let mut registers = [0; 8];
        registers.copy_from_slice(&state[0..8]);
        self.registers = PpuRegisters::from_bytes(registers);
        self.vram_address = RenderAddress::from(u16::from_le_bytes([state[8], state[9]]));
        self.temp_address = RenderAddress::from(u16::from_le_bytes([state[10], state[11]]));

        let scanline = i16::from_le_bytes([state[12], state[13]]);
        let dot = i16::from_le_bytes([state[14], state[15]]);
        self.scanline = scanline.clamp(PRE_RENDER_SCANLINE, LAST_SCANLINE);
        self.dot = dot.clamp(0, DOTS_PER_SCANLINE - 1);

        self.producer = PixelProducer::new();
        self.next_line = SpriteEvaluation::default();
        self.nmi_pending = false;
    }

    // Debug images

    /// Color of `pixel` (0-3) in `palette` (0-3 background, 4-7 sprites)
    pub fn palette_color(&self, palette: u8, pixel: u8) -> Pixel {
        Pixel::from(self.color(((palette & 0x07) << 2) | (pixel & 0x03)))
    }

    /// One of the two pattern tables as a 16x16 grid of tiles, drawn with
    /// `palette`
    pub fn pattern_table_image(&self, cartridge: &Cartridge, table: u8, palette: u8) -> Frame {
        let mut image = Frame::new(
            PATTERN_TABLE_IMAGE_SIZE,
            PATTERN_TABLE_IMAGE_SIZE,
            Pixel::BLACK,
        );

        for tile in 0..=u8::MAX {
            let origin = FramePixel {
                row: (tile / 16) as usize * 8,
                col: (tile % 16) as usize * 8,
            };
            self.draw_tile(cartridge, &mut image, table & 1, tile, palette, origin);
        }

        image
    }

    /// Full nametable (0-3) as it would be drawn with no scroll, using the
    /// current background pattern table
    pub fn nametable_image(&self, cartridge: &Cartridge, nametable: u8) -> Frame {
        let mut image = Frame::black();
        let base = NAMETABLES_START + (nametable as u16 & 0b11) * NAMETABLE_SIZE as u16;
        let table = self.registers.background_pattern_table();

        for tile_row in 0..NAMETABLE_ROWS {
            for tile_col in 0..NAMETABLE_COLUMNS {
                let tile = self
                    .memory
                    .peek(cartridge, base + tile_row * NAMETABLE_COLUMNS + tile_col);
                let attributes = self.memory.peek(
                    cartridge,
                    base + ATTRIBUTE_TABLE_OFFSET + (tile_row / 4) * 8 + tile_col / 4,
                );
                let shift = ((tile_row & 0x02) << 1) | (tile_col & 0x02);
                let palette = (attributes >> shift) & 0b11;

                let origin = FramePixel {
                    row: tile_row as usize * 8,
                    col: tile_col as usize * 8,
                };
                self.draw_tile(cartridge, &mut image, table, tile, palette, origin);
            }
        }

        image
    }

    fn draw_tile(
        &self,
        cartridge: &Cartridge,
        image: &mut Frame,
        table: u8,
        tile: u8,
        palette: u8,
        origin: FramePixel,
    ) {
        for row in 0..8u8 {
            let address = PatternTableAddress::tile_row(table, tile, row);
            let low = self.memory.peek(cartridge, address.into());
            let high = self.memory.peek(cartridge, address.high_plane().into());

            for col in 0..8u8 {
                let bit = 7 - col;
                let pixel = (utils::bv(high, bit) << 1) | utils::bv(low, bit);
                image.set_pixel(
                    self.palette_color(palette, pixel),
                    FramePixel {
                        row: origin.row + row as usize,
                        col: origin.col + col as usize,
                    },
                );
            }
        }
    }
}

impl Default for Ppu {
    fn default() -> Self {
        Self::new()
    }
}
