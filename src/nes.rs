/// Nintendo Entertainment System (NES) abstraction.
///
/// This module defines the higher level abstractions to run the NES
/// emulator. It defines the video game console `Nes`, built around a
/// [`Cartridge`] inserted at construction. To use it, load a cartridge from
/// a ROM file, create the Nes and clock it: frame by frame for video
/// frontends or sample by sample for audio driven ones.
///
/// Clocks are counted in PPU dots. The CPU runs every third dot, and while
/// an OAM DMA transfer is active the DMA controller takes the CPU cycles.
/// Interrupts are delivered only between instructions.
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;

use crossbeam_channel::Receiver;
use log::{info, trace, warn};

use crate::audio::{AudioSource, SampleClock, Silence};
use crate::cartridge::Cartridge;
use crate::controller::Buttons;
use crate::errors::NesError;
use crate::graphics::ppu::Ppu;
use crate::graphics::{Frame, Pixel};
use crate::processor::bus::MainBus;
use crate::processor::cpu::Cpu;
use crate::processor::disassembler;
use crate::processor::internal_cpu::InternalCpu;
use crate::settings::NesSettings;
use crate::state;
use crate::types::ButtonsReceiver;

/// PPU dots per CPU cycle
const CPU_CLOCK_DIVIDER: u64 = 3;

pub struct Nes {
    cpu: Cpu,
    bus: MainBus,

    /// PPU clocks since power up
    system_clock: u64,
    /// CPU cycles since power up, DMA cycles included
    cpu_cycles: u64,

    sample_clock: SampleClock,

    settings: NesSettings,
    battery_timer: Option<Receiver<Instant>>,
    last_frame: u64,
}

impl Nes {
    pub fn new(cartridge: Cartridge, settings: NesSettings) -> Self {
        Self::with_audio(cartridge, settings, Box::new(Silence))
    }

    /// Load the cartridge at `path` and power the console on
    pub fn from_rom<P: AsRef<Path>>(path: P, settings: NesSettings) -> Result<Self, NesError> {
        let cartridge = Cartridge::new(path)?;
        Ok(Self::new(cartridge, settings))
    }

    pub fn with_audio(
        mut cartridge: Cartridge,
        settings: NesSettings,
        audio: Box<dyn AudioSource>,
    ) -> Self {
        let mut battery_timer = None;
        if let Some(directory) = &settings.save_directory {
            if let Err(error) = cartridge.load_battery(directory) {
                warn!("Starting without battery RAM: {error}");
            }
            if cartridge.has_battery() {
                battery_timer = Some(crossbeam_channel::tick(settings.battery_save_interval));
            }
        }

        let mut nes = Self {
            cpu: Cpu::new(),
            bus: MainBus::with_audio(cartridge, audio),
            system_clock: 0,
            cpu_cycles: 0,
            sample_clock: SampleClock::new(settings.sample_rate),
            settings,
            battery_timer,
            last_frame: 0,
        };
        nes.reset();
        nes
    }

    /// Press the reset button
    pub fn reset(&mut self) {
        info!("NES reset ({})", self.bus.cartridge());
        self.bus.reset();
        self.cpu.reset(&mut self.bus);
        self.system_clock = 0;
        self.cpu_cycles = 0;
        self.sample_clock.reset();
        self.last_frame = self.bus.ppu().frame_count();
    }

    /// Advance the system one PPU clock. Returns true when an audio sample
    /// boundary was crossed
    pub fn clock(&mut self) -> bool {
        self.bus.clock_ppu();

        if self.system_clock % CPU_CLOCK_DIVIDER == 0 {
            if self.bus.dma_active() {
                self.bus.clock_dma(self.cpu_cycles);
            } else {
                self.cpu.clock(&mut self.bus);
            }
            self.bus.clock_audio();
            self.cpu_cycles += 1;
        }

        self.deliver_interrupts();

        let frame = self.bus.ppu().frame_count();
        if frame != self.last_frame {
            self.last_frame = frame;
            self.poll_battery_timer();
        }

        self.system_clock += 1;
        self.sample_clock.tick()
    }

    fn deliver_interrupts(&mut self) {
        if self.bus.dma_active() || !self.cpu.complete() {
            return;
        }

        if self.bus.ppu_mut().take_nmi() {
            trace!("NMI at scanline {}", self.bus.ppu().scanline());
            self.cpu.nmi(&mut self.bus);
        } else if self.bus.cartridge().irq_pending() && self.cpu.irq(&mut self.bus) {
            trace!("IRQ at scanline {}", self.bus.ppu().scanline());
            self.bus.cartridge_mut().irq_acknowledge();
        }
    }

    /// Run until the CPU finishes the instruction in flight, or the next one
    /// if it's between instructions
    pub fn step(&mut self) {
        if self.cpu.halted() {
            return;
        }

        let start = self.cpu.total_cycles();
        while self.cpu.total_cycles() == start || !self.cpu.complete() {
            self.clock();
            if self.cpu.halted() {
                break;
            }
        }
    }

    /// Run until the PPU completes a frame
    pub fn run_frame(&mut self) -> &Frame {
        self.bus.ppu_mut().acknowledge_frame();
        while !self.bus.ppu().frame_complete() {
            self.clock();
        }
        self.bus.ppu().frame()
    }

    /// Run until the next audio sample is due and return it
    pub fn next_sample(&mut self) -> f32 {
        while !self.clock() {}
        self.bus.audio_sample()
    }

    // Battery RAM

    fn poll_battery_timer(&mut self) {
        let Some(timer) = &self.battery_timer else {
            return;
        };
        if timer.try_recv().is_ok() {
            if let Err(error) = self.save_battery() {
                warn!("{error}");
            }
        }
    }

    /// Persist battery RAM now, if the cartridge has a battery and a save
    /// directory is configured
    pub fn save_battery(&self) -> Result<(), NesError> {
        match &self.settings.save_directory {
            Some(directory) => self.bus.cartridge().save_battery(directory),
            None => Ok(()),
        }
    }

    /// Stop the console, saving battery RAM a last time
    pub fn shutdown(&mut self) -> Result<(), NesError> {
        info!("NES shutting down");
        self.battery_timer = None;
        self.save_battery()
    }

    // Save states

    pub fn save_state(&self) -> Vec<u8> {
        state::save_state(&self.cpu, &self.bus)
    }

    pub fn load_state(&mut self, state: &[u8]) -> Result<(), NesError> {
        state::load_state(&mut self.cpu, &mut self.bus, state)?;
        Ok(())
    }

    // Controllers

    /// Buttons currently pressed on pad `port` (0 or 1)
    pub fn set_buttons(&mut self, port: usize, buttons: Buttons) {
        match self.bus.controller_mut(port) {
            Some(controller) => controller.set_buttons(buttons),
            None => warn!("No controller port {port}"),
        }
    }

    /// Feed pad `port` from a frontend channel
    pub fn connect_controller(&mut self, port: usize, input: ButtonsReceiver) {
        match self.bus.controller_mut(port) {
            Some(controller) => controller.connect(input),
            None => warn!("No controller port {port}"),
        }
    }

    pub fn disconnect_controller(&mut self, port: usize) {
        if let Some(controller) = self.bus.controller_mut(port) {
            controller.disconnect();
        }
    }

    // Video

    pub fn frame(&self) -> &Frame {
        self.bus.ppu().frame()
    }

    pub fn frame_complete(&self) -> bool {
        self.bus.ppu().frame_complete()
    }

    pub fn acknowledge_frame(&mut self) {
        self.bus.ppu_mut().acknowledge_frame();
    }

    pub fn pattern_table_image(&self, table: u8, palette: u8) -> Frame {
        self.bus
            .ppu()
            .pattern_table_image(self.bus.cartridge(), table, palette)
    }

    pub fn nametable_image(&self, nametable: u8) -> Frame {
        self.bus
            .ppu()
            .nametable_image(self.bus.cartridge(), nametable)
    }

    pub fn palette_color(&self, palette: u8, pixel: u8) -> Pixel {
        self.bus.ppu().palette_color(palette, pixel)
    }

    // Inspection

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn cpu_registers(&self) -> InternalCpu {
        self.cpu.registers()
    }

    pub fn ppu(&self) -> &Ppu {
        self.bus.ppu()
    }

    pub fn bus(&self) -> &MainBus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut MainBus {
        &mut self.bus
    }

    pub fn cartridge(&self) -> &Cartridge {
        self.bus.cartridge()
    }

    pub fn settings(&self) -> &NesSettings {
        &self.settings
    }

    pub fn system_clock(&self) -> u64 {
        self.system_clock
    }

    pub fn cpu_cycles(&self) -> u64 {
        self.cpu_cycles
    }

    pub fn disassemble(&self, start: u16, end: u16) -> BTreeMap<u16, String> {
        disassembler::disassemble(&self.bus, start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::tests::ines_image;
    use crate::hardware::{NMI_VECTOR, RESET_VECTOR};
    use crate::interfaces::Bus;
    use crate::mappers::PRG_BANK_SIZE;

    const HEADER_SIZE: usize = 16;

    /// NROM-128 image with `program` at $8000, an NMI handler at $9000 and
    /// both vectors pointing at them
    fn nes_with(program: &[u8], nmi_handler: &[u8]) -> Nes {
        let mut image = ines_image(0, 1, 0, 0);
        let prg = &mut image[HEADER_SIZE..HEADER_SIZE + PRG_BANK_SIZE];
        prg[..program.len()].copy_from_slice(program);
        prg[0x1000..0x1000 + nmi_handler.len()].copy_from_slice(nmi_handler);

        let vector = |address: u16| (address as usize) & (PRG_BANK_SIZE - 1);
        prg[vector(RESET_VECTOR)..vector(RESET_VECTOR) + 2].copy_from_slice(&0x8000u16.to_le_bytes());
        prg[vector(NMI_VECTOR)..vector(NMI_VECTOR) + 2].copy_from_slice(&0x9000u16.to_le_bytes());

        Nes::new(
            Cartridge::from_bytes("nes", &image).unwrap(),
            NesSettings::default(),
        )
    }

    #[test]
    fn test_cpu_runs_every_third_clock() {
        // JMP $8000
        let mut nes = nes_with(&[0x4C, 0x00, 0x80], &[]);
        for _ in 0..300 {
            nes.clock();
        }
        assert_eq!(nes.cpu_cycles(), 100);
        assert_eq!(nes.cpu().total_cycles(), 100);
    }

    #[test]
    fn test_step() {
        // LDX #$05; INX; JMP $8003
        let mut nes = nes_with(&[0xA2, 0x05, 0xE8, 0x4C, 0x02, 0x80], &[]);
        nes.step(); // reset sequence
        nes.step();
        assert_eq!(nes.cpu_registers().x_reg, 0x05);
        assert_eq!(nes.cpu_registers().pc, 0x8002);
        nes.step();
        assert_eq!(nes.cpu_registers().x_reg, 0x06);
    }

    #[test]
    fn test_nmi_delivered_on_vertical_blank() {
        // LDA #$80; STA $2000; loop: JMP loop
        // NMI: INC $10; RTI
        let mut nes = nes_with(
            &[0xA9, 0x80, 0x8D, 0x00, 0x20, 0x4C, 0x05, 0x80],
            &[0xE6, 0x10, 0x40],
        );

        nes.run_frame();
        nes.run_frame();
        nes.run_frame();
        assert!(nes.bus().peek(0x0010) >= 2);
    }

    #[test]
    fn test_dma_suspends_cpu() {
        // LDA #$02; STA $4014; LDA #$01
        let mut nes = nes_with(&[0xA9, 0x02, 0x8D, 0x14, 0x40, 0xA9, 0x01], &[]);
        nes.bus_mut().write(0x0200, 0xAB);

        nes.step(); // reset sequence
        nes.step();
        let before = nes.cpu_cycles();
        nes.step();
        // STA takes 4 cycles, the transfer 513 or 514 more
        assert!((517..=518).contains(&(nes.cpu_cycles() - before)));
        assert_eq!(nes.ppu().oam().as_slice()[0], 0xAB);

        nes.step();
        assert_eq!(nes.cpu_registers().acc, 0x01);
    }

    #[test]
    fn test_save_and_load_state() {
        let mut nes = nes_with(&[0xE6, 0x00, 0x4C, 0x00, 0x80], &[]);
        nes.run_frame();
        let state = nes.save_state();
        let counter = nes.bus().peek(0x0000);

        nes.run_frame();
        assert_ne!(nes.bus().peek(0x0000), counter);

        nes.load_state(&state).unwrap();
        assert_eq!(nes.bus().peek(0x0000), counter);
        assert!(nes.load_state(&state[1..]).is_err());
    }

    #[test]
    fn test_next_sample() {
        let mut nes = nes_with(&[0x4C, 0x00, 0x80], &[]);
        let sample = nes.next_sample();
        assert_eq!(sample, 0.0);
        // 5369318 / 44100, rounded either way
        assert!((121..=122).contains(&nes.system_clock()));
    }
}
