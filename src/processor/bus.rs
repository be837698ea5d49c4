//! Main bus
//!
//! CPU address space. See https://www.nesdev.org/wiki/CPU_memory_map
//!
//! | Range         | Device                                        |
//! |---------------|-----------------------------------------------|
//! | $0000-$1FFF   | 2 kB RAM, mirrored 3 times                    |
//! | $2000-$3FFF   | PPU registers, mirrored every 8 bytes         |
//! | $4000-$4013   | APU                                           |
//! | $4014         | OAM DMA                                       |
//! | $4015         | APU status                                    |
//! | $4016-$4017   | controllers (and APU frame counter on writes) |
//! | $4020-$FFFF   | cartridge                                     |
//!
//! The cartridge gets the first chance to answer any access, whatever the
//! address. Devices are owned by the bus so the PPU can be handed the
//! cartridge for its own memory accesses.

use crate::audio::{AudioSource, Silence};
use crate::cartridge::Cartridge;
use crate::controller::Controller;
use crate::dma::{Dma, DmaCycle};
use crate::graphics::ppu::Ppu;
use crate::hardware::*;
use crate::interfaces::{Bus, Memory};

use super::memory::{MirroredMemory, Ram};

pub struct MainBus {
    ram: MirroredMemory<Ram>,
    ppu: Ppu,
    cartridge: Cartridge,
    controllers: [Controller; 2],
    dma: Dma,
    audio: Box<dyn AudioSource>,
}

impl MainBus {
    pub fn new(cartridge: Cartridge) -> Self {
        Self::with_audio(cartridge, Box::new(Silence))
    }

    pub fn with_audio(cartridge: Cartridge, audio: Box<dyn AudioSource>) -> Self {
        Self {
            ram: MirroredMemory::new(Ram::new(RAM_CHIP_SIZE), RAM_MIRRORS.into()),
            ppu: Ppu::new(),
            cartridge,
            controllers: [Controller::new(), Controller::new()],
            dma: Dma::new(),
            audio,
        }
    }

    /// Advance the PPU one dot
    pub fn clock_ppu(&mut self) {
        self.ppu.clock(&mut self.cartridge);
    }

    /// Run one DMA cycle in place of a CPU cycle
    pub fn clock_dma(&mut self, cpu_cycle: u64) {
        match self.dma.next_cycle(cpu_cycle) {
            DmaCycle::Dummy => {}
            DmaCycle::Read(address) => {
                let data = self.read(address);
                self.dma.latch(data);
            }
            DmaCycle::Write(data) => self.write(OAMDATA, data),
        }
    }

    pub fn dma_active(&self) -> bool {
        self.dma.active()
    }

    pub fn clock_audio(&mut self) {
        self.audio.clock();
    }

    pub fn audio_sample(&self) -> f32 {
        self.audio.sample()
    }

    /// Power cycle the devices that have a reset line. RAM contents survive
    pub fn reset(&mut self) {
        self.ppu.reset();
        self.cartridge.reset();
        self.dma.reset();
        self.audio.reset();
        for controller in self.controllers.iter_mut() {
            controller.reset();
        }
    }

    pub fn ppu(&self) -> &Ppu {
        &self.ppu
    }

    pub fn ppu_mut(&mut self) -> &mut Ppu {
        &mut self.ppu
    }

    pub fn cartridge(&self) -> &Cartridge {
        &self.cartridge
    }

    pub fn cartridge_mut(&mut self) -> &mut Cartridge {
        &mut self.cartridge
    }

    /// Controller `port` (0 or 1)
    pub fn controller(&self, port: usize) -> Option<&Controller> {
        self.controllers.get(port)
    }

    pub fn controller_mut(&mut self, port: usize) -> Option<&mut Controller> {
        self.controllers.get_mut(port)
    }

    /// The 2 kB of console RAM
    pub fn ram(&self) -> &[u8] {
        self.ram.inner().as_slice()
    }

    pub fn load_ram(&mut self, data: &[u8]) {
        self.ram.inner_mut().load(0, data);
    }
}

impl Bus for MainBus {
    fn read(&mut self, address: u16) -> u8 {
        if let Some(data) = self.cartridge.cpu_read(address) {
            return data;
        }

        match address {
            RAM_START..=RAM_END => self.ram.read(address),
            PPU_REGISTERS_START..=PPU_REGISTERS_END => {
                self.ppu.cpu_read(&mut self.cartridge, address)
            }
            APU_REGISTERS_START..=APU_REGISTERS_END | APU_STATUS => self.audio.cpu_read(address),
            CONTROLLER_PORT_1 => self.controllers[0].read(),
            CONTROLLER_PORT_2 => self.controllers[1].read(),
            // OAM DMA is write only, nothing else is connected
            _ => 0,
        }
    }

    fn write(&mut self, address: u16, data: u8) {
        if self.cartridge.cpu_write(address, data) {
            return;
        }

        match address {
            RAM_START..=RAM_END => self.ram.write(address, data),
            PPU_REGISTERS_START..=PPU_REGISTERS_END => {
                self.ppu.cpu_write(&mut self.cartridge, address, data)
            }
            OAM_DMA => self.dma.start(data),
            // one strobe line for both pads
            CONTROLLER_PORT_1 => {
                for controller in self.controllers.iter_mut() {
                    controller.write(data);
                }
            }
            // $4017 writes go to the APU frame counter
            APU_REGISTERS_START..=APU_REGISTERS_END | APU_STATUS | CONTROLLER_PORT_2 => {
                self.audio.cpu_write(address, data)
            }
            _ => {}
        }
    }

    fn peek(&self, address: u16) -> u8 {
        if let Some(data) = self.cartridge.cpu_read(address) {
            return data;
        }

        match address {
            RAM_START..=RAM_END => self.ram.read(address),
            PPU_REGISTERS_START..=PPU_REGISTERS_END => self.ppu.peek_register(address),
            CONTROLLER_PORT_1 => self.controllers[0].peek(),
            CONTROLLER_PORT_2 => self.controllers[1].peek(),
            _ => 0,
        }
    }
}
