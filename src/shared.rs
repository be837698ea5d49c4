//! Shared NES
//!
//! The console is driven by one thread at a time (a video loop or an audio
//! callback) while debuggers may look at it from others. Everything sits
//! behind a single read-write lock: clocking takes the write side, snapshots
//! the read side. As CPU and PPU live under the same lock, a snapshot never
//! sees one of them a step ahead of the other.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::controller::Buttons;
use crate::graphics::ppu_registers::PpuRegisters;
use crate::graphics::Frame;
use crate::nes::Nes;
use crate::processor::internal_cpu::InternalCpu;
use crate::types::{ButtonsReceiver, SharedNesLock};

/// Bytes disassembled after the program counter in a snapshot
const DISASSEMBLY_WINDOW: u16 = 0x20;

#[derive(Clone)]
pub struct SharedNes {
    nes: SharedNesLock,
}

/// Consistent copy of the console state for debuggers
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub cpu: InternalCpu,
    pub cpu_cycles: u64,
    pub ppu_registers: PpuRegisters,
    pub scanline: i16,
    pub dot: i16,
    pub ram: Vec<u8>,
    pub oam: Vec<u8>,
    pub palettes: Vec<u8>,
    pub frame: Frame,
    /// Instructions from the program counter on
    pub disassembly: BTreeMap<u16, String>,
}

impl SharedNes {
    pub fn new(nes: Nes) -> Self {
        Self {
            nes: Arc::new(RwLock::new(nes)),
        }
    }

    /// A panic while holding the lock leaves the console in whatever state
    /// it was, still usable for inspection
    fn read(&self) -> RwLockReadGuard<'_, Nes> {
        self.nes.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Nes> {
        self.nes.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn clock(&self) -> bool {
        self.write().clock()
    }

    /// Run a whole frame and return a copy of it
    pub fn run_frame(&self) -> Frame {
        self.write().run_frame().clone()
    }

    pub fn next_sample(&self) -> f32 {
        self.write().next_sample()
    }

    /// Fill `buffer` with consecutive samples under a single lock
    pub fn fill_samples(&self, buffer: &mut [f32]) {
        let mut nes = self.write();
        for sample in buffer.iter_mut() {
            *sample = nes.next_sample();
        }
    }

    pub fn reset(&self) {
        self.write().reset();
    }

    pub fn set_buttons(&self, port: usize, buttons: Buttons) {
        self.write().set_buttons(port, buttons);
    }

    pub fn connect_controller(&self, port: usize, input: ButtonsReceiver) {
        self.write().connect_controller(port, input);
    }

    /// Run `f` with exclusive access to the console
    pub fn with<R>(&self, f: impl FnOnce(&mut Nes) -> R) -> R {
        f(&mut self.write())
    }

    /// Run `f` with shared access to the console
    pub fn inspect<R>(&self, f: impl FnOnce(&Nes) -> R) -> R {
        f(&self.read())
    }

    pub fn snapshot(&self) -> Snapshot {
        let nes = self.read();
        let ppu = nes.ppu();
        let cpu = nes.cpu_registers();

        Snapshot {
            cpu,
            cpu_cycles: nes.cpu_cycles(),
            ppu_registers: *ppu.registers(),
            scanline: ppu.scanline(),
            dot: ppu.dot(),
            ram: nes.bus().ram().to_vec(),
            oam: ppu.oam().as_slice().to_vec(),
            palettes: ppu.memory().palettes().to_vec(),
            frame: ppu.frame().clone(),
            disassembly: nes.disassemble(cpu.pc, cpu.pc.saturating_add(DISASSEMBLY_WINDOW)),
        }
    }

    pub fn lock(&self) -> SharedNesLock {
        Arc::clone(&self.nes)
    }
}
