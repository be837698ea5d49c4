//! Save states
//!
//! A save state is a blob with the whole console state laid out back to
//! back, always in this order:
//!
//! | Section         | Bytes                      |
//! |-----------------|----------------------------|
//! | CPU registers   | 7                          |
//! | PPU registers   | 16                         |
//! | console RAM     | 0x0800                     |
//! | nametables      | 0x0800                     |
//! | palettes        | 0x0020                     |
//! | OAM             | 0x0100                     |
//! | cartridge       | [`Cartridge::state_size`]  |
//!
//! The console part is always [`CONSOLE_STATE_SIZE`] bytes. The cartridge
//! part holds the mapper registers, PRG RAM and CHR RAM, so its size depends
//! on the cartridge but never changes while it is inserted.
//!
//! [`Cartridge::state_size`]: crate::cartridge::Cartridge::state_size

use log::info;

use crate::errors::SaveStateError;
use crate::graphics::ppu::REGISTERS_STATE_SIZE;
use crate::hardware::{NAMETABLE_SIZE, OAM_SIZE, PALETTE_MEMORY_SIZE, RAM_CHIP_SIZE};
use crate::processor::bus::MainBus;
use crate::processor::cpu::Cpu;
use crate::processor::internal_cpu::InternalCpu;
use crate::processor::status_register::StatusRegister;

pub const CPU_STATE_SIZE: usize = 7;
const NAMETABLES_SIZE: usize = 2 * NAMETABLE_SIZE;

pub const CONSOLE_STATE_SIZE: usize = CPU_STATE_SIZE
    + REGISTERS_STATE_SIZE
    + RAM_CHIP_SIZE
    + NAMETABLES_SIZE
    + PALETTE_MEMORY_SIZE
    + OAM_SIZE;

/// Size of a save state with the cartridge currently on `bus`
pub fn state_size(bus: &MainBus) -> usize {
    CONSOLE_STATE_SIZE + bus.cartridge().state_size()
}

/// Dump the console and cartridge state
pub fn save_state(cpu: &Cpu, bus: &MainBus) -> Vec<u8> {
    let ppu = bus.ppu();
    let mut state = Vec::with_capacity(state_size(bus));

    state.extend_from_slice(&encode_cpu(&cpu.registers()));
    state.extend_from_slice(&ppu.save_registers());
    state.extend_from_slice(bus.ram());
    state.extend_from_slice(ppu.memory().nametables());
    state.extend_from_slice(ppu.memory().palettes());
    state.extend_from_slice(ppu.oam().as_slice());
    debug_assert_eq!(state.len(), CONSOLE_STATE_SIZE);

    state.extend_from_slice(&bus.cartridge().save_state());
    state
}

/// Restore a state produced by [`save_state`] with the same cartridge.
/// Nothing is touched unless the size matches
pub fn load_state(cpu: &mut Cpu, bus: &mut MainBus, state: &[u8]) -> Result<(), SaveStateError> {
    let expected = state_size(bus);
    if state.len() != expected {
        return Err(SaveStateError::WrongSize {
            expected,
            actual: state.len(),
        });
    }

    let mut sections = Sections { remaining: state };

    let mut registers = [0; CPU_STATE_SIZE];
    registers.copy_from_slice(sections.take(CPU_STATE_SIZE));
    cpu.set_registers(decode_cpu(registers));

    let mut registers = [0; REGISTERS_STATE_SIZE];
    registers.copy_from_slice(sections.take(REGISTERS_STATE_SIZE));
    bus.ppu_mut().load_registers(&registers);

    bus.load_ram(sections.take(RAM_CHIP_SIZE));

    let nametables = sections.take(NAMETABLES_SIZE);
    let palettes = sections.take(PALETTE_MEMORY_SIZE);
    bus.ppu_mut().memory_mut().load(nametables, palettes);

    bus.ppu_mut().oam_mut().load(sections.take(OAM_SIZE));

    bus.cartridge_mut().load_state(sections.remaining);

    info!("Save state restored, PC=${:04X}", cpu.pc());
    Ok(())
}

/// Consecutive slices of a state blob
struct Sections<'a> {
    remaining: &'a [u8],
}

impl<'a> Sections<'a> {
    fn take(&mut self, size: usize) -> &'a [u8] {
        let (section, rest) = self.remaining.split_at(size.min(self.remaining.len()));
        self.remaining = rest;
        section
    }
}

fn encode_cpu(registers: &InternalCpu) -> [u8; CPU_STATE_SIZE] {
    let [pc_low, pc_high] = registers.pc.to_le_bytes();
    [
        registers.acc,
        registers.x_reg,
        registers.y_reg,
        registers.sp,
        pc_low,
        pc_high,
        u8::from(registers.sr),
    ]
}

fn decode_cpu(state: [u8; CPU_STATE_SIZE]) -> InternalCpu {
    InternalCpu {
        acc: state[0],
        x_reg: state[1],
        y_reg: state[2],
        sp: state[3],
        pc: u16::from_le_bytes([state[4], state[5]]),
        sr: StatusRegister::from(state[6]),
    }
}
