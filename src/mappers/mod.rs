//! Mappers
//!
//! NES mappers are circuits and hardware found in cartridges that allow
//! extending the capabilities and bypass some NES limitations.
//!
//! They are commonly used to extend the NES memory limitations but they can
//! also add more RAM, switch nametable mirroring or raise interrupts.
//!
//! A mapper never owns the ROM data. It only translates addresses: the
//! cartridge asks the mapper first and then reads its own PRG/CHR memory with
//! the translated offset. CHR RAM is banked exactly like CHR ROM. Mappers do
//! own their registers and the PRG RAM mapped at $6000-$7FFF, as that's what
//! battery backed saves persist.

mod mapper_000;
mod mapper_001;
mod mapper_002;
mod mapper_003;
mod mapper_004;
mod mapper_009;
mod mapper_066;

use log::debug;

use crate::errors::CartridgeError;
use crate::hardware::{CARTRIDGE_RAM_END, CARTRIDGE_RAM_START};

pub use mapper_000::Mapper000;
pub use mapper_001::Mapper001;
pub use mapper_002::Mapper002;
pub use mapper_003::Mapper003;
pub use mapper_004::Mapper004;
pub use mapper_009::Mapper009;
pub use mapper_066::Mapper066;

pub const PRG_BANK_SIZE: usize = 0x4000;
pub const CHR_BANK_SIZE: usize = 0x2000;
pub const PRG_RAM_SIZE: usize = 0x2000;

/// Nametable arrangement
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mirroring {
    /// Vertical arrangement (CIRAM A10 = PPU A11)
    Horizontal,
    /// Horizontal arrangement (CIRAM A10 = PPU A10)
    Vertical,
    /// Every nametable shows the first CIRAM page
    OneScreenLow,
    /// Every nametable shows the second CIRAM page
    OneScreenHigh,
}

impl Mirroring {
    pub(crate) fn to_state(self) -> u8 {
        match self {
            Mirroring::Horizontal => 0,
            Mirroring::Vertical => 1,
            Mirroring::OneScreenLow => 2,
            Mirroring::OneScreenHigh => 3,
        }
    }

    pub(crate) fn from_state(value: u8) -> Self {
        match value & 0b11 {
            0 => Mirroring::Horizontal,
            1 => Mirroring::Vertical,
            2 => Mirroring::OneScreenLow,
            _ => Mirroring::OneScreenHigh,
        }
    }
}

/// Result of a CPU read intercepted by the mapper
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MappedRead {
    /// Offset inside the cartridge PRG ROM
    Program(usize),
    /// Value supplied by the mapper itself (PRG RAM, open registers)
    Data(u8),
}

/// Cartridge sizes a mapper needs to know about
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MapperSpecs {
    /// PRG ROM size in 16 kB banks
    pub program_banks: usize,
    /// CHR size in 8 kB banks. CHR RAM cartridges count as one bank
    pub character_banks: usize,
    /// PRG RAM size in bytes
    pub program_ram_size: usize,
}

pub trait Mapper: Send + Sync {
    /// Translate a CPU read. `None` lets the read reach the console
    fn cpu_map_read(&self, address: u16) -> Option<MappedRead>;

    /// Handle a CPU write. Returns whether the mapper consumed it
    fn cpu_map_write(&mut self, address: u16, data: u8) -> bool;

    /// Translate a pattern table address into a CHR offset. Used for reads
    /// and, on CHR RAM cartridges, for writes too
    fn ppu_map_read(&self, address: u16) -> Option<usize>;

    /// Notification of every PPU pattern fetch, for mappers whose state
    /// depends on what the PPU reads
    fn ppu_access(&mut self, _address: u16) {}

    /// Mirroring selected by the mapper. `None` keeps the hardwired one
    fn mirroring(&self) -> Option<Mirroring> {
        None
    }

    fn irq_pending(&self) -> bool {
        false
    }

    fn irq_acknowledge(&mut self) {}

    /// End of a rendered scanline
    fn scanline(&mut self) {}

    fn reset(&mut self);

    /// PRG RAM contents, persisted on battery backed cartridges
    fn battery_ram(&self) -> Option<&[u8]> {
        None
    }

    fn load_battery_ram(&mut self, _data: &[u8]) {}

    /// Registers followed by PRG RAM. The length only depends on the
    /// cartridge, never on the register values
    fn save_state(&self) -> Vec<u8>;

    /// Restore a dump produced by `save_state` for the same cartridge
    fn load_state(&mut self, state: &[u8]);
}

pub fn mapper_map(mapper: u8, specs: MapperSpecs) -> Result<Box<dyn Mapper>, CartridgeError> {
    debug!("Creating mapper {mapper:03} with {specs:?}");

    Ok(match mapper {
        0 => Box::new(Mapper000::new(specs)),
        1 => Box::new(Mapper001::new(specs)),
        2 => Box::new(Mapper002::new(specs)),
        3 => Box::new(Mapper003::new(specs)),
        4 => Box::new(Mapper004::new(specs)),
        9 => Box::new(Mapper009::new(specs)),
        66 => Box::new(Mapper066::new(specs)),
        _ => return Err(CartridgeError::UnsupportedMapper(mapper)),
    })
}

/// PRG RAM at $6000-$7FFF, shared by every mapper that carries it
#[derive(Clone)]
pub(crate) struct ProgramRam {
    memory: Vec<u8>,
}

impl ProgramRam {
    pub fn new(size: usize) -> Self {
        Self {
            memory: vec![0; size.max(1)],
        }
    }

    pub fn contains(address: u16) -> bool {
        (CARTRIDGE_RAM_START..=CARTRIDGE_RAM_END).contains(&address)
    }

    pub fn read(&self, address: u16) -> u8 {
        let offset = (address - CARTRIDGE_RAM_START) as usize;
        self.memory[offset % self.memory.len()]
    }

    pub fn write(&mut self, address: u16, data: u8) {
        let offset = (address - CARTRIDGE_RAM_START) as usize;
        let len = self.memory.len();
        self.memory[offset % len] = data;
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.memory
    }

    pub fn load(&mut self, data: &[u8]) {
        let len = data.len().min(self.memory.len());
        self.memory[..len].copy_from_slice(&data[..len]);
    }
}

/// Register bytes followed by PRG RAM, the layout every mapper saves
pub(crate) fn encode_state(registers: &[u8], program_ram: Option<&ProgramRam>) -> Vec<u8> {
    let ram = program_ram.map(ProgramRam::as_slice).unwrap_or_default();
    let mut state = Vec::with_capacity(registers.len() + ram.len());
    state.extend_from_slice(registers);
    state.extend_from_slice(ram);
    state
}

/// Split a saved mapper state into its `N` register bytes and the rest
pub(crate) fn decode_state<const N: usize>(state: &[u8]) -> Option<([u8; N], &[u8])> {
    let registers = state.get(..N)?.try_into().ok()?;
    Some((registers, &state[N..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_mapper() {
        let specs = MapperSpecs {
            program_banks: 1,
            character_banks: 1,
            program_ram_size: PRG_RAM_SIZE,
        };
        assert!(matches!(
            mapper_map(5, specs),
            Err(CartridgeError::UnsupportedMapper(5))
        ));
        assert!(mapper_map(4, specs).is_ok());
    }

    #[test]
    fn test_program_ram_mirrors_small_chips() {
        let mut ram = ProgramRam::new(0x800);
        ram.write(0x6001, 0xAB);
        assert_eq!(ram.read(0x6801), 0xAB);
        assert!(ProgramRam::contains(0x7FFF));
        assert!(!ProgramRam::contains(0x8000));
    }

    #[test]
    fn test_state_layout() {
        let mut ram = ProgramRam::new(0x800);
        ram.write(0x6000, 0x5A);

        let state = encode_state(&[1, 2, 3], Some(&ram));
        assert_eq!(state.len(), 3 + 0x800);

        let (registers, rest) = decode_state::<3>(&state).unwrap();
        assert_eq!(registers, [1, 2, 3]);
        assert_eq!(rest[0], 0x5A);

        assert!(decode_state::<4>(&[0; 3]).is_none());
    }

    #[test]
    fn test_every_mapper_restores_its_state() {
        let specs = MapperSpecs {
            program_banks: 8,
            character_banks: 4,
            program_ram_size: PRG_RAM_SIZE,
        };

        for number in [0, 1, 2, 3, 4, 9, 66] {
            let mut mapper = mapper_map(number, specs).unwrap();
            // bank switch on every register window, plus PRG RAM
            for address in [0x8000, 0x8001, 0xA000, 0xB000, 0xC000, 0xE000, 0xF000] {
                mapper.cpu_map_write(address, 0x13);
            }
            mapper.cpu_map_write(0x6123, 0x77);
            let state = mapper.save_state();

            let mut restored = mapper_map(number, specs).unwrap();
            assert_eq!(restored.save_state().len(), state.len());
            restored.load_state(&state);

            assert_eq!(restored.save_state(), state, "mapper {number}");
            for address in [0x6123, 0x8000, 0xA000, 0xC000, 0xE000] {
                assert_eq!(
                    restored.cpu_map_read(address),
                    mapper.cpu_map_read(address),
                    "mapper {number} at ${address:04X}"
                );
            }
            for address in [0x0000, 0x0C00, 0x1000, 0x1C00] {
                assert_eq!(restored.ppu_map_read(address), mapper.ppu_map_read(address));
            }
            assert_eq!(restored.mirroring(), mapper.mirroring());
        }
    }
}
