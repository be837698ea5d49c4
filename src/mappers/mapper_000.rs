use crate::hardware::{CARTRIDGE_ROM_START, PATTERN_TABLES_END};
use crate::mappers::{encode_state, MappedRead, Mapper, MapperSpecs, ProgramRam};

/// NROM. No registers: 16 kB carts are mirrored at $C000, 32 kB carts fill
/// the whole PRG window
pub struct Mapper000 {
    specs: MapperSpecs,

    // Program memory (RAM) -- $6000 - $7FFF
    program_ram: ProgramRam,
}

impl Mapper000 {
    pub fn new(specs: MapperSpecs) -> Self {
        Self {
            specs,
            program_ram: ProgramRam::new(specs.program_ram_size),
        }
    }

    fn program_mask(&self) -> u16 {
        if self.specs.program_banks > 1 {
            0x7FFF
        } else {
            0x3FFF
        }
    }
}

impl Mapper for Mapper000 {
    fn cpu_map_read(&self, address: u16) -> Option<MappedRead> {
        if address >= CARTRIDGE_ROM_START {
            Some(MappedRead::Program((address & self.program_mask()) as usize))
        } else if ProgramRam::contains(address) {
            Some(MappedRead::Data(self.program_ram.read(address)))
        } else {
            None
        }
    }

    fn cpu_map_write(&mut self, address: u16, data: u8) -> bool {
        if ProgramRam::contains(address) {
            self.program_ram.write(address, data);
            return true;
        }
        // ROM, writes are dropped
        address >= CARTRIDGE_ROM_START
    }

    fn ppu_map_read(&self, address: u16) -> Option<usize> {
        if address <= PATTERN_TABLES_END {
            Some(address as usize)
        } else {
            None
        }
    }

    fn reset(&mut self) {}

    fn battery_ram(&self) -> Option<&[u8]> {
        Some(self.program_ram.as_slice())
    }

    fn load_battery_ram(&mut self, data: &[u8]) {
        self.program_ram.load(data);
    }

    fn save_state(&self) -> Vec<u8> {
        encode_state(&[], Some(&self.program_ram))
    }

    fn load_state(&mut self, state: &[u8]) {
        self.program_ram.load(state);
    }
}
