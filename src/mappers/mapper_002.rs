use crate::hardware::{CARTRIDGE_ROM_START, PATTERN_TABLES_END};
use crate::mappers::{decode_state, encode_state};
use crate::mappers::{MappedRead, Mapper, MapperSpecs, ProgramRam, PRG_BANK_SIZE};

/// UxROM. A write anywhere in $8000-$FFFF selects the 16 kB bank seen at
/// $8000. The last bank is always mapped at $C000. Carries 8 kB of PRG RAM
pub struct Mapper002 {
    specs: MapperSpecs,
    program_ram: ProgramRam,
    program_bank: u8,
}

impl Mapper002 {
    pub fn new(specs: MapperSpecs) -> Self {
        Self {
            specs,
            program_ram: ProgramRam::new(specs.program_ram_size),
            program_bank: 0,
        }
    }
}

impl Mapper for Mapper002 {
    fn cpu_map_read(&self, address: u16) -> Option<MappedRead> {
        let banks = self.specs.program_banks.max(1);
        match address {
            0x8000..=0xBFFF => {
                let bank = self.program_bank as usize % banks;
                Some(MappedRead::Program(
                    bank * PRG_BANK_SIZE + (address & 0x3FFF) as usize,
                ))
            }
            0xC000..=0xFFFF => Some(MappedRead::Program(
                (banks - 1) * PRG_BANK_SIZE + (address & 0x3FFF) as usize,
            )),
            _ if ProgramRam::contains(address) => {
                Some(MappedRead::Data(self.program_ram.read(address)))
            }
            _ => None,
        }
    }

    fn cpu_map_write(&mut self, address: u16, data: u8) -> bool {
        if address >= CARTRIDGE_ROM_START {
            self.program_bank = data & 0x0F;
            true
        } else if ProgramRam::contains(address) {
            self.program_ram.write(address, data);
            true
        } else {
            false
        }
    }

    fn ppu_map_read(&self, address: u16) -> Option<usize> {
        if address <= PATTERN_TABLES_END {
            Some(address as usize)
        } else {
            None
        }
    }

    fn reset(&mut self) {
        self.program_bank = 0;
    }

    fn battery_ram(&self) -> Option<&[u8]> {
        Some(self.program_ram.as_slice())
    }

    fn load_battery_ram(&mut self, data: &[u8]) {
        self.program_ram.load(data);
    }

    fn save_state(&self) -> Vec<u8> {
        encode_state(&[self.program_bank], Some(&self.program_ram))
    }

    fn load_state(&mut self, state: &[u8]) {
        if let Some(([program_bank], ram)) = decode_state::<1>(state) {
            self.program_bank = program_bank;
            self.program_ram.load(ram);
        }
    }
}
