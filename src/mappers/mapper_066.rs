use crate::hardware::{CARTRIDGE_ROM_START, PATTERN_TABLES_END};
use crate::mappers::{decode_state, MappedRead, Mapper, MapperSpecs, CHR_BANK_SIZE};

const PRG_WINDOW: usize = 0x8000;

/// GxROM. A single register at $8000-$FFFF selects a 32 kB PRG bank (bits
/// 4-5) and an 8 kB CHR bank (bits 0-1)
pub struct Mapper066 {
    specs: MapperSpecs,
    program_bank: u8,
    character_bank: u8,
}

impl Mapper066 {
    pub fn new(specs: MapperSpecs) -> Self {
        Self {
            specs,
            program_bank: 0,
            character_bank: 0,
        }
    }
}

impl Mapper for Mapper066 {
    fn cpu_map_read(&self, address: u16) -> Option<MappedRead> {
        if address < CARTRIDGE_ROM_START {
            return None;
        }
        let banks = (self.specs.program_banks / 2).max(1);
        let bank = self.program_bank as usize % banks;
        Some(MappedRead::Program(
            bank * PRG_WINDOW + (address & 0x7FFF) as usize,
        ))
    }

    fn cpu_map_write(&mut self, address: u16, data: u8) -> bool {
        if address < CARTRIDGE_ROM_START {
            return false;
        }
        self.character_bank = data & 0x03;
        self.program_bank = (data >> 4) & 0x03;
        true
    }

    fn ppu_map_read(&self, address: u16) -> Option<usize> {
        if address > PATTERN_TABLES_END {
            return None;
        }
        let bank = self.character_bank as usize % self.specs.character_banks.max(1);
        Some(bank * CHR_BANK_SIZE + address as usize)
    }

    fn reset(&mut self) {
        self.program_bank = 0;
        self.character_bank = 0;
    }

    fn save_state(&self) -> Vec<u8> {
        vec![self.program_bank, self.character_bank]
    }

    fn load_state(&mut self, state: &[u8]) {
        if let Some(([program_bank, character_bank], _)) = decode_state::<2>(state) {
            self.program_bank = program_bank & 0x03;
            self.character_bank = character_bank & 0x03;
        }
    }
}
