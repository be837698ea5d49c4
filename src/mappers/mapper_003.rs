use crate::hardware::{CARTRIDGE_ROM_START, PATTERN_TABLES_END};
use crate::mappers::{decode_state, MappedRead, Mapper, MapperSpecs, CHR_BANK_SIZE};

/// CNROM. PRG is fixed like NROM, writes to $8000-$FFFF select the 8 kB CHR
/// bank
pub struct Mapper003 {
    specs: MapperSpecs,
    character_bank: u8,
}

impl Mapper003 {
    pub fn new(specs: MapperSpecs) -> Self {
        Self {
            specs,
            character_bank: 0,
        }
    }
}

impl Mapper for Mapper003 {
    fn cpu_map_read(&self, address: u16) -> Option<MappedRead> {
        if address < CARTRIDGE_ROM_START {
            return None;
        }
        let mask = if self.specs.program_banks > 1 {
            0x7FFF
        } else {
            0x3FFF
        };
        Some(MappedRead::Program((address & mask) as usize))
    }

    fn cpu_map_write(&mut self, address: u16, data: u8) -> bool {
        if address >= CARTRIDGE_ROM_START {
            self.character_bank = data & 0x03;
            true
        } else {
            false
        }
    }

    fn ppu_map_read(&self, address: u16) -> Option<usize> {
        if address > PATTERN_TABLES_END {
            return None;
        }
        let bank = self.character_bank as usize % self.specs.character_banks.max(1);
        Some(bank * CHR_BANK_SIZE + address as usize)
    }

    fn reset(&mut self) {
        self.character_bank = 0;
    }

    fn save_state(&self) -> Vec<u8> {
        vec![self.character_bank]
    }

    fn load_state(&mut self, state: &[u8]) {
        if let Some(([character_bank], _)) = decode_state::<1>(state) {
            self.character_bank = character_bank & 0x03;
        }
    }
}
