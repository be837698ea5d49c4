use crate::hardware::PATTERN_TABLES_END;
use crate::mappers::{decode_state, MappedRead, Mapper, MapperSpecs, Mirroring};

const PRG_WINDOW: usize = 0x2000;
const CHR_WINDOW: usize = 0x1000;

/// Latch values, named after the tile that sets them
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Latch {
    FD,
    FE,
}

/// MMC2 (PxROM). One switchable 8 kB PRG window at $8000 and the last three
/// banks fixed after it.
///
/// Each pattern table has two CHR bank registers and a latch choosing
/// between them. The latches flip when the PPU fetches tiles $FD or $FE, so
/// the bank changes mid-frame without CPU intervention.
pub struct Mapper009 {
    specs: MapperSpecs,

    program_bank: u8,
    // [latch FD, latch FE] for each pattern table
    character_banks: [[u8; 2]; 2],
    latches: [Latch; 2],
    mirroring: Mirroring,
}

impl Mapper009 {
    pub fn new(specs: MapperSpecs) -> Self {
        Self {
            specs,
            program_bank: 0,
            character_banks: [[0; 2]; 2],
            latches: [Latch::FE; 2],
            mirroring: Mirroring::Vertical,
        }
    }
}

impl Mapper for Mapper009 {
    fn cpu_map_read(&self, address: u16) -> Option<MappedRead> {
        if address < 0x8000 {
            return None;
        }

        let banks = (self.specs.program_banks * 2).max(4);
        let bank = match address {
            0x8000..=0x9FFF => self.program_bank as usize % banks,
            0xA000..=0xBFFF => banks - 3,
            0xC000..=0xDFFF => banks - 2,
            _ => banks - 1,
        };
        Some(MappedRead::Program(
            bank * PRG_WINDOW + (address as usize & (PRG_WINDOW - 1)),
        ))
    }

    fn cpu_map_write(&mut self, address: u16, data: u8) -> bool {
        match address {
            0xA000..=0xAFFF => self.program_bank = data & 0x0F,
            0xB000..=0xBFFF => self.character_banks[0][0] = data & 0x1F,
            0xC000..=0xCFFF => self.character_banks[0][1] = data & 0x1F,
            0xD000..=0xDFFF => self.character_banks[1][0] = data & 0x1F,
            0xE000..=0xEFFF => self.character_banks[1][1] = data & 0x1F,
            0xF000..=0xFFFF => {
                self.mirroring = if data & 1 == 0 {
                    Mirroring::Vertical
                } else {
                    Mirroring::Horizontal
                };
            }
            0x8000..=0x9FFF => {}
            _ => return false,
        }
        true
    }

    fn ppu_map_read(&self, address: u16) -> Option<usize> {
        if address > PATTERN_TABLES_END {
            return None;
        }

        let table = (address as usize) / CHR_WINDOW;
        let latch = self.latches[table] as usize;
        let banks = (self.specs.character_banks * 2).max(1);
        let bank = self.character_banks[table][latch] as usize % banks;
        Some(bank * CHR_WINDOW + (address as usize & (CHR_WINDOW - 1)))
    }

    fn ppu_access(&mut self, address: u16) {
        match address {
            0x0FD8 => self.latches[0] = Latch::FD,
            0x0FE8 => self.latches[0] = Latch::FE,
            0x1FD8..=0x1FDF => self.latches[1] = Latch::FD,
            0x1FE8..=0x1FEF => self.latches[1] = Latch::FE,
            _ => {}
        }
    }

    fn mirroring(&self) -> Option<Mirroring> {
        Some(self.mirroring)
    }

    fn reset(&mut self) {
        self.program_bank = 0;
        self.character_banks = [[0; 2]; 2];
        self.latches = [Latch::FE; 2];
        self.mirroring = Mirroring::Vertical;
    }

    fn save_state(&self) -> Vec<u8> {
        let [[fd_0, fe_0], [fd_1, fe_1]] = self.character_banks;
        vec![
            self.program_bank,
            fd_0,
            fe_0,
            fd_1,
            fe_1,
            self.latches[0] as u8,
            self.latches[1] as u8,
            self.mirroring.to_state(),
        ]
    }

    fn load_state(&mut self, state: &[u8]) {
        let Some((registers, _)) = decode_state::<8>(state) else {
            return;
        };
        let [program_bank, fd_0, fe_0, fd_1, fe_1, latch_0, latch_1, mirroring] = registers;

        let latch = |value: u8| if value == 0 { Latch::FD } else { Latch::FE };
        self.program_bank = program_bank;
        self.character_banks = [[fd_0, fe_0], [fd_1, fe_1]];
        self.latches = [latch(latch_0), latch(latch_1)];
        self.mirroring = Mirroring::from_state(mirroring);
    }
}
