use crate::hardware::{CARTRIDGE_ROM_START, PATTERN_TABLES_END};
use crate::mappers::{decode_state, encode_state};
use crate::mappers::{MappedRead, Mapper, MapperSpecs, Mirroring, ProgramRam};

const SHIFT_REGISTER_WRITES: u8 = 5;
const CONTROL_RESET: u8 = 0x1C;

/// MMC1 (SxROM). Registers are loaded serially through a 5-bit shift
/// register, one bit per write to $8000-$FFFF. Bit 7 set on any write
/// resets the shift register. The fifth write latches the value into the
/// register selected by bits 13-14 of its address:
///
/// - $8000-$9FFF: control (mirroring, PRG and CHR modes)
/// - $A000-$BFFF: CHR bank 0
/// - $C000-$DFFF: CHR bank 1
/// - $E000-$FFFF: PRG bank
pub struct Mapper001 {
    specs: MapperSpecs,
    program_ram: ProgramRam,

    shift_register: u8,
    shift_count: u8,

    control: u8,
    character_bank_0: u8,
    character_bank_1: u8,
    program_bank: u8,
}

impl Mapper001 {
    pub fn new(specs: MapperSpecs) -> Self {
        Self {
            specs,
            program_ram: ProgramRam::new(specs.program_ram_size),
            shift_register: 0,
            shift_count: 0,
            control: CONTROL_RESET,
            character_bank_0: 0,
            character_bank_1: 0,
            program_bank: 0,
        }
    }

    /// 0, 1: switch 32 kB at $8000
    /// 2: fix first bank at $8000 and switch 16 kB at $C000
    /// 3: switch 16 kB at $8000 and fix last bank at $C000
    fn program_mode(&self) -> u8 {
        (self.control >> 2) & 0b11
    }

    /// Switch two separate 4 kB banks instead of a single 8 kB one
    fn character_4k_mode(&self) -> bool {
        self.control & 0x10 != 0
    }

    fn program_offset(&self, address: u16) -> usize {
        let banks = self.specs.program_banks.max(1);
        let bank = (self.program_bank & 0x0F) as usize;

        match self.program_mode() {
            0 | 1 => {
                let banks_32k = (banks / 2).max(1);
                let bank = (bank >> 1) % banks_32k;
                bank * 2 * super::PRG_BANK_SIZE + (address & 0x7FFF) as usize
            }
            mode => {
                let low_window = address < 0xC000;
                let bank = match (mode, low_window) {
                    (2, true) => 0,
                    (2, false) => bank % banks,
                    (_, true) => bank % banks,
                    (_, false) => banks - 1,
                };
                bank * super::PRG_BANK_SIZE + (address & 0x3FFF) as usize
            }
        }
    }

    fn character_offset(&self, address: u16) -> usize {
        let banks_4k = (self.specs.character_banks * 2).max(1);

        if self.character_4k_mode() {
            let bank = if address < 0x1000 {
                self.character_bank_0
            } else {
                self.character_bank_1
            };
            (bank as usize % banks_4k) * 0x1000 + (address & 0x0FFF) as usize
        } else {
            let banks_8k = self.specs.character_banks.max(1);
            let bank = (self.character_bank_0 >> 1) as usize % banks_8k;
            bank * super::CHR_BANK_SIZE + (address & 0x1FFF) as usize
        }
    }

    fn load_register(&mut self, address: u16, data: u8) {
        if data & 0x80 != 0 {
            self.shift_register = 0;
            self.shift_count = 0;
            self.control |= 0x0C;
            return;
        }

        self.shift_register >>= 1;
        self.shift_register |= (data & 1) << 4;
        self.shift_count += 1;

        if self.shift_count < SHIFT_REGISTER_WRITES {
            return;
        }

        let value = self.shift_register & 0x1F;
        match (address >> 13) & 0b11 {
            0 => self.control = value,
            1 => self.character_bank_0 = value,
            2 => self.character_bank_1 = value,
            _ => self.program_bank = value,
        }

        self.shift_register = 0;
        self.shift_count = 0;
    }
}

impl Mapper for Mapper001 {
    fn cpu_map_read(&self, address: u16) -> Option<MappedRead> {
        if address >= CARTRIDGE_ROM_START {
            Some(MappedRead::Program(self.program_offset(address)))
        } else if ProgramRam::contains(address) {
            Some(MappedRead::Data(self.program_ram.read(address)))
        } else {
            None
        }
    }

    fn cpu_map_write(&mut self, address: u16, data: u8) -> bool {
        if address >= CARTRIDGE_ROM_START {
            self.load_register(address, data);
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
            Some(self.character_offset(address))
        } else {
            None
        }
    }

    fn mirroring(&self) -> Option<Mirroring> {
        Some(match self.control & 0b11 {
            0 => Mirroring::OneScreenLow,
            1 => Mirroring::OneScreenHigh,
            2 => Mirroring::Vertical,
            _ => Mirroring::Horizontal,
        })
    }

    fn reset(&mut self) {
        self.shift_register = 0;
        self.shift_count = 0;
        self.control = CONTROL_RESET;
        self.character_bank_0 = 0;
        self.character_bank_1 = 0;
        self.program_bank = 0;
    }

    fn battery_ram(&self) -> Option<&[u8]> {
        Some(self.program_ram.as_slice())
    }

    fn load_battery_ram(&mut self, data: &[u8]) {
        self.program_ram.load(data);
    }

    fn save_state(&self) -> Vec<u8> {
        let registers = [
            self.shift_register,
            self.shift_count,
            self.control,
            self.character_bank_0,
            self.character_bank_1,
            self.program_bank,
        ];
        encode_state(&registers, Some(&self.program_ram))
    }

    fn load_state(&mut self, state: &[u8]) {
        let Some((registers, ram)) = decode_state::<6>(state) else {
            return;
        };
        let [shift_register, shift_count, control, bank_0, bank_1, program_bank] = registers;

        self.shift_register = shift_register;
        self.shift_count = shift_count % SHIFT_REGISTER_WRITES;
        self.control = control;
        self.character_bank_0 = bank_0;
        self.character_bank_1 = bank_1;
        self.program_bank = program_bank;
        self.program_ram.load(ram);
    }
}
