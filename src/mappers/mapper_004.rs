use crate::hardware::PATTERN_TABLES_END;
use crate::mappers::{decode_state, encode_state};
use crate::mappers::{MappedRead, Mapper, MapperSpecs, Mirroring, ProgramRam};

const PRG_WINDOW: usize = 0x2000;
const CHR_WINDOW: usize = 0x0400;
const REGISTERS_STATE_SIZE: usize = 15;

/// MMC3 (TxROM).
///
/// Eight bank registers R0-R7 written through a select/data pair:
/// R0-R1 switch 2 kB CHR windows, R2-R5 1 kB CHR windows and R6-R7 8 kB PRG
/// windows. Bit 6 of the select swaps the fixed and switchable PRG window at
/// $8000/$C000, bit 7 swaps the CHR halves (CHR A12 inversion).
///
/// The IRQ counter is clocked once per rendered scanline.
pub struct Mapper004 {
    specs: MapperSpecs,
    program_ram: ProgramRam,

    bank_select: u8,
    registers: [u8; 8],
    mirroring: Mirroring,

    irq_latch: u8,
    irq_counter: u8,
    irq_reload: bool,
    irq_enabled: bool,
    irq_pending: bool,
}

impl Mapper004 {
    pub fn new(specs: MapperSpecs) -> Self {
        Self {
            specs,
            program_ram: ProgramRam::new(specs.program_ram_size),
            bank_select: 0,
            registers: [0; 8],
            mirroring: Mirroring::Vertical,
            irq_latch: 0,
            irq_counter: 0,
            irq_reload: false,
            irq_enabled: false,
            irq_pending: false,
        }
    }

    fn program_offset(&self, address: u16) -> usize {
        let banks = (self.specs.program_banks * 2).max(1);
        let last = banks - 1;
        let second_last = banks.saturating_sub(2);
        let r6 = (self.registers[6] & 0x3F) as usize % banks;
        let r7 = (self.registers[7] & 0x3F) as usize % banks;
        let swapped = self.bank_select & 0x40 != 0;

        let bank = match (address - 0x8000) as usize / PRG_WINDOW {
            0 if swapped => second_last,
            0 => r6,
            1 => r7,
            2 if swapped => r6,
            2 => second_last,
            _ => last,
        };
        bank * PRG_WINDOW + (address as usize & (PRG_WINDOW - 1))
    }

    fn character_offset(&self, address: u16) -> usize {
        let banks = (self.specs.character_banks * 8).max(1);
        let inverted = self.bank_select & 0x80 != 0;

        // Which 1 kB slot of the pattern tables, undoing the A12 inversion
        let mut slot = address as usize / CHR_WINDOW;
        if inverted {
            slot ^= 0b100;
        }

        let bank = match slot {
            0 => self.registers[0] & 0xFE,
            1 => self.registers[0] | 0x01,
            2 => self.registers[1] & 0xFE,
            3 => self.registers[1] | 0x01,
            slot => self.registers[slot - 2],
        };
        (bank as usize % banks) * CHR_WINDOW + (address as usize & (CHR_WINDOW - 1))
    }

    fn register_write(&mut self, address: u16, data: u8) {
        let even = address & 1 == 0;
        match (address, even) {
            (0x8000..=0x9FFF, true) => self.bank_select = data,
            (0x8000..=0x9FFF, false) => {
                self.registers[(self.bank_select & 0x07) as usize] = data;
            }
            (0xA000..=0xBFFF, true) => {
                self.mirroring = if data & 1 == 0 {
                    Mirroring::Vertical
                } else {
                    Mirroring::Horizontal
                };
            }
            // PRG RAM protect, left always enabled
            (0xA000..=0xBFFF, false) => {}
            (0xC000..=0xDFFF, true) => self.irq_latch = data,
            (0xC000..=0xDFFF, false) => {
                self.irq_counter = 0;
                self.irq_reload = true;
            }
            (_, true) => {
                self.irq_enabled = false;
                self.irq_pending = false;
            }
            (_, false) => self.irq_enabled = true,
        }
    }
}

impl Mapper for Mapper004 {
    fn cpu_map_read(&self, address: u16) -> Option<MappedRead> {
        if address >= 0x8000 {
            Some(MappedRead::Program(self.program_offset(address)))
        } else if ProgramRam::contains(address) {
            Some(MappedRead::Data(self.program_ram.read(address)))
        } else {
            None
        }
    }

    fn cpu_map_write(&mut self, address: u16, data: u8) -> bool {
        if address >= 0x8000 {
            self.register_write(address, data);
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
        Some(self.mirroring)
    }

    fn irq_pending(&self) -> bool {
        self.irq_pending
    }

    fn irq_acknowledge(&mut self) {
        self.irq_pending = false;
    }

    fn scanline(&mut self) {
        if self.irq_counter == 0 || self.irq_reload {
            self.irq_counter = self.irq_latch;
            self.irq_reload = false;
        } else {
            self.irq_counter -= 1;
        }

        if self.irq_counter == 0 && self.irq_enabled {
            self.irq_pending = true;
        }
    }

    fn reset(&mut self) {
        self.bank_select = 0;
        self.registers = [0; 8];
        self.mirroring = Mirroring::Vertical;
        self.irq_latch = 0;
        self.irq_counter = 0;
        self.irq_reload = false;
        self.irq_enabled = false;
        self.irq_pending = false;
    }

    fn battery_ram(&self) -> Option<&[u8]> {
        Some(self.program_ram.as_slice())
    }

    fn load_battery_ram(&mut self, data: &[u8]) {
        self.program_ram.load(data);
    }

    fn save_state(&self) -> Vec<u8> {
        let mut registers = [0; REGISTERS_STATE_SIZE];
        registers[0] = self.bank_select;
        registers[1..9].copy_from_slice(&self.registers);
        registers[9] = self.mirroring.to_state();
        registers[10] = self.irq_latch;
        registers[11] = self.irq_counter;
        registers[12] = self.irq_reload as u8;
        registers[13] = self.irq_enabled as u8;
        registers[14] = self.irq_pending as u8;
        encode_state(&registers, Some(&self.program_ram))
    }

    fn load_state(&mut self, state: &[u8]) {
        let Some((registers, ram)) = decode_state::<REGISTERS_STATE_SIZE>(state) else {
            return;
        };

        self.bank_select = registers[0];
        self.registers.copy_from_slice(&registers[1..9]);
        self.mirroring = Mirroring::from_state(registers[9]);
        self.irq_latch = registers[10];
        self.irq_counter = registers[11];
        self.irq_reload = registers[12] != 0;
        self.irq_enabled = registers[13] != 0;
        self.irq_pending = registers[14] != 0;
        self.program_ram.load(ram);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mappers::PRG_RAM_SIZE;

    fn mapper() -> Mapper004 {
        // 128 kB PRG (16 x 8 kB), 128 kB CHR (128 x 1 kB)
        Mapper004::new(MapperSpecs {
            program_banks: 8,
            character_banks: 16,
            program_ram_size: PRG_RAM_SIZE,
        })
    }

    fn set_register(mapper: &mut Mapper004, select: u8, value: u8) {
        mapper.cpu_map_write(0x8000, select);
        mapper.cpu_map_write(0x8001, value);
    }

    #[test]
    fn test_program_windows() {
        let mut mapper = mapper();
        set_register(&mut mapper, 6, 3);
        set_register(&mut mapper, 7, 5);

        let window = |bank: usize| Some(MappedRead::Program(bank * PRG_WINDOW));
        assert_eq!(mapper.cpu_map_read(0x8000), window(3));
        assert_eq!(mapper.cpu_map_read(0xA000), window(5));
        assert_eq!(mapper.cpu_map_read(0xC000), window(14));
        assert_eq!(mapper.cpu_map_read(0xE000), window(15));

        // swap $8000 and $C000
        mapper.cpu_map_write(0x8000, 0x46);
        assert_eq!(mapper.cpu_map_read(0x8000), window(14));
        assert_eq!(mapper.cpu_map_read(0xC000), window(3));
        assert_eq!(mapper.cpu_map_read(0xE000), window(15));
    }

    #[test]
    fn test_character_windows() {
        let mut mapper = mapper();
        set_register(&mut mapper, 0, 9); // low bit ignored on 2 kB windows
        set_register(&mut mapper, 2, 20);
        set_register(&mut mapper, 5, 33);

        assert_eq!(mapper.ppu_map_read(0x0000), Some(8 * CHR_WINDOW));
        assert_eq!(mapper.ppu_map_read(0x0400), Some(9 * CHR_WINDOW));
        assert_eq!(mapper.ppu_map_read(0x1000), Some(20 * CHR_WINDOW));
        assert_eq!(mapper.ppu_map_read(0x1FFF), Some(34 * CHR_WINDOW - 1));

        // inversion moves the 1 kB windows to $0000
        mapper.cpu_map_write(0x8000, 0x80);
        assert_eq!(mapper.ppu_map_read(0x0000), Some(20 * CHR_WINDOW));
        assert_eq!(mapper.ppu_map_read(0x1000), Some(8 * CHR_WINDOW));
    }

    #[test]
    fn test_mirroring() {
        let mut mapper = mapper();
        mapper.cpu_map_write(0xA000, 1);
        assert_eq!(mapper.mirroring(), Some(Mirroring::Horizontal));
        mapper.cpu_map_write(0xA000, 0);
        assert_eq!(mapper.mirroring(), Some(Mirroring::Vertical));
    }

    #[test]
    fn test_scanline_irq() {
        let mut mapper = mapper();
        mapper.cpu_map_write(0xC000, 3); // latch
        mapper.cpu_map_write(0xC001, 0); // reload
        mapper.cpu_map_write(0xE001, 0); // enable

        // reload, 2, 1, 0
        for _ in 0..3 {
            mapper.scanline();
            assert!(!mapper.irq_pending());
        }
        mapper.scanline();
        assert!(mapper.irq_pending());

        mapper.irq_acknowledge();
        assert!(!mapper.irq_pending());

        // disabling also acknowledges
        for _ in 0..4 {
            mapper.scanline();
        }
        assert!(mapper.irq_pending());
        mapper.cpu_map_write(0xE000, 0);
        assert!(!mapper.irq_pending());
        for _ in 0..4 {
            mapper.scanline();
        }
        assert!(!mapper.irq_pending());
    }

    #[test]
    fn test_state_keeps_irq_counter() {
        let mut mapper = mapper();
        mapper.cpu_map_write(0xC000, 2);
        mapper.cpu_map_write(0xC001, 0);
        mapper.cpu_map_write(0xE001, 0);
        mapper.scanline();

        let mut restored = self::mapper();
        restored.load_state(&mapper.save_state());

        // counter at 2: two more scanlines raise the IRQ
        restored.scanline();
        assert!(!restored.irq_pending());
        restored.scanline();
        assert!(restored.irq_pending());
    }
}
