use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::errors::{CartridgeError, NesError};
use crate::mappers::{mapper_map, MappedRead, Mapper, MapperSpecs, Mirroring};
use crate::mappers::{CHR_BANK_SIZE, PRG_BANK_SIZE, PRG_RAM_SIZE};
use crate::utils::bv;

const HEADER_SIZE: usize = 16;
const TRAINER_SIZE: usize = 512;
const INES_MAGIC: [u8; 4] = [0x4E, 0x45, 0x53, 0x1A]; // "NES" + MS-DOS EOF

pub struct Cartridge {
    name: String,
    header: CartridgeHeader,

    // Program memory (ROM)
    program_rom: Vec<u8>,

    // Character memory, stores patterns and graphics for the PPU. CHR ROM
    // from the image, or a single 8 kB bank of CHR RAM when the image has none
    character_memory: Vec<u8>,
    character_ram: bool,

    mapper: Box<dyn Mapper>,
}

impl Cartridge {
    /// Create a new cartridge loading the contents from a iNES file.
    ///
    /// Read more about iNES ROM file format in:
    /// https://www.nesdev.org/wiki/INES
    ///
    /// NES2.0 file format is not implemented.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, CartridgeError> {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| String::from("cartridge"));

        let contents = fs::read(path)?;
        Self::from_bytes(name, &contents)
    }

    /// Create a cartridge from an in-memory iNES image
    pub fn from_bytes(name: impl Into<String>, contents: &[u8]) -> Result<Self, CartridgeError> {
        let name = name.into();

        let header_bytes: &[u8; HEADER_SIZE] = contents
            .get(..HEADER_SIZE)
            .and_then(|bytes| bytes.try_into().ok())
            .ok_or(CartridgeError::Truncated {
                section: "header",
                expected: HEADER_SIZE,
                actual: contents.len(),
            })?;

        let header = CartridgeHeader::parse(header_bytes)?;
        debug!("Header: {header:#?}");

        let mut offset = HEADER_SIZE;

        // Trainer content is skipped, no supported mapper uses it
        if header.trainer {
            offset += TRAINER_SIZE;
        }

        let program_size = header.program_banks * PRG_BANK_SIZE;
        let program_rom = take(contents, offset, program_size, "PRG ROM")?.to_vec();
        offset += program_size;

        let character_size = header.character_banks * CHR_BANK_SIZE;
        let character_rom = take(contents, offset, character_size, "CHR ROM")?;
        offset += character_size;

        let character_ram = character_rom.is_empty();
        let character_memory = if character_ram {
            vec![0; CHR_BANK_SIZE]
        } else {
            character_rom.to_vec()
        };

        if contents.len() > offset {
            debug!(
                "Ignoring {} trailing bytes in '{name}'",
                contents.len() - offset
            );
        }

        let mapper = mapper_map(
            header.mapper,
            MapperSpecs {
                program_banks: header.program_banks,
                character_banks: header.character_banks.max(1),
                program_ram_size: header.program_ram_size,
            },
        )?;

        info!(
            "Inserted cartridge '{name}' (mapper {}, {} kB PRG, {} kB CHR {}{})",
            header.mapper,
            program_size / 1024,
            character_memory.len() / 1024,
            if character_ram { "RAM" } else { "ROM" },
            if header.battery { ", battery" } else { "" }
        );

        Ok(Self {
            name,
            header,
            program_rom,
            character_memory,
            character_ram,
            mapper,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mapper_number(&self) -> u8 {
        self.header.mapper
    }

    /// The cartridge has no CHR ROM, pattern tables are writable RAM banked
    /// by the mapper
    pub fn character_ram(&self) -> bool {
        self.character_ram
    }

    // Main bus access

    /// Read through the mapper. `None` means the cartridge doesn't drive the
    /// bus for `address`
    pub fn cpu_read(&self, address: u16) -> Option<u8> {
        match self.mapper.cpu_map_read(address)? {
            MappedRead::Program(offset) => {
                let data = self.program_rom.get(offset % self.program_rom.len().max(1));
                Some(data.copied().unwrap_or(0))
            }
            MappedRead::Data(data) => Some(data),
        }
    }

    pub fn cpu_write(&mut self, address: u16, data: u8) -> bool {
        self.mapper.cpu_map_write(address, data)
    }

    // Graphics bus access

    /// Pattern table read as done by the PPU, mappers watching PPU fetches
    /// see it
    pub fn ppu_read(&mut self, address: u16) -> Option<u8> {
        let data = self.ppu_peek(address);
        self.mapper.ppu_access(address);
        data
    }

    /// Pattern table read without notifying the mapper
    pub fn ppu_peek(&self, address: u16) -> Option<u8> {
        let offset = self.mapper.ppu_map_read(address)?;
        self.character_memory
            .get(offset % self.character_memory.len())
            .copied()
    }

    /// Pattern table write. Lands in the currently mapped CHR RAM bank, CHR
    /// ROM ignores it. Returns whether memory changed
    pub fn ppu_write(&mut self, address: u16, data: u8) -> bool {
        if !self.character_ram {
            return false;
        }
        let Some(offset) = self.mapper.ppu_map_read(address) else {
            return false;
        };

        let len = self.character_memory.len();
        self.character_memory[offset % len] = data;
        true
    }

    /// Current nametable mirroring, mapper controlled or hardwired
    pub fn mirroring(&self) -> Mirroring {
        self.mapper.mirroring().unwrap_or(self.header.mirroring)
    }

    // Interrupts

    pub fn irq_pending(&self) -> bool {
        self.mapper.irq_pending()
    }

    pub fn irq_acknowledge(&mut self) {
        self.mapper.irq_acknowledge();
    }

    pub fn scanline(&mut self) {
        self.mapper.scanline();
    }

    pub fn reset(&mut self) {
        self.mapper.reset();
    }

    // Save states

    /// Mapper registers and PRG RAM followed by CHR RAM, if any
    pub fn save_state(&self) -> Vec<u8> {
        let mut state = self.mapper.save_state();
        if self.character_ram {
            state.extend_from_slice(&self.character_memory);
        }
        state
    }

    /// Length of [`Cartridge::save_state`], fixed for a given cartridge
    pub fn state_size(&self) -> usize {
        let character_ram = if self.character_ram {
            self.character_memory.len()
        } else {
            0
        };
        self.mapper.save_state().len() + character_ram
    }

    /// Restore a state of [`Cartridge::state_size`] bytes
    pub fn load_state(&mut self, state: &[u8]) {
        let character_ram = if self.character_ram {
            self.character_memory.len()
        } else {
            0
        };
        let split = state.len().saturating_sub(character_ram);
        let (mapper, character_memory) = state.split_at(split);

        self.mapper.load_state(mapper);
        if self.character_ram && character_memory.len() == self.character_memory.len() {
            self.character_memory.copy_from_slice(character_memory);
        }
    }

    // Battery backed RAM

    pub fn has_battery(&self) -> bool {
        self.header.battery
    }

    pub fn battery_ram(&self) -> Option<&[u8]> {
        if self.header.battery {
            self.mapper.battery_ram()
        } else {
            None
        }
    }

    pub fn load_battery_ram(&mut self, data: &[u8]) {
        self.mapper.load_battery_ram(data);
    }

    /// File where the battery RAM of this cartridge is persisted
    pub fn save_path(&self, directory: &Path) -> PathBuf {
        directory.join(format!("{}.sav", self.name))
    }

    /// Restore battery RAM saved in `directory`. A missing save is not an
    /// error
    pub fn load_battery(&mut self, directory: &Path) -> Result<(), NesError> {
        if !self.has_battery() {
            return Ok(());
        }

        let path = self.save_path(directory);
        match fs::read(&path) {
            Ok(data) => {
                info!("Loaded battery RAM from '{}'", path.display());
                self.load_battery_ram(&data);
                Ok(())
            }
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                debug!("No battery save at '{}'", path.display());
                Ok(())
            }
            Err(source) => Err(NesError::Persistence { path, source }),
        }
    }

    /// Persist battery RAM to `directory`
    pub fn save_battery(&self, directory: &Path) -> Result<(), NesError> {
        let Some(ram) = self.battery_ram() else {
            return Ok(());
        };

        let path = self.save_path(directory);
        fs::create_dir_all(directory)
            .and_then(|_| fs::write(&path, ram))
            .map_err(|source| NesError::Persistence {
                path: path.clone(),
                source,
            })?;

        info!("Saved battery RAM to '{}'", path.display());
        Ok(())
    }
}

impl std::fmt::Display for Cartridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

fn take<'a>(
    contents: &'a [u8],
    offset: usize,
    size: usize,
    section: &'static str,
) -> Result<&'a [u8], CartridgeError> {
    contents
        .get(offset..offset + size)
        .ok_or(CartridgeError::Truncated {
            section,
            expected: size,
            actual: contents.len().saturating_sub(offset),
        })
}

#[derive(Debug, Clone)]
struct CartridgeHeader {
    program_banks: usize,
    character_banks: usize,
    mirroring: Mirroring,

    // 512-byte trainer at 0x7000-0x71FF (stored before PRG data)
    trainer: bool,

    battery: bool,

    mapper: u8,

    program_ram_size: usize,
}

impl CartridgeHeader {
    fn parse(header: &[u8; HEADER_SIZE]) -> Result<Self, CartridgeError> {
        // (bytes 0-3) - NES cartridges start with ASCII "NES" and MS-DOS
        // end-of-file (0x1A)
        if header[0..4] != INES_MAGIC {
            return Err(CartridgeError::InvalidMagic([
                header[0], header[1], header[2], header[3],
            ]));
        }

        // (byte 4) - Size of PRG ROM in 16 KB units
        let program_banks = header[4] as usize;

        // (byte 5) - Size of CHR ROM in 8 KB units (0 means CHR RAM)
        let character_banks = header[5] as usize;

        // (byte 6) - Mapper, mirroring, battery, trainer
        let mut mirroring = if bv(header[6], 0) == 0 {
            Mirroring::Horizontal
        } else {
            Mirroring::Vertical
        };

        let battery = bv(header[6], 1) != 0;
        let trainer = bv(header[6], 2) != 0;

        if bv(header[6], 3) != 0 {
            warn!("Four-screen VRAM not supported, falling back to vertical mirroring");
            mirroring = Mirroring::Vertical;
        }

        // (byte 7) - Upper nibble of the mapper number
        let mapper = (header[7] & 0xF0) | ((header[6] & 0xF0) >> 4);
        debug!("Cartridge mapper: {mapper}");

        // (byte 8) - PRG RAM size in 8 kB units (0 infers for 8 kB)
        let program_ram_size = if header[8] > 0 {
            (header[8] as usize) * PRG_RAM_SIZE
        } else {
            PRG_RAM_SIZE
        };

        Ok(Self {
            program_banks,
            character_banks,
            mirroring,
            trainer,
            battery,
            mapper,
            program_ram_size,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build an iNES image. PRG bytes hold the low byte of their offset
    pub fn ines_image(mapper: u8, program_banks: u8, character_banks: u8, flags: u8) -> Vec<u8> {
        let mut image = vec![
            0x4E,
            0x45,
            0x53,
            0x1A,
            program_banks,
            character_banks,
            (mapper << 4) | (flags & 0x0F),
            mapper & 0xF0,
            0,
            0,
            0,
            0,
            0,
            0,
            0,
            0,
        ];
        if flags & 0x04 != 0 {
            image.extend(std::iter::repeat(0xEE).take(TRAINER_SIZE));
        }
        image.extend((0..program_banks as usize * PRG_BANK_SIZE).map(|i| i as u8));
        image.extend(std::iter::repeat(0xC0).take(character_banks as usize * CHR_BANK_SIZE));
        image
    }

    #[test]
    fn test_cartridge_from_bytes() {
        let cartridge = Cartridge::from_bytes("test", &ines_image(0, 2, 1, 0x01)).unwrap();

        assert_eq!(cartridge.name(), "test");
        assert_eq!(cartridge.mapper_number(), 0);
        assert_eq!(cartridge.mirroring(), Mirroring::Vertical);
        assert!(!cartridge.character_ram());
        assert_eq!(cartridge.cpu_read(0x8001), Some(0x01));
        assert_eq!(cartridge.cpu_read(0xC0FF), Some(0xFF));
        assert_eq!(cartridge.ppu_peek(0x0000), Some(0xC0));
        assert_eq!(cartridge.cpu_read(0x0000), None);
    }

    #[test]
    fn test_trainer_is_skipped() {
        let cartridge = Cartridge::from_bytes("trainer", &ines_image(0, 1, 0, 0x04)).unwrap();
        assert_eq!(cartridge.cpu_read(0x8002), Some(0x02));
        assert!(cartridge.character_ram());
        assert_eq!(cartridge.ppu_peek(0x0000), Some(0));
    }

    #[test]
    fn test_character_rom_is_read_only() {
        let mut cartridge = Cartridge::from_bytes("rom", &ines_image(0, 1, 1, 0)).unwrap();
        assert!(!cartridge.ppu_write(0x0010, 0x12));
        assert_eq!(cartridge.ppu_peek(0x0010), Some(0xC0));
    }

    #[test]
    fn test_character_ram_follows_mapper_banks() {
        // MMC1 with 8 kB CHR RAM, powers up in 4 kB CHR mode
        let mut cartridge = Cartridge::from_bytes("sxrom", &ines_image(1, 2, 0, 0)).unwrap();
        let select_bank_1 = |cartridge: &mut Cartridge, bank: u8| {
            for bit in 0..5 {
                cartridge.cpu_write(0xC000, (bank >> bit) & 1);
            }
        };

        // $1000 shows the first 4 kB of the chip
        select_bank_1(&mut cartridge, 0);
        assert!(cartridge.ppu_write(0x1010, 0x34));
        assert_eq!(cartridge.ppu_peek(0x0010), Some(0x34));

        // and then the second one
        select_bank_1(&mut cartridge, 1);
        assert_eq!(cartridge.ppu_peek(0x1010), Some(0x00));
        assert!(cartridge.ppu_write(0x1010, 0x56));
        assert_eq!(cartridge.ppu_peek(0x0010), Some(0x34));

        select_bank_1(&mut cartridge, 0);
        assert_eq!(cartridge.ppu_peek(0x1010), Some(0x34));
    }

    #[test]
    fn test_state_round_trip() {
        let image = ines_image(2, 4, 0, 0);
        let mut cartridge = Cartridge::from_bytes("uxrom", &image).unwrap();
        cartridge.cpu_write(0x8000, 0x02);
        cartridge.cpu_write(0x6001, 0x99);
        cartridge.ppu_write(0x1FFF, 0x77);

        let state = cartridge.save_state();
        // bank register, PRG RAM, CHR RAM
        assert_eq!(state.len(), 1 + PRG_RAM_SIZE + CHR_BANK_SIZE);
        assert_eq!(cartridge.state_size(), state.len());

        let mut restored = Cartridge::from_bytes("uxrom", &image).unwrap();
        restored.load_state(&state);
        assert_eq!(restored.save_state(), state);
        assert_eq!(restored.cpu_read(0x6001), Some(0x99));
        assert_eq!(restored.ppu_peek(0x1FFF), Some(0x77));
    }

    #[test]
    fn test_high_mapper_nibble() {
        let image = ines_image(66, 2, 1, 0);
        assert_eq!(image[6] >> 4, 2);
        assert_eq!(image[7], 0x40);
        let cartridge = Cartridge::from_bytes("gxrom", &image).unwrap();
        assert_eq!(cartridge.mapper_number(), 66);
    }

    #[test]
    fn test_invalid_magic() {
        let mut image = ines_image(0, 1, 1, 0);
        image[3] = 0x00;
        assert!(matches!(
            Cartridge::from_bytes("bad", &image),
            Err(CartridgeError::InvalidMagic([0x4E, 0x45, 0x53, 0x00]))
        ));
    }

    #[test]
    fn test_truncated_sections() {
        assert!(matches!(
            Cartridge::from_bytes("short", &[0x4E, 0x45]),
            Err(CartridgeError::Truncated {
                section: "header",
                ..
            })
        ));

        let mut image = ines_image(0, 2, 1, 0);
        image.truncate(HEADER_SIZE + PRG_BANK_SIZE);
        assert!(matches!(
            Cartridge::from_bytes("short", &image),
            Err(CartridgeError::Truncated {
                section: "PRG ROM",
                expected: 0x8000,
                actual: 0x4000,
            })
        ));

        let mut image = ines_image(0, 1, 1, 0);
        image.pop();
        assert!(matches!(
            Cartridge::from_bytes("short", &image),
            Err(CartridgeError::Truncated {
                section: "CHR ROM",
                ..
            })
        ));
    }

    #[test]
    fn test_unsupported_mapper() {
        assert!(matches!(
            Cartridge::from_bytes("mmc5", &ines_image(5, 1, 1, 0)),
            Err(CartridgeError::UnsupportedMapper(5))
        ));
    }

    #[test]
    fn test_four_screen_falls_back_to_vertical() {
        let cartridge = Cartridge::from_bytes("four", &ines_image(0, 1, 1, 0x08)).unwrap();
        assert_eq!(cartridge.mirroring(), Mirroring::Vertical);
    }

    #[test]
    fn test_battery_ram_only_with_battery() {
        let mut cartridge = Cartridge::from_bytes("no-battery", &ines_image(0, 1, 1, 0)).unwrap();
        assert!(cartridge.cpu_write(0x6000, 0x12));
        assert!(cartridge.battery_ram().is_none());

        let mut cartridge = Cartridge::from_bytes("battery", &ines_image(0, 1, 1, 0x02)).unwrap();
        cartridge.cpu_write(0x6000, 0x12);
        assert_eq!(cartridge.battery_ram().map(|ram| ram[0]), Some(0x12));
    }

    #[test]
    fn test_battery_persistence_round_trip() {
        let directory = std::env::temp_dir().join(format!("nes-core-test-{}", std::process::id()));

        let mut cartridge = Cartridge::from_bytes("persist", &ines_image(1, 2, 1, 0x02)).unwrap();
        cartridge.cpu_write(0x6010, 0xAB);
        cartridge.save_battery(&directory).unwrap();

        let mut restored = Cartridge::from_bytes("persist", &ines_image(1, 2, 1, 0x02)).unwrap();
        assert_eq!(restored.cpu_read(0x6010), Some(0));
        restored.load_battery(&directory).unwrap();
        assert_eq!(restored.cpu_read(0x6010), Some(0xAB));

        let _ = fs::remove_dir_all(&directory);
    }

    #[test]
    fn test_missing_battery_save_is_not_an_error() {
        let directory = std::env::temp_dir().join("nes-core-test-missing-save");
        let mut cartridge = Cartridge::from_bytes("never-saved", &ines_image(0, 1, 1, 0x02)).unwrap();
        assert!(cartridge.load_battery(&directory).is_ok());
    }
}
