//! NES emulator core
//!
//! Ricoh 2A03 CPU, 2C02 PPU and the main bus clocking them against a
//! cartridge. Frontends feed controller input and pull frames and audio
//! samples, see [`Nes`] and [`SharedNes`].

pub mod audio;
pub mod cartridge;
pub mod controller;
pub mod dma;
pub mod errors;
pub mod graphics;
pub mod hardware;
pub mod interfaces;
pub mod mappers;
pub mod metrics;
pub mod nes;
pub mod processor;
pub mod settings;
pub mod shared;
pub mod state;
pub mod types;
pub mod utils;

pub use cartridge::Cartridge;
pub use controller::Buttons;
pub use errors::{CartridgeError, NesError, SaveStateError};
pub use graphics::{Frame, Pixel};
pub use nes::Nes;
pub use settings::NesSettings;
pub use shared::{SharedNes, Snapshot};
pub use state::CONSOLE_STATE_SIZE;
