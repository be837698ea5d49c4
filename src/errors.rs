//! NES errors
//!
//! All errors NES can produce. Emulation itself never fails: out of range
//! addresses are mirrored and every opcode is defined. Errors only come from
//! the outside world, loading cartridges, persisting battery RAM or restoring
//! save states.

use std::path::PathBuf;

use thiserror::Error;

/// NES error type
///
/// All NES errors are encapsuled inside this error type
#[derive(Debug, Error)]
pub enum NesError {
    #[error("Cartridge error: {0}")]
    Cartridge(#[from] CartridgeError),

    #[error("Unable to persist battery RAM to '{}': {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Save state error: {0}")]
    SaveState(#[from] SaveStateError),
}

/// Cartridge load errors. A cartridge either loads completely or not at all
#[derive(Debug, Error)]
pub enum CartridgeError {
    #[error("Unable to read cartridge: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid iNES magic number {0:02X?}")]
    InvalidMagic([u8; 4]),

    #[error("Truncated cartridge {section}: expected {expected} bytes but only {actual} available")]
    Truncated {
        section: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Mapper {0} not implemented")]
    UnsupportedMapper(u8),
}

/// Save state errors
#[derive(Debug, Error)]
pub enum SaveStateError {
    #[error("Save state has {actual} bytes but {expected} were expected")]
    WrongSize { expected: usize, actual: usize },
}
