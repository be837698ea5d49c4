use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;
pub const DEFAULT_BATTERY_SAVE_INTERVAL: Duration = Duration::from_secs(10);

/// NES configuration options
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NesSettings {
    /// Host audio sample rate in Hz. Sets how many PPU clocks go by between
    /// two audio samples
    pub sample_rate: u32,

    /// Wall clock time between two battery RAM saves
    pub battery_save_interval: Duration,

    /// Where battery RAM is persisted, as `<cartridge name>.sav`. `None`
    /// disables persistence
    pub save_directory: Option<PathBuf>,
}

impl Default for NesSettings {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            battery_save_interval: DEFAULT_BATTERY_SAVE_INTERVAL,
            save_directory: None,
        }
    }
}
