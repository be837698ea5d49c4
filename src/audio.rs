//! Audio
//!
//! The console only talks to an [`AudioSource`]: register writes and reads
//! in $4000-$4013 and $4015 are forwarded to it, it gets clocked along with
//! the CPU and a sample is pulled every time a host sample boundary is
//! crossed. [`Silence`] is the source used when no sound chip is emulated.

use crate::hardware::PPU_CLOCK_HZ;

pub trait AudioSource: Send + Sync {
    /// Register read ($4000-$4013, $4015)
    fn cpu_read(&mut self, address: u16) -> u8;

    /// Register write ($4000-$4013, $4015)
    fn cpu_write(&mut self, address: u16, data: u8);

    /// Advance one CPU cycle
    fn clock(&mut self);

    /// Current output level, between -1.0 and 1.0
    fn sample(&self) -> f32;

    fn reset(&mut self);
}

/// An audio source with nothing to say
#[derive(Clone, Copy, Debug, Default)]
pub struct Silence;

impl AudioSource for Silence {
    fn cpu_read(&mut self, _address: u16) -> u8 {
        0
    }

    fn cpu_write(&mut self, _address: u16, _data: u8) {}

    fn clock(&mut self) {}

    fn sample(&self) -> f32 {
        0.0
    }

    fn reset(&mut self) {}
}

/// Accumulates emulated time per PPU clock and signals when a host sample
/// period has gone by
#[derive(Clone, Debug)]
pub struct SampleClock {
    time_per_sample: f64,
    time_per_clock: f64,
    elapsed: f64,
}

impl SampleClock {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            time_per_sample: 1.0 / sample_rate.max(1) as f64,
            time_per_clock: 1.0 / PPU_CLOCK_HZ,
            elapsed: 0.0,
        }
    }

    /// Count one PPU clock. Returns true when a sample is due
    pub fn tick(&mut self) -> bool {
        self.elapsed += self.time_per_clock;
        if self.elapsed >= self.time_per_sample {
            self.elapsed -= self.time_per_sample;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
    }
}
