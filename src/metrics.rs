//! This module provides a way to gather metrics for the NES
//!

use std::time::Duration;
use std::time::Instant;

use log::debug;

#[derive(Debug)]
struct RawMetrics {
    record_start: Instant,
    frames_rendered: usize,
    cpu_cycles: u64,
}

#[derive(Debug)]
pub struct Metrics {
    pub recorded_time: Duration,
    pub frames_per_second: usize,
    /// Emulated CPU frequency in Hz
    pub cpu_frequency: u64,
}

pub struct Collector {
    collecting: RawMetrics,
}

impl Collector {
    pub fn new() -> Self {
        Self {
            collecting: RawMetrics {
                record_start: Instant::now(),
                frames_rendered: 0,
                cpu_cycles: 0,
            },
        }
    }

    pub fn collect(&mut self) -> Metrics {
        debug!("Raw metrics: {:?}", self.collecting);
        let recorded_time = Instant::now() - self.collecting.record_start;
        let micros = recorded_time.as_micros().max(1);

        let frames_per_second = (self.collecting.frames_rendered as u128) * 1_000_000 / micros;
        let cpu_frequency = (self.collecting.cpu_cycles as u128) * 1_000_000 / micros;

        let metrics = Metrics {
            recorded_time,
            frames_per_second: frames_per_second as usize,
            cpu_frequency: cpu_frequency as u64,
        };

        self.collecting.record_start = Instant::now();
        self.collecting.frames_rendered = 0;
        self.collecting.cpu_cycles = 0;

        metrics
    }

    pub fn observe_frame_ready(&mut self) {
        self.collecting.frames_rendered += 1;
    }

    pub fn observe_cpu_cycles(&mut self, cycles: u64) {
        self.collecting.cpu_cycles += cycles;
    }
}

impl Default for Collector {
    fn default() -> Self {
        Self::new()
    }
}
