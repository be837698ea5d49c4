use std::env;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use log::info;

use nes_core::metrics::Collector;
use nes_core::{Cartridge, Nes, NesSettings};

const DEFAULT_FRAMES: u64 = 600;
const METRICS_INTERVAL: Duration = Duration::from_secs(1);

/// Headless runner: `nes-core <rom> [frames]`
fn main() -> Result<()> {
    env_logger::init();

    let mut args = env::args().skip(1);
    let Some(rom) = args.next() else {
        bail!("Usage: nes-core <rom.nes> [frames]");
    };
    let frames = match args.next() {
        Some(frames) => frames
            .parse::<u64>()
            .with_context(|| format!("Invalid frame count '{frames}'"))?,
        None => DEFAULT_FRAMES,
    };

    let settings = NesSettings {
        save_directory: env::var_os("NES_SAVE_DIR").map(PathBuf::from),
        ..NesSettings::default()
    };

    let cartridge =
        Cartridge::new(&rom).with_context(|| format!("Unable to load cartridge '{rom}'"))?;
    let mut nes = Nes::new(cartridge, settings);

    let mut collector = Collector::new();
    let mut last_report = Instant::now();
    let mut last_cycles = nes.cpu_cycles();

    for _ in 0..frames {
        nes.run_frame();
        collector.observe_frame_ready();

        if last_report.elapsed() >= METRICS_INTERVAL {
            collector.observe_cpu_cycles(nes.cpu_cycles() - last_cycles);
            last_cycles = nes.cpu_cycles();

            let metrics = collector.collect();
            info!(
                "{} FPS, CPU at {:.3} MHz",
                metrics.frames_per_second,
                metrics.cpu_frequency as f64 / 1_000_000.0
            );
            last_report = Instant::now();
        }

        if nes.cpu().halted() {
            info!("CPU halted at ${:04X}", nes.cpu_registers().pc);
            break;
        }
    }

    info!(
        "Ran {} frames, {} CPU cycles",
        nes.ppu().frame_count(),
        nes.cpu_cycles()
    );
    nes.shutdown().context("Unable to save battery RAM")?;

    Ok(())
}
