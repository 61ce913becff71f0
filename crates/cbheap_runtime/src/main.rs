//! Constant Buffer Heap Runtime
//!
//! Drives the heap through a simulated renderer: parallel per-object
//! uploads on the host timeline, a device timeline lagging behind.
//!
//! Usage: `cbheap [settings.json]`

mod frame_loop;
mod settings;

use anyhow::Result;
use cbheap_core::HostDevice;
use settings::RuntimeSettings;
use std::sync::Arc;

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    tracing::info!("Constant buffer heap runtime v{}", cbheap_core::VERSION);

    let settings = match std::env::args().nth(1) {
        Some(path) => {
            tracing::info!("Loading settings from {path}");
            RuntimeSettings::load(&path)?
        }
        None => RuntimeSettings::default(),
    };

    let device = Arc::new(HostDevice::new());
    let summary = frame_loop::run(device.clone(), &settings)?;

    tracing::info!(
        frames = summary.frames,
        uploads = summary.uploads,
        standard_pages = summary.final_stats.standard_pages,
        large_pages = summary.final_stats.large_pages,
        frame_bytes_avg = summary.final_stats.frame_bytes_average,
        frame_bytes_peak = summary.final_stats.frame_bytes_peak,
        avg_record_us = summary.average_record_us,
        peak_record_us = summary.peak_record_us,
        "simulation finished"
    );

    let resources = device.stats();
    anyhow::ensure!(
        resources.live == 0 && resources.double_releases == 0,
        "resource leak or double release: {resources:?}"
    );
    tracing::info!(
        created = resources.created,
        released = resources.released,
        "all upload resources released"
    );

    Ok(())
}
