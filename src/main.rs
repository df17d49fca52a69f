// src/main.rs
mod config;
mod drivers;
mod gui;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use crate::config::ChartConfig;
use crate::drivers::dataset::ecg_table;
use crate::drivers::{
    render_tracks_png, spawn_surface, LayoutRenderer, PlotStyle, SampleSource, SurfaceController,
};
#[derive(Parser, Debug)]
#[command(name = "ecg-sweep")]
#[command(about = "Stacked multi-track ECG sweep chart with bounded per-track memory")]
struct Cli {
    /// JSON chart configuration (camelCase keys); built-in defaults when omitted
    config: Option<PathBuf>,
    /// Run without a window and write a PNG of the tracks to this path
    #[arg(long)]
    snapshot: Option<PathBuf>,
    /// Ticks to run before taking the headless snapshot
    #[arg(long, default_value_t = 100)]
    ticks: u64,
    /// Where the window's snapshot button writes its PNG
    #[arg(long, default_value = "ecg-sweep-snapshot.png")]
    snapshot_path: PathBuf,
}
fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => ChartConfig::load(path)?,
        None => ChartConfig::default(),
    };
    match &cli.snapshot {
        Some(out) => run_headless(config, out, cli.ticks),
        None => gui::run(config, cli.snapshot_path),
    }
}
fn run_headless(config: ChartConfig, out: &Path, ticks: u64) -> Result<()> {
    let table = ecg_table()?;
    let value_range = table.value_range();
    let pending = spawn_surface(LayoutRenderer, &config.container_id);
    let mut controller = SurfaceController::new(config, table, pending)?;
    controller.wait_until_ready()?;
    controller.start()?;
    while controller.scheduler().ticks() < ticks {
        if let Some(wait) = controller.time_until_next_tick() {
            thread::sleep(wait);
        }
        controller.poll()?;
    }
    controller.stop();
    let png = render_tracks_png(&controller.tracks(), value_range, &PlotStyle::default())?;
    fs::write(out, png).with_context(|| format!("writing snapshot {}", out.display()))?;
    info!("wrote {} after {} ticks", out.display(), ticks);
    controller.teardown();
    Ok(())
}
