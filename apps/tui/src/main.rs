//! Waymark TUI: browse a trip itinerary next to its map.
//!
//! Scrolling the step list moves the map to the step in view; clicking a
//! step pins it while the list scrolls there. Built with `ratatui` +
//! `crossterm`.

mod app;
mod screens;
mod widgets;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use waymark_shared::{CameraConfig, ScrollSpyConfig, load_config, load_config_from};

/// Snap-to-first-step distance, in rows.
const TOP_SNAP_ROWS: f64 = 2.0;

#[derive(Parser)]
#[command(name = "waymark-tui", version, about = "Browse a trip itinerary next to its map.")]
struct Args {
    /// Trip JSON (document, REST envelope or bare itinerary array).
    trip: PathBuf,

    /// Config file to use instead of ~/.waymark/waymark.toml.
    #[arg(long, env = "WAYMARK_CONFIG")]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    let trip = waymark_ingest::load_trip(&args.trip)
        .wrap_err_with(|| format!("cannot load trip '{}'", args.trip.display()))?;

    // The terminal list measures in rows, not pixels.
    let spy_config = ScrollSpyConfig {
        top_snap: TOP_SNAP_ROWS,
        ..ScrollSpyConfig::from(&config)
    };
    let app = app::App::new(
        &trip,
        spy_config,
        CameraConfig::from(&config),
        config.popup.excerpt_chars,
    );
    app::run(app)
}
