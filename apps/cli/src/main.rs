//! Waymark CLI: inspect how a trip itinerary lands on the map.
//!
//! Lists markers and route legs, exports the map as GeoJSON, and replays
//! scroll/click sessions through the map synchronization controllers.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
