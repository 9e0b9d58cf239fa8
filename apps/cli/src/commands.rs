//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};
use tracing::info;
use waymark_core::map_model::MapModel;
use waymark_core::replay::{self, ReplayReport};
use waymark_core::{build_route, project_markers};
use waymark_shared::{
    AppConfig, CameraConfig, ScrollSpyConfig, Trip, init_config, load_config, load_config_from,
    tile_source,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Waymark: put a trip itinerary on the map.
#[derive(Parser)]
#[command(
    name = "waymark",
    version,
    about = "Resolve itinerary coordinates, lay out routes and replay map focus sessions.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.waymark/waymark.toml.
    #[arg(long, global = true, env = "WAYMARK_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// List the markers, route legs and side-trip connectors of a trip.
    Markers {
        /// Trip JSON (document, REST envelope or bare itinerary array).
        trip: PathBuf,
    },

    /// Export the trip map as a GeoJSON FeatureCollection.
    Render {
        /// Trip JSON file.
        trip: PathBuf,

        /// Write to this file instead of stdout.
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Replay a scroll/click event script through the focus controllers.
    Simulate {
        /// Trip JSON file.
        trip: PathBuf,

        /// Event script JSON file.
        events: PathBuf,

        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr so command
/// output on stdout stays machine-readable.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "waymark=info",
        1 => "waymark=debug",
        _ => "waymark=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.clone();
    match cli.command {
        Command::Markers { trip } => cmd_markers(&trip).await,
        Command::Render { trip, out } => {
            let config = resolve_config(config_path.as_deref())?;
            cmd_render(&trip, out.as_deref(), &config).await
        }
        Command::Simulate { trip, events, json } => {
            let config = resolve_config(config_path.as_deref())?;
            cmd_simulate(&trip, &events, json, &config).await
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show(config_path.as_deref()).await,
        },
    }
}

fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(p) => load_config_from(p)?,
        None => load_config()?,
    };
    Ok(config)
}

async fn read_trip(path: &Path) -> Result<Trip> {
    let content = tokio::fs::read_to_string(path)
        .await
        .wrap_err_with(|| format!("cannot read trip file '{}'", path.display()))?;
    let trip = waymark_ingest::parse_trip(&content)?;
    info!(path = %path.display(), title = %trip.title, steps = trip.steps.len(), "trip loaded");
    Ok(trip)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_markers(path: &Path) -> Result<()> {
    let trip = read_trip(path).await?;
    let markers = project_markers(&trip.steps);
    let route = build_route(&markers);

    println!();
    println!("  {}", trip.title);
    if let Some(country) = trip.country_name() {
        println!("  Country: {country}");
    }
    if let Some(days) = trip.day_count() {
        println!("  Days:    {days}");
    }
    println!(
        "  Steps:   {} ({} on the map)",
        trip.steps.len(),
        markers.len()
    );
    println!();

    for (index, step) in trip.steps.iter().enumerate() {
        let position = step
            .location
            .map(|c| c.to_string())
            .unwrap_or_else(|| "(not mapped)".into());
        println!("  {index:>3}  {:<10} {:<28} {position}", step.badge(), step.name);
    }

    if !route.segments.is_empty() {
        println!();
        println!("  Route legs:");
        for segment in &route.segments {
            let mode = segment
                .transport
                .map(|m| format!("{} {}", m.glyph(), m.label()))
                .unwrap_or_else(|| "?".into());
            println!(
                "    {:>3} → {:<3}  {:>8.1} km  {mode}",
                segment.from_index, segment.to_index, segment.distance_km
            );
        }
        println!("    total        {:>8.1} km", route.total_distance_km());
    }

    if !route.connectors.is_empty() {
        println!();
        println!("  Side trips:");
        for connector in &route.connectors {
            println!(
                "    {:>3} ⇢ {:<3}  {}",
                connector.anchor_index,
                connector.side_trip_index,
                trip.steps[connector.side_trip_index].name
            );
        }
    }
    println!();

    Ok(())
}

async fn cmd_render(path: &Path, out: Option<&Path>, config: &AppConfig) -> Result<()> {
    let trip = read_trip(path).await?;
    let model = MapModel::build(&trip, config, tile_source(config));
    let json = serde_json::to_string_pretty(&model)?;

    match out {
        Some(out) => {
            tokio::fs::write(out, json)
                .await
                .wrap_err_with(|| format!("cannot write '{}'", out.display()))?;
            info!(path = %out.display(), features = model.features.len(), "map written");
            println!("Map written to: {}", out.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

async fn cmd_simulate(
    trip_path: &Path,
    events_path: &Path,
    json: bool,
    config: &AppConfig,
) -> Result<()> {
    let trip = read_trip(trip_path).await?;
    let script_text = tokio::fs::read_to_string(events_path)
        .await
        .wrap_err_with(|| format!("cannot read event script '{}'", events_path.display()))?;
    let script = replay::parse_script(&script_text)?;

    if let Some(bad) = script.events.iter().find_map(|e| match e.action {
        replay::Action::Click { index } if index >= trip.steps.len() => Some(index),
        _ => None,
    }) {
        return Err(eyre!(
            "event script clicks step {bad}, but the trip has only {} steps",
            trip.steps.len()
        ));
    }

    let report = replay::replay(
        &trip,
        &script,
        ScrollSpyConfig::from(config),
        CameraConfig::from(config),
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&trip, &report);
    }
    Ok(())
}

fn print_report(trip: &Trip, report: &ReplayReport) {
    println!();
    if let Some(view) = &report.initial_view {
        println!("  initial view: {view:?}");
    }
    for entry in &report.entries {
        let active = entry
            .active
            .map(|i| format!("{i} {}", trip.steps[i].name))
            .unwrap_or_else(|| "-".into());
        let pin = if entry.pinned { " [pinned]" } else { "" };
        let camera = entry
            .camera
            .map(|c| format!("  camera: {c:?}"))
            .unwrap_or_default();
        println!(
            "  {:>6}ms  {:<6}  active: {active}{pin}{camera}",
            entry.at_ms, entry.event
        );
    }
    println!();
    println!(
        "  {} camera moves ({} focus flights)",
        report.camera_moves.len(),
        report.fly_count()
    );
    println!();
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show(path: Option<&Path>) -> Result<()> {
    let config = resolve_config(path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_simulate_with_global_flags() {
        let cli = Cli::try_parse_from([
            "waymark",
            "-vv",
            "simulate",
            "trip.json",
            "events.json",
            "--json",
        ])
        .expect("parse");
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Command::Simulate { json: true, .. }));
    }
}
