//! Shared types, error model, and configuration for Waymark.
//!
//! This crate is the foundation depended on by all other Waymark crates.
//! It provides:
//! - [`WaymarkError`], the unified error type
//! - Domain types ([`Trip`], [`ItineraryStep`], [`Coordinate`], [`StepId`])
//! - Configuration ([`AppConfig`], [`CameraConfig`], [`ScrollSpyConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CameraConfig, MapConfig, PopupConfig, ScrollSpyConfig, ScrollSpySection,
    TileSource, config_dir, config_file_path, init_config, load_config, load_config_from,
    tile_source, validate_config,
};
pub use error::{Result, WaymarkError};
pub use types::{
    Accommodation, ConnectionType, Coordinate, Country, GalleryItem, ItineraryStep, Media,
    Reference, StepId, StepKind, Transportation, TransportMethod, Trip,
};
