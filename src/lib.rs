pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::GooglePlacesClient;
pub use config::cli::LocalStorage;
pub use config::toml_config::TomlConfig;
pub use core::driver::{merge_places, DriverOptions, RegionQueryDriver};
pub use core::engine::ScanEngine;
pub use core::grid::GridGenerator;
pub use core::pipeline::{plan_tiles, PlacesPipeline};
pub use domain::model::{BoundingBox, Coordinate, GridTile, PlaceRecord, ScanResult, SearchOutcome};
pub use utils::error::{Result, ScanError};
