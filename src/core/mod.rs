pub mod driver;
pub mod engine;
pub mod grid;
pub mod output;
pub mod pipeline;

pub use crate::domain::model::{GridTile, PlaceRecord, ScanResult, TileOutcome};
pub use crate::domain::ports::{ConfigProvider, PlaceSearch, Pipeline, Storage};
pub use crate::utils::error::Result;
