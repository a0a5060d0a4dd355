use crate::domain::model::{BoundingBox, Coordinate, ScanResult, SearchOutcome, TileOutcome};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Csv,
}

impl OutputFormat {
    pub const NAMES: [&'static str; 2] = ["json", "csv"];

    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "csv" => Some(OutputFormat::Csv),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }
}

pub trait ConfigProvider: Send + Sync {
    fn bounds(&self) -> Result<BoundingBox>;
    fn tile_km(&self) -> f64;
    fn overlap_ratio(&self) -> f64;
    fn max_radius_km(&self) -> f64;
    fn place_types(&self) -> &[String];
    fn request_delay(&self) -> Duration;
    fn retry_attempts(&self) -> u32;
    fn output_path(&self) -> &str;
    /// 輸出檔名（不含副檔名）
    fn output_stem(&self) -> &str;
    /// 未知的格式名稱回傳錯誤，不會被略過
    fn output_formats(&self) -> Result<Vec<OutputFormat>>;
    fn verbose(&self) -> bool;
}

/// 外部地點搜尋能力
#[async_trait]
pub trait PlaceSearch: Send + Sync {
    async fn search(
        &self,
        center: Coordinate,
        radius_meters: u32,
        place_types: &[String],
    ) -> Result<SearchOutcome>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<TileOutcome>>;
    async fn transform(&self, outcomes: Vec<TileOutcome>) -> Result<ScanResult>;
    async fn load(&self, result: ScanResult) -> Result<String>;
}
