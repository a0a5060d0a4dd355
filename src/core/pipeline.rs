use crate::core::driver::{merge_places, DriverOptions, RegionQueryDriver};
use crate::core::grid::GridGenerator;
use crate::core::output::{render_csv, render_json, search_date_now};
use crate::domain::model::{GridTile, ScanResult, TileOutcome};
use crate::domain::ports::{ConfigProvider, OutputFormat, PlaceSearch, Pipeline, Storage};
use crate::utils::error::Result;

/// 依設定產生查詢網格
pub fn plan_tiles<C: ConfigProvider + ?Sized>(config: &C) -> Result<Vec<GridTile>> {
    GridGenerator::from_bounds(config.bounds()?)
        .with_max_radius_km(config.max_radius_km())
        .with_verbose(config.verbose())
        .generate_minimal_overlap_grid(config.tile_km(), config.overlap_ratio())
}

pub struct PlacesPipeline<S: Storage, C: ConfigProvider, P: PlaceSearch> {
    storage: S,
    config: C,
    driver: RegionQueryDriver<P>,
}

impl<S: Storage, C: ConfigProvider, P: PlaceSearch> PlacesPipeline<S, C, P> {
    pub fn new(storage: S, config: C, search: P) -> Self {
        let options = DriverOptions {
            place_types: config.place_types().to_vec(),
            request_delay: config.request_delay(),
            retry_attempts: config.retry_attempts(),
            verbose: config.verbose(),
        };
        Self {
            storage,
            config,
            driver: RegionQueryDriver::new(search, options),
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider, P: PlaceSearch> Pipeline for PlacesPipeline<S, C, P> {
    async fn extract(&self) -> Result<Vec<TileOutcome>> {
        let tiles = plan_tiles(&self.config)?;
        tracing::info!(
            "🚀 Querying {} tiles for types [{}]",
            tiles.len(),
            self.driver.options().place_types.join(", ")
        );
        Ok(self.driver.query_tiles(&tiles).await)
    }

    async fn transform(&self, outcomes: Vec<TileOutcome>) -> Result<ScanResult> {
        let result = merge_places(outcomes);
        tracing::debug!(
            "Merged {} raw places into {} unique places",
            result.raw_place_count,
            result.places.len()
        );
        if !result.failed_tiles.is_empty() {
            tracing::warn!(
                "⚠️ {} tiles failed: {}",
                result.failed_tiles.len(),
                result.failed_tiles.join(", ")
            );
        }
        if !result.incomplete_tiles.is_empty() {
            tracing::warn!(
                "⚠️ {} tiles hit the result cap, coverage is not proven complete: {}",
                result.incomplete_tiles.len(),
                result.incomplete_tiles.join(", ")
            );
        }
        Ok(result)
    }

    async fn load(&self, result: ScanResult) -> Result<String> {
        if result.places.is_empty() {
            tracing::warn!("No places found; check the API key and place types");
        }

        let search_date = search_date_now();
        let mut written = Vec::new();
        for format in self.config.output_formats()? {
            let filename = format!("{}.{}", self.config.output_stem(), format.extension());
            let data = match format {
                OutputFormat::Json => render_json(&result, &search_date)?,
                OutputFormat::Csv => render_csv(&result.places)?,
            };

            tracing::debug!("Writing {} ({} bytes) to storage", filename, data.len());
            self.storage.write_file(&filename, &data).await?;
            written.push(format!("{}/{}", self.config.output_path(), filename));
        }

        tracing::info!("💾 Saved {} places", result.places.len());
        Ok(written.join(", "))
    }
}
