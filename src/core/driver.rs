use crate::domain::model::{GridTile, PlaceRecord, ScanResult, TileOutcome, TileStatus};
use crate::domain::ports::PlaceSearch;
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct DriverOptions {
    pub place_types: Vec<String>,
    /// 兩次 API 呼叫之間固定等待的時間
    pub request_delay: Duration,
    /// 失敗時額外重試次數，0 表示不重試
    pub retry_attempts: u32,
    pub verbose: bool,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            place_types: Vec::new(),
            request_delay: DEFAULT_REQUEST_DELAY,
            retry_attempts: 0,
            verbose: false,
        }
    }
}

/// 依網格順序逐一查詢，單一網格失敗不會中斷整體掃描
pub struct RegionQueryDriver<P: PlaceSearch> {
    search: P,
    options: DriverOptions,
}

impl<P: PlaceSearch> RegionQueryDriver<P> {
    pub fn new(search: P, options: DriverOptions) -> Self {
        Self { search, options }
    }

    pub fn options(&self) -> &DriverOptions {
        &self.options
    }

    pub async fn query_tiles(&self, tiles: &[GridTile]) -> Vec<TileOutcome> {
        let mut outcomes = Vec::with_capacity(tiles.len());

        for (index, tile) in tiles.iter().enumerate() {
            if index > 0 {
                self.pause().await;
            }
            tracing::info!(
                "🔎 [{}/{}] Querying {} at ({:.4}, {:.4}) radius {} m",
                index + 1,
                tiles.len(),
                tile.name,
                tile.center.latitude,
                tile.center.longitude,
                tile.radius_meters
            );
            let outcome = self.query_tile(tile).await;
            tracing::info!("   {} places found in {}", outcome.places.len(), tile.name);
            outcomes.push(outcome);
        }

        outcomes
    }

    async fn pause(&self) {
        if !self.options.request_delay.is_zero() {
            tokio::time::sleep(self.options.request_delay).await;
        }
    }

    async fn query_tile(&self, tile: &GridTile) -> TileOutcome {
        let mut attempt = 0;
        loop {
            let result = self
                .search
                .search(tile.center, tile.radius_meters, &self.options.place_types)
                .await;

            match result {
                Ok(outcome) => {
                    if self.options.verbose {
                        for place in &outcome.places {
                            tracing::info!("   📍 {} ({})", place.name, place.id);
                        }
                    }
                    let status = if outcome.possibly_incomplete {
                        tracing::warn!(
                            "⚠️ {} returned {} places, the API cap; results may be incomplete, consider a smaller tile size",
                            tile.name,
                            outcome.places.len()
                        );
                        TileStatus::PossiblyIncomplete
                    } else {
                        TileStatus::Complete
                    };
                    return TileOutcome {
                        tile_name: tile.name.clone(),
                        places: outcome.places,
                        status,
                    };
                }
                Err(e) if attempt < self.options.retry_attempts => {
                    attempt += 1;
                    tracing::warn!(
                        "🔁 {} failed ({}), retry {}/{}",
                        tile.name,
                        e,
                        attempt,
                        self.options.retry_attempts
                    );
                    self.pause().await;
                }
                Err(e) => {
                    tracing::warn!("❌ {} failed, skipping tile: {}", tile.name, e);
                    return TileOutcome {
                        tile_name: tile.name.clone(),
                        places: Vec::new(),
                        status: TileStatus::Failed {
                            reason: e.to_string(),
                        },
                    };
                }
            }
        }
    }
}

/// 依地點 id 去重：保留第一次出現的位置，內容以最後一次為準
pub fn merge_places(outcomes: Vec<TileOutcome>) -> ScanResult {
    let mut result = ScanResult {
        tiles_queried: outcomes.len(),
        ..ScanResult::default()
    };
    let mut index_by_id: HashMap<String, usize> = HashMap::new();

    for outcome in outcomes {
        match &outcome.status {
            TileStatus::Complete => {}
            TileStatus::PossiblyIncomplete => result.incomplete_tiles.push(outcome.tile_name.clone()),
            TileStatus::Failed { .. } => result.failed_tiles.push(outcome.tile_name.clone()),
        }

        result.raw_place_count += outcome.places.len();
        for place in outcome.places {
            upsert(&mut result.places, &mut index_by_id, place);
        }
    }

    result
}

fn upsert(places: &mut Vec<PlaceRecord>, index_by_id: &mut HashMap<String, usize>, place: PlaceRecord) {
    match index_by_id.get(&place.id) {
        Some(&index) => places[index] = place,
        None => {
            index_by_id.insert(place.id.clone(), places.len());
            places.push(place);
        }
    }
}
