use crate::utils::error::{Result, ScanError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const MIN_LAT: f64 = -90.0;
pub const MAX_LAT: f64 = 90.0;
pub const MIN_LNG: f64 = -180.0;
pub const MAX_LNG: f64 = 180.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// 查詢範圍，建立後不可變更
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    north: f64,
    south: f64,
    east: f64,
    west: f64,
}

impl BoundingBox {
    pub fn new(north: f64, south: f64, east: f64, west: f64) -> Result<Self> {
        let all_finite = [north, south, east, west].iter().all(|v| v.is_finite());
        let lat_ok = (MIN_LAT..=MAX_LAT).contains(&north) && (MIN_LAT..=MAX_LAT).contains(&south);
        let lng_ok = (MIN_LNG..=MAX_LNG).contains(&east) && (MIN_LNG..=MAX_LNG).contains(&west);

        if !all_finite || !lat_ok || !lng_ok {
            return Err(ScanError::InvalidBounds {
                message: format!(
                    "coordinates out of range (north={}, south={}, east={}, west={})",
                    north, south, east, west
                ),
            });
        }
        if north <= south || east <= west {
            return Err(ScanError::InvalidBounds {
                message: format!(
                    "north must exceed south and east must exceed west (north={}, south={}, east={}, west={})",
                    north, south, east, west
                ),
            });
        }

        Ok(Self {
            north,
            south,
            east,
            west,
        })
    }

    pub fn north(&self) -> f64 {
        self.north
    }

    pub fn south(&self) -> f64 {
        self.south
    }

    pub fn east(&self) -> f64 {
        self.east
    }

    pub fn west(&self) -> f64 {
        self.west
    }

    pub fn lat_span(&self) -> f64 {
        self.north - self.south
    }

    pub fn lng_span(&self) -> f64 {
        self.east - self.west
    }

    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        (self.south..=self.north).contains(&latitude) && (self.west..=self.east).contains(&longitude)
    }
}

/// 單一圓形搜尋網格
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridTile {
    pub name: String,
    pub center: Coordinate,
    pub radius_meters: u32,
    pub row: usize,
    pub col: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceRecord {
    pub id: String,
    pub name: String,
    pub place_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub rating: Option<f64>,
    pub types: Vec<String>,
    #[serde(rename = "addressComponents")]
    pub address_components: BTreeMap<String, String>,
}

/// 單次搜尋結果；`possibly_incomplete` 表示回傳筆數已達 API 上限
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchOutcome {
    pub places: Vec<PlaceRecord>,
    pub possibly_incomplete: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TileStatus {
    Complete,
    PossiblyIncomplete,
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TileOutcome {
    pub tile_name: String,
    pub places: Vec<PlaceRecord>,
    pub status: TileStatus,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanResult {
    pub places: Vec<PlaceRecord>,
    pub tiles_queried: usize,
    pub raw_place_count: usize,
    pub failed_tiles: Vec<String>,
    pub incomplete_tiles: Vec<String>,
}
