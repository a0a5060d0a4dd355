//! Grid generator
//!
//! Tiles a bounding box into overlapping circular search regions whose radius
//! stays within the search API's limit. Latitude steps are constant; the
//! longitude step is recomputed per row because meridians converge toward
//! the poles.

use crate::domain::model::{BoundingBox, Coordinate, GridTile, MAX_LAT, MAX_LNG, MIN_LAT};
use crate::utils::error::{Result, ScanError};

/// Places API Nearby Search 的最大半徑（公里）
pub const MAX_RADIUS_KM: f64 = 50.0;

pub const DEFAULT_OVERLAP_RATIO: f64 = 0.1;

/// 球體近似下每一緯度約 111 公里
pub const KM_PER_DEGREE: f64 = 111.0;

const CENTER_DECIMALS: i32 = 6;

/// Radius of the circle that contains a `tile_km` square, plus the overlap margin.
pub fn covering_radius_km(tile_km: f64, overlap_ratio: f64) -> f64 {
    let base_radius_km = tile_km * std::f64::consts::SQRT_2 / 2.0;
    base_radius_km + tile_km * overlap_ratio
}

/// Degrees of longitude spanned by one kilometer at `lat`.
pub fn lng_per_km_at_lat(lat: f64) -> f64 {
    1.0 / (KM_PER_DEGREE * lat.to_radians().cos())
}

/// Spreadsheet-style row label: 0 -> A, 25 -> Z, 26 -> AA.
pub fn row_label(row: usize) -> String {
    let mut letters = Vec::new();
    let mut n = row;
    loop {
        letters.push(b'A' + (n % 26) as u8);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

fn wrap_longitude(lng: f64) -> f64 {
    if lng > MAX_LNG {
        lng - 360.0
    } else {
        lng
    }
}

pub fn tile_name(row: usize, col: usize) -> String {
    format!("GRID_{}{}", row_label(row), col + 1)
}

// Scale-round-unscale: a value sitting on a decimal tie can round differently
// from a correctly rounded decimal conversion in the last place.
fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[derive(Debug, Clone)]
pub struct GridGenerator {
    bounds: BoundingBox,
    max_radius_km: f64,
    verbose: bool,
}

impl GridGenerator {
    pub fn new(north: f64, south: f64, east: f64, west: f64) -> Result<Self> {
        Ok(Self::from_bounds(BoundingBox::new(north, south, east, west)?))
    }

    pub fn from_bounds(bounds: BoundingBox) -> Self {
        Self {
            bounds,
            max_radius_km: MAX_RADIUS_KM,
            verbose: false,
        }
    }

    pub fn with_max_radius_km(mut self, max_radius_km: f64) -> Self {
        self.max_radius_km = max_radius_km;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    /// Longitude step and column count for the row centered at `row_lat`.
    ///
    /// A row whose midpoint reaches past a pole has no usable step, so it
    /// collapses to one column spanning the whole box.
    fn row_columns(&self, row_lat: f64, tile_km: f64) -> (f64, usize) {
        let lng_span = self.bounds.lng_span();
        let step_lng = tile_km * lng_per_km_at_lat(row_lat);
        if step_lng.is_finite() && step_lng > 0.0 && step_lng < 360.0 {
            (step_lng, (lng_span / step_lng).ceil() as usize)
        } else {
            (lng_span, 1)
        }
    }

    fn detail(&self, message: std::fmt::Arguments<'_>) {
        if self.verbose {
            tracing::info!("{}", message);
        } else {
            tracing::debug!("{}", message);
        }
    }

    /// 依網格大小與重疊比例產生覆蓋整個範圍的圓形網格，依列優先（南→北、西→東）排序。
    ///
    /// A tile is emitted when its south-west start corner lies inside the box.
    /// Only the start corner is checked, not the full tile extent, so edge
    /// tiles may reach well past the box. Centers are kept on the globe: a
    /// latitude past a pole is clamped to it and a longitude past the
    /// antimeridian wraps around to the western side.
    pub fn generate_minimal_overlap_grid(
        &self,
        tile_km: f64,
        overlap_ratio: f64,
    ) -> Result<Vec<GridTile>> {
        if !tile_km.is_finite() || tile_km <= 0.0 {
            return Err(ScanError::InvalidGridParameter {
                field: "tile_km".to_string(),
                value: tile_km.to_string(),
                reason: "must be a positive number".to_string(),
            });
        }
        if !overlap_ratio.is_finite() || overlap_ratio < 0.0 {
            return Err(ScanError::InvalidGridParameter {
                field: "overlap_ratio".to_string(),
                value: overlap_ratio.to_string(),
                reason: "must be zero or greater".to_string(),
            });
        }

        let final_radius_km = covering_radius_km(tile_km, overlap_ratio);
        self.detail(format_args!(
            "📐 Grid: tile {:.2} km, covering radius {:.2} km, overlap margin {:.2} km, search radius {:.2} km",
            tile_km,
            tile_km * std::f64::consts::SQRT_2 / 2.0,
            tile_km * overlap_ratio,
            final_radius_km
        ));

        if final_radius_km > self.max_radius_km {
            return Err(ScanError::RadiusExceeded {
                radius_km: final_radius_km,
                max_radius_km: self.max_radius_km,
            });
        }

        let radius_meters = (final_radius_km * 1000.0).round() as u32;
        let step_lat = tile_km / KM_PER_DEGREE;
        let num_rows = (self.bounds.lat_span() / step_lat).ceil() as usize;
        self.detail(format_args!(
            "   latitude step {:.6}°, {} rows",
            step_lat, num_rows
        ));

        let mut tiles = Vec::new();
        for row in 0..num_rows {
            let start_lat = self.bounds.south() + row as f64 * step_lat;
            let row_lat = start_lat + step_lat / 2.0;
            let (step_lng, num_cols) = self.row_columns(row_lat, tile_km);
            self.detail(format_args!(
                "   row {} at {:.4}°: longitude step {:.6}°, {} columns",
                row_label(row),
                row_lat,
                step_lng,
                num_cols
            ));

            for col in 0..num_cols {
                let start_lng = self.bounds.west() + col as f64 * step_lng;
                if !self.bounds.contains(start_lat, start_lng) {
                    continue;
                }

                tiles.push(GridTile {
                    name: tile_name(row, col),
                    center: Coordinate::new(
                        round_to(row_lat.clamp(MIN_LAT, MAX_LAT), CENTER_DECIMALS),
                        round_to(wrap_longitude(start_lng + step_lng / 2.0), CENTER_DECIMALS),
                    ),
                    radius_meters,
                    row,
                    col,
                });
            }
        }

        tracing::info!(
            "🗺️ Generated {} tiles ({} rows, radius {} m)",
            tiles.len(),
            num_rows,
            radius_meters
        );
        Ok(tiles)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Equirectangular distance under the same 111 km/degree approximation.
    fn approx_distance_km(a: Coordinate, b: Coordinate) -> f64 {
        let mean_lat = ((a.latitude + b.latitude) / 2.0).to_radians();
        let dy = (a.latitude - b.latitude) * KM_PER_DEGREE;
        let mut dlng = (a.longitude - b.longitude).abs();
        if dlng > 180.0 {
            dlng = 360.0 - dlng;
        }
        let dx = dlng * KM_PER_DEGREE * mean_lat.cos();
        dy.hypot(dx)
    }

    fn bounds_strategy() -> impl Strategy<Value = BoundingBox> {
        (-90.0f64..89.9, 0.01f64..0.5, -179.0f64..179.0, 0.01f64..0.5).prop_map(
            |(south, lat_span, west, lng_span)| {
                BoundingBox::new(
                    (south + lat_span).min(90.0),
                    south,
                    (west + lng_span).min(180.0),
                    west,
                )
                .unwrap()
            },
        )
    }

    proptest! {
        /// Every tile's start corner lies inside the box.
        #[test]
        fn start_corner_inside_box(
            bounds in bounds_strategy(),
            tile_km in 0.5f64..10.0,
            overlap in 0.0f64..0.5,
        ) {
            let generator = GridGenerator::from_bounds(bounds);
            let tiles = generator.generate_minimal_overlap_grid(tile_km, overlap).unwrap();
            let step_lat = tile_km / KM_PER_DEGREE;
            let eps = 1e-6;

            prop_assert!(!tiles.is_empty());
            for tile in &tiles {
                let start_lat = bounds.south() + tile.row as f64 * step_lat;
                let (step_lng, _) = generator.row_columns(start_lat + step_lat / 2.0, tile_km);
                let mut center_lng = tile.center.longitude;
                if center_lng < bounds.west() - eps {
                    center_lng += 360.0;
                }
                let start_lng = center_lng - step_lng / 2.0;
                prop_assert!(start_lat >= bounds.south() - eps && start_lat <= bounds.north() + eps);
                prop_assert!(start_lng >= bounds.west() - eps && start_lng <= bounds.east() + eps);
            }
        }

        /// Every sampled point of the box is within the search radius of some tile.
        #[test]
        fn tiles_cover_the_box(
            bounds in bounds_strategy(),
            tile_km in 1.0f64..10.0,
            overlap in 0.05f64..0.5,
            samples in prop::collection::vec((0.0f64..=1.0, 0.0f64..=1.0), 20),
        ) {
            let tiles = GridGenerator::from_bounds(bounds)
                .generate_minimal_overlap_grid(tile_km, overlap)
                .unwrap();
            let radius_km = covering_radius_km(tile_km, overlap);

            for (fy, fx) in samples {
                let point = Coordinate::new(
                    bounds.south() + fy * bounds.lat_span(),
                    bounds.west() + fx * bounds.lng_span(),
                );
                let nearest = tiles
                    .iter()
                    .map(|t| approx_distance_km(point, t.center))
                    .fold(f64::INFINITY, f64::min);
                prop_assert!(nearest <= radius_km, "point {:?} is {} km from nearest tile", point, nearest);
            }
        }

        /// Shrinking the tile size never reduces the tile count.
        #[test]
        fn finer_grids_have_at_least_as_many_tiles(
            bounds in bounds_strategy(),
            tile_km in 1.0f64..10.0,
            shrink in 0.3f64..0.99,
        ) {
            let generator = GridGenerator::from_bounds(bounds);
            let coarse = generator.generate_minimal_overlap_grid(tile_km, 0.1).unwrap();
            let fine = generator.generate_minimal_overlap_grid(tile_km * shrink, 0.1).unwrap();
            prop_assert!(fine.len() >= coarse.len());
        }

        /// A positive overlap always widens the radius beyond the covering radius.
        #[test]
        fn positive_overlap_widens_radius(tile_km in 0.01f64..60.0, overlap in 0.001f64..1.0) {
            prop_assert!(covering_radius_km(tile_km, overlap) > covering_radius_km(tile_km, 0.0));
        }

        /// Inverted edges never construct.
        #[test]
        fn inverted_bounds_rejected(a in -89.0f64..89.0, b in -179.0f64..179.0, d in 0.0f64..1.0) {
            prop_assert!(GridGenerator::new(a, a + d, b + 1.0, b).is_err());
            prop_assert!(GridGenerator::new(a + 1.0, a, b, b + d).is_err());
        }
    }
}
