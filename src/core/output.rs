use crate::domain::model::{PlaceRecord, ScanResult};
use crate::utils::error::Result;
use serde::Serialize;

pub const SEARCH_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Serialize)]
struct SearchInfo<'a> {
    search_date: &'a str,
    total_places: usize,
    tiles_queried: usize,
    failed_tiles: &'a [String],
    incomplete_tiles: &'a [String],
}

#[derive(Debug, Serialize)]
struct OutputDocument<'a> {
    search_info: SearchInfo<'a>,
    places: &'a [PlaceRecord],
}

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    id: &'a str,
    name: &'a str,
    latitude: f64,
    longitude: f64,
    address: &'a str,
    rating: Option<f64>,
    types: String,
    address_components: String,
}

pub fn search_date_now() -> String {
    chrono::Local::now().format(SEARCH_DATE_FORMAT).to_string()
}

pub fn render_json(result: &ScanResult, search_date: &str) -> Result<Vec<u8>> {
    let document = OutputDocument {
        search_info: SearchInfo {
            search_date,
            total_places: result.places.len(),
            tiles_queried: result.tiles_queried,
            failed_tiles: &result.failed_tiles,
            incomplete_tiles: &result.incomplete_tiles,
        },
        places: &result.places,
    };
    Ok(serde_json::to_vec_pretty(&document)?)
}

/// 每個地點一列；types 以 `|` 串接，address components 以 `type=text;` 串接
pub fn render_csv(places: &[PlaceRecord]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for place in places {
        writer.serialize(CsvRow {
            id: &place.id,
            name: &place.name,
            latitude: place.latitude,
            longitude: place.longitude,
            address: &place.address,
            rating: place.rating,
            types: place.types.join("|"),
            address_components: place
                .address_components
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join(";"),
        })?;
    }
    writer.flush()?;
    writer
        .into_inner()
        .map_err(|e| crate::utils::error::ScanError::IoError(e.into_error()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn station(id: &str) -> PlaceRecord {
        PlaceRecord {
            id: id.to_string(),
            name: "Taipei Main Station".to_string(),
            place_id: id.to_string(),
            latitude: 25.0478,
            longitude: 121.517,
            address: "Zhongzheng, Taipei".to_string(),
            rating: Some(4.4),
            types: vec!["subway_station".to_string(), "transit_station".to_string()],
            address_components: BTreeMap::from([
                ("country".to_string(), "Taiwan".to_string()),
                ("locality".to_string(), "Taipei".to_string()),
            ]),
        }
    }

    #[test]
    fn test_json_document_carries_search_info() {
        let result = ScanResult {
            places: vec![station("a"), station("b")],
            tiles_queried: 4,
            raw_place_count: 3,
            failed_tiles: vec!["GRID_A2".to_string()],
            incomplete_tiles: vec![],
        };

        let bytes = render_json(&result, "2025-01-02 03:04:05").unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(json["search_info"]["search_date"], "2025-01-02 03:04:05");
        assert_eq!(json["search_info"]["total_places"], 2);
        assert_eq!(json["search_info"]["tiles_queried"], 4);
        assert_eq!(json["search_info"]["failed_tiles"][0], "GRID_A2");
        assert_eq!(json["places"].as_array().unwrap().len(), 2);
        assert_eq!(json["places"][0]["addressComponents"]["locality"], "Taipei");
    }

    #[test]
    fn test_csv_has_header_and_flattened_fields() {
        let bytes = render_csv(&[station("a")]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "id,name,latitude,longitude,address,rating,types,address_components"
        );
        assert!(lines[1].starts_with("a,Taipei Main Station,25.0478,121.517,"));
        assert!(lines[1].contains("subway_station|transit_station"));
        assert!(lines[1].contains("country=Taiwan;locality=Taipei"));
    }

    #[test]
    fn test_search_date_format() {
        let date = search_date_now();
        assert!(chrono::NaiveDateTime::parse_from_str(&date, SEARCH_DATE_FORMAT).is_ok());
    }
}
