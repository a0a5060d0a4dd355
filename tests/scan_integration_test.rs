use clap::Parser;
use httpmock::prelude::*;
use places_grid::core::ConfigProvider;
use places_grid::{
    plan_tiles, CliConfig, GooglePlacesClient, LocalStorage, PlacesPipeline, ScanEngine, TomlConfig,
};
use tempfile::TempDir;

const PATH: &str = "/v1/places:searchNearby";

fn station(id: &str, name: &str, rating: f64) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "displayName": {"text": name},
        "location": {"latitude": 25.0478, "longitude": 121.5170},
        "formattedAddress": "Taipei",
        "rating": rating,
        "types": ["subway_station"],
        "addressComponents": [{"longText": "Taipei", "types": ["locality"]}]
    })
}

fn cli_config(server: &MockServer, output_path: &str) -> CliConfig {
    let endpoint = server.url(PATH);
    CliConfig::try_parse_from([
        "places-grid",
        "--api-endpoint",
        endpoint.as_str(),
        "--api-key",
        "test-key",
        "--tile-km",
        "10",
        "--request-delay-ms",
        "0",
        "--output-path",
        output_path,
        "--output-file",
        "metro",
        "--output-formats",
        "json,csv",
        "--yes",
    ])
    .unwrap()
}

fn read_json(path: std::path::PathBuf) -> serde_json::Value {
    serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap()
}

#[tokio::test]
async fn test_end_to_end_scan_dedupes_across_tiles() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST)
            .path(PATH)
            .header("X-Goog-Api-Key", "test-key");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({
                "places": [
                    station("main", "Taipei Main Station", 4.4),
                    station("ximen", "Ximen", 4.2)
                ]
            }));
    });

    let config = cli_config(&server, &output_path);
    let tile_count = plan_tiles(&config).unwrap().len();
    let client = GooglePlacesClient::new(server.url(PATH), "test-key").unwrap();
    let storage = LocalStorage::new(output_path.clone());
    let engine = ScanEngine::new(PlacesPipeline::new(storage, config, client));

    let output = engine.run().await.unwrap();

    api_mock.assert_hits(tile_count);
    assert!(output.contains("metro.json"));
    assert!(output.contains("metro.csv"));

    let json = read_json(temp_dir.path().join("metro.json"));
    assert_eq!(json["search_info"]["total_places"], 2);
    assert_eq!(json["search_info"]["tiles_queried"], tile_count);
    assert_eq!(json["places"][0]["id"], "main");
    assert_eq!(json["places"][0]["addressComponents"]["locality"], "Taipei");

    let csv = std::fs::read_to_string(temp_dir.path().join("metro.csv")).unwrap();
    assert_eq!(csv.lines().count(), 3);
}

#[tokio::test]
async fn test_end_to_end_with_api_failure_still_writes_output() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST).path(PATH);
        then.status(500).body("backend error");
    });

    let config = cli_config(&server, &output_path);
    let tile_count = plan_tiles(&config).unwrap().len();
    let client = GooglePlacesClient::new(server.url(PATH), "test-key").unwrap();
    let engine = ScanEngine::new(PlacesPipeline::new(
        LocalStorage::new(output_path.clone()),
        config,
        client,
    ));

    // 個別網格失敗不會讓整體掃描失敗
    let result = engine.run().await;
    assert!(result.is_ok());
    api_mock.assert_hits(tile_count);

    let json = read_json(temp_dir.path().join("metro.json"));
    assert_eq!(json["search_info"]["total_places"], 0);
    assert_eq!(
        json["search_info"]["failed_tiles"].as_array().unwrap().len(),
        tile_count
    );
}

#[tokio::test]
async fn test_toml_scan_flags_capped_tiles() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    let places: Vec<serde_json::Value> = (0..20)
        .map(|i| station(&format!("p{}", i), "Stop", 4.0))
        .collect();
    server.mock(|when, then| {
        when.method(POST).path(PATH);
        then.status(200).json_body(serde_json::json!({ "places": places }));
    });

    let toml_content = format!(
        r#"
[scan]
name = "small-box"

[bounds]
north = 25.06
south = 25.03
east = 121.53
west = 121.50

[grid]
tile_km = 5.0

[search]
endpoint = "{}"
api_key = "test-key"
place_types = ["subway_station"]
request_delay_ms = 0

[output]
output_path = "{}"
filename = "capped"
"#,
        server.url(PATH),
        output_path.replace('\\', "/")
    );

    let config = TomlConfig::from_toml_str(&toml_content).unwrap();
    let tiles = plan_tiles(&config).unwrap();
    assert_eq!(tiles.len(), 1);

    let client = GooglePlacesClient::new(config.endpoint(), config.api_key().unwrap()).unwrap();
    let storage = LocalStorage::new(config.output_path());
    let engine = ScanEngine::new(PlacesPipeline::new(storage, config, client));

    engine.run().await.unwrap();

    let json = read_json(temp_dir.path().join("capped.json"));
    assert_eq!(json["search_info"]["total_places"], 20);
    assert_eq!(json["search_info"]["incomplete_tiles"][0], "GRID_A1");
}
