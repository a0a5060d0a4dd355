use crate::adapters::google_places::{DEFAULT_ENDPOINT, DEFAULT_LANGUAGE_CODE};
use crate::core::grid::{DEFAULT_OVERLAP_RATIO, MAX_RADIUS_KM};
use crate::domain::model::BoundingBox;
use crate::domain::ports::{ConfigProvider, OutputFormat};
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::Parser;
use std::time::Duration;

/// 預設為台北捷運站的查詢範圍
#[derive(Debug, Clone, Parser)]
#[command(name = "places-grid")]
#[command(about = "Scan a bounding box for places with a grid of nearby searches")]
pub struct CliConfig {
    #[arg(long, default_value_t = 25.2, allow_negative_numbers = true)]
    pub north: f64,

    #[arg(long, default_value_t = 24.7, allow_negative_numbers = true)]
    pub south: f64,

    #[arg(long, default_value_t = 121.6, allow_negative_numbers = true)]
    pub east: f64,

    #[arg(long, default_value_t = 120.9, allow_negative_numbers = true)]
    pub west: f64,

    /// Tile edge length in kilometers
    #[arg(long, default_value_t = 3.0)]
    pub tile_km: f64,

    /// Fraction of the tile edge added to the search radius
    #[arg(long, default_value_t = DEFAULT_OVERLAP_RATIO, allow_negative_numbers = true)]
    pub overlap_ratio: f64,

    #[arg(long, default_value_t = MAX_RADIUS_KM)]
    pub max_radius_km: f64,

    #[arg(long, value_delimiter = ',', default_value = "subway_station")]
    pub place_types: Vec<String>,

    #[arg(long, default_value = DEFAULT_LANGUAGE_CODE)]
    pub language_code: String,

    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    pub api_endpoint: String,

    #[arg(long, env = "GOOGLE_MAP_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, default_value = "10")]
    pub timeout_seconds: u64,

    /// Delay between consecutive API calls
    #[arg(long, default_value = "100")]
    pub request_delay_ms: u64,

    #[arg(long, default_value = "0")]
    pub retry_attempts: u32,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    /// Output file name without extension
    #[arg(long, default_value = "places")]
    pub output_file: String,

    #[arg(long, value_delimiter = ',', default_value = "json")]
    pub output_formats: Vec<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log memory and phase timings")]
    pub monitor: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[arg(short, long, help = "Skip the confirmation prompt")]
    pub yes: bool,

    #[arg(long, help = "Print the planned tiles without calling the API")]
    pub dry_run: bool,
}

impl ConfigProvider for CliConfig {
    fn bounds(&self) -> Result<BoundingBox> {
        BoundingBox::new(self.north, self.south, self.east, self.west)
    }

    fn tile_km(&self) -> f64 {
        self.tile_km
    }

    fn overlap_ratio(&self) -> f64 {
        self.overlap_ratio
    }

    fn max_radius_km(&self) -> f64 {
        self.max_radius_km
    }

    fn place_types(&self) -> &[String] {
        &self.place_types
    }

    fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    fn retry_attempts(&self) -> u32 {
        self.retry_attempts
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_stem(&self) -> &str {
        &self.output_file
    }

    fn output_formats(&self) -> Result<Vec<OutputFormat>> {
        validation::parse_output_formats("output_formats", &self.output_formats)
    }

    fn verbose(&self) -> bool {
        self.verbose
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_latitude("north", self.north)?;
        validation::validate_latitude("south", self.south)?;
        validation::validate_longitude("east", self.east)?;
        validation::validate_longitude("west", self.west)?;
        self.bounds()?;

        validation::validate_positive("tile_km", self.tile_km)?;
        validation::validate_non_negative("overlap_ratio", self.overlap_ratio)?;
        validation::validate_positive("max_radius_km", self.max_radius_km)?;
        validation::validate_url("api_endpoint", &self.api_endpoint)?;
        validation::validate_non_empty_string("language_code", &self.language_code)?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_non_empty_string("output_file", &self.output_file)?;
        validation::parse_output_formats("output_formats", &self.output_formats)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::ScanError;

    fn parse(args: &[&str]) -> CliConfig {
        let mut argv = vec!["places-grid"];
        argv.extend_from_slice(args);
        CliConfig::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults_scan_taipei_metro() {
        let config = parse(&["--api-key", "k"]);

        assert_eq!((config.north, config.south), (25.2, 24.7));
        assert_eq!((config.east, config.west), (121.6, 120.9));
        assert_eq!(config.tile_km, 3.0);
        assert_eq!(config.overlap_ratio, 0.1);
        assert_eq!(config.place_types(), ["subway_station".to_string()]);
        assert_eq!(config.request_delay(), Duration::from_millis(100));
        assert_eq!(config.output_formats().unwrap(), vec![OutputFormat::Json]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_negative_coordinates_and_lists() {
        let config = parse(&[
            "--north", "-33.8",
            "--south", "-34.0",
            "--east", "151.3",
            "--west", "151.1",
            "--place-types", "cafe,bakery",
            "--output-formats", "json,csv",
        ]);

        assert_eq!(config.south, -34.0);
        assert_eq!(config.place_types, vec!["cafe".to_string(), "bakery".to_string()]);
        assert_eq!(
            config.output_formats().unwrap(),
            vec![OutputFormat::Json, OutputFormat::Csv]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_inverted_bounds() {
        let config = parse(&["--north", "24.0"]);
        assert!(matches!(config.validate(), Err(ScanError::InvalidBounds { .. })));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        assert!(parse(&["--tile-km", "0"]).validate().is_err());
        assert!(parse(&["--overlap-ratio", "-0.5"]).validate().is_err());
        assert!(parse(&["--output-formats", "xml"]).validate().is_err());
        assert!(parse(&["--api-endpoint", "not a url"]).validate().is_err());
    }

    #[test]
    fn test_unknown_output_format_is_an_error_without_validate() {
        let config = parse(&["--output-formats", "json,xml"]);
        assert!(matches!(
            config.output_formats(),
            Err(ScanError::InvalidConfigValueError { ref value, .. }) if value == "xml"
        ));
    }
}
