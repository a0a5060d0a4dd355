use crate::adapters::google_places::{DEFAULT_ENDPOINT, DEFAULT_LANGUAGE_CODE, DEFAULT_TIMEOUT};
use crate::core::driver::DEFAULT_REQUEST_DELAY;
use crate::core::grid::{DEFAULT_OVERLAP_RATIO, MAX_RADIUS_KM};
use crate::domain::model::BoundingBox;
use crate::domain::ports::{ConfigProvider, OutputFormat};
use crate::utils::error::{Result, ScanError};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const DEFAULT_OUTPUT_STEM: &str = "places";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub scan: ScanInfo,
    pub bounds: BoundsConfig,
    pub grid: GridConfig,
    pub search: SearchConfig,
    pub output: OutputConfig,
    pub monitoring: Option<MonitoringConfig>,
    /// 由命令列設定，不從檔案讀取
    #[serde(skip)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanInfo {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BoundsConfig {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    pub tile_km: f64,
    pub overlap_ratio: Option<f64>,
    pub max_radius_km: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    #[serde(default)]
    pub place_types: Vec<String>,
    pub language_code: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub request_delay_ms: Option<u64>,
    pub retry_attempts: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub output_path: String,
    pub filename: Option<String>,
    pub output_formats: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ScanError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${GOOGLE_MAP_API_KEY})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| ScanError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.into_owned())
    }

    pub fn endpoint(&self) -> &str {
        self.search.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT)
    }

    pub fn language_code(&self) -> &str {
        self.search
            .language_code
            .as_deref()
            .unwrap_or(DEFAULT_LANGUAGE_CODE)
    }

    pub fn timeout(&self) -> Duration {
        self.search
            .timeout_seconds
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT)
    }

    /// 尚未替換的 `${VAR}` 視為未設定
    pub fn api_key(&self) -> Result<&str> {
        match self.search.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() && !key.starts_with("${") => Ok(key),
            _ => Err(ScanError::MissingConfigError {
                field: "search.api_key".to_string(),
            }),
        }
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    fn output_format_names(&self) -> Vec<String> {
        self.output
            .output_formats
            .clone()
            .unwrap_or_else(|| vec!["json".to_string()])
    }

    pub fn validate_config(&self) -> Result<()> {
        let b = &self.bounds;
        validation::validate_latitude("bounds.north", b.north)?;
        validation::validate_latitude("bounds.south", b.south)?;
        validation::validate_longitude("bounds.east", b.east)?;
        validation::validate_longitude("bounds.west", b.west)?;
        self.bounds()?;

        validation::validate_positive("grid.tile_km", self.grid.tile_km)?;
        validation::validate_non_negative("grid.overlap_ratio", self.overlap_ratio())?;
        validation::validate_positive("grid.max_radius_km", self.max_radius_km())?;

        validation::validate_url("search.endpoint", self.endpoint())?;
        validation::validate_non_empty_string("search.language_code", self.language_code())?;

        validation::validate_path("output.output_path", &self.output.output_path)?;
        validation::validate_non_empty_string("output.filename", self.output_stem())?;
        validation::parse_output_formats("output.output_formats", &self.output_format_names())?;

        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn bounds(&self) -> Result<BoundingBox> {
        let b = &self.bounds;
        BoundingBox::new(b.north, b.south, b.east, b.west)
    }

    fn tile_km(&self) -> f64 {
        self.grid.tile_km
    }

    fn overlap_ratio(&self) -> f64 {
        self.grid.overlap_ratio.unwrap_or(DEFAULT_OVERLAP_RATIO)
    }

    fn max_radius_km(&self) -> f64 {
        self.grid.max_radius_km.unwrap_or(MAX_RADIUS_KM)
    }

    fn place_types(&self) -> &[String] {
        &self.search.place_types
    }

    fn request_delay(&self) -> Duration {
        self.search
            .request_delay_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_REQUEST_DELAY)
    }

    fn retry_attempts(&self) -> u32 {
        self.search.retry_attempts.unwrap_or(0)
    }

    fn output_path(&self) -> &str {
        &self.output.output_path
    }

    fn output_stem(&self) -> &str {
        self.output.filename.as_deref().unwrap_or(DEFAULT_OUTPUT_STEM)
    }

    fn output_formats(&self) -> Result<Vec<OutputFormat>> {
        validation::parse_output_formats("output.output_formats", &self.output_format_names())
    }

    fn verbose(&self) -> bool {
        self.verbose
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
