use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Invalid bounding box: {message}")]
    InvalidBounds { message: String },

    #[error("Invalid grid parameter '{field}' = {value}: {reason}")]
    InvalidGridParameter {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Search radius {radius_km:.2} km exceeds the maximum of {max_radius_km} km")]
    RadiusExceeded { radius_km: f64, max_radius_km: f64 },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("API returned status {status}: {body}")]
    ApiStatus { status: u16, body: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration '{field}'")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Network,
    Data,
    System,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ScanError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ScanError::InvalidBounds { .. }
            | ScanError::InvalidGridParameter { .. }
            | ScanError::RadiusExceeded { .. } => ErrorCategory::Input,
            ScanError::ApiError(_) | ScanError::ApiStatus { .. } => ErrorCategory::Network,
            ScanError::CsvError(_) | ScanError::SerializationError(_) => ErrorCategory::Data,
            ScanError::IoError(_) => ErrorCategory::System,
            ScanError::ConfigError { .. }
            | ScanError::ConfigValidationError { .. }
            | ScanError::InvalidConfigValueError { .. }
            | ScanError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Input | ErrorCategory::Data | ErrorCategory::Configuration => {
                ErrorSeverity::High
            }
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 給使用者的修正建議
    pub fn recovery_suggestion(&self) -> String {
        match self {
            ScanError::InvalidBounds { .. } => {
                "Check that north > south, east > west, latitudes are within ±90 and longitudes within ±180".to_string()
            }
            ScanError::InvalidGridParameter { field, .. } => {
                format!("Use a positive, finite value for '{}'", field)
            }
            ScanError::RadiusExceeded { max_radius_km, .. } => format!(
                "Reduce tile_km or overlap_ratio so the search radius stays within {} km",
                max_radius_km
            ),
            ScanError::ApiError(_) => {
                "Check network connectivity and the API endpoint, then retry".to_string()
            }
            ScanError::ApiStatus { status, .. } if *status == 401 || *status == 403 => {
                "Check that GOOGLE_MAP_API_KEY is valid and the Places API is enabled".to_string()
            }
            ScanError::ApiStatus { .. } => {
                "The API rejected the request; check quota and request parameters".to_string()
            }
            ScanError::CsvError(_) | ScanError::SerializationError(_) => {
                "The data could not be encoded; check the API response format".to_string()
            }
            ScanError::IoError(_) => {
                "Check that the output path exists and is writable".to_string()
            }
            ScanError::ConfigError { .. } | ScanError::ConfigValidationError { .. } => {
                "Check the configuration file syntax and values".to_string()
            }
            ScanError::InvalidConfigValueError { field, .. } => {
                format!("Fix the value of '{}' in the configuration", field)
            }
            ScanError::MissingConfigError { field } => {
                format!("Provide a value for '{}'", field)
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Input => format!("Grid parameters are invalid: {}", self),
            ErrorCategory::Network => format!("Could not reach the search API: {}", self),
            ErrorCategory::Data => format!("Could not process place data: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
        }
    }

    /// 寫入日誌並在 stderr 顯示給使用者
    pub fn report(&self) {
        tracing::error!(
            "❌ {} (Category: {:?}, Severity: {:?})",
            self,
            self.category(),
            self.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", self.recovery_suggestion());
        eprintln!("❌ {}", self.user_friendly_message());
        eprintln!("💡 {}", self.recovery_suggestion());
    }

    /// 依嚴重程度對應的程序結束碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
