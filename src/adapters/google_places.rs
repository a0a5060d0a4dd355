use crate::domain::model::{Coordinate, PlaceRecord, SearchOutcome};
use crate::domain::ports::PlaceSearch;
use crate::utils::error::{Result, ScanError};
use reqwest::Client;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://places.googleapis.com/v1/places:searchNearby";
pub const FIELD_MASK: &str = "places.displayName,places.location,places.formattedAddress,places.addressComponents,places.id,places.rating,places.types";
pub const DEFAULT_LANGUAGE_CODE: &str = "zh-TW";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Nearby Search 每次最多回傳 20 筆
pub const MAX_RESULTS_PER_CALL: usize = 20;

#[derive(Debug, Deserialize)]
struct NearbyResponse {
    #[serde(default)]
    places: Vec<ApiPlace>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiPlace {
    #[serde(default)]
    id: String,
    display_name: Option<LocalizedText>,
    location: Option<LatLng>,
    #[serde(default)]
    formatted_address: String,
    rating: Option<f64>,
    #[serde(default)]
    types: Vec<String>,
    #[serde(default)]
    address_components: Vec<AddressComponent>,
}

#[derive(Debug, Deserialize)]
struct LocalizedText {
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LatLng {
    #[serde(default)]
    latitude: f64,
    #[serde(default)]
    longitude: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddressComponent {
    #[serde(default)]
    long_text: String,
    #[serde(default)]
    types: Vec<String>,
}

/// 每個 component type 對應到該 component 的 longText
fn flatten_address_components(components: &[AddressComponent]) -> BTreeMap<String, String> {
    let mut flattened = BTreeMap::new();
    for component in components {
        for component_type in &component.types {
            flattened.insert(component_type.clone(), component.long_text.clone());
        }
    }
    flattened
}

impl ApiPlace {
    fn into_record(self) -> PlaceRecord {
        let address_components = flatten_address_components(&self.address_components);
        let location = self.location.unwrap_or_default();
        let name = self
            .display_name
            .and_then(|n| n.text)
            .unwrap_or_else(|| "N/A".to_string());

        PlaceRecord {
            place_id: self.id.clone(),
            id: self.id,
            name,
            latitude: location.latitude,
            longitude: location.longitude,
            address: self.formatted_address,
            rating: self.rating,
            types: self.types,
            address_components,
        }
    }
}

/// Google Places API (New) searchNearby client
#[derive(Debug, Clone)]
pub struct GooglePlacesClient {
    client: Client,
    endpoint: String,
    api_key: String,
    language_code: String,
    timeout: Duration,
}

impl GooglePlacesClient {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ScanError::MissingConfigError {
                field: "api_key".to_string(),
            });
        }

        Ok(Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            api_key,
            language_code: DEFAULT_LANGUAGE_CODE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_language_code(mut self, language_code: impl Into<String>) -> Self {
        self.language_code = language_code.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn request_body(
        &self,
        center: Coordinate,
        radius_meters: u32,
        place_types: &[String],
    ) -> serde_json::Value {
        let mut body = serde_json::json!({
            "languageCode": self.language_code,
            "locationRestriction": {
                "circle": {
                    "center": {
                        "latitude": center.latitude,
                        "longitude": center.longitude,
                    },
                    "radius": f64::from(radius_meters),
                }
            }
        });
        if !place_types.is_empty() {
            body["includedTypes"] = serde_json::json!(place_types);
        }
        body
    }
}

#[async_trait::async_trait]
impl PlaceSearch for GooglePlacesClient {
    async fn search(
        &self,
        center: Coordinate,
        radius_meters: u32,
        place_types: &[String],
    ) -> Result<SearchOutcome> {
        let body = self.request_body(center, radius_meters, place_types);
        tracing::debug!("Making Places request to {}: {}", self.endpoint, body);

        let response = self
            .client
            .post(&self.endpoint)
            .header("X-Goog-Api-Key", &self.api_key)
            .header("X-Goog-FieldMask", FIELD_MASK)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Places response status: {}", status);
        let text = response.text().await?;

        if !status.is_success() {
            return Err(ScanError::ApiStatus {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: NearbyResponse = serde_json::from_str(&text)?;
        let possibly_incomplete = parsed.places.len() >= MAX_RESULTS_PER_CALL;
        let places = parsed.places.into_iter().map(ApiPlace::into_record).collect();

        Ok(SearchOutcome {
            places,
            possibly_incomplete,
        })
    }
}
