// crates/ipm-bridge-core/src/source.rs
// ============================================================================
// Module: Weather Data Source Descriptors
// Description: Platform-supplied metadata describing a weather data source.
// Purpose: Give the resolver a typed, leniently-deserialized view of sources.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! A [`DataSourceDescriptor`] is the platform's own description of an
//! external weather data source: how it is accessed (by station or by
//! geographic point), which measuring intervals and parameters it supports,
//! and where its stations sit. Descriptors come from a remote catalog the
//! platform does not let us author, so every field beyond `id`, `endpoint`,
//! and `access_type` is optional and unknown fields are ignored.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

// ============================================================================
// SECTION: Access Type
// ============================================================================

/// How a weather data source is queried.
///
/// # Invariants
/// - Unrecognized values are preserved verbatim in `Other` so errors can
///   name the offending value; they are never silently coerced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AccessType {
    /// Observation data, queried by weather station identifier.
    Stations,
    /// Forecast data, queried by geographic point.
    Location,
    /// Any access type this crate does not understand.
    Other(String),
}

impl AccessType {
    /// Returns the wire representation of the access type.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Stations => "stations",
            Self::Location => "location",
            Self::Other(raw) => raw.as_str(),
        }
    }
}

impl From<String> for AccessType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "stations" => Self::Stations,
            "location" => Self::Location,
            _ => Self::Other(raw),
        }
    }
}

impl From<AccessType> for String {
    fn from(access_type: AccessType) -> Self {
        access_type.as_str().to_string()
    }
}

// ============================================================================
// SECTION: Authentication Type
// ============================================================================

/// How a weather data source authenticates requests.
///
/// # Invariants
/// - Unrecognized values are preserved verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AuthenticationType {
    /// No authentication required.
    None,
    /// Caller credentials must accompany the request.
    Credentials,
    /// Any authentication type this crate does not understand.
    Other(String),
}

impl AuthenticationType {
    /// Returns the wire representation of the authentication type.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::None => "NONE",
            Self::Credentials => "CREDENTIALS",
            Self::Other(raw) => raw.as_str(),
        }
    }
}

impl From<String> for AuthenticationType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "NONE" => Self::None,
            "CREDENTIALS" => Self::Credentials,
            _ => Self::Other(raw),
        }
    }
}

impl From<AuthenticationType> for String {
    fn from(authentication_type: AuthenticationType) -> Self {
        authentication_type.as_str().to_string()
    }
}

impl Default for AuthenticationType {
    fn default() -> Self {
        Self::None
    }
}

// ============================================================================
// SECTION: Descriptor Sub-Structures
// ============================================================================

/// First and last instants for which a source holds historic data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricRange {
    /// ISO 8601 timestamp of the earliest available data, when known.
    #[serde(default)]
    pub start: Option<String>,
    /// ISO 8601 timestamp of the latest available data, when known.
    #[serde(default)]
    pub end: Option<String>,
}

/// Temporal capabilities of a source.
///
/// # Invariants
/// - `intervals` is ordered by source preference; the first entry is the
///   source's default measuring interval in seconds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporalExtent {
    /// Supported measuring intervals in seconds, preferred first.
    #[serde(default)]
    pub intervals: Vec<i64>,
    /// Historic data range, absent for forecast-only sources.
    #[serde(default)]
    pub historic: Option<HistoricRange>,
}

/// Parameter vocabulary advertised by a source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterGroups {
    /// Parameter codes every station of the source provides.
    #[serde(default)]
    pub common: Vec<String>,
}

/// Spatial coverage of a source.
///
/// # Invariants
/// - `geo_json` may arrive as a JSON object or as a stringified document;
///   [`SpatialExtent::features`] handles both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpatialExtent {
    /// GeoJSON feature collection of station locations, when provided.
    #[serde(default, rename = "geoJSON")]
    pub geo_json: Option<Value>,
}

impl SpatialExtent {
    /// Returns the GeoJSON features array, decoding a stringified document
    /// when the platform delivered one.
    #[must_use]
    pub fn features(&self) -> Option<Vec<Value>> {
        let geo_json = self.geo_json.as_ref()?;
        let decoded;
        let document = match geo_json {
            Value::String(raw) => {
                decoded = serde_json::from_str::<Value>(raw).ok()?;
                &decoded
            }
            other => other,
        };
        document.get("features")?.as_array().cloned()
    }
}

// ============================================================================
// SECTION: Data Source Descriptor
// ============================================================================

/// Platform metadata describing one weather data source.
///
/// # Invariants
/// - Fetched once per call and treated as immutable afterwards.
/// - `endpoint` is a templated URL; the `{WEATHER_API_URL}` token is
///   expanded by the client layer, never here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSourceDescriptor {
    /// Stable source identifier, e.g. `fi.fmi.observation.station`.
    pub id: String,
    /// Human-readable source name.
    #[serde(default)]
    pub name: Option<String>,
    /// How the source is queried.
    pub access_type: AccessType,
    /// How the source authenticates requests.
    #[serde(default)]
    pub authentication_type: AuthenticationType,
    /// Templated request URL for the source's weather adapter.
    pub endpoint: String,
    /// Temporal capabilities.
    #[serde(default)]
    pub temporal: Option<TemporalExtent>,
    /// Parameter vocabulary.
    #[serde(default)]
    pub parameters: Option<ParameterGroups>,
    /// Spatial coverage.
    #[serde(default)]
    pub spatial: Option<SpatialExtent>,
}

#[cfg(test)]
#[allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::missing_docs_in_private_items,
    reason = "Test-only assertions and helpers are permitted."
)]
mod tests {
    use super::*;

    #[test]
    fn access_type_round_trips_known_and_unknown_values() {
        assert_eq!(AccessType::from("stations".to_string()), AccessType::Stations);
        assert_eq!(AccessType::from("location".to_string()), AccessType::Location);
        let other = AccessType::from("bogus".to_string());
        assert_eq!(other, AccessType::Other("bogus".to_string()));
        assert_eq!(other.as_str(), "bogus");
    }

    #[test]
    fn spatial_extent_decodes_stringified_geojson() {
        let spatial = SpatialExtent {
            geo_json: Some(Value::String(
                r#"{"type":"FeatureCollection","features":[{"id":"7"}]}"#.to_string(),
            )),
        };
        let features = spatial.features().unwrap_or_default();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].get("id").and_then(Value::as_str), Some("7"));
    }

    #[test]
    fn spatial_extent_accepts_inline_geojson_objects() {
        let spatial = SpatialExtent {
            geo_json: Some(serde_json::json!({
                "type": "FeatureCollection",
                "features": [{"properties": {"id": 3}}],
            })),
        };
        assert_eq!(spatial.features().map(|f| f.len()), Some(1));
    }
}
