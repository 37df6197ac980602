// crates/ipm-bridge-core/src/weather.rs
// ============================================================================
// Module: Weather Data Envelope
// Description: Typed header over the platform's weather data exchange format.
// Purpose: Expose the fields composition validates; keep the series opaque.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Weather data fetched from a source adapter is consumed opaquely by DSS
//! models; the only fields this crate interprets are the parameter codes
//! present and the sampling interval, which composition checks against a
//! model's declared requirements. Everything else round-trips untouched via
//! a flattened remainder map.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

// ============================================================================
// SECTION: Weather Data
// ============================================================================

/// Weather data in the platform exchange format.
///
/// # Invariants
/// - `weather_parameters` lists the parameter codes present in the series.
/// - `interval` is the sampling interval in seconds for every series entry.
/// - `rest` preserves all other exchange-format fields byte-for-byte.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherData {
    /// Parameter codes present in the data.
    #[serde(default, rename = "weatherParameters")]
    pub weather_parameters: Vec<String>,
    /// Sampling interval in seconds.
    #[serde(default)]
    pub interval: i64,
    /// Remaining exchange-format fields (time range, location series),
    /// carried opaquely.
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

impl WeatherData {
    /// Returns true when every requested code is present in the data.
    #[must_use]
    pub fn covers<'a, I>(&self, codes: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        codes.into_iter().all(|code| self.weather_parameters.iter().any(|have| have == code))
    }
}
