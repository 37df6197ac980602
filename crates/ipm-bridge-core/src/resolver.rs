// crates/ipm-bridge-core/src/resolver.rs
// ============================================================================
// Module: Source Parameter Resolver
// Description: Builds concrete request parameters for a weather data source.
// Purpose: Turn descriptor capabilities plus caller overrides into a valid query.
// Dependencies: serde, serde_json, thiserror, time
// ============================================================================

//! ## Overview
//! The resolver maps a [`DataSourceDescriptor`] and caller overrides onto the
//! parameter set the source's weather adapter expects, dispatching on the
//! source's access type: station-based sources get an observation query
//! (interval, parameters, time window, station id), point-based sources get
//! a forecast query (coordinates, interval, parameters). Per-source
//! exceptions come from the [`crate::quirks`] table. The resolver is pure:
//! its only inputs are the descriptor, the overrides, and an injected
//! [`Clock`], and it fails closed with typed errors on descriptors it cannot
//! satisfy.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Number;
use serde_json::Value;
use thiserror::Error;
use time::Duration;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::clock::Clock;
use crate::quirks::SourceQuirks;
use crate::quirks::quirks_for;
use crate::source::AccessType;
use crate::source::DataSourceDescriptor;

// ============================================================================
// SECTION: Parameter Names
// ============================================================================

/// Query parameter: measuring interval in seconds.
const PARAM_INTERVAL: &str = "interval";
/// Query parameter: comma-joined parameter codes.
const PARAM_PARAMETERS: &str = "parameters";
/// Query parameter: start of the requested period, RFC 3339.
const PARAM_TIME_START: &str = "timeStart";
/// Query parameter: end of the requested period, RFC 3339.
const PARAM_TIME_END: &str = "timeEnd";
/// Query parameter: station identifier for observation sources.
const PARAM_STATION_ID: &str = "weatherStationId";
/// Query parameter: WGS84 latitude in decimal degrees.
const PARAM_LATITUDE: &str = "latitude";
/// Query parameter: WGS84 longitude in decimal degrees.
const PARAM_LONGITUDE: &str = "longitude";
/// Query parameter: altitude in meters.
const PARAM_ALTITUDE: &str = "altitude";
/// Query parameter: tolerate partial station failures.
const PARAM_IGNORE_ERRORS: &str = "ignoreErrors";

/// Default forecast latitude (Bodø, the platform's reference location).
const DEFAULT_LATITUDE: f64 = 67.2828;
/// Default forecast longitude (Bodø, the platform's reference location).
const DEFAULT_LONGITUDE: f64 = 14.3711;
/// Default forecast altitude in meters.
const DEFAULT_ALTITUDE: f64 = 0.0;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while resolving request parameters.
///
/// # Invariants
/// - Variants are stable for programmatic handling and embed the offending
///   identifier.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// The descriptor declares an access type outside `stations`/`location`.
    #[error("source {source_id} has unsupported access type: {access_type}")]
    UnsupportedAccessType {
        /// Source whose descriptor is unsupported.
        source_id: String,
        /// The offending access type value, verbatim.
        access_type: String,
    },
    /// The descriptor lists no measuring intervals to default from.
    #[error("source {source_id} declares no measuring intervals")]
    MissingIntervals {
        /// Source whose descriptor lacks intervals.
        source_id: String,
    },
    /// An observation window was needed but the descriptor has no historic
    /// range to default from.
    #[error("source {source_id} has no historic range to default a time window from")]
    MissingHistoricRange {
        /// Source whose descriptor lacks a historic range.
        source_id: String,
    },
    /// No station id could be resolved from overrides, quirks, or GeoJSON.
    #[error("source {source_id}: no weather station id could be resolved")]
    MissingStationId {
        /// Source for which station resolution failed.
        source_id: String,
    },
    /// A timestamp in the descriptor could not be parsed or formatted.
    #[error("source {source_id}: invalid timestamp: {value}")]
    InvalidTimestamp {
        /// Source whose descriptor carried the timestamp.
        source_id: String,
        /// The offending timestamp text.
        value: String,
    },
    /// A caller-supplied coordinate was not a finite number.
    #[error("source {source_id}: {field} must be a finite number")]
    NonFiniteCoordinate {
        /// Source the request was being built for.
        source_id: String,
        /// The offending coordinate parameter name.
        field: &'static str,
    },
}

// ============================================================================
// SECTION: Request Parameter Set
// ============================================================================

/// A concrete parameter set for one weather adapter request.
///
/// # Invariants
/// - Values are scalars only (strings, numbers, booleans).
/// - Produced fresh per resolution; carries no identity beyond the call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RequestParameterSet {
    /// Parameter name to scalar value, ordered by name.
    entries: BTreeMap<String, Value>,
}

impl RequestParameterSet {
    /// Returns the value for a parameter, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    /// Returns true when the parameter is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Returns the number of parameters in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the parameters as string pairs for query or form encoding.
    #[must_use]
    pub fn as_pairs(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.clone(), scalar_to_string(value)))
            .collect()
    }

    /// Inserts a scalar value under the given name.
    fn insert(&mut self, name: &str, value: Value) {
        self.entries.insert(name.to_string(), value);
    }
}

/// Renders a scalar JSON value the way the platform expects it in a query.
fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

// ============================================================================
// SECTION: Overrides
// ============================================================================

/// Caller-supplied values that take precedence over descriptor defaults.
///
/// # Invariants
/// - Every field is optional; an unset field means "use the default".
/// - Overrides always win over descriptor defaults and quirks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolveOverrides {
    /// Measuring interval in seconds.
    pub interval: Option<i64>,
    /// Requested parameter codes; serialized comma-joined.
    pub parameters: Option<Vec<String>>,
    /// Start of the requested period.
    pub time_start: Option<OffsetDateTime>,
    /// End of the requested period.
    pub time_end: Option<OffsetDateTime>,
    /// Station identifier for observation sources.
    pub weather_station_id: Option<i64>,
    /// WGS84 latitude for forecast sources.
    pub latitude: Option<f64>,
    /// WGS84 longitude for forecast sources.
    pub longitude: Option<f64>,
    /// Altitude in meters for forecast sources.
    pub altitude: Option<f64>,
    /// Tolerate partial station failures, for sources that support it.
    pub ignore_errors: Option<bool>,
}

// ============================================================================
// SECTION: Resolution
// ============================================================================

/// Resolves the request parameters for a weather data source.
///
/// Dispatches on the descriptor's access type: station-based sources yield
/// an observation query, point-based sources a forecast query.
///
/// # Errors
///
/// Returns [`ResolveError::UnsupportedAccessType`] for access types outside
/// `stations`/`location`, and the other [`ResolveError`] variants when the
/// descriptor cannot satisfy a required default.
pub fn resolve(
    source: &DataSourceDescriptor,
    overrides: &ResolveOverrides,
    clock: &dyn Clock,
) -> Result<RequestParameterSet, ResolveError> {
    match &source.access_type {
        AccessType::Stations => resolve_observation(source, overrides),
        AccessType::Location => resolve_forecast(source, overrides, clock),
        AccessType::Other(raw) => Err(ResolveError::UnsupportedAccessType {
            source_id: source.id.clone(),
            access_type: raw.clone(),
        }),
    }
}

/// Builds the parameter set for a station-based (observation) source.
fn resolve_observation(
    source: &DataSourceDescriptor,
    overrides: &ResolveOverrides,
) -> Result<RequestParameterSet, ResolveError> {
    let quirks = quirks_for(&source.id);
    let mut params = RequestParameterSet::default();

    insert_interval(&mut params, source, overrides)?;
    insert_parameters(&mut params, source, overrides);

    let start = match overrides.time_start {
        Some(start) => start,
        None => historic_window_start(source)?,
    };
    let end = overrides.time_end.unwrap_or(start + Duration::days(1));
    params.insert(PARAM_TIME_START, Value::String(format_timestamp(source, start)?));
    params.insert(PARAM_TIME_END, Value::String(format_timestamp(source, end)?));

    let station_id = resolve_station_id(source, overrides, quirks)?;
    params.insert(PARAM_STATION_ID, Value::Number(Number::from(station_id)));

    if quirks.is_some_and(|q| q.sends_ignore_errors) {
        params.insert(PARAM_IGNORE_ERRORS, Value::Bool(overrides.ignore_errors.unwrap_or(true)));
    }

    Ok(params)
}

/// Builds the parameter set for a point-based (forecast) source.
fn resolve_forecast(
    source: &DataSourceDescriptor,
    overrides: &ResolveOverrides,
    clock: &dyn Clock,
) -> Result<RequestParameterSet, ResolveError> {
    let quirks = quirks_for(&source.id);
    let mut params = RequestParameterSet::default();

    let latitude = overrides.latitude.unwrap_or(DEFAULT_LATITUDE);
    let longitude = overrides.longitude.unwrap_or(DEFAULT_LONGITUDE);
    params.insert(PARAM_LATITUDE, finite_number(source, PARAM_LATITUDE, latitude)?);
    params.insert(PARAM_LONGITUDE, finite_number(source, PARAM_LONGITUDE, longitude)?);

    if !quirks.is_some_and(|q| q.drops_altitude) {
        let altitude = overrides.altitude.unwrap_or(DEFAULT_ALTITUDE);
        params.insert(PARAM_ALTITUDE, finite_number(source, PARAM_ALTITUDE, altitude)?);
    }

    insert_interval(&mut params, source, overrides)?;
    insert_parameters(&mut params, source, overrides);

    if quirks.is_some_and(|q| q.requires_time_window) {
        let start = overrides.time_start.unwrap_or_else(|| clock.now());
        let end = overrides.time_end.unwrap_or(start + Duration::days(1));
        params.insert(PARAM_TIME_START, Value::String(format_timestamp(source, start)?));
        params.insert(PARAM_TIME_END, Value::String(format_timestamp(source, end)?));
    }

    Ok(params)
}

// ============================================================================
// SECTION: Defaulting Helpers
// ============================================================================

/// Inserts the measuring interval, defaulting to the source's first
/// declared interval.
fn insert_interval(
    params: &mut RequestParameterSet,
    source: &DataSourceDescriptor,
    overrides: &ResolveOverrides,
) -> Result<(), ResolveError> {
    let interval = match overrides.interval {
        Some(interval) => interval,
        None => source
            .temporal
            .as_ref()
            .and_then(|temporal| temporal.intervals.first())
            .copied()
            .ok_or_else(|| ResolveError::MissingIntervals {
                source_id: source.id.clone(),
            })?,
    };
    params.insert(PARAM_INTERVAL, Value::Number(Number::from(interval)));
    Ok(())
}

/// Inserts the comma-joined parameter codes, defaulting to the source's
/// common vocabulary.
fn insert_parameters(
    params: &mut RequestParameterSet,
    source: &DataSourceDescriptor,
    overrides: &ResolveOverrides,
) {
    let codes = overrides.parameters.clone().unwrap_or_else(|| {
        source.parameters.as_ref().map(|groups| groups.common.clone()).unwrap_or_default()
    });
    params.insert(PARAM_PARAMETERS, Value::String(codes.join(",")));
}

/// Returns the default observation window start: one day after the first
/// historic instant the source holds.
fn historic_window_start(source: &DataSourceDescriptor) -> Result<OffsetDateTime, ResolveError> {
    let start_text = source
        .temporal
        .as_ref()
        .and_then(|temporal| temporal.historic.as_ref())
        .and_then(|historic| historic.start.as_deref())
        .ok_or_else(|| ResolveError::MissingHistoricRange {
            source_id: source.id.clone(),
        })?;
    let start = OffsetDateTime::parse(start_text, &Rfc3339).map_err(|_| {
        ResolveError::InvalidTimestamp {
            source_id: source.id.clone(),
            value: start_text.to_string(),
        }
    })?;
    Ok(start + Duration::days(1))
}

/// Formats a timestamp as RFC 3339, preserving its explicit offset.
fn format_timestamp(
    source: &DataSourceDescriptor,
    timestamp: OffsetDateTime,
) -> Result<String, ResolveError> {
    timestamp.format(&Rfc3339).map_err(|_| ResolveError::InvalidTimestamp {
        source_id: source.id.clone(),
        value: timestamp.to_string(),
    })
}

/// Converts a coordinate to a JSON number, rejecting NaN and infinities.
fn finite_number(
    source: &DataSourceDescriptor,
    field: &'static str,
    value: f64,
) -> Result<Value, ResolveError> {
    Number::from_f64(value).map(Value::Number).ok_or(ResolveError::NonFiniteCoordinate {
        source_id: source.id.clone(),
        field,
    })
}

/// Resolves the station id: override, then quirks fallback, then the first
/// GeoJSON feature (top-level `id` preferred over `properties.id`).
fn resolve_station_id(
    source: &DataSourceDescriptor,
    overrides: &ResolveOverrides,
    quirks: Option<&'static SourceQuirks>,
) -> Result<i64, ResolveError> {
    if let Some(station_id) = overrides.weather_station_id {
        return Ok(station_id);
    }
    if let Some(station_id) = quirks.and_then(|q| q.fallback_station_id) {
        return Ok(station_id);
    }
    source
        .spatial
        .as_ref()
        .and_then(|spatial| spatial.features())
        .and_then(|features| features.first().cloned())
        .and_then(|feature| {
            feature_id(&feature).or_else(|| feature.get("properties").and_then(feature_id))
        })
        .ok_or_else(|| ResolveError::MissingStationId {
            source_id: source.id.clone(),
        })
}

/// Extracts a numeric `id` from a GeoJSON feature or properties object,
/// accepting both numbers and numeric strings.
fn feature_id(object: &Value) -> Option<i64> {
    match object.get("id")? {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.parse().ok(),
        _ => None,
    }
}
