// crates/ipm-bridge-synth/src/compose.rs
// ============================================================================
// Module: Input Document Composer
// Description: Fills a skeleton input document with real caller data.
// Purpose: Replace placeholders by recorded path and apply config overrides.
// Dependencies: ipm-bridge-core, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Composition takes the skeleton produced by [`synthesize`] and turns it
//! into a real model input document. Caller-supplied configuration values
//! override faked ones, schema defaults fill the remainder, and weather
//! data plus field observations are injected at the placeholder paths the
//! synthesizer recorded. Injection is mandatory exactly when the schema
//! references the placeholder; supplied data the schema never references
//! is dropped silently. Weather data is checked against the model's
//! declared parameter codes and sampling interval before injection, and
//! composition fails closed on any gap.
//!
//! [`synthesize`]: crate::synth::synthesize

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use ipm_bridge_core::ModelDescriptor;
use ipm_bridge_core::WeatherData;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

use crate::synth::InjectionKind;
use crate::synth::Synthesis;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Why a skeleton document could not be composed into a model input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ComposeError {
    /// The schema references injected data the caller did not supply.
    #[error("model `{model_id}` requires `{field}` as input")]
    MissingRequiredInput {
        /// Identifier of the model being composed for.
        model_id: String,
        /// Name of the missing input property.
        field: String,
    },
    /// Supplied weather data does not satisfy the model's declared needs.
    #[error(
        "weather data incompatible with model `{model_id}`: missing parameters [{}], expected interval {}, got {actual_interval}",
        missing_parameters.join(", "),
        expected_interval.map_or_else(|| "unspecified".to_owned(), |seconds| seconds.to_string())
    )]
    IncompatibleWeatherData {
        /// Identifier of the model being composed for.
        model_id: String,
        /// Required parameter codes absent from the supplied data.
        missing_parameters: Vec<String>,
        /// Sampling interval the model declares, when it declares one.
        expected_interval: Option<i64>,
        /// Sampling interval of the supplied data.
        actual_interval: i64,
    },
    /// A recorded placeholder path does not resolve in the skeleton.
    #[error("skeleton document has no value at `{path}`")]
    SkeletonMismatch {
        /// The placeholder path that failed to resolve.
        path: String,
    },
}

// ============================================================================
// SECTION: Inputs
// ============================================================================

/// Caller-supplied data for one composition.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComposeInputs<'a> {
    /// Configuration overrides, keyed by `configParameters` property name.
    pub parameters: Option<&'a Map<String, Value>>,
    /// Weather data to inject, when the caller fetched any.
    pub weather_data: Option<&'a WeatherData>,
    /// Field observation features to inject.
    pub field_observations: Option<&'a Value>,
    /// Per-observation quantification records to inject.
    pub field_observation_quantifications: Option<&'a Value>,
}

// ============================================================================
// SECTION: Composition
// ============================================================================

/// Composes a model input document from a skeleton and caller data.
///
/// Configuration values resolve in priority order: caller override, then
/// schema default, then the faked value already in the skeleton. Injected
/// data replaces the recorded placeholders; a caller override naming a
/// placeholder property satisfies it instead.
///
/// # Errors
/// Returns [`ComposeError::MissingRequiredInput`] when the schema
/// references injected data the caller did not supply,
/// [`ComposeError::IncompatibleWeatherData`] when supplied weather data
/// lacks a required parameter code or uses the wrong sampling interval,
/// and [`ComposeError::SkeletonMismatch`] when a recorded placeholder
/// path does not resolve in the skeleton document.
pub fn compose(
    model: &ModelDescriptor,
    synthesis: &Synthesis,
    inputs: &ComposeInputs<'_>,
) -> Result<Value, ComposeError> {
    let mut document = synthesis.document.clone();
    let satisfied = apply_config_values(model, synthesis, inputs, &mut document);

    if let Some(path) = synthesis.path_of(InjectionKind::WeatherData) {
        match inputs.weather_data {
            Some(weather) => {
                check_weather(model, weather)?;
                set_at(&mut document, path, weather_value(weather))?;
            }
            None => {
                return Err(ComposeError::MissingRequiredInput {
                    model_id: model.id.clone(),
                    field: InjectionKind::WeatherData.property_name().to_owned(),
                });
            }
        }
    }

    let observation_inputs = [
        (InjectionKind::FieldObservations, inputs.field_observations),
        (InjectionKind::FieldObservationQuantifications, inputs.field_observation_quantifications),
    ];
    for (kind, supplied) in observation_inputs {
        let Some(path) = synthesis.path_of(kind) else { continue };
        if satisfied.contains(path) {
            continue;
        }
        match supplied {
            Some(value) => set_at(&mut document, path, value.clone())?,
            None => {
                return Err(ComposeError::MissingRequiredInput {
                    model_id: model.id.clone(),
                    field: kind.property_name().to_owned(),
                });
            }
        }
    }

    Ok(document)
}

/// Applies caller overrides and schema defaults to `configParameters`.
/// Returns the placeholder paths an override already satisfied.
fn apply_config_values(
    model: &ModelDescriptor,
    synthesis: &Synthesis,
    inputs: &ComposeInputs<'_>,
    document: &mut Value,
) -> BTreeSet<String> {
    let mut satisfied = BTreeSet::new();
    let defaults = model.execution.input_schema.pointer("/properties/configParameters/properties");
    let Some(config) = document.get_mut("configParameters").and_then(Value::as_object_mut) else {
        return satisfied;
    };
    for (key, slot) in config.iter_mut() {
        let path = format!("/configParameters/{key}");
        let is_placeholder = synthesis.placeholders.contains_key(&path);
        if let Some(value) = inputs.parameters.and_then(|parameters| parameters.get(key)) {
            *slot = value.clone();
            if is_placeholder {
                satisfied.insert(path);
            }
            continue;
        }
        if is_placeholder {
            continue;
        }
        let default = defaults
            .and_then(|properties| properties.get(key))
            .and_then(|property| property.get("default"));
        if let Some(value) = default {
            *slot = value.clone();
        }
    }
    satisfied
}

/// Checks supplied weather data against the model's declared requirements.
fn check_weather(model: &ModelDescriptor, weather: &WeatherData) -> Result<(), ComposeError> {
    let missing: Vec<String> = model
        .required_parameter_codes()
        .into_iter()
        .filter(|code| !weather.covers([*code]))
        .map(str::to_owned)
        .collect();
    let expected_interval = model.required_interval();
    let interval_matches =
        expected_interval.is_none_or(|expected| expected == weather.interval);
    if missing.is_empty() && interval_matches {
        return Ok(());
    }
    Err(ComposeError::IncompatibleWeatherData {
        model_id: model.id.clone(),
        missing_parameters: missing,
        expected_interval,
        actual_interval: weather.interval,
    })
}

/// Serializes weather data into the platform exchange shape.
fn weather_value(weather: &WeatherData) -> Value {
    let mut map = weather.rest.clone();
    map.insert(
        "weatherParameters".to_owned(),
        Value::Array(weather.weather_parameters.iter().cloned().map(Value::String).collect()),
    );
    map.insert("interval".to_owned(), Value::Number(weather.interval.into()));
    Value::Object(map)
}

/// Writes `value` at a recorded placeholder path.
fn set_at(document: &mut Value, path: &str, value: Value) -> Result<(), ComposeError> {
    let slot = document
        .pointer_mut(path)
        .ok_or_else(|| ComposeError::SkeletonMismatch { path: path.to_owned() })?;
    *slot = value;
    Ok(())
}
