// crates/ipm-bridge-core/src/model.rs
// ============================================================================
// Module: DSS Model Descriptors
// Description: Platform-supplied metadata describing a decision support model.
// Purpose: Give synthesis and invocation a typed view of model requirements.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! A [`ModelDescriptor`] carries everything needed to run a DSS model: the
//! execution endpoint, the JSON Schema of the model's input document, and
//! the weather parameters the model requires. The input schema is authored
//! by the model vendor, not by the platform or by us, so it is kept as a raw
//! [`serde_json::Value`] and interpreted defensively downstream.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

// ============================================================================
// SECTION: Model Descriptor
// ============================================================================

/// One weather parameter a model requires as input.
///
/// # Invariants
/// - `interval` is the sampling interval in seconds the model expects for
///   this parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherParameterRequirement {
    /// Platform parameter code, e.g. `TM` for mean air temperature.
    pub parameter_code: String,
    /// Required sampling interval in seconds.
    pub interval: i64,
}

/// Declared inputs of a model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelInputSpec {
    /// Weather parameters the model consumes, ordered by the vendor.
    /// `None` when the model takes no weather data at all.
    #[serde(default)]
    pub weather_parameters: Option<Vec<WeatherParameterRequirement>>,
    /// Vendor-declared field observation sub-schema, kept opaque.
    #[serde(default)]
    pub field_observation: Option<Value>,
}

/// How a model is executed.
///
/// # Invariants
/// - `input_schema` is a decoded JSON Schema document. The platform ships it
///   as a JSON-encoded string; the catalog layer decodes it before this type
///   is constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelExecution {
    /// Absolute URL of the model's execution endpoint.
    pub endpoint: String,
    /// Execution kind advertised by the platform, e.g. `ONTHEFLY`.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// JSON Schema for the model's execution input document.
    pub input_schema: Value,
}

/// Platform metadata describing one DSS model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// Model identifier within its DSS, e.g. `PSILARTEMP`.
    pub id: String,
    /// Human-readable model name.
    #[serde(default)]
    pub name: Option<String>,
    /// Execution endpoint and input schema.
    pub execution: ModelExecution,
    /// Declared model inputs.
    #[serde(default)]
    pub input: Option<ModelInputSpec>,
}

impl ModelDescriptor {
    /// Returns the parameter codes the model requires, in declared order.
    #[must_use]
    pub fn required_parameter_codes(&self) -> Vec<&str> {
        self.input
            .as_ref()
            .and_then(|input| input.weather_parameters.as_ref())
            .map(|requirements| {
                requirements.iter().map(|req| req.parameter_code.as_str()).collect()
            })
            .unwrap_or_default()
    }

    /// Returns the sampling interval of the first declared weather
    /// parameter, which the platform treats as the model's required interval.
    #[must_use]
    pub fn required_interval(&self) -> Option<i64> {
        self.input
            .as_ref()
            .and_then(|input| input.weather_parameters.as_ref())
            .and_then(|requirements| requirements.first())
            .map(|req| req.interval)
    }
}
