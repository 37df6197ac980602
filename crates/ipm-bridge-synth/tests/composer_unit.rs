// crates/ipm-bridge-synth/tests/composer_unit.rs
// ============================================================================
// Module: Composer Tests
// Description: Tests for override priority and placeholder injection.
// Purpose: Pin fail-closed behavior for missing and incompatible data.
// ============================================================================

//! ## Overview
//! Validates composition priority (override, then schema default, then
//! fake), mandatory injection for referenced placeholders, and weather
//! data compatibility checks.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use ipm_bridge_core::ModelDescriptor;
use ipm_bridge_core::ModelExecution;
use ipm_bridge_core::ModelInputSpec;
use ipm_bridge_core::WeatherData;
use ipm_bridge_core::WeatherParameterRequirement;
use ipm_bridge_synth::ComposeError;
use ipm_bridge_synth::ComposeInputs;
use ipm_bridge_synth::compose;
use ipm_bridge_synth::synthesize;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;

/// Input schema referencing weather data and field observations.
fn input_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "modelId": {"type": "string", "default": "PSILARTEMP"},
            "configParameters": {
                "type": "object",
                "properties": {
                    "timeZone": {"type": "string", "default": "Europe/Oslo"},
                    "startDate": {"type": "string", "format": "date"},
                    "fieldObservations": {"type": "array", "items": {"type": "object"}}
                },
                "required": ["timeZone", "startDate", "fieldObservations"]
            },
            "weatherData": {"type": "object"}
        },
        "required": ["modelId", "configParameters", "weatherData"]
    })
}

/// Model descriptor requiring mean temperature at an hourly interval.
fn model() -> ModelDescriptor {
    ModelDescriptor {
        id: "PSILARTEMP".to_owned(),
        name: Some("Carrot rust fly temperature model".to_owned()),
        execution: ModelExecution {
            endpoint: "https://dss.test/models/PSILARTEMP/run".to_owned(),
            kind: Some("ONTHEFLY".to_owned()),
            input_schema: input_schema(),
        },
        input: Some(ModelInputSpec {
            weather_parameters: Some(vec![WeatherParameterRequirement {
                parameter_code: "TM".to_owned(),
                interval: 3600,
            }]),
            field_observation: None,
        }),
    }
}

/// Weather data with the given codes and sampling interval.
fn weather(codes: &[&str], interval: i64) -> WeatherData {
    WeatherData {
        weather_parameters: codes.iter().map(|code| (*code).to_owned()).collect(),
        interval,
        rest: Map::new(),
    }
}

/// Inputs supplying weather data plus field observations.
fn full_inputs<'a>(weather_data: &'a WeatherData, observations: &'a Value) -> ComposeInputs<'a> {
    ComposeInputs {
        weather_data: Some(weather_data),
        field_observations: Some(observations),
        ..ComposeInputs::default()
    }
}

#[test]
fn missing_weather_data_is_rejected() {
    let model = model();
    let synthesis = synthesize(&model.execution.input_schema);
    let observations = json!([{"location": {"type": "Point"}}]);
    let inputs =
        ComposeInputs { field_observations: Some(&observations), ..ComposeInputs::default() };
    let error = compose(&model, &synthesis, &inputs).unwrap_err();
    assert_eq!(
        error,
        ComposeError::MissingRequiredInput {
            model_id: "PSILARTEMP".to_owned(),
            field: "weatherData".to_owned(),
        }
    );
}

#[test]
fn missing_field_observations_are_rejected() {
    let model = model();
    let synthesis = synthesize(&model.execution.input_schema);
    let data = weather(&["TM"], 3600);
    let inputs = ComposeInputs { weather_data: Some(&data), ..ComposeInputs::default() };
    let error = compose(&model, &synthesis, &inputs).unwrap_err();
    assert_eq!(
        error,
        ComposeError::MissingRequiredInput {
            model_id: "PSILARTEMP".to_owned(),
            field: "fieldObservations".to_owned(),
        }
    );
}

#[test]
fn superset_weather_data_is_injected() {
    let model = model();
    let synthesis = synthesize(&model.execution.input_schema);
    let data = weather(&["TM", "RR"], 3600);
    let observations = json!([{"location": {"type": "Point"}}]);
    let document = compose(&model, &synthesis, &full_inputs(&data, &observations)).unwrap();
    assert_eq!(
        document.pointer("/weatherData/weatherParameters"),
        Some(&json!(["TM", "RR"]))
    );
    assert_eq!(document.pointer("/weatherData/interval"), Some(&json!(3600)));
    assert_eq!(document.pointer("/configParameters/fieldObservations"), Some(&observations));
}

#[test]
fn wrong_interval_is_rejected() {
    let model = model();
    let synthesis = synthesize(&model.execution.input_schema);
    let data = weather(&["TM"], 7200);
    let observations = json!([]);
    let error = compose(&model, &synthesis, &full_inputs(&data, &observations)).unwrap_err();
    assert_eq!(
        error,
        ComposeError::IncompatibleWeatherData {
            model_id: "PSILARTEMP".to_owned(),
            missing_parameters: Vec::new(),
            expected_interval: Some(3600),
            actual_interval: 7200,
        }
    );
}

#[test]
fn missing_parameter_codes_are_rejected_and_named() {
    let model = model();
    let synthesis = synthesize(&model.execution.input_schema);
    let data = weather(&["RR"], 3600);
    let observations = json!([]);
    let error = compose(&model, &synthesis, &full_inputs(&data, &observations)).unwrap_err();
    assert_eq!(
        error,
        ComposeError::IncompatibleWeatherData {
            model_id: "PSILARTEMP".to_owned(),
            missing_parameters: vec!["TM".to_owned()],
            expected_interval: Some(3600),
            actual_interval: 3600,
        }
    );
}

#[test]
fn overrides_beat_schema_defaults() {
    let model = model();
    let synthesis = synthesize(&model.execution.input_schema);
    let data = weather(&["TM"], 3600);
    let observations = json!([]);
    let mut parameters = Map::new();
    parameters.insert("timeZone".to_owned(), json!("UTC"));
    let inputs = ComposeInputs {
        parameters: Some(&parameters),
        ..full_inputs(&data, &observations)
    };
    let document = compose(&model, &synthesis, &inputs).unwrap();
    assert_eq!(document.pointer("/configParameters/timeZone"), Some(&json!("UTC")));
}

#[test]
fn schema_defaults_beat_fakes() {
    let model = model();
    let synthesis = synthesize(&model.execution.input_schema);
    let data = weather(&["TM"], 3600);
    let observations = json!([]);
    let document = compose(&model, &synthesis, &full_inputs(&data, &observations)).unwrap();
    assert_eq!(document.pointer("/configParameters/timeZone"), Some(&json!("Europe/Oslo")));
}

#[test]
fn override_on_a_placeholder_satisfies_the_requirement() {
    let model = model();
    let synthesis = synthesize(&model.execution.input_schema);
    let data = weather(&["TM"], 3600);
    let mut parameters = Map::new();
    parameters.insert("fieldObservations".to_owned(), json!([{"quantity": 3}]));
    let inputs = ComposeInputs {
        parameters: Some(&parameters),
        weather_data: Some(&data),
        ..ComposeInputs::default()
    };
    let document = compose(&model, &synthesis, &inputs).unwrap();
    assert_eq!(
        document.pointer("/configParameters/fieldObservations"),
        Some(&json!([{"quantity": 3}]))
    );
}

#[test]
fn unreferenced_supplied_data_is_ignored() {
    let model = model();
    let synthesis = synthesize(&model.execution.input_schema);
    let data = weather(&["TM"], 3600);
    let observations = json!([]);
    let quantifications = json!([{"percentage": 12}]);
    let inputs = ComposeInputs {
        field_observation_quantifications: Some(&quantifications),
        ..full_inputs(&data, &observations)
    };
    let document = compose(&model, &synthesis, &inputs).unwrap();
    assert_eq!(document.pointer("/configParameters/fieldObservationQuantifications"), None);
}

#[test]
fn models_without_declared_weather_needs_accept_any_interval() {
    let mut model = model();
    model.input = None;
    let synthesis = synthesize(&model.execution.input_schema);
    let data = weather(&["UM"], 60);
    let observations = json!([]);
    let document = compose(&model, &synthesis, &full_inputs(&data, &observations)).unwrap();
    assert_eq!(document.pointer("/weatherData/interval"), Some(&json!(60)));
}

#[test]
fn composed_documents_carry_no_sentinels() {
    let model = model();
    let synthesis = synthesize(&model.execution.input_schema);
    let data = weather(&["TM"], 3600);
    let observations = json!([{"quantity": 1}]);
    let document = compose(&model, &synthesis, &full_inputs(&data, &observations)).unwrap();
    let rendered = document.to_string();
    assert!(!rendered.contains("{weatherData}"));
    assert!(!rendered.contains("{fieldObservations}"));
}
