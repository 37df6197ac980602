// crates/ipm-bridge-client/tests/catalog_unit.rs
// ============================================================================
// Module: Catalog Unit Tests
// Description: Tests for catalog fetching, lookup, and normalization.
// Purpose: Pin descriptor decoding and fail-closed unknown-id behavior.
// ============================================================================

//! ## Overview
//! Serves catalog documents from a local server and checks that source
//! and model lookups decode, normalize encoded schemas, and embed known
//! identifiers in their errors.

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

use std::thread;

use ipm_bridge_client::CatalogError;
use ipm_bridge_client::PlatformCatalog;
use ipm_bridge_client::ReqwestTransport;
use ipm_bridge_client::SourceFilter;
use ipm_bridge_client::TransportConfig;
use ipm_bridge_core::AccessType;
use serde_json::Value;
use serde_json::json;
use tiny_http::Response;
use tiny_http::Server;

// ============================================================================
// SECTION: Test Helpers
// ============================================================================

/// Weather source catalog with one station source and one location source.
fn source_catalog() -> Value {
    json!([
        {
            "id": "no.nibio.lmt",
            "name": "Landbruksmeteorologisk tjeneste",
            "access_type": "stations",
            "authentication_type": "NONE",
            "endpoint": "{WEATHER_API_URL}/rest/weatheradapter/lmt/",
            "temporal": {"intervals": [3600, 86400], "historic": {"start": "2010-01-01T00:00:00+02:00"}},
            "parameters": {"common": ["TM", "RR"]},
            "spatial": {"geoJSON": "{\"type\":\"FeatureCollection\",\"features\":[{\"id\":\"46\"}]}"}
        },
        {
            "id": "no.met.locationforecast",
            "access_type": "location",
            "endpoint": "{WEATHER_API_URL}/rest/weatheradapter/yr/"
        }
    ])
}

/// DSS catalog with one DSS carrying one model whose schema is a string.
fn dss_catalog() -> Value {
    json!([
        {
            "id": "no.nibio.vips",
            "name": "VIPS",
            "models": [
                {
                    "id": "PSILARTEMP",
                    "name": "Carrot rust fly temperature model",
                    "execution": {
                        "endpoint": "https://dss.test/models/PSILARTEMP/run",
                        "type": "ONTHEFLY",
                        "input_schema": "{\"type\":\"object\",\"properties\":{\"modelId\":{\"type\":\"string\"}}}"
                    },
                    "input": {
                        "weather_parameters": [{"parameter_code": "TM", "interval": 3600}]
                    }
                }
            ]
        }
    ])
}

/// Serves `count` catalog requests, routing on the request path.
fn spawn_catalog_server(count: usize) -> (String, thread::JoinHandle<()>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let base = format!("http://{}", server.server_addr());
    let handle = thread::spawn(move || {
        for _ in 0 .. count {
            let Ok(request) = server.recv() else { return };
            let body = if request.url().contains("weatherdatasource") {
                source_catalog().to_string()
            } else if request.url().contains("validate") {
                json!({"isValid": true}).to_string()
            } else if request.url().contains("/dss") {
                dss_catalog().to_string()
            } else {
                json!([{"id": "TM"}]).to_string()
            };
            let _ = request.respond(Response::from_string(body));
        }
    });
    (base, handle)
}

/// Catalog client against the local server.
fn catalog(base: &str) -> PlatformCatalog<ReqwestTransport> {
    let transport = ReqwestTransport::new(&TransportConfig {
        timeout_ms: 2_000,
        ..TransportConfig::default()
    })
    .unwrap();
    PlatformCatalog::with_base_url(transport, base).unwrap()
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn weather_data_sources_decode_into_typed_descriptors() {
    let (base, handle) = spawn_catalog_server(1);
    let sources = catalog(&base).weather_data_sources().unwrap();
    handle.join().unwrap();
    assert_eq!(sources.len(), 2);
    assert_eq!(sources[0].id, "no.nibio.lmt");
    assert_eq!(sources[0].access_type, AccessType::Stations);
    let features = sources[0].spatial.as_ref().and_then(|s| s.features()).unwrap();
    assert_eq!(features[0].get("id"), Some(&json!("46")));
}

#[test]
fn source_lookup_finds_cataloged_ids() {
    let (base, handle) = spawn_catalog_server(1);
    let source = catalog(&base).weather_data_source("no.met.locationforecast").unwrap();
    handle.join().unwrap();
    assert_eq!(source.access_type, AccessType::Location);
}

#[test]
fn unknown_source_ids_fail_with_the_known_list() {
    let (base, handle) = spawn_catalog_server(1);
    let error = catalog(&base).weather_data_source("se.example.missing").unwrap_err();
    handle.join().unwrap();
    assert_eq!(
        error,
        CatalogError::UnknownDataSource {
            source_id: "se.example.missing".to_string(),
            known: vec!["no.nibio.lmt".to_string(), "no.met.locationforecast".to_string()],
        }
    );
}

#[test]
fn model_lookup_decodes_the_encoded_input_schema() {
    let (base, handle) = spawn_catalog_server(1);
    let model = catalog(&base).model("no.nibio.vips", "PSILARTEMP").unwrap();
    handle.join().unwrap();
    assert_eq!(
        model.execution.input_schema,
        json!({"type": "object", "properties": {"modelId": {"type": "string"}}})
    );
    assert_eq!(model.required_parameter_codes(), vec!["TM"]);
    assert_eq!(model.required_interval(), Some(3600));
}

#[test]
fn unknown_dss_and_model_ids_fail_with_known_lists() {
    let (base, handle) = spawn_catalog_server(2);
    let client = catalog(&base);
    let missing_dss = client.model("fi.example.missing", "PSILARTEMP").unwrap_err();
    let missing_model = client.model("no.nibio.vips", "NOSUCHMODEL").unwrap_err();
    handle.join().unwrap();
    assert_eq!(
        missing_dss,
        CatalogError::UnknownDss {
            dss_id: "fi.example.missing".to_string(),
            known: vec!["no.nibio.vips".to_string()],
        }
    );
    assert_eq!(
        missing_model,
        CatalogError::UnknownModel {
            dss_id: "no.nibio.vips".to_string(),
            model_id: "NOSUCHMODEL".to_string(),
            known: vec!["PSILARTEMP".to_string()],
        }
    );
}

#[test]
fn weather_parameters_pass_through_unmodified() {
    let (base, handle) = spawn_catalog_server(1);
    let parameters = catalog(&base).weather_parameters().unwrap();
    handle.join().unwrap();
    assert_eq!(parameters, json!([{"id": "TM"}]));
}

#[test]
fn source_filters_narrow_the_listing() {
    let (base, handle) = spawn_catalog_server(1);
    let filter = SourceFilter { access_type: Some(AccessType::Location), ..SourceFilter::default() };
    let sources = catalog(&base).weather_data_sources_matching(&filter).unwrap();
    handle.join().unwrap();
    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0].id, "no.met.locationforecast");
}

#[test]
fn weather_data_validation_returns_the_platform_verdict() {
    let (base, handle) = spawn_catalog_server(1);
    let verdict = catalog(&base).validate_weather_data(&json!({"interval": 3600})).unwrap();
    handle.join().unwrap();
    assert!(verdict);
}

#[test]
fn dss_lookup_finds_cataloged_systems() {
    let (base, handle) = spawn_catalog_server(1);
    let dss = catalog(&base).dss("no.nibio.vips").unwrap();
    handle.join().unwrap();
    assert_eq!(dss.name.as_deref(), Some("VIPS"));
    assert_eq!(dss.models.len(), 1);
}

#[test]
fn invalid_base_urls_are_rejected_up_front() {
    let transport = ReqwestTransport::new(&TransportConfig::default()).unwrap();
    let error = PlatformCatalog::with_base_url(transport, "not a url").unwrap_err();
    assert!(matches!(error, CatalogError::InvalidBaseUrl { .. }));
}
