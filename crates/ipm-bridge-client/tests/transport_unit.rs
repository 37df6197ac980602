// crates/ipm-bridge-client/tests/transport_unit.rs
// ============================================================================
// Module: Transport Unit Tests
// Description: Tests for HTTP exchange behavior and error classification.
// Purpose: Pin status handling, decode failures, and timeout behavior.
// ============================================================================

//! ## Overview
//! Exercises the production transport against local servers: JSON decode
//! paths, non-success statuses, connection failures, and timeouts.

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

use std::net::TcpListener;
use std::thread;
use std::time::Duration;

use ipm_bridge_client::ReqwestTransport;
use ipm_bridge_client::Transport;
use ipm_bridge_client::TransportConfig;
use ipm_bridge_client::TransportError;
use serde_json::json;
use tiny_http::Response;
use tiny_http::Server;
use url::Url;

// ============================================================================
// SECTION: Test Helpers
// ============================================================================

/// Transport with a short timeout suitable for local servers.
fn transport() -> ReqwestTransport {
    ReqwestTransport::new(&TransportConfig { timeout_ms: 2_000, ..TransportConfig::default() })
        .unwrap()
}

/// Serves exactly one request with the given status and body.
fn serve_once(status: u16, body: &str) -> (Url, thread::JoinHandle<()>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let url = Url::parse(&format!("http://{}/", server.server_addr())).unwrap();
    let body = body.to_string();
    let handle = thread::spawn(move || {
        if let Ok(request) = server.recv() {
            let response = Response::from_string(body).with_status_code(status);
            let _ = request.respond(response);
        }
    });
    (url, handle)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn get_json_decodes_json_bodies() {
    let (url, handle) = serve_once(200, r#"{"interval": 3600}"#);
    let value = transport().get_json(&url).unwrap();
    handle.join().unwrap();
    assert_eq!(value, json!({"interval": 3600}));
}

#[test]
fn non_success_statuses_become_status_errors() {
    let (url, handle) = serve_once(404, "not here");
    let error = transport().get_json(&url).unwrap_err();
    handle.join().unwrap();
    assert_eq!(error, TransportError::Status { status: 404, url: url.to_string() });
    assert!(!error.is_retryable());
}

#[test]
fn server_errors_are_retryable() {
    let (url, handle) = serve_once(503, "maintenance");
    let error = transport().get_json(&url).unwrap_err();
    handle.join().unwrap();
    assert!(error.is_retryable());
}

#[test]
fn non_json_bodies_become_decode_errors() {
    let (url, handle) = serve_once(200, "<html>surprise</html>");
    let error = transport().get_json(&url).unwrap_err();
    handle.join().unwrap();
    assert!(matches!(error, TransportError::Decode { .. }));
}

#[test]
fn post_json_sends_the_document() {
    let server = Server::http("127.0.0.1:0").unwrap();
    let url = Url::parse(&format!("http://{}/", server.server_addr())).unwrap();
    let handle = thread::spawn(move || {
        if let Ok(mut request) = server.recv() {
            let mut content = String::new();
            let _ = request.as_reader().read_to_string(&mut content);
            let _ = request.respond(Response::from_string(content));
        }
    });
    let sent = json!({"modelId": "PSILARTEMP", "weatherData": {"interval": 3600}});
    let echoed = transport().post_json(&url, &sent).unwrap();
    handle.join().unwrap();
    assert_eq!(echoed, sent);
}

#[test]
fn post_form_encodes_pairs_in_order() {
    let server = Server::http("127.0.0.1:0").unwrap();
    let url = Url::parse(&format!("http://{}/", server.server_addr())).unwrap();
    let handle = thread::spawn(move || {
        if let Ok(mut request) = server.recv() {
            let mut content = String::new();
            let _ = request.as_reader().read_to_string(&mut content);
            let _ = request.respond(Response::from_string(json!({ "body": content }).to_string()));
        }
    });
    let form =
        vec![("interval".to_string(), "3600".to_string()), ("ignoreErrors".to_string(), "true".to_string())];
    let value = transport().post_form(&url, &form).unwrap();
    handle.join().unwrap();
    assert_eq!(value, json!({"body": "interval=3600&ignoreErrors=true"}));
}

#[test]
fn connection_failures_become_request_errors() {
    // Bind and drop to find a port nothing listens on.
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let url = Url::parse(&format!("http://{addr}/")).unwrap();
    let error = transport().get_json(&url).unwrap_err();
    assert!(matches!(error, TransportError::Request { .. }));
    assert!(!error.is_retryable());
}

#[test]
fn slow_servers_time_out() {
    let server = Server::http("127.0.0.1:0").unwrap();
    let url = Url::parse(&format!("http://{}/", server.server_addr())).unwrap();
    let handle = thread::spawn(move || {
        if let Ok(request) = server.recv() {
            thread::sleep(Duration::from_millis(600));
            let _ = request.respond(Response::from_string("{}"));
        }
    });
    let slow = ReqwestTransport::new(&TransportConfig {
        timeout_ms: 100,
        ..TransportConfig::default()
    })
    .unwrap();
    let error = slow.get_json(&url).unwrap_err();
    handle.join().unwrap();
    assert_eq!(error, TransportError::Timeout { url: url.to_string() });
    assert!(error.is_retryable());
}
