// crates/ipm-bridge-client/src/lib.rs
// ============================================================================
// Module: IPM Bridge Client
// Description: HTTP client for the IPM Decisions platform.
// Purpose: Catalog access, weather adapter invocation, and model runs.
// Dependencies: ipm-bridge-core, ipm-bridge-synth, reqwest, serde, url
// ============================================================================

//! ## Overview
//! This crate is the wire-facing layer of the bridge. A [`Transport`]
//! seam wraps blocking HTTP; [`PlatformCatalog`] fetches and normalizes
//! the platform's weather source and DSS model catalogs;
//! [`fetch_weather_data`] invokes a source's adapter with a resolved
//! parameter set; and [`ModelRunner`] composes and POSTs model input
//! documents. Everything network-touching is generic over the transport
//! so tests run against local servers or canned responses.
//! Invariants:
//! - Model responses are returned unmodified; their shape belongs to the
//!   model vendor.
//! - Lookup failures embed the identifiers the platform actually lists.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod adapter;
pub mod catalog;
pub mod runner;
pub mod transport;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use adapter::AdapterError;
pub use adapter::Credentials;
pub use adapter::WEATHER_API_URL_TOKEN;
pub use adapter::fetch_weather_data;
pub use catalog::CatalogError;
pub use catalog::DEFAULT_BASE_URL;
pub use catalog::DssDescriptor;
pub use catalog::PlatformCatalog;
pub use catalog::SourceFilter;
pub use runner::ModelRunner;
pub use runner::RunError;
pub use transport::ReqwestTransport;
pub use transport::Transport;
pub use transport::TransportConfig;
pub use transport::TransportError;
