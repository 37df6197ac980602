// crates/ipm-bridge-core/src/lib.rs
// ============================================================================
// Module: IPM Bridge Core
// Description: Domain model and parameter resolution for the IPM Decisions platform.
// Purpose: Provide descriptor types, the source quirks registry, and the resolver.
// Dependencies: serde, serde_json, thiserror, time
// ============================================================================

//! ## Overview
//! This crate holds the data model for weather data sources and DSS models as
//! described by the IPM Decisions platform, plus the Source Parameter Resolver
//! that turns a source descriptor and caller overrides into a concrete request
//! parameter set. Descriptors are supplied at runtime by third parties and are
//! deserialized leniently; the resolver fails closed with typed errors instead
//! of guessing.
//! Invariants:
//! - The resolver is a pure function of descriptor, overrides, and an
//!   injected [`Clock`]; it performs no I/O and never reads wall-clock time.
//! - Source-specific quirks live in the data-driven [`quirks::SOURCE_QUIRKS`]
//!   table, never in branching code.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod clock;
pub mod model;
pub mod quirks;
pub mod resolver;
pub mod source;
pub mod weather;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use clock::Clock;
pub use clock::FixedClock;
pub use clock::SystemClock;
pub use model::ModelDescriptor;
pub use model::ModelExecution;
pub use model::ModelInputSpec;
pub use model::WeatherParameterRequirement;
pub use quirks::SourceQuirks;
pub use quirks::quirks_for;
pub use resolver::RequestParameterSet;
pub use resolver::ResolveError;
pub use resolver::ResolveOverrides;
pub use resolver::resolve;
pub use source::AccessType;
pub use source::AuthenticationType;
pub use source::DataSourceDescriptor;
pub use source::HistoricRange;
pub use source::ParameterGroups;
pub use source::SpatialExtent;
pub use source::TemporalExtent;
pub use weather::WeatherData;
