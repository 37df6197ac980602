// crates/ipm-bridge-synth/src/lib.rs
// ============================================================================
// Module: IPM Bridge Synth
// Description: Model input synthesis and composition for DSS model runs.
// Purpose: Generate skeleton input documents and fill them with real data.
// Dependencies: ipm-bridge-core, rand, serde_json, thiserror
// ============================================================================

//! ## Overview
//! This crate turns a DSS model's vendor-authored input schema into a
//! runnable input document in two steps. [`synthesize`] parses the schema
//! into a closed node set, rewrites the well-known injection properties to
//! sentinel placeholders, and fills everything else with schema-conformant
//! fake values, recording placeholder locations in a side table.
//! [`compose`] then applies caller overrides and schema defaults and
//! injects real weather data and field observations at the recorded paths,
//! failing closed when the schema demands data the caller did not supply.
//! Invariants:
//! - Synthesis is infallible; unparseable schema branches degrade to an
//!   empty object and are reported, never swallowed.
//! - Composition never re-detects sentinel strings in document values; it
//!   trusts only the recorded placeholder paths.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod compose;
pub mod node;
pub mod synth;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use compose::ComposeError;
pub use compose::ComposeInputs;
pub use compose::compose;
pub use node::DegradedBranch;
pub use node::SchemaNode;
pub use synth::InjectionKind;
pub use synth::Synthesis;
pub use synth::synthesize;
