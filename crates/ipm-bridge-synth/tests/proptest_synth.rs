// crates/ipm-bridge-synth/tests/proptest_synth.rs
// ============================================================================
// Module: Synthesizer Property-Based Tests
// Description: Property tests for schema-conformant fake generation.
// Purpose: Validate generated documents against their schemas at scale.
// ============================================================================

//! Property-based tests checking that synthesized documents validate
//! against the schemas they were generated from.

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

use ipm_bridge_synth::synthesize;
use proptest::prelude::*;
use serde_json::Value;
use serde_json::json;

/// Well-formed vendor-style schemas: typed leaves under nested objects and
/// arrays, with every object property listed as required.
fn schema_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(json!({"type": "string"})),
        prop::collection::vec("[a-z]{1,6}", 1 .. 4)
            .prop_map(|names| json!({"type": "string", "enum": names})),
        (0_i64 .. 50, 50_i64 .. 100)
            .prop_map(|(lower, upper)| json!({"type": "integer", "minimum": lower, "maximum": upper})),
        (0.0_f64 .. 10.0, 10.0_f64 .. 100.0)
            .prop_map(|(lower, upper)| json!({"type": "number", "minimum": lower, "maximum": upper})),
        Just(json!({"type": "boolean"})),
        Just(json!({"type": "string", "format": "date-time"})),
    ];

    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::btree_map("[a-z]{1,8}", inner.clone(), 1 .. 4).prop_map(|map| {
                let required: Vec<&String> = map.keys().collect();
                let required = json!(required);
                json!({"type": "object", "properties": map, "required": required})
            }),
            (inner, 0_u64 ..= 2).prop_map(|(items, min_items)| {
                json!({"type": "array", "items": items, "minItems": min_items})
            }),
        ]
    })
}

proptest! {
    #[test]
    fn synthesized_documents_validate_against_their_schema(schema in schema_strategy()) {
        let synthesis = synthesize(&schema);
        prop_assert!(synthesis.degraded.is_empty(), "degraded: {:?}", synthesis.degraded);
        prop_assert!(
            jsonschema::is_valid(&schema, &synthesis.document),
            "document {} does not validate against {}",
            synthesis.document,
            schema
        );
    }

    #[test]
    fn synthesis_never_panics_on_arbitrary_json(value in proptest::arbitrary::any::<bool>()) {
        // Degenerate roots: scalars and empty objects must still synthesize.
        let synthesis = synthesize(&json!(value));
        prop_assert_eq!(synthesis.document, json!({}));
        prop_assert_eq!(synthesis.degraded.len(), 1);
    }
}
