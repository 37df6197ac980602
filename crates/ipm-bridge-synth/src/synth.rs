// crates/ipm-bridge-synth/src/synth.rs
// ============================================================================
// Module: Input Document Synthesizer
// Description: Turns a model input schema into a skeleton input document.
// Purpose: Produce a valid document with placeholders where data is injected.
// Dependencies: rand, serde_json
// ============================================================================

//! ## Overview
//! Given a model's input schema, [`synthesize`] produces a skeleton input
//! document. Three well-known properties (`weatherData` and the two field
//! observation properties under `configParameters`) are not faked: their
//! sub-schemas are rewritten to a sentinel string schema before generation,
//! and the resulting placeholder locations are recorded in a side table so
//! composition can inject real data by path instead of re-detecting
//! sentinel strings. Every other branch is filled with schema-conformant
//! fake values: declared defaults first, then enumerations, then values
//! derived from bounds, patterns, and format hints.
//!
//! Synthesis never fails. Branches the schema parser cannot classify
//! generate an empty object and are surfaced on [`Synthesis::degraded`]
//! for the caller to report.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use rand::Rng;
use serde_json::Map;
use serde_json::Number;
use serde_json::Value;
use serde_json::json;

use crate::node::ArrayNode;
use crate::node::DegradedBranch;
use crate::node::NumberNode;
use crate::node::ObjectNode;
use crate::node::SchemaNode;
use crate::node::StringNode;

// ============================================================================
// SECTION: Injection Side Table
// ============================================================================

/// The kinds of caller-supplied data injected into a skeleton document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum InjectionKind {
    /// Weather data in the platform exchange format, at the document root.
    WeatherData,
    /// Field observation features, under `configParameters`.
    FieldObservations,
    /// Per-observation quantification records, under `configParameters`.
    FieldObservationQuantifications,
}

impl InjectionKind {
    /// The schema property name carrying this kind of data.
    #[must_use]
    pub fn property_name(self) -> &'static str {
        match self {
            Self::WeatherData => "weatherData",
            Self::FieldObservations => "fieldObservations",
            Self::FieldObservationQuantifications => "fieldObservationQuantifications",
        }
    }

    /// The sentinel string standing in for this data in skeleton documents.
    #[must_use]
    pub fn sentinel(self) -> String {
        format!("{{{}}}", self.property_name())
    }
}

/// Result of synthesizing a skeleton document from a model input schema.
///
/// # Invariants
/// - Every key in `placeholders` is a JSON Pointer that resolves within
///   `document` to the matching sentinel string.
/// - `placeholders` holds at most one entry per [`InjectionKind`].
#[derive(Debug, Clone, PartialEq)]
pub struct Synthesis {
    /// The generated skeleton input document.
    pub document: Value,
    /// JSON Pointer of each placeholder, keyed by location.
    pub placeholders: BTreeMap<String, InjectionKind>,
    /// Schema branches that degraded to an empty object during parsing.
    pub degraded: Vec<DegradedBranch>,
}

impl Synthesis {
    /// Returns the placeholder path for `kind`, if the schema references it.
    #[must_use]
    pub fn path_of(&self, kind: InjectionKind) -> Option<&str> {
        self.placeholders
            .iter()
            .find(|(_, have)| **have == kind)
            .map(|(path, _)| path.as_str())
    }
}

// ============================================================================
// SECTION: Synthesis
// ============================================================================

/// Synthesizes a skeleton input document from a model input schema.
///
/// The root `definitions` section is dropped before generation, injection
/// placeholders are rewritten to sentinel string schemas and recorded in
/// the side table, and every remaining branch is filled with fake values.
#[must_use]
pub fn synthesize(schema: &Value) -> Synthesis {
    let mut working = schema.clone();
    if let Some(root) = working.as_object_mut() {
        root.remove("definitions");
    }
    let placeholders = rewrite_placeholders(&mut working);
    let mut degraded = Vec::new();
    let node = SchemaNode::parse(&working, "", &mut degraded);
    let mut rng = rand::thread_rng();
    let document = generate(&node, &mut rng);
    Synthesis { document, placeholders, degraded }
}

/// Replaces the sub-schemas of injected properties with sentinel string
/// schemas and returns the side table of placeholder locations.
///
/// A property counts as referenced when it appears under `properties` or
/// in the `required` list; required-only names get a sentinel property
/// inserted so injection stays mandatory for them.
fn rewrite_placeholders(schema: &mut Value) -> BTreeMap<String, InjectionKind> {
    let mut placeholders = BTreeMap::new();
    if let Some(root) = schema.as_object_mut() {
        let kind = InjectionKind::WeatherData;
        if rewrite_placeholder_property(root, kind) {
            placeholders.insert(format!("/{}", kind.property_name()), kind);
        }
    }
    let config = schema
        .pointer_mut("/properties/configParameters")
        .and_then(Value::as_object_mut);
    if let Some(config) = config {
        for kind in
            [InjectionKind::FieldObservations, InjectionKind::FieldObservationQuantifications]
        {
            if rewrite_placeholder_property(config, kind) {
                placeholders.insert(format!("/configParameters/{}", kind.property_name()), kind);
            }
        }
    }
    placeholders
}

/// Rewrites one injected property on an object schema to the sentinel
/// string schema. Returns true when the schema references the property.
fn rewrite_placeholder_property(object: &mut Map<String, Value>, kind: InjectionKind) -> bool {
    let name = kind.property_name();
    let declared = object
        .get("properties")
        .and_then(Value::as_object)
        .is_some_and(|properties| properties.contains_key(name));
    let required = object
        .get("required")
        .and_then(Value::as_array)
        .is_some_and(|names| names.iter().any(|entry| entry.as_str() == Some(name)));
    if !declared && !required {
        return false;
    }
    let properties = object
        .entry("properties")
        .or_insert_with(|| Value::Object(Map::new()));
    if let Some(properties) = properties.as_object_mut() {
        properties.insert(name.to_owned(), sentinel_schema(kind));
        return true;
    }
    false
}

/// Builds the sentinel string schema standing in for an injected property.
fn sentinel_schema(kind: InjectionKind) -> Value {
    json!({
        "type": "string",
        "pattern": format!("^\\{{{}\\}}$", kind.property_name()),
        "default": kind.sentinel(),
    })
}

// ============================================================================
// SECTION: Value Generation
// ============================================================================

/// Longest array the generator emits beyond a declared `minItems`.
const ARRAY_GROWTH_CAP: u64 = 8;

/// Generates a fake value conforming to `node`.
fn generate<R: Rng>(node: &SchemaNode, rng: &mut R) -> Value {
    match node {
        SchemaNode::Object(object) => generate_object(object, rng),
        SchemaNode::Array(array) => generate_array(array, rng),
        SchemaNode::String(string) => generate_string(string, rng),
        SchemaNode::Number(number) => generate_number(number, rng),
        SchemaNode::Boolean(boolean) => {
            Value::Bool(boolean.default.unwrap_or_else(|| rng.gen_bool(0.5)))
        }
        SchemaNode::Unknown => Value::Object(Map::new()),
    }
}

/// Generates an object carrying every declared property, which satisfies
/// any `required` list the schema declared.
fn generate_object<R: Rng>(node: &ObjectNode, rng: &mut R) -> Value {
    let mut map = Map::new();
    for (name, child) in &node.properties {
        map.insert(name.clone(), generate(child, rng));
    }
    Value::Object(map)
}

/// Generates an array within the declared length bounds, capped so absurd
/// `maxItems` declarations do not balloon the document.
fn generate_array<R: Rng>(node: &ArrayNode, rng: &mut R) -> Value {
    let lower = node.min_items.unwrap_or(1);
    let declared_upper = node.max_items.map_or(lower.saturating_add(1), |max| max.max(lower));
    let upper = declared_upper.min(lower.saturating_add(ARRAY_GROWTH_CAP));
    let length = rng.gen_range(lower..=upper);
    let length = usize::try_from(length).unwrap_or(1);
    let mut items = Vec::with_capacity(length);
    for _ in 0..length {
        items.push(generate(&node.items, rng));
    }
    Value::Array(items)
}

/// Generates a string: default, then enumeration, then a literal extracted
/// from an anchored pattern, then a format-derived value, then filler.
fn generate_string<R: Rng>(node: &StringNode, rng: &mut R) -> Value {
    if let Some(default) = &node.default {
        return default.clone();
    }
    if !node.enum_values.is_empty() {
        let index = rng.gen_range(0..node.enum_values.len());
        return node.enum_values[index].clone();
    }
    if let Some(literal) = node.pattern.as_deref().and_then(pattern_literal) {
        return Value::String(literal);
    }
    if let Some(value) = node.format.as_deref().and_then(format_value) {
        return Value::String(value.to_owned());
    }
    let filler: u32 = rng.gen_range(0..10_000);
    Value::String(format!("text-{filler}"))
}

/// Extracts the literal a fully-anchored pattern matches, when the pattern
/// contains no regular-expression operators outside escapes. Returns `None`
/// for any pattern that actually needs a regex engine.
fn pattern_literal(pattern: &str) -> Option<String> {
    let body = pattern.strip_prefix('^')?.strip_suffix('$')?;
    let mut literal = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            literal.push(chars.next()?);
            continue;
        }
        let plain = ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | ' ' | ':' | '/' | ',');
        if !plain {
            return None;
        }
        literal.push(ch);
    }
    Some(literal)
}

/// Maps a schema `format` hint to a fixed representative value.
fn format_value(format: &str) -> Option<&'static str> {
    match format {
        "date-time" => Some("2021-01-01T00:00:00Z"),
        "date" => Some("2021-01-01"),
        "uri" => Some("https://example.com/"),
        "email" => Some("user@example.com"),
        _ => None,
    }
}

/// Generates a number within the declared bounds, preferring the default.
fn generate_number<R: Rng>(node: &NumberNode, rng: &mut R) -> Value {
    if let Some(default) = &node.default {
        return default.clone();
    }
    if node.integer {
        let minimum = node.minimum.as_ref().and_then(Number::as_i64);
        let maximum = node.maximum.as_ref().and_then(Number::as_i64);
        let value = match (minimum, maximum) {
            (Some(lower), Some(upper)) if lower <= upper => rng.gen_range(lower..=upper),
            (Some(lower), _) => lower.saturating_add(rng.gen_range(0..10)),
            (_, Some(upper)) => upper.saturating_sub(rng.gen_range(0..10)),
            (None, None) => rng.gen_range(0..100),
        };
        return Value::Number(Number::from(value));
    }
    let minimum = node.minimum.as_ref().and_then(Number::as_f64);
    let maximum = node.maximum.as_ref().and_then(Number::as_f64);
    let value = match (minimum, maximum) {
        (Some(lower), Some(upper)) if lower < upper => rng.gen_range(lower..=upper),
        (Some(lower), Some(_)) | (Some(lower), None) => lower,
        (None, Some(upper)) => upper,
        (None, None) => rng.gen_range(0.0..100.0),
    };
    Number::from_f64(value).map_or_else(|| Value::Number(Number::from(0)), Value::Number)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
#[allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::missing_docs_in_private_items,
    reason = "Test-only assertions and helpers are permitted."
)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn pattern_literal_accepts_anchored_literals() {
        assert_eq!(pattern_literal("^2020-01-01$"), Some("2020-01-01".to_owned()));
        assert_eq!(pattern_literal("^\\{weatherData\\}$"), Some("{weatherData}".to_owned()));
    }

    #[test]
    fn pattern_literal_rejects_real_regexes() {
        assert_eq!(pattern_literal("^[0-9]+$"), None);
        assert_eq!(pattern_literal("2020"), None);
        assert_eq!(pattern_literal("^a.b$"), None);
    }

    #[test]
    fn sentinel_schema_defaults_to_the_sentinel() {
        let schema = sentinel_schema(InjectionKind::WeatherData);
        assert_eq!(schema["default"], json!("{weatherData}"));
        assert_eq!(schema["pattern"], json!("^\\{weatherData\\}$"));
    }
}
