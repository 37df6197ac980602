// crates/ipm-bridge-synth/src/node.rs
// ============================================================================
// Module: Schema Node Model
// Description: Closed set of schema shapes the synthesizer understands.
// Purpose: Parse vendor JSON Schemas leniently into a typed tree.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! Model input schemas are authored by DSS vendors and arrive with every
//! flavor of sloppiness: missing `type` keywords, `required` lists naming
//! properties that were never declared, array schemas without `items`. This
//! module parses such a schema into a closed [`SchemaNode`] tree. Anything
//! the parser cannot classify becomes [`SchemaNode::Unknown`] and is
//! reported as a [`DegradedBranch`] rather than aborting synthesis; the
//! caller decides whether the degradation matters.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Map;
use serde_json::Number;
use serde_json::Value;

// ============================================================================
// SECTION: Degradation Reporting
// ============================================================================

/// One schema branch the parser could not fully interpret.
///
/// # Invariants
/// - `path` is a JSON Pointer into the schema document, `""` for the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DegradedBranch {
    /// JSON Pointer to the branch within the schema.
    pub path: String,
    /// Human-readable reason the branch degraded.
    pub reason: String,
}

// ============================================================================
// SECTION: Node Variants
// ============================================================================

/// An object schema: named properties, each with its own node.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectNode {
    /// Properties in schema declaration order. Names listed only under
    /// `required` appear here with an [`SchemaNode::Unknown`] child.
    pub properties: Vec<(String, SchemaNode)>,
}

/// An array schema with a single item shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayNode {
    /// Shape of every element.
    pub items: Box<SchemaNode>,
    /// Declared `minItems`, if any.
    pub min_items: Option<u64>,
    /// Declared `maxItems`, if any.
    pub max_items: Option<u64>,
}

/// A string schema, including enumerations and format hints.
#[derive(Debug, Clone, PartialEq)]
pub struct StringNode {
    /// Declared `default`, used verbatim when present.
    pub default: Option<Value>,
    /// Declared `enum` values, used verbatim when present.
    pub enum_values: Vec<Value>,
    /// Declared `pattern` regular expression.
    pub pattern: Option<String>,
    /// Declared `format` hint, e.g. `date-time`.
    pub format: Option<String>,
}

/// A numeric schema, covering both `number` and `integer`.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberNode {
    /// True for `integer`, false for `number`.
    pub integer: bool,
    /// Declared `minimum`, kept as a JSON number to avoid lossy casts.
    pub minimum: Option<Number>,
    /// Declared `maximum`, kept as a JSON number to avoid lossy casts.
    pub maximum: Option<Number>,
    /// Declared `default`, used verbatim when present.
    pub default: Option<Value>,
}

/// A boolean schema.
#[derive(Debug, Clone, PartialEq)]
pub struct BooleanNode {
    /// Declared `default`, used when present.
    pub default: Option<bool>,
}

/// The closed set of schema shapes the synthesizer generates values for.
///
/// # Invariants
/// - Every vendor schema parses to exactly one node; unclassifiable
///   branches become [`SchemaNode::Unknown`], never a parse failure.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    /// `type: object`, or an untyped schema with `properties`/`required`.
    Object(ObjectNode),
    /// `type: array`, or an untyped schema with `items`.
    Array(ArrayNode),
    /// `type: string`, or an untyped schema with `enum`.
    String(StringNode),
    /// `type: number` or `type: integer`.
    Number(NumberNode),
    /// `type: boolean`.
    Boolean(BooleanNode),
    /// Anything else. Generates an empty object.
    Unknown,
}

// ============================================================================
// SECTION: Parsing
// ============================================================================

impl SchemaNode {
    /// Parses a schema value at `path` into a node, appending a
    /// [`DegradedBranch`] for every branch that falls back to
    /// [`SchemaNode::Unknown`] or loses declared structure.
    #[must_use]
    pub fn parse(schema: &Value, path: &str, degraded: &mut Vec<DegradedBranch>) -> Self {
        let Some(object) = schema.as_object() else {
            degraded.push(DegradedBranch {
                path: path.to_owned(),
                reason: "schema branch is not a JSON object".to_owned(),
            });
            return Self::Unknown;
        };
        match effective_type(object) {
            Some("object") => Self::Object(parse_object(object, path, degraded)),
            Some("array") => Self::Array(parse_array(object, path, degraded)),
            Some("string") => Self::String(parse_string(object)),
            Some("number") => Self::Number(parse_number(object, false)),
            Some("integer") => Self::Number(parse_number(object, true)),
            Some("boolean") => Self::Boolean(BooleanNode {
                default: object.get("default").and_then(Value::as_bool),
            }),
            Some(other) => {
                degraded.push(DegradedBranch {
                    path: path.to_owned(),
                    reason: format!("unsupported schema type `{other}`"),
                });
                Self::Unknown
            }
            None => {
                degraded.push(DegradedBranch {
                    path: path.to_owned(),
                    reason: "schema branch declares no recognizable type".to_owned(),
                });
                Self::Unknown
            }
        }
    }
}

/// Determines the effective type of a schema object, inferring `object`
/// from `properties`/`required`, `array` from `items`, and `string` from
/// `enum` when the `type` keyword is absent.
fn effective_type(object: &Map<String, Value>) -> Option<&str> {
    if let Some(declared) = object.get("type").and_then(Value::as_str) {
        return Some(declared);
    }
    if object.contains_key("properties") || object.contains_key("required") {
        return Some("object");
    }
    if object.contains_key("items") {
        return Some("array");
    }
    if object.contains_key("enum") {
        return Some("string");
    }
    None
}

/// Parses an object schema. Names present only in `required` are added as
/// [`SchemaNode::Unknown`] children so the generated document still carries
/// every required key.
fn parse_object(
    object: &Map<String, Value>,
    path: &str,
    degraded: &mut Vec<DegradedBranch>,
) -> ObjectNode {
    let mut properties: Vec<(String, SchemaNode)> = Vec::new();
    if let Some(declared) = object.get("properties").and_then(Value::as_object) {
        for (name, child_schema) in declared {
            let child_path = format!("{path}/properties/{name}");
            let child = SchemaNode::parse(child_schema, &child_path, degraded);
            properties.push((name.clone(), child));
        }
    }
    if let Some(required) = object.get("required").and_then(Value::as_array) {
        for entry in required {
            let Some(name) = entry.as_str() else { continue };
            if properties.iter().any(|(have, _)| have == name) {
                continue;
            }
            degraded.push(DegradedBranch {
                path: format!("{path}/properties/{name}"),
                reason: "required property has no declared schema".to_owned(),
            });
            properties.push((name.to_owned(), SchemaNode::Unknown));
        }
    }
    ObjectNode { properties }
}

/// Parses an array schema. A missing `items` keyword degrades the element
/// shape to [`SchemaNode::Unknown`].
fn parse_array(
    object: &Map<String, Value>,
    path: &str,
    degraded: &mut Vec<DegradedBranch>,
) -> ArrayNode {
    let items = match object.get("items") {
        Some(item_schema) => {
            let item_path = format!("{path}/items");
            SchemaNode::parse(item_schema, &item_path, degraded)
        }
        None => {
            degraded.push(DegradedBranch {
                path: path.to_owned(),
                reason: "array schema declares no `items`".to_owned(),
            });
            SchemaNode::Unknown
        }
    };
    ArrayNode {
        items: Box::new(items),
        min_items: object.get("minItems").and_then(Value::as_u64),
        max_items: object.get("maxItems").and_then(Value::as_u64),
    }
}

/// Parses a string schema.
fn parse_string(object: &Map<String, Value>) -> StringNode {
    StringNode {
        default: object.get("default").cloned(),
        enum_values: object.get("enum").and_then(Value::as_array).cloned().unwrap_or_default(),
        pattern: object.get("pattern").and_then(Value::as_str).map(str::to_owned),
        format: object.get("format").and_then(Value::as_str).map(str::to_owned),
    }
}

/// Parses a numeric schema, `integer` or `number`.
fn parse_number(object: &Map<String, Value>, integer: bool) -> NumberNode {
    NumberNode {
        integer,
        minimum: object.get("minimum").and_then(Value::as_number).cloned(),
        maximum: object.get("maximum").and_then(Value::as_number).cloned(),
        default: object.get("default").cloned(),
    }
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
    fn untyped_schema_with_properties_parses_as_object() {
        let mut degraded = Vec::new();
        let node = SchemaNode::parse(
            &json!({"properties": {"a": {"type": "string"}}}),
            "",
            &mut degraded,
        );
        let SchemaNode::Object(object) = node else {
            panic!("expected an object node");
        };
        assert_eq!(object.properties.len(), 1);
        assert!(degraded.is_empty());
    }

    #[test]
    fn required_only_names_become_unknown_children() {
        let mut degraded = Vec::new();
        let node = SchemaNode::parse(&json!({"required": ["weatherData"]}), "", &mut degraded);
        let SchemaNode::Object(object) = node else {
            panic!("expected an object node");
        };
        assert_eq!(object.properties, vec![("weatherData".to_owned(), SchemaNode::Unknown)]);
        assert_eq!(degraded.len(), 1);
        assert_eq!(degraded[0].path, "/properties/weatherData");
    }

    #[test]
    fn array_without_items_degrades_but_parses() {
        let mut degraded = Vec::new();
        let node = SchemaNode::parse(&json!({"type": "array", "minItems": 2}), "", &mut degraded);
        let SchemaNode::Array(array) = node else {
            panic!("expected an array node");
        };
        assert_eq!(*array.items, SchemaNode::Unknown);
        assert_eq!(array.min_items, Some(2));
        assert_eq!(degraded.len(), 1);
    }

    #[test]
    fn bare_enum_parses_as_string() {
        let mut degraded = Vec::new();
        let node = SchemaNode::parse(&json!({"enum": ["a", "b"]}), "", &mut degraded);
        let SchemaNode::String(string) = node else {
            panic!("expected a string node");
        };
        assert_eq!(string.enum_values, vec![json!("a"), json!("b")]);
        assert!(degraded.is_empty());
    }

    #[test]
    fn non_object_branch_degrades_to_unknown() {
        let mut degraded = Vec::new();
        let node = SchemaNode::parse(&json!(true), "/properties/x", &mut degraded);
        assert_eq!(node, SchemaNode::Unknown);
        assert_eq!(degraded[0].path, "/properties/x");
    }
}
