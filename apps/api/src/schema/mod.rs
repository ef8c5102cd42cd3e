//! Declared output schemas and strict, all-or-nothing validation.
//!
//! Every structured LLM result is described by an [`ObjectSchema`]. The same
//! declaration is sent to the provider (rendered as JSON Schema) and used to
//! check the raw response before it is deserialized into a typed result.
//!
//! Validation never clamps or coerces: a missing required field, a number
//! outside its declared range, a string outside its enum, or any invalid
//! array element rejects the whole value.

use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use thiserror::Error;

/// Path used for the root object in violation reports.
const ROOT: &str = "$";

// ────────────────────────────────────────────────────────────────────────────
// Schema declaration
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    String {
        allowed: Option<&'static [&'static str]>,
    },
    /// Inclusive `(min, max)` when a range is declared.
    Number {
        range: Option<(f64, f64)>,
    },
    /// Whole numbers. `40` and `40.0` are both accepted.
    Integer,
    Object(ObjectSchema),
    Array(Box<FieldType>),
}

impl FieldType {
    pub fn string() -> Self {
        FieldType::String { allowed: None }
    }

    pub fn object(schema: ObjectSchema) -> Self {
        FieldType::Object(schema)
    }

    fn to_json_schema(&self) -> Value {
        match self {
            FieldType::String { allowed: None } => json!({ "type": "string" }),
            FieldType::String {
                allowed: Some(values),
            } => json!({ "type": "string", "enum": values }),
            FieldType::Number { range: None } => json!({ "type": "number" }),
            FieldType::Number {
                range: Some((min, max)),
            } => json!({ "type": "number", "minimum": min, "maximum": max }),
            FieldType::Integer => json!({ "type": "integer" }),
            FieldType::Object(schema) => schema.to_json_schema(),
            FieldType::Array(item) => json!({ "type": "array", "items": item.to_json_schema() }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: &'static str,
    pub ty: FieldType,
    pub required: bool,
}

impl Field {
    fn new(name: &'static str, ty: FieldType) -> Self {
        Self {
            name,
            ty,
            required: true,
        }
    }

    pub fn string(name: &'static str) -> Self {
        Self::new(name, FieldType::string())
    }

    pub fn string_enum(name: &'static str, allowed: &'static [&'static str]) -> Self {
        Self::new(
            name,
            FieldType::String {
                allowed: Some(allowed),
            },
        )
    }

    pub fn number(name: &'static str) -> Self {
        Self::new(name, FieldType::Number { range: None })
    }

    pub fn number_in(name: &'static str, min: f64, max: f64) -> Self {
        Self::new(
            name,
            FieldType::Number {
                range: Some((min, max)),
            },
        )
    }

    pub fn integer(name: &'static str) -> Self {
        Self::new(name, FieldType::Integer)
    }

    pub fn object(name: &'static str, schema: ObjectSchema) -> Self {
        Self::new(name, FieldType::Object(schema))
    }

    pub fn array(name: &'static str, item: FieldType) -> Self {
        Self::new(name, FieldType::Array(Box::new(item)))
    }

    /// Marks the field optional: it may be absent or `null`.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }
}

/// A named object shape. The name doubles as the provider-side tool name.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectSchema {
    pub name: &'static str,
    pub fields: Vec<Field>,
}

impl ObjectSchema {
    pub fn new(name: &'static str, fields: Vec<Field>) -> Self {
        Self { name, fields }
    }

    /// Renders the declaration as a JSON Schema object.
    pub fn to_json_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .fields
            .iter()
            .map(|f| (f.name.to_string(), f.ty.to_json_schema()))
            .collect();
        let required: Vec<&str> = self
            .fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name)
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false
        })
    }
}

/// Implemented by every typed structured result.
pub trait StructuredOutput: DeserializeOwned {
    fn schema() -> ObjectSchema;
}

// ────────────────────────────────────────────────────────────────────────────
// Violations
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Error)]
#[error("schema violation at `{path}`: {kind}")]
pub struct SchemaViolation {
    pub path: String,
    pub kind: ViolationKind,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ViolationKind {
    #[error("required field is missing")]
    Missing,

    #[error("expected {expected}")]
    WrongType { expected: &'static str },

    #[error("{value} is outside [{min}, {max}]")]
    OutOfRange { value: f64, min: f64, max: f64 },

    #[error("{value:?} is not one of {allowed:?}")]
    NotInEnum {
        value: String,
        allowed: &'static [&'static str],
    },

    #[error("value does not deserialize: {0}")]
    Shape(String),
}

fn violation(path: &str, kind: ViolationKind) -> SchemaViolation {
    SchemaViolation {
        path: path.to_string(),
        kind,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Validation
// ────────────────────────────────────────────────────────────────────────────

/// Checks `value` against `schema`. Unknown fields are ignored.
pub fn validate(value: &Value, schema: &ObjectSchema) -> Result<(), SchemaViolation> {
    validate_object(value, schema, ROOT)
}

/// Validates then deserializes a raw provider value into `T`.
pub fn parse<T: StructuredOutput>(mut raw: Value) -> Result<T, SchemaViolation> {
    let schema = T::schema();
    validate(&raw, &schema)?;
    normalize_object(&mut raw, &schema);
    serde_json::from_value(raw).map_err(|e| violation(ROOT, ViolationKind::Shape(e.to_string())))
}

/// An integral JSON number, including floats with no fractional part.
fn as_integer(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
            .map(|f| f as i64)
    })
}

/// Rewrites integral floats in integer positions so serde reads them as `i64`.
/// Only called on values that already passed validation.
fn normalize_object(value: &mut Value, schema: &ObjectSchema) {
    let Some(object) = value.as_object_mut() else {
        return;
    };
    for field in &schema.fields {
        if let Some(v) = object.get_mut(field.name) {
            normalize_value(v, &field.ty);
        }
    }
}

fn normalize_value(value: &mut Value, ty: &FieldType) {
    match ty {
        FieldType::Integer => {
            if let Some(n) = as_integer(value) {
                *value = Value::from(n);
            }
        }
        FieldType::Object(schema) => normalize_object(value, schema),
        FieldType::Array(item) => {
            if let Some(items) = value.as_array_mut() {
                for element in items {
                    normalize_value(element, item);
                }
            }
        }
        FieldType::String { .. } | FieldType::Number { .. } => {}
    }
}

fn validate_object(
    value: &Value,
    schema: &ObjectSchema,
    path: &str,
) -> Result<(), SchemaViolation> {
    let object = value.as_object().ok_or_else(|| {
        violation(
            path,
            ViolationKind::WrongType {
                expected: "object",
            },
        )
    })?;

    for field in &schema.fields {
        let field_path = format!("{path}.{}", field.name);
        match object.get(field.name) {
            None | Some(Value::Null) if field.required => {
                return Err(violation(&field_path, ViolationKind::Missing));
            }
            None | Some(Value::Null) => continue,
            Some(v) => validate_value(v, &field.ty, &field_path)?,
        }
    }

    Ok(())
}

fn validate_value(value: &Value, ty: &FieldType, path: &str) -> Result<(), SchemaViolation> {
    match ty {
        FieldType::String { allowed } => {
            let s = value.as_str().ok_or_else(|| {
                violation(
                    path,
                    ViolationKind::WrongType {
                        expected: "string",
                    },
                )
            })?;
            if let Some(allowed) = *allowed {
                if !allowed.contains(&s) {
                    return Err(violation(
                        path,
                        ViolationKind::NotInEnum {
                            value: s.to_string(),
                            allowed,
                        },
                    ));
                }
            }
        }
        FieldType::Number { range } => {
            let n = value.as_f64().ok_or_else(|| {
                violation(
                    path,
                    ViolationKind::WrongType {
                        expected: "number",
                    },
                )
            })?;
            if let Some((min, max)) = *range {
                if n < min || n > max {
                    return Err(violation(
                        path,
                        ViolationKind::OutOfRange { value: n, min, max },
                    ));
                }
            }
        }
        FieldType::Integer => {
            if as_integer(value).is_none() {
                return Err(violation(
                    path,
                    ViolationKind::WrongType {
                        expected: "integer",
                    },
                ));
            }
        }
        FieldType::Object(schema) => validate_object(value, schema, path)?,
        FieldType::Array(item) => {
            let items = value.as_array().ok_or_else(|| {
                violation(
                    path,
                    ViolationKind::WrongType {
                        expected: "array",
                    },
                )
            })?;
            for (i, element) in items.iter().enumerate() {
                validate_value(element, item, &format!("{path}[{i}]"))?;
            }
        }
    }

    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
