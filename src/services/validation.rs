//! Table-driven payload validation.
//!
//! Each [`Schema`] is a list of field declarations. It is compiled to a
//! Draft 7 JSON Schema and checked with `jsonschema`, so every violated
//! constraint is reported at once. A payload that passes is decoded into its
//! typed form with `serde_path_to_error`; unknown fields are dropped and
//! serde defaults fill in absent optional values.

use anyhow::anyhow;
use jsonschema::error::ValidationErrorKind;
use jsonschema::{Draft, JSONSchema};
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};

use crate::errors::{AppError, FieldError};

const POSITIVE_INTEGER: &str = r"^[1-9][0-9]*$";
const NON_NEGATIVE_INTEGER: &str = r"^[0-9]+$";
const POSITIVE_DECIMAL: &str = r"^(?:0*[1-9][0-9]*(?:\.[0-9]+)?|0*\.[0-9]*[1-9][0-9]*)$";
const EMAIL: &str = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";

#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// String with at least `min_len` characters.
    Text { min_len: u64 },
    /// String drawn from a closed set.
    OneOf(&'static [&'static str]),
    /// Decimal integer encoded as a string.
    Count { allow_zero: bool },
    /// Decimal number greater than zero, encoded as a string.
    PositiveNumber,
    Flag,
    Email,
    /// Array of strings.
    Tags,
    Integer { minimum: Option<i64> },
    Object,
}

impl FieldKind {
    fn json_type(&self) -> &'static str {
        match self {
            FieldKind::Text { .. }
            | FieldKind::OneOf(_)
            | FieldKind::Count { .. }
            | FieldKind::PositiveNumber
            | FieldKind::Email => "string",
            FieldKind::Flag => "boolean",
            FieldKind::Tags => "array",
            FieldKind::Integer { .. } => "integer",
            FieldKind::Object => "object",
        }
    }

    fn to_json(self) -> Value {
        match self {
            FieldKind::Text { min_len } => json!({ "type": "string", "minLength": min_len }),
            FieldKind::OneOf(values) => json!({ "type": "string", "enum": values }),
            FieldKind::Count { allow_zero } => {
                let pattern = if allow_zero {
                    NON_NEGATIVE_INTEGER
                } else {
                    POSITIVE_INTEGER
                };
                json!({ "type": "string", "pattern": pattern })
            }
            FieldKind::PositiveNumber => json!({ "type": "string", "pattern": POSITIVE_DECIMAL }),
            FieldKind::Flag => json!({ "type": "boolean" }),
            FieldKind::Email => json!({ "type": "string", "pattern": EMAIL }),
            FieldKind::Tags => json!({ "type": "array", "items": { "type": "string" } }),
            FieldKind::Integer { minimum: Some(min) } => json!({ "type": "integer", "minimum": min }),
            FieldKind::Integer { minimum: None } => json!({ "type": "integer" }),
            FieldKind::Object => json!({ "type": "object" }),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Trigger {
    Equals(&'static str, &'static str),
    IsTrue(&'static str),
}

impl Trigger {
    fn to_json(self) -> Value {
        let (field, expected) = match self {
            Trigger::Equals(field, value) => (field, json!(value)),
            Trigger::IsTrue(field) => (field, json!(true)),
        };
        json!({
            "properties": { field: { "const": expected } },
            "required": [field],
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Presence {
    Required,
    /// May be absent or null.
    Optional,
    /// Required (and held to its kind) only while the trigger holds.
    RequiredWhen(Trigger),
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub presence: Presence,
    /// Reported for every violation on this field.
    pub message: &'static str,
}

impl FieldSpec {
    pub const fn required(name: &'static str, kind: FieldKind, message: &'static str) -> Self {
        Self {
            name,
            kind,
            presence: Presence::Required,
            message,
        }
    }

    pub const fn optional(name: &'static str, kind: FieldKind, message: &'static str) -> Self {
        Self {
            name,
            kind,
            presence: Presence::Optional,
            message,
        }
    }

    pub const fn required_when(
        name: &'static str,
        kind: FieldKind,
        trigger: Trigger,
        message: &'static str,
    ) -> Self {
        Self {
            name,
            kind,
            presence: Presence::RequiredWhen(trigger),
            message,
        }
    }
}

#[derive(Debug)]
pub struct Schema {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
}

impl Schema {
    pub fn to_json(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        let mut conditions = Vec::new();

        for field in self.fields {
            let property = match field.presence {
                Presence::Required => {
                    required.push(field.name);
                    field.kind.to_json()
                }
                Presence::Optional => json!({ "anyOf": [{ "type": "null" }, field.kind.to_json()] }),
                Presence::RequiredWhen(trigger) => {
                    conditions.push(json!({
                        "if": trigger.to_json(),
                        "then": {
                            "required": [field.name],
                            "properties": { field.name: field.kind.to_json() },
                        },
                    }));
                    json!({ "type": [field.kind.json_type(), "null"] })
                }
            };
            properties.insert(field.name.to_string(), property);
        }

        let mut schema = json!({
            "type": "object",
            "properties": properties,
            "required": required,
        });
        if !conditions.is_empty() {
            schema["allOf"] = Value::Array(conditions);
        }
        schema
    }

    fn message_for(&self, field: &str) -> Option<&'static str> {
        self.fields
            .iter()
            .find(|spec| spec.name == field)
            .map(|spec| spec.message)
    }

    /// Every violation in `value`, with paths prefixed by `prefix`.
    pub fn check(&self, value: &Value, prefix: &str) -> anyhow::Result<Vec<FieldError>> {
        let schema_json = self.to_json();
        let compiled = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(&schema_json)
            .map_err(|err| anyhow!("failed to compile `{}` schema: {}", self.name, err))?;

        let mut errors: Vec<FieldError> = Vec::new();
        if let Err(violations) = compiled.validate(value) {
            for violation in violations {
                let mut segments: Vec<String> = violation
                    .instance_path
                    .to_string()
                    .split('/')
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect();
                if let ValidationErrorKind::Required { property } = &violation.kind {
                    segments.push(
                        property
                            .as_str()
                            .map(str::to_string)
                            .unwrap_or_else(|| property.to_string()),
                    );
                }

                let message = segments
                    .first()
                    .and_then(|field| self.message_for(field))
                    .map(str::to_string)
                    .unwrap_or_else(|| violation.to_string());

                let error = FieldError::new(join_path(prefix, &segments.join(".")), message);
                if !errors.contains(&error) {
                    errors.push(error);
                }
            }
        }

        Ok(errors)
    }

    /// Checks `value` and decodes it into `T` when it conforms.
    pub fn parse<T: DeserializeOwned>(&self, value: &Value, prefix: &str) -> Result<T, AppError> {
        let errors = self.check(value, prefix)?;
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }
        decode(value, prefix)
    }
}

/// Decodes an already-checked value, mapping any serde failure to a field error.
pub fn decode<T: DeserializeOwned>(value: &Value, prefix: &str) -> Result<T, AppError> {
    serde_path_to_error::deserialize(value.clone()).map_err(|err| {
        let path = err.path().to_string();
        let path = if path == "." { String::new() } else { path };
        AppError::Validation(vec![FieldError::new(
            join_path(prefix, &path),
            err.inner().to_string(),
        )])
    })
}

fn join_path(prefix: &str, path: &str) -> String {
    match (prefix.is_empty(), path.is_empty()) {
        (true, true) => "body".to_string(),
        (true, false) => path.to_string(),
        (false, true) => prefix.to_string(),
        (false, false) => format!("{prefix}.{path}"),
    }
}
