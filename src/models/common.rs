//! Shared payload shapes validated wherever a value crosses a module boundary.

use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("{schema}: expected a JSON object")]
    NotAnObject { schema: &'static str },
    #[error("{schema}: missing field `{field}`")]
    MissingField {
        schema: &'static str,
        field: &'static str,
    },
    #[error("{schema}: field `{field}` must be {expected}")]
    WrongType {
        schema: &'static str,
        field: &'static str,
        expected: &'static str,
    },
}

impl SchemaError {
    /// Name of the first offending field, if the failure is field-specific.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            SchemaError::NotAnObject { .. } => None,
            SchemaError::MissingField { field, .. } | SchemaError::WrongType { field, .. } => {
                Some(*field)
            }
        }
    }
}

/// A typed shape that can be validated out of untyped JSON.
pub trait Schema: Sized {
    const NAME: &'static str;

    fn from_value(value: &Value) -> Result<Self, SchemaError>;
}

/// Validate `value` against the shape `T`.
pub fn parse<T: Schema>(value: &Value) -> Result<T, SchemaError> {
    T::from_value(value)
}

struct Fields<'a> {
    schema: &'static str,
    object: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    fn of(schema: &'static str, value: &'a Value) -> Result<Self, SchemaError> {
        value
            .as_object()
            .map(|object| Self { schema, object })
            .ok_or(SchemaError::NotAnObject { schema })
    }

    fn get(&self, field: &'static str) -> Result<&'a Value, SchemaError> {
        self.object.get(field).ok_or(SchemaError::MissingField {
            schema: self.schema,
            field,
        })
    }

    fn string(&self, field: &'static str) -> Result<String, SchemaError> {
        self.get(field)?
            .as_str()
            .map(str::to_owned)
            .ok_or(SchemaError::WrongType {
                schema: self.schema,
                field,
                expected: "a string",
            })
    }

    fn integer(&self, field: &'static str) -> Result<i64, SchemaError> {
        self.get(field)?.as_i64().ok_or(SchemaError::WrongType {
            schema: self.schema,
            field,
            expected: "an integer",
        })
    }
}

/// Parsed file content: its content type and raw text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileContent {
    #[serde(rename = "type")]
    kind: String,
    raw: String,
}

impl FileContent {
    pub fn new(kind: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            raw: raw.into(),
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }
}

impl Schema for FileContent {
    const NAME: &'static str = "FileContent";

    fn from_value(value: &Value) -> Result<Self, SchemaError> {
        let fields = Fields::of(Self::NAME, value)?;
        Ok(Self {
            kind: fields.string("type")?,
            raw: fields.string("raw")?,
        })
    }
}

/// Status/message acknowledgement for flag-style operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlagResponse {
    status: i64,
    errmsg: String,
}

impl FlagResponse {
    pub fn new(status: i64, errmsg: impl Into<String>) -> Self {
        Self {
            status,
            errmsg: errmsg.into(),
        }
    }

    pub fn status(&self) -> i64 {
        self.status
    }

    pub fn errmsg(&self) -> &str {
        &self.errmsg
    }
}

impl Schema for FlagResponse {
    const NAME: &'static str = "FlagResponse";

    fn from_value(value: &Value) -> Result<Self, SchemaError> {
        let fields = Fields::of(Self::NAME, value)?;
        Ok(Self {
            status: fields.integer("status")?,
            errmsg: fields.string("errmsg")?,
        })
    }
}
