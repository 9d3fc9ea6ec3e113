use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, StoreError};

/// The declared type of a column. Persisted as the lowercase tokens
/// `int`, `double`, `bool` and `string` in the schema file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Int,
    Double,
    Bool,
    String,
}

impl FieldType {
    pub fn parse_token(token: &str) -> Result<FieldType> {
        //! Resolve a schema type token into a [`FieldType`].
        //!
        //! Any token outside the supported set is a hard schema error,
        //! never silently passed through.

        match token {
            "int" => Ok(FieldType::Int),
            "double" => Ok(FieldType::Double),
            "bool" => Ok(FieldType::Bool),
            "string" => Ok(FieldType::String),
            other => Err(StoreError::UnsupportedType(other.to_string())),
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            FieldType::Int => "int",
            FieldType::Double => "double",
            FieldType::Bool => "bool",
            FieldType::String => "string",
        }
    }
}

impl Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.token())
    }
}

/// One column of a table: name, declared type and the primary-key flag.
/// Immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub is_primary: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: FieldType, is_primary: bool) -> Field {
        Field {
            name: name.into(),
            field_type,
            is_primary,
        }
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pk = if self.is_primary { " (PRIMARY KEY)" } else { "" };
        write!(f, "\"{}\" {}{}", self.name, self.field_type, pk)
    }
}
