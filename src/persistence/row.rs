use std::fmt::Display;
use std::hash::{Hash, Hasher};

use indexmap::IndexMap;

use crate::errors::{Result, StoreError};

use super::schema::FieldType;

/// Truthy tokens accepted when parsing a boolean from text
/// (case-insensitive). Everything else parses as false.
const TRUE_TOKENS: [&str; 5] = ["1", "true", "yes", "y", "t"];

/// A single typed cell value. `Null` stands for an absent value and
/// renders as the empty string in the data file.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Double(f64),
    Bool(bool),
    Text(String),
    Null,
}

impl Value {
    pub fn parse(text: &str, field_type: FieldType) -> Result<Value> {
        //! Convert a textual value into its declared type. The empty
        //! string always means [`Value::Null`], whatever the type.

        if text.is_empty() {
            return Ok(Value::Null);
        }

        match field_type {
            FieldType::Int => text
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| Self::_parse_error(text, field_type)),
            FieldType::Double => text
                .parse::<f64>()
                .map(Value::Double)
                .map_err(|_| Self::_parse_error(text, field_type)),
            FieldType::Bool => {
                let truthy = TRUE_TOKENS
                    .iter()
                    .any(|token| token.eq_ignore_ascii_case(text));
                Ok(Value::Bool(truthy))
            }
            FieldType::String => Ok(Value::Text(text.to_string())),
        }
    }

    pub fn render(&self) -> String {
        //! The textual form written to the data file. Inverse of
        //! [`Value::parse`] for every supported type.

        match self {
            Value::Int(value) => value.to_string(),
            Value::Double(value) => value.to_string(),
            Value::Bool(value) => value.to_string(),
            Value::Text(value) => value.clone(),
            Value::Null => String::new(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    fn _parse_error(text: &str, expected: FieldType) -> StoreError {
        StoreError::Parse {
            value: text.to_string(),
            expected,
        }
    }
}

// Keys in the hash index are `Value`s, so hashing must be deterministic
// across all variants. Doubles hash by bit pattern.
impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Int(value) => value.hash(state),
            Value::Double(value) => value.to_bits().hash(state),
            Value::Bool(value) => value.hash(state),
            Value::Text(value) => value.hash(state),
            Value::Null => {}
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "NIL"),
            other => write!(f, "{}", other.render()),
        }
    }
}

/// One record of a table: an ordered mapping from field name to typed
/// value. After any successful mutation every declared field of the
/// owning table has an entry here, possibly [`Value::Null`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row(pub IndexMap<String, Value>);

impl Row {
    pub fn new() -> Row {
        Row(IndexMap::new())
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        self.0.insert(field.into(), value);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Row {
        Row(iter.into_iter().collect())
    }
}

impl Display for Row {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let row: Vec<String> = self.0.values().map(|value| value.to_string()).collect();
        write!(f, "{}", row.join(" | "))
    }
}
