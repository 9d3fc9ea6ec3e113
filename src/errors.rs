//! All the ways an operation on the store can fail.
//!
//! The core never recovers from these on its own; every violation is
//! surfaced to the caller and leaves the in-memory state untouched.

use thiserror::Error;

use crate::persistence::FieldType;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("table '{0}' must have one primary key field")]
    NoPrimaryKey(String),

    #[error("table '{0}' declares more than one primary key field")]
    MultiplePrimaryKeys(String),

    #[error("field '{0}' already exists")]
    DuplicateField(String),

    #[error("unsupported type '{0}'")]
    UnsupportedType(String),

    #[error("missing value for field '{0}'")]
    MissingField(String),

    #[error("field '{0}' does not exist in table")]
    UnknownField(String),

    #[error("cannot update primary key field")]
    PrimaryKeyImmutable,

    #[error("table '{0}' already exists")]
    TableExists(String),

    #[error("table '{0}' does not exist")]
    TableNotFound(String),

    #[error("invalid value '{value}' for type {expected}")]
    Parse { value: String, expected: FieldType },

    #[error("invalid field format '{0}', expected name=type or name:type")]
    InvalidFieldDefinition(String),

    #[error("expected key=value format in '{0}'")]
    InvalidPair(String),

    #[error("malformed data file for table '{0}': {1}")]
    MalformedData(String, String),

    #[error("malformed schema file: {0}")]
    SchemaArtifact(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
