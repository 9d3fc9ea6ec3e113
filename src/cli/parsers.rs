//! The command grammar and the compact text notations it carries.
//!
//! Schema notation: comma-separated `name=type` (or `name:type`) items,
//! with a leading `@` marking the primary-key field, e.g.
//! `@id=int,name=string`. Row and update payloads are comma-separated
//! `key=value` pairs.

use clap::{Parser, Subcommand};
use indexmap::IndexMap;

use crate::errors::{Result, StoreError};
use crate::persistence::{Field, FieldType};

#[derive(Parser)]
#[command(name = "granary")]
#[command(about = "A tiny single-process record store", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create a table from a compact schema, e.g. "@id=int,name=string"
    Create { table: String, schema: String },

    /// Insert a row given as key=value pairs
    Insert { table: String, row: String },

    /// Look up one row by its primary key value
    Find { table: String, pk: String },

    /// Update a row's fields or extend a table's schema
    #[command(subcommand)]
    Update(UpdateCommand),

    /// Delete a row or drop a whole table
    #[command(subcommand)]
    Delete(DeleteCommand),

    /// Print every record of a table
    Print { table: String },

    /// List registered tables, or describe one
    Tables { table: Option<String> },
}

#[derive(Subcommand)]
pub enum UpdateCommand {
    /// Update fields of the row matching the primary key
    Row {
        table: String,
        pk: String,
        updates: String,
    },

    /// Append new columns given in compact schema notation
    Schema { table: String, schema: String },
}

#[derive(Subcommand)]
pub enum DeleteCommand {
    /// Delete the row matching the primary key
    Row { table: String, pk: String },

    /// Drop the table and its persisted files
    Table { table: String },
}

pub fn parse_schema(schema_str: &str) -> Result<Vec<Field>> {
    //! Parse compact schema notation into a field list. Empty items
    //! between commas are skipped; an unsupported type token fails the
    //! whole definition.

    let mut fields = Vec::new();

    for part in schema_str.split(',') {
        let mut part = part.trim();
        if part.is_empty() {
            continue;
        }

        let is_primary = part.starts_with('@');
        if is_primary {
            part = &part[1..];
        }

        let (name, type_token) = part
            .split_once('=')
            .or_else(|| part.split_once(':'))
            .ok_or_else(|| StoreError::InvalidFieldDefinition(part.to_string()))?;

        fields.push(Field::new(
            name.trim(),
            FieldType::parse_token(type_token.trim())?,
            is_primary,
        ));
    }

    Ok(fields)
}

pub fn parse_pairs(pairs_str: &str) -> Result<IndexMap<String, String>> {
    //! Parse `key=value,key2=value2` text into an ordered map.

    let mut pairs = IndexMap::new();

    for pair in pairs_str.split(',') {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }

        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| StoreError::InvalidPair(pair.to_string()))?;
        pairs.insert(key.trim().to_string(), value.trim().to_string());
    }

    Ok(pairs)
}
