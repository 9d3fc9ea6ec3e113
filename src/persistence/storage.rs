use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, StoreError};

use super::row::{Row, Value};
use super::schema::Field;
use super::table::Table;

const SCHEMA_SUFFIX: &str = ".schema.json";
const DATA_SUFFIX: &str = ".csv";

/// The JSON document written next to each table's data file.
#[derive(Serialize, Deserialize)]
struct SchemaArtifact {
    fields: Vec<Field>,
}

/// Durable persistence for tables: one schema file and one data file
/// per table, both keyed by a filesystem-safe form of the table name.
///
/// The data file is delimited text with one header record of field
/// names in schema order, then one record per row. A null value is an
/// empty field; cells containing the delimiter, quotes or newlines are
/// double-quoted.
pub struct FileStorage {
    storage_dir: PathBuf,
}

impl FileStorage {
    pub fn new(storage_dir: impl Into<PathBuf>) -> Result<FileStorage> {
        let storage_dir = storage_dir.into();
        fs::create_dir_all(&storage_dir)?;
        Ok(FileStorage { storage_dir })
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    pub fn save(&self, table: &Table) -> Result<()> {
        //! Write both artifacts for `table`, replacing whatever was
        //! there before.

        let artifact = SchemaArtifact {
            fields: table.fields().to_vec(),
        };
        fs::write(
            self.schema_path(table.name()),
            serde_json::to_string_pretty(&artifact)?,
        )?;

        let mut data = String::new();
        let header: Vec<String> = table
            .fields()
            .iter()
            .map(|field| field.name.clone())
            .collect();
        push_record(&mut data, &header);

        for row in table.rows() {
            let cells: Vec<String> = table
                .fields()
                .iter()
                .map(|field| row.get(&field.name).map(Value::render).unwrap_or_default())
                .collect();
            push_record(&mut data, &cells);
        }
        fs::write(self.data_path(table.name()), data)?;

        debug!("saved table '{}' ({} rows)", table.name(), table.len());
        Ok(())
    }

    pub fn load(&self, table_name: &str) -> Result<Table> {
        //! Reconstruct a table from its two artifacts: fields from the
        //! schema file, then one typed row per data record, then a full
        //! index rebuild.

        let schema_path = self.schema_path(table_name);
        let data_path = self.data_path(table_name);
        if !schema_path.is_file() || !data_path.is_file() {
            return Err(StoreError::TableNotFound(table_name.to_string()));
        }

        let artifact: SchemaArtifact = serde_json::from_str(&fs::read_to_string(schema_path)?)?;
        let mut table = Table::new(table_name, artifact.fields)?;

        let data = fs::read_to_string(data_path)?;
        let mut records = parse_records(&data)
            .map_err(|reason| StoreError::MalformedData(table_name.to_string(), reason.to_string()))?
            .into_iter();
        let header = records.next().unwrap_or_default();

        let fields = table.fields().to_vec();
        for record in records {
            let mut row = Row::new();
            for field in &fields {
                let cell = header
                    .iter()
                    .position(|name| *name == field.name)
                    .and_then(|position| record.get(position))
                    .map(String::as_str)
                    .unwrap_or("");
                row.set(field.name.clone(), Value::parse(cell, field.field_type)?);
            }
            table.push_row_unindexed(row);
        }
        table.rebuild_index();

        debug!("loaded table '{}' ({} rows)", table.name(), table.len());
        Ok(table)
    }

    pub fn delete(&self, table_name: &str) -> Result<()> {
        //! Remove whichever of the two artifacts exist. Absence of
        //! either is not an error, so the call is idempotent.

        for path in [self.schema_path(table_name), self.data_path(table_name)] {
            if path.is_file() {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }

    pub fn list_tables(&self) -> Result<Vec<String>> {
        //! Enumerate persisted table names by scanning the storage
        //! directory for schema files, undoing the safe-name mapping.

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.storage_dir)? {
            let file_name = entry?.file_name();
            let file_name = file_name.to_string_lossy();
            if let Some(safe_name) = file_name.strip_suffix(SCHEMA_SUFFIX) {
                names.push(safe_name.replace('_', " "));
            }
        }
        names.sort();
        Ok(names)
    }

    fn schema_path(&self, table_name: &str) -> PathBuf {
        self.storage_dir
            .join(format!("{}{}", safe_name(table_name), SCHEMA_SUFFIX))
    }

    fn data_path(&self, table_name: &str) -> PathBuf {
        self.storage_dir
            .join(format!("{}{}", safe_name(table_name), DATA_SUFFIX))
    }
}

/// Substitute spaces and path separators so the table name is usable as
/// a file stem. [`FileStorage::list_tables`] applies the reverse
/// mapping, so save and reload agree on the name.
fn safe_name(table_name: &str) -> String {
    table_name
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '_',
            other => other,
        })
        .collect()
}

fn push_record(out: &mut String, cells: &[String]) {
    for (position, cell) in cells.iter().enumerate() {
        if position > 0 {
            out.push(',');
        }
        if cell.contains(['"', ',', '\n', '\r']) {
            out.push('"');
            out.push_str(&cell.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(cell);
        }
    }
    out.push('\n');
}

/// Split delimited text into records of cells, honoring double-quoted
/// cells with `""` escapes and either newline convention.
fn parse_records(text: &str) -> std::result::Result<Vec<Vec<String>>, &'static str> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    cell.push('"');
                }
                '"' => in_quotes = false,
                other => cell.push(other),
            }
            continue;
        }

        match c {
            '"' => in_quotes = true,
            ',' => record.push(std::mem::take(&mut cell)),
            '\r' | '\n' => {
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                record.push(std::mem::take(&mut cell));
                records.push(std::mem::take(&mut record));
            }
            other => cell.push(other),
        }
    }

    if in_quotes {
        return Err("unterminated quoted cell");
    }
    if !cell.is_empty() || !record.is_empty() {
        record.push(cell);
        records.push(record);
    }
    Ok(records)
}
