use indexmap::IndexMap;

use crate::errors::{Result, StoreError};
use crate::persistence::{Database, Row, Table, Value};

use super::parsers::{Command, DeleteCommand, UpdateCommand, parse_pairs, parse_schema};

/// Executes one parsed [`Command`] against the database and renders the
/// outcome as plain text for the binary to print.
///
/// All real work happens in the persistence layer; this type only
/// converts textual arguments into typed values against the target
/// table's schema and formats results.
pub struct Executor<'a> {
    database: &'a mut Database,
}

impl<'a> Executor<'a> {
    pub fn new(database: &'a mut Database) -> Executor<'a> {
        Executor { database }
    }

    pub fn execute(self, command: Command) -> Result<String> {
        match command {
            Command::Create { table, schema } => self.create(&table, &schema),
            Command::Insert { table, row } => self.insert(&table, &row),
            Command::Find { table, pk } => self.find(&table, &pk),
            Command::Update(UpdateCommand::Row { table, pk, updates }) => {
                self.update_row(&table, &pk, &updates)
            }
            Command::Update(UpdateCommand::Schema { table, schema }) => {
                self.update_schema(&table, &schema)
            }
            Command::Delete(DeleteCommand::Row { table, pk }) => self.delete_row(&table, &pk),
            Command::Delete(DeleteCommand::Table { table }) => self.drop_table(&table),
            Command::Print { table } => self.print(&table),
            Command::Tables { table } => self.tables(table.as_deref()),
        }
    }

    fn create(self, table_name: &str, schema_str: &str) -> Result<String> {
        let fields = parse_schema(schema_str)?;
        let table = self.database.create_table(table_name, fields)?;
        Ok(format!("Created table:\n{}", table))
    }

    fn insert(mut self, table_name: &str, row_str: &str) -> Result<String> {
        let pairs = parse_pairs(row_str)?;

        let table = self._get_table_mut(table_name)?;
        let mut row = Row::new();
        for (name, text) in &pairs {
            row.set(name.clone(), _typed_value(table, name, text)?);
        }
        table.insert(row)?;

        self.database.save_table(table_name)?;
        Ok(format!("Inserted row into '{}': {}", table_name, row_str))
    }

    fn find(self, table_name: &str, pk_str: &str) -> Result<String> {
        let table = self._get_table(table_name)?;
        let pk_value = Value::parse(pk_str, table.primary_key_type())?;

        match table.find_row(&pk_value) {
            Some(row) => {
                let mut output = String::from("Found row:");
                for (name, value) in &row.0 {
                    output.push_str(&format!("\n  {}: {}", name, value));
                }
                Ok(output)
            }
            None => Ok(format!(
                "Row with primary key {} not found in table '{}'",
                pk_str, table_name
            )),
        }
    }

    fn update_row(mut self, table_name: &str, pk_str: &str, updates_str: &str) -> Result<String> {
        let pairs = parse_pairs(updates_str)?;

        let table = self._get_table_mut(table_name)?;
        let pk_value = Value::parse(pk_str, table.primary_key_type())?;

        let mut updates = IndexMap::new();
        for (name, text) in &pairs {
            // The primary key check belongs to Table; type the value
            // only for fields the schema actually declares.
            let value = match table.field(name) {
                Some(field) => Value::parse(text, field.field_type)?,
                None => Value::Null,
            };
            updates.insert(name.clone(), value);
        }

        if table.update_row(&pk_value, updates)? {
            self.database.save_table(table_name)?;
            Ok(format!(
                "Updated row with primary key {} in {}",
                pk_str, table_name
            ))
        } else {
            Ok(format!("Row with primary key {} not found", pk_str))
        }
    }

    fn update_schema(mut self, table_name: &str, schema_str: &str) -> Result<String> {
        let fields = parse_schema(schema_str)?;

        let table = self._get_table_mut(table_name)?;
        for field in fields {
            table.add_column(field)?;
        }

        let mut output = format!("Updated schema of table '{}'. Now fields are:", table_name);
        let table = self._get_table(table_name)?;
        for field in table.fields() {
            output.push_str(&format!("\n - {}", field));
        }

        self.database.save_table(table_name)?;
        Ok(output)
    }

    fn delete_row(mut self, table_name: &str, pk_str: &str) -> Result<String> {
        let table = self._get_table_mut(table_name)?;
        let pk_value = Value::parse(pk_str, table.primary_key_type())?;

        if table.delete_row(&pk_value) {
            self.database.save_table(table_name)?;
            Ok(format!(
                "Deleted row with primary key {} from {}",
                pk_str, table_name
            ))
        } else {
            Ok(format!("Row with primary key {} not found", pk_str))
        }
    }

    fn drop_table(self, table_name: &str) -> Result<String> {
        self.database.drop_table(table_name)?;
        Ok(format!("Dropped table '{}'", table_name))
    }

    fn print(self, table_name: &str) -> Result<String> {
        let table = self._get_table(table_name)?;
        if table.is_empty() {
            return Ok(format!("Table '{}' is empty.", table_name));
        }

        let mut output = format!("All records from table '{}':\n", table_name);
        let header: Vec<&str> = table
            .fields()
            .iter()
            .map(|field| field.name.as_str())
            .collect();
        output.push_str(&header.join("\t"));

        for row in table.rows() {
            let cells: Vec<String> = table
                .fields()
                .iter()
                .map(|field| {
                    row.get(&field.name)
                        .map(|value| value.to_string())
                        .unwrap_or_default()
                })
                .collect();
            output.push('\n');
            output.push_str(&cells.join("\t"));
        }
        Ok(output)
    }

    fn tables(self, table_name: Option<&str>) -> Result<String> {
        match table_name {
            Some(name) => {
                let table = self._get_table(name)?;
                Ok(table.to_string())
            }
            None => Ok(self.database.table_names().join("\n")),
        }
    }

    fn _get_table(&self, table_name: &str) -> Result<&Table> {
        self.database
            .get_table(table_name)
            .ok_or_else(|| StoreError::TableNotFound(table_name.to_string()))
    }

    fn _get_table_mut(&mut self, table_name: &str) -> Result<&mut Table> {
        self.database
            .get_table_mut(table_name)
            .ok_or_else(|| StoreError::TableNotFound(table_name.to_string()))
    }
}

fn _typed_value(table: &Table, field_name: &str, text: &str) -> Result<Value> {
    let field = table
        .field(field_name)
        .ok_or_else(|| StoreError::UnknownField(field_name.to_string()))?;
    Value::parse(text, field.field_type)
}
