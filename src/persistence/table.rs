use std::fmt::Display;

use indexmap::IndexMap;

use crate::errors::{Result, StoreError};

use super::index::HashIndex;
use super::row::{Row, Value};
use super::schema::{Field, FieldType};

/// A named table: an ordered field list, an ordered row collection and
/// a [`HashIndex`] over the primary-key column.
///
/// Rows and index are only ever mutated through the methods here, which
/// keep the two in lockstep on every return path. A failed operation
/// leaves both untouched.
#[derive(Debug)]
pub struct Table {
    name: String,
    fields: Vec<Field>,
    rows: Vec<Row>,
    primary_key: String,
    index: HashIndex,
}

impl Table {
    pub fn new(name: impl Into<String>, fields: Vec<Field>) -> Result<Table> {
        //! Build an empty table over `fields`. The field list must name
        //! exactly one primary-key column and carry no duplicate names.

        let name = name.into();

        for (position, field) in fields.iter().enumerate() {
            if fields[..position].iter().any(|f| f.name == field.name) {
                return Err(StoreError::DuplicateField(field.name.clone()));
            }
        }

        let mut primary_key = None;
        for field in fields.iter().filter(|f| f.is_primary) {
            if primary_key.replace(field.name.clone()).is_some() {
                return Err(StoreError::MultiplePrimaryKeys(name));
            }
        }
        let primary_key = primary_key.ok_or_else(|| StoreError::NoPrimaryKey(name.clone()))?;

        Ok(Table {
            name,
            fields,
            rows: Vec::new(),
            primary_key,
            index: HashIndex::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn primary_key_field(&self) -> &str {
        &self.primary_key
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn primary_key_type(&self) -> FieldType {
        // The constructor guarantees the primary field exists.
        self.fields
            .iter()
            .find(|field| field.is_primary)
            .map(|field| field.field_type)
            .unwrap_or(FieldType::String)
    }

    pub fn insert(&mut self, row: Row) -> Result<()> {
        //! Append `row` and index it by its primary-key value.
        //!
        //! The row's key set must equal the declared field set: a
        //! missing field or a stray undeclared one fails the insert
        //! with rows and index untouched.
        //!
        //! A primary-key value that already exists overwrites the prior
        //! index slot while the older row stays in the row collection,
        //! unreachable by key lookup but visible to scans and saves.

        for field in &self.fields {
            if row.get(&field.name).is_none() {
                return Err(StoreError::MissingField(field.name.clone()));
            }
        }
        for name in row.0.keys() {
            if self.field(name).is_none() {
                return Err(StoreError::UnknownField(name.clone()));
            }
        }

        let pk_value = match row.get(&self.primary_key) {
            Some(value) => value.clone(),
            None => return Err(StoreError::MissingField(self.primary_key.clone())),
        };

        self.rows.push(row);
        self.index.insert(pk_value, self.rows.len() - 1);
        Ok(())
    }

    pub fn find_row(&self, pk_value: &Value) -> Option<&Row> {
        //! Index lookup only, no row scan.

        self.index
            .find(pk_value)
            .and_then(|handle| self.rows.get(handle))
    }

    pub fn delete_row(&mut self, pk_value: &Value) -> bool {
        //! Remove the row keyed by `pk_value` from both the index and
        //! the row collection.
        //!
        //! Returns true only if both removals occurred; a miss in the
        //! index leaves the rows untouched and returns false.

        if !self.index.delete(pk_value) {
            return false;
        }

        let position = self
            .rows
            .iter()
            .position(|row| row.get(&self.primary_key) == Some(pk_value));

        match position {
            Some(position) => {
                self.rows.remove(position);
                self.index.shift_back(position);
                true
            }
            None => false,
        }
    }

    pub fn update_row(
        &mut self,
        pk_value: &Value,
        updates: IndexMap<String, Value>,
    ) -> Result<bool> {
        //! Mutate the fields of the row keyed by `pk_value` in place.
        //!
        //! Every update key is validated before anything is written, so
        //! a rejected update never partially mutates the row. Returns
        //! `Ok(false)` when no row carries `pk_value`.

        for name in updates.keys() {
            if *name == self.primary_key {
                return Err(StoreError::PrimaryKeyImmutable);
            }
            if self.field(name).is_none() {
                return Err(StoreError::UnknownField(name.clone()));
            }
        }

        let Some(handle) = self.index.find(pk_value) else {
            return Ok(false);
        };

        let row = &mut self.rows[handle];
        for (name, value) in updates {
            row.set(name, value);
        }
        Ok(true)
    }

    pub fn add_column(&mut self, field: Field) -> Result<()> {
        //! Append a new column to the schema and backfill it with
        //! [`Value::Null`] on every existing row.

        if self.field(&field.name).is_some() {
            return Err(StoreError::DuplicateField(field.name));
        }
        // A second primary field would break key lookups for good.
        if field.is_primary {
            return Err(StoreError::MultiplePrimaryKeys(self.name.clone()));
        }

        for row in &mut self.rows {
            row.set(field.name.clone(), Value::Null);
        }
        self.fields.push(field);
        Ok(())
    }

    pub fn rebuild_index(&mut self) {
        //! Re-insert every row keyed by its primary-key value, from
        //! scratch. Used after loading rows from disk.

        self.index.clear();
        for (handle, row) in self.rows.iter().enumerate() {
            let pk_value = row.get(&self.primary_key).cloned().unwrap_or(Value::Null);
            self.index.insert(pk_value, handle);
        }
    }

    pub(crate) fn push_row_unindexed(&mut self, row: Row) {
        //! Append an already-typed row without touching the index. The
        //! load path calls [`Table::rebuild_index`] once all rows are in.

        self.rows.push(row);
    }
}

impl Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "<Table \"{}\">", self.name)?;
        for field in &self.fields {
            writeln!(f, "{}", field)?;
        }
        Ok(())
    }
}
