use std::path::PathBuf;

use indexmap::IndexMap;
use log::{debug, warn};

use crate::errors::{Result, StoreError};

use super::schema::Field;
use super::storage::FileStorage;
use super::table::Table;

/// The collective of all [`Table`] objects in the process, keyed by
/// name, with an optional [`FileStorage`] backing it.
///
/// This is thin glue over the core: it delegates every mutation to
/// [`Table`] and every flush to [`FileStorage`]. The store is
/// single-threaded and single-writer, so tables are owned directly
/// with no locking.
pub struct Database {
    tables: IndexMap<String, Table>,
    storage: Option<FileStorage>,
}

impl Database {
    pub fn open(storage_dir: impl Into<PathBuf>) -> Result<Database> {
        //! Open a persistent database at `storage_dir`, loading every
        //! table persisted there. A table that fails to load is warned
        //! about and skipped, never fatal to the rest.

        let storage = FileStorage::new(storage_dir)?;
        debug!("opening storage at '{}'", storage.storage_dir().display());

        let mut tables = IndexMap::new();

        for name in storage.list_tables()? {
            match storage.load(&name) {
                Ok(table) => {
                    tables.insert(table.name().to_string(), table);
                }
                Err(error) => warn!("failed to load table '{}', skipping: {}", name, error),
            }
        }

        Ok(Database {
            tables,
            storage: Some(storage),
        })
    }

    pub fn in_memory() -> Database {
        //! A database with no backing files; saves become no-ops.

        Database {
            tables: IndexMap::new(),
            storage: None,
        }
    }

    pub fn create_table(&mut self, name: &str, fields: Vec<Field>) -> Result<&Table> {
        //! Create an empty table and register it, persisting it right
        //! away when storage is attached.

        if self.tables.contains_key(name) {
            return Err(StoreError::TableExists(name.to_string()));
        }

        let table = Table::new(name, fields)?;
        if let Some(storage) = &self.storage {
            storage.save(&table)?;
        }

        Ok(self.tables.entry(name.to_string()).or_insert(table))
    }

    pub fn drop_table(&mut self, name: &str) -> Result<()> {
        //! Unregister the table and remove its persisted artifacts.

        if self.tables.shift_remove(name).is_none() {
            return Err(StoreError::TableNotFound(name.to_string()));
        }
        if let Some(storage) = &self.storage {
            storage.delete(name)?;
        }
        Ok(())
    }

    pub fn save_table(&self, name: &str) -> Result<()> {
        //! Flush the table's current in-memory state to disk.

        let table = self
            .tables
            .get(name)
            .ok_or_else(|| StoreError::TableNotFound(name.to_string()))?;
        if let Some(storage) = &self.storage {
            storage.save(table)?;
        }
        Ok(())
    }

    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    pub fn get_table_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.tables.get_mut(name)
    }

    pub fn contains_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    pub fn table_names(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }
}
