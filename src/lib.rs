//! A minimal single-process record store: named tables with a fixed
//! column schema, one primary-key column per table, row-level CRUD,
//! an in-memory hash index for key lookup, and per-table persistence
//! to a schema/data file pair on disk.

pub mod cli;
pub mod errors;
pub mod persistence;
