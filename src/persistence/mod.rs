//! The table/index/persistence triad and the registry over it.
//!
//! - Schema ([`Field`], [`FieldType`]): ordered column descriptors,
//!   exactly one marked primary per table
//! - Row ([`Row`], [`Value`]): one typed record per schema
//! - [`HashIndex`]: chained-bucket map from primary-key value to row
//!   handle, kept in lockstep with the row collection
//! - [`Table`]: schema enforcement and row mutation
//! - [`FileStorage`]: schema/data file pair per table
//! - [`Database`]: name-to-table registry, load-on-open

//  All modules of this lib
mod database;
mod index;
mod row;
mod schema;
mod storage;
mod table;

//  External API
pub use database::Database;
pub use index::HashIndex;
pub use row::{Row, Value};
pub use schema::{Field, FieldType};
pub use storage::FileStorage;
pub use table::Table;
