//! Database entry types
//!
//! Types used when reading snapshots back from the object database.

pub mod database_entry;
