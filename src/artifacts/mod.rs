//! Data types and algorithms
//!
//! - `branch`: branch name validation and revision expressions
//! - `core`: pager and terminal helpers
//! - `database`: snapshot entry types
//! - `index`: staged entries and the on-disk index codec
//! - `merge`: merge-base search and three-way resolution
//! - `objects`: blobs, trees, commits and the hasher
//! - `status`: working tree status classification

pub mod branch;
pub mod core;
pub mod database;
pub mod index;
pub mod merge;
pub mod objects;
pub mod status;
