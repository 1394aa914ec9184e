//! gitx: a small content-addressable version control engine
//!
//! - [`areas`]: on-disk collaborators (object database, index, refs, working tree, config)
//! - [`artifacts`]: object formats and algorithms (hashing, trees, commits, merge)
//! - [`commands`]: plumbing and porcelain commands on [`areas::repository::Repository`]
//! - [`errors`]: the [`errors::VcsError`] taxonomy

pub mod areas;
pub mod artifacts;
pub mod commands;
pub mod errors;
