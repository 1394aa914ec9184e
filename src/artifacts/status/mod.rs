//! Working tree status
//!
//! Compares three snapshots of the same paths:
//!
//! - HEAD, the last commit
//! - the next commit, i.e. HEAD overlaid with the staged entries
//! - the working tree, hashed on the fly
//!
//! ## Components
//!
//! - `file_change`: Change kinds and their labels
//! - `status_info`: Classification of every path into the three sections

pub mod file_change;
pub mod status_info;
