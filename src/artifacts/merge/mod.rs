//! Merge engine building blocks
//!
//! - `merge_base`: nearest common ancestor of two commits
//! - `resolve`: per-file three-way reconciliation of snapshots

pub mod merge_base;
pub mod resolve;
