//! Command implementations, as `impl Repository` blocks
//!
//! - `plumbing`: Object level commands (hash-object, cat-file, write-tree)
//! - `porcelain`: User-facing workflow commands (add, commit, merge, ...)

pub mod plumbing;
pub mod porcelain;
