//! Plumbing commands (low-level object operations)
//!
//! - `hash-object`: Compute a blob id and optionally store the blob
//! - `cat-file`: Print an object or its kind
//! - `write-tree`: Store the tree of the next commit
//!
//! `write_commit` is shared by every command that creates commits.

pub mod cat_file;
pub mod hash_object;
mod write_commit;
