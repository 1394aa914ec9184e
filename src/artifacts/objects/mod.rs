//! Content-addressed objects
//!
//! Everything the repository stores is an immutable object named by the
//! SHA-1 digest of its framed bytes. There are three kinds:
//!
//! - **Blob**: raw file content
//! - **Tree**: a flat manifest of `path -> (mode, id)`
//! - **Commit**: a tree id plus parents, identity and message
//!
//! The frame is `<kind> <size>\0<content>`; see [`hasher`].

pub mod blob;
pub mod commit;
pub mod hasher;
pub mod object;
pub mod object_id;
pub mod object_type;
pub mod tree;

/// Length of a SHA-1 hash in hexadecimal format
pub const OBJECT_ID_LENGTH: usize = 40;
