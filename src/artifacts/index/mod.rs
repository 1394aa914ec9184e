//! Index file format
//!
//! The index holds the entries staged since the last commit.
//!
//! ## File Format (Version 1)
//!
//! ```text
//! Header (12 bytes):
//!   - Signature: "GXIX" (4 bytes)
//!   - Version: 1 (4 bytes)
//!   - Entry count (4 bytes)
//!
//! Records (variable length, no padding):
//!   - mode (4 bytes)
//!   - object id (20 raw bytes)
//!   - file size (4 bytes)
//!   - path length (2 bytes)
//!   - path (UTF-8, `/`-separated)
//!
//! Checksum (20 bytes):
//!   - SHA-1 hash of all preceding bytes
//! ```
//!
//! All integers are big-endian.

pub mod checksum;
pub mod entry_mode;
pub mod index_entry;

/// Size of SHA-1 checksum in bytes
pub const CHECKSUM_SIZE: usize = 20;

/// Size of index header in bytes
pub const HEADER_SIZE: usize = 12; // 4 bytes for marker, 4 for version, 4 for entries_count

/// Magic signature identifying index files
pub const SIGNATURE: &[u8; 4] = b"GXIX";

/// Index file format version
pub const VERSION: u32 = 1;
