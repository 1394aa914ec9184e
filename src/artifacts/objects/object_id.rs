//! Content identifier (SHA-1 digest)
//!
//! Object IDs are 40-character lowercase hexadecimal strings. They are the only
//! way objects are named, and they are derived from content by the hasher.
//!
//! ## Storage
//!
//! Objects are stored in `.gitx/objects/<first-2-chars>/<remaining-38-chars>`

use crate::artifacts::objects::OBJECT_ID_LENGTH;
use crate::errors::{VcsError, VcsResult};
use std::path::PathBuf;

/// Content identifier of a blob, tree or commit
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct ObjectId(String);

impl ObjectId {
    /// Parse and validate an object ID from a string
    ///
    /// Accepts exactly 40 lowercase hexadecimal characters.
    pub fn try_parse(id: String) -> VcsResult<Self> {
        if id.len() != OBJECT_ID_LENGTH {
            return Err(VcsError::InvalidObjectId(id));
        }
        if !id.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')) {
            return Err(VcsError::InvalidObjectId(id));
        }
        Ok(Self(id))
    }

    /// Build an object ID from a raw 20-byte digest
    pub fn from_digest(digest: &[u8]) -> VcsResult<Self> {
        let hex = digest
            .iter()
            .map(|byte| format!("{byte:02x}"))
            .collect::<String>();
        Self::try_parse(hex)
    }

    /// Check whether a string looks like a full object ID without allocating one
    pub fn is_valid(id: &str) -> bool {
        id.len() == OBJECT_ID_LENGTH && id.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f'))
    }

    /// Write the 20 raw digest bytes to the given buffer
    pub fn write_raw_to(&self, buffer: &mut Vec<u8>) {
        for i in (0..OBJECT_ID_LENGTH).step_by(2) {
            // validated as hex on construction
            let byte = u8::from_str_radix(&self.0[i..i + 2], 16).unwrap_or_default();
            buffer.push(byte);
        }
    }

    /// Convert to file system path for object storage
    ///
    /// Splits the hash as `XX/YYYYYY...` where XX is the first 2 chars.
    pub fn to_path(&self) -> PathBuf {
        let (dir, file) = self.0.split_at(2);
        PathBuf::from(dir).join(file)
    }

    /// First 7 characters of the hash
    pub fn to_short_oid(&self) -> String {
        self.0.split_at(7).0.to_string()
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
