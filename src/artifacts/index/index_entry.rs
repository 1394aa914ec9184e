//! Index entry representation
//!
//! Each entry is one staged path: where it lives in the workspace, the blob it
//! resolves to and its mode bit. The file size rides along as the record's
//! `extra` field so `status` can spot size changes without rehashing.

use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{VcsError, VcsResult};
use byteorder::{ByteOrder, NetworkEndian, WriteBytesExt};
use bytes::Bytes;
use derive_new::new;
use std::io::Write;

/// Bytes before the path in every record: mode, raw id, size and path length
pub const ENTRY_FIXED_SIZE: usize = 4 + 20 + 4 + 2;

/// Longest path a record can carry
pub const MAX_PATH_SIZE: usize = u16::MAX as usize;

/// A staged path
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct IndexEntry {
    /// `/`-separated path relative to the repository root
    pub name: String,
    /// Blob id of the staged content
    pub oid: ObjectId,
    pub mode: EntryMode,
    /// Size of the staged content in bytes
    pub size: u32,
}

impl IndexEntry {
    /// Encode the record
    pub fn serialize(&self) -> VcsResult<Bytes> {
        if self.name.is_empty() || self.name.len() > MAX_PATH_SIZE {
            return Err(VcsError::IndexCorrupt(format!(
                "path cannot be stored in the index: {:?}",
                self.name
            )));
        }

        let mut bytes = Vec::with_capacity(ENTRY_FIXED_SIZE + self.name.len());
        bytes.write_u32::<NetworkEndian>(self.mode.as_u32())?;
        self.oid.write_raw_to(&mut bytes);
        bytes.write_u32::<NetworkEndian>(self.size)?;
        bytes.write_u16::<NetworkEndian>(self.name.len() as u16)?;
        bytes.write_all(self.name.as_bytes())?;

        Ok(Bytes::from(bytes))
    }

    /// Decode the fixed part of a record
    ///
    /// Returns the entry minus its name, and the length of the path that
    /// follows in the stream.
    pub fn deserialize_header(bytes: &[u8]) -> VcsResult<(EntryMode, ObjectId, u32, usize)> {
        if bytes.len() != ENTRY_FIXED_SIZE {
            return Err(VcsError::IndexCorrupt("truncated index record".into()));
        }

        let mode = NetworkEndian::read_u32(&bytes[0..4]);
        let mode = EntryMode::try_from(mode).map_err(VcsError::IndexCorrupt)?;
        if mode.is_tree() {
            return Err(VcsError::IndexCorrupt(
                "tree entries cannot be staged".into(),
            ));
        }

        let oid = ObjectId::from_digest(&bytes[4..24])
            .map_err(|_| VcsError::IndexCorrupt("invalid object id in record".into()))?;
        let size = NetworkEndian::read_u32(&bytes[24..28]);
        let path_len = NetworkEndian::read_u16(&bytes[28..30]) as usize;

        if path_len == 0 {
            return Err(VcsError::IndexCorrupt("record with empty path".into()));
        }

        Ok((mode, oid, size, path_len))
    }

    /// Decode the path that follows a record's fixed part
    pub fn deserialize_name(bytes: &[u8]) -> VcsResult<String> {
        let name = std::str::from_utf8(bytes)
            .map_err(|_| VcsError::IndexCorrupt("record path is not valid UTF-8".into()))?;

        Ok(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::index::entry_mode::FileMode;
    use crate::artifacts::objects::hasher;
    use crate::artifacts::objects::object_type::ObjectType;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn oid() -> ObjectId {
        hasher::hash(ObjectType::Blob, b"test data")
    }

    #[rstest]
    fn test_record_layout(oid: ObjectId) {
        let entry = IndexEntry::new(
            "src/main.rs".to_string(),
            oid.clone(),
            EntryMode::File(FileMode::Executable),
            9,
        );

        let bytes = entry.serialize().unwrap();

        assert_eq!(bytes.len(), ENTRY_FIXED_SIZE + "src/main.rs".len());
        assert_eq!(&bytes[0..4], &0o100755u32.to_be_bytes());
        assert_eq!(&bytes[24..28], &9u32.to_be_bytes());
        assert_eq!(&bytes[28..30], &11u16.to_be_bytes());
        assert_eq!(&bytes[30..], b"src/main.rs");

        let (mode, parsed_oid, size, path_len) =
            IndexEntry::deserialize_header(&bytes[..ENTRY_FIXED_SIZE]).unwrap();
        assert_eq!(mode, entry.mode);
        assert_eq!(parsed_oid, oid);
        assert_eq!(size, 9);
        assert_eq!(path_len, 11);
    }

    #[rstest]
    fn test_rejects_unknown_mode(oid: ObjectId) {
        let mut bytes = IndexEntry::new("a".into(), oid, EntryMode::default(), 1)
            .serialize()
            .unwrap()
            .to_vec();
        bytes[0..4].copy_from_slice(&0o100600u32.to_be_bytes());

        assert!(matches!(
            IndexEntry::deserialize_header(&bytes[..ENTRY_FIXED_SIZE]),
            Err(VcsError::IndexCorrupt(_))
        ));
    }

    #[rstest]
    fn test_rejects_empty_path(oid: ObjectId) {
        let entry = IndexEntry::new(String::new(), oid, EntryMode::default(), 0);
        assert!(entry.serialize().is_err());
    }
}
