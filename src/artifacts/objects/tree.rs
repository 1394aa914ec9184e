//! Tree object
//!
//! A tree is a single-level manifest: one entry per tracked file, named by its
//! full `/`-separated path relative to the repository root. There are no nested
//! subtrees.
//!
//! ## Format
//!
//! On disk: `tree <size>\0<entries>`
//! Each entry is one line: `<mode> <kind> <oid>\t<path>\n`
//!
//! Entries are kept sorted by path, so the same entry set yields the same tree
//! id no matter in which order the paths were staged.

use crate::artifacts::database::database_entry::{DatabaseEntry, FileSnapshot};
use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::{VcsError, VcsResult};
use bytes::Bytes;

/// Flat manifest of `path -> (mode, oid)`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    entries: FileSnapshot,
}

impl Tree {
    /// Build a tree from index entries
    ///
    /// Later entries for the same path replace earlier ones.
    pub fn build<'e>(entries: impl IntoIterator<Item = &'e IndexEntry>) -> Self {
        let entries = entries
            .into_iter()
            .map(|entry| {
                (
                    entry.name.clone(),
                    DatabaseEntry::new(entry.oid.clone(), entry.mode),
                )
            })
            .collect();

        Tree { entries }
    }

    /// Build a tree straight from a file snapshot
    pub fn from_snapshot(snapshot: FileSnapshot) -> Self {
        Tree { entries: snapshot }
    }

    pub fn entries(&self) -> impl Iterator<Item = (&String, &DatabaseEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The flattened `path -> entry` view used by merges and status
    pub fn to_snapshot(&self) -> FileSnapshot {
        self.entries.clone()
    }

    fn entry_line(name: &str, entry: &DatabaseEntry) -> String {
        let kind = if entry.is_tree() {
            ObjectType::Tree
        } else {
            ObjectType::Blob
        };

        format!("{} {} {}\t{}", entry.mode.as_str(), kind, entry.oid, name)
    }
}

impl Packable for Tree {
    fn serialize(&self) -> Bytes {
        let mut content = String::new();
        for (name, entry) in &self.entries {
            content.push_str(&Self::entry_line(name, entry));
            content.push('\n');
        }

        Bytes::from(content)
    }
}

impl Unpackable for Tree {
    fn deserialize(oid: &ObjectId, content: Bytes) -> VcsResult<Self> {
        let content = std::str::from_utf8(&content)
            .map_err(|_| VcsError::corrupt(oid, "tree is not valid UTF-8"))?;

        let mut entries = FileSnapshot::new();
        // split_terminator keeps a trailing `\r` as part of the name
        for line in content.split_terminator('\n') {
            let (header, name) = line
                .split_once('\t')
                .ok_or_else(|| VcsError::corrupt(oid, format!("tree entry without name: {line}")))?;

            let mut fields = header.split(' ');
            let (Some(mode), Some(kind), Some(entry_oid), None) =
                (fields.next(), fields.next(), fields.next(), fields.next())
            else {
                return Err(VcsError::corrupt(oid, format!("malformed tree entry: {line}")));
            };

            let mode = EntryMode::try_from(mode).map_err(|reason| VcsError::corrupt(oid, reason))?;
            let kind = ObjectType::try_from(kind).map_err(|reason| VcsError::corrupt(oid, reason))?;
            if (kind == ObjectType::Tree) != mode.is_tree() {
                return Err(VcsError::corrupt(
                    oid,
                    format!("entry kind {kind} does not match mode {mode}"),
                ));
            }

            let entry_oid = ObjectId::try_parse(entry_oid.to_string())
                .map_err(|_| VcsError::corrupt(oid, format!("bad id in tree entry: {line}")))?;

            entries.insert(name.to_string(), DatabaseEntry::new(entry_oid, mode));
        }

        Ok(Tree { entries })
    }
}

impl Object for Tree {
    fn object_type(&self) -> ObjectType {
        ObjectType::Tree
    }

    fn display(&self) -> String {
        self.entries
            .iter()
            .map(|(name, entry)| Self::entry_line(name, entry))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
