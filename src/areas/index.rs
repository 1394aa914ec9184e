//! Staging area
//!
//! The index records the paths staged since the last commit, each mapped to
//! the blob that holds its content. It is loaded from `.gitx/index` at the
//! start of a command and written back when changed; nothing about it lives in
//! process memory between invocations.
//!
//! See [`crate::artifacts::index`] for the on-disk format.

use crate::artifacts::index::checksum::Checksum;
use crate::artifacts::index::index_entry::{ENTRY_FIXED_SIZE, IndexEntry};
use crate::artifacts::index::{HEADER_SIZE, SIGNATURE, VERSION};
use crate::errors::{VcsError, VcsResult};
use byteorder::{ByteOrder, NetworkEndian, WriteBytesExt};
use fake::rand;
use std::collections::BTreeMap;
use std::io::BufReader;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct Index {
    /// Path to the index file (`.gitx/index`)
    path: Box<Path>,
    /// Staged entries keyed by path
    entries: BTreeMap<String, IndexEntry>,
    /// Whether the in-memory entries differ from the file
    changed: bool,
}

impl Index {
    pub fn new(path: Box<Path>) -> Self {
        Index {
            path,
            entries: BTreeMap::new(),
            changed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the in-memory entries with the contents of the index file
    ///
    /// A missing or empty file is an empty index.
    pub fn rehydrate(&mut self) -> VcsResult<()> {
        self.entries.clear();
        self.changed = false;

        let file = match std::fs::File::open(self.path()) {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(err) => return Err(err.into()),
        };

        if file.metadata()?.len() == 0 {
            return Ok(());
        }

        let mut reader = Checksum::new(BufReader::new(file));
        let entries_count = Self::parse_header(&mut reader)?;
        self.parse_entries(entries_count, &mut reader)?;
        reader.verify()?;

        tracing::trace!(entries = self.entries.len(), "loaded index");
        Ok(())
    }

    fn parse_header<R: std::io::Read>(reader: &mut Checksum<R>) -> VcsResult<u32> {
        let header = reader.read(HEADER_SIZE)?;

        if &header[0..4] != SIGNATURE {
            return Err(VcsError::IndexCorrupt("invalid index file signature".into()));
        }

        let version = NetworkEndian::read_u32(&header[4..8]);
        if version != VERSION {
            return Err(VcsError::IndexCorrupt(format!(
                "unsupported index file version: {version}"
            )));
        }

        Ok(NetworkEndian::read_u32(&header[8..12]))
    }

    fn parse_entries<R: std::io::Read>(
        &mut self,
        entries_count: u32,
        reader: &mut Checksum<R>,
    ) -> VcsResult<()> {
        for _ in 0..entries_count {
            let fixed = reader.read(ENTRY_FIXED_SIZE)?;
            let (mode, oid, size, path_len) = IndexEntry::deserialize_header(&fixed)?;
            let name = IndexEntry::deserialize_name(&reader.read(path_len)?)?;

            if self.entries.contains_key(&name) {
                return Err(VcsError::IndexCorrupt(format!("duplicate entry for {name}")));
            }
            self.entries
                .insert(name.clone(), IndexEntry::new(name, oid, mode, size));
        }

        Ok(())
    }

    /// Insert or overwrite the entry for a path
    pub fn stage(&mut self, entry: IndexEntry) {
        tracing::debug!(path = %entry.name, oid = %entry.oid.to_short_oid(), "staged");

        self.entries.insert(entry.name.clone(), entry);
        self.changed = true;
    }

    pub fn entry_by_path(&self, path: &str) -> Option<&IndexEntry> {
        self.entries.get(path)
    }

    /// Staged entries in path order
    pub fn entries(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub fn clear(&mut self) {
        if !self.entries.is_empty() {
            self.changed = true;
        }
        self.entries.clear();
    }

    /// Persist the entries, replacing the index file in one rename
    pub fn write_updates(&mut self) -> VcsResult<()> {
        let mut writer = Checksum::new(Vec::new());

        let mut header = Vec::with_capacity(HEADER_SIZE);
        header.extend_from_slice(SIGNATURE);
        header.write_u32::<NetworkEndian>(VERSION)?;
        header.write_u32::<NetworkEndian>(self.entries.len() as u32)?;
        writer.write(&header)?;

        for entry in self.entries() {
            writer.write(&entry.serialize()?)?;
        }

        let bytes = writer.write_checksum()?;

        let temp_path = self
            .path
            .with_file_name(format!("index.tmp-{}", rand::random::<u32>()));
        std::fs::write(&temp_path, bytes)?;
        std::fs::rename(&temp_path, self.path())?;

        self.changed = false;
        tracing::trace!(entries = self.entries.len(), "wrote index");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::index::entry_mode::{EntryMode, FileMode};
    use crate::artifacts::objects::hasher;
    use crate::artifacts::objects::object_type::ObjectType;
    use assert_fs::TempDir;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn temp_dir() -> TempDir {
        TempDir::new().unwrap()
    }

    fn index_in(dir: &TempDir) -> Index {
        Index::new(dir.path().join("index").into_boxed_path())
    }

    fn entry(name: &str, content: &str) -> IndexEntry {
        IndexEntry::new(
            name.to_string(),
            hasher::hash(ObjectType::Blob, content.as_bytes()),
            EntryMode::File(FileMode::Regular),
            content.len() as u32,
        )
    }

    #[rstest]
    fn test_missing_and_empty_files_are_empty_indexes(temp_dir: TempDir) {
        let mut index = index_in(&temp_dir);
        index.rehydrate().unwrap();
        assert!(index.is_empty());

        std::fs::write(index.path(), b"").unwrap();
        index.rehydrate().unwrap();
        assert!(index.is_empty());
    }

    #[rstest]
    fn test_persisted_entries_survive_reload(temp_dir: TempDir) {
        let mut index = index_in(&temp_dir);
        let mut exec = entry("bin/tool", "#!/bin/sh");
        exec.mode = EntryMode::File(FileMode::Executable);

        index.stage(entry("b.txt", "two"));
        index.stage(entry("a.txt", "one"));
        index.stage(exec);
        index.write_updates().unwrap();

        let mut reloaded = index_in(&temp_dir);
        reloaded.rehydrate().unwrap();

        assert_eq!(
            reloaded.entries().cloned().collect::<Vec<_>>(),
            index.entries().cloned().collect::<Vec<_>>()
        );
        assert!(reloaded.entry_by_path("bin/tool").unwrap().mode.is_executable());
    }

    #[rstest]
    fn test_restaging_overwrites(temp_dir: TempDir) {
        let mut index = index_in(&temp_dir);

        index.stage(entry("f", "old"));
        index.stage(entry("f", "new"));

        assert_eq!(index.len(), 1);
        assert_eq!(index.entry_by_path("f"), Some(&entry("f", "new")));
    }

    #[rstest]
    fn test_clear_persists_as_empty(temp_dir: TempDir) {
        let mut index = index_in(&temp_dir);
        index.stage(entry("f", "x"));
        index.write_updates().unwrap();

        index.clear();
        assert!(index.is_changed());
        index.write_updates().unwrap();

        let mut reloaded = index_in(&temp_dir);
        reloaded.rehydrate().unwrap();
        assert!(reloaded.is_empty());
    }

    #[rstest]
    #[case::bad_signature(0)]
    #[case::bad_version(7)]
    #[case::bad_record(14)]
    #[case::bad_checksum(-1)]
    fn test_damaged_index_is_corrupt(temp_dir: TempDir, #[case] offset: isize) {
        let mut index = index_in(&temp_dir);
        index.stage(entry("file.txt", "content"));
        index.write_updates().unwrap();

        let mut bytes = std::fs::read(index.path()).unwrap();
        let at = if offset < 0 {
            bytes.len() - offset.unsigned_abs()
        } else {
            offset as usize
        };
        bytes[at] ^= 0x5a;
        std::fs::write(index.path(), bytes).unwrap();

        assert!(matches!(index.rehydrate(), Err(VcsError::IndexCorrupt(_))));
    }

    #[rstest]
    fn test_truncated_index_is_corrupt(temp_dir: TempDir) {
        let mut index = index_in(&temp_dir);
        index.stage(entry("file.txt", "content"));
        index.write_updates().unwrap();

        let bytes = std::fs::read(index.path()).unwrap();
        std::fs::write(index.path(), &bytes[..bytes.len() - 25]).unwrap();

        assert!(matches!(index.rehydrate(), Err(VcsError::IndexCorrupt(_))));
    }
}
