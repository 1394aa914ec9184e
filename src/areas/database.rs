//! Object store
//!
//! Objects live under `.gitx/objects/<xx>/<38 hex>` as zlib-compressed framed
//! bytes. Writes go to a temp file in the fan-out directory and are renamed
//! into place, so a reader never observes a partial object. Storing an id that
//! already exists is a no-op.
//!
//! There is no locking: racing writers of the same id write identical bytes,
//! and the loser of the rename race is absorbed.

use crate::artifacts::database::database_entry::FileSnapshot;
use crate::artifacts::merge::resolve::BlobStore;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::{Commit, SlimCommit};
use crate::artifacts::objects::hasher;
use crate::artifacts::objects::object::{Object, ObjectBox, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::Tree;
use crate::errors::{VcsError, VcsResult};
use bytes::Bytes;
use fake::rand;
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
}

impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database { path }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    /// Persist `content` as an object of `kind` and return its id
    pub fn put(&self, kind: ObjectType, content: &[u8]) -> VcsResult<ObjectId> {
        let oid = hasher::hash(kind, content);
        let object_path = self.path.join(oid.to_path());

        if object_path.exists() {
            tracing::trace!(oid = %oid, kind = %kind, "object already stored");
            return Ok(oid);
        }

        self.write_object(&object_path, hasher::frame(kind, content))?;
        tracing::debug!(oid = %oid, kind = %kind, size = content.len(), "stored object");

        Ok(oid)
    }

    /// Persist a typed object and return its id
    pub fn store(&self, object: &impl Object) -> VcsResult<ObjectId> {
        self.put(object.object_type(), &object.serialize())
    }

    pub fn exists(&self, oid: &ObjectId) -> bool {
        self.path.join(oid.to_path()).is_file()
    }

    /// Content bytes of an object, without its frame
    pub fn get(&self, oid: &ObjectId) -> VcsResult<Bytes> {
        self.read_object(oid).map(|(_, content)| content)
    }

    /// Kind and content bytes of an object
    ///
    /// The content is re-hashed on the way out; a mismatch means the file was
    /// damaged on disk.
    pub fn read_object(&self, oid: &ObjectId) -> VcsResult<(ObjectType, Bytes)> {
        let object_path = self.path.join(oid.to_path());

        let compressed = std::fs::read(&object_path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => VcsError::ObjectNotFound(oid.clone()),
            _ => VcsError::Io(err),
        })?;
        let framed = Self::decompress(&compressed)
            .map_err(|err| VcsError::corrupt(oid, format!("cannot decompress: {err}")))?;

        let (kind, content) =
            ObjectType::split_frame(&framed).map_err(|reason| VcsError::corrupt(oid, reason))?;
        if &hasher::hash(kind, content) != oid {
            return Err(VcsError::corrupt(oid, "content does not match its id"));
        }

        Ok((kind, Bytes::copy_from_slice(content)))
    }

    pub fn object_type(&self, oid: &ObjectId) -> VcsResult<ObjectType> {
        self.read_object(oid).map(|(kind, _)| kind)
    }

    pub fn parse_object(&self, oid: &ObjectId) -> VcsResult<ObjectBox> {
        let (kind, content) = self.read_object(oid)?;

        match kind {
            ObjectType::Blob => Ok(ObjectBox::Blob(Box::new(Blob::deserialize(oid, content)?))),
            ObjectType::Tree => Ok(ObjectBox::Tree(Box::new(Tree::deserialize(oid, content)?))),
            ObjectType::Commit => Ok(ObjectBox::Commit(Box::new(Commit::deserialize(
                oid, content,
            )?))),
        }
    }

    pub fn parse_object_as_blob(&self, oid: &ObjectId) -> VcsResult<Blob> {
        let content = self.read_expecting(oid, ObjectType::Blob)?;
        Blob::deserialize(oid, content)
    }

    pub fn parse_object_as_tree(&self, oid: &ObjectId) -> VcsResult<Tree> {
        let content = self.read_expecting(oid, ObjectType::Tree)?;
        Tree::deserialize(oid, content)
    }

    pub fn parse_object_as_commit(&self, oid: &ObjectId) -> VcsResult<Commit> {
        let content = self.read_expecting(oid, ObjectType::Commit)?;
        Commit::deserialize(oid, content)
    }

    /// Parent links of a commit, for history walks
    pub fn load_slim_commit(&self, oid: &ObjectId) -> VcsResult<SlimCommit> {
        let commit = self.parse_object_as_commit(oid)?;

        Ok(SlimCommit {
            oid: oid.clone(),
            parents: commit.parents().to_vec(),
        })
    }

    /// Flattened `path -> entry` view of a commit
    pub fn commit_snapshot(&self, commit_oid: &ObjectId) -> VcsResult<FileSnapshot> {
        let commit = self.parse_object_as_commit(commit_oid)?;
        self.tree_snapshot(commit.tree_oid())
    }

    /// Flattened `path -> entry` view of a tree
    ///
    /// Subtree entries are expanded in place with their path as prefix.
    pub fn tree_snapshot(&self, tree_oid: &ObjectId) -> VcsResult<FileSnapshot> {
        let mut snapshot = FileSnapshot::new();
        self.collect_tree(tree_oid, "", &mut snapshot)?;

        Ok(snapshot)
    }

    fn collect_tree(&self, tree_oid: &ObjectId, prefix: &str, snapshot: &mut FileSnapshot) -> VcsResult<()> {
        let tree = self.parse_object_as_tree(tree_oid)?;

        for (name, entry) in tree.entries() {
            let path = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{prefix}/{name}")
            };

            if entry.is_tree() {
                self.collect_tree(&entry.oid, &path, snapshot)?;
            } else {
                snapshot.insert(path, entry.clone());
            }
        }

        Ok(())
    }

    fn read_expecting(&self, oid: &ObjectId, expected: ObjectType) -> VcsResult<Bytes> {
        let (kind, content) = self.read_object(oid)?;
        if kind != expected {
            return Err(VcsError::corrupt(
                oid,
                format!("expected a {expected}, found a {kind}"),
            ));
        }

        Ok(content)
    }

    fn write_object(&self, object_path: &Path, framed: Bytes) -> VcsResult<()> {
        let object_dir = object_path
            .parent()
            .ok_or_else(|| std::io::Error::other(format!("invalid object path {}", object_path.display())))?;
        std::fs::create_dir_all(object_dir)?;

        let temp_object_path = object_dir.join(Self::generate_temp_name());
        let compressed = Self::compress(&framed)?;

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_object_path)?;
        file.write_all(&compressed)?;
        file.sync_all()?;
        drop(file);

        // rename the temp file to the object file to make it atomic
        if let Err(err) = std::fs::rename(&temp_object_path, object_path) {
            let _ = std::fs::remove_file(&temp_object_path);
            if !object_path.exists() {
                return Err(err.into());
            }
        }

        Ok(())
    }

    fn compress(data: &[u8]) -> VcsResult<Vec<u8>> {
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(data)?;

        Ok(encoder.finish()?)
    }

    fn decompress(data: &[u8]) -> std::io::Result<Vec<u8>> {
        let mut decoder = flate2::read::ZlibDecoder::new(data);
        let mut decompressed_content = Vec::new();
        decoder.read_to_end(&mut decompressed_content)?;

        Ok(decompressed_content)
    }

    fn generate_temp_name() -> String {
        format!("tmp-obj-{}", rand::random::<u32>())
    }

    pub fn object_path(&self, oid: &ObjectId) -> PathBuf {
        self.path.join(oid.to_path())
    }
}

impl BlobStore for Database {
    fn read_blob(&self, oid: &ObjectId) -> VcsResult<Bytes> {
        self.parse_object_as_blob(oid).map(Blob::into_content)
    }

    fn write_blob(&self, content: Bytes) -> VcsResult<ObjectId> {
        self.store(&Blob::new(content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::database::database_entry::DatabaseEntry;
    use crate::artifacts::index::entry_mode::EntryMode;
    use crate::artifacts::objects::commit::Author;
    use assert_fs::TempDir;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn temp_dir() -> TempDir {
        TempDir::new().unwrap()
    }

    fn database(dir: &TempDir) -> Database {
        Database::new(dir.path().join("objects").into_boxed_path())
    }

    #[rstest]
    fn test_put_then_get(temp_dir: TempDir) {
        let database = database(&temp_dir);

        let oid = database.put(ObjectType::Blob, b"hello\n").unwrap();

        assert_eq!(oid.as_ref(), "ce013625030ba8dba906f756967f9e9ca394464a");
        assert!(database.exists(&oid));
        assert!(database.object_path(&oid).ends_with("ce/013625030ba8dba906f756967f9e9ca394464a"));
        assert_eq!(&database.get(&oid).unwrap()[..], b"hello\n");
        assert_eq!(database.object_type(&oid).unwrap(), ObjectType::Blob);
    }

    #[rstest]
    fn test_put_is_idempotent(temp_dir: TempDir) {
        let database = database(&temp_dir);

        let first = database.put(ObjectType::Blob, b"same").unwrap();
        let modified = std::fs::metadata(database.object_path(&first)).unwrap().modified().unwrap();
        let second = database.put(ObjectType::Blob, b"same").unwrap();

        assert_eq!(first, second);
        assert_eq!(
            std::fs::metadata(database.object_path(&first)).unwrap().modified().unwrap(),
            modified
        );
        let dir = database.object_path(&first).parent().unwrap().to_path_buf();
        assert_eq!(std::fs::read_dir(dir).unwrap().count(), 1);
    }

    #[rstest]
    fn test_empty_content_is_valid(temp_dir: TempDir) {
        let database = database(&temp_dir);

        let oid = database.put(ObjectType::Blob, b"").unwrap();

        assert!(database.get(&oid).unwrap().is_empty());
    }

    #[rstest]
    fn test_missing_object(temp_dir: TempDir) {
        let database = database(&temp_dir);
        let oid = hasher::hash(ObjectType::Blob, b"never stored");

        assert!(!database.exists(&oid));
        assert!(matches!(database.get(&oid), Err(VcsError::ObjectNotFound(_))));
    }

    #[rstest]
    fn test_damaged_object_is_corruption(temp_dir: TempDir) {
        let database = database(&temp_dir);
        let oid = database.put(ObjectType::Blob, b"payload").unwrap();

        std::fs::write(database.object_path(&oid), b"not zlib at all").unwrap();

        assert!(database.get(&oid).unwrap_err().is_corruption());
    }

    #[rstest]
    fn test_wrong_kind_is_corruption(temp_dir: TempDir) {
        let database = database(&temp_dir);
        let oid = database.put(ObjectType::Blob, b"payload").unwrap();

        assert!(matches!(
            database.parse_object_as_commit(&oid),
            Err(VcsError::CorruptObject { .. })
        ));
    }

    #[rstest]
    fn test_commit_snapshot(temp_dir: TempDir) {
        let database = database(&temp_dir);
        let blob = database.write_blob(Bytes::from_static(b"fn main() {}\n")).unwrap();

        let mut snapshot = FileSnapshot::new();
        snapshot.insert("src/main.rs".into(), DatabaseEntry::new(blob, EntryMode::default()));
        let tree_oid = database.store(&Tree::from_snapshot(snapshot.clone())).unwrap();

        let author = Author::new("A U Thor".into(), "author@example.com".into());
        let commit = Commit::new(vec![], tree_oid, author, "Initial".into());
        let commit_oid = database.store(&commit).unwrap();

        assert_eq!(database.commit_snapshot(&commit_oid).unwrap(), snapshot);
        assert_eq!(database.load_slim_commit(&commit_oid).unwrap().parents, vec![]);
    }

    #[rstest]
    fn test_subtrees_are_flattened(temp_dir: TempDir) {
        let database = database(&temp_dir);
        let blob = database.write_blob(Bytes::from_static(b"x")).unwrap();

        let mut inner = FileSnapshot::new();
        inner.insert("leaf.txt".into(), DatabaseEntry::new(blob.clone(), EntryMode::default()));
        let inner_oid = database.store(&Tree::from_snapshot(inner)).unwrap();

        let mut outer = FileSnapshot::new();
        outer.insert("dir".into(), DatabaseEntry::new(inner_oid, EntryMode::Directory));
        let outer_oid = database.store(&Tree::from_snapshot(outer)).unwrap();

        let snapshot = database.tree_snapshot(&outer_oid).unwrap();

        assert_eq!(snapshot.keys().collect::<Vec<_>>(), vec!["dir/leaf.txt"]);
        assert_eq!(snapshot["dir/leaf.txt"].oid, blob);
    }
}
