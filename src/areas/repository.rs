use crate::areas::config::{CONFIG_FILE, Config};
use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::refs::Refs;
use crate::areas::workspace::{METADATA_DIR, Workspace};
use crate::artifacts::database::database_entry::{DatabaseEntry, FileSnapshot};
use crate::artifacts::objects::commit::Author;
use crate::artifacts::objects::hasher;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::{VcsError, VcsResult};
use std::cell::{Ref, RefCell, RefMut};
use std::path::{Path, PathBuf};

/// Identity used for reflog lines when no author is configured
const UNKNOWN_IDENTITY: &str = "unknown";

pub struct Repository {
    path: Box<Path>,
    writer: RefCell<Box<dyn std::io::Write>>,
    index: RefCell<Index>,
    config: RefCell<Config>,
    database: Database,
    workspace: Workspace,
    refs: Refs,
}

impl Repository {
    /// Bind the areas to `path` without checking that a repository exists there
    pub fn new(path: &Path, writer: Box<dyn std::io::Write>) -> VcsResult<Self> {
        if !path.exists() {
            std::fs::create_dir_all(path)?;
        }
        let path = path.canonicalize()?;
        let metadata = path.join(METADATA_DIR);

        let config = Config::load(metadata.join(CONFIG_FILE).into_boxed_path())?;

        Ok(Repository {
            writer: RefCell::new(writer),
            index: RefCell::new(Index::new(metadata.join("index").into_boxed_path())),
            config: RefCell::new(config),
            database: Database::new(metadata.join("objects").into_boxed_path()),
            workspace: Workspace::new(path.clone().into_boxed_path()),
            refs: Refs::new(metadata.into_boxed_path()),
            path: path.into_boxed_path(),
        })
    }

    /// Open the repository containing `start`, searching parent directories
    pub fn discover(start: &Path, writer: Box<dyn std::io::Write>) -> VcsResult<Self> {
        let start = start.canonicalize()?;

        let root = start
            .ancestors()
            .find(|dir| dir.join(METADATA_DIR).join("HEAD").is_file())
            .map(Path::to_path_buf)
            .ok_or_else(|| VcsError::NotARepository(start.clone()))?;

        tracing::trace!(root = %root.display(), "found repository");
        Self::new(&root, writer)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.path.join(METADATA_DIR)
    }

    pub fn writer(&'_ self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    pub fn index(&'_ self) -> RefMut<'_, Index> {
        self.index.borrow_mut()
    }

    pub fn config(&'_ self) -> Ref<'_, Config> {
        self.config.borrow()
    }

    pub fn config_mut(&'_ self) -> RefMut<'_, Config> {
        self.config.borrow_mut()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    /// Author for new commits; fails when no identity is configured
    pub fn author(&self) -> VcsResult<Author> {
        self.config().author()
    }

    /// Identity stamped on reflog lines
    ///
    /// Moving HEAD never fails for lack of an identity.
    pub fn reflog_identity(&self) -> Author {
        self.author().unwrap_or_else(|_| {
            Author::new(UNKNOWN_IDENTITY.to_string(), UNKNOWN_IDENTITY.to_string())
        })
    }

    /// Files of the commit HEAD points at; empty before the first commit
    pub fn head_snapshot(&self) -> VcsResult<FileSnapshot> {
        match self.refs.resolve_head()? {
            Some(head) => self.database.commit_snapshot(&head),
            None => Ok(FileSnapshot::new()),
        }
    }

    /// The snapshot the next commit will record: HEAD overlaid with the index
    pub fn next_snapshot(&self) -> VcsResult<FileSnapshot> {
        let mut snapshot = self.head_snapshot()?;

        for entry in self.index().entries() {
            snapshot.insert(
                entry.name.clone(),
                DatabaseEntry::new(entry.oid.clone(), entry.mode),
            );
        }

        Ok(snapshot)
    }

    /// The entry a working tree file would be staged as, `None` when absent
    ///
    /// Hashes without storing the blob.
    pub fn workspace_entry(&self, path: &str) -> VcsResult<Option<DatabaseEntry>> {
        if !self.workspace.exists(path) {
            return Ok(None);
        }

        let content = self.workspace.read_file(path)?;
        Ok(Some(DatabaseEntry::new(
            hasher::hash(ObjectType::Blob, &content),
            self.workspace.file_mode(path),
        )))
    }
}
