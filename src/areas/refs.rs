//! Branch references, HEAD and the reflog
//!
//! - `HEAD` holds either `ref: refs/heads/<branch>` (attached) or a raw
//!   commit id (detached).
//! - `refs/heads/<branch>` holds the branch tip id, or nothing for a branch
//!   that has no commits yet.
//! - `logs/HEAD` gets one line for every move of HEAD or of the branch it is
//!   attached to: `<old> <new> <identity> <ts> +0000\t<message>`.
//!
//! Ref files are replaced through a temp file and a rename. There is no
//! locking: two processes updating the same ref race, and the last writer
//! wins.

use crate::artifacts::branch::REF_PREFIX;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::OBJECT_ID_LENGTH;
use crate::artifacts::objects::commit::Author;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{VcsError, VcsResult};
use derive_new::new;
use fake::rand;
use regex::Regex;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use walkdir::WalkDir;

/// Symbolic reference held in HEAD
static SYMREF_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ref: (.+)$").expect("symref pattern compiles"));

/// Name of the HEAD reference
pub const HEAD_REF_NAME: &str = "HEAD";

/// Ref holding the most recent stash commit, outside `refs/heads`
pub const STASH_REF: &str = "refs/stash";

/// What HEAD points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Head {
    Attached(BranchName),
    Detached(ObjectId),
}

impl Head {
    pub fn branch(&self) -> Option<&BranchName> {
        match self {
            Head::Attached(branch) => Some(branch),
            Head::Detached(_) => None,
        }
    }

    fn to_file_content(&self) -> String {
        match self {
            Head::Attached(branch) => format!("ref: {}\n", branch.to_ref_path()),
            Head::Detached(oid) => format!("{oid}\n"),
        }
    }
}

/// One line of the reflog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflogEntry {
    pub old: Option<ObjectId>,
    pub new: ObjectId,
    pub identity: Author,
    pub message: String,
}

impl ReflogEntry {
    fn to_line(&self) -> String {
        let old = self
            .old
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "0".repeat(OBJECT_ID_LENGTH));

        format!("{old} {} {}\t{}\n", self.new, self.identity.display(), self.message)
    }

    fn parse(line: &str) -> VcsResult<Self> {
        let corrupt = || VcsError::RefCorrupt(format!("malformed reflog line: {line}"));

        let (header, message) = line.split_once('\t').ok_or_else(corrupt)?;
        let mut parts = header.splitn(3, ' ');
        let (Some(old), Some(new), Some(identity)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(corrupt());
        };

        let old = match old.chars().all(|c| c == '0') {
            true => None,
            false => Some(ObjectId::try_parse(old.to_string()).map_err(|_| corrupt())?),
        };

        Ok(ReflogEntry {
            old,
            new: ObjectId::try_parse(new.to_string()).map_err(|_| corrupt())?,
            identity: Author::try_from(identity).map_err(|_| corrupt())?,
            message: message.to_string(),
        })
    }
}

#[derive(Debug, new)]
pub struct Refs {
    /// Path to the metadata directory (`.gitx`)
    path: Box<Path>,
}

impl Refs {
    pub fn head_path(&self) -> PathBuf {
        self.path.join(HEAD_REF_NAME)
    }

    pub fn heads_path(&self) -> PathBuf {
        self.path.join(REF_PREFIX)
    }

    pub fn reflog_path(&self) -> PathBuf {
        self.path.join("logs").join(HEAD_REF_NAME)
    }

    pub fn stash_path(&self) -> PathBuf {
        self.path.join(STASH_REF)
    }

    fn branch_path(&self, branch: &BranchName) -> PathBuf {
        self.path.join(branch.to_ref_path())
    }

    pub fn read_head(&self) -> VcsResult<Head> {
        let content = std::fs::read_to_string(self.head_path())?;
        let content = content.trim();

        let corrupt = || VcsError::RefCorrupt(format!("unreadable HEAD: {content}"));

        match SYMREF_REGEX.captures(content) {
            Some(symref) => Ok(Head::Attached(
                BranchName::try_parse_ref_path(&symref[1]).map_err(|_| corrupt())?,
            )),
            None => Ok(Head::Detached(
                ObjectId::try_parse(content.to_string()).map_err(|_| corrupt())?,
            )),
        }
    }

    /// Point HEAD at a branch or a commit without touching any branch
    pub fn set_head(&self, head: &Head) -> VcsResult<()> {
        self.write_ref_file(&self.head_path(), &head.to_file_content())
    }

    /// The commit HEAD resolves to, or `None` before the first commit
    pub fn resolve_head(&self) -> VcsResult<Option<ObjectId>> {
        match self.read_head()? {
            Head::Attached(branch) => self.read_ref(&branch),
            Head::Detached(oid) => Ok(Some(oid)),
        }
    }

    pub fn is_current_branch(&self, branch: &BranchName) -> VcsResult<bool> {
        Ok(self.read_head()?.branch() == Some(branch))
    }

    pub fn branch_exists(&self, branch: &BranchName) -> bool {
        self.branch_path(branch).is_file()
    }

    /// Tip of a branch; `None` for a branch without commits
    pub fn read_ref(&self, branch: &BranchName) -> VcsResult<Option<ObjectId>> {
        let path = self.branch_path(branch);
        if !path.is_file() {
            return Err(VcsError::BranchNotFound(branch.to_string()));
        }

        let content = std::fs::read_to_string(path)?;
        let content = content.trim();
        if content.is_empty() {
            return Ok(None);
        }

        Ok(Some(ObjectId::try_parse(content.to_string())?))
    }

    pub fn update_ref(&self, branch: &BranchName, oid: &ObjectId) -> VcsResult<()> {
        tracing::debug!(branch = %branch, oid = %oid.to_short_oid(), "updating ref");
        self.write_ref_file(&self.branch_path(branch), &format!("{oid}\n"))
    }

    /// Advance whatever HEAD points at to `oid` and log the move
    ///
    /// Returns the previous commit, if any.
    pub fn update_head(
        &self,
        oid: &ObjectId,
        identity: &Author,
        message: &str,
    ) -> VcsResult<Option<ObjectId>> {
        let old = self.resolve_head()?;

        match self.read_head()? {
            Head::Attached(branch) => self.update_ref(&branch, oid)?,
            Head::Detached(_) => self.set_head(&Head::Detached(oid.clone()))?,
        }

        self.append_reflog(ReflogEntry {
            old: old.clone(),
            new: oid.clone(),
            identity: identity.clone(),
            message: message.to_string(),
        })?;

        Ok(old)
    }

    /// Create a branch pointing at `start`, or with no commits when `start` is `None`
    pub fn create_branch(&self, branch: &BranchName, start: Option<&ObjectId>) -> VcsResult<()> {
        let path = self.branch_path(branch);
        if path.exists() {
            return Err(VcsError::BranchExists(branch.to_string()));
        }

        let content = start.map(|oid| format!("{oid}\n")).unwrap_or_default();
        self.write_ref_file(&path, &content)?;

        tracing::debug!(branch = %branch, "created branch");
        Ok(())
    }

    /// Delete a branch and return the tip it pointed at
    pub fn delete_branch(&self, branch: &BranchName) -> VcsResult<Option<ObjectId>> {
        if self.is_current_branch(branch)? {
            return Err(VcsError::CurrentBranch(branch.to_string()));
        }

        let tip = self.read_ref(branch)?;
        let path = self.branch_path(branch);
        std::fs::remove_file(&path)?;
        self.prune_branch_empty_parent_dirs(&path)?;

        tracing::debug!(branch = %branch, "deleted branch");
        Ok(tip)
    }

    /// Attach HEAD to `branch`; returns `false` when it already was
    pub fn switch_branch(&self, branch: &BranchName) -> VcsResult<bool> {
        if !self.branch_exists(branch) {
            return Err(VcsError::BranchNotFound(branch.to_string()));
        }
        if self.is_current_branch(branch)? {
            return Ok(false);
        }

        self.set_head(&Head::Attached(branch.clone()))?;
        Ok(true)
    }

    /// All branch names, sorted
    pub fn list_branches(&self) -> VcsResult<Vec<BranchName>> {
        let heads_path = self.heads_path();

        let mut branches = WalkDir::new(&heads_path)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                let relative = entry.path().strip_prefix(&heads_path).ok()?;
                let name = relative
                    .components()
                    .map(|component| component.as_os_str().to_str())
                    .collect::<Option<Vec<_>>>()?
                    .join("/");
                BranchName::try_parse(name).ok()
            })
            .collect::<Vec<_>>();

        branches.sort();
        Ok(branches)
    }

    /// The latest stash commit, `None` before the first stash
    pub fn read_stash(&self) -> VcsResult<Option<ObjectId>> {
        let content = match std::fs::read_to_string(self.stash_path()) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let oid = ObjectId::try_parse(content.trim().to_string())
            .map_err(|_| VcsError::RefCorrupt(format!("unreadable {STASH_REF}: {content}")))?;
        Ok(Some(oid))
    }

    pub fn update_stash(&self, oid: &ObjectId) -> VcsResult<()> {
        tracing::debug!(oid = %oid.to_short_oid(), "updating stash");
        self.write_ref_file(&self.stash_path(), &format!("{oid}\n"))
    }

    pub fn append_reflog(&self, entry: ReflogEntry) -> VcsResult<()> {
        let path = self.reflog_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        file.write_all(entry.to_line().as_bytes())?;

        Ok(())
    }

    /// Reflog entries, oldest first
    pub fn read_reflog(&self) -> VcsResult<Vec<ReflogEntry>> {
        let content = match std::fs::read_to_string(self.reflog_path()) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
            Err(err) => return Err(err.into()),
        };

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(ReflogEntry::parse)
            .collect()
    }

    fn write_ref_file(&self, path: &Path, content: &str) -> VcsResult<()> {
        let parent = path
            .parent()
            .ok_or_else(|| std::io::Error::other(format!("invalid ref path {}", path.display())))?;
        std::fs::create_dir_all(parent)?;

        let temp_path = parent.join(format!(".tmp-ref-{}", rand::random::<u32>()));
        std::fs::write(&temp_path, content)?;
        std::fs::rename(&temp_path, path)?;

        Ok(())
    }

    fn prune_branch_empty_parent_dirs(&self, path: &Path) -> VcsResult<()> {
        let heads_path = self.heads_path();

        if let Some(parent) = path.parent()
            && parent != heads_path
            && parent.starts_with(&heads_path)
            && parent.read_dir()?.next().is_none()
        {
            std::fs::remove_dir(parent)?;
            self.prune_branch_empty_parent_dirs(parent)?;
        }

        Ok(())
    }
}
