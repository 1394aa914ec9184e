//! Error taxonomy for repository operations
//!
//! Every core operation returns [`VcsResult`]. Errors are never recovered
//! silently: corruption (missing parents, malformed objects or index records)
//! propagates to the caller, and only the CLI wrapper decides to terminate.
//! Merge conflicts are not errors; they are reported through the merge outcome.

use crate::artifacts::objects::object_id::ObjectId;
use std::path::PathBuf;
use thiserror::Error;

/// The error type for every repository operation
#[derive(Debug, Error)]
pub enum VcsError {
    /// no object is stored under the requested id
    #[error("object not found: {0}")]
    ObjectNotFound(ObjectId),

    /// an object exists but its bytes cannot be decoded as expected
    #[error("corrupt object {oid}: {reason}")]
    CorruptObject { oid: ObjectId, reason: String },

    /// the string is not a 40-character lowercase hex id
    #[error("invalid object id: {0}")]
    InvalidObjectId(String),

    /// a branch with this name is already present
    #[error("a branch named '{0}' already exists")]
    BranchExists(String),

    /// the branch does not exist
    #[error("branch '{0}' not found")]
    BranchNotFound(String),

    /// the branch name violates the ref naming rules
    #[error("'{0}' is not a valid branch name")]
    InvalidBranchName(String),

    /// attempted to delete the branch HEAD points to
    #[error("cannot delete branch '{0}': it is the current branch")]
    CurrentBranch(String),

    /// the branch exists but has no commits yet
    #[error("branch '{0}' does not have any commits yet")]
    UnbornBranch(String),

    /// the two histories share no commit
    #[error("no common ancestor between {ours} and {theirs}")]
    NoCommonAncestor { ours: ObjectId, theirs: ObjectId },

    /// a parent id referenced by a commit is missing from the object store
    #[error("ancestor lookup failed: commit {0} is missing from the object store")]
    AncestorLookupFailed(ObjectId),

    /// a revision expression names no commit
    #[error("unknown revision '{0}'")]
    UnknownRevision(String),

    /// the persisted index could not be decoded
    #[error("index file is corrupt: {0}")]
    IndexCorrupt(String),

    /// a ref, HEAD or reflog file holds unreadable content
    #[error("ref storage is corrupt: {0}")]
    RefCorrupt(String),

    /// working tree files hold content a merge would overwrite or delete
    #[error(
        "your local changes to the following files would be overwritten by merge: {}",
        .0.join(", ")
    )]
    WorkingTreeChanged(Vec<String>),

    /// no `.gitx` directory was found
    #[error("not a gitx repository: {0}")]
    NotARepository(PathBuf),

    /// a path given to `add` matches no file
    #[error("pathspec '{0}' did not match any files")]
    PathspecNotMatched(String),

    /// missing or malformed configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// underlying filesystem failure
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl VcsError {
    /// check if this error means the requested thing does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            VcsError::ObjectNotFound(_)
                | VcsError::BranchNotFound(_)
                | VcsError::UnknownRevision(_)
                | VcsError::PathspecNotMatched(_)
        )
    }

    /// check if this error points at damaged repository data
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            VcsError::CorruptObject { .. }
                | VcsError::AncestorLookupFailed(_)
                | VcsError::IndexCorrupt(_)
                | VcsError::RefCorrupt(_)
        )
    }

    pub(crate) fn corrupt(oid: &ObjectId, reason: impl Into<String>) -> Self {
        VcsError::CorruptObject {
            oid: oid.clone(),
            reason: reason.into(),
        }
    }
}

/// result type alias for repository operations
pub type VcsResult<T> = Result<T, VcsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let oid = ObjectId::try_parse("a".repeat(40)).unwrap();

        let not_found = VcsError::ObjectNotFound(oid.clone());
        assert!(not_found.is_not_found());
        assert!(!not_found.is_corruption());

        let corrupt = VcsError::AncestorLookupFailed(oid);
        assert!(!corrupt.is_not_found());
        assert!(corrupt.is_corruption());

        assert!(VcsError::IndexCorrupt("bad signature".into()).is_corruption());
        assert!(VcsError::RefCorrupt("malformed reflog line".into()).is_corruption());
    }

    #[test]
    fn test_io_errors_convert() {
        let err: VcsError = std::io::Error::other("disk full").into();
        assert!(matches!(err, VcsError::Io(_)));
        assert_eq!(err.to_string(), "io error: disk full");
    }
}
