//! Per-file three-way merge
//!
//! Every path in the union of the base, ours and theirs snapshots is resolved
//! on its own, comparing whole entries (blob id plus mode):
//!
//! | ours vs theirs | base vs sides  | result          |
//! |----------------|----------------|-----------------|
//! | equal          | any            | ours            |
//! | different      | base == ours   | theirs          |
//! | different      | base == theirs | ours            |
//! | different      | neither        | conflict        |
//!
//! A missing entry takes part in the comparison like any other value, so a
//! one-sided delete of an untouched file removes it, and two different
//! additions of the same path conflict. Conflicted paths get a blob with both
//! sides wrapped in markers; the merge still completes.

use crate::artifacts::database::database_entry::{DatabaseEntry, FileSnapshot};
use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::VcsResult;
use bytes::Bytes;
use std::collections::BTreeSet;

/// Blob access needed to build conflict files
pub trait BlobStore {
    fn read_blob(&self, oid: &ObjectId) -> VcsResult<Bytes>;

    fn write_blob(&self, content: Bytes) -> VcsResult<ObjectId>;
}

/// Labels written after the opening and closing conflict markers
#[derive(Debug, Clone)]
pub struct ConflictLabels {
    pub ours: String,
    pub theirs: String,
}

/// Result of merging two snapshots against their base
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Merged `path -> entry` view, conflict files included
    pub snapshot: FileSnapshot,
    /// Conflicted paths, sorted
    pub conflicts: Vec<String>,
}

impl MergeOutcome {
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }
}

/// How a single path resolves
#[derive(Debug, Clone, PartialEq, Eq)]
enum Resolution {
    Clean(Option<DatabaseEntry>),
    Conflict,
}

fn resolve_path(
    base: Option<&DatabaseEntry>,
    ours: Option<&DatabaseEntry>,
    theirs: Option<&DatabaseEntry>,
) -> Resolution {
    if ours == theirs {
        Resolution::Clean(ours.cloned())
    } else if base == ours {
        Resolution::Clean(theirs.cloned())
    } else if base == theirs {
        Resolution::Clean(ours.cloned())
    } else {
        Resolution::Conflict
    }
}

/// Merge `ours` and `theirs` against `base`
pub fn merge_snapshots(
    base: &FileSnapshot,
    ours: &FileSnapshot,
    theirs: &FileSnapshot,
    labels: &ConflictLabels,
    store: &impl BlobStore,
) -> VcsResult<MergeOutcome> {
    let paths = base
        .keys()
        .chain(ours.keys())
        .chain(theirs.keys())
        .collect::<BTreeSet<_>>();

    let mut outcome = MergeOutcome::default();
    for path in paths {
        let (ours_entry, theirs_entry) = (ours.get(path), theirs.get(path));

        match resolve_path(base.get(path), ours_entry, theirs_entry) {
            Resolution::Clean(Some(entry)) => {
                outcome.snapshot.insert(path.clone(), entry);
            }
            Resolution::Clean(None) => {}
            Resolution::Conflict => {
                tracing::warn!(path = %path, "content conflict");

                let ours_content = read_side(ours_entry, store)?;
                let theirs_content = read_side(theirs_entry, store)?;
                let content = conflict_content(&ours_content, &theirs_content, labels);

                let mode = ours_entry
                    .or(theirs_entry)
                    .map(|entry| entry.mode)
                    .unwrap_or_default();
                let oid = store.write_blob(content)?;

                outcome
                    .snapshot
                    .insert(path.clone(), DatabaseEntry::new(oid, conflict_mode(mode)));
                outcome.conflicts.push(path.clone());
            }
        }
    }

    Ok(outcome)
}

fn read_side(entry: Option<&DatabaseEntry>, store: &impl BlobStore) -> VcsResult<Bytes> {
    match entry {
        Some(entry) => store.read_blob(&entry.oid),
        None => Ok(Bytes::new()),
    }
}

fn conflict_mode(mode: EntryMode) -> EntryMode {
    if mode.is_tree() {
        EntryMode::default()
    } else {
        mode
    }
}

/// Wrap both sides in conflict markers
pub fn conflict_content(ours: &[u8], theirs: &[u8], labels: &ConflictLabels) -> Bytes {
    let mut content = Vec::with_capacity(ours.len() + theirs.len() + 64);

    content.extend_from_slice(format!("<<<<<<< {}\n", labels.ours).as_bytes());
    push_side(&mut content, ours);
    content.extend_from_slice(b"=======\n");
    push_side(&mut content, theirs);
    content.extend_from_slice(format!(">>>>>>> {}\n", labels.theirs).as_bytes());

    Bytes::from(content)
}

fn push_side(content: &mut Vec<u8>, side: &[u8]) {
    content.extend_from_slice(side);
    if !side.is_empty() && !side.ends_with(b"\n") {
        content.push(b'\n');
    }
}
