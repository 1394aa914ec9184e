use crate::artifacts::database::database_entry::FileSnapshot;
use crate::artifacts::status::file_change::{IndexChangeType, WorkspaceChangeType};
use std::collections::{BTreeMap, BTreeSet};

pub type ChangeSet<T> = BTreeMap<String, T>;

/// Every changed path, classified into the three status sections
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusInfo {
    /// Next commit vs HEAD
    pub index_changeset: ChangeSet<IndexChangeType>,
    /// Working tree vs next commit
    pub workspace_changeset: ChangeSet<WorkspaceChangeType>,
    /// Working tree files the next commit does not know about
    pub untracked_files: BTreeSet<String>,
}

impl StatusInfo {
    /// Compare HEAD, the next commit and the hashed working tree
    ///
    /// `workspace` maps each working tree file to the entry it would be
    /// staged as.
    pub fn compute(head: &FileSnapshot, next: &FileSnapshot, workspace: &FileSnapshot) -> Self {
        let mut status = StatusInfo::default();

        for (path, entry) in next {
            match head.get(path) {
                None => {
                    status
                        .index_changeset
                        .insert(path.clone(), IndexChangeType::Added);
                }
                Some(committed) if committed != entry => {
                    status
                        .index_changeset
                        .insert(path.clone(), IndexChangeType::Modified);
                }
                Some(_) => {}
            }

            match workspace.get(path) {
                None => {
                    status
                        .workspace_changeset
                        .insert(path.clone(), WorkspaceChangeType::Deleted);
                }
                Some(current) if current != entry => {
                    status
                        .workspace_changeset
                        .insert(path.clone(), WorkspaceChangeType::Modified);
                }
                Some(_) => {}
            }
        }

        status.untracked_files = workspace
            .keys()
            .filter(|path| !next.contains_key(*path))
            .cloned()
            .collect();

        status
    }

    pub fn is_clean(&self) -> bool {
        self.index_changeset.is_empty()
            && self.workspace_changeset.is_empty()
            && self.untracked_files.is_empty()
    }
}
