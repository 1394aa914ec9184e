use crate::areas::repository::Repository;
use crate::artifacts::database::database_entry::{DatabaseEntry, FileSnapshot};
use crate::artifacts::merge::resolve::BlobStore;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::Tree;
use crate::errors::VcsResult;
use std::io::Write;

impl Repository {
    pub fn stash(&self) -> anyhow::Result<()> {
        match self.save_stash()? {
            Some(oid) => writeln!(
                self.writer(),
                "Saved working directory state {}",
                oid.to_short_oid()
            )?,
            None => writeln!(self.writer(), "No local changes to save")?,
        }

        Ok(())
    }

    /// Record every working tree file as a commit under `refs/stash`
    ///
    /// The commit's parent is HEAD's commit, if any. HEAD, the index and the
    /// working tree are left alone, and a newer stash replaces the ref.
    /// Returns `None` when the working tree matches HEAD.
    pub fn save_stash(&self) -> VcsResult<Option<ObjectId>> {
        let head = self.refs().resolve_head()?;
        let head_snapshot = self.head_snapshot()?;

        let mut snapshot = FileSnapshot::new();
        for path in self.workspace().list_all_files()? {
            if let Some(entry) = self.workspace_entry(&path)? {
                snapshot.insert(path, entry);
            }
        }

        if snapshot == head_snapshot {
            return Ok(None);
        }

        for (path, entry) in snapshot.iter_mut() {
            let content = self.workspace().read_file(path)?;
            *entry = DatabaseEntry::new(self.database().write_blob(content)?, entry.mode);
        }

        let tree_oid = self.database().store(&Tree::from_snapshot(snapshot))?;
        let commit = Commit::new(
            head.iter().cloned().collect(),
            tree_oid,
            self.author()?,
            self.stash_message(head.as_ref())?,
        );
        let oid = self.database().store(&commit)?;
        self.refs().update_stash(&oid)?;

        tracing::info!(oid = %oid.to_short_oid(), "saved stash");
        Ok(Some(oid))
    }

    fn stash_message(&self, head: Option<&ObjectId>) -> VcsResult<String> {
        let branch = self
            .refs()
            .read_head()?
            .branch()
            .map(ToString::to_string)
            .unwrap_or_else(|| "(no branch)".to_string());

        Ok(match head {
            Some(oid) => {
                let commit = self.database().parse_object_as_commit(oid)?;
                format!(
                    "WIP on {branch}: {} {}",
                    oid.to_short_oid(),
                    commit.short_message()
                )
            }
            None => format!("WIP on {branch}"),
        })
    }
}
