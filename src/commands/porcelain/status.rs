use crate::areas::refs::Head;
use crate::areas::repository::Repository;
use crate::artifacts::core::is_colored_output;
use crate::artifacts::database::database_entry::FileSnapshot;
use crate::artifacts::status::file_change::FileChangeType;
use crate::artifacts::status::status_info::StatusInfo;
use colored::Colorize;
use std::io::Write;

impl Repository {
    /// Print staged, unstaged and untracked paths; never writes to the repository
    pub fn status(&self) -> anyhow::Result<()> {
        self.index().rehydrate()?;

        let head = self.head_snapshot()?;
        let next = self.next_snapshot()?;
        let workspace = self.hash_workspace()?;
        let status = StatusInfo::compute(&head, &next, &workspace);

        match self.refs().read_head()? {
            Head::Attached(branch) => writeln!(self.writer(), "On branch {branch}")?,
            Head::Detached(oid) => {
                writeln!(self.writer(), "HEAD detached at {}", oid.to_short_oid())?
            }
        }

        if status.is_clean() {
            writeln!(self.writer(), "nothing to commit, working tree clean")?;
            return Ok(());
        }

        let colored = is_colored_output();

        if !status.index_changeset.is_empty() {
            writeln!(self.writer(), "\nChanges to be committed:")?;
            for (path, change) in &status.index_changeset {
                let label = FileChangeType::Index(*change).label(colored);
                writeln!(self.writer(), "{label}{path}")?;
            }
        }

        if !status.workspace_changeset.is_empty() {
            writeln!(self.writer(), "\nChanges not staged for commit:")?;
            for (path, change) in &status.workspace_changeset {
                let label = FileChangeType::Workspace(*change).label(colored);
                writeln!(self.writer(), "{label}{path}")?;
            }
        }

        if !status.untracked_files.is_empty() {
            writeln!(self.writer(), "\nUntracked files:")?;
            for path in &status.untracked_files {
                match colored {
                    true => writeln!(self.writer(), "        {}", path.red())?,
                    false => writeln!(self.writer(), "        {path}")?,
                }
            }
        }

        Ok(())
    }

    /// Entries the working tree files would be staged as, without storing blobs
    fn hash_workspace(&self) -> anyhow::Result<FileSnapshot> {
        let mut snapshot = FileSnapshot::new();

        for path in self.workspace().list_all_files()? {
            if let Some(entry) = self.workspace_entry(&path)? {
                snapshot.insert(path, entry);
            }
        }

        Ok(snapshot)
    }
}
