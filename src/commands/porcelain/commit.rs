use crate::areas::repository::Repository;
use std::io::Write;

impl Repository {
    pub fn commit(&self, message: &str) -> anyhow::Result<()> {
        if message.trim().is_empty() {
            anyhow::bail!("aborting commit due to empty commit message");
        }

        let tree_oid = self.store_next_tree()?;
        let parent = self.refs().resolve_head()?;

        let (root_marker, reflog_action) = match parent {
            Some(_) => ("", "commit"),
            None => ("(root-commit) ", "commit (initial)"),
        };

        let (commit_oid, commit) =
            self.write_commit(parent.into_iter().collect(), tree_oid, message, reflog_action)?;

        // the commit consumed the staged entries
        let mut index = self.index();
        index.clear();
        index.write_updates()?;
        drop(index);

        writeln!(
            self.writer(),
            "[{}{}] {}",
            root_marker,
            commit_oid.to_short_oid(),
            commit.short_message()
        )?;

        Ok(())
    }
}
