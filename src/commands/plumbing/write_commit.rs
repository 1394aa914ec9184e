use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::Tree;
use crate::errors::VcsResult;
use std::io::Write;

impl Repository {
    /// Store the tree the next commit would record and print its id
    pub fn write_tree(&self) -> anyhow::Result<()> {
        let tree_oid = self.store_next_tree()?;
        writeln!(self.writer(), "{tree_oid}")?;

        Ok(())
    }

    /// Store the HEAD snapshot overlaid with the index as a tree
    pub fn store_next_tree(&self) -> VcsResult<ObjectId> {
        self.index().rehydrate()?;

        let tree = Tree::from_snapshot(self.next_snapshot()?);
        self.database().store(&tree)
    }

    /// Store a commit for `tree_oid` and advance HEAD to it
    ///
    /// `reflog_action` prefixes the subject in the reflog line, e.g. `commit`.
    pub fn write_commit(
        &self,
        parents: Vec<ObjectId>,
        tree_oid: ObjectId,
        message: &str,
        reflog_action: &str,
    ) -> VcsResult<(ObjectId, Commit)> {
        let author = self.author()?;
        let commit = Commit::new(parents, tree_oid, author.clone(), message.trim().to_string());
        let commit_oid = self.database().store(&commit)?;

        self.refs().update_head(
            &commit_oid,
            &author,
            &format!("{reflog_action}: {}", commit.short_message()),
        )?;

        tracing::info!(
            oid = %commit_oid.to_short_oid(),
            parents = commit.parents().len(),
            "created commit"
        );

        Ok((commit_oid, commit))
    }
}
