use crate::areas::refs::{Head, ReflogEntry};
use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::branch::revision::Revision;
use crate::artifacts::objects::object_id::ObjectId;

const DETACHMENT_NOTICE: &str = r#"
You are in 'detached HEAD' state. Commits made here advance HEAD only and
belong to no branch until one is created for them:

    gitx branch <new-branch-name>
"#;

impl Repository {
    /// Switch HEAD to a branch, or detach it at a commit
    ///
    /// Only the ref layer moves; working tree files are left as they are.
    pub fn checkout(&self, target: &str, create: bool) -> anyhow::Result<()> {
        let previous = self.refs().read_head()?;
        let previous_oid = self.refs().resolve_head()?;

        if create {
            let branch = BranchName::try_parse(target.to_string())?;
            self.refs().create_branch(&branch, previous_oid.as_ref())?;
        }

        let branch = BranchName::try_parse(target.to_string())
            .ok()
            .filter(|branch| self.refs().branch_exists(branch));

        let new_head = match branch {
            Some(branch) => {
                if !self.refs().switch_branch(&branch)? {
                    eprintln!("Already on '{branch}'");
                    return Ok(());
                }
                Head::Attached(branch)
            }
            None => {
                let oid = Revision::try_parse(target)?.resolve(self)?;
                self.refs().set_head(&Head::Detached(oid.clone()))?;
                Head::Detached(oid)
            }
        };

        self.log_checkout(&previous, previous_oid, target)?;

        match new_head {
            Head::Attached(branch) if create => eprintln!("Switched to a new branch '{branch}'"),
            Head::Attached(branch) => eprintln!("Switched to branch '{branch}'"),
            Head::Detached(oid) => {
                if previous.branch().is_some() {
                    eprintln!("Note: switching to '{target}'.\n{DETACHMENT_NOTICE}");
                }
                self.print_head_position(&oid)?;
            }
        }

        Ok(())
    }

    fn log_checkout(
        &self,
        previous: &Head,
        previous_oid: Option<ObjectId>,
        target: &str,
    ) -> anyhow::Result<()> {
        // an unborn HEAD has no commit to record
        let Some(new_oid) = self.refs().resolve_head()? else {
            return Ok(());
        };

        let from = match previous {
            Head::Attached(branch) => branch.to_string(),
            Head::Detached(oid) => oid.to_short_oid(),
        };

        self.refs().append_reflog(ReflogEntry {
            old: previous_oid,
            new: new_oid,
            identity: self.reflog_identity(),
            message: format!("checkout: moving from {from} to {target}"),
        })?;

        Ok(())
    }

    fn print_head_position(&self, oid: &ObjectId) -> anyhow::Result<()> {
        let commit = self.database().parse_object_as_commit(oid)?;

        eprintln!("HEAD is now at {} {}", oid.to_short_oid(), commit.short_message());
        Ok(())
    }
}
