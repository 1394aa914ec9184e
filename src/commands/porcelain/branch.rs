use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::branch::revision::Revision;
use crate::artifacts::core::is_colored_output;
use colored::Colorize;
use std::io::Write;

impl Repository {
    /// Print every branch, marking the current one with `*`
    pub fn list_branches(&self) -> anyhow::Result<()> {
        let current = self.refs().read_head()?;
        let colored = is_colored_output();

        for branch in self.refs().list_branches()? {
            if current.branch() == Some(&branch) {
                let line = format!("* {branch}");
                match colored {
                    true => writeln!(self.writer(), "{}", line.green())?,
                    false => writeln!(self.writer(), "{line}")?,
                }
            } else {
                writeln!(self.writer(), "  {branch}")?;
            }
        }

        Ok(())
    }

    /// Create a branch at `start_point`, or at HEAD when none is given
    ///
    /// Before the first commit the new branch starts out empty as well.
    pub fn create_branch(&self, name: &str, start_point: Option<&str>) -> anyhow::Result<()> {
        let branch = BranchName::try_parse(name.to_string())?;

        let start_oid = match start_point {
            Some(revision) => Some(Revision::try_parse(revision)?.resolve(self)?),
            None => self.refs().resolve_head()?,
        };

        self.refs().create_branch(&branch, start_oid.as_ref())?;

        Ok(())
    }

    pub fn delete_branch(&self, name: &str) -> anyhow::Result<()> {
        let branch = BranchName::try_parse(name.to_string())?;
        let tip = self.refs().delete_branch(&branch)?;

        match tip {
            Some(tip) => writeln!(
                self.writer(),
                "Deleted branch {branch} (was {}).",
                tip.to_short_oid()
            )?,
            None => writeln!(self.writer(), "Deleted branch {branch}.")?,
        }

        Ok(())
    }
}
