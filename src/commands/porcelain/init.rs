use crate::areas::refs::Head;
use crate::areas::repository::Repository;
use crate::artifacts::branch::DEFAULT_BRANCH;
use crate::artifacts::branch::branch_name::BranchName;
use anyhow::Context;
use std::fs;
use std::io::Write;

impl Repository {
    pub fn init(&self) -> anyhow::Result<()> {
        let reinitialized = self.refs().head_path().is_file();

        fs::create_dir_all(self.database().objects_path())
            .context("Failed to create .gitx/objects directory")?;

        fs::create_dir_all(self.refs().heads_path())
            .context("Failed to create .gitx/refs/heads directory")?;

        fs::create_dir_all(self.metadata_path().join("logs"))
            .context("Failed to create .gitx/logs directory")?;

        if !reinitialized {
            let main = BranchName::try_parse(DEFAULT_BRANCH.to_string())?;

            self.refs()
                .create_branch(&main, None)
                .context("Failed to create the default branch")?;
            self.refs()
                .set_head(&Head::Attached(main))
                .context("Failed to create initial HEAD reference")?;
        }

        let index = self.index();
        if !index.path().exists() {
            fs::write(index.path(), b"").context("Failed to create .gitx/index file")?;
        }
        drop(index);

        let verb = if reinitialized {
            "Reinitialized existing"
        } else {
            "Initialized empty"
        };
        writeln!(
            self.writer(),
            "{verb} gitx repository in {}",
            self.metadata_path().display()
        )?;

        Ok(())
    }
}
