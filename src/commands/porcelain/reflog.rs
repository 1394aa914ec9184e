use crate::areas::repository::Repository;
use std::io::Write;

impl Repository {
    /// Print HEAD movements, newest first
    pub fn reflog(&self) -> anyhow::Result<()> {
        let entries = self.refs().read_reflog()?;

        for (position, entry) in entries.iter().rev().enumerate() {
            writeln!(
                self.writer(),
                "{} HEAD@{{{position}}}: {}",
                entry.new.to_short_oid(),
                entry.message
            )?;
        }

        Ok(())
    }
}
