use crate::areas::refs::Head;
use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::core::is_colored_output;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use colored::Colorize;
use std::collections::HashMap;
use std::io::Write;

#[derive(Debug, Clone, Copy, Default)]
pub struct LogOptions {
    pub oneline: bool,
}

/// Branch names pointing at each commit, plus where HEAD is
struct Decorations {
    head: Head,
    branches: HashMap<ObjectId, Vec<BranchName>>,
}

impl Repository {
    /// Walk first parents from HEAD, newest first
    pub fn log(&self, opts: &LogOptions) -> anyhow::Result<()> {
        let decorations = self.load_decorations()?;
        let colored = is_colored_output();

        let mut current = self.refs().resolve_head()?;
        while let Some(commit_oid) = current {
            let commit = self.database().parse_object_as_commit(&commit_oid)?;
            let decoration = decorations.describe(&commit_oid);

            if opts.oneline {
                self.show_commit_oneline(&commit_oid, &commit, &decoration, colored)?;
            } else {
                self.show_commit_medium(&commit_oid, &commit, &decoration, colored)?;
            }

            current = commit.parent().cloned();
            if current.is_some() && !opts.oneline {
                writeln!(self.writer())?;
            }
        }

        Ok(())
    }

    fn show_commit_medium(
        &self,
        oid: &ObjectId,
        commit: &Commit,
        decoration: &str,
        colored: bool,
    ) -> anyhow::Result<()> {
        let header = format!("commit {oid}");
        match colored {
            true => writeln!(self.writer(), "{}{}", header.yellow(), decoration)?,
            false => writeln!(self.writer(), "{header}{decoration}")?,
        }

        if commit.is_merge() {
            let parents = commit
                .parents()
                .iter()
                .map(ObjectId::to_short_oid)
                .collect::<Vec<_>>()
                .join(" ");
            writeln!(self.writer(), "Merge: {parents}")?;
        }

        writeln!(self.writer(), "Author: {}", commit.author().display_name())?;
        writeln!(
            self.writer(),
            "Date:   {}",
            commit.author().readable_timestamp()
        )?;
        writeln!(self.writer())?;
        for message_line in commit.message().lines() {
            writeln!(self.writer(), "    {message_line}")?;
        }

        Ok(())
    }

    fn show_commit_oneline(
        &self,
        oid: &ObjectId,
        commit: &Commit,
        decoration: &str,
        colored: bool,
    ) -> anyhow::Result<()> {
        let short_oid = oid.to_short_oid();
        match colored {
            true => writeln!(
                self.writer(),
                "{}{} {}",
                short_oid.yellow(),
                decoration,
                commit.short_message()
            )?,
            false => writeln!(
                self.writer(),
                "{short_oid}{decoration} {}",
                commit.short_message()
            )?,
        }

        Ok(())
    }

    fn load_decorations(&self) -> anyhow::Result<Decorations> {
        let mut branches = HashMap::<ObjectId, Vec<BranchName>>::new();

        for branch in self.refs().list_branches()? {
            if let Some(tip) = self.refs().read_ref(&branch)? {
                branches.entry(tip).or_default().push(branch);
            }
        }

        Ok(Decorations {
            head: self.refs().read_head()?,
            branches,
        })
    }
}

impl Decorations {
    /// ` (HEAD -> main, topic)` style suffix, empty for undecorated commits
    fn describe(&self, oid: &ObjectId) -> String {
        let branches = self.branches.get(oid).map(Vec::as_slice).unwrap_or_default();
        let mut names = Vec::new();

        match &self.head {
            Head::Attached(current) if branches.contains(current) => {
                names.push(format!("HEAD -> {current}"));
            }
            Head::Detached(head_oid) if head_oid == oid => names.push("HEAD".to_string()),
            _ => {}
        }

        names.extend(
            branches
                .iter()
                .filter(|branch| self.head.branch() != Some(*branch))
                .map(ToString::to_string),
        );

        if names.is_empty() {
            String::new()
        } else {
            format!(" ({})", names.join(", "))
        }
    }
}
