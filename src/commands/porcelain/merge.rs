use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::database::database_entry::FileSnapshot;
use crate::artifacts::merge::merge_base::MergeBaseFinder;
use crate::artifacts::merge::resolve::{BlobStore, ConflictLabels, MergeOutcome, merge_snapshots};
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::Tree;
use crate::errors::{VcsError, VcsResult};
use std::io::Write;

/// Label of the current side in conflict markers
const OURS_LABEL: &str = "HEAD";

/// What a merge did
#[derive(Debug)]
pub enum MergeReport {
    /// The other tip is already part of HEAD's history; nothing was written
    UpToDate,
    Merged {
        oid: ObjectId,
        commit: Commit,
        /// Paths committed with conflict markers, sorted
        conflicts: Vec<String>,
    },
}

impl Repository {
    pub fn merge(&self, branch: &str, message: Option<&str>) -> anyhow::Result<()> {
        let mut index = self.index();
        index.rehydrate()?;
        let has_staged_changes = !index.is_empty();
        drop(index);

        if has_staged_changes {
            anyhow::bail!("cannot merge with staged changes; commit them first");
        }

        match self.merge_branch(branch, message)? {
            MergeReport::UpToDate => writeln!(self.writer(), "Already up to date.")?,
            MergeReport::Merged {
                oid,
                commit,
                conflicts,
            } => {
                for path in &conflicts {
                    writeln!(self.writer(), "CONFLICT (content): Merge conflict in {path}")?;
                }

                let head = self.refs().read_head()?;
                let head_name = head
                    .branch()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| "detached HEAD".to_string());
                writeln!(
                    self.writer(),
                    "[{head_name} {}] {}",
                    oid.to_short_oid(),
                    commit.short_message()
                )?;

                if !conflicts.is_empty() {
                    writeln!(
                        self.writer(),
                        "Automatic merge found conflicts; fix the marked files and commit the result."
                    )?;
                }
            }
        }

        Ok(())
    }

    /// Merge the tip of `branch` into HEAD
    ///
    /// Always records a two-parent commit `[HEAD, branch]`, conflicts or not,
    /// then brings the working tree in line with the merged snapshot.
    pub fn merge_branch(&self, branch: &str, message: Option<&str>) -> VcsResult<MergeReport> {
        let branch = BranchName::try_parse(branch.to_string())?;

        let ours = self.refs().resolve_head()?.ok_or_else(|| {
            let head = self.refs().read_head().ok();
            let name = head
                .as_ref()
                .and_then(|head| head.branch())
                .map(ToString::to_string)
                .unwrap_or_default();
            VcsError::UnbornBranch(name)
        })?;
        let theirs = self
            .refs()
            .read_ref(&branch)?
            .ok_or_else(|| VcsError::UnbornBranch(branch.to_string()))?;

        let database = self.database();
        let finder = MergeBaseFinder::new(|oid: &ObjectId| database.load_slim_commit(oid));

        if finder.is_ancestor(&theirs, &ours)? {
            tracing::info!(branch = %branch, "already up to date");
            return Ok(MergeReport::UpToDate);
        }

        let base = finder.find(&ours, &theirs)?;

        let base_snapshot = database.commit_snapshot(&base)?;
        let ours_snapshot = database.commit_snapshot(&ours)?;
        let theirs_snapshot = database.commit_snapshot(&theirs)?;

        let labels = ConflictLabels {
            ours: OURS_LABEL.to_string(),
            theirs: branch.to_string(),
        };
        let outcome = merge_snapshots(
            &base_snapshot,
            &ours_snapshot,
            &theirs_snapshot,
            &labels,
            database,
        )?;

        self.check_workspace_for_merge(&ours_snapshot, &theirs_snapshot, &outcome)?;

        let tree_oid = database.store(&Tree::from_snapshot(outcome.snapshot.clone()))?;
        let message = message
            .map(str::to_string)
            .unwrap_or_else(|| format!("Merge branch '{branch}'"));
        let (oid, commit) = self.write_commit(
            vec![ours, theirs],
            tree_oid,
            &message,
            &format!("merge {branch}"),
        )?;

        self.apply_merge_to_workspace(&ours_snapshot, &outcome)?;

        tracing::info!(
            branch = %branch,
            base = %base.to_short_oid(),
            conflicts = outcome.conflicts.len(),
            "merged"
        );

        Ok(MergeReport::Merged {
            oid,
            commit,
            conflicts: outcome.conflicts,
        })
    }

    /// Refuse to merge when a file the merge rewrites or deletes holds local work
    ///
    /// A file counts as local work when its content matches neither side nor
    /// the merged result. Checkout leaves files in place, so a working tree
    /// holding the other branch's version is not local work.
    fn check_workspace_for_merge(
        &self,
        ours: &FileSnapshot,
        theirs: &FileSnapshot,
        outcome: &MergeOutcome,
    ) -> VcsResult<()> {
        let known = |path: &str, oid: &ObjectId| {
            [ours.get(path), theirs.get(path), outcome.snapshot.get(path)]
                .into_iter()
                .flatten()
                .any(|entry| entry.oid == *oid)
        };

        let written = outcome
            .snapshot
            .iter()
            .filter(|(path, entry)| ours.get(*path) != Some(*entry))
            .map(|(path, _)| path);
        let deleted = ours.keys().filter(|path| !outcome.snapshot.contains_key(*path));

        let mut overwritten = Vec::new();
        for path in written.chain(deleted) {
            let local = self.workspace_entry(path)?;
            if local.is_some_and(|entry| !known(path.as_str(), &entry.oid)) {
                overwritten.push(path.clone());
            }
        }

        if overwritten.is_empty() {
            Ok(())
        } else {
            tracing::warn!(paths = ?overwritten, "merge would overwrite local changes");
            Err(VcsError::WorkingTreeChanged(overwritten))
        }
    }

    /// Write files whose merged entry differs from ours, and delete files the merge dropped
    fn apply_merge_to_workspace(
        &self,
        ours: &FileSnapshot,
        outcome: &MergeOutcome,
    ) -> VcsResult<()> {
        for (path, entry) in &outcome.snapshot {
            if ours.get(path) == Some(entry) {
                continue;
            }

            let content = self.database().read_blob(&entry.oid)?;
            self.workspace().write_file(path, &content, entry.mode)?;
        }

        for path in ours.keys() {
            if !outcome.snapshot.contains_key(path) {
                self.workspace().remove_file(path)?;
            }
        }

        Ok(())
    }
}
