//! Merge base search
//!
//! Finds the nearest common ancestor of two commits. Each tip is walked
//! breadth-first along its parent links, recording the distance at which every
//! ancestor is first reached. Commits reached from both sides are candidates;
//! the merge base is the candidate with the smallest combined distance. Ties
//! go to the candidate the walk from the first tip reached earliest, so the
//! answer never depends on hash-map iteration order.
//!
//! ```text
//!     A
//!    / \
//!   B   C      merge base of D and C is A (distances 2 + 1)
//!   |
//!   D
//! ```
//!
//! Commits are loaded through a caller-supplied closure, so the same search
//! runs against the object store and against in-memory graphs in tests. A
//! parent id the loader cannot find is reported as
//! [`VcsError::AncestorLookupFailed`]; the walk never skips over it.
//!
//! Building with the `debug_merge` feature dumps the full visit table at
//! `trace` level once both walks finish.

use crate::artifacts::objects::commit::SlimCommit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{VcsError, VcsResult};
use bitflags::bitflags;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Hash)]
    struct VisitState: u8 {
        const NONE = 0b00;
        const REACHED_FROM_OURS = 0b01;
        const REACHED_FROM_THEIRS = 0b10;
        const REACHED_FROM_BOTH = Self::REACHED_FROM_OURS.bits() | Self::REACHED_FROM_THEIRS.bits();
    }
}

impl fmt::Debug for VisitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut flags = Vec::new();
        if self.contains(VisitState::REACHED_FROM_OURS) {
            flags.push("OURS");
        }
        if self.contains(VisitState::REACHED_FROM_THEIRS) {
            flags.push("THEIRS");
        }
        if flags.is_empty() {
            write!(f, "NONE")
        } else {
            write!(f, "{}", flags.join("|"))
        }
    }
}

impl fmt::Display for VisitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Per-commit bookkeeping of the two walks
#[derive(Debug, Clone, Copy)]
struct Visit {
    state: VisitState,
    ours_distance: usize,
    theirs_distance: usize,
}

impl Default for Visit {
    fn default() -> Self {
        Visit {
            state: VisitState::NONE,
            ours_distance: usize::MAX,
            theirs_distance: usize::MAX,
        }
    }
}

/// Ancestors of one tip in breadth-first order, with their distances
struct Walk {
    order: Vec<ObjectId>,
    distances: HashMap<ObjectId, usize>,
}

/// Nearest-common-ancestor search over a commit graph
pub struct MergeBaseFinder<CommitLoaderFn>
where
    CommitLoaderFn: Fn(&ObjectId) -> VcsResult<SlimCommit>,
{
    commit_loader: CommitLoaderFn,
}

impl<CommitLoaderFn> MergeBaseFinder<CommitLoaderFn>
where
    CommitLoaderFn: Fn(&ObjectId) -> VcsResult<SlimCommit>,
{
    /// `commit_loader` returns the parents of a commit, or
    /// [`VcsError::ObjectNotFound`] when the id is not stored
    pub fn new(commit_loader: CommitLoaderFn) -> Self {
        Self { commit_loader }
    }

    /// Find the merge base of `ours` and `theirs`
    pub fn find(&self, ours: &ObjectId, theirs: &ObjectId) -> VcsResult<ObjectId> {
        let ours_walk = self.walk(ours, None)?;
        let theirs_walk = self.walk(theirs, None)?;

        let mut visits = HashMap::<ObjectId, Visit>::new();
        for (oid, distance) in &ours_walk.distances {
            let visit = visits.entry(oid.clone()).or_default();
            visit.state |= VisitState::REACHED_FROM_OURS;
            visit.ours_distance = *distance;
        }
        for (oid, distance) in &theirs_walk.distances {
            let visit = visits.entry(oid.clone()).or_default();
            visit.state |= VisitState::REACHED_FROM_THEIRS;
            visit.theirs_distance = *distance;
        }

        #[cfg(feature = "debug_merge")]
        for oid in &ours_walk.order {
            if let Some(visit) = visits.get(oid) {
                tracing::trace!(
                    commit = %oid.to_short_oid(),
                    state = %visit.state,
                    ours = visit.ours_distance,
                    theirs = visit.theirs_distance,
                    "merge-base visit"
                );
            }
        }

        // min_by_key keeps the first of equal elements, which is the BFS order from `ours`
        let base = ours_walk
            .order
            .iter()
            .filter_map(|oid| {
                let visit = visits.get(oid)?;
                visit
                    .state
                    .contains(VisitState::REACHED_FROM_BOTH)
                    .then(|| (oid, visit.ours_distance + visit.theirs_distance))
            })
            .min_by_key(|(_, combined)| *combined)
            .map(|(oid, _)| oid.clone());

        match base {
            Some(base) => {
                tracing::debug!(
                    ours = %ours.to_short_oid(),
                    theirs = %theirs.to_short_oid(),
                    base = %base.to_short_oid(),
                    "resolved merge base"
                );
                Ok(base)
            }
            None => Err(VcsError::NoCommonAncestor {
                ours: ours.clone(),
                theirs: theirs.clone(),
            }),
        }
    }

    /// Whether `ancestor` is reachable from `descendant` (a commit is its own ancestor)
    pub fn is_ancestor(&self, ancestor: &ObjectId, descendant: &ObjectId) -> VcsResult<bool> {
        let walk = self.walk(descendant, Some(ancestor))?;
        Ok(walk.distances.contains_key(ancestor))
    }

    /// Breadth-first walk from `tip`, stopping early once `target` is reached
    fn walk(&self, tip: &ObjectId, target: Option<&ObjectId>) -> VcsResult<Walk> {
        let mut order = Vec::new();
        let mut distances = HashMap::new();
        let mut seen = HashSet::new();
        let mut queue = VecDeque::new();

        seen.insert(tip.clone());
        queue.push_back((tip.clone(), 0usize));

        while let Some((oid, distance)) = queue.pop_front() {
            let commit = if &oid == tip {
                (self.commit_loader)(&oid)?
            } else {
                (self.commit_loader)(&oid).map_err(|err| match err {
                    VcsError::ObjectNotFound(missing) => VcsError::AncestorLookupFailed(missing),
                    other => other,
                })?
            };

            order.push(oid.clone());
            distances.insert(oid.clone(), distance);

            if target == Some(&oid) {
                break;
            }

            for parent in commit.parents {
                if seen.insert(parent.clone()) {
                    queue.push_back((parent, distance + 1));
                }
            }
        }

        Ok(Walk { order, distances })
    }
}
