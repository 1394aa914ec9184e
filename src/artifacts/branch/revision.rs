use crate::areas::refs::HEAD_REF_NAME;
use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::branch::{ANCESTOR_REGEX, PARENT_REGEX, REF_ALIASES};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{VcsError, VcsResult};

/// A way of naming a commit on the command line
///
/// - `HEAD` (or its alias `@`)
/// - a branch name, e.g. `main` or `feature/login`
/// - a full 40-character commit id, used when no branch has that name
/// - `<revision>^` for the first parent, `<revision>~<n>` for the nth
///   first-parent ancestor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Revision {
    Head,
    Ref(String),
    Parent(Box<Revision>),
    Ancestor(Box<Revision>, usize),
}

impl Revision {
    pub fn try_parse(revision: &str) -> VcsResult<Revision> {
        let unknown = || VcsError::UnknownRevision(revision.to_string());

        if let Some(caps) = PARENT_REGEX.captures(revision) {
            return Ok(Revision::Parent(Box::new(Self::try_parse(&caps[1])?)));
        }

        if let Some(caps) = ANCESTOR_REGEX.captures(revision) {
            let generations = caps[2].parse().map_err(|_| unknown())?;
            return Ok(Revision::Ancestor(
                Box::new(Self::try_parse(&caps[1])?),
                generations,
            ));
        }

        let resolved_name = *REF_ALIASES.get(revision).unwrap_or(&revision);
        if resolved_name == HEAD_REF_NAME {
            return Ok(Revision::Head);
        }
        // commit ids are valid branch names too
        BranchName::try_parse(resolved_name.to_string()).map_err(|_| unknown())?;

        Ok(Revision::Ref(resolved_name.to_string()))
    }

    /// The commit this revision names
    pub fn resolve(&self, repository: &Repository) -> VcsResult<ObjectId> {
        match self {
            Revision::Head => repository.refs().resolve_head()?.ok_or_else(|| {
                let head = repository
                    .refs()
                    .read_head()
                    .ok()
                    .and_then(|head| head.branch().map(ToString::to_string))
                    .unwrap_or_else(|| HEAD_REF_NAME.to_string());
                VcsError::UnbornBranch(head)
            }),
            Revision::Ref(name) => Self::resolve_ref(name, repository),
            Revision::Parent(base) => {
                let oid = base.resolve(repository)?;
                Self::first_parent(&oid, repository)
            }
            Revision::Ancestor(base, generations) => {
                let mut oid = base.resolve(repository)?;
                for _ in 0..*generations {
                    oid = Self::first_parent(&oid, repository)?;
                }

                Ok(oid)
            }
        }
    }

    fn resolve_ref(name: &str, repository: &Repository) -> VcsResult<ObjectId> {
        if let Ok(branch) = BranchName::try_parse(name.to_string())
            && repository.refs().branch_exists(&branch)
        {
            return repository
                .refs()
                .read_ref(&branch)?
                .ok_or_else(|| VcsError::UnbornBranch(branch.to_string()));
        }

        if ObjectId::is_valid(name) {
            let oid = ObjectId::try_parse(name.to_string())?;
            // reject ids of blobs and trees
            repository.database().parse_object_as_commit(&oid)?;
            return Ok(oid);
        }

        Err(VcsError::UnknownRevision(name.to_string()))
    }

    fn first_parent(oid: &ObjectId, repository: &Repository) -> VcsResult<ObjectId> {
        let commit = repository.database().parse_object_as_commit(oid)?;

        commit
            .parent()
            .cloned()
            .ok_or_else(|| VcsError::UnknownRevision(format!("{}^", oid.to_short_oid())))
    }
}
