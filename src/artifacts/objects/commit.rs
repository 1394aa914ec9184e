//! Commit object
//!
//! Commits name a tree snapshot and link it to zero, one or two parents:
//! - zero parents: the root commit
//! - one parent: an ordinary commit
//! - two parents: a merge commit (current branch first)
//!
//! ## Format
//!
//! On disk:
//! ```text
//! commit <size>\0
//! tree <tree-sha>
//! parent <parent-sha>
//! author <name> <email> <unix-ts> +0000
//! committer <name> <email> <unix-ts> +0000
//!
//! <commit message>
//! ```
//!
//! Timestamps are always rendered in UTC, so the id of a commit depends only
//! on its logical content.

use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::{VcsError, VcsResult};
use bytes::Bytes;
use chrono::{DateTime, TimeZone, Utc};

/// Author or committer information
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Author {
    name: String,
    email: String,
    timestamp: DateTime<Utc>,
}

impl Author {
    /// Create a new author stamped with the current time
    pub fn new(name: String, email: String) -> Self {
        Author::new_with_timestamp(name, email, Utc::now())
    }

    /// Create a new author with a specific timestamp
    ///
    /// Sub-second precision is dropped since the canonical form stores seconds.
    pub fn new_with_timestamp(name: String, email: String, timestamp: DateTime<Utc>) -> Self {
        let timestamp = Utc
            .timestamp_opt(timestamp.timestamp(), 0)
            .single()
            .unwrap_or(timestamp);

        Author {
            name,
            email,
            timestamp,
        }
    }

    /// "Name <email@example.com>"
    pub fn display_name(&self) -> String {
        format!("{} <{}>", self.name, self.email)
    }

    /// "Name <email> <unix-ts> +0000"
    pub fn display(&self) -> String {
        format!("{} {} +0000", self.display_name(), self.timestamp.timestamp())
    }

    /// String like "Mon Jan 1 12:34:56 2024 +0000"
    pub fn readable_timestamp(&self) -> String {
        self.timestamp.format("%a %b %-d %H:%M:%S %Y %z").to_string()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl TryFrom<&str> for Author {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        // Format: "name <email> timestamp timezone"
        let parts: Vec<&str> = value.rsplitn(3, ' ').collect();
        if parts.len() < 3 {
            return Err(format!("invalid author line: {value}"));
        }

        let timezone = parts[0];
        if timezone != "+0000" {
            return Err(format!("unsupported timezone {timezone}"));
        }
        let timestamp = parts[1]
            .parse::<i64>()
            .map_err(|_| format!("invalid timestamp {}", parts[1]))?;
        let name_email = parts[2];

        let email_start = name_email
            .find('<')
            .ok_or_else(|| format!("missing '<' in author {name_email}"))?;
        let email_end = name_email
            .rfind('>')
            .filter(|end| *end > email_start)
            .ok_or_else(|| format!("missing '>' in author {name_email}"))?;

        let name = name_email[..email_start].trim().to_string();
        let email = name_email[email_start + 1..email_end].to_string();
        let timestamp = DateTime::from_timestamp(timestamp, 0)
            .ok_or_else(|| format!("timestamp out of range: {timestamp}"))?;

        Ok(Author {
            name,
            email,
            timestamp,
        })
    }
}

/// The parent links of a commit, enough to walk history
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SlimCommit {
    pub oid: ObjectId,
    pub parents: Vec<ObjectId>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    /// Parent commit IDs in order (empty for the root commit)
    parents: Vec<ObjectId>,
    tree_oid: ObjectId,
    author: Author,
    committer: Author,
    message: String,
}

impl Commit {
    /// Create a new commit; the author doubles as the committer
    pub fn new(parents: Vec<ObjectId>, tree_oid: ObjectId, author: Author, message: String) -> Self {
        Commit {
            parents,
            tree_oid,
            committer: author.clone(),
            author,
            message,
        }
    }

    /// First line of the commit message
    pub fn short_message(&self) -> String {
        self.message.lines().next().unwrap_or("").to_string()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn tree_oid(&self) -> &ObjectId {
        &self.tree_oid
    }

    pub fn parents(&self) -> &[ObjectId] {
        &self.parents
    }

    pub fn parent(&self) -> Option<&ObjectId> {
        self.parents.first()
    }

    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    pub fn author(&self) -> &Author {
        &self.author
    }
}

impl Packable for Commit {
    fn serialize(&self) -> Bytes {
        Bytes::from(format!("{}\n", self.display()))
    }
}

impl Unpackable for Commit {
    fn deserialize(oid: &ObjectId, content: Bytes) -> VcsResult<Self> {
        let corrupt = |reason: &str| VcsError::corrupt(oid, reason);

        let content = std::str::from_utf8(&content).map_err(|_| corrupt("commit is not valid UTF-8"))?;
        let (headers, message) = content
            .split_once("\n\n")
            .ok_or_else(|| corrupt("missing blank line before message"))?;
        let message = message.strip_suffix('\n').unwrap_or(message).to_string();

        let mut lines = headers.lines();

        let tree_oid = lines
            .next()
            .and_then(|line| line.strip_prefix("tree "))
            .ok_or_else(|| corrupt("missing tree line"))?;
        let tree_oid =
            ObjectId::try_parse(tree_oid.to_string()).map_err(|_| corrupt("invalid tree id"))?;

        // Parse all parent lines (there can be 0, 1, or 2 parents)
        let mut parents = Vec::new();
        let mut next_line = lines.next().ok_or_else(|| corrupt("missing author line"))?;
        while let Some(parent_oid) = next_line.strip_prefix("parent ") {
            parents.push(
                ObjectId::try_parse(parent_oid.to_string())
                    .map_err(|_| corrupt("invalid parent id"))?,
            );
            next_line = lines.next().ok_or_else(|| corrupt("missing author line"))?;
        }

        let author = next_line
            .strip_prefix("author ")
            .ok_or_else(|| corrupt("invalid author line"))?;
        let author = Author::try_from(author).map_err(|reason| corrupt(&reason))?;

        let committer = lines
            .next()
            .and_then(|line| line.strip_prefix("committer "))
            .ok_or_else(|| corrupt("missing committer line"))?;
        let committer = Author::try_from(committer).map_err(|reason| corrupt(&reason))?;

        if lines.next().is_some() {
            return Err(corrupt("unexpected header after committer"));
        }

        Ok(Commit {
            parents,
            tree_oid,
            author,
            committer,
            message,
        })
    }
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }

    fn display(&self) -> String {
        let mut lines = vec![];

        lines.push(format!("tree {}", self.tree_oid));
        for parent in &self.parents {
            lines.push(format!("parent {parent}"));
        }
        lines.push(format!("author {}", self.author.display()));
        lines.push(format!("committer {}", self.committer.display()));
        lines.push(String::new());
        lines.push(self.message.to_string());

        lines.join("\n")
    }
}
