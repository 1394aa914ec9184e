//! Content hashing
//!
//! An object's id is the SHA-1 of its framed bytes:
//! `<kind> SP <decimal length> NUL <content>`. The function is pure, so the
//! same `(kind, content)` pair names the same object in every process.

use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use bytes::Bytes;
use sha1::{Digest, Sha1};

/// Prefix `content` with its `<kind> <len>\0` header
pub fn frame(kind: ObjectType, content: &[u8]) -> Bytes {
    let header = format!("{} {}\0", kind.as_str(), content.len());

    let mut framed = Vec::with_capacity(header.len() + content.len());
    framed.extend_from_slice(header.as_bytes());
    framed.extend_from_slice(content);

    Bytes::from(framed)
}

/// Compute the content identifier of `content` stored as `kind`
pub fn hash(kind: ObjectType, content: &[u8]) -> ObjectId {
    let mut hasher = Sha1::new();
    hasher.update(format!("{} {}\0", kind.as_str(), content.len()).as_bytes());
    hasher.update(content);

    // a SHA-1 digest is always 20 bytes of valid hex material
    ObjectId::from_digest(&hasher.finalize()).unwrap_or_default()
}
