//! Stateful repository components, each bound to a path on disk
//!
//! - `config`: Flat `section.name = value` settings and author identity
//! - `database`: Object store for blobs, trees and commits
//! - `index`: Staging area for the next commit
//! - `refs`: Branches, HEAD and the reflog
//! - `repository`: Bundles the areas with an output writer
//! - `workspace`: Working tree file access

pub mod config;
pub mod database;
pub mod index;
pub mod refs;
pub mod repository;
pub mod workspace;
