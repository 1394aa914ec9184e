//! Porcelain commands (user-facing version control operations)
//!
//! ## Commands
//!
//! - `init`: Create the `.gitx` directory
//! - `add`: Stage files for the next commit
//! - `commit`: Record the next snapshot
//! - `status`: Show staged, unstaged and untracked paths
//! - `log`: Show first-parent history from HEAD
//! - `branch`: Create, list or delete branches
//! - `checkout`: Switch branches or detach HEAD
//! - `merge`: Three-way merge another branch into HEAD
//! - `config`: Read or write configuration keys
//! - `reflog`: Show where HEAD has been
//! - `stash`: Save the working tree as a commit under `refs/stash`

pub mod add;
pub mod branch;
pub mod checkout;
pub mod commit;
pub mod config;
pub mod init;
pub mod log;
pub mod merge;
pub mod reflog;
pub mod stash;
pub mod status;
