//! Branch naming rules and revision expressions

use regex::Regex;
use std::sync::LazyLock;

pub mod branch_name;
pub mod revision;

/// Names matching this pattern are rejected: leading dots or slashes, `..`,
/// `.lock` suffixes, `@{`, control characters and glob metacharacters
pub static INVALID_BRANCH_NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\.|\/\.|\.\.|^\/|\/$|\.lock$|@\{|[\x00-\x20\*:\?\[\\~\^\x7f]")
        .expect("branch name pattern compiles")
});

/// `<revision>^`
pub static PARENT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+)\^$").expect("parent pattern compiles"));

/// `<revision>~<n>`
pub static ANCESTOR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+)~(\d+)$").expect("ancestor pattern compiles"));

pub const REF_ALIASES: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "@" => "HEAD",
};

/// Branch HEAD is attached to in a fresh repository
pub const DEFAULT_BRANCH: &str = "main";

/// Prefix of every branch ref path
pub const REF_PREFIX: &str = "refs/heads/";
