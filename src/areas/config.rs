//! Repository configuration
//!
//! `.gitx/config.toml` holds `[section]` tables of string values:
//!
//! ```toml
//! [user]
//! name = "Ada Lovelace"
//! email = "ada@example.com"
//! ```
//!
//! On the command line a value is addressed as `section.name`. Some keys can
//! be overridden from the environment; see [`ENV_OVERRIDES`].

use crate::artifacts::objects::commit::Author;
use crate::errors::{VcsError, VcsResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Config file name inside the metadata directory
pub const CONFIG_FILE: &str = "config.toml";

pub const AUTHOR_NAME_ENV: &str = "GITX_AUTHOR_NAME";
pub const AUTHOR_EMAIL_ENV: &str = "GITX_AUTHOR_EMAIL";
pub const AUTHOR_DATE_ENV: &str = "GITX_AUTHOR_DATE";

/// Environment variables that take precedence over config keys
pub const ENV_OVERRIDES: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "user.name" => AUTHOR_NAME_ENV,
    "user.email" => AUTHOR_EMAIL_ENV,
};

/// The `[user]` table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl UserSection {
    fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none()
    }
}

/// Parsed form of `config.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default, skip_serializing_if = "UserSection::is_empty")]
    pub user: UserSection,
    /// Every other table, e.g. `[core]`
    #[serde(flatten)]
    pub sections: BTreeMap<String, BTreeMap<String, String>>,
}

#[derive(Debug)]
pub struct Config {
    path: Box<Path>,
    file: ConfigFile,
}

impl Config {
    pub fn new(path: Box<Path>) -> Self {
        Config {
            path,
            file: ConfigFile::default(),
        }
    }

    /// Load the config file; a missing file is an empty config
    pub fn load(path: Box<Path>) -> VcsResult<Self> {
        let mut config = Config::new(path);

        let content = match std::fs::read_to_string(&config.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(config),
            Err(err) => return Err(err.into()),
        };

        config.file = toml::from_str(&content).map_err(|err| {
            VcsError::Config(format!("cannot parse {}: {err}", config.path.display()))
        })?;

        Ok(config)
    }

    /// Split `section.name`, rejecting anything else
    fn split_key(key: &str) -> VcsResult<(&str, &str)> {
        match key.split_once('.') {
            Some((section, name))
                if !section.is_empty()
                    && !name.is_empty()
                    && !name.contains('.')
                    && key
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_')) =>
            {
                Ok((section, name))
            }
            _ => Err(VcsError::Config(format!(
                "invalid key '{key}': keys look like section.name"
            ))),
        }
    }

    /// Value of a key, honouring environment overrides
    pub fn get(&self, key: &str) -> Option<String> {
        ENV_OVERRIDES
            .get(key)
            .and_then(|var| std::env::var(var).ok())
            .filter(|value| !value.is_empty())
            .or_else(|| self.get_stored(key).map(str::to_string))
    }

    /// Value stored in the file, ignoring the environment
    pub fn get_stored(&self, key: &str) -> Option<&str> {
        let (section, name) = Self::split_key(key).ok()?;

        match (section, name) {
            ("user", "name") => self.file.user.name.as_deref(),
            ("user", "email") => self.file.user.email.as_deref(),
            ("user", _) => None,
            _ => self
                .file
                .sections
                .get(section)
                .and_then(|table| table.get(name))
                .map(String::as_str),
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> VcsResult<()> {
        let (section, name) = Self::split_key(key)?;
        let value = value.trim().to_string();

        match (section, name) {
            ("user", "name") => self.file.user.name = Some(value),
            ("user", "email") => self.file.user.email = Some(value),
            ("user", _) => {
                return Err(VcsError::Config(format!(
                    "unknown key '{key}': [user] holds name and email"
                )));
            }
            _ => {
                self.file
                    .sections
                    .entry(section.to_string())
                    .or_default()
                    .insert(name.to_string(), value);
            }
        }

        Ok(())
    }

    pub fn save(&self) -> VcsResult<()> {
        let content = toml::to_string(&self.file)
            .map_err(|err| VcsError::Config(format!("cannot write config: {err}")))?;

        std::fs::write(&self.path, content)?;
        Ok(())
    }

    /// Identity stamped on new commits and reflog entries
    pub fn author(&self) -> VcsResult<Author> {
        let name = self.get("user.name").ok_or_else(|| {
            VcsError::Config(format!(
                "author name unknown: set {AUTHOR_NAME_ENV} or run `gitx config user.name <name>`"
            ))
        })?;
        let email = self.get("user.email").ok_or_else(|| {
            VcsError::Config(format!(
                "author email unknown: set {AUTHOR_EMAIL_ENV} or run `gitx config user.email <email>`"
            ))
        })?;

        match std::env::var(AUTHOR_DATE_ENV) {
            Ok(date) if !date.is_empty() => {
                Ok(Author::new_with_timestamp(name, email, parse_author_date(&date)?))
            }
            _ => Ok(Author::new(name, email)),
        }
    }
}

/// Parse `%Y-%m-%d %H:%M:%S %z` or RFC 2822 dates
pub fn parse_author_date(date: &str) -> VcsResult<DateTime<Utc>> {
    DateTime::parse_from_str(date, "%Y-%m-%d %H:%M:%S %z")
        .or_else(|_| DateTime::parse_from_rfc2822(date))
        .map(|date| date.with_timezone(&Utc))
        .map_err(|_| VcsError::Config(format!("invalid {AUTHOR_DATE_ENV}: {date}")))
}
