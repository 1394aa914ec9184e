//! Working tree access
//!
//! All paths handed out by the workspace are `/`-separated and relative to the
//! repository root. The `.gitx` directory is never listed.

use crate::artifacts::index::entry_mode::{EntryMode, FileMode};
use crate::errors::{VcsError, VcsResult};
use bytes::Bytes;
use is_executable::IsExecutable;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Name of the metadata directory at the repository root
pub const METADATA_DIR: &str = ".gitx";

#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every file in the working tree, sorted
    pub fn list_all_files(&self) -> VcsResult<Vec<String>> {
        self.walk(&self.path)
    }

    /// Files matching a pathspec: the file itself, or every file below a directory
    ///
    /// Relative pathspecs are resolved against the current directory.
    pub fn list_files(&self, pathspec: &Path) -> VcsResult<Vec<String>> {
        let not_matched = || VcsError::PathspecNotMatched(pathspec.display().to_string());

        let absolute = if pathspec.is_absolute() {
            pathspec.to_path_buf()
        } else {
            std::env::current_dir()?.join(pathspec)
        };
        let absolute = absolute.canonicalize().map_err(|_| not_matched())?;

        let relative = absolute.strip_prefix(&self.path).map_err(|_| not_matched())?;
        if Self::is_ignored(relative) {
            return Err(not_matched());
        }

        let files = if absolute.is_dir() {
            self.walk(&absolute)?
        } else {
            match Self::to_slash_path(relative) {
                Some(path) => vec![path],
                None => {
                    tracing::warn!(path = ?relative, "path cannot be tracked");
                    return Err(not_matched());
                }
            }
        };

        if files.is_empty() {
            return Err(not_matched());
        }

        Ok(files)
    }

    fn walk(&self, root: &Path) -> VcsResult<Vec<String>> {
        let mut files = Vec::new();

        let walker = WalkDir::new(root)
            .into_iter()
            .filter_entry(|entry| entry.file_name() != METADATA_DIR);
        for entry in walker {
            let entry = entry.map_err(|err| {
                std::io::Error::other(format!("cannot walk working tree: {err}"))
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let Ok(relative) = entry.path().strip_prefix(&self.path) else {
                continue;
            };
            match Self::to_slash_path(relative) {
                Some(path) => files.push(path),
                None => tracing::warn!(path = ?relative, "skipping untrackable path"),
            }
        }

        files.sort();
        Ok(files)
    }

    fn is_ignored(path: &Path) -> bool {
        path.components()
            .any(|component| matches!(component, Component::Normal(name) if name == METADATA_DIR))
    }

    /// `/`-joined UTF-8 path, `None` when it cannot be a tree entry name
    ///
    /// Tree entries are newline-terminated, so names holding `\n` are refused.
    fn to_slash_path(path: &Path) -> Option<String> {
        let parts = path
            .components()
            .map(|component| match component {
                Component::Normal(name) => name
                    .to_str()
                    .filter(|name| !name.contains('\n')),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()?;

        (!parts.is_empty()).then(|| parts.join("/"))
    }

    fn absolute(&self, file_path: &str) -> PathBuf {
        self.path.join(file_path)
    }

    pub fn exists(&self, file_path: &str) -> bool {
        self.absolute(file_path).is_file()
    }

    pub fn read_file(&self, file_path: &str) -> VcsResult<Bytes> {
        Ok(Bytes::from(std::fs::read(self.absolute(file_path))?))
    }

    pub fn file_mode(&self, file_path: &str) -> EntryMode {
        if self.absolute(file_path).is_executable() {
            EntryMode::File(FileMode::Executable)
        } else {
            EntryMode::File(FileMode::Regular)
        }
    }

    /// Write `content` to a working tree file, creating parent directories
    pub fn write_file(&self, file_path: &str, content: &[u8], mode: EntryMode) -> VcsResult<()> {
        let path = self.absolute(file_path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        if path.is_dir() {
            std::fs::remove_dir_all(&path)?;
        }

        std::fs::write(&path, content)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = if mode.is_executable() { 0o755 } else { 0o644 };
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(permissions))?;
        }
        #[cfg(not(unix))]
        let _ = mode;

        Ok(())
    }

    /// Delete a working tree file and any directories it leaves empty
    pub fn remove_file(&self, file_path: &str) -> VcsResult<()> {
        let path = self.absolute(file_path);
        match std::fs::remove_file(&path) {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(err) => return Err(err.into()),
        }

        let mut parent = path.parent();
        while let Some(dir) = parent {
            if dir == self.path.as_ref() || std::fs::remove_dir(dir).is_err() {
                break;
            }
            parent = dir.parent();
        }

        Ok(())
    }
}
