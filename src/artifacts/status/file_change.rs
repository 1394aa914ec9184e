use colored::{ColoredString, Colorize};

const LABEL_WIDTH: usize = 8;

/// Difference between the next commit and HEAD
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IndexChangeType {
    Added,
    Modified,
}

/// Difference between the working tree and the next commit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WorkspaceChangeType {
    Modified,
    Deleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FileChangeType {
    Index(IndexChangeType),
    Workspace(WorkspaceChangeType),
}

impl From<&FileChangeType> for &str {
    fn from(change: &FileChangeType) -> Self {
        match change {
            FileChangeType::Index(IndexChangeType::Added) => "new file:   ",
            FileChangeType::Index(IndexChangeType::Modified) => "modified:   ",
            FileChangeType::Workspace(WorkspaceChangeType::Modified) => "modified:   ",
            FileChangeType::Workspace(WorkspaceChangeType::Deleted) => "deleted:    ",
        }
    }
}

impl FileChangeType {
    /// Indented label, green for staged changes and red for unstaged ones
    pub fn label(&self, colored: bool) -> String {
        let text: &str = self.into();
        let text: ColoredString = match (self, colored) {
            (_, false) => text.normal(),
            (FileChangeType::Index(_), true) => text.green(),
            (FileChangeType::Workspace(_), true) => text.red(),
        };

        format!("{:>width$}{}", "", text, width = LABEL_WIDTH)
    }
}
