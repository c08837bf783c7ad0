use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;

use crate::task::Task;

/// Completion filter applied to the visible list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Filter {
    #[default]
    All,
    Active,
    Completed,
}

impl Filter {
    pub const ALL: [Filter; 3] = [Filter::All, Filter::Active, Filter::Completed];

    pub fn as_str(self) -> &'static str {
        match self {
            Filter::All => "all",
            Filter::Active => "active",
            Filter::Completed => "completed",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Filter::All => "All",
            Filter::Active => "Active",
            Filter::Completed => "Completed",
        }
    }

    pub fn matches(self, task: &Task) -> bool {
        match self {
            Filter::All => true,
            Filter::Active => !task.completed,
            Filter::Completed => task.completed,
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Filter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Filter::All),
            "active" => Ok(Filter::Active),
            "completed" => Ok(Filter::Completed),
            other => Err(anyhow!(
                "unknown filter: {other} (expected all, active or completed)"
            )),
        }
    }
}

/// At most one task is being edited at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditSession {
    #[default]
    Idle,
    Editing { task_id: u64, draft: String },
}

impl EditSession {
    pub fn task_id(&self) -> Option<u64> {
        match self {
            EditSession::Idle => None,
            EditSession::Editing { task_id, .. } => Some(*task_id),
        }
    }

    pub fn draft(&self) -> Option<&str> {
        match self {
            EditSession::Idle => None,
            EditSession::Editing { draft, .. } => Some(draft),
        }
    }

    pub fn is_editing(&self, id: u64) -> bool {
        self.task_id() == Some(id)
    }
}
