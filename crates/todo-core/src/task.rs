use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: u64,

    pub text: String,

    #[serde(default)]
    pub completed: bool,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Builds an open task. `text` is expected to be normalized already.
    pub fn new(id: u64, text: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            text,
            completed: false,
            created_at: now,
        }
    }

    pub fn matches_search(&self, needle_lower: &str) -> bool {
        needle_lower.is_empty() || self.text.to_lowercase().contains(needle_lower)
    }
}

/// Trims user input, rejecting anything that is empty afterwards.
pub fn normalize_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
