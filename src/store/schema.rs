use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::params::{CategoryId, Difficulty};

const SCHEMA_VERSION: u32 = 1;

/// Oldest entries are dropped beyond this.
pub const MAX_FEEDBACK_ENTRIES: usize = 200;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    pub submitted_at: DateTime<Utc>,
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub comment: String,
    pub score: usize,
    pub total: usize,
    #[serde(default)]
    pub category: Option<CategoryId>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FeedbackLog {
    pub schema_version: u32,
    pub entries: Vec<FeedbackEntry>,
}

impl Default for FeedbackLog {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            entries: Vec::new(),
        }
    }
}

impl FeedbackLog {
    pub fn needs_reset(&self) -> bool {
        self.schema_version != SCHEMA_VERSION
    }

    pub fn push(&mut self, entry: FeedbackEntry) {
        self.entries.push(entry);
        if self.entries.len() > MAX_FEEDBACK_ENTRIES {
            let excess = self.entries.len() - MAX_FEEDBACK_ENTRIES;
            self.entries.drain(..excess);
        }
    }
}
