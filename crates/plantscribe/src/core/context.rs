//! Per-request context shared by the classifier and the builder

use serde::{Deserialize, Serialize};

use super::types::DiagramType;

/// One earlier turn of the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<DiagramType>,
}

impl HistoryEntry {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            intent: None,
        }
    }

    pub fn classified(text: impl Into<String>, intent: DiagramType) -> Self {
        Self {
            text: text.into(),
            intent: Some(intent),
        }
    }
}

/// Optional caller context: who is asking and what was said before
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestContext {
    #[serde(default)]
    pub user_id: Option<String>,
    /// Oldest first
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            history: Vec::new(),
        }
    }

    pub fn with_history(mut self, entry: HistoryEntry) -> Self {
        self.history.push(entry);
        self
    }

    /// The most recent `limit` entries, oldest first
    pub fn recent(&self, limit: usize) -> &[HistoryEntry] {
        let start = self.history.len().saturating_sub(limit);
        &self.history[start..]
    }

    /// Intent of the latest entry that carries one
    pub fn last_intent(&self) -> Option<DiagramType> {
        self.history.iter().rev().find_map(|entry| entry.intent)
    }
}
