use serde::{Deserialize, Serialize};

use crate::llm::types::ContentBlock;

/// The content blocks of one model response, kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub ts: i64,
    pub blocks: Vec<ContentBlock>,
}

impl HistoryEntry {
    pub fn new(blocks: Vec<ContentBlock>) -> Self {
        Self {
            ts: chrono::Utc::now().timestamp_millis(),
            blocks,
        }
    }
}

/// Append-only record of every model response in the run.
///
/// Entries are never removed or reordered. There is no size bound, so a very
/// long run grows every request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    entries: Vec<HistoryEntry>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns this ledger with `entry` appended.
    pub fn append(mut self, entry: HistoryEntry) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All blocks across all entries, in the order they were received.
    pub fn blocks(&self) -> impl Iterator<Item = &ContentBlock> {
        self.entries.iter().flat_map(|e| e.blocks.iter())
    }

    /// The text handed back to the model: its own earlier blocks as a JSON array.
    pub fn render(&self) -> String {
        let blocks: Vec<&ContentBlock> = self.blocks().collect();
        serde_json::to_string(&blocks).unwrap_or_else(|_| "[]".to_string())
    }
}
