//! History timeline: full-state snapshots with a movable cursor.
//!
//! DESIGN
//! ======
//! Every committed mutation records a deep copy of the whole editor state.
//! The cursor points at the entry matching the live state; entries before it
//! are undo targets, entries after it are redo targets. Recording while the
//! cursor is not at the end discards the redo branch (linear undo).
//!
//! Entries own their snapshots outright, so later edits to the live state can
//! never reach back into a recorded entry.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::consts::HISTORY_LIMIT;
use crate::state::EditorState;

/// One immutable point on the timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    /// Short description of the mutation that produced this state.
    pub action: String,
    /// Milliseconds since the Unix epoch when the entry was recorded.
    pub timestamp: i64,
    /// Full copy of the blocks and layout after the mutation.
    pub snapshot: EditorState,
    /// Optional rendered preview supplied by the host (e.g. a data URL).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
}

/// Lightweight view of an entry for timeline UIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistorySummary {
    pub index: usize,
    pub action: String,
    pub timestamp: i64,
    pub has_preview: bool,
    pub is_current: bool,
}

/// Ordered entries plus a cursor.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<HistoryEntry>,
    index: usize,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(HISTORY_LIMIT)
    }
}

fn now_ms() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}

impl History {
    /// Empty timeline keeping at most `limit` entries (minimum 1).
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self { entries: Vec::new(), index: 0, limit: limit.max(1) }
    }

    /// Append a snapshot of `state`, discarding any redo branch.
    pub fn record(&mut self, action: impl Into<String>, state: &EditorState, preview: Option<String>) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.index + 1);
        }
        self.entries.push(HistoryEntry {
            action: action.into(),
            timestamp: now_ms(),
            snapshot: state.clone(),
            preview,
        });
        if self.entries.len() > self.limit {
            let overflow = self.entries.len() - self.limit;
            self.entries.drain(0..overflow);
        }
        self.index = self.entries.len() - 1;
    }

    /// Step back one entry. Returns the snapshot to restore, or `None` at the start.
    pub fn undo(&mut self) -> Option<&EditorState> {
        if !self.can_undo() {
            return None;
        }
        self.index -= 1;
        self.entries.get(self.index).map(|e| &e.snapshot)
    }

    /// Step forward one entry. Returns the snapshot to restore, or `None` at the end.
    pub fn redo(&mut self) -> Option<&EditorState> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        self.entries.get(self.index).map(|e| &e.snapshot)
    }

    /// Jump to entry `i`. Out-of-range indexes leave the cursor untouched.
    pub fn go_to(&mut self, i: usize) -> Option<&EditorState> {
        if i >= self.entries.len() {
            return None;
        }
        self.index = i;
        self.entries.get(i).map(|e| &e.snapshot)
    }

    /// Whether there is an older entry to move to.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.entries.is_empty() && self.index > 0
    }

    /// Whether there is a newer entry to move to.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    /// Cursor position, or `None` when nothing has been recorded.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        if self.entries.is_empty() { None } else { Some(self.index) }
    }

    /// Entry under the cursor.
    #[must_use]
    pub fn current(&self) -> Option<&HistoryEntry> {
        self.entries.get(self.index)
    }

    /// Entry at `i`.
    #[must_use]
    pub fn entry(&self, i: usize) -> Option<&HistoryEntry> {
        self.entries.get(i)
    }

    /// Summaries of every entry, oldest first.
    #[must_use]
    pub fn list(&self) -> Vec<HistorySummary> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| HistorySummary {
                index: i,
                action: e.action.clone(),
                timestamp: e.timestamp,
                has_preview: e.preview.is_some(),
                is_current: i == self.index,
            })
            .collect()
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index = 0;
    }

    /// Drop every entry and start over from `state`.
    pub fn reset(&mut self, action: impl Into<String>, state: &EditorState) {
        self.clear();
        self.record(action, state, None);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum retained entries.
    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }
}
