//! Undo/redo history of generation parameters.
//!
//! A linear stack of `(text, options)` snapshots with a cursor. New
//! entries appended while the cursor sits in the middle of the stack
//! prune everything after it (branch-and-prune, not a tree).
//!
//! ```text
//!   entries:  [ e0 | e1 | e2 | e3 ]
//!                       ▲
//!                     cursor = 2      append(e4) → [ e0 | e1 | e2 | e4 ]
//! ```
//!
//! The manager never re-runs composition itself. [`HistoryManager::replay`]
//! hands back a [`Snapshot`]; the caller composes it and then calls
//! [`HistoryManager::append`] as usual, which the pending replay flag
//! turns into a no-op so replays don't record themselves.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::StyleOptions;

/// Default number of entries kept before the oldest is dropped.
pub const DEFAULT_CAPACITY: usize = 100;

/// The restorable part of a history entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub text: String,
    pub options: StyleOptions,
    pub preset: Option<String>,
}

/// One recorded generation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub text: String,
    pub options: StyleOptions,
    /// Preset the options came from, if any.
    pub preset: Option<String>,
}

impl HistoryEntry {
    pub fn new(text: impl Into<String>, options: StyleOptions) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            options,
            preset: None,
        }
    }

    pub fn with_preset(mut self, preset: impl Into<String>) -> Self {
        self.preset = Some(preset.into());
        self
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: snapshot.text,
            options: snapshot.options,
            preset: snapshot.preset,
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            text: self.text.clone(),
            options: self.options.clone(),
            preset: self.preset.clone(),
        }
    }
}

/// Linear undo/redo stack.
#[derive(Debug)]
pub struct HistoryManager {
    entries: VecDeque<HistoryEntry>,
    /// `None` iff `entries` is empty.
    cursor: Option<usize>,
    /// Set by `replay`, consumed by the next `append`.
    replaying: bool,
    capacity: usize,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryManager {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// History that keeps at most `capacity` entries (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity.min(128)),
            cursor: None,
            replaying: false,
            capacity,
        }
    }

    // ---------------------------------------------------------------
    // Mutation
    // ---------------------------------------------------------------

    /// Record a generation.
    ///
    /// If the generation being recorded is the result of a replay, the
    /// replay flag is consumed and nothing is appended. Returns whether
    /// the entry was recorded.
    pub fn append(&mut self, entry: HistoryEntry) -> bool {
        if self.replaying {
            self.replaying = false;
            log::trace!("History: skipped append of replayed snapshot");
            return false;
        }

        if let Some(cursor) = self.cursor {
            self.entries.truncate(cursor + 1);
        }
        self.entries.push_back(entry);

        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        self.cursor = Some(self.entries.len() - 1);
        true
    }

    /// Move the cursor to `target` and return the snapshot stored there.
    ///
    /// Out-of-range targets and the current cursor position are ignored
    /// (`None`, no state change).
    pub fn replay(&mut self, target: usize) -> Option<Snapshot> {
        if target >= self.entries.len() || Some(target) == self.cursor {
            return None;
        }
        self.replaying = true;
        self.cursor = Some(target);
        self.entries.get(target).map(HistoryEntry::snapshot)
    }

    /// Step back one entry.
    pub fn undo(&mut self) -> Option<Snapshot> {
        let target = self.cursor?.checked_sub(1)?;
        self.replay(target)
    }

    /// Step forward one entry.
    pub fn redo(&mut self) -> Option<Snapshot> {
        let target = self.cursor? + 1;
        self.replay(target)
    }

    /// Drop every entry after the cursor without appending. This is the
    /// explicit way to discard the redo tail after a replay.
    pub fn truncate_to_cursor(&mut self) {
        if let Some(cursor) = self.cursor {
            self.entries.truncate(cursor + 1);
        }
    }

    /// Forget a pending replay without appending.
    pub fn cancel_replay(&mut self) {
        self.replaying = false;
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = None;
        self.replaying = false;
    }

    // ---------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------

    /// Cursor position, `-1` when the history is empty.
    pub fn cursor(&self) -> isize {
        self.cursor.map_or(-1, |c| c as isize)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entry under the cursor.
    pub fn current(&self) -> Option<&HistoryEntry> {
        self.cursor.and_then(|c| self.entries.get(c))
    }

    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn can_undo(&self) -> bool {
        matches!(self.cursor, Some(c) if c > 0)
    }

    pub fn can_redo(&self) -> bool {
        matches!(self.cursor, Some(c) if c + 1 < self.entries.len())
    }

    /// Whether a replay is waiting for its append to be consumed.
    pub fn is_replaying(&self) -> bool {
        self.replaying
    }
}

// ===================================================================
// Tests
// ===================================================================
