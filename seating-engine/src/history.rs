//! Linear undo/redo history over full plan snapshots
//!
//! `entries[..cursor]` are states that can be returned to with undo. A
//! command pushes the state as it was *before* it committed. The first undo
//! after a commit also records the live state as the tip so that redo can
//! return to it. Pushing while the cursor is behind the tip discards the
//! redo branch.

use shared::types::Timestamp;
use shared::util::now_millis;

/// Default number of undo steps kept
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// One immutable snapshot
#[derive(Debug, Clone)]
pub struct HistoryEntry<T> {
    pub snapshot: T,
    /// Command that produced the next state
    pub label: String,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct History<T> {
    entries: Vec<HistoryEntry<T>>,
    cursor: usize,
    limit: usize,
}

impl<T: Clone> History<T> {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            cursor: 0,
            limit: limit.max(1),
        }
    }

    /// Record the pre-mutation state
    pub fn push(&mut self, before: T, label: impl Into<String>) {
        self.entries.truncate(self.cursor);
        self.entries.push(HistoryEntry {
            snapshot: before,
            label: label.into(),
            created_at: now_millis(),
        });
        if self.entries.len() > self.limit {
            let overflow = self.entries.len() - self.limit;
            self.entries.drain(..overflow);
            tracing::debug!(dropped = overflow, "History limit reached, oldest entries dropped");
        }
        self.cursor = self.entries.len();
    }

    /// Step back; `current` is the live state, kept as the redo tip
    ///
    /// Returns `None` (and changes nothing) at the start of history.
    pub fn undo(&mut self, current: T) -> Option<T> {
        if self.cursor == 0 {
            return None;
        }
        if self.cursor == self.entries.len() {
            let label = self
                .entries
                .last()
                .map(|e| e.label.clone())
                .unwrap_or_default();
            self.entries.push(HistoryEntry {
                snapshot: current,
                label,
                created_at: now_millis(),
            });
        }
        self.cursor -= 1;
        Some(self.entries[self.cursor].snapshot.clone())
    }

    /// Step forward; `None` at the tip
    pub fn redo(&mut self) -> Option<T> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        Some(self.entries[self.cursor].snapshot.clone())
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Label of the command the next undo reverts
    pub fn undo_label(&self) -> Option<&str> {
        self.cursor
            .checked_sub(1)
            .and_then(|i| self.entries.get(i))
            .map(|e| e.label.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }
}

impl<T: Clone> Default for History<T> {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_history_is_inert() {
        let mut h: History<i32> = History::default();
        assert!(!h.can_undo());
        assert!(!h.can_redo());
        assert_eq!(h.undo(5), None);
        assert_eq!(h.redo(), None);
        assert!(h.is_empty());
    }

    #[test]
    fn test_round_trip() {
        let mut h = History::new(10);
        let mut state = vec![1];

        h.push(state.clone(), "add");
        state.push(2);

        let restored = h.undo(state.clone()).unwrap();
        assert_eq!(restored, vec![1]);
        assert!(h.can_redo());

        let redone = h.redo().unwrap();
        assert_eq!(redone, vec![1, 2]);
        assert!(!h.can_redo());
        assert!(h.can_undo());
    }

    #[test]
    fn test_multiple_steps() {
        let mut h = History::new(10);
        h.push(0, "a");
        h.push(1, "b");
        h.push(2, "c");
        // live state is 3
        assert_eq!(h.undo(3), Some(2));
        assert_eq!(h.undo(2), Some(1));
        assert_eq!(h.undo(1), Some(0));
        assert_eq!(h.undo(0), None);
        assert_eq!(h.redo(), Some(1));
        assert_eq!(h.redo(), Some(2));
        assert_eq!(h.redo(), Some(3));
        assert_eq!(h.redo(), None);
        assert_eq!(h.undo(3), Some(2));
    }

    #[test]
    fn test_push_after_undo_discards_redo() {
        let mut h = History::new(10);
        h.push("s0", "first");
        let s1 = "s1";
        assert_eq!(h.undo(s1), Some("s0"));

        h.push("s0", "second");
        assert!(!h.can_redo());
        assert_eq!(h.redo(), None);
        assert_eq!(h.undo("s2"), Some("s0"));
        assert_eq!(h.redo(), Some("s2"));
    }

    #[test]
    fn test_limit_drops_oldest() {
        let mut h = History::new(3);
        for i in 0..5 {
            h.push(i, format!("step {i}"));
        }
        assert_eq!(h.len(), 3);
        assert_eq!(h.undo_label(), Some("step 4"));
        assert_eq!(h.undo(5), Some(4));
        assert_eq!(h.undo(4), Some(3));
        assert_eq!(h.undo(3), Some(2));
        assert_eq!(h.undo(2), None);
    }

    #[test]
    fn test_snapshots_are_independent_copies() {
        let mut h = History::new(10);
        let mut state = vec![String::from("mesa")];
        h.push(state.clone(), "edit");
        state[0].push_str(" 1");
        assert_eq!(h.undo(state.clone()).unwrap(), vec![String::from("mesa")]);
    }

    #[test]
    fn test_clear() {
        let mut h = History::new(10);
        h.push(1, "x");
        h.clear();
        assert!(!h.can_undo());
        assert_eq!(h.limit(), 10);
    }
}
