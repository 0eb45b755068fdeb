//! History snapshots and the undo/redo stack pair.
//!
//! [`HistorySnapshot`] is a value copy (memento) of the history sequence at
//! one point in time, never an alias of the live sequence. The stacks own
//! their snapshots exclusively; restoring copies the sequence back out.
//!
//! # Invariants
//!
//! 1. A new write clears the redo stack (branches cannot be redone).
//! 2. Every undo/redo transition pushes the pre-transition state onto the
//!    opposite stack before overwriting, so no data is ever lost.
//!
//! ```text
//! perform() x3            undo() x2               perform()
//! ┌──────────────┐        ┌──────────────┐        ┌──────────────┐
//! │ undo: s0 s1 s2│       │ undo: s0     │        │ undo: s0 s1' │
//! │ redo:         │  ───► │ redo: c2 c1  │  ───►  │ redo:        │
//! └──────────────┘        └──────────────┘        └──────────────┘
//! ```

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tally_core::{CalcRow, Calculation, OpRegistry, Result};

/// A saved copy of the history sequence plus its creation time.
#[derive(Debug, Clone, PartialEq)]
pub struct HistorySnapshot {
    history: Vec<Calculation>,
    timestamp: NaiveDateTime,
}

impl HistorySnapshot {
    /// Copy the given history into a new snapshot.
    #[must_use]
    pub fn capture(history: &[Calculation]) -> Self {
        Self {
            history: history.to_vec(),
            timestamp: Local::now().naive_local(),
        }
    }

    #[must_use]
    pub fn history(&self) -> &[Calculation] {
        &self.history
    }

    #[must_use]
    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.history.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Consume the snapshot, yielding an owned history sequence.
    #[must_use]
    pub fn into_history(self) -> Vec<Calculation> {
        self.history
    }

    /// Serialized form: the same nested row structure as top-level history
    /// persistence.
    #[must_use]
    pub fn to_rows(&self) -> SnapshotRows {
        SnapshotRows {
            history: self.history.iter().map(Calculation::to_row).collect(),
            timestamp: self.timestamp.format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
        }
    }

    /// Restore from serialized rows, recomputing every record through the
    /// registry. Row-level failures surface as `InvalidPersistedData`.
    pub fn from_rows(rows: &SnapshotRows, registry: &OpRegistry) -> Result<Self> {
        let history = rows
            .history
            .iter()
            .map(|row| Calculation::from_row(row, registry))
            .collect::<Result<Vec<_>>>()?;
        let timestamp = NaiveDateTime::parse_from_str(&rows.timestamp, "%Y-%m-%dT%H:%M:%S%.6f")
            .or_else(|_| rows.timestamp.parse::<NaiveDateTime>())
            .map_err(|e| {
                tally_core::CalcError::persisted(format!(
                    "bad snapshot timestamp '{}': {e}",
                    rows.timestamp
                ))
            })?;
        Ok(Self { history, timestamp })
    }
}

/// Wire form of a snapshot: nested calculation rows plus a timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SnapshotRows {
    pub history: Vec<CalcRow>,
    pub timestamp: String,
}

/// The undo/redo LIFO pair.
///
/// Owns its snapshots exclusively. [`SnapshotStacks::push_undo`] is the
/// write path (clears redo); [`SnapshotStacks::undo_to`] and
/// [`SnapshotStacks::redo_to`] are the symmetric restore transitions.
#[derive(Debug, Clone, Default)]
pub struct SnapshotStacks {
    undo: Vec<HistorySnapshot>,
    redo: Vec<HistorySnapshot>,
}

impl SnapshotStacks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pre-mutation snapshot. New writes invalidate redo history.
    pub fn push_undo(&mut self, snapshot: HistorySnapshot) {
        self.undo.push(snapshot);
        self.redo.clear();
    }

    /// Pop the most recent undo snapshot, pushing a snapshot of `current`
    /// onto the redo stack first. Returns the restored history, or `None`
    /// when there is nothing to undo (state unchanged).
    pub fn undo_to(&mut self, current: &[Calculation]) -> Option<Vec<Calculation>> {
        let snapshot = self.undo.pop()?;
        self.redo.push(HistorySnapshot::capture(current));
        Some(snapshot.into_history())
    }

    /// Symmetric to [`SnapshotStacks::undo_to`].
    pub fn redo_to(&mut self, current: &[Calculation]) -> Option<Vec<Calculation>> {
        let snapshot = self.redo.pop()?;
        self.undo.push(HistorySnapshot::capture(current));
        Some(snapshot.into_history())
    }

    /// Empty both stacks.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rust_decimal::Decimal;
    use tally_core::operation::{Addition, Subtraction};

    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn calc(a: &str, b: &str) -> Calculation {
        Calculation::evaluate(&Addition, dec(a), dec(b)).unwrap()
    }

    #[test]
    fn capture_copies_rather_than_aliases() {
        let mut history = vec![calc("1", "1")];
        let snapshot = HistorySnapshot::capture(&history);
        history.push(calc("2", "2"));
        assert_eq!(snapshot.len(), 1);
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn empty_stacks_refuse_transitions() {
        let mut stacks = SnapshotStacks::new();
        assert!(stacks.undo_to(&[]).is_none());
        assert!(stacks.redo_to(&[]).is_none());
        assert!(!stacks.can_undo());
        assert!(!stacks.can_redo());
    }

    #[test]
    fn undo_pushes_current_state_to_redo() {
        let mut stacks = SnapshotStacks::new();
        stacks.push_undo(HistorySnapshot::capture(&[]));
        let current = vec![calc("1", "1")];

        let restored = stacks.undo_to(&current).unwrap();
        assert!(restored.is_empty());
        assert_eq!(stacks.redo_depth(), 1);

        let redone = stacks.redo_to(&restored).unwrap();
        assert_eq!(redone, current);
    }

    #[test]
    fn push_undo_clears_redo() {
        let mut stacks = SnapshotStacks::new();
        stacks.push_undo(HistorySnapshot::capture(&[]));
        stacks.undo_to(&[calc("1", "1")]);
        assert!(stacks.can_redo());

        stacks.push_undo(HistorySnapshot::capture(&[]));
        assert!(!stacks.can_redo());
    }

    #[test]
    fn clear_empties_both_stacks() {
        let mut stacks = SnapshotStacks::new();
        stacks.push_undo(HistorySnapshot::capture(&[]));
        stacks.undo_to(&[calc("1", "1")]);
        stacks.clear();
        assert_eq!(stacks.undo_depth(), 0);
        assert_eq!(stacks.redo_depth(), 0);
    }

    #[test]
    fn snapshot_rows_round_trip() {
        let registry = OpRegistry::with_builtins();
        let history = vec![
            calc("5", "10"),
            Calculation::evaluate(&Subtraction, dec("20"), dec("8")).unwrap(),
        ];
        let snapshot = HistorySnapshot::capture(&history);
        let rows = snapshot.to_rows();
        assert_eq!(rows.history.len(), 2);

        let restored = HistorySnapshot::from_rows(&rows, &registry).unwrap();
        assert_eq!(restored.history(), snapshot.history());
    }

    #[test]
    fn snapshot_restore_rejects_malformed_nested_rows() {
        let registry = OpRegistry::with_builtins();
        let snapshot = HistorySnapshot::capture(&[calc("1", "2")]);
        let mut rows = snapshot.to_rows();
        rows.history[0].operand1 = "garbage".to_string();
        let err = HistorySnapshot::from_rows(&rows, &registry).unwrap_err();
        assert!(matches!(
            err,
            tally_core::CalcError::InvalidPersistedData { .. }
        ));
    }

    #[test]
    fn snapshot_json_uses_nested_row_structure() {
        let snapshot = HistorySnapshot::capture(&[calc("5", "3")]);
        let json = serde_json::to_value(snapshot.to_rows()).unwrap();
        assert_eq!(json["history"][0]["operation"], "Addition");
        assert_eq!(json["history"][0]["result"], "8");
        assert!(json["timestamp"].is_string());
    }
}
