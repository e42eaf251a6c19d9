//! Per-period history of aggregate counts.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Counts observed at one point of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Time period the snapshot was taken in
    pub period: usize,
    /// Infected node count
    pub infected: usize,
    /// Inoculated node count
    pub inoculated: usize,
}

impl HistoryRecord {
    /// Create a record
    pub fn new(period: usize, infected: usize, inoculated: usize) -> Self {
        Self {
            period,
            infected,
            inoculated,
        }
    }
}

impl fmt::Display for HistoryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.period, self.infected, self.inoculated)
    }
}

/// Append-only sequence of [`HistoryRecord`]s.
///
/// The engine appends one record at the start of every period and a final
/// one after the loop exits; callers only get read access.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    records: Vec<HistoryRecord>,
}

impl History {
    /// Create an empty history
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, record: HistoryRecord) {
        debug_assert!(
            self.records.last().map_or(true, |last| record.period >= last.period),
            "history periods must not go backwards"
        );
        self.records.push(record);
    }

    /// All records in order
    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    /// Iterate records in order
    pub fn iter(&self) -> std::slice::Iter<'_, HistoryRecord> {
        self.records.iter()
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if no record was taken
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First record (the initial snapshot)
    pub fn first(&self) -> Option<&HistoryRecord> {
        self.records.first()
    }

    /// Last record (the final snapshot once a run completes)
    pub fn last(&self) -> Option<&HistoryRecord> {
        self.records.last()
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a HistoryRecord;
    type IntoIter = std::slice::Iter<'a, HistoryRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
