//! In-memory record store.
//!
//! A `RecordStore` holds the committed records of one kind, newest first, and
//! owns the counter that numbers new records. Records only change through
//! [`crate::editor::commit`]; there is no delete.

use serde::Serialize;

use crate::config::RecordsConfig;
use crate::record::{Candidate, Defect, Record};
use crate::seed;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordStore<R: Record> {
    records: Vec<R>,
    prefix: String,
    width: usize,
    next_seq: u32,
}

/// Where a commit landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CommitOutcome {
    Replaced { index: usize },
    Inserted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: &'static str,
    pub count: usize,
}

impl<R: Record> RecordStore<R> {
    pub fn new(prefix: impl Into<String>, width: usize) -> Self {
        Self::with_records(prefix, width, Vec::new())
    }

    /// Build a store around existing records. The id counter starts after the
    /// highest numbered id carrying this store's prefix.
    pub fn with_records(prefix: impl Into<String>, width: usize, records: Vec<R>) -> Self {
        let prefix = prefix.into();
        let highest = records
            .iter()
            .filter_map(|record| sequence_of(&prefix, record.id()))
            .max()
            .unwrap_or(0);
        Self {
            records,
            prefix,
            width,
            next_seq: highest.saturating_add(1),
        }
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&R> {
        self.records.iter().find(|record| record.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Hand out the next record id. Ids are never handed out twice, even if the
    /// draft that received one is discarded.
    pub fn allocate_id(&mut self) -> String {
        loop {
            let id = format!("{}-{:0width$}", self.prefix, self.next_seq, width = self.width);
            self.next_seq = self.next_seq.saturating_add(1);
            if !self.contains(&id) {
                return id;
            }
        }
    }

    /// Replace the record with the same id in place, or put it first.
    pub(crate) fn commit(&mut self, record: R) -> CommitOutcome {
        match self
            .records
            .iter()
            .position(|existing| existing.id() == record.id())
        {
            Some(index) => {
                self.records[index] = record;
                CommitOutcome::Replaced { index }
            }
            None => {
                if let Some(seq) = sequence_of(&self.prefix, record.id()) {
                    self.next_seq = self.next_seq.max(seq.saturating_add(1));
                }
                self.records.insert(0, record);
                CommitOutcome::Inserted
            }
        }
    }

    /// Count of records per status, for every status including empty ones.
    pub fn status_breakdown(&self) -> Vec<StatusCount> {
        R::status_labels()
            .into_iter()
            .map(|status| StatusCount {
                status,
                count: self
                    .records
                    .iter()
                    .filter(|record| record.status_label() == status)
                    .count(),
            })
            .collect()
    }
}

impl RecordStore<Defect> {
    pub fn defects(config: &RecordsConfig) -> Self {
        let records = if config.seed { seed::defects() } else { Vec::new() };
        Self::with_records(config.defect_prefix.trim(), config.id_width, records)
    }
}

impl RecordStore<Candidate> {
    pub fn candidates(config: &RecordsConfig) -> Self {
        let records = if config.seed {
            seed::candidates()
        } else {
            Vec::new()
        };
        Self::with_records(config.candidate_prefix.trim(), config.id_width, records)
    }
}

fn sequence_of(prefix: &str, id: &str) -> Option<u32> {
    id.strip_prefix(prefix)?.strip_prefix('-')?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::DefectStatus;
    use crate::task::today;

    fn defect(id: &str) -> Defect {
        Defect::blank(id.to_string(), today())
    }

    #[test]
    fn empty_store_numbers_from_one() {
        let mut store: RecordStore<Defect> = RecordStore::new("DEF", 3);
        assert_eq!(store.allocate_id(), "DEF-001");
        assert_eq!(store.allocate_id(), "DEF-002");
    }

    #[test]
    fn counter_starts_after_highest_existing_id() {
        let mut store = RecordStore::with_records("CAN", 3, vec![
            Candidate::blank("CAN-101".to_string(), today()),
            Candidate::blank("CAN-102".to_string(), today()),
        ]);
        assert_eq!(store.allocate_id(), "CAN-103");
    }

    #[test]
    fn commit_replaces_in_place() {
        let mut store = RecordStore::with_records("DEF", 3, vec![defect("DEF-002"), defect("DEF-001")]);
        let mut changed = defect("DEF-001");
        changed.status = DefectStatus::Resolved;
        assert_eq!(store.commit(changed), CommitOutcome::Replaced { index: 1 });
        assert_eq!(store.len(), 2);
        assert_eq!(store.records()[0].id, "DEF-002");
        assert_eq!(store.records()[1].status, DefectStatus::Resolved);
    }

    #[test]
    fn commit_prepends_new_records() {
        let mut store = RecordStore::with_records("DEF", 3, vec![defect("DEF-001")]);
        assert_eq!(store.commit(defect("DEF-005")), CommitOutcome::Inserted);
        assert_eq!(store.records()[0].id, "DEF-005");
        assert_eq!(store.allocate_id(), "DEF-006");
    }

    #[test]
    fn breakdown_lists_every_status() {
        let store = RecordStore::defects(&RecordsConfig::default());
        let breakdown = store.status_breakdown();
        let labels: Vec<_> = breakdown.iter().map(|entry| entry.status).collect();
        assert_eq!(labels, vec!["New", "In Progress", "Resolved"]);
        let counts: Vec<_> = breakdown.iter().map(|entry| entry.count).collect();
        assert_eq!(counts, vec![1, 1, 0]);
    }
}
