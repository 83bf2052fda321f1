use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::alert::AlertThreshold;
use super::domain::ClientRecord;
use super::scorer::round_projection;

/// A client record together with its stored (cent-rounded) projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredClient {
    #[serde(flatten)]
    pub record: ClientRecord,
    pub projection: f64,
}

impl ScoredClient {
    pub fn new(record: ClientRecord, raw_projection: f64) -> Self {
        Self {
            record,
            projection: round_projection(raw_projection),
        }
    }

    pub fn name(&self) -> &str {
        &self.record.name
    }

    /// Recomputed on every call so a changed threshold is never missed.
    pub fn alert_triggered(&self, threshold: AlertThreshold) -> bool {
        threshold.is_exceeded_by(self.projection)
    }
}

/// Ordered collection of scored clients, unique by name.
///
/// Merges append and then collapse duplicates onto their most recent
/// occurrence, so re-ingesting a client replaces the earlier entry and moves
/// it to the position of the newer one.
#[derive(Debug, Default, Clone)]
pub struct ClientLedger {
    entries: Vec<ScoredClient>,
}

impl ClientLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge_batch<I>(&mut self, records: I)
    where
        I: IntoIterator<Item = ScoredClient>,
    {
        self.entries.extend(records);

        let mut seen = HashSet::with_capacity(self.entries.len());
        let mut kept: Vec<ScoredClient> = self
            .entries
            .drain(..)
            .rev()
            .filter(|entry| seen.insert(entry.record.name.clone()))
            .collect();
        kept.reverse();
        self.entries = kept;
    }

    pub fn merge_one(&mut self, record: ScoredClient) {
        self.merge_batch(std::iter::once(record));
    }

    /// Drops every entry, returning how many were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        removed
    }

    pub fn entries(&self) -> &[ScoredClient] {
        &self.entries
    }

    pub fn get(&self, name: &str) -> Option<&ScoredClient> {
        self.entries.iter().find(|entry| entry.name() == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::projection::domain::Category;
    use std::collections::BTreeSet;

    fn scored(name: &str, projection: f64) -> ScoredClient {
        ScoredClient::new(
            ClientRecord {
                name: name.to_string(),
                income: 10_000.0,
                deduction: 0.0,
                asset_value: 0.0,
                category: Category::Autonomo,
                tax_types: BTreeSet::new(),
                deduction_types: BTreeSet::new(),
                income_types: BTreeSet::new(),
            },
            projection,
        )
    }

    fn names(ledger: &ClientLedger) -> Vec<&str> {
        ledger.entries().iter().map(ScoredClient::name).collect()
    }

    #[test]
    fn merge_keeps_last_occurrence_per_name() {
        let mut ledger = ClientLedger::new();
        ledger.merge_one(scored("Ana", 100.0));
        ledger.merge_one(scored("Ana", 250.0));

        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.get("Ana").map(|entry| entry.projection), Some(250.0));
    }

    #[test]
    fn duplicates_collapse_to_their_last_position() {
        let mut ledger = ClientLedger::new();
        ledger.merge_batch(vec![scored("Ana", 1.0), scored("Bruno", 2.0), scored("Carla", 3.0)]);
        ledger.merge_batch(vec![scored("Dario", 4.0), scored("Ana", 5.0)]);

        assert_eq!(names(&ledger), vec!["Bruno", "Carla", "Dario", "Ana"]);
        assert_eq!(ledger.get("Ana").map(|entry| entry.projection), Some(5.0));
    }

    #[test]
    fn duplicates_within_one_batch_resolve_to_the_later_row() {
        let mut ledger = ClientLedger::new();
        ledger.merge_batch(vec![scored("Ana", 1.0), scored("Bruno", 2.0), scored("Ana", 3.0)]);

        assert_eq!(names(&ledger), vec!["Bruno", "Ana"]);
        assert_eq!(ledger.get("Ana").map(|entry| entry.projection), Some(3.0));
    }

    #[test]
    fn clear_resets_the_ledger() {
        let mut ledger = ClientLedger::new();
        ledger.merge_batch(vec![scored("Ana", 1.0), scored("Bruno", 2.0)]);

        assert_eq!(ledger.clear(), 2);
        assert!(ledger.is_empty());
    }

    #[test]
    fn stores_rounded_projection_and_derives_alerts() {
        let entry = scored("Ana", 100_000.004);
        assert_eq!(entry.projection, 100_000.0);
        assert!(!entry.alert_triggered(AlertThreshold::default()));

        let lower = AlertThreshold::new(50_000.0).expect("valid threshold");
        assert!(entry.alert_triggered(lower));
    }
}
