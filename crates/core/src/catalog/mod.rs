//! Inventory catalog and order feed.
//!
//! The inventory maps SKUs to image references and the strategy used to
//! acquire them. It is loaded once per run and searched by SKU for every
//! order line. The order feed is consumed once, front to back.

mod loader;
mod types;

pub use loader::{CsvRows, InventoryRows, OrderRows};
pub use types::*;

use std::collections::HashMap;
use std::path::Path;

/// In-memory inventory supporting repeated keyed lookup.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    records: Vec<InventoryRecord>,
}

impl Inventory {
    pub fn new(records: Vec<InventoryRecord>) -> Self {
        Self { records }
    }

    /// Read every inventory row from a CSV file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let records = InventoryRows::open(path)?.collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(records))
    }

    /// Find the entry for a SKU by exact match.
    ///
    /// When the catalog holds duplicates the first one wins.
    pub fn lookup(&self, sku: &str) -> Option<&InventoryRecord> {
        self.records.iter().find(|r| r.sku == sku)
    }

    /// SKUs listed more than once, with their occurrence count, in order of
    /// first appearance.
    pub fn duplicate_skus(&self) -> Vec<(&str, usize)> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        let mut order = Vec::new();
        for record in &self.records {
            let count = counts.entry(record.sku.as_str()).or_insert(0);
            if *count == 0 {
                order.push(record.sku.as_str());
            }
            *count += 1;
        }

        order
            .into_iter()
            .filter_map(|sku| counts.get(sku).filter(|&&c| c > 1).map(|&c| (sku, c)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<InventoryRecord> for Inventory {
    fn from_iter<I: IntoIterator<Item = InventoryRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(sku: &str, image: &str, kind: SourceKind) -> InventoryRecord {
        InventoryRecord {
            sku: sku.to_string(),
            image_refs: vec![image.to_string()],
            source_kind: kind,
        }
    }

    #[test]
    fn test_lookup_first_match_wins() {
        let inventory: Inventory = vec![
            record("A1", "first.jpg", SourceKind::LocalPrimary),
            record("B2", "other.jpg", SourceKind::SingleRemote),
            record("A1", "second.jpg", SourceKind::MultiRemote),
        ]
        .into_iter()
        .collect();

        let found = inventory.lookup("A1").unwrap();
        assert_eq!(found.image_refs, vec!["first.jpg"]);
        assert_eq!(found.source_kind, SourceKind::LocalPrimary);
    }

    #[test]
    fn test_lookup_is_exact() {
        let inventory = Inventory::new(vec![record("A1", "a.jpg", SourceKind::MultiRemote)]);
        assert!(inventory.lookup("a1").is_none());
        assert!(inventory.lookup("A").is_none());
        assert!(inventory.lookup("A1").is_some());
    }

    #[test]
    fn test_duplicate_skus() {
        let inventory = Inventory::new(vec![
            record("A1", "a.jpg", SourceKind::MultiRemote),
            record("B2", "b.jpg", SourceKind::MultiRemote),
            record("A1", "c.jpg", SourceKind::MultiRemote),
            record("C3", "d.jpg", SourceKind::MultiRemote),
            record("A1", "e.jpg", SourceKind::MultiRemote),
            record("C3", "f.jpg", SourceKind::MultiRemote),
        ]);
        assert_eq!(inventory.duplicate_skus(), vec![("A1", 3), ("C3", 2)]);
    }

    #[test]
    fn test_load_from_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("inventory.csv");
        std::fs::write(&path, "A1,http://x/a.jpg|http://x/b.jpg,mr\nB2,,sc\n").unwrap();

        let inventory = Inventory::load(&path).unwrap();
        assert_eq!(inventory.len(), 2);
        assert_eq!(inventory.lookup("A1").unwrap().image_refs.len(), 2);
        assert!(inventory.lookup("B2").unwrap().image_refs.is_empty());
    }
}
