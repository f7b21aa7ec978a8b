//! CSV readers for the inventory catalog and the order feed.
//!
//! Both sources are comma-delimited with double-quoted fields and are encoded
//! as ISO-8859-1. Rows are read lazily and may have any number of fields.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::types::{CatalogError, InventoryRecord, OrderRecord};

/// Decode an ISO-8859-1 byte string. Every byte maps to the code point of
/// the same value, so decoding cannot fail.
fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Lazy iterator over the raw fields of each row.
pub struct CsvRows<R: Read> {
    records: csv::ByteRecordsIntoIter<R>,
    row: usize,
}

impl<R: Read> CsvRows<R> {
    pub fn from_reader(reader: R) -> Self {
        let records = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(b',')
            .quote(b'"')
            .from_reader(reader)
            .into_byte_records();

        Self { records, row: 0 }
    }
}

impl CsvRows<File> {
    pub fn open(path: &Path) -> Result<Self, CatalogError> {
        let file = File::open(path).map_err(|e| CatalogError::Open {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Self::from_reader(file))
    }
}

impl<R: Read> Iterator for CsvRows<R> {
    type Item = Result<(usize, Vec<String>), CatalogError>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.records.next()?;
        let row = self.row;
        self.row += 1;

        Some(
            record
                .map(|r| (row, r.iter().map(decode_latin1).collect()))
                .map_err(|e| CatalogError::Read { row, source: e }),
        )
    }
}

/// Lazy iterator over inventory rows.
pub struct InventoryRows<R: Read> {
    rows: CsvRows<R>,
}

impl<R: Read> InventoryRows<R> {
    pub fn from_reader(reader: R) -> Self {
        Self {
            rows: CsvRows::from_reader(reader),
        }
    }
}

impl InventoryRows<File> {
    pub fn open(path: &Path) -> Result<Self, CatalogError> {
        Ok(Self {
            rows: CsvRows::open(path)?,
        })
    }
}

impl<R: Read> Iterator for InventoryRows<R> {
    type Item = Result<InventoryRecord, CatalogError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.rows
            .next()
            .map(|r| r.map(|(_, fields)| InventoryRecord::from_fields(&fields)))
    }
}

/// Lazy iterator over order rows.
///
/// Banner rows are yielded like any other row; skipping them is up to the
/// consumer.
pub struct OrderRows<R: Read> {
    rows: CsvRows<R>,
}

impl<R: Read> OrderRows<R> {
    pub fn from_reader(reader: R) -> Self {
        Self {
            rows: CsvRows::from_reader(reader),
        }
    }
}

impl OrderRows<File> {
    pub fn open(path: &Path) -> Result<Self, CatalogError> {
        Ok(Self {
            rows: CsvRows::open(path)?,
        })
    }
}

impl<R: Read> Iterator for OrderRows<R> {
    type Item = Result<OrderRecord, CatalogError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.rows
            .next()
            .map(|r| r.map(|(row, fields)| OrderRecord::from_fields(row, &fields)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SourceKind;
    use std::io::Cursor;
    use tempfile::TempDir;

    #[test]
    fn test_quoted_fields_with_commas() {
        let data = "\"X1\",\"http://a/1.jpg|http://a/2,b.jpg\",\"sc\"\n";
        let records: Vec<_> = InventoryRows::from_reader(Cursor::new(data))
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].sku, "X1");
        assert_eq!(records[0].image_refs[1], "http://a/2,b.jpg");
        assert_eq!(records[0].source_kind, SourceKind::SingleRemote);
    }

    #[test]
    fn test_latin1_bytes_decode() {
        let data: &[u8] = b"caf\xe9,ref.jpg,rp\n";
        let records: Vec<_> = InventoryRows::from_reader(Cursor::new(data))
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(records[0].sku, "caf\u{e9}");
        assert_eq!(records[0].source_kind, SourceKind::LocalPrimary);
    }

    #[test]
    fn test_rows_of_varying_width() {
        let data = "Sales report\n03/14/2024,9:05 PM,ORD-1,A1 B2,extra\n03/14/2024,9:06 PM\n";
        let orders: Vec<_> = OrderRows::from_reader(Cursor::new(data))
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(orders.len(), 3);
        assert_eq!(orders[0].date.as_deref(), Some("Sales report"));
        assert!(orders[0].order_id.is_none());
        assert_eq!(orders[1].row, 1);
        assert_eq!(orders[1].sku_tokens(), vec!["A1", "B2"]);
        assert!(orders[2].order_id.is_none());
    }

    #[test]
    fn test_open_missing_file() {
        let temp = TempDir::new().unwrap();
        let result = OrderRows::open(&temp.path().join("order.csv"));
        assert!(matches!(result, Err(CatalogError::Open { .. })));
    }

    #[test]
    fn test_open_reads_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("inventory.csv");
        std::fs::write(&path, "A1,a.jpg,rp\nB2,b.jpg,rs\n").unwrap();

        let records: Vec<_> = InventoryRows::open(&path)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].source_kind, SourceKind::LocalSecondary);
    }
}
