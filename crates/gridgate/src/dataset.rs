//! Dataset materialization
//!
//! A test-case sheet is a header row followed by one row per dataset.
//! [`materialize`] turns every data row into a [`Record`] mapping header to
//! cell text, in column order.

use serde::ser::{Serialize, Serializer};

use crate::lookup::RowNumber;
use crate::store::SheetStore;

/// One dataset: header -> value, in column order
///
/// Keys are unique. Inserting an existing key replaces its value but keeps
/// its original position, so a sheet with a repeated header keeps the first
/// position and the last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    entries: Vec<(String, String)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Insert a value, returning the one it replaced
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in column order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Entries in column order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

/// Read every data row of `sheet` as a record
///
/// A sheet with R rows (header included) and C header cells yields
/// `max(R - 1, 0)` records of C entries each. Keys come from the header row
/// and values from the data row, both read by column index with the
/// lenient API, so dates appear as `M/D/YY` and unreadable cells as their
/// placeholder text. A sheet without a header row yields records with no
/// entries. Nothing is cached; calling this twice gives equal results.
pub fn materialize(store: &SheetStore, sheet: &str) -> Vec<Record> {
    let rows = store.row_count(sheet);
    let columns = u16::try_from(store.column_count(sheet).max(0)).unwrap_or(u16::MAX);

    let keys: Vec<String> = (0..columns)
        .map(|col| store.cell_data_by_index(sheet, col, RowNumber::HEADER.into()))
        .collect();

    let records: Vec<Record> = (1..rows)
        .filter_map(RowNumber::from_data_ordinal)
        .map(|row| {
            let mut record = Record::with_capacity(keys.len());
            for (col, key) in keys.iter().enumerate() {
                let value = store.cell_data_by_index(sheet, col as u16, row.into());
                record.insert(key.as_str(), value);
            }
            record
        })
        .collect();

    log::debug!(
        "materialized {} records of {} columns from sheet '{}'",
        records.len(),
        columns,
        sheet
    );
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridgate_core::{CellError, CellValue, NumberFormat, Workbook};
    use pretty_assertions::assert_eq;

    fn store_with(name: &str, rows: &[&[&str]]) -> SheetStore {
        let mut wb = Workbook::empty();
        let idx = wb.add_worksheet_with_name(name).unwrap();
        let sheet = wb.worksheet_mut(idx).unwrap();
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                sheet
                    .set_cell_value_at(r as u32, c as u16, *value)
                    .unwrap();
            }
        }
        SheetStore::from_workbook(wb)
    }

    #[test]
    fn test_record_insert_keeps_first_position() {
        let mut record = Record::new();
        assert_eq!(record.insert("user", "a"), None);
        record.insert("pass", "b");
        assert_eq!(record.insert("user", "c"), Some("a".to_string()));

        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["user", "pass"]);
        assert_eq!(record.get("user"), Some("c"));
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn test_record_serializes_as_ordered_map() {
        let record: Record = [("username", "admin"), ("Runmode", "Y")].into_iter().collect();
        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"username":"admin","Runmode":"Y"}"#
        );
    }

    #[test]
    fn test_materialize_login_sheet() {
        let store = store_with(
            "TC_02",
            &[
                &["username", "password", "Runmode"],
                &["admin", "admin123", "Y"],
            ],
        );

        let records = materialize(&store, "TC_02");
        let expected: Record = [
            ("username", "admin"),
            ("password", "admin123"),
            ("Runmode", "Y"),
        ]
        .into_iter()
        .collect();
        assert_eq!(records, vec![expected]);
    }

    #[test]
    fn test_record_count_and_keys() {
        let store = store_with(
            "Data",
            &[
                &["a", "b", "c"],
                &["1", "2", "3"],
                &["4", "5", "6"],
                &["7", "8", "9"],
            ],
        );

        let records = materialize(&store, "Data");
        assert_eq!(records.len(), 3);
        for record in &records {
            assert_eq!(record.keys().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        }
        assert_eq!(records[2].get("b"), Some("8"));
    }

    #[test]
    fn test_header_only_and_missing_sheets() {
        let store = store_with("Data", &[&["a", "b"]]);
        assert!(materialize(&store, "Data").is_empty());
        assert!(materialize(&store, "Missing").is_empty());
    }

    #[test]
    fn test_short_rows_get_empty_values() {
        let store = store_with("Data", &[&["a", "b", "c"], &["1"]]);
        let records = materialize(&store, "Data");
        assert_eq!(
            records[0].iter().collect::<Vec<_>>(),
            vec![("a", "1"), ("b", ""), ("c", "")]
        );
    }

    #[test]
    fn test_gap_rows_become_empty_records() {
        let mut wb = Workbook::empty();
        let idx = wb.add_worksheet_with_name("Data").unwrap();
        let sheet = wb.worksheet_mut(idx).unwrap();
        sheet.set_cell_value("A1", "user").unwrap();
        sheet.set_cell_value("A4", "late").unwrap();
        let store = SheetStore::from_workbook(wb);

        let records = materialize(&store, "Data");
        let values: Vec<_> = records.iter().map(|r| r.get("user")).collect();
        assert_eq!(values, vec![Some(""), Some(""), Some("late")]);
    }

    #[test]
    fn test_duplicate_header_last_value_wins() {
        let store = store_with("Data", &[&["user", "pass", "user"], &["first", "p", "last"]]);
        let records = materialize(&store, "Data");

        assert_eq!(records[0].len(), 2);
        assert_eq!(records[0].keys().collect::<Vec<_>>(), vec!["user", "pass"]);
        assert_eq!(records[0].get("user"), Some("last"));
    }

    #[test]
    fn test_typed_cells_and_placeholders() {
        let mut wb = Workbook::empty();
        let idx = wb.add_worksheet_with_name("Data").unwrap();
        let sheet = wb.worksheet_mut(idx).unwrap();
        sheet.set_cell_value("A1", "count").unwrap();
        sheet.set_cell_value("B1", "since").unwrap();
        sheet.set_cell_value("C1", "active").unwrap();
        sheet.set_cell_value("D1", "broken").unwrap();
        sheet.set_cell_value("A2", 3.0).unwrap();
        sheet.set_cell_value("B2", 45415.0).unwrap();
        sheet
            .set_number_format("B2", NumberFormat::date_short())
            .unwrap();
        sheet.set_cell_value("C2", true).unwrap();
        sheet
            .set_cell_value("D2", CellValue::Error(CellError::Na))
            .unwrap();
        let store = SheetStore::from_workbook(wb);

        let record = &materialize(&store, "Data")[0];
        assert_eq!(record.get("count"), Some("3.0"));
        assert_eq!(record.get("since"), Some("5/3/24"));
        assert_eq!(record.get("active"), Some("true"));
        assert_eq!(
            record.get("broken"),
            Some("row 2 or column 3 does not exist in xlsx")
        );
    }

    #[test]
    fn test_materialize_is_idempotent() {
        let store = store_with("Data", &[&["a"], &["1"], &["2"]]);
        assert_eq!(materialize(&store, "Data"), materialize(&store, "Data"));
    }
}
