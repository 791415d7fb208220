//! Row and column lookup
//!
//! Callers address rows the way a spreadsheet UI numbers them: row 1 is the
//! header and row 2 the first dataset. [`RowNumber`] is the only place that
//! converts between these numbers, data ordinals and 0-based physical row
//! indices.

use std::fmt;

use gridgate_core::{CellValue, Worksheet, MAX_ROWS};

use crate::error::CoercionFailure;
use crate::store::SheetStore;

/// A 1-based row number (row 1 is the header row)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowNumber(u32);

impl RowNumber {
    /// The header row
    pub const HEADER: RowNumber = RowNumber(1);

    /// The first data row
    pub const FIRST_DATA: RowNumber = RowNumber(2);

    /// Validate a caller-supplied row number
    ///
    /// Zero, negative numbers and numbers past the last possible row give
    /// `None`.
    pub fn new(number: i64) -> Option<Self> {
        if number >= 1 && number <= i64::from(MAX_ROWS) {
            Some(RowNumber(number as u32))
        } else {
            None
        }
    }

    /// Row number of the `ordinal`-th dataset (the first dataset is 1)
    pub fn from_data_ordinal(ordinal: usize) -> Option<Self> {
        if ordinal == 0 {
            return None;
        }
        i64::try_from(ordinal).ok().and_then(|n| Self::new(n + 1))
    }

    /// Row number of a 0-based physical row index
    pub fn from_physical(index: u32) -> Option<Self> {
        Self::new(i64::from(index) + 1)
    }

    /// The row number itself
    pub fn get(self) -> u32 {
        self.0
    }

    /// 0-based physical row index
    pub fn physical(self) -> u32 {
        self.0 - 1
    }

    /// Dataset ordinal, or `None` for the header row
    pub fn data_ordinal(self) -> Option<usize> {
        (self.0 > 1).then(|| (self.0 - 1) as usize)
    }

    pub fn is_header(self) -> bool {
        self.0 == 1
    }
}

impl fmt::Display for RowNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<RowNumber> for i64 {
    fn from(row: RowNumber) -> Self {
        i64::from(row.0)
    }
}

/// Find the column whose header matches `header`
///
/// Header cells are compared after trimming both sides, case-sensitively.
/// The whole header row is scanned, so with duplicate headers the last one
/// wins. Missing and blank header cells never match; a gap in the header
/// row is skipped, it does not fail the lookup. A header cell that is not
/// text (a number, a boolean, a formula without a text result) fails the
/// lookup, wherever it sits in the row.
pub fn find_column(sheet: &Worksheet, header: &str) -> Result<Option<u16>, CoercionFailure> {
    let Some(row) = sheet.row(RowNumber::HEADER.physical()) else {
        return Ok(None);
    };

    let target = header.trim();
    let mut found = None;
    for (col, cell) in row.iter() {
        let text = match &cell.value {
            CellValue::Empty => "",
            CellValue::String(s) => s.as_str(),
            CellValue::Formula {
                cached_value: Some(cached),
                ..
            } if matches!(**cached, CellValue::String(_)) => cached.as_string().unwrap_or(""),
            other => {
                return Err(CoercionFailure::NonTextHeader {
                    column: col,
                    kind: other.kind(),
                })
            }
        };
        if text.trim() == target {
            found = Some(col);
        }
    }

    log::trace!(
        "header '{}' in sheet '{}': column {:?}",
        header,
        sheet.name(),
        found
    );
    Ok(found)
}

/// Find the control-sheet row listing `test_name`
///
/// Walks the data rows of `control_sheet` in order, reading `tcid_column`
/// by header, and returns the first row whose value equals `test_name`
/// ignoring case. Unreadable cells are skipped.
pub fn find_test_case(
    store: &SheetStore,
    control_sheet: &str,
    tcid_column: &str,
    test_name: &str,
) -> Option<RowNumber> {
    let rows = store.row_count(control_sheet);
    let wanted = test_name.to_lowercase();

    (RowNumber::FIRST_DATA.get()..)
        .take_while(|&n| n as usize <= rows)
        .filter_map(|n| RowNumber::new(i64::from(n)))
        .find(|&row| {
            store
                .cell_by_header(control_sheet, tcid_column, row.into())
                .map(|tcid| tcid.to_lowercase() == wanted)
                .unwrap_or(false)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridgate_core::{CellKind, Workbook};

    fn sheet_with_headers(headers: &[CellValue]) -> Worksheet {
        let mut sheet = Worksheet::new("Data");
        for (col, header) in headers.iter().enumerate() {
            sheet
                .set_cell_value_at(0, col as u16, header.clone())
                .unwrap();
        }
        sheet
    }

    #[test]
    fn test_row_number_conversions() {
        assert_eq!(RowNumber::new(0), None);
        assert_eq!(RowNumber::new(-3), None);
        assert_eq!(RowNumber::new(1), Some(RowNumber::HEADER));
        assert_eq!(RowNumber::new(2), Some(RowNumber::FIRST_DATA));
        assert_eq!(RowNumber::new(i64::from(MAX_ROWS) + 1), None);

        assert_eq!(RowNumber::HEADER.physical(), 0);
        assert_eq!(RowNumber::FIRST_DATA.physical(), 1);
        assert!(RowNumber::HEADER.is_header());

        assert_eq!(RowNumber::from_data_ordinal(0), None);
        assert_eq!(RowNumber::from_data_ordinal(1), Some(RowNumber::FIRST_DATA));
        assert_eq!(RowNumber::from_data_ordinal(3).unwrap().physical(), 3);
        assert_eq!(RowNumber::from_physical(4).unwrap().get(), 5);
        assert_eq!(RowNumber::new(5).unwrap().data_ordinal(), Some(4));
        assert_eq!(RowNumber::HEADER.data_ordinal(), None);
    }

    #[test]
    fn test_find_column_trims() {
        let sheet = sheet_with_headers(&[
            CellValue::string(" username "),
            CellValue::string("password"),
        ]);
        assert_eq!(find_column(&sheet, "username"), Ok(Some(0)));
        assert_eq!(find_column(&sheet, "  password"), Ok(Some(1)));
    }

    #[test]
    fn test_find_column_case_sensitive() {
        let sheet = sheet_with_headers(&[CellValue::string("Runmode")]);
        assert_eq!(find_column(&sheet, "runmode"), Ok(None));
    }

    #[test]
    fn test_find_column_last_duplicate_wins() {
        let sheet = sheet_with_headers(&[
            CellValue::string("user"),
            CellValue::string("pass"),
            CellValue::string("user"),
        ]);
        assert_eq!(find_column(&sheet, "user"), Ok(Some(2)));
    }

    #[test]
    fn test_find_column_skips_gaps() {
        let mut sheet = Worksheet::new("Data");
        sheet.set_cell_value_at(0, 0, "a").unwrap();
        sheet.set_cell_value_at(0, 3, "d").unwrap();
        assert_eq!(find_column(&sheet, "d"), Ok(Some(3)));
        // Blank headers never match a non-empty target
        assert_eq!(find_column(&sheet, "b"), Ok(None));
    }

    #[test]
    fn test_find_column_non_text_header() {
        let sheet = sheet_with_headers(&[
            CellValue::string("user"),
            CellValue::Number(2024.0),
        ]);
        assert_eq!(
            find_column(&sheet, "user"),
            Err(CoercionFailure::NonTextHeader {
                column: 1,
                kind: CellKind::Numeric
            })
        );
    }

    #[test]
    fn test_find_column_text_formula_header() {
        let sheet = sheet_with_headers(&[CellValue::formula(
            "=\"user\"",
            Some(CellValue::string("user")),
        )]);
        assert_eq!(find_column(&sheet, "user"), Ok(Some(0)));
    }

    #[test]
    fn test_find_column_without_header_row() {
        let mut sheet = Worksheet::new("Data");
        sheet.set_cell_value_at(3, 0, "late").unwrap();
        assert_eq!(find_column(&sheet, "late"), Ok(None));
    }

    fn control_store(rows: &[(&str, &str)]) -> SheetStore {
        let mut wb = Workbook::empty();
        let idx = wb.add_worksheet_with_name("TestSuite").unwrap();
        let sheet = wb.worksheet_mut(idx).unwrap();
        sheet.set_cell_value("A1", "TCID").unwrap();
        sheet.set_cell_value("B1", "Runmode").unwrap();
        for (i, (tcid, runmode)) in rows.iter().enumerate() {
            let row = i as u32 + 1;
            sheet.set_cell_value_at(row, 0, *tcid).unwrap();
            sheet.set_cell_value_at(row, 1, *runmode).unwrap();
        }
        SheetStore::from_workbook(wb)
    }

    #[test]
    fn test_find_test_case_ignores_case() {
        let store = control_store(&[("TC_01_VerifyLogin", "Y"), ("TC_02", "N")]);
        assert_eq!(
            find_test_case(&store, "TestSuite", "TCID", "tc_01_verifylogin"),
            RowNumber::new(2)
        );
        assert_eq!(
            find_test_case(&store, "TestSuite", "TCID", "TC_02"),
            RowNumber::new(3)
        );
    }

    #[test]
    fn test_find_test_case_first_match_wins() {
        let store = control_store(&[("TC_03", "N"), ("tc_03", "Y")]);
        assert_eq!(
            find_test_case(&store, "TestSuite", "TCID", "TC_03"),
            RowNumber::new(2)
        );
    }

    #[test]
    fn test_find_test_case_missing() {
        let store = control_store(&[("TC_01", "Y")]);
        assert_eq!(find_test_case(&store, "TestSuite", "TCID", "TC_99"), None);
        assert_eq!(find_test_case(&store, "NoSuchSheet", "TCID", "TC_01"), None);
        assert_eq!(find_test_case(&store, "TestSuite", "Key", "TC_01"), None);
    }

    #[test]
    fn test_find_test_case_never_matches_header() {
        let store = control_store(&[]);
        assert_eq!(find_test_case(&store, "TestSuite", "TCID", "TCID"), None);
    }
}
