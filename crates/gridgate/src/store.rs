//! Spreadsheet store
//!
//! [`SheetStore`] owns a loaded workbook and answers every read the engine
//! makes. Reads come in two flavours: typed (`cell_by_*`, returning
//! [`CellReadError`]) and lenient (`cell_data_by_*`), which never fail and
//! return `""` for missing data or a placeholder for unreadable cells.

use std::path::{Path, PathBuf};

use gridgate_core::{DateSystem, Workbook, Worksheet};
use gridgate_xlsx::XlsxReader;

use crate::coerce::{coerce, DateOrder};
use crate::error::{CellReadError, CoercionError, LoadError};
use crate::lookup::{find_column, RowNumber};

/// In-memory workbook with the read API used by tests
///
/// The store holds no file handle and is never mutated after construction,
/// so it can be shared across threads by reference.
#[derive(Debug)]
pub struct SheetStore {
    workbook: Workbook,
    source: Option<PathBuf>,
}

impl SheetStore {
    /// Load a whole xlsx workbook into memory
    ///
    /// The file is closed before this returns.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let workbook = XlsxReader::read_file(path)
            .map_err(|e| LoadError::from_xlsx(path.to_path_buf(), e))?;

        log::debug!(
            "loaded {} with {} sheets",
            path.display(),
            workbook.sheet_count()
        );

        Ok(Self {
            workbook,
            source: Some(path.to_path_buf()),
        })
    }

    /// Wrap a workbook that is already in memory
    pub fn from_workbook(workbook: Workbook) -> Self {
        Self {
            workbook,
            source: None,
        }
    }

    /// The underlying workbook
    pub fn workbook(&self) -> &Workbook {
        &self.workbook
    }

    /// The file this store was loaded from, if any
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn date_system(&self) -> DateSystem {
        self.workbook.date_system()
    }

    /// Sheet names in workbook order
    pub fn sheet_names(&self) -> Vec<&str> {
        self.workbook.worksheets().map(|ws| ws.name()).collect()
    }

    /// Check whether a sheet exists
    ///
    /// The exact name is tried first, then the name upper-cased. No other
    /// case folding is applied: "data" finds a sheet named "DATA" but "DATA"
    /// does not find "data".
    pub fn sheet_exists(&self, name: &str) -> bool {
        self.workbook.sheet_index(name).is_some()
            || self.workbook.sheet_index(&name.to_uppercase()).is_some()
    }

    /// Number of rows in a sheet, header included
    ///
    /// This is the last row index + 1, or 0 when the sheet does not exist
    /// or is empty.
    pub fn row_count(&self, sheet: &str) -> usize {
        self.workbook
            .worksheet_by_name(sheet)
            .and_then(|ws| ws.last_row_index())
            .map(|last| last as usize + 1)
            .unwrap_or(0)
    }

    /// Number of header cells in a sheet
    ///
    /// This is the header row's last cell index + 1. Returns -1 when the
    /// sheet does not exist or the header row is absent or has no cells.
    /// Existence is checked with [`Self::sheet_exists`] but the header is
    /// read from the exactly named sheet, so a sheet only found through the
    /// upper-case fallback also yields -1.
    pub fn column_count(&self, sheet: &str) -> i32 {
        if !self.sheet_exists(sheet) {
            return -1;
        }
        match self
            .workbook
            .worksheet_by_name(sheet)
            .and_then(|ws| ws.row(RowNumber::HEADER.physical()))
        {
            Some(header) if !header.is_empty() => i32::from(header.width()),
            _ => -1,
        }
    }

    /// Read a cell by header name
    ///
    /// Dates are rendered day first (`D/M/YY`).
    pub fn cell_by_header(
        &self,
        sheet: &str,
        header: &str,
        row: i64,
    ) -> Result<String, CellReadError> {
        let row_number = RowNumber::new(row).ok_or(CellReadError::InvalidRow(row))?;
        let worksheet = self.worksheet(sheet)?;
        let column = find_column(worksheet, header)
            .map_err(|failure| CoercionError::new(row, header, failure))?
            .ok_or_else(|| CellReadError::ColumnNotFound {
                sheet: sheet.to_string(),
                column: header.to_string(),
            })?;

        self.read_cell(worksheet, column, row_number, header, DateOrder::DayMonthYear)
    }

    /// Read a cell by 0-based column index
    ///
    /// Dates are rendered month first (`M/D/YY`).
    pub fn cell_by_index(
        &self,
        sheet: &str,
        column: u16,
        row: i64,
    ) -> Result<String, CellReadError> {
        let row_number = RowNumber::new(row).ok_or(CellReadError::InvalidRow(row))?;
        let worksheet = self.worksheet(sheet)?;
        let label = column.to_string();

        self.read_cell(worksheet, column, row_number, &label, DateOrder::MonthDayYear)
    }

    /// Lenient form of [`Self::cell_by_header`]
    pub fn cell_data_by_header(&self, sheet: &str, header: &str, row: i64) -> String {
        Self::lenient(self.cell_by_header(sheet, header, row))
    }

    /// Lenient form of [`Self::cell_by_index`]
    pub fn cell_data_by_index(&self, sheet: &str, column: u16, row: i64) -> String {
        Self::lenient(self.cell_by_index(sheet, column, row))
    }

    fn lenient(result: Result<String, CellReadError>) -> String {
        match result {
            Ok(text) => text,
            Err(CellReadError::Coercion(e)) => {
                log::warn!("{}", e);
                e.placeholder()
            }
            Err(e) => {
                log::debug!("{}", e);
                String::new()
            }
        }
    }

    /// Exact-name sheet lookup used by every cell read
    fn worksheet(&self, sheet: &str) -> Result<&Worksheet, CellReadError> {
        self.workbook
            .worksheet_by_name(sheet)
            .ok_or_else(|| CellReadError::SheetNotFound(sheet.to_string()))
    }

    fn read_cell(
        &self,
        worksheet: &Worksheet,
        column: u16,
        row_number: RowNumber,
        label: &str,
        order: DateOrder,
    ) -> Result<String, CellReadError> {
        let row = worksheet
            .row(row_number.physical())
            .ok_or_else(|| CellReadError::RowMissing {
                sheet: worksheet.name().to_string(),
                row: row_number.into(),
            })?;
        let cell = row.cell(column).ok_or_else(|| CellReadError::CellMissing {
            sheet: worksheet.name().to_string(),
            row: row_number.into(),
            column: label.to_string(),
        })?;

        coerce(
            &cell.value,
            worksheet.format_of(cell),
            order,
            self.date_system(),
        )
        .map_err(|failure| CoercionError::new(row_number.into(), label, failure).into())
    }
}
