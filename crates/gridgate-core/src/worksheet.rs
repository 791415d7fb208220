//! A single named sheet of a workbook

use crate::cell::{CellAddress, CellData, CellStorage, CellValue};
use crate::error::{Error, Result};
use crate::row::RowData;
use crate::style::NumberFormat;
use crate::{MAX_COLS, MAX_ROWS};

/// Named grid of cells
///
/// Cells are addressed either with an A1 reference or with 0-based
/// `(row, col)` indices; both forms are bounds-checked on write.
#[derive(Debug)]
pub struct Worksheet {
    name: String,
    visible: bool,
    cells: CellStorage,
}

impl Worksheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visible: true,
            cells: CellStorage::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// False for hidden and very hidden sheets
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Value at an A1 reference; a cell that does not exist reads as empty
    pub fn get_value(&self, reference: &str) -> Result<CellValue> {
        let at = CellAddress::parse(reference)?;
        Ok(self.get_value_at(at.row, at.col))
    }

    pub fn get_value_at(&self, row: u32, col: u16) -> CellValue {
        match self.cells.get(row, col) {
            Some(cell) => cell.value.clone(),
            None => CellValue::Empty,
        }
    }

    /// General when the cell does not exist
    pub fn number_format_at(&self, row: u32, col: u16) -> &NumberFormat {
        self.cells
            .get(row, col)
            .map_or(&NumberFormat::General, |cell| self.cells.format_of(cell))
    }

    /// Number format of a cell borrowed from this sheet
    pub fn format_of(&self, cell: &CellData) -> &NumberFormat {
        self.cells.format_of(cell)
    }

    pub fn set_cell_value(&mut self, reference: &str, value: impl Into<CellValue>) -> Result<()> {
        let at = CellAddress::parse(reference)?;
        self.set_cell_value_at(at.row, at.col, value)
    }

    pub fn set_cell_value_at(
        &mut self,
        row: u32,
        col: u16,
        value: impl Into<CellValue>,
    ) -> Result<()> {
        check_bounds(row, col)?;
        self.cells.set_value(row, col, value.into());
        Ok(())
    }

    pub fn set_number_format(&mut self, reference: &str, format: NumberFormat) -> Result<()> {
        let at = CellAddress::parse(reference)?;
        self.set_number_format_at(at.row, at.col, format)
    }

    pub fn set_number_format_at(&mut self, row: u32, col: u16, format: NumberFormat) -> Result<()> {
        check_bounds(row, col)?;
        self.cells.set_format(row, col, format);
        Ok(())
    }

    /// Record a row that is present in the document but holds no cells
    pub fn declare_row(&mut self, row: u32) -> Result<()> {
        check_bounds(row, 0)?;
        self.cells.declare_row(row);
        Ok(())
    }

    /// Highest 0-based row index present, declared rows included
    pub fn last_row_index(&self) -> Option<u32> {
        self.cells.last_row()
    }

    /// `None` when the row is absent from the sheet
    pub fn row(&self, row: u32) -> Option<RowData<'_>> {
        self.cells
            .row_exists(row)
            .then(|| RowData::new(row, self.cells.iter_row(row).collect()))
    }

    pub fn cell_count(&self) -> usize {
        self.cells.cell_count()
    }

    /// No cells and no declared rows
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Every stored cell as `(row, col, cell)`, row-major
    pub fn iter_cells(&self) -> impl Iterator<Item = (u32, u16, &CellData)> {
        self.cells.iter()
    }
}

fn check_bounds(row: u32, col: u16) -> Result<()> {
    if row >= MAX_ROWS {
        Err(Error::RowOutOfBounds(row, MAX_ROWS - 1))
    } else if col >= MAX_COLS {
        Err(Error::ColumnOutOfBounds(col, MAX_COLS - 1))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_worksheet() {
        let ws = Worksheet::new("TestSuite");
        assert_eq!(ws.name(), "TestSuite");
        assert!(ws.is_visible());
        assert!(ws.is_empty());
        assert_eq!(ws.last_row_index(), None);
    }

    #[test]
    fn test_set_cell_values() {
        let mut ws = Worksheet::new("Data");

        ws.set_cell_value("A1", "TCID").unwrap();
        ws.set_cell_value("B1", "Runmode").unwrap();
        ws.set_cell_value("A2", 42.0).unwrap();
        ws.set_cell_value("B2", true).unwrap();

        assert_eq!(ws.get_value("A1").unwrap().as_string(), Some("TCID"));
        assert_eq!(ws.get_value("A2").unwrap().as_number(), Some(42.0));
        assert_eq!(ws.get_value("B2").unwrap().as_bool(), Some(true));
        assert_eq!(ws.get_value("C9").unwrap(), CellValue::Empty);
        assert_eq!(ws.cell_count(), 4);
    }

    #[test]
    fn test_rows() {
        let mut ws = Worksheet::new("Data");
        ws.set_cell_value_at(0, 0, "a").unwrap();
        ws.set_cell_value_at(0, 3, "d").unwrap();
        ws.declare_row(2).unwrap();

        let header = ws.row(0).unwrap();
        assert_eq!(header.width(), 4);
        assert!(header.cell(1).is_none());
        assert_eq!(header.cell(3).unwrap().value.as_string(), Some("d"));

        assert!(ws.row(1).is_none());
        assert!(ws.row(2).unwrap().is_empty());
        assert_eq!(ws.last_row_index(), Some(2));
    }

    #[test]
    fn test_number_format() {
        let mut ws = Worksheet::new("Data");
        ws.set_cell_value("A2", 45415.0).unwrap();
        ws.set_number_format("A2", NumberFormat::date_short()).unwrap();

        assert!(ws.number_format_at(1, 0).is_date_format());
        assert_eq!(ws.number_format_at(5, 5), &NumberFormat::General);
    }

    #[test]
    fn test_invalid_position() {
        let mut ws = Worksheet::new("Data");
        assert!(ws.set_cell_value_at(MAX_ROWS, 0, 1.0).is_err());
        assert!(ws.set_cell_value_at(0, MAX_COLS, 1.0).is_err());
        assert!(ws.set_cell_value("not-an-address", 1.0).is_err());
        assert!(ws.declare_row(MAX_ROWS).is_err());
    }
}
