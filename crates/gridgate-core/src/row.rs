//! Borrowed row views

use crate::cell::CellData;

/// One physical row of a worksheet, holding only the cells that exist
///
/// A row may be present with no cells at all (an explicitly declared blank
/// row); that is different from the row not being in the sheet.
#[derive(Debug)]
pub struct RowData<'a> {
    index: u32,
    cells: Vec<(u16, &'a CellData)>,
}

impl<'a> RowData<'a> {
    /// `cells` must be sorted by column
    pub fn new(index: u32, cells: Vec<(u16, &'a CellData)>) -> Self {
        Self { index, cells }
    }

    /// 0-based physical index
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn cell(&self, col: u16) -> Option<&'a CellData> {
        self.cells
            .binary_search_by_key(&col, |(c, _)| *c)
            .ok()
            .map(|i| self.cells[i].1)
    }

    /// Number of cell slots up to and including the last cell
    ///
    /// Gaps count, so a row with cells in columns A and D has width 4.
    pub fn width(&self) -> u16 {
        match self.cells.last() {
            Some((col, _)) => col + 1,
            None => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Present cells as `(col, cell)`, in column order
    pub fn iter(&self) -> impl Iterator<Item = (u16, &'a CellData)> + '_ {
        self.cells.iter().copied()
    }
}
