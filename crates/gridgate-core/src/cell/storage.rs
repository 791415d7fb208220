//! Sparse cell storage
//!
//! Cells live in `row -> (column -> CellData)` B-tree maps, so every walk is
//! in sheet order and absent cells cost nothing. A row can also exist with
//! no cells at all when the document declares it; those rows are tracked
//! separately because they still count towards a sheet's extent.

use std::collections::{BTreeMap, BTreeSet};

use super::{CellValue, StringPool};
use crate::style::{FormatPool, NumberFormat};

/// A stored cell: its value and an index into the sheet's format pool
#[derive(Debug, Clone, Default)]
pub struct CellData {
    pub value: CellValue,
    /// 0 is General
    pub format_index: u32,
}

impl CellData {
    pub fn new(value: CellValue) -> Self {
        Self {
            value,
            format_index: 0,
        }
    }

    /// Nothing worth keeping: no value and the General format
    pub fn is_empty(&self) -> bool {
        self.format_index == 0 && self.value.is_empty()
    }
}

type Row = BTreeMap<u16, CellData>;

#[derive(Debug, Default)]
pub struct CellStorage {
    rows: BTreeMap<u32, Row>,
    declared_rows: BTreeSet<u32>,
    strings: StringPool,
    formats: FormatPool,
}

impl CellStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, row: u32, col: u16) -> Option<&CellData> {
        self.rows.get(&row)?.get(&col)
    }

    /// Replace a cell's value, keeping its format
    ///
    /// Text is interned. A cell left with no value and no format is dropped.
    pub fn set_value(&mut self, row: u32, col: u16, value: CellValue) {
        let value = match value {
            CellValue::String(s) => CellValue::String(self.strings.intern(s.as_str())),
            other => other,
        };
        self.update(row, col, |cell| cell.value = value);
    }

    /// Replace a cell's number format, keeping its value
    pub fn set_format(&mut self, row: u32, col: u16, format: NumberFormat) {
        let index = self.formats.get_or_insert(format);
        self.update(row, col, |cell| cell.format_index = index);
    }

    fn update(&mut self, row: u32, col: u16, apply: impl FnOnce(&mut CellData)) {
        let cells = self.rows.entry(row).or_default();
        let cell = cells.entry(col).or_default();
        apply(cell);
        if cell.is_empty() {
            self.remove(row, col);
        }
    }

    /// Number format of a cell from this storage
    pub fn format_of(&self, cell: &CellData) -> &NumberFormat {
        self.formats
            .get(cell.format_index)
            .unwrap_or(&NumberFormat::General)
    }

    fn remove(&mut self, row: u32, col: u16) -> Option<CellData> {
        let cells = self.rows.get_mut(&row)?;
        let removed = cells.remove(&col);
        if cells.is_empty() {
            self.rows.remove(&row);
        }
        removed
    }

    pub fn declare_row(&mut self, row: u32) {
        self.declared_rows.insert(row);
    }

    /// Declared, or holding at least one cell
    pub fn row_exists(&self, row: u32) -> bool {
        self.declared_rows.contains(&row) || self.rows.contains_key(&row)
    }

    pub fn last_row(&self) -> Option<u32> {
        let last_with_cells = self.rows.last_key_value().map(|(r, _)| *r);
        let last_declared = self.declared_rows.last().copied();
        last_with_cells.max(last_declared)
    }

    pub fn cell_count(&self) -> usize {
        self.rows.values().map(Row::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.declared_rows.is_empty()
    }

    /// All cells as `(row, col, cell)`, in sheet order
    pub fn iter(&self) -> impl Iterator<Item = (u32, u16, &CellData)> {
        self.rows.iter().flat_map(|(&row, cells)| {
            cells.iter().map(move |(&col, cell)| (row, col, cell))
        })
    }

    /// Cells of one row as `(col, cell)`
    pub fn iter_row(&self, row: u32) -> impl Iterator<Item = (u16, &CellData)> {
        self.rows
            .get(&row)
            .into_iter()
            .flat_map(|cells| cells.iter().map(|(&col, cell)| (col, cell)))
    }
}
