//! # gridgate-core
//!
//! The in-memory spreadsheet model behind gridgate. Format readers fill a
//! [`Workbook`]; the engine only ever reads from it.
//!
//! A [`Workbook`] is an ordered list of [`Worksheet`]s. A sheet stores its
//! cells sparsely as [`CellValue`]s, each with an optional [`NumberFormat`]
//! (the only way to tell a date from a number). [`date`] turns serial
//! numbers into calendar dates.
//!
//! ```rust
//! use gridgate_core::{CellValue, Workbook};
//!
//! let mut workbook = Workbook::empty();
//! let idx = workbook.add_worksheet_with_name("TC_02").unwrap();
//! let sheet = workbook.worksheet_mut(idx).unwrap();
//!
//! sheet.set_cell_value("A1", "username").unwrap();
//! sheet.set_cell_value("B1", "Runmode").unwrap();
//! // 0-based (row, col)
//! sheet.set_cell_value_at(1, 0, CellValue::string("admin")).unwrap();
//! sheet.set_cell_value_at(1, 1, "Y").unwrap();
//!
//! assert_eq!(sheet.last_row_index(), Some(1));
//! ```

pub mod cell;
pub mod date;
pub mod error;
pub mod row;
pub mod style;
pub mod workbook;
pub mod worksheet;

pub use cell::{CellAddress, CellData, CellError, CellKind, CellValue};
pub use date::DateSystem;
pub use error::{Error, Result};
pub use row::RowData;
pub use style::{FormatPool, NumberFormat};
pub use workbook::{Workbook, WorkbookSettings};
pub use worksheet::Worksheet;

/// Rows per worksheet
pub const MAX_ROWS: u32 = 1_048_576;

/// Columns per worksheet (`A`..=`XFD`)
pub const MAX_COLS: u16 = 16_384;

/// Longest sheet name, in characters
pub const MAX_SHEET_NAME_LEN: usize = 31;
