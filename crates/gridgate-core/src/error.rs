//! Errors of the workbook model

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// A cell or sheet the model cannot hold
#[derive(Debug, Error)]
pub enum Error {
    /// Not an A1 reference
    #[error("bad cell reference: {0}")]
    InvalidAddress(String),

    /// Row index and the last valid one
    #[error("row {0} is past the last row ({1})")]
    RowOutOfBounds(u32, u32),

    /// Column index and the last valid one
    #[error("column {0} is past the last column ({1})")]
    ColumnOutOfBounds(u16, u16),

    /// Empty, too long or containing a reserved character
    #[error("bad sheet name: {0}")]
    InvalidSheetName(String),

    /// Sheet names are unique regardless of case
    #[error("a sheet named '{0}' already exists")]
    DuplicateSheetName(String),
}
