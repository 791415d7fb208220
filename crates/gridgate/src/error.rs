//! Error types for the gridgate engine
//!
//! Only [`LoadError`] and [`ConfigError`] are fatal. Cell reads return
//! [`CellReadError`], which the lenient store API turns into sentinel
//! strings, and [`GateDenied`] is a skip signal rather than a failure.

use std::path::PathBuf;

use gridgate_core::{CellError, CellKind};
use gridgate_xlsx::XlsxError;
use thiserror::Error;

/// The workbook could not be loaded
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be opened or read
    #[error("cannot open workbook {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not a well-formed xlsx document
    #[error("cannot read workbook {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: XlsxError,
    },
}

impl LoadError {
    pub(crate) fn from_xlsx(path: PathBuf, error: XlsxError) -> Self {
        match error {
            XlsxError::Io(source) => LoadError::Io { path, source },
            source => LoadError::Malformed { path, source },
        }
    }
}

/// Why a cell could not be rendered as a string
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoercionFailure {
    /// A formula with no saved result
    #[error("formula has no cached result")]
    UncachedFormula,

    /// A formula whose saved result is not a number
    #[error("formula result is {0}, not a number")]
    NonNumericFormula(CellKind),

    /// An error value such as `#N/A`
    #[error("cell holds the error value {0}")]
    ErrorValue(CellError),

    /// A header cell that is neither text nor blank
    #[error("header in column {column} is {kind}, not text")]
    NonTextHeader { column: u16, kind: CellKind },
}

/// A cell exists but cannot be read as a string
#[derive(Debug, Clone, PartialEq, Error)]
#[error("cannot read row {row}, column {column}: {failure}")]
pub struct CoercionError {
    /// Row number as requested by the caller
    pub row: i64,
    /// Header name or column index as requested by the caller
    pub column: String,
    pub failure: CoercionFailure,
}

impl CoercionError {
    pub fn new(row: i64, column: impl ToString, failure: CoercionFailure) -> Self {
        Self {
            row,
            column: column.to_string(),
            failure,
        }
    }

    /// The text the lenient read API returns in place of the cell value
    pub fn placeholder(&self) -> String {
        format!(
            "row {} or column {} does not exist in xlsx",
            self.row, self.column
        )
    }
}

/// Typed outcome of a failed cell read
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CellReadError {
    #[error("sheet '{0}' does not exist")]
    SheetNotFound(String),

    #[error("no column headed '{column}' in sheet '{sheet}'")]
    ColumnNotFound { sheet: String, column: String },

    /// Row numbers start at 1 (the header row)
    #[error("invalid row number {0}")]
    InvalidRow(i64),

    #[error("row {row} does not exist in sheet '{sheet}'")]
    RowMissing { sheet: String, row: i64 },

    #[error("row {row}, column {column} of sheet '{sheet}' has no cell")]
    CellMissing {
        sheet: String,
        row: i64,
        column: String,
    },

    #[error(transparent)]
    Coercion(#[from] CoercionError),
}

impl CellReadError {
    /// Check whether this is a "no data here" outcome rather than a bad cell
    pub fn is_not_found(&self) -> bool {
        !matches!(self, CellReadError::Coercion(_))
    }
}

/// Configuration could not be loaded or saved
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot access config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("cannot serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// A test case or dataset is switched off
///
/// This is a skip signal. Reports count it separately from failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateDenied {
    /// The control sheet row for the test case is not set to run
    #[error("Skipping the test {} as the Run mode is NO", .test_name.to_uppercase())]
    SuiteDisabled { test_name: String },

    /// The control sheet has no row for the test case
    #[error("Skipping the test {} as it is not listed in the control sheet", .test_name.to_uppercase())]
    NotListed { test_name: String },

    /// The record's own run-mode is not `Y`
    #[error("Skipping the test case as the Run mode for data set is NO")]
    DatasetDisabled,

    /// The record has no run-mode column at all
    #[error("Skipping the test case as the data set has no {column} value")]
    DatasetRunmodeMissing { column: String },
}

/// A test body reported a failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TestFailure {
    pub message: String,
}

impl TestFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The run report could not be written
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("cannot write report {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot serialize report: {0}")]
    Json(#[from] serde_json::Error),
}
