//! Prelude module - common imports for gridgate users
//!
//! ```rust
//! use gridgate::prelude::*;
//! ```

// Workbook model and I/O
pub use crate::{CellValue, NumberFormat, Workbook, Worksheet, XlsxReader, XlsxWriter};

// Reading test data
pub use crate::{materialize, CellReadError, Record, RowNumber, SheetStore};

// Gating and running
pub use crate::{
    ControlSheet, ExecutionGate, GateDenied, HarnessConfig, Outcome, SuiteRunner, TestCase,
    TestContext, TestFailure,
};
