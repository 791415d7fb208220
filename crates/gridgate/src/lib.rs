//! # gridgate
//!
//! Spreadsheet-backed test data and execution control for data-driven UI
//! tests.
//!
//! A workbook holds one sheet per test case (a header row followed by one
//! row per dataset) and a control sheet listing which test cases are
//! enabled. gridgate loads the workbook once, turns each data row into a
//! [`Record`] of strings, and decides per record whether the test body runs.
//!
//! - [`SheetStore`] - owns the loaded workbook, answers cell reads
//! - [`coerce`] - renders any cell as the string a test receives
//! - [`lookup`] - header columns, control-sheet rows and [`RowNumber`]
//! - [`dataset`] - materializes a sheet into records
//! - [`ExecutionGate`] - suite and dataset run-mode checks
//! - [`TestContext`] / [`SuiteRunner`] - configuration, execution and reports
//!
//! ## Example
//!
//! ```rust
//! use gridgate::prelude::*;
//!
//! let mut workbook = Workbook::empty();
//! let suite = workbook.add_worksheet_with_name("TestSuite").unwrap();
//! let sheet = workbook.worksheet_mut(suite).unwrap();
//! sheet.set_cell_value("A1", "TCID").unwrap();
//! sheet.set_cell_value("B1", "Runmode").unwrap();
//! sheet.set_cell_value("A2", "TC_02").unwrap();
//! sheet.set_cell_value("B2", "y").unwrap();
//!
//! let data = workbook.add_worksheet_with_name("TC_02").unwrap();
//! let sheet = workbook.worksheet_mut(data).unwrap();
//! sheet.set_cell_value("A1", "username").unwrap();
//! sheet.set_cell_value("B1", "Runmode").unwrap();
//! sheet.set_cell_value("A2", "admin").unwrap();
//! sheet.set_cell_value("B2", "Y").unwrap();
//!
//! let store = SheetStore::from_workbook(workbook);
//! let records = materialize(&store, "TC_02");
//! assert_eq!(records[0].get("username"), Some("admin"));
//!
//! let gate = ExecutionGate::new(&store, ControlSheet::default());
//! assert!(gate.should_run("TC_02", &records[0]));
//! ```

pub mod coerce;
pub mod config;
pub mod context;
pub mod dataset;
pub mod error;
pub mod gate;
pub mod lookup;
pub mod prelude;
pub mod runner;
pub mod store;

pub use coerce::{coerce, parse_back, render_number, DateOrder};
pub use config::HarnessConfig;
pub use context::TestContext;
pub use dataset::{materialize, Record};
pub use error::{
    CellReadError, CoercionError, CoercionFailure, ConfigError, GateDenied, LoadError,
    ReportError, TestFailure,
};
pub use gate::{ControlSheet, ExecutionGate};
pub use lookup::{find_column, find_test_case, RowNumber};
pub use runner::{CaseResult, Decision, Outcome, PlannedRun, RunReport, SuiteRunner, TestCase};
pub use store::SheetStore;

// Re-export the workbook model and I/O
pub use gridgate_core::{
    CellAddress, CellData, CellError, CellKind, CellValue, DateSystem, NumberFormat, Workbook,
    Worksheet,
};
pub use gridgate_xlsx::{XlsxError, XlsxReader, XlsxWriter};
