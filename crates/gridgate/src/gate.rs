//! Execution gate
//!
//! A record runs only if both run-mode flags allow it: the test case's row
//! in the control sheet, and the record's own run-mode column. The suite
//! flag accepts `Y` in any case, the dataset flag only an upper-case `Y`.
//! Existing workbooks rely on this difference, so it is kept.

use serde::{Deserialize, Serialize};

use crate::dataset::Record;
use crate::error::GateDenied;
use crate::lookup::{find_test_case, RowNumber};
use crate::store::SheetStore;

/// Where the control sheet lives and which columns it uses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlSheet {
    /// Sheet listing the test cases
    pub sheet: String,
    /// Column holding test case names
    pub tcid_column: String,
    /// Run-mode column, used both in the control sheet and in datasets
    pub runmode_column: String,
}

impl Default for ControlSheet {
    fn default() -> Self {
        Self {
            sheet: "TestSuite".to_string(),
            tcid_column: "TCID".to_string(),
            runmode_column: "Runmode".to_string(),
        }
    }
}

/// Decides whether a test case runs for a given record
#[derive(Debug)]
pub struct ExecutionGate<'a> {
    store: &'a SheetStore,
    control: ControlSheet,
}

impl<'a> ExecutionGate<'a> {
    pub fn new(store: &'a SheetStore, control: ControlSheet) -> Self {
        Self { store, control }
    }

    pub fn control(&self) -> &ControlSheet {
        &self.control
    }

    pub fn store(&self) -> &'a SheetStore {
        self.store
    }

    /// Test case names listed in the control sheet, in row order
    pub fn listed_tests(&self) -> Vec<String> {
        let rows = self.store.row_count(&self.control.sheet);
        (1..rows)
            .filter_map(RowNumber::from_data_ordinal)
            .map(|row| {
                self.store
                    .cell_data_by_header(&self.control.sheet, &self.control.tcid_column, row.into())
            })
            .filter(|name| !name.is_empty())
            .collect()
    }

    /// Suite-level check: the test case is listed and its run-mode is `Y`
    /// in any case
    pub fn suite_allows(&self, test_name: &str) -> bool {
        self.check_suite(test_name).is_ok()
    }

    /// Dataset-level check: the record's run-mode is exactly `Y`
    pub fn dataset_allows(&self, record: &Record) -> bool {
        self.check_dataset(record).is_ok()
    }

    /// Run both checks, suite first
    pub fn check(&self, test_name: &str, record: &Record) -> Result<(), GateDenied> {
        self.check_suite(test_name)?;
        self.check_dataset(record)
    }

    /// Boolean form of [`Self::check`]
    pub fn should_run(&self, test_name: &str, record: &Record) -> bool {
        self.check(test_name, record).is_ok()
    }

    pub fn check_suite(&self, test_name: &str) -> Result<(), GateDenied> {
        let control = &self.control;
        let Some(row) = find_test_case(
            self.store,
            &control.sheet,
            &control.tcid_column,
            test_name,
        ) else {
            log::debug!("{} is not listed in '{}'", test_name, control.sheet);
            return Err(GateDenied::NotListed {
                test_name: test_name.to_string(),
            });
        };

        let runmode =
            self.store
                .cell_data_by_header(&control.sheet, &control.runmode_column, row.into());
        log::debug!(
            "{} found at row {} of '{}' with run mode '{}'",
            test_name,
            row,
            control.sheet,
            runmode
        );

        if runmode.eq_ignore_ascii_case("Y") {
            Ok(())
        } else {
            Err(GateDenied::SuiteDisabled {
                test_name: test_name.to_string(),
            })
        }
    }

    pub fn check_dataset(&self, record: &Record) -> Result<(), GateDenied> {
        match record.get(&self.control.runmode_column) {
            Some("Y") => Ok(()),
            Some(_) => Err(GateDenied::DatasetDisabled),
            None => Err(GateDenied::DatasetRunmodeMissing {
                column: self.control.runmode_column.clone(),
            }),
        }
    }
}
