//! Suite runner
//!
//! Runs data-driven test cases: each case's sheet is materialized, every
//! record is gated, and permitted records are handed to the test body. A
//! denied record is reported as skipped, a failing or panicking body as
//! failed; neither stops the remaining records.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, info_span, warn};

use crate::dataset::{materialize, Record};
use crate::error::{ReportError, TestFailure};
use crate::gate::ExecutionGate;

/// File name of the JSON report written to the report directory
pub const REPORT_FILE: &str = "gridgate-report.json";

/// A data-driven test
pub trait TestCase {
    /// Name listed in the control sheet
    fn name(&self) -> &str;

    /// Sheet holding this test's datasets
    fn data_sheet(&self) -> &str {
        self.name()
    }

    /// Run the test against one dataset
    fn run(&self, record: &Record) -> Result<(), TestFailure>;
}

/// Result of one test case / dataset pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "lowercase")]
pub enum Outcome {
    Passed,
    Skipped(String),
    Failed(String),
}

/// Gate decision for a dataset, computed without running anything
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "reason", rename_all = "lowercase")]
pub enum Decision {
    Run,
    Skip(String),
}

/// One planned test case / dataset pair
#[derive(Debug, Clone, Serialize)]
pub struct PlannedRun {
    pub test_case: String,
    /// Dataset ordinal, starting at 1
    pub dataset: usize,
    pub decision: Decision,
}

/// One executed (or skipped) test case / dataset pair
#[derive(Debug, Clone, Serialize)]
pub struct CaseResult {
    pub test_case: String,
    /// Dataset ordinal, starting at 1
    pub dataset: usize,
    pub outcome: Outcome,
    pub duration_ms: u64,
}

/// Result of running a suite
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: String,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration_ms: u64,
    pub results: Vec<CaseResult>,
}

impl RunReport {
    fn new() -> Self {
        Self {
            started_at: chrono::Utc::now().to_rfc3339(),
            total: 0,
            passed: 0,
            failed: 0,
            skipped: 0,
            duration_ms: 0,
            results: Vec::new(),
        }
    }

    fn push(&mut self, result: CaseResult) {
        self.total += 1;
        match result.outcome {
            Outcome::Passed => self.passed += 1,
            Outcome::Skipped(_) => self.skipped += 1,
            Outcome::Failed(_) => self.failed += 1,
        }
        self.results.push(result);
    }

    /// True when nothing failed (skips do not count against a run)
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the report as JSON into `dir`, returning the file path
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, ReportError> {
        let path = dir.join(REPORT_FILE);
        let io_err = |source: std::io::Error| ReportError::Io {
            path: path.clone(),
            source,
        };
        std::fs::create_dir_all(dir).map_err(io_err)?;
        std::fs::write(&path, self.to_json()?).map_err(io_err)?;
        Ok(path)
    }
}

/// Executes test cases against their datasets
#[derive(Debug)]
pub struct SuiteRunner<'a> {
    gate: ExecutionGate<'a>,
    report_dir: Option<&'a Path>,
}

impl<'a> SuiteRunner<'a> {
    pub fn new(gate: ExecutionGate<'a>) -> Self {
        Self {
            gate,
            report_dir: None,
        }
    }

    /// Directory [`Self::run_and_report`] writes to
    pub fn with_report_dir(mut self, dir: Option<&'a Path>) -> Self {
        self.report_dir = dir;
        self
    }

    pub fn gate(&self) -> &ExecutionGate<'a> {
        &self.gate
    }

    /// Gate decisions for every dataset of one test case
    pub fn plan(&self, test_name: &str, data_sheet: &str) -> Vec<PlannedRun> {
        materialize(self.gate.store(), data_sheet)
            .iter()
            .enumerate()
            .map(|(i, record)| PlannedRun {
                test_case: test_name.to_string(),
                dataset: i + 1,
                decision: match self.gate.check(test_name, record) {
                    Ok(()) => Decision::Run,
                    Err(denied) => Decision::Skip(denied.to_string()),
                },
            })
            .collect()
    }

    /// Gate decisions for every test case listed in the control sheet,
    /// each reading datasets from the sheet of the same name
    pub fn plan_suite(&self) -> Vec<PlannedRun> {
        self.gate
            .listed_tests()
            .iter()
            .flat_map(|name| self.plan(name, name))
            .collect()
    }

    /// Run every case against each of its datasets
    pub fn run(&self, cases: &[&dyn TestCase]) -> RunReport {
        let started = Instant::now();
        let mut report = RunReport::new();

        for case in cases {
            let span = info_span!("test_case", name = case.name());
            let _entered = span.enter();

            let records = materialize(self.gate.store(), case.data_sheet());
            if records.is_empty() {
                warn!(sheet = case.data_sheet(), "no datasets found");
            }

            for (i, record) in records.iter().enumerate() {
                let result = self.run_one(*case, i + 1, record);
                report.push(result);
            }
        }

        report.duration_ms = started.elapsed().as_millis() as u64;
        info!(
            total = report.total,
            passed = report.passed,
            failed = report.failed,
            skipped = report.skipped,
            "suite finished"
        );
        report
    }

    /// [`Self::run`], then write the report if a report directory is set
    pub fn run_and_report(&self, cases: &[&dyn TestCase]) -> Result<RunReport, ReportError> {
        let report = self.run(cases);
        if let Some(dir) = self.report_dir {
            let path = report.write_to(dir)?;
            info!(path = %path.display(), "report written");
        }
        Ok(report)
    }

    fn run_one(&self, case: &dyn TestCase, dataset: usize, record: &Record) -> CaseResult {
        let started = Instant::now();

        let outcome = match self.gate.check(case.name(), record) {
            Err(denied) => {
                debug!(dataset, reason = %denied, "skipped");
                Outcome::Skipped(denied.to_string())
            }
            Ok(()) => match catch_unwind(AssertUnwindSafe(|| case.run(record))) {
                Ok(Ok(())) => {
                    info!(dataset, "passed");
                    Outcome::Passed
                }
                Ok(Err(failure)) => {
                    warn!(dataset, %failure, "failed");
                    Outcome::Failed(failure.message)
                }
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    warn!(dataset, %message, "panicked");
                    Outcome::Failed(message)
                }
            },
        };

        CaseResult {
            test_case: case.name().to_string(),
            dataset,
            outcome,
            duration_ms: started.elapsed().as_millis() as u64,
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "test body panicked".to_string()
    }
}
