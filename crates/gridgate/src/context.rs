//! Test context
//!
//! Built once per run from a [`HarnessConfig`] and passed by reference to
//! everything that needs test data. There is no global workbook.

use crate::config::HarnessConfig;
use crate::dataset::{materialize, Record};
use crate::error::LoadError;
use crate::gate::ExecutionGate;
use crate::runner::SuiteRunner;
use crate::store::SheetStore;

/// Configuration plus the loaded workbook
#[derive(Debug)]
pub struct TestContext {
    config: HarnessConfig,
    store: SheetStore,
}

impl TestContext {
    /// Load the workbook named by `config.data_file`
    pub fn load(config: HarnessConfig) -> Result<Self, LoadError> {
        let store = SheetStore::open(&config.data_file)?;
        Ok(Self { config, store })
    }

    /// Build a context around an already loaded store
    pub fn new(config: HarnessConfig, store: SheetStore) -> Self {
        Self { config, store }
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn store(&self) -> &SheetStore {
        &self.store
    }

    /// Gate configured with this context's control sheet
    pub fn gate(&self) -> ExecutionGate<'_> {
        ExecutionGate::new(&self.store, self.config.control.clone())
    }

    /// All datasets of a test-case sheet
    pub fn records(&self, sheet: &str) -> Vec<Record> {
        materialize(&self.store, sheet)
    }

    /// Suite runner writing reports to the configured directory
    pub fn runner(&self) -> SuiteRunner<'_> {
        SuiteRunner::new(self.gate()).with_report_dir(self.config.report_dir.as_deref())
    }
}
