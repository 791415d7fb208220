//! gridgate CLI - inspect test data workbooks and preview gate decisions

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use gridgate::config::DEFAULT_CONFIG_FILE;
use gridgate::prelude::*;
use gridgate::Decision;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gridgate")]
#[command(
    author,
    version,
    about = "Spreadsheet-backed test data and execution control"
)]
struct Cli {
    /// Configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Workbook to use instead of the configured data file
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List sheets with their row and column counts
    Sheets,

    /// Print every dataset of a test-case sheet
    Dataset {
        /// Sheet name
        sheet: String,

        /// Output JSON instead of one line per record
        #[arg(long)]
        json: bool,
    },

    /// Read a single cell (row 1 is the header row)
    Cell {
        /// Sheet name
        sheet: String,

        /// Row number
        row: i64,

        /// Header name of the column
        #[arg(long, conflicts_with = "index", required_unless_present = "index")]
        header: Option<String>,

        /// 0-based column index
        #[arg(long)]
        index: Option<u16>,
    },

    /// Show which datasets would run
    Plan {
        /// Test case to plan (default: every listed test case)
        test_case: Option<String>,

        /// Sheet holding the test case's datasets (default: test case name)
        #[arg(long, requires = "test_case")]
        sheet: Option<String>,
    },

    /// Write a starter workbook and configuration file
    Init {
        /// Directory to create them in
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Init { dir, force } = &cli.command {
        init_logging("info", cli.verbose);
        return init(dir, *force);
    }

    let mut config = HarnessConfig::load(&cli.config)
        .with_context(|| format!("Failed to load '{}'", cli.config.display()))?;
    if let Some(data) = cli.data {
        config.data_file = data;
    }
    init_logging(&config.log_level, cli.verbose);

    let context = TestContext::load(config).context("Failed to load test data")?;
    tracing::debug!(
        data_file = %context.config().data_file.display(),
        sheets = context.store().sheet_names().len(),
        "test data loaded"
    );

    match cli.command {
        Commands::Sheets => list_sheets(context.store()),
        Commands::Dataset { sheet, json } => show_dataset(&context, &sheet, json),
        Commands::Cell {
            sheet,
            row,
            header,
            index,
        } => show_cell(context.store(), &sheet, row, header.as_deref(), index),
        Commands::Plan { test_case, sheet } => {
            show_plan(&context.runner(), test_case.as_deref(), sheet.as_deref())
        }
        Commands::Init { .. } => Ok(()),
    }
}

fn init_logging(level: &str, verbose: bool) {
    let level = if verbose { "debug" } else { level };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn list_sheets(store: &SheetStore) -> Result<()> {
    for (i, name) in store.sheet_names().into_iter().enumerate() {
        println!(
            "{}\t{}\t{} rows\t{} columns",
            i,
            name,
            store.row_count(name),
            store.column_count(name)
        );
    }
    Ok(())
}

fn show_dataset(context: &TestContext, sheet: &str, json: bool) -> Result<()> {
    if !context.store().sheet_exists(sheet) {
        bail!("Sheet '{}' not found", sheet);
    }
    let records = context.records(sheet);

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        eprintln!("Sheet '{}' has no datasets", sheet);
    }
    for (i, record) in records.iter().enumerate() {
        let fields: Vec<String> = record.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        println!("{}\t{}", i + 1, fields.join("\t"));
    }
    Ok(())
}

fn show_cell(
    store: &SheetStore,
    sheet: &str,
    row: i64,
    header: Option<&str>,
    index: Option<u16>,
) -> Result<()> {
    let text = match (header, index) {
        (Some(header), _) => store.cell_by_header(sheet, header, row),
        (None, Some(index)) => store.cell_by_index(sheet, index, row),
        (None, None) => bail!("Either --header or --index is required"),
    }
    .with_context(|| format!("Failed to read row {} of '{}'", row, sheet))?;

    println!("{}", text);
    Ok(())
}

fn show_plan(runner: &SuiteRunner<'_>, test_case: Option<&str>, sheet: Option<&str>) -> Result<()> {
    let plan = match test_case {
        Some(name) => runner.plan(name, sheet.unwrap_or(name)),
        None => runner.plan_suite(),
    };

    let mut runnable = 0;
    for planned in &plan {
        match &planned.decision {
            Decision::Run => {
                runnable += 1;
                println!("{}\t#{}\tRUN", planned.test_case, planned.dataset);
            }
            Decision::Skip(reason) => {
                println!("{}\t#{}\tSKIP\t{}", planned.test_case, planned.dataset, reason);
            }
        }
    }
    eprintln!("{} of {} datasets would run", runnable, plan.len());
    Ok(())
}

/// Starter workbook: a control sheet and one test-case sheet
fn starter_workbook() -> Result<Workbook> {
    let mut workbook = Workbook::empty();

    let idx = workbook.add_worksheet_with_name("TestSuite")?;
    let suite = workbook
        .worksheet_mut(idx)
        .context("Control sheet missing")?;
    suite.set_cell_value("A1", "TCID")?;
    suite.set_cell_value("B1", "Description")?;
    suite.set_cell_value("C1", "Runmode")?;
    suite.set_cell_value("A2", "LoginTest")?;
    suite.set_cell_value("B2", "Log in with valid and invalid users")?;
    suite.set_cell_value("C2", "Y")?;

    let idx = workbook.add_worksheet_with_name("LoginTest")?;
    let data = workbook
        .worksheet_mut(idx)
        .context("Data sheet missing")?;
    data.set_cell_value("A1", "Username")?;
    data.set_cell_value("B1", "Password")?;
    data.set_cell_value("C1", "Runmode")?;
    for (row, (user, password, runmode)) in [
        ("standard_user", "secret_sauce", "Y"),
        ("locked_out_user", "secret_sauce", "Y"),
        ("problem_user", "secret_sauce", "N"),
    ]
    .iter()
    .enumerate()
    {
        let r = row as u32 + 1;
        data.set_cell_value_at(r, 0, *user)?;
        data.set_cell_value_at(r, 1, *password)?;
        data.set_cell_value_at(r, 2, *runmode)?;
    }

    Ok(workbook)
}

fn init(dir: &Path, force: bool) -> Result<()> {
    let config = HarnessConfig::default();
    let config_path = dir.join(DEFAULT_CONFIG_FILE);
    let data_path = dir.join(&config.data_file);

    for path in [&config_path, &data_path] {
        if path.exists() && !force {
            bail!("'{}' already exists (use --force to overwrite)", path.display());
        }
    }

    if let Some(parent) = data_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create '{}'", parent.display()))?;
    }
    XlsxWriter::write_file(&starter_workbook()?, &data_path)
        .with_context(|| format!("Failed to write '{}'", data_path.display()))?;
    config
        .save(&config_path)
        .with_context(|| format!("Failed to write '{}'", config_path.display()))?;

    eprintln!("Wrote '{}'", data_path.display());
    eprintln!("Wrote '{}'", config_path.display());
    Ok(())
}
