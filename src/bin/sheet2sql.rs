//! sheet2sql: turn spreadsheet sheets into SQL scripts.
//!
//! # Usage
//!
//! ```bash
//! # Every sheet as MySQL
//! sheet2sql sales.xlsx
//!
//! # One sheet as PostgreSQL, header on the third row, columns B to F
//! sheet2sql sales.xlsx -d postgresql -s Q1 --header-row 2 --data-start-row 3 \
//!     --column-start B --column-end F -o q1.sql
//! ```

use anyhow::Context;
use clap::ArgAction;
use clap::Parser;
use sheet2sql::convert_workbook;
use sheet2sql::render_script;
use sheet2sql::spreadsheet::reference::parse_column;
use sheet2sql::ConvertOptions;
use sheet2sql::Dialect;
use sheet2sql::Window;
use std::path::Path;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sheet2sql", version)]
#[command(about = "Convert spreadsheet sheets into SQL CREATE TABLE and INSERT statements", long_about = None)]
struct Cli {
    /// Spreadsheet file (.xlsx or .xlsm)
    file: PathBuf,

    /// Write the SQL script to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// SQL dialect: mysql, sqlite or postgresql
    #[arg(short, long, env = "SHEET2SQL_DIALECT", default_value = "mysql")]
    dialect: Dialect,

    /// Sheet name or glob pattern, every sheet when omitted
    #[arg(short, long)]
    sheet: Option<String>,

    /// Table name prefix, joined to the sheet name with '_'
    #[arg(short = 'p', long, env = "SHEET2SQL_TABLE_PREFIX")]
    table_prefix: Option<String>,

    /// Row holding the column names (0-based)
    #[arg(long, default_value_t = 0)]
    header_row: usize,

    /// First data row (0-based)
    #[arg(long, default_value_t = 1)]
    data_start_row: usize,

    /// First column, as a 0-based index or letters (A, B, ..., AA)
    #[arg(long, default_value = "0", value_parser = parse_column)]
    column_start: usize,

    /// Last column (inclusive), as a 0-based index or letters; the last column of the sheet when omitted
    #[arg(long, value_parser = parse_column)]
    column_end: Option<usize>,

    /// Infer column types from the first N data rows only
    #[arg(long)]
    analyze_rows: Option<usize>,

    /// More logging on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn options(&self) -> ConvertOptions {
        ConvertOptions {
            dialect: self.dialect,
            table_prefix: self.table_prefix.clone().filter(|prefix| !prefix.is_empty()),
            sheet: self.sheet.clone(),
            window: Window {
                header_row: self.header_row,
                data_start_row: self.data_start_row,
                column_start: self.column_start,
                column_end: self.column_end,
            },
            analyze_rows: self.analyze_rows,
        }
    }
}

/// Loads `KEY=value` pairs from an env file without overriding variables already set.
/// Returns false when the file does not exist.
fn load_env_file(path: &Path) -> anyhow::Result<bool> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(true),
        Err(e) if e.not_found() => Ok(false),
        Err(e) => Err(e).with_context(|| format!("Failed to load '{}'", path.display())),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let env_loaded = load_env_file(Path::new(".env"))?;
    let cli = Cli::parse();
    init_logging(cli.verbose);
    debug!("{:?}", cli);
    if env_loaded {
        debug!("Loaded environment from .env");
    }

    let sheets = convert_workbook(&cli.file, &cli.options())
        .with_context(|| format!("Failed to convert '{}'", cli.file.display()))?;
    let script = render_script(&sheets);

    match &cli.output {
        Some(output) => {
            std::fs::write(output, &script).with_context(|| format!("Failed to write '{}'", output.display()))?;
            eprintln!("SQL written to {}", output.display());
        }
        None => println!("{script}"),
    }
    Ok(())
}
