//! Command-line entry point.

use crate::config::{Config, FileConfig, OutputFormat, Overrides};
use crate::loader::Loader;
use crate::sqlite::Store;
use anyhow::Context;
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sqlite-tables")]
#[command(about = "Load every table of a SQLite database and preview one of them")]
#[command(version)]
pub struct Cli {
    /// Path to the SQLite database file
    #[arg(value_name = "DB", env = "SQLITE_TABLES_DB")]
    pub db: Option<PathBuf>,

    /// TOML file with defaults for any of the other options
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Table to preview
    #[arg(short, long)]
    pub table: Option<String>,

    /// Number of rows to preview
    #[arg(short = 'n', long)]
    pub rows: Option<usize>,

    /// Fail if any table has more rows than this
    #[arg(long)]
    pub max_rows: Option<usize>,

    /// Output format of the preview
    ///
    /// JSON writes one object per row. Blobs become {"blob": "<hex>"};
    /// infinite and NaN reals have no JSON form and are written as null.
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// List tables with row counts and columns instead of previewing
    #[arg(short, long)]
    pub list: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Default log filter for the requested verbosity.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }

    pub fn resolve_config(&self) -> anyhow::Result<Config> {
        let file = match &self.config {
            Some(path) => FileConfig::load(path)
                .with_context(|| format!("reading config file {}", path.display()))?,
            None => FileConfig::default(),
        };
        let overrides = Overrides {
            db_path: self.db.clone(),
            table: self.table.clone(),
            rows: self.rows,
            max_rows: self.max_rows,
            format: self.format,
        };
        Ok(Config::resolve(file, overrides)?)
    }
}

/// Run the CLI application, writing results to `out`.
pub fn run(cli: &Cli, out: &mut impl Write) -> anyhow::Result<()> {
    let config = cli.resolve_config()?;
    let store = Store::open(&config.db_path)?;

    if cli.list {
        write_catalog(&store, out)?;
    } else {
        write_preview(&store, &config, out)?;
    }

    store.close()?;
    Ok(())
}

/// Load every table, then print the head of the configured one.
pub fn write_preview(store: &Store, config: &Config, out: &mut impl Write) -> anyhow::Result<()> {
    let tables = Loader::new()
        .with_max_rows(config.max_rows)
        .load_all(store)?;
    let preview = tables.preview(&config.table, config.rows)?;

    match config.format {
        OutputFormat::Text => writeln!(out, "{preview}")?,
        OutputFormat::Json => {
            preview.write_json(&mut *out)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

pub fn write_catalog(store: &Store, out: &mut impl Write) -> anyhow::Result<()> {
    for table in store.catalog()? {
        let rows = store.row_count(&table.name)?;
        let columns = table
            .columns
            .iter()
            .map(|c| format!("{} {}", c.name, c.data_type))
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(out, "{} ({rows} rows): {columns}", table.name)?;
    }
    Ok(())
}
