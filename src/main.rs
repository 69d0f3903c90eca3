// Dwelling ETL - command line
//   extract    CSV → archive
//   transform  archive → dwelling store (+ JSONL)
//   run        both

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use dwelling_etl::{
    extract_into_archive, open_database, run, transform_archive, PipelineConfig, RowReader,
};

#[derive(Parser, Debug)]
#[command(name = "dwelling-etl")]
#[command(about = "Extract, validate and assemble housing energy-audit dwellings")]
#[command(version)]
struct Cli {
    /// Pipeline config (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// SQLite file holding the archive and the dwelling store
    #[arg(short, long, global = true, env = "DWELLING_ETL_DATABASE")]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate raw rows and archive their component snippets
    Extract {
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Group archived rows into dwellings and store them
    Transform {
        /// Also write one dwelling document per line here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Extract then transform
    Run {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn open_output(path: Option<&Path>) -> Result<Option<BufWriter<File>>> {
    path.map(|path| {
        File::create(path)
            .map(BufWriter::new)
            .with_context(|| format!("Failed to create output: {}", path.display()))
    })
    .transpose()
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = PipelineConfig::load_or_default(cli.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .init();

    let database = cli.database.unwrap_or_else(|| config.database.clone());
    let mut conn = open_database(&database)?;
    info!(database = %database.display(), policy = %config.group_size, "opened database");

    match cli.command {
        Command::Extract { input } => {
            let rows = RowReader::open(&input)?;
            let stats = extract_into_archive(&mut conn, rows)?;
            println!(
                "✓ Extracted {} of {} rows ({} skipped)",
                stats.rows_extracted, stats.rows_read, stats.rows_skipped
            );
        }
        Command::Transform { output } => {
            let mut writer = open_output(output.as_deref())?;
            let summary = transform_archive(
                &mut conn,
                config.group_size,
                writer.as_mut().map(|w| w as &mut dyn Write),
            )?;
            if let Some(writer) = writer.as_mut() {
                writer.flush()?;
            }
            println!(
                "✓ Assembled {} dwellings ({} groups dropped), {} written",
                summary.transform.dwellings,
                summary.transform.groups_dropped,
                summary.store.written()
            );
        }
        Command::Run { input, output } => {
            let rows = RowReader::open(&input)?;
            let mut writer = open_output(output.as_deref())?;
            let summary = run(
                &mut conn,
                rows,
                config.group_size,
                writer.as_mut().map(|w| w as &mut dyn Write),
            )?;
            if let Some(writer) = writer.as_mut() {
                writer.flush()?;
            }
            println!(
                "✓ {} rows → {} extracted → {} dwellings ({} written, {} unchanged)",
                summary.extract.rows_read,
                summary.extract.rows_extracted,
                summary.transform.dwellings,
                summary.store.written(),
                summary.store.unchanged
            );
        }
    }

    Ok(())
}
