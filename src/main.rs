mod error;
mod export;
mod fetch;
mod parser;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use tracing::info;

use error::PipelineError;
use parser::normalize::Table;

#[derive(Parser)]
#[command(
    name = "airtrade_extractor",
    about = "Extract aircraft, engine, listing and company data from MyAirTrade pages"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a page and extract its data
    Fetch {
        url: String,
        /// Request timeout in seconds
        #[arg(long, default_value = "30")]
        timeout: u64,
        #[command(flatten)]
        out: OutputArgs,
    },
    /// Extract data from a saved HTML page
    File {
        path: PathBuf,
        #[command(flatten)]
        out: OutputArgs,
    },
}

#[derive(Args)]
struct OutputArgs {
    /// Spreadsheet to write
    #[arg(short, long, default_value = export::FILE_NAME)]
    output: PathBuf,
    /// Preview rows per table
    #[arg(short = 'n', long, default_value = "20")]
    rows: usize,
    /// Also dump the normalized tables as JSON
    #[arg(long)]
    json: Option<PathBuf>,
    /// Only preview, don't write the spreadsheet
    #[arg(long)]
    no_export: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Fetch { url, timeout, out } => {
            let url = url.trim();
            if url.is_empty() {
                println!("Please enter a valid URL.");
                return Ok(());
            }
            let page = fetch_with_spinner(url, Duration::from_secs(timeout)).await?;
            info!("HTTP {} from {}", page.status, url);
            run(&page.body, &out)
        }
        Commands::File { path, out } => {
            let content = fetch::read_saved_page(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            run(&content, &out)
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {:.1}s", elapsed.as_secs_f64());
    }

    result
}

async fn fetch_with_spinner(url: &str, timeout: Duration) -> anyhow::Result<fetch::RawPage> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed}]")?);
    pb.set_message(format!("Fetching {}", url));
    pb.enable_steady_tick(Duration::from_millis(100));

    let page = fetch::fetch_page(url, timeout).await;
    pb.finish_and_clear();
    Ok(page?)
}

/// Extract, preview, and export one page's content.
fn run(content: &[u8], out: &OutputArgs) -> anyhow::Result<()> {
    let tables = match parser::process_page(content) {
        Ok(tables) => tables,
        Err(PipelineError::NoDataFound) => {
            println!("No data found on this page.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if tables.is_empty() {
        println!("Data sources found, but every one of them was empty.");
        return Ok(());
    }

    for table in &tables {
        print_table(table, out.rows);
    }

    if let Some(path) = &out.json {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        serde_json::to_writer_pretty(file, &tables)?;
        println!("Wrote JSON to {}", path.display());
    }

    if !out.no_export {
        let bytes = export::serialize(&tables)?;
        std::fs::write(&out.output, &bytes)
            .with_context(|| format!("Failed to write {}", out.output.display()))?;
        info!("{} ({} bytes, {})", out.output.display(), bytes.len(), export::MIME_TYPE);
        println!("Wrote {} sheet(s) to {}", tables.len(), out.output.display());
    }

    Ok(())
}

const MAX_CELL_WIDTH: usize = 24;

fn print_table(table: &Table, limit: usize) {
    println!("\n{} ({} rows)", table.name, table.rows.len());

    let shown: Vec<Vec<String>> = table
        .rows
        .iter()
        .take(limit)
        .map(|row| row.iter().map(|v| truncate(&cell_text(v), MAX_CELL_WIDTH)).collect())
        .collect();

    let widths: Vec<usize> = table
        .columns
        .iter()
        .enumerate()
        .map(|(i, col)| {
            shown
                .iter()
                .filter_map(|r| r.get(i))
                .map(|c| c.chars().count())
                .chain(std::iter::once(truncate(col, MAX_CELL_WIDTH).chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |cells: Vec<String>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:<w$}", c, w = *w))
            .collect::<Vec<_>>()
            .join(" | ")
    };

    let header = line(table.columns.iter().map(|c| truncate(c, MAX_CELL_WIDTH)).collect());
    println!("{}", header);
    println!("{}", "-".repeat(header.chars().count()));
    for row in shown {
        println!("{}", line(row));
    }
    if table.rows.len() > limit {
        println!("... {} more", table.rows.len() - limit);
    }
}

fn cell_text(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.replace(['\n', '\r'], " "),
        other => other.to_string(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}
