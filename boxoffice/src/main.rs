use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use boxoffice::compare::compare;
use boxoffice::{Config, DailySalesTable, SalesRetriever};

#[derive(Parser)]
#[command(name = "boxoffice")]
#[command(about = "Daily box-office sales retriever and cache")]
struct Cli {
    /// Directory for cached pages and catalog files
    #[arg(long, global = true, default_value = boxoffice::config::DATA_DIR)]
    data_dir: PathBuf,
    /// Site root to request pages from
    #[arg(long, global = true, default_value = boxoffice::config::BASE_URL)]
    base_url: String,
    /// Request timeout in seconds (no timeout when omitted)
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,
    /// Keep at most this many tables in memory (unbounded when omitted, 0 disables)
    #[arg(long, global = true)]
    cache_capacity: Option<usize>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print daily sales for one title
    Sales {
        title: String,
        /// Refetch the page even if it is cached locally
        #[arg(short, long)]
        force: bool,
    },
    /// Print two titles side by side by day of release
    Compare { a: String, b: String },
    /// List titles with a known identifier
    Titles,
    /// Download yearly listings and rebuild the title index
    Catalog,
    /// Fetch daily sales for every known title
    Batch {
        /// Refetch pages even if they are cached locally
        #[arg(short, long)]
        force: bool,
    },
    /// Remove the data directory
    Clean,
}

fn format_dollars(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    format!("${}", out)
}

fn format_cell(amount: Option<u64>) -> String {
    amount.map(format_dollars).unwrap_or_else(|| "-".to_string())
}

fn print_table(title: &str, table: &DailySalesTable) {
    println!("{} (rl{})", title, table.movie_id);
    println!(
        "{:>4}  {:<10}  {:>14}  {:>9}  {:>9}  {:>16}",
        "Day", "Date", "Daily", "Theaters", "Avg", "To Date"
    );
    for r in table.records() {
        println!(
            "{:>4}  {:<10}  {:>14}  {:>9}  {:>9}  {:>16}",
            r.day_number,
            r.date,
            format_dollars(r.daily_gross),
            r.theater_count,
            format_dollars(r.average_per_theater),
            format_dollars(r.running_total)
        );
    }
    if let Some(peak) = table.peak_day() {
        println!(
            "Peak: day {} ({}) with {}",
            peak.day_number,
            peak.date,
            format_dollars(peak.daily_gross)
        );
    }
}

fn run_compare(retriever: &mut SalesRetriever, a: &str, b: &str) -> Result<()> {
    let table_a = retriever
        .daily_sales(a, false)
        .with_context(|| format!("Failed to load sales for {}", a))?;
    let table_b = retriever
        .daily_sales(b, false)
        .with_context(|| format!("Failed to load sales for {}", b))?;

    println!("{:>4}  {:>32}  {:>32}", "Day", a, b);
    for row in compare(&table_a, &table_b) {
        println!(
            "{:>4}  {:>14} / {:>15}  {:>14} / {:>15}",
            row.day,
            format_cell(row.a_daily),
            format_cell(row.a_total),
            format_cell(row.b_daily),
            format_cell(row.b_total)
        );
    }
    Ok(())
}

fn run_batch(retriever: &mut SalesRetriever, force: bool) -> Result<()> {
    let titles = retriever.known_titles().to_vec();
    println!("Fetching {} titles...", titles.len());

    let report = retriever.daily_sales_many(&titles, force);
    for (title, e) in report.failures() {
        eprintln!("  failed: {}: {}", title, e);
    }
    println!(
        "Done! {} succeeded, {} failed",
        report.succeeded(),
        report.failed()
    );
    Ok(())
}

fn run_catalog(retriever: &mut SalesRetriever) -> Result<()> {
    let report = retriever
        .refresh_catalog()
        .context("Failed to refresh catalog")?;
    println!(
        "Catalog refreshed: {} years downloaded, {} already present, {} releases, {} new titles",
        report.years_fetched.len(),
        report.years_skipped,
        report.releases,
        report.titles_added
    );
    println!("Data has been extracted to: {}", retriever.config().data_dir.display());
    Ok(())
}

fn run_clean(data_dir: &Path) -> Result<()> {
    println!("Cleaning {}...", data_dir.display());
    if data_dir.exists() {
        fs::remove_dir_all(data_dir)
            .with_context(|| format!("Failed to remove {}", data_dir.display()))?;
        println!("  Removed {}", data_dir.display());
    }
    println!("Clean complete!");
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config {
        base_url: cli.base_url,
        data_dir: cli.data_dir,
        timeout: cli.timeout_secs.map(Duration::from_secs),
        cache_capacity: cli.cache_capacity,
        ..Config::default()
    };

    if let Commands::Clean = cli.command {
        return run_clean(&config.data_dir);
    }

    let mut retriever = SalesRetriever::new(config).context("Failed to build HTTP client")?;
    retriever
        .load_catalog()
        .context("Failed to read historical releases")?;

    match cli.command {
        Commands::Sales { title, force } => {
            let table = retriever
                .daily_sales(&title, force)
                .with_context(|| format!("Failed to load sales for {}", title))?;
            print_table(&title, &table);
            Ok(())
        }
        Commands::Compare { a, b } => run_compare(&mut retriever, &a, &b),
        Commands::Titles => {
            for title in retriever.known_titles() {
                println!("{}", title);
            }
            Ok(())
        }
        Commands::Catalog => run_catalog(&mut retriever),
        Commands::Batch { force } => run_batch(&mut retriever, force),
        Commands::Clean => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_dollars() {
        assert_eq!(format_dollars(0), "$0");
        assert_eq!(format_dollars(999), "$999");
        assert_eq!(format_dollars(1000), "$1,000");
        assert_eq!(format_dollars(162004317), "$162,004,317");
    }
}
