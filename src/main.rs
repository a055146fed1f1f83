//! CLI entry point for `mailextract`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{CommandFactory, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use mailextract::config::{self, Config};
use mailextract::index::reader as index_reader;

/// Extract emails from a mail archive, export metadata to a CSV, and save
/// each full email body to its own folder.
#[derive(Parser)]
#[command(name = "mailextract", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file (overrides $MAILEXTRACT_CONFIG)
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract every message of an archive into a new output directory
    Extract {
        /// Archive to read: an .mbox file, an .eml file, or a directory tree
        input: PathBuf,
        /// Output directory; must not exist yet
        #[arg(short, long)]
        output: PathBuf,
        /// Index file location (default: <OUTPUT>/<input stem>.csv)
        #[arg(long)]
        index: Option<PathBuf>,
    },
    /// Show statistics for an index written by `extract`
    Stats {
        index: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = config::load_config(cli.config.as_deref());

    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);

    match cli.command {
        Commands::Extract {
            input,
            output,
            index,
        } => cmd_extract(&input, &output, index.as_deref(), &config),
        Commands::Stats { index, json } => cmd_stats(&index, json),
        Commands::Completions { shell } => cmd_completions(shell),
        Commands::Manpage => cmd_manpage(),
    }
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let log_path = config::log_file_path(config);
    let log_dir = log_path.parent().map(Path::to_path_buf).unwrap_or_default();
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, "mailextract.log");
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        // Fall back to stderr only
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

/// Run an extraction and print where everything went.
fn cmd_extract(
    input: &Path,
    output: &Path,
    index: Option<&Path>,
    config: &Config,
) -> anyhow::Result<()> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} Extracting messages {pos} ({elapsed})")
            .expect("valid template"),
    );
    pb.enable_steady_tick(Duration::from_millis(120));

    let result = mailextract::extract::extract_archive(
        input,
        output,
        index,
        &config.extract,
        Some(&|visited| pb.set_position(visited as u64)),
    );
    pb.finish_and_clear();
    let summary = result?;

    use humansize::{format_size, BINARY};
    println!("Exported {} messages.", summary.extracted);
    if summary.skipped > 0 || summary.skipped_folders > 0 {
        println!(
            "Skipped {} unreadable message(s) and {} unreadable folder(s).",
            summary.skipped, summary.skipped_folders
        );
    }
    println!("CSV saved to: {}", summary.index_path.display());
    println!(
        "Email folders created in: {} ({})",
        summary.output_root.display(),
        format_size(summary.body_bytes, BINARY)
    );
    tracing::debug!(elapsed = ?summary.elapsed, "Done");

    Ok(())
}

/// Show statistics for an existing index.
fn cmd_stats(path: &Path, json: bool) -> anyhow::Result<()> {
    if !path.exists() {
        anyhow::bail!("The file '{}' does not exist.", path.display());
    }
    let rows = index_reader::read_index(path)?;

    if json {
        print_stats_json(path, &rows)
    } else {
        print_stats_table(path, &rows);
        Ok(())
    }
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "mailextract", &mut std::io::stdout());
    Ok(())
}

/// Generate a man page and print to stdout.
fn cmd_manpage() -> anyhow::Result<()> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    std::io::Write::write_all(&mut std::io::stdout(), &buf)?;
    Ok(())
}

/// Print statistics in a human-readable table.
fn print_stats_table(path: &Path, rows: &[index_reader::IndexRow]) {
    println!();
    println!("  {:<20} {}", "Index", path.display());
    println!("  {:<20} {}", "Messages", rows.len());

    if let Some((min, max)) = index_reader::date_range(rows) {
        println!(
            "  {:<20} {} — {}",
            "Date range",
            min.format("%Y-%m-%d"),
            max.format("%Y-%m-%d")
        );
    }
    println!("  {:<20} {}", "Without date", index_reader::count_undated(rows));

    let top = index_reader::top_senders(rows, 10);
    if !top.is_empty() {
        println!();
        println!("  Top senders:");
        for (sender, count) in &top {
            println!("    {count:>6}  {sender}");
        }
    }
    println!();
}

/// Print statistics as JSON.
fn print_stats_json(path: &Path, rows: &[index_reader::IndexRow]) -> anyhow::Result<()> {
    let date_range = index_reader::date_range(rows).map(|(min, max)| {
        serde_json::json!({
            "oldest": min.to_rfc3339(),
            "newest": max.to_rfc3339(),
        })
    });

    let top_json: Vec<serde_json::Value> = index_reader::top_senders(rows, 10)
        .iter()
        .map(|(sender, count)| {
            serde_json::json!({
                "sender": sender,
                "count": count,
            })
        })
        .collect();

    let stats = serde_json::json!({
        "index": path.to_string_lossy(),
        "message_count": rows.len(),
        "date_range": date_range,
        "without_date": index_reader::count_undated(rows),
        "top_senders": top_json,
    });

    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}
