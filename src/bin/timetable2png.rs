//! CLI binary for timetable2png.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use timetable2png::{
    convert_dir, convert_file, write_output, ConversionConfig, ConversionProgressCallback,
    ProgressCallback,
};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a bar over the batch plus one log line per
/// document.
struct CliProgressCallback {
    bar: ProgressBar,
    skipped: AtomicUsize,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} documents  \
             ⏱ {elapsed_precise}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        bar.set_style(style);
        bar.set_prefix("Converting");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            skipped: AtomicUsize::new(0),
            errors: AtomicUsize::new(0),
        })
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Scanning {total} documents…"))
        ));
    }

    fn on_document_start(&self, _idx: usize, _total: usize, name: &str) {
        self.bar.set_message(name.to_string());
    }

    fn on_document_complete(&self, idx: usize, total: usize, name: &str, groups: usize) {
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}  {}",
            green("✓"),
            idx,
            total,
            name,
            dim(&format!("{groups} groups")),
        ));
        self.bar.inc(1);
    }

    fn on_document_skipped(&self, idx: usize, total: usize, name: &str, _reason: &str) {
        self.skipped.fetch_add(1, Ordering::SeqCst);
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}  {}",
            yellow("–"),
            idx,
            total,
            name,
            dim("no table for this week"),
        ));
        self.bar.inc(1);
    }

    fn on_document_error(&self, idx: usize, total: usize, name: &str, error: &str) {
        self.errors.fetch_add(1, Ordering::SeqCst);
        let first_line = error.lines().next().unwrap_or(error);
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}  {}",
            red("✗"),
            idx,
            total,
            name,
            red(first_line),
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, total: usize, written: usize) {
        self.bar.finish_and_clear();
        let skipped = self.skipped.load(Ordering::SeqCst);
        let failed = self.errors.load(Ordering::SeqCst);
        let mark = if failed > 0 { red("✘") } else { green("✔") };
        eprintln!(
            "{} {}/{} documents written  ({} skipped, {} failed)",
            mark,
            bold(&written.to_string()),
            total,
            skipped,
            failed,
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # One document → res/json/ПІ-11.json + res/pics/ПІ-11.png
  timetable2png test_cases/ПІ-11.docx

  # Every .docx in a directory
  timetable2png test_cases/

  # Reproduce the output of a past week
  timetable2png --today 2023-08-07 test_cases/

  # Record only, printed to stdout
  timetable2png --no-image --json test_cases/ПІ-11.docx

ENVIRONMENT VARIABLES:
  TIMETABLE_OUTPUT_DIR   Output root (json/ and pics/ are created inside)
  TIMETABLE_FONT         TrueType font used for the image
  TIMETABLE_TODAY        Date deciding the reporting week (YYYY-MM-DD)
  RUST_LOG               Log filter, overrides --verbose/--quiet

FONTS:
  Without --font the following are tried in order: res/arial.ttf,
  DejaVuSans in the usual Linux locations, Arial on macOS and Windows.
  The font must cover Cyrillic.
"#;

/// Render the current week's timetable from .docx schedules to PNG.
#[derive(Parser, Debug)]
#[command(
    name = "timetable2png",
    version,
    about = "Render the current week's timetable from .docx schedules to PNG",
    long_about = "Find the table for the current week in each .docx schedule, write it as a \
JSON record and draw it as a PNG image. Documents without a table for the week are skipped.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// A .docx file or a directory of them.
    input: PathBuf,

    /// Output root; records go to <DIR>/json, images to <DIR>/pics.
    #[arg(short, long, env = "TIMETABLE_OUTPUT_DIR", default_value = "res")]
    output_dir: PathBuf,

    /// TrueType font for the image.
    #[arg(long, env = "TIMETABLE_FONT")]
    font: Option<PathBuf>,

    /// Date deciding the reporting week (YYYY-MM-DD). Default: today.
    #[arg(long, env = "TIMETABLE_TODAY")]
    today: Option<NaiveDate>,

    /// Do not render the PNG image.
    #[arg(long, env = "TIMETABLE_NO_IMAGE")]
    no_image: bool,

    /// Do not write the JSON record.
    #[arg(long, env = "TIMETABLE_NO_RECORD")]
    no_record: bool,

    /// Print JSON to stdout: the record for a file, a summary for a directory.
    #[arg(long, env = "TIMETABLE_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "TIMETABLE_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "TIMETABLE_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "TIMETABLE_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let is_dir = cli.input.is_dir();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level library logs in batch mode.
    let show_progress = is_dir && !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Run conversion ───────────────────────────────────────────────────
    if is_dir {
        let batch = convert_dir(&cli.input, &config)
            .await
            .context("Batch conversion failed")?;

        if cli.json {
            let json = serde_json::to_string_pretty(&batch).context("Failed to serialise summary")?;
            println!("{json}");
        } else if !cli.quiet && !show_progress {
            eprintln!(
                "Converted {}/{} documents in {}ms ({} skipped, {} failed)",
                batch.stats.written,
                batch.stats.total,
                batch.stats.duration_ms,
                batch.stats.skipped,
                batch.stats.failed,
            );
        }
        return Ok(());
    }

    let Some(output) = convert_file(&cli.input, &config)
        .await
        .context("Conversion failed")?
    else {
        if !cli.quiet {
            eprintln!(
                "{} {}: no table for this week",
                yellow("–"),
                cli.input.display()
            );
        }
        return Ok(());
    };

    let written = write_output(&output, &config)
        .await
        .context("Failed to write output")?;

    if cli.json {
        let json = output.model.to_json_pretty().context("Failed to serialise record")?;
        println!("{}", String::from_utf8_lossy(&json));
    }

    if !cli.quiet {
        let mut targets = Vec::new();
        if let Some(ref p) = written.record_path {
            targets.push(p.display().to_string());
        }
        if let Some(ref p) = written.image_path {
            targets.push(p.display().to_string());
        }
        eprintln!(
            "{}  {} groups  {}  →  {}",
            green("✔"),
            written.groups,
            dim(&output.window.label()),
            bold(&targets.join(", ")),
        );
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .output_dir(&cli.output_dir)
        .write_record(!cli.no_record)
        .write_image(!cli.no_image);

    if let Some(ref font) = cli.font {
        builder = builder.font_path(font);
    }
    if let Some(today) = cli.today {
        builder = builder.today(today);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
