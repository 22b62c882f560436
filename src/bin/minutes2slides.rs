//! CLI binary for edgequake-minutes2slides.
//!
//! A thin shim over the library crate: `serve` starts the HTTP surface,
//! `run` performs one job in the terminal and writes the PDF.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use edgequake_minutes2slides::server::{self, AppState};
use edgequake_minutes2slides::{
    export_to_file, AppConfig, JobEvent, JobPhase, JobProgressCallback, Orchestrator,
    ProgressCallback, SlideStyle, SummaryStyle, DECK_FILE_NAME,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a 0–100 bar plus one log line per finished slide.
struct CliProgressCallback {
    bar: ProgressBar,
    /// Slides already announced, so each one is printed exactly once.
    announced: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(100);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} [{bar:42.green/238}] {pos:>3}%  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            announced: AtomicUsize::new(0),
        })
    }
}

impl JobProgressCallback for CliProgressCallback {
    fn on_event(&self, event: &JobEvent) {
        let already = self.announced.load(Ordering::SeqCst);
        for (i, item) in event.items.iter().enumerate().skip(already) {
            self.bar
                .println(format!("  {} Slide {:>2}  {}", green("✓"), i + 1, item.title));
        }
        self.announced.store(event.items.len(), Ordering::SeqCst);

        self.bar.set_position(event.progress as u64);
        match &event.phase {
            JobPhase::Done => self.bar.finish_and_clear(),
            JobPhase::Failed { message } => {
                self.bar.abandon();
                eprintln!("{} {}", red("✘"), red(message));
            }
            _ => self.bar.set_message(event.status.clone()),
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Serve the HTTP API on the default port
  minutes2slides serve

  # One job in the terminal
  minutes2slides run https://docs.google.com/document/d/<ID>/edit

  # Compact summaries, graphic-recording slides, custom output
  minutes2slides run --summary-style compact --slide-style graphic-recording \
      https://docs.google.com/document/d/<ID>/edit -o deck.pdf

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY    Generative API key (also read from ./.env)
  RUST_LOG          Log filter, e.g. edgequake_minutes2slides=debug

The document must be shared as "Anyone with the link can view".
PDF export needs a pdfium shared library (system-wide or --pdfium-lib)."#;

/// Turn shared meeting minutes into a generated slide deck.
#[derive(Parser, Debug)]
#[command(
    name = "minutes2slides",
    version,
    about = "Turn shared meeting minutes into a generated slide deck PDF",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Summary prompt variant.
    #[arg(long, global = true, value_enum, default_value = "verbose")]
    summary_style: SummaryStyleArg,

    /// Slide prompt variant.
    #[arg(long, global = true, value_enum, default_value = "structured")]
    slide_style: SlideStyleArg,

    /// Text model used for summarization.
    #[arg(long, global = true)]
    text_model: Option<String>,

    /// Image model used for slides.
    #[arg(long, global = true)]
    image_model: Option<String>,

    /// Path to libpdfium (file or directory). Defaults to the system library.
    #[arg(long, global = true)]
    pdfium_lib: Option<PathBuf>,

    /// Per-request timeout in seconds (default: none).
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP API.
    Serve {
        /// Address to bind.
        #[arg(long, default_value = "127.0.0.1:3000")]
        addr: String,
    },
    /// Run one job and write the PDF.
    Run {
        /// Shared document URL.
        document_url: String,

        /// Where to write the PDF.
        #[arg(short, long, default_value = DECK_FILE_NAME)]
        output: PathBuf,

        /// Still write the slides rendered before a failure.
        #[arg(long)]
        keep_partial: bool,

        /// Disable progress bar.
        #[arg(long)]
        no_progress: bool,
    },
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum SummaryStyleArg {
    Verbose,
    Compact,
}

impl From<SummaryStyleArg> for SummaryStyle {
    fn from(v: SummaryStyleArg) -> Self {
        match v {
            SummaryStyleArg::Verbose => SummaryStyle::Verbose,
            SummaryStyleArg::Compact => SummaryStyle::Compact,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum SlideStyleArg {
    Structured,
    GraphicRecording,
}

impl From<SlideStyleArg> for SlideStyle {
    fn from(v: SlideStyleArg) -> Self {
        match v {
            SlideStyleArg::Structured => SlideStyle::Structured,
            SlideStyleArg::GraphicRecording => SlideStyle::GraphicRecording,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is normal; the key may already be exported.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO logs during `run`.
    let show_progress = matches!(
        cli.command,
        Command::Run {
            no_progress: false,
            ..
        }
    ) && !cli.quiet;
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

    let progress: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn JobProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress)?;

    match cli.command {
        Command::Serve { ref addr } => {
            if config.api_key.is_none() {
                eprintln!(
                    "{} GEMINI_API_KEY is not set; model routes will answer 500.",
                    red("⚠")
                );
            }
            let state = AppState::from_config(config).context("Invalid configuration")?;
            server::serve(addr, state)
                .await
                .with_context(|| format!("Server on {addr} failed"))?;
        }
        Command::Run {
            ref document_url,
            ref output,
            keep_partial,
            ..
        } => {
            let mut orchestrator =
                Orchestrator::from_config(&config).context("Invalid configuration")?;

            let items = match orchestrator.run(document_url).await {
                Ok(items) => items,
                Err(failure) if keep_partial && !failure.completed.is_empty() => {
                    let deck = export_to_file(&failure.completed, output, &config)
                        .await
                        .context("Failed to write partial deck")?;
                    eprintln!(
                        "{} wrote {} completed slides to {}",
                        red("⚠"),
                        deck.page_count,
                        bold(&output.display().to_string())
                    );
                    return Err(failure.error).context("Job failed");
                }
                Err(failure) => return Err(failure.error).context("Job failed"),
            };

            let deck = export_to_file(&items, output, &config)
                .await
                .context("Export failed")?;

            if !cli.quiet {
                eprintln!(
                    "{}  {} slides  →  {}  {}",
                    green("✔"),
                    deck.page_count,
                    bold(&output.display().to_string()),
                    dim(&format!("{} bytes", deck.bytes.len())),
                );
            }
        }
    }

    Ok(())
}

/// Map CLI args to `AppConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<AppConfig> {
    let defaults = AppConfig::from_env();
    let mut builder = AppConfig::builder()
        .maybe_api_key(defaults.api_key)
        .summary_style(cli.summary_style.clone().into())
        .slide_style(cli.slide_style.clone().into());

    if let Some(ref m) = cli.text_model {
        builder = builder.text_model(m);
    }
    if let Some(ref m) = cli.image_model {
        builder = builder.image_model(m);
    }
    if let Some(ref p) = cli.pdfium_lib {
        builder = builder.pdfium_library_path(p);
    }
    if let Some(secs) = cli.timeout {
        builder = builder.request_timeout_secs(secs);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
