//! CLI binary for report-translate.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `TranslationConfig`, discovers the input PDFs and prints a batch summary.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use report_translate::{
    find_pdfs, translate_batch, BatchReport, Destination, ProgressCallback, SentenceLanguage,
    TranslationConfig, TranslationProgressCallback, TranslatorBackend,
};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
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
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar per file, reset on every
/// `on_file_start`, with a log line per finished file.
struct CliProgressCallback {
    bar: ProgressBar,
    file_started: Mutex<Option<Instant>>,
    files_done: AtomicUsize,
    total_files: usize,
}

impl CliProgressCallback {
    fn new(total_files: usize) -> Arc<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(TICKS),
        );
        bar.set_prefix("Preparing");
        bar.set_message("Extracting text…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            file_started: Mutex::new(None),
            files_done: AtomicUsize::new(0),
            total_files,
        })
    }

    fn elapsed_secs(&self) -> f64 {
        self.file_started
            .lock()
            .map(|g| g.map(|t| t.elapsed().as_secs_f64()).unwrap_or(0.0))
            .unwrap_or(0.0)
    }

    fn file_counter(&self) -> String {
        format!(
            "[{}/{}]",
            self.files_done.fetch_add(1, Ordering::SeqCst) + 1,
            self.total_files
        )
    }
}

impl TranslationProgressCallback for CliProgressCallback {
    fn on_file_start(&self, path: &Path, total_pages: usize) {
        if let Ok(mut started) = self.file_started.lock() {
            *started = Some(Instant::now());
        }
        self.bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  \
                 [{bar:42.green/238}] {pos:>3}/{len} pages  \
                 ⏱ {elapsed_precise}  {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  ")
            .tick_strings(TICKS),
        );
        self.bar.set_length(total_pages as u64);
        self.bar.set_position(0);
        self.bar.reset_elapsed();
        self.bar.set_prefix("Translating");
        self.bar.set_message(
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        );
    }

    fn on_page_complete(&self, _page_num: usize, _total: usize, _translated_len: usize) {
        self.bar.inc(1);
    }

    fn on_file_complete(&self, path: &Path, output: &Path) {
        self.bar.println(format!(
            "  {} {} {}  →  {}  {}",
            green("✓"),
            dim(&self.file_counter()),
            path.display(),
            bold(&output.display().to_string()),
            dim(&format!("{:.1}s", self.elapsed_secs())),
        ));
    }

    fn on_file_error(&self, path: &Path, error: &str) {
        let msg = match error.lines().next() {
            Some(first) if first.chars().count() > 100 => {
                format!("{}…", first.chars().take(99).collect::<String>())
            }
            Some(first) => first.to_string(),
            None => String::new(),
        };
        self.bar.println(format!(
            "  {} {} {}  {}",
            red("✗"),
            dim(&self.file_counter()),
            path.display(),
            red(&msg),
        ));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Translate one report into ./output/
  report-translate sources/1978-geschaeftsbericht.pdf

  # Translate a whole archive folder, skipping English/ subfolders,
  # mirroring the folder structure under sources/output/
  report-translate --root sources --mirror Geschaeftsberichte Statistik

  # Use an LLM instead of the web translator
  report-translate --backend llm --provider openai --model gpt-4.1-mini report.pdf

  # Be gentle with a flaky service
  report-translate --max-retries 3 --chunk-limit 3000 report.pdf

ENVIRONMENT VARIABLES:
  REPORT_TRANSLATE_*      Every flag, e.g. REPORT_TRANSLATE_TARGET_LANG=fr
  OPENAI_API_KEY          OpenAI API key (llm backend)
  ANTHROPIC_API_KEY       Anthropic API key (llm backend)
  EDGEQUAKE_LLM_PROVIDER  Override provider (openai, anthropic, gemini, ollama)
  EDGEQUAKE_MODEL         Override model ID
  PDFIUM_LIB_PATH         Path to an existing libpdfium — skips auto-download
  PDFIUM_AUTO_CACHE_DIR   Override the default pdfium cache directory
  RUST_LOG                Log filter, overrides -v/-q

NOTES:
  Output PDFs use a Latin-1 font; characters outside it are printed as '?'.
  Pages are labelled "Page i/n" after their position in the source.
  A file is written only when every page translated; failures never leave
  partial output behind.
"#;

/// Translate scanned PDF reports and re-render them as PDFs.
#[derive(Parser, Debug)]
#[command(
    name = "report-translate",
    version,
    about = "Translate scanned PDF reports and re-render them as PDFs",
    long_about = "Extract the text of PDF reports page by page, rebuild paragraphs, translate \
them in sentence chunks below a per-request byte budget, and write a new PDF with one page \
per source page. Works with the Google web translator or any LLM provider supported by \
edgequake-llm.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF files or folders; with --root, paths relative to the root.
    inputs: Vec<String>,

    /// Archive root that inputs are resolved against.
    #[arg(long, env = "REPORT_TRANSLATE_ROOT")]
    root: Option<PathBuf>,

    /// Directory for translated PDFs (ignored with --mirror).
    #[arg(short, long, env = "REPORT_TRANSLATE_OUTPUT_DIR", default_value = "output")]
    output_dir: PathBuf,

    /// Mirror the source folder structure under <root>/output/.
    #[arg(long, env = "REPORT_TRANSLATE_MIRROR", requires = "root")]
    mirror: bool,

    /// Folder name skipped during discovery ("" skips nothing).
    #[arg(long, env = "REPORT_TRANSLATE_EXCLUDE", default_value = "English")]
    exclude: String,

    /// Source language code, or "auto".
    #[arg(long, env = "REPORT_TRANSLATE_SOURCE_LANG", default_value = "auto")]
    source_lang: String,

    /// Target language code.
    #[arg(long, env = "REPORT_TRANSLATE_TARGET_LANG", default_value = "en")]
    target_lang: String,

    /// Abbreviation set for sentence splitting: en, de, fr, nl, auto.
    #[arg(long, env = "REPORT_TRANSLATE_SENTENCE_LANG", default_value = "auto")]
    sentence_lang: SentenceLanguage,

    /// Translation backend.
    #[arg(long, env = "REPORT_TRANSLATE_BACKEND", value_enum, default_value = "google")]
    backend: BackendArg,

    /// LLM provider: openai, anthropic, gemini, ollama, azure (llm backend).
    #[arg(long, env = "EDGEQUAKE_PROVIDER")]
    provider: Option<String>,

    /// LLM model ID (llm backend).
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// Per-request byte budget; chunks stay strictly below it.
    #[arg(long, env = "REPORT_TRANSLATE_CHUNK_LIMIT", default_value_t = 5000,
          value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    chunk_limit: usize,

    /// Retries per failed translation request.
    #[arg(long, env = "REPORT_TRANSLATE_MAX_RETRIES", default_value_t = 0)]
    max_retries: u32,

    /// Per-request timeout in seconds.
    #[arg(long, env = "REPORT_TRANSLATE_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// Body font size of the output PDF in points (4–24).
    #[arg(long, env = "REPORT_TRANSLATE_FONT_SIZE", default_value_t = 7.0)]
    font_size: f32,

    /// PDF user password for encrypted sources.
    #[arg(long, env = "REPORT_TRANSLATE_PASSWORD")]
    password: Option<String>,

    /// Disable progress bar.
    #[arg(long, env = "REPORT_TRANSLATE_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "REPORT_TRANSLATE_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "REPORT_TRANSLATE_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum BackendArg {
    Google,
    Llm,
}

impl From<BackendArg> for TranslatorBackend {
    fn from(v: BackendArg) -> Self {
        match v {
            BackendArg::Google => TranslatorBackend::Google,
            BackendArg::Llm => TranslatorBackend::Llm,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress;
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

    // ── Discover inputs ──────────────────────────────────────────────────
    let sources = discover(&cli);
    if sources.is_empty() {
        anyhow::bail!("No PDF files found in the given inputs");
    }

    // ── Ensure PDFium engine is available ───────────────────────────────────
    ensure_pdfium(cli.quiet)?;

    // ── Build config ─────────────────────────────────────────────────────
    let cli_progress = show_progress.then(|| CliProgressCallback::new(sources.len()));
    let progress_cb: Option<ProgressCallback> = cli_progress
        .clone()
        .map(|cb| cb as Arc<dyn TranslationProgressCallback>);

    let config = build_config(&cli, progress_cb)?;
    let destination = match (&cli.root, cli.mirror) {
        (Some(root), true) => Destination::Mirror { root: root.clone() },
        _ => Destination::Directory(cli.output_dir.clone()),
    };

    if !cli.quiet {
        eprintln!(
            "{} {}",
            cyan("◆"),
            bold(&format!(
                "Translating {} file(s) into '{}'…",
                sources.len(),
                config.target_language
            ))
        );
    }

    // ── Run batch; Ctrl-C drops the in-flight document ───────────────────
    let start = Instant::now();
    let report = tokio::select! {
        report = translate_batch(&sources, &destination, &config) => {
            report.context("Translation failed")?
        }
        _ = tokio::signal::ctrl_c() => {
            if let Some(ref cb) = cli_progress {
                cb.bar.abandon_with_message("interrupted");
            }
            anyhow::bail!("Interrupted; the file in progress was not written");
        }
    };

    if let Some(ref cb) = cli_progress {
        cb.bar.finish_and_clear();
    }
    print_summary(&cli, &report, start.elapsed());

    if report.failure_count() > 0 {
        anyhow::bail!(
            "{} of {} file(s) failed",
            report.failure_count(),
            report.files.len()
        );
    }
    Ok(())
}

/// Resolve CLI inputs to a list of PDFs.
fn discover(cli: &Cli) -> Vec<PathBuf> {
    match cli.root {
        Some(ref root) => {
            let desired: Vec<&str> = if cli.inputs.is_empty() {
                vec![""]
            } else {
                cli.inputs.iter().map(String::as_str).collect()
            };
            find_pdfs(root, &desired, &cli.exclude)
        }
        None => cli
            .inputs
            .iter()
            .flat_map(|input| {
                let path = PathBuf::from(input);
                if path.is_dir() {
                    find_pdfs(&path, &[""], &cli.exclude)
                } else {
                    vec![path]
                }
            })
            .collect(),
    }
}

fn ensure_pdfium(quiet: bool) -> Result<()> {
    // Subsequent startups skip this entirely (instant path check only).
    if pdfium_auto::is_pdfium_cached() {
        return Ok(());
    }
    if quiet {
        tokio::task::block_in_place(|| pdfium_auto::ensure_pdfium_library(None))
            .context("Failed to download PDFium engine")?;
        return Ok(());
    }

    let dl_bar = ProgressBar::new(0);
    dl_bar.set_style(
        ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {bytes}/{total_bytes}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS),
    );
    dl_bar.set_prefix("PDF engine");
    dl_bar.enable_steady_tick(Duration::from_millis(80));

    let bar = dl_bar.clone();
    tokio::task::block_in_place(|| {
        pdfium_auto::ensure_pdfium_library(Some(&|downloaded, total| {
            if let Some(t) = total {
                if bar.length().unwrap_or(0) != t {
                    bar.set_length(t);
                }
            }
            bar.set_position(downloaded);
        }))
    })
    .context("Failed to download PDFium engine")?;

    dl_bar.finish_with_message("ready ✓");
    Ok(())
}

/// Map CLI args to `TranslationConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<TranslationConfig> {
    let mut builder = TranslationConfig::builder()
        .chunk_limit_bytes(cli.chunk_limit)
        .source_language(&cli.source_lang)
        .target_language(&cli.target_lang)
        .sentence_language(cli.sentence_lang)
        .backend(cli.backend.into())
        .max_retries(cli.max_retries)
        .api_timeout_secs(cli.api_timeout)
        .font_size(cli.font_size);

    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider);
    }
    if let Some(ref model) = cli.model {
        builder = builder.model(model);
    }
    if let Some(ref password) = cli.password {
        builder = builder.password(password);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn print_summary(cli: &Cli, report: &BatchReport, elapsed: Duration) {
    if cli.quiet {
        return;
    }
    let ok = report.success_count();
    let failed = report.failure_count();
    let pages: usize = report.succeeded().map(|o| o.stats.total_pages).sum();

    if failed == 0 {
        eprintln!(
            "{} {} file(s), {} pages translated  {}",
            green("✔"),
            bold(&ok.to_string()),
            pages,
            dim(&format!("{:.1}s", elapsed.as_secs_f64())),
        );
    } else {
        eprintln!(
            "{} {}/{} file(s) translated  ({} failed)",
            if ok == 0 { red("✘") } else { cyan("⚠") },
            bold(&ok.to_string()),
            report.files.len(),
            red(&failed.to_string()),
        );
        if cli.no_progress {
            for (path, error) in report.failed() {
                eprintln!("  {} {}: {}", red("✗"), path.display(), error);
            }
        }
    }
}
