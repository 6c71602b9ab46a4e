// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::too_many_arguments)]

use anyhow::{anyhow, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{debug, error, info, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use doctrans::app_config::{Config, LogLevel, TranslationProvider};
use doctrans::database::{DatabaseConnection, JobRecord, JobStatus, Repository};
use doctrans::file_utils::FileManager;
use doctrans::language_utils;
use doctrans::translation::{TranslationClient, Translator};
use doctrans::worker::JobWorker;
use indicatif::{ProgressBar, ProgressStyle};

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    Anthropic,
    Mock,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::Anthropic => TranslationProvider::Anthropic,
            CliTranslationProvider::Mock => TranslationProvider::Mock,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate a Word document using an AI provider
    Translate(TranslateArgs),

    /// Show status, progress, and message for a translation job
    Status {
        /// Job identifier
        job_id: String,

        /// Job database path (defaults to the user data directory)
        #[arg(long)]
        database: Option<PathBuf>,
    },

    /// List past translation jobs, newest first
    History {
        /// Job database path (defaults to the user data directory)
        #[arg(long)]
        database: Option<PathBuf>,
    },

    /// Print the supported languages
    Languages,

    /// Generate shell completions for doctrans
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// Input Word document (.docx) to translate
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Source language code (e.g., 'en', 'es', 'fr')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g., 'en', 'es', 'fr')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Directory for the translated document
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Job database path (defaults to the user data directory)
    #[arg(long)]
    database: Option<PathBuf>,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

#[derive(Parser, Debug)]
#[command(name = "doctrans")]
#[command(author, version)]
#[command(about = "Translate Word documents with AI while tracking job progress")]
#[command(long_about = "doctrans translates the text runs of a Word document (.docx) with an \
LLM provider, preserving every other part of the package byte-for-byte. Each \
run is tracked as a job with persisted status and progress.

SUPPORTED PROVIDERS:
    anthropic - Anthropic Claude API (requires API key)
    mock      - Deterministic in-memory provider (testing and dry runs)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color code for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S%.3f");
            let color = Self::color_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {:5} {}\x1B[0m",
                color,
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "doctrans", &mut std::io::stdout());
            Ok(())
        }
        Commands::Languages => {
            for (code, name) in language_utils::supported_languages() {
                println!("{}  {}", code, name);
            }
            Ok(())
        }
        Commands::Status { job_id, database } => run_status(&job_id, database).await,
        Commands::History { database } => run_history(database).await,
        Commands::Translate(args) => run_translate(args).await,
    }
}

/// Open the job repository at the requested or default location
fn open_repository(database: Option<PathBuf>) -> Result<Repository> {
    match database {
        Some(path) => Ok(Repository::new(DatabaseConnection::new(path)?)),
        None => Repository::new_default(),
    }
}

/// Print the status-polling view of a job
async fn run_status(job_id: &str, database: Option<PathBuf>) -> Result<()> {
    let repository = open_repository(database)?;

    let job = repository
        .get_job(job_id)
        .await?
        .ok_or_else(|| anyhow!("Job not found: {}", job_id))?;

    println!("{}", serde_json::to_string_pretty(&job.status_view())?);
    Ok(())
}

/// Print the job history listing
async fn run_history(database: Option<PathBuf>) -> Result<()> {
    let repository = open_repository(database)?;

    let entries: Vec<_> = repository
        .list_jobs()
        .await?
        .iter()
        .map(|job| job.history_entry())
        .collect();

    println!("{}", serde_json::to_string_pretty(&entries)?);
    Ok(())
}

/// Create a job for the input document, process it, and report the outcome
async fn run_translate(args: TranslateArgs) -> Result<()> {
    // Load configuration, falling back to defaults when no file exists
    let mut config = if FileManager::file_exists(&args.config_path) {
        Config::from_file(&args.config_path)?
    } else {
        debug!("No config file at {}, using defaults", args.config_path);
        Config::default()
    };

    // Apply command line overrides
    if let Some(provider) = args.provider {
        config.provider.provider_type = provider.into();
    }
    if let Some(model) = args.model {
        config.provider.model = model;
    }
    if let Some(source) = args.source_language {
        config.source_language = source;
    }
    if let Some(target) = args.target_language {
        config.target_language = target;
    }
    if let Some(output_dir) = args.output_dir {
        config.output_dir = output_dir;
    }
    if let Some(level) = args.log_level {
        config.log_level = level.into();
    }

    log::set_max_level(config.log_level.to_level_filter());
    config.validate()?;

    if !FileManager::file_exists(&args.input_path) {
        return Err(anyhow!("Input file does not exist: {:?}", args.input_path));
    }

    // Keep the work directory from accumulating abandoned scratch output
    if let Ok(removed) =
        FileManager::cleanup_old_files(&config.work_dir, Duration::from_secs(24 * 60 * 60))
    {
        if removed > 0 {
            debug!("Removed {} stale files from the work directory", removed);
        }
    }

    let repository = open_repository(args.database.or(config.database_path.clone()))?;
    let translator: Arc<dyn Translator> = Arc::new(TranslationClient::new(&config.provider));

    let original_filename = args
        .input_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| anyhow!("Input path has no filename: {:?}", args.input_path))?;

    let job = JobRecord::new(
        original_filename,
        args.input_path.to_string_lossy().into_owned(),
        config.source_language.clone(),
        config.target_language.clone(),
    );
    repository.create_job(&job).await?;

    info!(
        "Created job {} ({} -> {})",
        job.id, config.source_language, config.target_language
    );

    let worker = JobWorker::new(
        repository.clone(),
        translator,
        config.work_dir.clone(),
        config.output_dir.clone(),
    );
    let handle = worker.spawn(&job.id);

    // Poll the job record for progress, the way a remote client would
    let progress_bar = ProgressBar::new(100);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    let poll_repository = repository.clone();
    let poll_id = job.id.clone();
    let poll_bar = progress_bar.clone();
    let poller = tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(200));
        loop {
            interval.tick().await;
            match poll_repository.get_job(&poll_id).await {
                Ok(Some(job)) => {
                    poll_bar.set_position(job.progress.round() as u64);
                    if job.status.is_terminal() {
                        break;
                    }
                }
                _ => break,
            }
        }
    });

    let completion = handle.await_completion().await;
    poller.abort();
    let _ = poller.await;
    progress_bar.finish_and_clear();
    completion?;

    let finished = repository
        .get_job(&job.id)
        .await?
        .ok_or_else(|| anyhow!("Job disappeared from the store: {}", job.id))?;

    match finished.status {
        JobStatus::Completed => {
            let output = finished
                .translated_file_path
                .unwrap_or_else(|| "<unknown>".to_string());
            info!("Translation completed: {}", output);
            println!("{}", output);
            Ok(())
        }
        status => {
            let message = finished
                .message
                .unwrap_or_else(|| "no failure message recorded".to_string());
            error!("Job {} ended as {}: {}", finished.id, status, message);
            Err(anyhow!(message))
        }
    }
}
