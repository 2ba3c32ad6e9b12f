//! Reconcile CLI - Command-line interface for boxblock-reconcile
//!
//! Commands:
//! - run: Reconcile the whole study into a report
//! - inspect: Show what the extractors recover from one event-log document
//! - schema: Validate a questionnaire export and print its layout
//! - config: Print the default configuration

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use boxblock_reconcile::encoder::{render, ReportFormat};
use boxblock_reconcile::schema::{EventLogDocument, Questionnaire, QuestionnaireSchema};
use boxblock_reconcile::{inspect_document, reconcile_study, ReconcileError, StudyConfig};
use boxblock_reconcile::{PRODUCER_NAME, RECONCILE_VERSION};

/// Reconcile questionnaire answers with per-participant event logs
#[derive(Parser)]
#[command(name = "reconcile")]
#[command(version = RECONCILE_VERSION)]
#[command(about = "Reconcile box-and-block study recordings", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile the whole study into a report
    Run {
        /// Study configuration (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Questionnaire export, overrides the config
        #[arg(short, long)]
        questionnaire: Option<PathBuf>,

        /// Event-log root directory, overrides the config
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Participant numbers to leave out, added to the config's list
        #[arg(long, value_delimiter = ',')]
        exclude: Vec<u32>,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,
    },

    /// Show what the extractors recover from one event-log document
    Inspect {
        /// Event-log document (JSON)
        #[arg(short, long)]
        document: PathBuf,

        /// Rounds to pad block counts to
        #[arg(long, default_value = "0")]
        rounds: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate a questionnaire export and print its layout
    Schema {
        /// Questionnaire export
        #[arg(short, long)]
        questionnaire: PathBuf,

        /// Field delimiter
        #[arg(long, default_value = ";")]
        delimiter: char,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the default configuration as TOML
    Config,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// One participant record per line
    Ndjson,
    /// Full report on one line
    Json,
    /// Pretty-printed full report
    JsonPretty,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Ndjson => ReportFormat::Ndjson,
            OutputFormat::Json => ReportFormat::Json,
            OutputFormat::JsonPretty => ReportFormat::JsonPretty,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), ReconcileCliError> {
    match cli.command {
        Commands::Run {
            config,
            questionnaire,
            data_dir,
            exclude,
            output,
            output_format,
        } => cmd_run(
            config.as_deref(),
            questionnaire,
            data_dir,
            exclude,
            &output,
            output_format,
        ),

        Commands::Inspect {
            document,
            rounds,
            json,
        } => cmd_inspect(&document, rounds, json),

        Commands::Schema {
            questionnaire,
            delimiter,
            json,
        } => cmd_schema(&questionnaire, delimiter, json),

        Commands::Config => cmd_config(),
    }
}

fn cmd_run(
    config_path: Option<&Path>,
    questionnaire: Option<PathBuf>,
    data_dir: Option<PathBuf>,
    exclude: Vec<u32>,
    output: &Path,
    output_format: OutputFormat,
) -> Result<(), ReconcileCliError> {
    let mut config = match config_path {
        Some(path) => StudyConfig::load(path)?,
        None => StudyConfig::default(),
    };
    if let Some(questionnaire) = questionnaire {
        config.questionnaire = questionnaire;
    }
    if let Some(data_dir) = data_dir {
        config.data_dir = data_dir;
    }
    config.excluded_participants.extend(exclude);

    let report = reconcile_study(&config)?;
    let output_data = render(&report, output_format.into())?;

    if output.to_string_lossy() == "-" {
        println!("{}", output_data.trim_end());
    } else {
        fs::write(output, output_data)?;
        tracing::info!(path = %output.display(), participants = report.participants.len(), "report written");
    }

    Ok(())
}

fn cmd_inspect(document: &Path, rounds: usize, json: bool) -> Result<(), ReconcileCliError> {
    let content = fs::read_to_string(document)?;
    // No participant number is known here; 0 marks the inspected file
    let parsed = EventLogDocument::from_json(&content, 0)?;
    let inspection = inspect_document(&parsed, 0, rounds)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&inspection)?);
    } else {
        println!("Event Log Inspection");
        println!("====================");
        println!("Document:            {}", document.display());
        println!("Latency markers:     {}", inspection.latency_markers);
        println!("Latencies (ms):      {:?}", inspection.latencies);
        println!("Experiment markers:  {}", inspection.experiment_markers);
        println!("Duplicate streams:   {}", inspection.duplicate_experiment_streams);
        println!("Segments:            {:?}", inspection.segmentation.counts);
        println!("Blocks per round:    {:?}", inspection.blocks_per_round);

        if inspection.segmentation.dropped_open_segment {
            println!("\n  [WARN] stream ended inside a segment; it was not counted");
        }
        if inspection.segmentation.discarded_by_practice_restart > 0 {
            println!(
                "\n  [WARN] {} open segment(s) reopened by a practice start",
                inspection.segmentation.discarded_by_practice_restart
            );
        }
        if rounds > 0
            && (inspection.latencies.len() != rounds
                || inspection.segmentation.counts.len() != rounds)
        {
            println!(
                "\n  [WARN] expected {} rounds: {} latencies, {} segments",
                rounds,
                inspection.latencies.len(),
                inspection.segmentation.counts.len()
            );
        }
    }

    Ok(())
}

fn cmd_schema(questionnaire: &Path, delimiter: char, json: bool) -> Result<(), ReconcileCliError> {
    if !delimiter.is_ascii() {
        return Err(ReconcileCliError::InvalidArgument(format!(
            "delimiter must be ASCII, got {:?}",
            delimiter
        )));
    }
    let loaded = Questionnaire::load(questionnaire, delimiter as u8)?;
    let schema: &QuestionnaireSchema = loaded.schema();

    if json {
        println!("{}", serde_json::to_string_pretty(schema)?);
    } else {
        println!("Questionnaire Schema");
        println!("====================");
        println!("Rows:             {}", loaded.len());
        println!("Rounds:           {}", schema.num_rounds);
        println!("Static columns:   {}", schema.static_columns.len());
        println!("Repeating:        {}", schema.repeating_columns.len());
        println!("\nColumns:");
        for column in loaded.headers() {
            println!("  - {}", column);
        }
    }

    Ok(())
}

fn cmd_config() -> Result<(), ReconcileCliError> {
    println!("# {} {}", PRODUCER_NAME, RECONCILE_VERSION);
    print!("{}", StudyConfig::default().to_toml()?);
    Ok(())
}

// Error types

#[derive(Debug)]
enum ReconcileCliError {
    Io(io::Error),
    Reconcile(ReconcileError),
    Json(serde_json::Error),
    InvalidArgument(String),
}

impl From<io::Error> for ReconcileCliError {
    fn from(e: io::Error) -> Self {
        ReconcileCliError::Io(e)
    }
}

impl From<ReconcileError> for ReconcileCliError {
    fn from(e: ReconcileError) -> Self {
        ReconcileCliError::Reconcile(e)
    }
}

impl From<serde_json::Error> for ReconcileCliError {
    fn from(e: serde_json::Error) -> Self {
        ReconcileCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<ReconcileCliError> for CliError {
    fn from(e: ReconcileCliError) -> Self {
        match e {
            ReconcileCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            ReconcileCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: None,
            },
            ReconcileCliError::InvalidArgument(msg) => CliError {
                code: "INVALID_ARGUMENT".to_string(),
                message: msg,
                hint: Some("Run with --help for usage".to_string()),
            },
            ReconcileCliError::Reconcile(e) => {
                let (code, hint) = match &e {
                    ReconcileError::MissingStream { .. } => (
                        "MISSING_STREAM",
                        "Check the recording contains LatencyMarkers and ExpMarkers streams",
                    ),
                    ReconcileError::FileNotFound { .. } => (
                        "FILE_NOT_FOUND",
                        "Check data_dir and document_pattern, or exclude the participant",
                    ),
                    ReconcileError::DocumentParseError { .. } => (
                        "DOCUMENT_PARSE_ERROR",
                        "Re-export the recording to JSON; run 'reconcile inspect' on it",
                    ),
                    ReconcileError::ValidationError { .. } => (
                        "VALIDATION_ERROR",
                        "Fix the questionnaire cell and rerun",
                    ),
                    ReconcileError::SchemaError(_) => (
                        "SCHEMA_ERROR",
                        "Run 'reconcile schema' to see the column layout",
                    ),
                    ReconcileError::ConfigError(_) => (
                        "CONFIG_ERROR",
                        "Run 'reconcile config' for a valid template",
                    ),
                    ReconcileError::Csv(_) => ("CSV_ERROR", "Check the delimiter and row lengths"),
                    ReconcileError::Io(_) => ("IO_ERROR", "Check file paths and permissions"),
                    ReconcileError::EncodingError(_) => ("ENCODING_ERROR", "Report this as a bug"),
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
        }
    }
}
