use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glob::glob;
use rackwire_core::{PipelineConfig, ReplayReport};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("RACKWIRE_BUILD_COMMIT"),
    " ",
    env!("RACKWIRE_BUILD_DATE"),
    ")"
);

const EXAMPLES: &str = "Examples:\n  rackwire capture replay capture.jsonl -o report.json\n  rackwire capture replay capture.jsonl --stdout --pretty\n  rackwire capture replay 'captures/rack4-*.jsonl' -o report.json --list-rejections";

#[derive(Parser, Debug)]
#[command(name = "rackwire")]
#[command(version = VERSION)]
#[command(
    about = "Decode and normalize rack-monitoring device messages from recorded captures.",
    long_about = None,
    after_help = EXAMPLES
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Operations on recorded message captures (JSON Lines).
    Capture {
        #[command(subcommand)]
        command: CaptureCommands,
    },
}

#[derive(Subcommand, Debug)]
enum CaptureCommands {
    /// Replay a capture through the pipeline and write a versioned JSON report.
    #[command(alias = "run")]
    #[command(after_help = EXAMPLES)]
    Replay(ReplayArgs),
}

#[derive(clap::Args, Debug)]
struct ReplayArgs {
    /// Path to a .jsonl capture (glob patterns must match exactly one file)
    input: PathBuf,

    /// Output report path (JSON)
    #[arg(short = 'o', long, required_unless_present = "stdout")]
    report: Option<PathBuf>,

    /// Write JSON report to stdout
    #[arg(long, conflicts_with = "report")]
    stdout: bool,

    /// Pretty-print JSON output
    #[arg(long, conflicts_with = "compact")]
    pretty: bool,

    /// Compact JSON output (default)
    #[arg(long)]
    compact: bool,

    /// Suppress non-error output
    #[arg(long)]
    quiet: bool,

    /// Exit with a non-zero code if any message was rejected
    #[arg(long)]
    strict: bool,

    /// List rejection ids and counts after the replay
    #[arg(long)]
    list_rejections: bool,

    /// Pipeline configuration file (JSON)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log filter for diagnostics on stderr (overrides RUST_LOG)
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Capture { command } => match command {
            CaptureCommands::Replay(args) => {
                init_logging(args.log_level.as_deref(), args.quiet).and_then(|()| cmd_replay(args))
            }
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{err:#}"), None)
    }
}

fn init_logging(level: Option<&str>, quiet: bool) -> Result<(), CliError> {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level).map_err(|err| {
            CliError::new(
                format!("invalid log level '{}'", level),
                Some(format!("use error, warn, info, debug or trace ({})", err)),
            )
        })?,
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(if quiet { "error" } else { "warn" })),
    };
    // A subscriber may already be installed when embedded; keep the existing one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
    Ok(())
}

fn cmd_replay(args: ReplayArgs) -> Result<(), CliError> {
    let resolved_input = resolve_input_path(&args.input)?;
    validate_input_file(&resolved_input)?;
    let input_abs = fs::canonicalize(&resolved_input)
        .with_context(|| format!("Failed to resolve input path: {}", resolved_input.display()))?;

    let report_path = if args.stdout {
        None
    } else {
        Some(args.report.clone().ok_or_else(|| {
            CliError::new(
                "missing output path",
                Some("use -o/--report or --stdout".to_string()),
            )
        })?)
    };
    if let Some(report_path) = report_path.as_ref() {
        ensure_distinct_output(report_path, &input_abs)?;
    }

    let config = load_config(args.config.as_deref())?;
    debug!(input = %resolved_input.display(), "replaying capture");
    let rep = rackwire_core::replay_file(&resolved_input, &config)
        .context("capture replay failed")?;
    let json = serialize_report(&rep, args.pretty, args.compact)?;

    match report_path {
        None => print!("{}", json),
        Some(report) => {
            if let Some(parent) = report.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create output directory: {}", parent.display())
                    })?;
                }
            }
            fs::write(&report, json)
                .with_context(|| format!("Failed to write report: {}", report.display()))?;
            if !args.quiet {
                eprintln!(
                    "OK: {} records from {} messages -> {}",
                    rep.summary.records_total,
                    rep.summary.messages_total,
                    report.display()
                );
            }
        }
    }

    if args.list_rejections && !args.quiet {
        print_rejections(&rep);
    }
    if args.strict && rep.summary.messages_rejected > 0 {
        return Err(CliError::new(
            format!(
                "rejected messages detected ({})",
                rep.summary.messages_rejected
            ),
            Some("use --list-rejections to inspect".to_string()),
        ));
    }
    Ok(())
}

fn ensure_distinct_output(report_path: &Path, input_abs: &Path) -> Result<(), CliError> {
    let report_dir = report_path
        .parent()
        .map(|parent| {
            if parent.as_os_str().is_empty() {
                fs::canonicalize(".")
            } else {
                fs::canonicalize(parent)
            }
        })
        .transpose();
    // A missing output directory is created later and cannot hold the input.
    let Ok(Some(report_dir)) = report_dir else {
        return Ok(());
    };
    let file_name = report_path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Invalid report path: {}", report_path.display()))?;
    if report_dir.join(file_name) == input_abs {
        return Err(CliError::new(
            format!(
                "report path must differ from input: {}",
                report_path.display()
            ),
            Some("choose a different output path".to_string()),
        ));
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig, CliError> {
    let Some(path) = path else {
        return Ok(PipelineConfig::default());
    };
    PipelineConfig::load(path).map_err(|err| {
        CliError::new(
            format!("invalid configuration: {}", err),
            Some("expected JSON with v5008_namespace, v6800_namespace, capture_namespaces".to_string()),
        )
    })
}

fn serialize_report(rep: &ReplayReport, pretty: bool, compact: bool) -> Result<String, CliError> {
    if pretty && compact {
        return Err(CliError::new(
            "cannot use --pretty and --compact together",
            Some("choose one output format".to_string()),
        ));
    }
    if pretty {
        serde_json::to_string_pretty(rep)
            .context("JSON serialization failed")
            .map_err(Into::into)
    } else {
        serde_json::to_string(rep)
            .context("JSON serialization failed")
            .map_err(Into::into)
    }
}

fn print_rejections(rep: &ReplayReport) {
    eprintln!("Rejections:");
    if rep.rejections.is_empty() {
        eprintln!("  none");
        return;
    }
    for rejection in &rep.rejections {
        eprintln!(
            "  {} {} ({})",
            rejection.id, rejection.message, rejection.count
        );
        for example in &rejection.examples {
            eprintln!("    {}", example);
        }
    }
}

fn validate_input_file(input: &Path) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("use a .jsonl capture file".to_string()),
        ));
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("use a .jsonl capture file".to_string()),
        ));
    }
    let ext = input
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    if ext != "jsonl" && ext != "ndjson" {
        return Err(CliError::new(
            format!("unsupported input format '{}'", input.display()),
            Some("expected a .jsonl or .ndjson capture file".to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_path(input: &Path) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.to_path_buf());
    }

    let mut matches = Vec::new();
    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    if matches.is_empty() {
        return Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern; expected .jsonl".to_string()),
        ));
    }
    if matches.len() > 1 {
        let listed = matches
            .iter()
            .take(3)
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let more = if matches.len() > 3 { ", ..." } else { "" };
        return Err(CliError::new(
            format!(
                "multiple files match pattern '{}' ({} matches); matches: {}{}",
                pattern,
                matches.len(),
                listed,
                more
            ),
            Some("pass a single capture file, or run once per file".to_string()),
        ));
    }

    Ok(matches.remove(0))
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
