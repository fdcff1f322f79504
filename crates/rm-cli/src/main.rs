//! CLI entry point for the repomap tool.
//!
//! This binary keeps `repomap.md` snapshots of tracked repositories
//! up to date, either as a one-shot scan or as a long-running watcher.
//!
//! # Usage
//!
//! ```bash
//! repomap [OPTIONS] <COMMAND>
//!
//! # Scan one project and write its repomap.md
//! repomap scan /path/to/project
//!
//! # Scan with function/class extraction
//! repomap scan /path/to/project --analyze
//!
//! # Watch projects and rescan on change until interrupted
//! repomap watch /path/to/a /path/to/b
//!
//! # Emit project snapshots as JSON
//! repomap report /path/to/project --format json --output report.json
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand, ValueEnum};
use rm_analyzer::HeuristicAnalyzer;
use rm_core::{Config, ProjectStatus, TrackedProject};
use rm_tracker::{MessageReceiver, ProjectTracker, UpdateMessage};
use tracing::{debug, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// How often the watch loop drains the update channel.
const QUEUE_CHECK_INTERVAL: Duration = Duration::from_millis(100);

// =============================================================================
// CLI ARGUMENT TYPES
// =============================================================================

/// CLI tool that tracks repositories and keeps a `repomap.md` structure
/// snapshot current in each project root.
#[derive(Parser)]
#[command(name = "repomap", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    command: Commands,

    /// Path to the configuration file.
    ///
    /// Defaults to `config.json` in the platform data directory.
    #[arg(short, long, global = true, env = "REPOMAP_CONFIG")]
    config: Option<Utf8PathBuf>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Scan a project once and write its repomap.md.
    Scan {
        /// Project root to scan.
        path: Utf8PathBuf,

        /// Extract functions and classes from source files.
        #[arg(short, long)]
        analyze: bool,
    },

    /// Track projects and rescan them on change until interrupted.
    Watch {
        /// Project roots to track. Falls back to the roots saved in the
        /// configuration file when empty.
        paths: Vec<Utf8PathBuf>,

        /// Extract functions and classes from source files.
        #[arg(short, long)]
        analyze: bool,

        /// Save the tracked roots back to the configuration file.
        #[arg(long)]
        save: bool,
    },

    /// Scan projects and emit their snapshots as a report.
    Report {
        /// Project roots to report on. Falls back to the roots saved in
        /// the configuration file when empty.
        paths: Vec<Utf8PathBuf>,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t = ReportFormat::Json)]
        format: ReportFormat,

        /// Output file (defaults to stdout).
        #[arg(short, long)]
        output: Option<Utf8PathBuf>,
    },
}

/// Report output format.
#[derive(Clone, Copy, ValueEnum)]
enum ReportFormat {
    /// JSON format.
    Json,
    /// Plain text summary.
    Text,
}

// =============================================================================
// INITIALIZATION FUNCTIONS
// =============================================================================

/// Initializes the tracing subscriber for logging.
///
/// Respects the `RUST_LOG` environment variable if set. Otherwise, uses
/// `debug` level if `--verbose` is set, or `info` level by default.
/// Noisy crates like `hyper` and `mio` are filtered to `warn` level.
fn init_tracing(verbose: bool, no_color: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "info" };
        EnvFilter::new(format!("{level},hyper=warn,mio=warn,notify=warn"))
    });

    // Check if colors should be disabled (flag or NO_COLOR env var)
    let use_ansi = !no_color && std::env::var("NO_COLOR").is_err();

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_ansi(use_ansi))
        .with(filter)
        .init();
}

/// Loads the configuration from the requested or default location.
fn load_config(cli: &Cli) -> color_eyre::Result<(Config, Utf8PathBuf)> {
    let path = match &cli.config {
        Some(path) => path.clone(),
        None => Config::default_path()
            .ok_or_else(|| color_eyre::eyre::eyre!("could not determine a data directory"))?,
    };
    let config = Config::load(&path);
    debug!(path = %path, "configuration loaded");
    Ok((config, path))
}

/// Creates a tracker, installing the analyzer when requested.
fn create_tracker(config: Config, analyze: bool) -> (ProjectTracker, MessageReceiver) {
    let (tracker, receiver) = ProjectTracker::new(config);
    if analyze {
        tracker.set_analyzer(Some(Arc::new(HeuristicAnalyzer::new())));
    }
    (tracker, receiver)
}

/// Resolves the project roots a command should act on.
fn resolve_roots(paths: Vec<Utf8PathBuf>, config: &Config) -> color_eyre::Result<Vec<Utf8PathBuf>> {
    let roots = if paths.is_empty() {
        config.tracked_roots.clone()
    } else {
        paths
    };
    if roots.is_empty() {
        return Err(color_eyre::eyre::eyre!(
            "no project roots given and none saved in the configuration"
        ));
    }
    Ok(roots)
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

/// Runs a one-shot scan of a single project.
async fn run_scan(config: Config, path: &Utf8Path, analyze: bool) -> color_eyre::Result<()> {
    info!(path = %path, analyze, "Starting scan");

    let (tracker, mut receiver) = create_tracker(config, analyze);
    tracker
        .add_project(path)
        .await
        .map_err(|e| color_eyre::eyre::eyre!("cannot track {path}: {e}"))?;

    let snapshot = wait_for_terminal(&mut receiver, true)
        .await
        .ok_or_else(|| color_eyre::eyre::eyre!("tracker stopped before the scan finished"))?;
    tracker.shutdown().await;

    print_project_summary(&snapshot);
    if snapshot.status == ProjectStatus::Error {
        let reason = snapshot.error_message.unwrap_or_else(|| "unknown".to_owned());
        return Err(color_eyre::eyre::eyre!("scan failed: {reason}"));
    }
    Ok(())
}

/// Tracks projects and drains updates until interrupted.
async fn run_watch(
    mut config: Config,
    config_path: &Utf8Path,
    paths: Vec<Utf8PathBuf>,
    analyze: bool,
    save: bool,
) -> color_eyre::Result<()> {
    let roots = resolve_roots(paths, &config)?;
    info!(projects = roots.len(), analyze, "Starting watch");

    if save {
        config.tracked_roots.clone_from(&roots);
        config
            .save(config_path)
            .map_err(|e| color_eyre::eyre::eyre!("failed to save config to {config_path}: {e}"))?;
        info!(path = %config_path, "tracked roots saved");
    }

    let batch_size = config.tracker.batch_size;
    let (tracker, mut receiver) = create_tracker(config, analyze);
    for root in &roots {
        tracker
            .add_project(root)
            .await
            .map_err(|e| color_eyre::eyre::eyre!("cannot track {root}: {e}"))?;
    }

    let mut tick = tokio::time::interval(QUEUE_CHECK_INTERVAL);
    loop {
        tokio::select! {
            _ = tick.tick() => {
                for message in receiver.try_receive_batch(batch_size) {
                    print_update(&message);
                }
            }
            result = tokio::signal::ctrl_c() => {
                result?;
                info!("Received Ctrl-C, shutting down");
                break;
            }
            () = sigterm() => {
                info!("Received SIGTERM, shutting down");
                break;
            }
        }
    }

    tracker.shutdown().await;
    Ok(())
}

/// Waits for a Unix SIGTERM; pends forever elsewhere.
async fn sigterm() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(_) => std::future::pending().await,
        }
    }
    #[cfg(not(unix))]
    std::future::pending::<()>().await;
}

/// Scans the given projects and emits their snapshots.
async fn run_report(
    config: Config,
    paths: Vec<Utf8PathBuf>,
    format: ReportFormat,
    output: Option<Utf8PathBuf>,
) -> color_eyre::Result<()> {
    let roots = resolve_roots(paths, &config)?;
    info!(projects = roots.len(), "Generating report");

    let analyze = config.analysis_enabled;
    let (tracker, mut receiver) = create_tracker(config, analyze);
    let mut snapshots = Vec::with_capacity(roots.len());
    for root in &roots {
        tracker
            .add_project(root)
            .await
            .map_err(|e| color_eyre::eyre::eyre!("cannot track {root}: {e}"))?;
        let snapshot = wait_for_terminal(&mut receiver, false)
            .await
            .ok_or_else(|| color_eyre::eyre::eyre!("tracker stopped before the scan finished"))?;
        snapshots.push(snapshot);
    }
    tracker.shutdown().await;

    let content = match format {
        ReportFormat::Json => serde_json::to_string_pretty(&snapshots)
            .map_err(|e| color_eyre::eyre::eyre!("failed to serialize report: {e}"))?,
        ReportFormat::Text => generate_text_report(&snapshots),
    };

    if let Some(output_path) = output {
        std::fs::write(output_path.as_std_path(), &content)?;
        info!(path = %output_path, "Report written");
    } else {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        writeln!(handle, "{content}")?;
    }

    Ok(())
}

// =============================================================================
// OUTPUT HELPERS
// =============================================================================

/// Drains the channel until a terminal snapshot arrives.
///
/// Projects are scanned one at a time here, so the first terminal
/// snapshot seen belongs to the project just added. Returns `None` if
/// the tracker stops first.
async fn wait_for_terminal(
    receiver: &mut MessageReceiver,
    show_progress: bool,
) -> Option<TrackedProject> {
    while let Some(message) = receiver.recv().await {
        if show_progress {
            print_update(&message);
        }
        if let UpdateMessage::ProjectUpdate { project, .. } = message {
            if project.status.is_terminal() {
                return Some(*project);
            }
        }
    }
    None
}

/// Prints one update message to stdout.
fn print_update(message: &UpdateMessage) {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();

    match message {
        UpdateMessage::ProjectUpdate { project, .. } => {
            let _ = writeln!(
                handle,
                "[{}] {} - {} files, {} lines",
                project.status.label(),
                project.name,
                project.total_files,
                project.total_lines
            );
        }
        UpdateMessage::Progress { text, percent, .. } => match percent {
            Some(percent) => {
                let _ = writeln!(handle, "  {text} ({percent}%)");
            }
            None => {
                let _ = writeln!(handle, "  {text}");
            }
        },
        UpdateMessage::Status { text } => {
            let _ = writeln!(handle, "{text}");
        }
        UpdateMessage::AnalysisUpdate { file, analysis, .. } => {
            let _ = writeln!(
                handle,
                "  analyzed {file}: {} functions",
                analysis.function_count()
            );
        }
    }
}

/// Prints a summary of one scanned project.
fn print_project_summary(project: &TrackedProject) {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();

    let _ = writeln!(handle);
    let _ = writeln!(handle, "{}", project.name);
    let _ = writeln!(handle, "{}", "=".repeat(project.name.len()));
    let _ = writeln!(handle, "Status:       {}", project.status.label());
    let _ = writeln!(handle, "Language:     {}", project.primary_language);
    let _ = writeln!(handle, "Frameworks:   {}", project.frameworks.join(", "));
    let _ = writeln!(handle, "Total files:  {}", project.total_files);
    let _ = writeln!(handle, "Total lines:  {}", project.total_lines);
    if project.analysis_enabled {
        let _ = writeln!(handle, "Analyzed:     {} files", project.analyzed_files);
        let _ = writeln!(handle, "Functions:    {}", project.total_functions);
    }
    if let Some(error) = &project.error_message {
        let _ = writeln!(handle, "Error:        {error}");
    }
}

/// Generates a plain text report of project snapshots.
fn generate_text_report(snapshots: &[TrackedProject]) -> String {
    use std::fmt::Write;

    let mut output = String::new();
    for project in snapshots {
        let _ = writeln!(
            output,
            "{}\t{}\t{}\t{} files\t{} lines",
            project.name,
            project.status.label(),
            project.primary_language,
            project.total_files,
            project.total_lines
        );
    }
    output
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Application entry point.
#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    // 1. Install color-eyre FIRST (before any potential panics)
    color_eyre::install()?;

    // 2. Parse CLI arguments
    let cli = Cli::parse();

    // 3. Initialize tracing (handles --no-color for log output)
    init_tracing(cli.verbose, cli.no_color);

    // 4. Load configuration
    let (config, config_path) = load_config(&cli)?;

    // 5. Route to appropriate command
    match cli.command {
        Commands::Scan { path, analyze } => run_scan(config, &path, analyze).await,
        Commands::Watch {
            paths,
            analyze,
            save,
        } => run_watch(config, &config_path, paths, analyze, save).await,
        Commands::Report {
            paths,
            format,
            output,
        } => run_report(config, paths, format, output).await,
    }
}
