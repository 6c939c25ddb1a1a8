use anyhow::Context;
use clap::{Parser, Subcommand};
use std::fs::File;
use std::path::{Path, PathBuf};

use pqd_score::article::EditableField;
use pqd_score::error::SessionError;
use pqd_score::filter::YearRange;
use pqd_score::scoring::ScoredArticle;
use pqd_score::session::{CacheStore, EditSession, Outcome};

const EXIT_SUCCESS: i32 = 0;
const EXIT_INPUT: i32 = 1;
const EXIT_STORAGE: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load an ingestion response (JSON) as a new session
    Load {
        /// Path to the JSON file produced by the ingestion service
        file: PathBuf,
    },
    /// Show scored articles and the per-year summary (default if no subcommand)
    Show {
        /// Print articles as tab-separated values
        #[arg(long)]
        tsv: bool,
    },
    /// Set DP, DC or DIS of an article
    Edit {
        /// Index of the article (1-based, as shown by `show`)
        index: usize,
        /// Field to change: dp, dc or dis
        field: EditableField,
        /// New value; anything that is not a number becomes 0
        value: String,
    },
    /// Save the working copy
    Save,
    /// Discard unsaved edits
    ResetEdit,
    /// Forget the session and the saved snapshot
    ResetAll,
    /// Set the student weighting percentage (0-100)
    Weight { percent: f64 },
    /// Restrict to a year range ("2019 2023", "2019-2023" or "2021"); no arguments shows all years
    Years {
        start: Option<String>,
        end: Option<String>,
    },
    /// Show how an article's score is computed
    Explain {
        /// Index of the article (1-based, as shown by `show`)
        index: usize,
    },
    /// Export the current views
    Export {
        #[command(subcommand)]
        target: ExportTarget,
    },
}

#[derive(Subcommand, Debug)]
enum ExportTarget {
    /// Per-year summary as `;`-separated values
    Csv {
        /// Output directory (defaults to the current directory)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Report payload (JSON) for the document renderer
    Report {
        /// Output directory (defaults to the current directory)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Parser, Debug)]
#[command(name = "pqd-score")]
#[command(about = "Qualis article scoring and PQD1 summary", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/pqd-score/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let level = if verbose { "debug" } else { "warn" };

    let filter = tracing_subscriber::EnvFilter::try_from_env("PQD_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

fn fail(code: i32, message: impl std::fmt::Display) -> ! {
    eprintln!("{}", message);
    std::process::exit(code);
}

/// Print what happened; degraded outcomes go to stderr
fn report_outcome(outcome: Outcome, done: &str) {
    match outcome {
        Outcome::Applied => println!("{}", done),
        Outcome::NoOp(reason) => println!("Nothing to do: {}", reason),
        Outcome::Degraded(warning) => {
            println!("{}", done);
            eprintln!("Warning: {}", warning);
        }
    }
}

/// Convert a 1-based index from the command line, checking it against the working copy
fn checked_index(index: usize, len: usize) -> usize {
    if len == 0 {
        fail(EXIT_INPUT, "No data loaded. Run `pqd-score load <file>` first.");
    }
    if index < 1 || index > len {
        fail(
            EXIT_INPUT,
            format!("Invalid index {}. Must be between 1 and {}.", index, len),
        );
    }
    index - 1
}

fn session_failure(e: SessionError) -> ! {
    fail(EXIT_INPUT, format!("Error: {}", e))
}

fn print_views(session: &EditSession<CacheStore>, use_colors: bool, verbose: bool) {
    let views = session.views();
    println!(
        "{}",
        pqd_score::output::format_session_header(session.data(), use_colors)
    );
    println!();
    if verbose {
        for scored in &views.articles {
            println!(
                "{}",
                pqd_score::output::format_article_detail(scored, use_colors)
            );
            println!();
        }
    } else {
        println!(
            "{}",
            pqd_score::output::format_article_table(&views.articles, use_colors)
        );
        println!();
    }
    println!(
        "{}",
        pqd_score::output::format_summary_table(&views.summary, use_colors)
    );
}

fn export_dir(out: Option<PathBuf>) -> PathBuf {
    out.unwrap_or_else(|| PathBuf::from("."))
}

fn load_ingested(file: &Path) -> anyhow::Result<pqd_score::article::Ingested> {
    let reader = File::open(file)
        .with_context(|| format!("Failed to open {}", file.display()))?;
    let ingested = pqd_score::article::read_response(std::io::BufReader::new(reader))
        .with_context(|| format!("Failed to read articles from {}", file.display()))?;
    Ok(ingested)
}

fn main() {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Show { tsv: false });

    if let Err(e) = init_tracing(cli.verbose) {
        eprintln!("{}", e);
    }

    // Load and validate config
    let config_path = cli.config.map(PathBuf::from);
    let config = match pqd_score::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => fail(EXIT_CONFIG, format!("Config error: {:#}", e)),
    };
    if let Err(errors) = pqd_score::config::validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }
    let default_weighting = config.scoring().effective_weighting();
    let export_config = config.export();

    // Restore the session: workspace file first, then the saved snapshot
    let store = CacheStore::new(pqd_score::session::get_snapshot_path());
    let workspace_path = match pqd_score::session::get_workspace_path() {
        Ok(p) => p,
        Err(e) => fail(EXIT_STORAGE, format!("Workspace error: {:#}", e)),
    };
    let mut session = match pqd_score::session::load_workspace(&workspace_path) {
        Ok(Some(data)) => EditSession::from_data(store, data, default_weighting),
        Ok(None) => EditSession::resume(store, default_weighting),
        Err(e) => {
            tracing::warn!(error = %e, "ignoring unreadable workspace");
            eprintln!("Warning: {:#}; starting from the saved snapshot", e);
            EditSession::resume(store, default_weighting)
        }
    };

    let use_colors = pqd_score::output::should_use_colors();
    let mut changed = true;

    match command {
        Commands::Load { file } => {
            let ingested = match load_ingested(&file) {
                Ok(i) => i,
                Err(e) => fail(EXIT_INPUT, format!("Load error: {:#}", e)),
            };
            let name = ingested.person_name.clone();
            let outcome = session
                .load_ingested(ingested)
                .unwrap_or_else(|e| session_failure(e));
            report_outcome(
                outcome,
                &format!("Loaded {} articles for {}", session.working().len(), name),
            );
        }
        Commands::Show { tsv } => {
            changed = false;
            if tsv {
                println!(
                    "{}",
                    pqd_score::output::format_article_tsv(&session.views().articles)
                );
            } else {
                print_views(&session, use_colors, cli.verbose);
            }
        }
        Commands::Edit {
            index,
            field,
            value,
        } => {
            let position = checked_index(index, session.working().len());
            let outcome = session
                .edit(position, field, &value)
                .unwrap_or_else(|e| session_failure(e));
            let stored = session.working()[position].count(field);
            report_outcome(outcome, &format!("Article {}: {} = {}", index, field, stored));
        }
        Commands::Save => {
            let outcome = session.save().unwrap_or_else(|e| session_failure(e));
            report_outcome(outcome, "Saved");
        }
        Commands::ResetEdit => {
            let outcome = session.reset_edit().unwrap_or_else(|e| session_failure(e));
            report_outcome(outcome, "Unsaved edits discarded");
        }
        Commands::ResetAll => {
            let outcome = session.reset_all().unwrap_or_else(|e| session_failure(e));
            if let Err(e) = pqd_score::session::remove_workspace(&workspace_path) {
                fail(EXIT_STORAGE, format!("Workspace error: {:#}", e));
            }
            changed = false;
            report_outcome(outcome, "Session cleared");
        }
        Commands::Weight { percent } => {
            let outcome = session
                .set_weighting(percent)
                .unwrap_or_else(|e| session_failure(e));
            report_outcome(outcome, &format!("Weighting set to {}%", percent));
        }
        Commands::Years { start, end } => {
            let range = match (start.as_deref(), end.as_deref()) {
                (Some(text), None) => match YearRange::parse(text) {
                    Ok(r) => r,
                    Err(e) => fail(EXIT_INPUT, format!("Error: {:#}", e)),
                },
                (start, end) => YearRange::from_bounds(start, end),
            };
            let outcome = session
                .set_year_range(range)
                .unwrap_or_else(|e| session_failure(e));
            report_outcome(outcome, &format!("Showing {}", session.year_range()));
        }
        Commands::Explain { index } => {
            changed = false;
            let position = checked_index(index, session.working().len());
            let result = session
                .explain(position)
                .unwrap_or_else(|e| session_failure(e));
            let scored = ScoredArticle {
                index: position,
                record: session.working()[position].clone(),
                score: result.score,
            };
            println!(
                "{}",
                pqd_score::output::format_article_detail(&scored, use_colors)
            );
            println!("{}", pqd_score::output::format_breakdown(&result));
            if !session.year_range().contains(scored.record.year) {
                println!("  (outside {}, not counted in the summary)", session.year_range());
            }
        }
        Commands::Export { target } => {
            changed = false;
            if session.working().is_empty() {
                fail(EXIT_INPUT, "No data loaded. Run `pqd-score load <file>` first.");
            }
            match target {
                ExportTarget::Csv { out } => {
                    let path = pqd_score::output::export_summary_csv(
                        &export_dir(out),
                        session.person_name(),
                        &session.views().summary,
                        export_config.effective_decimals(),
                    )
                    .unwrap_or_else(|e| fail(EXIT_STORAGE, format!("Export error: {:#}", e)));
                    println!("Summary written to {}", path.display());
                }
                ExportTarget::Report { out } => {
                    let title = export_config.effective_report_title();
                    let report =
                        pqd_score::output::ReportData::new(session.data(), session.views());
                    let path =
                        pqd_score::output::export_report_payload(&export_dir(out), &report, title)
                            .unwrap_or_else(|e| {
                                fail(EXIT_STORAGE, format!("Export error: {:#}", e))
                            });
                    println!(
                        "Report data written to {} (document: {})",
                        path.display(),
                        pqd_score::output::report_file_name(session.person_name(), title)
                    );
                }
            }
        }
    }

    if changed {
        if let Err(e) = pqd_score::session::save_workspace(&workspace_path, session.data()) {
            fail(EXIT_STORAGE, format!("Workspace error: {:#}", e));
        }
    }

    std::process::exit(EXIT_SUCCESS);
}
