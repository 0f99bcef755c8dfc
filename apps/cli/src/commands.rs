//! CLI command definitions, routing, and tracing setup.

use std::io::Read;
use std::io::Write as _;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use tracing::info;

use showcase_forms::{FieldMap, parse_submission};
use showcase_pipeline::{attachments, scaffold, schedule, validate};
use showcase_shared::{CohortYear, MergeOutcome, load_config};
use showcase_store::RecordStore;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Showcase — turn issue-form submissions into published cohort content.
#[derive(Parser)]
#[command(
    name = "showcase",
    version,
    about = "Issue-to-content pipelines for the cohort showcase site.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Site root directory (holds cohorts/, _data/, showcase.toml).
    #[arg(long, default_value = ".", global = true)]
    pub site_root: PathBuf,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Workflow-outputs file to append `key=value` results to.
    #[arg(long, env = "GITHUB_OUTPUT", global = true)]
    pub github_output: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// A form submission source shared by the submission-driven commands.
#[derive(clap::Args, Debug)]
pub(crate) struct SubmissionArgs {
    /// File holding the raw submission body (`-` for stdin).
    #[arg(long)]
    pub body_file: Option<PathBuf>,

    /// Raw submission body (falls back to the ISSUE_BODY env var).
    #[arg(long, env = "ISSUE_BODY", hide_env_values = true)]
    pub body: Option<String>,

    /// Submission title, used as a fallback for record titles.
    #[arg(long, env = "ISSUE_TITLE", default_value = "")]
    pub title: String,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Cohort schedule operations.
    Schedule {
        #[command(subcommand)]
        action: ScheduleAction,
    },

    /// Merge attachments into an existing event record.
    Attachments {
        #[command(flatten)]
        submission: SubmissionArgs,
    },

    /// Create new records at their canonical paths.
    New {
        #[command(subcommand)]
        action: NewAction,
    },

    /// Provision cohort-scoped site structure.
    Scaffold {
        #[command(subcommand)]
        action: ScaffoldAction,
    },

    /// Inspect persisted event records.
    Events {
        #[command(subcommand)]
        action: EventsAction,
    },

    /// Search corpus maintenance.
    SearchIndex {
        #[command(subcommand)]
        action: SearchIndexAction,
    },

    /// Repository health checks.
    Check {
        #[command(subcommand)]
        action: CheckAction,
    },
}

/// Schedule subcommands.
#[derive(Subcommand)]
pub(crate) enum ScheduleAction {
    /// Replace the year's event list from a submission, idempotently.
    Update {
        #[command(flatten)]
        submission: SubmissionArgs,
    },
    /// Preview the normalized event ids a submission would produce.
    Preview {
        #[command(flatten)]
        submission: SubmissionArgs,
    },
}

/// Record-creation subcommands.
#[derive(Subcommand)]
pub(crate) enum NewAction {
    /// Scaffold a new team record.
    Team {
        #[command(flatten)]
        submission: SubmissionArgs,
    },
    /// Scaffold a new event record.
    Event {
        #[command(flatten)]
        submission: SubmissionArgs,
    },
}

/// Scaffolding subcommands.
#[derive(Subcommand)]
pub(crate) enum ScaffoldAction {
    /// Provision a cohort year (index page, teams dir, seeded data file).
    Year {
        /// Four-digit cohort year.
        year: String,
    },
}

/// Event-inspection subcommands.
#[derive(Subcommand)]
pub(crate) enum EventsAction {
    /// List the events persisted for a cohort year.
    List {
        /// Four-digit cohort year.
        year: String,
    },
}

/// Search-corpus subcommands.
#[derive(Subcommand)]
pub(crate) enum SearchIndexAction {
    /// Build the search corpus (search.json) from published records.
    Build,
}

/// Health-check subcommands.
#[derive(Subcommand)]
pub(crate) enum CheckAction {
    /// Validate the front matter of every persisted team record.
    FrontMatter,
    /// Reject repository files larger than the hosting limit.
    FileSizes {
        /// Size limit in megabytes.
        #[arg(long, default_value_t = 50)]
        max_mb: u64,
    },
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "showcase=info",
        1 => "showcase=debug",
        _ => "showcase=trace",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli.site_root)?;
    let scaffold_config = config.scaffold.clone();
    let store = RecordStore::open(&cli.site_root, config);
    let outputs = cli.github_output.as_deref();

    match cli.command {
        Command::Schedule { action } => match action {
            ScheduleAction::Update { submission } => {
                let (fields, _title) = submission.parse()?;
                let outcome = schedule::update_schedule(&store, &fields)?;
                report_outcome(&outcome, outputs)
            }
            ScheduleAction::Preview { submission } => {
                let (fields, _title) = submission.parse()?;
                let preview = schedule::preview_schedule(&fields);
                println!("{}", preview.markdown);
                if let Some(path) = outputs {
                    let mut out = OutputsFile::open(path)?;
                    out.kv("year", &preview.year)?;
                    out.heredoc("preview_ids", &preview.markdown)?;
                }
                Ok(())
            }
        },
        Command::Attachments { submission } => {
            let (fields, _title) = submission.parse()?;
            let outcome = attachments::update_attachments(&store, &fields)?;
            report_outcome(&outcome, outputs)
        }
        Command::New { action } => match action {
            NewAction::Team { submission } => {
                let (fields, title) = submission.parse()?;
                let outcome = scaffold::new_team(&store, &scaffold_config, &fields, &title)?;
                report_outcome(&outcome, outputs)
            }
            NewAction::Event { submission } => {
                let (fields, title) = submission.parse()?;
                let outcome = scaffold::new_event(&store, &scaffold_config, &fields, &title)?;
                report_outcome(&outcome, outputs)
            }
        },
        Command::Scaffold { action } => match action {
            ScaffoldAction::Year { year } => {
                let year: CohortYear = year.parse()?;
                let outcome = scaffold::scaffold_year(&store, &year)?;
                report_outcome(&outcome, outputs)
            }
        },
        Command::Events { action } => match action {
            EventsAction::List { year } => {
                let year: CohortYear = year.parse()?;
                let events = store.list_events(&year)?;
                if events.is_empty() {
                    println!("No events found in this cohort schedule.");
                }
                for event in events {
                    match event.date {
                        Some(date) => println!("- {} — {} ({date})", event.id, event.name),
                        None => println!("- {} — {}", event.id, event.name),
                    }
                }
                Ok(())
            }
        },
        Command::SearchIndex { action } => match action {
            SearchIndexAction::Build => {
                let index = showcase_search::build_index(&store)?;
                showcase_search::write_index(&store, &index)?;
                println!(
                    "Wrote {} documents to {}",
                    index.docs.len(),
                    store.search_index_path().display()
                );
                Ok(())
            }
        },
        Command::Check { action } => match action {
            CheckAction::FrontMatter => {
                let failures = validate::check_team_front_matter(&store)?;
                if failures.is_empty() {
                    println!("Front matter validation passed.");
                    Ok(())
                } else {
                    for failure in &failures {
                        eprintln!("{failure}");
                    }
                    Err(eyre!("front matter validation failed ({} records)", failures.len()))
                }
            }
            CheckAction::FileSizes { max_mb } => {
                let failures =
                    validate::check_file_sizes(&cli.site_root, max_mb * 1024 * 1024)?;
                if failures.is_empty() {
                    println!("All files are within the {max_mb} MB limit.");
                    Ok(())
                } else {
                    for failure in &failures {
                        eprintln!("{failure}");
                    }
                    Err(eyre!("oversized files found ({})", failures.len()))
                }
            }
        },
    }
}

impl SubmissionArgs {
    /// Resolve the submission body and parse it into a field map.
    fn parse(&self) -> Result<(FieldMap, String)> {
        let body = match (&self.body_file, &self.body) {
            (Some(path), _) if path.as_os_str() == "-" => {
                let mut buf = String::new();
                std::io::stdin().read_to_string(&mut buf)?;
                buf
            }
            (Some(path), _) => std::fs::read_to_string(path)
                .map_err(|e| eyre!("cannot read {}: {e}", path.display()))?,
            (None, Some(body)) => body.clone(),
            (None, None) => {
                return Err(eyre!(
                    "no submission body: pass --body-file, --body, or set ISSUE_BODY"
                ));
            }
        };
        if body.trim().is_empty() {
            return Err(eyre!("submission body is empty"));
        }
        info!(bytes = body.len(), "parsing submission");
        Ok((parse_submission(&body), self.title.clone()))
    }
}

// ---------------------------------------------------------------------------
// Result reporting
// ---------------------------------------------------------------------------

/// Print the human summary and append workflow outputs when requested.
fn report_outcome(outcome: &MergeOutcome, outputs: Option<&std::path::Path>) -> Result<()> {
    println!("{}", outcome.message);
    if let Some(summary) = &outcome.summary {
        println!("{summary}");
    }
    if let Some(branch) = &outcome.branch {
        println!("  branch: {branch}");
    }

    if let Some(path) = outputs {
        let mut out = OutputsFile::open(path)?;
        out.kv("changed", if outcome.changed { "true" } else { "false" })?;
        if let Some(slug) = &outcome.slug {
            out.kv("slug", slug)?;
        }
        if let Some(branch) = &outcome.branch {
            out.kv("branch", branch)?;
        }
        if let Some(summary) = &outcome.summary {
            out.heredoc("summary", summary)?;
        }
    }
    Ok(())
}

/// Append-only writer for the workflow-outputs file.
struct OutputsFile {
    file: std::fs::File,
}

impl OutputsFile {
    fn open(path: &std::path::Path) -> Result<Self> {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| eyre!("cannot open outputs file {}: {e}", path.display()))?;
        Ok(Self { file })
    }

    fn kv(&mut self, key: &str, value: &str) -> Result<()> {
        writeln!(self.file, "{key}={value}")?;
        Ok(())
    }

    /// Multi-line value in the heredoc form the workflow runner expects.
    fn heredoc(&mut self, key: &str, value: &str) -> Result<()> {
        writeln!(self.file, "{key}<<EOF")?;
        writeln!(self.file, "{value}")?;
        writeln!(self.file, "EOF")?;
        Ok(())
    }
}
