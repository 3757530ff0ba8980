use std::io::{self, IsTerminal};
use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use scorescan::app::{MergeSession, ParseSession, SessionSummary};
use scorescan::config::{ConfigLoader, ResolvedConfig};
use scorescan::confirm::{AutoConfirm, ConfirmationService, DuplicatePolicy};
use scorescan::error::ScanError;
use scorescan::output::{OutputMode, RowOutput, SummaryOutput};
use scorescan::season::Season;
use scorescan::store::MatchStore;
use scorescan::tui::TerminalPrompter;
use scorescan::validate::TeamRoster;

#[derive(Parser)]
#[command(name = "scorescan")]
#[command(about = "Decode scouting-sheet scans (one JSON object per line on stdin) into CSV match data")]
#[command(version, author)]
struct Cli {
    #[arg(long, global = true, help = "JSON config file (default: ./scorescan.json, then the user config directory)")]
    config: Option<String>,

    #[arg(long, global = true, help = "Stop at the first scan line that fails to decode")]
    strict: bool,

    #[arg(long, global = true, help = "Print the session summary as JSON")]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Print decoded rows and optionally append them to a CSV file")]
    Parse(ParseArgs),
    #[command(about = "Merge decoded rows into an existing match data CSV, checking teams and duplicates")]
    Merge(MergeArgs),
}

#[derive(Args)]
struct ParseArgs {
    #[arg(long)]
    season: Option<Season>,

    #[arg(help = "CSV file to append rows to; created with a header if missing")]
    destination: Option<Utf8PathBuf>,
}

#[derive(Args)]
struct MergeArgs {
    #[arg(long)]
    season: Option<Season>,

    #[arg(long)]
    on_duplicate: Option<DuplicatePolicy>,

    #[arg(help = "Existing match data CSV")]
    match_data: Utf8PathBuf,

    #[arg(help = "Newline-delimited list of valid team numbers")]
    teams: Utf8PathBuf,
}

fn main() -> ExitCode {
    match run() {
        Ok(summary) if summary.has_failures() => ExitCode::from(1),
        Ok(_) => ExitCode::SUCCESS,
        Err(report) => {
            eprintln!("{report:?}");
            if let Some(scan) = report.downcast_ref::<ScanError>() {
                return ExitCode::from(map_exit_code(scan));
            }
            ExitCode::from(1)
        }
    }
}

fn map_exit_code(error: &ScanError) -> u8 {
    match error {
        ScanError::StoreMissing(_)
        | ScanError::RosterMissing(_)
        | ScanError::InvalidRoster { .. }
        | ScanError::MissingKeyColumn(_)
        | ScanError::ConfigRead(_)
        | ScanError::ConfigParse(_)
        | ScanError::InvalidConfig(_) => 2,
        _ => 1,
    }
}

fn run() -> miette::Result<SessionSummary> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ConfigLoader::resolve(cli.config.as_deref())?;
    let strict = cli.strict || config.strict;
    let mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Text
    };

    let summary = match cli.command {
        Commands::Parse(args) => run_parse(args, &config, strict)?,
        Commands::Merge(args) => run_merge(args, &config, strict)?,
    };

    SummaryOutput::print(&summary, mode).map_err(|err| ScanError::Filesystem(err.to_string()))?;
    Ok(summary)
}

fn run_parse(
    args: ParseArgs,
    config: &ResolvedConfig,
    strict: bool,
) -> Result<SessionSummary, ScanError> {
    let season = args.season.unwrap_or(config.season);
    info!(%season, destination = ?args.destination, "parsing scans");
    let mut session = ParseSession::new(season, args.destination, RowOutput::stdout());
    session.run(io::stdin().lock(), strict)
}

fn run_merge(
    args: MergeArgs,
    config: &ResolvedConfig,
    strict: bool,
) -> Result<SessionSummary, ScanError> {
    let season = args.season.unwrap_or(config.season);
    let roster = TeamRoster::load(&args.teams)?;
    let store = MatchStore::load(&args.match_data)?;
    info!(%season, teams = roster.len(), rows = store.len(), "merging scans");

    let policy = args.on_duplicate.unwrap_or(config.on_duplicate);
    let confirm = confirmation_for(policy);
    let mut session = MergeSession::new(
        season,
        store,
        roster,
        config.rules,
        confirm,
        RowOutput::stdout(),
    )?;
    session.run(io::stdin().lock(), strict)
}

fn confirmation_for(policy: DuplicatePolicy) -> Box<dyn ConfirmationService> {
    match policy {
        DuplicatePolicy::Overwrite => Box::new(AutoConfirm::overwrite()),
        DuplicatePolicy::Skip => Box::new(AutoConfirm::skip()),
        DuplicatePolicy::Ask if io::stderr().is_terminal() => Box::new(TerminalPrompter::new()),
        DuplicatePolicy::Ask => {
            warn!("no terminal for prompts; duplicates will be kept as they are");
            Box::new(AutoConfirm::skip())
        }
    }
}
