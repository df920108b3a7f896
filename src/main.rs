use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tracing::{debug, info, warn};

use jrp::config::AppConfig;
use jrp::db::HistoryStore;
use jrp::dictionary::Dictionary;
use jrp::download::download_dictionary;
use jrp::error::JrpError;
use jrp::generator::Generator;
use jrp::interactive::{self, InteractiveOptions, TerminalKeys, KEY_LEGEND};
use jrp::logging::init_logging;
use jrp::models::{GenerationRequest, NewPhrase, SearchMode};
use jrp::paths::{self, DbKind};
use jrp::render::write_phrases;
use jrp::service::HistoryService;
use jrp::validation::InputValidator;

/// Rows shown by show/search verbs when no number is given
const DEFAULT_SHOW_NUMBER: usize = 10;

#[derive(Parser)]
#[command(name = "jrp", author, version, about, long_about = None, args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    generate: GenerateArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate random phrases (default)
    #[command(visible_aliases = ["gen", "g"])]
    Generate(GenerateArgs),
    /// Generate phrases one at a time and decide with a single key
    #[command(visible_aliases = ["int", "i"])]
    Interactive(InteractiveArgs),
    /// Show, search or remove generated phrases
    #[command(visible_aliases = ["hist", "h"], args_conflicts_with_subcommands = true)]
    History {
        #[command(subcommand)]
        command: Option<HistoryCommands>,

        #[command(flatten)]
        show: ShowArgs,
    },
    /// Manage favorited phrases
    #[command(visible_aliases = ["fav", "f"], args_conflicts_with_subcommands = true)]
    Favorite {
        #[command(subcommand)]
        command: Option<FavoriteCommands>,

        #[command(flatten)]
        show: ShowArgs,
    },
    /// Download the WordNet Japanese database
    #[command(visible_aliases = ["dl", "d"])]
    Download,
    /// Print the version
    Version,
    /// Print a shell completion script
    Completion {
        /// Target shell
        shell: Shell,
    },
}

#[derive(Args, Debug, Clone, Default)]
struct GenerateArgs {
    /// Number of phrases (the larger of this and --number wins)
    #[arg(value_name = "NUMBER")]
    number_arg: Option<usize>,

    /// Number of phrases
    #[arg(short, long)]
    number: Option<usize>,

    /// Adjective the phrase starts with
    #[arg(short, long, conflicts_with = "suffix")]
    prefix: Option<String>,

    /// Noun the phrase ends with
    #[arg(short, long)]
    suffix: Option<String>,

    /// Do not save generated phrases
    #[arg(short, long)]
    dry_run: bool,

    /// Decide on each phrase interactively
    #[arg(short, long)]
    interactive: bool,

    /// Seconds to wait for a key in interactive mode
    #[arg(short, long)]
    timeout: Option<u64>,
}

#[derive(Args, Debug, Clone, Default)]
struct InteractiveArgs {
    /// Adjective the phrase starts with
    #[arg(short, long, conflicts_with = "suffix")]
    prefix: Option<String>,

    /// Noun the phrase ends with
    #[arg(short, long)]
    suffix: Option<String>,

    /// Seconds to wait for a key
    #[arg(short, long)]
    timeout: Option<u64>,
}

#[derive(Args, Debug, Clone, Default)]
struct ShowArgs {
    /// Number of rows (the larger of this and --number wins)
    #[arg(value_name = "NUMBER")]
    number_arg: Option<usize>,

    /// Number of rows
    #[arg(short, long)]
    number: Option<usize>,

    /// Show every row
    #[arg(short, long)]
    all: bool,
}

#[derive(Args, Debug, Clone)]
struct SearchArgs {
    /// Keywords to look for
    #[arg(required = true)]
    keywords: Vec<String>,

    /// Require every keyword instead of any
    #[arg(short = 'A', long = "and")]
    and: bool,

    /// Number of rows
    #[arg(short, long)]
    number: Option<usize>,

    /// Show every match
    #[arg(short, long)]
    all: bool,
}

#[derive(Subcommand)]
enum HistoryCommands {
    /// Show recent phrases
    Show(ShowArgs),
    /// Search phrases by keyword
    Search(SearchArgs),
    /// Remove phrases by id
    Remove {
        /// Ids to remove
        #[arg(required_unless_present = "all")]
        ids: Vec<String>,

        /// Remove every phrase
        #[arg(short, long)]
        all: bool,

        /// Remove favorites too
        #[arg(short, long)]
        force: bool,

        /// Do not ask for confirmation
        #[arg(long)]
        no_confirm: bool,
    },
    /// Remove every phrase
    Clear {
        /// Remove favorites too
        #[arg(short, long)]
        force: bool,

        /// Do not ask for confirmation
        #[arg(long)]
        no_confirm: bool,
    },
}

#[derive(Subcommand)]
enum FavoriteCommands {
    /// Show favorited phrases
    Show(ShowArgs),
    /// Favorite phrases by id
    Add {
        /// Ids to favorite
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Search favorited phrases by keyword
    Search(SearchArgs),
    /// Unfavorite phrases by id
    Remove {
        /// Ids to unfavorite
        #[arg(required_unless_present = "all")]
        ids: Vec<String>,

        /// Unfavorite every phrase
        #[arg(short, long)]
        all: bool,

        /// Do not ask for confirmation
        #[arg(long)]
        no_confirm: bool,
    },
    /// Unfavorite every phrase
    Clear {
        /// Do not ask for confirmation
        #[arg(long)]
        no_confirm: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Initialize logging
    let log_file = config.logging.file_path.as_ref().map(PathBuf::from);
    let log_level = config.get_log_level();
    let _log_guard = init_logging(Some(log_level.as_str()), log_file.as_deref(), &config.logging.format)?;

    debug!("Starting jrp");

    match cli.command {
        None => run_generate(&config, &cli.generate),
        Some(Commands::Generate(args)) => run_generate(&config, &args),
        Some(Commands::Interactive(args)) => run_interactive(&config, args.prefix, args.suffix, args.timeout),
        Some(Commands::History { command, show }) => {
            run_history(command.unwrap_or(HistoryCommands::Show(show)))
        },
        Some(Commands::Favorite { command, show }) => {
            run_favorite(command.unwrap_or(FavoriteCommands::Show(show)))
        },
        Some(Commands::Download) => run_download(&config).await,
        Some(Commands::Version) => {
            writeln!(io::stdout().lock(), "jrp {}", env!("CARGO_PKG_VERSION"))?;
            Ok(())
        },
        Some(Commands::Completion { shell }) => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "jrp", &mut io::stdout().lock());
            Ok(())
        },
    }
}

/// The larger of a flag and a positional number; `fallback` when neither is given
fn effective_number(flag: Option<usize>, positional: Option<usize>, fallback: usize) -> usize {
    match (flag, positional) {
        (None, None) => fallback,
        (a, b) => a.unwrap_or(0).max(b.unwrap_or(0)),
    }
}

fn show_limit(args: &ShowArgs) -> usize {
    if args.all {
        0
    } else {
        effective_number(args.number, args.number_arg, DEFAULT_SHOW_NUMBER)
    }
}

fn search_limit(args: &SearchArgs) -> usize {
    if args.all {
        0
    } else {
        args.number.unwrap_or(DEFAULT_SHOW_NUMBER)
    }
}

fn open_history() -> Result<HistoryStore> {
    let path = paths::resolve_file(DbKind::History)?;
    debug!(path = %path.display(), "Opening history database");
    Ok(HistoryStore::new(path)?)
}

fn open_service() -> Result<HistoryService<Dictionary>> {
    let dictionary = Dictionary::open(paths::resolve_file(DbKind::Dictionary)?)?;
    Ok(HistoryService::new(Generator::new(dictionary), open_history()?))
}

fn run_generate(config: &AppConfig, args: &GenerateArgs) -> Result<()> {
    if args.interactive {
        return run_interactive(config, args.prefix.clone(), args.suffix.clone(), args.timeout);
    }

    let request = GenerationRequest {
        count: effective_number(args.number, args.number_arg, config.generate.default_number),
        prefix: args.prefix.clone(),
        suffix: args.suffix.clone(),
    };
    InputValidator::validate_request(&request)?;

    let service = open_service()?;
    let mut out = io::stdout().lock();

    match service.generate_and_save(&request, args.dry_run) {
        Ok(rows) => {
            write_phrases(&mut out, &rows)?;
            Ok(())
        },
        Err(JrpError::PersistFailed { generated, source }) => {
            // Show what was generated even though it could not be stored
            let rows: Vec<_> = generated.into_iter().map(NewPhrase::into_unsaved).collect();
            write_phrases(&mut out, &rows)?;
            Err(anyhow::Error::new(*source).context("Failed to save generated phrases"))
        },
        Err(e) => Err(e.into()),
    }
}

fn run_interactive(
    config: &AppConfig,
    prefix: Option<String>,
    suffix: Option<String>,
    timeout: Option<u64>,
) -> Result<()> {
    let options = InteractiveOptions {
        timeout: Duration::from_secs(timeout.unwrap_or(config.interactive.timeout_secs)),
        batch_size: config.interactive.batch_size,
        prefix,
        suffix,
    };
    InputValidator::validate_request(&GenerationRequest {
        count: 1,
        prefix: options.prefix.clone(),
        suffix: options.suffix.clone(),
    })?;

    let service = open_service()?;
    let mut out = io::stdout().lock();
    writeln!(out, "{KEY_LEGEND}")?;

    let summary = interactive::run(&service, &mut TerminalKeys, &mut out, &options)?;
    info!(rounds = summary.rounds, saved = summary.saved.len(), "Interactive session finished");

    if !summary.saved.is_empty() {
        writeln!(out)?;
        write_phrases(&mut out, &summary.saved)?;
    }

    match summary.error {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

fn run_history(command: HistoryCommands) -> Result<()> {
    let store = open_history()?;
    let mut out = io::stdout().lock();

    match command {
        HistoryCommands::Show(args) => {
            write_phrases(&mut out, &store.get_recent(show_limit(&args))?)?;
        },
        HistoryCommands::Search(args) => {
            let keywords = InputValidator::split_keywords(&args.keywords)?;
            let rows = store.search(&keywords, search_mode(args.and), search_limit(&args))?;
            write_phrases(&mut out, &rows)?;
        },
        HistoryCommands::Remove {
            ids,
            all,
            force,
            no_confirm,
        } => {
            if all {
                return clear_history(&store, &mut out, force, no_confirm);
            }
            let ids = InputValidator::parse_ids(&ids)?;
            if !no_confirm && !confirm(&mut out, &format!("Remove {} phrase(s)?", ids.len()))? {
                return Ok(());
            }
            let outcome = store.remove_ids(&ids, force)?;
            writeln!(out, "Removed {} phrase(s).", outcome.removed.len())?;
            if !outcome.skipped_favorite.is_empty() {
                writeln!(
                    out,
                    "Kept favorites {:?} (use --force to remove them).",
                    outcome.skipped_favorite
                )?;
            }
            if !outcome.not_found.is_empty() {
                writeln!(out, "Not found: {:?}", outcome.not_found)?;
            }
        },
        HistoryCommands::Clear { force, no_confirm } => {
            return clear_history(&store, &mut out, force, no_confirm);
        },
    }

    Ok(())
}

fn clear_history<W: Write>(store: &HistoryStore, out: &mut W, force: bool, no_confirm: bool) -> Result<()> {
    let prompt = if force {
        "Remove every phrase, favorites included?"
    } else {
        "Remove every phrase except favorites?"
    };
    if !no_confirm && !confirm(out, prompt)? {
        return Ok(());
    }
    let removed = store.remove_all(force)?;
    writeln!(out, "Removed {removed} phrase(s).")?;
    Ok(())
}

fn run_favorite(command: FavoriteCommands) -> Result<()> {
    let store = open_history()?;
    let mut out = io::stdout().lock();

    match command {
        FavoriteCommands::Show(args) => {
            write_phrases(&mut out, &store.get_favorites(show_limit(&args))?)?;
        },
        FavoriteCommands::Add { ids } => {
            let ids = InputValidator::parse_ids(&ids)?;
            let outcome = store.favorite_ids(&ids)?;
            write_phrases(&mut out, &store.get_by_ids(&outcome.added)?)?;
            if !outcome.not_added.is_empty() {
                writeln!(out, "Not added (already favorited or not found): {:?}", outcome.not_added)?;
            }
        },
        FavoriteCommands::Search(args) => {
            let keywords = InputValidator::split_keywords(&args.keywords)?;
            let rows = store.search_favorites(&keywords, search_mode(args.and), search_limit(&args))?;
            write_phrases(&mut out, &rows)?;
        },
        FavoriteCommands::Remove { ids, all, no_confirm } => {
            if all {
                return clear_favorites(&store, &mut out, no_confirm);
            }
            let ids = InputValidator::parse_ids(&ids)?;
            if !no_confirm && !confirm(&mut out, &format!("Unfavorite {} phrase(s)?", ids.len()))? {
                return Ok(());
            }
            let outcome = store.unfavorite_ids(&ids)?;
            writeln!(out, "Unfavorited {} phrase(s).", outcome.removed.len())?;
            if !outcome.not_removed.is_empty() {
                writeln!(out, "Not favorited or not found: {:?}", outcome.not_removed)?;
            }
        },
        FavoriteCommands::Clear { no_confirm } => {
            return clear_favorites(&store, &mut out, no_confirm);
        },
    }

    Ok(())
}

fn clear_favorites<W: Write>(store: &HistoryStore, out: &mut W, no_confirm: bool) -> Result<()> {
    if !no_confirm && !confirm(out, "Unfavorite every phrase?")? {
        return Ok(());
    }
    let removed = store.unfavorite_all()?;
    writeln!(out, "Unfavorited {removed} phrase(s).")?;
    Ok(())
}

async fn run_download(config: &AppConfig) -> Result<()> {
    let dir = paths::resolve(DbKind::Dictionary)?;
    let path = download_dictionary(
        &config.download.url,
        &dir,
        Duration::from_secs(config.download.timeout_secs),
    )
    .await?;
    writeln!(io::stdout().lock(), "Dictionary ready at {}", path.display())?;
    Ok(())
}

const fn search_mode(and: bool) -> SearchMode {
    if and {
        SearchMode::And
    } else {
        SearchMode::Or
    }
}

/// Ask a yes/no question on stdin; anything but `y`/`yes` is a no
fn confirm<W: Write>(out: &mut W, prompt: &str) -> Result<bool> {
    write!(out, "{prompt} [y/N] ")?;
    out.flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    let yes = matches!(answer.trim().to_lowercase().as_str(), "y" | "yes");
    if !yes {
        warn!("Cancelled by user");
        writeln!(out, "Cancelled.")?;
    }
    Ok(yes)
}
