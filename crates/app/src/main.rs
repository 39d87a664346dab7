mod render;

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use drill_core::model::{PracticeSettings, PracticeSettingsDraft};
use services::{DeckBuilder, PracticeDriver};
use storage::JsonDocumentStore;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use crate::render::Renderer;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingStore,
    UnknownArg(String),
    InvalidNumber { flag: &'static str, raw: String },
    InvalidConfig { path: PathBuf, reason: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingStore => write!(f, "no document store given (--store or DRILL_STORE)"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidNumber { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::InvalidConfig { path, reason } => {
                write!(f, "invalid config {}: {reason}", path.display())
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_number<T: std::str::FromStr>(raw: String, flag: &'static str) -> Result<T, ArgsError> {
    raw.trim()
        .parse()
        .map_err(|_| ArgsError::InvalidNumber { flag, raw })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  drill practice --store <documents.json> [--config <settings.toml>] [overrides]");
    eprintln!("  drill deck     --store <documents.json> [--config <settings.toml>] [overrides]");
    eprintln!();
    eprintln!("Overrides:");
    eprintln!("  --documents <id,id,...>   document ids, comma-separated");
    eprintln!("  --per-doc <n>             cards drawn per document (default 5)");
    eprintln!("  --time-limit <secs>       seconds per card (default 60)");
    eprintln!("  --seed <u64>              fixed shuffle seed");
    eprintln!("  --json                    print views as JSON lines (practice only)");
    eprintln!();
    eprintln!("While practicing: <enter>/n = next card, r = reload config, q = quit");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  DRILL_STORE, DRILL_CONFIG, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Practice,
    Deck,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "practice" => Some(Self::Practice),
            "deck" => Some(Self::Deck),
            _ => None,
        }
    }
}

/// Command-line values layered over the config file.
#[derive(Debug, Default, Clone)]
struct Overrides {
    document_ids: Option<String>,
    cards_per_document: Option<u32>,
    time_limit_secs: Option<u32>,
}

#[derive(Debug)]
struct Args {
    store: PathBuf,
    config: Option<PathBuf>,
    overrides: Overrides,
    seed: Option<u64>,
    json: bool,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut store = std::env::var_os("DRILL_STORE").map(PathBuf::from);
        let mut config = std::env::var_os("DRILL_CONFIG").map(PathBuf::from);
        let mut overrides = Overrides::default();
        let mut seed = None;
        let mut json = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--store" => store = Some(require_value(args, "--store")?.into()),
                "--config" => config = Some(require_value(args, "--config")?.into()),
                "--documents" => overrides.document_ids = Some(require_value(args, "--documents")?),
                "--per-doc" => {
                    let value = require_value(args, "--per-doc")?;
                    overrides.cards_per_document = Some(parse_number(value, "--per-doc")?);
                }
                "--time-limit" => {
                    let value = require_value(args, "--time-limit")?;
                    overrides.time_limit_secs = Some(parse_number(value, "--time-limit")?);
                }
                "--seed" => {
                    let value = require_value(args, "--seed")?;
                    seed = Some(parse_number(value, "--seed")?);
                }
                "--json" => json = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            store: store.ok_or(ArgsError::MissingStore)?,
            config,
            overrides,
            seed,
            json,
        })
    }

    /// Read the config file (if any), apply overrides, and validate.
    async fn load_settings(&self) -> Result<PracticeSettings, Box<dyn std::error::Error>> {
        let mut draft = match &self.config {
            Some(path) => {
                let raw = tokio::fs::read_to_string(path).await?;
                toml::from_str::<PracticeSettingsDraft>(&raw).map_err(|e| ArgsError::InvalidConfig {
                    path: path.clone(),
                    reason: e.to_string(),
                })?
            }
            None => PracticeSettingsDraft::new(),
        };

        let overrides = self.overrides.clone();
        if let Some(ids) = overrides.document_ids {
            draft.document_ids = ids;
        }
        if let Some(per_doc) = overrides.cards_per_document {
            draft.cards_per_document = per_doc;
        }
        if let Some(secs) = overrides.time_limit_secs {
            draft.time_limit_secs = secs;
        }

        Ok(draft.validate()?)
    }
}

const DEFAULT_LOG_FILTER: &str = "services=info,drill=info";

/// Build the log filter from a `RUST_LOG` value, falling back to
/// [`DEFAULT_LOG_FILTER`] when it is unset, blank or unparsable.
fn log_filter(from_env: Option<&str>) -> EnvFilter {
    from_env
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .and_then(|raw| EnvFilter::try_new(raw).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn init_tracing() {
    let from_env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    // Logs go to stderr so the practice view on stdout stays readable.
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(from_env.as_deref()))
        .with_writer(std::io::stderr)
        .init();
}

async fn open_builder(args: &Args) -> Result<DeckBuilder, Box<dyn std::error::Error>> {
    let store = JsonDocumentStore::open(&args.store).await?;
    let builder = DeckBuilder::new(Arc::new(store));
    Ok(match args.seed {
        Some(seed) => builder.with_seed(seed),
        None => builder,
    })
}

async fn run_deck(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let settings = args.load_settings().await?;
    let builder = open_builder(args).await?;
    let build = builder
        .build(settings.document_ids(), settings.cards_per_document())
        .await;

    for issue in &build.issues {
        println!("skipped: {issue}");
    }
    if let Some(reason) = build.empty_reason() {
        println!("No valid flashcards found ({reason:?})");
        return Ok(());
    }
    for (index, card) in build.deck.cards().iter().enumerate() {
        println!("{:>3}. [{}] {}", index + 1, card.source_id(), card.question());
        println!("     -> {}", card.answer());
    }
    Ok(())
}

async fn run_practice(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let settings = args.load_settings().await?;
    let builder = open_builder(args).await?;

    let handle = PracticeDriver::spawn(builder, settings);
    let mut views = handle.subscribe();
    let mut renderer = Renderer::new(args.json);
    let view = views.borrow_and_update().clone();
    renderer.draw(&view)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = views.borrow_and_update().clone();
                renderer.draw(&view)?;
            }
            line = lines.next_line() => {
                let Some(input) = line? else { break };
                match input.trim() {
                    "" | "n" | "next" => handle.advance()?,
                    "r" | "reload" => match args.load_settings().await {
                        Ok(settings) => handle.configure(settings)?,
                        Err(err) => eprintln!("reload failed: {err}"),
                    },
                    "q" | "quit" => break,
                    other => eprintln!("unknown command: {other} (n = next, r = reload, q = quit)"),
                }
            }
        }
    }

    renderer.finish()?;
    handle.shutdown().await?;
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // Default behavior: practice when no subcommand is provided.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Practice,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Practice,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let args = Args::parse(&mut argv.into_iter()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    init_tracing();

    match cmd {
        Command::Practice => run_practice(&args).await,
        Command::Deck => run_deck(&args).await,
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
