mod reports;
mod settings;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::process::ExitCode;

use dexle_game::constants::SUGGESTION_LIMIT;
use dexle_game::{
    Catalog, CatalogError, DailyEngine, DailyError, FileDailyStore, FileGuessStore, GameConfig,
    JsonFileLoader, SystemClock,
};
use reports::ReportFormat;

#[derive(Debug, Parser)]
#[command(name = "dexle", version)]
#[command(about = "Daily creature guessing game - today's answer, rerolls, guesses and catalog checks")]
struct Args {
    /// JSON config file; flags below override its values
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Creature catalog JSON
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Daily record file shared by every player
    #[arg(long, global = true)]
    state: Option<PathBuf>,

    /// Directory holding per-day guess sessions
    #[arg(long, global = true)]
    guess_dir: Option<PathBuf>,

    /// Fixed UTC offset in seconds that defines the game day
    #[arg(long, global = true, allow_hyphen_values = true)]
    utc_offset: Option<i32>,

    /// Output report format
    #[arg(long, global = true, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    /// Optional path to write the report output instead of stdout
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show today's daily record, creating it on the first request of the day
    Today {
        /// Print the answer instead of hiding it
        #[arg(long)]
        reveal: bool,
    },
    /// Pick a different answer for today
    Reroll {
        #[arg(long)]
        reveal: bool,
    },
    /// Submit a guess against today's answer
    Guess { name: String },
    /// List creatures whose name starts with a prefix, skipping ones already guessed
    Suggest {
        prefix: String,
        #[arg(long, default_value_t = SUGGESTION_LIMIT)]
        limit: usize,
    },
    /// Show today's guesses, newest first
    History,
    /// Validate the catalog and print a summary
    Validate,
}

type Engine = DailyEngine<JsonFileLoader, FileDailyStore, SystemClock>;

fn main() -> ExitCode {
    let args = Args::parse();
    let level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err:#}", "❌".red().bold());
            ExitCode::from(exit_code(&err))
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let config = settings::resolve_config(args)?;
    if args.output.is_some() {
        colored::control::set_override(false);
    }
    let mut out = OutputTarget::new(args.output.clone())?;

    match &args.command {
        Command::Validate => {
            let catalog = Catalog::load(&config.catalog_path)?;
            reports::write_catalog_report(
                &mut out,
                args.report,
                &config.catalog_path,
                &catalog.report(),
            )?;
        }
        Command::Today { reveal } => {
            let view = engine(&config)?.today()?;
            reports::write_daily(&mut out, args.report, &view, *reveal)?;
        }
        Command::Reroll { reveal } => {
            let view = engine(&config)?.reroll()?;
            reports::write_daily(&mut out, args.report, &view, *reveal)?;
        }
        Command::Guess { name } => {
            let guesses = FileGuessStore::new(&config.guess_dir);
            let outcome = engine(&config)?
                .submit_guess(&guesses, name)
                .with_context(|| format!("guess {name:?} rejected"))?;
            reports::write_guess(&mut out, args.report, &outcome)?;
        }
        Command::Suggest { prefix, limit } => {
            let guesses = FileGuessStore::new(&config.guess_dir);
            let engine = engine(&config)?;
            let guessed = engine.session(&guesses)?.guessed_ids();
            let hits = engine.catalog()?.suggest(prefix, &guessed, *limit);
            reports::write_suggestions(&mut out, args.report, &hits)?;
        }
        Command::History => {
            let guesses = FileGuessStore::new(&config.guess_dir);
            let session = engine(&config)?.session(&guesses)?;
            reports::write_history(&mut out, args.report, &session)?;
        }
    }

    out.flush_inner()
        .context("failed to flush report output")?;
    Ok(())
}

fn engine(config: &GameConfig) -> Result<Engine> {
    let zone = config.zone()?;
    log::debug!(
        "engine over {} with record at {}",
        config.catalog_path.display(),
        config.state_path.display()
    );
    Ok(DailyEngine::new(
        JsonFileLoader::new(&config.catalog_path),
        FileDailyStore::new(&config.state_path),
        zone,
    ))
}

/// 2 for a missing or empty catalog, 1 for everything else.
fn exit_code(err: &anyhow::Error) -> u8 {
    if let Some(daily) = err.downcast_ref::<DailyError>() {
        return if daily.is_not_found() { 2 } else { 1 };
    }
    match err.downcast_ref::<CatalogError>() {
        Some(CatalogError::Io { .. } | CatalogError::Empty) => 2,
        _ => 1,
    }
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
