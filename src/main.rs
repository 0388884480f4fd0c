mod arena;

use arena::{run_match, ArenaError, ArenaSettings, Opponent};
use clap::Parser;
use mnk_core::engine::config::{ConfigError, EngineConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
/// Plays m,n,k-games against the alpha-beta engine
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(long, default_value_t = 3)]
    rows: usize,
    #[arg(long, default_value_t = 3)]
    cols: usize,
    #[arg(long, default_value_t = 3)]
    k: usize,
    /// Seconds the engine may spend per move
    #[arg(long, default_value_t = 1)]
    timeout: u64,
    #[arg(long, default_value_t = 1)]
    games: u32,
    #[arg(long, value_enum, default_value_t = Opponent::Random)]
    opponent: Opponent,
    /// Engine tuning file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for the random opponent
    #[arg(long)]
    seed: Option<u64>,
    /// Only print the summary
    #[arg(long)]
    quiet: bool,
}

#[derive(Debug, Error)]
enum AppError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Arena(#[from] ArenaError),
}

fn load_config(path: Option<&PathBuf>) -> Result<EngineConfig, AppError> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let json = std::fs::read_to_string(path).map_err(|source| AppError::Read {
        path: path.clone(),
        source,
    })?;
    Ok(EngineConfig::load_from_json(&json)?)
}

fn run(args: Args) -> Result<(), AppError> {
    let settings = ArenaSettings {
        rows: args.rows,
        cols: args.cols,
        k: args.k,
        timeout_secs: args.timeout,
        opponent: args.opponent,
        config: load_config(args.config.as_ref())?,
        seed: args.seed,
        verbose: !args.quiet,
    };
    tracing::info!(
        rows = settings.rows,
        cols = settings.cols,
        k = settings.k,
        games = args.games,
        opponent = ?settings.opponent,
        "starting match"
    );

    let tally = run_match(&settings, args.games)?;
    println!("{tally}");
    Ok(())
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
