use clap::ValueEnum;
use mnk_core::engine::config::EngineConfig;
use mnk_core::engine::player::Player;
use mnk_core::logic::board::{Cell, CellState, Coord, MnkBoard};
use mnk_core::logic::game::GameState;
use mnk_core::logic::rules::{MoveError, Rules};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArenaError {
    #[error("board {rows}x{cols} with k={k} is not playable")]
    InvalidBoard { rows: usize, cols: usize, k: usize },
    #[error("{player} gave no move with {free} free cells")]
    NoMove { player: String, free: usize },
    #[error("{player} played an illegal move: {source}")]
    IllegalMove {
        player: String,
        #[source]
        source: MoveError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Opponent {
    /// A second engine instance
    Engine,
    /// Uniformly random legal moves
    Random,
}

/// Anything that can sit at the board.
pub trait Contender {
    fn name(&self) -> &str;
    fn choose_move(&mut self, free_cells: &[Coord], history: &[Cell]) -> Option<Coord>;
}

impl Contender for Player {
    fn name(&self) -> &str {
        Self::name(self)
    }

    fn choose_move(&mut self, free_cells: &[Coord], history: &[Cell]) -> Option<Coord> {
        Self::choose_move(self, free_cells, history)
    }
}

pub struct RandomPlayer {
    rng: StdRng,
}

impl RandomPlayer {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl Contender for RandomPlayer {
    fn name(&self) -> &str {
        "random"
    }

    fn choose_move(&mut self, free_cells: &[Coord], _history: &[Cell]) -> Option<Coord> {
        free_cells.choose(&mut self.rng).copied()
    }
}

#[derive(Debug, Clone)]
pub struct ArenaSettings {
    pub rows: usize,
    pub cols: usize,
    pub k: usize,
    pub timeout_secs: u64,
    pub opponent: Opponent,
    pub config: EngineConfig,
    /// Makes the random opponent reproducible.
    pub seed: Option<u64>,
    /// Print the board after every move.
    pub verbose: bool,
}

impl ArenaSettings {
    pub fn validate(&self) -> Result<(), ArenaError> {
        if self.rows == 0 || self.cols == 0 || self.k == 0 {
            return Err(ArenaError::InvalidBoard {
                rows: self.rows,
                cols: self.cols,
                k: self.k,
            });
        }
        Ok(())
    }

    fn engine(&self, first: bool) -> Player {
        Player::with_config(
            self.rows,
            self.cols,
            self.k,
            first,
            self.timeout_secs,
            self.config.clone(),
        )
    }

    fn opponent(&self, first: bool) -> Box<dyn Contender> {
        match self.opponent {
            Opponent::Engine => Box::new(self.engine(first)),
            Opponent::Random => Box::new(
                self.seed
                    .map_or_else(RandomPlayer::new, RandomPlayer::with_seed),
            ),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Tally {
    pub engine_wins: u32,
    pub opponent_wins: u32,
    pub draws: u32,
}

impl Tally {
    pub fn record(&mut self, outcome: GameState, engine_mark: CellState) {
        match outcome.winner() {
            Some(winner) if winner == engine_mark => self.engine_wins += 1,
            Some(_) => self.opponent_wins += 1,
            None => self.draws += 1,
        }
    }
}

impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "engine {} / opponent {} / draws {}",
            self.engine_wins, self.opponent_wins, self.draws
        )
    }
}

/// Plays one game to the end with `MnkBoard` as the referee.
pub fn play_game(
    board: &mut MnkBoard,
    first: &mut dyn Contender,
    second: &mut dyn Contender,
    verbose: bool,
) -> Result<GameState, ArenaError> {
    let mut first_to_move = true;

    while board.state().is_open() {
        let free = board.free_cells();
        let history = board.marked().to_vec();
        let player: &mut dyn Contender = if first_to_move {
            &mut *first
        } else {
            &mut *second
        };
        let name = player.name().to_owned();

        let coord = player
            .choose_move(&free, &history)
            .ok_or_else(|| ArenaError::NoMove {
                player: name.clone(),
                free: free.len(),
            })?;
        board
            .apply_move(coord.row, coord.col)
            .map_err(|source| ArenaError::IllegalMove {
                player: name.clone(),
                source,
            })?;

        tracing::debug!(player = %name, %coord, "move played");
        if verbose {
            println!("{name} -> {coord}\n{board}");
        }
        first_to_move = !first_to_move;
    }
    Ok(board.state())
}

/// Plays `games` games, swapping who moves first after each one.
pub fn run_match(settings: &ArenaSettings, games: u32) -> Result<Tally, ArenaError> {
    settings.validate()?;
    let mut tally = Tally::default();

    for game in 0..games {
        let engine_first = game % 2 == 0;
        let mut engine = settings.engine(engine_first);
        let mut opponent = settings.opponent(!engine_first);
        let mut board = MnkBoard::new(settings.rows, settings.cols, settings.k);

        let outcome = if engine_first {
            play_game(&mut board, &mut engine, opponent.as_mut(), settings.verbose)?
        } else {
            play_game(&mut board, opponent.as_mut(), &mut engine, settings.verbose)?
        };

        let engine_mark = if engine_first {
            CellState::P1
        } else {
            CellState::P2
        };
        tally.record(outcome, engine_mark);
        tracing::info!(game = game + 1, outcome = ?outcome, engine_first, "game finished");
    }
    Ok(tally)
}
