use crate::engine::config::EngineConfig;
use crate::engine::search::AlphaBetaEngine;
use crate::engine::state::BoardState;
use crate::engine::tt::TranspositionTable;
use crate::engine::{Perspective, SearchLimit, SearchStats, Searcher};
use crate::logic::board::{Cell, Coord};
use log::{info, trace, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

pub const ENGINE_NAME: &str = "mnk-alphabeta";

/// A transposition table sweep running on its own thread.
///
/// The thread owns the table while it runs; `finish` cancels the sweep
/// and hands the table back.
pub struct CleanupTask {
    cancel: Arc<AtomicBool>,
    handle: JoinHandle<TranspositionTable>,
}

impl CleanupTask {
    pub fn spawn(mut tt: TranspositionTable, path: Vec<u64>, root_marks: usize) -> Self {
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancel);
        let handle = thread::spawn(move || {
            let removed = tt.sweep(&path, root_marks, &flag);
            trace!("sweep removed {removed} entries, {} left", tt.len());
            tt
        });
        Self { cancel, handle }
    }

    /// Cancels the sweep and waits for the table. `None` if the sweep
    /// thread panicked and the table is lost.
    pub fn finish(self) -> Option<TranspositionTable> {
        self.cancel.store(true, Ordering::Relaxed);
        match self.handle.join() {
            Ok(tt) => Some(tt),
            Err(_) => {
                warn!("table sweep panicked, starting from an empty table");
                None
            }
        }
    }
}

/// One engine seat for one game.
pub struct Player {
    config: Arc<EngineConfig>,
    board: BoardState,
    engine: AlphaBetaEngine,
    cleanup: Option<CleanupTask>,
    timeout: Duration,
    rng: StdRng,
    last_stats: Option<SearchStats>,
}

impl Player {
    pub fn initialize(rows: usize, cols: usize, k: usize, first: bool, timeout_secs: u64) -> Self {
        Self::with_config(rows, cols, k, first, timeout_secs, EngineConfig::default())
    }

    pub fn with_config(
        rows: usize,
        cols: usize,
        k: usize,
        first: bool,
        timeout_secs: u64,
        config: EngineConfig,
    ) -> Self {
        let config = Arc::new(config);
        let perspective = Perspective::new(first);
        Self {
            board: BoardState::new(rows, cols, k, config.spiral_increment),
            engine: AlphaBetaEngine::new(config.clone(), perspective),
            config,
            cleanup: None,
            timeout: Duration::from_secs(timeout_secs),
            rng: StdRng::from_entropy(),
            last_stats: None,
        }
    }

    pub const fn name(&self) -> &'static str {
        ENGINE_NAME
    }

    pub const fn board(&self) -> &BoardState {
        &self.board
    }

    pub const fn perspective(&self) -> Perspective {
        self.engine.perspective()
    }

    pub const fn nodes_searched(&self) -> u64 {
        self.engine.nodes_searched()
    }

    /// Stats of the last request that actually searched.
    pub const fn last_stats(&self) -> Option<SearchStats> {
        self.last_stats
    }

    /// Picks one of `free_cells` given the full move history so far.
    ///
    /// Returns `None` only when `free_cells` is empty.
    pub fn choose_move(&mut self, free_cells: &[Coord], history: &[Cell]) -> Option<Coord> {
        self.reclaim_table();
        self.last_stats = None;

        if let Err(err) = self.board.resync(history) {
            warn!("cannot replay history of {} moves: {err}", history.len());
            let fallback = free_cells.choose(&mut self.rng).copied();
            if let Some(coord) = fallback {
                warn!("answering with random cell {coord}");
            }
            return fallback;
        }

        if free_cells.is_empty() {
            return None;
        }
        if let [only] = free_cells {
            self.commit(*only);
            return Some(*only);
        }

        if history.is_empty() && self.config.open_in_center {
            let center = Coord::new(self.board.rows() / 2, self.board.cols() / 2);
            if free_cells.contains(&center) {
                info!("{} opens in the center {center}", self.name());
                self.commit(center);
                return Some(center);
            }
        }

        #[allow(clippy::cast_possible_truncation)]
        let limit = SearchLimit::Time(self.timeout.as_millis() as u64);
        let chosen = match self.engine.search(&mut self.board, limit) {
            Some((coord, stats)) if free_cells.contains(&coord) => {
                info!(
                    "{} plays {coord} (depth {}, {} nodes, {}ms, score {})",
                    self.name(),
                    stats.depth,
                    stats.nodes,
                    stats.time_ms,
                    stats.score
                );
                self.last_stats = Some(stats);
                Some(coord)
            }
            found => {
                let coord = free_cells.choose(&mut self.rng).copied();
                warn!(
                    "search gave {:?}, falling back to random cell {:?}",
                    found.map(|(c, _)| c),
                    coord
                );
                coord
            }
        };

        if let Some(coord) = chosen {
            self.commit(coord);
        }
        chosen
    }

    fn reclaim_table(&mut self) {
        if let Some(task) = self.cleanup.take() {
            let tt = task
                .finish()
                .unwrap_or_else(|| TranspositionTable::new(self.config.tt_capacity));
            self.engine.restore_table(tt);
        }
    }

    /// Plays `coord` on the internal board and starts sweeping the table
    /// of positions the game has moved past.
    fn commit(&mut self, coord: Coord) {
        if let Err(err) = self.board.mark(coord) {
            warn!("cannot commit {coord}: {err}");
            return;
        }
        match self.board.path_hashes() {
            Ok(path) => {
                let tt = self.engine.take_table();
                self.cleanup = Some(CleanupTask::spawn(tt, path, self.board.marked().len()));
            }
            Err(err) => warn!("skipping table sweep: {err}"),
        }
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        if let Some(task) = self.cleanup.take() {
            let _ = task.finish();
        }
    }
}
