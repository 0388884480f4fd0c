use crate::engine::config::EngineConfig;
use crate::engine::eval::PositionEvaluator;
use crate::engine::ordering::MoveOrderer;
use crate::engine::state::BoardState;
use crate::engine::tt::{TTEntry, TTFlag, TranspositionTable};
use crate::engine::{Evaluator, Perspective, SearchLimit, SearchStats, Searcher};
use crate::logic::board::Coord;
use crate::logic::game::GameState;
use crate::logic::rules::Rules;
use std::sync::Arc;
use std::time::{Duration, Instant};

const INF: i32 = i32::MAX;

/// Wall-clock allowance for one request.
#[derive(Debug, Clone, Copy)]
pub struct TimeBudget {
    start: Instant,
    deadline: Option<Instant>,
}

impl TimeBudget {
    /// Deadline at `timeout * safety` from now.
    pub fn new(timeout: Duration, safety: f64) -> Self {
        let start = Instant::now();
        let safety = if safety.is_finite() {
            safety.clamp(0.0, 1.0)
        } else {
            1.0
        };
        Self {
            start,
            deadline: Some(start + timeout.mul_f64(safety)),
        }
    }

    pub fn unlimited() -> Self {
        Self {
            start: Instant::now(),
            deadline: None,
        }
    }

    pub fn exhausted(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

pub struct AlphaBetaEngine {
    config: Arc<EngineConfig>,
    perspective: Perspective,
    evaluator: PositionEvaluator,
    orderer: MoveOrderer,
    tt: TranspositionTable,
    budget: TimeBudget,
    nodes_searched: u64,
}

impl AlphaBetaEngine {
    pub fn new(config: Arc<EngineConfig>, perspective: Perspective) -> Self {
        Self {
            evaluator: PositionEvaluator::new(config.clone()),
            orderer: MoveOrderer::new(perspective),
            tt: TranspositionTable::new(config.tt_capacity),
            config,
            perspective,
            budget: TimeBudget::unlimited(),
            nodes_searched: 0,
        }
    }

    pub const fn perspective(&self) -> Perspective {
        self.perspective
    }

    pub const fn nodes_searched(&self) -> u64 {
        self.nodes_searched
    }

    pub const fn table(&self) -> &TranspositionTable {
        &self.tt
    }

    /// Hands the table over, e.g. to a background sweep. The engine keeps
    /// an empty one until `restore_table` is called.
    pub fn take_table(&mut self) -> TranspositionTable {
        std::mem::take(&mut self.tt)
    }

    pub fn restore_table(&mut self, tt: TranspositionTable) {
        self.tt = tt;
    }

    /// Score of a terminal or horizon position from the engine's side.
    /// Wins and losses are offset by the absolute mark count so that quick
    /// wins and slow losses are preferred.
    fn leaf_score<R: Rules>(&self, board: &BoardState<R>) -> i32 {
        let marks = i32::try_from(board.marked().len()).unwrap_or(i32::MAX);
        let state = board.game_state();
        if state == self.perspective.my_win() {
            return self.config.win_score - marks;
        }
        if state == self.perspective.opponent_win() {
            return -self.config.win_score + marks;
        }
        if state == GameState::Draw {
            return 0;
        }

        board.last_marked().map_or(0, |cell| {
            let score = self.evaluator.evaluate(board, cell);
            if cell.state == self.perspective.mine {
                score
            } else {
                -score
            }
        })
    }

    fn alpha_beta<R: Rules>(
        &mut self,
        board: &mut BoardState<R>,
        depth: u32,
        mut alpha: i32,
        mut beta: i32,
        maximizing: bool,
    ) -> Option<i32> {
        self.nodes_searched += 1;

        // TT Probe
        let hash = board.hash();
        let marks = board.marked().len();
        let mut floor = -INF;
        let mut ceiling = INF;
        if let Some(entry) = self.tt.probe(hash, marks) {
            if entry.depth >= depth {
                match entry.flag {
                    TTFlag::Exact => return Some(entry.score),
                    TTFlag::LowerBound => {
                        floor = entry.score;
                        alpha = alpha.max(entry.score);
                    }
                    TTFlag::UpperBound => {
                        ceiling = entry.score;
                        beta = beta.min(entry.score);
                    }
                }
                if alpha >= beta {
                    return Some(entry.score);
                }
            }
        }

        if self.budget.exhausted() {
            return None;
        }

        if depth == 0 || !board.is_open() {
            return Some(self.leaf_score(board));
        }

        let (window_alpha, window_beta) = (alpha, beta);
        let mut value = if maximizing { -INF } else { INF };

        for coord in self.orderer.order(board) {
            if let Err(err) = board.mark(coord) {
                log::warn!("ordered move {coord} rejected: {err}");
                continue;
            }
            let child = self.alpha_beta(board, depth - 1, alpha, beta, !maximizing);
            let undone = board.unmark();
            debug_assert!(undone.is_ok(), "unmark after mark cannot fail");
            let score = child?;

            if maximizing {
                value = value.max(score);
                alpha = alpha.max(value);
            } else {
                value = value.min(score);
                beta = beta.min(value);
            }
            if beta <= alpha {
                break;
            }
        }

        // A deeper stored bound outranks what this shallower pass saw.
        let value = value.max(floor).min(ceiling);

        let flag = if value <= window_alpha {
            TTFlag::UpperBound
        } else if value >= window_beta {
            TTFlag::LowerBound
        } else {
            TTFlag::Exact
        };
        self.tt.store(
            hash,
            TTEntry {
                depth,
                score: value,
                flag,
                marks,
            },
        );

        Some(value)
    }

    /// One full pass at `depth`. Returns the strictly best move, the
    /// earliest one on ties, or `None` if time ran out mid-pass.
    fn search_root<R: Rules>(
        &mut self,
        board: &mut BoardState<R>,
        depth: u32,
    ) -> Option<(Coord, i32)> {
        self.nodes_searched += 1;
        let mut alpha = -INF;
        let mut best: Option<(Coord, i32)> = None;

        for coord in self.orderer.order(board) {
            if let Err(err) = board.mark(coord) {
                log::warn!("ordered move {coord} rejected: {err}");
                continue;
            }
            let child = self.alpha_beta(board, depth - 1, alpha, INF, false);
            let undone = board.unmark();
            debug_assert!(undone.is_ok(), "unmark after mark cannot fail");
            let score = child?;

            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((coord, score));
                alpha = alpha.max(score);
            }
        }
        best
    }
}

impl<R: Rules> Searcher<R> for AlphaBetaEngine {
    fn search(
        &mut self,
        board: &mut BoardState<R>,
        limit: SearchLimit,
    ) -> Option<(Coord, SearchStats)> {
        self.nodes_searched = 0;
        let depth_limit = match limit {
            SearchLimit::Depth(d) => {
                self.budget = TimeBudget::unlimited();
                d
            }
            SearchLimit::Time(ms) => {
                self.budget =
                    TimeBudget::new(Duration::from_millis(ms), self.config.safety_fraction);
                u32::MAX
            }
        };

        if !board.is_open() {
            return None;
        }

        let free = u32::try_from(board.free_count()).unwrap_or(u32::MAX);
        let max_depth = free
            .min(depth_limit)
            .min(self.config.max_depth.unwrap_or(u32::MAX));

        let mut best: Option<(Coord, SearchStats)> = None;
        for depth in 1..=max_depth {
            let Some((coord, score)) = self.search_root(board, depth) else {
                log::debug!("depth {depth} abandoned after {} nodes", self.nodes_searched);
                break;
            };

            #[allow(clippy::cast_possible_truncation)]
            let stats = SearchStats {
                depth,
                nodes: self.nodes_searched,
                time_ms: self.budget.elapsed().as_millis() as u64,
                score,
            };
            log::debug!(
                "depth {} best {} score {} nodes {} time {}ms",
                depth,
                coord,
                score,
                stats.nodes,
                stats.time_ms
            );
            best = Some((coord, stats));

            if score >= self.config.win_score / 2 || self.budget.exhausted() {
                break;
            }
        }
        best
    }
}
