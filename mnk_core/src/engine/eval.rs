use crate::engine::config::EngineConfig;
use crate::engine::state::BoardState;
use crate::engine::{Direction, Evaluator, AXES};
use crate::logic::board::Cell;
use crate::logic::rules::Rules;
use std::sync::Arc;

/// What one ray out of the evaluated cell looks like.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Ray {
    /// Own marks seen before any enemy mark.
    own: i32,
    /// Own marks directly adjacent, before the first non-own cell.
    run: usize,
    entered: bool,
    blocked: bool,
}

impl Ray {
    fn score(self) -> i32 {
        // Open-ended: the ray had room and no enemy closed it.
        self.own + i32::from(self.entered && !self.blocked)
    }
}

/// Scores lines through a freshly marked cell.
pub struct PositionEvaluator {
    config: Arc<EngineConfig>,
}

impl PositionEvaluator {
    pub const fn new(config: Arc<EngineConfig>) -> Self {
        Self { config }
    }

    fn walk<R: Rules>(board: &BoardState<R>, cell: Cell, direction: Direction) -> Ray {
        let mut ray = Ray::default();
        let mut contiguous = true;

        for distance in 1..board.k() {
            let Some(next) = board.neighbor(cell.coord, direction, distance) else {
                break;
            };
            ray.entered = true;

            if next.state == cell.state {
                ray.own += 1;
                if contiguous {
                    ray.run += 1;
                }
            } else if next.state.is_free() {
                contiguous = false;
            } else {
                ray.blocked = true;
                break;
            }
        }
        ray
    }

    fn run_bonus(&self, run: usize, k: usize) -> i32 {
        if k >= 2 && run == k - 1 {
            self.config.k_minus_one_bonus
        } else if k >= 3 && run == k - 2 {
            self.config.k_minus_two_bonus
        } else if k >= 4 && run == k - 3 {
            self.config.k_minus_three_bonus
        } else {
            0
        }
    }
}

impl Evaluator for PositionEvaluator {
    fn evaluate<R: Rules>(&self, board: &BoardState<R>, cell: Cell) -> i32 {
        let k = board.k();
        let mut score = board.score_of(cell.coord);

        for axis in AXES {
            let forward = Self::walk(board, cell, axis);
            let backward = Self::walk(board, cell, axis.opposite());
            score += forward.score() + backward.score();
            score += self.run_bonus(1 + forward.run + backward.run, k);
        }
        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::zobrist::ZobristTable;
    use crate::logic::board::{CellState, Coord, MnkBoard};

    fn board_with(rows: usize, cols: usize, k: usize, moves: &[(usize, usize)]) -> BoardState {
        let mut board = BoardState::with_rules(
            MnkBoard::new(rows, cols, k),
            ZobristTable::with_seed(rows, cols, 11),
            5,
        )
        .unwrap();
        for &(r, c) in moves {
            board.mark(Coord::new(r, c)).unwrap();
        }
        board
    }

    fn evaluator() -> PositionEvaluator {
        PositionEvaluator::new(Arc::new(EngineConfig::default()))
    }

    fn eval_last(board: &BoardState) -> i32 {
        let last = board.last_marked().unwrap();
        evaluator().evaluate(board, last)
    }

    #[test]
    fn test_lone_corner_mark() {
        // 5x5, K=4, P1 alone in the corner: 3 open rays of 3 steps each.
        let board = board_with(5, 5, 4, &[(0, 0)]);
        // weight 1 + 3 open rays + run of 1 == K-3 on all 4 lines.
        assert_eq!(eval_last(&board), 1 + 3 + 4 * 15);
    }

    #[test]
    fn test_k_minus_one_run_beats_shorter_run() {
        // P1 builds (2,0),(2,1),(2,2) on a 5x5 K=4 board, P2 plays far away.
        let three = board_with(5, 5, 4, &[(2, 0), (4, 4), (2, 1), (0, 4), (2, 2)]);
        let two = board_with(5, 5, 4, &[(2, 0), (4, 4), (2, 2)]);
        assert!(eval_last(&three) > eval_last(&two) + 50);
    }

    #[test]
    fn test_enemy_closes_ray() {
        // 1x5, K=3: P2 at (0,1) right next to P1 versus P1 out of reach.
        let blocked = board_with(1, 5, 3, &[(0, 2), (0, 1)]);
        let cell = Cell::new(0, 1, CellState::P2);
        let open = board_with(1, 5, 3, &[(0, 4), (0, 1)]);
        assert_eq!(blocked.last_marked(), Some(cell));
        assert!(eval_last(&open) > eval_last(&blocked));
    }

    #[test]
    fn test_reflection_symmetry_across_players() {
        // The same shape for P1 in the top-left and for P2 in the bottom-right.
        let p1 = board_with(6, 6, 4, &[(0, 0), (5, 3), (1, 1)]);
        let p2 = board_with(6, 6, 4, &[(0, 3), (5, 5), (3, 0), (4, 4)]);
        assert_eq!(p1.last_marked().unwrap().state, CellState::P1);
        assert_eq!(p2.last_marked().unwrap().state, CellState::P2);
        assert_eq!(eval_last(&p1), eval_last(&p2));
    }

    #[test]
    fn test_rotation_symmetry() {
        let a = board_with(5, 7, 4, &[(1, 2), (4, 6), (1, 3)]);
        // 180 degree rotation: (r, c) -> (4 - r, 6 - c).
        let b = board_with(5, 7, 4, &[(3, 4), (0, 0), (3, 3)]);
        assert_eq!(eval_last(&a), eval_last(&b));
    }
}
