use crate::engine::state::BoardState;
use crate::logic::board::{Cell, CellState, Coord};
use crate::logic::game::GameState;
use crate::logic::rules::Rules;
use serde::{Deserialize, Serialize};

pub mod config;
pub mod eval;
pub mod ordering;
pub mod player;
pub mod scores;
pub mod search;
pub mod state;
pub mod tt;
pub mod zobrist;

/// Unit step on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Direction {
    pub d_row: isize,
    pub d_col: isize,
}

impl Direction {
    pub const UP_LEFT: Self = Self::new(-1, -1);
    pub const UP: Self = Self::new(-1, 0);
    pub const UP_RIGHT: Self = Self::new(-1, 1);
    pub const RIGHT: Self = Self::new(0, 1);
    pub const DOWN_RIGHT: Self = Self::new(1, 1);
    pub const DOWN: Self = Self::new(1, 0);
    pub const DOWN_LEFT: Self = Self::new(1, -1);
    pub const LEFT: Self = Self::new(0, -1);

    #[must_use]
    pub const fn new(d_row: isize, d_col: isize) -> Self {
        Self { d_row, d_col }
    }

    #[must_use]
    pub const fn opposite(self) -> Self {
        Self::new(-self.d_row, -self.d_col)
    }
}

/// The 8 compass directions, clockwise from up-left.
pub const COMPASS: [Direction; 8] = [
    Direction::UP_LEFT,
    Direction::UP,
    Direction::UP_RIGHT,
    Direction::RIGHT,
    Direction::DOWN_RIGHT,
    Direction::DOWN,
    Direction::DOWN_LEFT,
    Direction::LEFT,
];

/// Row, column, diagonal and anti-diagonal, each as one of its two rays.
pub const AXES: [Direction; 4] = [
    Direction::RIGHT,
    Direction::DOWN,
    Direction::DOWN_RIGHT,
    Direction::UP_RIGHT,
];

/// Which mark belongs to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Perspective {
    pub mine: CellState,
    pub opponent: CellState,
}

impl Perspective {
    #[must_use]
    pub const fn new(first: bool) -> Self {
        if first {
            Self {
                mine: CellState::P1,
                opponent: CellState::P2,
            }
        } else {
            Self {
                mine: CellState::P2,
                opponent: CellState::P1,
            }
        }
    }

    #[must_use]
    pub const fn my_win(self) -> GameState {
        match self.mine {
            CellState::P2 => GameState::WinP2,
            _ => GameState::WinP1,
        }
    }

    #[must_use]
    pub const fn opponent_win(self) -> GameState {
        match self.opponent {
            CellState::P1 => GameState::WinP1,
            _ => GameState::WinP2,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum SearchLimit {
    Depth(u32),
    Time(u64), // milliseconds
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    pub depth: u32,
    pub nodes: u64,
    pub time_ms: u64,
    pub score: i32,
}

pub trait Evaluator {
    /// Scores the position right after `cell` was marked, from the point of
    /// view of whoever marked it.
    fn evaluate<R: Rules>(&self, board: &BoardState<R>, cell: Cell) -> i32;
}

pub trait Searcher<R: Rules> {
    fn search(
        &mut self,
        board: &mut BoardState<R>,
        limit: SearchLimit,
    ) -> Option<(Coord, SearchStats)>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perspective_second_player() {
        let p = Perspective::new(false);
        assert_eq!(p.mine, CellState::P2);
        assert_eq!(p.my_win(), GameState::WinP2);
        assert_eq!(p.opponent_win(), GameState::WinP1);
    }

    #[test]
    fn test_compass_is_closed_under_opposite() {
        for dir in COMPASS {
            assert!(COMPASS.contains(&dir.opposite()));
        }
        for axis in AXES {
            assert!(!AXES.contains(&axis.opposite()));
        }
    }
}
