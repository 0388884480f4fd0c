use crate::engine::scores::PositionScores;
use crate::engine::zobrist::{HashError, ZobristTable};
use crate::engine::Direction;
use crate::logic::board::{Cell, CellState, Coord, MnkBoard};
use crate::logic::game::GameState;
use crate::logic::rules::{MoveError, Rules};
use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StateError {
    #[error(transparent)]
    Move(#[from] MoveError),
    #[error(transparent)]
    Hash(#[from] HashError),
}

/// The board the search mutates in place.
///
/// Wraps a rules implementation and keeps a Zobrist hash of the marked
/// cells in step with it. `mark` and `unmark` either fully succeed or leave
/// grid, move stack and hash untouched.
pub struct BoardState<R: Rules = MnkBoard> {
    rules: R,
    hash: u64,
    zobrist: ZobristTable,
    scores: PositionScores,
}

impl BoardState<MnkBoard> {
    pub fn new(rows: usize, cols: usize, k: usize, spiral_increment: i32) -> Self {
        Self {
            rules: MnkBoard::new(rows, cols, k),
            hash: 0,
            zobrist: ZobristTable::new(rows, cols),
            scores: PositionScores::new(rows, cols, spiral_increment),
        }
    }
}

impl<R: Rules> BoardState<R> {
    /// Wraps an existing rules instance, hashing whatever it already holds.
    pub fn with_rules(
        rules: R,
        zobrist: ZobristTable,
        spiral_increment: i32,
    ) -> Result<Self, HashError> {
        let hash = zobrist.hash_of(rules.marked_cells())?;
        let scores = PositionScores::new(rules.rows(), rules.cols(), spiral_increment);
        Ok(Self {
            rules,
            hash,
            zobrist,
            scores,
        })
    }

    pub fn rows(&self) -> usize {
        self.rules.rows()
    }

    pub fn cols(&self) -> usize {
        self.rules.cols()
    }

    pub fn k(&self) -> usize {
        self.rules.k()
    }

    pub const fn hash(&self) -> u64 {
        self.hash
    }

    pub const fn rules(&self) -> &R {
        &self.rules
    }

    pub fn mark(&mut self, coord: Coord) -> Result<GameState, StateError> {
        let outcome = self.rules.apply_move(coord.row, coord.col)?;
        let placed = Cell {
            coord,
            state: self.rules.cell_state(coord.row, coord.col),
        };
        match self.zobrist.update(self.hash, placed) {
            Ok(hash) => {
                self.hash = hash;
                Ok(outcome)
            }
            Err(err) => {
                self.rules.undo_last_move()?;
                Err(err.into())
            }
        }
    }

    pub fn unmark(&mut self) -> Result<Cell, StateError> {
        let last = self.last_marked().ok_or(MoveError::NothingToUndo)?;
        let hash = self.zobrist.update(self.hash, last)?;
        let undone = self.rules.undo_last_move()?;
        debug_assert_eq!(undone, last);
        self.hash = hash;
        Ok(last)
    }

    pub fn marked(&self) -> &[Cell] {
        self.rules.marked_cells()
    }

    pub fn last_marked(&self) -> Option<Cell> {
        self.marked().last().copied()
    }

    pub fn last_marked_by(&self, state: CellState) -> Option<Cell> {
        self.marked().iter().rev().find(|c| c.state == state).copied()
    }

    pub fn game_state(&self) -> GameState {
        self.rules.game_state()
    }

    pub fn is_open(&self) -> bool {
        self.game_state().is_open()
    }

    pub fn in_bounds(&self, row: isize, col: isize) -> bool {
        self.rules.is_in_bounds(row, col)
    }

    pub fn cell_state(&self, coord: Coord) -> CellState {
        self.rules.cell_state(coord.row, coord.col)
    }

    /// The cell `distance` steps from `from` along `direction`, with its
    /// current mark, or `None` past the edge.
    #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    pub fn neighbor(&self, from: Coord, direction: Direction, distance: usize) -> Option<Cell> {
        let step = distance as isize;
        let row = from.row as isize + direction.d_row * step;
        let col = from.col as isize + direction.d_col * step;
        if !self.in_bounds(row, col) {
            return None;
        }
        let (row, col) = (row as usize, col as usize);
        Some(Cell::new(row, col, self.rules.cell_state(row, col)))
    }

    pub fn free_cells(&self) -> Vec<Coord> {
        self.rules.free_cells()
    }

    pub fn free_count(&self) -> usize {
        self.rules.free_count()
    }

    pub fn score_of(&self, coord: Coord) -> i32 {
        self.scores.get(coord)
    }

    pub fn pick_random_free<G: Rng>(&self, rng: &mut G) -> Option<Coord> {
        self.free_cells().choose(rng).copied()
    }

    /// Hashes of every position on the committed line before the current
    /// one, starting with the empty board.
    pub fn path_hashes(&self) -> Result<Vec<u64>, HashError> {
        let mut hash = 0;
        let mut path = Vec::with_capacity(self.marked().len());
        for &cell in self.marked() {
            path.push(hash);
            hash = self.zobrist.update(hash, cell)?;
        }
        Ok(path)
    }

    /// Brings the board in line with an externally reported move history.
    ///
    /// Moves already on the board are kept as long as they match the
    /// history; anything after the first mismatch is undone, then the rest
    /// of the history is replayed. Returns the number of moves replayed.
    pub fn resync(&mut self, history: &[Cell]) -> Result<usize, StateError> {
        let common = self
            .marked()
            .iter()
            .zip(history)
            .take_while(|(ours, theirs)| ours.coord == theirs.coord)
            .count();
        while self.marked().len() > common {
            self.unmark()?;
        }
        let mut replayed = 0;
        for cell in history.iter().skip(common) {
            self.mark(cell.coord)?;
            replayed += 1;
        }
        Ok(replayed)
    }
}
