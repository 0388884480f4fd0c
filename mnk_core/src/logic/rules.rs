use crate::logic::board::{Cell, CellState, Coord, MnkBoard};
use crate::logic::game::GameState;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("cell ({row}, {col}) is outside the board")]
    OutOfBounds { row: usize, col: usize },
    #[error("cell ({row}, {col}) is already marked")]
    Occupied { row: usize, col: usize },
    #[error("the game is already over")]
    GameOver,
    #[error("no move to undo")]
    NothingToUndo,
}

/// The capabilities the search needs from a rules implementation.
///
/// The rules side is authoritative: legality and win/draw detection are
/// trusted verbatim by everything built on top of it.
pub trait Rules {
    fn rows(&self) -> usize;
    fn cols(&self) -> usize;
    fn k(&self) -> usize;

    /// Marks `(row, col)` for the player to move and returns the new outcome.
    fn apply_move(&mut self, row: usize, col: usize) -> Result<GameState, MoveError>;

    /// Removes the most recent mark and returns it.
    fn undo_last_move(&mut self) -> Result<Cell, MoveError>;

    /// `Free` for coordinates outside the board.
    fn cell_state(&self, row: usize, col: usize) -> CellState;

    fn is_in_bounds(&self, row: isize, col: isize) -> bool;

    /// Free cells in row-major order.
    fn free_cells(&self) -> Vec<Coord>;

    fn free_count(&self) -> usize;

    fn game_state(&self) -> GameState;

    /// Marked cells in move order.
    fn marked_cells(&self) -> &[Cell];
}

impl Rules for MnkBoard {
    fn rows(&self) -> usize {
        Self::rows(self)
    }

    fn cols(&self) -> usize {
        Self::cols(self)
    }

    fn k(&self) -> usize {
        Self::k(self)
    }

    fn apply_move(&mut self, row: usize, col: usize) -> Result<GameState, MoveError> {
        if !self.state().is_open() {
            return Err(MoveError::GameOver);
        }
        if row >= self.rows() || col >= self.cols() {
            return Err(MoveError::OutOfBounds { row, col });
        }
        if !self.get(row, col).is_free() {
            return Err(MoveError::Occupied { row, col });
        }

        let player = self.to_move();
        let coord = Coord::new(row, col);
        self.place(coord, player);
        self.push_marked(Cell { coord, state: player });

        let outcome = if self.completes_line(coord) {
            GameState::win_for(player).unwrap_or(GameState::Open)
        } else if self.free_count() == 0 {
            GameState::Draw
        } else {
            GameState::Open
        };
        self.set_state(outcome);
        Ok(outcome)
    }

    fn undo_last_move(&mut self) -> Result<Cell, MoveError> {
        let cell = self.pop_marked().ok_or(MoveError::NothingToUndo)?;
        self.place(cell.coord, CellState::Free);
        // Play stops at the first win or draw, so the previous position was open.
        self.set_state(GameState::Open);
        Ok(cell)
    }

    fn cell_state(&self, row: usize, col: usize) -> CellState {
        self.get(row, col)
    }

    fn is_in_bounds(&self, row: isize, col: isize) -> bool {
        self.contains(row, col)
    }

    fn free_cells(&self) -> Vec<Coord> {
        Self::free_cells(self)
    }

    fn free_count(&self) -> usize {
        Self::free_count(self)
    }

    fn game_state(&self) -> GameState {
        self.state()
    }

    fn marked_cells(&self) -> &[Cell] {
        self.marked()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alternating_players() {
        let mut board = MnkBoard::new(3, 3, 3);
        board.apply_move(0, 0).unwrap();
        board.apply_move(1, 1).unwrap();
        assert_eq!(board.cell_state(0, 0), CellState::P1);
        assert_eq!(board.cell_state(1, 1), CellState::P2);
        assert_eq!(board.marked_cells().len(), 2);
    }

    #[test]
    fn test_rejects_illegal_moves() {
        let mut board = MnkBoard::new(3, 3, 3);
        assert_eq!(
            board.apply_move(3, 0),
            Err(MoveError::OutOfBounds { row: 3, col: 0 })
        );
        board.apply_move(1, 1).unwrap();
        assert_eq!(
            board.apply_move(1, 1),
            Err(MoveError::Occupied { row: 1, col: 1 })
        );
        assert_eq!(board.marked_cells().len(), 1);
    }

    #[test]
    fn test_row_win_and_game_over() {
        let mut board = MnkBoard::new(3, 3, 3);
        for (r, c) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            assert_eq!(board.apply_move(r, c).unwrap(), GameState::Open);
        }
        assert_eq!(board.apply_move(0, 2).unwrap(), GameState::WinP1);
        assert_eq!(board.apply_move(2, 2), Err(MoveError::GameOver));
    }

    #[test]
    fn test_draw_on_full_board() {
        let mut board = MnkBoard::new(3, 3, 3);
        // X O X / X O O / O X X
        let moves = [
            (0, 0),
            (0, 1),
            (0, 2),
            (1, 1),
            (1, 0),
            (1, 2),
            (2, 1),
            (2, 0),
            (2, 2),
        ];
        let mut last = GameState::Open;
        for (r, c) in moves {
            last = board.apply_move(r, c).unwrap();
        }
        assert_eq!(last, GameState::Draw);
    }

    #[test]
    fn test_undo_restores_open_state() {
        let mut board = MnkBoard::new(2, 2, 2);
        board.apply_move(0, 0).unwrap();
        board.apply_move(1, 0).unwrap();
        assert_eq!(board.apply_move(0, 1).unwrap(), GameState::WinP1);
        let undone = board.undo_last_move().unwrap();
        assert_eq!(undone, Cell::new(0, 1, CellState::P1));
        assert!(board.game_state().is_open());
        assert_eq!(board.cell_state(0, 1), CellState::Free);
        board.undo_last_move().unwrap();
        board.undo_last_move().unwrap();
        assert_eq!(board.undo_last_move(), Err(MoveError::NothingToUndo));
    }
}
