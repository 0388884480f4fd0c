use crate::logic::game::GameState;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coordinate-only cell. Used as a key wherever the mark must not matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CellState {
    #[default]
    Free,
    P1,
    P2,
}

impl CellState {
    /// Player index used by hashing tables: P1 = 0, P2 = 1.
    pub const fn index(self) -> Option<usize> {
        match self {
            Self::P1 => Some(0),
            Self::P2 => Some(1),
            Self::Free => None,
        }
    }

    pub const fn is_free(self) -> bool {
        matches!(self, Self::Free)
    }

    const fn symbol(self) -> char {
        match self {
            Self::Free => '.',
            Self::P1 => 'X',
            Self::P2 => 'O',
        }
    }
}

/// A coordinate together with its mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub coord: Coord,
    pub state: CellState,
}

impl Cell {
    #[must_use]
    pub const fn new(row: usize, col: usize, state: CellState) -> Self {
        Self {
            coord: Coord::new(row, col),
            state,
        }
    }
}

// Row, column, diagonal, anti-diagonal.
const LINES: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// Plain M x N board with K-in-a-row win detection.
///
/// P1 marks on even plies, P2 on odd plies. Legality, the move stack and
/// the game outcome live here; everything search related sits on top of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MnkBoard {
    rows: usize,
    cols: usize,
    k: usize,
    grid: Vec<CellState>,
    marked: Vec<Cell>,
    state: GameState,
}

impl MnkBoard {
    #[must_use]
    pub fn new(rows: usize, cols: usize, k: usize) -> Self {
        Self {
            rows,
            cols,
            k,
            grid: vec![CellState::Free; rows * cols],
            marked: Vec::with_capacity(rows * cols),
            state: GameState::Open,
        }
    }

    pub const fn rows(&self) -> usize {
        self.rows
    }

    pub const fn cols(&self) -> usize {
        self.cols
    }

    pub const fn k(&self) -> usize {
        self.k
    }

    pub const fn state(&self) -> GameState {
        self.state
    }

    pub fn marked(&self) -> &[Cell] {
        &self.marked
    }

    pub const fn contains(&self, row: isize, col: isize) -> bool {
        row >= 0 && col >= 0 && (row as usize) < self.rows && (col as usize) < self.cols
    }

    /// Mark of the cell, `Free` for coordinates outside the board.
    pub fn get(&self, row: usize, col: usize) -> CellState {
        if row >= self.rows || col >= self.cols {
            return CellState::Free;
        }
        self.grid
            .get(row * self.cols + col)
            .copied()
            .unwrap_or_default()
    }

    pub fn free_cells(&self) -> Vec<Coord> {
        (0..self.rows)
            .flat_map(|row| (0..self.cols).map(move |col| Coord::new(row, col)))
            .filter(|c| self.get(c.row, c.col).is_free())
            .collect()
    }

    pub fn free_count(&self) -> usize {
        self.rows * self.cols - self.marked.len()
    }

    /// The player whose turn it is.
    pub fn to_move(&self) -> CellState {
        if self.marked.len() % 2 == 0 {
            CellState::P1
        } else {
            CellState::P2
        }
    }

    pub(crate) fn place(&mut self, coord: Coord, state: CellState) {
        let idx = coord.row * self.cols + coord.col;
        if let Some(slot) = self.grid.get_mut(idx) {
            *slot = state;
        }
    }

    pub(crate) fn push_marked(&mut self, cell: Cell) {
        self.marked.push(cell);
    }

    pub(crate) fn pop_marked(&mut self) -> Option<Cell> {
        self.marked.pop()
    }

    pub(crate) fn set_state(&mut self, state: GameState) {
        self.state = state;
    }

    /// Whether the mark at `coord` is part of a line of at least K.
    pub fn completes_line(&self, coord: Coord) -> bool {
        let state = self.get(coord.row, coord.col);
        if state.is_free() {
            return false;
        }
        LINES.iter().any(|&(dr, dc)| {
            1 + self.run_length(coord, dr, dc, state) + self.run_length(coord, -dr, -dc, state)
                >= self.k
        })
    }

    #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    fn run_length(&self, from: Coord, dr: isize, dc: isize, state: CellState) -> usize {
        let mut count = 0;
        let mut row = from.row as isize + dr;
        let mut col = from.col as isize + dc;
        while self.contains(row, col) && self.get(row as usize, col as usize) == state {
            count += 1;
            row += dr;
            col += dc;
        }
        count
    }
}

impl fmt::Display for MnkBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.rows {
            let line: String = (0..self.cols)
                .map(|col| self.get(row, col).symbol())
                .collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
