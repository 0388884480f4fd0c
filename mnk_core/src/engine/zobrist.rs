use crate::logic::board::Cell;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

// One key per (player, row, col).
const NUM_PLAYERS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HashError {
    #[error("free cell ({row}, {col}) has no zobrist key")]
    FreeCell { row: usize, col: usize },
    #[error("cell ({row}, {col}) is outside the zobrist table")]
    OutOfBounds { row: usize, col: usize },
}

pub struct ZobristTable {
    rows: usize,
    cols: usize,
    keys: Vec<u64>,
}

impl ZobristTable {
    /// Keys drawn from a freshly seeded process-local generator.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self::from_rng(rows, cols, &mut StdRng::from_entropy())
    }

    /// Reproducible keys, for tests and replays.
    pub fn with_seed(rows: usize, cols: usize, seed: u64) -> Self {
        Self::from_rng(rows, cols, &mut StdRng::seed_from_u64(seed))
    }

    fn from_rng<G: Rng>(rows: usize, cols: usize, rng: &mut G) -> Self {
        let keys = (0..NUM_PLAYERS * rows * cols).map(|_| rng.gen()).collect();
        Self { rows, cols, keys }
    }

    pub fn key(&self, cell: Cell) -> Result<u64, HashError> {
        let (row, col) = (cell.coord.row, cell.coord.col);
        let player = cell.state.index().ok_or(HashError::FreeCell { row, col })?;
        if row >= self.rows || col >= self.cols {
            return Err(HashError::OutOfBounds { row, col });
        }
        let idx = (player * self.rows + row) * self.cols + col;
        self.keys
            .get(idx)
            .copied()
            .ok_or(HashError::OutOfBounds { row, col })
    }

    /// XORs `cell` into (or out of) `hash`. Applying the same cell twice is
    /// a no-op, which is what unmarking relies on.
    pub fn update(&self, hash: u64, cell: Cell) -> Result<u64, HashError> {
        Ok(hash ^ self.key(cell)?)
    }

    /// Full recomputation over a set of marked cells.
    pub fn hash_of(&self, cells: &[Cell]) -> Result<u64, HashError> {
        cells
            .iter()
            .try_fold(0, |hash, &cell| self.update(hash, cell))
    }
}
