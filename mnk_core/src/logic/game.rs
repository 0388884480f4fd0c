use crate::logic::board::CellState;
use serde::{Deserialize, Serialize};

/// Outcome of the game after the latest move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameState {
    #[default]
    Open,
    WinP1,
    WinP2,
    Draw,
}

impl GameState {
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }

    /// The win state for the player owning `state`. `Free` has no win state.
    #[must_use]
    pub const fn win_for(state: CellState) -> Option<Self> {
        match state {
            CellState::P1 => Some(Self::WinP1),
            CellState::P2 => Some(Self::WinP2),
            CellState::Free => None,
        }
    }

    #[must_use]
    pub const fn winner(self) -> Option<CellState> {
        match self {
            Self::WinP1 => Some(CellState::P1),
            Self::WinP2 => Some(CellState::P2),
            Self::Open | Self::Draw => None,
        }
    }
}
