use crate::engine::state::BoardState;
use crate::engine::{Perspective, COMPASS};
use crate::logic::board::Coord;
use crate::logic::rules::Rules;

/// Orders candidate cells so that alpha-beta sees strong moves first.
///
/// Cells radiating out from the engine's last move come first, then those
/// around the opponent's last move, then every other free cell in row-major
/// order. The result is always a permutation of the free cells.
pub struct MoveOrderer {
    perspective: Perspective,
}

impl MoveOrderer {
    pub const fn new(perspective: Perspective) -> Self {
        Self { perspective }
    }

    pub fn order<R: Rules>(&self, board: &BoardState<R>) -> Vec<Coord> {
        let cols = board.cols();
        let mut seen = vec![false; board.rows() * cols];
        let mut ordered = Vec::with_capacity(board.free_count());
        let mut push = |coord: Coord, ordered: &mut Vec<Coord>| {
            if let Some(flag) = seen.get_mut(coord.row * cols + coord.col) {
                if !*flag {
                    *flag = true;
                    ordered.push(coord);
                }
            }
        };

        let anchors = [
            board.last_marked_by(self.perspective.mine),
            board.last_marked_by(self.perspective.opponent),
        ];
        for anchor in anchors.into_iter().flatten() {
            for coord in Self::radial(board, anchor.coord) {
                push(coord, &mut ordered);
            }
        }
        for coord in board.free_cells() {
            push(coord, &mut ordered);
        }
        ordered
    }

    /// Free cells within K steps of `anchor` along the 8 compass rays,
    /// heaviest static weight first. Ties keep discovery order.
    pub fn radial<R: Rules>(board: &BoardState<R>, anchor: Coord) -> Vec<Coord> {
        let mut live = COMPASS.to_vec();
        let mut candidates: Vec<(Coord, i32)> = Vec::new();

        for distance in 1..=board.k() {
            // A ray that leaves the board stays off it.
            live.retain(|&direction| match board.neighbor(anchor, direction, distance) {
                None => false,
                Some(cell) => {
                    if cell.state.is_free() {
                        candidates.push((cell.coord, board.score_of(cell.coord)));
                    }
                    true
                }
            });
            if live.is_empty() {
                break;
            }
        }

        candidates.sort_by(|a, b| b.1.cmp(&a.1));
        candidates.into_iter().map(|(coord, _)| coord).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::zobrist::ZobristTable;
    use crate::logic::board::MnkBoard;
    use std::collections::HashSet;

    fn board_with(rows: usize, cols: usize, k: usize, moves: &[(usize, usize)]) -> BoardState {
        let mut board = BoardState::with_rules(
            MnkBoard::new(rows, cols, k),
            ZobristTable::with_seed(rows, cols, 5),
            5,
        )
        .unwrap();
        for &(r, c) in moves {
            board.mark(Coord::new(r, c)).unwrap();
        }
        board
    }

    fn assert_permutation_of_free(ordered: &[Coord], board: &BoardState) {
        let unique: HashSet<_> = ordered.iter().copied().collect();
        assert_eq!(unique.len(), ordered.len(), "duplicates in {ordered:?}");
        let free: HashSet<_> = board.free_cells().into_iter().collect();
        assert_eq!(unique, free);
    }

    #[test]
    fn test_empty_board_is_row_major() {
        let board = board_with(2, 3, 2, &[]);
        let orderer = MoveOrderer::new(Perspective::new(true));
        let ordered = orderer.order(&board);
        assert_eq!(ordered, board.free_cells());
    }

    #[test]
    fn test_radial_prefers_heavier_cells() {
        // 5x5: center ring weight 11, middle ring 6, outer ring 1.
        let board = board_with(5, 5, 3, &[(0, 0)]);
        let radial = MoveOrderer::radial(&board, Coord::new(0, 0));
        assert_eq!(radial.first(), Some(&Coord::new(2, 2)));
        assert_eq!(radial.get(1), Some(&Coord::new(1, 1)));
        // Only right, down-right and down stay on the board: 3 rays * 3 steps.
        assert_eq!(radial.len(), 9);
    }

    #[test]
    fn test_radial_stable_on_ties() {
        // Every cell of a 1-row board weighs 1, so discovery order decides.
        let board = board_with(1, 5, 2, &[(0, 2)]);
        let radial = MoveOrderer::radial(&board, Coord::new(0, 2));
        assert_eq!(
            radial,
            vec![
                Coord::new(0, 3),
                Coord::new(0, 1),
                Coord::new(0, 4),
                Coord::new(0, 0),
            ]
        );
    }

    #[test]
    fn test_my_anchor_comes_before_opponent_anchor() {
        // P1 at (0,0), P2 at (4,4); engine is P2.
        let board = board_with(5, 5, 2, &[(0, 0), (4, 4)]);
        let orderer = MoveOrderer::new(Perspective::new(false));
        let ordered = orderer.order(&board);
        let around_me = MoveOrderer::radial(&board, Coord::new(4, 4));
        assert_eq!(&ordered[..around_me.len()], around_me.as_slice());
        assert_permutation_of_free(&ordered, &board);
    }

    #[test]
    fn test_order_is_permutation_of_free_cells() {
        let layouts: [&[(usize, usize)]; 4] = [
            &[],
            &[(3, 3)],
            &[(3, 3), (3, 4), (0, 0), (6, 6)],
            &[(1, 1), (1, 2), (2, 1), (5, 5), (4, 2), (0, 6)],
        ];
        for moves in layouts {
            let board = board_with(7, 7, 4, moves);
            for first in [true, false] {
                let ordered = MoveOrderer::new(Perspective::new(first)).order(&board);
                assert_permutation_of_free(&ordered, &board);
            }
        }
    }
}
