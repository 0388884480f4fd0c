use crate::logic::board::Coord;

/// Static per-cell weights growing from the edge toward the center.
///
/// Built by walking the board in a shrinking spiral from the top-left
/// corner (right, down, left, up). Every ring gets one weight; the outer
/// ring is 1 and each inner ring adds `increment`.
///
/// ```text
///   4x4, increment 5
///   | 1 | 1 | 1 | 1 |
///   | 1 | 6 | 6 | 1 |
///   | 1 | 6 | 6 | 1 |
///   | 1 | 1 | 1 | 1 |
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionScores {
    rows: usize,
    cols: usize,
    weights: Vec<i32>,
}

impl PositionScores {
    #[must_use]
    #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    pub fn new(rows: usize, cols: usize, increment: i32) -> Self {
        let mut weights = vec![0; rows * cols];
        let mut set = |row: isize, col: isize, score: i32| {
            if let Some(w) = weights.get_mut(row as usize * cols + col as usize) {
                *w = score;
            }
        };

        let mut top = 0_isize;
        let mut bottom = rows as isize - 1;
        let mut left = 0_isize;
        let mut right = cols as isize - 1;
        let mut side = 0;
        let mut score = 1;

        while top <= bottom && left <= right {
            match side {
                0 => {
                    for col in left..=right {
                        set(top, col, score);
                    }
                    top += 1;
                }
                1 => {
                    for row in top..=bottom {
                        set(row, right, score);
                    }
                    right -= 1;
                }
                2 => {
                    for col in (left..=right).rev() {
                        set(bottom, col, score);
                    }
                    bottom -= 1;
                }
                _ => {
                    for row in (top..=bottom).rev() {
                        set(row, left, score);
                    }
                    left += 1;
                    score += increment;
                }
            }
            side = (side + 1) % 4;
        }

        Self {
            rows,
            cols,
            weights,
        }
    }

    /// Weight of `coord`, 0 outside the board.
    pub fn get(&self, coord: Coord) -> i32 {
        if coord.row >= self.rows || coord.col >= self.cols {
            return 0;
        }
        self.weights
            .get(coord.row * self.cols + coord.col)
            .copied()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(scores: &PositionScores, rows: usize, cols: usize) -> Vec<Vec<i32>> {
        (0..rows)
            .map(|r| (0..cols).map(|c| scores.get(Coord::new(r, c))).collect())
            .collect()
    }

    #[test]
    fn test_square_board_rings() {
        let scores = PositionScores::new(4, 4, 5);
        assert_eq!(
            grid(&scores, 4, 4),
            vec![
                vec![1, 1, 1, 1],
                vec![1, 6, 6, 1],
                vec![1, 6, 6, 1],
                vec![1, 1, 1, 1],
            ]
        );
    }

    #[test]
    fn test_center_is_heaviest_on_odd_board() {
        let scores = PositionScores::new(5, 5, 5);
        assert_eq!(scores.get(Coord::new(2, 2)), 11);
        assert_eq!(scores.get(Coord::new(1, 2)), 6);
        assert_eq!(scores.get(Coord::new(0, 2)), 1);
    }

    #[test]
    fn test_rectangular_board() {
        let scores = PositionScores::new(3, 5, 2);
        assert_eq!(
            grid(&scores, 3, 5),
            vec![
                vec![1, 1, 1, 1, 1],
                vec![1, 3, 3, 3, 1],
                vec![1, 1, 1, 1, 1],
            ]
        );
    }

    #[test]
    fn test_single_row_and_out_of_bounds() {
        let scores = PositionScores::new(1, 4, 5);
        assert_eq!(grid(&scores, 1, 4), vec![vec![1, 1, 1, 1]]);
        assert_eq!(scores.get(Coord::new(1, 0)), 0);
    }

    #[test]
    fn test_weights_increase_toward_center() {
        let scores = PositionScores::new(7, 6, 5);
        for r in 0..7_usize {
            for c in 0..6_usize {
                let ring = r.min(c).min(6 - r).min(5 - c);
                let expected = 1 + 5 * i32::try_from(ring).unwrap();
                assert_eq!(scores.get(Coord::new(r, c)), expected, "at ({r}, {c})");
            }
        }
    }
}
