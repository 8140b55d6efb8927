//! Checks and pins of one king
//!
//! The analysis is done once per position and cached by [`Board`], as every legal move query of
//! the side to move needs it.

use crate::board::Board;
use crate::geometry::{pawn_row_delta, KNIGHT_OFFSETS};
use crate::types::{Color, Direction, FigureType, Position};

use arrayvec::ArrayVec;

/// Squares on a line, at most seven of them fit between two squares of the board
pub type LineSquares = ArrayVec<Position, 7>;

/// Figure giving check, together with the squares where the check can be intercepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckLine {
    pub attacker: Position,
    /// Squares from the attacker (included) towards the king (excluded)
    pub intercepts: LineSquares,
}

/// Squares a pinned figure may still move to
///
/// Both sequences start on the square adjacent to the pinned figure. The sequence towards the
/// attacker ends with the attacker's square, the one towards the king ends next to the king.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundLine {
    pub possible_moves_to_attacker: LineSquares,
    pub possible_moves_to_king: LineSquares,
}

/// Checks and pins of the king of a single color
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttackLines {
    checks: ArrayVec<CheckLine, 2>,
    bound_lines: ArrayVec<(Position, BoundLine), 8>,
}

impl AttackLines {
    /// Analyzes the king of the given color
    pub fn compute(board: &Board, color: Color) -> AttackLines {
        let mut res = AttackLines::default();
        let king = board.king(color);
        let enemy = color.inv();

        for dir in Direction::ALL {
            res.scan_ray(board, king, color, dir);
        }

        for &(dr, dc) in &KNIGHT_OFFSETS {
            let Some(p) = king.shift(dr, dc) else {
                continue;
            };
            if board.get(p).map_or(false, |f| f.is(enemy, FigureType::Knight)) {
                res.add_check(p, LineSquares::new());
            }
        }

        for dc in [-1, 1] {
            let Some(p) = king.shift(pawn_row_delta(color), dc) else {
                continue;
            };
            if board.get(p).map_or(false, |f| f.is(enemy, FigureType::Pawn)) {
                res.add_check(p, LineSquares::new());
            }
        }

        res
    }

    fn scan_ray(&mut self, board: &Board, king: Position, color: Color, dir: Direction) {
        let mut near = LineSquares::new();
        let mut ray = king.ray(dir);
        let first = loop {
            let Some(p) = ray.next() else {
                return;
            };
            match board.get(p) {
                Some(f) => break f,
                None => near.push(p),
            }
        };
        if first.color != color {
            if first.figure_type().slides_along(dir) {
                near.reverse();
                self.add_check(first.position, near);
            }
            return;
        }

        let mut far = LineSquares::new();
        for p in ray {
            far.push(p);
            let Some(f) = board.get(p) else {
                continue;
            };
            if f.color != color && f.figure_type().slides_along(dir) {
                near.reverse();
                let bound = BoundLine {
                    possible_moves_to_attacker: far,
                    possible_moves_to_king: near,
                };
                self.bound_lines.push((first.position, bound));
            }
            return;
        }
    }

    fn add_check(&mut self, attacker: Position, mut squares: LineSquares) {
        assert!(
            self.checks.len() < 2,
            "more than two figures give check at once"
        );
        squares.insert(0, attacker);
        self.checks.push(CheckLine {
            attacker,
            intercepts: squares,
        });
    }

    #[inline]
    pub fn checks(&self) -> &[CheckLine] {
        &self.checks
    }

    #[inline]
    pub fn is_check(&self) -> bool {
        !self.checks.is_empty()
    }

    #[inline]
    pub fn is_double_check(&self) -> bool {
        self.checks.len() == 2
    }

    pub fn bound_line(&self, pos: Position) -> Option<&BoundLine> {
        self.bound_lines
            .iter()
            .find(|(p, _)| *p == pos)
            .map(|(_, line)| line)
    }

    pub fn bound_lines(&self) -> impl Iterator<Item = (Position, &BoundLine)> + '_ {
        self.bound_lines.iter().map(|(p, line)| (*p, line))
    }
}
