//! Position evaluation
//!
//! [`Evaluation`] is the value of a move as seen by the side that makes it. Terminal outcomes
//! are ordered around ongoing games: being mated is the worst, every kind of draw is worse
//! than any ongoing position, and mating the opponent is the best.

use crate::board::Board;
use crate::figure::Figure;
use crate::geometry::{pawn_row_delta, pawn_start_row};
use crate::moves::Move;
use crate::square_set::SquareSet;
use crate::types::{Color, FigureType};

use std::cmp::Ordering;
use std::fmt;

/// Static score of an ongoing position, compared by `primary` first
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Score {
    /// Material balance
    pub primary: i32,
    /// Positional details that break ties between equal material
    pub secondary: i32,
}

impl Score {
    pub const fn new(primary: i32, secondary: i32) -> Score {
        Score { primary, secondary }
    }
}

impl std::ops::Neg for Score {
    type Output = Score;

    fn neg(self) -> Score {
        Score::new(-self.primary, -self.secondary)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Evaluation {
    /// The side making the move gets mated after the given number of its own moves
    CheckmateSelf(u32),
    ThreeFoldRepetition,
    Stalemate,
    /// Insufficient material or fifty moves
    Draw,
    Ongoing(Score),
    /// The side making the move mates in the given number of its own moves
    CheckmateOther(u32),
}

impl Evaluation {
    fn class(&self) -> u8 {
        match *self {
            Evaluation::CheckmateSelf(_) => 0,
            Evaluation::ThreeFoldRepetition => 1,
            Evaluation::Stalemate => 2,
            Evaluation::Draw => 3,
            Evaluation::Ongoing(_) => 4,
            Evaluation::CheckmateOther(_) => 5,
        }
    }

    pub fn score(&self) -> Option<Score> {
        match *self {
            Evaluation::Ongoing(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the evaluation with the primary score raised by `radius`, if it is ongoing
    pub fn relaxed(&self, radius: i32) -> Evaluation {
        match *self {
            Evaluation::Ongoing(s) => {
                Evaluation::Ongoing(Score::new(s.primary.saturating_add(radius), s.secondary))
            }
            e => e,
        }
    }
}

impl Ord for Evaluation {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            // Getting mated later is better
            (Evaluation::CheckmateSelf(a), Evaluation::CheckmateSelf(b)) => a.cmp(b),
            // Mating sooner is better
            (Evaluation::CheckmateOther(a), Evaluation::CheckmateOther(b)) => b.cmp(a),
            (Evaluation::Ongoing(a), Evaluation::Ongoing(b)) => a.cmp(b),
            _ => self.class().cmp(&other.class()),
        }
    }
}

impl PartialOrd for Evaluation {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match *self {
            Evaluation::CheckmateSelf(n) => write!(f, "mated in {}", n),
            Evaluation::ThreeFoldRepetition => write!(f, "repetition"),
            Evaluation::Stalemate => write!(f, "stalemate"),
            Evaluation::Draw => write!(f, "draw"),
            Evaluation::Ongoing(s) => write!(f, "{} ({})", s.primary, s.secondary),
            Evaluation::CheckmateOther(n) => write!(f, "mate in {}", n),
        }
    }
}

/// Move together with its value
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct EvaluatedMove {
    pub mv: Move,
    pub evaluation: Evaluation,
    /// Best answer of the opponent found by the search
    pub best_reply: Option<Move>,
}

/// Static evaluator of a position
pub trait StaticEval: Send + Sync {
    /// Scores the position from the point of view of `color`
    fn evaluate(&self, board: &Board, color: Color) -> Score;
}

/// Material value of a figure type in centipawns. The king has no material value
pub const fn figure_value(t: FigureType) -> i32 {
    match t {
        FigureType::Pawn => 100,
        FigureType::Knight => 300,
        FigureType::Bishop => 300,
        FigureType::Rook => 500,
        FigureType::Queen => 900,
        FigureType::King => 0,
    }
}

/// Default evaluator
///
/// Primary score is the material difference. Secondary score adds up pawns sheltering the king,
/// the number of attacked squares and pawn advancement, each as a difference between the sides.
#[derive(Debug, Default, Copy, Clone)]
pub struct MaterialEval;

impl MaterialEval {
    const SHELTER_WEIGHT: i32 = 10;
    const CONTROL_WEIGHT: i32 = 1;
    const ADVANCE_WEIGHT: i32 = 4;

    fn material(board: &Board, color: Color) -> i32 {
        board
            .figures_of(color)
            .map(|f| figure_value(f.figure_type()))
            .sum()
    }

    fn shelter(board: &Board, color: Color) -> i32 {
        let king = board.king(color);
        [-1, 0, 1]
            .into_iter()
            .filter_map(|dc| king.shift(pawn_row_delta(color), dc))
            .filter(|&p| board.get(p).map_or(false, |f| f.is(color, FigureType::Pawn)))
            .count() as i32
    }

    fn control(board: &Board, color: Color) -> i32 {
        board
            .figures_of(color)
            .fold(SquareSet::EMPTY, |acc, f| acc | f.attacked_squares(board))
            .len() as i32
    }

    fn advance(board: &Board, color: Color) -> i32 {
        board
            .figures_of(color)
            .filter(|f| f.figure_type() == FigureType::Pawn)
            .map(|f: &Figure| f.position.row().abs_diff(pawn_start_row(color)) as i32)
            .sum()
    }

    fn secondary(board: &Board, color: Color) -> i32 {
        Self::SHELTER_WEIGHT * Self::shelter(board, color)
            + Self::CONTROL_WEIGHT * Self::control(board, color)
            + Self::ADVANCE_WEIGHT * Self::advance(board, color)
    }
}

impl StaticEval for MaterialEval {
    fn evaluate(&self, board: &Board, color: Color) -> Score {
        let enemy = color.inv();
        Score::new(
            Self::material(board, color) - Self::material(board, enemy),
            Self::secondary(board, color) - Self::secondary(board, enemy),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::StartConfig;
    use std::str::FromStr;

    /// Swaps the colors and mirrors the rows
    fn mirrored(board: &Board) -> Board {
        let figures = board.figures().map(|f| {
            let mut f = *f;
            f.color = f.color.inv();
            f.position = f.position.flipped_row();
            f
        });
        Board::from_figures(board.side().inv(), figures).unwrap()
    }

    #[test]
    fn test_order() {
        let ongoing = |p, s| Evaluation::Ongoing(Score::new(p, s));
        let ordered = [
            Evaluation::CheckmateSelf(1),
            Evaluation::CheckmateSelf(3),
            Evaluation::ThreeFoldRepetition,
            Evaluation::Stalemate,
            Evaluation::Draw,
            ongoing(-900, 50),
            ongoing(0, -5),
            ongoing(0, 7),
            ongoing(100, -100),
            Evaluation::CheckmateOther(4),
            Evaluation::CheckmateOther(1),
        ];
        for w in ordered.windows(2) {
            assert!(w[0] < w[1], "{:?} < {:?}", w[0], w[1]);
        }
        assert_eq!(ongoing(10, 0).relaxed(5), ongoing(15, 0));
        assert_eq!(Evaluation::Draw.relaxed(5), Evaluation::Draw);
    }

    #[test]
    fn test_initial_is_balanced() {
        let board = StartConfig::Classic.board().unwrap();
        assert_eq!(MaterialEval.evaluate(&board, Color::White), Score::new(0, 0));
    }

    #[test]
    fn test_material() {
        let board = Board::from_str(
            "white King-white-e1-1 Queen-white-d1 King-black-e8-1 Rook-black-a8-1 Pawn-black-h7",
        )
        .unwrap();
        assert_eq!(MaterialEval.evaluate(&board, Color::White).primary, 300);
        assert_eq!(MaterialEval.evaluate(&board, Color::Black).primary, -300);
    }

    #[test]
    fn test_symmetry() {
        for s in [
            "white King-white-g1-2 Pawn-white-f2 Pawn-white-g2 Pawn-white-a4 Knight-white-c3 \
             King-black-e8-1 Rook-black-a8-1 Pawn-black-e6 Bishop-black-d6",
            "black King-white-c1-1 Queen-white-d4 Pawn-white-b2 King-black-g8-1 Pawn-black-f7 \
             Pawn-black-g7 Pawn-black-h7 Rook-black-e8-2",
        ] {
            let board = Board::from_str(s).unwrap();
            let mirror = mirrored(&board);
            for color in [Color::White, Color::Black] {
                let score = MaterialEval.evaluate(&board, color);
                assert_eq!(score, -MaterialEval.evaluate(&board, color.inv()));
                assert_eq!(score, MaterialEval.evaluate(&mirror, color.inv()));
            }
        }
    }

    #[test]
    fn test_shelter() {
        let sheltered = Board::from_str(
            "white King-white-g1-2 Pawn-white-f2 Pawn-white-g2 Pawn-white-h2 King-black-g8-2 \
             Pawn-black-a7 Pawn-black-b7 Pawn-black-c7",
        )
        .unwrap();
        let score = MaterialEval.evaluate(&sheltered, Color::White);
        assert_eq!(score.primary, 0);
        assert!(score.secondary > 0);
    }
}
