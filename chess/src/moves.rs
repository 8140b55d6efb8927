use crate::figure::Figure;
use crate::types::{FigureType, Position, PositionParseError};

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Target figure for promotion
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PromotionType {
    Queen,
    Rook,
    Bishop,
    Knight,
}

impl PromotionType {
    /// Letter used in the move text. Knight is written as `K`
    pub const fn as_char(&self) -> char {
        match *self {
            PromotionType::Queen => 'Q',
            PromotionType::Rook => 'R',
            PromotionType::Bishop => 'B',
            PromotionType::Knight => 'K',
        }
    }

    /// Parses a promotion letter. Accepts `N` as an alias for the knight
    pub const fn from_char(c: char) -> Option<PromotionType> {
        match c {
            'Q' => Some(PromotionType::Queen),
            'R' => Some(PromotionType::Rook),
            'B' => Some(PromotionType::Bishop),
            'K' | 'N' => Some(PromotionType::Knight),
            _ => None,
        }
    }
}

impl From<PromotionType> for FigureType {
    #[inline]
    fn from(p: PromotionType) -> Self {
        match p {
            PromotionType::Queen => FigureType::Queen,
            PromotionType::Rook => FigureType::Rook,
            PromotionType::Bishop => FigureType::Bishop,
            PromotionType::Knight => FigureType::Knight,
        }
    }
}

/// Error parsing move from its text form
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum MoveParseError {
    #[error("bad string length")]
    BadLength,
    #[error("bad source: {0}")]
    BadSrc(PositionParseError),
    #[error("bad destination: {0}")]
    BadDst(PositionParseError),
    #[error("bad separator {0:?}")]
    BadSeparator(char),
}

/// Move request
///
/// Holds only the source and destination squares and an optional promotion target. Whether the
/// move is a capture, castling or en passant is decided by the board when the move is applied.
///
/// Castling is encoded as a king move onto the square of its own castling rook.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Position,
    pub to: Position,
    pub promotion: Option<PromotionType>,
}

impl Move {
    #[inline]
    pub const fn new(from: Position, to: Position) -> Move {
        Move {
            from,
            to,
            promotion: None,
        }
    }

    #[inline]
    pub const fn with_promotion(from: Position, to: Position, promotion: PromotionType) -> Move {
        Move {
            from,
            to,
            promotion: Some(promotion),
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        let sep = self.promotion.map_or('-', |p| p.as_char());
        write!(f, "{}{}{}", self.from, sep, self.to)
    }
}

impl FromStr for Move {
    type Err = MoveParseError;

    fn from_str(s: &str) -> Result<Move, Self::Err> {
        if s.len() != 5 || !s.is_ascii() {
            return Err(MoveParseError::BadLength);
        }
        let from = Position::from_str(&s[0..2]).map_err(MoveParseError::BadSrc)?;
        let to = Position::from_str(&s[3..5]).map_err(MoveParseError::BadDst)?;
        let sep = s.as_bytes()[2] as char;
        let promotion = match sep {
            '-' => None,
            c => Some(PromotionType::from_char(c).ok_or(MoveParseError::BadSeparator(c))?),
        };
        Ok(Move {
            from,
            to,
            promotion,
        })
    }
}

/// What kind of special handling a move received when it was applied
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MoveKind {
    /// Simple move or capture
    Plain,
    /// Castling, the king went onto its final square and the rook next to it
    Castling,
    /// Pawn capture onto the empty square behind a pawn that has just made a double step
    EnPassant,
    /// Pawn reached the last row and was replaced by another figure
    Promotion(PromotionType),
    /// Pawn moved two rows forward from its start row
    DoubleStep,
}

/// Record of an applied move
///
/// Contains everything needed to undo the move exactly: the moved figure and the castling rook
/// as they were before the move, the captured figure with its own square (which differs from the
/// destination for en passant), and the pawn whose en passant flag was cleared by this move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedMove {
    /// Applied move, with the promotion type filled in
    pub mv: Move,
    pub kind: MoveKind,
    pub figure: Figure,
    pub captured: Option<Figure>,
    pub castling_rook: Option<Figure>,
    pub cleared_en_passant: Option<Position>,
}

impl ExtendedMove {
    #[inline]
    pub fn is_capture(&self) -> bool {
        self.captured.is_some()
    }

    #[inline]
    pub fn is_castling(&self) -> bool {
        self.kind == MoveKind::Castling
    }

    #[inline]
    pub fn is_en_passant(&self) -> bool {
        self.kind == MoveKind::EnPassant
    }

    #[inline]
    pub fn promotion(&self) -> Option<PromotionType> {
        match self.kind {
            MoveKind::Promotion(p) => Some(p),
            _ => None,
        }
    }

    /// Returns `true` if the move cannot be repeated back: a capture or any pawn move
    #[inline]
    pub fn is_irreversible(&self) -> bool {
        self.is_capture() || self.figure.kind.figure_type() == FigureType::Pawn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(s: &str) -> Position {
        Position::from_str(s).unwrap()
    }

    #[test]
    fn test_move_str() {
        let mv = Move::from_str("e2-e4").unwrap();
        assert_eq!(mv, Move::new(pos("e2"), pos("e4")));
        assert_eq!(mv.to_string(), "e2-e4");

        let mv = Move::from_str("b2Qb1").unwrap();
        assert_eq!(
            mv,
            Move::with_promotion(pos("b2"), pos("b1"), PromotionType::Queen)
        );
        assert_eq!(mv.to_string(), "b2Qb1");

        let knight = Move::from_str("g7Kg8").unwrap();
        assert_eq!(knight.promotion, Some(PromotionType::Knight));
        assert_eq!(Move::from_str("g7Ng8"), Ok(knight));
        assert_eq!(knight.to_string(), "g7Kg8");
    }

    #[test]
    fn test_move_parse_errors() {
        assert_eq!(Move::from_str("e2e4"), Err(MoveParseError::BadLength));
        assert_eq!(
            Move::from_str("e2Xe4"),
            Err(MoveParseError::BadSeparator('X'))
        );
        assert_eq!(
            Move::from_str("z2-e4"),
            Err(MoveParseError::BadSrc(PositionParseError::UnexpectedColumnChar('z')))
        );
        assert_eq!(
            Move::from_str("e2-e9"),
            Err(MoveParseError::BadDst(PositionParseError::UnexpectedRowChar('9')))
        );
    }
}
