//! Figures and their move rules
//!
//! Every figure kind has its own module with the same set of functions. [`Figure`] dispatches
//! to them by kind, so the rules of a kind live in one place.

mod king;
mod knight;
mod pawn;
mod sliding;

use crate::board::Board;
use crate::moves::Move;
use crate::square_set::SquareSet;
use crate::types::{
    Color, ColorParseError, FigureType, FigureTypeParseError, Position, PositionParseError,
};

use std::fmt;
use std::num::ParseIntError;
use std::str::{FromStr, ParseBoolError};

use thiserror::Error;

/// Error parsing figure descriptor
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FigureParseError {
    #[error("descriptor must have at least three parts")]
    MissingParts,
    #[error("too many parts for {0}")]
    TooManyParts(FigureType),
    #[error("bad figure type: {0}")]
    BadType(#[from] FigureTypeParseError),
    #[error("bad color: {0}")]
    BadColor(#[from] ColorParseError),
    #[error("bad position: {0}")]
    BadPosition(#[from] PositionParseError),
    #[error("bad move count: {0}")]
    BadMoveCount(#[from] ParseIntError),
    #[error("bad flag: {0}")]
    BadFlag(#[from] ParseBoolError),
}

/// Variant-specific state of a figure
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FigureKind {
    Pawn { can_be_caught_en_passant: bool },
    Knight,
    Bishop,
    Rook { move_count: u16 },
    Queen,
    King { move_count: u16, did_castle: bool },
}

impl FigureKind {
    /// Creates a kind of the given type in its initial state
    pub const fn new(t: FigureType) -> FigureKind {
        match t {
            FigureType::Pawn => FigureKind::Pawn {
                can_be_caught_en_passant: false,
            },
            FigureType::Knight => FigureKind::Knight,
            FigureType::Bishop => FigureKind::Bishop,
            FigureType::Rook => FigureKind::Rook { move_count: 0 },
            FigureType::Queen => FigureKind::Queen,
            FigureType::King => FigureKind::King {
                move_count: 0,
                did_castle: false,
            },
        }
    }

    pub const fn figure_type(&self) -> FigureType {
        match *self {
            FigureKind::Pawn { .. } => FigureType::Pawn,
            FigureKind::Knight => FigureType::Knight,
            FigureKind::Bishop => FigureType::Bishop,
            FigureKind::Rook { .. } => FigureType::Rook,
            FigureKind::Queen => FigureType::Queen,
            FigureKind::King { .. } => FigureType::King,
        }
    }
}

/// Figure standing on the board
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Figure {
    pub color: Color,
    pub position: Position,
    pub kind: FigureKind,
}

impl Figure {
    #[inline]
    pub const fn new(color: Color, position: Position, kind: FigureKind) -> Figure {
        Figure {
            color,
            position,
            kind,
        }
    }

    #[inline]
    pub const fn figure_type(&self) -> FigureType {
        self.kind.figure_type()
    }

    #[inline]
    pub fn is(&self, color: Color, t: FigureType) -> bool {
        self.color == color && self.figure_type() == t
    }

    /// Returns `true` if the figure never moved, which is required for castling
    #[inline]
    pub fn is_unmoved(&self) -> bool {
        match self.kind {
            FigureKind::Rook { move_count } => move_count == 0,
            FigureKind::King {
                move_count,
                did_castle,
            } => move_count == 0 && !did_castle,
            _ => false,
        }
    }

    #[inline]
    pub fn can_be_caught_en_passant(&self) -> bool {
        matches!(
            self.kind,
            FigureKind::Pawn {
                can_be_caught_en_passant: true
            }
        )
    }

    /// Returns the figure moved to `to` with its move counter bumped
    pub(crate) fn moved_to(&self, to: Position) -> Figure {
        let kind = match self.kind {
            FigureKind::Rook { move_count } => FigureKind::Rook {
                move_count: move_count + 1,
            },
            FigureKind::King {
                move_count,
                did_castle,
            } => FigureKind::King {
                move_count: move_count + 1,
                did_castle,
            },
            kind => kind,
        };
        Figure::new(self.color, to, kind)
    }

    /// Checks whether the figure can get to `target` judging only by geometry and occupancy
    ///
    /// Pins, checks, en passant and castling are not taken into account.
    pub fn is_reachable(&self, target: Position, board: &Board) -> bool {
        if board.get(target).map_or(false, |f| f.color == self.color) {
            return false;
        }
        match self.kind {
            FigureKind::Pawn { .. } => pawn::is_reachable(self, target, board),
            FigureKind::Knight => knight::reachable(self.position).has(target),
            FigureKind::Bishop | FigureKind::Rook { .. } | FigureKind::Queen => {
                sliding::is_reachable(self, target, board)
            }
            FigureKind::King { .. } => king::reachable(self.position).has(target),
        }
    }

    /// Squares the figure could move to on an empty board
    pub fn reachable_moves(&self) -> SquareSet {
        match self.kind {
            FigureKind::Pawn { .. } => pawn::reachable_moves(self.color, self.position),
            FigureKind::Knight => knight::reachable(self.position),
            FigureKind::Bishop | FigureKind::Rook { .. } | FigureKind::Queen => {
                sliding::reachable(self.figure_type(), self.position)
            }
            FigureKind::King { .. } => king::reachable(self.position),
        }
    }

    /// Squares the figure could capture on on an empty board
    pub fn reachable_captures(&self) -> SquareSet {
        match self.kind {
            FigureKind::Pawn { .. } => pawn::reachable_captures(self.color, self.position),
            _ => self.reachable_moves(),
        }
    }

    /// Squares attacked by the figure on the current board
    pub fn attacked_squares(&self, board: &Board) -> SquareSet {
        match self.kind {
            FigureKind::Bishop | FigureKind::Rook { .. } | FigureKind::Queen => {
                sliding::attacked(self, board)
            }
            _ => self.reachable_captures(),
        }
    }

    /// Appends all the legal moves of this figure to `out`
    ///
    /// Promotions are listed once, without the promotion target.
    pub fn legal_moves(&self, board: &Board, out: &mut Vec<Move>) {
        if self.color != board.side() {
            return;
        }
        match self.kind {
            FigureKind::Pawn { .. } => pawn::legal_moves(self, board, out),
            FigureKind::Knight => knight::legal_moves(self, board, out),
            FigureKind::Bishop | FigureKind::Rook { .. } | FigureKind::Queen => {
                sliding::legal_moves(self, board, out)
            }
            FigureKind::King { .. } => king::legal_moves(self, board, out),
        }
    }

    /// Appends the legal moves that change the position in a hard to revert way
    ///
    /// These are captures, pawn moves, castling and moves that lose castling rights.
    pub fn critical_moves(&self, board: &Board, out: &mut Vec<Move>) {
        let start = out.len();
        self.legal_moves(board, out);
        let mut idx = start;
        while idx < out.len() {
            if self.is_critical(out[idx], board) {
                idx += 1;
            } else {
                out.swap_remove(idx);
            }
        }
        out[start..].sort_by_key(|mv| mv.to);
    }

    fn is_critical(&self, mv: Move, board: &Board) -> bool {
        if board.get(mv.to).is_some() {
            return true;
        }
        match self.kind {
            FigureKind::Pawn { .. } => true,
            FigureKind::King { .. } => self.is_unmoved(),
            FigureKind::Rook { .. } => {
                let king = board.king(self.color);
                self.is_unmoved()
                    && board.get(king).map_or(false, Figure::is_unmoved)
                    && king.row() == self.position.row()
            }
            _ => false,
        }
    }

    /// Returns `true` if the figure belongs to the side to move and has at least one legal move
    pub fn is_selectable(&self, board: &Board) -> bool {
        if self.color != board.side() {
            return false;
        }
        let mut moves = Vec::new();
        self.legal_moves(board, &mut moves);
        !moves.is_empty()
    }
}

/// Restricts targets of a non-king figure according to checks and pins
///
/// Returns `true` if moving the figure from its position to `to` doesn't leave its own king
/// in check. En passant is verified separately, as it removes a second figure from the board.
pub(crate) fn keeps_king_safe(fig: &Figure, to: Position, board: &Board) -> bool {
    let lines = board.attack_lines();
    match lines.checks() {
        [] => {}
        [check] => {
            if !check.intercepts.contains(&to) {
                return false;
            }
        }
        _ => return false,
    }
    match lines.bound_line(fig.position) {
        Some(bound) => {
            bound.possible_moves_to_attacker.contains(&to)
                || bound.possible_moves_to_king.contains(&to)
        }
        None => true,
    }
}

impl fmt::Display for Figure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}-{}-{}", self.figure_type(), self.color, self.position)?;
        match self.kind {
            FigureKind::Pawn {
                can_be_caught_en_passant,
            } => write!(f, "-{}", can_be_caught_en_passant),
            FigureKind::Rook { move_count } => write!(f, "-{}", move_count),
            FigureKind::King {
                move_count,
                did_castle,
            } => write!(f, "-{}-{}", move_count, did_castle),
            _ => Ok(()),
        }
    }
}

impl FromStr for Figure {
    type Err = FigureParseError;

    /// Parses descriptors like `Pawn-white-e2-false`, `Rook-black-a8-0`, `King-white-e1-0-false`
    ///
    /// Move counts and flags may be omitted and default to `0` and `false`.
    fn from_str(s: &str) -> Result<Figure, Self::Err> {
        let parts: Vec<&str> = s.split('-').collect();
        if parts.len() < 3 {
            return Err(FigureParseError::MissingParts);
        }
        let t = FigureType::from_str(parts[0])?;
        let color = Color::from_str(parts[1])?;
        let position = Position::from_str(parts[2])?;
        let extra = &parts[3..];
        let max_extra = match t {
            FigureType::Pawn | FigureType::Rook => 1,
            FigureType::King => 2,
            _ => 0,
        };
        if extra.len() > max_extra {
            return Err(FigureParseError::TooManyParts(t));
        }
        let count = |i: usize| -> Result<u16, FigureParseError> {
            Ok(extra.get(i).map(|s| s.parse()).transpose()?.unwrap_or(0))
        };
        let flag = |i: usize| -> Result<bool, FigureParseError> {
            Ok(extra.get(i).map(|s| s.parse()).transpose()?.unwrap_or(false))
        };
        let kind = match t {
            FigureType::Pawn => FigureKind::Pawn {
                can_be_caught_en_passant: flag(0)?,
            },
            FigureType::Rook => FigureKind::Rook {
                move_count: count(0)?,
            },
            FigureType::King => FigureKind::King {
                move_count: count(0)?,
                did_castle: flag(1)?,
            },
            t => FigureKind::new(t),
        };
        Ok(Figure::new(color, position, kind))
    }
}
