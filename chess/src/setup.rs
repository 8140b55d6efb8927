//! Start configurations
//!
//! A game starts either from the classic position, from one of the 960 Chess960 positions or
//! from an explicit list of figures.

use crate::board::Board;
use crate::figure::{Figure, FigureKind, FigureParseError};
use crate::geometry::{base_row, pawn_start_row};
use crate::types::{Color, ColorParseError, FigureType, Position};

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use thiserror::Error;

include!(concat!(env!("OUT_DIR"), "/chess960.rs"));

/// Number of the classic start position among Chess960 positions
pub const CLASSIC_INDEX: u16 = 518;

/// Error building a start position
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SetupError {
    #[error("empty setup")]
    Empty,
    #[error("bad figure: {0}")]
    BadFigure(#[from] FigureParseError),
    #[error("bad side to move: {0}")]
    BadColor(#[from] ColorParseError),
    #[error("bad move counter: {0}")]
    BadCounter(#[from] ParseIntError),
    #[error("two figures on {0}")]
    DuplicateSquare(Position),
    #[error("no {0} king")]
    MissingKing(Color),
    #[error("second {0} king")]
    SecondKing(Color),
    #[error("pawn on base row at {0}")]
    PawnOnBaseRow(Position),
    #[error("pawn on {0} cannot be caught en passant")]
    BadEnPassant(Position),
    #[error("chess960 position index {0} is out of range")]
    IndexOutOfRange(u16),
    #[error("the side which is not to move is in check")]
    OpponentInCheck,
    #[error("more than two figures give check to the side to move")]
    TooManyChecks,
    #[error("move {0} is not legal")]
    IllegalMove(String),
}

/// How the game starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartConfig {
    Classic,
    /// Chess960 position with the given index in Scharnagl numbering
    Chess960(u16),
    /// Explicit position, as written by the game dump
    Manual {
        side: Color,
        hits: u16,
        figures: Vec<Figure>,
    },
}

impl StartConfig {
    /// Figure types on the base row for the given Chess960 index, from column `a` to `h`
    pub fn chess960_row(index: u16) -> Result<[FigureType; 8], SetupError> {
        CHESS960_ROWS
            .get(index as usize)
            .copied()
            .ok_or(SetupError::IndexOutOfRange(index))
    }

    fn row_figures(row: [FigureType; 8]) -> Vec<Figure> {
        let mut res = Vec::with_capacity(32);
        for color in [Color::White, Color::Black] {
            for (column, &t) in row.iter().enumerate() {
                let pos = Position::new(base_row(color), column as u8);
                res.push(Figure::new(color, pos, FigureKind::new(t)));
                let pos = Position::new(pawn_start_row(color), column as u8);
                res.push(Figure::new(color, pos, FigureKind::new(FigureType::Pawn)));
            }
        }
        res
    }

    /// Builds the start board together with the initial fifty-move hit counter
    pub fn build(&self) -> Result<(Board, u16), SetupError> {
        match self {
            StartConfig::Classic => StartConfig::Chess960(CLASSIC_INDEX).build(),
            StartConfig::Chess960(index) => {
                let figures = Self::row_figures(Self::chess960_row(*index)?);
                Ok((Board::from_figures(Color::White, figures)?, 0))
            }
            StartConfig::Manual {
                side,
                hits,
                figures,
            } => Ok((Board::from_figures(*side, figures.iter().copied())?, *hits)),
        }
    }

    pub fn board(&self) -> Result<Board, SetupError> {
        Ok(self.build()?.0)
    }
}

impl FromStr for StartConfig {
    type Err = SetupError;

    /// Parses `classic`, `chess960 <index>`, or a list of figure descriptors optionally
    /// prefixed with the side to move and the hit counter
    fn from_str(s: &str) -> Result<StartConfig, Self::Err> {
        let tokens: Vec<&str> = s.split_ascii_whitespace().collect();
        match tokens.as_slice() {
            [] => Err(SetupError::Empty),
            ["classic"] => Ok(StartConfig::Classic),
            ["chess960", index] => Ok(StartConfig::Chess960(index.parse()?)),
            _ => {
                let mut rest = tokens.as_slice();
                let mut side = Color::White;
                let mut hits = 0;
                if let Some(Ok(color)) = rest.first().map(|t| Color::from_str(t)) {
                    side = color;
                    rest = &rest[1..];
                    if let Some(counter) = rest.first().filter(|t| t.starts_with(|c: char| c.is_ascii_digit())) {
                        hits = counter.parse()?;
                        rest = &rest[1..];
                    }
                }
                let figures = rest
                    .iter()
                    .map(|t| Figure::from_str(t))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(StartConfig::Manual {
                    side,
                    hits,
                    figures,
                })
            }
        }
    }
}

impl fmt::Display for StartConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            StartConfig::Classic => write!(f, "classic"),
            StartConfig::Chess960(index) => write!(f, "chess960 {}", index),
            StartConfig::Manual {
                side,
                hits,
                figures,
            } => {
                write!(f, "{} {}", side, hits)?;
                for fig in figures {
                    write!(f, " {}", fig)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_str(index: u16) -> String {
        StartConfig::chess960_row(index)
            .unwrap()
            .iter()
            .map(|t| match t {
                FigureType::Knight => 'N',
                t => t.name().chars().next().unwrap(),
            })
            .collect()
    }

    #[test]
    fn test_chess960_rows() {
        assert_eq!(row_str(CLASSIC_INDEX), "RNBQKBNR");
        assert_eq!(row_str(0), "BBQNNRKR");
        assert_eq!(row_str(959), "RKRNNQBB");
        for index in 0..960 {
            let row = StartConfig::chess960_row(index).unwrap();
            let bishops: Vec<usize> = (0..8).filter(|&i| row[i] == FigureType::Bishop).collect();
            assert_eq!(bishops.len(), 2);
            assert_ne!(bishops[0] % 2, bishops[1] % 2);
            let king = row.iter().position(|&t| t == FigureType::King).unwrap();
            let rooks: Vec<usize> = (0..8).filter(|&i| row[i] == FigureType::Rook).collect();
            assert!(rooks[0] < king && king < rooks[1]);
        }
        assert_eq!(
            StartConfig::chess960_row(960),
            Err(SetupError::IndexOutOfRange(960))
        );
    }

    #[test]
    fn test_build() {
        let (board, hits) = StartConfig::Chess960(0).build().unwrap();
        assert_eq!(hits, 0);
        assert_eq!(board.figure_count(), 32);
        assert_eq!(board.side(), Color::White);
        assert_eq!(
            board.get(Position::from_str("g8").unwrap()).unwrap().kind,
            FigureKind::King {
                move_count: 0,
                did_castle: false
            }
        );
        assert_eq!(
            StartConfig::Chess960(1000).build().unwrap_err(),
            SetupError::IndexOutOfRange(1000)
        );
    }

    #[test]
    fn test_parse() {
        assert_eq!(StartConfig::from_str("classic"), Ok(StartConfig::Classic));
        assert_eq!(
            StartConfig::from_str("chess960 12"),
            Ok(StartConfig::Chess960(12))
        );
        let config =
            StartConfig::from_str("black 12 King-white-g1-2 King-black-g8-2 Pawn-black-f7-false")
                .unwrap();
        let StartConfig::Manual { side, hits, ref figures } = config else {
            panic!("manual config expected");
        };
        assert_eq!(side, Color::Black);
        assert_eq!(hits, 12);
        assert_eq!(figures.len(), 3);
        assert_eq!(
            config.to_string(),
            "black 12 King-white-g1-2-false King-black-g8-2-false Pawn-black-f7-false"
        );

        let config = StartConfig::from_str("King-white-e1 King-black-e8").unwrap();
        let (board, hits) = config.build().unwrap();
        assert_eq!(board.side(), Color::White);
        assert_eq!(hits, 0);

        assert_eq!(StartConfig::from_str("  "), Err(SetupError::Empty));
        assert!(matches!(
            StartConfig::from_str("white 1x King-white-e1 King-black-e8"),
            Err(SetupError::BadCounter(_))
        ));
        assert!(matches!(
            StartConfig::from_str("white King-white-e1 Dragon-black-e8"),
            Err(SetupError::BadFigure(_))
        ));
    }
}
