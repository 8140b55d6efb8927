//! # kibitz
//!
//! Chess rules and a computer opponent. Supports classic chess and Chess960.

pub use kibitz_base::{geometry, square_set, types};

pub mod attack_lines;
pub mod board;
pub mod eval;
pub mod figure;
pub mod game;
pub mod memento;
pub mod moves;
pub mod search;
pub mod setup;

pub use attack_lines::AttackLines;
pub use board::Board;
pub use eval::{EvaluatedMove, Evaluation, MaterialEval, Score, StaticEval};
pub use figure::{Figure, FigureKind};
pub use game::{ChessGame, EndOfGame};
pub use moves::{ExtendedMove, Move, MoveKind, PromotionType};
pub use search::{ComputerPlayer, SearchConfig};
pub use setup::{SetupError, StartConfig};
pub use square_set::SquareSet;
pub use types::{Color, Direction, FigureType, Position};
