use crate::attack_lines::AttackLines;
use crate::figure::{Figure, FigureKind};
use crate::geometry::{
    base_row, castling_columns, en_passant_row, pawn_row_delta, promotion_row, KNIGHT_OFFSETS,
};
use crate::moves::{ExtendedMove, Move, MoveKind, PromotionType};
use crate::setup::SetupError;
use crate::square_set::SquareSet;
use crate::types::{Color, Direction, FigureType, Position};

use std::cell::OnceCell;
use std::fmt;
use std::str::FromStr;

/// Chess board
///
/// Keeps the figures, the side to move and the stack of applied moves, so every move can be
/// undone exactly. Checks and pins of the side to move are computed on demand and cached until
/// the next move or undo.
#[derive(Debug, Clone)]
pub struct Board {
    squares: [Option<Figure>; 64],
    kings: [Position; 2],
    side: Color,
    en_passant: Option<Position>,
    history: Vec<ExtendedMove>,
    attack_lines: OnceCell<AttackLines>,
}

impl Board {
    /// Creates a board from a list of figures, verifying that the position makes sense
    pub fn from_figures(
        side: Color,
        figures: impl IntoIterator<Item = Figure>,
    ) -> Result<Board, SetupError> {
        let mut squares = [None; 64];
        let mut kings = [None, None];
        let mut en_passant = None;
        for fig in figures {
            let pos = fig.position;
            if squares[pos.index()].is_some() {
                return Err(SetupError::DuplicateSquare(pos));
            }
            match fig.kind {
                FigureKind::King { .. } => {
                    let king = &mut kings[fig.color.index()];
                    if king.is_some() {
                        return Err(SetupError::SecondKing(fig.color));
                    }
                    *king = Some(pos);
                }
                FigureKind::Pawn {
                    can_be_caught_en_passant,
                } => {
                    if pos.row() == base_row(Color::White) || pos.row() == base_row(Color::Black) {
                        return Err(SetupError::PawnOnBaseRow(pos));
                    }
                    if can_be_caught_en_passant {
                        if fig.color != side.inv()
                            || pos.row() != en_passant_row(side)
                            || en_passant.is_some()
                        {
                            return Err(SetupError::BadEnPassant(pos));
                        }
                        en_passant = Some(pos);
                    }
                }
                _ => {}
            }
            squares[pos.index()] = Some(fig);
        }
        let king = |c: Color| kings[c.index()].ok_or(SetupError::MissingKing(c));
        let board = Board {
            squares,
            kings: [king(Color::White)?, king(Color::Black)?],
            side,
            en_passant,
            history: Vec::new(),
            attack_lines: OnceCell::new(),
        };
        if board.is_attacked(board.king(side.inv()), side) {
            return Err(SetupError::OpponentInCheck);
        }
        if board.attacker_count(board.king(side), side.inv()) > 2 {
            return Err(SetupError::TooManyChecks);
        }
        Ok(board)
    }

    #[inline]
    pub fn get(&self, pos: Position) -> Option<&Figure> {
        self.squares[pos.index()].as_ref()
    }

    #[inline]
    pub fn side(&self) -> Color {
        self.side
    }

    #[inline]
    pub fn king(&self, color: Color) -> Position {
        self.kings[color.index()]
    }

    /// Position of the pawn which can be captured en passant right now
    #[inline]
    pub fn en_passant(&self) -> Option<Position> {
        self.en_passant
    }

    /// Moves applied to this board, the latest one last
    #[inline]
    pub fn history(&self) -> &[ExtendedMove] {
        &self.history
    }

    #[inline]
    pub fn last_move(&self) -> Option<&ExtendedMove> {
        self.history.last()
    }

    /// Iterates over the figures in ascending order of square index
    pub fn figures(&self) -> impl Iterator<Item = &Figure> + '_ {
        self.squares.iter().flatten()
    }

    pub fn figures_of(&self, color: Color) -> impl Iterator<Item = &Figure> + '_ {
        self.figures().filter(move |f| f.color == color)
    }

    pub fn figure_count(&self) -> usize {
        self.figures().count()
    }

    /// Checks and pins of the side to move
    pub fn attack_lines(&self) -> &AttackLines {
        self.attack_lines
            .get_or_init(|| AttackLines::compute(self, self.side))
    }

    #[inline]
    pub fn is_check(&self) -> bool {
        self.attack_lines().is_check()
    }

    pub fn is_attacked(&self, target: Position, by: Color) -> bool {
        self.is_attacked_masked(target, by, SquareSet::EMPTY, SquareSet::EMPTY)
    }

    /// Checks whether `target` is attacked by `by` on a modified occupancy
    ///
    /// Figures on `removed` squares are treated as absent, `added` squares are treated as occupied
    /// by a figure that doesn't attack anything.
    pub fn is_attacked_masked(
        &self,
        target: Position,
        by: Color,
        removed: SquareSet,
        added: SquareSet,
    ) -> bool {
        self.attackers_masked(target, by, removed, added) != 0
    }

    /// Number of figures of color `by` attacking `target`
    pub fn attacker_count(&self, target: Position, by: Color) -> usize {
        self.attackers_masked(target, by, SquareSet::EMPTY, SquareSet::EMPTY)
    }

    fn attackers_masked(
        &self,
        target: Position,
        by: Color,
        removed: SquareSet,
        added: SquareSet,
    ) -> usize {
        let masked = removed | added;
        let attacker = |p: Position, t: FigureType| {
            !masked.has(p) && self.get(p).map_or(false, |f| f.is(by, t))
        };

        let knights = KNIGHT_OFFSETS
            .iter()
            .filter_map(|&(dr, dc)| target.shift(dr, dc))
            .filter(|&p| attacker(p, FigureType::Knight))
            .count();
        let pawns = [-1, 1]
            .into_iter()
            .filter_map(|dc| target.shift(-pawn_row_delta(by), dc))
            .filter(|&p| attacker(p, FigureType::Pawn))
            .count();
        let kings = Direction::ALL
            .into_iter()
            .filter_map(|d| target.step(d))
            .filter(|&p| attacker(p, FigureType::King))
            .count();

        let mut sliders = 0;
        for dir in Direction::ALL {
            for p in target.ray(dir) {
                if added.has(p) {
                    break;
                }
                if removed.has(p) {
                    continue;
                }
                if let Some(f) = self.get(p) {
                    if f.color == by && f.figure_type().slides_along(dir) {
                        sliders += 1;
                    }
                    break;
                }
            }
        }
        knights + pawns + kings + sliders
    }

    /// All legal moves of the side to move, ordered by source square
    pub fn legal_moves(&self) -> Vec<Move> {
        let mut res = Vec::new();
        for fig in self.figures_of(self.side) {
            fig.legal_moves(self, &mut res);
        }
        res
    }

    pub fn has_legal_moves(&self) -> bool {
        let mut buf = Vec::new();
        self.figures_of(self.side).any(|fig| {
            fig.legal_moves(self, &mut buf);
            !buf.is_empty()
        })
    }

    /// Legal moves that are worth looking at even in a shallow search
    ///
    /// Contains the critical moves of every figure plus the quiet moves that give check.
    pub fn critical_moves(&mut self) -> Vec<Move> {
        let mut res = Vec::new();
        for fig in self.figures_of(self.side) {
            fig.critical_moves(self, &mut res);
        }
        for mv in self.legal_moves() {
            if !res.contains(&mv) && self.gives_check(mv) {
                res.push(mv);
            }
        }
        res
    }

    /// Returns `true` if the move puts the enemy king in check
    pub fn gives_check(&mut self, mv: Move) -> bool {
        self.apply_move(mv, |_, _| PromotionType::Queen);
        let res = self.is_check();
        self.undo();
        res
    }

    fn put(&mut self, fig: Figure) {
        if let FigureKind::King { .. } = fig.kind {
            self.kings[fig.color.index()] = fig.position;
        }
        self.squares[fig.position.index()] = Some(fig);
    }

    fn take(&mut self, pos: Position) -> Option<Figure> {
        self.squares[pos.index()].take()
    }

    fn set_en_passant_flag(&mut self, pos: Position, value: bool) {
        if let Some(Figure {
            kind:
                FigureKind::Pawn {
                    can_be_caught_en_passant,
                },
            ..
        }) = &mut self.squares[pos.index()]
        {
            *can_be_caught_en_passant = value;
        }
    }

    /// Applies the move and returns what actually happened
    ///
    /// The move must be legal. If a pawn reaches the last row and the move carries no promotion
    /// target, `choose` is asked for one.
    ///
    /// # Panics
    ///
    /// Panics if there is no figure of the side to move on the source square, or if the move
    /// captures a figure of the same color other than a castling rook.
    pub fn apply_move(
        &mut self,
        mv: Move,
        choose: impl FnOnce(&Board, Position) -> PromotionType,
    ) -> &ExtendedMove {
        let figure = match self.get(mv.from) {
            Some(f) if f.color == self.side => *f,
            _ => panic!("no figure of the side to move on {}", mv.from),
        };
        let target = self.get(mv.to).copied();
        let is_castling = matches!(
            target,
            Some(t) if t.color == figure.color
                && figure.figure_type() == FigureType::King
                && t.figure_type() == FigureType::Rook
        );
        if !is_castling {
            if let Some(t) = target {
                assert!(t.color != figure.color, "move {} captures own figure", mv);
            }
        }

        let cleared_en_passant = self.en_passant.take();
        if let Some(pos) = cleared_en_passant {
            self.set_en_passant_flag(pos, false);
        }

        let mut applied = mv;
        let mut captured = None;
        let mut castling_rook = None;
        let kind = if is_castling {
            let rook = self.take(mv.to);
            self.take(mv.from);
            let row = base_row(figure.color);
            let short = mv.to.column() > mv.from.column();
            let (king_col, rook_col) = castling_columns(short);
            let mut king = figure.moved_to(Position::new(row, king_col));
            if let FigureKind::King { did_castle, .. } = &mut king.kind {
                *did_castle = true;
            }
            if let Some(rook) = rook {
                self.put(rook.moved_to(Position::new(row, rook_col)));
            }
            self.put(king);
            castling_rook = rook;
            MoveKind::Castling
        } else if figure.figure_type() == FigureType::Pawn {
            let kind = if mv.from.column() != mv.to.column() && target.is_none() {
                MoveKind::EnPassant
            } else if mv.to.row() == promotion_row(figure.color) {
                MoveKind::Promotion(mv.promotion.unwrap_or_else(|| choose(self, mv.from)))
            } else if mv.from.row().abs_diff(mv.to.row()) == 2 {
                MoveKind::DoubleStep
            } else {
                MoveKind::Plain
            };
            self.take(mv.from);
            captured = match kind {
                MoveKind::EnPassant => self.take(Position::new(mv.from.row(), mv.to.column())),
                _ => self.take(mv.to),
            };
            let moved = match kind {
                MoveKind::Promotion(p) => {
                    applied.promotion = Some(p);
                    let kind = match FigureType::from(p) {
                        FigureType::Rook => FigureKind::Rook { move_count: 1 },
                        t => FigureKind::new(t),
                    };
                    Figure::new(figure.color, mv.to, kind)
                }
                MoveKind::DoubleStep => {
                    self.en_passant = Some(mv.to);
                    Figure::new(
                        figure.color,
                        mv.to,
                        FigureKind::Pawn {
                            can_be_caught_en_passant: true,
                        },
                    )
                }
                _ => figure.moved_to(mv.to),
            };
            self.put(moved);
            kind
        } else {
            self.take(mv.from);
            captured = self.take(mv.to);
            self.put(figure.moved_to(mv.to));
            MoveKind::Plain
        };
        if !matches!(kind, MoveKind::Promotion(_)) {
            applied.promotion = None;
        }

        self.side = self.side.inv();
        self.attack_lines = OnceCell::new();
        self.history.push(ExtendedMove {
            mv: applied,
            kind,
            figure,
            captured,
            castling_rook,
            cleared_en_passant,
        });
        &self.history[self.history.len() - 1]
    }

    /// Reverts the latest move and returns `true` if it was a capture
    ///
    /// # Panics
    ///
    /// Panics if there are no moves to undo.
    pub fn undo(&mut self) -> bool {
        let Some(ext) = self.history.pop() else {
            panic!("no move to undo");
        };
        match ext.kind {
            MoveKind::Castling => {
                let row = base_row(ext.figure.color);
                let (king_col, rook_col) = castling_columns(ext.mv.to.column() > ext.mv.from.column());
                self.take(Position::new(row, king_col));
                self.take(Position::new(row, rook_col));
                if let Some(rook) = ext.castling_rook {
                    self.put(rook);
                }
            }
            _ => {
                self.take(ext.mv.to);
                if let Some(captured) = ext.captured {
                    self.put(captured);
                }
            }
        }
        self.put(ext.figure);
        self.en_passant = ext.cleared_en_passant;
        if let Some(pos) = ext.cleared_en_passant {
            self.set_en_passant_flag(pos, true);
        }
        self.side = self.side.inv();
        self.attack_lines = OnceCell::new();
        ext.captured.is_some()
    }
}

impl fmt::Display for Board {
    /// Writes the side to move followed by the descriptors of all figures
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.side)?;
        for fig in self.figures() {
            write!(f, " {}", fig)?;
        }
        Ok(())
    }
}

impl FromStr for Board {
    type Err = SetupError;

    fn from_str(s: &str) -> Result<Board, Self::Err> {
        let mut tokens = s.split_ascii_whitespace();
        let side = tokens.next().ok_or(SetupError::Empty)?;
        let side = Color::from_str(side)?;
        let figures = tokens
            .map(Figure::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        Board::from_figures(side, figures)
    }
}
