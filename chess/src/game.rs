use crate::board::Board;
use crate::memento::Memento;
use crate::moves::{Move, PromotionType};
use crate::setup::{SetupError, StartConfig};
use crate::square_set::SquareSet;
use crate::types::{Color, FigureType, Position};

use std::collections::VecDeque;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::str::FromStr;

/// Number of moves without a capture after which the game is drawn
pub const FIFTY_MOVES_HITS: u16 = 100;

/// State of the game after a move
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum EndOfGame {
    Ongoing,
    /// The side to move is checkmated
    Checkmate,
    /// The side to move has no legal moves, but is not in check
    Stalemate,
    InsufficientMaterial,
    ThreeFoldRepetition,
    FiftyMoves,
}

impl EndOfGame {
    #[inline]
    pub fn is_over(&self) -> bool {
        *self != EndOfGame::Ongoing
    }

    #[inline]
    pub fn is_draw(&self) -> bool {
        !matches!(*self, EndOfGame::Ongoing | EndOfGame::Checkmate)
    }

    pub fn as_str(&self) -> &'static str {
        match *self {
            EndOfGame::Ongoing => "game is in progress",
            EndOfGame::Checkmate => "checkmate",
            EndOfGame::Stalemate => "stalemate",
            EndOfGame::InsufficientMaterial => "draw by insufficient material",
            EndOfGame::ThreeFoldRepetition => "draw by threefold repetition",
            EndOfGame::FiftyMoves => "draw by fifty move rule",
        }
    }
}

impl fmt::Display for EndOfGame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.as_str())
    }
}

/// Party which is consulted while the game is played
pub trait ChessGameSupervisor {
    /// Picks the figure a pawn on `pawn` turns into. Queen by default
    fn choose_promotion(&mut self, _board: &Board, _pawn: Position) -> PromotionType {
        PromotionType::Queen
    }
}

/// Supervisor which always promotes to a queen
#[derive(Debug, Default, Copy, Clone)]
pub struct DefaultSupervisor;

impl ChessGameSupervisor for DefaultSupervisor {}

/// Number of moves made by each side
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct MoveCounter {
    pub white: usize,
    pub black: usize,
}

impl MoveCounter {
    pub fn get(&self, c: Color) -> usize {
        match c {
            Color::White => self.white,
            Color::Black => self.black,
        }
    }
}

/// Returns `true` if neither side can ever checkmate
///
/// This is the case with kings only, with a single knight or bishop against a lone king, and
/// with any number of bishops all standing on squares of one color.
pub fn is_insufficient_material(board: &Board) -> bool {
    let mut bishops = SquareSet::EMPTY;
    let mut knights = 0;
    for fig in board.figures() {
        match fig.figure_type() {
            FigureType::King => {}
            FigureType::Bishop => bishops.set(fig.position),
            FigureType::Knight => knights += 1,
            _ => return false,
        }
    }
    match (knights, bishops.len()) {
        (0, 0) | (1, 0) | (0, 1) => true,
        (0, _) => (bishops & SquareSet::LIGHT).is_empty() || (bishops & SquareSet::DARK).is_empty(),
        _ => false,
    }
}

/// Game session
///
/// Wraps the board and tracks what is needed to decide whether the game is over: the
/// number of moves since the last capture, the history of positions and which moves gave check.
#[derive(Debug, Clone)]
pub struct ChessGame {
    board: Board,
    hits: u16,
    hit_history: Vec<u16>,
    mementos: VecDeque<Memento>,
    checks: Vec<bool>,
}

impl ChessGame {
    pub fn new(config: &StartConfig) -> Result<ChessGame, SetupError> {
        let (board, hits) = config.build()?;
        let mut mementos = VecDeque::new();
        mementos.push_back(Memento::new(&board));
        Ok(ChessGame {
            board,
            hits,
            hit_history: Vec::new(),
            mementos,
            checks: Vec::new(),
        })
    }

    /// Starts a game and replays the given moves
    pub fn from_moves(
        config: &StartConfig,
        moves: impl IntoIterator<Item = Move>,
    ) -> Result<ChessGame, SetupError> {
        let mut game = ChessGame::new(config)?;
        for mv in moves {
            if !game.is_legal(mv) {
                return Err(SetupError::IllegalMove(mv.to_string()));
            }
            game.push(mv, &mut DefaultSupervisor);
        }
        Ok(game)
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn side(&self) -> Color {
        self.board.side()
    }

    /// Moves made since the last capture, counted in plies
    #[inline]
    pub fn hits(&self) -> u16 {
        self.hits
    }

    /// For every applied move, whether it gave check
    #[inline]
    pub fn check_flags(&self) -> &[bool] {
        &self.checks
    }

    /// Returns `true` if the previous move of the side to move gave check
    pub fn own_previous_move_gave_check(&self) -> bool {
        self.checks.len() >= 2 && self.checks[self.checks.len() - 2]
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        self.board.legal_moves()
    }

    pub fn critical_moves(&mut self) -> Vec<Move> {
        self.board.critical_moves()
    }

    /// Checks whether the move is legal. The promotion target is not taken into account
    pub fn is_legal(&self, mv: Move) -> bool {
        self.is_movable(mv.from, mv.to)
    }

    /// Returns `true` if there is a figure of the side to move on `pos` that can move
    pub fn is_selectable(&self, pos: Position) -> bool {
        self.board
            .get(pos)
            .map_or(false, |f| f.is_selectable(&self.board))
    }

    pub fn is_movable(&self, from: Position, to: Position) -> bool {
        let Some(fig) = self.board.get(from) else {
            return false;
        };
        let mut moves = Vec::new();
        fig.legal_moves(&self.board, &mut moves);
        moves.iter().any(|m| m.to == to)
    }

    /// Classifies the current position
    pub fn state(&self) -> EndOfGame {
        if !self.board.has_legal_moves() {
            if self.board.is_check() {
                return EndOfGame::Checkmate;
            }
            return EndOfGame::Stalemate;
        }
        if is_insufficient_material(&self.board) {
            return EndOfGame::InsufficientMaterial;
        }
        if self.hits >= FIFTY_MOVES_HITS {
            return EndOfGame::FiftyMoves;
        }
        if self.is_threefold_repetition() {
            return EndOfGame::ThreeFoldRepetition;
        }
        EndOfGame::Ongoing
    }

    fn is_threefold_repetition(&self) -> bool {
        let Some(last) = self.mementos.back() else {
            return false;
        };
        let mut count = 1;
        // Only positions with the same side to move can be equal
        for m in self.mementos.iter().rev().skip(2).step_by(2) {
            if m.figure_count() != last.figure_count() {
                break;
            }
            if m == last {
                count += 1;
                if count >= 3 {
                    return true;
                }
            }
        }
        false
    }

    fn push(&mut self, mv: Move, supervisor: &mut dyn ChessGameSupervisor) -> EndOfGame {
        let ext = self
            .board
            .apply_move(mv, |b, p| supervisor.choose_promotion(b, p));
        let captured = ext.is_capture();
        self.hit_history.push(self.hits);
        self.hits = if captured { 0 } else { self.hits.saturating_add(1) };
        self.mementos.push_back(Memento::new(&self.board));
        self.checks.push(self.board.is_check());
        self.state()
    }

    /// Makes a move and returns the state of the game after it
    ///
    /// # Panics
    ///
    /// Panics if the move is not legal.
    pub fn make_move(&mut self, mv: Move) -> EndOfGame {
        self.make_move_with(mv, &mut DefaultSupervisor)
    }

    /// Same as [`ChessGame::make_move`], but asks `supervisor` for the promotion target
    pub fn make_move_with(
        &mut self,
        mv: Move,
        supervisor: &mut dyn ChessGameSupervisor,
    ) -> EndOfGame {
        assert!(self.is_legal(mv), "illegal move {}", mv);
        self.push(mv, supervisor)
    }

    /// Reverts the latest move and returns `true` if it was a capture
    ///
    /// # Panics
    ///
    /// Panics if no moves were made.
    pub fn undo(&mut self) -> bool {
        let captured = self.board.undo();
        self.hits = self.hit_history.pop().unwrap_or(0);
        self.mementos.pop_back();
        self.checks.pop();
        captured
    }

    /// Applies a legal move and returns a guard which undoes it when dropped
    pub fn play(&mut self, mv: Move) -> MoveGuard<'_> {
        debug_assert!(self.is_legal(mv), "illegal move {}", mv);
        let end_of_game = self.push(mv, &mut DefaultSupervisor);
        MoveGuard {
            game: self,
            end_of_game,
        }
    }

    /// Applies a legal move, runs `body` and reverts the move
    ///
    /// The move is reverted even if `body` panics.
    pub fn with_move<R>(&mut self, mv: Move, body: impl FnOnce(&mut ChessGame, EndOfGame) -> R) -> R {
        let mut guard = self.play(mv);
        let end_of_game = guard.end_of_game();
        body(&mut guard, end_of_game)
    }

    /// Texts of all the moves made, separated by spaces
    pub fn complete_history(&self) -> String {
        let moves: Vec<String> = self
            .board
            .history()
            .iter()
            .map(|ext| ext.mv.to_string())
            .collect();
        moves.join(" ")
    }

    /// Independent copies of the game
    pub fn copy_game(&self, n: usize) -> Vec<ChessGame> {
        (0..n).map(|_| self.clone()).collect()
    }

    pub fn move_counter(&self) -> MoveCounter {
        let mut res = MoveCounter::default();
        for ext in self.board.history() {
            match ext.figure.color {
                Color::White => res.white += 1,
                Color::Black => res.black += 1,
            }
        }
        res
    }
}

impl fmt::Display for ChessGame {
    /// Writes the side to move, the hit counter and the figures
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{} {}", self.board.side(), self.hits)?;
        for fig in self.board.figures() {
            write!(f, " {}", fig)?;
        }
        Ok(())
    }
}

impl FromStr for ChessGame {
    type Err = SetupError;

    fn from_str(s: &str) -> Result<ChessGame, Self::Err> {
        ChessGame::new(&StartConfig::from_str(s)?)
    }
}

/// Applied move which is undone when the guard is dropped
pub struct MoveGuard<'a> {
    game: &'a mut ChessGame,
    end_of_game: EndOfGame,
}

impl MoveGuard<'_> {
    #[inline]
    pub fn end_of_game(&self) -> EndOfGame {
        self.end_of_game
    }
}

impl Deref for MoveGuard<'_> {
    type Target = ChessGame;

    fn deref(&self) -> &ChessGame {
        self.game
    }
}

impl DerefMut for MoveGuard<'_> {
    fn deref_mut(&mut self) -> &mut ChessGame {
        self.game
    }
}

impl Drop for MoveGuard<'_> {
    fn drop(&mut self) {
        self.game.undo();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{self, AssertUnwindSafe};

    fn mv(s: &str) -> Move {
        Move::from_str(s).unwrap()
    }

    fn game(s: &str) -> ChessGame {
        ChessGame::from_str(s).unwrap()
    }

    #[test]
    fn test_checkmate() {
        let mut g = game(
            "white 0 King-white-g1-2 Rook-white-a1-1 King-black-g8-2 Pawn-black-f7-false \
             Pawn-black-g7-false Pawn-black-h7-false",
        );
        assert_eq!(g.state(), EndOfGame::Ongoing);
        assert_eq!(g.make_move(mv("a1-a8")), EndOfGame::Checkmate);
        assert_eq!(g.check_flags(), [true]);
    }

    #[test]
    fn test_stalemate() {
        let mut g = game("white 0 King-white-f7-2 Queen-white-d3 King-black-h8-2");
        assert_eq!(g.make_move(mv("d3-g6")), EndOfGame::Stalemate);
        assert!(g.state().is_draw());
    }

    #[test]
    fn test_threefold_repetition() {
        let mut g = ChessGame::new(&StartConfig::Classic).unwrap();
        let moves = ["g1-f3", "g8-f6", "f3-g1", "f6-g8"];
        for m in moves.iter().chain(moves[..3].iter()) {
            assert_eq!(g.make_move(mv(m)), EndOfGame::Ongoing);
        }
        assert_eq!(g.make_move(mv("f6-g8")), EndOfGame::ThreeFoldRepetition);
        g.undo();
        assert_eq!(g.state(), EndOfGame::Ongoing);
    }

    #[test]
    fn test_fifty_moves() {
        let mut g = game("white 99 King-white-e1-1 Rook-white-a1-1 King-black-e8-1 Knight-black-a5");
        assert_eq!(g.hits(), 99);
        assert_eq!(g.make_move(mv("e1-e2")), EndOfGame::FiftyMoves);
        assert_eq!(g.hits(), 100);
        g.undo();
        assert_eq!(g.hits(), 99);
        assert_eq!(g.make_move(mv("a1-a5")), EndOfGame::Ongoing);
        assert_eq!(g.hits(), 0);
    }

    #[test]
    fn test_insufficient_material() {
        let mut g = game("black 0 King-white-e1-1 Rook-white-d2-1 King-black-e8-1 Bishop-black-g5");
        assert_eq!(g.make_move(mv("g5-d2")), EndOfGame::InsufficientMaterial);

        let board = |s: &str| Board::from_str(s).unwrap();
        assert!(is_insufficient_material(&board("white King-white-e1 King-black-e8")));
        assert!(is_insufficient_material(&board(
            "white King-white-e1 Knight-white-b1 King-black-e8"
        )));
        assert!(is_insufficient_material(&board(
            "white King-white-e1 Bishop-white-c1 Bishop-black-f8 Bishop-black-b6 King-black-e8"
        )));
        assert!(!is_insufficient_material(&board(
            "white King-white-e1 Bishop-white-c1 Bishop-black-c8 King-black-e8"
        )));
        assert!(!is_insufficient_material(&board(
            "white King-white-e1 Knight-white-b1 Knight-white-g1 King-black-e8"
        )));
        assert!(!is_insufficient_material(&board(
            "white King-white-e1 Pawn-white-a2 King-black-e8"
        )));
    }

    #[test]
    fn test_dump() {
        let s = "black 7 King-white-g1-2-false Rook-white-a8-1 King-black-g8-2-false";
        assert_eq!(game(s).to_string(), s);
        let g = ChessGame::new(&StartConfig::Classic).unwrap();
        assert!(g.to_string().starts_with("white 0 Rook-white-a1-0 Knight-white-b1"));
    }

    #[test]
    fn test_queries() {
        let g = ChessGame::new(&StartConfig::Classic).unwrap();
        let pos = |s: &str| Position::from_str(s).unwrap();
        assert!(g.is_selectable(pos("g1")));
        assert!(!g.is_selectable(pos("a1")));
        assert!(!g.is_selectable(pos("g8")));
        assert!(!g.is_selectable(pos("e4")));
        assert!(g.is_movable(pos("e2"), pos("e4")));
        assert!(!g.is_movable(pos("e2"), pos("e5")));
        assert!(!g.is_movable(pos("e4"), pos("e5")));
        assert_eq!(g.legal_moves().len(), 20);
    }

    #[test]
    fn test_history_and_counter() {
        let mut g = game("white 0 King-white-e1-1 Pawn-white-b7-false King-black-h8-1");
        struct Rook;
        impl ChessGameSupervisor for Rook {
            fn choose_promotion(&mut self, _: &Board, _: Position) -> PromotionType {
                PromotionType::Rook
            }
        }
        g.make_move_with(mv("b7-b8"), &mut Rook);
        g.make_move(mv("h8-h7"));
        g.make_move(mv("e1-e2"));
        assert_eq!(g.complete_history(), "b7Rb8 h8-h7 e1-e2");
        assert_eq!(g.move_counter(), MoveCounter { white: 2, black: 1 });
        assert_eq!(g.move_counter().get(Color::Black), 1);

        let replayed = ChessGame::from_moves(
            &StartConfig::from_str("white 0 King-white-e1-1 Pawn-white-b7-false King-black-h8-1")
                .unwrap(),
            [mv("b7Rb8"), mv("h8-h7"), mv("e1-e2")],
        )
        .unwrap();
        assert_eq!(replayed.to_string(), g.to_string());
        assert_eq!(
            ChessGame::from_moves(&StartConfig::Classic, [mv("e2-e5")]).unwrap_err(),
            SetupError::IllegalMove("e2-e5".to_string())
        );
    }

    #[test]
    #[should_panic]
    fn test_illegal_move() {
        let mut g = ChessGame::new(&StartConfig::Classic).unwrap();
        g.make_move(mv("e1-e2"));
    }

    #[test]
    fn test_with_move() {
        let mut g = ChessGame::new(&StartConfig::Classic).unwrap();
        let before = g.to_string();
        let inner = g.with_move(mv("e2-e4"), |g, end| {
            assert_eq!(end, EndOfGame::Ongoing);
            assert_eq!(g.side(), Color::Black);
            g.with_move(mv("e7-e5"), |g, _| g.to_string())
        });
        assert!(inner.contains("Pawn-black-e5"));
        assert_eq!(g.to_string(), before);
        assert!(g.board().history().is_empty());

        let res = panic::catch_unwind(AssertUnwindSafe(|| {
            g.with_move(mv("d2-d4"), |_, _| panic!("body failed"))
        }));
        assert!(res.is_err());
        assert_eq!(g.to_string(), before);
        assert!(g.board().history().is_empty());
    }

    #[test]
    fn test_copy_game() {
        let mut g = ChessGame::new(&StartConfig::Chess960(100)).unwrap();
        g.make_move(g.legal_moves()[0]);
        let copies = g.copy_game(3);
        assert_eq!(copies.len(), 3);
        for c in &copies {
            assert_eq!(c.to_string(), g.to_string());
            assert_eq!(c.complete_history(), g.complete_history());
        }
    }
}
