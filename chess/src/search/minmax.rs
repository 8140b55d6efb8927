use super::best_response::ResponseTable;
use super::cancel::CancelToken;
use super::prune::{PlyInfo, PrunePolicy, SearchWidth};
use super::SearchError;
use crate::board::Board;
use crate::eval::{figure_value, Evaluation, StaticEval};
use crate::game::{ChessGame, EndOfGame};
use crate::moves::Move;
use crate::types::Color;

use std::cmp::Reverse;

/// Alpha-beta evaluator of root moves
///
/// One instance belongs to one worker: it keeps the move ordering hints collected at every depth
/// across the root moves it evaluates.
pub struct MinMaxEval<'a> {
    policy: &'a dyn PrunePolicy,
    eval: &'a dyn StaticEval,
    good_enough_radius: i32,
    cancel: CancelToken,
    responses: ResponseTable,
    nodes: u64,
}

/// Maps a finished game to the value for the side which made the root move
///
/// `ply` is the number of moves made since the root, the root move included.
fn terminal_value(end: EndOfGame, ply: u8) -> Option<Evaluation> {
    let ply = ply as u32;
    match end {
        EndOfGame::Ongoing => None,
        EndOfGame::Checkmate if ply % 2 == 1 => Some(Evaluation::CheckmateOther((ply + 1) / 2)),
        EndOfGame::Checkmate => Some(Evaluation::CheckmateSelf(ply / 2)),
        EndOfGame::Stalemate => Some(Evaluation::Stalemate),
        EndOfGame::ThreeFoldRepetition => Some(Evaluation::ThreeFoldRepetition),
        EndOfGame::InsufficientMaterial | EndOfGame::FiftyMoves => Some(Evaluation::Draw),
    }
}

/// Puts the hinted moves first, then captures of the most valuable figures
fn order_moves(board: &Board, moves: &mut [Move], hints: &[Move]) {
    moves.sort_by_cached_key(|mv| {
        let hint = hints
            .iter()
            .position(|h| h.from == mv.from && h.to == mv.to)
            .unwrap_or(usize::MAX);
        let victim = board
            .get(mv.to)
            .filter(|f| f.color != board.side())
            .map_or(0, |f| figure_value(f.figure_type()));
        (hint, Reverse(victim))
    });
}

impl<'a> MinMaxEval<'a> {
    pub fn new(
        policy: &'a dyn PrunePolicy,
        eval: &'a dyn StaticEval,
        good_enough_radius: i32,
        cancel: CancelToken,
    ) -> MinMaxEval<'a> {
        MinMaxEval {
            policy,
            eval,
            good_enough_radius,
            cancel,
            responses: ResponseTable::new(),
            nodes: 0,
        }
    }

    /// Number of positions visited so far
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Evaluates `mv` for the side to move in `game`
    ///
    /// `current_max` is the best value among the root moves evaluated so far. Once it's clear
    /// that `mv` cannot beat it, the search stops and returns an upper bound of the real value.
    /// `root_hints` are the replies to try first. Returns the best reply of the opponent, if
    /// any, and the value of the move. The game is left unchanged.
    pub fn evaluate_move(
        &mut self,
        game: &mut ChessGame,
        mv: Move,
        current_max: Option<Evaluation>,
        root_hints: &[Move],
    ) -> Result<(Option<Move>, Evaluation), SearchError> {
        self.cancel.check()?;
        let root = game.side();
        game.with_move(mv, |game, end| {
            self.node(game, end, root, 1, current_max, None, root_hints)
        })
    }

    fn static_value(&self, board: &Board, root: Color) -> Evaluation {
        Evaluation::Ongoing(self.eval.evaluate(board, root))
    }

    /// Searches the position after `ply` moves. Maximizes if `root` is to move, minimizes
    /// otherwise
    #[allow(clippy::too_many_arguments)]
    fn node(
        &mut self,
        game: &mut ChessGame,
        end: EndOfGame,
        root: Color,
        ply: u8,
        alpha: Option<Evaluation>,
        beta: Option<Evaluation>,
        hints: &[Move],
    ) -> Result<(Option<Move>, Evaluation), SearchError> {
        self.nodes += 1;
        if let Some(value) = terminal_value(end, ply) {
            return Ok((None, value));
        }
        self.cancel.check()?;

        let board = game.board();
        let (last_capture, last_irreversible) = board
            .last_move()
            .map_or((false, false), |m| (m.is_capture(), m.is_irreversible()));
        let info = PlyInfo {
            depth: ply,
            in_check: board.is_check(),
            gave_check: game.own_previous_move_gave_check(),
            last_capture,
            last_irreversible,
        };
        let width = self.policy.width(&info);
        if width == SearchWidth::Stop {
            return Ok((None, self.static_value(board, root)));
        }

        let maximize = game.side() == root;
        let mut best = None;
        if width == SearchWidth::Critical && !info.in_check {
            best = Some(self.static_value(board, root));
        }
        let mut moves = match width {
            SearchWidth::Critical => game.critical_moves(),
            _ => game.legal_moves(),
        };
        let table_hints;
        let hints: &[Move] = if hints.is_empty() {
            table_hints = self.responses.sorted(ply as usize);
            &table_hints
        } else {
            hints
        };
        order_moves(game.board(), &mut moves, hints);

        // With only one ply searched after the root move, any reply that keeps the root move
        // within the radius of the best one is good enough to drop it
        let cut_below = match (ply, alpha) {
            (1, Some(a)) => Some(a.relaxed(self.good_enough_radius)),
            _ => alpha,
        };

        let mut best_move = None;
        for mv in moves {
            if let (Some(b), Some(cut)) = (best, if maximize { beta } else { cut_below }) {
                let is_cut = if maximize { b >= cut } else { b <= cut };
                if is_cut {
                    break;
                }
            }
            let (child_alpha, child_beta) = if maximize {
                (alpha.max(best), beta)
            } else {
                (alpha, match (beta, best) {
                    (Some(b), Some(v)) => Some(b.min(v)),
                    (b, v) => b.or(v),
                })
            };
            let (_, value) = game.with_move(mv, |game, end| {
                self.node(game, end, root, ply + 1, child_alpha, child_beta, &[])
            })?;
            let improves = best.map_or(true, |b| if maximize { value > b } else { value < b });
            if improves {
                best = Some(value);
                best_move = Some(mv);
            }
        }

        if let Some(mv) = best_move {
            self.responses.add(ply as usize, mv);
        }
        let value = match best {
            Some(v) => v,
            None => self.static_value(game.board(), root),
        };
        Ok((best_move, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::{MaterialEval, Score};
    use crate::search::prune::PruneConfig;
    use crate::setup::StartConfig;
    use std::str::FromStr;

    fn mv(s: &str) -> Move {
        Move::from_str(s).unwrap()
    }

    fn evaluate(
        game: &mut ChessGame,
        m: &str,
        prune: PruneConfig,
    ) -> (Option<Move>, Evaluation) {
        let mut search = MinMaxEval::new(&prune, &MaterialEval, 0, CancelToken::new());
        let before = game.to_string();
        let res = search.evaluate_move(game, mv(m), None, &[]).unwrap();
        assert_eq!(game.to_string(), before);
        assert!(search.nodes() > 0);
        res
    }

    #[test]
    fn test_terminal_value() {
        assert_eq!(
            terminal_value(EndOfGame::Checkmate, 1),
            Some(Evaluation::CheckmateOther(1))
        );
        assert_eq!(
            terminal_value(EndOfGame::Checkmate, 2),
            Some(Evaluation::CheckmateSelf(1))
        );
        assert_eq!(
            terminal_value(EndOfGame::Checkmate, 5),
            Some(Evaluation::CheckmateOther(3))
        );
        assert_eq!(
            terminal_value(EndOfGame::FiftyMoves, 3),
            Some(Evaluation::Draw)
        );
        assert_eq!(terminal_value(EndOfGame::Ongoing, 3), None);
    }

    #[test]
    fn test_mate_in_one() {
        let mut game = ChessGame::from_str(
            "white 0 King-white-g1-2 Rook-white-a1-1 King-black-g8-2 Pawn-black-f7-false \
             Pawn-black-g7-false Pawn-black-h7-false",
        )
        .unwrap();
        let (reply, value) = evaluate(&mut game, "a1-a8", PruneConfig::default());
        assert_eq!(reply, None);
        assert_eq!(value, Evaluation::CheckmateOther(1));
    }

    #[test]
    fn test_stalemate_in_one() {
        let mut game = ChessGame::from_str("white 0 King-white-f7-2 Queen-white-d3 King-black-h8-2")
            .unwrap();
        let (_, value) = evaluate(&mut game, "d3-g6", PruneConfig::default());
        assert_eq!(value, Evaluation::Stalemate);
    }

    #[test]
    fn test_shallow_search_after_check() {
        let mut game = ChessGame::from_str(
            "black 0 King-white-g1-2 Pawn-white-f2-false Pawn-white-a2-false Bishop-black-e3 \
             King-black-g8-2",
        )
        .unwrap();
        let (reply, value) = evaluate(&mut game, "e3-f2", PruneConfig::new(1, 1, 1, 1));
        assert!(matches!(value, Evaluation::Ongoing(_)));
        assert_eq!(reply, None);

        let (reply, value) = evaluate(&mut game, "e3-f2", PruneConfig::new(2, 3, 3, 3));
        assert_eq!(reply, Some(mv("g1-f2")));
        // Bishop and pawn against two pawns turns into a lone pawn
        assert_eq!(value.score().map(|s| s.primary), Some(-100));
    }

    #[test]
    fn test_opponent_mates() {
        // Moving the rook off the file allows a back rank mate
        let mut game = ChessGame::from_str(
            "white 0 King-white-g1-2 Rook-white-e2-1 Pawn-white-f2-false Pawn-white-g2-false \
             Pawn-white-h2-false Rook-black-e8-1 King-black-a8-2",
        )
        .unwrap();
        let (reply, value) = evaluate(&mut game, "e2-a2", PruneConfig::new(2, 2, 2, 2));
        assert_eq!(value, Evaluation::CheckmateSelf(1));
        assert_eq!(reply, Some(mv("e8-e1")));
    }

    #[test]
    fn test_cut_by_current_max() {
        let mut game = ChessGame::from_str(
            "white 0 King-white-a1-2 Knight-white-c3 King-black-h8-2 Rook-black-d5-1",
        )
        .unwrap();
        let prune = PruneConfig::new(2, 2, 2, 2);
        let mut search = MinMaxEval::new(&prune, &MaterialEval, 0, CancelToken::new());
        let (_, capture) = search.evaluate_move(&mut game, mv("c3-d5"), None, &[]).unwrap();
        assert_eq!(capture.score().map(|s| s.primary), Some(300));
        let (_, full) = search.evaluate_move(&mut game, mv("a1-b1"), None, &[]).unwrap();
        let (_, bounded) = search
            .evaluate_move(&mut game, mv("a1-b1"), Some(capture), &[])
            .unwrap();
        assert!(full < capture);
        assert!(bounded <= capture);
        assert!(bounded >= full);
    }

    #[test]
    fn test_good_enough_radius() {
        let mut game = ChessGame::from_str(
            "white 0 King-white-a1-2 Knight-white-b1 Pawn-white-e5-false King-black-h8-2 \
             Rook-black-d5-1",
        )
        .unwrap();
        let prune = PruneConfig::new(2, 2, 2, 2);
        let current_max = Some(Evaluation::Ongoing(Score::new(-150, 0)));
        let hints = [mv("h8-g8")];

        // Exact search finds the capture of the pawn
        let mut exact = MinMaxEval::new(&prune, &MaterialEval, 0, CancelToken::new());
        let (reply, value) = exact
            .evaluate_move(&mut game, mv("b1-a3"), current_max, &hints)
            .unwrap();
        assert_eq!(reply, Some(mv("d5-e5")));
        assert_eq!(value.score().map(|s| s.primary), Some(-200));

        // The first reply is already close enough to the best move
        let mut relaxed = MinMaxEval::new(&prune, &MaterialEval, 100, CancelToken::new());
        let (reply, value) = relaxed
            .evaluate_move(&mut game, mv("b1-a3"), current_max, &hints)
            .unwrap();
        assert_eq!(reply, Some(mv("h8-g8")));
        assert_eq!(value.score().map(|s| s.primary), Some(-100));
        assert!(relaxed.nodes() < exact.nodes());
    }

    #[test]
    fn test_mirrored_position() {
        let mut game = ChessGame::from_str(
            "white 0 King-white-g1-2 Knight-white-c3 Pawn-white-e4-false Pawn-white-f2-false \
             King-black-g8-2 Rook-black-d5-1 Pawn-black-f7-false",
        )
        .unwrap();
        let figures = game
            .board()
            .figures()
            .map(|f| {
                let mut f = *f;
                f.color = f.color.inv();
                f.position = f.position.flipped_row();
                f
            })
            .collect();
        let mut mirror = ChessGame::new(&StartConfig::Manual {
            side: Color::Black,
            hits: 0,
            figures,
        })
        .unwrap();
        for m in ["c3-d5", "e4-d5", "g1-h1", "c3-b5"] {
            let m = mv(m);
            let flipped = Move::new(m.from.flipped_row(), m.to.flipped_row());
            let (_, value) = evaluate(&mut game, &m.to_string(), PruneConfig::default());
            let (_, mirrored) = evaluate(&mut mirror, &flipped.to_string(), PruneConfig::default());
            assert_eq!(value, mirrored, "{}", m);
        }
    }

    #[test]
    fn test_cancelled() {
        let mut game = ChessGame::from_str("white 0 King-white-e1-1 King-black-e8-1 Pawn-white-e2")
            .unwrap();
        let prune = PruneConfig::default();
        let cancel = CancelToken::new();
        cancel.cancel();
        let mut search = MinMaxEval::new(&prune, &MaterialEval, 0, cancel);
        let res = search.evaluate_move(&mut game, mv("e2-e4"), None, &[]);
        assert!(matches!(res, Err(SearchError::Cancelled)));
        assert_eq!(
            game.to_string(),
            "white 0 King-white-e1-1-false Pawn-white-e2-false King-black-e8-1-false"
        );
    }

    #[test]
    fn test_stop_width_is_static() {
        let mut game = ChessGame::from_str(
            "white 0 King-white-e1-1 Queen-white-d1 King-black-e8-1 Rook-black-a8-1",
        )
        .unwrap();
        let prune = PruneConfig::new(0, 0, 0, 0);
        let mut search = MinMaxEval::new(&prune, &MaterialEval, 0, CancelToken::new());
        let (reply, value) = search.evaluate_move(&mut game, mv("d1-d2"), None, &[]).unwrap();
        assert_eq!(reply, None);
        let expected = game.with_move(mv("d1-d2"), |g, _| MaterialEval.evaluate(g.board(), Color::White));
        assert_eq!(value, Evaluation::Ongoing(expected));
        assert_eq!(value.score().map(|s: Score| s.primary), Some(400));
    }
}
