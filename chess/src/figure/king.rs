use super::Figure;
use crate::board::Board;
use crate::geometry::{base_row, castling_columns};
use crate::moves::Move;
use crate::square_set::SquareSet;
use crate::types::{Direction, FigureType, Position};

pub(super) fn reachable(pos: Position) -> SquareSet {
    Direction::ALL.iter().filter_map(|&d| pos.step(d)).collect()
}

pub(super) fn legal_moves(king: &Figure, board: &Board, out: &mut Vec<Move>) {
    let enemy = king.color.inv();
    let removed = SquareSet::from_position(king.position);
    for to in reachable(king.position) {
        if board.get(to).map_or(false, |f| f.color == king.color) {
            continue;
        }
        if !board.is_attacked_masked(to, enemy, removed, SquareSet::EMPTY) {
            out.push(Move::new(king.position, to));
        }
    }
    castling_moves(king, board, out);
}

/// Squares of the row between two columns, both ends included
fn span(row: u8, a: u8, b: u8) -> impl Iterator<Item = Position> {
    (a.min(b)..=a.max(b)).map(move |c| Position::new(row, c))
}

fn castling_moves(king: &Figure, board: &Board, out: &mut Vec<Move>) {
    let row = base_row(king.color);
    if !king.is_unmoved() || king.position.row() != row || board.attack_lines().is_check() {
        return;
    }
    let enemy = king.color.inv();
    let rooks = (0..8)
        .filter_map(|c| board.get(Position::new(row, c)))
        .filter(|f| f.is(king.color, FigureType::Rook) && f.is_unmoved());
    for rook in rooks {
        let short = rook.position.column() > king.position.column();
        let (king_col, rook_col) = castling_columns(short);
        let (king_from, rook_from) = (king.position.column(), rook.position.column());
        let is_free = span(row, king_from, king_col)
            .chain(span(row, rook_from, rook_col))
            .all(|p| p == king.position || p == rook.position || board.get(p).is_none());
        if !is_free {
            continue;
        }
        let removed = SquareSet::from_position(king.position).with(rook.position);
        let is_safe = span(row, king_from, king_col)
            .all(|p| !board.is_attacked_masked(p, enemy, removed, SquareSet::EMPTY));
        if is_safe {
            out.push(Move::new(king.position, rook.position));
        }
    }
}
