use super::{keeps_king_safe, Figure};
use crate::board::Board;
use crate::geometry::KNIGHT_OFFSETS;
use crate::moves::Move;
use crate::square_set::SquareSet;
use crate::types::Position;

pub(super) fn reachable(pos: Position) -> SquareSet {
    KNIGHT_OFFSETS
        .iter()
        .filter_map(|&(dr, dc)| pos.shift(dr, dc))
        .collect()
}

pub(super) fn legal_moves(fig: &Figure, board: &Board, out: &mut Vec<Move>) {
    // A pinned knight always leaves the line of the pin
    if board.attack_lines().bound_line(fig.position).is_some() {
        return;
    }
    for to in reachable(fig.position) {
        if board.get(to).map_or(true, |f| f.color != fig.color) && keeps_king_safe(fig, to, board) {
            out.push(Move::new(fig.position, to));
        }
    }
}
