use super::{keeps_king_safe, Figure};
use crate::board::Board;
use crate::geometry::{en_passant_row, pawn_row_delta, pawn_start_row};
use crate::moves::Move;
use crate::square_set::SquareSet;
use crate::types::{Color, FigureType, Position};

pub(super) fn reachable_moves(color: Color, pos: Position) -> SquareSet {
    let delta = pawn_row_delta(color);
    let mut res = SquareSet::EMPTY;
    if let Some(p) = pos.shift(delta, 0) {
        res.set(p);
    }
    if pos.row() == pawn_start_row(color) {
        if let Some(p) = pos.shift(2 * delta, 0) {
            res.set(p);
        }
    }
    res
}

pub(super) fn reachable_captures(color: Color, pos: Position) -> SquareSet {
    let delta = pawn_row_delta(color);
    [-1, 1]
        .into_iter()
        .filter_map(|dc| pos.shift(delta, dc))
        .collect()
}

pub(super) fn is_reachable(pawn: &Figure, target: Position, board: &Board) -> bool {
    if reachable_captures(pawn.color, pawn.position).has(target) {
        return board.get(target).is_some();
    }
    if !reachable_moves(pawn.color, pawn.position).has(target) {
        return false;
    }
    let step = pawn_row_delta(pawn.color);
    let mut cur = pawn.position;
    while cur != target {
        cur = match cur.shift(step, 0) {
            Some(p) => p,
            None => return false,
        };
        if board.get(cur).is_some() {
            return false;
        }
    }
    true
}

/// Position of the enemy pawn that can be captured en passant by moving onto `to`
fn en_passant_victim(pawn: &Figure, to: Position, board: &Board) -> Option<Position> {
    if pawn.position.row() != en_passant_row(pawn.color) || board.get(to).is_some() {
        return None;
    }
    let victim = Position::new(pawn.position.row(), to.column());
    let fig = board.get(victim)?;
    (board.en_passant() == Some(victim)
        && fig.is(pawn.color.inv(), FigureType::Pawn)
        && fig.can_be_caught_en_passant())
    .then_some(victim)
}

pub(super) fn legal_moves(pawn: &Figure, board: &Board, out: &mut Vec<Move>) {
    let step = pawn_row_delta(pawn.color);
    let mut cur = pawn.position;
    let forward_len = if pawn.position.row() == pawn_start_row(pawn.color) {
        2
    } else {
        1
    };
    for _ in 0..forward_len {
        cur = match cur.shift(step, 0) {
            Some(p) if board.get(p).is_none() => p,
            _ => break,
        };
        if keeps_king_safe(pawn, cur, board) {
            out.push(Move::new(pawn.position, cur));
        }
    }

    for to in reachable_captures(pawn.color, pawn.position) {
        match board.get(to) {
            Some(f) if f.color != pawn.color => {
                if keeps_king_safe(pawn, to, board) {
                    out.push(Move::new(pawn.position, to));
                }
            }
            Some(_) => {}
            None => {
                let Some(victim) = en_passant_victim(pawn, to, board) else {
                    continue;
                };
                // Two figures leave their squares at once, so pins and checks are verified
                // against the resulting occupancy, including the horizontal discovery
                let removed = SquareSet::from_position(pawn.position).with(victim);
                let king = board.king(pawn.color);
                let added = SquareSet::from_position(to);
                if !board.is_attacked_masked(king, pawn.color.inv(), removed, added) {
                    out.push(Move::new(pawn.position, to));
                }
            }
        }
    }
}
