use super::{keeps_king_safe, Figure};
use crate::board::Board;
use crate::moves::Move;
use crate::square_set::SquareSet;
use crate::types::{Direction, FigureType, Position};

fn directions(t: FigureType) -> impl Iterator<Item = Direction> {
    Direction::ALL.into_iter().filter(move |&d| t.slides_along(d))
}

pub(super) fn reachable(t: FigureType, pos: Position) -> SquareSet {
    directions(t).flat_map(|d| pos.ray(d)).collect()
}

pub(super) fn is_reachable(fig: &Figure, target: Position, board: &Board) -> bool {
    let Some(dir) = fig.position.direction_to(target) else {
        return false;
    };
    if !fig.figure_type().slides_along(dir) {
        return false;
    }
    fig.position
        .ray(dir)
        .take_while(|&p| p != target)
        .all(|p| board.get(p).is_none())
}

pub(super) fn attacked(fig: &Figure, board: &Board) -> SquareSet {
    let mut res = SquareSet::EMPTY;
    for dir in directions(fig.figure_type()) {
        for p in fig.position.ray(dir) {
            res.set(p);
            if board.get(p).is_some() {
                break;
            }
        }
    }
    res
}

pub(super) fn legal_moves(fig: &Figure, board: &Board, out: &mut Vec<Move>) {
    let lines = board.attack_lines();
    if lines.is_double_check() {
        return;
    }
    if let Some(bound) = lines.bound_line(fig.position) {
        // Both sequences lie on the line of the pin, so probing the first square is enough
        // to know whether the figure moves along it
        for seq in [&bound.possible_moves_to_king, &bound.possible_moves_to_attacker] {
            let Some(dir) = seq.first().and_then(|&p| fig.position.direction_to(p)) else {
                continue;
            };
            if !fig.figure_type().slides_along(dir) {
                continue;
            }
            for &to in seq {
                if keeps_king_safe(fig, to, board) {
                    out.push(Move::new(fig.position, to));
                }
            }
        }
        return;
    }
    for dir in directions(fig.figure_type()) {
        for to in fig.position.ray(dir) {
            let target = board.get(to);
            if target.map_or(true, |f| f.color != fig.color) && keeps_king_safe(fig, to, board) {
                out.push(Move::new(fig.position, to));
            }
            if target.is_some() {
                break;
            }
        }
    }
}
