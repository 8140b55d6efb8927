use crate::board::Board;
use crate::types::Color;

/// Compact snapshot of a position used to detect repetitions
///
/// Each square takes four bits: zero for an empty square, otherwise a code for the figure type
/// and color. Move counters and flags are not stored, so positions that differ only in them
/// are considered the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Memento {
    squares: [u64; 4],
    side: Color,
    figure_count: u8,
}

impl Memento {
    pub fn new(board: &Board) -> Memento {
        let mut squares = [0_u64; 4];
        let mut figure_count = 0;
        for fig in board.figures() {
            let code = 1 + fig.figure_type().index() as u64 + 6 * fig.color.index() as u64;
            let idx = fig.position.index();
            squares[idx / 16] |= code << ((idx % 16) * 4);
            figure_count += 1;
        }
        Memento {
            squares,
            side: board.side(),
            figure_count,
        }
    }

    #[inline]
    pub fn figure_count(&self) -> u8 {
        self.figure_count
    }

    #[inline]
    pub fn side(&self) -> Color {
        self.side
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::{Move, PromotionType};
    use crate::setup::StartConfig;
    use std::str::FromStr;

    #[test]
    fn test_memento() {
        let mut board = StartConfig::Classic.board().unwrap();
        let start = Memento::new(&board);
        assert_eq!(start.figure_count(), 32);
        assert_eq!(start.side(), Color::White);

        let queen = |_: &Board, _| PromotionType::Queen;
        for mv in ["g1-f3", "g8-f6", "f3-g1"] {
            board.apply_move(Move::from_str(mv).unwrap(), queen);
            assert_ne!(Memento::new(&board), start);
        }
        board.apply_move(Move::from_str("f6-g8").unwrap(), queen);
        assert_eq!(Memento::new(&board), start);
    }

    #[test]
    fn test_side_matters() {
        let white = Board::from_str("white King-white-e1 King-black-e8").unwrap();
        let black = Board::from_str("black King-white-e1 King-black-e8").unwrap();
        assert_ne!(Memento::new(&white), Memento::new(&black));
    }
}
