use crate::types::Color;

/// Row with the king and the rooks at the start of the game
pub const fn base_row(c: Color) -> u8 {
    match c {
        Color::White => 0,
        Color::Black => 7,
    }
}

pub const fn pawn_start_row(c: Color) -> u8 {
    match c {
        Color::White => 1,
        Color::Black => 6,
    }
}

/// Row a pawn of color `c` promotes on
pub const fn promotion_row(c: Color) -> u8 {
    base_row(c.inv())
}

/// Row of an enemy pawn that can be caught en passant by a pawn of color `c`
pub const fn en_passant_row(c: Color) -> u8 {
    match c {
        Color::White => 4,
        Color::Black => 3,
    }
}

pub const fn pawn_row_delta(c: Color) -> i8 {
    match c {
        Color::White => 1,
        Color::Black => -1,
    }
}

pub const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

/// Columns the king and the rook land on when castling towards column `a` (long) or `h` (short)
pub const fn castling_columns(short: bool) -> (u8, u8) {
    if short {
        (6, 5)
    } else {
        (2, 3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows() {
        for c in [Color::White, Color::Black] {
            let start = pawn_start_row(c) as i8;
            assert_eq!(start - pawn_row_delta(c), base_row(c) as i8);
            assert_eq!(start + 5 * pawn_row_delta(c), promotion_row(c) as i8);
            assert_eq!(start + 3 * pawn_row_delta(c), en_passant_row(c) as i8);
        }
    }
}
