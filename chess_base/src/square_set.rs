use crate::types::Position;
use derive_more::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not};
use std::fmt;
use std::iter::{FromIterator, IntoIterator};

/// Set of board squares packed into a 64-bit word, bit `i` standing for the position with index `i`
#[derive(
    Default,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    BitAnd,
    BitAndAssign,
    BitOr,
    BitOrAssign,
    BitXor,
    BitXorAssign,
    Not,
)]
pub struct SquareSet(u64);

impl SquareSet {
    pub const EMPTY: SquareSet = SquareSet(0);

    /// Squares that are light, `h1` being one of them
    pub const LIGHT: SquareSet = SquareSet(0x55aa_55aa_55aa_55aa);
    pub const DARK: SquareSet = SquareSet(!0x55aa_55aa_55aa_55aa);

    pub const fn from_position(pos: Position) -> SquareSet {
        SquareSet(1_u64 << pos.index())
    }

    pub const fn with(self, pos: Position) -> SquareSet {
        SquareSet(self.0 | (1_u64 << pos.index()))
    }

    pub fn set(&mut self, pos: Position) {
        *self = self.with(pos);
    }

    pub const fn has(&self, pos: Position) -> bool {
        ((self.0 >> pos.index()) & 1) != 0
    }

    pub const fn len(&self) -> u32 {
        self.0.count_ones()
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for SquareSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        f.debug_set().entries(*self).finish()
    }
}

impl fmt::Display for SquareSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        for row in (0..8).rev() {
            let bits = ((self.0 >> (row * 8)) & 0xff) as u8;
            write!(f, "{:08b}", bits.reverse_bits())?;
            if row != 0 {
                write!(f, "/")?;
            }
        }
        Ok(())
    }
}

pub struct Iter(u64);

impl Iterator for Iter {
    type Item = Position;

    fn next(&mut self) -> Option<Position> {
        if self.0 == 0 {
            return None;
        }
        let bit = self.0.trailing_zeros();
        self.0 &= self.0.wrapping_sub(1_u64);
        Some(Position::from_index(bit as usize))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.0.count_ones() as usize;
        (len, Some(len))
    }
}

impl IntoIterator for SquareSet {
    type Item = Position;
    type IntoIter = Iter;

    fn into_iter(self) -> Iter {
        Iter(self.0)
    }
}

impl FromIterator<Position> for SquareSet {
    fn from_iter<I: IntoIterator<Item = Position>>(iter: I) -> Self {
        iter.into_iter().fold(SquareSet::EMPTY, SquareSet::with)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn pos(s: &str) -> Position {
        Position::from_str(s).unwrap()
    }

    #[test]
    fn test_iter() {
        let set = SquareSet::EMPTY.with(pos("a4")).with(pos("e2")).with(pos("f3"));
        assert_eq!(
            set.into_iter().collect::<Vec<_>>(),
            vec![pos("e2"), pos("f3"), pos("a4")],
        );
        assert_eq!(set, [pos("f3"), pos("a4"), pos("e2")].into_iter().collect());
    }

    #[test]
    fn test_bitops() {
        let (a, b, c) = (pos("a4"), pos("e2"), pos("f3"));
        let s1 = SquareSet::EMPTY.with(a).with(b);
        let s2 = SquareSet::EMPTY.with(b).with(c);
        assert_eq!(s1 & s2, SquareSet::EMPTY.with(b));
        assert_eq!(s1 | s2, SquareSet::EMPTY.with(a).with(b).with(c));
        assert_eq!(s1 ^ s2, SquareSet::EMPTY.with(a).with(c));
        assert_eq!((!s1).len(), 62);
    }

    #[test]
    fn test_colors() {
        assert!(SquareSet::LIGHT.has(pos("h1")));
        assert!(SquareSet::DARK.has(pos("a1")));
        assert!(SquareSet::LIGHT.has(pos("d1")));
        assert!(SquareSet::DARK.has(pos("h8")));
        assert_eq!(SquareSet::LIGHT.len(), 32);
        for p in Position::iter() {
            assert_eq!(SquareSet::LIGHT.has(p), p.is_light());
        }
    }

    #[test]
    fn test_format() {
        let set = SquareSet::EMPTY
            .with(pos("a4"))
            .with(pos("e2"))
            .with(pos("f3"))
            .with(pos("h8"));
        assert_eq!(
            set.to_string(),
            "00000001/00000000/00000000/00000000/10000000/00000100/00001000/00000000"
        );
    }
}
