use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum PositionParseError {
    #[error("unexpected column char {0:?}")]
    UnexpectedColumnChar(char),
    #[error("unexpected row char {0:?}")]
    UnexpectedRowChar(char),
    #[error("invalid string length")]
    BadLength,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("unknown color {0:?}")]
    Unknown(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FigureTypeParseError {
    #[error("unknown figure type {0:?}")]
    Unknown(String),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Color {
    White = 0,
    Black = 1,
}

impl Color {
    pub const fn index(&self) -> usize {
        *self as u8 as usize
    }

    pub const fn inv(&self) -> Color {
        match *self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match *self {
            Color::White => "white",
            Color::Black => "black",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "white" => Ok(Color::White),
            "black" => Ok(Color::Black),
            _ => Err(ColorParseError::Unknown(s.to_string())),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum FigureType {
    Pawn = 0,
    Knight = 1,
    Bishop = 2,
    Rook = 3,
    Queen = 4,
    King = 5,
}

impl FigureType {
    pub const COUNT: usize = 6;

    pub const ALL: [FigureType; Self::COUNT] = [
        FigureType::Pawn,
        FigureType::Knight,
        FigureType::Bishop,
        FigureType::Rook,
        FigureType::Queen,
        FigureType::King,
    ];

    pub const fn index(&self) -> usize {
        *self as u8 as usize
    }

    pub const fn name(&self) -> &'static str {
        match *self {
            FigureType::Pawn => "Pawn",
            FigureType::Knight => "Knight",
            FigureType::Bishop => "Bishop",
            FigureType::Rook => "Rook",
            FigureType::Queen => "Queen",
            FigureType::King => "King",
        }
    }

    /// Returns `true` if a figure of this type can attack along `dir` over any distance
    pub const fn slides_along(&self, dir: Direction) -> bool {
        match *self {
            FigureType::Queen => true,
            FigureType::Rook => dir.is_straight(),
            FigureType::Bishop => dir.is_diagonal(),
            _ => false,
        }
    }
}

impl fmt::Display for FigureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.name())
    }
}

impl FromStr for FigureType {
    type Err = FigureTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FigureType::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| FigureTypeParseError::Unknown(s.to_string()))
    }
}

/// One of the eight directions a king can step into
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    UpRight,
    Right,
    DownRight,
    Down,
    DownLeft,
    Left,
    UpLeft,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::Up,
        Direction::UpRight,
        Direction::Right,
        Direction::DownRight,
        Direction::Down,
        Direction::DownLeft,
        Direction::Left,
        Direction::UpLeft,
    ];

    /// Returns `(row delta, column delta)`
    pub const fn delta(&self) -> (i8, i8) {
        match *self {
            Direction::Up => (1, 0),
            Direction::UpRight => (1, 1),
            Direction::Right => (0, 1),
            Direction::DownRight => (-1, 1),
            Direction::Down => (-1, 0),
            Direction::DownLeft => (-1, -1),
            Direction::Left => (0, -1),
            Direction::UpLeft => (1, -1),
        }
    }

    pub const fn is_straight(&self) -> bool {
        matches!(
            *self,
            Direction::Up | Direction::Right | Direction::Down | Direction::Left
        )
    }

    pub const fn is_diagonal(&self) -> bool {
        !self.is_straight()
    }

    pub const fn opposite(&self) -> Direction {
        match *self {
            Direction::Up => Direction::Down,
            Direction::UpRight => Direction::DownLeft,
            Direction::Right => Direction::Left,
            Direction::DownRight => Direction::UpLeft,
            Direction::Down => Direction::Up,
            Direction::DownLeft => Direction::UpRight,
            Direction::Left => Direction::Right,
            Direction::UpLeft => Direction::DownRight,
        }
    }

    fn from_delta(row: i8, column: i8) -> Option<Direction> {
        Direction::ALL
            .into_iter()
            .find(|d| d.delta() == (row.signum(), column.signum()))
    }
}

/// Square on the board
///
/// Row 0 is the first rank (White's base row), column 0 is the `a` file. The index of a position
/// is `row * 8 + column`, so `a1` has index 0 and `h8` has index 63.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position(u8);

impl Position {
    pub const fn new(row: u8, column: u8) -> Position {
        assert!(row < 8 && column < 8, "row and column must be between 0 and 7");
        Position((row << 3) | column)
    }

    pub const fn try_new(row: i8, column: i8) -> Option<Position> {
        if row < 0 || row >= 8 || column < 0 || column >= 8 {
            return None;
        }
        Some(Position(((row as u8) << 3) | column as u8))
    }

    pub const fn from_index(val: usize) -> Position {
        assert!(val < 64, "position index must be between 0 and 63");
        Position(val as u8)
    }

    pub const fn row(&self) -> u8 {
        self.0 >> 3
    }

    pub const fn column(&self) -> u8 {
        self.0 & 7
    }

    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    /// Mirrors the position vertically, i.e. `e2` becomes `e7`
    pub const fn flipped_row(self) -> Position {
        Position(self.0 ^ 56)
    }

    pub const fn is_light(&self) -> bool {
        (self.row() + self.column()) % 2 == 1
    }

    pub const fn shift(self, delta_row: i8, delta_column: i8) -> Option<Position> {
        Position::try_new(self.row() as i8 + delta_row, self.column() as i8 + delta_column)
    }

    pub const fn step(self, dir: Direction) -> Option<Position> {
        let (dr, dc) = dir.delta();
        self.shift(dr, dc)
    }

    /// Iterates over the squares from this position (exclusive) towards the edge of the board
    pub fn ray(self, dir: Direction) -> impl Iterator<Item = Position> {
        let mut cur = self;
        std::iter::from_fn(move || {
            cur = cur.step(dir)?;
            Some(cur)
        })
    }

    pub fn is_straight_to(&self, other: Position) -> bool {
        *self != other && (self.row() == other.row() || self.column() == other.column())
    }

    pub fn is_diagonal_to(&self, other: Position) -> bool {
        *self != other && self.row().abs_diff(other.row()) == self.column().abs_diff(other.column())
    }

    /// Returns the direction leading from this position to `other` if both lie on one straight
    /// or diagonal line
    pub fn direction_to(&self, other: Position) -> Option<Direction> {
        if !self.is_straight_to(other) && !self.is_diagonal_to(other) {
            return None;
        }
        Direction::from_delta(
            other.row() as i8 - self.row() as i8,
            other.column() as i8 - self.column() as i8,
        )
    }

    pub fn iter() -> impl Iterator<Item = Self> {
        (0_u8..64_u8).map(Position)
    }

    pub fn column_char(&self) -> char {
        (b'a' + self.column()) as char
    }

    pub fn row_char(&self) -> char {
        (b'1' + self.row()) as char
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        if self.0 < 64 {
            return write!(f, "Position({})", self);
        }
        write!(f, "Position(?{:?})", self.0)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}{}", self.column_char(), self.row_char())
    }
}

impl FromStr for Position {
    type Err = PositionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 2 || !s.is_ascii() {
            return Err(PositionParseError::BadLength);
        }
        let bytes = s.as_bytes();
        let (column_ch, row_ch) = (bytes[0] as char, bytes[1] as char);
        let column = match column_ch {
            'a'..='h' => bytes[0] - b'a',
            _ => return Err(PositionParseError::UnexpectedColumnChar(column_ch)),
        };
        let row = match row_ch {
            '1'..='8' => bytes[1] - b'1',
            _ => return Err(PositionParseError::UnexpectedRowChar(row_ch)),
        };
        Ok(Position::new(row, column))
    }
}
