use std::fmt::{self, Display};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum SquareParseError {
    #[error("unexpected file char {0:?}")]
    UnexpectedFileChar(char),
    #[error("unexpected rank char {0:?}")]
    UnexpectedRankChar(char),
    #[error("invalid string length")]
    BadLength,
}

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("unexpected color char {0:?}")]
    UnexpectedChar(char),
    #[error("invalid string length")]
    BadLength,
}

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum BoardSizeError {
    #[error("board size {0} is not between {} and {}", BoardSize::MIN, BoardSize::MAX)]
    OutOfRange(u8),
}

/// Number of rows (and columns) of a square board
///
/// Boards are limited to 8x8, so every square fits into a [`SquareSet`](crate::square_set::SquareSet)
/// and every file has a letter between `a` and `h`.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct BoardSize(u8);

impl BoardSize {
    pub const MIN: u8 = 2;
    pub const MAX: u8 = 8;
    pub const STANDARD: BoardSize = BoardSize(8);

    pub const fn new(val: u8) -> Result<BoardSize, BoardSizeError> {
        if val < Self::MIN || val > Self::MAX {
            return Err(BoardSizeError::OutOfRange(val));
        }
        Ok(BoardSize(val))
    }

    pub const fn get(&self) -> u8 {
        self.0
    }

    pub const fn last(&self) -> i8 {
        self.0 as i8 - 1
    }

    pub const fn contains(&self, sq: Square) -> bool {
        sq.row >= 0 && sq.col >= 0 && sq.row < self.0 as i8 && sq.col < self.0 as i8
    }

    /// Iterates over all the squares of the board, row by row starting from `a1`
    pub fn squares(self) -> impl Iterator<Item = Square> {
        let n = self.0 as i8;
        (0..n).flat_map(move |row| (0..n).map(move |col| Square::new(row, col)))
    }
}

impl Default for BoardSize {
    fn default() -> BoardSize {
        BoardSize::STANDARD
    }
}

impl TryFrom<u8> for BoardSize {
    type Error = BoardSizeError;

    fn try_from(val: u8) -> Result<Self, Self::Error> {
        BoardSize::new(val)
    }
}

impl fmt::Debug for BoardSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "BoardSize({}x{})", self.0, self.0)
    }
}

impl Display for BoardSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}x{}", self.0, self.0)
    }
}

/// Square on the board, as a `(row, column)` pair
///
/// Row 0 is White's back rank and column 0 is the `a` file. A square can point outside the board
/// (for example, after [`Square::offset()`]); use [`BoardSize::contains()`] to check it.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Square {
    row: i8,
    col: i8,
}

impl Square {
    pub const fn new(row: i8, col: i8) -> Square {
        Square { row, col }
    }

    pub const fn row(&self) -> i8 {
        self.row
    }

    pub const fn col(&self) -> i8 {
        self.col
    }

    pub const fn offset(self, drow: i8, dcol: i8) -> Square {
        Square {
            row: self.row.wrapping_add(drow),
            col: self.col.wrapping_add(dcol),
        }
    }

    pub const fn is_valid(&self) -> bool {
        BoardSize::STANDARD.contains(*self)
    }

    pub const fn index(&self) -> usize {
        assert!(self.is_valid(), "square must lie within 8x8");
        (self.row as usize) * 8 + self.col as usize
    }

    pub const fn from_index(val: usize) -> Square {
        assert!(val < 64, "square index must be between 0 and 63");
        Square::new((val / 8) as i8, (val % 8) as i8)
    }

    pub fn file_char(&self) -> char {
        (b'a' + self.col as u8) as char
    }

    pub fn rank_char(&self) -> char {
        (b'1' + self.row as u8) as char
    }
}

impl fmt::Debug for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        if self.is_valid() {
            return write!(f, "Square({})", self);
        }
        write!(f, "Square(?{}, {})", self.row, self.col)
    }
}

impl Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        if !self.is_valid() {
            return write!(f, "({}, {})", self.row, self.col);
        }
        write!(f, "{}{}", self.file_char(), self.rank_char())
    }
}

impl FromStr for Square {
    type Err = SquareParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 2 {
            return Err(SquareParseError::BadLength);
        }
        let bytes = s.as_bytes();
        let col = match bytes[0] {
            b @ b'a'..=b'h' => (b - b'a') as i8,
            b => return Err(SquareParseError::UnexpectedFileChar(b as char)),
        };
        let row = match bytes[1] {
            b @ b'1'..=b'8' => (b - b'1') as i8,
            b => return Err(SquareParseError::UnexpectedRankChar(b as char)),
        };
        Ok(Square::new(row, col))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Color {
    White = 0,
    Black = 1,
}

impl Color {
    pub const fn inv(&self) -> Color {
        match *self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    pub fn as_char(&self) -> char {
        match *self {
            Color::White => 'w',
            Color::Black => 'b',
        }
    }

    pub fn from_char(c: char) -> Option<Color> {
        match c {
            'w' => Some(Color::White),
            'b' => Some(Color::Black),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match *self {
            Color::White => "White",
            Color::Black => "Black",
        }
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 1 {
            return Err(ColorParseError::BadLength);
        }
        let ch = s.as_bytes()[0] as char;
        Color::from_char(ch).ok_or(ColorParseError::UnexpectedChar(ch))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PieceKind {
    Pawn = 0,
    Rook = 1,
    Knight = 2,
    Bishop = 3,
    Queen = 4,
    King = 5,
}

impl PieceKind {
    pub const COUNT: usize = 6;

    pub const fn index(&self) -> usize {
        *self as u8 as usize
    }

    pub fn iter() -> impl Iterator<Item = Self> {
        [
            PieceKind::Pawn,
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
        ]
        .into_iter()
    }

    /// Upper-case letter of the piece (`P` for pawns)
    pub fn as_char(&self) -> char {
        b"PRNBQK"[self.index()] as char
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'P' => Some(PieceKind::Pawn),
            'R' => Some(PieceKind::Rook),
            'N' => Some(PieceKind::Knight),
            'B' => Some(PieceKind::Bishop),
            'Q' => Some(PieceKind::Queen),
            'K' => Some(PieceKind::King),
            _ => None,
        }
    }
}

/// Piece kind a pawn may turn into
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PromoteKind {
    Knight,
    Bishop,
    Rook,
    Queen,
}

impl PromoteKind {
    pub fn as_char(&self) -> char {
        PieceKind::from(*self).as_char()
    }

    pub fn from_char(c: char) -> Option<Self> {
        PieceKind::from_char(c)?.try_into().ok()
    }
}

impl From<PromoteKind> for PieceKind {
    fn from(p: PromoteKind) -> Self {
        match p {
            PromoteKind::Knight => PieceKind::Knight,
            PromoteKind::Bishop => PieceKind::Bishop,
            PromoteKind::Rook => PieceKind::Rook,
            PromoteKind::Queen => PieceKind::Queen,
        }
    }
}

impl TryFrom<PieceKind> for PromoteKind {
    type Error = ();

    fn try_from(p: PieceKind) -> Result<Self, Self::Error> {
        match p {
            PieceKind::Knight => Ok(PromoteKind::Knight),
            PieceKind::Bishop => Ok(PromoteKind::Bishop),
            PieceKind::Rook => Ok(PromoteKind::Rook),
            PieceKind::Queen => Ok(PromoteKind::Queen),
            _ => Err(()),
        }
    }
}

/// Classification of a position for the side to move
///
/// Never stored on the board: it is recomputed after every completed move.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Outcome {
    Ongoing,
    /// The given side is in check but still has a legal move
    Check(Color),
    Checkmate {
        winner: Color,
    },
    Stalemate,
}

impl Outcome {
    pub fn is_over(&self) -> bool {
        matches!(*self, Self::Checkmate { .. } | Self::Stalemate)
    }

    pub fn winner(&self) -> Option<Color> {
        match *self {
            Self::Checkmate { winner } => Some(winner),
            _ => None,
        }
    }

    pub fn is_check(&self) -> bool {
        matches!(*self, Self::Check(_) | Self::Checkmate { .. })
    }

    /// Game result marker as used in PGN (`*` while the game goes on)
    pub fn result_str(&self) -> &'static str {
        match *self {
            Self::Checkmate {
                winner: Color::White,
            } => "1-0",
            Self::Checkmate {
                winner: Color::Black,
            } => "0-1",
            Self::Stalemate => "1/2-1/2",
            Self::Ongoing | Self::Check(_) => "*",
        }
    }
}

impl Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match *self {
            Self::Ongoing => write!(f, "game goes on"),
            Self::Check(c) => write!(f, "{} is in check", c.name()),
            Self::Checkmate { winner } => write!(f, "{} wins by checkmate", winner.name()),
            Self::Stalemate => write!(f, "draw by stalemate"),
        }
    }
}
