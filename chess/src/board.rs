//! Board and related things

use crate::geometry;
use crate::square_set::SquareSet;
use crate::types::{BoardSize, Color, PieceKind, Square};

use std::fmt::{self, Display};
use std::str::FromStr;

use arrayvec::ArrayVec;
use thiserror::Error;

/// Maximum number of pieces a board can hold
pub const MAX_PIECES: usize = 32;

/// Error placing a piece on the board
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum PlaceError {
    /// The square lies outside of the board
    #[error("square {0} is outside of the board")]
    OffBoard(Square),
    /// The square already holds a piece
    #[error("square {0} is already occupied")]
    Occupied(Square),
    /// All the piece slots are used up
    ///
    /// Captured pieces keep their slots, so this may happen with fewer than [`MAX_PIECES`]
    /// pieces on the board.
    #[error("all {} piece slots are used up", MAX_PIECES)]
    ArenaFull,
}

/// Board validation error
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum ValidateError {
    /// A piece stands outside of the board
    #[error("piece outside of the board at {0}")]
    OffBoard(Square),
    /// Two pieces share one square
    #[error("more than one piece on {0}")]
    Overlap(Square),
    /// One of the sides doesn't have a king
    #[error("no king of color {0:?}")]
    NoKing(Color),
    /// One of the sides has more than one king
    #[error("more than one king of color {0:?}")]
    TooManyKings(Color),
}

/// Error parsing a piece placement string
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum PlacementParseError {
    /// Row is too long
    #[error("too many items in row {0}")]
    RowOverflow(i8),
    /// Row is too short
    #[error("not enough items in row {0}")]
    RowUnderflow(i8),
    /// Too many rows
    #[error("too many rows")]
    Overflow,
    /// Not enough rows
    #[error("not enough rows")]
    Underflow,
    /// Unexpected character
    #[error("unexpected char {0:?}")]
    UnexpectedChar(char),
    /// Piece cannot be placed
    #[error("cannot place piece: {0}")]
    Place(#[from] PlaceError),
}

/// Piece standing on the board
///
/// This is a plain value. Two pieces of the same kind and color are told apart by their
/// [`PieceId`], not by comparing their fields.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
    pub square: Square,
}

impl Piece {
    pub const fn new(kind: PieceKind, color: Color, square: Square) -> Piece {
        Piece {
            kind,
            color,
            square,
        }
    }

    /// Returns the piece letter, upper-case for White and lower-case for Black
    pub fn as_char(&self) -> char {
        let c = self.kind.as_char();
        match self.color {
            Color::White => c,
            Color::Black => c.to_ascii_lowercase(),
        }
    }

    pub fn from_char(c: char, square: Square) -> Option<Piece> {
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        let kind = PieceKind::from_char(c.to_ascii_uppercase())?;
        Some(Piece::new(kind, color, square))
    }
}

/// Stable handle of a piece inside a [`Board`]
///
/// The id stays valid for as long as the piece stays on the board: captures of other pieces and
/// promotions never renumber the remaining pieces.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PieceId(u8);

impl PieceId {
    pub const fn from_index(val: usize) -> PieceId {
        assert!(val < MAX_PIECES, "piece index too large");
        PieceId(val as u8)
    }

    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

impl Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "#{}", self.0)
    }
}

/// Collection of the pieces currently in play
///
/// Pieces live in a fixed-capacity arena. Removing a piece leaves its slot vacant, so the ids of
/// all the other pieces stay the same. Cloning the board is cheap and doesn't allocate, which is
/// how the legality checks simulate moves without touching the original board.
///
/// Two boards compare equal only if they hold the same pieces in the same slots.
///
/// # Example
///
/// ```
/// # use arbiter::{Board, Color, PieceKind, Square};
/// #
/// let board = Board::initial();
/// let king = board.find_king(Color::White).unwrap();
/// assert_eq!(king.square, "e1".parse::<Square>().unwrap());
/// assert_eq!(board.piece_at("d8".parse().unwrap()).unwrap().kind, PieceKind::Queen);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    size: BoardSize,
    slots: ArrayVec<Option<Piece>, MAX_PIECES>,
}

impl Board {
    /// Returns a board of size `size` without any pieces
    pub fn empty(size: BoardSize) -> Board {
        Board {
            size,
            slots: ArrayVec::new(),
        }
    }

    /// Returns a board with the initial position
    pub fn initial() -> Board {
        const BACK: [PieceKind; 8] = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];

        let size = BoardSize::STANDARD;
        let mut res = Board::empty(size);
        for color in [Color::White, Color::Black] {
            let back = geometry::back_row(color, size);
            let pawns = geometry::pawn_start_row(color, size);
            for col in 0..8 {
                res.push(Piece::new(PieceKind::Pawn, color, Square::new(pawns, col)));
            }
            for (col, kind) in BACK.into_iter().enumerate() {
                res.push(Piece::new(kind, color, Square::new(back, col as i8)));
            }
        }
        res
    }

    /// Parses a piece placement string on a board of size `size`
    ///
    /// The format is the first part of FEN: rows go from the top (Black's side) to the bottom and
    /// are separated by `/`, digits stand for runs of empty squares, upper-case letters denote
    /// White pieces and lower-case letters denote Black ones.
    pub fn from_placement(size: BoardSize, s: &str) -> Result<Board, PlacementParseError> {
        type Error = PlacementParseError;

        let n = size.get() as i8;
        let mut res = Board::empty(size);
        let mut row = size.last();
        let mut col = 0_i8;
        for c in s.chars() {
            match c {
                '1'..='8' => {
                    let add = c as i8 - b'0' as i8;
                    if col + add > n {
                        return Err(Error::RowOverflow(row));
                    }
                    col += add;
                }
                '/' => {
                    if col < n {
                        return Err(Error::RowUnderflow(row));
                    }
                    if row == 0 {
                        return Err(Error::Overflow);
                    }
                    row -= 1;
                    col = 0;
                }
                _ => {
                    if col >= n {
                        return Err(Error::RowOverflow(row));
                    }
                    let piece = Piece::from_char(c, Square::new(row, col))
                        .ok_or(Error::UnexpectedChar(c))?;
                    res.place(piece)?;
                    col += 1;
                }
            }
        }

        if col < n {
            return Err(Error::RowUnderflow(row));
        }
        if row > 0 {
            return Err(Error::Underflow);
        }
        Ok(res)
    }

    #[inline]
    pub fn size(&self) -> BoardSize {
        self.size
    }

    /// Returns the number of pieces on the board
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the piece with id `id`
    ///
    /// # Panics
    ///
    /// Panics if there is no such piece on the board. Asking for a piece that was never placed, or
    /// was already captured, is a bug in the calling code.
    #[inline]
    pub fn get(&self, id: PieceId) -> &Piece {
        match self.try_get(id) {
            Some(p) => p,
            None => panic!("no piece with id {} on the board", id),
        }
    }

    #[inline]
    pub fn try_get(&self, id: PieceId) -> Option<&Piece> {
        self.slots.get(id.index())?.as_ref()
    }

    fn get_mut(&mut self, id: PieceId) -> &mut Piece {
        match self.slots.get_mut(id.index()) {
            Some(Some(p)) => p,
            _ => panic!("no piece with id {} on the board", id),
        }
    }

    /// Iterates over all the pieces in slot order
    pub fn iter(&self) -> impl Iterator<Item = (PieceId, &Piece)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| Some((PieceId::from_index(idx), slot.as_ref()?)))
    }

    /// Iterates over all the pieces of color `c` in slot order
    pub fn iter_color(&self, c: Color) -> impl Iterator<Item = (PieceId, &Piece)> + '_ {
        self.iter().filter(move |(_, p)| p.color == c)
    }

    /// Returns the id of the piece standing on `sq`, if any
    pub fn id_at(&self, sq: Square) -> Option<PieceId> {
        self.iter().find(|(_, p)| p.square == sq).map(|(id, _)| id)
    }

    /// Returns the piece standing on `sq`, if any
    ///
    /// Squares outside of the board are simply empty.
    pub fn piece_at(&self, sq: Square) -> Option<&Piece> {
        self.slots.iter().flatten().find(|p| p.square == sq)
    }

    #[inline]
    pub fn is_free(&self, sq: Square) -> bool {
        self.piece_at(sq).is_none()
    }

    /// Returns the king of color `c`
    ///
    /// In a well-formed position there is always exactly one. If the king is missing, this function
    /// returns `None` and leaves it up to the caller to decide what to do.
    pub fn find_king(&self, c: Color) -> Option<&Piece> {
        self.slots
            .iter()
            .flatten()
            .find(|p| p.kind == PieceKind::King && p.color == c)
    }

    #[inline]
    pub fn king_pos(&self, c: Color) -> Option<Square> {
        self.find_king(c).map(|p| p.square)
    }

    /// Returns the set of all the occupied squares
    pub fn occupied(&self) -> SquareSet {
        self.slots.iter().flatten().map(|p| p.square).collect()
    }

    /// Returns the set of squares occupied by the pieces of color `c`
    pub fn occupied_by(&self, c: Color) -> SquareSet {
        self.iter_color(c).map(|(_, p)| p.square).collect()
    }

    fn push(&mut self, piece: Piece) -> PieceId {
        let id = PieceId::from_index(self.slots.len());
        self.slots.push(Some(piece));
        id
    }

    /// Puts `piece` on the board and returns its id
    pub fn place(&mut self, piece: Piece) -> Result<PieceId, PlaceError> {
        if !self.size.contains(piece.square) {
            return Err(PlaceError::OffBoard(piece.square));
        }
        if !self.is_free(piece.square) {
            return Err(PlaceError::Occupied(piece.square));
        }
        if self.slots.is_full() {
            return Err(PlaceError::ArenaFull);
        }
        let id = self.push(piece);
        self.selftest();
        Ok(id)
    }

    /// Takes the piece with id `id` off the board
    ///
    /// # Panics
    ///
    /// Panics if there is no such piece on the board.
    pub fn remove(&mut self, id: PieceId) -> Piece {
        match self.slots.get_mut(id.index()).and_then(Option::take) {
            Some(p) => p,
            None => panic!("no piece with id {} on the board", id),
        }
    }

    /// Moves the piece with id `id` to `dst`
    ///
    /// Whatever stood on `dst` is taken off the board and returned. This function doesn't check
    /// any chess rules.
    ///
    /// # Panics
    ///
    /// Panics if there is no such piece on the board, or if `dst` lies outside of the board.
    pub fn relocate(&mut self, id: PieceId, dst: Square) -> Option<Piece> {
        assert!(
            self.size.contains(dst),
            "cannot move piece {} outside of the board to {}",
            id,
            dst
        );
        let captured = match self.id_at(dst) {
            Some(other) if other != id => Some(self.remove(other)),
            _ => None,
        };
        self.get_mut(id).square = dst;
        self.selftest();
        captured
    }

    /// Changes the kind of the piece with id `id`, keeping its color, square and id
    ///
    /// # Panics
    ///
    /// Panics if there is no such piece on the board.
    pub fn replace_kind(&mut self, id: PieceId, kind: PieceKind) {
        self.get_mut(id).kind = kind;
    }

    fn check_layout(&self) -> Result<(), ValidateError> {
        let mut seen = SquareSet::EMPTY;
        for p in self.slots.iter().flatten() {
            if !self.size.contains(p.square) {
                return Err(ValidateError::OffBoard(p.square));
            }
            if seen.has(p.square) {
                return Err(ValidateError::Overlap(p.square));
            }
            seen.set(p.square);
        }
        Ok(())
    }

    /// Checks that the board holds a well-formed position
    ///
    /// All the pieces must stand on distinct squares inside the board, and each side must have
    /// exactly one king. The queries in this crate assume a well-formed board but never call this
    /// function on their own.
    pub fn validate(&self) -> Result<(), ValidateError> {
        self.check_layout()?;
        for color in [Color::White, Color::Black] {
            let kings = self
                .iter_color(color)
                .filter(|(_, p)| p.kind == PieceKind::King)
                .count();
            match kings {
                0 => return Err(ValidateError::NoKing(color)),
                1 => {}
                _ => return Err(ValidateError::TooManyKings(color)),
            }
        }
        Ok(())
    }

    #[inline]
    fn selftest(&self) {
        #[cfg(feature = "selftest")]
        if let Err(e) = self.check_layout() {
            panic!("board is corrupted: {}", e);
        }
    }

    /// Converts the board into a piece placement string
    ///
    /// This is the inverse of [`Board::from_placement()`].
    pub fn as_placement(&self) -> String {
        self.to_string()
    }

    /// Wraps the board to allow pretty-printing
    ///
    /// The resulting wrapper implements [`fmt::Display`], so can be used with
    /// `write!()`, `println!()`, or `ToString::to_string`.
    ///
    /// # Example
    ///
    /// ```
    /// # use arbiter::Board;
    /// #
    /// let res = r#"
    /// 8|rnbqkbnr
    /// 7|pppppppp
    /// 6|........
    /// 5|........
    /// 4|........
    /// 3|........
    /// 2|PPPPPPPP
    /// 1|RNBQKBNR
    /// -+--------
    ///  |abcdefgh
    /// "#;
    /// assert_eq!(Board::initial().pretty().to_string().trim(), res.trim());
    /// ```
    #[inline]
    pub fn pretty(&self) -> Pretty<'_> {
        Pretty(self)
    }
}

impl Default for Board {
    #[inline]
    fn default() -> Board {
        Board::initial()
    }
}

impl FromStr for Board {
    type Err = PlacementParseError;

    fn from_str(s: &str) -> Result<Board, Self::Err> {
        Board::from_placement(BoardSize::STANDARD, s)
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        let n = self.size.get() as i8;
        for row in (0..n).rev() {
            if row != n - 1 {
                write!(f, "/")?;
            }
            let mut empty = 0;
            for col in 0..n {
                match self.piece_at(Square::new(row, col)) {
                    Some(p) => {
                        if empty != 0 {
                            write!(f, "{}", empty)?;
                            empty = 0;
                        }
                        write!(f, "{}", p.as_char())?;
                    }
                    None => empty += 1,
                }
            }
            if empty != 0 {
                write!(f, "{}", empty)?;
            }
        }
        Ok(())
    }
}

/// Wrapper to pretty-print the board
///
/// See docs for [`Board::pretty()`] for more details.
pub struct Pretty<'a>(&'a Board);

impl<'a> Display for Pretty<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        let n = self.0.size.get() as i8;
        for row in (0..n).rev() {
            write!(f, "{}|", row + 1)?;
            for col in 0..n {
                match self.0.piece_at(Square::new(row, col)) {
                    Some(p) => write!(f, "{}", p.as_char())?,
                    None => write!(f, ".")?,
                }
            }
            writeln!(f)?;
        }
        write!(f, "-+")?;
        for _ in 0..n {
            write!(f, "-")?;
        }
        writeln!(f)?;
        write!(f, " |")?;
        for col in 0..n {
            write!(f, "{}", Square::new(0, col).file_char())?;
        }
        writeln!(f)?;
        Ok(())
    }
}
