//! Utilities to work with moves in SAN format

use super::base::{self, ValidateError};
use crate::board::Board;
use crate::movegen::{self, MovePush};
use crate::square_set::SquareSet;
use crate::types::{Color, PieceKind, PromoteKind, Square, SquareParseError};
use crate::{attack, geometry, legal};

use std::fmt;
use std::marker::PhantomData;
use std::str::{self, FromStr};

use thiserror::Error;

/// Error parsing SAN representation from string
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum RawParseError {
    /// String is empty
    #[error("string is empty")]
    EmptyString,
    /// Destination square is invalid
    #[error("invalid destination square")]
    InvalidDst(#[from] SquareParseError),
    /// Extra bytes in non-pawn move
    #[error("non-pawn move too long")]
    NonPawnMoveTooLong,
    /// String for pawn move is too short
    #[error("pawn move too short")]
    PawnMoveTooShort,
    /// Extra bytes in pawn move
    #[error("pawn move too long")]
    PawnMoveTooLong,
    /// Parsing failed for unspecified reasons
    #[error("syntax error")]
    Syntax,
}

/// Error converting SAN move into [`moves::Move`](super::Move)
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum IntoMoveError {
    /// Capture sign is put when the move is non-capture
    #[error("got capture sign on a non-capture move")]
    CaptureExpected,
    /// Promotion is given for a move which doesn't reach the last rank
    #[error("promotion is given for a move which doesn't promote")]
    UnexpectedPromote,
    /// Cannot find a corresponding legal move described by the given SAN string
    #[error("no such move")]
    NotFound,
    /// The description given by SAN string is ambiguous
    #[error("ambiguous move (candidates are at least `{0}` and `{1}`)")]
    Ambiguity(base::Move, base::Move),
}

/// Error parsing [`moves::Move`](super::Move) from SAN string
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum ParseError {
    /// Cannot parse SAN string
    #[error("cannot parse move: {0}")]
    Parse(#[from] RawParseError),
    /// Cannot convert a parsed string into a legal move
    #[error("cannot convert move: {0}")]
    Convert(#[from] IntoMoveError),
}

/// Style for formatting SAN moves
///
/// Note that the style can be used only for _formatting_. Move parser only accepts
/// ASCII characters as piece names and doesn't accept Unicode pieces.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Style {
    /// Use capital Latin letters for pieces
    Algebraic,
    /// Use Unicode chess symbols for pieces
    Utf8,
}

trait PieceTheme {
    fn marker() -> PhantomData<Self>;
    fn piece_to_char(kind: PieceKind) -> char;
    fn promote_sign() -> &'static str;

    fn promote_to_char(promote: PromoteKind) -> char {
        Self::piece_to_char(promote.into())
    }
}

struct Utf8Theme;

impl PieceTheme for Utf8Theme {
    fn marker() -> PhantomData<Self> {
        PhantomData
    }

    fn promote_sign() -> &'static str {
        ""
    }

    fn piece_to_char(kind: PieceKind) -> char {
        match kind {
            PieceKind::Pawn => '♙',
            PieceKind::Knight => '♘',
            PieceKind::Bishop => '♗',
            PieceKind::Rook => '♖',
            PieceKind::Queen => '♕',
            PieceKind::King => '♔',
        }
    }
}

struct AlgebraicTheme;

impl PieceTheme for AlgebraicTheme {
    fn marker() -> PhantomData<Self> {
        PhantomData
    }

    fn promote_sign() -> &'static str {
        "="
    }

    fn piece_to_char(kind: PieceKind) -> char {
        kind.as_char()
    }
}

#[inline]
fn file_char(col: i8) -> char {
    Square::new(0, col).file_char()
}

#[inline]
fn rank_char(row: i8) -> char {
    Square::new(row, 0).rank_char()
}

/// Everything about a finished move which is needed to write it in SAN
///
/// The flags describe the move as it was actually made: `capture` tells whether a piece was
/// taken, `check` and `checkmate` describe the position of the opponent after the move.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Facts {
    pub src: Square,
    pub kind: PieceKind,
    pub color: Color,
    pub dst: Square,
    pub capture: bool,
    pub promote: Option<PromoteKind>,
    pub check: bool,
    pub checkmate: bool,
}

/// Formats the move described by `facts` in SAN
///
/// `before` is the position before the move. It is used to find other pieces which could go to
/// the same square, so the origin can be disambiguated: by file if it's enough, otherwise by
/// rank, otherwise by both.
///
/// # Example
///
/// ```
/// # use arbiter::moves::san::{self, Facts};
/// # use arbiter::{Board, Color, PieceKind};
/// #
/// let facts = Facts {
///     src: "g1".parse().unwrap(),
///     kind: PieceKind::Knight,
///     color: Color::White,
///     dst: "f3".parse().unwrap(),
///     capture: false,
///     promote: None,
///     check: false,
///     checkmate: false,
/// };
/// assert_eq!(san::format(&Board::initial(), &facts), "Nf3");
/// ```
pub fn format(before: &Board, facts: &Facts) -> String {
    Move::from_facts(before, facts).to_string()
}

/// Parsed SAN string, without check indicator
///
/// Files and ranks are stored as zero-based column and row indices.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Data {
    /// Simple pawn move
    PawnMove {
        /// Destination square
        dst: Square,
        /// Piece to promote, if any
        promote: Option<PromoteKind>,
    },
    /// Pawn capture
    PawnCapture {
        /// Source file
        src: i8,
        /// Destination square
        dst: Square,
        /// Piece to promote, if any
        promote: Option<PromoteKind>,
    },
    /// Non-pawn move
    Simple {
        /// Piece to move
        kind: PieceKind,
        /// Source file, if specified
        file: Option<i8>,
        /// Source rank, if specified
        rank: Option<i8>,
        /// Is the move capture?
        is_capture: bool,
        /// Destination square
        dst: Square,
    },
}

struct PromoteFmt<T: PieceTheme>(Option<PromoteKind>, PhantomData<T>);

impl<T: PieceTheme> fmt::Display for PromoteFmt<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self.0 {
            None => Ok(()),
            Some(promote) => write!(f, "{}{}", T::promote_sign(), T::promote_to_char(promote)),
        }
    }
}

struct AmbigDetector {
    src: Square,
    sim_any: bool,
    sim_file: bool,
    sim_rank: bool,
}

impl AmbigDetector {
    fn new(src: Square) -> Self {
        Self {
            src,
            sim_any: false,
            sim_file: false,
            sim_rank: false,
        }
    }

    fn file(&self) -> Option<i8> {
        if self.sim_any && (self.sim_rank || !self.sim_file) {
            return Some(self.src.col());
        }
        None
    }

    fn rank(&self) -> Option<i8> {
        if self.sim_any && self.sim_file {
            return Some(self.src.row());
        }
        None
    }
}

impl MovePush for AmbigDetector {
    fn push(&mut self, mv: base::Move) {
        if mv.src() == self.src {
            return;
        }
        self.sim_any = true;
        if self.src.col() == mv.src().col() {
            self.sim_file = true;
        }
        if self.src.row() == mv.src().row() {
            self.sim_rank = true;
        }
    }
}

#[derive(Copy, Clone)]
enum AmbigSearcherState {
    Empty,
    Found(base::Move),
    Ambiguity(base::Move, base::Move),
}

struct AmbigSearcher {
    file: Option<i8>,
    rank: Option<i8>,
    state: AmbigSearcherState,
}

impl AmbigSearcher {
    fn new(file: Option<i8>, rank: Option<i8>) -> AmbigSearcher {
        AmbigSearcher {
            file,
            rank,
            state: AmbigSearcherState::Empty,
        }
    }

    fn get_move(&self) -> Result<base::Move, IntoMoveError> {
        match &self.state {
            AmbigSearcherState::Empty => Err(IntoMoveError::NotFound),
            AmbigSearcherState::Found(mv) => Ok(*mv),
            AmbigSearcherState::Ambiguity(mv, mv2) => Err(IntoMoveError::Ambiguity(*mv, *mv2)),
        }
    }
}

impl MovePush for AmbigSearcher {
    fn push(&mut self, mv: base::Move) {
        if self.file.is_some_and(|f| f != mv.src().col())
            || self.rank.is_some_and(|r| r != mv.src().row())
        {
            return;
        }
        self.state = match self.state {
            AmbigSearcherState::Empty => AmbigSearcherState::Found(mv),
            AmbigSearcherState::Found(mv2) => AmbigSearcherState::Ambiguity(mv2, mv),
            s @ AmbigSearcherState::Ambiguity(_, _) => s,
        };
    }
}

impl Data {
    /// Returns the wrapper which helps to format the move with the given style `style`
    ///
    /// See [`Move::styled()`] doc for details.
    #[inline]
    pub fn styled(&self, style: Style) -> StyledData<'_> {
        StyledData(self, style)
    }

    /// Returns the promotion written in this move, if any
    #[inline]
    pub fn promote(&self) -> Option<PromoteKind> {
        match *self {
            Self::PawnMove { promote, .. } | Self::PawnCapture { promote, .. } => promote,
            Self::Simple { .. } => None,
        }
    }

    /// Returns the destination square
    #[inline]
    pub fn dst(&self) -> Square {
        match *self {
            Self::PawnMove { dst, .. } | Self::PawnCapture { dst, .. } | Self::Simple { dst, .. } => {
                dst
            }
        }
    }

    /// Creates the parsed SAN from the description of a finished move
    ///
    /// `before` is the position before the move. Promotion is only written for pawn moves.
    pub fn from_facts(before: &Board, facts: &Facts) -> Data {
        if facts.kind == PieceKind::Pawn {
            return match facts.capture {
                true => Data::PawnCapture {
                    src: facts.src.col(),
                    dst: facts.dst,
                    promote: facts.promote,
                },
                false => Data::PawnMove {
                    dst: facts.dst,
                    promote: facts.promote,
                },
            };
        }

        let mut detector = AmbigDetector::new(facts.src);
        movegen::san_candidates(before, facts.kind, facts.color, facts.dst, &mut detector);
        Data::Simple {
            kind: facts.kind,
            file: detector.file(),
            rank: detector.rank(),
            is_capture: facts.capture,
            dst: facts.dst,
        }
    }

    /// Converts the parsed SAN into [`moves::Move`](super::Move) made by `side` in the position `b`
    ///
    /// A pawn move to the last rank without promotion is accepted, the promotion is then left
    /// for the caller to supply.
    pub fn into_move(self, b: &Board, side: Color) -> Result<base::Move, IntoMoveError> {
        let (kind, file, rank, is_capture, dst) = match self {
            Self::PawnMove { dst, .. } => (PieceKind::Pawn, Some(dst.col()), None, false, dst),
            Self::PawnCapture { src, dst, .. } => (PieceKind::Pawn, Some(src), None, true, dst),
            Self::Simple {
                kind,
                file,
                rank,
                is_capture,
                dst,
            } => (kind, file, rank, is_capture, dst),
        };
        if self.promote().is_some() && dst.row() != geometry::promote_row(side, b.size()) {
            return Err(IntoMoveError::UnexpectedPromote);
        }
        if is_capture && b.is_free(dst) {
            return Err(IntoMoveError::CaptureExpected);
        }
        let mut searcher = AmbigSearcher::new(file, rank);
        movegen::san_candidates(b, kind, side, dst, &mut searcher);
        searcher.get_move()
    }

    pub(self) fn do_fmt<P: PieceTheme>(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> Result<(), fmt::Error> {
        match *self {
            Self::PawnMove { dst, promote } => {
                write!(f, "{}{}", dst, PromoteFmt(promote, P::marker()))
            }
            Self::PawnCapture { src, dst, promote } => {
                write!(
                    f,
                    "{}x{}{}",
                    file_char(src),
                    dst,
                    PromoteFmt(promote, P::marker())
                )
            }
            Self::Simple {
                kind,
                file,
                rank,
                is_capture,
                dst,
            } => {
                if kind == PieceKind::Pawn {
                    panic!("cannot store pawn move as Data::Simple");
                }
                write!(f, "{}", P::piece_to_char(kind))?;
                if let Some(file) = file {
                    write!(f, "{}", file_char(file))?;
                }
                if let Some(rank) = rank {
                    write!(f, "{}", rank_char(rank))?;
                }
                if is_capture {
                    write!(f, "x")?;
                }
                write!(f, "{}", dst)
            }
        }
    }
}

impl fmt::Display for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        self.do_fmt::<AlgebraicTheme>(f)
    }
}

impl<'a> fmt::Display for StyledData<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self.1 {
            Style::Algebraic => self.0.do_fmt::<AlgebraicTheme>(f),
            Style::Utf8 => self.0.do_fmt::<Utf8Theme>(f),
        }
    }
}

fn parse_dst(bytes: &[u8]) -> Result<Square, RawParseError> {
    let s = str::from_utf8(bytes).map_err(|_| RawParseError::Syntax)?;
    Ok(Square::from_str(s)?)
}

impl FromStr for Data {
    type Err = RawParseError;

    fn from_str(data: &str) -> Result<Data, Self::Err> {
        if data.is_empty() {
            return Err(RawParseError::EmptyString);
        }

        let bytes = data.as_bytes();

        if let first @ (b'N' | b'B' | b'R' | b'Q' | b'K') = bytes[0] {
            let kind = match PieceKind::from_char(first as char) {
                Some(kind) => kind,
                None => return Err(RawParseError::Syntax),
            };
            let bytes = &bytes[1..];
            if bytes.len() < 2 {
                return Err(RawParseError::Syntax);
            }
            let (bytes, dst_bytes) = bytes.split_at(bytes.len() - 2);
            let dst = parse_dst(dst_bytes)?;
            let (file, bytes) = match bytes.first() {
                Some(b @ b'a'..=b'h') => (Some((b - b'a') as i8), &bytes[1..]),
                _ => (None, bytes),
            };
            let (rank, bytes) = match bytes.first() {
                Some(b @ b'1'..=b'8') => (Some((b - b'1') as i8), &bytes[1..]),
                _ => (None, bytes),
            };
            let (is_capture, bytes) = match bytes.first() {
                Some(b'x' | b':') => (true, &bytes[1..]),
                _ => (false, bytes),
            };
            if !bytes.is_empty() {
                return Err(RawParseError::NonPawnMoveTooLong);
            }
            return Ok(Data::Simple {
                kind,
                file,
                rank,
                is_capture,
                dst,
            });
        }

        let (promote, bytes) = match bytes.split_last() {
            Some((&b, rest)) if matches!(b, b'N' | b'B' | b'R' | b'Q') => {
                let rest = match rest.split_last() {
                    Some((b'=', data)) => data,
                    _ => rest,
                };
                (PromoteKind::from_char(b as char), rest)
            }
            _ => (None, bytes),
        };

        if bytes.len() < 2 {
            return Err(RawParseError::PawnMoveTooShort);
        }

        let (bytes, dst_bytes) = bytes.split_at(bytes.len() - 2);
        let dst = parse_dst(dst_bytes)?;

        match bytes.len() {
            0 => Ok(Data::PawnMove { dst, promote }),
            1 => Err(RawParseError::Syntax),
            2 => {
                if !matches!(bytes[0], b'a'..=b'h') || !matches!(bytes[1], b':' | b'x') {
                    return Err(RawParseError::Syntax);
                }
                Ok(Data::PawnCapture {
                    src: (bytes[0] - b'a') as i8,
                    dst,
                    promote,
                })
            }
            _ => Err(RawParseError::PawnMoveTooLong),
        }
    }
}

/// Check indication
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum CheckMark {
    /// Check (a.k.a. "+")
    Single,
    /// Double check (a.k.a "++")
    ///
    /// This one is never produced by the formatter and is used only for parsing.
    Double,
    /// Checkmate (a.k.a "#")
    Checkmate,
}

/// Parsed SAN move with a [`CheckMark`]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Move {
    /// Data without check mark
    pub data: Data,
    /// Check mark, if any
    pub check: Option<CheckMark>,
}

/// Wrapper to format [`Data`] with the given style
///
/// See [`Move::styled()`] doc for details.
pub struct StyledData<'a>(&'a Data, Style);

/// Wrapper to format [`Move`] with the given style
///
/// See [`Move::styled()`] doc for details.
pub struct StyledMove<'a>(&'a Move, Style);

impl Move {
    /// Returns the wrapper which helps to format the move with the given style `style`
    ///
    /// The resulting wrapper implements [`fmt::Display`], so can be used with
    /// `write!()`, `println!()`, or `ToString::to_string`.
    #[inline]
    pub fn styled(&self, style: Style) -> StyledMove<'_> {
        StyledMove(self, style)
    }

    pub(self) fn do_fmt<P: PieceTheme>(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> Result<(), fmt::Error> {
        self.data.do_fmt::<P>(f)?;
        match self.check {
            Some(CheckMark::Single) => write!(f, "+")?,
            Some(CheckMark::Double) => write!(f, "++")?,
            Some(CheckMark::Checkmate) => write!(f, "#")?,
            None => {}
        };
        Ok(())
    }

    /// Creates the parsed SAN from the description of a finished move
    pub fn from_facts(before: &Board, facts: &Facts) -> Move {
        let check = if facts.checkmate {
            Some(CheckMark::Checkmate)
        } else if facts.check {
            Some(CheckMark::Single)
        } else {
            None
        };
        Move {
            data: Data::from_facts(before, facts),
            check,
        }
    }

    /// Creates the parsed SAN from move `mv` in position `b`
    ///
    /// `promote` is only taken into account if the move brings a pawn to the last rank.
    pub fn from_move(
        mv: base::Move,
        promote: Option<PromoteKind>,
        b: &Board,
    ) -> Result<Move, ValidateError> {
        mv.validate(b)?;
        let piece = *b.get(mv.id());
        let promote = promote.filter(|_| {
            piece.kind == PieceKind::Pawn
                && mv.dst().row() == geometry::promote_row(piece.color, b.size())
        });

        let mut after = legal::simulate(b, mv.id(), mv.dst());
        if let Some(p) = promote {
            after.replace_kind(mv.id(), p.into());
        }
        let opponent = piece.color.inv();
        let check = attack::is_king_in_check(&after, opponent);
        let facts = Facts {
            src: mv.src(),
            kind: piece.kind,
            color: piece.color,
            dst: mv.dst(),
            capture: !b.is_free(mv.dst()),
            promote,
            check,
            checkmate: check && !movegen::has_any_legal_move(&after, opponent),
        };
        Ok(Move::from_facts(b, &facts))
    }

    /// Converts the parsed SAN into [`moves::Move`](super::Move) made by `side` in the position `b`
    pub fn into_move(self, b: &Board, side: Color) -> Result<base::Move, IntoMoveError> {
        self.data.into_move(b, side)
    }
}

/// Parses the SAN string `s` and finds the corresponding legal move of `side` in the position `b`
///
/// Returns the move together with the promotion written in `s`, if any.
pub fn parse_move(
    s: &str,
    b: &Board,
    side: Color,
) -> Result<(base::Move, Option<PromoteKind>), ParseError> {
    let san = Move::from_str(s)?;
    let mv = san.into_move(b, side)?;
    Ok((mv, san.data.promote()))
}

/// Returns the squares of the pieces of `side` which have a legal move described by `data`
///
/// Useful to highlight the candidates when a SAN string turns out to be ambiguous.
pub fn candidate_squares(data: &Data, b: &Board, side: Color) -> SquareSet {
    let kind = match data {
        Data::PawnMove { .. } | Data::PawnCapture { .. } => PieceKind::Pawn,
        Data::Simple { kind, .. } => *kind,
    };
    let mut res = Vec::new();
    movegen::san_candidates(b, kind, side, data.dst(), &mut res);
    res.into_iter()
        .filter(|mv| match *data {
            Data::PawnMove { dst, .. } => mv.src().col() == dst.col(),
            Data::PawnCapture { src, .. } => mv.src().col() == src,
            Data::Simple { file, rank, .. } => {
                file.map_or(true, |f| f == mv.src().col())
                    && rank.map_or(true, |r| r == mv.src().row())
            }
        })
        .map(|mv| mv.src())
        .collect()
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        self.do_fmt::<AlgebraicTheme>(f)
    }
}

impl<'a> fmt::Display for StyledMove<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self.1 {
            Style::Algebraic => self.0.do_fmt::<AlgebraicTheme>(f),
            Style::Utf8 => self.0.do_fmt::<Utf8Theme>(f),
        }
    }
}

impl FromStr for Move {
    type Err = RawParseError;

    fn from_str(s: &str) -> Result<Move, Self::Err> {
        let (check, s) = if let Some(rest) = s.strip_suffix("++") {
            (Some(CheckMark::Double), rest)
        } else if let Some(rest) = s.strip_suffix('+') {
            (Some(CheckMark::Single), rest)
        } else if let Some(rest) = s.strip_suffix('#') {
            (Some(CheckMark::Checkmate), rest)
        } else {
            (None, s)
        };
        Ok(Move {
            data: Data::from_str(s)?,
            check,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        Square::from_str(s).unwrap()
    }

    fn mv(b: &Board, src: &str, dst: &str) -> base::Move {
        base::Move::from_squares(b, sq(src), sq(dst)).unwrap()
    }

    fn from_san(s: &str, b: &Board, side: Color) -> Result<base::Move, ParseError> {
        parse_move(s, b, side).map(|(mv, _)| mv)
    }

    #[test]
    fn test_format() {
        let b = Board::initial();
        let facts = Facts {
            src: sq("g1"),
            kind: PieceKind::Knight,
            color: Color::White,
            dst: sq("f3"),
            capture: false,
            promote: None,
            check: false,
            checkmate: false,
        };
        assert_eq!(format(&b, &facts), "Nf3");

        let b = Board::from_str("4k3/8/8/3p4/4P3/8/8/4K3").unwrap();
        let facts = Facts {
            src: sq("e4"),
            kind: PieceKind::Pawn,
            color: Color::White,
            dst: sq("d5"),
            capture: true,
            promote: None,
            check: false,
            checkmate: false,
        };
        assert_eq!(format(&b, &facts), "exd5");

        let b = Board::from_str("3r2k1/2P2ppp/8/8/8/8/8/4K3").unwrap();
        let facts = Facts {
            src: sq("c7"),
            kind: PieceKind::Pawn,
            color: Color::White,
            dst: sq("d8"),
            capture: true,
            promote: Some(PromoteKind::Queen),
            check: true,
            checkmate: true,
        };
        assert_eq!(format(&b, &facts), "cxd8=Q#");
    }

    #[test]
    fn test_simple() {
        let mut b = Board::initial();
        let mut side = Color::White;
        for (mv_str, placement) in [
            ("e4", "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR"),
            ("Nc6", "r1bqkbnr/pppppppp/2n5/8/4P3/8/PPPP1PPP/RNBQKBNR"),
            ("Nf3", "r1bqkbnr/pppppppp/2n5/8/4P3/5N2/PPPP1PPP/RNBQKB1R"),
            ("e5", "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R"),
            ("Bb5", "r1bqkbnr/pppp1ppp/2n5/1B2p3/4P3/5N2/PPPP1PPP/RNBQK2R"),
            ("Nf6", "r1bqkb1r/pppp1ppp/2n2n2/1B2p3/4P3/5N2/PPPP1PPP/RNBQK2R"),
            ("Kf1", "r1bqkb1r/pppp1ppp/2n2n2/1B2p3/4P3/5N2/PPPP1PPP/RNBQ1K1R"),
            ("Nxe4", "r1bqkb1r/pppp1ppp/2n5/1B2p3/4n3/5N2/PPPP1PPP/RNBQ1K1R"),
            ("Qe2", "r1bqkb1r/pppp1ppp/2n5/1B2p3/4n3/5N2/PPPPQPPP/RNB2K1R"),
            ("Nd4", "r1bqkb1r/pppp1ppp/8/1B2p3/3nn3/5N2/PPPPQPPP/RNB2K1R"),
        ] {
            let m = from_san(mv_str, &b, side).unwrap();
            assert_eq!(
                Move::from_str(mv_str).unwrap(),
                Move::from_move(m, None, &b).unwrap()
            );
            assert_eq!(m.san(&b, None).unwrap().to_string(), mv_str.to_string());
            b.relocate(m.id(), m.dst());
            side = side.inv();
            assert_eq!(b.as_placement(), placement);
        }
    }

    #[test]
    fn test_pawn_conflict() {
        let b = Board::from_str("8/8/1p6/2P5/1p5k/2P5/7K/8").unwrap();
        assert_eq!(
            from_san("cxb4", &b, Color::White).unwrap(),
            mv(&b, "c3", "b4")
        );
        assert_eq!(
            from_san("cxb6", &b, Color::White).unwrap(),
            mv(&b, "c5", "b6")
        );
        assert_eq!(
            from_san("cxd4", &b, Color::White),
            Err(ParseError::Convert(IntoMoveError::CaptureExpected))
        );
        assert_eq!(
            from_san("c4", &b, Color::White).unwrap(),
            mv(&b, "c3", "c4")
        );
    }

    #[test]
    fn test_conflict() {
        let b = Board::from_str("k5K1/8/5q2/6n1/8/2P5/5q2/8").unwrap();
        let side = Color::Black;
        assert_eq!(from_san("Qe5", &b, side).unwrap(), mv(&b, "f6", "e5"));
        assert!(matches!(
            from_san("Qd4", &b, side),
            Err(ParseError::Convert(IntoMoveError::Ambiguity(_, _)))
        ));
        assert_eq!(from_san("Qxc3", &b, side).unwrap(), mv(&b, "f6", "c3"));
        assert_eq!(from_san("Qb2", &b, side).unwrap(), mv(&b, "f2", "b2"));
        assert_eq!(
            from_san("Qa1", &b, side),
            Err(ParseError::Convert(IntoMoveError::NotFound))
        );
        assert_eq!(
            from_san("Qg5", &b, side),
            Err(ParseError::Convert(IntoMoveError::NotFound))
        );
        assert_eq!(from_san("Qe3", &b, side).unwrap(), mv(&b, "f2", "e3"));
        assert_eq!(from_san("Q2d4", &b, side).unwrap(), mv(&b, "f2", "d4"));
        assert_eq!(from_san("Q6d4", &b, side).unwrap(), mv(&b, "f6", "d4"));
        assert_eq!(from_san("Qf6d4", &b, side).unwrap(), mv(&b, "f6", "d4"));
        assert_eq!(from_san("Qfe5", &b, side).unwrap(), mv(&b, "f6", "e5"));
        assert_eq!(from_san("Qf6e5", &b, side).unwrap(), mv(&b, "f6", "e5"));
        assert_eq!(
            from_san("Qge5", &b, side),
            Err(ParseError::Convert(IntoMoveError::NotFound))
        );
        assert_eq!(
            from_san("Q5e5", &b, side),
            Err(ParseError::Convert(IntoMoveError::NotFound))
        );
        assert!(matches!(
            from_san("Qfd4", &b, side),
            Err(ParseError::Convert(IntoMoveError::Ambiguity(_, _)))
        ));
        assert_eq!(
            mv(&b, "f6", "d4").san(&b, None).unwrap().to_string(),
            "Q6d4"
        );

        let data = Data::from_str("Qd4").unwrap();
        let expected: SquareSet = [sq("f6"), sq("f2")].into_iter().collect();
        assert_eq!(candidate_squares(&data, &b, side), expected);
    }

    #[test]
    fn test_capture() {
        let b = Board::from_str("k5K1/8/p4q2/1P4n1/8/2P5/5q2/8").unwrap();
        let side = Color::Black;
        assert_eq!(
            from_san("Qxe5", &b, side),
            Err(ParseError::Convert(IntoMoveError::CaptureExpected))
        );
        assert_eq!(from_san("Qe5", &b, side).unwrap(), mv(&b, "f6", "e5"));
        assert_eq!(from_san("Qc3", &b, side).unwrap(), mv(&b, "f6", "c3"));
        assert_eq!(from_san("Qxc3", &b, side).unwrap(), mv(&b, "f6", "c3"));
        assert_eq!(from_san("axb5", &b, side).unwrap(), mv(&b, "a6", "b5"));
        assert_eq!(
            from_san("b5", &b, side),
            Err(ParseError::Convert(IntoMoveError::NotFound))
        );
        assert_eq!(
            from_san("axa5", &b, side),
            Err(ParseError::Convert(IntoMoveError::CaptureExpected))
        );
        assert_eq!(from_san("a5", &b, side).unwrap(), mv(&b, "a6", "a5"));
    }

    #[test]
    fn test_promote() {
        for (src, dst, promote, san_str) in [
            ("d7", "d8", PromoteKind::Knight, "d8=N"),
            ("d7", "c8", PromoteKind::Bishop, "dxc8=B"),
            ("g7", "f8", PromoteKind::Rook, "gxf8=R+"),
            ("g7", "h8", PromoteKind::Queen, "gxh8=Q"),
        ] {
            let b = Board::from_str("2n2n1n/3P2P1/8/8/8/8/3K1k2/8").unwrap();
            let m = mv(&b, src, dst);
            assert_eq!(
                m.san(&b, Some(promote)).unwrap().to_string(),
                san_str.to_string()
            );
            assert_eq!(
                parse_move(san_str, &b, Color::White).unwrap(),
                (m, Some(promote))
            );
        }

        let b = Board::from_str("2n2n1n/3P2P1/8/8/8/8/3K1k2/8").unwrap();
        assert_eq!(
            parse_move("d8", &b, Color::White).unwrap(),
            (mv(&b, "d7", "d8"), None)
        );
        assert_eq!(
            parse_move("Kxd3e2", &b, Color::White),
            Err(ParseError::Parse(RawParseError::NonPawnMoveTooLong))
        );

        let b = Board::from_str("4k3/8/8/8/8/8/3P4/4K3").unwrap();
        assert_eq!(
            parse_move("d3=Q", &b, Color::White),
            Err(ParseError::Convert(IntoMoveError::UnexpectedPromote))
        );
    }

    #[test]
    fn test_tricky() {
        for (placement, src, dst, mv_str) in [
            ("4k3/6K1/8/2N5/8/8/8/N7", "a1", "b3", "Nab3"),
            ("4k3/6K1/8/N7/8/8/8/N7", "a1", "b3", "N1b3"),
            ("4k3/6K1/8/8/8/8/8/N1N5", "a1", "b3", "Nab3"),
            ("4k3/6K1/8/N1N5/8/8/8/N1N5", "a1", "b3", "Na1b3"),
            ("5k2/8/5K2/8/3R3R/8/8/b7", "h4", "f4", "Rf4"),
            ("4k3/6K1/8/2N5/8/1r6/8/N7", "a1", "b3", "Naxb3"),
            ("4k3/6K1/8/N7/8/1r6/8/N7", "a1", "b3", "N1xb3"),
            ("4k3/6K1/8/8/8/1r6/8/N1N5", "a1", "b3", "Naxb3"),
            ("4k3/6K1/8/N1N5/8/1r6/8/N1N5", "a1", "b3", "Na1xb3"),
        ] {
            let b = Board::from_str(placement).unwrap();
            let m = from_san(mv_str, &b, Color::White).unwrap();
            assert_eq!(m, mv(&b, src, dst));
            assert_eq!(
                Move::from_str(mv_str).unwrap(),
                Move::from_move(m, None, &b).unwrap()
            );
            assert_eq!(m.san(&b, None).unwrap().to_string(), mv_str.to_string());
        }
    }

    #[test]
    fn test_styled() {
        let b = Board::from_str("8/2P5/8/8/8/8/4k1K1/8").unwrap();
        let king = mv(&b, "g2", "h2").san(&b, None).unwrap();
        assert_eq!(king.styled(Style::Utf8).to_string(), "♔h2".to_string());
        assert_eq!(king.styled(Style::Algebraic).to_string(), "Kh2".to_string());
        let pawn = mv(&b, "c7", "c8")
            .san(&b, Some(PromoteKind::Bishop))
            .unwrap();
        assert_eq!(pawn.styled(Style::Utf8).to_string(), "c8♗".to_string());
    }

    #[test]
    fn test_check() {
        let b = Board::from_str("1r5k/8/8/8/8/6p1/r7/5K2").unwrap();
        let side = Color::Black;
        assert_eq!(
            mv(&b, "g3", "g2").san(&b, None).unwrap().to_string(),
            "g2+".to_string(),
        );
        assert_eq!(
            mv(&b, "b8", "b1").san(&b, None).unwrap().to_string(),
            "Rb1#".to_string(),
        );
        assert_eq!(from_san("g2", &b, side).unwrap(), mv(&b, "g3", "g2"));
        assert_eq!(from_san("g2+", &b, side).unwrap(), mv(&b, "g3", "g2"));
        assert_eq!(from_san("Rb1", &b, side).unwrap(), mv(&b, "b8", "b1"));
        assert_eq!(from_san("Rb1+", &b, side).unwrap(), mv(&b, "b8", "b1"));
        assert_eq!(from_san("Rb1#", &b, side).unwrap(), mv(&b, "b8", "b1"));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Data::from_str(""), Err(RawParseError::EmptyString));
        assert_eq!(Data::from_str("N"), Err(RawParseError::Syntax));
        assert_eq!(Data::from_str("e"), Err(RawParseError::PawnMoveTooShort));
        assert_eq!(Data::from_str("exxd5"), Err(RawParseError::PawnMoveTooLong));
        assert_eq!(Data::from_str("e-d5"), Err(RawParseError::Syntax));
        assert_eq!(
            Data::from_str("Nz3"),
            Err(RawParseError::InvalidDst(SquareParseError::UnexpectedFileChar('z')))
        );
        assert_eq!(
            Move::from_str("Qh5++").unwrap().check,
            Some(CheckMark::Double)
        );
    }
}
