use super::san;
use crate::board::{Board, PieceId};
use crate::types::{PromoteKind, Square};
use crate::{legal, movegen};

use std::fmt;

use thiserror::Error;

/// Chess move
///
/// The move refers to the piece it moves by [`PieceId`], so it is only meaningful together
/// with the board it was created for.
///
/// # Validity
///
/// There are the following levels of validity:
///
/// - _Pseudo-legal_. The piece `id` stands on `src` and its movement rules allow it to go to `dst`.
///
/// - _Legal_. The move is pseudo-legal and the king of the moving side is not under attack after it.
///
/// Promotion is not a part of the move: it is resolved as a separate step once the pawn is on the
/// last rank.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Move {
    id: PieceId,
    src: Square,
    dst: Square,
}

/// Error indicating that move is invalid
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum ValidateError {
    /// The piece is not on the source square
    #[error("piece {0} is not on the source square")]
    NoPiece(PieceId),
    /// Move is not pseudo-legal
    #[error("move is not pseudo-legal")]
    NotPseudoLegal,
    /// Move is not legal
    #[error("move is not legal")]
    NotLegal,
}

impl Move {
    /// Creates a new move from its raw parts
    ///
    /// The move is not checked in any way.
    #[inline]
    pub const fn new(id: PieceId, src: Square, dst: Square) -> Move {
        Move { id, src, dst }
    }

    /// Creates a move of the piece standing on `src` to `dst` in the position `b`
    ///
    /// Returns `None` if `src` is empty. The returned move is **not** guaranteed to be legal.
    pub fn from_squares(b: &Board, src: Square, dst: Square) -> Option<Move> {
        let id = b.id_at(src)?;
        Some(Move::new(id, src, dst))
    }

    #[inline]
    pub const fn id(&self) -> PieceId {
        self.id
    }

    #[inline]
    pub const fn src(&self) -> Square {
        self.src
    }

    #[inline]
    pub const fn dst(&self) -> Square {
        self.dst
    }

    /// Checks whether the move is legal in the position `b`
    pub fn validate(&self, b: &Board) -> Result<(), ValidateError> {
        match b.try_get(self.id) {
            Some(p) if p.square == self.src => {}
            _ => return Err(ValidateError::NoPiece(self.id)),
        }
        if !movegen::is_pseudo_legal(b, self.id, self.dst) {
            return Err(ValidateError::NotPseudoLegal);
        }
        if !legal::is_safe_after(b, self.id, self.dst) {
            return Err(ValidateError::NotLegal);
        }
        Ok(())
    }

    #[inline]
    pub fn is_legal(&self, b: &Board) -> bool {
        self.validate(b).is_ok()
    }

    /// Converts the move into SAN, assuming `b` is the position before the move
    ///
    /// If the move brings a pawn to the last rank, `promote` must be set to get a complete SAN.
    pub fn san(&self, b: &Board, promote: Option<PromoteKind>) -> Result<san::Move, ValidateError> {
        san::Move::from_move(*self, promote, b)
    }
}

impl fmt::Display for Move {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}{}", self.src, self.dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn sq(s: &str) -> Square {
        Square::from_str(s).unwrap()
    }

    #[test]
    fn test_validate() {
        let b = Board::initial();
        let mv = Move::from_squares(&b, sq("e2"), sq("e4")).unwrap();
        assert_eq!(mv.to_string(), "e2e4");
        assert_eq!(mv.validate(&b), Ok(()));
        assert!(mv.is_legal(&b));

        let mv = Move::from_squares(&b, sq("e2"), sq("e5")).unwrap();
        assert_eq!(mv.validate(&b), Err(ValidateError::NotPseudoLegal));

        assert_eq!(Move::from_squares(&b, sq("e4"), sq("e5")), None);

        let id = b.id_at(sq("g1")).unwrap();
        let mv = Move::new(id, sq("b1"), sq("c3"));
        assert_eq!(mv.validate(&b), Err(ValidateError::NoPiece(id)));

        let b = Board::from_str("4k3/4r3/8/8/8/8/4R3/4K3").unwrap();
        let mv = Move::from_squares(&b, sq("e2"), sq("a2")).unwrap();
        assert_eq!(mv.validate(&b), Err(ValidateError::NotLegal));
    }
}
