//! Turn handling
//!
//! The state of the game besides the board is a single [`Turn`] value. It is passed into
//! [`make_move()`] and [`promote()`] together with the board, and the next value comes back in
//! the returned [`Step`].

use crate::board::{Board, PieceId};
use crate::moves::san::{self, Facts};
use crate::types::{Color, Outcome, PieceKind, PromoteKind, Square};
use crate::{attack, geometry, legal, movegen};

use thiserror::Error;
use tracing::{debug, trace};

/// Pawn which reached the last rank and waits for promotion
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Pending {
    /// Pawn id
    pub id: PieceId,
    /// Square the pawn came from
    pub src: Square,
    /// Whether the pawn captured a piece on its way to the last rank
    pub capture: bool,
}

/// Whose turn it is and what is expected from them
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Turn {
    /// The given side has to make a move
    Move(Color),
    /// The given side has to choose a piece for its pawn on the last rank
    Promote { side: Color, pending: Pending },
    /// The game is finished
    Over(Outcome),
}

impl Turn {
    /// Returns the turn for the position `b` with `side` to move
    ///
    /// If `side` has no legal moves, the game is already over.
    pub fn start(b: &Board, side: Color) -> Turn {
        Turn::after(classify(b, side), side)
    }

    /// Returns the turn for `side` to move, given the already classified `outcome`
    pub(crate) fn after(outcome: Outcome, side: Color) -> Turn {
        match outcome.is_over() {
            true => Turn::Over(outcome),
            false => Turn::Move(side),
        }
    }

    /// Returns the side which has to act, or `None` if the game is over
    #[inline]
    pub fn side(&self) -> Option<Color> {
        match *self {
            Turn::Move(side) | Turn::Promote { side, .. } => Some(side),
            Turn::Over(_) => None,
        }
    }

    #[inline]
    pub fn is_over(&self) -> bool {
        matches!(*self, Turn::Over(_))
    }

    #[inline]
    pub fn pending(&self) -> Option<Pending> {
        match *self {
            Turn::Promote { pending, .. } => Some(pending),
            _ => None,
        }
    }
}

/// Result of a successful call to [`make_move()`] or [`promote()`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Step {
    /// A pawn reached the last rank, the turn stays with the same side until it is promoted
    Promoting { turn: Turn },
    /// The move is complete
    Done {
        /// Next turn
        turn: Turn,
        /// Position of the opponent after the move
        outcome: Outcome,
        /// The move in SAN
        san: String,
    },
}

impl Step {
    #[inline]
    pub fn turn(&self) -> Turn {
        match *self {
            Step::Promoting { turn } | Step::Done { turn, .. } => turn,
        }
    }

    #[inline]
    pub fn san(&self) -> Option<&str> {
        match self {
            Step::Promoting { .. } => None,
            Step::Done { san, .. } => Some(san),
        }
    }
}

/// Error making a move
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum MoveError {
    /// The game is already finished
    #[error("game is over: {0}")]
    GameOver(Outcome),
    /// A pawn waits for promotion
    #[error("promotion is pending")]
    PromotionPending,
    /// No piece on the source square
    #[error("no piece on {0}")]
    NoPiece(Square),
    /// The piece on the source square belongs to the other side
    #[error("piece on {0} doesn't belong to the side to move")]
    WrongSide(Square),
    /// The move is not legal
    #[error("move from {src} to {dst} is illegal")]
    Illegal { src: Square, dst: Square },
}

/// Error promoting a pawn
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum PromoteError {
    /// There is no pawn waiting for promotion
    #[error("no promotion is pending")]
    NotPending,
}

/// Classifies the position for `side`, which is to move
///
/// # Example
///
/// ```
/// # use arbiter::{game, Board, Color, Outcome};
/// #
/// let b: Board = "6k1/8/8/8/8/8/5nPP/6RK".parse().unwrap();
/// assert_eq!(game::classify(&b, Color::White), Outcome::Checkmate { winner: Color::Black });
/// assert_eq!(game::classify(&Board::initial(), Color::White), Outcome::Ongoing);
/// ```
pub fn classify(b: &Board, side: Color) -> Outcome {
    let check = attack::is_king_in_check(b, side);
    let has_moves = movegen::has_any_legal_move(b, side);
    match (check, has_moves) {
        (false, true) => Outcome::Ongoing,
        (false, false) => Outcome::Stalemate,
        (true, true) => Outcome::Check(side),
        (true, false) => Outcome::Checkmate {
            winner: side.inv(),
        },
    }
}

fn finish(before: &Board, b: &Board, side: Color, mut facts: Facts) -> Step {
    let outcome = classify(b, side.inv());
    facts.check = outcome.is_check();
    facts.checkmate = matches!(outcome, Outcome::Checkmate { .. });
    let san = san::format(before, &facts);
    let turn = Turn::after(outcome, side.inv());
    debug!(%side, %san, %outcome, "move applied");
    if outcome.is_over() {
        debug!(result = outcome.result_str(), "game decided");
    }
    Step::Done { turn, outcome, san }
}

/// Makes the move from `src` to `dst` on the board `b`
///
/// On success, the captured piece (if any) is removed from `b` and the moving piece is put on
/// `dst`. If a pawn reaches the last rank, the move stops halfway: the turn stays with the same
/// side until [`promote()`] is called. On error, `b` is left unchanged.
pub fn make_move(b: &mut Board, turn: Turn, src: Square, dst: Square) -> Result<Step, MoveError> {
    let side = match turn {
        Turn::Move(side) => side,
        Turn::Promote { .. } => return Err(MoveError::PromotionPending),
        Turn::Over(outcome) => return Err(MoveError::GameOver(outcome)),
    };
    let id = b.id_at(src).ok_or(MoveError::NoPiece(src))?;
    let piece = *b.get(id);
    if piece.color != side {
        return Err(MoveError::WrongSide(src));
    }
    if !legal::is_fully_legal(b, id, dst) {
        trace!(%side, %src, %dst, "illegal move rejected");
        return Err(MoveError::Illegal { src, dst });
    }

    let before = b.clone();
    let captured = b.relocate(id, dst);
    let capture = captured.is_some();

    if piece.kind == PieceKind::Pawn && dst.row() == geometry::promote_row(side, b.size()) {
        debug!(%side, %src, %dst, "promotion pending");
        let pending = Pending { id, src, capture };
        return Ok(Step::Promoting {
            turn: Turn::Promote { side, pending },
        });
    }

    let facts = Facts {
        src,
        kind: piece.kind,
        color: side,
        dst,
        capture,
        promote: None,
        check: false,
        checkmate: false,
    };
    Ok(finish(&before, b, side, facts))
}

/// Replaces the pawn waiting for promotion with a piece of kind `kind`, and completes the move
pub fn promote(b: &mut Board, turn: Turn, kind: PromoteKind) -> Result<Step, PromoteError> {
    let (side, pending) = match turn {
        Turn::Promote { side, pending } => (side, pending),
        _ => return Err(PromoteError::NotPending),
    };
    b.replace_kind(pending.id, kind.into());
    let dst = b.get(pending.id).square;
    debug!(%side, %dst, promote = %kind.as_char(), "promotion resolved");

    let facts = Facts {
        src: pending.src,
        kind: PieceKind::Pawn,
        color: side,
        dst,
        capture: pending.capture,
        promote: Some(kind),
        check: false,
        checkmate: false,
    };
    // pawns are never disambiguated, so the current board can stand for the one before the move
    let b: &Board = b;
    Ok(finish(b, b, side, facts))
}
