//! Full legality checks
//!
//! A move is legal if it is pseudo-legal and the mover's king is not under attack once the move
//! is made. The latter is checked on a copy of the board, the board passed in is never changed.

use crate::board::{Board, PieceId};
use crate::types::Square;
use crate::{attack, movegen};

/// Returns the board as it would be after the piece `id` goes to `dst`
///
/// Any piece standing on `dst` is captured. No rules are checked.
///
/// # Panics
///
/// Panics if there is no piece with id `id` on the board, or if `dst` is outside of the board.
pub fn simulate(b: &Board, id: PieceId, dst: Square) -> Board {
    let mut res = b.clone();
    res.relocate(id, dst);
    res
}

/// Checks that the mover's king is safe after the piece `id` goes to `dst`
///
/// The move is assumed to be pseudo-legal.
pub(crate) fn is_safe_after(b: &Board, id: PieceId, dst: Square) -> bool {
    let color = b.get(id).color;
    !attack::is_king_in_check(&simulate(b, id, dst), color)
}

/// Returns `true` if the piece `id` may go to `dst` without leaving its own king under attack
///
/// # Panics
///
/// Panics if there is no piece with id `id` on the board.
pub fn is_fully_legal(b: &Board, id: PieceId, dst: Square) -> bool {
    movegen::is_pseudo_legal(b, id, dst) && is_safe_after(b, id, dst)
}
