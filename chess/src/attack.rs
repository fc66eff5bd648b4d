//! Attack detection

use crate::board::{Board, Piece, PieceId};
use crate::square_set::SquareSet;
use crate::types::{BoardSize, Color, PieceKind, Square};
use crate::{geometry, movegen};

/// Returns the squares attacked by a pawn of color `color` standing on `sq`
///
/// These are the squares one step diagonally forward, whether occupied or not.
pub fn pawn(color: Color, sq: Square, size: BoardSize) -> SquareSet {
    let fwd = geometry::pawn_forward(color);
    [sq.offset(fwd, -1), sq.offset(fwd, 1)]
        .into_iter()
        .filter(|&s| size.contains(s))
        .collect()
}

fn piece_attacks(b: &Board, id: PieceId, piece: &Piece, target: Square) -> bool {
    match piece.kind {
        PieceKind::Pawn => pawn(piece.color, piece.square, b.size()).has(target),
        _ => movegen::is_pseudo_legal(b, id, target),
    }
}

/// Returns `true` if square `target` is attacked by any piece of color `by`
///
/// Pawns attack the squares diagonally in front of them even if those squares are empty. Other
/// pieces attack exactly the squares they could move to, so a square occupied by a piece of
/// color `by` is never attacked by `by`'s non-pawn pieces.
pub fn is_square_attacked(b: &Board, target: Square, by: Color) -> bool {
    if !b.size().contains(target) {
        return false;
    }
    b.iter_color(by).any(|(id, p)| piece_attacks(b, id, p, target))
}

/// Returns the squares of all the pieces of color `by` which attack `target`
pub fn square_attackers(b: &Board, target: Square, by: Color) -> SquareSet {
    if !b.size().contains(target) {
        return SquareSet::EMPTY;
    }
    b.iter_color(by)
        .filter(|(id, p)| piece_attacks(b, *id, p, target))
        .map(|(_, p)| p.square)
        .collect()
}

/// Returns `true` if the king of color `c` is under attack
///
/// If there is no king of color `c` on the board, returns `false`.
pub fn is_king_in_check(b: &Board, c: Color) -> bool {
    match b.king_pos(c) {
        Some(king) => is_square_attacked(b, king, c.inv()),
        None => false,
    }
}
