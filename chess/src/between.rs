use crate::square_set::SquareSet;
use crate::types::Square;

#[inline]
fn delta(src: Square, dst: Square) -> (i8, i8) {
    (dst.row() - src.row(), dst.col() - src.col())
}

#[inline]
pub fn is_bishop_valid(src: Square, dst: Square) -> bool {
    let (dr, dc) = delta(src, dst);
    dr != 0 && dr.abs() == dc.abs()
}

#[inline]
pub fn is_rook_valid(src: Square, dst: Square) -> bool {
    let (dr, dc) = delta(src, dst);
    (dr == 0) != (dc == 0)
}

fn walk(src: Square, dst: Square) -> SquareSet {
    let (dr, dc) = delta(src, dst);
    let (sr, sc) = (dr.signum(), dc.signum());
    let mut res = SquareSet::EMPTY;
    let mut cur = src.offset(sr, sc);
    while cur != dst {
        res.set(cur);
        cur = cur.offset(sr, sc);
    }
    res
}

/// Returns the squares strictly between `src` and `dst` if they lie on one diagonal
#[inline]
pub fn bishop_strict(src: Square, dst: Square) -> Option<SquareSet> {
    is_bishop_valid(src, dst).then(|| walk(src, dst))
}

/// Returns the squares strictly between `src` and `dst` if they lie on one rank or file
#[inline]
pub fn rook_strict(src: Square, dst: Square) -> Option<SquareSet> {
    is_rook_valid(src, dst).then(|| walk(src, dst))
}

/// Returns the squares strictly between `src` and `dst`
///
/// If the squares don't share a rank, a file or a diagonal, `None` is returned. Neighbouring
/// squares yield an empty set.
pub fn between(src: Square, dst: Square) -> Option<SquareSet> {
    rook_strict(src, dst).or_else(|| bishop_strict(src, dst))
}
