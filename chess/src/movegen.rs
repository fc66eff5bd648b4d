//! Move validation and move generation

use crate::board::{Board, PieceId};
use crate::moves::Move;
use crate::square_set::SquareSet;
use crate::types::{Color, PieceKind, Square};
use crate::{between, geometry, legal};

use std::convert::Infallible;
use std::ops::{Deref, DerefMut};
use std::slice;

#[inline]
fn is_path_clear(b: &Board, path: SquareSet) -> bool {
    (path & b.occupied()).is_empty()
}

fn is_pawn_move_valid(b: &Board, color: Color, src: Square, dst: Square) -> bool {
    let fwd = geometry::pawn_forward(color);
    let (dr, dc) = (dst.row() - src.row(), dst.col() - src.col());
    match (dr, dc.abs()) {
        (r, 0) if r == fwd => b.is_free(dst),
        (r, 0) if r == 2 * fwd => {
            src.row() == geometry::pawn_start_row(color, b.size())
                && b.is_free(src.offset(fwd, 0))
                && b.is_free(dst)
        }
        (r, 1) if r == fwd => b.piece_at(dst).is_some_and(|p| p.color != color),
        _ => false,
    }
}

/// Returns `true` if the piece `id` may go to `dst` according to its movement rules
///
/// Whether the move leaves the mover's own king under attack is not considered here, see
/// [`legal::is_fully_legal()`] for that.
///
/// # Panics
///
/// Panics if there is no piece with id `id` on the board.
pub fn is_pseudo_legal(b: &Board, id: PieceId, dst: Square) -> bool {
    let piece = b.get(id);
    if !b.size().contains(dst) {
        return false;
    }
    if b.piece_at(dst).is_some_and(|p| p.color == piece.color) {
        return false;
    }

    let src = piece.square;
    let (dr, dc) = ((dst.row() - src.row()).abs(), (dst.col() - src.col()).abs());
    match piece.kind {
        PieceKind::Pawn => is_pawn_move_valid(b, piece.color, src, dst),
        PieceKind::Knight => (dr, dc) == (1, 2) || (dr, dc) == (2, 1),
        PieceKind::King => dr <= 1 && dc <= 1,
        PieceKind::Rook => between::rook_strict(src, dst).is_some_and(|p| is_path_clear(b, p)),
        PieceKind::Bishop => between::bishop_strict(src, dst).is_some_and(|p| is_path_clear(b, p)),
        PieceKind::Queen => between::between(src, dst).is_some_and(|p| is_path_clear(b, p)),
    }
}

/// Returns all the squares where the piece `id` may go, ignoring checks
pub fn pseudo_legal_targets(b: &Board, id: PieceId) -> SquareSet {
    b.size()
        .squares()
        .filter(|&dst| is_pseudo_legal(b, id, dst))
        .collect()
}

/// Returns all the squares where the piece `id` may legally go
pub fn legal_targets(b: &Board, id: PieceId) -> SquareSet {
    b.size()
        .squares()
        .filter(|&dst| legal::is_fully_legal(b, id, dst))
        .collect()
}

trait MaybeMovePush {
    type Err;

    fn push(&mut self, m: Move) -> Result<(), Self::Err>;
}

/// List of moves
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct MoveList(Vec<Move>);

impl Deref for MoveList {
    type Target = Vec<Move>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for MoveList {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for MoveList {
    type Item = Move;
    type IntoIter = std::vec::IntoIter<Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl MoveList {
    pub fn new() -> MoveList {
        MoveList(Vec::new())
    }
}

/// Sink for generated moves
pub trait MovePush {
    fn push(&mut self, m: Move);
}

impl MovePush for MoveList {
    fn push(&mut self, m: Move) {
        self.0.push(m);
    }
}

impl MovePush for Vec<Move> {
    fn push(&mut self, m: Move) {
        self.push(m);
    }
}

impl<T: MovePush> MaybeMovePush for T {
    type Err = Infallible;

    fn push(&mut self, m: Move) -> Result<(), Self::Err> {
        <Self as MovePush>::push(self, m);
        Ok(())
    }
}

struct LegalFilter<'a, P> {
    board: &'a Board,
    inner: &'a mut P,
}

impl<'a, P: MaybeMovePush> LegalFilter<'a, P> {
    fn new(board: &'a Board, inner: &'a mut P) -> Self {
        Self { board, inner }
    }
}

impl<'a, P: MaybeMovePush> MaybeMovePush for LegalFilter<'a, P> {
    type Err = P::Err;

    fn push(&mut self, mv: Move) -> Result<(), Self::Err> {
        match legal::is_safe_after(self.board, mv.id(), mv.dst()) {
            true => self.inner.push(mv),
            false => Ok(()),
        }
    }
}

struct MoveGenImpl<'a, P> {
    board: &'a Board,
    dst: &'a mut P,
    side: Color,
}

impl<'a, P: MaybeMovePush> MoveGenImpl<'a, P> {
    fn new(board: &'a Board, dst: &'a mut P, side: Color) -> Self {
        Self { board, dst, side }
    }

    fn gen_piece(&mut self, id: PieceId) -> Result<(), P::Err> {
        let src = self.board.get(id).square;
        for dst in self.board.size().squares() {
            if is_pseudo_legal(self.board, id, dst) {
                self.dst.push(Move::new(id, src, dst))?;
            }
        }
        Ok(())
    }

    fn gen_all(&mut self) -> Result<(), P::Err> {
        let board = self.board;
        for (id, _) in board.iter_color(self.side) {
            self.gen_piece(id)?;
        }
        Ok(())
    }

    fn gen_to(&mut self, kind: PieceKind, dst: Square) -> Result<(), P::Err> {
        let board = self.board;
        for (id, p) in board.iter_color(self.side) {
            if p.kind == kind && is_pseudo_legal(board, id, dst) {
                self.dst.push(Move::new(id, p.square, dst))?;
            }
        }
        Ok(())
    }
}

/// Generates all the pseudo-legal moves of side `c` into `dst`
///
/// Moves are produced in slot order of the pieces, and in row-major order of the destination
/// squares for each piece.
pub fn pseudo_legal_moves_into<P: MovePush>(b: &Board, c: Color, dst: &mut P) {
    let _ = MoveGenImpl::new(b, dst, c).gen_all();
}

/// Returns all the pseudo-legal moves of side `c`
pub fn pseudo_legal_moves(b: &Board, c: Color) -> MoveList {
    let mut res = MoveList::new();
    pseudo_legal_moves_into(b, c, &mut res);
    res
}

/// Generates all the legal moves of side `c` into `dst`
///
/// The order is the same as in [`pseudo_legal_moves_into()`].
pub fn all_legal_moves_into<P: MovePush>(b: &Board, c: Color, dst: &mut P) {
    let mut p = LegalFilter::new(b, dst);
    let _ = MoveGenImpl::new(b, &mut p, c).gen_all();
}

/// Returns all the legal moves of side `c`
///
/// # Example
///
/// ```
/// # use arbiter::{movegen, Board, Color};
/// #
/// let b = Board::initial();
/// assert_eq!(movegen::all_legal_moves(&b, Color::White).len(), 20);
/// ```
pub fn all_legal_moves(b: &Board, c: Color) -> MoveList {
    let mut res = MoveList::new();
    all_legal_moves_into(b, c, &mut res);
    res
}

struct ErrOnFirst;

impl MaybeMovePush for ErrOnFirst {
    type Err = ();

    fn push(&mut self, _mv: Move) -> Result<(), ()> {
        Err(())
    }
}

/// Returns `true` if side `c` has at least one legal move
///
/// Stops on the first legal move found, without building the move list.
pub fn has_any_legal_move(b: &Board, c: Color) -> bool {
    let mut err_on_first = ErrOnFirst;
    let mut p = LegalFilter::new(b, &mut err_on_first);
    MoveGenImpl::new(b, &mut p, c).gen_all().is_err()
}

/// Generates the legal moves of pieces of kind `kind` and color `c` which go to `dst`
pub(crate) fn san_candidates<P: MovePush>(
    b: &Board,
    kind: PieceKind,
    c: Color,
    dst: Square,
    res: &mut P,
) {
    let mut p = LegalFilter::new(b, res);
    let _ = MoveGenImpl::new(b, &mut p, c).gen_to(kind, dst);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Piece;
    use crate::types::BoardSize;
    use std::str::FromStr;

    fn sq(s: &str) -> Square {
        Square::from_str(s).unwrap()
    }

    fn targets(items: &[&str]) -> SquareSet {
        items.iter().map(|s| sq(s)).collect()
    }

    #[test]
    fn test_off_board_and_own_pieces() {
        let b = Board::initial();
        for (id, p) in b.iter() {
            assert!(!is_pseudo_legal(&b, id, Square::new(p.square.row(), 8)));
            assert!(!is_pseudo_legal(&b, id, Square::new(-1, p.square.col())));
            for (_, other) in b.iter_color(p.color) {
                assert!(!is_pseudo_legal(&b, id, other.square));
            }
        }
    }

    #[test]
    fn test_queen_blocked() {
        let b = Board::initial();
        let queen = b.id_at(sq("d1")).unwrap();
        assert!(!is_pseudo_legal(&b, queen, sq("d8")));
        assert_eq!(pseudo_legal_targets(&b, queen), SquareSet::EMPTY);
    }

    #[test]
    fn test_sliders() {
        let b = Board::from_str("4k3/8/8/3p4/8/1P6/8/R2QK2B").unwrap();
        let rook = b.id_at(sq("a1")).unwrap();
        assert_eq!(
            pseudo_legal_targets(&b, rook),
            targets(&["b1", "c1", "a2", "a3", "a4", "a5", "a6", "a7", "a8"])
        );

        let queen = b.id_at(sq("d1")).unwrap();
        assert!(is_pseudo_legal(&b, queen, sq("d5")));
        assert!(!is_pseudo_legal(&b, queen, sq("d6")));
        assert!(is_pseudo_legal(&b, queen, sq("h5")));
        assert!(!is_pseudo_legal(&b, queen, sq("a4")));
        assert!(!is_pseudo_legal(&b, queen, sq("e3")));

        let bishop = b.id_at(sq("h1")).unwrap();
        assert!(is_pseudo_legal(&b, bishop, sq("d5")));
        assert!(!is_pseudo_legal(&b, bishop, sq("c6")));
        assert!(!is_pseudo_legal(&b, bishop, sq("h2")));
    }

    #[test]
    fn test_knight_jumps() {
        let b = Board::initial();
        let knight = b.id_at(sq("g1")).unwrap();
        assert_eq!(pseudo_legal_targets(&b, knight), targets(&["f3", "h3"]));

        let b = Board::from_str("4k3/8/8/8/3p4/2ppp3/2pNp3/2ppp1K1").unwrap();
        let knight = b.id_at(sq("d2")).unwrap();
        assert_eq!(
            pseudo_legal_targets(&b, knight),
            targets(&["b1", "f1", "b3", "f3", "c4", "e4"])
        );
    }

    #[test]
    fn test_pawns() {
        let b = Board::from_str("4k3/8/8/8/8/2n5/3P3p/4K3").unwrap();
        let pawn = b.id_at(sq("d2")).unwrap();
        assert_eq!(pseudo_legal_targets(&b, pawn), targets(&["c3", "d3", "d4"]));

        // black pawn on h2 goes down and has no enemy piece to take
        let pawn = b.id_at(sq("h2")).unwrap();
        assert_eq!(pseudo_legal_targets(&b, pawn), targets(&["h1"]));

        let b = Board::from_str("4k3/8/8/8/8/3n4/3P4/4K3").unwrap();
        let pawn = b.id_at(sq("d2")).unwrap();
        assert_eq!(pseudo_legal_targets(&b, pawn), SquareSet::EMPTY);

        let b = Board::from_str("4k3/8/8/8/3n4/8/3P4/4K3").unwrap();
        let pawn = b.id_at(sq("d2")).unwrap();
        assert_eq!(pseudo_legal_targets(&b, pawn), targets(&["d3"]));

        let b = Board::from_str("4k3/8/8/8/8/3P4/8/4K3").unwrap();
        let pawn = b.id_at(sq("d3")).unwrap();
        assert_eq!(pseudo_legal_targets(&b, pawn), targets(&["d4"]));
    }

    #[test]
    fn test_pawn_diagonal_needs_enemy() {
        let b = Board::from_str("4k3/8/8/8/8/8/3P4/4K3").unwrap();
        let pawn = b.id_at(sq("d2")).unwrap();
        assert!(!is_pseudo_legal(&b, pawn, sq("c3")));
        assert!(!is_pseudo_legal(&b, pawn, sq("e3")));
        assert!(!is_pseudo_legal(&b, pawn, sq("d1")));
    }

    #[test]
    fn test_king() {
        let b = Board::from_str("4k3/8/8/8/8/8/3P4/4K3").unwrap();
        let king = b.id_at(sq("e1")).unwrap();
        assert_eq!(pseudo_legal_targets(&b, king), targets(&["d1", "f1", "e2", "f2"]));
        assert!(!is_pseudo_legal(&b, king, sq("g1")));
        assert!(!is_pseudo_legal(&b, king, sq("e1")));
    }

    #[test]
    fn test_initial_moves() {
        let b = Board::initial();
        let moves = all_legal_moves(&b, Color::White);
        assert_eq!(moves.len(), 20);
        assert_eq!(pseudo_legal_moves(&b, Color::Black).len(), 20);
        assert!(has_any_legal_move(&b, Color::White));

        let first = moves[0];
        assert_eq!(first.src(), sq("a2"));
        assert_eq!(first.dst(), sq("a3"));
        assert_eq!(b.get(first.id()).kind, PieceKind::Pawn);

        let strs: Vec<_> = moves.iter().map(|m| m.to_string()).collect();
        assert!(strs.contains(&"g1f3".to_string()));
        assert!(strs.contains(&"e2e4".to_string()));
        assert_eq!(all_legal_moves(&b, Color::White), moves);
    }

    #[test]
    fn test_legal_filter() {
        let b = Board::from_str("4r1k1/8/8/8/8/8/4B3/4K3").unwrap();
        let bishop = b.id_at(sq("e2")).unwrap();
        assert!(is_pseudo_legal(&b, bishop, sq("d3")));
        assert_eq!(legal_targets(&b, bishop), SquareSet::EMPTY);

        let king = b.id_at(sq("e1")).unwrap();
        assert_eq!(legal_targets(&b, king), targets(&["d1", "f1", "d2", "f2"]));
        assert_eq!(all_legal_moves(&b, Color::White).len(), 4);
    }

    #[test]
    fn test_small_board() {
        let size = BoardSize::new(4).unwrap();
        let mut b = Board::empty(size);
        let rook = b
            .place(Piece::new(PieceKind::Rook, Color::White, sq("a1")))
            .unwrap();
        assert_eq!(pseudo_legal_targets(&b, rook).len(), 6);
        assert!(!is_pseudo_legal(&b, rook, sq("a5")));
        assert!(!is_pseudo_legal(&b, rook, sq("e1")));
    }
}
