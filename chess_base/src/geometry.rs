use crate::types::{BoardSize, Color};

pub const fn pawn_forward(c: Color) -> i8 {
    match c {
        Color::White => 1,
        Color::Black => -1,
    }
}

/// Row from which a pawn of color `c` may make a double step
pub const fn pawn_start_row(c: Color, size: BoardSize) -> i8 {
    match c {
        Color::White => 1,
        Color::Black => size.last() - 1,
    }
}

/// Row on which a pawn of color `c` gets promoted
pub const fn promote_row(c: Color, size: BoardSize) -> i8 {
    match c {
        Color::White => size.last(),
        Color::Black => 0,
    }
}

pub const fn back_row(c: Color, size: BoardSize) -> i8 {
    promote_row(c.inv(), size)
}
