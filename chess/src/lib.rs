//! Chess rules engine over a piece arena
//!
//! The crate answers the questions a chess front-end needs to ask: may this piece go there, is
//! this square attacked, is the king in check, does the side to move have any legal move left,
//! and how is a finished move written in SAN. The board is a small arena of pieces addressed by
//! stable ids, so checking a move is done on a cheap copy of the board.
//!
//! Castling, en passant and draws by repetition or by the fifty-move rule are not supported.
//!
//! # Example
//!
//! ```
//! use arbiter::{game, Board, Color, Outcome, Turn};
//!
//! let mut board = Board::initial();
//! let turn = Turn::start(&board, Color::White);
//! let step = game::make_move(
//!     &mut board,
//!     turn,
//!     "g1".parse().unwrap(),
//!     "f3".parse().unwrap(),
//! )
//! .unwrap();
//! assert_eq!(step.san(), Some("Nf3"));
//! assert_eq!(step.turn(), Turn::Move(Color::Black));
//! assert_eq!(game::classify(&board, Color::Black), Outcome::Ongoing);
//! ```

pub mod attack;
pub mod between;
pub mod board;
pub mod chain;
pub mod game;
pub mod legal;
pub mod movegen;
pub mod moves;

pub use arbiter_base::{geometry, square_set, types};

pub use board::{Board, Piece, PieceId};
pub use chain::Game;
pub use game::{Step, Turn};
pub use moves::Move;
pub use square_set::SquareSet;
pub use types::{BoardSize, Color, Outcome, PieceKind, PromoteKind, Square};
