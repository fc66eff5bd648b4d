use crate::board::{Board, PlacementParseError};
use crate::game::{self, MoveError, PromoteError, Step, Turn};
use crate::moves::{san, Move};
use crate::types::{Color, Outcome, PromoteKind, Square};

use std::fmt;

use thiserror::Error;

/// Error applying a move given in SAN
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SanPushError {
    #[error("cannot parse move: {0}")]
    Parse(#[from] san::ParseError),
    #[error("cannot make move: {0}")]
    Move(#[from] MoveError),
    #[error("cannot promote: {0}")]
    Promote(#[from] PromoteError),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("cannot apply SAN move #{}: {}", .pos + 1, .source)]
pub struct SanListError {
    pub pos: usize,
    pub source: SanPushError,
}

/// Move made in a [`Game`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Record {
    /// Side which made the move
    pub side: Color,
    /// The move itself
    pub mv: Move,
    /// Promotion, if any
    pub promote: Option<PromoteKind>,
    /// The move in SAN, or `None` while the promotion is pending
    pub san: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Undo {
    board: Board,
    turn: Turn,
    outcome: Outcome,
}

/// Sequence of moves starting from some position
///
/// Keeps the current board and [`Turn`] in sync and records every move in SAN.
///
/// # Example
///
/// ```
/// # use arbiter::{Game, Color, Outcome};
/// #
/// let mut game = Game::new_initial();
/// for mv in ["f3", "e5", "g4", "Qh4#"] {
///     game.push_san(mv).unwrap();
/// }
/// assert_eq!(game.outcome(), Outcome::Checkmate { winner: Color::Black });
/// assert_eq!(game.san_list().to_string(), "1. f3 e5 2. g4 Qh4# 0-1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    start: Board,
    start_side: Color,
    board: Board,
    turn: Turn,
    outcome: Outcome,
    stack: Vec<(Record, Undo)>,
}

impl Game {
    /// Starts a new game from the position `b` with `side` to move
    pub fn new(b: Board, side: Color) -> Self {
        let outcome = game::classify(&b, side);
        let turn = Turn::after(outcome, side);
        Game {
            start: b.clone(),
            start_side: side,
            board: b,
            turn,
            outcome,
            stack: Vec::new(),
        }
    }

    pub fn new_initial() -> Self {
        Self::new(Board::initial(), Color::White)
    }

    pub fn from_placement(s: &str, side: Color) -> Result<Self, PlacementParseError> {
        Ok(Self::new(s.parse()?, side))
    }

    pub fn from_san_list(b: Board, side: Color, san_list: &str) -> Result<Self, SanListError> {
        let mut res = Game::new(b, side);
        res.push_san_list(san_list)?;
        Ok(res)
    }

    pub fn start(&self) -> &Board {
        &self.start
    }

    pub fn start_side(&self) -> Color {
        self.start_side
    }

    pub fn last(&self) -> &Board {
        &self.board
    }

    pub fn turn(&self) -> Turn {
        self.turn
    }

    /// Returns the classification of the current position
    ///
    /// While a promotion is pending, this is still the outcome of the previous complete move.
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn is_finished(&self) -> bool {
        self.turn.is_over()
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> + '_ {
        self.stack.iter().map(|(r, _)| r)
    }

    pub fn get(&self, idx: usize) -> &Record {
        &self.stack[idx].0
    }

    fn finish_step(&mut self, step: &Step) {
        if let Step::Done { outcome, san, .. } = step {
            self.outcome = *outcome;
            if let Some((rec, _)) = self.stack.last_mut() {
                rec.san = Some(san.clone());
            }
        }
        self.turn = step.turn();
    }

    /// Makes the move from `src` to `dst`
    pub fn push(&mut self, src: Square, dst: Square) -> Result<Step, MoveError> {
        let undo = Undo {
            board: self.board.clone(),
            turn: self.turn,
            outcome: self.outcome,
        };
        let step = game::make_move(&mut self.board, self.turn, src, dst)?;
        let (side, id) = match (undo.turn.side(), undo.board.id_at(src)) {
            (Some(side), Some(id)) => (side, id),
            _ => unreachable!("make_move() accepted a move without a side or a piece"),
        };
        let rec = Record {
            side,
            mv: Move::new(id, src, dst),
            promote: None,
            san: None,
        };
        self.stack.push((rec, undo));
        self.finish_step(&step);
        Ok(step)
    }

    /// Promotes the pawn which waits for promotion
    pub fn promote(&mut self, kind: PromoteKind) -> Result<Step, PromoteError> {
        let step = game::promote(&mut self.board, self.turn, kind)?;
        if let Some((rec, _)) = self.stack.last_mut() {
            rec.promote = Some(kind);
        }
        self.finish_step(&step);
        Ok(step)
    }

    /// Makes the move given in SAN
    ///
    /// If the SAN contains a promotion, the pawn is promoted right away.
    pub fn push_san(&mut self, s: &str) -> Result<Step, SanPushError> {
        let side = match self.turn {
            Turn::Move(side) => side,
            Turn::Promote { .. } => return Err(MoveError::PromotionPending.into()),
            Turn::Over(outcome) => return Err(MoveError::GameOver(outcome).into()),
        };
        let (mv, promote) = san::parse_move(s, &self.board, side)?;
        let step = self.push(mv.src(), mv.dst())?;
        match (step, promote) {
            (Step::Promoting { .. }, Some(kind)) => Ok(self.promote(kind)?),
            (step, _) => Ok(step),
        }
    }

    /// Makes the moves from a whitespace-separated list of SAN moves
    ///
    /// Move numbers (`1.`, `12...`) and game result markers are skipped, so the output of
    /// [`Game::san_list()`] is accepted.
    pub fn push_san_list(&mut self, san_list: &str) -> Result<(), SanListError> {
        let tokens = san_list
            .split_ascii_whitespace()
            .filter(|t| !t.ends_with('.') && !matches!(*t, "1-0" | "0-1" | "1/2-1/2" | "*"));
        for (pos, token) in tokens.enumerate() {
            self.push_san(token)
                .map_err(|source| SanListError { pos, source })?;
        }
        Ok(())
    }

    /// Takes back the last move
    ///
    /// A move waiting for promotion is taken back as a whole.
    pub fn pop(&mut self) -> Option<Record> {
        let (rec, undo) = self.stack.pop()?;
        self.board = undo.board;
        self.turn = undo.turn;
        self.outcome = undo.outcome;
        Some(rec)
    }

    pub fn san_list(&self) -> SanList<'_> {
        self.san_list_with(NumberPolicy::Custom(1))
    }

    pub fn san_list_with(&self, policy: NumberPolicy) -> SanList<'_> {
        SanList {
            inner: self,
            policy,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum NumberPolicy {
    Omit,
    Custom(usize),
}

/// Wrapper to format the moves of a [`Game`] as a list of SAN moves
///
/// Moves are numbered as in PGN. If the game is finished, the result marker is appended. A move
/// still waiting for promotion is not written.
pub struct SanList<'a> {
    inner: &'a Game,
    policy: NumberPolicy,
}

impl<'a> fmt::Display for SanList<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        let mut first = true;
        let mut num = match self.policy {
            NumberPolicy::Omit => None,
            NumberPolicy::Custom(u) => Some(u),
        };

        for rec in self.inner.iter() {
            let san = match &rec.san {
                Some(san) => san,
                None => continue,
            };
            if !first {
                write!(f, " ")?;
            }
            if let Some(n) = num {
                match (rec.side, first) {
                    (Color::White, _) => write!(f, "{}. ", n)?,
                    (Color::Black, true) => write!(f, "{}... ", n)?,
                    (Color::Black, false) => {}
                }
                if rec.side == Color::Black {
                    num = Some(n + 1);
                }
            }
            write!(f, "{}", san)?;
            first = false;
        }

        if self.inner.is_finished() {
            if !first {
                write!(f, " ")?;
            }
            write!(f, "{}", self.inner.outcome.result_str())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PieceKind;
    use std::str::FromStr;

    fn sq(s: &str) -> Square {
        Square::from_str(s).unwrap()
    }

    #[test]
    fn test_push_pop() {
        let mut game = Game::new_initial();
        game.push(sq("e2"), sq("e4")).unwrap();
        game.push_san("e5").unwrap();
        game.push_san("Nf3").unwrap();
        assert_eq!(game.len(), 3);
        assert_eq!(game.turn(), Turn::Move(Color::Black));
        assert_eq!(
            game.last().as_placement(),
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R"
        );
        assert_eq!(game.get(2).san.as_deref(), Some("Nf3"));
        assert_eq!(game.get(1).side, Color::Black);

        let rec = game.pop().unwrap();
        assert_eq!(rec.mv.src(), sq("g1"));
        assert_eq!(rec.mv.dst(), sq("f3"));
        assert_eq!(game.turn(), Turn::Move(Color::White));
        assert_eq!(
            game.last().as_placement(),
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR"
        );
        assert_eq!(game.san_list().to_string(), "1. e4 e5");

        game.pop();
        game.pop();
        assert_eq!(game.pop(), None);
        assert_eq!(game.last(), &Board::initial());
        assert!(game.is_empty());
    }

    #[test]
    fn test_san_list() {
        let game = Game::from_san_list(
            Board::initial(),
            Color::White,
            "1. e4 e5 2. Nf3 Nc6 3. Bb5 a6",
        )
        .unwrap();
        assert_eq!(game.len(), 6);
        assert_eq!(
            game.san_list().to_string(),
            "1. e4 e5 2. Nf3 Nc6 3. Bb5 a6"
        );
        assert_eq!(
            game.san_list_with(NumberPolicy::Omit).to_string(),
            "e4 e5 Nf3 Nc6 Bb5 a6"
        );
        assert_eq!(
            game.san_list_with(NumberPolicy::Custom(10)).to_string(),
            "10. e4 e5 11. Nf3 Nc6 12. Bb5 a6"
        );

        let game = Game::from_san_list(Board::initial(), Color::White, "e4 e5 Ke3");
        assert_eq!(
            game.map(|_| ()),
            Err(SanListError {
                pos: 2,
                source: SanPushError::Parse(san::ParseError::Convert(
                    san::IntoMoveError::NotFound
                )),
            })
        );
    }

    #[test]
    fn test_black_starts() {
        let mut game = Game::from_placement("4k3/8/8/8/8/8/4p3/K7", Color::Black).unwrap();
        let step = game.push_san("e1=Q+").unwrap();
        assert_eq!(step.san(), Some("e1=Q+"));
        assert_eq!(game.get(0).promote, Some(PromoteKind::Queen));
        assert_eq!(game.outcome(), Outcome::Check(Color::White));
        game.push_san("Ka2").unwrap();
        assert_eq!(game.san_list().to_string(), "1... e1=Q+ 2. Ka2");
    }

    #[test]
    fn test_pending_promotion() {
        let mut game = Game::from_placement("7k/P7/8/8/8/8/8/K7", Color::White).unwrap();
        let step = game.push(sq("a7"), sq("a8")).unwrap();
        assert!(matches!(step, Step::Promoting { .. }));
        assert_eq!(game.san_list().to_string(), "");
        assert_eq!(
            game.push_san("Kh7"),
            Err(SanPushError::Move(MoveError::PromotionPending))
        );

        game.promote(PromoteKind::Rook).unwrap();
        assert_eq!(game.get(0).san.as_deref(), Some("a8=R+"));
        assert_eq!(
            game.last().piece_at(sq("a8")).map(|p| p.kind),
            Some(PieceKind::Rook)
        );

        game.pop();
        assert_eq!(game.turn(), Turn::Move(Color::White));
        assert_eq!(game.last().as_placement(), "7k/P7/8/8/8/8/8/K7");
    }

    #[test]
    fn test_finished() {
        let mut game =
            Game::from_san_list(Board::initial(), Color::White, "f3 e5 g4 Qh4#").unwrap();
        assert!(game.is_finished());
        assert_eq!(game.san_list().to_string(), "1. f3 e5 2. g4 Qh4# 0-1");
        assert_eq!(
            game.push_san("a3"),
            Err(SanPushError::Move(MoveError::GameOver(Outcome::Checkmate {
                winner: Color::Black
            })))
        );

        let game = Game::from_placement("7k/5Q2/6K1/8/8/8/8/8", Color::Black).unwrap();
        assert!(game.is_finished());
        assert_eq!(game.san_list().to_string(), "1/2-1/2");

        let copy = Game::from_san_list(
            Board::initial(),
            Color::White,
            "1. f3 e5 2. g4 Qh4# 0-1",
        )
        .unwrap();
        assert_eq!(copy.san_list().to_string(), "1. f3 e5 2. g4 Qh4# 0-1");
    }

    #[test]
    fn test_new_position() {
        for (placement, side, outcome) in [
            ("4r3/8/8/8/8/8/8/4K2k", Color::White, Outcome::Check(Color::White)),
            ("4r3/8/8/8/8/8/8/4K2k", Color::Black, Outcome::Ongoing),
            ("7k/5Q2/6K1/8/8/8/8/8", Color::Black, Outcome::Stalemate),
        ] {
            let game = Game::from_placement(placement, side).unwrap();
            assert_eq!(game.outcome(), outcome);
            assert_eq!(game.turn(), Turn::start(game.last(), side));
            assert_eq!(game.is_finished(), outcome.is_over());
        }
    }
}
