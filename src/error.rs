//! Error and terminal-status types returned by the public API.
//!
//! Parsing failures and "this position cannot be reasoned about" failures are
//! kept separate so that callers can match on them instead of inspecting
//! strings: [`InvalidFen`] is a structural parse failure, [`IllegalReasonMask`]
//! names which semantic rule a structurally-valid FEN violates, and
//! [`MoveParseError`] distinguishes an unparsable move from an ambiguous one.

use std::fmt;

use bitflags::bitflags;

/// A FEN (or EPD) string that could not be parsed into a [`crate::chess::Position`].
///
/// Wraps the underlying [`anyhow::Error`] chain so that the original parse
/// context (which field, which character) is preserved in the `Display`
/// output and via [`std::error::Error::source`].
#[derive(Debug)]
pub struct InvalidFen(anyhow::Error);

impl From<anyhow::Error> for InvalidFen {
    fn from(err: anyhow::Error) -> Self {
        Self(err)
    }
}

impl fmt::Display for InvalidFen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid FEN: {}", self.0)
    }
}

impl std::error::Error for InvalidFen {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

bitflags! {
    /// Reasons a structurally-valid FEN fails to describe a position the
    /// engine can reason about. [`crate::chess::Position::is_legal`] returns the
    /// bitwise OR of every violated reason.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct IllegalReasonMask: u8 {
        /// A pawn sits on rank 1 or rank 8.
        const PAWN_ON_BACK_RANK = 1 << 0;
        /// Either side has a king count other than exactly one.
        const NOT_ONE_KING_EACH = 1 << 1;
        /// The side not to move is in check, i.e. the side to move could
        /// capture the opposing king on this turn.
        const CAN_TAKE_OPPOSING_KING = 1 << 2;
        /// White has more than 16 pieces and pawns combined.
        const WHITE_TOO_MANY_PIECES = 1 << 3;
        /// Black has more than 16 pieces and pawns combined.
        const BLACK_TOO_MANY_PIECES = 1 << 4;
        /// White has more than 8 pawns.
        const WHITE_TOO_MANY_PAWNS = 1 << 5;
        /// Black has more than 8 pawns.
        const BLACK_TOO_MANY_PAWNS = 1 << 6;
    }
}

impl fmt::Display for IllegalReasonMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::error::Error for IllegalReasonMask {}

/// Why a move could not be parsed from terse or algebraic text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveParseError {
    /// The text matches more than one legal move and disambiguation did not
    /// narrow it down to exactly one.
    Ambiguous,
    /// The text does not match any legal move in the current position.
    NoSuchMove,
    /// The text is not well-formed move notation at all.
    Malformed(String),
}

impl fmt::Display for MoveParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ambiguous => write!(f, "move text is ambiguous"),
            Self::NoSuchMove => write!(f, "no legal move matches the given text"),
            Self::Malformed(text) => write!(f, "malformed move text: {text}"),
        }
    }
}

impl std::error::Error for MoveParseError {}

/// The position is illegal because the side not to move is in check (i.e.
/// the purported last move left its own king in check). Returned by
/// [`crate::chess::Position::evaluate`] as a signal, not a panic: search code
/// routinely probes hypothetical moves and needs to recover from this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Illegal;

impl fmt::Display for Illegal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "position is illegal: side not to move is in check")
    }
}

impl std::error::Error for Illegal {}

/// Terminal classification of a position, from [`crate::chess::Position::evaluate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminal {
    /// The game continues: at least one legal move exists.
    Normal,
    /// White has delivered checkmate.
    WhiteCheckmate,
    /// Black has delivered checkmate.
    BlackCheckmate,
    /// White has no legal moves but is not in check.
    WhiteStalemate,
    /// Black has no legal moves but is not in check.
    BlackStalemate,
}

impl Terminal {
    /// Whether this classification ends the game.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Normal)
    }
}

/// The reason a draw can be claimed or is automatically in effect, from
/// [`crate::chess::Position::is_draw`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawKind {
    /// 100 or more halfmoves have elapsed since the last capture or pawn
    /// move.
    FiftyMoveRule,
    /// The same position (by the semantic equality rules in
    /// [`crate::chess::position`]) has occurred three or more times.
    ThreefoldRepetition,
    /// Neither side has enough material to deliver checkmate.
    InsufficientMaterial,
}
