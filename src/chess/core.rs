//! Board primitives commonly used within [`crate::chess`].
//!
//! Square numbering follows FEN reading order directly: `A8` is 0, `H8` is 7,
//! `A1` is 56 and `H1` is 63. Rank 8 is read first and files run left to
//! right, which is exactly how piece placement appears in a FEN string --
//! this is what lets [`crate::chess::position::Position`] keep the board
//! array and FEN text in lockstep.

use std::{fmt, mem};

use anyhow::bail;
use bitflags::bitflags;

#[allow(missing_docs)]
pub const BOARD_WIDTH: u8 = 8;
#[allow(missing_docs)]
pub const BOARD_SIZE: u8 = BOARD_WIDTH * BOARD_WIDTH;

/// A column of the chessboard. In chess notation, it is represented with a
/// lowercase letter.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum File {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
}

impl File {
    #[allow(missing_docs)]
    #[must_use]
    pub const fn all() -> [Self; 8] {
        [
            Self::A,
            Self::B,
            Self::C,
            Self::D,
            Self::E,
            Self::F,
            Self::G,
            Self::H,
        ]
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", (b'a' + *self as u8) as char)
    }
}

impl TryFrom<char> for File {
    type Error = anyhow::Error;

    fn try_from(file: char) -> anyhow::Result<Self> {
        match file {
            'a'..='h' => Ok(unsafe { mem::transmute::<u8, Self>(file as u8 - b'a') }),
            _ => bail!("unknown file: expected within 'a'..='h', got '{file}'"),
        }
    }
}

impl TryFrom<u8> for File {
    type Error = anyhow::Error;

    fn try_from(column: u8) -> anyhow::Result<Self> {
        match column {
            0..=7 => Ok(unsafe { mem::transmute::<u8, Self>(column) }),
            _ => bail!("unknown file: expected within 0..BOARD_WIDTH, got {column}"),
        }
    }
}

/// A row of the chessboard. Represented with a digit in chess notation. The
/// implementation is zero-based: rank 1 is `0`.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum Rank {
    One,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
}

impl Rank {
    #[allow(missing_docs)]
    #[must_use]
    pub const fn all() -> [Self; 8] {
        [
            Self::One,
            Self::Two,
            Self::Three,
            Self::Four,
            Self::Five,
            Self::Six,
            Self::Seven,
            Self::Eight,
        ]
    }

    /// The rank on which a player's pawns start the game.
    #[must_use]
    pub const fn pawns_starting(player: Player) -> Self {
        match player {
            Player::White => Self::Two,
            Player::Black => Self::Seven,
        }
    }

    /// The rank on which a player's king and rooks start the game.
    #[must_use]
    pub const fn backrank(player: Player) -> Self {
        match player {
            Player::White => Self::One,
            Player::Black => Self::Eight,
        }
    }
}

impl TryFrom<char> for Rank {
    type Error = anyhow::Error;

    fn try_from(rank: char) -> anyhow::Result<Self> {
        match rank {
            '1'..='8' => Ok(unsafe { mem::transmute::<u8, Self>(rank as u8 - b'1') }),
            _ => bail!("unknown rank: expected within '1'..='8', got '{rank}'"),
        }
    }
}

impl TryFrom<u8> for Rank {
    type Error = anyhow::Error;

    fn try_from(row: u8) -> anyhow::Result<Self> {
        match row {
            0..=7 => Ok(unsafe { mem::transmute::<u8, Self>(row) }),
            _ => bail!("unknown rank: expected within 0..BOARD_WIDTH, got {row}"),
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as u8 + 1)
    }
}

/// Board squares, numbered in FEN reading order: rank 8 first, files a to h.
///
/// ```
/// use mailbox_chess::chess::Square;
///
/// assert_eq!(Square::A8 as u8, 0);
/// assert_eq!(Square::H8 as u8, 7);
/// assert_eq!(Square::A1 as u8, 56);
/// assert_eq!(Square::H1 as u8, 63);
/// ```
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[rustfmt::skip]
#[allow(missing_docs)]
pub enum Square {
    A8, B8, C8, D8, E8, F8, G8, H8,
    A7, B7, C7, D7, E7, F7, G7, H7,
    A6, B6, C6, D6, E6, F6, G6, H6,
    A5, B5, C5, D5, E5, F5, G5, H5,
    A4, B4, C4, D4, E4, F4, G4, H4,
    A3, B3, C3, D3, E3, F3, G3, H3,
    A2, B2, C2, D2, E2, F2, G2, H2,
    A1, B1, C1, D1, E1, F1, G1, H1,
}

impl Square {
    /// Connects file (column) and rank (row) to form a full square.
    #[must_use]
    pub const fn new(file: File, rank: Rank) -> Self {
        unsafe { mem::transmute((7 - rank as u8) * BOARD_WIDTH + file as u8) }
    }

    /// Returns file (column) on which the square is located.
    #[must_use]
    pub const fn file(self) -> File {
        unsafe { mem::transmute(self as u8 % BOARD_WIDTH) }
    }

    /// Returns rank (row) on which the square is located.
    #[must_use]
    pub const fn rank(self) -> Rank {
        unsafe { mem::transmute(7 - self as u8 / BOARD_WIDTH) }
    }

    /// Offsets the square by `(delta_file, delta_rank)`, returning `None` if
    /// the result would fall off the board.
    #[must_use]
    pub fn offset(self, delta_file: i8, delta_rank: i8) -> Option<Self> {
        let file = self.file() as i8 + delta_file;
        let rank = self.rank() as i8 + delta_rank;
        if !(0..8).contains(&file) || !(0..8).contains(&rank) {
            return None;
        }
        Some(Self::new(
            File::try_from(file as u8).ok()?,
            Rank::try_from(rank as u8).ok()?,
        ))
    }

    /// Iterates over all 64 squares in FEN reading order.
    pub fn iter() -> impl Iterator<Item = Self> {
        (0..BOARD_SIZE).map(|index| unsafe { mem::transmute::<u8, Self>(index) })
    }
}

impl TryFrom<u8> for Square {
    type Error = anyhow::Error;

    /// Creates a square given its position on the board.
    ///
    /// # Errors
    ///
    /// If given square index is outside 0..[`BOARD_SIZE`] range.
    fn try_from(square_index: u8) -> anyhow::Result<Self> {
        const MAX_INDEX: u8 = BOARD_SIZE - 1;
        match square_index {
            0..=MAX_INDEX => Ok(unsafe { mem::transmute::<u8, Self>(square_index) }),
            _ => bail!("unknown square index: needs to be in 0..BOARD_SIZE, got {square_index}"),
        }
    }
}

impl TryFrom<&str> for Square {
    type Error = anyhow::Error;

    fn try_from(square: &str) -> anyhow::Result<Self> {
        let bytes = square.as_bytes();
        if bytes.len() != 2 {
            bail!(
                "unknown square: should be two-char, got {square} with {} chars",
                bytes.len()
            );
        }
        let (file, rank) = (bytes[0] as char, bytes[1] as char);
        Ok(Self::new(file.try_into()?, rank.try_into()?))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file(), self.rank())
    }
}

/// A standard game of chess is played between two players: White (having the
/// advantage of the first turn) and Black.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Player {
    White,
    Black,
}

impl std::ops::Not for Player {
    type Output = Self;

    fn not(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }
}

impl TryFrom<&str> for Player {
    type Error = anyhow::Error;

    fn try_from(player: &str) -> anyhow::Result<Self> {
        match player {
            "w" => Ok(Self::White),
            "b" => Ok(Self::Black),
            _ => bail!("unknown player: expected 'w' or 'b', got '{player}'"),
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::White => 'w',
                Self::Black => 'b',
            }
        )
    }
}

/// Standard [chess pieces], independent of color.
///
/// [chess pieces]: https://en.wikipedia.org/wiki/Chess_piece
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Hash)]
#[allow(missing_docs)]
pub enum PieceKind {
    King,
    Queen,
    Rook,
    Bishop,
    Knight,
    Pawn,
}

impl PieceKind {
    /// Uppercase algebraic letter used in SAN, e.g. `N` for a knight. Returns
    /// `None` for pawns, which SAN omits.
    #[must_use]
    pub const fn san_letter(self) -> Option<char> {
        match self {
            Self::King => Some('K'),
            Self::Queen => Some('Q'),
            Self::Rook => Some('R'),
            Self::Bishop => Some('B'),
            Self::Knight => Some('N'),
            Self::Pawn => None,
        }
    }
}

/// A single board square's contents: a chess piece character from
/// `{K,Q,R,B,N,P,k,q,r,b,n,p}`, upper for White and lower for Black. There is
/// no separate piece type: the character *is* the representation, which is
/// what makes the board array directly printable and FEN emission nearly
/// free. This alias only ever names an occupied square; an empty square is
/// `' '` wherever [`crate::chess::position::Position`]'s board array holds
/// one.
pub type Piece = char;

/// Which player owns `piece`, or `None` if the character is not a piece.
#[must_use]
pub fn piece_owner(piece: Piece) -> Option<Player> {
    if piece.is_ascii_uppercase() {
        Some(Player::White)
    } else if piece.is_ascii_lowercase() {
        Some(Player::Black)
    } else {
        None
    }
}

/// Which kind of piece `piece` is, or `None` if the character is not a piece.
#[must_use]
pub fn piece_kind(piece: Piece) -> Option<PieceKind> {
    match piece.to_ascii_uppercase() {
        'K' => Some(PieceKind::King),
        'Q' => Some(PieceKind::Queen),
        'R' => Some(PieceKind::Rook),
        'B' => Some(PieceKind::Bishop),
        'N' => Some(PieceKind::Knight),
        'P' => Some(PieceKind::Pawn),
        _ => None,
    }
}

/// Builds the piece character for `kind` owned by `owner`.
#[must_use]
pub const fn make_piece(kind: PieceKind, owner: Player) -> Piece {
    let upper = match kind {
        PieceKind::King => 'K',
        PieceKind::Queen => 'Q',
        PieceKind::Rook => 'R',
        PieceKind::Bishop => 'B',
        PieceKind::Knight => 'N',
        PieceKind::Pawn => 'P',
    };
    match owner {
        Player::White => upper,
        Player::Black => upper.to_ascii_lowercase(),
    }
}

bitflags! {
    /// The four independent castling flags. A set flag means "this castling
    /// was not permanently revoked by a king or corresponding rook move", not
    /// that castling is currently playable -- that additionally requires the
    /// king and rook to occupy their initial squares and the king's path to
    /// be unattacked (see [`crate::chess::movegen`]).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CastlingRights: u8 {
        /// White kingside (`K`).
        const WHITE_KINGSIDE = 1 << 0;
        /// White queenside (`Q`).
        const WHITE_QUEENSIDE = 1 << 1;
        /// Black kingside (`k`).
        const BLACK_KINGSIDE = 1 << 2;
        /// Black queenside (`q`).
        const BLACK_QUEENSIDE = 1 << 3;
    }
}

impl CastlingRights {
    /// Parses the FEN castling field (`KQkq`, any subset, or `-`).
    pub fn from_fen(field: &str) -> anyhow::Result<Self> {
        if field == "-" {
            return Ok(Self::empty());
        }
        let mut rights = Self::empty();
        for letter in field.chars() {
            rights |= match letter {
                'K' => Self::WHITE_KINGSIDE,
                'Q' => Self::WHITE_QUEENSIDE,
                'k' => Self::BLACK_KINGSIDE,
                'q' => Self::BLACK_QUEENSIDE,
                _ => bail!("unknown castling right: '{letter}'"),
            };
        }
        Ok(rights)
    }
}

impl fmt::Display for CastlingRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "-");
        }
        for (flag, letter) in [
            (Self::WHITE_KINGSIDE, 'K'),
            (Self::WHITE_QUEENSIDE, 'Q'),
            (Self::BLACK_KINGSIDE, 'k'),
            (Self::BLACK_QUEENSIDE, 'q'),
        ] {
            if self.contains(flag) {
                write!(f, "{letter}")?;
            }
        }
        Ok(())
    }
}

/// Directions a piece can move in, from White's perspective. "North" means
/// towards higher ranks (Black's home rank).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    /// The four directions a bishop slides along.
    pub(crate) const DIAGONALS: [Self; 4] =
        [Self::NorthEast, Self::SouthEast, Self::SouthWest, Self::NorthWest];
    /// The four directions a rook slides along.
    pub(crate) const ORTHOGONALS: [Self; 4] = [Self::North, Self::East, Self::South, Self::West];
    /// All eight directions, the ones a queen or king can move along.
    pub(crate) const ALL: [Self; 8] = [
        Self::North,
        Self::NorthEast,
        Self::East,
        Self::SouthEast,
        Self::South,
        Self::SouthWest,
        Self::West,
        Self::NorthWest,
    ];

    pub(crate) const fn delta(self) -> (i8, i8) {
        match self {
            Self::North => (0, 1),
            Self::NorthEast => (1, 1),
            Self::East => (1, 0),
            Self::SouthEast => (1, -1),
            Self::South => (0, -1),
            Self::SouthWest => (-1, -1),
            Self::West => (-1, 0),
            Self::NorthWest => (-1, 1),
        }
    }
}
