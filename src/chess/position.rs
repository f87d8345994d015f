//! The position: board array, side to move, castling rights, en-passant
//! target, cached king squares, move counters, and the history/detail-stack
//! machinery that gives push/pop full undo without copying the position.

use std::fmt;

use anyhow::{bail, Context};
use arrayvec::ArrayVec;

use crate::chess::core::{
    make_piece, piece_kind, piece_owner, CastlingRights, File, Piece, PieceKind, Player, Rank, Square,
    BOARD_SIZE,
};
use crate::chess::movegen::{attacked_piece, attacked_square, pseudo_legal_moves};
use crate::chess::moves::{Move, MoveList, Special};
use crate::error::{DrawKind, Illegal, IllegalReasonMask, InvalidFen, Terminal};

/// Capacity of both [`Position`]'s history ring and detail stack. The
/// specification leaves this unmandated beyond "documented and enforced";
/// 256 matches the maximum plausible search depth in one line of play and
/// the maximum legal move count in any reachable position (218), so it
/// comfortably covers both "deep search" and "every move in a position" use.
/// Exceeding it is a precondition violation, not a recoverable error: like
/// the specification's own `push`/`pop`, it is a hot path and does not
/// defend against misuse.
pub const HISTORY_CAPACITY: usize = 256;

/// A legal move paired with the check/mate/stalemate status of the position
/// that results from playing it, as returned by
/// [`Position::gen_legal_moves_extended`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtendedMove {
    /// The legal move itself.
    pub mv: Move,
    /// Whether playing `mv` gives check.
    pub gives_check: bool,
    /// Whether playing `mv` delivers checkmate.
    pub is_mate: bool,
    /// Whether playing `mv` delivers stalemate.
    pub is_stalemate: bool,
}

/// The 32-bit "detail word" saved on every [`Position::push`] and restored on
/// every matching [`Position::pop`]: en-passant target (byte 0, 0xFF for
/// "none"), white king square (byte 1), black king square (byte 2), and the
/// four castling bits (byte 3).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct DetailWord(u32);

const NO_EN_PASSANT: u8 = 0xFF;

impl DetailWord {
    fn capture(
        en_passant: Option<Square>,
        king_squares: [Square; 2],
        castling_rights: CastlingRights,
    ) -> Self {
        let en_passant_byte = en_passant.map_or(NO_EN_PASSANT, |sq| sq as u8);
        Self(u32::from_le_bytes([
            en_passant_byte,
            king_squares[Player::White as usize] as u8,
            king_squares[Player::Black as usize] as u8,
            castling_rights.bits(),
        ]))
    }

    fn en_passant(self) -> Option<Square> {
        let byte = self.0.to_le_bytes()[0];
        (byte != NO_EN_PASSANT).then(|| Square::try_from(byte).expect("valid square byte"))
    }

    fn king_square(self, player: Player) -> Square {
        let byte = self.0.to_le_bytes()[1 + player as usize];
        Square::try_from(byte).expect("valid square byte")
    }

    fn castling_rights(self) -> CastlingRights {
        CastlingRights::from_bits_truncate(self.0.to_le_bytes()[3])
    }
}

/// Revocation mask per square: ANDing a move's `from` and `to` squares'
/// masks into the current rights implements the specification's rule in one
/// step, with no branching on piece type. Only the six squares that matter
/// (the two corners and the king's home square on each side) clear any
/// bits; every other square's mask is all-ones.
const fn castling_revocation_masks() -> [u8; BOARD_SIZE as usize] {
    let mut masks = [CastlingRights::all().bits(); BOARD_SIZE as usize];
    masks[Square::A1 as usize] &= !CastlingRights::WHITE_QUEENSIDE.bits();
    masks[Square::H1 as usize] &= !CastlingRights::WHITE_KINGSIDE.bits();
    masks[Square::E1 as usize] &=
        !(CastlingRights::WHITE_KINGSIDE.bits() | CastlingRights::WHITE_QUEENSIDE.bits());
    masks[Square::A8 as usize] &= !CastlingRights::BLACK_QUEENSIDE.bits();
    masks[Square::H8 as usize] &= !CastlingRights::BLACK_KINGSIDE.bits();
    masks[Square::E8 as usize] &=
        !(CastlingRights::BLACK_KINGSIDE.bits() | CastlingRights::BLACK_QUEENSIDE.bits());
    masks
}

const CASTLING_REVOCATION_MASKS: [u8; BOARD_SIZE as usize] = castling_revocation_masks();

/// A chess position: the current board plus everything needed to undo moves
/// played against it and to answer draw/terminal queries.
///
/// Cloning is cheap (no heap allocation beyond the two fixed-capacity
/// arrays) and is the specification's sanctioned way to run concurrent
/// searches: distinct clones share no state and need no synchronization.
#[derive(Clone)]
pub struct Position {
    board: [Piece; BOARD_SIZE as usize],
    side_to_move: Player,
    castling_rights: CastlingRights,
    en_passant: Option<Square>,
    king_squares: [Square; 2],
    halfmove_clock: u16,
    fullmove_number: u32,
    history: ArrayVec<Move, HISTORY_CAPACITY>,
    detail_stack: ArrayVec<DetailWord, HISTORY_CAPACITY>,
}

impl Position {
    /// The standard starting position.
    #[must_use]
    pub fn new_initial() -> Self {
        Self::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1")
            .expect("the standard starting FEN is always valid")
    }

    /// Parses a FEN (or EPD-style, with trailing fields defaulted) string.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidFen`] if the text is not well-formed FEN: an unknown
    /// piece character, a rank that doesn't sum to 8 files, a malformed
    /// castling or en-passant field, or a non-numeric counter.
    pub fn from_fen(fen: &str) -> Result<Self, InvalidFen> {
        Self::parse_fen(fen).map_err(InvalidFen::from)
    }

    fn parse_fen(fen: &str) -> anyhow::Result<Self> {
        let mut fields = fen.split_whitespace();
        let placement = fields.next().context("FEN is missing piece placement field")?;
        let side = fields.next().unwrap_or("w");
        let castling = fields.next().unwrap_or("KQkq");
        let en_passant = fields.next().unwrap_or("-");
        let halfmove_clock = fields.next().unwrap_or("0");
        let fullmove_number = fields.next().unwrap_or("1");

        let board = parse_placement(placement)?;
        let side_to_move = Player::try_from(side)?;
        let castling_rights = CastlingRights::from_fen(castling)?;
        let en_passant = match en_passant {
            "-" => None,
            square => Some(Square::try_from(square)?),
        };
        let halfmove_clock: u16 = halfmove_clock
            .parse()
            .context("halfmove clock is not a non-negative integer")?;
        let fullmove_number: u32 = fullmove_number
            .parse()
            .context("fullmove number is not a non-negative integer")?;

        let king_squares = cached_king_squares(&board);

        Ok(Self {
            board,
            side_to_move,
            castling_rights,
            en_passant,
            king_squares,
            halfmove_clock,
            fullmove_number,
            history: ArrayVec::new(),
            detail_stack: ArrayVec::new(),
        })
    }

    /// Serializes this position back to FEN text.
    #[must_use]
    pub fn to_fen(&self) -> String {
        let mut placement = String::with_capacity(71);
        for rank in Rank::all().into_iter().rev() {
            let mut empty_run = 0;
            for file in File::all() {
                let piece = self.board[Square::new(file, rank) as usize];
                if piece == ' ' {
                    empty_run += 1;
                } else {
                    if empty_run > 0 {
                        placement.push_str(&empty_run.to_string());
                        empty_run = 0;
                    }
                    placement.push(piece);
                }
            }
            if empty_run > 0 {
                placement.push_str(&empty_run.to_string());
            }
            if rank != Rank::One {
                placement.push('/');
            }
        }
        format!(
            "{placement} {side} {castling} {en_passant} {halfmove} {fullmove}",
            side = self.side_to_move,
            castling = self.castling_rights,
            en_passant = self
                .en_passant
                .map_or_else(|| "-".to_string(), |sq| sq.to_string()),
            halfmove = self.halfmove_clock,
            fullmove = self.fullmove_number,
        )
    }

    /// The piece on `square`, or `' '` if empty.
    #[must_use]
    pub fn piece_at(&self, square: Square) -> Piece {
        self.board[square as usize]
    }

    /// The side to move.
    #[must_use]
    pub const fn side_to_move(&self) -> Player {
        self.side_to_move
    }

    /// Current castling rights.
    #[must_use]
    pub const fn castling_rights(&self) -> CastlingRights {
        self.castling_rights
    }

    /// The en-passant target square, if the last move was a two-step pawn
    /// push.
    #[must_use]
    pub const fn en_passant_target(&self) -> Option<Square> {
        self.en_passant
    }

    /// Cached king square for `player`.
    #[must_use]
    pub const fn king_square(&self, player: Player) -> Square {
        self.king_squares[player as usize]
    }

    /// Half-move clock (for the 50-move rule).
    #[must_use]
    pub const fn halfmove_clock(&self) -> u16 {
        self.halfmove_clock
    }

    /// Full-move number, incremented after Black's move.
    #[must_use]
    pub const fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    /// Whether `square` is attacked by a piece belonging to `by`.
    #[must_use]
    pub fn attacked_square(&self, square: Square, by_white: bool) -> bool {
        let by = if by_white { Player::White } else { Player::Black };
        attacked_square(self, square, by)
    }

    /// Generates every pseudo-legal move: geometrically valid, but possibly
    /// leaving the mover's own king in check.
    #[must_use]
    pub fn gen_pseudo_legal_moves(&self) -> MoveList {
        pseudo_legal_moves(self)
    }

    /// Generates every legal move from this position.
    #[must_use]
    pub fn gen_legal_moves(&mut self) -> MoveList {
        let mut legal = MoveList::new();
        for mv in pseudo_legal_moves(self) {
            self.push(mv);
            let mover_king = self.king_square(!self.side_to_move);
            if !attacked_piece(self, mover_king) {
                legal.push(mv);
            }
            self.pop(mv);
        }
        legal
    }

    /// Generates every legal move along with whether it gives check, mate,
    /// or stalemate.
    #[must_use]
    pub fn gen_legal_moves_extended(&mut self) -> Vec<ExtendedMove> {
        let candidates = self.gen_legal_moves();
        let mut extended = Vec::with_capacity(candidates.len());
        for mv in candidates {
            self.push(mv);
            let opponent_king = self.king_square(self.side_to_move);
            let gives_check = attacked_piece(self, opponent_king);
            let replies = self.gen_legal_moves();
            let is_mate = replies.is_empty() && gives_check;
            let is_stalemate = replies.is_empty() && !gives_check;
            self.pop(mv);
            extended.push(ExtendedMove {
                mv,
                gives_check,
                is_mate,
                is_stalemate,
            });
        }
        extended
    }

    /// Applies `m`, mutating the board and saving enough state on the
    /// detail stack that a matching [`Self::pop`] fully reverses it.
    ///
    /// `m` must be a pseudo-legal move generated from (or parsed against)
    /// this exact position; passing any other move is a precondition
    /// violation with unspecified results, matching the specification's
    /// `PushMove`. Also panics if the detail stack is already at
    /// [`HISTORY_CAPACITY`].
    pub fn push(&mut self, m: Move) {
        self.detail_stack.push(DetailWord::capture(
            self.en_passant,
            self.king_squares,
            self.castling_rights,
        ));

        let mask_from = CASTLING_REVOCATION_MASKS[m.from() as usize];
        let mask_to = CASTLING_REVOCATION_MASKS[m.to() as usize];
        self.castling_rights =
            CastlingRights::from_bits_truncate(self.castling_rights.bits() & mask_from & mask_to);
        self.en_passant = None;

        let side = self.side_to_move;
        match m.special() {
            Special::None => self.relocate(m.from(), m.to()),
            Special::KingMove => {
                self.relocate(m.from(), m.to());
                self.king_squares[side as usize] = m.to();
            }
            Special::WhitePawnDoublePush | Special::BlackPawnDoublePush => {
                self.relocate(m.from(), m.to());
                let skipped_rank_delta = if m.special() == Special::WhitePawnDoublePush { -1 } else { 1 };
                self.en_passant = m.to().offset(0, skipped_rank_delta);
            }
            Special::WhiteEnPassant | Special::BlackEnPassant => {
                self.relocate(m.from(), m.to());
                let captured_square = Square::new(m.to().file(), m.from().rank());
                self.board[captured_square as usize] = ' ';
            }
            special if special.is_castle() => {
                self.relocate(m.from(), m.to());
                self.king_squares[side as usize] = m.to();
                let (rook_from, rook_to) = castling_rook_squares(special);
                self.relocate(rook_from, rook_to);
            }
            special => {
                let kind = special
                    .promotion_kind()
                    .expect("every remaining special tag is a promotion");
                self.board[m.from() as usize] = ' ';
                self.board[m.to() as usize] = make_piece(kind, side);
            }
        }

        self.side_to_move = !self.side_to_move;
    }

    /// Reverses the effect of `m`, which must be the same move most recently
    /// pushed without an intervening pop.
    pub fn pop(&mut self, m: Move) {
        self.side_to_move = !self.side_to_move;
        let side = self.side_to_move;

        match m.special() {
            Special::None | Special::KingMove => self.unrelocate(m.from(), m.to(), m.capture()),
            Special::WhitePawnDoublePush | Special::BlackPawnDoublePush => {
                self.unrelocate(m.from(), m.to(), ' ');
            }
            Special::WhiteEnPassant | Special::BlackEnPassant => {
                self.relocate(m.to(), m.from());
                let captured_square = Square::new(m.to().file(), m.from().rank());
                self.board[captured_square as usize] = m.capture();
            }
            special if special.is_castle() => {
                self.relocate(m.to(), m.from());
                let (rook_from, rook_to) = castling_rook_squares(special);
                self.relocate(rook_to, rook_from);
            }
            _ => {
                self.board[m.from() as usize] = make_piece(PieceKind::Pawn, side);
                self.board[m.to() as usize] = m.capture();
            }
        }

        let detail = self.detail_stack.pop().expect("pop without matching push");
        self.en_passant = detail.en_passant();
        self.king_squares = [detail.king_square(Player::White), detail.king_square(Player::Black)];
        self.castling_rights = detail.castling_rights();
    }

    /// Moves the piece on `from` to `to`, leaving `from` empty. Used for
    /// every non-promotion relocation; the destination's previous occupant
    /// (if any) is simply overwritten, matching `push`'s reliance on `m`'s
    /// packed `capture` field for undo.
    fn relocate(&mut self, from: Square, to: Square) {
        self.board[to as usize] = self.board[from as usize];
        self.board[from as usize] = ' ';
    }

    /// Reverses [`Self::relocate`]: moves the mover (currently on `to`) back
    /// to `from`, restoring `capture` (or `' '`) on `to`.
    fn unrelocate(&mut self, from: Square, to: Square, capture: char) {
        self.board[from as usize] = self.board[to as usize];
        self.board[to as usize] = capture;
    }

    /// Applies `m` as part of ongoing game play: records it in history,
    /// advances move counters, and then [`Self::push`]es it. Unlike `push`,
    /// this is not meant to be undone by search; use `push`/`pop` for
    /// speculative moves.
    ///
    /// # Panics
    ///
    /// Panics if the history ring is already at [`HISTORY_CAPACITY`].
    pub fn play(&mut self, m: Move) {
        self.history.push(m);
        if self.side_to_move == Player::Black {
            self.fullmove_number += 1;
        }
        if m.is_capture() || piece_kind(self.piece_at(m.from())) == Some(PieceKind::Pawn) {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }
        self.push(m);
    }

    /// Classifies the position: illegal (opponent king attacked), normal, or
    /// one of the four mate/stalemate terminals.
    ///
    /// # Errors
    ///
    /// Returns [`Illegal`] if the side not to move is in check, meaning the
    /// purported last move left its own king exposed.
    pub fn evaluate(&mut self) -> Result<Terminal, Illegal> {
        let opponent_king = self.king_square(!self.side_to_move);
        if attacked_piece(self, opponent_king) {
            return Err(Illegal);
        }
        let own_king_attacked = attacked_piece(self, self.king_square(self.side_to_move));
        let has_legal_move = pseudo_legal_moves(self).into_iter().any(|mv| {
            self.push(mv);
            let still_in_check = attacked_piece(self, self.king_square(!self.side_to_move));
            self.pop(mv);
            !still_in_check
        });
        if has_legal_move {
            return Ok(Terminal::Normal);
        }
        Ok(match (self.side_to_move, own_king_attacked) {
            (Player::White, true) => Terminal::WhiteCheckmate,
            (Player::Black, true) => Terminal::BlackCheckmate,
            (Player::White, false) => Terminal::WhiteStalemate,
            (Player::Black, false) => Terminal::BlackStalemate,
        })
    }

    /// Whether a draw can be claimed (or is automatically in effect), and
    /// why. `white_asks` only matters for the asker-specific half of the
    /// insufficient-material rule.
    #[must_use]
    pub fn is_draw(&self, white_asks: bool) -> Option<DrawKind> {
        if self.halfmove_clock >= 100 {
            return Some(DrawKind::FiftyMoveRule);
        }
        if self.has_insufficient_material(white_asks) {
            return Some(DrawKind::InsufficientMaterial);
        }
        if self.repetition_count() >= 3 {
            return Some(DrawKind::ThreefoldRepetition);
        }
        None
    }

    fn has_insufficient_material(&self, white_asks: bool) -> bool {
        let mut white_minor = 0u32;
        let mut black_minor = 0u32;
        for &piece in &self.board {
            match piece_kind(piece) {
                None | Some(PieceKind::King) => {}
                Some(PieceKind::Bishop | PieceKind::Knight) => match piece_owner(piece) {
                    Some(Player::White) => white_minor += 1,
                    Some(Player::Black) => black_minor += 1,
                    None => unreachable!(),
                },
                Some(_) => return false,
            }
        }
        if white_minor + black_minor <= 1 {
            return true;
        }
        let lone_side_minor = if white_asks { black_minor } else { white_minor };
        let lone_side_other = if white_asks { white_minor } else { black_minor };
        lone_side_minor == 0 && lone_side_other == 0
    }

    /// Counts how many times the current position has occurred, walking the
    /// history ring backward and undoing moves with [`Self::pop`]. Uses the
    /// specification's semantic (not bitwise) equality: a castling-right
    /// difference only counts if the right is still actionable given the
    /// board, and an en-passant-target difference only counts if an enemy
    /// pawn could actually exploit it. Stops at the first pawn move or
    /// capture, since repetition cannot cross one. Includes the current
    /// position itself in the count.
    fn repetition_count(&self) -> usize {
        let reference = self.repetition_key();
        let mut scratch = self.clone();
        let mut count = 1;
        while let Some(mv) = scratch.history.last().copied() {
            // `mv` is still applied here (undone below), so the moved piece
            // sits on `to()`, not `from()`; a promotion's mover was a pawn
            // even though `to()` now holds the promoted piece.
            let moved_pawn = mv.promotion().is_some()
                || piece_kind(scratch.piece_at(mv.to())) == Some(PieceKind::Pawn);
            if mv.is_capture() || moved_pawn {
                break;
            }
            let _ = scratch.history.pop();
            scratch.pop(mv);
            if scratch.repetition_key() == reference {
                count += 1;
            }
        }
        count
    }

    /// The observable features used by repetition comparison: piece
    /// placement, side to move, and the "effective" castling rights and
    /// en-passant target (see [`Self::repetition_count`]).
    fn repetition_key(&self) -> RepetitionKey {
        RepetitionKey {
            board: self.board,
            side_to_move: self.side_to_move,
            effective_castling: self.effective_castling_rights(),
            effective_en_passant: self.effective_en_passant(),
        }
    }

    fn effective_castling_rights(&self) -> CastlingRights {
        let mut effective = CastlingRights::empty();
        let checks = [
            (CastlingRights::WHITE_KINGSIDE, Square::E1, Square::H1, 'K', 'R'),
            (CastlingRights::WHITE_QUEENSIDE, Square::E1, Square::A1, 'K', 'R'),
            (CastlingRights::BLACK_KINGSIDE, Square::E8, Square::H8, 'k', 'r'),
            (CastlingRights::BLACK_QUEENSIDE, Square::E8, Square::A8, 'k', 'r'),
        ];
        for (flag, king_home, rook_home, king_char, rook_char) in checks {
            if self.castling_rights.contains(flag)
                && self.piece_at(king_home) == king_char
                && self.piece_at(rook_home) == rook_char
            {
                effective |= flag;
            }
        }
        effective
    }

    fn effective_en_passant(&self) -> Option<Square> {
        let target = self.en_passant?;
        let capturing_pawn = make_piece(PieceKind::Pawn, self.side_to_move);
        let capture_rank_delta: i8 = match self.side_to_move {
            Player::White => -1,
            Player::Black => 1,
        };
        let exploitable = [-1, 1].into_iter().any(|df| {
            target
                .offset(df, capture_rank_delta)
                .is_some_and(|sq| self.piece_at(sq) == capturing_pawn)
        });
        exploitable.then_some(target)
    }

    /// Checks the specification's structural legality conditions, returning
    /// the bitwise OR of every one violated.
    ///
    /// # Errors
    ///
    /// Returns the violated reasons as an [`IllegalReasonMask`]; a fully
    /// legal position returns `Ok`.
    pub fn is_legal(&self) -> Result<(), IllegalReasonMask> {
        let mut reasons = IllegalReasonMask::empty();

        let mut white_pieces = 0u32;
        let mut black_pieces = 0u32;
        let mut white_pawns = 0u32;
        let mut black_pawns = 0u32;
        let mut white_kings = 0u32;
        let mut black_kings = 0u32;
        for square in Square::iter() {
            let piece = self.piece_at(square);
            let Some(owner) = piece_owner(piece) else {
                continue;
            };
            let kind = piece_kind(piece).expect("owned square holds a recognized piece");
            match owner {
                Player::White => white_pieces += 1,
                Player::Black => black_pieces += 1,
            }
            if kind == PieceKind::Pawn {
                match owner {
                    Player::White => white_pawns += 1,
                    Player::Black => black_pawns += 1,
                }
                if matches!(square.rank(), Rank::One | Rank::Eight) {
                    reasons |= IllegalReasonMask::PAWN_ON_BACK_RANK;
                }
            }
            if kind == PieceKind::King {
                match owner {
                    Player::White => white_kings += 1,
                    Player::Black => black_kings += 1,
                }
            }
        }

        if white_kings != 1 || black_kings != 1 {
            reasons |= IllegalReasonMask::NOT_ONE_KING_EACH;
        }
        if attacked_piece(self, self.king_square(!self.side_to_move)) {
            reasons |= IllegalReasonMask::CAN_TAKE_OPPOSING_KING;
        }
        if white_pieces > 16 {
            reasons |= IllegalReasonMask::WHITE_TOO_MANY_PIECES;
        }
        if black_pieces > 16 {
            reasons |= IllegalReasonMask::BLACK_TOO_MANY_PIECES;
        }
        if white_pawns > 8 {
            reasons |= IllegalReasonMask::WHITE_TOO_MANY_PAWNS;
        }
        if black_pawns > 8 {
            reasons |= IllegalReasonMask::BLACK_TOO_MANY_PAWNS;
        }

        if reasons.is_empty() {
            Ok(())
        } else {
            Err(reasons)
        }
    }
}

#[derive(PartialEq, Eq)]
struct RepetitionKey {
    board: [Piece; BOARD_SIZE as usize],
    side_to_move: Player,
    effective_castling: CastlingRights,
    effective_en_passant: Option<Square>,
}

const fn castling_rook_squares(special: Special) -> (Square, Square) {
    match special {
        Special::WhiteKingsideCastle => (Square::H1, Square::F1),
        Special::WhiteQueensideCastle => (Square::A1, Square::D1),
        Special::BlackKingsideCastle => (Square::H8, Square::F8),
        Special::BlackQueensideCastle => (Square::A8, Square::D8),
        _ => unreachable!("castling_rook_squares called with a non-castle special tag"),
    }
}

fn parse_placement(placement: &str) -> anyhow::Result<[Piece; BOARD_SIZE as usize]> {
    let mut board = [' '; BOARD_SIZE as usize];
    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        bail!("expected 8 ranks separated by '/', got {}", ranks.len());
    }
    for (rank_index, rank_text) in ranks.iter().enumerate() {
        let rank = Rank::try_from(7 - rank_index as u8)?;
        let mut file_index = 0u8;
        for ch in rank_text.chars() {
            if let Some(skip) = ch.to_digit(10) {
                file_index += skip as u8;
            } else if piece_kind(ch).is_some() {
                if file_index >= 8 {
                    bail!("rank {rank} has more than 8 files of content");
                }
                let file = File::try_from(file_index)?;
                board[Square::new(file, rank) as usize] = ch;
                file_index += 1;
            } else {
                bail!("unknown piece character '{ch}' in placement field");
            }
        }
        if file_index != 8 {
            bail!("rank {rank} does not sum to 8 files, got {file_index}");
        }
    }
    Ok(board)
}

/// Caches a square per king color for O(1) lookup. A FEN with zero or
/// several kings of a color is structurally parseable (see
/// [`Position::is_legal`], which is the tool that reports that defect); this
/// falls back to [`Square::A1`] for a missing king and keeps the first
/// found among duplicates, since no operation that trusts the cache is
/// meaningful to call until `is_legal` confirms exactly one of each.
fn cached_king_squares(board: &[Piece; BOARD_SIZE as usize]) -> [Square; 2] {
    let mut white_king = None;
    let mut black_king = None;
    for square in Square::iter() {
        match board[square as usize] {
            'K' => {
                let _ = white_king.get_or_insert(square);
            }
            'k' => {
                let _ = black_king.get_or_insert(square);
            }
            _ => {}
        }
    }
    [
        white_king.unwrap_or(Square::A1),
        black_king.unwrap_or(Square::A1),
    ]
}

impl PartialEq for Position {
    /// Position equality per the specification: ignores move counters, but
    /// includes board, side to move, castling rights, and en-passant
    /// target. Use [`Self::repetition_count`]'s semantic notion instead when
    /// "moot" castling/en-passant differences should also compare equal.
    fn eq(&self, other: &Self) -> bool {
        self.board == other.board
            && self.side_to_move == other.side_to_move
            && self.castling_rights == other.castling_rights
            && self.en_passant == other.en_passant
    }
}

impl fmt::Display for Position {
    /// Eight lines, each a row of piece characters separated by spaces,
    /// rank 8 at top.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in Rank::all().into_iter().rev() {
            for (index, file) in File::all().into_iter().enumerate() {
                if index > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{}", self.board[Square::new(file, rank) as usize])?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Position").field("fen", &self.to_fen()).finish()
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn initial_position_fen_roundtrips() {
        let fen = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
        assert_eq!(Position::from_fen(fen).unwrap().to_fen(), fen);
    }

    #[test]
    fn initial_position_has_twenty_legal_moves() {
        let mut position = Position::new_initial();
        assert_eq!(position.gen_legal_moves().len(), 20);
    }

    #[test]
    fn push_pop_is_bitwise_identity() {
        let mut position = Position::new_initial();
        let before_board = position.board;
        let before_side = position.side_to_move;
        let before_castling = position.castling_rights;
        let before_en_passant = position.en_passant;
        let before_kings = position.king_squares;
        let before_detail_len = position.detail_stack.len();

        let moves = position.gen_pseudo_legal_moves();
        for mv in moves {
            position.push(mv);
            position.pop(mv);
            assert_eq!(position.board, before_board);
            assert_eq!(position.side_to_move, before_side);
            assert_eq!(position.castling_rights, before_castling);
            assert_eq!(position.en_passant, before_en_passant);
            assert_eq!(position.king_squares, before_kings);
            assert_eq!(position.detail_stack.len(), before_detail_len);
        }
    }

    #[test]
    fn foolsmate_is_checkmate() {
        let mut position = Position::new_initial();
        for terse in ["g2g4", "e7e5", "f2f4", "d8h4"] {
            let mv = crate::chess::notation::parse_terse(&mut position, terse).unwrap();
            position.play(mv);
        }
        assert_eq!(position.evaluate().unwrap(), Terminal::BlackCheckmate);
        assert!(position.gen_legal_moves().is_empty());
    }

    #[test]
    fn mate_in_one_is_flagged_in_extended_move_list() {
        let mut position =
            Position::from_fen("7Q/2Rp4/2pN4/p2rp3/P2N4/B1k5/2PpRb2/3K2n1 w - - 0 1").unwrap();
        let extended = position.gen_legal_moves_extended();
        assert_eq!(extended.iter().filter(|m| m.is_mate).count(), 1);
    }

    #[test]
    fn castling_rights_revoked_by_rook_leaving_corner() {
        let mut position = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let mv = crate::chess::notation::parse_terse(&mut position, "h1h2").unwrap();
        position.push(mv);
        assert_eq!(position.castling_rights.to_string(), "Qkq");
    }

    #[test]
    fn threefold_repetition_is_detected() {
        let mut position = Position::new_initial();
        for terse in ["g1f3", "g8f6", "f3g1", "f6g8", "g1f3", "g8f6", "f3g1", "f6g8"] {
            let mv = crate::chess::notation::parse_terse(&mut position, terse).unwrap();
            position.play(mv);
        }
        assert_eq!(position.is_draw(true), Some(DrawKind::ThreefoldRepetition));
    }

    #[test]
    fn repetition_count_after_four_plies_is_two() {
        let mut position = Position::new_initial();
        for terse in ["g1f3", "g8f6", "f3g1", "f6g8"] {
            let mv = crate::chess::notation::parse_terse(&mut position, terse).unwrap();
            position.play(mv);
        }
        assert_eq!(position.repetition_count(), 2);
    }

    #[test]
    fn repetition_count_does_not_cross_a_quiet_pawn_push() {
        let mut position = Position::new_initial();
        for terse in [
            "g1f3", "g8f6", "f3g1", "f6g8", "a2a3", "g1f3", "g8f6", "f3g1", "f6g8",
        ] {
            let mv = crate::chess::notation::parse_terse(&mut position, terse).unwrap();
            position.play(mv);
        }
        assert_eq!(position.repetition_count(), 1);
    }

    #[test]
    fn lone_kings_is_insufficient_material() {
        let position = Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        assert_eq!(position.is_draw(true), Some(DrawKind::InsufficientMaterial));
    }

    #[test]
    fn illegal_position_reports_opposing_king_in_check() {
        let position = Position::from_fen("4k3/8/8/8/8/8/4R3/4K3 w - - 0 1").unwrap();
        assert_eq!(
            position.is_legal(),
            Err(IllegalReasonMask::CAN_TAKE_OPPOSING_KING)
        );
    }
}
