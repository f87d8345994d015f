//! Move text I/O: terse (`e2e4`, `e7e8q`) and algebraic/SAN (`Nf3`, `exd5+`,
//! `O-O`) parsing and printing.

use crate::chess::core::{piece_kind, Player, Rank, Square};
use crate::chess::moves::{Move, Special};
use crate::chess::position::Position;
use crate::error::MoveParseError;

/// Parses terse move text (`<from><to>[promo]`) against `position`'s
/// current legal moves.
///
/// # Errors
///
/// [`MoveParseError::Malformed`] if the text is not well-formed terse
/// notation; [`MoveParseError::NoSuchMove`] if it is well-formed but no
/// legal move matches.
pub fn parse_terse(position: &mut Position, text: &str) -> Result<Move, MoveParseError> {
    if !text.is_ascii() || (text.len() != 4 && text.len() != 5) {
        return Err(MoveParseError::Malformed(text.to_string()));
    }
    let from = Square::try_from(&text[0..2])
        .map_err(|_| MoveParseError::Malformed(text.to_string()))?;
    let to = Square::try_from(&text[2..4])
        .map_err(|_| MoveParseError::Malformed(text.to_string()))?;
    let promotion = match text.get(4..5) {
        Some(letter) => Some(promotion_kind_from_letter(
            letter.chars().next().expect("slice of length 1 has a char"),
        )
        .ok_or_else(|| MoveParseError::Malformed(text.to_string()))?),
        None => None,
    };

    position
        .gen_legal_moves()
        .into_iter()
        .find(|m| m.from() == from && m.to() == to && m.promotion() == promotion)
        .ok_or(MoveParseError::NoSuchMove)
}

/// Serializes `m` as terse move text.
#[must_use]
pub fn terse(m: Move) -> String {
    let promo = m
        .promotion()
        .map_or(String::new(), |kind| promotion_letter(kind).to_lowercase().to_string());
    format!("{}{}{}", m.from(), m.to(), promo)
}

/// Parses algebraic (SAN) move text against `position`'s current legal
/// moves, accepting the lenient forms the specification sanctions
/// (trailing `+`/`#`, an optional `x`).
///
/// # Errors
///
/// [`MoveParseError::Malformed`] if the text cannot be parsed as SAN at
/// all; [`MoveParseError::NoSuchMove`] if no legal move matches;
/// [`MoveParseError::Ambiguous`] if more than one does.
pub fn parse_algebraic(position: &mut Position, text: &str) -> Result<Move, MoveParseError> {
    let trimmed = text.trim_end_matches(['+', '#']);
    let side = position.side_to_move();

    if trimmed == "O-O" || trimmed == "0-0" {
        return find_castle(position, side, true);
    }
    if trimmed == "O-O-O" || trimmed == "0-0-0" {
        return find_castle(position, side, false);
    }

    let (body, promotion) = match trimmed.split_once('=') {
        Some((body, letter)) => {
            let kind = promotion_kind_from_letter(
                letter.chars().next().ok_or_else(|| MoveParseError::Malformed(text.to_string()))?,
            )
            .ok_or_else(|| MoveParseError::Malformed(text.to_string()))?;
            (body, Some(kind))
        }
        None => (trimmed, None),
    };

    let mut chars: Vec<char> = body.chars().collect();
    let wanted_kind = match chars.first() {
        Some(&c) if "KQRBN".contains(c) => {
            let kind = piece_kind_from_letter(c).expect("checked above");
            chars.remove(0);
            kind
        }
        _ => crate::chess::core::PieceKind::Pawn,
    };
    chars.retain(|&c| c != 'x');
    if chars.len() < 2 {
        return Err(MoveParseError::Malformed(text.to_string()));
    }
    let dest_chars: String = chars[chars.len() - 2..].iter().collect();
    let destination =
        Square::try_from(dest_chars.as_str()).map_err(|_| MoveParseError::Malformed(text.to_string()))?;
    let disambiguation = &chars[..chars.len() - 2];
    let disambig_file = disambiguation.iter().find_map(|&c| ('a'..='h').contains(&c).then_some(c));
    let disambig_rank = disambiguation.iter().find_map(|&c| ('1'..='8').contains(&c).then_some(c));

    let candidates: Vec<Move> = position
        .gen_legal_moves()
        .into_iter()
        .filter(|m| {
            m.to() == destination
                && m.promotion() == promotion
                && piece_kind(position.piece_at(m.from())) == Some(wanted_kind)
                && disambig_file.map_or(true, |file| m.from().file().to_string() == file.to_string())
                && disambig_rank.map_or(true, |rank| m.from().rank().to_string() == rank.to_string())
        })
        .collect();

    match candidates.as_slice() {
        [] => Err(MoveParseError::NoSuchMove),
        [single] => Ok(*single),
        _ => Err(MoveParseError::Ambiguous),
    }
}

fn find_castle(position: &mut Position, side: Player, kingside: bool) -> Result<Move, MoveParseError> {
    let wanted = match (side, kingside) {
        (Player::White, true) => Special::WhiteKingsideCastle,
        (Player::White, false) => Special::WhiteQueensideCastle,
        (Player::Black, true) => Special::BlackKingsideCastle,
        (Player::Black, false) => Special::BlackQueensideCastle,
    };
    position
        .gen_legal_moves()
        .into_iter()
        .find(|m| m.special() == wanted)
        .ok_or(MoveParseError::NoSuchMove)
}

/// Serializes `m`, played from `position`, as SAN text: piece letter,
/// minimal disambiguation, capture marker, destination, promotion and a
/// `+`/`#` suffix determined by probing the move.
#[must_use]
pub fn algebraic(position: &mut Position, m: Move) -> String {
    if m.special().is_castle() {
        let base = match m.special() {
            Special::WhiteKingsideCastle | Special::BlackKingsideCastle => "O-O",
            _ => "O-O-O",
        };
        return format!("{base}{}", check_or_mate_suffix(position, m));
    }

    let moved_kind =
        piece_kind(position.piece_at(m.from())).expect("move source holds the piece being moved");
    let letter = moved_kind.san_letter().map_or(String::new(), |c| c.to_string());

    let siblings: Vec<Move> = position
        .gen_legal_moves()
        .into_iter()
        .filter(|other| {
            *other != m
                && other.to() == m.to()
                && piece_kind(position.piece_at(other.from())) == Some(moved_kind)
        })
        .collect();
    let mut disambiguation = String::new();
    if !siblings.is_empty() {
        let file_unique = siblings.iter().all(|s| s.from().file() != m.from().file());
        let rank_unique = siblings.iter().all(|s| s.from().rank() != m.from().rank());
        if file_unique {
            disambiguation.push_str(&m.from().file().to_string());
        } else if rank_unique {
            disambiguation.push_str(&m.from().rank().to_string());
        } else {
            disambiguation.push_str(&m.from().to_string());
        }
    }
    if moved_kind == crate::chess::core::PieceKind::Pawn && m.is_capture() && disambiguation.is_empty() {
        disambiguation.push_str(&m.from().file().to_string());
    }

    let capture = if m.is_capture() { "x" } else { "" };
    let promotion = m
        .promotion()
        .map_or(String::new(), |kind| format!("={}", promotion_letter(kind)));

    format!(
        "{letter}{disambiguation}{capture}{dest}{promotion}{suffix}",
        dest = m.to(),
        suffix = check_or_mate_suffix(position, m),
    )
}

fn check_or_mate_suffix(position: &mut Position, m: Move) -> &'static str {
    position.push(m);
    let opponent_king = position.king_square(position.side_to_move());
    let gives_check = position.attacked_square(opponent_king, position.side_to_move() == Player::Black);
    let no_replies = position.gen_legal_moves().is_empty();
    position.pop(m);
    match (gives_check, no_replies) {
        (true, true) => "#",
        (true, false) => "+",
        _ => "",
    }
}

fn piece_kind_from_letter(letter: char) -> Option<crate::chess::core::PieceKind> {
    use crate::chess::core::PieceKind;
    match letter {
        'K' => Some(PieceKind::King),
        'Q' => Some(PieceKind::Queen),
        'R' => Some(PieceKind::Rook),
        'B' => Some(PieceKind::Bishop),
        'N' => Some(PieceKind::Knight),
        _ => None,
    }
}

fn promotion_kind_from_letter(letter: char) -> Option<crate::chess::core::PieceKind> {
    use crate::chess::core::PieceKind;
    match letter.to_ascii_lowercase() {
        'q' => Some(PieceKind::Queen),
        'r' => Some(PieceKind::Rook),
        'b' => Some(PieceKind::Bishop),
        'n' => Some(PieceKind::Knight),
        _ => None,
    }
}

fn promotion_letter(kind: crate::chess::core::PieceKind) -> char {
    kind.san_letter().expect("promotion kinds always have a SAN letter")
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn terse_roundtrips_for_every_legal_move() {
        let mut position = Position::new_initial();
        for mv in position.gen_legal_moves() {
            let text = terse(mv);
            assert_eq!(parse_terse(&mut position, &text).unwrap(), mv);
        }
    }

    #[test]
    fn algebraic_roundtrips_for_every_legal_move() {
        let mut position = Position::new_initial();
        for mv in position.gen_legal_moves() {
            let text = algebraic(&mut position, mv);
            assert_eq!(parse_algebraic(&mut position, &text).unwrap(), mv);
        }
    }

    #[test]
    fn knight_development_is_ng1f3() {
        let mut position = Position::new_initial();
        let mv = parse_terse(&mut position, "g1f3").unwrap();
        assert_eq!(algebraic(&mut position, mv), "Nf3");
    }

    #[test]
    fn pawn_capture_keeps_origin_file() {
        let mut position = Position::from_fen("rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 2")
            .unwrap();
        let mv = parse_terse(&mut position, "e4d5").unwrap();
        assert_eq!(algebraic(&mut position, mv), "exd5");
    }

    #[test]
    fn castling_parses_and_prints() {
        let mut position = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let mv = parse_algebraic(&mut position, "O-O").unwrap();
        assert_eq!(mv.special(), Special::WhiteKingsideCastle);
        assert_eq!(algebraic(&mut position, mv), "O-O");
    }

    #[test]
    fn malformed_terse_text_is_rejected() {
        let mut position = Position::new_initial();
        assert_eq!(
            parse_terse(&mut position, "z9z9"),
            Err(MoveParseError::Malformed("z9z9".to_string()))
        );
    }
}
