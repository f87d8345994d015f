//! Pseudo-legal move generation and attack detection.
//!
//! Table-driven for leaping pieces (see [`crate::chess::attacks`]); sliding
//! pieces walk rays directly against the board array, since a mailbox board
//! has no occupancy-indexed table to precompute a slide into.

use crate::chess::attacks::{king_targets, knight_targets, pawn_attack_targets};
use crate::chess::core::{make_piece, piece_kind, piece_owner, Direction, PieceKind, Player, Square};
use crate::chess::moves::{Move, MoveList, Special};
use crate::chess::position::Position;

/// Generates every pseudo-legal move available to the side to move: geometry
/// is respected, but a move may still leave its own king in check.
pub(crate) fn pseudo_legal_moves(position: &Position) -> MoveList {
    let mut moves = MoveList::new();
    let side = position.side_to_move();
    for square in Square::iter() {
        let piece = position.piece_at(square);
        if piece == ' ' || piece_owner(piece) != Some(side) {
            continue;
        }
        match piece_kind(piece).expect("occupied square holds a recognized piece character") {
            PieceKind::Pawn => generate_pawn_moves(position, square, side, &mut moves),
            PieceKind::Knight => {
                generate_stepping_moves(position, square, side, knight_targets(square), Special::None, &mut moves);
            }
            PieceKind::King => {
                generate_stepping_moves(position, square, side, king_targets(square), Special::KingMove, &mut moves);
                generate_castling_moves(position, square, side, &mut moves);
            }
            PieceKind::Bishop => {
                generate_sliding_moves(position, square, side, &Direction::DIAGONALS, &mut moves);
            }
            PieceKind::Rook => {
                generate_sliding_moves(position, square, side, &Direction::ORTHOGONALS, &mut moves);
            }
            PieceKind::Queen => {
                generate_sliding_moves(position, square, side, &Direction::ALL, &mut moves);
            }
        }
    }
    moves
}

fn generate_stepping_moves(
    position: &Position,
    from: Square,
    side: Player,
    targets: &[Square],
    special: Special,
    moves: &mut MoveList,
) {
    for &to in targets {
        let occupant = position.piece_at(to);
        if occupant == ' ' {
            moves.push(Move::new(from, to, ' ', special));
        } else if piece_owner(occupant) != Some(side) {
            moves.push(Move::new(from, to, occupant, special));
        }
    }
}

fn generate_sliding_moves(
    position: &Position,
    from: Square,
    side: Player,
    directions: &[Direction],
    moves: &mut MoveList,
) {
    for &direction in directions {
        let (df, dr) = direction.delta();
        let mut current = from;
        while let Some(to) = current.offset(df, dr) {
            let occupant = position.piece_at(to);
            if occupant == ' ' {
                moves.push(Move::new(from, to, ' ', Special::None));
            } else {
                if piece_owner(occupant) != Some(side) {
                    moves.push(Move::new(from, to, occupant, Special::None));
                }
                break;
            }
            current = to;
        }
    }
}

fn generate_pawn_moves(position: &Position, from: Square, side: Player, moves: &mut MoveList) {
    let forward: i8 = match side {
        Player::White => 1,
        Player::Black => -1,
    };
    let promotion_rank = crate::chess::core::Rank::backrank(!side);
    let start_rank = crate::chess::core::Rank::pawns_starting(side);

    if let Some(one_step) = from.offset(0, forward) {
        if position.piece_at(one_step) == ' ' {
            push_pawn_advance(from, one_step, promotion_rank, moves);
            if from.rank() == start_rank {
                if let Some(two_step) = from.offset(0, 2 * forward) {
                    if position.piece_at(two_step) == ' ' {
                        let special = match side {
                            Player::White => Special::WhitePawnDoublePush,
                            Player::Black => Special::BlackPawnDoublePush,
                        };
                        moves.push(Move::new(from, two_step, ' ', special));
                    }
                }
            }
        }
    }

    for &to in pawn_attack_targets(side, from) {
        if Some(to) == position.en_passant_target() {
            let captured_square = Square::new(to.file(), from.rank());
            let captured = position.piece_at(captured_square);
            let special = match side {
                Player::White => Special::WhiteEnPassant,
                Player::Black => Special::BlackEnPassant,
            };
            moves.push(Move::new(from, to, captured, special));
            continue;
        }
        let occupant = position.piece_at(to);
        if occupant != ' ' && piece_owner(occupant) != Some(side) {
            if to.rank() == promotion_rank {
                push_promotions(from, to, occupant, moves);
            } else {
                moves.push(Move::new(from, to, occupant, Special::None));
            }
        }
    }
}

fn push_pawn_advance(
    from: Square,
    to: Square,
    promotion_rank: crate::chess::core::Rank,
    moves: &mut MoveList,
) {
    if to.rank() == promotion_rank {
        push_promotions(from, to, ' ', moves);
    } else {
        moves.push(Move::new(from, to, ' ', Special::None));
    }
}

fn push_promotions(from: Square, to: Square, capture: char, moves: &mut MoveList) {
    for &special in &Special::PROMOTIONS_IN_GENERATION_ORDER {
        moves.push(Move::new(from, to, capture, special));
    }
}

fn generate_castling_moves(position: &Position, king_square: Square, side: Player, moves: &mut MoveList) {
    use crate::chess::core::CastlingRights;

    let rights = position.castling_rights();
    let (kingside_right, queenside_right, home_rank) = match side {
        Player::White => (
            CastlingRights::WHITE_KINGSIDE,
            CastlingRights::WHITE_QUEENSIDE,
            crate::chess::core::Rank::One,
        ),
        Player::Black => (
            CastlingRights::BLACK_KINGSIDE,
            CastlingRights::BLACK_QUEENSIDE,
            crate::chess::core::Rank::Eight,
        ),
    };
    if king_square.rank() != home_rank || king_square.file() != crate::chess::core::File::E {
        return;
    }

    let rook = make_piece(PieceKind::Rook, side);
    let enemy = !side;

    if rights.contains(kingside_right) {
        let f = Square::new(crate::chess::core::File::F, home_rank);
        let g = Square::new(crate::chess::core::File::G, home_rank);
        let h = Square::new(crate::chess::core::File::H, home_rank);
        if position.piece_at(f) == ' '
            && position.piece_at(g) == ' '
            && position.piece_at(h) == rook
            && !attacked_square(position, king_square, enemy)
            && !attacked_square(position, f, enemy)
            && !attacked_square(position, g, enemy)
        {
            let special = match side {
                Player::White => Special::WhiteKingsideCastle,
                Player::Black => Special::BlackKingsideCastle,
            };
            moves.push(Move::new(king_square, g, ' ', special));
        }
    }

    if rights.contains(queenside_right) {
        let d = Square::new(crate::chess::core::File::D, home_rank);
        let c = Square::new(crate::chess::core::File::C, home_rank);
        let b = Square::new(crate::chess::core::File::B, home_rank);
        let a = Square::new(crate::chess::core::File::A, home_rank);
        if position.piece_at(d) == ' '
            && position.piece_at(c) == ' '
            && position.piece_at(b) == ' '
            && position.piece_at(a) == rook
            && !attacked_square(position, king_square, enemy)
            && !attacked_square(position, d, enemy)
            && !attacked_square(position, c, enemy)
        {
            let special = match side {
                Player::White => Special::WhiteQueensideCastle,
                Player::Black => Special::BlackQueensideCastle,
            };
            moves.push(Move::new(king_square, c, ' ', special));
        }
    }
}

/// Whether `square` is attacked by any piece belonging to `by`.
#[must_use]
pub(crate) fn attacked_square(position: &Position, square: Square, by: Player) -> bool {
    if knight_targets(square)
        .iter()
        .any(|&origin| position.piece_at(origin) == make_piece(PieceKind::Knight, by))
    {
        return true;
    }
    if king_targets(square)
        .iter()
        .any(|&origin| position.piece_at(origin) == make_piece(PieceKind::King, by))
    {
        return true;
    }
    let behind: i8 = match by {
        Player::White => -1,
        Player::Black => 1,
    };
    for df in [-1, 1] {
        if let Some(origin) = square.offset(df, behind) {
            if position.piece_at(origin) == make_piece(PieceKind::Pawn, by) {
                return true;
            }
        }
    }
    for direction in Direction::ALL {
        let (df, dr) = direction.delta();
        let mut current = square;
        while let Some(candidate) = current.offset(df, dr) {
            let occupant = position.piece_at(candidate);
            if occupant == ' ' {
                current = candidate;
                continue;
            }
            if piece_owner(occupant) == Some(by) {
                if let Some(kind) = piece_kind(occupant) {
                    let is_diagonal = Direction::DIAGONALS.contains(&direction);
                    if kind == PieceKind::Queen
                        || (is_diagonal && kind == PieceKind::Bishop)
                        || (!is_diagonal && kind == PieceKind::Rook)
                    {
                        return true;
                    }
                }
            }
            break;
        }
    }
    false
}

/// Whether the piece standing on `square` is attacked by the opposing side.
/// Returns `false` if `square` is empty.
#[must_use]
pub(crate) fn attacked_piece(position: &Position, square: Square) -> bool {
    match piece_owner(position.piece_at(square)) {
        Some(owner) => attacked_square(position, square, !owner),
        None => false,
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::chess::position::Position;

    #[test]
    fn initial_position_has_twenty_pseudo_legal_moves() {
        let position = Position::new_initial();
        assert_eq!(pseudo_legal_moves(&position).len(), 20);
    }

    #[test]
    fn knight_in_center_has_eight_pseudo_legal_moves() {
        let position = Position::from_fen("8/8/8/3N4/8/8/8/k6K w - - 0 1").unwrap();
        let moves: Vec<_> = pseudo_legal_moves(&position)
            .into_iter()
            .filter(|m| m.from() == Square::D5)
            .collect();
        assert_eq!(moves.len(), 8);
    }

    #[test]
    fn en_passant_is_generated_against_target_square() {
        let position =
            Position::from_fen("rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 2").unwrap();
        let found = pseudo_legal_moves(&position)
            .into_iter()
            .find(|m| m.from() == Square::E5 && m.to() == Square::D6)
            .expect("en passant capture should be generated");
        assert_eq!(found.special(), Special::WhiteEnPassant);
        assert_eq!(found.capture(), 'p');
    }
}
