//! Precomputed attack targets for leaping pieces (king, knight, pawns),
//! computed once on first use and cached for the process lifetime.
//!
//! Sliding-piece (rook, bishop, queen) attacks are not table-driven here:
//! on a mailbox board, ray-casting a slide until it hits the edge or a piece
//! is already a handful of array reads, and there is no occupancy-indexed
//! table to precompute it into without a magic-bitboard scheme that this
//! board representation does not have. See `crate::chess::movegen` for the
//! ray walk.

use std::sync::OnceLock;

use crate::chess::core::{Direction, Player, Square, BOARD_SIZE};

type Targets = [Vec<Square>; BOARD_SIZE as usize];

fn knight_deltas() -> [(i8, i8); 8] {
    [
        (1, 2),
        (2, 1),
        (2, -1),
        (1, -2),
        (-1, -2),
        (-2, -1),
        (-2, 1),
        (-1, 2),
    ]
}

fn leaping_targets(deltas: &[(i8, i8)]) -> Targets {
    std::array::from_fn(|index| {
        let square = Square::try_from(index as u8).expect("index is within board bounds");
        deltas
            .iter()
            .filter_map(|&(df, dr)| square.offset(df, dr))
            .collect()
    })
}

/// Squares a knight standing on `square` attacks.
#[must_use]
pub(crate) fn knight_targets(square: Square) -> &'static [Square] {
    static TABLE: OnceLock<Targets> = OnceLock::new();
    &TABLE.get_or_init(|| leaping_targets(&knight_deltas()))[square as usize]
}

/// Squares a king standing on `square` attacks (not counting castling).
#[must_use]
pub(crate) fn king_targets(square: Square) -> &'static [Square] {
    static TABLE: OnceLock<Targets> = OnceLock::new();
    &TABLE.get_or_init(|| leaping_targets(&Direction::ALL.map(Direction::delta)))[square as usize]
}

/// Squares a pawn belonging to `player` standing on `square` attacks
/// diagonally (i.e. could capture on), ignoring whether anything stands
/// there.
#[must_use]
pub(crate) fn pawn_attack_targets(player: Player, square: Square) -> &'static [Square] {
    static WHITE: OnceLock<Targets> = OnceLock::new();
    static BLACK: OnceLock<Targets> = OnceLock::new();
    let table = match player {
        Player::White => WHITE.get_or_init(|| leaping_targets(&[(-1, 1), (1, 1)])),
        Player::Black => BLACK.get_or_init(|| leaping_targets(&[(-1, -1), (1, -1)])),
    };
    &table[square as usize]
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn knight_in_corner_has_two_targets() {
        assert_eq!(knight_targets(Square::A1).len(), 2);
    }

    #[test]
    fn knight_in_center_has_eight_targets() {
        assert_eq!(knight_targets(Square::E4).len(), 8);
    }

    #[test]
    fn king_in_corner_has_three_targets() {
        assert_eq!(king_targets(Square::A1).len(), 3);
    }

    #[test]
    fn king_in_center_has_eight_targets() {
        assert_eq!(king_targets(Square::E4).len(), 8);
    }

    #[test]
    fn pawn_attacks_are_diagonal_and_forward() {
        let targets = pawn_attack_targets(Player::White, Square::E4);
        assert_eq!(targets.len(), 2);
        assert!(targets.contains(&Square::D5));
        assert!(targets.contains(&Square::F5));

        let targets = pawn_attack_targets(Player::Black, Square::E4);
        assert!(targets.contains(&Square::D3));
        assert!(targets.contains(&Square::F3));
    }

    #[test]
    fn edge_pawn_has_one_attack_target() {
        assert_eq!(pawn_attack_targets(Player::White, Square::A4).len(), 1);
    }
}
