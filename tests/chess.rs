//! Scenario-level play-throughs: a handful of full games and endgames played
//! move by move through the public API, checked against known FEN snapshots.

use mailbox_chess::chess::{algebraic, parse_terse, Position, Square};
use mailbox_chess::error::{DrawKind, Terminal};
use pretty_assertions::assert_eq;

fn setup(fen: &str) -> Position {
    Position::from_fen(fen).unwrap_or_else(|e| panic!("parsing valid position {fen}: {e}"))
}

fn play_terse(position: &mut Position, moves: &[&str]) {
    for text in moves {
        let mv = parse_terse(position, text)
            .unwrap_or_else(|e| panic!("{text} should be legal in {position}: {e}"));
        position.play(mv);
    }
}

#[test]
fn fen_roundtrips_for_standard_opening_positions() {
    for fen in [
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1",
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
    ] {
        let position = setup(fen);
        assert_eq!(position.to_fen(), fen);
    }
}

#[test]
fn starting_position_has_twenty_legal_moves() {
    let mut position = Position::new_initial();
    assert_eq!(position.gen_legal_moves().len(), 20);
}

#[test]
fn fools_mate_is_checkmate() {
    let mut position = Position::new_initial();
    play_terse(&mut position, &["g2g4", "e7e5", "f2f4", "d8h4"]);
    assert_eq!(position.evaluate(), Ok(Terminal::WhiteCheckmate));
    assert!(position.gen_legal_moves().is_empty());
}

#[test]
fn mate_in_one_is_flagged() {
    let mut position = setup("7Q/2Rp4/2pN4/p2rp3/P2N4/B1k5/2PpRb2/3K2n1 w - - 0 1");
    let mated = position
        .gen_legal_moves_extended()
        .into_iter()
        .filter(|m| m.is_mate)
        .count();
    assert_eq!(mated, 1);
}

#[test]
fn castling_rights_revoked_by_rook_leaving_corner() {
    let mut position = setup("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
    play_terse(&mut position, &["h1h2"]);
    assert_eq!(position.to_fen(), "r3k2r/8/8/8/8/8/7R/R3K3 b Qkq - 1 1");
}

#[test]
fn en_passant_capture_is_available_and_resolves() {
    let mut position = setup("rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 2");
    let mv = parse_terse(&mut position, "e5d6").expect("en passant capture is legal");
    assert_eq!(algebraic(&mut position, mv), "exd6");
    position.play(mv);
    assert_eq!(position.piece_at(Square::D5), ' ');
}

#[test]
fn threefold_repetition_is_a_draw() {
    let mut position = Position::new_initial();
    play_terse(
        &mut position,
        &[
            "g1f3", "g8f6", "f3g1", "f6g8", "g1f3", "g8f6", "f3g1", "f6g8",
        ],
    );
    assert_eq!(position.is_draw(true), Some(DrawKind::ThreefoldRepetition));
}

#[test]
fn fifty_move_rule_triggers_at_a_hundred_halfmoves() {
    let mut position = setup("8/8/1p4k1/1P6/8/8/6K1/8 w - - 99 60");
    play_terse(&mut position, &["g2f2"]);
    assert_eq!(position.is_draw(true), Some(DrawKind::FiftyMoveRule));
}

#[test]
fn lone_kings_is_automatically_insufficient_material() {
    let position = setup("8/8/4k3/8/8/4K3/8/8 w - - 0 1");
    assert_eq!(
        position.is_draw(true),
        Some(DrawKind::InsufficientMaterial)
    );
    assert_eq!(
        position.is_draw(false),
        Some(DrawKind::InsufficientMaterial)
    );
}

#[test]
fn king_and_bishop_versus_lone_king_is_claimable_by_the_lone_side() {
    let position = setup("8/8/4k3/8/8/4KB2/8/8 w - - 0 1");
    assert_eq!(
        position.is_draw(false),
        Some(DrawKind::InsufficientMaterial)
    );
}

#[test]
fn push_pop_round_trip_leaves_position_unchanged() {
    let mut position =
        setup("r2qkb1r/1pp1pp1p/p1np1np1/1B6/3PP1b1/2N1BN2/PPP2PPP/R2QK2R w KQkq - 0 7");
    let before = position.to_fen();
    for mv in position.clone().gen_pseudo_legal_moves() {
        position.push(mv);
        position.pop(mv);
        assert_eq!(position.to_fen(), before);
    }
}

#[test]
fn promotion_move_substitutes_piece_on_destination() {
    let mut position = setup("8/Pk6/8/8/8/8/6KP/8 w - - 0 1");
    let mv = parse_terse(&mut position, "a7a8q").expect("promotion to queen is legal");
    position.play(mv);
    assert_eq!(position.to_fen(), "Q7/1k6/8/8/8/8/6KP/8 b - - 0 1");
}
