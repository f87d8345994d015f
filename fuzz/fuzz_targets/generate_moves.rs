#![no_main]
use itertools::Itertools;
use libfuzzer_sys::fuzz_target;
use mailbox_chess::chess::{terse, Position};
use pretty_assertions::assert_eq;
use shakmaty::{CastlingMode, Chess};

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(mut position) = Position::from_fen(input) else {
        return;
    };
    // Our parser is lenient about structural defects (see
    // `Position::is_legal`), which shakmaty rejects outright at parse time;
    // only compare on positions both sides consider playable.
    if position.is_legal().is_err() {
        return;
    }
    let Ok(shakmaty_setup) = input.parse::<shakmaty::fen::Fen>() else {
        return;
    };
    let Ok(shakmaty_position) = shakmaty_setup.into_position::<Chess>(CastlingMode::Standard)
    else {
        return;
    };

    let ours: Vec<String> = position
        .gen_legal_moves()
        .into_iter()
        .map(terse)
        .sorted()
        .collect();
    let theirs: Vec<String> = shakmaty::Position::legal_moves(&shakmaty_position)
        .iter()
        .map(|m| m.to_uci(CastlingMode::Standard).to_string())
        .sorted()
        .collect();
    assert_eq!(ours, theirs);
});
