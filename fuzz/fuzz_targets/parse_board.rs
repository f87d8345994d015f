#![no_main]
use libfuzzer_sys::fuzz_target;
use mailbox_chess::chess::Position;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(position) = Position::from_fen(text) {
            // A successfully parsed position must always re-serialize, and
            // re-parsing that output must reproduce the same position.
            let fen = position.to_fen();
            let reparsed = Position::from_fen(&fen).expect("our own FEN output should parse");
            assert_eq!(position, reparsed);
        }
    }
});
