//! FEN parsing and serialization throughput.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mailbox_chess::chess::Position;

const SAMPLE_POSITIONS: &[&str] = &[
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
    "2r3r1/p3k3/1p3pp1/1B5p/5P2/2P1p1P1/PP4KP/3R4 w - - 0 34",
    "rnbqk1nr/p3bppp/1p2p3/2ppP3/3P4/P7/1PP1NPPP/R1BQKBNR w KQkq c6 0 7",
    "r2qkb1r/1pp1pp1p/p1np1np1/1B6/3PP1b1/2N1BN2/PPP2PPP/R2QK2R w KQkq - 0 7",
    "r3k3/5p2/2p5/p7/P3r3/2N2n2/1PP2P2/2K2B2 w q - 0 24",
    "r1b1qrk1/ppp2pbp/n2p1np1/4p1B1/2PPP3/2NB1N1P/PP3PP1/R2QK2R w KQ e6 0 9",
    "8/8/8/8/2P5/3k4/8/KB6 b - c3 0 1",
    "rnbq1rk1/pp4pp/1b1ppn2/2p2p2/2PP4/1P2PN2/PB2BPPP/RN1Q1RK1 w - c6 0 9",
];

fn parse_positions(positions: &[&str]) {
    for fen in positions {
        black_box(Position::from_fen(fen)).expect("sample FENs are all well-formed");
    }
}

fn parse(c: &mut Criterion) {
    c.bench_with_input(
        BenchmarkId::new(
            "position parsing",
            format!("{} sample positions", SAMPLE_POSITIONS.len()),
        ),
        &SAMPLE_POSITIONS,
        |b, positions| {
            b.iter(|| parse_positions(positions));
        },
    );
}

criterion_group! {
    name = position;
    config = Criterion::default().sample_size(100);
    targets = parse
}

criterion_main!(position);
