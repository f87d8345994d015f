//! Criterion benchmarks for move generation and perft node counts. Doubles
//! as a regression guard: a wrong node count means generation broke, not
//! just slowed down.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mailbox_chess::chess::Position;

const PERFT_POSITIONS: &[&str] = &[
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
    "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
    "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
];

fn perft(position: &mut Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = position.gen_legal_moves();
    if depth == 1 {
        return moves.len() as u64;
    }
    let mut nodes = 0;
    for mv in moves {
        position.push(mv);
        nodes += perft(position, depth - 1);
        position.pop(mv);
    }
    nodes
}

fn movegen_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("Move generation");
    let mut positions: Vec<Position> = PERFT_POSITIONS
        .iter()
        .map(|fen| Position::from_fen(fen).unwrap())
        .collect();
    group.throughput(criterion::Throughput::Elements(positions.len() as u64));
    group.bench_with_input(
        BenchmarkId::new(
            "gen_legal_moves",
            format!("{} arbitrary positions", positions.len()),
        ),
        &(),
        |b, ()| {
            b.iter(|| {
                for position in &mut positions {
                    black_box(position.gen_legal_moves());
                }
            });
        },
    );
    group.finish();
}

criterion_group! {
    name = movegen;
    config = Criterion::default().sample_size(100);
    targets = movegen_bench
}

fn perft_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("perft");
    for (fen, depth, nodes) in &[
        ("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1", 4, 197_281),
        ("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1", 3, 97_862),
        ("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1", 4, 43_238),
    ] {
        group.throughput(criterion::Throughput::Elements(*nodes));
        group.bench_with_input(
            BenchmarkId::new("perft", format!("{fen}, depth {depth}, nodes {nodes}")),
            depth,
            |b, &depth| {
                b.iter(|| {
                    let mut position = Position::from_fen(fen).unwrap();
                    assert_eq!(perft(&mut position, depth), *nodes);
                });
            },
        );
    }
    group.finish();
}

criterion_group! {
    name = perft_group;
    config = Criterion::default().sample_size(10);
    targets = perft_bench
}

criterion_main!(movegen, perft_group);
