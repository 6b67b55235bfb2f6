use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use merge_2048::engine::{collapse_row, Board, Direction, SpawnProbability};
use rand::{rngs::StdRng, SeedableRng};
use std::hint::black_box;

fn corpus(size: usize) -> Vec<Board> {
    let mut rng = StdRng::seed_from_u64(42);
    let mut boards = Vec::new();
    let mut b = Board::start(size, &mut rng, SpawnProbability::DEFAULT).unwrap();
    boards.push(b.clone());
    // Derive a variety of densities deterministically
    for i in 0..40 {
        let out = b.shift(Direction::ALL[i % 4]);
        if out.moved {
            b = out.board.with_random_tile(&mut rng, SpawnProbability::DEFAULT);
        }
        boards.push(b.clone());
    }
    boards
}

fn bench_shift(c: &mut Criterion) {
    for size in [4usize, 6] {
        let boards = corpus(size);
        for dir in Direction::ALL {
            c.bench_function(&format!("shift/{size}x{size}/{dir}"), |bch| {
                bch.iter(|| {
                    let mut gain = 0u64;
                    for bd in &boards { gain += bd.shift(dir).score_gain; }
                    black_box(gain)
                })
            });
        }
    }
}

fn bench_collapse(c: &mut Criterion) {
    let rows: [&[u64]; 4] = [&[2, 2, 2, 2], &[0, 4, 0, 4], &[2, 4, 8, 16], &[0, 0, 0, 2]];
    c.bench_function("collapse_row/mixed", |bch| {
        bch.iter(|| {
            for r in rows { black_box(collapse_row(black_box(r))); }
        })
    });
}

fn bench_spawn_and_queries(c: &mut Criterion) {
    c.bench_function("board/with_random_tile", |bch| {
        bch.iter_batched(
            || (Board::empty(4).unwrap(), StdRng::seed_from_u64(7)),
            |(mut bd, mut rng)| {
                for _ in 0..16 { bd = bd.with_random_tile(&mut rng, SpawnProbability::DEFAULT); }
                black_box(bd)
            },
            BatchSize::SmallInput,
        )
    });
    c.bench_function("query/has_legal_move", |bch| {
        let boards = corpus(4);
        bch.iter(|| {
            let mut n = 0;
            for bd in &boards { n += bd.has_legal_move() as u32; }
            black_box(n)
        })
    });
}

criterion_group!(engine_ops, bench_shift, bench_collapse, bench_spawn_and_queries);
criterion_main!(engine_ops);
