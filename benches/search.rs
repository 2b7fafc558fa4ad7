//! End-to-end move selection latency at a few depths.

use agent_2048::engine::{Board, Move};
use agent_2048::expectimax::{Expectimax, ExpectimaxConfig};
use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use rand::{rngs::StdRng, SeedableRng};
use std::hint::black_box;

/// Mid-game positions from a short seeded playout.
fn corpus() -> Vec<Board> {
    let mut rng = StdRng::seed_from_u64(2048);
    let mut b = Board::EMPTY.with_random_tile(&mut rng).with_random_tile(&mut rng);
    let seq = [Move::Left, Move::Down, Move::Left, Move::Up];
    let mut boards = Vec::new();
    for i in 0..32 {
        let shift = b.make_move(seq[i % seq.len()], &mut rng);
        b = shift.board;
        if i % 4 == 3 {
            boards.push(b);
        }
    }
    boards
}

fn bench_best_move(c: &mut Criterion) {
    let boards = corpus();
    for depth in [1u32, 3] {
        c.bench_function(&format!("search/best_move_depth_{}", depth), |bch| {
            bch.iter_batched(
                || Expectimax::with_config_and_seed(ExpectimaxConfig { depth }, 7),
                |mut policy| {
                    for &bd in &boards {
                        black_box(policy.best_move(bd));
                    }
                },
                BatchSize::SmallInput,
            )
        });
    }
}

criterion_group!(search, bench_best_move);
criterion_main!(search);
