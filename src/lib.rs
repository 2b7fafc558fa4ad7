//! agent-2048: a 4x4 merge-tile game engine + pruned expectimax policy
//!
//! This crate provides:
//! - A value-semantics `Board` type with ergonomic methods (`shift`,
//!   `make_move`, `valid_moves`, `to_grid`, ...)
//! - An expectimax AI (`expectimax` module) alternating deterministic agent
//!   plies with sampled tile-spawn plies, with monotonic pruning
//!
//! Quick start:
//! ```
//! use agent_2048::engine::{Board, Move};
//! use agent_2048::expectimax::Expectimax;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! // Deterministic board initialization with a seeded RNG
//! let mut rng = StdRng::seed_from_u64(42);
//! let board = Board::EMPTY.with_random_tile(&mut rng).with_random_tile(&mut rng);
//!
//! // A seeded policy replays identically
//! let mut policy = Expectimax::with_seed(42);
//! assert!(policy.best_move(board).is_some());
//! ```
//!
//! Full loop (simplest possible)
//! ```
//! use agent_2048::engine::Board;
//! use agent_2048::expectimax::Expectimax;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut policy = Expectimax::with_seed(123);
//! let mut rng = StdRng::seed_from_u64(123);
//! let mut board = Board::EMPTY.with_random_tile(&mut rng).with_random_tile(&mut rng);
//! let mut moves = 0u32;
//!
//! // Keep doctests fast: a couple of moves is enough to demonstrate flow.
//! while !board.is_game_over() && moves < 2 {
//!     if let Some(dir) = policy.best_move(board) {
//!         board = board.make_move(dir, &mut rng).board;
//!         moves += 1;
//!     } else {
//!         break;
//!     }
//! }
//! assert!(moves > 0);
//! ```

pub mod engine;
pub mod expectimax;
