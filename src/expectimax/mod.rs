//! Expectimax search policy for the 4x4 merge-tile engine.
//!
//! The policy alternates a deterministic max ply (the agent's move) with a
//! stochastic chance ply (a sampled tile spawn followed by the agent's
//! candidate responses), prunes max plies with a monotonic early exit, and
//! bottoms out at a weighted static heuristic.
//!
//! Randomness comes from the engine-owned RNG: a seeded [`Expectimax`]
//! replays identically, an entropy-seeded one does not.
//!
//! Quick start
//! ```
//! use agent_2048::engine::Board;
//! use agent_2048::expectimax::Expectimax;
//!
//! let board = Board::from_grid([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]).unwrap();
//! let mut policy = Expectimax::with_seed(42);
//! assert!(policy.best_move(board).is_some());
//! ```

mod heuristic;
mod search;

pub use search::Expectimax;

use crate::engine::Move;

/// Configurable knobs for the policy. Defaults match the shipped tuning.
#[derive(Debug, Clone, Copy)]
pub struct ExpectimaxConfig {
    /// Search depth in plies. Fixed resource bound; 5 keeps per-move latency
    /// interactive.
    pub depth: u32,
}

impl Default for ExpectimaxConfig {
    fn default() -> Self {
        Self { depth: 5 }
    }
}

/// Per-branch expected value at the root.
///
/// `legal` is false when the move is a no-op for the current board.
#[derive(Debug, Clone, Copy)]
pub struct BranchEval {
    pub dir: Move,
    pub ev: f64,
    pub legal: bool,
}

/// Basic search stats for a single evaluation.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchStats {
    pub nodes: u64,
    pub peak_nodes: u64,
}

/// Bench-only: expose the raw heuristic value for a board.
///
/// Enabled only with the `bench-internal` feature to keep the public API small.
#[cfg(feature = "bench-internal")]
#[inline]
pub fn heuristic_value(board: &crate::engine::Board) -> f64 {
    heuristic::evaluate(board)
}
