use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::engine::{Board, Move};

use super::heuristic;
use super::{BranchEval, ExpectimaxConfig, SearchStats};

/// Ply type: the agent's own move vs. the random spawn response.
enum Node {
    Max,
    Chance,
}

/// Expectimax move policy with monotonic early-exit pruning.
///
/// Per-ply behavior:
/// - A max ply simulates each valid direction and folds the child values
///   into a running maximum `alpha`; once a child evaluates below `alpha`
///   the remaining directions are skipped. This is an early exit on a
///   monotone bound, not full alpha-beta.
/// - A chance ply samples one tile spawn per candidate direction, simulates
///   the agent's response, and returns the arithmetic mean over the
///   candidates that were valid before the spawn. The spawn is sampled, not
///   averaged over its distribution; the approximation trades accuracy for
///   speed and the heuristic weights are tuned against it.
/// - A state with no valid moves is a terminal loss and scores `f64::MIN`;
///   depth zero scores the static heuristic.
///
/// The policy owns its RNG: [`Expectimax::with_seed`] replays identically,
/// [`Expectimax::new`] seeds from entropy.
pub struct Expectimax {
    cfg: ExpectimaxConfig,
    stats: SearchStats,
    rng: StdRng,
}

impl Expectimax {
    /// Policy with default depth and an entropy-seeded RNG.
    pub fn new() -> Self {
        Self::with_config(ExpectimaxConfig::default())
    }

    /// Policy with default depth and a fixed RNG seed, for reproducible runs.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            cfg: ExpectimaxConfig::default(),
            stats: SearchStats::default(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Policy with explicit configuration and an entropy-seeded RNG.
    pub fn with_config(cfg: ExpectimaxConfig) -> Self {
        Self { cfg, stats: SearchStats::default(), rng: StdRng::from_entropy() }
    }

    /// Policy with explicit configuration and a fixed RNG seed.
    pub fn with_config_and_seed(cfg: ExpectimaxConfig, seed: u64) -> Self {
        Self { cfg, stats: SearchStats::default(), rng: StdRng::seed_from_u64(seed) }
    }

    /// Select the best move from `board`.
    ///
    /// Each valid direction is simulated (move plus sampled spawn) and
    /// scored with a chance-ply search at the configured depth; the
    /// strictly largest value wins and ties keep the earliest direction
    /// index. Returns `None` on a terminal board; callers should treat
    /// `Board::valid_moves` as the authoritative game-over signal.
    pub fn best_move(&mut self, board: Board) -> Option<Move> {
        let depth = self.cfg.depth;
        let mut nodes = 0u64;
        let mut best: Option<(Move, f64)> = None;
        for dir in Move::ALL {
            let shift = board.make_move(dir, &mut self.rng);
            if !shift.moved {
                continue;
            }
            let value = self.search(shift.board, Node::Chance, depth, 0.0, &mut nodes);
            match best {
                Some((_, best_value)) if value <= best_value => {}
                _ => best = Some((dir, value)),
            }
        }
        self.record_stats(nodes);
        best.map(|(dir, _)| dir)
    }

    /// Expected value for each direction at the root, in index order.
    ///
    /// Illegal directions are returned with `legal = false` and an EV of 0.
    pub fn branch_evals(&mut self, board: Board) -> [BranchEval; 4] {
        let depth = self.cfg.depth;
        let mut nodes = 0u64;
        let mut out = Move::ALL.map(|dir| BranchEval { dir, ev: 0.0, legal: false });
        for (i, dir) in Move::ALL.into_iter().enumerate() {
            let shift = board.make_move(dir, &mut self.rng);
            if shift.moved {
                let ev = self.search(shift.board, Node::Chance, depth, 0.0, &mut nodes);
                out[i] = BranchEval { dir, ev, legal: true };
            }
        }
        self.record_stats(nodes);
        out
    }

    /// Statistics collected from the last call to [`Self::best_move`] or
    /// [`Self::branch_evals`].
    #[inline]
    pub fn last_stats(&self) -> SearchStats {
        self.stats
    }

    /// Reset accumulated stats to zero.
    #[inline]
    pub fn reset_stats(&mut self) {
        self.stats = SearchStats::default();
    }

    fn record_stats(&mut self, nodes: u64) {
        self.stats.nodes = nodes;
        self.stats.peak_nodes = self.stats.peak_nodes.max(nodes);
    }

    /// The alternating-ply recursion.
    ///
    /// Base cases run in this order: a state with no valid moves is a
    /// terminal loss regardless of depth; depth zero falls back to the
    /// static heuristic.
    fn search(
        &mut self,
        board: Board,
        node: Node,
        depth: u32,
        alpha: f64,
        nodes: &mut u64,
    ) -> f64 {
        *nodes += 1;
        let moves = board.valid_moves();
        if moves.is_empty() {
            return f64::MIN;
        }
        if depth == 0 {
            return heuristic::evaluate(&board);
        }
        match node {
            Node::Max => self.max_ply(board, &moves, depth, alpha, nodes),
            Node::Chance => self.chance_ply(board, &moves, depth, alpha, nodes),
        }
    }

    fn max_ply(
        &mut self,
        board: Board,
        moves: &[Move],
        depth: u32,
        mut alpha: f64,
        nodes: &mut u64,
    ) -> f64 {
        for &dir in moves {
            let child = board.make_move(dir, &mut self.rng);
            let value = self.search(child.board, Node::Chance, depth - 1, alpha, nodes);
            // Monotonic early exit: a child below the bound cannot raise the
            // maximum, and neither can anything after it.
            if alpha > value {
                break;
            }
            alpha = alpha.max(value);
        }
        alpha
    }

    /// Candidate validity is decided before the spawn; the spawn may turn a
    /// candidate into a no-op, which still counts toward the mean.
    fn chance_ply(
        &mut self,
        board: Board,
        moves: &[Move],
        depth: u32,
        alpha: f64,
        nodes: &mut u64,
    ) -> f64 {
        // Divide per term rather than once at the end: two loss sentinels
        // would otherwise sum to -inf and outrank a single pure loss.
        let share = 1.0 / moves.len() as f64;
        let mut total = 0.0;
        for &dir in moves {
            let spawned = board.with_random_tile(&mut self.rng);
            let child = spawned.make_move(dir, &mut self.rng);
            total += self.search(child.board, Node::Max, depth - 1, alpha, nodes) * share;
        }
        total
    }
}

impl Default for Expectimax {
    fn default() -> Self {
        Self::new()
    }
}
