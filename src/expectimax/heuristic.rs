use crate::engine::{Board, SIZE};

/// Position weights biasing high values toward the top-left corner.
///
/// Hand-tuned constant; monotonically decreasing away from the corner and
/// never derived at runtime.
const GRADIENT_WEIGHTS: [[f64; SIZE]; SIZE] = [
    [0.4, 0.4, 0.2, 0.099937],
    [0.4, 0.4, 0.076711, 0.0724143],
    [0.2, 0.0562579, 0.037116, 0.0161889],
    [0.0125498, 0.00992495, 0.00575871, 0.00335193],
];

const GRADIENT_WEIGHT: f64 = 1.7;
const MAX_WEIGHT: f64 = 1.0;
const SMOOTH_WEIGHT: f64 = 0.1;
const FREE_WEIGHT: f64 = 0.5;

/// Tile value at which the game is won.
const WIN_TILE: u32 = 2048;

/// The four measurements taken in one combined grid pass.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Measurements {
    pub gradient: f64,
    pub free: u32,
    pub max: u32,
    pub smooth: u32,
    pub is_win: bool,
}

/// One pass over the numeric grid collecting all sub-measurements.
pub(crate) fn measure(board: &Board) -> Measurements {
    let grid = board.to_grid();
    let mut m = Measurements::default();
    for r in 0..SIZE {
        for c in 0..SIZE {
            let val = grid[r][c];
            // Smoothness: for interior cells, count up/left neighbor pairs
            // related by exactly a factor of two. Empty cells compare as 0
            // and pair with adjacent empties.
            if r > 0 && c > 0 {
                let up = grid[r - 1][c];
                if up == val * 2 || up * 2 == val {
                    m.smooth += 1;
                }
                let left = grid[r][c - 1];
                if left == val * 2 || left * 2 == val {
                    m.smooth += 1;
                }
            }
            m.gradient += val as f64 * GRADIENT_WEIGHTS[r][c];
            m.max = m.max.max(val);
            if val == 0 {
                m.free += 1;
            }
            if val >= WIN_TILE {
                m.is_win = true;
            }
        }
    }
    m
}

/// Scalar desirability of a board. Deterministic, pure function of the grid.
///
/// `(gradient*1.7 + max*1.0 + smooth*0.1) * (free*0.5)^2`: empty space has
/// compounding value, so the free-tile factor grows faster than linearly and
/// drives near-full boards toward zero. A winning board short-circuits to
/// `f64::MAX` so it is always preferred.
pub(crate) fn evaluate(board: &Board) -> f64 {
    let m = measure(board);
    if m.is_win {
        return f64::MAX;
    }
    let base = m.gradient * GRADIENT_WEIGHT
        + m.max as f64 * MAX_WEIGHT
        + m.smooth as f64 * SMOOTH_WEIGHT;
    base * (m.free as f64 * FREE_WEIGHT).powi(2)
}
