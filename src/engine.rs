use rand::Rng;
use std::fmt;
use thiserror::Error;

/// Grid dimension. The engine is fixed at 4x4.
pub const SIZE: usize = 4;

/// A (row, col) coordinate on the grid.
pub type Pos = (usize, usize);

/// A direction to move/merge tiles.
///
/// Discriminants follow the orchestrator's encoding: 0=up, 1=right, 2=down,
/// 3=left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Move {
    Up = 0,
    Right = 1,
    Down = 2,
    Left = 3,
}

impl Move {
    /// All four directions in index order.
    pub const ALL: [Move; 4] = [Move::Up, Move::Right, Move::Down, Move::Left];

    /// Convert a direction index back into a `Move`.
    #[inline]
    pub fn from_index(idx: u8) -> Option<Move> {
        match idx {
            0 => Some(Move::Up),
            1 => Some(Move::Right),
            2 => Some(Move::Down),
            3 => Some(Move::Left),
            _ => None,
        }
    }

    /// Unit vector for this direction in (row, col) terms.
    #[inline]
    fn vector(self) -> (i32, i32) {
        match self {
            Move::Up => (-1, 0),
            Move::Right => (0, 1),
            Move::Down => (1, 0),
            Move::Left => (0, -1),
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Move::Up => "up",
            Move::Right => "right",
            Move::Down => "down",
            Move::Left => "left",
        };
        write!(f, "{}", s)
    }
}

/// A single tile.
///
/// `merged_from` records the two source coordinates that combined into this
/// tile during the current move; it forbids a second merge in the same
/// traversal and is cleared at the start of every move.
#[derive(Debug, Clone, Copy)]
pub struct Tile {
    pub value: u32,
    pub merged_from: Option<(Pos, Pos)>,
}

impl Tile {
    #[inline]
    fn new(value: u32) -> Tile {
        Tile { value, merged_from: None }
    }
}

/// Outcome of applying one move to a board.
#[derive(Debug, Clone, Copy)]
pub struct Shift {
    /// The resulting board.
    pub board: Board,
    /// True iff any tile's final coordinate differs from its start.
    pub moved: bool,
    /// Merge score earned by this move.
    pub delta: u32,
}

/// Error importing an external numeric grid.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum EngineError {
    #[error("cell ({0}, {1}) holds {2}, which is not a power of two >= 2")]
    InvalidTileValue(usize, usize, u32),
}

/// A 4x4 board of optional tiles plus the cumulative merge score of the
/// branch that produced it.
///
/// `Board` is `Copy`: every search branch operates on its own value and no
/// in-flight branch can observe another's mutation.
///
/// ```
/// use agent_2048::engine::{Board, Move};
///
/// let b = Board::from_grid([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]).unwrap();
/// let shift = b.shift(Move::Left);
/// assert!(shift.moved);
/// assert_eq!(shift.delta, 4);
/// assert_eq!(shift.board.to_grid()[0], [4, 0, 0, 0]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Board {
    cells: [[Option<Tile>; SIZE]; SIZE],
    score: u32,
}

impl Board {
    /// A constant empty board.
    pub const EMPTY: Board = Board { cells: [[None; SIZE]; SIZE], score: 0 };

    /// Import a numeric grid (0 = empty) from the orchestrator.
    ///
    /// Rejects values that are nonzero and not a power of two >= 2.
    pub fn from_grid(grid: [[u32; SIZE]; SIZE]) -> Result<Board, EngineError> {
        let mut board = Board::EMPTY;
        for (r, row) in grid.iter().enumerate() {
            for (c, &val) in row.iter().enumerate() {
                if val == 0 {
                    continue;
                }
                if val < 2 || !val.is_power_of_two() {
                    return Err(EngineError::InvalidTileValue(r, c, val));
                }
                board.cells[r][c] = Some(Tile::new(val));
            }
        }
        Ok(board)
    }

    /// Read-only numeric view of the grid, 0 for empty cells.
    pub fn to_grid(&self) -> [[u32; SIZE]; SIZE] {
        let mut grid = [[0u32; SIZE]; SIZE];
        for r in 0..SIZE {
            for c in 0..SIZE {
                if let Some(tile) = self.cells[r][c] {
                    grid[r][c] = tile.value;
                }
            }
        }
        grid
    }

    /// Cumulative merge score of this branch.
    #[inline]
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Largest tile value on the board (0 if empty).
    pub fn highest_tile(&self) -> u32 {
        self.cells
            .iter()
            .flatten()
            .flatten()
            .map(|tile| tile.value)
            .max()
            .unwrap_or(0)
    }

    /// Number of empty cells.
    pub fn count_empty(&self) -> usize {
        self.cells.iter().flatten().filter(|cell| cell.is_none()).count()
    }

    /// Slide and merge tiles in `dir`. Pure: no random tile is inserted.
    ///
    /// Tiles are visited farthest-first in the travel direction so each is
    /// moved or merged in correct collision order in a single pass. At most
    /// one merge consumes each tile per move, enforced by `merged_from`.
    pub fn shift(mut self, dir: Move) -> Shift {
        let (dr, dc) = dir.vector();
        let mut moved = false;
        let mut delta = 0u32;

        // New move: clear the previous move's merge markers.
        for row in self.cells.iter_mut() {
            for tile in row.iter_mut().flatten() {
                tile.merged_from = None;
            }
        }

        for r in traversal(dr) {
            for c in traversal(dc) {
                let Some(tile) = self.cells[r][c] else { continue };
                let (farthest, next) = self.farthest_position((r, c), (dr, dc));
                let next_tile = next.and_then(|(nr, nc)| self.cells[nr][nc]);

                match (next, next_tile) {
                    (Some(target), Some(other))
                        if other.value == tile.value && other.merged_from.is_none() =>
                    {
                        let merged = Tile {
                            value: tile.value * 2,
                            merged_from: Some(((r, c), target)),
                        };
                        self.cells[r][c] = None;
                        self.cells[target.0][target.1] = Some(merged);
                        self.score += merged.value;
                        delta += merged.value;
                        moved = true;
                    }
                    _ => {
                        if farthest != (r, c) {
                            self.cells[farthest.0][farthest.1] = Some(tile);
                            self.cells[r][c] = None;
                            moved = true;
                        }
                    }
                }
            }
        }

        Shift { board: self, moved, delta }
    }

    /// Insert a random 2 (90%) or 4 (10%) tile into a uniformly random empty
    /// cell. A full board is a silent no-op, not an error.
    pub fn with_random_tile<R: Rng + ?Sized>(mut self, rng: &mut R) -> Board {
        let empty: Vec<Pos> = (0..SIZE)
            .flat_map(|r| (0..SIZE).map(move |c| (r, c)))
            .filter(|&(r, c)| self.cells[r][c].is_none())
            .collect();
        if empty.is_empty() {
            return self;
        }
        let (r, c) = empty[rng.gen_range(0..empty.len())];
        let value = if rng.gen_range(0..10) < 9 { 2 } else { 4 };
        self.cells[r][c] = Some(Tile::new(value));
        self
    }

    /// Perform a move, then insert one random tile iff the move changed the
    /// board.
    ///
    /// ```
    /// use agent_2048::engine::{Board, Move};
    /// use rand::{rngs::StdRng, SeedableRng};
    ///
    /// let mut rng = StdRng::seed_from_u64(1);
    /// let b = Board::EMPTY.with_random_tile(&mut rng).with_random_tile(&mut rng);
    /// let _ = b.make_move(Move::Left, &mut rng);
    /// ```
    pub fn make_move<R: Rng + ?Sized>(self, dir: Move, rng: &mut R) -> Shift {
        let shift = self.shift(dir);
        if shift.moved {
            Shift { board: shift.board.with_random_tile(rng), ..shift }
        } else {
            shift
        }
    }

    /// Directions whose simulation reports movement, in index order.
    ///
    /// An empty result is the authoritative game-over signal.
    pub fn valid_moves(&self) -> Vec<Move> {
        Move::ALL
            .into_iter()
            .filter(|&dir| self.shift(dir).moved)
            .collect()
    }

    /// True if no move in any direction changes the board.
    pub fn is_game_over(&self) -> bool {
        Move::ALL.into_iter().all(|dir| !self.shift(dir).moved)
    }

    /// Walk from `start` along `vector` until hitting the boundary or an
    /// occupied cell. Returns the farthest empty position reachable and the
    /// first blocked cell beyond it (`None` when out of bounds).
    fn farthest_position(&self, start: Pos, vector: (i32, i32)) -> (Pos, Option<Pos>) {
        let mut farthest = start;
        let mut r = start.0 as i32 + vector.0;
        let mut c = start.1 as i32 + vector.1;
        while in_bounds(r, c) && self.cells[r as usize][c as usize].is_none() {
            farthest = (r as usize, c as usize);
            r += vector.0;
            c += vector.1;
        }
        let next = if in_bounds(r, c) { Some((r as usize, c as usize)) } else { None };
        (farthest, next)
    }
}

impl PartialEq for Board {
    /// Boards compare by tile values and score; merge markers are transient
    /// per-move bookkeeping and do not participate.
    fn eq(&self, other: &Board) -> bool {
        self.score == other.score && self.to_grid() == other.to_grid()
    }
}

impl Eq for Board {}

#[inline]
fn in_bounds(r: i32, c: i32) -> bool {
    (0..SIZE as i32).contains(&r) && (0..SIZE as i32).contains(&c)
}

/// Iteration order for one axis: reversed when the vector component is +1,
/// so cells farthest in the travel direction are visited first.
fn traversal(component: i32) -> impl Iterator<Item = usize> {
    let mut order: Vec<usize> = (0..SIZE).collect();
    if component == 1 {
        order.reverse();
    }
    order.into_iter()
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "score: {}", self.score)?;
        for row in &self.cells {
            writeln!(f, "+------+------+------+------+")?;
            for cell in row {
                match cell {
                    Some(tile) => write!(f, "|{:^6}", tile.value)?,
                    None => write!(f, "|      ")?,
                }
            }
            writeln!(f, "|")?;
        }
        writeln!(f, "+------+------+------+------+")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn board(grid: [[u32; SIZE]; SIZE]) -> Board {
        Board::from_grid(grid).expect("valid test grid")
    }

    #[test]
    fn shift_left_merges_leading_pair() {
        let b = board([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let shift = b.shift(Move::Left);
        assert!(shift.moved);
        assert_eq!(shift.delta, 4);
        assert_eq!(shift.board.to_grid(), [[4, 0, 0, 0], [0; 4], [0; 4], [0; 4]]);
    }

    #[test]
    fn shift_up_at_boundary_is_noop() {
        let b = board([[2, 0, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let shift = b.shift(Move::Up);
        assert!(!shift.moved);
        assert_eq!(shift.delta, 0);
        assert_eq!(shift.board.to_grid(), b.to_grid());
    }

    #[test]
    fn shift_empty_board_is_noop() {
        for dir in Move::ALL {
            let shift = Board::EMPTY.shift(dir);
            assert!(!shift.moved);
            assert_eq!(shift.delta, 0);
        }
    }

    #[test]
    fn no_double_merge_in_one_pass() {
        // [2, 2, 2, 2] -> [4, 4, 0, 0], never [8, 0, 0, 0].
        let b = board([[2, 2, 2, 2], [0; 4], [0; 4], [0; 4]]);
        let shift = b.shift(Move::Left);
        assert_eq!(shift.board.to_grid()[0], [4, 4, 0, 0]);
        assert_eq!(shift.delta, 8);
    }

    #[test]
    fn merged_tile_blocks_second_merge() {
        // [4, 2, 2, 0] -> [4, 4, 0, 0]: the fresh 4 must not merge again.
        let b = board([[4, 2, 2, 0], [0; 4], [0; 4], [0; 4]]);
        let shift = b.shift(Move::Left);
        assert_eq!(shift.board.to_grid()[0], [4, 4, 0, 0]);
        assert_eq!(shift.delta, 4);
    }

    #[test]
    fn shift_right_respects_collision_order() {
        let b = board([
            [2, 2, 0, 0],
            [0, 4, 4, 0],
            [2, 0, 2, 0],
            [8, 8, 8, 8],
        ]);
        let shift = b.shift(Move::Right);
        assert_eq!(
            shift.board.to_grid(),
            [
                [0, 0, 0, 4],
                [0, 0, 0, 8],
                [0, 0, 0, 4],
                [0, 0, 16, 16],
            ]
        );
        assert_eq!(shift.delta, 4 + 8 + 4 + 32);
    }

    #[test]
    fn shift_down_moves_columns() {
        let b = board([
            [2, 0, 2, 8],
            [2, 4, 0, 8],
            [0, 4, 2, 8],
            [0, 0, 0, 8],
        ]);
        let shift = b.shift(Move::Down);
        assert_eq!(
            shift.board.to_grid(),
            [
                [0, 0, 0, 0],
                [0, 0, 0, 0],
                [0, 0, 0, 16],
                [4, 8, 4, 16],
            ]
        );
        assert_eq!(shift.delta, 4 + 8 + 4 + 32);
    }

    #[test]
    fn shift_is_deterministic() {
        let b = board([
            [2, 4, 2, 4],
            [0, 2, 0, 2],
            [8, 0, 8, 0],
            [2, 2, 4, 4],
        ]);
        for dir in Move::ALL {
            let first = b.shift(dir);
            let second = b.shift(dir);
            assert_eq!(first.moved, second.moved);
            assert_eq!(first.delta, second.delta);
            assert_eq!(first.board.to_grid(), second.board.to_grid());
        }
    }

    #[test]
    fn merge_preserves_total_tile_sum() {
        let b = board([
            [2, 2, 4, 4],
            [8, 8, 2, 2],
            [0, 4, 4, 0],
            [2, 0, 0, 2],
        ]);
        let before: u32 = b.to_grid().iter().flatten().sum();
        let shift = b.shift(Move::Left);
        let after: u32 = shift.board.to_grid().iter().flatten().sum();
        assert_eq!(after, before);
        // Each merge doubled exactly one pair, so delta equals the sum of
        // newly created values.
        assert_eq!(shift.delta, 4 + 8 + 16 + 4 + 8 + 4);
    }

    #[test]
    fn validity_iff_some_tile_moves() {
        let b = board([
            [2, 4, 8, 16],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
        ]);
        // Already packed left and against the top: only right/down move.
        assert_eq!(b.valid_moves(), vec![Move::Right, Move::Down]);
        assert!(!b.is_game_over());
    }

    #[test]
    fn gridlocked_board_has_no_valid_moves() {
        let b = board([
            [2, 4, 2, 4],
            [4, 2, 4, 2],
            [2, 4, 2, 4],
            [4, 2, 4, 2],
        ]);
        assert!(b.valid_moves().is_empty());
        assert!(b.is_game_over());
    }

    #[test]
    fn random_tile_fills_an_empty_cell() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut b = Board::EMPTY;
        for expected in 1..=16 {
            b = b.with_random_tile(&mut rng);
            assert_eq!(16 - b.count_empty(), expected);
        }
        // Full board: silently unchanged.
        let full = b.with_random_tile(&mut rng);
        assert_eq!(full.count_empty(), 0);
        assert_eq!(full.to_grid(), b.to_grid());
    }

    #[test]
    fn random_tiles_are_twos_or_fours() {
        let mut rng = StdRng::seed_from_u64(99);
        let mut twos = 0;
        let mut fours = 0;
        for _ in 0..400 {
            let b = Board::EMPTY.with_random_tile(&mut rng);
            match b.highest_tile() {
                2 => twos += 1,
                4 => fours += 1,
                other => panic!("unexpected spawn value {}", other),
            }
        }
        // 90/10 split; loose envelope to keep the test stable.
        assert!(twos > fours * 4);
        assert!(fours > 0);
    }

    #[test]
    fn make_move_spawns_only_when_moved() {
        let mut rng = StdRng::seed_from_u64(3);
        let b = board([[2, 0, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let noop = b.make_move(Move::Up, &mut rng);
        assert!(!noop.moved);
        assert_eq!(noop.board.count_empty(), 15);

        let moved = b.make_move(Move::Right, &mut rng);
        assert!(moved.moved);
        assert_eq!(moved.board.count_empty(), 14);
    }

    #[test]
    fn score_accumulates_across_moves() {
        let b = board([[2, 2, 4, 4], [0; 4], [0; 4], [0; 4]]);
        let first = b.shift(Move::Left);
        assert_eq!(first.board.score(), 12);
        let second = first.board.shift(Move::Left);
        // [4, 8, 0, 0] packs no further: score unchanged.
        assert_eq!(second.board.score(), 12);
        assert!(second.board.score() >= first.board.score());
    }

    #[test]
    fn from_grid_rejects_bad_values() {
        let mut grid = [[0u32; SIZE]; SIZE];
        grid[1][2] = 3;
        assert_eq!(
            Board::from_grid(grid),
            Err(EngineError::InvalidTileValue(1, 2, 3))
        );
        grid[1][2] = 1;
        assert!(Board::from_grid(grid).is_err());
        grid[1][2] = 2048;
        assert!(Board::from_grid(grid).is_ok());
    }

    #[test]
    fn move_index_round_trip() {
        for dir in Move::ALL {
            assert_eq!(Move::from_index(dir as u8), Some(dir));
        }
        assert_eq!(Move::from_index(4), None);
    }
}
