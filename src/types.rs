//! Core data types for the autopilot decision engine.
//!
//! The engine never owns the board. Each turn the host hands it a
//! [`BoardSnapshot`]: the revealed clues, the flagged cells, and the hidden
//! unflagged cells, which together partition the grid exactly. Coordinates
//! are `(row, col)` with `0 <= row < height` and `0 <= col < width`; flat
//! host grids use row-major layout, `cells[row * width + col]`.

use std::collections::{HashMap, HashSet};

use derive_more::{Display, Error};

/// A board coordinate as `(row, col)`.
pub type Cell = (usize, usize);

/// Rejected host input when building a snapshot from flat grids.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum SnapshotError {
    /// The visible grid does not hold exactly `width * height` cells.
    #[display("visible grid holds {got} cells, expected {expected}")]
    VisibleLength { expected: usize, got: usize },
    /// The flag grid does not hold exactly `width * height` cells.
    #[display("flag grid holds {got} cells, expected {expected}")]
    FlagLength { expected: usize, got: usize },
    /// A revealed cell carries a value outside the 0-8 clue range.
    #[display("cell {cell:?} holds clue value {value}, outside 0-8")]
    ClueOutOfRange { cell: Cell, value: i8 },
}

/// One turn's view of the board, rebuilt by the host before every decision.
///
/// `clues`, `flagged` and `unknown` partition the grid: every in-bounds
/// coordinate belongs to exactly one of the three. Flags are the player's
/// belief, not ground truth, and may be wrong.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardSnapshot {
    pub height: usize,
    pub width: usize,
    /// Revealed cell -> number of mines among its neighbors (0-8).
    pub clues: HashMap<Cell, u8>,
    /// Hidden cells marked as believed mines.
    pub flagged: HashSet<Cell>,
    /// Hidden, unflagged cells.
    pub unknown: HashSet<Cell>,
    /// Total mines on the whole board.
    pub total_mines: usize,
}

impl BoardSnapshot {
    /// Assemble a snapshot from parts the host already holds.
    pub fn new(
        height: usize,
        width: usize,
        clues: HashMap<Cell, u8>,
        flagged: HashSet<Cell>,
        unknown: HashSet<Cell>,
        total_mines: usize,
    ) -> Self {
        Self { height, width, clues, flagged, unknown, total_mines }
    }

    /// Build a snapshot from the flat grids a host passes over the WASM
    /// boundary.
    ///
    /// `visible` is row-major with `-1` for hidden cells and `0-8` for
    /// revealed clue values; `flags` is row-major with nonzero meaning
    /// flagged. A cell both revealed and flagged counts as revealed, so the
    /// partition holds by construction.
    pub fn from_flat(
        height: usize,
        width: usize,
        visible: &[i8],
        flags: &[u8],
        total_mines: usize,
    ) -> Result<Self, SnapshotError> {
        let expected = height * width;
        if visible.len() != expected {
            return Err(SnapshotError::VisibleLength { expected, got: visible.len() });
        }
        if flags.len() != expected {
            return Err(SnapshotError::FlagLength { expected, got: flags.len() });
        }

        let mut clues = HashMap::new();
        let mut flagged = HashSet::new();
        let mut unknown = HashSet::new();

        for row in 0..height {
            for col in 0..width {
                let cell = (row, col);
                let val = visible[row * width + col];
                match val {
                    0..=8 => {
                        clues.insert(cell, val as u8);
                    }
                    -1 => {
                        if flags[row * width + col] != 0 {
                            flagged.insert(cell);
                        } else {
                            unknown.insert(cell);
                        }
                    }
                    _ => return Err(SnapshotError::ClueOutOfRange { cell, value: val }),
                }
            }
        }

        Ok(Self { height, width, clues, flagged, unknown, total_mines })
    }

    /// True when `clues`, `flagged` and `unknown` partition the grid exactly:
    /// every in-bounds cell is in precisely one collection and no collection
    /// holds an out-of-bounds coordinate.
    pub fn partition_holds(&self) -> bool {
        let mut covered = 0usize;
        for row in 0..self.height {
            for col in 0..self.width {
                let cell = (row, col);
                let memberships = self.clues.contains_key(&cell) as usize
                    + self.flagged.contains(&cell) as usize
                    + self.unknown.contains(&cell) as usize;
                if memberships != 1 {
                    return false;
                }
                covered += 1;
            }
        }
        covered == self.clues.len() + self.flagged.len() + self.unknown.len()
    }

    /// Partition a clue's neighborhood into its hidden cells and a flagged
    /// count. Revealed neighbors carry no constraint weight and are dropped.
    pub fn split_neighbors(&self, cell: Cell, cache: &NeighborCache) -> NeighborSplit {
        let mut hidden = Vec::new();
        let mut flagged = 0usize;
        for &n in cache.neighbors(cell) {
            if self.unknown.contains(&n) {
                hidden.push(n);
            } else if self.flagged.contains(&n) {
                flagged += 1;
            }
        }
        NeighborSplit { hidden, flagged }
    }
}

/// A clue's neighborhood as the solving layers see it.
pub struct NeighborSplit {
    /// Hidden, unflagged neighbors, in row-major order.
    pub hidden: Vec<Cell>,
    /// Number of flagged neighbors.
    pub flagged: usize,
}

/// Pre-computed neighbor table for all cells of a grid.
///
/// Stores the in-bounds Moore neighbors (at most 8, never the cell itself)
/// for every cell. Indexed by `row * width + col`, each entry is a slice of
/// `(row, col)` pairs in row-major order.
pub struct NeighborCache {
    height: usize,
    width: usize,
    /// Flat storage of all neighbor pairs.
    data: Vec<Cell>,
    /// offsets[i] = start index in `data` for cell i.
    /// offsets[i+1] - offsets[i] = number of neighbors for cell i.
    offsets: Vec<usize>,
}

impl NeighborCache {
    /// Build the neighbor table for a grid of the given dimensions.
    pub fn new(height: usize, width: usize) -> Self {
        let total = height * width;
        let mut data = Vec::with_capacity(total * 8);
        let mut offsets = Vec::with_capacity(total + 1);

        for row in 0..height {
            for col in 0..width {
                offsets.push(data.len());
                for dr in -1i32..=1 {
                    for dc in -1i32..=1 {
                        if dr == 0 && dc == 0 {
                            continue;
                        }
                        let nr = row as i32 + dr;
                        let nc = col as i32 + dc;
                        if nr >= 0 && nr < height as i32 && nc >= 0 && nc < width as i32 {
                            data.push((nr as usize, nc as usize));
                        }
                    }
                }
            }
        }
        offsets.push(data.len()); // sentinel

        Self { height, width, data, offsets }
    }

    /// The pre-computed neighbors of `cell`.
    #[inline(always)]
    pub fn neighbors(&self, cell: Cell) -> &[Cell] {
        let idx = cell.0 * self.width + cell.1;
        let start = self.offsets[idx];
        let end = self.offsets[idx + 1];
        &self.data[start..end]
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }
}
