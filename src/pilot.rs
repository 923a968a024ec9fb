//! Decision orchestrator: one automated move per board snapshot.
//!
//! Each turn runs the layers in fixed order: cheap single-clue propagation
//! first, the exact feasibility search only when propagation finds nothing,
//! and an informed random guess as the last resort. Producing no move means
//! the automation is exhausted; whether that counts as a win or a stuck
//! board is the host's call.

use log::debug;
use serde::Serialize;

use crate::exact;
use crate::guess;
use crate::propagate::propagate;
use crate::rng::MoveRng;
use crate::types::{BoardSnapshot, Cell, NeighborCache};

/// Which layer produced a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MoveOrigin {
    /// A single-clue rule proved the cell safe.
    Propagated,
    /// The feasibility search proved the cell safe.
    Proved,
    /// No certainty existed; the cell was the least-risky guess.
    Guessed,
}

/// One coordinate to reveal, tagged with how it was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub cell: Cell,
    pub origin: MoveOrigin,
}

/// A single automation session.
///
/// Holds the only state that outlives a turn: the running flag and the
/// random source. Independent sessions never share state, so concurrent
/// boards need no coordination. Stopping takes effect between turns and
/// never touches the board.
pub struct Autopilot {
    running: bool,
    rng: MoveRng,
}

impl Autopilot {
    /// A stopped session seeded from system entropy.
    pub fn new() -> Self {
        Self { running: false, rng: MoveRng::new() }
    }

    /// A stopped session with deterministic tie-breaking.
    pub fn with_seed(seed: u64) -> Self {
        Self { running: false, rng: MoveRng::from_seed(seed) }
    }

    /// Allow the session to produce moves.
    pub fn start(&mut self) {
        self.running = true;
    }

    /// Halt the session before its next turn.
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Compute the move for one turn, or `None` when the session is stopped
    /// or no layer can produce a cell. Exhaustion stops the session; it is
    /// not an error.
    pub fn next_move(&mut self, snapshot: &BoardSnapshot) -> Option<Move> {
        if !self.running {
            return None;
        }

        let cache = NeighborCache::new(snapshot.height, snapshot.width);

        let certain = propagate(snapshot, &cache);
        if !certain.safe.is_empty() {
            let mut safe: Vec<Cell> = certain.safe.into_iter().collect();
            safe.sort_unstable();
            if let Some(&cell) = self.rng.pick(&safe) {
                debug!("propagation picked ({}, {}) among {} safe cells", cell.0, cell.1, safe.len());
                return Some(Move { cell, origin: MoveOrigin::Propagated });
            }
        }

        if let Some(cell) = exact::find_certain_safe(snapshot, &cache) {
            return Some(Move { cell, origin: MoveOrigin::Proved });
        }

        if let Some(cell) = guess::safest_guess(snapshot, &cache, &mut self.rng) {
            debug!("no certain move, guessing ({}, {})", cell.0, cell.1);
            return Some(Move { cell, origin: MoveOrigin::Guessed });
        }

        debug!("automation exhausted, stopping session");
        self.running = false;
        None
    }
}

impl Default for Autopilot {
    fn default() -> Self {
        Self::new()
    }
}
