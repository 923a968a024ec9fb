//! Guess layer: least-risky cell when nothing is certain.
//!
//! Ranks hidden cells by the local mine density of the clues touching them
//! and picks uniformly at random among the cells tied at the minimum. With
//! no clue touching any hidden cell the choice is uniform over the whole
//! unknown set.

use crate::rng::MoveRng;
use crate::types::{BoardSnapshot, Cell, NeighborCache};

/// A clue's local mine density: remaining mines spread over its hidden
/// neighbors, clamped to [0, 1] so wrong flags can never push it outside.
pub(crate) fn local_density(count: u8, flagged: usize, hidden: usize) -> f64 {
    ((count as f64 - flagged as f64) / hidden as f64).clamp(0.0, 1.0)
}

/// Pick the hidden cell with the lowest local mine density, or a uniform
/// random hidden cell when no clue constrains any of them.
///
/// Every clue with at least one hidden neighbor contributes its density; the
/// running minimum starts at 1.0, a strictly smaller density restarts the
/// candidate union and an equal one extends it. Candidates are deduplicated
/// before the draw so a cell touched by several minimal clues is not
/// weighted twice. Returns `None` only when the unknown set is empty.
///
/// The snapshot's total mine count is not consulted yet; a global base-rate
/// prior for the unconstrained fallback would slot in here without an API
/// change.
pub fn safest_guess(
    snapshot: &BoardSnapshot,
    cache: &NeighborCache,
    rng: &mut MoveRng,
) -> Option<Cell> {
    let mut min_density = 1.0f64;
    let mut candidates: Vec<Cell> = Vec::new();

    for (&clue, &count) in &snapshot.clues {
        let split = snapshot.split_neighbors(clue, cache);
        if split.hidden.is_empty() {
            continue;
        }

        let density = local_density(count, split.flagged, split.hidden.len());
        if density < min_density {
            min_density = density;
            candidates.clear();
            candidates.extend(split.hidden.iter().copied());
        } else if density == min_density {
            candidates.extend(split.hidden.iter().copied());
        }
    }

    if !candidates.is_empty() {
        candidates.sort_unstable();
        candidates.dedup();
        return rng.pick(&candidates).copied();
    }

    // No clue borders a hidden cell; fall back to a uniform draw.
    let mut open: Vec<Cell> = snapshot.unknown.iter().copied().collect();
    if open.is_empty() {
        return None;
    }
    open.sort_unstable();
    rng.pick(&open).copied()
}
