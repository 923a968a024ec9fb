//! Fast layer: single-clue counting rules.
//!
//! One pass over the clues, two rules per clue, results unioned across all
//! clues. Catches only contradictions visible from one clue at a time;
//! deductions that need several overlapping clues belong to the exact layer.

use std::collections::HashSet;

use crate::types::{BoardSnapshot, Cell, NeighborCache};

/// Cells a single propagation pass proved safe or proved to be mines.
/// Either set may be empty; no ordering is guaranteed.
#[derive(Debug, Default)]
pub struct Propagation {
    pub safe: HashSet<Cell>,
    pub mines: HashSet<Cell>,
}

/// Run one propagation pass over every clue.
///
/// Per clue, with `hidden` its unknown neighbors and `flagged` its flagged
/// neighbor count:
///
/// - saturated: `flagged == clue value` and hidden cells exist, so every
///   hidden neighbor is safe;
/// - exhausted: `clue value == hidden + flagged`, so every hidden neighbor
///   is a mine.
///
/// Cost is O(clues * 8).
pub fn propagate(snapshot: &BoardSnapshot, cache: &NeighborCache) -> Propagation {
    let mut result = Propagation::default();

    for (&clue, &count) in &snapshot.clues {
        let split = snapshot.split_neighbors(clue, cache);
        if split.hidden.is_empty() {
            continue;
        }
        let count = count as usize;

        if count == split.flagged {
            result.safe.extend(split.hidden.iter().copied());
        } else if count == split.hidden.len() + split.flagged {
            result.mines.extend(split.hidden.iter().copied());
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(height: usize, width: usize, visible: &[i8], flags: &[u8]) -> BoardSnapshot {
        BoardSnapshot::from_flat(height, width, visible, flags, 10).unwrap()
    }

    #[test]
    fn test_exhausted_rule_marks_lone_hidden_neighbor_as_mine() {
        // Clue (1,1)=1 with (0,0) as its only hidden neighbor, no flags:
        // 1 == 1 hidden + 0 flagged, so (0,0) is a mine.
        let visible = [
            -1, 1, 0, //
            1, 1, 0, //
            0, 0, 0,
        ];
        let flags = [0u8; 9];
        let result = propagate(&snap(3, 3, &visible, &flags), &NeighborCache::new(3, 3));

        assert!(result.mines.contains(&(0, 0)));
        assert!(result.safe.is_empty());
    }

    #[test]
    fn test_saturated_rule_marks_hidden_neighbor_safe() {
        // Clue (1,1)=1 with flagged (0,0) and hidden (2,2):
        // flagged count 1 == clue value 1, so (2,2) is safe.
        let visible = [
            -1, 1, 0, //
            1, 1, 0, //
            0, 0, -1,
        ];
        let mut flags = [0u8; 9];
        flags[0] = 1; // (0,0)
        let result = propagate(&snap(3, 3, &visible, &flags), &NeighborCache::new(3, 3));

        assert!(result.safe.contains(&(2, 2)));
        assert!(result.mines.is_empty());
    }

    #[test]
    fn test_results_union_across_clues() {
        // Two independent exhausted clues on a 1x5 strip: hidden (0,0) forced
        // by clue (0,1)=1, hidden (0,4) forced by clue (0,3)=1.
        let visible = [-1, 1, 0, 1, -1];
        let flags = [0u8; 5];
        let result = propagate(&snap(1, 5, &visible, &flags), &NeighborCache::new(1, 5));

        assert!(result.mines.contains(&(0, 0)));
        assert!(result.mines.contains(&(0, 4)));
        assert_eq!(result.mines.len(), 2);
    }

    #[test]
    fn test_no_single_clue_rule_fires_on_overlapping_ambiguity() {
        // Clues (1,0)=1 and (1,1)=1 over hidden row 0 of a 2x3 board: each
        // clue sees 2-3 hidden neighbors and no flags, so neither rule fires.
        let visible = [
            -1, -1, -1, //
            1, 1, 1,
        ];
        let flags = [0u8; 6];
        let result = propagate(&snap(2, 3, &visible, &flags), &NeighborCache::new(2, 3));

        assert!(result.safe.is_empty());
        assert!(result.mines.is_empty());
    }

    #[test]
    fn test_clue_with_no_hidden_neighbors_contributes_nothing() {
        let visible = [0, 0, 0, 0];
        let flags = [0u8; 4];
        let result = propagate(&snap(2, 2, &visible, &flags), &NeighborCache::new(2, 2));

        assert!(result.safe.is_empty());
        assert!(result.mines.is_empty());
    }

    #[test]
    fn test_overflagged_clue_fires_no_rule() {
        // (0,0) flagged, (0,1) hidden. Clue (1,0)=0 is overflagged
        // (0 flagged-matches nothing) and clue (1,1)=3 matches neither rule,
        // so nothing is claimed.
        let visible = [-1, -1, 0, 3];
        let flags = [1u8, 0, 0, 0];
        let result = propagate(&snap(2, 2, &visible, &flags), &NeighborCache::new(2, 2));

        assert!(result.safe.is_empty());
        assert!(result.mines.is_empty());
    }
}
