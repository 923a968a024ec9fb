//! Exact layer: global constraint feasibility.
//!
//! Models every hidden cell as a binary mine indicator and every clue as an
//! equality over the indicators of its hidden neighbors (flagged cells are
//! never variables). The clue/variable graph splits into connected
//! components that are solvable independently; each component's consistent
//! assignments are enumerated once and every cell's always-safe /
//! always-mine status is read off that single pass, instead of re-running a
//! search per candidate cell.

use std::collections::{HashMap, HashSet};

use log::debug;

use crate::types::{BoardSnapshot, Cell, NeighborCache};

/// Components with more variables than this are not enumerated; their cells
/// stay unresolved and fall through to the guess layer.
pub(crate) const MAX_COMPONENT_VARS: usize = 20;

/// One clue's equality: the mine indicators of `vars` must sum to `target`.
struct Constraint {
    /// Variable ids, indices into the owning component's `cells`.
    vars: Vec<usize>,
    target: i32,
}

/// An independently solvable cluster of hidden cells and the constraints
/// touching them.
struct Component {
    /// Hidden cells in row-major order; index = variable id.
    cells: Vec<Cell>,
    constraints: Vec<Constraint>,
}

/// Certain verdicts from one enumeration pass over every component.
#[derive(Debug, Default)]
pub struct ExactClassification {
    pub safe: Vec<Cell>,
    pub mines: Vec<Cell>,
}

// ─── Constraint system construction ─────────────────────────────────────────

/// Derive constraints from the snapshot and group them into connected
/// components. Two hidden cells are connected when some clue touches both.
///
/// Components come out smallest first, ties in row-major discovery order, so
/// scans over them are deterministic within a run.
fn build_components(snapshot: &BoardSnapshot, cache: &NeighborCache) -> Vec<Component> {
    // Constraints in cell space: hidden neighbors and remaining mine count
    let mut raw: Vec<(Vec<Cell>, i32)> = Vec::new();
    for (&clue, &count) in &snapshot.clues {
        let split = snapshot.split_neighbors(clue, cache);
        if split.hidden.is_empty() {
            continue;
        }
        raw.push((split.hidden, count as i32 - split.flagged as i32));
    }

    let mut touching: HashMap<Cell, Vec<usize>> = HashMap::new();
    for (i, (cells, _)) in raw.iter().enumerate() {
        for &cell in cells {
            touching.entry(cell).or_default().push(i);
        }
    }

    let mut seeds: Vec<Cell> = touching.keys().copied().collect();
    seeds.sort_unstable();

    let mut visited: HashSet<Cell> = HashSet::new();
    let mut components = Vec::new();

    for &seed in &seeds {
        if visited.contains(&seed) {
            continue;
        }
        visited.insert(seed);

        let mut cells = Vec::new();
        let mut constraint_ids = Vec::new();
        let mut seen_constraints: HashSet<usize> = HashSet::new();
        let mut queue = vec![seed];

        while let Some(cell) = queue.pop() {
            cells.push(cell);
            for &ci in &touching[&cell] {
                if !seen_constraints.insert(ci) {
                    continue;
                }
                constraint_ids.push(ci);
                for &other in &raw[ci].0 {
                    if visited.insert(other) {
                        queue.push(other);
                    }
                }
            }
        }

        cells.sort_unstable();
        let index_of: HashMap<Cell, usize> =
            cells.iter().enumerate().map(|(i, &c)| (c, i)).collect();
        let constraints = constraint_ids
            .iter()
            .map(|&ci| Constraint {
                vars: raw[ci].0.iter().map(|c| index_of[c]).collect(),
                target: raw[ci].1,
            })
            .collect();

        components.push(Component { cells, constraints });
    }

    components.sort_by_key(|c| c.cells.len());
    components
}

// ─── Assignment enumeration ─────────────────────────────────────────────────

/// All assignments satisfying a component's constraints, as bit masks over
/// its variables. `None` when the component is too large to enumerate.
fn consistent_assignments(component: &Component) -> Option<Vec<u32>> {
    let n = component.cells.len();
    if n > MAX_COMPONENT_VARS {
        return None;
    }

    let mut valid = Vec::new();
    for mask in 0u32..(1u32 << n) {
        let satisfies = component.constraints.iter().all(|c| {
            let mines = c.vars.iter().filter(|&&v| (mask >> v) & 1 == 1).count() as i32;
            mines == c.target
        });
        if satisfies {
            valid.push(mask);
        }
    }
    Some(valid)
}

/// Cells fixed to the same value in every consistent assignment.
fn forced_cells(component: &Component, valid: &[u32]) -> (Vec<Cell>, Vec<Cell>) {
    let mut safe = Vec::new();
    let mut mines = Vec::new();

    for i in 0..component.cells.len() {
        let mut always_mine = true;
        let mut always_safe = true;

        for &mask in valid {
            if (mask >> i) & 1 == 0 {
                always_mine = false;
            } else {
                always_safe = false;
            }
        }

        if always_safe {
            safe.push(component.cells[i]);
        }
        if always_mine {
            mines.push(component.cells[i]);
        }
    }

    (safe, mines)
}

// ─── Public queries ─────────────────────────────────────────────────────────

/// Classify every enumerable component in one pass.
///
/// Oversized components are skipped, as are components with zero consistent
/// assignments (clues contradicting flags or each other; such snapshots are
/// outside the engine's input contract and yield no proof).
pub fn classify(snapshot: &BoardSnapshot, cache: &NeighborCache) -> ExactClassification {
    let components = build_components(snapshot, cache);
    let mut out = ExactClassification::default();

    for component in &components {
        let valid = match consistent_assignments(component) {
            Some(v) => v,
            None => continue,
        };
        if valid.is_empty() {
            continue;
        }
        let (safe, mines) = forced_cells(component, &valid);
        out.safe.extend(safe);
        out.mines.extend(mines);
    }

    debug!(
        "exact layer classified {} safe / {} mine cells across {} components",
        out.safe.len(),
        out.mines.len(),
        components.len()
    );
    out
}

/// Find one certainly-safe cell, or `None` when no cell can be proved safe.
///
/// Walks components smallest first and stops at the first component that
/// forces a cell to be safe in all of its consistent assignments.
pub fn find_certain_safe(snapshot: &BoardSnapshot, cache: &NeighborCache) -> Option<Cell> {
    let components = build_components(snapshot, cache);

    for component in &components {
        let valid = match consistent_assignments(component) {
            Some(v) => v,
            None => continue,
        };
        if valid.is_empty() {
            continue;
        }
        let (safe, _) = forced_cells(component, &valid);
        if let Some(&cell) = safe.first() {
            debug!(
                "exact layer proved ({}, {}) safe in a {}-variable component",
                cell.0,
                cell.1,
                component.cells.len()
            );
            return Some(cell);
        }
    }

    None
}

/// Satisfiability of the constraint system with `cell`'s indicator forced
/// to 1. Infeasible means the cell is certainly safe.
///
/// Pure: identical snapshots give identical verdicts on every call. A cell
/// no constraint touches is trivially feasible as a mine, and a component
/// too large to enumerate is reported feasible since nothing refutes it.
pub fn forced_mine_is_feasible(
    snapshot: &BoardSnapshot,
    cache: &NeighborCache,
    cell: Cell,
) -> bool {
    let components = build_components(snapshot, cache);

    for component in &components {
        if let Some(idx) = component.cells.iter().position(|&c| c == cell) {
            let valid = match consistent_assignments(component) {
                Some(v) => v,
                None => return true,
            };
            return valid.iter().any(|&mask| (mask >> idx) & 1 == 1);
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::propagate::propagate;

    fn snap(height: usize, width: usize, visible: &[i8], flags: &[u8]) -> BoardSnapshot {
        BoardSnapshot::from_flat(height, width, visible, flags, 10).unwrap()
    }

    /// 2x3 board, mine at (0,1): clues 1-1-1 below a hidden row. No single
    /// clue resolves anything, but jointly (0,0) and (0,2) are safe and
    /// (0,1) is a mine.
    fn overlap_board() -> (BoardSnapshot, NeighborCache) {
        let visible = [
            -1, -1, -1, //
            1, 1, 1,
        ];
        (snap(2, 3, &visible, &[0u8; 6]), NeighborCache::new(2, 3))
    }

    #[test]
    fn test_resolves_cells_propagation_cannot() {
        let (s, nc) = overlap_board();

        let prop = propagate(&s, &nc);
        assert!(prop.safe.is_empty() && prop.mines.is_empty());

        let verdicts = classify(&s, &nc);
        assert_eq!(verdicts.safe, vec![(0, 0), (0, 2)]);
        assert_eq!(verdicts.mines, vec![(0, 1)]);
    }

    #[test]
    fn test_find_certain_safe_returns_first_forced_cell() {
        let (s, nc) = overlap_board();
        assert_eq!(find_certain_safe(&s, &nc), Some((0, 0)));
    }

    #[test]
    fn test_mine_only_resolution_yields_no_safe_move() {
        // Clue (1,0)=1 over {a,b}; clue (1,1)=3 with one flagged neighbor
        // over {a,b,c}. Subtracting forces c to be a mine, nothing is safe.
        let visible = [
            -1, -1, -1, //
            1, 3, -1,
        ];
        let mut flags = [0u8; 6];
        flags[5] = 1; // (1,2)
        let s = snap(2, 3, &visible, &flags);
        let nc = NeighborCache::new(2, 3);

        let verdicts = classify(&s, &nc);
        assert_eq!(verdicts.mines, vec![(0, 2)]);
        assert!(verdicts.safe.is_empty());
        assert_eq!(find_certain_safe(&s, &nc), None);
    }

    #[test]
    fn test_agrees_with_propagation_verdicts() {
        // Saturated-rule board: propagation proves (2,2) safe, the exact
        // layer must concur.
        let visible = [
            -1, 1, 0, //
            1, 1, 0, //
            0, 0, -1,
        ];
        let mut flags = [0u8; 9];
        flags[0] = 1; // (0,0)
        let s = snap(3, 3, &visible, &flags);
        let nc = NeighborCache::new(3, 3);

        let prop = propagate(&s, &nc);
        assert!(prop.safe.contains(&(2, 2)));

        assert!(classify(&s, &nc).safe.contains(&(2, 2)));
        assert!(!forced_mine_is_feasible(&s, &nc, (2, 2)));
    }

    #[test]
    fn test_feasibility_verdict_is_deterministic() {
        let (s, nc) = overlap_board();
        let first = forced_mine_is_feasible(&s, &nc, (0, 0));
        for _ in 0..10 {
            assert_eq!(forced_mine_is_feasible(&s, &nc, (0, 0)), first);
        }
        // (0,0) is forced safe, so forcing it to be a mine is infeasible
        assert!(!first);
        // (0,1) is forced to be a mine, so the forcing is feasible
        assert!(forced_mine_is_feasible(&s, &nc, (0, 1)));
    }

    #[test]
    fn test_independent_components_solved_separately() {
        // Two three-cell puzzles at opposite ends of a 2x8 board, separated
        // by revealed zeros so no constraint spans both. Mines at (0,1) and
        // (0,6).
        let visible = [
            -1, -1, -1, 0, 0, -1, -1, -1, //
            1, 1, 1, 0, 0, 1, 1, 1,
        ];
        let s = snap(2, 8, &visible, &[0u8; 16]);
        let nc = NeighborCache::new(2, 8);

        let verdicts = classify(&s, &nc);
        assert_eq!(verdicts.safe, vec![(0, 0), (0, 2), (0, 5), (0, 7)]);
        assert_eq!(verdicts.mines, vec![(0, 1), (0, 6)]);
    }

    #[test]
    fn test_oversized_component_is_skipped() {
        // A single chained component with 22 variables exceeds the
        // enumeration cap: no proof, no hang.
        let width = 22;
        let mut visible = vec![-1i8; width];
        visible.extend(std::iter::repeat(1i8).take(width));
        let flags = vec![0u8; 2 * width];
        let s = snap(2, width, &visible, &flags);
        let nc = NeighborCache::new(2, width);

        let verdicts = classify(&s, &nc);
        assert!(verdicts.safe.is_empty() && verdicts.mines.is_empty());
        assert_eq!(find_certain_safe(&s, &nc), None);
        assert!(forced_mine_is_feasible(&s, &nc, (0, 0)));
    }

    #[test]
    fn test_unconstrained_cells_are_never_proved() {
        // All hidden, no clues at all
        let visible = [-1i8; 9];
        let s = snap(3, 3, &visible, &[0u8; 9]);
        let nc = NeighborCache::new(3, 3);

        assert_eq!(find_certain_safe(&s, &nc), None);
        assert!(forced_mine_is_feasible(&s, &nc, (1, 1)));
        let verdicts = classify(&s, &nc);
        assert!(verdicts.safe.is_empty() && verdicts.mines.is_empty());
    }

    #[test]
    fn test_propagation_verdicts_hold_under_enumeration() {
        // Single-clue deductions are a subset of what enumeration proves:
        // every propagated verdict must reappear in the classification.
        let boards: [(&[i8], &[u8]); 2] = [
            // Exhausted rule: (0,0) is a forced mine
            (&[-1, 1, 0, 1, 1, 0, 0, 0, 0], &[0; 9]),
            // Saturated rule: (2,2) is forced safe behind the flag at (0,0)
            (&[-1, 1, 0, 1, 1, 0, 0, 0, -1], &[1, 0, 0, 0, 0, 0, 0, 0, 0]),
        ];

        for (visible, flags) in boards {
            let s = snap(3, 3, visible, flags);
            let nc = NeighborCache::new(3, 3);
            let prop = propagate(&s, &nc);
            let verdicts = classify(&s, &nc);

            for cell in &prop.safe {
                assert!(verdicts.safe.contains(cell), "{:?} lost its safe verdict", cell);
            }
            for cell in &prop.mines {
                assert!(verdicts.mines.contains(cell), "{:?} lost its mine verdict", cell);
            }
        }
    }

    #[test]
    fn test_contradictory_clues_yield_no_proof() {
        // (0,1)=1 demands the lone hidden cell be a mine; (1,0)=0 and
        // (1,1)=0 demand it be safe. Zero consistent assignments: classify
        // takes no verdict, the raw feasibility query reports infeasible.
        let visible = [
            -1, 1, //
            0, 0,
        ];
        let s = snap(2, 2, &visible, &[0u8; 4]);
        let nc = NeighborCache::new(2, 2);

        let verdicts = classify(&s, &nc);
        assert!(verdicts.safe.is_empty() && verdicts.mines.is_empty());
        assert_eq!(find_certain_safe(&s, &nc), None);
        assert!(!forced_mine_is_feasible(&s, &nc, (0, 0)));
    }
}
