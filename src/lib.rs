//! WebAssembly Minesweeper autopilot.
//!
//! The core is a pure decision engine: the host owns the board and passes a
//! fresh snapshot each turn; the engine answers with one coordinate to
//! reveal, or nothing when automation is exhausted. Deduction runs in three
//! layers of increasing cost: single-clue propagation, exact constraint
//! feasibility, then a density-ranked guess.
//!
//! Flat grid data crossing the WASM boundary is row-major:
//! `cells[row * width + col]` maps to JS `grid[row][col]`.

pub mod exact;
pub mod guess;
pub mod pilot;
pub mod propagate;
pub mod rng;
pub mod types;

// ─── WASM Exports (only compiled for wasm32 target) ─────────────────────────

#[cfg(target_arch = "wasm32")]
mod wasm_exports {
    use serde::Serialize;
    use wasm_bindgen::prelude::*;

    use crate::pilot::{Autopilot, MoveOrigin};
    use crate::propagate;
    use crate::types::{BoardSnapshot, Cell, NeighborCache};

    #[derive(Serialize)]
    struct MoveOut {
        row: usize,
        col: usize,
        origin: MoveOrigin,
    }

    /// Compute one automated move for the given board view.
    ///
    /// `visible` is flat row-major with -1 for hidden cells and 0-8 for
    /// revealed clues; `flags` is flat row-major with nonzero meaning
    /// flagged. Returns `{ row, col, origin }` or `null` when no move
    /// exists. Pass a seed for reproducible tie-breaking.
    #[wasm_bindgen(js_name = "nextMove")]
    pub fn wasm_next_move(
        height: usize,
        width: usize,
        visible: &[i8],
        flags: &[u8],
        total_mines: usize,
        seed: Option<u32>,
    ) -> Result<JsValue, JsValue> {
        let snapshot = BoardSnapshot::from_flat(height, width, visible, flags, total_mines)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        let mut pilot = match seed {
            Some(seed) => Autopilot::with_seed(seed as u64),
            None => Autopilot::new(),
        };
        pilot.start();

        match pilot.next_move(&snapshot) {
            Some(mv) => {
                let out = MoveOut { row: mv.cell.0, col: mv.cell.1, origin: mv.origin };
                serde_wasm_bindgen::to_value(&out).map_err(|e| JsValue::from_str(&e.to_string()))
            }
            None => Ok(JsValue::NULL),
        }
    }

    /// Run one propagation pass and report every certain cell.
    /// Returns `{ safe: Int32Array, mines: Int32Array }` with cells as flat
    /// `[row0, col0, row1, col1, ...]` pairs, so a host can batch-reveal or
    /// batch-flag.
    #[wasm_bindgen(js_name = "certainMoves")]
    pub fn wasm_certain_moves(
        height: usize,
        width: usize,
        visible: &[i8],
        flags: &[u8],
    ) -> Result<JsValue, JsValue> {
        let snapshot = BoardSnapshot::from_flat(height, width, visible, flags, 0)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        let cache = NeighborCache::new(height, width);
        let certain = propagate::propagate(&snapshot, &cache);

        let mut safe: Vec<Cell> = certain.safe.into_iter().collect();
        safe.sort_unstable();
        let mut mines: Vec<Cell> = certain.mines.into_iter().collect();
        mines.sort_unstable();

        let obj = js_sys::Object::new();
        js_sys::Reflect::set(&obj, &"safe".into(), &flat_pairs(&safe).into()).unwrap();
        js_sys::Reflect::set(&obj, &"mines".into(), &flat_pairs(&mines).into()).unwrap();
        Ok(obj.into())
    }

    fn flat_pairs(cells: &[Cell]) -> js_sys::Int32Array {
        let mut flat = Vec::with_capacity(cells.len() * 2);
        for &(row, col) in cells {
            flat.push(row as i32);
            flat.push(col as i32);
        }
        let arr = js_sys::Int32Array::new_with_length(flat.len() as u32);
        arr.copy_from(&flat);
        arr
    }

    /// Ping function to verify WASM is loaded.
    #[wasm_bindgen(js_name = "ping")]
    pub fn wasm_ping() -> String {
        "WASM autopilot ready".to_string()
    }
}
