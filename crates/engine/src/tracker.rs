//! Diff tracker: the in-memory map of touched cells and their server
//! baseline, with the derived changed-flag per cell.
//!
//! An entry exists only while its value differs from baseline or while
//! it is mid-edit awaiting blur. Settled no-op entries are pruned
//! eagerly — the tracker never accumulates stale entries.

use rustc_hash::FxHashMap;

use crate::column::MonthColumn;
use crate::value;

/// Per-cell edit lifecycle. `Typing` entries hold raw keystrokes and may
/// transiently equal the baseline; `Settled` entries have been
/// blur-normalized and are always genuinely changed (equal-to-baseline
/// entries are removed instead of settling).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditPhase {
    Typing,
    Settled,
}

/// One touched cell: the user's value and the baseline it is compared to.
#[derive(Debug, Clone, PartialEq)]
pub struct CellEdit {
    pub new_value: String,
    pub original: Option<f64>,
    pub phase: EditPhase,
    /// Derived, never authoritative: recomputed on every mutation as
    /// `!values_are_equal(new_value, baseline)`.
    pub changed: bool,
}

#[derive(Debug, Default)]
pub struct DiffTracker {
    cells: FxHashMap<usize, FxHashMap<MonthColumn, CellEdit>>,
}

impl DiffTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a keystroke. Invalid input is rejected with no state
    /// change; valid input is stored verbatim (not yet normalized)
    /// against the row's baseline snapshot. Returns whether the input
    /// was accepted.
    pub fn record_edit(
        &mut self,
        row: usize,
        col: MonthColumn,
        raw: &str,
        baseline: Option<f64>,
    ) -> bool {
        if !value::is_valid_cell_input(raw) {
            return false;
        }
        let changed = !value::values_are_equal(raw, &value::baseline_text(baseline));
        self.cells.entry(row).or_default().insert(
            col,
            CellEdit {
                new_value: raw.to_string(),
                original: baseline,
                phase: EditPhase::Typing,
                changed,
            },
        );
        true
    }

    /// Settle a cell on blur. Blank input restores the baseline by
    /// deleting the entry; otherwise the value is normalized to two
    /// fraction digits and re-stored. A settled value equal to baseline
    /// is pruned entirely — formatting round-trips never leave false
    /// positives behind.
    pub fn commit_blur(&mut self, row: usize, col: MonthColumn, raw: &str) {
        let Some(row_map) = self.cells.get_mut(&row) else {
            return;
        };
        let Some(entry) = row_map.get_mut(&col) else {
            return;
        };

        if raw.trim().is_empty() {
            Self::prune(&mut self.cells, row, col);
            return;
        }

        // Non-numeric leftovers (a lone "-") keep their canonical text;
        // they parse to null at commit time.
        let settled = value::settle(raw).unwrap_or_else(|| value::canon(raw));
        if value::values_are_equal(&settled, &value::baseline_text(entry.original)) {
            Self::prune(&mut self.cells, row, col);
            return;
        }

        entry.new_value = settled;
        entry.phase = EditPhase::Settled;
        entry.changed = true;
    }

    fn prune(cells: &mut FxHashMap<usize, FxHashMap<MonthColumn, CellEdit>>, row: usize, col: MonthColumn) {
        if let Some(row_map) = cells.get_mut(&row) {
            row_map.remove(&col);
            if row_map.is_empty() {
                cells.remove(&row);
            }
        }
    }

    pub fn get(&self, row: usize, col: MonthColumn) -> Option<&CellEdit> {
        self.cells.get(&row).and_then(|m| m.get(&col))
    }

    /// The cell's current text: the pending edit if present, otherwise
    /// the baseline rendering.
    pub fn display_value(&self, row: usize, col: MonthColumn, baseline: Option<f64>) -> String {
        match self.get(row, col) {
            Some(edit) => edit.new_value.clone(),
            None => value::baseline_text(baseline),
        }
    }

    /// True iff any cell entry for the row carries a changed-flag.
    pub fn has_row_changes(&self, row: usize) -> bool {
        self.cells
            .get(&row)
            .map_or(false, |m| m.values().any(|e| e.changed))
    }

    /// True iff the tracker holds any entry at all.
    pub fn has_any_changes(&self) -> bool {
        !self.cells.is_empty()
    }

    /// The row's truly-changed cells as commit payload, in column order.
    /// Re-checks `values_are_equal` — the single-row and batch commit
    /// paths filter through this one function.
    pub fn row_changes(&self, row: usize) -> Vec<(MonthColumn, Option<f64>)> {
        let Some(row_map) = self.cells.get(&row) else {
            return Vec::new();
        };
        let mut fields: Vec<(MonthColumn, Option<f64>)> = row_map
            .iter()
            .filter(|(_, edit)| {
                !value::values_are_equal(&edit.new_value, &value::baseline_text(edit.original))
            })
            .map(|(col, edit)| (*col, value::parse_decimal(&edit.new_value)))
            .collect();
        fields.sort_by_key(|(col, _)| *col);
        fields
    }

    /// Row indices with at least one truly-changed cell, ascending.
    pub fn dirty_rows(&self) -> Vec<usize> {
        let mut rows: Vec<usize> = self
            .cells
            .keys()
            .copied()
            .filter(|row| !self.row_changes(*row).is_empty())
            .collect();
        rows.sort_unstable();
        rows
    }

    pub fn clear_row(&mut self, row: usize) {
        self.cells.remove(&row);
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Invariant check: every settled entry must carry a true
    /// changed-flag (no-op entries are pruned at blur, never kept).
    pub fn settled_entries_all_changed(&self) -> bool {
        self.cells
            .values()
            .flat_map(|m| m.values())
            .all(|e| e.phase == EditPhase::Typing || e.changed)
    }
}
