//! Edit session: the request-scoped context tying the loaded grid, the
//! diff tracker, and the commit engine together. No ambient globals —
//! every session owns its own state, so concurrent sessions and
//! deterministic tests come for free.

use std::time::{Duration, Instant};

use crate::column::MonthColumn;
use crate::error::PlanError;
use crate::model::{AccountChoice, GridFilter, PlanRow, RowChange};
use crate::policy;
use crate::store::PlanStore;
use crate::tracker::DiffTracker;

/// How long a freshly added account row stays highlighted.
pub const NEW_ROW_HIGHLIGHT: Duration = Duration::from_secs(3);

pub struct PlanSession {
    filter: GridFilter,
    rows: Vec<PlanRow>,
    tracker: DiffTracker,
    account_choices: Vec<AccountChoice>,
    new_row_mark: Option<(usize, Instant)>,
}

impl PlanSession {
    /// Load a fresh grid for the triple. Any previous edit state is gone:
    /// cell edits live exactly as long as the grid they were made against.
    pub fn load(store: &mut dyn PlanStore, filter: GridFilter) -> Result<Self, PlanError> {
        let rows = store.fetch_rows(&filter)?;
        let account_choices = store.account_choices(&filter)?;
        Ok(Self {
            filter,
            rows,
            tracker: DiffTracker::new(),
            account_choices,
            new_row_mark: None,
        })
    }

    pub fn filter(&self) -> &GridFilter {
        &self.filter
    }

    pub fn rows(&self) -> &[PlanRow] {
        &self.rows
    }

    pub fn tracker(&self) -> &DiffTracker {
        &self.tracker
    }

    pub fn account_choices(&self) -> &[AccountChoice] {
        &self.account_choices
    }

    pub fn is_editable(&self, col: MonthColumn) -> bool {
        policy::is_editable(col, Some(self.filter.scenario))
    }

    pub fn visible_columns(&self) -> Vec<MonthColumn> {
        policy::visible_columns(Some(self.filter.scenario))
    }

    /// Route a keystroke into the tracker. The editability policy gates
    /// first; a cell that is not writable never reaches the tracker.
    /// Returns whether the input was accepted.
    pub fn record_edit(&mut self, row: usize, col: MonthColumn, raw: &str) -> bool {
        let Some(plan_row) = self.rows.get(row) else {
            return false;
        };
        if !self.is_editable(col) {
            return false;
        }
        let baseline = plan_row.get(col);
        self.tracker.record_edit(row, col, raw, baseline)
    }

    /// Settle a cell on blur (normalize, prune if equal to baseline).
    pub fn commit_blur(&mut self, row: usize, col: MonthColumn, raw: &str) {
        self.tracker.commit_blur(row, col, raw);
    }

    pub fn has_row_changes(&self, row: usize) -> bool {
        self.tracker.has_row_changes(row)
    }

    pub fn has_any_changes(&self) -> bool {
        self.tracker.has_any_changes()
    }

    /// Current cell text: pending edit if present, else the baseline
    /// rendered at two fraction digits.
    pub fn cell_display(&self, row: usize, col: MonthColumn) -> String {
        let baseline = self.rows.get(row).and_then(|r| r.get(col));
        self.tracker.display_value(row, col, baseline)
    }

    /// Commit one row's net changes. No storage call happens when the
    /// filtered set is empty. Success clears the row's tracker entries
    /// and re-fetches the grid (read-your-write by reload); failure
    /// leaves the tracker untouched and performs no reload.
    pub fn save_row(&mut self, store: &mut dyn PlanStore, row: usize) -> Result<(), PlanError> {
        let plan_row = self.rows.get(row).ok_or(PlanError::UnknownRow(row))?;
        let fields = self.tracker.row_changes(row);
        if fields.is_empty() {
            return Err(PlanError::NoChanges);
        }
        store.update_row(plan_row.p_id, &fields)?;
        self.tracker.clear_row(row);
        self.reload(store)
    }

    /// Commit every dirty row as one transaction. Rows whose edits
    /// settled back to baseline are skipped; an empty gathered list is
    /// reported as `NothingToSave` without a storage call. Full success
    /// clears the whole tracker and reloads; any failure leaves every
    /// edit in place so the user can retry.
    pub fn save_all(&mut self, store: &mut dyn PlanStore) -> Result<Vec<i64>, PlanError> {
        let mut changes = Vec::new();
        for (idx, plan_row) in self.rows.iter().enumerate() {
            let fields = self.tracker.row_changes(idx);
            if !fields.is_empty() {
                changes.push(RowChange { p_id: plan_row.p_id, fields });
            }
        }
        if changes.is_empty() {
            return Err(PlanError::NothingToSave);
        }
        let updated = store.update_batch(&changes)?;
        self.tracker.clear();
        self.reload(store)?;
        Ok(updated)
    }

    /// Insert a new account row into the current triple, then refresh
    /// both the account choices and the grid. The appended row (last
    /// index of the reloaded sequence) is marked for a transient
    /// highlight.
    pub fn add_account_row(&mut self, store: &mut dyn PlanStore, acc_id: i64) -> Result<(), PlanError> {
        store.insert_account(&self.filter, acc_id)?;
        self.account_choices = store.account_choices(&self.filter)?;
        self.reload(store)?;
        if !self.rows.is_empty() {
            self.new_row_mark = Some((self.rows.len() - 1, Instant::now()));
        }
        Ok(())
    }

    /// The row to highlight as newly added, if the mark has not expired.
    pub fn highlighted_row(&self) -> Option<usize> {
        self.new_row_mark
            .and_then(|(idx, at)| (at.elapsed() < NEW_ROW_HIGHLIGHT).then_some(idx))
    }

    fn reload(&mut self, store: &mut dyn PlanStore) -> Result<(), PlanError> {
        self.rows = store.fetch_rows(&self.filter)?;
        Ok(())
    }
}
