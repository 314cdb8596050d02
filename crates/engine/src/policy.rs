//! Editability policy: which of the 24 month columns accept input for
//! a given scenario. Pure functions, recomputed on every request —
//! never cached across scenario changes.

use crate::column::{MonthColumn, YearBucket};
use crate::model::ScenarioId;

/// Whether a cell in `column` is writable under the selected scenario.
///
/// Second-year columns are always eligible. First-year columns open up
/// from the scenario's as-of month onward, and a year-end scenario
/// (10–12) unlocks the whole first-year series. No scenario selected
/// means nothing is editable.
pub fn is_editable(column: MonthColumn, scenario: Option<ScenarioId>) -> bool {
    let Some(sce) = scenario else {
        return false;
    };
    match column.bucket() {
        YearBucket::Y1 => true,
        YearBucket::Y0 => sce.is_year_end() || column.month() >= sce.as_of_month(),
    }
}

/// Columns the grid shows for the selected scenario: first-year only
/// for in-year scenarios (1–9), all 24 for year-end scenarios (10–12),
/// none without a selection.
pub fn visible_columns(scenario: Option<ScenarioId>) -> Vec<MonthColumn> {
    let Some(sce) = scenario else {
        return Vec::new();
    };
    if sce.is_year_end() {
        MonthColumn::all().collect()
    } else {
        MonthColumn::all().filter(|c| c.bucket() == YearBucket::Y0).collect()
    }
}
