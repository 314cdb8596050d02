use serde::{Deserialize, Serialize};

use crate::column::MonthColumn;

/// Scenario id, 1..=12. Doubles as the encoded "as-of month" signal:
/// 1–9 are in-year scenarios, 10–12 year-end/rollover scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScenarioId(i64);

impl ScenarioId {
    pub fn new(raw: i64) -> Option<Self> {
        (1..=12).contains(&raw).then_some(Self(raw))
    }

    pub fn raw(self) -> i64 {
        self.0
    }

    pub fn as_of_month(self) -> u8 {
        self.0 as u8
    }

    /// 10–12 unlock the full current-year series.
    pub fn is_year_end(self) -> bool {
        self.0 >= 10
    }
}

/// The (fiscal year, scenario, cost center) triple a grid is loaded for.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridFilter {
    pub year: i32,
    pub scenario: ScenarioId,
    pub cfo_id: i64,
}

/// One loaded plan row: server identity, account label, and the 24
/// month cells in grid order. Row order is server-defined (by `p_id`)
/// and preserved for index-based addressing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRow {
    pub p_id: i64,
    pub acc_desc: String,
    months: Vec<Option<f64>>, // always 24, indexed by MonthColumn::grid_index
}

impl PlanRow {
    pub fn new(p_id: i64, acc_desc: impl Into<String>) -> Self {
        Self { p_id, acc_desc: acc_desc.into(), months: vec![None; 24] }
    }

    pub fn get(&self, col: MonthColumn) -> Option<f64> {
        self.months[col.grid_index()]
    }

    pub fn set(&mut self, col: MonthColumn, value: Option<f64>) {
        self.months[col.grid_index()] = value;
    }
}

/// A per-row change record for the batch commit: the server key plus
/// the truly-changed cells, blank cells carried as `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowChange {
    pub p_id: i64,
    pub fields: Vec<(MonthColumn, Option<f64>)>,
}

/// Scenario dimension entry as listed for selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: i64,
    pub code: String,
}

/// Cost center (CFO) dimension entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostCenter {
    pub id: i64,
    pub code: String,
}

/// An account not yet present in the loaded triple, offered for row addition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountChoice {
    pub id: i64,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_id_bounds() {
        assert!(ScenarioId::new(0).is_none());
        assert!(ScenarioId::new(13).is_none());
        assert_eq!(ScenarioId::new(5).unwrap().as_of_month(), 5);
        assert!(!ScenarioId::new(9).unwrap().is_year_end());
        assert!(ScenarioId::new(10).unwrap().is_year_end());
    }

    #[test]
    fn plan_row_cell_addressing() {
        let mut row = PlanRow::new(7, "Travel");
        let col = MonthColumn::parse("y1_m03").unwrap();
        assert_eq!(row.get(col), None);
        row.set(col, Some(12.5));
        assert_eq!(row.get(col), Some(12.5));
        // Other cells untouched
        assert_eq!(row.get(MonthColumn::parse("y0_m03").unwrap()), None);
    }
}
