use crate::column::MonthColumn;
use crate::error::PlanError;
use crate::model::{AccountChoice, GridFilter, PlanRow, RowChange};

/// The storage collaborator boundary. Consumed by the commit engine,
/// implemented by `planboard-store` over SQLite (and by in-memory fakes
/// in tests).
///
/// `update_batch` is the only call with transactional semantics: every
/// row's update executes inside one transaction and any single failure
/// rolls back the whole batch, so concurrent readers never observe a
/// partially-applied save-all.
pub trait PlanStore {
    /// Rows for the (year, scenario, cost-center) triple, ordered by `p_id`.
    fn fetch_rows(&mut self, filter: &GridFilter) -> Result<Vec<PlanRow>, PlanError>;

    /// Partial column update of one row by primary key.
    fn update_row(
        &mut self,
        p_id: i64,
        fields: &[(MonthColumn, Option<f64>)],
    ) -> Result<(), PlanError>;

    /// Multi-row update in one transaction. Returns the updated keys on
    /// full success; any row failure rolls back everything.
    fn update_batch(&mut self, changes: &[RowChange]) -> Result<Vec<i64>, PlanError>;

    /// Create a plan row for an account in the triple (non-transactional).
    fn insert_account(&mut self, filter: &GridFilter, acc_id: i64) -> Result<(), PlanError>;

    /// Accounts not yet present in the triple, offered for row addition.
    fn account_choices(&mut self, filter: &GridFilter) -> Result<Vec<AccountChoice>, PlanError>;
}
