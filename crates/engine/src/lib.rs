//! `planboard-engine` — Budget plan edit-reconciliation engine.
//!
//! Pure engine crate: tracks cell edits against their server baseline,
//! decides which columns accept input, and turns the dirty set into
//! per-row or batched commits against a storage collaborator.
//! No CLI or IO dependencies.

pub mod column;
pub mod error;
pub mod model;
pub mod policy;
pub mod session;
pub mod store;
pub mod tracker;
pub mod value;

pub use column::{MonthColumn, YearBucket};
pub use error::PlanError;
pub use model::{AccountChoice, CostCenter, GridFilter, PlanRow, RowChange, Scenario, ScenarioId};
pub use session::PlanSession;
pub use store::PlanStore;
pub use tracker::DiffTracker;
