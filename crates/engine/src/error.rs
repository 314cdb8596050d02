use std::fmt;

/// Error type for grid edit and commit operations.
///
/// Keystroke validation failures are deliberately NOT represented here:
/// a rejected keystroke mutates nothing and `DiffTracker::record_edit`
/// just returns `false`.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanError {
    /// Single-row save requested but the row has no net changes.
    NoChanges,
    /// Batch save requested but no row has any net changes.
    NothingToSave,
    /// Row index outside the loaded grid.
    UnknownRow(usize),
    /// Storage collaborator failure, message passed through verbatim.
    Storage(String),
    /// A row in a batch failed; the whole batch was rolled back.
    TransactionAborted { p_id: i64, message: String },
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoChanges => write!(f, "no changes to save for this row"),
            Self::NothingToSave => write!(f, "nothing to save"),
            Self::UnknownRow(idx) => write!(f, "no row at index {idx}"),
            Self::Storage(msg) => write!(f, "storage error: {msg}"),
            Self::TransactionAborted { p_id, message } => {
                write!(f, "batch rolled back at row {p_id}: {message}")
            }
        }
    }
}

impl std::error::Error for PlanError {}
