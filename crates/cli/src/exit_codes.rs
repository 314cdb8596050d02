//! CLI Exit Code Registry
//!
//! Single source of truth for `planctl` exit codes. Exit codes are part
//! of the shell contract — scripts rely on them.
//!
//! | Code | Meaning                                            |
//! |------|----------------------------------------------------|
//! | 0    | Success                                            |
//! | 1    | General error                                      |
//! | 2    | Usage error (bad args, invalid column, bad value)  |
//! | 3    | Nothing to save (empty net diff)                   |
//! | 4    | Storage failure / batch rolled back                |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, unknown column, rejected input.
pub const EXIT_USAGE: u8 = 2;

/// The save had no net changes to commit. Informational, but scripts
/// need to tell it apart from a successful write.
pub const EXIT_NOTHING_TO_SAVE: u8 = 3;

/// Storage failure, including a rolled-back batch.
pub const EXIT_STORAGE: u8 = 4;
