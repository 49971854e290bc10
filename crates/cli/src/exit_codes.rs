//! CLI Exit Code Registry
//!
//! Single source of truth for all CLI exit codes. Scripts rely on them.
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! | 0    | Success                                              |
//! | 1    | General error (unspecified)                          |
//! | 2    | CLI usage error (bad args, unreadable config file)   |
//! | 3    | Input source unreadable or malformed                 |
//! | 4    | Input consistency violated (bounds, duplicate ids)   |
//! | 5    | Invalid configuration (tolerances, axis mapping)     |

use sificc_eval::error::ErrorCategory;
use sificc_eval::EvalError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// Reconstruction or truth input cannot be opened or parsed.
pub const EXIT_SOURCE: u8 = 3;

/// `StopEvent - StartEvent` disagrees with `TotalSimNev`, duplicate
/// `GlobalEventNumber`, or the truth file ends early.
pub const EXIT_CONSISTENCY: u8 = 4;

/// Config file or flag value rejected.
pub const EXIT_CONFIG: u8 = 5;

/// Map an engine error to its exit code.
pub fn eval_exit_code(err: &EvalError) -> u8 {
    match err.category() {
        ErrorCategory::Source => EXIT_SOURCE,
        ErrorCategory::Consistency => EXIT_CONSISTENCY,
        ErrorCategory::Config => EXIT_CONFIG,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_map_to_distinct_codes() {
        let source = EvalError::EmptyTable { table: "TreeStat".into() };
        let consistency = EvalError::DuplicateIdentifier { id: 4 };
        let config = EvalError::ConfigValidation("bad".into());
        assert_eq!(eval_exit_code(&source), EXIT_SOURCE);
        assert_eq!(eval_exit_code(&consistency), EXIT_CONSISTENCY);
        assert_eq!(eval_exit_code(&config), EXIT_CONFIG);
        assert_ne!(EXIT_SUCCESS, EXIT_ERROR);
    }
}
