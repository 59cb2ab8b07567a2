//! CLI command handlers.
//!
//! Testable handlers invoked by main.rs. `main` only parses flags, sets up
//! logging and maps the handler's outcome to an exit code.

mod diff;

pub use diff::{determine_exit_code, run_diff};

// Re-export config types used by handlers
pub use crate::config::DiffConfig;

use crate::diff::DiffKind;

/// A command line the program cannot act on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UsageError {
    #[error("Please have at least two container IDs as arguments.")]
    TooFewArguments,

    #[error("Too many arguments.")]
    TooManyArguments,

    #[error("{0}")]
    UnknownDiffer(String),

    #[error("{0}")]
    UnknownPreset(String),
}

/// Split `<image1> <image2> [differ]` positional arguments.
///
/// The differ defaults to the history differ when omitted.
pub fn parse_positionals(args: &[String]) -> Result<(String, String, DiffKind), UsageError> {
    match args {
        [] | [_] => Err(UsageError::TooFewArguments),
        [image1, image2] => Ok((image1.clone(), image2.clone(), DiffKind::default())),
        [image1, image2, differ] => {
            let kind = differ.parse::<DiffKind>().map_err(UsageError::UnknownDiffer)?;
            Ok((image1.clone(), image2.clone(), kind))
        }
        _ => Err(UsageError::TooManyArguments),
    }
}
