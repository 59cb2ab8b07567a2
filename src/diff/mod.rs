//! Diff engine for container image snapshots.
//!
//! Components, leaves first:
//!
//! - [`set`]: element-wise additions and removals
//! - [`content`]: byte comparison of two files with a size short-circuit
//! - [`DirectoryDiffer`] and [`HistoryDiffer`] built on the two above
//! - [`CorrelationRules`]: pairs up per-layer occurrences of one package
//! - [`PackageMapDiffer`]: flat and layered package inventories
//! - [`DiffEngine`]: picks the differ for a pair of inputs
//!
//! # Example
//!
//! ```ignore
//! use idiff::diff::{DiffEngine, DiffInput};
//!
//! let engine = DiffEngine::new();
//! let result = engine.diff(
//!     &DiffInput::directory("old", Directory::scan(old_root)?),
//!     &DiffInput::directory("new", Directory::scan(new_root)?),
//! )?;
//! println!("{}", result.output(false, &ReportConfig::default())?);
//! ```

pub mod content;
mod correlate;
mod directory;
mod engine;
mod history;
mod kind;
mod packages;
mod result;
pub mod set;
pub mod traits;

pub use correlate::{
    CorrelationRules, InstallScope, LocationKey, Occurrence, Reconciliation,
    DEFAULT_SHARED_INSTALL_ROOTS,
};
pub use directory::{DirectoryDiffer, FailurePolicy};
pub use engine::{DiffEngine, DiffInput, InputContent};
pub use history::HistoryDiffer;
pub use kind::DiffKind;
pub use packages::PackageMapDiffer;
pub use result::{
    ComparisonFailure, DiffResult, DiffSummary, DirDiff, HistDiff, MultiVersionChange,
    MultiVersionPackageDiff, PackageChange, PackageDiff,
};
pub use set::{diff_sets, diff_slices, SetDiff};
pub use traits::Differ;
