//! Trait definitions for the individual differs.
//!
//! Each differ compares one kind of snapshot. The [`DiffEngine`](super::DiffEngine)
//! picks the differ for the requested diff kind.

use crate::error::Result;

/// Compares two snapshots of the same kind.
pub trait Differ {
    /// The snapshot type this differ compares.
    type Input: ?Sized;

    /// The differences it reports.
    type Output;

    /// Compare an old snapshot against a new one.
    ///
    /// Inputs are never mutated; the output is freshly constructed.
    fn diff(&self, old: &Self::Input, new: &Self::Input) -> Result<Self::Output>;

    /// Name of this differ for logging.
    fn name(&self) -> &'static str;
}
