//! Byte-level file comparison.

use crate::error::{ImageDiffError, Result};
use std::fs;
use std::path::Path;

/// Whether two files hold identical content.
///
/// Sizes are compared first and the files are only read when they match.
/// Symlinks are not followed: two links are equal when they point at the same
/// target, and a link never equals a regular file.
pub fn same_content(path1: &Path, path2: &Path) -> Result<bool> {
    let meta1 = fs::symlink_metadata(path1).map_err(|e| ImageDiffError::io(path1, e))?;
    let meta2 = fs::symlink_metadata(path2).map_err(|e| ImageDiffError::io(path2, e))?;

    match (meta1.file_type().is_symlink(), meta2.file_type().is_symlink()) {
        (true, true) => {
            let target1 = fs::read_link(path1).map_err(|e| ImageDiffError::io(path1, e))?;
            let target2 = fs::read_link(path2).map_err(|e| ImageDiffError::io(path2, e))?;
            return Ok(target1 == target2);
        }
        (true, false) | (false, true) => return Ok(false),
        (false, false) => {}
    }

    if meta1.len() != meta2.len() {
        return Ok(false);
    }

    let bytes1 = fs::read(path1).map_err(|e| ImageDiffError::io(path1, e))?;
    let bytes2 = fs::read(path2).map_err(|e| ImageDiffError::io(path2, e))?;
    Ok(bytes1 == bytes2)
}
