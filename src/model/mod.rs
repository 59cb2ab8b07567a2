//! Input data model shared by the differs.
//!
//! Two kinds of snapshot feed the engine besides raw build histories:
//!
//! - [`Directory`]: a flattened file tree rooted at some path on disk
//! - [`PackageMaps`]: an installed-package inventory, either flat (one
//!   occurrence per name) or layered (every location a name was found at)

mod directory;
mod packages;

pub(crate) use directory::relative_entry;
pub use directory::Directory;
pub use packages::{
    FlatPackageMap, LayeredPackageMap, LocationMap, PackageInfo, PackageMapShape, PackageMaps,
};
