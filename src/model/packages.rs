//! Installed-package inventories.

use crate::error::{ImageDiffError, InputErrorKind, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// One occurrence of a package at one location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageInfo {
    pub version: String,
    pub size: String,
    /// Layer the occurrence was attributed to, when the extractor knows it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer: Option<String>,
}

impl PackageInfo {
    /// Create a package occurrence with no layer attribution.
    pub fn new(version: impl Into<String>, size: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            size: size.into(),
            layer: None,
        }
    }

    /// Attribute the occurrence to a layer.
    #[must_use]
    pub fn with_layer(mut self, layer: impl Into<String>) -> Self {
        self.layer = Some(layer.into());
        self
    }

    /// Whether two occurrences carry the same version and size.
    ///
    /// Layer attribution is deliberately not part of the comparison.
    #[must_use]
    pub fn same_install(&self, other: &Self) -> bool {
        self.version == other.version && self.size == other.size
    }
}

/// One occurrence per package name.
pub type FlatPackageMap = BTreeMap<String, PackageInfo>;

/// Location key (`<layer>/<relative path>`) to occurrence.
pub type LocationMap = BTreeMap<String, PackageInfo>;

/// Package name to every location the package was found at.
pub type LayeredPackageMap = BTreeMap<String, LocationMap>;

/// The two package-map shapes the package differ understands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PackageMaps {
    Flat(FlatPackageMap),
    Layered(LayeredPackageMap),
}

/// Discriminant of [`PackageMaps`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageMapShape {
    Flat,
    Layered,
}

impl fmt::Display for PackageMapShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flat => write!(f, "a flat package map"),
            Self::Layered => write!(f, "a layered package map"),
        }
    }
}

impl PackageMaps {
    #[must_use]
    pub const fn shape(&self) -> PackageMapShape {
        match self {
            Self::Flat(_) => PackageMapShape::Flat,
            Self::Layered(_) => PackageMapShape::Layered,
        }
    }

    /// Number of distinct package names.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Flat(map) => map.len(),
            Self::Layered(map) => map.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Detect the shape of an untyped JSON package map.
    ///
    /// A value that is not an object at all is a shape mismatch. An object
    /// whose values are `{version, size}` records is flat; an object whose
    /// values are objects of such records is layered. The empty object is
    /// reported as flat.
    pub fn from_json_value(value: serde_json::Value) -> Result<Self> {
        if !value.is_object() {
            return Err(ImageDiffError::shape_mismatch(
                json_type_name(&value),
                "a package map",
            ));
        }
        if let Ok(flat) = serde_json::from_value::<FlatPackageMap>(value.clone()) {
            return Ok(Self::Flat(flat));
        }
        serde_json::from_value::<LayeredPackageMap>(value)
            .map(Self::Layered)
            .map_err(|e| {
                ImageDiffError::input(
                    "detecting package map shape",
                    InputErrorKind::UnknownShape(e.to_string()),
                )
            })
    }

    /// Parse a JSON package map.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_json_value(value)
    }

    /// Read and parse a JSON package map from disk.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            let kind = if e.kind() == std::io::ErrorKind::NotFound {
                InputErrorKind::NotFound(path.to_path_buf())
            } else {
                InputErrorKind::Unreadable(e.to_string())
            };
            ImageDiffError::input(format!("reading {}", path.display()), kind)
        })?;
        Self::from_json_str(&content)
    }
}

const fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_install_ignores_layer() {
        let a = PackageInfo::new("1.0", "40").with_layer("L1");
        let b = PackageInfo::new("1.0", "40").with_layer("L2");
        assert!(a.same_install(&b));
        assert!(!a.same_install(&PackageInfo::new("1.0", "41")));
    }

    #[test]
    fn test_detect_flat_map() {
        let maps = PackageMaps::from_json_str(
            r#"{"pac1": {"version": "1.0", "size": "40"}, "pac2": {"version": "2.0", "size": "50", "layer": "L1"}}"#,
        )
        .unwrap();
        match maps {
            PackageMaps::Flat(map) => {
                assert_eq!(map.len(), 2);
                assert_eq!(map["pac2"].layer.as_deref(), Some("L1"));
            }
            other => panic!("expected flat map, got {other:?}"),
        }
    }

    #[test]
    fn test_detect_layered_map() {
        let maps = PackageMaps::from_json_str(
            r#"{"pac1": {"layer1/node_modules/pac1": {"version": "1.0", "size": "40"}}}"#,
        )
        .unwrap();
        assert_eq!(maps.shape(), PackageMapShape::Layered);
        assert_eq!(maps.len(), 1);
    }

    #[test]
    fn test_empty_object_is_flat() {
        let maps = PackageMaps::from_json_str("{}").unwrap();
        assert_eq!(maps.shape(), PackageMapShape::Flat);
        assert!(maps.is_empty());
    }

    #[test]
    fn test_non_map_is_shape_mismatch() {
        let err = PackageMaps::from_json_str(r#""not a map""#).unwrap_err();
        assert!(matches!(err, ImageDiffError::ShapeMismatch { .. }), "{err:?}");
    }

    #[test]
    fn test_unrecognized_values_are_input_errors() {
        let err = PackageMaps::from_json_str(r#"{"pac1": 3}"#).unwrap_err();
        assert!(matches!(
            err,
            ImageDiffError::Input {
                source: InputErrorKind::UnknownShape(_),
                ..
            }
        ));
    }
}
