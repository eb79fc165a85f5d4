//! Geometry kinds used to filter techniques
//!
//! Styles may declare a technique's kind as a single string or as an array of
//! strings. Both forms are normalized into a `GeometryKindSet` while the tile
//! is deserialized, so nothing downstream has to branch on the JSON shape.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;

/// Classification tag of a geometry
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GeometryKind {
    All,
    Unspecified,
    Background,
    Terrain,
    Area,
    Line,
    Water,
    Border,
    Basemap,
    EarthSurface,
    Building,
    Road,
    Railway,
    Label,
    Custom(String),
}

impl GeometryKind {
    pub fn as_str(&self) -> &str {
        match self {
            GeometryKind::All => "all",
            GeometryKind::Unspecified => "unspecified",
            GeometryKind::Background => "background",
            GeometryKind::Terrain => "terrain",
            GeometryKind::Area => "area",
            GeometryKind::Line => "line",
            GeometryKind::Water => "water",
            GeometryKind::Border => "border",
            GeometryKind::Basemap => "basemap",
            GeometryKind::EarthSurface => "earth_surface",
            GeometryKind::Building => "building",
            GeometryKind::Road => "road",
            GeometryKind::Railway => "railway",
            GeometryKind::Label => "label",
            GeometryKind::Custom(name) => name,
        }
    }
}

impl From<&str> for GeometryKind {
    fn from(name: &str) -> Self {
        match name {
            "all" => GeometryKind::All,
            "unspecified" => GeometryKind::Unspecified,
            "background" => GeometryKind::Background,
            "terrain" => GeometryKind::Terrain,
            "area" => GeometryKind::Area,
            "line" => GeometryKind::Line,
            "water" => GeometryKind::Water,
            "border" => GeometryKind::Border,
            "basemap" => GeometryKind::Basemap,
            "earth_surface" => GeometryKind::EarthSurface,
            "building" => GeometryKind::Building,
            "road" => GeometryKind::Road,
            "railway" => GeometryKind::Railway,
            "label" => GeometryKind::Label,
            other => GeometryKind::Custom(other.to_string()),
        }
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for GeometryKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for GeometryKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(GeometryKind::from(name.as_str()))
    }
}

/// Ordered set of geometry kinds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeometryKindSet(BTreeSet<GeometryKind>);

impl GeometryKindSet {
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    pub fn single(kind: GeometryKind) -> Self {
        let mut set = Self::new();
        set.insert(kind);
        set
    }

    pub fn insert(&mut self, kind: GeometryKind) -> bool {
        self.0.insert(kind)
    }

    pub fn contains(&self, kind: &GeometryKind) -> bool {
        self.0.contains(kind)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GeometryKind> {
        self.0.iter()
    }

    /// True when both sets share at least one kind
    pub fn intersects(&self, other: &GeometryKindSet) -> bool {
        // iterate the smaller set
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        small.iter().any(|kind| large.contains(kind))
    }

    pub fn to_vec(&self) -> Vec<GeometryKind> {
        self.0.iter().cloned().collect()
    }
}

impl FromIterator<GeometryKind> for GeometryKindSet {
    fn from_iter<I: IntoIterator<Item = GeometryKind>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> FromIterator<&'a str> for GeometryKindSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        iter.into_iter().map(GeometryKind::from).collect()
    }
}

/// Normalize a style's `kind` value.
///
/// Strings become a one-element set, arrays a set of their string elements.
/// Any other JSON type is reported and treated as if no kind was declared.
pub fn normalize_kind(value: &Value) -> Option<GeometryKindSet> {
    match value {
        Value::Null => None,
        Value::String(name) => Some(GeometryKindSet::single(GeometryKind::from(name.as_str()))),
        Value::Array(entries) => {
            let mut set = GeometryKindSet::new();
            for entry in entries {
                match entry.as_str() {
                    Some(name) => {
                        set.insert(GeometryKind::from(name));
                    }
                    None => {
                        tracing::warn!(kind = %entry, "ignoring non-string geometry kind entry")
                    }
                }
            }
            Some(set)
        }
        other => {
            tracing::warn!(kind = %other, "technique has unknown type of kind");
            None
        }
    }
}

/// serde adapter for `Technique::kind`
pub fn deserialize_kind<'de, D>(deserializer: D) -> Result<Option<GeometryKindSet>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(normalize_kind(&value))
}
