//! On-disk shape of a project file.
//!
//! # Versioning
//!
//! Files carry a `MAJOR.MINOR` version string (`"1.0"` today). Any file with
//! major version 1 is readable; a newer minor version only produces a warning.
//! Files without a version field are treated as the current version.

use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::DEFAULT_STARTING_NUMBER;
use crate::model::{Point, PointId, Position};

/// The JSON document written to and read from project files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDocument {
    /// Format version for compatibility checking.
    #[serde(default = "current_version")]
    pub version: String,

    /// Background image as a data URL.
    #[serde(default)]
    pub background_image: Option<String>,

    /// Number given to the first point when renumbering. `null` reads as
    /// the default.
    #[serde(
        default = "default_starting_number",
        deserialize_with = "starting_number_or_default"
    )]
    pub starting_point_number: u32,

    /// Points in ascending number order. `null` reads as no points.
    #[serde(default, deserialize_with = "null_as_default")]
    pub points: Vec<PointEntry>,
}

fn current_version() -> String {
    ProjectDocument::CURRENT_VERSION.to_string()
}

fn default_starting_number() -> u32 {
    DEFAULT_STARTING_NUMBER
}

fn starting_number_or_default<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u32>::deserialize(deserializer)?.unwrap_or(DEFAULT_STARTING_NUMBER))
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl ProjectDocument {
    /// Version written into new files.
    pub const CURRENT_VERSION: &'static str = "1.0";

    /// Major version this build reads and writes.
    pub const VERSION_MAJOR: u32 = 1;

    /// Minor version this build writes.
    pub const VERSION_MINOR: u32 = 0;

    /// Parse `MAJOR`, `MAJOR.MINOR` or `MAJOR.MINOR.PATCH` into
    /// `(major, minor)`.
    ///
    /// Returns None if the version string is invalid.
    pub fn parse_version(version: &str) -> Option<(u32, u32)> {
        let parts: Vec<&str> = version.trim().split('.').collect();
        if parts.is_empty() || parts.len() > 3 {
            return None;
        }
        let major = parts[0].parse().ok()?;
        let minor = match parts.get(1) {
            Some(minor) => minor.parse().ok()?,
            None => 0,
        };
        if let Some(patch) = parts.get(2) {
            patch.parse::<u32>().ok()?;
        }
        Some((major, minor))
    }

    /// Check if this build can read a file of the given version.
    pub fn is_version_readable(file_version: &str) -> bool {
        Self::parse_version(file_version).is_some_and(|(major, _)| major == Self::VERSION_MAJOR)
    }

    /// Check if a readable version was written by this or an older build.
    pub fn is_version_compatible(file_version: &str) -> bool {
        Self::parse_version(file_version).is_some_and(|(major, minor)| {
            major == Self::VERSION_MAJOR && minor <= Self::VERSION_MINOR
        })
    }
}

/// A persisted point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointEntry {
    pub id: PointId,
    pub number: u32,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Written as `null` when the point has no image.
    #[serde(default)]
    pub image_data_url: Option<String>,
}

impl From<&Point> for PointEntry {
    fn from(point: &Point) -> Self {
        Self {
            id: point.id.clone(),
            number: point.number,
            x: point.x,
            y: point.y,
            title: point.title.clone(),
            description: point.description.clone(),
            image_data_url: point.image_data_url.clone(),
        }
    }
}

impl From<PointEntry> for Point {
    fn from(entry: PointEntry) -> Self {
        let mut point = Point::new(entry.id, entry.number, Position::new(entry.x, entry.y));
        point.title = entry.title;
        point.description = entry.description;
        point.image_data_url = entry.image_data_url;
        point
    }
}
