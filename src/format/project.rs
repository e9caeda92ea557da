//! Project snapshot and its JSON serialization.

use std::path::Path;

use crate::format::data_url::DataUrl;
use crate::format::document::{PointEntry, ProjectDocument};
use crate::format::error::FormatError;
use crate::imaging;
use crate::model::{Point, PointStore};

/// A background image kept as an uploaded data URL plus its pixel size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackgroundImage {
    data_url: String,
    width: u32,
    height: u32,
}

impl BackgroundImage {
    /// Build from uploaded PNG or JPEG bytes. The image is not resized.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FormatError> {
        let format = imaging::sniff_format(bytes)?;
        let (width, height) = imaging::dimensions(bytes)?;
        Ok(Self {
            data_url: DataUrl::encode(format.to_mime_type(), bytes),
            width,
            height,
        })
    }

    /// Build from a stored data URL, keeping the string as is.
    pub fn from_data_url(data_url: impl Into<String>) -> Result<Self, FormatError> {
        let data_url = data_url.into();
        let decoded = DataUrl::parse(&data_url)?;
        imaging::sniff_format(&decoded.bytes)?;
        let (width, height) = imaging::dimensions(&decoded.bytes)?;
        Ok(Self {
            data_url,
            width,
            height,
        })
    }

    pub fn data_url(&self) -> &str {
        &self.data_url
    }

    /// Natural (unscaled) pixel size.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Everything that gets persisted: background, starting number and points.
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub background: BackgroundImage,
    pub starting_number: u32,
    /// Ascending by number.
    pub points: Vec<Point>,
}

impl Project {
    /// Snapshot a background and the contents of a store.
    pub fn new(background: BackgroundImage, store: &PointStore) -> Self {
        Self {
            background,
            starting_number: store.starting_number(),
            points: store.points().to_vec(),
        }
    }

    pub fn to_document(&self) -> ProjectDocument {
        ProjectDocument {
            version: ProjectDocument::CURRENT_VERSION.to_string(),
            background_image: Some(self.background.data_url().to_string()),
            starting_point_number: self.starting_number,
            points: self.points.iter().map(PointEntry::from).collect(),
        }
    }

    /// Validate a parsed document and turn it into a project.
    ///
    /// Points are sorted ascending by number regardless of file order.
    pub fn from_document(document: ProjectDocument) -> Result<Self, FormatError> {
        if !ProjectDocument::is_version_readable(&document.version) {
            return Err(FormatError::VersionMismatch {
                expected: ProjectDocument::CURRENT_VERSION.to_string(),
                found: document.version,
            });
        }
        if !ProjectDocument::is_version_compatible(&document.version) {
            log::warn!(
                "Project version {} is newer than {}; unknown fields are ignored",
                document.version,
                ProjectDocument::CURRENT_VERSION
            );
        }

        let background = match document.background_image {
            Some(url) if !url.is_empty() => BackgroundImage::from_data_url(url)?,
            _ => return Err(FormatError::MissingBackgroundImage),
        };

        PointStore::validate_number(document.starting_point_number)
            .map_err(|e| FormatError::invalid_format(format!("startingPointNumber: {}", e)))?;

        let mut points: Vec<Point> = document.points.into_iter().map(Point::from).collect();
        PointStore::validate_points(&points).map_err(|e| FormatError::invalid_format(e.to_string()))?;
        PointStore::validate_sequence(document.starting_point_number, points.len()).map_err(|e| {
            FormatError::invalid_format(format!("startingPointNumber: {}", e))
        })?;
        points.sort_by_key(|p| p.number);

        Ok(Self {
            background,
            starting_number: document.starting_point_number,
            points,
        })
    }
}

/// The project JSON file format.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectFormat;

impl ProjectFormat {
    /// File extension of project files.
    pub const EXTENSION: &'static str = "json";

    /// Prefix of suggested file names.
    pub const FILE_PREFIX: &'static str = "pinpoint";

    /// Serialize a project as pretty-printed JSON.
    pub fn serialize(&self, project: &Project) -> Result<Vec<u8>, FormatError> {
        let json = serde_json::to_string_pretty(&project.to_document())?;
        log::info!(
            "Serialized project with {} points ({} bytes)",
            project.points.len(),
            json.len()
        );
        Ok(json.into_bytes())
    }

    /// Parse and validate a project file.
    pub fn deserialize(&self, bytes: &[u8]) -> Result<Project, FormatError> {
        let document: ProjectDocument = serde_json::from_slice(bytes)?;
        let version = document.version.clone();
        let project = Project::from_document(document)?;
        log::info!(
            "Loaded project with {} points (format version {})",
            project.points.len(),
            version
        );
        Ok(project)
    }

    /// Write a project file to `path`.
    pub fn export(&self, project: &Project, path: &Path) -> Result<(), FormatError> {
        log::info!("Exporting project to {:?}", path);
        let bytes = self.serialize(project)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Read a project file from `path`.
    pub fn import(&self, path: &Path) -> Result<Project, FormatError> {
        log::info!("Importing project from {:?}", path);
        let bytes = std::fs::read(path)?;
        self.deserialize(&bytes)
    }

    /// Default name for a new project file, `pinpoint_<millis>.json`.
    pub fn suggested_file_name(&self) -> String {
        let millis = web_time::SystemTime::now()
            .duration_since(web_time::SystemTime::UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        format!("{}_{}.{}", Self::FILE_PREFIX, millis, Self::EXTENSION)
    }
}
