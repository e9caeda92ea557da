//! Point marker types and id generation.

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Positions
// ============================================================================

/// A position relative to the unscaled background image.
///
/// `(0, 0)` is the image's top-left corner and `(1, 1)` its bottom-right
/// corner. Values outside that range are representable so that hit tests can
/// report a miss; only in-bounds positions are ever committed to a point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Check whether the position lies within `[0,1]×[0,1]`.
    pub fn in_bounds(&self) -> bool {
        (0.0..=1.0).contains(&self.x) && (0.0..=1.0).contains(&self.y)
    }

    /// Return the position if it is in bounds.
    pub fn checked(self) -> Option<Self> {
        self.in_bounds().then_some(self)
    }
}

// ============================================================================
// Identifiers
// ============================================================================

/// Opaque, stable identifier of a point.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointId(String);

impl PointId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PointId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Source of fresh point ids.
///
/// Ids are Unix timestamps in milliseconds, bumped so that every id handed out
/// is strictly greater than any numeric id generated or observed before.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    last: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Produce the next id.
    pub fn next_id(&mut self) -> PointId {
        let now = web_time::SystemTime::now()
            .duration_since(web_time::SystemTime::UNIX_EPOCH)
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or_default();
        self.last = now.max(self.last.saturating_add(1));
        PointId(self.last.to_string())
    }

    /// Record an id that entered the collection from elsewhere (e.g. a file).
    pub fn observe(&mut self, id: &PointId) {
        if let Ok(value) = id.as_str().parse::<u64>() {
            self.last = self.last.max(value);
        }
    }
}

// ============================================================================
// Point
// ============================================================================

/// A numbered marker placed on the background image.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    /// Unique identifier, stable for the point's lifetime.
    pub id: PointId,
    /// Displayed label; unique among the points of a store.
    pub number: u32,
    /// Normalized horizontal position.
    pub x: f64,
    /// Normalized vertical position.
    pub y: f64,
    pub title: String,
    pub description: String,
    /// Attached image as a data URL, already downscaled.
    pub image_data_url: Option<String>,
}

impl Point {
    /// Create a point with empty text and no image.
    pub fn new(id: PointId, number: u32, position: Position) -> Self {
        Self {
            id,
            number,
            x: position.x,
            y: position.y,
            title: String::new(),
            description: String::new(),
            image_data_url: None,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }

    pub fn has_image(&self) -> bool {
        self.image_data_url.is_some()
    }
}

/// Partial update of a point's non-numbering fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointEdit {
    pub title: Option<String>,
    pub description: Option<String>,
    /// `Some(None)` removes the image, `None` leaves it untouched.
    pub image_data_url: Option<Option<String>>,
}

impl PointEdit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn image(mut self, data_url: impl Into<String>) -> Self {
        self.image_data_url = Some(Some(data_url.into()));
        self
    }

    pub fn clear_image(mut self) -> Self {
        self.image_data_url = Some(None);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.image_data_url.is_none()
    }

    pub(crate) fn apply(self, point: &mut Point) {
        if let Some(title) = self.title {
            point.title = title;
        }
        if let Some(description) = self.description {
            point.description = description;
        }
        if let Some(image) = self.image_data_url {
            point.image_data_url = image;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_bounds() {
        assert!(Position::new(0.0, 0.0).in_bounds());
        assert!(Position::new(1.0, 1.0).in_bounds());
        assert!(Position::new(0.5, 0.25).in_bounds());
        assert!(!Position::new(-0.01, 0.5).in_bounds());
        assert!(!Position::new(0.5, 1.01).in_bounds());
        assert!(!Position::new(f64::NAN, 0.5).in_bounds());
    }

    #[test]
    fn test_id_generator_strictly_increasing() {
        let mut ids = IdGenerator::new();
        let a: u64 = ids.next_id().as_str().parse().unwrap();
        let b: u64 = ids.next_id().as_str().parse().unwrap();
        let c: u64 = ids.next_id().as_str().parse().unwrap();
        assert!(a < b && b < c);
    }

    #[test]
    fn test_id_generator_skips_observed_ids() {
        let mut ids = IdGenerator::new();
        ids.observe(&PointId::new("99999999999999"));
        ids.observe(&PointId::new("not-a-number"));
        let next: u64 = ids.next_id().as_str().parse().unwrap();
        assert_eq!(next, 100_000_000_000_000);
    }

    #[test]
    fn test_point_edit_partial_update() {
        let mut point = Point::new(PointId::new("1"), 1, Position::new(0.5, 0.5));
        point.title = "Old".to_string();

        PointEdit::new()
            .description("Door")
            .image("data:image/png;base64,AA==")
            .apply(&mut point);
        assert_eq!(point.title, "Old");
        assert_eq!(point.description, "Door");
        assert!(point.has_image());

        PointEdit::new().clear_image().apply(&mut point);
        assert!(!point.has_image());
        assert_eq!(point.description, "Door");
    }
}
