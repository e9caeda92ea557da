//! Pan/zoom transform between device pixels and normalized image coordinates.
//!
//! Device coordinates are pixels relative to the container's top-left corner.
//! The background image is laid out centered in the container at its unscaled
//! content size, translated by the offset and scaled around its own center.

use crate::constants::{MAX_SCALE, MIN_SCALE};
use crate::model::Position;

/// A pixel position relative to the container.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DevicePoint {
    pub x: f64,
    pub y: f64,
}

impl DevicePoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: DevicePoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Largest size with this aspect ratio that fits inside `container`.
    ///
    /// Used for the initial layout of a freshly loaded background. Empty sizes
    /// fit to an empty size.
    pub fn fit_within(&self, container: Size) -> Size {
        if self.is_empty() || container.is_empty() {
            return Size::default();
        }
        let ratio = (container.width / self.width).min(container.height / self.height);
        Size::new(self.width * ratio, self.height * ratio)
    }
}

/// An axis-aligned rectangle in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Map a device point into this rectangle as a fraction of its size.
    ///
    /// A degenerate rectangle yields a position that is never in bounds.
    pub fn normalize(&self, point: DevicePoint) -> Position {
        if !(self.width > 0.0 && self.height > 0.0) {
            return Position::new(f64::NAN, f64::NAN);
        }
        Position::new(
            (point.x - self.left) / self.width,
            (point.y - self.top) / self.height,
        )
    }

    /// Inverse of [`Rect::normalize`].
    pub fn denormalize(&self, position: Position) -> DevicePoint {
        DevicePoint::new(
            self.left + position.x * self.width,
            self.top + position.y * self.height,
        )
    }
}

/// Allowed zoom range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleLimits {
    pub min: f64,
    pub max: f64,
}

impl Default for ScaleLimits {
    fn default() -> Self {
        Self {
            min: MIN_SCALE,
            max: MAX_SCALE,
        }
    }
}

impl ScaleLimits {
    /// Both bounds finite and positive, `min <= max`.
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min > 0.0 && self.max >= self.min
    }

    /// Clamp `scale` into the range. Unusable limits fall back to the
    /// default range.
    pub fn clamp(&self, scale: f64) -> f64 {
        let limits = if self.is_valid() { *self } else { Self::default() };
        scale.clamp(limits.min, limits.max)
    }
}

/// Session-local pan/zoom state plus the layout sizes needed to map
/// coordinates. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    scale: f64,
    offset_x: f64,
    offset_y: f64,
    limits: ScaleLimits,
    container: Size,
    content: Size,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(ScaleLimits::default())
    }
}

impl Viewport {
    pub fn new(limits: ScaleLimits) -> Self {
        Self {
            scale: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
            limits,
            container: Size::default(),
            content: Size::default(),
        }
    }

    #[inline]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    #[inline]
    pub fn offset(&self) -> (f64, f64) {
        (self.offset_x, self.offset_y)
    }

    pub fn limits(&self) -> ScaleLimits {
        self.limits
    }

    pub fn container_size(&self) -> Size {
        self.container
    }

    pub fn content_size(&self) -> Size {
        self.content
    }

    pub fn set_container_size(&mut self, size: Size) {
        self.container = size;
    }

    /// Set the unscaled size at which the image is laid out.
    pub fn set_content_size(&mut self, size: Size) {
        self.content = size;
    }

    pub fn container_center(&self) -> DevicePoint {
        DevicePoint::new(self.container.width / 2.0, self.container.height / 2.0)
    }

    /// Zoom by `factor` keeping the image point under `origin` fixed.
    ///
    /// Returns `false` (and changes nothing) if the factor is not a positive
    /// finite number or the clamped scale equals the current one.
    pub fn zoom_at(&mut self, factor: f64, origin: DevicePoint) -> bool {
        if !(factor.is_finite() && factor > 0.0) {
            return false;
        }

        let new_scale = self.limits.clamp(self.scale * factor);
        if new_scale == self.scale {
            return false;
        }

        let k = new_scale / self.scale;
        let center = self.container_center();
        let dx = origin.x - center.x;
        let dy = origin.y - center.y;

        self.offset_x = self.offset_x * k + dx - dx * k;
        self.offset_y = self.offset_y * k + dy - dy * k;
        self.scale = new_scale;

        log::trace!(
            "Zoom {:.3} at ({:.1}, {:.1}), offset ({:.1}, {:.1})",
            self.scale,
            origin.x,
            origin.y,
            self.offset_x,
            self.offset_y
        );
        true
    }

    /// Zoom anchored at the container center.
    pub fn zoom_at_center(&mut self, factor: f64) -> bool {
        self.zoom_at(factor, self.container_center())
    }

    /// Back to scale 1 with no offset.
    pub fn reset(&mut self) {
        self.scale = 1.0;
        self.offset_x = 0.0;
        self.offset_y = 0.0;
    }

    /// Translate the image layer. Offsets are not clamped.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.offset_x += dx;
        self.offset_y += dy;
    }

    /// The displayed image rectangle in device pixels.
    pub fn image_rect(&self) -> Rect {
        let width = self.content.width * self.scale;
        let height = self.content.height * self.scale;
        Rect::new(
            self.container.width / 2.0 + self.offset_x - width / 2.0,
            self.container.height / 2.0 + self.offset_y - height / 2.0,
            width,
            height,
        )
    }

    /// The normalized image position under a device point.
    pub fn to_normalized(&self, point: DevicePoint) -> Position {
        self.image_rect().normalize(point)
    }

    /// The device point at which a normalized position is drawn.
    pub fn to_device(&self, position: Position) -> DevicePoint {
        self.image_rect().denormalize(position)
    }
}
