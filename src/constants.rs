//! Global constants for the Pinpoint engine

use std::time::Duration;

/// Smallest allowed zoom level.
pub const MIN_SCALE: f64 = 0.1;

/// Largest allowed zoom level.
pub const MAX_SCALE: f64 = 10.0;

/// Zoom multiplier for one wheel notch or one zoom button press.
pub const ZOOM_STEP: f64 = 1.2;

/// Device pixels a marker press must travel before it becomes a drag.
pub const DRAG_THRESHOLD: f64 = 5.0;

/// Longest side (in pixels) of an image attached to a point.
pub const MAX_IMAGE_SIZE: u32 = 800;

/// Number given to the first point of a fresh project.
pub const DEFAULT_STARTING_NUMBER: u32 = 1;

/// Largest number a point may carry.
pub const MAX_POINT_NUMBER: u32 = 1_000_000_000;

/// Minimum time between two handled image viewer key presses.
pub const VIEWER_KEY_DEBOUNCE: Duration = Duration::from_millis(50);
