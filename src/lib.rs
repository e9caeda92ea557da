//! Pinpoint - numbered point annotations on a pannable, zoomable image.
//!
//! The crate holds the state engine behind a point annotation tool: the
//! viewport transform, the point store with its numbering rules, the pointer
//! interaction state machine and the project file format. Drawing and file
//! dialogs are supplied by the host through the [`Renderer`] and
//! [`FileService`] traits.

pub mod app;
pub mod config;
pub mod constants;
pub mod file_io;
pub mod format;
pub mod imaging;
pub mod interaction;
pub mod logging;
pub mod model;
pub mod viewport;

pub use app::{AnnotationApp, AppError, Confirmation, NumberRequest, Renderer, Scene, ViewerKey};
pub use config::{AppConfig, ConfigError, LogLevel};
pub use file_io::{FileOutcome, FileService};
pub use format::{BackgroundImage, FormatError, Project, ProjectFormat};
pub use imaging::{ImageResizer, RasterResizer};
pub use interaction::{
    InteractionController, InteractionOutcome, InteractionState, PointerEvent, PointerTarget,
};
pub use model::{Direction, Point, PointEdit, PointId, PointStore, Position, StoreError};
pub use viewport::{DevicePoint, Rect, ScaleLimits, Size, Viewport};

#[cfg(not(target_arch = "wasm32"))]
pub use file_io::NativeFileService;
