//! Project file import/export.
//!
//! A project is stored as a single JSON document holding the background image
//! as a data URL, the starting point number and every point:
//!
//! ```json
//! {
//!   "version": "1.0",
//!   "backgroundImage": "data:image/png;base64,...",
//!   "startingPointNumber": 1,
//!   "points": [
//!     { "id": "1718000000000", "number": 1, "x": 0.25, "y": 0.5,
//!       "title": "", "description": "", "imageDataUrl": null }
//!   ]
//! }
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pinpoint::format::ProjectFormat;
//!
//! let bytes = ProjectFormat.serialize(&project)?;
//! let loaded = ProjectFormat.deserialize(&bytes)?;
//! ```

mod data_url;
mod document;
mod error;
mod project;

#[cfg(test)]
mod tests;

pub use data_url::DataUrl;
pub use document::{PointEntry, ProjectDocument};
pub use error::FormatError;
pub use project::{BackgroundImage, Project, ProjectFormat};
