//! Error types for project file and image operations.

use thiserror::Error;

/// Errors that can occur while reading or writing projects and images.
#[derive(Error, Debug)]
pub enum FormatError {
    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid JSON or does not have the project shape
    #[error("Invalid project file: {0}")]
    Json(#[from] serde_json::Error),

    /// The document parsed but its content breaks the project rules
    #[error("Invalid format: {message}")]
    InvalidFormat {
        /// Description of the format error
        message: String,
    },

    /// The document has no background image
    #[error("Project has no background image")]
    MissingBackgroundImage,

    /// A string that should be a base64 data URL is not one
    #[error("Invalid data URL: {message}")]
    InvalidDataUrl {
        /// Description of what is wrong with the data URL
        message: String,
    },

    /// Image in a format other than PNG or JPEG
    #[error("Unsupported image format: {format}")]
    UnsupportedImage {
        /// The detected or declared format
        format: String,
    },

    /// Image bytes could not be decoded or encoded
    #[error("Image error: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// Version mismatch between expected and found
    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch {
        /// Expected version string
        expected: String,
        /// Found version string
        found: String,
    },
}

impl FormatError {
    /// Create an invalid format error with a message.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    /// Create an invalid data URL error.
    pub fn invalid_data_url(message: impl Into<String>) -> Self {
        Self::InvalidDataUrl {
            message: message.into(),
        }
    }

    /// Create an unsupported image error.
    pub fn unsupported_image(format: impl Into<String>) -> Self {
        Self::UnsupportedImage {
            format: format.into(),
        }
    }
}
