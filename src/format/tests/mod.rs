//! Tests for project serialization.
//!
//! These tests cover document parsing and validation, and check that saved
//! projects load back without loss.

mod document_tests;

use image::ImageFormat;

use crate::format::DataUrl;
use crate::imaging::tests::encoded_image;

/// A small PNG background as a data URL.
fn background_url() -> String {
    DataUrl::encode("image/png", &encoded_image(40, 30, ImageFormat::Png))
}
