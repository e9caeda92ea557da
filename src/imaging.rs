//! Image sniffing and bounded downscaling.
//!
//! Only PNG and JPEG images are accepted, both as backgrounds and as images
//! attached to points. Attached images are downscaled so that their longer
//! side is at most [`MAX_IMAGE_SIZE`](crate::constants::MAX_IMAGE_SIZE);
//! backgrounds are kept as uploaded.

use std::io::Cursor;

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};

use crate::format::{DataUrl, FormatError};

/// Detect the format of encoded image bytes, accepting only PNG and JPEG.
pub fn sniff_format(bytes: &[u8]) -> Result<ImageFormat, FormatError> {
    let format = image::guess_format(bytes)
        .map_err(|_| FormatError::unsupported_image("unrecognized image data"))?;
    match format {
        ImageFormat::Png | ImageFormat::Jpeg => Ok(format),
        other => Err(FormatError::unsupported_image(format!("{:?}", other))),
    }
}

/// Pixel dimensions of an encoded image, read from its header.
pub fn dimensions(bytes: &[u8]) -> Result<(u32, u32), FormatError> {
    let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    Ok(reader.into_dimensions()?)
}

/// Size an image of `width`×`height` should be scaled to so that its longer
/// side is `max_dimension`, or `None` if it already fits.
///
/// The aspect ratio is kept; the shorter side is rounded and never below 1px.
pub fn target_dimensions(width: u32, height: u32, max_dimension: u32) -> Option<(u32, u32)> {
    if width <= max_dimension && height <= max_dimension {
        return None;
    }

    let scale_side = |side: u32, longer: u32| -> u32 {
        let scaled = (f64::from(side) * f64::from(max_dimension) / f64::from(longer)).round();
        // Bounded by max_dimension, so the cast cannot truncate
        (scaled as u32).max(1)
    };

    if width > height {
        Some((max_dimension, scale_side(height, width)))
    } else {
        Some((scale_side(width, height), max_dimension))
    }
}

/// Something that can bound the size of an encoded image.
pub trait ImageResizer {
    /// Return `bytes` scaled so that neither side exceeds `max_dimension`,
    /// re-encoded in the input's format. Images that already fit are returned
    /// byte-identical.
    fn resize(&self, bytes: &[u8], max_dimension: u32) -> Result<Vec<u8>, FormatError>;
}

/// [`ImageResizer`] backed by the `image` crate, resampling with a triangle
/// (bilinear) filter.
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterResizer;

impl ImageResizer for RasterResizer {
    fn resize(&self, bytes: &[u8], max_dimension: u32) -> Result<Vec<u8>, FormatError> {
        let format = sniff_format(bytes)?;
        let (width, height) = dimensions(bytes)?;

        let Some((new_width, new_height)) = target_dimensions(width, height, max_dimension) else {
            log::trace!("Image {}x{} fits within {}px", width, height, max_dimension);
            return Ok(bytes.to_vec());
        };

        let decoded = image::load_from_memory_with_format(bytes, format)?;
        let resized = decoded.resize_exact(new_width, new_height, FilterType::Triangle);

        let mut out = Cursor::new(Vec::new());
        match format {
            // JPEG has no alpha channel
            ImageFormat::Jpeg => {
                DynamicImage::ImageRgb8(resized.to_rgb8()).write_to(&mut out, format)?
            }
            _ => resized.write_to(&mut out, format)?,
        }

        log::debug!(
            "Downscaled {:?} image from {}x{} to {}x{}",
            format,
            width,
            height,
            new_width,
            new_height
        );
        Ok(out.into_inner())
    }
}

/// Validate an uploaded image, bound its size and return it as a data URL.
pub fn downscale_to_data_url(
    resizer: &dyn ImageResizer,
    bytes: &[u8],
    max_dimension: u32,
) -> Result<String, FormatError> {
    let format = sniff_format(bytes)?;
    let resized = resizer.resize(bytes, max_dimension)?;
    Ok(DataUrl::encode(format.to_mime_type(), &resized))
}
