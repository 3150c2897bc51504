//! Image loading and pixel conversion helpers

use std::path::Path;

use image::metadata::Orientation;
use image::{ColorType, DynamicImage, ImageDecoder, ImageReader, RgbImage, RgbaImage};
use log::debug;
use serde::Serialize;

use crate::errors::RetileResult;
use crate::extractor::normalizer::BACKGROUND;

/// Summary of a decoded source image, reported in result metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub color_type: String,
    pub has_alpha: bool,
}

impl ImageInfo {
    pub fn from_image(image: &DynamicImage) -> Self {
        ImageInfo {
            width: image.width(),
            height: image.height(),
            color_type: format!("{:?}", image.color()),
            has_alpha: image.color().has_alpha(),
        }
    }
}

/// Decode an image and apply its EXIF orientation
pub fn load_image(path: &Path) -> RetileResult<DynamicImage> {
    let mut decoder = ImageReader::open(path)?.with_guessed_format()?.into_decoder()?;
    let orientation = decoder.orientation()?;
    let mut image = DynamicImage::from_decoder(decoder)?;
    image.apply_orientation(orientation);

    debug!(
        "Decoded {} ({}x{}, {:?}, orientation {:?})",
        path.display(),
        image.width(),
        image.height(),
        image.color(),
        orientation
    );
    Ok(image)
}

/// Read the oriented dimensions of an image without decoding pixels
///
/// Matches the size [`load_image`] will produce.
pub fn probe_dimensions(path: &Path) -> RetileResult<(u32, u32)> {
    let mut decoder = ImageReader::open(path)?.with_guessed_format()?.into_decoder()?;
    let orientation = decoder.orientation()?;
    let (width, height) = decoder.dimensions();

    Ok(match orientation {
        Orientation::Rotate90
        | Orientation::Rotate270
        | Orientation::Rotate90FlipH
        | Orientation::Rotate270FlipH => (height, width),
        _ => (width, height),
    })
}

/// Composite an image with alpha onto the white background
pub fn flatten_alpha(image: &DynamicImage) -> RgbImage {
    let mut canvas = RgbaImage::from_pixel(
        image.width(),
        image.height(),
        image::Rgba([BACKGROUND[0], BACKGROUND[1], BACKGROUND[2], 255]),
    );
    image::imageops::overlay(&mut canvas, &image.to_rgba8(), 0, 0);
    DynamicImage::ImageRgba8(canvas).to_rgb8()
}

/// Convert to an 8-bit layout, keeping grey/alpha structure where possible
pub fn to_eight_bit(image: &DynamicImage) -> DynamicImage {
    match image.color() {
        ColorType::L8 | ColorType::La8 | ColorType::Rgb8 | ColorType::Rgba8 => image.clone(),
        ColorType::L16 => DynamicImage::ImageLuma8(image.to_luma8()),
        ColorType::La16 => DynamicImage::ImageLumaA8(image.to_luma_alpha8()),
        color if color.has_alpha() => DynamicImage::ImageRgba8(image.to_rgba8()),
        _ => DynamicImage::ImageRgb8(image.to_rgb8()),
    }
}
