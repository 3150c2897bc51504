//! Format-aware tile encoding
//!
//! The output format of a tile follows the extension of the source image.
//! Each supported format carries its fixed encoder settings in
//! [`TileEncoding`], so adding a format means adding a variant and the
//! compiler points at every place that has to handle it.
//!
//! JPEG and WebP go through dedicated encoders so that progressive,
//! Huffman-optimized JPEG and lossy WebP with a fixed effort are
//! available; PNG and the remaining formats use the `image` codecs.

use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::error::{EncodingError, ImageFormatHint, LimitError, LimitErrorKind};
use image::{ColorType, DynamicImage, ImageError, ImageFormat, ImageResult};
use jpeg_encoder::ColorType as JpegColor;
use log::debug;

use crate::errors::{RetileError, RetileResult, TileError};
use crate::utils::image_utils;

/// JPEG quality used for every tile
pub const JPEG_QUALITY: u8 = 95;

/// WebP quality used for every tile
pub const WEBP_QUALITY: u8 = 90;

/// WebP effort setting (0 fast .. 6 slow)
pub const WEBP_METHOD: u8 = 4;

/// Encoder selection and settings for one output format
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TileEncoding {
    /// Alpha is flattened onto white before encoding
    Jpeg { quality: u8, progressive: bool },
    /// `CompressionType::Default` corresponds to zlib level 6
    Png { compression: CompressionType, filter: PngFilter },
    WebP { quality: u8, method: u8 },
    /// Any other format the codec library can write, with its defaults
    Other(ImageFormat),
}

impl TileEncoding {
    /// Select the encoding for a lower-cased file extension
    ///
    /// # Returns
    /// The encoding, or a configuration error for extensions no encoder
    /// can write
    pub fn for_extension(extension: &str) -> RetileResult<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(TileEncoding::Jpeg {
                quality: JPEG_QUALITY,
                progressive: true,
            }),
            "png" => Ok(TileEncoding::Png {
                compression: CompressionType::Default,
                filter: PngFilter::Adaptive,
            }),
            "webp" => Ok(TileEncoding::WebP {
                quality: WEBP_QUALITY,
                method: WEBP_METHOD,
            }),
            other => match ImageFormat::from_extension(other) {
                Some(format) if format.writing_enabled() => Ok(TileEncoding::Other(format)),
                _ => Err(RetileError::config(format!(
                    "no encoder available for extension '{}'",
                    extension
                ))),
            },
        }
    }

    /// Image format produced by this encoding
    pub fn format(&self) -> ImageFormat {
        match self {
            TileEncoding::Jpeg { .. } => ImageFormat::Jpeg,
            TileEncoding::Png { .. } => ImageFormat::Png,
            TileEncoding::WebP { .. } => ImageFormat::WebP,
            TileEncoding::Other(format) => *format,
        }
    }

    /// Encode a tile into `writer`
    ///
    /// Pixel data is converted to a layout the target encoder accepts
    /// first; the conversion only depends on the tile, so identical tiles
    /// encode to identical bytes.
    pub fn encode<W: Write + Seek>(&self, tile: &DynamicImage, writer: &mut W) -> ImageResult<()> {
        match *self {
            TileEncoding::Jpeg { quality, progressive } => encode_jpeg(tile, quality, progressive, writer),
            TileEncoding::Png { compression, filter } => {
                let prepared = match tile.color() {
                    ColorType::Rgb32F => DynamicImage::ImageRgb16(tile.to_rgb16()),
                    ColorType::Rgba32F => DynamicImage::ImageRgba16(tile.to_rgba16()),
                    _ => tile.clone(),
                };
                prepared.write_with_encoder(PngEncoder::new_with_quality(writer, compression, filter))
            }
            TileEncoding::WebP { quality, method } => encode_webp(tile, quality, method, writer),
            TileEncoding::Other(format) => image_utils::to_eight_bit(tile).write_to(writer, format),
        }
    }

    /// Encode a tile and write it to `path`
    ///
    /// Errors are classified so that permission and memory problems abort
    /// the run while other failures only affect this tile.
    pub fn write_to_path(&self, tile: &DynamicImage, path: &Path) -> Result<(), TileError> {
        let context = format!("writing {}", path.display());
        let file = File::create(path).map_err(|e| TileError::from_io(&context, &e))?;
        let mut writer = BufWriter::new(file);

        self.encode(tile, &mut writer)
            .map_err(|e| TileError::from_image(&context, &e))?;
        writer.flush().map_err(|e| TileError::from_io(&context, &e))?;

        debug!("Wrote {}x{} {:?} tile to {}", tile.width(), tile.height(), self.format(), path.display());
        Ok(())
    }
}

/// Write a JPEG with optimized Huffman tables
///
/// Alpha is composited onto white; greyscale stays single-channel.
fn encode_jpeg<W: Write>(tile: &DynamicImage, quality: u8, progressive: bool, writer: &mut W) -> ImageResult<()> {
    let (width, height) = jpeg_dimensions(tile)?;
    let (pixels, color) = if tile.color().has_alpha() {
        (image_utils::flatten_alpha(tile).into_raw(), JpegColor::Rgb)
    } else if tile.color() == ColorType::L8 {
        (tile.to_luma8().into_raw(), JpegColor::Luma)
    } else {
        (tile.to_rgb8().into_raw(), JpegColor::Rgb)
    };

    let mut encoder = jpeg_encoder::Encoder::new(writer, quality);
    encoder.set_progressive(progressive);
    encoder.set_optimized_huffman_tables(true);
    encoder.encode(&pixels, width, height, color).map_err(|e| match e {
        jpeg_encoder::EncodingError::IoError(io_error) => ImageError::IoError(io_error),
        other => encoding_error(ImageFormat::Jpeg, other.to_string()),
    })
}

/// JPEG frames store 16-bit sides
fn jpeg_dimensions(tile: &DynamicImage) -> ImageResult<(u16, u16)> {
    match (u16::try_from(tile.width()), u16::try_from(tile.height())) {
        (Ok(width), Ok(height)) => Ok((width, height)),
        _ => Err(ImageError::Limits(LimitError::from_kind(LimitErrorKind::DimensionError))),
    }
}

/// Write a lossy WebP at the given quality and effort
fn encode_webp<W: Write>(tile: &DynamicImage, quality: u8, method: u8, writer: &mut W) -> ImageResult<()> {
    let rgba;
    let rgb;
    let encoder = if tile.color().has_alpha() {
        rgba = tile.to_rgba8();
        webp::Encoder::from_rgba(rgba.as_raw(), rgba.width(), rgba.height())
    } else {
        rgb = tile.to_rgb8();
        webp::Encoder::from_rgb(rgb.as_raw(), rgb.width(), rgb.height())
    };

    let mut config = webp::WebPConfig::new()
        .map_err(|_| encoding_error(ImageFormat::WebP, "cannot initialize encoder configuration".to_string()))?;
    config.lossless = 0;
    config.quality = f32::from(quality);
    config.method = i32::from(method);

    let encoded = encoder
        .encode_advanced(&config)
        .map_err(|e| encoding_error(ImageFormat::WebP, format!("{:?}", e)))?;
    writer.write_all(&encoded)?;
    Ok(())
}

fn encoding_error(format: ImageFormat, message: String) -> ImageError {
    ImageError::Encoding(EncodingError::new(ImageFormatHint::Exact(format), message))
}
