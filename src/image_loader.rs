//! # Logo Loading
//!
//! The banner logo is read from disk once, when the renderer is built, and
//! shared by every render. JPEG files are kept as-is for DCTDecode; PNG files
//! are decoded to RGB with a separate alpha plane for the PDF soft mask.

use std::io::{Cursor, ErrorKind};
use std::path::Path;
use std::sync::Arc;

use crate::error::VoucherError;

/// A fully decoded/loaded image ready for PDF embedding.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub pixel_data: ImagePixelData,
    pub width_px: u32,
    pub height_px: u32,
}

impl LoadedImage {
    /// Largest size with the image's aspect ratio that fits the box.
    pub fn fit_within(&self, box_width: f64, box_height: f64) -> (f64, f64) {
        if self.width_px == 0 || self.height_px == 0 {
            return (0.0, 0.0);
        }
        let scale = (box_width / self.width_px as f64).min(box_height / self.height_px as f64);
        (self.width_px as f64 * scale, self.height_px as f64 * scale)
    }
}

/// The pixel data in a format the PDF serializer can consume directly.
#[derive(Debug, Clone)]
pub enum ImagePixelData {
    /// Raw JPEG bytes, embedded with DCTDecode.
    Jpeg {
        data: Vec<u8>,
        color_space: JpegColorSpace,
    },
    /// Decoded RGB pixels + optional alpha channel.
    Decoded {
        /// width * height * 3 bytes (RGB)
        rgb: Vec<u8>,
        /// width * height bytes (grayscale alpha). None if fully opaque.
        alpha: Option<Vec<u8>>,
    },
}

/// JPEG color space for the PDF /ColorSpace entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JpegColorSpace {
    DeviceRGB,
    DeviceGray,
}

/// Outcome of loading the configured logo.
#[derive(Debug, Clone)]
pub enum LogoAsset {
    /// No file at the configured path. The banner is drawn without a logo.
    Absent,
    Ready(Arc<LoadedImage>),
    /// The file exists but could not be read or decoded.
    Invalid(String),
}

impl LogoAsset {
    /// Load the logo at `path`, logging the outcome.
    pub fn load(path: &Path) -> Self {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!("No logo at '{}'; banner drawn without it", path.display());
                return LogoAsset::Absent;
            }
            Err(e) => {
                let msg = format!("Failed to read logo '{}': {}", path.display(), e);
                log::warn!("{}", msg);
                return LogoAsset::Invalid(msg);
            }
        };

        match decode_image_bytes(&bytes) {
            Ok(image) => {
                log::info!(
                    "Loaded logo '{}' ({}x{} px)",
                    path.display(),
                    image.width_px,
                    image.height_px
                );
                LogoAsset::Ready(Arc::new(image))
            }
            Err(e) => {
                let msg = format!("Failed to decode logo '{}': {}", path.display(), e);
                log::warn!("{}", msg);
                LogoAsset::Invalid(msg)
            }
        }
    }

    /// The image to draw, `None` when absent, or the recorded load failure.
    pub fn image(&self) -> Result<Option<Arc<LoadedImage>>, VoucherError> {
        match self {
            LogoAsset::Absent => Ok(None),
            LogoAsset::Ready(image) => Ok(Some(Arc::clone(image))),
            LogoAsset::Invalid(msg) => Err(VoucherError::Image(msg.clone())),
        }
    }
}

/// Detect image format from magic bytes and decode accordingly.
pub fn decode_image_bytes(data: &[u8]) -> Result<LoadedImage, String> {
    if data.len() < 4 {
        return Err("Image data too short".to_string());
    }

    if is_jpeg(data) {
        decode_jpeg(data)
    } else if is_png(data) {
        decode_png(data)
    } else {
        Err("Unsupported image format (expected JPEG or PNG)".to_string())
    }
}

fn is_jpeg(data: &[u8]) -> bool {
    data.starts_with(&[0xFF, 0xD8])
}

fn is_png(data: &[u8]) -> bool {
    data.starts_with(&[0x89, b'P', b'N', b'G'])
}

/// JPEG: decode once to prove the scan data is intact, then keep the
/// original bytes for DCTDecode.
fn decode_jpeg(data: &[u8]) -> Result<LoadedImage, String> {
    let img = image::load_from_memory_with_format(data, image::ImageFormat::Jpeg)
        .map_err(|e| format!("Failed to decode JPEG: {}", e))?;

    Ok(LoadedImage {
        pixel_data: ImagePixelData::Jpeg {
            data: data.to_vec(),
            color_space: detect_jpeg_color_space(data),
        },
        width_px: img.width(),
        height_px: img.height(),
    })
}

/// Walk the JPEG segments up to the first SOF marker and read its component
/// count. Defaults to RGB.
fn detect_jpeg_color_space(data: &[u8]) -> JpegColorSpace {
    let mut i = 2;
    while i + 3 < data.len() && data[i] == 0xFF {
        let marker = data[i + 1];
        let is_sof = matches!(marker, 0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF);
        if is_sof {
            // length(2) precision(1) height(2) width(2) components(1)
            return match data.get(i + 9) {
                Some(1) => JpegColorSpace::DeviceGray,
                _ => JpegColorSpace::DeviceRGB,
            };
        }
        let seg_len = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
        i += 2 + seg_len;
    }
    JpegColorSpace::DeviceRGB
}

/// PNG: decode to RGBA, split into RGB + alpha.
fn decode_png(data: &[u8]) -> Result<LoadedImage, String> {
    let img = image::io::Reader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| format!("PNG format detection error: {}", e))?
        .decode()
        .map_err(|e| format!("Failed to decode PNG: {}", e))?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let pixel_count = (width as usize) * (height as usize);
    let mut rgb = Vec::with_capacity(pixel_count * 3);
    let mut alpha = Vec::with_capacity(pixel_count);

    for pixel in rgba.pixels() {
        rgb.extend_from_slice(&pixel.0[..3]);
        alpha.push(pixel.0[3]);
    }
    let opaque = alpha.iter().all(|&a| a == 255);

    Ok(LoadedImage {
        pixel_data: ImagePixelData::Decoded {
            rgb,
            alpha: if opaque { None } else { Some(alpha) },
        },
        width_px: width,
        height_px: height,
    })
}
