//! Image probing for embedded pictures.
//!
//! The codec is only asked for the format, pixel size and colour depth of an
//! image; the bytes are embedded unchanged.

use crate::common::unit::{DEFAULT_IMAGE_DPI, px_to_emu};
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::pptx::format::ImageFormat;
use image::{ImageDecoder, ImageReader};
use sha1::{Digest, Sha1};
use std::io::Cursor;

/// What the codec reports about an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub format: ImageFormat,
    pub width_px: u32,
    pub height_px: u32,
    pub bits_per_pixel: u16,
}

impl ImageInfo {
    /// Native size in EMU, assuming the default image resolution.
    pub fn native_size(&self) -> (i64, i64) {
        (
            px_to_emu(self.width_px, DEFAULT_IMAGE_DPI),
            px_to_emu(self.height_px, DEFAULT_IMAGE_DPI),
        )
    }
}

/// Identify and measure an image.
///
/// Only the header is decoded. Fails with [`OoxmlError::UnsupportedFormat`]
/// when the bytes are not an image in one of the embeddable formats or the
/// header cannot be read.
pub fn probe(bytes: &[u8]) -> Result<ImageInfo> {
    let unsupported = |e: image::ImageError| OoxmlError::UnsupportedFormat(e.to_string());
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| OoxmlError::UnsupportedFormat(e.to_string()))?;
    let codec_format = reader
        .format()
        .ok_or_else(|| OoxmlError::UnsupportedFormat("unrecognised image data".to_string()))?;
    let format = ImageFormat::from_codec(codec_format).ok_or_else(|| {
        OoxmlError::UnsupportedFormat(format!("{:?} images cannot be embedded", codec_format))
    })?;
    let decoder = reader.into_decoder().map_err(unsupported)?;
    let (width_px, height_px) = decoder.dimensions();

    Ok(ImageInfo {
        format,
        width_px,
        height_px,
        bits_per_pixel: decoder.color_type().bits_per_pixel(),
    })
}

/// Lower-case hex SHA-1 of `bytes`, used to recognise an image that is
/// already embedded.
pub fn sha1_hex(bytes: &[u8]) -> String {
    let digest = Sha1::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest.iter() {
        out.push_str(&format!("{:02x}", byte));
    }
    out
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_png() {
        let bytes = fixtures::png(4, 2, [255, 0, 0]);
        let info = probe(&bytes).unwrap();
        assert_eq!(info.format, ImageFormat::Png);
        assert_eq!((info.width_px, info.height_px), (4, 2));
        assert_eq!(info.bits_per_pixel, 24);
        assert_eq!(info.native_size(), (4 * 12_700, 2 * 12_700));
    }

    #[test]
    fn test_probe_rejects_garbage() {
        assert!(matches!(
            probe(b"definitely not an image"),
            Err(OoxmlError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_probe_rejects_truncated_png() {
        let bytes = fixtures::png(8, 8, [0, 0, 255]);
        assert!(matches!(
            probe(&bytes[..24]),
            Err(OoxmlError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_header_is_enough_for_dimensions() {
        let bytes = fixtures::png(640, 480, [10, 20, 30]);
        let iend = bytes.len() - 12;
        assert_eq!(&bytes[iend + 4..iend + 8], b"IEND");

        let info = probe(&bytes[..iend]).unwrap();
        assert_eq!((info.width_px, info.height_px), (640, 480));
        assert_eq!(info.format, ImageFormat::Png);
    }

    #[test]
    fn test_sha1_hex() {
        assert_eq!(sha1_hex(b"abc"), "a9993e364706816aba3e25717850c26c9cd0d89d");
        assert_eq!(sha1_hex(b"").len(), 40);
    }
}
