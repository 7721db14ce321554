//! Format types for PPTX presentations.

use crate::common::RGBColor;
use crate::ooxml::opc::constants::content_type as ct;

/// Image format types that can be embedded in a presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Tiff,
}

impl ImageFormat {
    /// Get the MIME type for this image format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Bmp => "image/bmp",
            Self::Tiff => "image/tiff",
        }
    }

    /// Content type of an image part holding this format.
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Png => ct::PNG,
            Self::Jpeg => ct::JPEG,
            Self::Gif => ct::GIF,
            Self::Bmp => ct::BMP,
            Self::Tiff => ct::TIFF,
        }
    }

    /// Get the file extension used for new image parts.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Gif => "gif",
            Self::Bmp => "bmp",
            Self::Tiff => "tiff",
        }
    }

    /// Map a format reported by the image codec.
    pub fn from_codec(format: image::ImageFormat) -> Option<Self> {
        match format {
            image::ImageFormat::Png => Some(Self::Png),
            image::ImageFormat::Jpeg => Some(Self::Jpeg),
            image::ImageFormat::Gif => Some(Self::Gif),
            image::ImageFormat::Bmp => Some(Self::Bmp),
            image::ImageFormat::Tiff => Some(Self::Tiff),
            _ => None,
        }
    }
}

/// Run formatting applied to new text boxes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextFormat {
    /// Latin font family
    pub font: Option<String>,
    /// Font size in points
    pub size: Option<f64>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
    pub color: Option<RGBColor>,
}

impl TextFormat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_font(mut self, font: impl Into<String>) -> Self {
        self.font = Some(font.into());
        self
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = Some(bold);
        self
    }

    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = Some(italic);
        self
    }

    pub fn with_underline(mut self, underline: bool) -> Self {
        self.underline = Some(underline);
        self
    }

    pub fn with_color(mut self, color: RGBColor) -> Self {
        self.color = Some(color);
        self
    }

    /// True when no property is set; runs then carry no `a:rPr`.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
