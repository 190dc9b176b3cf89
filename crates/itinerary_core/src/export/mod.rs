//! Timeline export to PNG image and PDF document.
//!
//! # Responsibility
//! - Capture a render snapshot and hand it to rasterization/document
//!   capabilities behind narrow traits.
//! - Produce named artifacts that callers can save to disk.
//!
//! # Invariants
//! - Export never mutates timeline state.
//! - Every failure is returned as `ExportError` and logged; nothing panics.

pub mod adapter;
pub mod canvas;
pub mod pdf;
pub mod raster;
pub mod view;

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Fixed download name of image exports.
pub const IMAGE_FILE_NAME: &str = "travel-timeline.png";
/// Fixed download name of document exports.
pub const DOCUMENT_FILE_NAME: &str = "travel-timeline.pdf";

/// Export errors. Timeline state is unaffected by all of them.
#[derive(Debug)]
pub enum ExportError {
    /// No rendered surface is available to capture.
    SurfaceUnavailable,
    /// Upscale factor outside the supported range.
    InvalidScale(u32),
    /// Rasterizer produced an image without pixels.
    EmptyRaster,
    /// Requested raster exceeds the physical size limit.
    RasterTooLarge { width: u32, height: u32 },
    /// Rasterizer backend failed.
    Raster(String),
    /// Image encoding failed.
    Encode(image::ImageError),
    /// Document assembly failed.
    Document(String),
    /// Artifact could not be written.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SurfaceUnavailable => write!(f, "timeline surface is not available"),
            Self::InvalidScale(scale) => {
                write!(f, "export scale {scale} is outside the supported range 1..=4")
            }
            Self::EmptyRaster => write!(f, "rasterizer produced an empty image"),
            Self::RasterTooLarge { width, height } => write!(
                f,
                "raster of {width}x{height} px exceeds the {} px height limit",
                raster::MAX_RASTER_HEIGHT
            ),
            Self::Raster(message) => write!(f, "rasterization failed: {message}"),
            Self::Encode(err) => write!(f, "image encoding failed: {err}"),
            Self::Document(message) => write!(f, "document generation failed: {message}"),
            Self::Io { path, source } => {
                write!(f, "failed to write `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Encode(err) => Some(err),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Export target format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Png,
    Pdf,
}

impl ExportFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Pdf => "pdf",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            Self::Png => IMAGE_FILE_NAME,
            Self::Pdf => DOCUMENT_FILE_NAME,
        }
    }

    pub fn media_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Pdf => "application/pdf",
        }
    }
}

impl Display for ExportFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "png" | "image" => Ok(Self::Png),
            "pdf" | "document" => Ok(Self::Pdf),
            other => Err(format!("unsupported export format `{other}`; expected png|pdf")),
        }
    }
}

/// Encoded export ready to be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub format: ExportFormat,
    pub file_name: &'static str,
    pub bytes: Vec<u8>,
    /// Raster size in physical pixels.
    pub raster_size: (u32, u32),
}

impl ExportArtifact {
    /// Writes the artifact under `dir` with its fixed file name.
    ///
    /// # Errors
    /// - `Io` when the directory cannot be created or the file cannot be written.
    pub fn save(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        std::fs::create_dir_all(dir).map_err(|source| ExportError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = dir.join(self.file_name);
        std::fs::write(&path, &self.bytes).map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

/// Encodes raw 8-bit pixel rows as PNG.
pub(crate) fn encode_png(
    raw: &[u8],
    width: u32,
    height: u32,
    color: ExtendedColorType,
) -> Result<Vec<u8>, ExportError> {
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes)
        .write_image(raw, width, height, color)
        .map_err(ExportError::Encode)?;
    Ok(bytes)
}
