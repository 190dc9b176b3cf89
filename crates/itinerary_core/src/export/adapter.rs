//! Export use-case adapter.

use crate::export::pdf::{DocumentWriter, PdfWriter};
use crate::export::raster::{CardRasterizer, RasterOptions, Rasterizer};
use crate::export::view::RenderedTimeline;
use crate::export::{encode_png, ExportArtifact, ExportError, ExportFormat};
use image::ExtendedColorType;
use log::{error, info};

/// Wires rasterization and document capabilities into export operations.
pub struct ExportAdapter {
    rasterizer: Box<dyn Rasterizer>,
    writer: Box<dyn DocumentWriter>,
    options: RasterOptions,
}

impl Default for ExportAdapter {
    fn default() -> Self {
        Self::new(RasterOptions::default())
    }
}

impl ExportAdapter {
    /// Creates an adapter using the built-in rasterizer and PDF writer.
    pub fn new(options: RasterOptions) -> Self {
        Self::with_backends(CardRasterizer, PdfWriter::default(), options)
    }

    /// Creates an adapter over caller-provided capabilities.
    pub fn with_backends(
        rasterizer: impl Rasterizer + 'static,
        writer: impl DocumentWriter + 'static,
        options: RasterOptions,
    ) -> Self {
        Self {
            rasterizer: Box::new(rasterizer),
            writer: Box::new(writer),
            options,
        }
    }

    pub fn options(&self) -> &RasterOptions {
        &self.options
    }

    /// Rasterizes the surface and encodes it as PNG.
    ///
    /// # Errors
    /// - `SurfaceUnavailable` when `surface` is `None`.
    /// - Any rasterizer or encoder failure.
    pub fn export_image(
        &self,
        surface: Option<&RenderedTimeline>,
    ) -> Result<ExportArtifact, ExportError> {
        self.export(ExportFormat::Png, surface)
    }

    /// Rasterizes the surface and places it on a single-page PDF.
    ///
    /// # Errors
    /// - `SurfaceUnavailable` when `surface` is `None`.
    /// - Any rasterizer or document writer failure.
    pub fn export_document(
        &self,
        surface: Option<&RenderedTimeline>,
    ) -> Result<ExportArtifact, ExportError> {
        self.export(ExportFormat::Pdf, surface)
    }

    /// Runs one export and logs the outcome.
    pub fn export(
        &self,
        format: ExportFormat,
        surface: Option<&RenderedTimeline>,
    ) -> Result<ExportArtifact, ExportError> {
        let result = self.run(format, surface);
        match &result {
            Ok(artifact) => info!(
                "event=export module=export status=ok format={} width={} height={} bytes={}",
                format,
                artifact.raster_size.0,
                artifact.raster_size.1,
                artifact.bytes.len()
            ),
            Err(err) => error!(
                "event=export module=export status=error format={} error={}",
                format, err
            ),
        }
        result
    }

    fn run(
        &self,
        format: ExportFormat,
        surface: Option<&RenderedTimeline>,
    ) -> Result<ExportArtifact, ExportError> {
        let surface = surface.ok_or(ExportError::SurfaceUnavailable)?;
        self.options.validate()?;

        let raster = self.rasterizer.rasterize(surface, &self.options)?;
        if raster.width() == 0 || raster.height() == 0 {
            return Err(ExportError::EmptyRaster);
        }

        let bytes = match format {
            ExportFormat::Png => encode_png(
                raster.as_raw(),
                raster.width(),
                raster.height(),
                ExtendedColorType::Rgba8,
            )?,
            ExportFormat::Pdf => self.writer.write_document(&raster)?,
        };
        Ok(ExportArtifact {
            format,
            file_name: format.file_name(),
            bytes,
            raster_size: raster.dimensions(),
        })
    }
}
