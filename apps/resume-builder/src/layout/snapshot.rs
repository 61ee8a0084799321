//! Snapshot layout: slices one tall captured image of the resume into
//! page-sized JPEG strips.

use std::io::Cursor;
use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::RgbImage;
use tracing::{debug, info};

use crate::errors::AppError;
use crate::layout::document::{ImageSlice, LaidOutDocument, Page, PageItem, StrategyKind};
use crate::layout::geometry::{PageGeometry, A4_WIDTH_MM};

/// Screen resolution the capture width is expressed in.
const CAPTURE_DPI: f32 = 96.0;
const JPEG_QUALITY: u8 = 90;

/// Width in pixels of a capture of an A4-wide page at `scale`.
pub fn capture_width_px(scale: u32) -> u32 {
    let base = (A4_WIDTH_MM / 25.4 * CAPTURE_DPI).round() as u32;
    base * scale.max(1)
}

/// Produces a raster image of the rendered resume.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Captures the resume `width_px` pixels wide; height follows the content.
    async fn capture(&self, width_px: u32) -> Result<RgbImage, AppError>;
}

/// Reads a previously captured PNG (or JPEG) from disk and scales it to the
/// requested width.
#[derive(Debug, Clone)]
pub struct ImageFileSnapshot {
    path: PathBuf,
}

impl ImageFileSnapshot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SnapshotSource for ImageFileSnapshot {
    async fn capture(&self, width_px: u32) -> Result<RgbImage, AppError> {
        let raw = tokio::fs::read(&self.path).await.map_err(|e| {
            AppError::LayoutFailure(format!(
                "resume snapshot {} is unavailable: {e}",
                self.path.display()
            ))
        })?;

        let image = tokio::task::spawn_blocking(move || decode_scaled(&raw, width_px))
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("snapshot decode task panicked: {e}")))??;

        info!(
            path = %self.path.display(),
            width = image.width(),
            height = image.height(),
            "Captured resume snapshot"
        );
        Ok(image)
    }
}

fn decode_scaled(raw: &[u8], width_px: u32) -> Result<RgbImage, AppError> {
    let image = image::load_from_memory(raw)
        .map_err(|e| AppError::LayoutFailure(format!("snapshot is not a readable image: {e}")))?
        .to_rgb8();

    if image.width() == 0 || image.height() == 0 || image.width() == width_px {
        return Ok(image);
    }

    let height = ((image.height() as u64 * width_px as u64) / image.width() as u64).max(1) as u32;
    Ok(imageops::resize(&image, width_px, height, FilterType::Triangle))
}

/// Cuts `image` into page slices for `geometry`.
///
/// The image spans the full page width, so `px_per_mm = width / page_width`.
/// Each page shows `content_height × px_per_mm` pixels starting at the top
/// margin. A page is added only while image rows remain.
pub fn slice_snapshot(
    image: &RgbImage,
    geometry: &PageGeometry,
) -> Result<LaidOutDocument, AppError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(AppError::LayoutFailure(format!(
            "snapshot has no area ({width}×{height} px)"
        )));
    }

    let px_per_mm = width as f32 / geometry.page_width_mm;
    let slice_px = ((geometry.content_height_mm() * px_per_mm).floor() as u32).max(1);

    let mut pages = Vec::new();
    let mut top = 0u32;
    while top < height {
        let rows = slice_px.min(height - top);
        let strip = imageops::crop_imm(image, 0, top, width, rows).to_image();
        let jpeg = encode_jpeg(&strip)?;

        pages.push(Page {
            items: vec![PageItem::Image(ImageSlice {
                x_mm: 0.0,
                y_mm: geometry.margin_mm,
                width_mm: geometry.page_width_mm,
                height_mm: rows as f32 / px_per_mm,
                width_px: width,
                height_px: rows,
                jpeg,
            })],
        });
        top += rows;
    }

    debug!(width, height, slice_px, pages = pages.len(), "Snapshot sliced");

    Ok(LaidOutDocument {
        strategy: StrategyKind::Snapshot,
        geometry: *geometry,
        pages,
    })
}

fn encode_jpeg(strip: &RgbImage) -> Result<Bytes, AppError> {
    let mut buf = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY)
        .encode_image(strip)
        .map_err(|e| AppError::LayoutFailure(format!("snapshot slice could not be encoded: {e}")))?;
    Ok(Bytes::from(buf.into_inner()))
}
