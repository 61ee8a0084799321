// Document Layout Engine
// Turns a resume record into positioned content on A4 pages.
// Two strategies share the `PageRenderer` capability: direct text layout and
// snapshot slicing. CPU-bound work runs inside tokio::task::spawn_blocking.

pub mod direct;
pub mod document;
pub mod font_metrics;
pub mod geometry;
pub mod snapshot;
pub mod wrap;

use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::ResumeRecord;

pub use direct::{format_date_range, layout_direct};
pub use document::{LaidOutDocument, Page, PageItem, Section, StrategyKind};
pub use geometry::{a4_geometry, PageGeometry};
pub use snapshot::{capture_width_px, slice_snapshot, ImageFileSnapshot, SnapshotSource};

/// A way of turning a record into pages.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    fn strategy(&self) -> StrategyKind;

    async fn render(
        &self,
        record: &ResumeRecord,
        geometry: &PageGeometry,
    ) -> Result<LaidOutDocument, AppError>;
}

/// Direct text layout with the standard Helvetica fonts.
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectRenderer;

#[async_trait]
impl PageRenderer for DirectRenderer {
    fn strategy(&self) -> StrategyKind {
        StrategyKind::Direct
    }

    async fn render(
        &self,
        record: &ResumeRecord,
        geometry: &PageGeometry,
    ) -> Result<LaidOutDocument, AppError> {
        // spawn_blocking needs 'static data.
        let record = record.clone();
        let geometry = *geometry;
        tokio::task::spawn_blocking(move || layout_direct(&record, &geometry))
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("layout task panicked: {e}")))?
    }
}

/// Captures the resume through a `SnapshotSource` and slices the image.
pub struct SnapshotRenderer {
    source: Arc<dyn SnapshotSource>,
    scale: u32,
}

impl SnapshotRenderer {
    pub fn new(source: Arc<dyn SnapshotSource>, scale: u32) -> Self {
        Self { source, scale }
    }
}

#[async_trait]
impl PageRenderer for SnapshotRenderer {
    fn strategy(&self) -> StrategyKind {
        StrategyKind::Snapshot
    }

    async fn render(
        &self,
        _record: &ResumeRecord,
        geometry: &PageGeometry,
    ) -> Result<LaidOutDocument, AppError> {
        let image = self.source.capture(capture_width_px(self.scale)).await?;
        let geometry = *geometry;
        tokio::task::spawn_blocking(move || slice_snapshot(&image, &geometry))
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("snapshot slicing panicked: {e}")))?
    }
}
