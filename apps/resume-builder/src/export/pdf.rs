//! PDF export: layout with fallback, encoding, and delivery.
//!
//! `PdfExporter` tries its renderers in order. A renderer that fails is
//! logged and the next one is tried; only when every renderer has failed
//! does the export fail. One export runs at a time, guarded by an
//! `AtomicBool` busy flag released on drop.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::export::sink::DownloadSink;
use crate::layout::{LaidOutDocument, PageGeometry, PageRenderer, StrategyKind};
use crate::models::{PersonalInfo, ResumeRecord};
use crate::render::encode_pdf;

/// Exports above this size are delivered but logged as a warning.
pub const LARGE_PDF_BYTES: usize = 10 * 1024 * 1024;

/// `{first}{_last}_Resume_{YYYY-MM-DD}.pdf`, with `Resume` standing in for a
/// blank first name.
pub fn pdf_file_name(info: &PersonalInfo, date: NaiveDate) -> String {
    let first = file_name_part(&info.first_name);
    let last = file_name_part(&info.last_name);

    let first = if first.is_empty() { "Resume".to_string() } else { first };
    let last = if last.is_empty() { String::new() } else { format!("_{last}") };

    format!("{first}{last}_Resume_{}.pdf", date.format("%Y-%m-%d"))
}

fn file_name_part(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect()
}

/// Outcome of a successful PDF export.
#[derive(Debug, Clone, Serialize)]
pub struct ExportedPdf {
    pub file_name: String,
    pub path: PathBuf,
    pub byte_len: usize,
    pub pages: usize,
    pub strategy: StrategyKind,
}

pub struct PdfExporter {
    renderers: Vec<Arc<dyn PageRenderer>>,
    geometry: PageGeometry,
    sink: Arc<dyn DownloadSink>,
    busy: AtomicBool,
}

/// Clears the busy flag when the export finishes, on every path.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl PdfExporter {
    pub fn new(
        renderers: Vec<Arc<dyn PageRenderer>>,
        geometry: PageGeometry,
        sink: Arc<dyn DownloadSink>,
    ) -> Self {
        Self {
            renderers,
            geometry,
            sink,
            busy: AtomicBool::new(false),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Lays out, encodes and delivers `record` as a PDF named for `date`.
    pub async fn export_pdf(
        &self,
        record: &ResumeRecord,
        date: NaiveDate,
    ) -> Result<ExportedPdf, AppError> {
        let _guard = self.acquire()?;

        let doc = self.layout(record).await?;
        let strategy = doc.strategy;
        let pages = doc.page_count();

        let bytes = tokio::task::spawn_blocking(move || encode_pdf(&doc))
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("PDF encoding task panicked: {e}")))??;

        let byte_len = bytes.len();
        if byte_len > LARGE_PDF_BYTES {
            warn!(
                bytes = byte_len,
                "Generated PDF is larger than 10 MB; consider the direct layout"
            );
        }

        let file_name = pdf_file_name(&record.personal_info, date);
        let path = self.sink.deliver(&file_name, bytes).await?;

        info!(
            file = %file_name,
            strategy = strategy.as_str(),
            pages,
            bytes = byte_len,
            "PDF exported"
        );

        Ok(ExportedPdf {
            file_name,
            path,
            byte_len,
            pages,
            strategy,
        })
    }

    fn acquire(&self) -> Result<BusyGuard<'_>, AppError> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| AppError::ExportFailure("an export is already in progress".into()))?;
        Ok(BusyGuard(&self.busy))
    }

    async fn layout(&self, record: &ResumeRecord) -> Result<LaidOutDocument, AppError> {
        if self.renderers.is_empty() {
            return Err(AppError::ExportFailure("no layout strategy is configured".into()));
        }

        let mut failures = Vec::with_capacity(self.renderers.len());
        for renderer in &self.renderers {
            let strategy = renderer.strategy();
            match renderer.render(record, &self.geometry).await {
                Ok(doc) => return Ok(doc),
                Err(e) => {
                    warn!(strategy = strategy.as_str(), "Layout strategy failed, trying next: {e}");
                    failures.push(format!("{}: {e}", strategy.as_str()));
                }
            }
        }

        Err(AppError::ExportFailure(format!(
            "every layout strategy failed ({})",
            failures.join("; ")
        )))
    }
}
