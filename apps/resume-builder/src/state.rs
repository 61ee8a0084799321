use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tracing::info;

use crate::config::Config;
use crate::errors::{AppError, Notification};
use crate::export::{self, DownloadSink, ExportedPdf, PdfExporter, JSON_FILE_NAME};
use crate::models::{EntryId, ResumeRecord};
use crate::persistence::{FileKeyValueStore, KeyValueStore, PersistenceAdapter};
use crate::store::{Action, NewEntry, Store};

/// Application state: the record store, its persistence, and the exporter.
///
/// The record is loaded once when the state is opened; that load is never
/// written back. Every later change is saved through the debounced adapter.
pub struct AppState {
    pub config: Config,
    store: Store,
    persistence: PersistenceAdapter,
    exporter: Arc<PdfExporter>,
    downloads: Arc<dyn DownloadSink>,
}

impl AppState {
    /// Opens the file-backed store under `config.data_dir` and loads the
    /// saved record. Must be called inside a tokio runtime.
    pub fn open(
        config: Config,
        exporter: Arc<PdfExporter>,
        downloads: Arc<dyn DownloadSink>,
    ) -> Result<Self, AppError> {
        let kv = Arc::new(FileKeyValueStore::open(&config.data_dir)?);
        Ok(Self::with_storage(config, kv, exporter, downloads))
    }

    pub fn with_storage(
        config: Config,
        kv: Arc<dyn KeyValueStore>,
        exporter: Arc<PdfExporter>,
        downloads: Arc<dyn DownloadSink>,
    ) -> Self {
        let persistence = PersistenceAdapter::new(
            kv,
            config.storage_key.clone(),
            Duration::from_millis(config.save_debounce_ms),
        );
        let record = persistence.load(ResumeRecord::scaffold());
        let store = Store::with_monotonic_ids(record);
        info!(key = %config.storage_key, "Resume state ready");

        Self {
            config,
            store,
            persistence,
            exporter,
            downloads,
        }
    }

    pub fn record(&self) -> &ResumeRecord {
        self.store.record()
    }

    /// Applies `action` and schedules a save when the record changed.
    pub fn dispatch(&mut self, action: Action) -> bool {
        let changed = self.store.dispatch(action);
        if changed {
            self.persistence.save(self.store.record());
        }
        changed
    }

    pub fn add_entry(&mut self, entry: NewEntry) -> EntryId {
        let id = self.store.add_entry(entry);
        self.persistence.save(self.store.record());
        id
    }

    /// Replaces the record with the contents of a JSON file.
    pub async fn import_file(&mut self, path: &Path) -> Result<Notification, AppError> {
        let record = export::import_file(path).await?;
        Ok(self.replace(record))
    }

    pub fn import_bytes(&mut self, raw: &[u8]) -> Result<Notification, AppError> {
        let record = export::import_json(raw)?;
        Ok(self.replace(record))
    }

    /// Restores the first-launch scaffold.
    pub fn reset(&mut self) {
        self.dispatch(Action::LoadRecord(Box::new(ResumeRecord::scaffold())));
        info!("Resume reset to defaults");
    }

    fn replace(&mut self, record: ResumeRecord) -> Notification {
        self.dispatch(Action::LoadRecord(Box::new(record)));
        info!("Resume imported");
        Notification::success("Resume imported successfully!")
    }

    /// Writes `resume.json` to the download sink.
    pub async fn export_json(&self) -> Result<PathBuf, AppError> {
        let bytes = export::export_json(self.store.record())?;
        self.downloads.deliver(JSON_FILE_NAME, bytes).await
    }

    pub async fn export_pdf(&self, date: NaiveDate) -> Result<ExportedPdf, AppError> {
        self.exporter.export_pdf(self.store.record(), date).await
    }

    /// Waits until every scheduled save has been written.
    pub async fn flush(&self) {
        self.persistence.flush().await;
    }

    pub async fn shutdown(self) {
        self.persistence.shutdown().await;
    }
}

/// Success message for a finished PDF export.
pub fn exported_notification(exported: &ExportedPdf) -> Notification {
    let megabytes = exported.byte_len as f64 / (1024.0 * 1024.0);
    Notification::success(format!(
        "Resume downloaded successfully! ({megabytes:.2}MB)"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::DirectorySink;
    use crate::layout::{DirectRenderer, PageGeometry};
    use crate::models::{LanguageEntry, PersonalInfoPatch};
    use crate::persistence::{load_record, MemoryKeyValueStore};

    struct Harness {
        kv: Arc<MemoryKeyValueStore>,
        out: tempfile::TempDir,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                kv: Arc::new(MemoryKeyValueStore::default()),
                out: tempfile::tempdir().unwrap(),
            }
        }

        fn state(&self) -> AppState {
            let sink: Arc<dyn DownloadSink> = Arc::new(DirectorySink::new(self.out.path()));
            let exporter = Arc::new(PdfExporter::new(
                vec![Arc::new(DirectRenderer)],
                PageGeometry::default(),
                sink.clone(),
            ));
            AppState::with_storage(Config::default(), self.kv.clone(), exporter, sink)
        }

        fn stored(&self) -> ResumeRecord {
            load_record(self.kv.as_ref(), "resumeData", ResumeRecord::default())
        }
    }

    fn rename(first: &str) -> Action {
        Action::UpdatePersonalInfo(PersonalInfoPatch {
            first_name: Some(first.to_string()),
            ..PersonalInfoPatch::default()
        })
    }

    #[tokio::test]
    async fn test_initial_load_does_not_save() {
        let harness = Harness::new();
        let state = harness.state();
        state.flush().await;
        assert_eq!(harness.kv.write_count(), 0);
        assert_eq!(state.record(), &ResumeRecord::scaffold());
    }

    #[tokio::test]
    async fn test_mutation_is_saved() {
        let harness = Harness::new();
        let mut state = harness.state();
        assert!(state.dispatch(rename("Ada")));
        state.flush().await;

        assert_eq!(harness.kv.write_count(), 1);
        assert_eq!(harness.stored().personal_info.first_name, "Ada");
    }

    #[tokio::test]
    async fn test_unchanged_dispatch_does_not_save() {
        let harness = Harness::new();
        let mut state = harness.state();
        assert!(!state.dispatch(rename("")));
        state.flush().await;
        assert_eq!(harness.kv.write_count(), 0);
    }

    #[tokio::test]
    async fn test_reopen_restores_saved_record() {
        let harness = Harness::new();
        let mut state = harness.state();
        state.dispatch(rename("Grace"));
        state.shutdown().await;

        let reopened = harness.state();
        assert_eq!(reopened.record().personal_info.first_name, "Grace");
    }

    #[tokio::test]
    async fn test_import_overwrites_instead_of_merging() {
        let harness = Harness::new();
        let mut state = harness.state();
        state.dispatch(Action::AddSkill("Rust".into()));

        let notification = state
            .import_bytes(br#"{"personalInfo": {"firstName": "Linus"}}"#)
            .unwrap();
        assert_eq!(notification.message, "Resume imported successfully!");
        assert_eq!(state.record().personal_info.first_name, "Linus");
        assert!(state.record().skills.is_empty());
        assert!(state.record().education.is_empty());

        state.flush().await;
        assert_eq!(harness.stored(), *state.record());
    }

    #[tokio::test]
    async fn test_failed_import_keeps_state() {
        let harness = Harness::new();
        let mut state = harness.state();
        state.dispatch(rename("Ada"));

        let err = state.import_bytes(b"[]").unwrap_err();
        assert_eq!(err.code(), "INVALID_FORMAT");
        assert_eq!(state.record().personal_info.first_name, "Ada");
    }

    #[tokio::test]
    async fn test_ids_after_import_do_not_collide() {
        let harness = Harness::new();
        let mut state = harness.state();
        state
            .import_bytes(br#"{"languages": [{"id": 41, "language": "Latin"}]}"#)
            .unwrap();
        let id = state.add_entry(NewEntry::Language(LanguageEntry {
            language: "Greek".into(),
            ..LanguageEntry::default()
        }));
        assert!(id > 41);
    }

    #[tokio::test]
    async fn test_reset_restores_scaffold_and_saves() {
        let harness = Harness::new();
        let mut state = harness.state();
        state.dispatch(rename("Ada"));
        state.reset();
        state.flush().await;
        assert_eq!(state.record(), &ResumeRecord::scaffold());
        assert_eq!(harness.stored(), ResumeRecord::scaffold());
    }

    #[tokio::test]
    async fn test_export_json_and_pdf_land_in_output_dir() {
        let harness = Harness::new();
        let mut state = harness.state();
        state.dispatch(rename("Ada"));

        let json = state.export_json().await.unwrap();
        assert_eq!(json, harness.out.path().join("resume.json"));

        let date = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        let pdf = state.export_pdf(date).await.unwrap();
        assert_eq!(pdf.file_name, "Ada_Resume_2025-01-02.pdf");
        assert!(pdf.path.exists());
        assert!(exported_notification(&pdf)
            .message
            .starts_with("Resume downloaded successfully! ("));
    }
}
