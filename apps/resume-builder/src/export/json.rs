use std::path::Path;

use bytes::Bytes;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::ResumeRecord;

/// Name the JSON export is saved under.
pub const JSON_FILE_NAME: &str = "resume.json";

/// Pretty-printed JSON of the whole record.
pub fn export_json(record: &ResumeRecord) -> Result<Bytes, AppError> {
    let json = serde_json::to_vec_pretty(record)
        .map_err(|e| AppError::ExportFailure(format!("resume could not be serialized: {e}")))?;
    Ok(Bytes::from(json))
}

/// Parses an imported file. Anything that is not a JSON object, or has a
/// field of the wrong type, is rejected; missing fields take their defaults.
pub fn import_json(raw: &[u8]) -> Result<ResumeRecord, AppError> {
    let value: serde_json::Value = serde_json::from_slice(raw).map_err(|e| {
        warn!("Import rejected, not JSON: {e}");
        AppError::InvalidFormat("Invalid JSON file".into())
    })?;

    if !value.is_object() {
        warn!("Import rejected, top-level value is not an object");
        return Err(AppError::InvalidFormat("Invalid JSON file".into()));
    }

    serde_json::from_value(value).map_err(|e| {
        warn!("Import rejected, unexpected shape: {e}");
        AppError::InvalidFormat(format!("Invalid JSON file: {e}"))
    })
}

/// Reads and parses a resume file.
pub async fn import_file(path: &Path) -> Result<ResumeRecord, AppError> {
    let raw = tokio::fs::read(path)
        .await
        .map_err(|e| AppError::ReadFailure(format!("{}: {e}", path.display())))?;
    let record = import_json(&raw)?;
    info!(path = %path.display(), "Resume file parsed");
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LanguageEntry, PersonalInfo, ProjectEntry};

    fn sample() -> ResumeRecord {
        ResumeRecord {
            personal_info: PersonalInfo {
                first_name: "Linus".into(),
                last_name: "Torvalds".into(),
                summary: "Kernel hacker.\nLikes diving.".into(),
                ..PersonalInfo::default()
            },
            projects: vec![ProjectEntry {
                id: 7,
                title: "Git".into(),
                technologies: "C, shell".into(),
                link: "https://git-scm.com".into(),
                start_date: "2005-04".into(),
                ..ProjectEntry::default()
            }],
            languages: vec![LanguageEntry {
                id: 3,
                language: "Suomi".into(),
                proficiency: "Native".into(),
            }],
            skills: vec!["C".into(), "Rust".into()],
            ..ResumeRecord::scaffold()
        }
    }

    #[test]
    fn test_export_then_import_is_identity() {
        let record = sample();
        let bytes = export_json(&record).unwrap();
        assert_eq!(import_json(&bytes).unwrap(), record);
    }

    #[test]
    fn test_export_uses_camel_case_and_is_pretty() {
        let text = String::from_utf8(export_json(&sample()).unwrap().to_vec()).unwrap();
        assert!(text.contains("\"personalInfo\""));
        assert!(text.contains("\"firstName\": \"Linus\""));
        assert!(text.contains('\n'));
        assert!(!text.starts_with('\u{feff}'));
    }

    #[test]
    fn test_import_missing_fields_default() {
        let record = import_json(br#"{"skills": ["Go"]}"#).unwrap();
        assert_eq!(record.skills, vec!["Go"]);
        assert!(record.education.is_empty());
        assert_eq!(record.personal_info, PersonalInfo::default());
    }

    #[test]
    fn test_import_rejects_non_object() {
        let cases: [&[u8]; 4] = [b"[1, 2, 3]", b"\"resume\"", b"42", b"null"];
        for raw in cases {
            assert!(matches!(import_json(raw), Err(AppError::InvalidFormat(_))));
        }
    }

    #[test]
    fn test_import_rejects_garbage() {
        assert!(matches!(
            import_json(b"{ not json"),
            Err(AppError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_import_rejects_wrong_field_type() {
        assert!(matches!(
            import_json(br#"{"skills": "Rust"}"#),
            Err(AppError::InvalidFormat(_))
        ));
    }

    #[tokio::test]
    async fn test_import_file_missing_is_read_failure() {
        let dir = tempfile::tempdir().unwrap();
        let result = import_file(&dir.path().join("nope.json")).await;
        assert!(matches!(result, Err(AppError::ReadFailure(_))));
    }

    #[tokio::test]
    async fn test_import_file_reads_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(JSON_FILE_NAME);
        tokio::fs::write(&path, export_json(&sample()).unwrap())
            .await
            .unwrap();
        assert_eq!(import_file(&path).await.unwrap(), sample());
    }
}
