use serde::Serialize;
use thiserror::Error;

/// Application-level error type.
/// Every variant maps to a stable code and a transient user notification;
/// none of them leave the application unusable.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Read failure: {0}")]
    ReadFailure(String),

    #[error("Layout failure: {0}")]
    LayoutFailure(String),

    #[error("Export failure: {0}")]
    ExportFailure(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Severity of a transient notification shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Success,
    Error,
}

/// A short-lived message surfaced at an operation boundary (import, export).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub code: &'static str,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            code: "OK",
            message: message.into(),
        }
    }
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidFormat(_) => "INVALID_FORMAT",
            AppError::ReadFailure(_) => "READ_FAILURE",
            AppError::LayoutFailure(_) => "LAYOUT_FAILURE",
            AppError::ExportFailure(_) => "EXPORT_FAILURE",
            AppError::Storage(_) => "STORAGE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Converts the error into the notification shown to the user.
    pub fn notification(&self) -> Notification {
        let message = match self {
            AppError::InvalidFormat(msg) => format!("Error importing resume: {msg}"),
            AppError::ReadFailure(msg) => format!("Error reading file: {msg}"),
            AppError::LayoutFailure(msg) | AppError::ExportFailure(msg) => {
                format!("Error downloading resume: {msg}")
            }
            AppError::Storage(msg) => {
                tracing::error!("Storage error: {msg}");
                "Your changes could not be saved locally".to_string()
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                "An unexpected error occurred".to_string()
            }
        };

        Notification {
            kind: NotificationKind::Error,
            code: self.code(),
            message,
        }
    }
}
