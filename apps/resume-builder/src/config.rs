use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

pub const DEFAULT_STORAGE_KEY: &str = "resumeData";

/// Application configuration loaded from environment variables.
/// Every variable is optional; invalid values fail at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub storage_key: String,
    pub output_dir: PathBuf,
    pub page_margin_mm: f32,
    pub snapshot_scale: u32,
    pub save_debounce_ms: u64,
    pub rust_log: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: PathBuf::from(".resume-data"),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            output_dir: PathBuf::from("."),
            page_margin_mm: 20.0,
            snapshot_scale: 2,
            save_debounce_ms: 500,
            rust_log: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();
        let config = Config {
            data_dir: std::env::var("RESUME_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            storage_key: std::env::var("RESUME_STORAGE_KEY").unwrap_or(defaults.storage_key),
            output_dir: std::env::var("RESUME_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            page_margin_mm: parse_env("RESUME_PAGE_MARGIN_MM", defaults.page_margin_mm)?,
            snapshot_scale: parse_env("RESUME_SNAPSHOT_SCALE", defaults.snapshot_scale)?,
            save_debounce_ms: parse_env("RESUME_SAVE_DEBOUNCE_MS", defaults.save_debounce_ms)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or(defaults.rust_log),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(15.0..=20.0).contains(&self.page_margin_mm) {
            bail!(
                "RESUME_PAGE_MARGIN_MM must be between 15 and 20, got {}",
                self.page_margin_mm
            );
        }
        if !(2..=3).contains(&self.snapshot_scale) {
            bail!(
                "RESUME_SNAPSHOT_SCALE must be 2 or 3, got {}",
                self.snapshot_scale
            );
        }
        if self.storage_key.trim().is_empty() {
            bail!("RESUME_STORAGE_KEY must not be empty");
        }
        Ok(())
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.storage_key, "resumeData");
    }

    #[test]
    fn test_margin_out_of_range_rejected() {
        let config = Config {
            page_margin_mm: 25.0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_snapshot_scale_out_of_range_rejected() {
        let config = Config {
            snapshot_scale: 5,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
