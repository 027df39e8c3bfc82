use std::time::Duration;

use anyhow::{Context, Result};

/// Engine configuration loaded from environment variables.
/// The base URL and bearer token are required; everything else has defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub api_token: String,
    /// Deadline for roster fetches and bulk-action dispatches.
    pub fetch_timeout: Duration,
    /// Deadline for a single-file upload. Remote analysis takes tens of
    /// seconds, so this is generous by default.
    pub upload_timeout: Duration,
    /// Bulk upload deadline = base + per_file × file count.
    pub bulk_timeout_base: Duration,
    pub bulk_timeout_per_file: Duration,
    /// Interval between simulated upload-progress increments.
    pub progress_tick: Duration,
    /// How long a terminal upload status stays visible before the roster
    /// refresh discards the job. Zero is fine for non-interactive use.
    pub refresh_delay: Duration,
    /// Optional path the CLI writes the CSV export to.
    pub export_path: Option<String>,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            api_base_url: require_env("SCREENER_API_URL")?,
            api_token: require_env("SCREENER_API_TOKEN")?,
            fetch_timeout: env_secs("SCREENER_FETCH_TIMEOUT_SECS", 10)?,
            upload_timeout: env_secs("SCREENER_UPLOAD_TIMEOUT_SECS", 60)?,
            bulk_timeout_base: env_secs("SCREENER_BULK_TIMEOUT_BASE_SECS", 60)?,
            bulk_timeout_per_file: env_secs("SCREENER_BULK_TIMEOUT_PER_FILE_SECS", 15)?,
            progress_tick: env_millis("SCREENER_PROGRESS_TICK_MS", 2000)?,
            refresh_delay: env_millis("SCREENER_REFRESH_DELAY_MS", 1500)?,
            export_path: std::env::var("SCREENER_EXPORT_PATH").ok(),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Deadline for a bulk upload of `file_count` files.
    pub fn bulk_upload_timeout(&self, file_count: usize) -> Duration {
        self.bulk_timeout_base + self.bulk_timeout_per_file * file_count as u32
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_secs(key: &str, default: u64) -> Result<Duration> {
    env_u64(key, default).map(Duration::from_secs)
}

fn env_millis(key: &str, default: u64) -> Result<Duration> {
    env_u64(key, default).map(Duration::from_millis)
}

fn env_u64(key: &str, default: u64) -> Result<u64> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<u64>()
            .with_context(|| format!("{key} must be a non-negative integer")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bulk_timeout_scales_with_file_count() {
        let config = Config {
            api_base_url: "http://localhost:8000".into(),
            api_token: "token".into(),
            fetch_timeout: Duration::from_secs(10),
            upload_timeout: Duration::from_secs(60),
            bulk_timeout_base: Duration::from_secs(60),
            bulk_timeout_per_file: Duration::from_secs(15),
            progress_tick: Duration::from_secs(2),
            refresh_delay: Duration::from_millis(1500),
            export_path: None,
            rust_log: "info".into(),
        };
        assert_eq!(config.bulk_upload_timeout(0), Duration::from_secs(60));
        assert_eq!(config.bulk_upload_timeout(4), Duration::from_secs(120));
        // A bulk batch always gets more headroom than a single upload.
        assert!(config.bulk_upload_timeout(1) > config.upload_timeout);
    }
}
