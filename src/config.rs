use anyhow::{Context, Result, anyhow};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: String,
    pub jwt_secret: String,
    pub admin_prefix: String,

    // Upstream HR REST API
    pub upstream_base_url: String,
    pub request_timeout_ms: u64,
    pub probe_timeout_ms: u64,

    // Passbook OCR
    pub tesseract_bin: String,
    pub ocr_import_timeout_ms: u64,
    pub ocr_timeout_ms: u64,
    pub ocr_teardown_timeout_ms: u64,
    pub max_upload_bytes: usize,

    // Drafts
    pub draft_ttl_secs: u64,
    pub draft_capacity: u64,

    // Rate limiting
    pub rate_admin_per_min: u32,
    pub rate_extract_per_min: u32,

    pub log_dir: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| lookup(key).ok_or_else(|| anyhow!("{key} must be set"));

        Ok(Self {
            server_addr: lookup("SERVER_ADDR").unwrap_or_else(|| "127.0.0.1:8090".to_string()),
            jwt_secret: required("JWT_SECRET")?,
            admin_prefix: lookup("ADMIN_PREFIX").unwrap_or_else(|| "/admin".to_string()),

            upstream_base_url: lookup("UPSTREAM_BASE_URL")
                .unwrap_or_else(|| "http://localhost:8080/api".to_string())
                .trim_end_matches('/')
                .to_string(),
            request_timeout_ms: parse_or(&lookup, "REQUEST_TIMEOUT_MS", 10_000)?, // default 10 s
            probe_timeout_ms: parse_or(&lookup, "PROBE_TIMEOUT_MS", 5_000)?,

            tesseract_bin: lookup("TESSERACT_BIN").unwrap_or_else(|| "tesseract".to_string()),
            ocr_import_timeout_ms: parse_or(&lookup, "OCR_IMPORT_TIMEOUT_MS", 15_000)?,
            ocr_timeout_ms: parse_or(&lookup, "OCR_TIMEOUT_MS", 30_000)?,
            ocr_teardown_timeout_ms: parse_or(&lookup, "OCR_TEARDOWN_TIMEOUT_MS", 5_000)?,
            max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,

            draft_ttl_secs: parse_or(&lookup, "DRAFT_TTL_SECS", 3_600)?,
            draft_capacity: parse_or(&lookup, "DRAFT_CAPACITY", 10_000)?,

            rate_admin_per_min: parse_or(&lookup, "RATE_ADMIN_PER_MIN", 600)?,
            rate_extract_per_min: parse_or(&lookup, "RATE_EXTRACT_PER_MIN", 30)?,

            log_dir: lookup("LOG_DIR").unwrap_or_else(|| "logs".to_string()),
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw}")),
        None => Ok(default),
    }
}
