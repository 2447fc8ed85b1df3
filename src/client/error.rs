use derive_more::Display;

/// Failure talking to the HR backend.
#[derive(Debug, Display)]
pub enum ApiError {
    #[display(fmt = "Request to {} timed out after {}ms", url, after_ms)]
    Timeout { url: String, after_ms: u64 },

    #[display(fmt = "Request to {} was aborted", url)]
    Aborted { url: String },

    #[display(fmt = "Unable to connect to {}: {}", url, reason)]
    Network { url: String, reason: String },

    #[display(fmt = "API request failed with status {}: {}", status, body)]
    Status { status: u16, body: String },

    #[display(fmt = "Unexpected response from {}: {}", url, reason)]
    Decode { url: String, reason: String },

    /// The backend answered `success: false`.
    #[display(fmt = "{}", _0)]
    Rejected(String),

    #[display(fmt = "Failed to build request: {}", _0)]
    Request(String),

    /// The reachability probe failed before a write.
    #[display(fmt = "{}", _0)]
    Unavailable(&'static str),
}

impl std::error::Error for ApiError {}

impl ApiError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Timeout { .. })
    }

    /// Notice shown when a listing falls back to sample data after this error.
    pub fn fallback_notice(&self) -> &'static str {
        if self.is_timeout() {
            "Request timed out. Using sample data."
        } else {
            "Unable to connect to server. Using sample data."
        }
    }

    pub(crate) fn from_reqwest(url: &str, e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Decode { url: url.to_string(), reason: e.to_string() }
        } else if e.is_builder() {
            ApiError::Request(e.to_string())
        } else {
            ApiError::Network { url: url.to_string(), reason: e.to_string() }
        }
    }
}
