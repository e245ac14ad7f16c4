//! Editor errors.
//!
//! Lookup and precondition failures are raised by the component list;
//! transport failures come from the persistence gateway. The editor decides
//! which of them reach the caller (see `editor.rs`).

/// Errors produced by story editing and persistence.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    /// The requested component type is not in the registry.
    #[error("unknown component type: {0}")]
    UnknownComponent(String),

    /// A remove/move targeted an index outside the list.
    #[error("component index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// The page is not in modify mode.
    #[error("story is read-only outside modify mode")]
    ReadOnly,

    /// The HTTP request to the story server failed.
    #[error("sync request failed: {0}")]
    ApiRequest(String),

    /// The story server returned a non-success HTTP status.
    #[error("sync response error: status {status}")]
    ApiResponse { status: u16, body: String },

    /// The story server response body could not be deserialized.
    #[error("sync response parse failed: {0}")]
    ApiParse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// A configuration value is missing or malformed.
    #[error("config error: {0}")]
    Config(String),
}

impl EditorError {
    /// Stable machine-readable code for logs.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownComponent(_) => "E_UNKNOWN_COMPONENT",
            Self::IndexOutOfRange { .. } => "E_INDEX_OUT_OF_RANGE",
            Self::ReadOnly => "E_READ_ONLY",
            Self::ApiRequest(_) => "E_API_REQUEST",
            Self::ApiResponse { .. } => "E_API_RESPONSE",
            Self::ApiParse(_) => "E_API_PARSE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
            Self::Config(_) => "E_CONFIG",
        }
    }

    /// Whether a sync that failed with this error may succeed if repeated.
    #[must_use]
    pub fn retryable(&self) -> bool {
        matches!(self, Self::ApiRequest(_) | Self::ApiResponse { status: 429 | 500..=599, .. })
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
