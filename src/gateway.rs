//! Persistence gateway — posts the editing form, returns the canonical story.
//!
//! DESIGN
//! ======
//! `PersistenceGateway` is the seam between the editor and the story server,
//! so tests can swap in a scripted gateway. `HttpGateway` is the production
//! implementation: one `reqwest::Client` with request/connect timeouts,
//! posting to the page's background save URL.
//!
//! ERROR HANDLING
//! ==============
//! Retryable failures (transport errors, 429, 5xx) are retried with linear
//! back-off up to `SyncConfig::attempts`. Non-success statuses and bodies
//! that do not parse as a story are returned as typed errors; nothing is
//! swallowed here. The editor decides how failures surface.

use std::time::Duration;

use tracing::{debug, warn};

use crate::config::SyncConfig;
use crate::error::EditorError;
use crate::form::FormState;
use crate::story::StoryState;
use crate::url::background_url;

// =============================================================================
// TRAIT
// =============================================================================

/// Saves the current form and returns the server's story representation.
#[async_trait::async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Persist `form` and return the canonical story state.
    ///
    /// # Errors
    ///
    /// Returns an [`EditorError`] if the request fails, the server rejects
    /// it, or the response is not a story document.
    async fn save(&self, form: &FormState) -> Result<StoryState, EditorError>;
}

// =============================================================================
// HTTP GATEWAY
// =============================================================================

pub struct HttpGateway {
    http: reqwest::Client,
    url: String,
    attempts: usize,
    retry_base_ms: u64,
}

impl HttpGateway {
    /// Build a gateway for the story edited at `page_url`.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::HttpClientBuild`] if the HTTP client fails to build.
    pub fn new(page_url: &str, config: SyncConfig) -> Result<Self, EditorError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| EditorError::HttpClientBuild(e.to_string()))?;
        Ok(Self {
            http,
            url: background_url(page_url),
            attempts: config.attempts.max(1),
            retry_base_ms: config.retry_base_ms,
        })
    }

    /// Background save URL this gateway posts to.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn post_once(&self, form: &FormState) -> Result<StoryState, EditorError> {
        let response = self
            .http
            .post(&self.url)
            .form(form.pairs())
            .send()
            .await
            .map_err(|e| EditorError::ApiRequest(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| EditorError::ApiRequest(e.to_string()))?;

        if !status.is_success() {
            return Err(EditorError::ApiResponse { status: status.as_u16(), body: text });
        }

        parse_story(&text)
    }
}

#[async_trait::async_trait]
impl PersistenceGateway for HttpGateway {
    async fn save(&self, form: &FormState) -> Result<StoryState, EditorError> {
        let mut attempt = 1;
        loop {
            match self.post_once(form).await {
                Ok(story) => {
                    debug!(url = %self.url, attempt, fields = form.len(), "story saved");
                    return Ok(story);
                }
                Err(e) if e.retryable() && attempt < self.attempts => {
                    warn!(error = %e, attempt, total = self.attempts, "story save failed; retrying");
                    tokio::time::sleep(Duration::from_millis((attempt as u64) * self.retry_base_ms)).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Parse a save response body.
///
/// # Errors
///
/// Returns [`EditorError::ApiParse`] if `text` is not a story JSON object.
pub fn parse_story(text: &str) -> Result<StoryState, EditorError> {
    serde_json::from_str(text).map_err(|e| EditorError::ApiParse(e.to_string()))
}

#[cfg(test)]
#[path = "gateway_test.rs"]
mod tests;
