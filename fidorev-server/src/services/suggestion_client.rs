//! Outbound suggestion capability
//!
//! One call per row to an OpenAI-compatible chat completion endpoint.
//! The provider is a trait so the review session and the tests can swap
//! in canned or failing implementations without a live model.

use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

use crate::models::Row;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4";
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Suggestion capability errors. These never escape the review session;
/// every variant is converted to a default suggestion whose reason
/// carries the failure detail.
#[derive(Debug, Error)]
pub enum SuggestionError {
    #[error("suggestion API key not configured")]
    NotConfigured,

    #[error("network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("malformed completion response: {0}")]
    Malformed(String),
}

/// External collaborator producing raw suggestion text for one row
#[async_trait]
pub trait SuggestionProvider: Send + Sync {
    async fn suggest(&self, row: &Row) -> Result<String, SuggestionError>;
}

/// Production provider backed by a chat completion endpoint
pub struct ChatSuggestionClient {
    http_client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl ChatSuggestionClient {
    pub fn new(
        api_key: Option<String>,
        base_url: Option<String>,
        model: Option<String>,
    ) -> Result<Self, SuggestionError> {
        let http_client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| SuggestionError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        })
    }

    fn completions_url(&self) -> String {
        if self.base_url.ends_with('/') {
            format!("{}chat/completions", self.base_url)
        } else {
            format!("{}/chat/completions", self.base_url)
        }
    }
}

#[async_trait]
impl SuggestionProvider for ChatSuggestionClient {
    async fn suggest(&self, row: &Row) -> Result<String, SuggestionError> {
        let api_key = self.api_key.as_ref().ok_or(SuggestionError::NotConfigured)?;

        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "user", "content": build_prompt(row) }
            ],
        });

        tracing::debug!(model = %self.model, "Requesting row suggestion");

        let response = self
            .http_client
            .post(self.completions_url())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| SuggestionError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(SuggestionError::Api(status.as_u16(), error_text));
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| SuggestionError::Malformed(e.to_string()))?;

        payload["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| {
                SuggestionError::Malformed("missing choices[0].message.content".to_string())
            })
    }
}

/// Prompt template embedding the row fields the cleanliness review cares
/// about, with the output format the parser understands.
pub fn build_prompt(row: &Row) -> String {
    format!(
        "This is a FIDO data row for data cleanliness review.\n\
         Brand: {}\n\
         UPC: {}\n\
         Description: {}\n\
         Category: {}\n\
         IS_DELETED: {}\n\
         Is Brand ID Null?: {}\n\
         \n\
         Tasks:\n\
         - If this does NOT belong to the brand, suggest \"Remove\".\n\
         - Suggest corrected brand, category, description (if needed) with \"Edit\".\n\
         - Otherwise suggest \"Keep\".\n\
         \n\
         Output as JSON:\n\
         {{\"Action\": \"...\", \"Updated Brand\": \"...\", \"Updated Category\": \"...\", \
         \"Updated Description\": \"...\", \"Reason\": \"...\"}}\n\
         or as one `Key: value` pair per line using the same keys.",
        row.get("brand"),
        row.get("UPC"),
        row.get("description"),
        row.get("category"),
        row.get("IS_DELETED"),
        row.get("Is Brand ID Null?"),
    )
}
