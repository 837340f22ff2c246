//! AI-generated row suggestions

use serde::{Deserialize, Serialize};

use super::ReviewAction;

/// Structured suggestion for one row, parsed from raw model output.
///
/// Always present during review: when the model call fails, times out,
/// or returns unusable text, the session falls back to
/// [`Suggestion::unavailable`] instead of blocking the reviewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub action: ReviewAction,
    pub brand: String,
    pub category: String,
    pub description: String,
    pub reason: String,
}

impl Suggestion {
    /// Default suggestion carrying the failure detail in `reason` so the
    /// reviewer can see the AI step did not contribute.
    pub fn unavailable(detail: impl Into<String>) -> Self {
        Self {
            action: ReviewAction::Keep,
            brand: String::new(),
            category: String::new(),
            description: String::new(),
            reason: format!("AI suggestion unavailable: {}", detail.into()),
        }
    }
}

impl Default for Suggestion {
    fn default() -> Self {
        Self {
            action: ReviewAction::Keep,
            brand: String::new(),
            category: String::new(),
            description: String::new(),
            reason: String::new(),
        }
    }
}
