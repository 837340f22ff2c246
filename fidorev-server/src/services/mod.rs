//! Review workflow services

pub mod analytics;
pub mod csv_codec;
pub mod review_session;
pub mod suggestion_client;
pub mod suggestion_parser;

pub use review_session::{ReviewSession, SessionState};
pub use suggestion_client::{ChatSuggestionClient, SuggestionProvider};
