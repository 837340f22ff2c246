//! Domain types for the review portal

pub mod decision;
pub mod project;
pub mod row;
pub mod suggestion;

pub use decision::{DecisionSubmission, ReviewAction, ReviewDecision};
pub use project::{Priority, Project, ProjectStats, ProjectStatus, QueueType};
pub use row::Row;
pub use suggestion::Suggestion;
