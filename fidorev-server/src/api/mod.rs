//! HTTP API handlers for fidorev-server

pub mod analytics;
pub mod health;
pub mod projects;
pub mod review;

pub use analytics::analytics_routes;
pub use health::health_routes;
pub use projects::project_routes;
pub use review::review_routes;
