//! HTTP API handlers for soundalike-server

pub mod health;
pub mod similar;
pub mod ui;

pub use health::health_routes;
pub use similar::similar_routes;
pub use ui::ui_routes;
