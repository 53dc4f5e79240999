use axum::{Router, routing::get};

use crate::app::services::AppState;

pub mod auth;
pub mod dashboard;
pub mod role_services;
pub mod shell;
pub mod system;

/// Routes served by the login origin itself.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(system::health))
        .merge(auth::router())
        .merge(dashboard::router())
        .merge(shell::router())
}
