//! HTTP application wiring.
//!
//! - `services.rs`: shared collaborators (config, credential exchange, probe, shell)
//! - `routes/`: handlers, one file per area
//! - `pages.rs`: the few HTML pages
//! - `dto.rs`: request/response bodies
//! - `errors.rs`: consistent error responses

use axum::Router;

pub mod dto;
pub mod errors;
pub mod pages;
pub mod routes;
pub mod services;

pub use services::AppState;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(routes::router())
        .merge(routes::role_services::router(&state))
        .with_state(state)
}
