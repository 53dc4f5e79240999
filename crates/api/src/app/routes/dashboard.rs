use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State},
    http::{HeaderMap, HeaderValue, StatusCode, header::RETRY_AFTER},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};

use hotelgate_routing::{RecordingNavigator, RoutingOutcome};

use crate::app::dto::DashboardQuery;
use crate::app::pages;
use crate::app::routes::auth::root_store;
use crate::app::services::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/dashboard", get(dashboard))
}

/// Post-login routing. Redirects to the user's service, or renders the
/// fallback / manual-choice page.
///
/// Automatic re-checks are driven by the page itself (a timed refresh
/// carrying the count), so a request never blocks for the cooldown.
pub async fn dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
    headers: HeaderMap,
) -> Response {
    let (storage, sessions) = root_store(&headers);
    let navigator = Arc::new(RecordingNavigator::new());
    let router = state.role_router(sessions, navigator.clone());

    let outcome = router.route().await;

    let mut response = match &outcome {
        RoutingOutcome::Navigated { target, .. } | RoutingOutcome::SignedOut { target } => {
            Redirect::to(target).into_response()
        }
        RoutingOutcome::Fallback { retry_after_ms, .. } => {
            let secs = retry_after_ms.div_ceil(1_000);
            let refresh = (query.recheck < router.config().rechecks)
                .then(|| (secs, format!("/dashboard?recheck={}", query.recheck + 1)));

            let mut response =
                (StatusCode::SERVICE_UNAVAILABLE, Html(pages::fallback(&outcome, refresh))).into_response();
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(secs));
            response
        }
        RoutingOutcome::ManualChoice { .. } => Html(pages::manual_choice(&outcome)).into_response(),
    };

    storage.apply(&mut response);
    response
}
