use std::sync::Arc;

use axum::{
    Form, Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};

use hotelgate_auth::Credentials;
use hotelgate_routing::{LoginFlow, RecordingNavigator};
use hotelgate_session::SessionManager;

use crate::app::dto::{LoginRequest, LoginResponse};
use crate::app::services::AppState;
use crate::app::{errors, pages};
use crate::cookies::{CookieScope, CookieStorage};

pub const DASHBOARD: &str = "/dashboard";
pub const LOGOUT: &str = "/logout";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_page).post(login_form))
        .route(LOGOUT, get(logout_page))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
}

/// The login origin's own session store for this request.
pub fn root_store(headers: &HeaderMap) -> (Arc<CookieStorage>, SessionManager) {
    let storage = Arc::new(CookieStorage::from_headers(headers, CookieScope::root()));
    let sessions = SessionManager::from_arc(storage.clone());
    (storage, sessions)
}

/// A browser that still holds a session skips the form.
pub async fn login_page(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (_, sessions) = root_store(&headers);
    let mut flow = LoginFlow::new(state.exchange.clone(), sessions);

    match flow.resume() {
        Some(identity) => {
            tracing::debug!(user = %identity.username, "resuming existing session");
            Redirect::to(DASHBOARD).into_response()
        }
        None => Html(pages::login(None)).into_response(),
    }
}

/// Browser form post: on success the browser is sent on to be routed.
pub async fn login_form(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(body): Form<LoginRequest>,
) -> Response {
    let (storage, sessions) = root_store(&headers);
    let mut flow = LoginFlow::new(state.exchange.clone(), sessions);

    let mut response = match flow.login(&Credentials::from(body)).await {
        Ok(_) => Redirect::to(DASHBOARD).into_response(),
        Err(e) => (
            errors::login_error_status(&e),
            Html(pages::login(Some(&e.inline_message()))),
        )
            .into_response(),
    };

    storage.apply(&mut response);
    response
}

pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<LoginRequest>,
) -> Response {
    let (storage, sessions) = root_store(&headers);
    let mut flow = LoginFlow::new(state.exchange.clone(), sessions);

    let mut response = match flow.login(&Credentials::from(body)).await {
        Ok(session) => Json(LoginResponse {
            identity: session.identity,
            token: session.token,
            next: DASHBOARD,
        })
        .into_response(),
        Err(e) => errors::login_error_to_response(&e),
    };

    storage.apply(&mut response);
    response
}

/// Server-side revocation of the presented token (bearer or cookie), plus
/// clearing of the login origin's cookies.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (storage, sessions) = root_store(&headers);

    let token = extract_bearer(&headers)
        .map(str::to_string)
        .or_else(|| sessions.get().map(|s| s.token));
    if let Err(e) = sessions.clear() {
        tracing::warn!("failed to clear session cookies: {e}");
    }

    if let (Some(revoker), Some(token)) = (&state.revoker, token) {
        if let Err(e) = revoker.revoke(&token).await {
            tracing::warn!("token revocation failed: {e}");
        }
    }

    let mut response = StatusCode::NO_CONTENT.into_response();
    storage.apply(&mut response);
    response
}

/// Browser logout from the login origin.
pub async fn logout_page(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (storage, sessions) = root_store(&headers);
    let navigator = RecordingNavigator::new();

    let target = hotelgate_routing::logout(&sessions, &navigator, &state.login_url(), state.revoker.as_deref()).await;

    let mut response = Redirect::to(&target).into_response();
    storage.apply(&mut response);
    response
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let token = headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")?
        .trim();
    (!token.is_empty()).then_some(token)
}
