use std::sync::Arc;

use axum::{
    extract::{OriginalUri, Query, Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use serde::Deserialize;

use hotelgate_auth::{JwtValidator, KnownRole};
use hotelgate_routing::{Guard, RecordingNavigator};
use hotelgate_session::SessionManager;

use crate::context::IdentityContext;
use crate::cookies::{CookieScope, CookieStorage};

/// Guard settings of one mounted role-service.
#[derive(Clone)]
pub struct GuardLayerState {
    pub required: KnownRole,
    pub scope: CookieScope,
    pub login_url: String,
    pub handoff: Option<Arc<dyn JwtValidator>>,
}

#[derive(Debug, Deserialize)]
struct HandoffQuery {
    handoff: Option<String>,
}

/// Runs a fresh [`Guard`] for every request to a role-service.
///
/// Admitted requests carry an [`IdentityContext`]; everything else is
/// answered with a redirect to the login page.
pub async fn guard_middleware(
    State(state): State<GuardLayerState>,
    mut req: Request,
    next: Next,
) -> Response {
    let storage = Arc::new(CookieStorage::from_headers(req.headers(), state.scope.clone()));
    let navigator = Arc::new(RecordingNavigator::new());

    let mut guard = Guard::new(
        state.required,
        state.login_url.clone(),
        SessionManager::from_arc(storage.clone()),
        navigator.clone(),
    );
    if let Some(validator) = &state.handoff {
        guard = guard.with_handoff_validator(validator.clone());
    }

    let handoff = Query::<HandoffQuery>::try_from_uri(req.uri())
        .ok()
        .and_then(|Query(q)| q.handoff);
    match &handoff {
        Some(token) => guard.mount_with_handoff(token, Utc::now()),
        None => guard.mount(),
    };

    let mut response = match guard.identity() {
        // Consumed tokens do not stay in the address bar.
        Some(_) if handoff.is_some() => {
            let path = req
                .extensions()
                .get::<OriginalUri>()
                .map(|OriginalUri(uri)| uri.path().to_string())
                .unwrap_or_else(|| req.uri().path().to_string());
            Redirect::to(&path).into_response()
        }
        Some(identity) => {
            req.extensions_mut()
                .insert(IdentityContext::new(state.required, identity.clone()));
            next.run(req).await
        }
        None => {
            let target = navigator.last().unwrap_or_else(|| state.login_url.clone());
            Redirect::to(&target).into_response()
        }
    };

    storage.apply(&mut response);
    response
}
