//! Role-services mounted under `/app/{service}`, each behind its own guard.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, State},
    http::HeaderMap,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};

use hotelgate_auth::{JwtValidator, KnownRole};
use hotelgate_routing::RecordingNavigator;
use hotelgate_session::SessionManager;

use crate::app::dto::WhoAmIResponse;
use crate::app::pages;
use crate::app::routes::auth::LOGOUT;
use crate::app::routes::system;
use crate::app::services::AppState;
use crate::context::IdentityContext;
use crate::cookies::{CookieScope, CookieStorage};
use crate::middleware::{GuardLayerState, guard_middleware};

/// Mount path segment of each role-service.
pub const SERVICES: [(KnownRole, &str); 3] = [
    (KnownRole::Admin, "admin"),
    (KnownRole::FrontDesk, "frontdesk"),
    (KnownRole::StockManager, "inspector"),
];

#[derive(Debug, Clone)]
pub struct ServiceMount {
    pub role: KnownRole,
    pub path: String,
    pub scope: CookieScope,
}

/// With signed handoff each service keeps its own cookies, seeded by the
/// token. Without it the services share the login origin's store, as
/// same-origin pages share browser storage.
fn scope_for(state: &AppState, name: &str, path: &str) -> CookieScope {
    if state.config.handoff_secret.is_some() {
        CookieScope::service(name, path)
    } else {
        CookieScope::root()
    }
}

pub fn router(state: &AppState) -> Router<AppState> {
    let mut router = Router::new();

    for (role, name) in SERVICES {
        let path = format!("/app/{name}");
        let mount = ServiceMount {
            role,
            path: path.clone(),
            scope: scope_for(state, name, &path),
        };

        let handoff = state
            .config
            .routes
            .destination(role)
            .and_then(|audience| state.config.handoff_validator(audience))
            .map(|v| Arc::new(v) as Arc<dyn JwtValidator>);

        let guard = GuardLayerState {
            required: role,
            scope: mount.scope.clone(),
            login_url: state.login_url(),
            handoff,
        };

        let guarded = Router::new()
            .route("/", get(home))
            .route("/whoami", get(whoami))
            .layer(axum::middleware::from_fn_with_state(guard, guard_middleware));

        let open = Router::new()
            .route("/health", get(system::health))
            .route("/logout", get(logout));

        router = router.nest(&path, guarded.merge(open).layer(Extension(mount)));
    }

    router
}

pub async fn home(
    Extension(mount): Extension<ServiceMount>,
    Extension(ctx): Extension<IdentityContext>,
) -> Html<String> {
    let access = ctx.identity().role.known().map(granted).unwrap_or_default();
    Html(pages::service_home(
        ctx.service(),
        ctx.identity(),
        &access,
        &format!("{}/logout", mount.path),
    ))
}

pub async fn whoami(Extension(ctx): Extension<IdentityContext>) -> Json<WhoAmIResponse> {
    let role = ctx.identity().role.known();
    Json(WhoAmIResponse {
        service: ctx.service(),
        display_role: role.map(|r| r.display_name()),
        access: role.map(granted).unwrap_or_default(),
        identity: ctx.identity().clone(),
    })
}

/// Every role area `role` grants, in [`KnownRole::ALL`] order.
pub fn granted(role: KnownRole) -> Vec<KnownRole> {
    KnownRole::ALL.into_iter().filter(|r| role.grants(*r)).collect()
}

/// Ends the login session, not just this service's copy of it.
///
/// With a shared store the local logout already holds the login token and
/// revokes it. A separate store only holds the handoff token, so after the
/// local clear the browser is sent through the login origin's logout, which
/// clears and revokes the real session.
pub async fn logout(
    State(state): State<AppState>,
    Extension(mount): Extension<ServiceMount>,
    headers: HeaderMap,
) -> Response {
    let storage = Arc::new(CookieStorage::from_headers(&headers, mount.scope.clone()));
    let sessions = SessionManager::from_arc(storage.clone());
    let navigator = RecordingNavigator::new();

    let shared = mount.scope == CookieScope::root();
    let (target, revoker) = if shared {
        (state.login_url(), state.revoker.as_deref())
    } else {
        (state.config.login_origin.join(LOGOUT), None)
    };

    tracing::info!(service = %mount.role, shared, "service logout");
    let target = hotelgate_routing::logout(&sessions, &navigator, &target, revoker).await;

    let mut response = Redirect::to(&target).into_response();
    storage.apply(&mut response);
    response
}
