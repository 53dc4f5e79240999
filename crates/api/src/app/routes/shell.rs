use axum::{
    Router,
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};

use hotelgate_shell::ShellView;

use crate::app::services::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/shell", get(home))
        .route("/shell/", get(home))
        .route("/shell/*route", get(embed))
}

pub async fn home(State(state): State<AppState>) -> Html<String> {
    Html(state.shell.render(&ShellView::Home, "/"))
}

pub async fn embed(State(state): State<AppState>, Path(route): Path<String>) -> Response {
    let route = format!("/{}", route.trim_start_matches('/'));
    match state.shell.compose(&route) {
        ShellView::Redirect { to } => Redirect::to(&to).into_response(),
        view => Html(state.shell.render(&view, &route)).into_response(),
    }
}
