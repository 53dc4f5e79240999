use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use hotelgate_auth::LoginError;

pub fn login_error_to_response(err: &LoginError) -> axum::response::Response {
    let code = match err {
        LoginError::Rejected(_) => "login_rejected",
        LoginError::Incomplete => "incomplete_credentials",
        LoginError::Transport(_) => "login_unavailable",
        LoginError::Protocol(_) => "login_protocol_error",
        LoginError::Persist(_) => "session_store_error",
    };
    json_error(login_error_status(err), code, err.inline_message())
}

pub fn login_error_status(err: &LoginError) -> StatusCode {
    match err {
        LoginError::Rejected(_) => StatusCode::UNAUTHORIZED,
        LoginError::Incomplete => StatusCode::BAD_REQUEST,
        LoginError::Transport(_) | LoginError::Protocol(_) => StatusCode::BAD_GATEWAY,
        LoginError::Persist(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
