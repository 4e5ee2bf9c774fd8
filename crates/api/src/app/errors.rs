use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use userhub_core::AccountError;

/// Map an account error onto its HTTP response.
///
/// Exhaustive on purpose: a new variant must pick a status here.
pub fn account_error_to_response(err: AccountError) -> axum::response::Response {
    let code = err.code();
    match err {
        AccountError::NotFound => json_error(StatusCode::NOT_FOUND, code, "User not found"),
        AccountError::AlreadyExists => json_error(StatusCode::CONFLICT, code, "Email already exists"),
        AccountError::InvalidCredentials => {
            json_error(StatusCode::UNAUTHORIZED, code, "Invalid email or password")
        }
        AccountError::Unauthenticated => {
            json_error(StatusCode::UNAUTHORIZED, code, "Authentication required")
        }
        AccountError::TokenInvalid | AccountError::TokenExpired => {
            json_error(StatusCode::UNAUTHORIZED, code, err.to_string())
        }
        AccountError::NotOwner => json_error(
            StatusCode::FORBIDDEN,
            code,
            "You can only modify your own user account",
        ),
        AccountError::PrivilegeEscalation => {
            json_error(StatusCode::FORBIDDEN, code, "Only admin users can change roles")
        }
        AccountError::ValidationFailed(fields) => (
            StatusCode::BAD_REQUEST,
            axum::Json(json!({
                "error": code,
                "message": "Validation failed",
                "details": fields,
            })),
        )
            .into_response(),
        AccountError::HashingError(msg) | AccountError::Storage(msg) => {
            tracing::error!(error = code, %msg, "account operation failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, code, "Internal server error")
        }
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
