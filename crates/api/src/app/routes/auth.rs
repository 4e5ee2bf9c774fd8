use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};

use userhub_auth::attach::TOKEN_COOKIE;

use crate::app::services::{AppServices, SignedIn};
use crate::app::{dto, errors};
use crate::context::RequestIdentity;

pub async fn sign_up(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<RequestIdentity>,
    body: Result<Json<dto::SignUpRequest>, JsonRejection>,
) -> Response {
    let body = match body {
        Ok(Json(body)) => body,
        Err(rejection) => return invalid_body(rejection),
    };

    match services.accounts.register(&identity, body.into()).await {
        Ok(signed) => signed_in_response(&services, StatusCode::CREATED, "User registered successfully", signed),
        Err(e) => errors::account_error_to_response(e),
    }
}

pub async fn sign_in(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::SignInRequest>, JsonRejection>,
) -> Response {
    let body = match body {
        Ok(Json(body)) => body,
        Err(rejection) => return invalid_body(rejection),
    };

    match services.accounts.authenticate(&body.email, &body.password).await {
        Ok(signed) => signed_in_response(&services, StatusCode::OK, "User signed in successfully", signed),
        Err(e) => errors::account_error_to_response(e),
    }
}

/// Clear the token cookie. The token itself stays valid until it expires.
pub async fn sign_out(Extension(services): Extension<Arc<AppServices>>) -> Response {
    let mut response = (
        StatusCode::OK,
        Json(dto::MessageResponse {
            message: "User signed out successfully",
        }),
    )
        .into_response();
    set_cookie(&mut response, token_cookie("", 0, services.secure_cookies));
    response
}

fn signed_in_response(
    services: &AppServices,
    status: StatusCode,
    message: &'static str,
    signed: SignedIn,
) -> Response {
    let max_age = services.tokens.ttl().num_seconds();
    let cookie = token_cookie(&signed.token, max_age, services.secure_cookies);

    let mut response = (
        status,
        Json(dto::UserResponse {
            message,
            user: signed.account,
        }),
    )
        .into_response();
    set_cookie(&mut response, cookie);
    response
}

/// `Set-Cookie` value for the identity token.
pub fn token_cookie(token: &str, max_age_secs: i64, secure: bool) -> String {
    let mut cookie =
        format!("{TOKEN_COOKIE}={token}; HttpOnly; SameSite=Strict; Path=/; Max-Age={max_age_secs}");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

fn set_cookie(response: &mut Response, cookie: String) {
    match HeaderValue::from_str(&cookie) {
        Ok(value) => {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
        Err(e) => tracing::error!(error = %e, "token cookie is not a valid header value"),
    }
}

pub(crate) fn invalid_body(rejection: JsonRejection) -> Response {
    tracing::warn!(error = %rejection.body_text(), "rejected request body");
    errors::json_error(StatusCode::BAD_REQUEST, "invalid_body", rejection.body_text())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_attributes() {
        assert_eq!(
            token_cookie("abc", 3600, false),
            "token=abc; HttpOnly; SameSite=Strict; Path=/; Max-Age=3600"
        );
        assert!(token_cookie("", 0, true).ends_with("Max-Age=0; Secure"));
    }
}
