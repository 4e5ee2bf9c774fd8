use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use userhub_auth::{TokenSource, TokenVerifier, resolve_identity};

use crate::context::RequestIdentity;

#[derive(Clone)]
pub struct AuthState {
    pub verifier: Arc<dyn TokenVerifier>,
}

/// Attach the caller's identity, if any, to the request.
///
/// Never rejects: a missing or bad token leaves the request anonymous. Bad
/// tokens are logged with the request path and method.
pub async fn attach_identity(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let attachment = {
        let headers = req.headers();
        let cookies = cookie_header(headers);
        let source = TokenSource::from_headers(
            cookies.as_deref(),
            header_str(headers, header::AUTHORIZATION),
        );
        resolve_identity(state.verifier.as_ref(), &source, Utc::now())
    };

    if let Some(diagnostic) = &attachment.diagnostic {
        tracing::warn!(
            path = %req.uri().path(),
            method = %req.method(),
            source = diagnostic.origin.as_str(),
            error = %diagnostic.error,
            "ignoring invalid token"
        );
    }

    req.extensions_mut()
        .insert(RequestIdentity::new(attachment.identity));

    next.run(req).await
}

fn header_str(headers: &HeaderMap, name: header::HeaderName) -> Option<&str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// All `Cookie` headers folded into one `a=1; b=2` string. HTTP/2 clients may
/// send one header per cookie.
fn cookie_header(headers: &HeaderMap) -> Option<String> {
    let values: Vec<&str> = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();
    (!values.is_empty()).then(|| values.join("; "))
}
