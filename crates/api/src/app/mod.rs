//! HTTP application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store/hasher/token wiring and account orchestration
//! - `routes/`: HTTP handlers, one file per area
//! - `dto.rs`: request/response bodies
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs` and tests).
pub fn build_app(services: Arc<services::AppServices>) -> Router {
    let auth_state = middleware::AuthState {
        verifier: services.tokens.clone(),
    };

    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/api", routes::router())
        .layer(
            ServiceBuilder::new()
                .layer(Extension(services))
                .layer(axum::middleware::from_fn_with_state(
                    auth_state,
                    middleware::attach_identity,
                )),
        )
}
