use axum::{Router, routing::post};

pub mod auth;
pub mod system;
pub mod users;

/// Router for everything under `/api`.
pub fn router() -> Router {
    Router::new()
        .route("/auth/sign-up", post(auth::sign_up))
        .route("/auth/sign-in", post(auth::sign_in))
        .route("/auth/sign-out", post(auth::sign_out))
        .nest("/users", users::router())
}
