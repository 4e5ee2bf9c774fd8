use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};

use userhub_core::AccountError;

use crate::app::routes::auth::invalid_body;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::RequestIdentity;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_users))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
}

pub async fn list_users(Extension(services): Extension<Arc<AppServices>>) -> Response {
    match services.accounts.list().await {
        Ok(users) => (
            StatusCode::OK,
            Json(dto::UsersResponse {
                message: "Successfully retrieved users.",
                count: users.len(),
                users,
            }),
        )
            .into_response(),
        Err(e) => errors::account_error_to_response(e),
    }
}

pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Response {
    match services.accounts.get(&id).await {
        Ok(user) => user_response("Successfully retrieved user.", user),
        Err(e) => errors::account_error_to_response(e),
    }
}

pub async fn update_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<RequestIdentity>,
    Path(id): Path<String>,
    body: Result<Json<dto::UpdateUserRequest>, JsonRejection>,
) -> Response {
    let body = match body {
        Ok(Json(body)) => body,
        Err(rejection) => return invalid_body(rejection),
    };

    match services.accounts.update(&identity, &id, body.into()).await {
        Ok(user) => user_response("User updated successfully.", user),
        Err(AccountError::NotOwner) => errors::json_error(
            StatusCode::FORBIDDEN,
            AccountError::NotOwner.code(),
            "You can only update your own user account",
        ),
        Err(e) => errors::account_error_to_response(e),
    }
}

pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<RequestIdentity>,
    Path(id): Path<String>,
) -> Response {
    match services.accounts.delete(&identity, &id).await {
        Ok(_) => (
            StatusCode::OK,
            Json(dto::MessageResponse {
                message: "User deleted successfully.",
            }),
        )
            .into_response(),
        Err(AccountError::NotOwner) => errors::json_error(
            StatusCode::FORBIDDEN,
            AccountError::NotOwner.code(),
            "You can only delete your own user account",
        ),
        Err(e) => errors::account_error_to_response(e),
    }
}

fn user_response(message: &'static str, user: userhub_core::Account) -> Response {
    (StatusCode::OK, Json(dto::UserResponse { message, user })).into_response()
}
