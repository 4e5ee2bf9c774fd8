use serde::{Deserialize, Deserializer, Serialize};

use userhub_core::Account;
use userhub_core::validate::{RegistrationInput, UpdateInput};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: Option<String>,
}

impl From<SignUpRequest> for RegistrationInput {
    fn from(body: SignUpRequest) -> Self {
        Self {
            name: body.name,
            email: body.email,
            password: body.password,
            role: body.role,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Partial update body. Keys that are absent stay `None`; an explicit
/// `null` becomes `Some(None)`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default, deserialize_with = "deserialize_some")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub role: Option<Option<String>>,
}

impl From<UpdateUserRequest> for UpdateInput {
    fn from(body: UpdateUserRequest) -> Self {
        Self {
            name: body.name,
            email: body.email,
            role: body.role,
        }
    }
}

fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub message: &'static str,
    pub user: Account,
}

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub message: &'static str,
    pub count: usize,
    pub users: Vec<Account>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_body_distinguishes_absent_from_null() {
        let body: UpdateUserRequest =
            serde_json::from_str(r#"{"name": null, "email": "a@example.com"}"#).unwrap();
        assert_eq!(body.name, Some(None));
        assert_eq!(body.email, Some(Some("a@example.com".to_string())));
        assert_eq!(body.role, None);
    }

    #[test]
    fn missing_sign_up_fields_default_to_empty() {
        let body: SignUpRequest = serde_json::from_str(r#"{"email": "a@example.com"}"#).unwrap();
        assert_eq!(body.name, "");
        assert_eq!(body.role, None);
    }
}
