//! Input validation for account requests.
//!
//! Raw inputs arrive exactly as the client sent them; the functions here trim,
//! normalize and bound every field and collect all failures into a single
//! [`AccountError::ValidationFailed`].

use crate::account::{AccountPatch, Role};
use crate::error::{AccountError, FieldError};

pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 255;
pub const EMAIL_MAX_CHARS: usize = 255;
pub const PASSWORD_MIN_CHARS: usize = 6;
pub const PASSWORD_MAX_CHARS: usize = 128;

/// A body field that may be absent, explicitly `null`, or carry a value.
///
/// `Option<Option<T>>` is what serde produces for this with
/// `deserialize_with`; the outer `None` means the key was not sent.
pub type NullableField<T> = Option<Option<T>>;

/// Update request as received.
#[derive(Debug, Clone, Default)]
pub struct UpdateInput {
    pub name: NullableField<String>,
    pub email: NullableField<String>,
    pub role: NullableField<String>,
}

/// Sign-up request as received.
#[derive(Debug, Clone, Default)]
pub struct RegistrationInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<String>,
}

/// Validated sign-up request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Validated sign-in request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

pub fn validate_name(raw: &str) -> Result<String, FieldError> {
    let name = raw.trim();
    let len = name.chars().count();
    if len < NAME_MIN_CHARS {
        return Err(FieldError::new(
            "name",
            format!("name must be at least {NAME_MIN_CHARS} characters"),
        ));
    }
    if len > NAME_MAX_CHARS {
        return Err(FieldError::new(
            "name",
            format!("name must be at most {NAME_MAX_CHARS} characters"),
        ));
    }
    Ok(name.to_string())
}

/// Trim, lower-case and check an email address.
pub fn normalize_email(raw: &str) -> Result<String, FieldError> {
    let email = raw.trim().to_lowercase();
    if email.chars().count() > EMAIL_MAX_CHARS {
        return Err(FieldError::new(
            "email",
            format!("email must be at most {EMAIL_MAX_CHARS} characters"),
        ));
    }
    if !is_valid_email(&email) {
        return Err(FieldError::new("email", "invalid email"));
    }
    Ok(email)
}

pub fn validate_password(raw: &str) -> Result<String, FieldError> {
    let len = raw.chars().count();
    if len < PASSWORD_MIN_CHARS {
        return Err(FieldError::new(
            "password",
            format!("password must be at least {PASSWORD_MIN_CHARS} characters"),
        ));
    }
    if len > PASSWORD_MAX_CHARS {
        return Err(FieldError::new(
            "password",
            format!("password must be at most {PASSWORD_MAX_CHARS} characters"),
        ));
    }
    Ok(raw.to_string())
}

pub fn validate_role(raw: &str) -> Result<Role, FieldError> {
    raw.parse::<Role>()
        .map_err(|_| FieldError::new("role", "role must be one of: user, admin"))
}

/// Validate a partial update. At least one field must be present.
pub fn validate_patch(input: UpdateInput) -> Result<AccountPatch, AccountError> {
    let mut errors = Vec::new();
    let mut patch = AccountPatch::default();

    match input.name {
        None => {}
        Some(None) => errors.push(FieldError::new("name", "name must not be null")),
        Some(Some(raw)) => match validate_name(&raw) {
            Ok(name) => patch.name = Some(name),
            Err(e) => errors.push(e),
        },
    }

    match input.email {
        None => {}
        Some(None) => errors.push(FieldError::new("email", "email must not be null")),
        Some(Some(raw)) => match normalize_email(&raw) {
            Ok(email) => patch.email = Some(email),
            Err(e) => errors.push(e),
        },
    }

    match input.role {
        None => {}
        Some(None) => errors.push(FieldError::new("role", "role must not be null")),
        Some(Some(raw)) => match validate_role(&raw) {
            Ok(role) => patch.role = Some(role),
            Err(e) => errors.push(e),
        },
    }

    if !errors.is_empty() {
        return Err(AccountError::ValidationFailed(errors));
    }
    if patch.is_empty() {
        return Err(AccountError::validation(
            "body",
            "at least one field must be provided to update",
        ));
    }
    Ok(patch)
}

pub fn validate_registration(input: RegistrationInput) -> Result<Registration, AccountError> {
    let name = validate_name(&input.name);
    let email = normalize_email(&input.email);
    let password = validate_password(&input.password);
    let role = match input.role.as_deref() {
        None => Ok(Role::User),
        Some(raw) => validate_role(raw),
    };

    match (name, email, password, role) {
        (Ok(name), Ok(email), Ok(password), Ok(role)) => Ok(Registration {
            name,
            email,
            password,
            role,
        }),
        (name, email, password, role) => Err(AccountError::ValidationFailed(
            [name.err(), email.err(), password.err(), role.err()]
                .into_iter()
                .flatten()
                .collect(),
        )),
    }
}

pub fn validate_credentials(email: &str, password: &str) -> Result<Credentials, AccountError> {
    let mut errors = Vec::new();
    let email = normalize_email(email).map_err(|e| errors.push(e)).ok();
    if password.is_empty() {
        errors.push(FieldError::new("password", "password is required"));
    }

    match email {
        Some(email) if errors.is_empty() => Ok(Credentials {
            email,
            password: password.to_string(),
        }),
        _ => Err(AccountError::ValidationFailed(errors)),
    }
}

/// Structural email check: one `@`, a dot-atom local part, and a domain of
/// at least two hostname labels ending in an alphabetic TLD.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if domain.contains('@') {
        return false;
    }

    const LOCAL_SPECIALS: &str = "!#$%&'*+/=?^_`{|}~-";
    let local_ok = !local.is_empty()
        && local.len() <= 64
        && !local.starts_with('.')
        && !local.ends_with('.')
        && !local.contains("..")
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || LOCAL_SPECIALS.contains(c));
    if !local_ok {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }
    let labels_ok = labels.iter().all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    });
    let tld = labels[labels.len() - 1];
    labels_ok && tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic())
}
