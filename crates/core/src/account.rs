//! Account model as seen outside the directory.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AccountError;
use crate::id::AccountId;

/// Access role of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for Role {
    type Err = AccountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            _ => Err(AccountError::validation(
                "role",
                "role must be one of: user, admin",
            )),
        }
    }
}

/// A sanitized account.
///
/// There is deliberately no password field: a value of this type can be
/// serialized anywhere without leaking credential material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Mutable account fields, used to describe a change set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountField {
    Name,
    Email,
    Role,
}

impl AccountField {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountField::Name => "name",
            AccountField::Email => "email",
            AccountField::Role => "role",
        }
    }
}

/// Partial update; `None` means "leave unchanged".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
}

impl AccountPatch {
    /// Fields this patch would change.
    pub fn fields(&self) -> Vec<AccountField> {
        let mut fields = Vec::with_capacity(3);
        if self.name.is_some() {
            fields.push(AccountField::Name);
        }
        if self.email.is_some() {
            fields.push(AccountField::Email);
        }
        if self.role.is_some() {
            fields.push(AccountField::Role);
        }
        fields
    }

    pub fn touches(&self, field: AccountField) -> bool {
        match field {
            AccountField::Name => self.name.is_some(),
            AccountField::Email => self.email.is_some(),
            AccountField::Role => self.role.is_some(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.role.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_lowercase_names() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!("user".parse::<Role>().unwrap(), Role::User);
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn patch_reports_touched_fields_in_order() {
        let patch = AccountPatch {
            name: Some("Jane".to_string()),
            email: None,
            role: Some(Role::Admin),
        };

        assert_eq!(patch.fields(), vec![AccountField::Name, AccountField::Role]);
        assert!(patch.touches(AccountField::Role));
        assert!(!patch.touches(AccountField::Email));
        assert!(AccountPatch::default().is_empty());
    }

    #[test]
    fn serialized_account_has_no_password_key() {
        let account = Account {
            id: AccountId::new(1).unwrap(),
            name: "John Doe".to_string(),
            email: "john@example.com".to_string(),
            role: Role::User,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&account).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        assert!(!keys.iter().any(|k| k.contains("password")));
    }
}
