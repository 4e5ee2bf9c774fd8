use serde::{Deserialize, Serialize};

use userhub_core::{Account, AccountId, Role};

/// Identity of an authenticated caller.
///
/// Rebuilt from a verified token on every request and never persisted. It is
/// not re-checked against the directory, so a role change or deletion only
/// takes effect once previously issued tokens expire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: AccountId,
    pub email: String,
    pub role: Role,
}

impl Identity {
    pub fn new(id: AccountId, email: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            email: email.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    pub fn is_self(&self, target: AccountId) -> bool {
        self.id == target
    }
}

impl From<&Account> for Identity {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            email: account.email.clone(),
            role: account.role,
        }
    }
}
