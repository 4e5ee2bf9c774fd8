//! Account identifiers.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::AccountError;

/// Identifier of an account: a store-assigned positive integer.
///
/// Zero and negative values are unrepresentable.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct AccountId(i64);

impl AccountId {
    pub fn new(value: i64) -> Result<Self, AccountError> {
        if value > 0 {
            Ok(Self(value))
        } else {
            Err(AccountError::validation("id", "ID must be a positive integer"))
        }
    }

    pub fn get(&self) -> i64 {
        self.0
    }
}

impl core::fmt::Display for AccountId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl TryFrom<i64> for AccountId {
    type Error = AccountError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AccountId> for i64 {
    fn from(value: AccountId) -> Self {
        value.0
    }
}

/// Parses path segments such as `"42"`.
///
/// Only ASCII digits are accepted, so `"+1"`, `" 1"` and `"1.0"` are rejected
/// along with `"0"` and values that overflow `i64`.
impl FromStr for AccountId {
    type Err = AccountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AccountError::validation("id", "ID must be a positive integer");

        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let value: i64 = s.parse().map_err(|_| invalid())?;
        Self::new(value).map_err(|_| invalid())
    }
}
