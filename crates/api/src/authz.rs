//! API-side authorization guard.
//!
//! Runs the pure access policy for the current request and logs refusals;
//! handlers call this after input validation and before touching the
//! directory.

use userhub_auth::{AccountOperation, authorize, authorize_registration};
use userhub_core::{AccountError, AccountId, Role};

use crate::context::RequestIdentity;

pub fn authorize_account_operation(
    identity: &RequestIdentity,
    target: AccountId,
    operation: AccountOperation<'_>,
) -> Result<(), AccountError> {
    let decision = authorize(identity.identity(), target, operation);
    if !decision.allow {
        tracing::warn!(
            actor_id = identity.identity().map(|i| i.id.get()),
            target_id = target.get(),
            operation = operation.name(),
            reason = ?decision.reason,
            "account operation forbidden"
        );
    }
    decision.into_result()
}

pub fn authorize_new_account(identity: &RequestIdentity, role: Role) -> Result<(), AccountError> {
    let decision = authorize_registration(identity.identity(), role);
    if !decision.allow {
        tracing::warn!(
            actor_id = identity.identity().map(|i| i.id.get()),
            role = role.as_str(),
            "registration with elevated role forbidden"
        );
    }
    decision.into_result()
}
