use serde::Serialize;

use userhub_core::{AccountError, AccountField, AccountId, AccountPatch, Role};

use crate::Identity;

/// A mutating account operation subject to the access policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountOperation<'a> {
    Update { patch: &'a AccountPatch },
    Delete,
}

impl AccountOperation<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            AccountOperation::Update { .. } => "update",
            AccountOperation::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionReason {
    /// Actor is acting on their own account.
    Owner,
    /// Actor is an administrator.
    Admin,
    Unauthenticated,
    NotOwner,
    /// A non-admin tried to change a role, including their own.
    PrivilegeEscalation,
}

/// Transient policy outcome; computed per request and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AuthorizationDecision {
    pub allow: bool,
    pub reason: DecisionReason,
}

impl AuthorizationDecision {
    pub fn allow(reason: DecisionReason) -> Self {
        Self {
            allow: true,
            reason,
        }
    }

    pub fn forbid(reason: DecisionReason) -> Self {
        Self {
            allow: false,
            reason,
        }
    }

    pub fn into_result(self) -> Result<(), AccountError> {
        if self.allow {
            return Ok(());
        }
        Err(match self.reason {
            DecisionReason::Unauthenticated => AccountError::Unauthenticated,
            DecisionReason::PrivilegeEscalation => AccountError::PrivilegeEscalation,
            DecisionReason::NotOwner | DecisionReason::Owner | DecisionReason::Admin => {
                AccountError::NotOwner
            }
        })
    }
}

/// Decide whether `actor` may perform `operation` on account `target`.
///
/// - No IO
/// - No panics
///
/// Ownership is checked before the role field: a non-admin acting on another
/// account is refused as `NotOwner` even when the change set also names `role`.
pub fn authorize(
    actor: Option<&Identity>,
    target: AccountId,
    operation: AccountOperation<'_>,
) -> AuthorizationDecision {
    let Some(actor) = actor else {
        return AuthorizationDecision::forbid(DecisionReason::Unauthenticated);
    };

    if actor.is_admin() {
        return AuthorizationDecision::allow(DecisionReason::Admin);
    }
    if !actor.is_self(target) {
        return AuthorizationDecision::forbid(DecisionReason::NotOwner);
    }

    match operation {
        AccountOperation::Update { patch } if patch.touches(AccountField::Role) => {
            AuthorizationDecision::forbid(DecisionReason::PrivilegeEscalation)
        }
        _ => AuthorizationDecision::allow(DecisionReason::Owner),
    }
}

/// Decide whether a new account may be created with `role`.
///
/// Anyone may self-register as a plain user; only an admin may create admins.
pub fn authorize_registration(actor: Option<&Identity>, role: Role) -> AuthorizationDecision {
    match (role, actor) {
        (Role::User, Some(actor)) if actor.is_admin() => {
            AuthorizationDecision::allow(DecisionReason::Admin)
        }
        (Role::User, _) => AuthorizationDecision::allow(DecisionReason::Owner),
        (Role::Admin, Some(actor)) if actor.is_admin() => {
            AuthorizationDecision::allow(DecisionReason::Admin)
        }
        (Role::Admin, _) => AuthorizationDecision::forbid(DecisionReason::PrivilegeEscalation),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn id(v: i64) -> AccountId {
        AccountId::new(v).unwrap()
    }

    fn actor(v: i64, role: Role) -> Identity {
        Identity::new(id(v), format!("u{v}@example.com"), role)
    }

    fn name_patch() -> AccountPatch {
        AccountPatch {
            name: Some("x".to_string()),
            ..AccountPatch::default()
        }
    }

    fn role_patch(role: Role) -> AccountPatch {
        AccountPatch {
            role: Some(role),
            ..AccountPatch::default()
        }
    }

    #[test]
    fn anonymous_is_unauthenticated_for_every_operation() {
        let patch = name_patch();
        for op in [AccountOperation::Update { patch: &patch }, AccountOperation::Delete] {
            let decision = authorize(None, id(1), op);
            assert_eq!(decision, AuthorizationDecision::forbid(DecisionReason::Unauthenticated));
            assert_eq!(decision.into_result(), Err(AccountError::Unauthenticated));
        }
    }

    #[test]
    fn user_may_update_own_profile_without_role() {
        let patch = name_patch();
        let decision = authorize(
            Some(&actor(1, Role::User)),
            id(1),
            AccountOperation::Update { patch: &patch },
        );
        assert_eq!(decision, AuthorizationDecision::allow(DecisionReason::Owner));
        assert_eq!(decision.into_result(), Ok(()));
    }

    #[test]
    fn user_may_not_touch_another_account() {
        let patch = name_patch();
        let user = actor(1, Role::User);
        assert_eq!(
            authorize(Some(&user), id(2), AccountOperation::Update { patch: &patch }),
            AuthorizationDecision::forbid(DecisionReason::NotOwner)
        );
        assert_eq!(
            authorize(Some(&user), id(2), AccountOperation::Delete).into_result(),
            Err(AccountError::NotOwner)
        );
    }

    #[test]
    fn user_may_not_change_own_role_even_to_same_value() {
        let patch = role_patch(Role::User);
        let decision = authorize(
            Some(&actor(1, Role::User)),
            id(1),
            AccountOperation::Update { patch: &patch },
        );
        assert_eq!(decision.into_result(), Err(AccountError::PrivilegeEscalation));
    }

    #[test]
    fn ownership_is_checked_before_role_field() {
        let patch = role_patch(Role::Admin);
        let decision = authorize(
            Some(&actor(1, Role::User)),
            id(2),
            AccountOperation::Update { patch: &patch },
        );
        assert_eq!(decision.reason, DecisionReason::NotOwner);
    }

    #[test]
    fn user_may_delete_self() {
        assert!(authorize(Some(&actor(5, Role::User)), id(5), AccountOperation::Delete).allow);
    }

    #[test]
    fn admin_may_promote_another_account() {
        let patch = role_patch(Role::Admin);
        let decision = authorize(
            Some(&actor(1, Role::Admin)),
            id(2),
            AccountOperation::Update { patch: &patch },
        );
        assert_eq!(decision, AuthorizationDecision::allow(DecisionReason::Admin));
    }

    #[test]
    fn registration_of_admins_requires_an_admin() {
        assert!(authorize_registration(None, Role::User).allow);
        assert!(authorize_registration(Some(&actor(1, Role::User)), Role::User).allow);
        assert_eq!(
            authorize_registration(None, Role::Admin).into_result(),
            Err(AccountError::PrivilegeEscalation)
        );
        assert_eq!(
            authorize_registration(Some(&actor(1, Role::User)), Role::Admin).into_result(),
            Err(AccountError::PrivilegeEscalation)
        );
        assert!(authorize_registration(Some(&actor(1, Role::Admin)), Role::Admin).allow);
    }

    fn any_patch() -> impl Strategy<Value = AccountPatch> {
        (
            proptest::option::of("[a-z]{2,12}"),
            proptest::option::of("[a-z]{1,8}@example\\.com"),
            proptest::option::of(prop_oneof![Just(Role::User), Just(Role::Admin)]),
        )
            .prop_map(|(name, email, role)| AccountPatch { name, email, role })
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: an admin is allowed every operation on every account.
        #[test]
        fn admin_is_always_allowed(actor_id in 1i64..1000, target in 1i64..1000, patch in any_patch(), delete in any::<bool>()) {
            let admin = actor(actor_id, Role::Admin);
            let op = if delete { AccountOperation::Delete } else { AccountOperation::Update { patch: &patch } };
            prop_assert!(authorize(Some(&admin), id(target), op).allow);
        }

        /// Property: a non-admin acting on another id is refused for
        /// ownership regardless of the fields named.
        #[test]
        fn non_admin_on_other_id_is_not_owner(actor_id in 1i64..1000, offset in 1i64..1000, patch in any_patch(), delete in any::<bool>()) {
            let user = actor(actor_id, Role::User);
            let op = if delete { AccountOperation::Delete } else { AccountOperation::Update { patch: &patch } };
            let decision = authorize(Some(&user), id(actor_id + offset), op);
            prop_assert_eq!(decision, AuthorizationDecision::forbid(DecisionReason::NotOwner));
        }

        /// Property: on their own id, a non-admin is allowed exactly when the
        /// change set leaves `role` alone.
        #[test]
        fn non_admin_on_self_depends_only_on_role_field(actor_id in 1i64..1000, patch in any_patch()) {
            let user = actor(actor_id, Role::User);
            let decision = authorize(Some(&user), id(actor_id), AccountOperation::Update { patch: &patch });
            prop_assert_eq!(decision.allow, patch.role.is_none());
        }
    }
}
