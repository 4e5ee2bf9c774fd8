use userhub_auth::Identity;
use userhub_core::AccountError;

/// Identity attached to a request, if any.
///
/// Always present as a request extension once the attachment middleware has
/// run; `None` inside means the caller is anonymous.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestIdentity(Option<Identity>);

impl RequestIdentity {
    pub fn new(identity: Option<Identity>) -> Self {
        Self(identity)
    }

    pub fn anonymous() -> Self {
        Self(None)
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.0.as_ref()
    }

    /// The identity, or `Unauthenticated`.
    pub fn require(&self) -> Result<&Identity, AccountError> {
        self.0.as_ref().ok_or(AccountError::Unauthenticated)
    }
}
