//! Best-effort identity attachment.
//!
//! Resolution never fails: a missing token yields no identity, and a bad
//! token yields no identity plus a diagnostic for the caller to log. Whether
//! an identity is *required* is decided downstream.

use chrono::{DateTime, Utc};

use crate::{Identity, TokenError, TokenVerifier};

/// Name of the cookie carrying the identity token.
pub const TOKEN_COOKIE: &str = "token";

const BEARER_PREFIX: &str = "Bearer ";

/// Where a token was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenOrigin {
    Cookie,
    Bearer,
}

impl TokenOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenOrigin::Cookie => "cookie",
            TokenOrigin::Bearer => "bearer",
        }
    }
}

/// Candidate tokens extracted from a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenSource<'a> {
    pub cookie: Option<&'a str>,
    pub bearer: Option<&'a str>,
}

impl<'a> TokenSource<'a> {
    /// Build from raw `Cookie` and `Authorization` header values.
    pub fn from_headers(cookie_header: Option<&'a str>, authorization: Option<&'a str>) -> Self {
        Self {
            cookie: cookie_header.and_then(|h| cookie_value(h, TOKEN_COOKIE)),
            bearer: authorization.and_then(bearer_token),
        }
    }

    /// The token to verify. The cookie wins when both are present.
    pub fn token(&self) -> Option<(TokenOrigin, &'a str)> {
        self.cookie
            .map(|t| (TokenOrigin::Cookie, t))
            .or_else(|| self.bearer.map(|t| (TokenOrigin::Bearer, t)))
    }
}

/// Why a presented token was ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachDiagnostic {
    pub origin: TokenOrigin,
    pub error: TokenError,
}

/// Outcome of identity resolution for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attachment {
    pub identity: Option<Identity>,
    pub diagnostic: Option<AttachDiagnostic>,
}

pub fn resolve_identity(
    verifier: &dyn TokenVerifier,
    source: &TokenSource<'_>,
    now: DateTime<Utc>,
) -> Attachment {
    let Some((origin, token)) = source.token() else {
        return Attachment::default();
    };

    match verifier.verify_at(token, now) {
        Ok(identity) => Attachment {
            identity: Some(identity),
            diagnostic: None,
        },
        Err(error) => Attachment {
            identity: None,
            diagnostic: Some(AttachDiagnostic { origin, error }),
        },
    }
}

/// Value of cookie `name` from a `Cookie` header (`a=1; token=xyz`).
///
/// Empty values are treated as absent.
pub fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| k.trim() == name)
        .map(|(_, v)| v.trim().trim_matches('"'))
        .filter(|v| !v.is_empty())
}

fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SigningSecret, TokenService};
    use chrono::Duration;
    use userhub_core::{AccountId, Role};

    fn service() -> TokenService {
        TokenService::new(
            &SigningSecret::insecure("attach-test-secret"),
            Duration::minutes(15),
        )
    }

    fn identity(id: i64) -> Identity {
        Identity::new(AccountId::new(id).unwrap(), format!("u{id}@example.com"), Role::User)
    }

    #[test]
    fn parses_cookie_and_bearer() {
        let source = TokenSource::from_headers(
            Some("theme=dark; token=abc.def.ghi; other=1"),
            Some("Bearer  xyz "),
        );
        assert_eq!(source.cookie, Some("abc.def.ghi"));
        assert_eq!(source.bearer, Some("xyz"));
    }

    #[test]
    fn ignores_non_bearer_and_empty_values() {
        let source = TokenSource::from_headers(Some("token=; tokens=nope"), Some("Basic Zm9vOmJhcg=="));
        assert_eq!(source, TokenSource::default());
        assert_eq!(TokenSource::from_headers(None, Some("Bearer ")).bearer, None);
    }

    #[test]
    fn attaches_identity_from_cookie() {
        let svc = service();
        let token = svc.issue(&identity(1)).unwrap();
        let header = format!("token={token}");

        let attachment =
            resolve_identity(&svc, &TokenSource::from_headers(Some(&header), None), Utc::now());
        assert_eq!(attachment.identity, Some(identity(1)));
        assert_eq!(attachment.diagnostic, None);
    }

    #[test]
    fn attaches_identity_from_bearer_header() {
        let svc = service();
        let token = svc.issue(&identity(2)).unwrap();
        let header = format!("Bearer {token}");

        let attachment =
            resolve_identity(&svc, &TokenSource::from_headers(None, Some(&header)), Utc::now());
        assert_eq!(attachment.identity, Some(identity(2)));
    }

    #[test]
    fn cookie_wins_over_bearer() {
        let svc = service();
        let cookie = format!("token={}", svc.issue(&identity(1)).unwrap());
        let bearer = format!("Bearer {}", svc.issue(&identity(2)).unwrap());

        let attachment = resolve_identity(
            &svc,
            &TokenSource::from_headers(Some(&cookie), Some(&bearer)),
            Utc::now(),
        );
        assert_eq!(attachment.identity, Some(identity(1)));
    }

    #[test]
    fn invalid_cookie_does_not_fall_back_to_bearer() {
        let svc = service();
        let bearer = format!("Bearer {}", svc.issue(&identity(2)).unwrap());

        let attachment = resolve_identity(
            &svc,
            &TokenSource::from_headers(Some("token=garbage"), Some(&bearer)),
            Utc::now(),
        );
        assert_eq!(attachment.identity, None);
        assert_eq!(attachment.diagnostic.unwrap().origin, TokenOrigin::Cookie);
    }

    #[test]
    fn no_token_is_silently_unauthenticated() {
        let attachment = resolve_identity(&service(), &TokenSource::default(), Utc::now());
        assert_eq!(attachment, Attachment::default());
    }

    #[test]
    fn expired_token_yields_diagnostic_only() {
        let svc = service();
        let token = svc
            .issue_at(&identity(3), Utc::now() - Duration::hours(1))
            .unwrap();
        let header = format!("Bearer {token}");

        let attachment =
            resolve_identity(&svc, &TokenSource::from_headers(None, Some(&header)), Utc::now());
        assert_eq!(attachment.identity, None);
        let diagnostic = attachment.diagnostic.unwrap();
        assert_eq!(diagnostic.origin, TokenOrigin::Bearer);
        assert_eq!(diagnostic.error, TokenError::Expired);
    }
}
