//! Process configuration, read once from the environment at startup.

use std::collections::HashMap;
use std::net::SocketAddr;

use chrono::Duration;
use thiserror::Error;

use userhub_auth::{HashingParams, SigningSecret};
use userhub_observability::LogFormat;

const DEV_JWT_SECRET: &str = "dev-secret";

/// Upper bound for `TOKEN_TTL_SECS` (30 days).
pub const MAX_TOKEN_TTL_SECS: i64 = 30 * 24 * 60 * 60;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} is required when APP_ENV=production")]
    Missing { var: &'static str },

    #[error("invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

/// Seed admin created at startup when missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapAdmin {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub environment: Environment,
    pub log_format: LogFormat,
    pub signing_secret: SigningSecret,
    /// `JWT_SECRET` was unset and the insecure development default is in use.
    pub dev_secret: bool,
    pub token_ttl: Duration,
    pub database_url: Option<String>,
    pub hashing: HashingParams,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars())
    }

    /// Build from explicit key/value pairs. Empty values count as unset.
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .filter(|(_, v)| !v.trim().is_empty())
            .collect();
        let get = |key: &str| vars.get(key).map(|v| v.trim().to_string());

        let environment = match get("APP_ENV").as_deref() {
            None | Some("development") | Some("dev") | Some("test") => Environment::Development,
            Some("production") | Some("prod") => Environment::Production,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: "APP_ENV",
                    reason: format!("unknown environment '{other}'"),
                });
            }
        };

        let bind_addr = match get("BIND_ADDR") {
            None => SocketAddr::from(([0, 0, 0, 0], 8080)),
            Some(raw) => raw.parse().map_err(|e| ConfigError::Invalid {
                var: "BIND_ADDR",
                reason: format!("{e}"),
            })?,
        };

        let log_format = match (environment, get("LOG_FORMAT")) {
            (Environment::Production, _) | (_, None) => LogFormat::Json,
            (_, Some(raw)) => raw.parse().map_err(|reason| ConfigError::Invalid {
                var: "LOG_FORMAT",
                reason,
            })?,
        };

        let dev_secret = get("JWT_SECRET").is_none();
        let signing_secret = match (get("JWT_SECRET"), environment) {
            (Some(secret), Environment::Production) => {
                SigningSecret::new(secret).map_err(|e| ConfigError::Invalid {
                    var: "JWT_SECRET",
                    reason: e.to_string(),
                })?
            }
            (Some(secret), Environment::Development) => SigningSecret::insecure(secret),
            (None, Environment::Production) => {
                return Err(ConfigError::Missing { var: "JWT_SECRET" });
            }
            (None, Environment::Development) => SigningSecret::insecure(DEV_JWT_SECRET),
        };

        let ttl_secs = parse_number::<i64>(&get, "TOKEN_TTL_SECS")?.unwrap_or(3600);
        let token_ttl = match ttl_secs {
            1..=MAX_TOKEN_TTL_SECS => Duration::try_seconds(ttl_secs),
            _ => None,
        }
        .ok_or_else(|| ConfigError::Invalid {
            var: "TOKEN_TTL_SECS",
            reason: format!("must be between 1 and {MAX_TOKEN_TTL_SECS}"),
        })?;

        let defaults = HashingParams::default();
        let hashing = HashingParams {
            memory_kib: parse_number(&get, "ARGON2_MEMORY_KIB")?.unwrap_or(defaults.memory_kib),
            iterations: parse_number(&get, "ARGON2_ITERATIONS")?.unwrap_or(defaults.iterations),
            parallelism: parse_number(&get, "ARGON2_PARALLELISM")?.unwrap_or(defaults.parallelism),
        };

        let bootstrap_admin = match (get("BOOTSTRAP_ADMIN_EMAIL"), get("BOOTSTRAP_ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(BootstrapAdmin {
                name: get("BOOTSTRAP_ADMIN_NAME").unwrap_or_else(|| "Administrator".to_string()),
                email,
                password,
            }),
            (None, None) => None,
            (Some(_), None) => {
                return Err(ConfigError::Invalid {
                    var: "BOOTSTRAP_ADMIN_PASSWORD",
                    reason: "must be set together with BOOTSTRAP_ADMIN_EMAIL".to_string(),
                });
            }
            (None, Some(_)) => {
                return Err(ConfigError::Invalid {
                    var: "BOOTSTRAP_ADMIN_EMAIL",
                    reason: "must be set together with BOOTSTRAP_ADMIN_PASSWORD".to_string(),
                });
            }
        };

        Ok(Self {
            bind_addr,
            environment,
            log_format,
            signing_secret,
            dev_secret,
            token_ttl,
            database_url: get("DATABASE_URL"),
            hashing,
            bootstrap_admin,
        })
    }

    /// Configuration for tests: in-memory store, cheap hashing, fixed secret.
    pub fn for_tests(secret: &str) -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            environment: Environment::Development,
            log_format: LogFormat::Pretty,
            signing_secret: SigningSecret::insecure(secret),
            dev_secret: false,
            token_ttl: Duration::hours(1),
            database_url: None,
            hashing: HashingParams {
                memory_kib: 8,
                iterations: 1,
                parallelism: 1,
            },
            bootstrap_admin: None,
        }
    }
}

fn parse_number<T>(
    get: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: core::str::FromStr,
    T::Err: core::fmt::Display,
{
    get(var)
        .map(|raw| {
            raw.parse::<T>().map_err(|e| ConfigError::Invalid {
                var,
                reason: e.to_string(),
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_apply_in_development() {
        let config = ApiConfig::from_vars(vars(&[])).unwrap();
        assert_eq!(config.bind_addr.to_string(), "0.0.0.0:8080");
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.token_ttl, Duration::hours(1));
        assert_eq!(config.database_url, None);
        assert_eq!(config.hashing, HashingParams::default());
        assert_eq!(config.bootstrap_admin, None);
        assert!(config.dev_secret);
    }

    #[test]
    fn production_requires_a_strong_secret() {
        assert_eq!(
            ApiConfig::from_vars(vars(&[("APP_ENV", "production")])).unwrap_err(),
            ConfigError::Missing { var: "JWT_SECRET" }
        );
        assert!(matches!(
            ApiConfig::from_vars(vars(&[("APP_ENV", "production"), ("JWT_SECRET", "short")])),
            Err(ConfigError::Invalid { var: "JWT_SECRET", .. })
        ));

        let config = ApiConfig::from_vars(vars(&[
            ("APP_ENV", "production"),
            ("JWT_SECRET", "0123456789abcdef0123456789abcdef"),
            ("LOG_FORMAT", "pretty"),
        ]))
        .unwrap();
        assert!(config.environment.is_production());
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn parses_overrides() {
        let config = ApiConfig::from_vars(vars(&[
            ("BIND_ADDR", "127.0.0.1:3000"),
            ("TOKEN_TTL_SECS", "60"),
            ("LOG_FORMAT", "pretty"),
            ("ARGON2_ITERATIONS", "3"),
            ("DATABASE_URL", "postgres://localhost/users"),
            ("BOOTSTRAP_ADMIN_EMAIL", "root@example.com"),
            ("BOOTSTRAP_ADMIN_PASSWORD", "changeme"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.token_ttl, Duration::seconds(60));
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.hashing.iterations, 3);
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/users"));
        assert_eq!(
            config.bootstrap_admin.unwrap().name,
            "Administrator".to_string()
        );
    }

    #[test]
    fn token_ttl_is_capped() {
        let max = MAX_TOKEN_TTL_SECS.to_string();
        let config = ApiConfig::from_vars(vars(&[("TOKEN_TTL_SECS", &max)])).unwrap();
        assert_eq!(config.token_ttl, Duration::days(30));

        let over = (MAX_TOKEN_TTL_SECS + 1).to_string();
        assert!(matches!(
            ApiConfig::from_vars(vars(&[("TOKEN_TTL_SECS", &over)])),
            Err(ConfigError::Invalid { var: "TOKEN_TTL_SECS", .. })
        ));
    }

    #[test]
    fn rejects_malformed_values() {
        for (var, value) in [
            ("BIND_ADDR", "nowhere"),
            ("TOKEN_TTL_SECS", "-5"),
            ("TOKEN_TTL_SECS", "soon"),
            ("TOKEN_TTL_SECS", "0"),
            ("TOKEN_TTL_SECS", "9000000000000"),
            ("TOKEN_TTL_SECS", "9223372036854775807"),
            ("ARGON2_MEMORY_KIB", "lots"),
            ("LOG_FORMAT", "xml"),
            ("APP_ENV", "staging"),
            ("BOOTSTRAP_ADMIN_EMAIL", "root@example.com"),
        ] {
            let err = ApiConfig::from_vars(vars(&[(var, value)])).unwrap_err();
            assert!(
                matches!(err, ConfigError::Invalid { .. }),
                "{var}={value} should be invalid, got {err:?}"
            );
        }
    }
}
