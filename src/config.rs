//! Server configuration module.
//!
//! Parses configuration from environment variables.
//!
//! # Environment Variables
//!
//! | Variable | Required | Default | Description |
//! |----------|----------|---------|-------------|
//! | `PRESSROOM_JWT_SECRET` | Yes | - | HS256 secret used to verify tokens |
//! | `PRESSROOM_USERS` | No | empty | Seed users, `id:name:email:role` pairs comma-separated |
//! | `PORT` | No | 8080 | HTTP server port |
//!
//! User provisioning proper belongs to the identity system; `PRESSROOM_USERS`
//! only seeds the in-memory identity store so the server is usable on its
//! own.

use std::env;

use thiserror::Error;
use uuid::Uuid;

use crate::types::{Role, User};

/// Default HTTP server port.
const DEFAULT_PORT: u16 = 8080;

/// Errors that can occur when parsing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// Environment variable has invalid format.
    #[error("invalid format for {var}: {message}")]
    InvalidFormat { var: String, message: String },

    /// Port number is invalid.
    #[error("invalid port number: {0}")]
    InvalidPort(#[from] std::num::ParseIntError),
}

/// Server configuration parsed from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// HS256 secret used to verify request tokens.
    pub jwt_secret: String,

    /// HTTP server port.
    pub port: u16,

    /// Users seeded into the identity store at startup.
    pub users: Vec<User>,
}

impl Config {
    /// Parse configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `PRESSROOM_JWT_SECRET` is missing or empty,
    /// the port is not a valid u16, or `PRESSROOM_USERS` is malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let jwt_secret = match env::var("PRESSROOM_JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ => {
                return Err(ConfigError::MissingEnvVar(
                    "PRESSROOM_JWT_SECRET".to_string(),
                ))
            }
        };

        Ok(Self {
            jwt_secret,
            port: parse_port()?,
            users: parse_users()?,
        })
    }
}

/// Parse the PORT environment variable, defaulting when unset.
fn parse_port() -> Result<u16, ConfigError> {
    match env::var("PORT") {
        Ok(port_str) => Ok(port_str.parse()?),
        Err(env::VarError::NotPresent) => Ok(DEFAULT_PORT),
        Err(env::VarError::NotUnicode(_)) => Err(ConfigError::InvalidFormat {
            var: "PORT".to_string(),
            message: "contains invalid unicode".to_string(),
        }),
    }
}

/// Parse the PRESSROOM_USERS environment variable.
///
/// Expected format: `id:name:email:role,id:name:email:role` where `id` is a
/// UUID and `role` is `member` or `admin`.
fn parse_users() -> Result<Vec<User>, ConfigError> {
    let users_str = match env::var("PRESSROOM_USERS") {
        Ok(s) if !s.is_empty() => s,
        _ => return Ok(Vec::new()),
    };

    let mut users = Vec::new();

    for entry in users_str.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }

        let parts: Vec<&str> = entry.splitn(4, ':').collect();
        if parts.len() != 4 {
            return Err(ConfigError::InvalidFormat {
                var: "PRESSROOM_USERS".to_string(),
                message: format!("expected 'id:name:email:role' format, got '{entry}'"),
            });
        }

        let id = Uuid::parse_str(parts[0].trim()).map_err(|_| ConfigError::InvalidFormat {
            var: "PRESSROOM_USERS".to_string(),
            message: format!("'{}' is not a valid UUID", parts[0].trim()),
        })?;

        let name = parts[1].trim();
        let email = parts[2].trim();
        if name.is_empty() || email.is_empty() {
            return Err(ConfigError::InvalidFormat {
                var: "PRESSROOM_USERS".to_string(),
                message: format!("name and email cannot be empty in '{entry}'"),
            });
        }

        let role: Role = parts[3]
            .trim()
            .parse()
            .map_err(|message| ConfigError::InvalidFormat {
                var: "PRESSROOM_USERS".to_string(),
                message,
            })?;

        users.push(User {
            id,
            name: name.to_string(),
            email: email.to_string(),
            role,
        });
    }

    Ok(users)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    /// Helper to temporarily set environment variables for testing.
    struct EnvGuard {
        vars: Vec<(String, Option<String>)>,
    }

    impl EnvGuard {
        fn new() -> Self {
            Self { vars: Vec::new() }
        }

        fn set(&mut self, key: &str, value: &str) {
            let old_value = env::var(key).ok();
            self.vars.push((key.to_string(), old_value));
            env::set_var(key, value);
        }

        fn remove(&mut self, key: &str) {
            let old_value = env::var(key).ok();
            self.vars.push((key.to_string(), old_value));
            env::remove_var(key);
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (key, value) in &self.vars {
                match value {
                    Some(v) => env::set_var(key, v),
                    None => env::remove_var(key),
                }
            }
        }
    }

    const TEST_UUID: &str = "6a0f1c52-0d0e-4c07-9f52-9d1f5c3a0001";

    #[test]
    #[serial]
    fn from_env_requires_a_jwt_secret() {
        let mut guard = EnvGuard::new();
        guard.remove("PRESSROOM_JWT_SECRET");
        guard.remove("PRESSROOM_USERS");
        guard.remove("PORT");

        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref v) if v == "PRESSROOM_JWT_SECRET"));
    }

    #[test]
    #[serial]
    fn from_env_rejects_an_empty_secret() {
        let mut guard = EnvGuard::new();
        guard.set("PRESSROOM_JWT_SECRET", "");
        guard.remove("PRESSROOM_USERS");
        guard.remove("PORT");

        assert!(Config::from_env().is_err());
    }

    #[test]
    #[serial]
    fn from_env_uses_default_port() {
        let mut guard = EnvGuard::new();
        guard.set("PRESSROOM_JWT_SECRET", "secret");
        guard.remove("PRESSROOM_USERS");
        guard.remove("PORT");

        let config = Config::from_env().unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert!(config.users.is_empty());
    }

    #[test]
    #[serial]
    fn from_env_parses_an_explicit_port() {
        let mut guard = EnvGuard::new();
        guard.set("PRESSROOM_JWT_SECRET", "secret");
        guard.remove("PRESSROOM_USERS");
        guard.set("PORT", "3000");

        let config = Config::from_env().unwrap();
        assert_eq!(config.port, 3000);
    }

    #[test]
    #[serial]
    fn from_env_rejects_a_bad_port() {
        let mut guard = EnvGuard::new();
        guard.set("PRESSROOM_JWT_SECRET", "secret");
        guard.remove("PRESSROOM_USERS");
        guard.set("PORT", "not-a-port");

        assert!(matches!(
            Config::from_env().unwrap_err(),
            ConfigError::InvalidPort(_)
        ));
    }

    #[test]
    #[serial]
    fn from_env_parses_seed_users() {
        let mut guard = EnvGuard::new();
        guard.set("PRESSROOM_JWT_SECRET", "secret");
        guard.remove("PORT");
        guard.set(
            "PRESSROOM_USERS",
            &format!("{TEST_UUID}:Admin User:admin@test.com:admin"),
        );

        let config = Config::from_env().unwrap();
        assert_eq!(config.users.len(), 1);
        let user = &config.users[0];
        assert_eq!(user.id.to_string(), TEST_UUID);
        assert_eq!(user.name, "Admin User");
        assert_eq!(user.email, "admin@test.com");
        assert_eq!(user.role, Role::Admin);
    }

    #[test]
    #[serial]
    fn from_env_parses_multiple_users_and_skips_blank_entries() {
        let mut guard = EnvGuard::new();
        guard.set("PRESSROOM_JWT_SECRET", "secret");
        guard.remove("PORT");
        guard.set(
            "PRESSROOM_USERS",
            &format!(
                "{TEST_UUID}:Admin User:admin@test.com:admin, ,\
                 6a0f1c52-0d0e-4c07-9f52-9d1f5c3a0002:John Doe:john@test.com:member"
            ),
        );

        let config = Config::from_env().unwrap();
        assert_eq!(config.users.len(), 2);
        assert_eq!(config.users[1].role, Role::Member);
    }

    #[test]
    #[serial]
    fn from_env_rejects_a_malformed_user_entry() {
        let mut guard = EnvGuard::new();
        guard.set("PRESSROOM_JWT_SECRET", "secret");
        guard.remove("PORT");
        guard.set("PRESSROOM_USERS", "missing-fields");

        assert!(matches!(
            Config::from_env().unwrap_err(),
            ConfigError::InvalidFormat { ref var, .. } if var == "PRESSROOM_USERS"
        ));
    }

    #[test]
    #[serial]
    fn from_env_rejects_an_unknown_role() {
        let mut guard = EnvGuard::new();
        guard.set("PRESSROOM_JWT_SECRET", "secret");
        guard.remove("PORT");
        guard.set(
            "PRESSROOM_USERS",
            &format!("{TEST_UUID}:Admin User:admin@test.com:root"),
        );

        assert!(Config::from_env().is_err());
    }

    #[test]
    #[serial]
    fn from_env_rejects_a_non_uuid_id() {
        let mut guard = EnvGuard::new();
        guard.set("PRESSROOM_JWT_SECRET", "secret");
        guard.remove("PORT");
        guard.set("PRESSROOM_USERS", "abc123:Admin:admin@test.com:admin");

        assert!(Config::from_env().is_err());
    }

    #[test]
    fn config_error_displays() {
        let err = ConfigError::MissingEnvVar("PRESSROOM_JWT_SECRET".to_string());
        assert_eq!(
            err.to_string(),
            "missing required environment variable: PRESSROOM_JWT_SECRET"
        );

        let err = ConfigError::InvalidFormat {
            var: "PRESSROOM_USERS".to_string(),
            message: "bad entry".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid format for PRESSROOM_USERS: bad entry"
        );
    }
}
