use serde::{Deserialize, Serialize};

use crate::api::{ApiError, Result};
use crate::config::Config;

/// Login identity used against the upstream `/auth/login` endpoint.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

// Keeps the password out of logs and panic messages
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Read the configured login identity. Both values must be present and non-empty.
    pub fn from_config(config: &Config) -> Result<Self> {
        match (
            config.auth_email.as_deref().filter(|s| !s.is_empty()),
            config.auth_password.as_deref().filter(|s| !s.is_empty()),
        ) {
            (Some(username), Some(password)) => Ok(Self {
                username: username.to_string(),
                password: password.to_string(),
            }),
            _ => Err(ApiError::Config(
                "AUTH_EMAIL and AUTH_PASSWORD must be set in environment".to_string(),
            )),
        }
    }

    pub fn login_request(&self) -> LoginRequest<'_> {
        LoginRequest {
            username: &self.username,
            password: &self.password,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
    pub token: Option<String>,
}

impl LoginResponse {
    /// The upstream signals a rejected login with a zero identity id even on HTTP 200.
    pub fn has_identity(&self) -> bool {
        self.id != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(email: Option<&str>, password: Option<&str>) -> Config {
        Config {
            auth_email: email.map(String::from),
            auth_password: password.map(String::from),
            ..Config::default()
        }
    }

    #[test]
    fn test_credentials_require_both_values() {
        assert!(Credentials::from_config(&config_with(Some("a@b.c"), Some("pw"))).is_ok());

        for config in [
            config_with(None, Some("pw")),
            config_with(Some("a@b.c"), None),
            config_with(Some(""), Some("pw")),
            config_with(None, None),
        ] {
            match Credentials::from_config(&config) {
                Err(ApiError::Config(msg)) => assert!(msg.contains("AUTH_EMAIL")),
                other => panic!("expected config error, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_debug_redacts_password() {
        let creds = Credentials {
            username: "admin@school.com".into(),
            password: "hunter2".into(),
        };
        let debug = format!("{:?}", creds);
        assert!(debug.contains("admin@school.com"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_login_request_shape() {
        let creds = Credentials {
            username: "admin@school.com".into(),
            password: "pw".into(),
        };
        let json = serde_json::to_value(creds.login_request()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"username": "admin@school.com", "password": "pw"})
        );
    }

    #[test]
    fn test_parse_login_response() {
        let resp: LoginResponse = serde_json::from_str(
            r#"{"id": 7, "name": "Admin", "email": "admin@school.com", "role": "admin"}"#,
        )
        .unwrap();
        assert!(resp.has_identity());
        assert_eq!(resp.name, "Admin");
        assert_eq!(resp.token, None);

        let rejected: LoginResponse = serde_json::from_str(r#"{"id": 0}"#).unwrap();
        assert!(!rejected.has_identity());
    }
}
