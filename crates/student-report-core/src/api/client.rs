//! API client for the upstream student backend.
//!
//! `ApiClient` logs in with the configured credentials, caches the session
//! cookies in its `SessionStore` and replays them on every record request.
//! A request answered with 401 triggers one re-login and exactly one retry.

use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::{header, Client, Method, RequestBuilder, Response, StatusCode, Url};
use tracing::{debug, info, warn};

use crate::auth::session::CSRF_TOKEN_COOKIE;
use crate::auth::{Credentials, LoginResponse, Session, SessionStore, SessionTokens};
use crate::config::Config;
use crate::models::{ApiEnvelope, Student, StudentId};

use super::{ApiError, Result};

// ============================================================================
// Constants
// ============================================================================

/// Login endpoint, relative to the configured base URL
const LOGIN_PATH: &str = "/auth/login";

/// The upstream checks the CSRF token in this header as well as in the cookie
const CSRF_HEADER: &str = "x-csrf-token";

/// Cookie paths searched for a CSRF token when none is cached.
/// The upstream may scope the cookie to any of them.
const CSRF_COOKIE_PATHS: [&str; 3] = ["/", "/auth", "/auth/login"];

/// API client for the student backend.
pub struct ApiClient {
    client: Client,
    cookie_jar: Arc<Jar>,
    base_url: String,
    origin: Url,
    config: Config,
    session: SessionStore,
}

impl ApiClient {
    /// Create a new, unauthenticated API client
    pub fn new(config: &Config) -> Result<Self> {
        let origin = Url::parse(&config.api_url).map_err(|e| {
            ApiError::Config(format!("Invalid NODE_API_URL {:?}: {}", config.api_url, e))
        })?;

        let cookie_jar = Arc::new(Jar::default());
        let client = Client::builder()
            .timeout(config.request_timeout)
            .cookie_provider(Arc::clone(&cookie_jar))
            .build()
            .map_err(|e| ApiError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            cookie_jar,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            origin,
            config: config.clone(),
            session: SessionStore::new(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn is_authenticated(&self) -> bool {
        self.session.is_authenticated().await
    }

    /// Copy of the cached session state
    pub async fn session(&self) -> Session {
        self.session.snapshot().await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ===== Authentication =====

    /// Log in with the configured credentials and cache the session cookies.
    ///
    /// Succeeds only for a 2xx response whose body carries a non-zero user id.
    /// Does not retry.
    pub async fn authenticate(&self) -> Result<LoginResponse> {
        let credentials = Credentials::from_config(&self.config)?;
        let url = self.url(LOGIN_PATH);

        let response = self
            .client
            .post(&url)
            .header(header::ACCEPT, "application/json")
            .json(&credentials.login_request())
            .send()
            .await
            .map_err(|e| ApiError::Auth {
                status: None,
                message: format!("failed to make login request: {}", e),
            })?;

        let status = response.status();
        let cookies: Vec<(String, String)> = response
            .cookies()
            .map(|c| (c.name().to_string(), c.value().to_string()))
            .collect();
        let tokens =
            SessionTokens::from_cookies(cookies.iter().map(|(n, v)| (n.as_str(), v.as_str())));

        let body = response.text().await.map_err(|e| ApiError::Auth {
            status: Some(status),
            message: format!("failed to read login response body: {}", e),
        })?;

        if !status.is_success() {
            return Err(ApiError::login_rejected(status, &body));
        }

        let login: LoginResponse = serde_json::from_str(&body).map_err(|e| ApiError::Auth {
            status: Some(status),
            message: format!("failed to parse login response: {}", e),
        })?;

        if !login.has_identity() {
            return Err(ApiError::Auth {
                status: Some(status),
                message: format!(
                    "login failed: invalid response: {}",
                    ApiError::truncate_body(&body)
                ),
            });
        }

        debug!(
            access_token = tokens.access_token.is_some(),
            refresh_token = tokens.refresh_token.is_some(),
            csrf_token = tokens.csrf_token.is_some(),
            "Session cookies received"
        );
        self.session.establish(tokens).await;

        info!(user = %login.name, role = %login.role, "Authenticated with upstream backend");
        Ok(login)
    }

    async fn ensure_authenticated(&self) -> Result<()> {
        if self.session.is_authenticated().await {
            return Ok(());
        }
        self.authenticate().await.map(|_| ())
    }

    // ===== Request execution =====

    /// Return the cached CSRF token, falling back to the cookie jar.
    async fn resolve_csrf_token(&self) -> Option<String> {
        if let Some(token) = self.session.csrf_token().await {
            return Some(token);
        }

        for path in CSRF_COOKIE_PATHS {
            let mut url = self.origin.clone();
            url.set_path(path);
            url.set_query(None);
            url.set_fragment(None);

            let Some(cookies) = self.cookie_jar.cookies(&url) else {
                continue;
            };
            let Ok(cookies) = cookies.to_str() else {
                continue;
            };
            if let Some(token) = find_cookie(cookies, CSRF_TOKEN_COOKIE) {
                debug!(path, "Found CSRF token in cookie jar");
                self.session.set_csrf_token(token.clone()).await;
                return Some(token);
            }
        }

        warn!("CSRF token not found in cookies");
        None
    }

    /// Build a request carrying the session both as cookies and as the CSRF header.
    async fn build_request(&self, method: Method, url: &str) -> RequestBuilder {
        self.resolve_csrf_token().await;
        let session = self.session.snapshot().await;

        let mut request = self
            .client
            .request(method, url)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "application/json");

        if let Some(cookies) = session.cookie_header() {
            request = request.header(header::COOKIE, cookies);
        }
        if let Some(csrf) = session.csrf_token {
            request = request.header(CSRF_HEADER, csrf);
        }
        request
    }

    async fn send_once(&self, method: Method, url: &str) -> Result<Response> {
        let response = self.build_request(method, url).await.send().await?;
        debug!(url, status = %response.status(), "Upstream response");
        Ok(response)
    }

    /// Send a request with the cached session, logging in first if needed.
    ///
    /// A 401 invalidates the session, triggers one re-login and one retry.
    /// Whatever the retry returns, including another 401, goes back to the caller.
    pub async fn send_authenticated(&self, method: Method, path: &str) -> Result<Response> {
        self.ensure_authenticated().await?;

        let url = self.url(path);
        let response = self.send_once(method.clone(), &url).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }
        drop(response);

        warn!(url = %url, "Received 401, re-authenticating and retrying");
        self.session.invalidate().await;
        self.authenticate().await?;

        self.send_once(method, &url).await
    }

    // ===== Data Fetching Methods =====

    /// Fetch a student by its raw identifier.
    /// Non-numeric identifiers are rejected before any request is made.
    pub async fn fetch_student(&self, id: &str) -> Result<Student> {
        let id: StudentId = id.parse()?;
        self.fetch_student_by_id(id).await
    }

    pub async fn fetch_student_by_id(&self, id: StudentId) -> Result<Student> {
        let response = self
            .send_authenticated(Method::GET, &format!("/students/{}", id))
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::from_status(status, &body));
        }

        let envelope: ApiEnvelope = serde_json::from_str(&body)?;
        let student: Student = envelope.decode_data()?;

        debug!(id = student.id, name = %student.name, "Fetched student");
        Ok(student)
    }
}

/// Find a non-empty cookie value in a `Cookie` header string
fn find_cookie(header: &str, name: &str) -> Option<String> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_cookie() {
        let header = "accessToken=a; csrfToken=c; theme=dark";
        assert_eq!(find_cookie(header, "csrfToken").as_deref(), Some("c"));
        assert_eq!(find_cookie(header, "refreshToken"), None);
        assert_eq!(find_cookie("csrfToken=", "csrfToken"), None);
        assert_eq!(find_cookie("", "csrfToken"), None);
    }

    #[test]
    fn test_new_rejects_invalid_base_url() {
        let config = Config {
            api_url: "not a url".to_string(),
            ..Config::default()
        };
        assert!(matches!(ApiClient::new(&config), Err(ApiError::Config(_))));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let config = Config {
            api_url: "http://localhost:5007/api/v1/".to_string(),
            ..Config::default()
        };
        let client = ApiClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "http://localhost:5007/api/v1");
        assert_eq!(
            client.url("/students/1"),
            "http://localhost:5007/api/v1/students/1"
        );
    }
}
