use tokio::sync::RwLock;

/// Cached proof of authentication for one `ApiClient`.
///
/// Lives only in memory; a restarted process logs in again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub authenticated: bool,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub csrf_token: Option<String>,
}

impl Session {
    /// Render the cached tokens as a `Cookie` header value.
    /// Returns `None` when no token is cached.
    pub fn cookie_header(&self) -> Option<String> {
        let parts: Vec<String> = [
            (ACCESS_TOKEN_COOKIE, &self.access_token),
            (REFRESH_TOKEN_COOKIE, &self.refresh_token),
            (CSRF_TOKEN_COOKIE, &self.csrf_token),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.as_ref().map(|v| format!("{}={}", name, v)))
        .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join("; "))
        }
    }
}

/// Cookie carrying the access token
pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";
/// Cookie carrying the refresh token
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";
/// Cookie carrying the anti-forgery token (also sent as `x-csrf-token`)
pub const CSRF_TOKEN_COOKIE: &str = "csrfToken";

/// Tokens extracted from a successful login response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionTokens {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub csrf_token: Option<String>,
}

impl SessionTokens {
    /// Collect the session cookies from `(name, value)` pairs.
    /// Empty values are ignored.
    pub fn from_cookies<'a, I>(cookies: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut tokens = Self::default();
        for (name, value) in cookies {
            if value.is_empty() {
                continue;
            }
            let slot = match name {
                ACCESS_TOKEN_COOKIE => &mut tokens.access_token,
                REFRESH_TOKEN_COOKIE => &mut tokens.refresh_token,
                CSRF_TOKEN_COOKIE => &mut tokens.csrf_token,
                _ => continue,
            };
            *slot = Some(value.to_string());
        }
        tokens
    }
}

/// Thread-safe holder of the client's `Session`.
///
/// Reads take the shared lock, writes the exclusive one. Locks are held only
/// for the in-memory copy or mutation, never across network I/O.
#[derive(Debug, Default)]
pub struct SessionStore {
    inner: RwLock<Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.inner.read().await.authenticated
    }

    /// Mark the session authenticated and cache whichever tokens are present.
    /// Tokens missing from `tokens` keep their previously cached value.
    pub async fn establish(&self, tokens: SessionTokens) {
        let mut session = self.inner.write().await;
        session.authenticated = true;
        if let Some(token) = tokens.access_token {
            session.access_token = Some(token);
        }
        if let Some(token) = tokens.refresh_token {
            session.refresh_token = Some(token);
        }
        if let Some(token) = tokens.csrf_token {
            session.csrf_token = Some(token);
        }
    }

    /// Flag the session as expired. Cached tokens stay until the next login replaces them.
    pub async fn invalidate(&self) {
        self.inner.write().await.authenticated = false;
    }

    pub async fn snapshot(&self) -> Session {
        self.inner.read().await.clone()
    }

    pub async fn csrf_token(&self) -> Option<String> {
        self.inner.read().await.csrf_token.clone()
    }

    pub async fn set_csrf_token(&self, token: String) {
        self.inner.write().await.csrf_token = Some(token);
    }
}
