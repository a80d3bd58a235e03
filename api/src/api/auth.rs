use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::jwt::AccessToken;
use crate::config::AuthConfig;

/// A verified session attached to the current request.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    /// The raw access token the session was restored from.
    pub access_token: String,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthError {
    #[error("provider rejected the refresh token")]
    RefreshRejected,
    #[error("failed to reach the auth provider: {0}")]
    Provider(String),
}

/// A fresh access and refresh token pair as returned by the provider's
/// token endpoint. Also the shape of the auth callback request body.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Exchanges a refresh token for a fresh token pair. Backed by the real
/// provider in production, mocked in tests.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError>;
}

/// Talks to the OAuth provider's token endpoint over HTTPS.
pub struct ProviderClient {
    client: reqwest::Client,
    token_url: String,
    api_key: String,
}

impl ProviderClient {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            token_url: format!(
                "{}/token?grant_type=refresh_token",
                config.provider_url.trim_end_matches('/')
            ),
            api_key: config.provider_key.clone(),
        }
    }
}

#[async_trait]
impl TokenRefresher for ProviderClient {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let response = self
            .client
            .post(&self.token_url)
            .header("apikey", &self.api_key)
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await
            .map_err(|err| AuthError::Provider(err.to_string()))?;

        if !response.status().is_success() {
            return Err(AuthError::RefreshRejected);
        }

        response
            .json()
            .await
            .map_err(|err| AuthError::Provider(err.to_string()))
    }
}

/// Request cookies, parsed from however many `Cookie` headers the
/// client sent.
#[derive(Debug, Clone, Default)]
pub struct CookieJar(HashMap<String, String>);

impl CookieJar {
    pub fn parse(headers: &hyper::HeaderMap) -> Self {
        let mut jar = HashMap::new();

        for header in headers.get_all(hyper::header::COOKIE) {
            let Ok(header) = header.to_str() else {
                continue;
            };

            for pair in header.split(';') {
                if let Some((name, value)) = pair.split_once('=') {
                    jar.insert(name.trim().to_owned(), value.trim().to_owned());
                }
            }
        }

        Self(jar)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A cookie the response should set. Session cookies are host scoped,
/// HTTP only and never sent cross site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCookie {
    pub name: String,
    pub value: String,
    pub max_age: u64,
}

impl SetCookie {
    pub fn to_header_value(&self) -> String {
        format!(
            "{}={}; Path=/; Max-Age={}; HttpOnly; Secure; SameSite=Lax",
            self.name, self.value, self.max_age
        )
    }
}

/// Restores sessions from request cookies.
///
/// The site fronts a hosted OAuth provider. Clients hold a short lived
/// access token and a long lived refresh token, both in cookies. A
/// request with a live access token is verified locally. A request
/// whose access token no longer verifies but that still carries a
/// refresh token gets one refresh attempt against the provider, and on
/// success the rotated pair is handed back as cookies to set. Requests
/// with no session cookies at all never touch the provider.
pub struct SessionBridge {
    config: AuthConfig,
    refresher: Box<dyn TokenRefresher>,
}

impl SessionBridge {
    pub fn new(config: AuthConfig) -> Self {
        let refresher = Box::new(ProviderClient::new(&config));

        Self { config, refresher }
    }

    pub fn with_refresher(config: AuthConfig, refresher: Box<dyn TokenRefresher>) -> Self {
        Self { config, refresher }
    }

    pub fn has_session_cookies(&self, jar: &CookieJar) -> bool {
        jar.get(&self.config.access_cookie).is_some() || jar.get(&self.config.refresh_cookie).is_some()
    }

    /// Restores the session carried by the jar, if any. Restoration
    /// requires both cookies. The returned cookies are non-empty exactly
    /// when the token pair was rotated and must be forwarded to the
    /// client.
    pub async fn restore(&self, jar: &CookieJar) -> (Option<Session>, Vec<SetCookie>) {
        let access = jar.get(&self.config.access_cookie);
        let refresh = jar.get(&self.config.refresh_cookie);

        let (Some(access), Some(refresh)) = (access, refresh) else {
            return (None, Vec::new());
        };

        if let Some(token) = AccessToken::verify(&self.config, access) {
            return (Some(session_from(token, access)), Vec::new());
        }

        let pair = match self.refresher.refresh(refresh).await {
            Ok(pair) => pair,
            Err(err) => {
                tracing::debug!(error = %err, "session refresh failed");
                return (None, Vec::new());
            }
        };

        let Some(token) = AccessToken::verify(&self.config, &pair.access_token) else {
            tracing::warn!("provider returned an access token that does not verify");
            return (None, Vec::new());
        };

        let cookies = self.session_cookies(&pair);

        (Some(session_from(token, &pair.access_token)), cookies)
    }

    /// Verifies a raw access token without touching the provider.
    pub fn verify(&self, token: &str) -> Option<AccessToken> {
        AccessToken::verify(&self.config, token)
    }

    /// The cookies that persist a token pair on the client.
    pub fn session_cookies(&self, pair: &TokenPair) -> Vec<SetCookie> {
        vec![
            SetCookie {
                name: self.config.access_cookie.clone(),
                value: pair.access_token.clone(),
                max_age: self.config.access_max_age,
            },
            SetCookie {
                name: self.config.refresh_cookie.clone(),
                value: pair.refresh_token.clone(),
                max_age: self.config.refresh_max_age,
            },
        ]
    }

    /// Expired empty cookies that clear the session on the client.
    pub fn signout_cookies(&self) -> Vec<SetCookie> {
        vec![
            SetCookie {
                name: self.config.access_cookie.clone(),
                value: String::new(),
                max_age: 0,
            },
            SetCookie {
                name: self.config.refresh_cookie.clone(),
                value: String::new(),
                max_age: 0,
            },
        ]
    }
}

fn session_from(token: AccessToken, raw: &str) -> Session {
    Session {
        user_id: token.user_id,
        email: token.email,
        expires_at: token.expiration,
        access_token: raw.to_owned(),
    }
}
