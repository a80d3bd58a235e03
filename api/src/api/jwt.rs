use chrono::{DateTime, TimeZone, Utc};
use hmac::{Hmac, Mac};
use jwt::{Claims, Header, Token, VerifyWithKey};
use sha2::Sha256;
use uuid::Uuid;

use crate::config::AuthConfig;

/// The claims we care about from a provider issued access token.
///
/// Tokens are HS256 signed with the secret shared with the auth
/// provider, so they can be verified locally without a network round
/// trip.
pub struct AccessToken {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub expiration: Option<DateTime<Utc>>,
    pub issued_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    /// Verifies the signature and the registered claims. Returns `None`
    /// for anything that should not be treated as a live session, which
    /// includes expired tokens.
    pub fn verify(config: &AuthConfig, token: &str) -> Option<Self> {
        let key = Hmac::<Sha256>::new_from_slice(config.jwt_secret.as_bytes()).ok()?;

        let token: Token<Header, Claims, _> = token.verify_with_key(&key).ok()?;
        let claims = token.claims();

        if claims.registered.issuer.as_deref()? != config.jwt_issuer {
            return None;
        }

        let issued_at = claims
            .registered
            .issued_at
            .and_then(|iat| Utc.timestamp_opt(iat as i64, 0).single());
        if issued_at.map(|iat| iat > Utc::now()).unwrap_or_default() {
            return None;
        }

        let expiration = claims
            .registered
            .expiration
            .and_then(|exp| Utc.timestamp_opt(exp as i64, 0).single());
        if expiration.map(|exp| exp < Utc::now()).unwrap_or_default() {
            return None;
        }

        let user_id = claims.registered.subject.as_deref()?.parse().ok()?;

        let email = claims
            .private
            .get("email")
            .and_then(|email| email.as_str())
            .map(|email| email.to_owned());

        Some(Self {
            user_id,
            email,
            expiration,
            issued_at,
        })
    }
}
