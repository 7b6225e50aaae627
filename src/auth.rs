use crate::accounts::Identity;
use crate::config;

use axum::http::HeaderMap;
use axum::http::header::COOKIE;
use base64::{STANDARD, STANDARD_NO_PAD, URL_SAFE_NO_PAD, decode_config, encode_config};
use jwt_simple::algorithms::MACLike;
use jwt_simple::prelude::{Claims, Duration as JwtDuration, HS256Key, VerificationOptions};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use serde::Deserialize;
use serde::Serialize;

use std::collections::HashSet;

/// Verified session attached to every authenticated request.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user_id: String,
    pub email: String,
}

impl Session {
    pub fn identity(&self) -> Identity {
        Identity {
            user_id: self.user_id.clone(),
            email: self.email.clone(),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct SessionClaims {
    email: String,
}

#[derive(Debug)]
pub enum AuthError {
    InvalidKey,
    InvalidToken,
    MissingExpiry,
    MissingSubject,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::InvalidKey => f.write_str("invalid auth key"),
            AuthError::InvalidToken => f.write_str("invalid auth token"),
            AuthError::MissingExpiry => f.write_str("auth token missing expiry"),
            AuthError::MissingSubject => f.write_str("auth token missing subject"),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct AuthState {
    key: HS256Key,
    issuer: String,
    cookie_name: String,
    token_ttl: time::Duration,
    cookie_secure: bool,
}

impl AuthState {
    pub(crate) fn from_config(config: &config::AppConfig) -> Result<Self, AuthError> {
        let key_bytes = match config.auth.key.as_deref() {
            Some(raw) => decode_key(raw)?,
            None => {
                // Sessions will not survive a restart without a configured key.
                tracing::warn!(
                    "no auth key configured; using an ephemeral key (pass --auth-key or run `slambook auth-key`)"
                );
                let mut bytes = vec![0u8; 32];
                OsRng.fill_bytes(&mut bytes);
                bytes
            }
        };
        let key = HS256Key::from_bytes(&key_bytes);

        Ok(Self {
            key,
            issuer: config.app_name.clone(),
            cookie_name: config.auth.cookie_name.clone(),
            token_ttl: config.auth.token_ttl,
            cookie_secure: config.auth.cookie_secure,
        })
    }

    pub(crate) fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    pub(crate) fn issue_token(&self, identity: &Identity) -> Result<String, AuthError> {
        let ttl_seconds = self.token_ttl.whole_seconds();
        if ttl_seconds <= 0 {
            return Err(AuthError::InvalidToken);
        }
        let custom = SessionClaims {
            email: identity.email.clone(),
        };
        let claims = Claims::with_custom_claims(custom, JwtDuration::from_secs(ttl_seconds as u64))
            .with_subject(&identity.user_id)
            .with_issuer(&self.issuer);
        self.key
            .authenticate(claims)
            .map_err(|_| AuthError::InvalidToken)
    }

    pub(crate) fn auth_cookie(&self, token: &str) -> String {
        let max_age = self.token_ttl.whole_seconds().max(0);
        let mut cookie = format!(
            "{}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}",
            self.cookie_name
        );
        if self.cookie_secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    pub(crate) fn clear_cookie(&self) -> String {
        let mut cookie = format!(
            "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
            self.cookie_name
        );
        if self.cookie_secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    pub(crate) fn verify_token(&self, token: &str) -> Result<Session, AuthError> {
        let mut options = VerificationOptions::default();
        let mut issuers = HashSet::new();
        issuers.insert(self.issuer.clone());
        options.allowed_issuers = Some(issuers);

        let claims = self
            .key
            .verify_token::<SessionClaims>(token, Some(options))
            .map_err(|_| AuthError::InvalidToken)?;

        if claims.expires_at.is_none() {
            return Err(AuthError::MissingExpiry);
        }

        let user_id = claims.subject.ok_or(AuthError::MissingSubject)?;
        if user_id.trim().is_empty() {
            return Err(AuthError::MissingSubject);
        }

        Ok(Session {
            user_id,
            email: claims.custom.email,
        })
    }

    /// Resolves the session from the request's auth cookie, if any.
    pub(crate) fn session_from_headers(&self, headers: &HeaderMap) -> Option<Session> {
        let token = auth_cookie_value(headers, self.cookie_name())?;
        self.verify_token(token).ok()
    }
}

fn auth_cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    for header in headers.get_all(COOKIE).iter() {
        if let Ok(raw) = header.to_str()
            && let Some(value) = cookie_from_header(raw, name)
        {
            return Some(value);
        }
    }
    None
}

fn cookie_from_header<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    for part in header.split(';') {
        let trimmed = part.trim();
        if let Some((cookie_name, cookie_value)) = trimmed.split_once('=')
            && cookie_name == name
        {
            return Some(cookie_value);
        }
    }
    None
}

fn decode_key(raw: &str) -> Result<Vec<u8>, AuthError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AuthError::InvalidKey);
    }

    let decoded = decode_config(trimmed, URL_SAFE_NO_PAD)
        .or_else(|_| decode_config(trimmed, STANDARD))
        .or_else(|_| decode_config(trimmed, STANDARD_NO_PAD))
        .map_err(|_| AuthError::InvalidKey)?;

    if decoded.is_empty() {
        return Err(AuthError::InvalidKey);
    }

    Ok(decoded)
}

pub fn generate_auth_key() -> Result<String, AuthError> {
    let mut rng = OsRng;
    generate_auth_key_with_rng(&mut rng)
}

pub(crate) fn generate_auth_key_with_rng<R: RngCore + CryptoRng>(
    rng: &mut R,
) -> Result<String, AuthError> {
    let mut bytes = [0u8; 32];
    rng.fill_bytes(&mut bytes);
    let encoded = encode_config(bytes, URL_SAFE_NO_PAD);
    if encoded.is_empty() {
        return Err(AuthError::InvalidKey);
    }
    Ok(encoded)
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;

    fn auth_state(key_bytes: &[u8]) -> AuthState {
        let config = config::AppConfig {
            auth: config::AuthConfig {
                key: Some(encode_config(key_bytes, URL_SAFE_NO_PAD)),
                ..config::AuthConfig::default()
            },
            ..config::AppConfig::default()
        };
        AuthState::from_config(&config).expect("auth state")
    }

    fn identity() -> Identity {
        Identity {
            user_id: "user-1".to_string(),
            email: "marge@example.com".to_string(),
        }
    }

    #[test]
    fn issue_token_then_verify__should_return_session_identity() {
        // Given
        let auth = auth_state(b"auth-round-trip-secret");

        // When
        let token = auth.issue_token(&identity()).expect("issue token");
        let session = auth.verify_token(&token).expect("verify token");

        // Then
        assert_eq!(session.user_id, "user-1");
        assert_eq!(session.email, "marge@example.com");
    }

    #[test]
    fn verify_token__should_reject_token_from_other_key() {
        // Given
        let issuing = auth_state(b"issuing-secret");
        let verifying = auth_state(b"other-secret");
        let token = issuing.issue_token(&identity()).expect("issue token");

        // When
        let result = verifying.verify_token(&token);

        // Then
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[test]
    fn auth_cookie__should_set_http_only_lax_cookie() {
        // Given
        let auth = auth_state(b"cookie-secret");

        // When
        let cookie = auth.auth_cookie("token-value");

        // Then
        assert!(cookie.starts_with("slambook_auth=token-value"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
    }

    #[test]
    fn clear_cookie__should_expire_immediately() {
        // Given
        let auth = auth_state(b"cookie-clear-secret");

        // When
        let cookie = auth.clear_cookie();

        // Then
        assert!(cookie.contains("Max-Age=0"));
    }

    #[test]
    fn session_from_headers__should_read_session_cookie() {
        // Given
        let auth = auth_state(b"cookie-header-secret");
        let token = auth.issue_token(&identity()).expect("issue token");
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            format!("other=1; slambook_auth={token}")
                .parse()
                .expect("header"),
        );

        // When
        let session = auth.session_from_headers(&headers);

        // Then
        assert_eq!(
            session,
            Some(Session {
                user_id: "user-1".to_string(),
                email: "marge@example.com".to_string(),
            })
        );
    }

    struct ZeroRng;

    impl RngCore for ZeroRng {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            for value in dest.iter_mut() {
                *value = 0;
            }
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    impl CryptoRng for ZeroRng {}

    #[test]
    fn generate_auth_key_with_rng__should_match_fixture() {
        // Given
        let mut rng = ZeroRng;

        // When
        let key = generate_auth_key_with_rng(&mut rng).expect("auth key");

        // Then
        assert_eq!(key, "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA");
    }
}
