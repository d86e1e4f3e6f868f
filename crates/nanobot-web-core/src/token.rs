//! Signed, expiring access tokens carrying the SSH session.
//!
//! Tokens are compact JWTs (`header.claims.signature`, base64url without
//! padding) signed with HMAC-SHA256 under the process-wide secret.

use std::{
    fmt,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD as B64};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

use crate::{Session, Settings};

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "HS256";

/// Token error.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Malformed token")]
    Malformed,
    #[error("Invalid token signature")]
    BadSignature,
    #[error("Unsupported token algorithm: {0}")]
    Algorithm(String),
    #[error("Token expired")]
    Expired,
    #[error("Invalid token payload: {0}")]
    Payload(String),
    #[error("Failed to encode token: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("Invalid signing key")]
    Key,
}

#[derive(Serialize, Deserialize)]
struct Header {
    alg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    typ: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct Claims {
    host: String,
    port: u16,
    username: String,
    password: String,
    exp: u64,
}

/// Issues and verifies access tokens.
#[derive(Clone)]
pub struct TokenCodec {
    key: Vec<u8>,
    ttl: Duration,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// Create a codec from a secret and a validity window.
    #[must_use]
    pub fn new(secret: impl AsRef<[u8]>, ttl: Duration) -> Self {
        Self {
            key: secret.as_ref().to_vec(),
            ttl,
        }
    }

    /// Create a codec from the application settings.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.secret_key, settings.token_ttl)
    }

    /// Token validity window.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `session`, valid for the configured TTL from now.
    ///
    /// # Errors
    /// Returns error if the claims cannot be encoded.
    pub fn issue(&self, session: &Session) -> Result<String, TokenError> {
        self.issue_at(session, unix_now())
    }

    /// Issue a token as if the current time were `now` (unix seconds).
    ///
    /// # Errors
    /// Returns error if the claims cannot be encoded.
    pub fn issue_at(&self, session: &Session, now: u64) -> Result<String, TokenError> {
        let header = Header {
            alg: ALGORITHM.to_string(),
            typ: Some("JWT".to_string()),
        };
        let claims = Claims {
            host: session.host.clone(),
            port: session.port,
            username: session.username.clone(),
            password: session.password.clone(),
            exp: now.saturating_add(self.ttl.as_secs()),
        };

        let signing_input = format!(
            "{}.{}",
            B64.encode(serde_json::to_vec(&header)?),
            B64.encode(serde_json::to_vec(&claims)?)
        );
        let signature = self.mac(signing_input.as_bytes())?.finalize().into_bytes();

        Ok(format!("{signing_input}.{}", B64.encode(signature)))
    }

    /// Verify a token and rebuild the session it carries.
    ///
    /// # Errors
    /// Returns error if the token is malformed, badly signed, expired or
    /// missing session fields.
    pub fn verify(&self, token: &str) -> Result<Session, TokenError> {
        self.verify_at(token, unix_now())
    }

    /// Verify a token as if the current time were `now` (unix seconds).
    ///
    /// # Errors
    /// Returns error if the token is malformed, badly signed, expired or
    /// missing session fields.
    pub fn verify_at(&self, token: &str, now: u64) -> Result<Session, TokenError> {
        let mut parts = token.trim().split('.');
        let (Some(header), Some(claims), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TokenError::Malformed);
        };

        let signature = B64.decode(signature).map_err(|_| TokenError::Malformed)?;
        let signing_input = &token.trim()[..header.len() + 1 + claims.len()];
        self.mac(signing_input.as_bytes())?
            .verify_slice(&signature)
            .map_err(|_| TokenError::BadSignature)?;

        let header: Header = decode_part(header)?;
        if header.alg != ALGORITHM {
            return Err(TokenError::Algorithm(header.alg));
        }

        let claims: Claims = decode_part(claims)?;
        if claims.exp <= now {
            return Err(TokenError::Expired);
        }

        Ok(Session {
            host: claims.host,
            port: claims.port,
            username: claims.username,
            password: claims.password,
        })
    }

    fn mac(&self, data: &[u8]) -> Result<HmacSha256, TokenError> {
        let mut mac = HmacSha256::new_from_slice(&self.key).map_err(|_| TokenError::Key)?;
        mac.update(data);
        Ok(mac)
    }
}

fn decode_part<T: for<'de> Deserialize<'de>>(part: &str) -> Result<T, TokenError> {
    let bytes = B64.decode(part).map_err(|_| TokenError::Malformed)?;
    serde_json::from_slice(&bytes).map_err(|e| TokenError::Payload(e.to_string()))
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
