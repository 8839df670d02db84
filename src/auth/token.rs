//! Bearer tokens
//!
//! Compact JWS with HS256: `base64url(header).base64url(claims).base64url(mac)`.
//! Only tokens this issuer signed are accepted; the header must name HS256.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::fmt;
use uuid::Uuid;

use crate::domain::{Admin, AdminRole};

type HmacSha256 = Hmac<Sha256>;

const HEADER: &str = r#"{"alg":"HS256","typ":"JWT"}"#;

#[derive(Debug, Deserialize)]
struct Header {
    alg: String,
}

/// Token payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Admin ID
    pub sub: Uuid,
    pub email: String,
    pub role: AdminRole,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiry (unix seconds)
    pub exp: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Malformed token")]
    Malformed,

    #[error("Unsupported token algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Token expired")]
    Expired,

    #[error("Invalid signing key")]
    InvalidKey,

    #[error("Token encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Issues and verifies bearer tokens with a shared secret
#[derive(Clone)]
pub struct TokenIssuer {
    secret: Vec<u8>,
    ttl: Duration,
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("secret", &"[REDACTED]")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenIssuer {
    pub fn new(secret: impl Into<Vec<u8>>, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            ttl,
        }
    }

    /// Issue a token for `admin`
    pub fn issue(&self, admin: &Admin) -> Result<String, TokenError> {
        self.issue_at(admin, Utc::now())
    }

    pub fn issue_at(&self, admin: &Admin, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = Claims {
            sub: admin.id,
            email: admin.email.clone(),
            role: admin.role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(HEADER),
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?)
        );
        let signature = self.sign(signing_input.as_bytes())?;

        Ok(format!(
            "{}.{}",
            signing_input,
            URL_SAFE_NO_PAD.encode(signature)
        ))
    }

    /// Verify signature and expiry, returning the claims
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, Utc::now())
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let (signing_input, signature) = token.rsplit_once('.').ok_or(TokenError::Malformed)?;
        let (header, payload) = signing_input
            .split_once('.')
            .filter(|(_, payload)| !payload.contains('.'))
            .ok_or(TokenError::Malformed)?;

        let header: Header = decode_json(header)?;
        if header.alg != "HS256" {
            return Err(TokenError::UnsupportedAlgorithm(header.alg));
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| TokenError::Malformed)?;
        let mut mac = HmacSha256::new_from_slice(&self.secret).map_err(|_| TokenError::InvalidKey)?;
        mac.update(signing_input.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::InvalidSignature)?;

        let claims: Claims = decode_json(payload)?;
        if claims.exp <= now.timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    fn sign(&self, data: &[u8]) -> Result<Vec<u8>, TokenError> {
        let mut mac = HmacSha256::new_from_slice(&self.secret).map_err(|_| TokenError::InvalidKey)?;
        mac.update(data);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

fn decode_json<T: serde::de::DeserializeOwned>(segment: &str) -> Result<T, TokenError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| TokenError::Malformed)?;
    serde_json::from_slice(&bytes).map_err(|_| TokenError::Malformed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new("test-secret", Duration::minutes(30))
    }

    fn admin() -> Admin {
        Admin::register(
            "ana@example.com".to_string(),
            "hash".to_string(),
            "Ana".to_string(),
            AdminRole::SuperAdmin,
        )
    }

    #[test]
    fn test_issue_then_verify() {
        let admin = admin();
        let token = issuer().issue(&admin).unwrap();
        assert_eq!(token.split('.').count(), 3);

        let claims = issuer().verify(&token).unwrap();
        assert_eq!(claims.sub, admin.id);
        assert_eq!(claims.email, "ana@example.com");
        assert_eq!(claims.role, AdminRole::SuperAdmin);
        assert_eq!(claims.exp - claims.iat, 30 * 60);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issuer().issue(&admin()).unwrap();
        let other = TokenIssuer::new("other-secret", Duration::minutes(30));
        assert!(matches!(other.verify(&token), Err(TokenError::InvalidSignature)));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let token = issuer().issue(&admin()).unwrap();
        let parts: Vec<&str> = token.split('.').collect();

        let mut claims: Claims =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(parts[1]).unwrap()).unwrap();
        claims.role = AdminRole::Admin;
        let forged = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).unwrap());
        let tampered = format!("{}.{}.{}", parts[0], forged, parts[2]);

        assert!(matches!(
            issuer().verify(&tampered),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let issued = Utc::now() - Duration::hours(1);
        let token = issuer().issue_at(&admin(), issued).unwrap();
        assert!(matches!(issuer().verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_malformed_tokens() {
        assert!(matches!(issuer().verify("abc"), Err(TokenError::Malformed)));
        assert!(matches!(issuer().verify("a.b.c.d"), Err(TokenError::Malformed)));
        assert!(matches!(issuer().verify("!!.??.##"), Err(TokenError::Malformed)));
    }

    #[test]
    fn test_none_algorithm_rejected() {
        let token = issuer().issue(&admin()).unwrap();
        let parts: Vec<&str> = token.split('.').collect();
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"none","typ":"JWT"}"#);
        let forged = format!("{}.{}.{}", header, parts[1], parts[2]);

        assert!(matches!(
            issuer().verify(&forged),
            Err(TokenError::UnsupportedAlgorithm(alg)) if alg == "none"
        ));
    }
}
