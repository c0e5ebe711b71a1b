//! Tests for the token services

mod service_tests;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

use crate::domain::entities::token::{Claims, TokenKind};
use crate::services::token::AutherConfig;

pub(super) const SECRET: &str = "unit-test-secret";
pub(super) const ISSUER: &str = "auther-test";

pub(super) fn test_config() -> AutherConfig {
    AutherConfig::new(SECRET)
        .with_issuer(ISSUER)
        .normalized()
        .unwrap()
}

/// Claims valid for an hour, as this service would mint them
pub(super) fn claims(kind: TokenKind) -> Claims {
    let now = Utc::now().timestamp();
    Claims {
        user_id: "user-1".to_string(),
        username: "alice".to_string(),
        role: "admin".to_string(),
        kind,
        metadata: None,
        jti: "test-jti".to_string(),
        iss: ISSUER.to_string(),
        sub: "user-1".to_string(),
        aud: vec![ISSUER.to_string()],
        iat: now,
        nbf: now,
        exp: now + 3600,
    }
}

pub(super) fn sign(claims: &Claims, secret: &str, algorithm: Algorithm) -> String {
    encode(
        &Header::new(algorithm),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

/// Builds a token with an arbitrary raw header and a junk signature
pub(super) fn forge(header_json: &str, claims: &Claims) -> String {
    let header = URL_SAFE_NO_PAD.encode(header_json.as_bytes());
    let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims).unwrap());
    format!("{}.{}.c2lnbmF0dXJl", header, payload)
}
