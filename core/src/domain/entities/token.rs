//! Token entities for JWT-based session credentials.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Opaque string metadata carried inside a token
pub type Metadata = HashMap<String, String>;

/// Kind of a token, fixed at mint time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Short-lived, presented on every request
    Access,
    /// Long-lived, only exchanged for a new pair
    Refresh,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Access => write!(f, "access"),
            TokenKind::Refresh => write!(f, "refresh"),
        }
    }
}

/// Claims structure for the signed JWT payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Owner of the session
    pub user_id: String,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub role: String,

    /// Token kind
    #[serde(rename = "type")]
    pub kind: TokenKind,

    /// Caller-supplied metadata, opaque to the token authority
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,

    /// JWT ID (unique identifier for the token)
    pub jti: String,

    /// Issuer
    pub iss: String,

    /// Subject (same as `user_id`)
    pub sub: String,

    /// Audience (the issuer itself)
    #[serde(deserialize_with = "one_or_many")]
    pub aud: Vec<String>,

    /// Issued at timestamp
    pub iat: i64,

    /// Not before timestamp
    pub nbf: i64,

    /// Expiration timestamp
    pub exp: i64,
}

impl Claims {
    /// Expiry as a timestamp
    pub fn expires_at(&self) -> DateTime<Utc> {
        timestamp(self.exp)
    }

    /// Earliest instant the token is accepted
    pub fn not_before(&self) -> DateTime<Utc> {
        timestamp(self.nbf)
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        timestamp(self.iat)
    }

    /// Whether `audience` is one of the token's audiences
    pub fn has_audience(&self, audience: &str) -> bool {
        self.aud.iter().any(|aud| aud == audience)
    }

    /// Checks if the claims have expired at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at()
    }

    /// Checks if the token is not yet valid at `now`
    pub fn is_premature_at(&self, now: DateTime<Utc>) -> bool {
        now < self.not_before()
    }
}

/// Claims read from a token without any verification.
///
/// Every field is attacker-controlled. This type exists so unverified data
/// can be inspected (error classification, diagnostics) without ever being
/// confused with [`Claims`] that passed signature verification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UnverifiedClaims {
    pub user_id: Option<String>,
    pub username: Option<String>,
    pub role: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<TokenKind>,
    pub metadata: Option<Metadata>,
    pub jti: Option<String>,
    pub iss: Option<String>,
    pub sub: Option<String>,
    #[serde(deserialize_with = "optional_one_or_many")]
    pub aud: Option<Vec<String>>,
    pub iat: Option<i64>,
    pub nbf: Option<i64>,
    pub exp: Option<i64>,
}

impl UnverifiedClaims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.map(timestamp)
    }

    pub fn not_before(&self) -> Option<DateTime<Utc>> {
        self.nbf.map(timestamp)
    }
}

/// Signed token plus denormalized copies of its identity and expiry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenArtifact {
    /// Compact serialized JWT
    pub token: String,

    #[serde(rename = "type")]
    pub kind: TokenKind,

    pub expires_at: DateTime<Utc>,

    pub user_id: String,

    pub username: String,

    pub role: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl TokenArtifact {
    /// Build the artifact for a signed token from its claims
    pub fn from_claims(token: String, claims: &Claims) -> Self {
        Self {
            token,
            kind: claims.kind,
            expires_at: claims.expires_at(),
            user_id: claims.user_id.clone(),
            username: claims.username.clone(),
            role: claims.role.clone(),
            metadata: claims.metadata.clone(),
        }
    }
}

/// Access and refresh tokens minted in the same call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: TokenArtifact,
    pub refresh_token: TokenArtifact,
}

fn timestamp(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl From<OneOrMany> for Vec<String> {
    fn from(value: OneOrMany) -> Self {
        match value {
            OneOrMany::One(single) => vec![single],
            OneOrMany::Many(many) => many,
        }
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    OneOrMany::deserialize(deserializer).map(Into::into)
}

fn optional_one_or_many<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<OneOrMany>::deserialize(deserializer).map(|value| value.map(Into::into))
}
