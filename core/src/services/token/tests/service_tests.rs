//! Tests for the token service façade

use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::Algorithm;

use super::{claims, sign, test_config, ISSUER, SECRET};
use crate::domain::entities::token::TokenKind;
use crate::errors::{DomainError, TokenError, TokenErrorKind};
use crate::repositories::{InMemoryRevocationRegistry, RevocationRegistry};
use crate::services::token::{AutherConfig, AutherService};

fn service(revocation: bool) -> AutherService {
    AutherService::new(test_config().with_revocation(revocation)).unwrap()
}

#[tokio::test]
async fn test_missing_secret_rejected() {
    let err = AutherService::new(AutherConfig::default()).err().unwrap();
    assert!(matches!(err, DomainError::Configuration { .. }));
}

#[test]
fn test_revocation_needs_runtime() {
    let err = AutherService::new(test_config()).err().unwrap();
    assert!(matches!(err, DomainError::Configuration { .. }));

    // Without revocation there is no worker to spawn
    assert!(AutherService::new(test_config().with_revocation(false)).is_ok());
}

#[tokio::test]
async fn test_config_is_normalized() {
    let service = AutherService::new(AutherConfig::new("  padded  ").with_issuer("")).unwrap();
    assert_eq!(service.config().secret_key, "padded");
    assert_eq!(service.config().issuer, "conan");
    service.close().unwrap();
}

#[tokio::test]
async fn test_mint_access_uses_given_ttl() {
    let service = service(true);
    let artifact = service
        .mint_access("user-1", "alice", "admin", Duration::from_secs(90), None)
        .unwrap();

    assert_eq!(artifact.kind, TokenKind::Access);
    let claims = service.validate_access(&artifact.token).await.unwrap();
    assert_eq!(claims.exp - claims.iat, 90);
}

#[tokio::test]
async fn test_pair_uses_configured_lifetimes() {
    let service = AutherService::new(
        test_config()
            .with_access_ttl(Duration::from_secs(60))
            .with_refresh_ttl(Duration::from_secs(600)),
    )
    .unwrap();
    let pair = service.mint_pair("user-1", "alice", "admin", None).unwrap();

    let access = service.validate_access(&pair.access_token.token).await.unwrap();
    let refresh = service.validate_refresh(&pair.refresh_token.token).await.unwrap();
    assert_eq!(access.exp - access.iat, 60);
    assert_eq!(refresh.exp - refresh.iat, 600);
}

#[tokio::test]
async fn test_kind_specific_validation() {
    let service = service(true);
    let pair = service.mint_pair("user-1", "alice", "admin", None).unwrap();

    let err = service.validate_access(&pair.refresh_token.token).await.unwrap_err();
    assert_eq!(err.token_kind(), Some(TokenErrorKind::WrongTokenType));

    let err = service.validate_refresh(&pair.access_token.token).await.unwrap_err();
    assert_eq!(err.token_kind(), Some(TokenErrorKind::WrongTokenType));
}

#[tokio::test]
async fn test_revoke_then_validate() {
    let service = service(true);
    let pair = service.mint_pair("user-1", "alice", "admin", None).unwrap();

    service.revoke_token(&pair.access_token.token).await.unwrap();

    assert!(service.is_token_revoked(&pair.access_token.token).await.unwrap());
    assert!(!service.is_token_revoked(&pair.refresh_token.token).await.unwrap());
    assert_eq!(service.registry_size().await.unwrap(), 1);

    let err = service.validate(&pair.access_token.token).await.unwrap_err();
    assert_eq!(err.token_kind(), Some(TokenErrorKind::Revoked));
    assert!(service.validate(&pair.refresh_token.token).await.is_ok());
}

#[tokio::test]
async fn test_revoke_is_idempotent() {
    let service = service(true);
    let pair = service.mint_pair("user-1", "alice", "admin", None).unwrap();

    service.revoke_token(&pair.access_token.token).await.unwrap();
    service.revoke_token(&pair.access_token.token).await.unwrap();
    assert_eq!(service.registry_size().await.unwrap(), 1);
}

#[tokio::test]
async fn test_revoke_requires_own_signature() {
    let service = service(true);
    let foreign = sign(&claims(TokenKind::Access), "someone-elses-secret", Algorithm::HS256);

    let err = service.revoke_token(&foreign).await.unwrap_err();
    assert!(matches!(err, DomainError::Token(TokenError::InvalidSignature)));
    assert_eq!(service.registry_size().await.unwrap(), 0);
}

#[tokio::test]
async fn test_revoked_expired_token_is_swept() {
    let service = service(true);
    let mut expired = claims(TokenKind::Access);
    expired.exp -= 7200;
    let token = sign(&expired, SECRET, Algorithm::HS256);

    service.revoke_token(&token).await.unwrap();
    assert_eq!(service.registry_size().await.unwrap(), 1);
    // Entry outlived its token: no longer reported
    assert!(!service.is_token_revoked(&token).await.unwrap());

    assert_eq!(service.cleanup_expired_tokens().await.unwrap(), 1);
    assert_eq!(service.registry_size().await.unwrap(), 0);
}

#[tokio::test]
async fn test_disabled_revocation_is_degraded_mode() {
    let service = service(false);
    let pair = service.mint_pair("user-1", "alice", "admin", None).unwrap();

    service.revoke_token(&pair.access_token.token).await.unwrap();
    assert_eq!(service.registry_size().await.unwrap(), 0);
    assert!(!service.is_token_revoked(&pair.access_token.token).await.unwrap());
    assert!(service.validate(&pair.access_token.token).await.is_ok());
    assert_eq!(service.cleanup_expired_tokens().await.unwrap(), 0);
    assert!(!service.is_cleanup_running());
}

#[tokio::test]
async fn test_custom_registry_receives_revocations() {
    let registry = Arc::new(InMemoryRevocationRegistry::new());
    let service = AutherService::with_registry(
        test_config(),
        Arc::clone(&registry) as Arc<dyn RevocationRegistry>,
    )
    .unwrap();
    let pair = service.mint_pair("user-7", "bob", "member", None).unwrap();

    service.rotate(&pair.refresh_token.token).await.unwrap();

    let entry = registry.entry(&pair.refresh_token.token).await.unwrap();
    assert_eq!(entry.owner_user_id, "user-7");
    assert_eq!(registry.size().await.unwrap(), 1);
}

#[tokio::test]
async fn test_token_info_reads_without_verifying() {
    let service = service(true);
    let mut foreign = claims(TokenKind::Refresh);
    foreign.iss = "elsewhere".to_string();
    let token = sign(&foreign, "someone-elses-secret", Algorithm::HS256);

    let info = service.token_info(&token).unwrap();
    assert_eq!(info.iss.as_deref(), Some("elsewhere"));
    assert_eq!(info.kind, Some(TokenKind::Refresh));
    assert_eq!(info.aud, Some(vec![ISSUER.to_string()]));

    let err = service.token_info("garbage").unwrap_err();
    assert!(matches!(
        err,
        DomainError::Token(TokenError::InvalidTokenFormat { .. })
    ));
}

#[tokio::test]
async fn test_close_is_idempotent() {
    let service = service(true);
    assert!(service.is_cleanup_running());

    service.close().unwrap();
    service.close().unwrap();

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!service.is_cleanup_running());
    // Validation keeps working after close
    let pair = service.mint_pair("user-1", "alice", "admin", None).unwrap();
    assert!(service.validate(&pair.access_token.token).await.is_ok());
}

#[tokio::test]
async fn test_close_without_worker() {
    let service = service(false);
    service.close().unwrap();
    service.close().unwrap();
}
