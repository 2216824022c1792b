//! Clerk session token validation.
//!
//! Implements the `SessionValidator` port against Clerk-issued session JWTs:
//!
//! 1. Fetches JWKS from the instance's well-known endpoint
//! 2. Validates the token signature against the published keys
//! 3. Validates issuer and expiry claims
//! 4. Maps the subject and plan claims to an `AuthSession`
//!
//! The `pla` claim carries the caller's billing plan (e.g. `u:premium`);
//! it feeds the entitlement check that routes use via `AuthSession::has_plan`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::{
    decode, decode_header, jwk::JwkSet, Algorithm, DecodingKey, TokenData, Validation,
};
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::domain::marketplace::UserId;
use crate::ports::{AuthError, AuthSession, SessionValidator};

/// Configuration for the Clerk session validator.
#[derive(Debug, Clone)]
pub struct ClerkConfig {
    /// JWKS endpoint publishing the instance's signing keys.
    pub jwks_url: String,

    /// Expected `iss` claim on session tokens.
    pub issuer: String,

    /// How long to cache JWKS before refetching. Defaults to 1 hour.
    pub jwks_cache_duration: Option<Duration>,
}

impl ClerkConfig {
    pub fn new(jwks_url: impl Into<String>, issuer: impl Into<String>) -> Self {
        Self {
            jwks_url: jwks_url.into(),
            issuer: issuer.into(),
            jwks_cache_duration: None,
        }
    }

    pub fn with_cache_duration(mut self, duration: Duration) -> Self {
        self.jwks_cache_duration = Some(duration);
        self
    }
}

/// Claims on a Clerk session token.
#[derive(Debug, Deserialize)]
struct ClerkClaims {
    /// Subject - the user id
    sub: String,

    /// Issuer URL
    iss: String,

    /// Expiry timestamp (Unix epoch seconds)
    #[allow(dead_code)]
    exp: i64,

    /// Billing plan claim, e.g. `u:premium`
    #[serde(default)]
    pla: Option<String>,
}

/// Parse the `pla` claim into bare plan names.
///
/// Clerk scopes the value (`u:` for user plans, `o:` for org plans) and may
/// list several separated by whitespace.
fn parse_plans(pla: Option<&str>) -> Vec<String> {
    pla.unwrap_or_default()
        .split_whitespace()
        .map(|entry| {
            entry
                .split_once(':')
                .map(|(_, plan)| plan)
                .unwrap_or(entry)
                .to_string()
        })
        .filter(|plan| !plan.is_empty())
        .collect()
}

/// Cached JWKS with expiry tracking.
struct JwksCache {
    jwks: JwkSet,
    fetched_at: Instant,
    cache_duration: Duration,
}

impl JwksCache {
    fn new(jwks: JwkSet, cache_duration: Duration) -> Self {
        Self {
            jwks,
            fetched_at: Instant::now(),
            cache_duration,
        }
    }

    fn is_expired(&self) -> bool {
        self.fetched_at.elapsed() > self.cache_duration
    }
}

/// Clerk session validator.
///
/// Production implementation of `SessionValidator`.
pub struct ClerkSessionValidator {
    config: ClerkConfig,
    http_client: reqwest::Client,
    jwks_cache: Arc<RwLock<Option<JwksCache>>>,
}

impl ClerkSessionValidator {
    /// Create a new Clerk validator.
    ///
    /// Keys are fetched lazily on first validation to avoid blocking startup.
    pub fn new(config: ClerkConfig) -> Result<Self, AuthError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AuthError::ServiceUnavailable(e.to_string()))?;

        Ok(Self {
            config,
            http_client,
            jwks_cache: Arc::new(RwLock::new(None)),
        })
    }

    async fn fetch_jwks(&self) -> Result<JwkSet, AuthError> {
        let url = &self.config.jwks_url;

        tracing::debug!("Fetching JWKS from {}", url);

        let response = self.http_client.get(url).send().await.map_err(|e| {
            tracing::error!("Failed to fetch JWKS: {}", e);
            AuthError::ServiceUnavailable(format!("Failed to fetch JWKS: {}", e))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::error!("JWKS endpoint returned {}", status);
            return Err(AuthError::ServiceUnavailable(format!(
                "JWKS endpoint returned {}",
                status
            )));
        }

        let jwks: JwkSet = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse JWKS: {}", e);
            AuthError::ServiceUnavailable(format!("Failed to parse JWKS: {}", e))
        })?;

        tracing::debug!("Fetched {} keys from JWKS", jwks.keys.len());

        Ok(jwks)
    }

    /// Get JWKS, using cache if available and not expired.
    async fn get_jwks(&self) -> Result<JwkSet, AuthError> {
        {
            let cache = self.jwks_cache.read().await;
            if let Some(ref cached) = *cache {
                if !cached.is_expired() {
                    return Ok(cached.jwks.clone());
                }
            }
        }

        let jwks = self.fetch_jwks().await?;

        {
            let mut cache = self.jwks_cache.write().await;
            let duration = self
                .config
                .jwks_cache_duration
                .unwrap_or(Duration::from_secs(3600));
            *cache = Some(JwksCache::new(jwks.clone(), duration));
        }

        Ok(jwks)
    }

    fn find_decoding_key(
        &self,
        header: &jsonwebtoken::Header,
        jwks: &JwkSet,
    ) -> Result<(DecodingKey, Algorithm), AuthError> {
        let kid = header.kid.as_ref().ok_or_else(|| {
            tracing::warn!("Session token missing 'kid' header");
            AuthError::InvalidToken
        })?;

        let jwk = jwks.find(kid).ok_or_else(|| {
            tracing::warn!("No matching key found for kid: {}", kid);
            AuthError::InvalidToken
        })?;

        let algorithm = match jwk.common.key_algorithm {
            Some(jsonwebtoken::jwk::KeyAlgorithm::RS256) => Algorithm::RS256,
            Some(jsonwebtoken::jwk::KeyAlgorithm::RS384) => Algorithm::RS384,
            Some(jsonwebtoken::jwk::KeyAlgorithm::RS512) => Algorithm::RS512,
            Some(other) => {
                tracing::warn!("Unsupported algorithm: {:?}", other);
                return Err(AuthError::InvalidToken);
            }
            // Clerk signs with RS256
            None => Algorithm::RS256,
        };

        let decoding_key = DecodingKey::from_jwk(jwk).map_err(|e| {
            tracing::warn!("Failed to create decoding key: {}", e);
            AuthError::InvalidToken
        })?;

        Ok((decoding_key, algorithm))
    }

    fn validate_token(
        &self,
        token: &str,
        decoding_key: &DecodingKey,
        algorithm: Algorithm,
    ) -> Result<TokenData<ClerkClaims>, AuthError> {
        let mut validation = Validation::new(algorithm);
        validation.set_issuer(&[&self.config.issuer]);
        validation.validate_exp = true;
        // Clerk session tokens carry no audience claim
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        decode::<ClerkClaims>(token, decoding_key, &validation).map_err(|e| {
            use jsonwebtoken::errors::ErrorKind;
            match e.kind() {
                ErrorKind::ExpiredSignature => {
                    tracing::debug!("Session token expired");
                    AuthError::TokenExpired
                }
                ErrorKind::InvalidIssuer => {
                    tracing::warn!("Invalid issuer in session token");
                    AuthError::InvalidToken
                }
                _ => {
                    tracing::warn!("Session token validation failed: {}", e);
                    AuthError::InvalidToken
                }
            }
        })
    }
}

#[async_trait]
impl SessionValidator for ClerkSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthSession, AuthError> {
        let header = decode_header(token).map_err(|e| {
            tracing::debug!("Failed to decode session token header: {}", e);
            AuthError::InvalidToken
        })?;

        let jwks = self.get_jwks().await?;
        let (decoding_key, algorithm) = self.find_decoding_key(&header, &jwks)?;
        let token_data = self.validate_token(token, &decoding_key, algorithm)?;
        let claims = token_data.claims;

        if claims.iss != self.config.issuer {
            tracing::warn!(
                "Issuer mismatch after validation: expected '{}', got '{}'",
                self.config.issuer,
                claims.iss
            );
            return Err(AuthError::InvalidToken);
        }

        let user_id = UserId::new(&claims.sub).map_err(|_| {
            tracing::warn!("Invalid subject in session token: {}", claims.sub);
            AuthError::InvalidToken
        })?;

        Ok(AuthSession::new(
            user_id,
            parse_plans(claims.pla.as_deref()),
        ))
    }
}

impl std::fmt::Debug for ClerkSessionValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClerkSessionValidator")
            .field("jwks_url", &self.config.jwks_url)
            .field("issuer", &self.config.issuer)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ════════════════════════════════════════════════════════════════════════════
    // Plan Claim Parsing Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn parse_plans_strips_scope_prefix() {
        assert_eq!(parse_plans(Some("u:premium")), vec!["premium"]);
        assert_eq!(parse_plans(Some("o:enterprise")), vec!["enterprise"]);
    }

    #[test]
    fn parse_plans_handles_multiple_entries() {
        assert_eq!(
            parse_plans(Some("u:premium o:team")),
            vec!["premium", "team"]
        );
    }

    #[test]
    fn parse_plans_accepts_bare_names() {
        assert_eq!(parse_plans(Some("premium")), vec!["premium"]);
    }

    #[test]
    fn parse_plans_empty_claim_yields_no_plans() {
        assert!(parse_plans(None).is_empty());
        assert!(parse_plans(Some("")).is_empty());
        assert!(parse_plans(Some("   ")).is_empty());
    }

    // ════════════════════════════════════════════════════════════════════════════
    // JWKS Cache Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn jwks_cache_not_expired_initially() {
        let jwks = JwkSet { keys: vec![] };
        let cache = JwksCache::new(jwks, Duration::from_secs(3600));
        assert!(!cache.is_expired());
    }

    #[test]
    fn jwks_cache_expires_after_duration() {
        let jwks = JwkSet { keys: vec![] };
        let cache = JwksCache::new(jwks, Duration::from_millis(1));
        std::thread::sleep(Duration::from_millis(10));
        assert!(cache.is_expired());
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Type Safety Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn clerk_validator_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ClerkSessionValidator>();
    }
}
