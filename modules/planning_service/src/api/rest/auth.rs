//! Bearer token authentication
//!
//! Tokens are issued by the external identity provider and signed HS256 with
//! a shared secret. Verified claims become the [`AuthContext`] handed to the
//! service.

use super::error::{map_domain_error, Problem};
use crate::contract::{AuthContext, PlanningError, Role};
use axum::{extract::FromRequestParts, http::request::Parts};
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Claims carried by identity provider tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject identifier
    pub sub: String,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Role names; unknown roles are ignored
    #[serde(default)]
    pub roles: Vec<String>,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

impl From<Claims> for AuthContext {
    fn from(claims: Claims) -> Self {
        let roles = claims
            .roles
            .iter()
            .filter_map(|name| Role::parse(name))
            .collect();
        Self {
            subject: claims.sub,
            display_name: claims.name,
            roles,
        }
    }
}

/// Verifies identity provider tokens
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    /// Verifier for HS256 tokens signed with `secret`; when `issuer` is set
    /// the `iss` claim must match it
    pub fn new(secret: &str, issuer: Option<&str>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        if let Some(issuer) = issuer {
            validation.set_issuer(&[issuer]);
        }
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Decode and check a token
    pub fn verify(&self, token: &str) -> Result<AuthContext, Problem> {
        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(|err| {
            let reason = match err.kind() {
                ErrorKind::ExpiredSignature => "Token expired",
                ErrorKind::InvalidSignature => "Invalid signature",
                ErrorKind::InvalidIssuer => "Invalid issuer",
                _ => "Invalid token",
            };
            debug!(error = %err, "rejected bearer token");
            Problem::unauthorized(reason)
        })?;
        Ok(data.claims.into())
    }

    /// Verify the `Authorization: Bearer` header of a request
    pub fn authenticate(&self, parts: &Parts) -> Result<AuthContext, Problem> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .ok_or_else(|| Problem::unauthorized("Missing Authorization header"))?;
        let token = header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| Problem::unauthorized("Expected a Bearer token"))?;
        self.verify(token)
    }
}

/// Extractor for the authenticated caller
///
/// Requires an `Extension<Arc<JwtVerifier>>` layer on the router.
#[derive(Debug, Clone)]
pub struct Authenticated(pub AuthContext);

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = Problem;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let verifier = parts
            .extensions
            .get::<Arc<JwtVerifier>>()
            .cloned()
            .ok_or_else(|| {
                tracing::error!("JwtVerifier extension missing from router");
                map_domain_error(PlanningError::Internal)
            })?;
        verifier
            .authenticate(parts)
            .map(Authenticated)
            .map_err(|problem| problem.with_instance(parts.uri.path()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-secret-with-enough-length-0123456789";

    fn token(roles: &[&str], exp_offset: i64, iss: Option<&str>) -> String {
        let exp = (chrono::Utc::now().timestamp() + exp_offset) as u64;
        let claims = Claims {
            sub: "user-1".to_string(),
            name: Some("Ana Planner".to_string()),
            roles: roles.iter().map(|r| r.to_string()).collect(),
            exp,
            iss: iss.map(String::from),
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn verifies_roles_and_ignores_unknown_ones() {
        let verifier = JwtVerifier::new(SECRET, None);
        let ctx = verifier
            .verify(&token(&["PLANNER", "SUPERUSER"], 3600, None))
            .unwrap();
        assert_eq!(ctx.subject, "user-1");
        assert_eq!(ctx.display_name.as_deref(), Some("Ana Planner"));
        assert_eq!(ctx.roles, vec![Role::Planner]);
    }

    #[test]
    fn rejects_expired_and_foreign_tokens() {
        let verifier = JwtVerifier::new(SECRET, None);
        let expired = verifier.verify(&token(&["ADMIN"], -3600, None)).unwrap_err();
        assert_eq!(expired.status, 401);
        assert_eq!(expired.detail.as_deref(), Some("Token expired"));

        let other = JwtVerifier::new("another-secret-with-enough-length-xyz", None);
        assert!(other.verify(&token(&["ADMIN"], 3600, None)).is_err());
    }

    #[test]
    fn checks_issuer_when_configured() {
        let verifier = JwtVerifier::new(SECRET, Some("https://idp.example"));
        assert!(verifier
            .verify(&token(&["ADMIN"], 3600, Some("https://idp.example")))
            .is_ok());
        assert!(verifier
            .verify(&token(&["ADMIN"], 3600, Some("https://other.example")))
            .is_err());
    }
}
