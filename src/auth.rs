//! # Authentication and Authorization
//!
//! Identity-provider sessions arrive as signed JWTs, either as a bearer token
//! or in the session cookie. Each request resolves to an [`AuthState`], and
//! handlers pick the gate they need:
//!
//! | gate                | Unauthenticated | Unregistered | PENDING / BLOCKED | ACTIVE | ACTIVE + ADMIN |
//! |---------------------|-----------------|--------------|-------------------|--------|----------------|
//! | `require_session`   | 401             | ok           | ok                | ok     | ok             |
//! | `require_registered`| 401             | 404          | ok                | ok     | ok             |
//! | `require_active`    | 401             | 403          | 403               | ok     | ok             |
//! | `require_admin`     | 401             | 403          | 403               | 403    | ok             |

use axum::{
    extract::FromRequestParts,
    http::{
        HeaderMap,
        header::{AUTHORIZATION, COOKIE},
        request::Parts,
    },
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AppConfig;
use crate::error::{ApiError, forbidden, forbidden_with_code, not_found, unauthorized};
use crate::models::user::{Model as UserModel, UserRole, UserStatus};
use crate::repositories::UserRepository;
use crate::server::AppState;

/// Claims carried by an identity-provider session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Identity-provider user id
    pub sub: String,
    /// Expiry (seconds since the epoch)
    pub exp: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
}

/// A verified identity-provider session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub claims: SessionClaims,
}

impl Session {
    pub fn external_id(&self) -> &str {
        &self.claims.sub
    }
}

/// Errors raised while building the verifier or checking a token
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no session verification key configured")]
    NoKey,
    #[error("session key is invalid: {0}")]
    InvalidKey(#[source] jsonwebtoken::errors::Error),
    #[error("session token rejected: {0}")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),
}

/// Verifies session tokens against the configured key
pub struct SessionVerifier {
    key: Option<DecodingKey>,
    validation: Validation,
    cookie_name: String,
}

impl SessionVerifier {
    /// HS256 with `SESSION_SECRET`, or RS256 with `SESSION_PUBLIC_KEY_PEM`.
    /// Without either key every token is rejected.
    pub fn from_config(config: &AppConfig) -> Result<Self, SessionError> {
        let (key, algorithm) = match (&config.session_secret, &config.session_public_key_pem) {
            (Some(secret), _) => (
                Some(DecodingKey::from_secret(secret.as_bytes())),
                Algorithm::HS256,
            ),
            (None, Some(pem)) => (
                Some(DecodingKey::from_rsa_pem(pem.as_bytes()).map_err(SessionError::InvalidKey)?),
                Algorithm::RS256,
            ),
            (None, None) => (None, Algorithm::HS256),
        };

        let mut validation = Validation::new(algorithm);
        validation.set_required_spec_claims(&["exp", "sub"]);
        if let Some(issuer) = &config.session_issuer {
            validation.set_issuer(&[issuer]);
        }

        Ok(Self {
            key,
            validation,
            cookie_name: config.session_cookie_name.clone(),
        })
    }

    pub fn verify(&self, token: &str) -> Result<Session, SessionError> {
        let key = self.key.as_ref().ok_or(SessionError::NoKey)?;
        let data = decode::<SessionClaims>(token, key, &self.validation)
            .map_err(SessionError::InvalidToken)?;
        Ok(Session {
            claims: data.claims,
        })
    }

    /// Bearer token if present, otherwise the session cookie.
    pub fn token_from_headers<'h>(&self, headers: &'h HeaderMap) -> Option<&'h str> {
        bearer_token(headers).or_else(|| cookie_value(headers, &self.cookie_name))
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn cookie_value<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

/// Request-scoped authentication state
#[derive(Debug, Clone)]
pub enum AuthState {
    Unauthenticated,
    Unregistered { session: Session },
    Registered { session: Session, user: UserModel },
}

impl AuthState {
    /// Any verified session, registered or not.
    pub fn require_session(self) -> Result<Session, ApiError> {
        match self {
            AuthState::Unauthenticated => Err(unauthorized(Some("Sign in required"))),
            AuthState::Unregistered { session } | AuthState::Registered { session, .. } => {
                Ok(session)
            }
        }
    }

    /// A user record exists, whatever its status.
    pub fn require_registered(self) -> Result<UserModel, ApiError> {
        match self {
            AuthState::Unauthenticated => Err(unauthorized(Some("Sign in required"))),
            AuthState::Unregistered { .. } => Err(not_found(
                "USER_NOT_REGISTERED",
                "No user record exists for this session",
            )),
            AuthState::Registered { user, .. } => Ok(user),
        }
    }

    /// A registered user whose account has been approved.
    pub fn require_active(self) -> Result<UserModel, ApiError> {
        match self {
            AuthState::Unauthenticated => Err(unauthorized(Some("Sign in required"))),
            AuthState::Unregistered { .. } => Err(forbidden_with_code(
                "USER_NOT_REGISTERED",
                "Complete registration before performing this action",
            )),
            AuthState::Registered { user, .. } => match user.status {
                UserStatus::Active => Ok(user),
                UserStatus::Pending => Err(forbidden_with_code(
                    "ACCOUNT_PENDING",
                    "Account is awaiting approval",
                )),
                UserStatus::Blocked => {
                    Err(forbidden_with_code("ACCOUNT_BLOCKED", "Account is blocked"))
                }
            },
        }
    }

    /// An active administrator.
    pub fn require_admin(self) -> Result<UserModel, ApiError> {
        let user = self.require_active()?;
        match user.role {
            UserRole::Admin => Ok(user),
            UserRole::Standard => Err(forbidden(Some("Administrator role required"))),
        }
    }
}

impl FromRequestParts<AppState> for AuthState {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = state.session.token_from_headers(&parts.headers) else {
            return Ok(AuthState::Unauthenticated);
        };

        let session = match state.session.verify(token) {
            Ok(session) => session,
            Err(err) => {
                tracing::debug!(error = %err, "Ignoring unusable session token");
                return Ok(AuthState::Unauthenticated);
            }
        };

        let user = UserRepository::new(&state.db)
            .find_by_external_id(session.external_id())
            .await?;

        Ok(match user {
            Some(user) => AuthState::Registered { session, user },
            None => AuthState::Unregistered { session },
        })
    }
}
