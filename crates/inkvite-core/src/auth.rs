//! Identity and authorization.
//!
//! Sessions never talk to an auth backend directly; they resolve a
//! [`Claims`] snapshot through an [`IdentityProvider`] before exposing
//! any privileged operation.

use crate::storage::BoxFuture;
use thiserror::Error;

/// Authorization errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Not signed in")]
    NotSignedIn,
    #[error("Admin access required")]
    AccessDenied,
    #[error("Auth error: {0}")]
    Other(String),
}

/// Resolved identity claims.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Claims {
    pub user_id: Option<String>,
    pub is_admin: bool,
}

impl Claims {
    /// Error unless the admin claim is present.
    pub fn require_admin(&self) -> Result<(), AuthError> {
        if self.is_admin {
            Ok(())
        } else {
            Err(AuthError::AccessDenied)
        }
    }

    /// The signed-in user id, or `NotSignedIn`.
    pub fn require_user(&self) -> Result<&str, AuthError> {
        self.user_id.as_deref().ok_or(AuthError::NotSignedIn)
    }
}

/// Source of the current identity claims.
pub trait IdentityProvider: Send + Sync {
    fn claims(&self) -> BoxFuture<'_, Result<Claims, AuthError>>;
}

/// Fixed identity, for tests and embedded single-user setups.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity {
    claims: Claims,
}

impl StaticIdentity {
    pub fn admin() -> Self {
        Self {
            claims: Claims {
                user_id: Some("admin".to_string()),
                is_admin: true,
            },
        }
    }

    pub fn user(user_id: &str) -> Self {
        Self {
            claims: Claims {
                user_id: Some(user_id.to_string()),
                is_admin: false,
            },
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }
}

impl IdentityProvider for StaticIdentity {
    fn claims(&self) -> BoxFuture<'_, Result<Claims, AuthError>> {
        let claims = self.claims.clone();
        Box::pin(async move { Ok(claims) })
    }
}
