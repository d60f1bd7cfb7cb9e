//! Inkvite Session Library
//!
//! The lifecycle layer over core and render: opening a template against
//! the stores, validating and saving, generating preview thumbnails,
//! and the restricted end-user editing flow.

pub mod create;
pub mod edit;
pub mod paths;
pub mod user;

pub use create::{AdminCreateSession, CreatePhase};
pub use edit::{AdminEditSession, SaveOutcome};
pub use user::UserEditSession;

use inkvite_core::{AuthError, StorageError};
use inkvite_render::RenderError;
use thiserror::Error;

/// A single local validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Title is required")]
    MissingTitle,
    #[error("Choose a category")]
    UnknownSubcategory,
    #[error("A background image is required")]
    MissingBackground,
}

/// Session errors.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("Validation failed")]
    Validation(Vec<ValidationError>),
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;
