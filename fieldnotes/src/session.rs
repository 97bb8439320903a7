//! Signed-in state of the local user.
//!
//! Sign-in only validates the shape of the credentials; nothing is checked
//! against an account.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use fieldnotes_proto::auth::LoginValues;
use fieldnotes_proto::validation::FieldErrors;

/// Errors returned by [`Session`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    /// The credentials failed validation.
    #[error("invalid credentials: {0}")]
    Invalid(#[from] FieldErrors),

    /// A signed-in session is required.
    #[error("sign in to continue")]
    SignedOut,
}

/// Shared authentication flag.
#[derive(Debug, Clone, Default)]
pub struct Session {
    authed: Arc<AtomicBool>,
}

impl Session {
    /// A signed-out session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Signs in after validating `values`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Invalid`] and stays signed out if the
    /// credentials are malformed.
    pub fn login(&self, values: &LoginValues) -> Result<(), SessionError> {
        values.validate()?;
        self.authed.store(true, Ordering::SeqCst);
        tracing::info!(email = %values.email.trim(), "signed in");
        Ok(())
    }

    /// Signs out.
    pub fn logout(&self) {
        if self.authed.swap(false, Ordering::SeqCst) {
            tracing::info!("signed out");
        }
    }

    /// Whether the user is signed in.
    #[must_use]
    pub fn is_authed(&self) -> bool {
        self.authed.load(Ordering::SeqCst)
    }

    /// Gate for screens that need a signed-in user.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::SignedOut`] when signed out.
    pub fn require_auth(&self) -> Result<(), SessionError> {
        if self.is_authed() {
            Ok(())
        } else {
            Err(SessionError::SignedOut)
        }
    }
}
