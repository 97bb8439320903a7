//! Sign-in form values.

use serde::{Deserialize, Serialize};

use crate::validation::{FieldErrors, char_len, is_email};

/// Minimum password length in characters.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Credentials entered on the sign-in form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginValues {
    /// Account email.
    pub email: String,
    /// Account password. Never checked against anything.
    pub password: String,
}

impl LoginValues {
    /// Checks the email shape and password length.
    ///
    /// # Errors
    ///
    /// Returns every field that failed.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        if self.email.trim().is_empty() {
            errors.check(false, "email", "Email is required");
        } else {
            errors.check(is_email(&self.email), "email", "Enter a valid email address");
        }
        errors.check(
            char_len(&self.password) >= MIN_PASSWORD_LENGTH,
            "password",
            "Password must be at least 6 characters",
        );
        errors.into_result()
    }
}
