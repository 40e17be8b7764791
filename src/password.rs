//! Password validation and hashing for user accounts.

use bcrypt::{hash, verify, DEFAULT_COST};
use serde::{Deserialize, Serialize};

use crate::Error;

/// The minimum number of characters a password must have.
const MIN_PASSWORD_LENGTH: usize = 8;

/// A password that has been validated, but not yet hashed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPassword(String);

impl RawPassword {
    /// Create a new password from a string.
    ///
    /// # Errors
    /// This function will return an error if the password is shorter than
    /// eight characters.
    pub fn new(raw_password_string: String) -> Result<Self, Error> {
        if raw_password_string.chars().count() < MIN_PASSWORD_LENGTH {
            Err(Error::Validation {
                field: "password",
                message: format!(
                    "password must be at least {MIN_PASSWORD_LENGTH} characters long"
                ),
            })
        } else {
            Ok(Self(raw_password_string))
        }
    }

    /// Create a new `RawPassword` without any validation.
    ///
    /// The caller should ensure the string meets the password requirements.
    /// This function has `_unchecked` in the name but is not `unsafe`,
    /// because violating the length invariant will cause incorrect behaviour
    /// but not affect memory safety.
    pub fn new_unchecked(raw_password_string: String) -> Self {
        Self(raw_password_string)
    }
}

impl AsRef<str> for RawPassword {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl AsRef<[u8]> for RawPassword {
    fn as_ref(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

/// A bcrypt hash of a user's password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Hash a validated password.
    ///
    /// # Errors
    /// This function will return an error if the password could not be
    /// hashed.
    pub fn new(raw_password: &RawPassword) -> Result<Self, Error> {
        hash::<&str>(raw_password.as_ref(), DEFAULT_COST)
            .map(Self)
            .map_err(|error| Error::HashingError(error.to_string()))
    }

    /// Create a new `PasswordHash` without hashing or validation.
    ///
    /// This should only be called on strings coming from a trusted source
    /// such as the application's database.
    pub fn new_unchecked(raw_password_hash: String) -> Self {
        Self(raw_password_hash)
    }

    /// Check that `raw_password` matches the stored password.
    ///
    /// # Errors
    /// This function will return an error if the stored hash is not a valid
    /// bcrypt hash.
    pub fn verify(&self, raw_password: &RawPassword) -> Result<bool, Error> {
        verify::<&str>(raw_password.as_ref(), &self.0)
            .map_err(|error| Error::HashingError(error.to_string()))
    }
}

impl AsRef<str> for PasswordHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
