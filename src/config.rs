//! Implements the state shared by all route handlers.

use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use jsonwebtoken::{DecodingKey, EncodingKey};
use rusqlite::Connection;

use crate::{auth::AuthError, Error};

#[derive(Clone)]
struct JwtKeys {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

/// The state of the REST server: the shared database connection and the keys
/// used to sign and verify auth tokens.
#[derive(Clone)]
pub struct AppConfig {
    db_connection: Arc<Mutex<Connection>>,
    jwt_keys: JwtKeys,
}

impl AppConfig {
    /// Create the app state from an open database connection and the secret
    /// used to sign auth tokens.
    pub fn new(db_connection: Connection, jwt_secret: String) -> AppConfig {
        AppConfig {
            db_connection: Arc::new(Mutex::new(db_connection)),
            jwt_keys: JwtKeys {
                encoding_key: EncodingKey::from_secret(jwt_secret.as_ref()),
                decoding_key: DecodingKey::from_secret(jwt_secret.as_ref()),
            },
        }
    }

    /// Acquire the lock on the shared database connection.
    ///
    /// # Errors
    /// Returns [Error::DatabaseLock] if the lock has been poisoned by a
    /// panicking thread.
    pub fn db_connection(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.db_connection.lock().map_err(|_| Error::DatabaseLock)
    }

    /// The encoding key for auth tokens.
    pub fn encoding_key(&self) -> &EncodingKey {
        &self.jwt_keys.encoding_key
    }

    /// The decoding key for auth tokens.
    pub fn decoding_key(&self) -> &DecodingKey {
        &self.jwt_keys.decoding_key
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AppConfig
where
    Self: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(_: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_ref(state))
    }
}
