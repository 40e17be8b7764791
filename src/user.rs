//! User accounts and the registration endpoint.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use email_address::EmailAddress;
use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{password::RawPassword, AppConfig, DatabaseID, Error, PasswordHash};

/// The ID of a registered user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserID(DatabaseID);

impl UserID {
    /// Create a user ID from a raw integer.
    pub fn new(id: DatabaseID) -> Self {
        Self(id)
    }

    /// The underlying integer value.
    pub fn as_i64(&self) -> DatabaseID {
        self.0
    }
}

/// A registered user of the application.
///
/// All of a user's categories, transactions, and budgets reference the user
/// by ID and are invisible to every other user.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    id: UserID,
    email: EmailAddress,
    password_hash: PasswordHash,
}

impl User {
    /// Create a new user.
    ///
    /// Note that this does *not* add the user to the application database.
    pub fn new(id: UserID, email: EmailAddress, password_hash: PasswordHash) -> Self {
        Self {
            id,
            email,
            password_hash,
        }
    }

    /// The ID of the user.
    pub fn id(&self) -> UserID {
        self.id
    }

    /// The email address the user registered with.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// The user's hashed password.
    pub fn password_hash(&self) -> &PasswordHash {
        &self.password_hash
    }
}

/// Initialize the user table.
pub(crate) fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
            id INTEGER PRIMARY KEY,
            email TEXT UNIQUE NOT NULL,
            password TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

/// Create a new user in the database.
///
/// # Errors
/// This function will return an error if:
/// - the email is already in use ([Error::DuplicateEmail]),
/// - or there is some other SQL error.
pub fn create_user(
    email: EmailAddress,
    password_hash: PasswordHash,
    connection: &Connection,
) -> Result<User, Error> {
    connection.execute(
        "INSERT INTO user (email, password) VALUES (?1, ?2)",
        (email.as_str(), password_hash.as_ref()),
    )?;

    let id = UserID::new(connection.last_insert_rowid());

    Ok(User::new(id, email, password_hash))
}

/// Get the user that registered with `email`.
///
/// # Errors
/// This function will return [Error::NotFound] if no user has the specified
/// email, or an error if there is an SQL error.
pub fn get_user_by_email(email: &EmailAddress, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, email, password FROM user WHERE email = :email")?
        .query_row(&[(":email", email.as_str())], map_row)
        .map_err(|error| error.into())
}

fn map_row(row: &Row) -> Result<User, rusqlite::Error> {
    let id = UserID::new(row.get(0)?);

    let raw_email: String = row.get(1)?;
    let email = EmailAddress::new_unchecked(raw_email);

    let raw_password_hash: String = row.get(2)?;
    let password_hash = PasswordHash::new_unchecked(raw_password_hash);

    Ok(User::new(id, email, password_hash))
}

/// The data for registering a new user.
#[derive(Debug, Deserialize)]
pub struct RegisterData {
    /// The email address to register with.
    pub email: EmailAddress,
    /// The plain text password, validated before hashing.
    pub password: String,
}

/// A route handler for registering a new user.
///
/// Responds with the new user's ID and email. The password hash is never
/// serialized.
pub async fn register_user(
    State(config): State<AppConfig>,
    Json(data): Json<RegisterData>,
) -> Result<impl IntoResponse, Error> {
    let password = RawPassword::new(data.password)?;
    let password_hash = PasswordHash::new(&password)?;

    let connection = config.db_connection()?;
    let user = create_user(data.email, password_hash, &connection)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "id": user.id(),
            "email": user.email(),
        })),
    ))
}
