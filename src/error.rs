//! Defines the app level error type and its conversion to JSON responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A request field failed validation. The client should fix the named
    /// field and try again.
    #[error("{field}: {message}")]
    Validation {
        /// The name of the offending request field.
        field: &'static str,
        /// Why the field was rejected.
        message: String,
    },

    /// A category with the same name and type already exists for this user.
    #[error("a category with this name and type already exists")]
    DuplicateCategory,

    /// A budget for the same year and month already exists for this user.
    #[error("a budget for this month already exists")]
    DuplicateBudget,

    /// A user with the same email already exists.
    #[error("a user with this email already exists")]
    DuplicateEmail,

    /// The category referenced by a transaction does not exist for the
    /// requesting user.
    ///
    /// This error is also returned when the category exists but belongs to
    /// another user, so the response does not reveal whether the row exists.
    #[error("the given ID does not refer to a valid category")]
    InvalidCategory,

    /// Tried to delete a category that is still referenced by transactions.
    #[error("the category is referenced by one or more transactions")]
    CategoryInUse,

    /// The requested resource was not found.
    ///
    /// Rows owned by other users are reported with this error as well, so a
    /// client cannot distinguish them from rows that do not exist.
    #[error("the requested resource could not be found")]
    NotFound,

    /// A foreign key constraint failed.
    #[error("a foreign key constraint failed")]
    ForeignKeyViolation,

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server,
    /// never sent to the client.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLock,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 787 occurs when a FOREIGN KEY constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(_))
                if sql_error.extended_code == 787 =>
            {
                Error::ForeignKeyViolation
            }
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("category.") =>
            {
                Error::DuplicateCategory
            }
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("budget.") =>
            {
                Error::DuplicateBudget
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => Error::SqlError(error),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::Validation { field, message } => field_error_response(field, message),
            Error::DuplicateCategory => {
                field_error_response("non_field_errors", self.to_string())
            }
            Error::DuplicateBudget => field_error_response("non_field_errors", self.to_string()),
            Error::DuplicateEmail => field_error_response("email", self.to_string()),
            Error::InvalidCategory => field_error_response("category", self.to_string()),
            Error::CategoryInUse => (
                StatusCode::CONFLICT,
                Json(json!({
                    "error": self.to_string(),
                })),
            )
                .into_response(),
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": "The requested resource could not be found.",
                })),
            )
                .into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);

                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Internal server error",
                    })),
                )
                    .into_response()
            }
        }
    }
}

/// Build a 400 response with a per-field error body, e.g.
/// `{"month": ["month must be between 1 and 12"]}`.
fn field_error_response(field: &str, message: String) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            field: [message],
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn sqlite_unique_email_maps_to_duplicate_email() {
        let error = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(2067),
            Some("UNIQUE constraint failed: user.email".to_string()),
        );

        assert_eq!(Error::from(error), Error::DuplicateEmail);
    }

    #[test]
    fn sqlite_unique_category_maps_to_duplicate_category() {
        let error = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(2067),
            Some(
                "UNIQUE constraint failed: category.user_id, category.name, category.type"
                    .to_string(),
            ),
        );

        assert_eq!(Error::from(error), Error::DuplicateCategory);
    }

    #[test]
    fn sqlite_foreign_key_maps_to_foreign_key_violation() {
        let error = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(787),
            Some("FOREIGN KEY constraint failed".to_string()),
        );

        assert_eq!(Error::from(error), Error::ForeignKeyViolation);
    }

    #[test]
    fn sqlite_no_rows_maps_to_not_found() {
        assert_eq!(
            Error::from(rusqlite::Error::QueryReturnedNoRows),
            Error::NotFound
        );
    }
}
