//! Categories group transactions and mark them as income or expense.

use std::{fmt::Display, str::FromStr};

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use rusqlite::{
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
    Connection, Row, ToSql,
};
use serde::{Deserialize, Serialize};

use crate::{auth::Claims, user::UserID, AppConfig, DatabaseID, Error};

/// The maximum number of characters a category name may have.
const MAX_NAME_LENGTH: usize = 64;

/// Whether a category records money earned or money spent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryType {
    /// Money earned, e.g. wages.
    Income,
    /// Money spent, e.g. groceries.
    Expense,
}

impl CategoryType {
    /// The type as the lowercase string stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl FromStr for CategoryType {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            _ => Err(Error::Validation {
                field: "type",
                message: format!("\"{text}\" is not a valid choice"),
            }),
        }
    }
}

impl Display for CategoryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ToSql for CategoryType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for CategoryType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse::<CategoryType>()
            .map_err(|_| FromSqlError::InvalidType)
    }
}

/// The name of a category.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// # Errors
    /// This function will return an error if `name` is an empty string or
    /// longer than 64 characters.
    pub fn new(name: &str) -> Result<Self, Error> {
        if name.is_empty() {
            return Err(Error::Validation {
                field: "name",
                message: "this field may not be blank".to_string(),
            });
        }

        if name.chars().count() > MAX_NAME_LENGTH {
            return Err(Error::Validation {
                field: "name",
                message: format!("ensure this field has no more than {MAX_NAME_LENGTH} characters"),
            });
        }

        Ok(Self(name.to_string()))
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because if the invariant is violated it will cause incorrect behaviour but not affect memory safety.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A category for expenses and income, e.g., 'Groceries', 'Eating Out', 'Wages'.
///
/// The owning user is tracked in the database but never serialized; every
/// query takes the owner's ID and filters on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// The ID of the category.
    pub id: DatabaseID,
    /// The name of the category.
    pub name: CategoryName,
    /// Whether the category records income or expenses.
    #[serde(rename = "type")]
    pub category_type: CategoryType,
}

/// The client-supplied fields for creating or fully replacing a category.
///
/// Raw strings are validated in the route handlers so that errors name the
/// offending field.
#[derive(Debug, Deserialize)]
pub struct CategoryData {
    /// The name of the category.
    pub name: String,
    /// `"income"` or `"expense"`.
    #[serde(rename = "type")]
    pub category_type: String,
}

/// The client-supplied fields for partially updating a category. Absent
/// fields keep their current values.
#[derive(Debug, Default, Deserialize)]
pub struct CategoryPatch {
    /// The new name, if it should change.
    pub name: Option<String>,
    /// The new type, if it should change.
    #[serde(rename = "type")]
    pub category_type: Option<String>,
}

/// Initialize the category table.
///
/// The `(user_id, name, type)` triple is unique per user.
pub(crate) fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            type TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
            UNIQUE(user_id, name, type)
        )",
        (),
    )?;

    Ok(())
}

/// Create a category owned by `user_id` and return it with its generated ID.
///
/// # Errors
/// This function will return an error if:
/// - the user already has a category with the same name and type
///   ([Error::DuplicateCategory]),
/// - or there is some other SQL error.
pub fn create_category(
    user_id: UserID,
    name: CategoryName,
    category_type: CategoryType,
    connection: &Connection,
) -> Result<Category, Error> {
    connection.execute(
        "INSERT INTO category (user_id, name, type) VALUES (?1, ?2, ?3)",
        (user_id.as_i64(), name.as_ref(), category_type),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Category {
        id,
        name,
        category_type,
    })
}

/// Retrieve a single category owned by `user_id`.
///
/// # Errors
/// This function will return [Error::NotFound] if the category does not
/// exist or belongs to another user.
pub fn get_category(
    user_id: UserID,
    category_id: DatabaseID,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .prepare("SELECT id, name, type FROM category WHERE id = ?1 AND user_id = ?2")?
        .query_row((category_id, user_id.as_i64()), map_row)
        .map_err(|error| error.into())
}

/// Retrieve all of `user_id`'s categories ordered alphabetically by name.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn get_all_categories(user_id: UserID, connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare("SELECT id, name, type FROM category WHERE user_id = ?1 ORDER BY name ASC")?
        .query_map((user_id.as_i64(),), map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Replace the name and type of a category owned by `user_id`.
///
/// # Errors
/// This function will return an error if:
/// - the category does not exist or belongs to another user
///   ([Error::NotFound]),
/// - the new name and type collide with another of the user's categories
///   ([Error::DuplicateCategory]),
/// - or there is some other SQL error.
pub fn update_category(
    user_id: UserID,
    category_id: DatabaseID,
    name: CategoryName,
    category_type: CategoryType,
    connection: &Connection,
) -> Result<Category, Error> {
    let rows_affected = connection.execute(
        "UPDATE category SET name = ?1, type = ?2 WHERE id = ?3 AND user_id = ?4",
        (name.as_ref(), category_type, category_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(Category {
        id: category_id,
        name,
        category_type,
    })
}

/// Delete a category owned by `user_id`.
///
/// # Errors
/// This function will return an error if:
/// - the category does not exist or belongs to another user
///   ([Error::NotFound]),
/// - the category is still referenced by one or more transactions
///   ([Error::CategoryInUse]),
/// - or there is some other SQL error.
pub fn delete_category(
    user_id: UserID,
    category_id: DatabaseID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection
        .execute(
            "DELETE FROM category WHERE id = ?1 AND user_id = ?2",
            (category_id, user_id.as_i64()),
        )
        .map_err(|error| match Error::from(error) {
            Error::ForeignKeyViolation => Error::CategoryInUse,
            error => error,
        })?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let id = row.get(0)?;

    let raw_name: String = row.get(1)?;
    let name = CategoryName::new_unchecked(&raw_name);

    let category_type = row.get(2)?;

    Ok(Category {
        id,
        name,
        category_type,
    })
}

/// A route handler for creating a new category.
pub async fn create_category_endpoint(
    State(config): State<AppConfig>,
    claims: Claims,
    Json(data): Json<CategoryData>,
) -> Result<impl IntoResponse, Error> {
    let name = CategoryName::new(&data.name)?;
    let category_type = data.category_type.parse()?;

    let connection = config.db_connection()?;
    let category = create_category(claims.user_id, name, category_type, &connection)?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/categories/{}", category.id))],
        Json(category),
    ))
}

/// A route handler for listing the user's categories in alphabetical order.
pub async fn get_categories_endpoint(
    State(config): State<AppConfig>,
    claims: Claims,
) -> Result<Json<Vec<Category>>, Error> {
    let connection = config.db_connection()?;

    get_all_categories(claims.user_id, &connection).map(Json)
}

/// A route handler for getting a category by its database ID.
///
/// Responds with 404 if the category does not exist or belongs to another
/// user.
pub async fn get_category_endpoint(
    State(config): State<AppConfig>,
    claims: Claims,
    Path(category_id): Path<DatabaseID>,
) -> Result<Json<Category>, Error> {
    let connection = config.db_connection()?;

    get_category(claims.user_id, category_id, &connection).map(Json)
}

/// A route handler for replacing a category's name and type.
pub async fn update_category_endpoint(
    State(config): State<AppConfig>,
    claims: Claims,
    Path(category_id): Path<DatabaseID>,
    Json(data): Json<CategoryData>,
) -> Result<Json<Category>, Error> {
    let name = CategoryName::new(&data.name)?;
    let category_type = data.category_type.parse()?;

    let connection = config.db_connection()?;

    update_category(claims.user_id, category_id, name, category_type, &connection).map(Json)
}

/// A route handler for partially updating a category. Absent fields keep
/// their current values.
pub async fn patch_category_endpoint(
    State(config): State<AppConfig>,
    claims: Claims,
    Path(category_id): Path<DatabaseID>,
    Json(patch): Json<CategoryPatch>,
) -> Result<Json<Category>, Error> {
    let connection = config.db_connection()?;
    let existing = get_category(claims.user_id, category_id, &connection)?;

    let name = match patch.name {
        Some(name) => CategoryName::new(&name)?,
        None => existing.name,
    };
    let category_type = match patch.category_type {
        Some(category_type) => category_type.parse()?,
        None => existing.category_type,
    };

    update_category(claims.user_id, category_id, name, category_type, &connection).map(Json)
}

/// A route handler for deleting a category.
///
/// Responds with 409 if the category is still referenced by transactions.
pub async fn delete_category_endpoint(
    State(config): State<AppConfig>,
    claims: Claims,
    Path(category_id): Path<DatabaseID>,
) -> Result<StatusCode, Error> {
    let connection = config.db_connection()?;

    delete_category(claims.user_id, category_id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}
