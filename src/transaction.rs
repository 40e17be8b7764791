//! Transactions record money earned or spent on a date, under a category.

use std::{fmt::Display, str::FromStr};

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use rusqlite::{params_from_iter, types::Value, Connection, Row};
use rust_decimal::{prelude::ToPrimitive, Decimal};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    amount::Amount,
    auth::Claims,
    category::{get_category, Category, CategoryName, CategoryType},
    user::UserID,
    AppConfig, DatabaseID, Error,
};

/// The maximum number of characters a transaction description may have.
const MAX_DESCRIPTION_LENGTH: usize = 255;

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// The owning user is tracked in the database but never serialized; every
/// query takes the owner's ID and filters on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: DatabaseID,
    /// The ID of the category the transaction belongs to.
    pub category: DatabaseID,
    /// The full representation of the category the transaction belongs to.
    pub category_detail: Category,
    /// The amount of money spent or earned.
    pub amount: Amount,
    /// The date the transaction occurred.
    pub date: NaiveDate,
    /// An optional note describing the transaction.
    pub description: String,
}

/// The client-supplied fields for creating or fully replacing a transaction.
#[derive(Debug, Deserialize)]
pub struct TransactionData {
    /// The ID of the category the transaction belongs to. The category must
    /// belong to the requesting user.
    pub category: DatabaseID,
    /// The amount of money spent or earned.
    pub amount: Decimal,
    /// The date the transaction occurred.
    pub date: NaiveDate,
    /// An optional note describing the transaction.
    #[serde(default)]
    pub description: String,
}

/// The client-supplied fields for partially updating a transaction. Absent
/// fields keep their current values.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionPatch {
    /// The new category ID, if it should change.
    pub category: Option<DatabaseID>,
    /// The new amount, if it should change.
    pub amount: Option<Decimal>,
    /// The new date, if it should change.
    pub date: Option<NaiveDate>,
    /// The new description, if it should change.
    pub description: Option<String>,
}

/// The optional query parameters accepted by the transaction list endpoint.
///
/// Absent parameters and parameters given as the empty string impose no
/// constraint; the rest compose with logical AND. Values that fail to parse
/// as the field's type are rejected with a validation error.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionFilter {
    /// Exact match on the category ID.
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub category: Option<DatabaseID>,
    /// Match on the related category's type. Values other than `"income"`
    /// and `"expense"` are ignored.
    #[serde(rename = "type", default, deserialize_with = "empty_string_as_none")]
    pub category_type: Option<String>,
    /// Inclusive lower bound on the amount.
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub min_amount: Option<Decimal>,
    /// Inclusive upper bound on the amount.
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub max_amount: Option<Decimal>,
    /// Inclusive lower bound on the date.
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper bound on the date.
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub end_date: Option<NaiveDate>,
}

impl TransactionFilter {
    /// The `type` parameter as a category type, or `None` if the parameter
    /// was absent or not a valid type.
    fn category_type(&self) -> Option<CategoryType> {
        self.category_type
            .as_deref()
            .and_then(|text| text.parse().ok())
    }
}

/// Deserialize an optional query parameter, treating the empty string the
/// same as an absent parameter.
fn empty_string_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let value = Option::<String>::deserialize(deserializer)?;

    match value.as_deref() {
        None | Some("") => Ok(None),
        Some(text) => text.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Initialize the transaction table.
///
/// Deleting a category that still has transactions is blocked by the
/// `RESTRICT` action; deleting a user takes their transactions with them.
pub(crate) fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            category_id INTEGER NOT NULL,
            amount INTEGER NOT NULL,
            date TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
            FOREIGN KEY(category_id) REFERENCES category(id) ON DELETE RESTRICT
        )",
        (),
    )?;

    Ok(())
}

/// Create a transaction owned by `user_id` and return it with its generated
/// ID and the full category representation.
///
/// # Errors
/// This function will return [Error::InvalidCategory] if `category_id` does
/// not refer to one of the user's own categories. The error is the same
/// whether the category does not exist or belongs to another user, so the
/// response does not reveal the existence of other users' data.
pub fn create_transaction(
    user_id: UserID,
    category_id: DatabaseID,
    amount: Amount,
    date: NaiveDate,
    description: String,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let category = get_owned_category(user_id, category_id, connection)?;

    connection.execute(
        "INSERT INTO \"transaction\" (user_id, category_id, amount, date, description)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        (
            user_id.as_i64(),
            category_id,
            amount.as_cents(),
            date,
            &description,
        ),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Transaction {
        id,
        category: category_id,
        category_detail: category,
        amount,
        date,
        description,
    })
}

/// Retrieve a single transaction owned by `user_id`.
///
/// # Errors
/// This function will return [Error::NotFound] if the transaction does not
/// exist or belongs to another user.
pub fn get_transaction(
    user_id: UserID,
    transaction_id: DatabaseID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(
            "SELECT t.id, t.category_id, t.amount, t.date, t.description, c.name, c.type
             FROM \"transaction\" t
             INNER JOIN category c ON t.category_id = c.id
             WHERE t.id = ?1 AND t.user_id = ?2",
        )?
        .query_row((transaction_id, user_id.as_i64()), map_row)
        .map_err(|error| error.into())
}

/// Retrieve `user_id`'s transactions matching `filter`, newest first (by
/// date, then by ID).
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn get_transactions(
    user_id: UserID,
    filter: &TransactionFilter,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let mut sql = String::from(
        "SELECT t.id, t.category_id, t.amount, t.date, t.description, c.name, c.type
         FROM \"transaction\" t
         INNER JOIN category c ON t.category_id = c.id
         WHERE t.user_id = ?1",
    );
    let mut params: Vec<Value> = vec![Value::Integer(user_id.as_i64())];

    if let Some(category_id) = filter.category {
        params.push(Value::Integer(category_id));
        sql.push_str(&format!(" AND t.category_id = ?{}", params.len()));
    }

    if let Some(category_type) = filter.category_type() {
        params.push(Value::Text(category_type.to_string()));
        sql.push_str(&format!(" AND c.type = ?{}", params.len()));
    }

    if let Some(min_amount) = filter.min_amount {
        params.push(Value::Integer(lower_bound_cents(min_amount)));
        sql.push_str(&format!(" AND t.amount >= ?{}", params.len()));
    }

    if let Some(max_amount) = filter.max_amount {
        params.push(Value::Integer(upper_bound_cents(max_amount)));
        sql.push_str(&format!(" AND t.amount <= ?{}", params.len()));
    }

    if let Some(start_date) = filter.start_date {
        params.push(Value::Text(start_date.to_string()));
        sql.push_str(&format!(" AND t.date >= ?{}", params.len()));
    }

    if let Some(end_date) = filter.end_date {
        params.push(Value::Text(end_date.to_string()));
        sql.push_str(&format!(" AND t.date <= ?{}", params.len()));
    }

    sql.push_str(" ORDER BY t.date DESC, t.id DESC");

    connection
        .prepare(&sql)?
        .query_map(params_from_iter(params), map_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// Replace all fields of a transaction owned by `user_id`.
///
/// # Errors
/// This function will return an error if:
/// - the transaction does not exist or belongs to another user
///   ([Error::NotFound]),
/// - `category_id` does not refer to one of the user's own categories
///   ([Error::InvalidCategory]),
/// - or there is some other SQL error.
pub fn update_transaction(
    user_id: UserID,
    transaction_id: DatabaseID,
    category_id: DatabaseID,
    amount: Amount,
    date: NaiveDate,
    description: String,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let category = get_owned_category(user_id, category_id, connection)?;

    let rows_affected = connection.execute(
        "UPDATE \"transaction\"
         SET category_id = ?1, amount = ?2, date = ?3, description = ?4
         WHERE id = ?5 AND user_id = ?6",
        (
            category_id,
            amount.as_cents(),
            date,
            &description,
            transaction_id,
            user_id.as_i64(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(Transaction {
        id: transaction_id,
        category: category_id,
        category_detail: category,
        amount,
        date,
        description,
    })
}

/// Delete a transaction owned by `user_id`.
///
/// # Errors
/// This function will return [Error::NotFound] if the transaction does not
/// exist or belongs to another user.
pub fn delete_transaction(
    user_id: UserID,
    transaction_id: DatabaseID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        (transaction_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Look up one of the user's own categories for use as a transaction's
/// category, reporting a missing or foreign row as an invalid reference.
fn get_owned_category(
    user_id: UserID,
    category_id: DatabaseID,
    connection: &Connection,
) -> Result<Category, Error> {
    get_category(user_id, category_id, connection).map_err(|error| match error {
        Error::NotFound => Error::InvalidCategory,
        error => error,
    })
}

/// The smallest whole number of cents that is at least `amount`.
fn lower_bound_cents(amount: Decimal) -> i64 {
    match (amount * Decimal::ONE_HUNDRED).ceil().to_i64() {
        Some(cents) => cents,
        None if amount.is_sign_negative() => i64::MIN,
        None => i64::MAX,
    }
}

/// The largest whole number of cents that is at most `amount`.
fn upper_bound_cents(amount: Decimal) -> i64 {
    match (amount * Decimal::ONE_HUNDRED).floor().to_i64() {
        Some(cents) => cents,
        None if amount.is_sign_negative() => i64::MIN,
        None => i64::MAX,
    }
}

fn map_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let category = row.get(1)?;

    let cents: i64 = row.get(2)?;
    let amount = Amount::from_cents(cents);

    let date = row.get(3)?;
    let description = row.get(4)?;

    let raw_name: String = row.get(5)?;
    let category_detail = Category {
        id: category,
        name: CategoryName::new_unchecked(&raw_name),
        category_type: row.get(6)?,
    };

    Ok(Transaction {
        id,
        category,
        category_detail,
        amount,
        date,
        description,
    })
}

fn validate_description(description: &str) -> Result<(), Error> {
    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(Error::Validation {
            field: "description",
            message: format!(
                "ensure this field has no more than {MAX_DESCRIPTION_LENGTH} characters"
            ),
        });
    }

    Ok(())
}

/// A route handler for creating a new transaction.
pub async fn create_transaction_endpoint(
    State(config): State<AppConfig>,
    claims: Claims,
    Json(data): Json<TransactionData>,
) -> Result<impl IntoResponse, Error> {
    let amount = Amount::new(data.amount)?;
    validate_description(&data.description)?;

    let connection = config.db_connection()?;
    let transaction = create_transaction(
        claims.user_id,
        data.category,
        amount,
        data.date,
        data.description,
        &connection,
    )?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/transactions/{}", transaction.id))],
        Json(transaction),
    ))
}

/// A route handler for listing the user's transactions, newest first,
/// optionally restricted by the [TransactionFilter] query parameters.
pub async fn get_transactions_endpoint(
    State(config): State<AppConfig>,
    claims: Claims,
    Query(filter): Query<TransactionFilter>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let connection = config.db_connection()?;

    get_transactions(claims.user_id, &filter, &connection).map(Json)
}

/// A route handler for getting a transaction by its database ID.
///
/// Responds with 404 if the transaction does not exist or belongs to
/// another user.
pub async fn get_transaction_endpoint(
    State(config): State<AppConfig>,
    claims: Claims,
    Path(transaction_id): Path<DatabaseID>,
) -> Result<Json<Transaction>, Error> {
    let connection = config.db_connection()?;

    get_transaction(claims.user_id, transaction_id, &connection).map(Json)
}

/// A route handler for replacing all fields of a transaction.
pub async fn update_transaction_endpoint(
    State(config): State<AppConfig>,
    claims: Claims,
    Path(transaction_id): Path<DatabaseID>,
    Json(data): Json<TransactionData>,
) -> Result<Json<Transaction>, Error> {
    let amount = Amount::new(data.amount)?;
    validate_description(&data.description)?;

    let connection = config.db_connection()?;

    update_transaction(
        claims.user_id,
        transaction_id,
        data.category,
        amount,
        data.date,
        data.description,
        &connection,
    )
    .map(Json)
}

/// A route handler for partially updating a transaction. Absent fields keep
/// their current values.
pub async fn patch_transaction_endpoint(
    State(config): State<AppConfig>,
    claims: Claims,
    Path(transaction_id): Path<DatabaseID>,
    Json(patch): Json<TransactionPatch>,
) -> Result<Json<Transaction>, Error> {
    let connection = config.db_connection()?;
    let existing = get_transaction(claims.user_id, transaction_id, &connection)?;

    let category_id = patch.category.unwrap_or(existing.category);
    let amount = match patch.amount {
        Some(amount) => Amount::new(amount)?,
        None => existing.amount,
    };
    let date = patch.date.unwrap_or(existing.date);
    let description = patch.description.unwrap_or(existing.description);
    validate_description(&description)?;

    update_transaction(
        claims.user_id,
        transaction_id,
        category_id,
        amount,
        date,
        description,
        &connection,
    )
    .map(Json)
}

/// A route handler for deleting a transaction.
pub async fn delete_transaction_endpoint(
    State(config): State<AppConfig>,
    claims: Claims,
    Path(transaction_id): Path<DatabaseID>,
) -> Result<StatusCode, Error> {
    let connection = config.db_connection()?;

    delete_transaction(claims.user_id, transaction_id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod transaction_query_tests {
    use chrono::NaiveDate;
    use rusqlite::Connection;

    use crate::{
        amount::Amount,
        category::{create_category, Category, CategoryName, CategoryType},
        db::initialize,
        user::create_user,
        Error, PasswordHash, User,
    };

    use super::{
        create_transaction, delete_transaction, get_transaction, get_transactions,
        update_transaction, Transaction, TransactionFilter,
    };

    fn get_test_db_and_user() -> (Connection, User) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        let user = create_user(
            "foo@bar.baz".parse().unwrap(),
            PasswordHash::new_unchecked("hunter22".to_string()),
            &conn,
        )
        .unwrap();

        (conn, user)
    }

    fn make_category(conn: &Connection, user: &User, name: &str, kind: CategoryType) -> Category {
        create_category(user.id(), CategoryName::new_unchecked(name), kind, conn).unwrap()
    }

    fn date(text: &str) -> NaiveDate {
        text.parse().unwrap()
    }

    #[test]
    fn create_transaction_succeeds() {
        let (conn, user) = get_test_db_and_user();
        let category = make_category(&conn, &user, "Groceries", CategoryType::Expense);

        let transaction = create_transaction(
            user.id(),
            category.id,
            Amount::from_cents(4200),
            date("2024-05-01"),
            "Weekly shop".to_string(),
            &conn,
        )
        .unwrap();

        assert!(transaction.id > 0);
        assert_eq!(transaction.category, category.id);
        assert_eq!(transaction.category_detail, category);
        assert_eq!(transaction.amount, Amount::from_cents(4200));
        assert_eq!(transaction.date, date("2024-05-01"));
        assert_eq!(transaction.description, "Weekly shop");
    }

    #[test]
    fn create_transaction_fails_with_nonexistent_category() {
        let (conn, user) = get_test_db_and_user();

        let result = create_transaction(
            user.id(),
            1337,
            Amount::from_cents(4200),
            date("2024-05-01"),
            String::new(),
            &conn,
        );

        assert_eq!(result, Err(Error::InvalidCategory));
    }

    #[test]
    fn create_transaction_fails_with_other_users_category() {
        let (conn, user) = get_test_db_and_user();
        let other_user = create_user(
            "other@bar.baz".parse().unwrap(),
            PasswordHash::new_unchecked("hunter33".to_string()),
            &conn,
        )
        .unwrap();
        let someone_elses_category = make_category(&conn, &user, "Groceries", CategoryType::Expense);

        let result = create_transaction(
            other_user.id(),
            someone_elses_category.id,
            Amount::from_cents(4200),
            date("2024-05-01"),
            String::new(),
            &conn,
        );

        // The error must not reveal that the category exists for another user.
        assert_eq!(result, Err(Error::InvalidCategory));
    }

    #[test]
    fn get_transaction_fails_for_other_user() {
        let (conn, user) = get_test_db_and_user();
        let other_user = create_user(
            "other@bar.baz".parse().unwrap(),
            PasswordHash::new_unchecked("hunter33".to_string()),
            &conn,
        )
        .unwrap();
        let category = make_category(&conn, &user, "Groceries", CategoryType::Expense);
        let transaction = create_transaction(
            user.id(),
            category.id,
            Amount::from_cents(4200),
            date("2024-05-01"),
            String::new(),
            &conn,
        )
        .unwrap();

        let result = get_transaction(other_user.id(), transaction.id, &conn);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn get_transactions_orders_by_date_then_id_descending() {
        let (conn, user) = get_test_db_and_user();
        let category = make_category(&conn, &user, "Groceries", CategoryType::Expense);

        let first = create_transaction(
            user.id(),
            category.id,
            Amount::from_cents(100),
            date("2024-05-10"),
            String::new(),
            &conn,
        )
        .unwrap();
        let second = create_transaction(
            user.id(),
            category.id,
            Amount::from_cents(200),
            date("2024-05-10"),
            String::new(),
            &conn,
        )
        .unwrap();
        let oldest = create_transaction(
            user.id(),
            category.id,
            Amount::from_cents(300),
            date("2024-05-01"),
            String::new(),
            &conn,
        )
        .unwrap();

        let transactions =
            get_transactions(user.id(), &TransactionFilter::default(), &conn).unwrap();

        // Same date: higher ID first; older dates last.
        assert_eq!(transactions, vec![second, first, oldest]);
    }

    #[test]
    fn get_transactions_filters_by_category() {
        let (conn, user) = get_test_db_and_user();
        let groceries = make_category(&conn, &user, "Groceries", CategoryType::Expense);
        let wages = make_category(&conn, &user, "Wages", CategoryType::Income);

        let in_groceries = create_transaction(
            user.id(),
            groceries.id,
            Amount::from_cents(100),
            date("2024-05-10"),
            String::new(),
            &conn,
        )
        .unwrap();
        create_transaction(
            user.id(),
            wages.id,
            Amount::from_cents(200),
            date("2024-05-11"),
            String::new(),
            &conn,
        )
        .unwrap();

        let filter = TransactionFilter {
            category: Some(groceries.id),
            ..Default::default()
        };
        let transactions = get_transactions(user.id(), &filter, &conn).unwrap();

        assert_eq!(transactions, vec![in_groceries]);
    }

    #[test]
    fn get_transactions_filters_by_type_and_min_amount() {
        let (conn, user) = get_test_db_and_user();
        let groceries = make_category(&conn, &user, "Groceries", CategoryType::Expense);
        let wages = make_category(&conn, &user, "Wages", CategoryType::Income);

        let big_expense = create_transaction(
            user.id(),
            groceries.id,
            Amount::from_cents(15000),
            date("2024-05-10"),
            String::new(),
            &conn,
        )
        .unwrap();
        // Too small to match.
        create_transaction(
            user.id(),
            groceries.id,
            Amount::from_cents(5000),
            date("2024-05-11"),
            String::new(),
            &conn,
        )
        .unwrap();
        // Income, not expense.
        create_transaction(
            user.id(),
            wages.id,
            Amount::from_cents(20000),
            date("2024-05-12"),
            String::new(),
            &conn,
        )
        .unwrap();

        let filter = TransactionFilter {
            category_type: Some("expense".to_string()),
            min_amount: Some("100".parse().unwrap()),
            ..Default::default()
        };
        let transactions = get_transactions(user.id(), &filter, &conn).unwrap();

        assert_eq!(transactions, vec![big_expense]);
    }

    #[test]
    fn get_transactions_min_amount_bound_is_inclusive() {
        let (conn, user) = get_test_db_and_user();
        let category = make_category(&conn, &user, "Groceries", CategoryType::Expense);

        let exactly_100 = create_transaction(
            user.id(),
            category.id,
            Amount::from_cents(10000),
            date("2024-05-10"),
            String::new(),
            &conn,
        )
        .unwrap();

        let filter = TransactionFilter {
            min_amount: Some("100.00".parse().unwrap()),
            ..Default::default()
        };
        let transactions = get_transactions(user.id(), &filter, &conn).unwrap();

        assert_eq!(transactions, vec![exactly_100]);
    }

    #[test]
    fn get_transactions_filters_by_date_range() {
        let (conn, user) = get_test_db_and_user();
        let category = make_category(&conn, &user, "Groceries", CategoryType::Expense);

        let in_may = create_transaction(
            user.id(),
            category.id,
            Amount::from_cents(100),
            date("2024-05-10"),
            String::new(),
            &conn,
        )
        .unwrap();
        create_transaction(
            user.id(),
            category.id,
            Amount::from_cents(200),
            date("2024-06-01"),
            String::new(),
            &conn,
        )
        .unwrap();

        let filter = TransactionFilter {
            start_date: Some(date("2024-05-01")),
            end_date: Some(date("2024-05-31")),
            ..Default::default()
        };
        let transactions = get_transactions(user.id(), &filter, &conn).unwrap();

        assert_eq!(transactions, vec![in_may]);
    }

    #[test]
    fn get_transactions_ignores_unknown_type_value() {
        let (conn, user) = get_test_db_and_user();
        let category = make_category(&conn, &user, "Groceries", CategoryType::Expense);

        create_transaction(
            user.id(),
            category.id,
            Amount::from_cents(100),
            date("2024-05-10"),
            String::new(),
            &conn,
        )
        .unwrap();

        let filter = TransactionFilter {
            category_type: Some("banana".to_string()),
            ..Default::default()
        };
        let transactions = get_transactions(user.id(), &filter, &conn).unwrap();

        assert_eq!(transactions.len(), 1);
    }

    #[test]
    fn get_transactions_returns_empty_list_when_nothing_matches() {
        let (conn, user) = get_test_db_and_user();
        let category = make_category(&conn, &user, "Groceries", CategoryType::Expense);

        create_transaction(
            user.id(),
            category.id,
            Amount::from_cents(100),
            date("2024-05-10"),
            String::new(),
            &conn,
        )
        .unwrap();

        let filter = TransactionFilter {
            min_amount: Some("99999".parse().unwrap()),
            ..Default::default()
        };
        let transactions = get_transactions(user.id(), &filter, &conn).unwrap();

        assert_eq!(transactions, vec![]);
    }

    #[test]
    fn update_transaction_succeeds() {
        let (conn, user) = get_test_db_and_user();
        let groceries = make_category(&conn, &user, "Groceries", CategoryType::Expense);
        let eating_out = make_category(&conn, &user, "Eating Out", CategoryType::Expense);
        let transaction = create_transaction(
            user.id(),
            groceries.id,
            Amount::from_cents(100),
            date("2024-05-10"),
            String::new(),
            &conn,
        )
        .unwrap();

        let updated = update_transaction(
            user.id(),
            transaction.id,
            eating_out.id,
            Amount::from_cents(250),
            date("2024-05-11"),
            "Lunch".to_string(),
            &conn,
        )
        .unwrap();

        assert_eq!(
            updated,
            Transaction {
                id: transaction.id,
                category: eating_out.id,
                category_detail: eating_out,
                amount: Amount::from_cents(250),
                date: date("2024-05-11"),
                description: "Lunch".to_string(),
            }
        );
        assert_eq!(get_transaction(user.id(), transaction.id, &conn).unwrap(), updated);
    }

    #[test]
    fn update_transaction_fails_for_other_user() {
        let (conn, user) = get_test_db_and_user();
        let other_user = create_user(
            "other@bar.baz".parse().unwrap(),
            PasswordHash::new_unchecked("hunter33".to_string()),
            &conn,
        )
        .unwrap();
        let category = make_category(&conn, &user, "Groceries", CategoryType::Expense);
        let other_users_category =
            make_category(&conn, &other_user, "Groceries", CategoryType::Expense);
        let transaction = create_transaction(
            user.id(),
            category.id,
            Amount::from_cents(100),
            date("2024-05-10"),
            String::new(),
            &conn,
        )
        .unwrap();

        let result = update_transaction(
            other_user.id(),
            transaction.id,
            other_users_category.id,
            Amount::from_cents(250),
            date("2024-05-11"),
            String::new(),
            &conn,
        );

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn delete_transaction_fails_for_other_user() {
        let (conn, user) = get_test_db_and_user();
        let other_user = create_user(
            "other@bar.baz".parse().unwrap(),
            PasswordHash::new_unchecked("hunter33".to_string()),
            &conn,
        )
        .unwrap();
        let category = make_category(&conn, &user, "Groceries", CategoryType::Expense);
        let transaction = create_transaction(
            user.id(),
            category.id,
            Amount::from_cents(100),
            date("2024-05-10"),
            String::new(),
            &conn,
        )
        .unwrap();

        assert_eq!(
            delete_transaction(other_user.id(), transaction.id, &conn),
            Err(Error::NotFound)
        );
        assert!(get_transaction(user.id(), transaction.id, &conn).is_ok());
    }
}
