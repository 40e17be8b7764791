//! Monthly budgets and the budget-versus-actual report.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Datelike, Local, Months, NaiveDate};
use rusqlite::{Connection, Row, Transaction as SqlTransaction, TransactionBehavior};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    amount::Amount, auth::Claims, user::UserID, AppConfig, DatabaseID, Error,
};

/// A spending budget for one calendar month.
///
/// Each user has at most one budget per `(year, month)` pair. The owning
/// user is tracked in the database but never serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    /// The ID of the budget.
    pub id: DatabaseID,
    /// The calendar year the budget applies to.
    pub year: i32,
    /// The calendar month the budget applies to (1-12).
    pub month: u32,
    /// The budgeted amount.
    pub amount: Amount,
}

/// The client-supplied fields for creating or fully replacing a budget.
#[derive(Debug, Deserialize)]
pub struct BudgetData {
    /// The calendar year the budget applies to.
    pub year: i32,
    /// The calendar month the budget applies to (1-12).
    pub month: i64,
    /// The budgeted amount.
    pub amount: Decimal,
}

/// The client-supplied fields for partially updating a budget. Absent fields
/// keep their current values.
#[derive(Debug, Default, Deserialize)]
pub struct BudgetPatch {
    /// The new year, if it should change.
    pub year: Option<i32>,
    /// The new month, if it should change.
    pub month: Option<i64>,
    /// The new amount, if it should change.
    pub amount: Option<Decimal>,
}

/// The response for the budget-versus-actual report: the current month's
/// budget (if one has been set) and the total spent this month.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct CurrentBudget {
    /// The budget for the current month, or null if none has been set.
    pub budget: Option<Budget>,
    /// The sum of this month's expense transactions, zero if there are none.
    pub actual_expense: Amount,
}

/// Check that a client-supplied month number names a calendar month.
fn validate_month(month: i64) -> Result<u32, Error> {
    if (1..=12).contains(&month) {
        Ok(month as u32)
    } else {
        Err(Error::Validation {
            field: "month",
            message: "month must be between 1 and 12".to_string(),
        })
    }
}

/// Initialize the budget table.
///
/// The `(user_id, year, month)` triple is unique per user.
pub(crate) fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS budget (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            year INTEGER NOT NULL,
            month INTEGER NOT NULL,
            amount INTEGER NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
            UNIQUE(user_id, year, month)
        )",
        (),
    )?;

    Ok(())
}

/// The result of [upsert_budget]: whether the budget was newly created or an
/// existing row was replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// No budget existed for the month, so one was inserted.
    Created,
    /// A budget already existed for the month and was replaced in place.
    Updated,
}

/// Create the budget for `(user_id, year, month)`, or replace its amount if
/// one already exists.
///
/// The existence check and the write run inside a single SQLite transaction
/// so concurrent create requests for the same month cannot produce
/// duplicate rows.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn upsert_budget(
    user_id: UserID,
    year: i32,
    month: u32,
    amount: Amount,
    connection: &Connection,
) -> Result<(Budget, UpsertOutcome), Error> {
    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    let existing_id: Option<DatabaseID> = transaction
        .prepare("SELECT id FROM budget WHERE user_id = ?1 AND year = ?2 AND month = ?3")?
        .query_row((user_id.as_i64(), year, month), |row| row.get(0))
        .map(Some)
        .or_else(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Ok(None),
            error => Err(error),
        })?;

    let (id, outcome) = match existing_id {
        Some(id) => {
            transaction.execute(
                "UPDATE budget SET amount = ?1 WHERE id = ?2",
                (amount.as_cents(), id),
            )?;

            (id, UpsertOutcome::Updated)
        }
        None => {
            transaction.execute(
                "INSERT INTO budget (user_id, year, month, amount) VALUES (?1, ?2, ?3, ?4)",
                (user_id.as_i64(), year, month, amount.as_cents()),
            )?;

            (transaction.last_insert_rowid(), UpsertOutcome::Created)
        }
    };

    transaction.commit()?;

    Ok((
        Budget {
            id,
            year,
            month,
            amount,
        },
        outcome,
    ))
}

/// Retrieve a single budget owned by `user_id`.
///
/// # Errors
/// This function will return [Error::NotFound] if the budget does not exist
/// or belongs to another user.
pub fn get_budget(
    user_id: UserID,
    budget_id: DatabaseID,
    connection: &Connection,
) -> Result<Budget, Error> {
    connection
        .prepare("SELECT id, year, month, amount FROM budget WHERE id = ?1 AND user_id = ?2")?
        .query_row((budget_id, user_id.as_i64()), map_row)
        .map_err(|error| error.into())
}

/// Retrieve all of `user_id`'s budgets, newest month first.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn get_all_budgets(user_id: UserID, connection: &Connection) -> Result<Vec<Budget>, Error> {
    connection
        .prepare(
            "SELECT id, year, month, amount FROM budget
             WHERE user_id = ?1
             ORDER BY year DESC, month DESC",
        )?
        .query_map((user_id.as_i64(),), map_row)?
        .map(|maybe_budget| maybe_budget.map_err(|error| error.into()))
        .collect()
}

/// Retrieve the budget for a specific calendar month, or `None` if the user
/// has not set one. The absence of a budget is a valid state, not an error.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn get_budget_for_month(
    user_id: UserID,
    year: i32,
    month: u32,
    connection: &Connection,
) -> Result<Option<Budget>, Error> {
    connection
        .prepare(
            "SELECT id, year, month, amount FROM budget
             WHERE user_id = ?1 AND year = ?2 AND month = ?3",
        )?
        .query_row((user_id.as_i64(), year, month), map_row)
        .map(Some)
        .or_else(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Ok(None),
            error => Err(error.into()),
        })
}

/// Replace all fields of a budget owned by `user_id`.
///
/// # Errors
/// This function will return an error if:
/// - the budget does not exist or belongs to another user
///   ([Error::NotFound]),
/// - the new year and month collide with another of the user's budgets
///   ([Error::DuplicateBudget]),
/// - or there is some other SQL error.
pub fn update_budget(
    user_id: UserID,
    budget_id: DatabaseID,
    year: i32,
    month: u32,
    amount: Amount,
    connection: &Connection,
) -> Result<Budget, Error> {
    let rows_affected = connection.execute(
        "UPDATE budget SET year = ?1, month = ?2, amount = ?3 WHERE id = ?4 AND user_id = ?5",
        (year, month, amount.as_cents(), budget_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(Budget {
        id: budget_id,
        year,
        month,
        amount,
    })
}

/// Delete a budget owned by `user_id`.
///
/// # Errors
/// This function will return [Error::NotFound] if the budget does not exist
/// or belongs to another user.
pub fn delete_budget(
    user_id: UserID,
    budget_id: DatabaseID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM budget WHERE id = ?1 AND user_id = ?2",
        (budget_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Sum the user's expense transactions for a calendar month. Months with no
/// expense transactions sum to zero.
///
/// # Errors
/// This function will return an error if `month` is out of range or there
/// is an SQL error.
pub fn sum_expenses_for_month(
    user_id: UserID,
    year: i32,
    month: u32,
    connection: &Connection,
) -> Result<Amount, Error> {
    let (first_day, last_day) = month_range(year, month)?;

    let cents: i64 = connection
        .prepare(
            "SELECT COALESCE(SUM(t.amount), 0)
             FROM \"transaction\" t
             INNER JOIN category c ON t.category_id = c.id
             WHERE t.user_id = ?1 AND c.type = 'expense' AND t.date BETWEEN ?2 AND ?3",
        )?
        .query_row((user_id.as_i64(), first_day, last_day), |row| row.get(0))?;

    Ok(Amount::from_cents(cents))
}

/// The first and last day of a calendar month, as an inclusive date range.
fn month_range(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate), Error> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first_day| {
            let last_day = first_day.checked_add_months(Months::new(1))?.pred_opt()?;

            Some((first_day, last_day))
        })
        .ok_or(Error::Validation {
            field: "month",
            message: "month must be between 1 and 12".to_string(),
        })
}

fn map_row(row: &Row) -> Result<Budget, rusqlite::Error> {
    let id = row.get(0)?;
    let year = row.get(1)?;
    let month = row.get(2)?;

    let cents: i64 = row.get(3)?;
    let amount = Amount::from_cents(cents);

    Ok(Budget {
        id,
        year,
        month,
        amount,
    })
}

/// A route handler for creating the budget for a month.
///
/// Creating a budget is idempotent per month: if the user already has a
/// budget for the given year and month, its amount is replaced and the
/// response is 200 rather than 201.
pub async fn create_budget_endpoint(
    State(config): State<AppConfig>,
    claims: Claims,
    Json(data): Json<BudgetData>,
) -> Result<Response, Error> {
    let month = validate_month(data.month)?;
    let amount = Amount::new(data.amount)?;

    let connection = config.db_connection()?;
    let (budget, outcome) = upsert_budget(claims.user_id, data.year, month, amount, &connection)?;

    let response = match outcome {
        UpsertOutcome::Created => (
            StatusCode::CREATED,
            [(header::LOCATION, format!("/budgets/{}", budget.id))],
            Json(budget),
        )
            .into_response(),
        UpsertOutcome::Updated => (StatusCode::OK, Json(budget)).into_response(),
    };

    Ok(response)
}

/// A route handler for listing the user's budgets, newest month first.
pub async fn get_budgets_endpoint(
    State(config): State<AppConfig>,
    claims: Claims,
) -> Result<Json<Vec<Budget>>, Error> {
    let connection = config.db_connection()?;

    get_all_budgets(claims.user_id, &connection).map(Json)
}

/// A route handler for getting a budget by its database ID.
///
/// Responds with 404 if the budget does not exist or belongs to another
/// user.
pub async fn get_budget_endpoint(
    State(config): State<AppConfig>,
    claims: Claims,
    Path(budget_id): Path<DatabaseID>,
) -> Result<Json<Budget>, Error> {
    let connection = config.db_connection()?;

    get_budget(claims.user_id, budget_id, &connection).map(Json)
}

/// A route handler for replacing all fields of a budget.
pub async fn update_budget_endpoint(
    State(config): State<AppConfig>,
    claims: Claims,
    Path(budget_id): Path<DatabaseID>,
    Json(data): Json<BudgetData>,
) -> Result<Json<Budget>, Error> {
    let month = validate_month(data.month)?;
    let amount = Amount::new(data.amount)?;

    let connection = config.db_connection()?;

    update_budget(claims.user_id, budget_id, data.year, month, amount, &connection).map(Json)
}

/// A route handler for partially updating a budget. Absent fields keep
/// their current values.
pub async fn patch_budget_endpoint(
    State(config): State<AppConfig>,
    claims: Claims,
    Path(budget_id): Path<DatabaseID>,
    Json(patch): Json<BudgetPatch>,
) -> Result<Json<Budget>, Error> {
    let connection = config.db_connection()?;
    let existing = get_budget(claims.user_id, budget_id, &connection)?;

    let year = patch.year.unwrap_or(existing.year);
    let month = match patch.month {
        Some(month) => validate_month(month)?,
        None => existing.month,
    };
    let amount = match patch.amount {
        Some(amount) => Amount::new(amount)?,
        None => existing.amount,
    };

    update_budget(claims.user_id, budget_id, year, month, amount, &connection).map(Json)
}

/// A route handler for deleting a budget.
pub async fn delete_budget_endpoint(
    State(config): State<AppConfig>,
    claims: Claims,
    Path(budget_id): Path<DatabaseID>,
) -> Result<StatusCode, Error> {
    let connection = config.db_connection()?;

    delete_budget(claims.user_id, budget_id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}

/// A route handler for the budget-versus-actual report for today's calendar
/// month.
///
/// The response carries the month's budget (null if none has been set) and
/// the sum of the month's expense transactions. Pure read, no side effects.
pub async fn get_current_budget_endpoint(
    State(config): State<AppConfig>,
    claims: Claims,
) -> Result<Json<CurrentBudget>, Error> {
    let today = Local::now().date_naive();
    let connection = config.db_connection()?;

    let budget = get_budget_for_month(claims.user_id, today.year(), today.month(), &connection)?;
    let actual_expense =
        sum_expenses_for_month(claims.user_id, today.year(), today.month(), &connection)?;

    Ok(Json(CurrentBudget {
        budget,
        actual_expense,
    }))
}
