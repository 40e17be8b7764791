//! The all-time income/expense summary report.

use axum::{extract::State, Json};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    amount::Amount,
    auth::Claims,
    category::{CategoryName, CategoryType},
    user::UserID,
    AppConfig, Error,
};

/// The summed amount for one `(category name, category type)` pair.
///
/// The field names on the wire follow the reporting API's
/// `category__name`/`category__type` spelling.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    /// The name of the category.
    #[serde(rename = "category__name")]
    pub category_name: CategoryName,
    /// Whether the category records income or expenses.
    #[serde(rename = "category__type")]
    pub category_type: CategoryType,
    /// The sum of the matching transactions' amounts.
    pub total: Amount,
}

/// The all-time totals for a user's transactions.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// The sum of amounts over all transactions in income categories.
    pub total_income: Amount,
    /// The sum of amounts over all transactions in expense categories.
    pub total_expense: Amount,
    /// `total_income - total_expense`. May be negative.
    pub balance: Amount,
    /// Per-category totals, ordered by category type then name. Categories
    /// with no transactions are omitted.
    pub by_category: Vec<CategoryTotal>,
}

/// Compute the all-time summary of `user_id`'s transactions.
///
/// Users with no transactions get all-zero totals and an empty
/// `by_category` list.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn get_summary(user_id: UserID, connection: &Connection) -> Result<Summary, Error> {
    let mut income_cents = 0;
    let mut expense_cents = 0;

    let totals_by_type: Vec<(CategoryType, i64)> = connection
        .prepare(
            "SELECT c.type, COALESCE(SUM(t.amount), 0)
             FROM \"transaction\" t
             INNER JOIN category c ON t.category_id = c.id
             WHERE t.user_id = ?1
             GROUP BY c.type",
        )?
        .query_map((user_id.as_i64(),), |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<_, _>>()?;

    for (category_type, cents) in totals_by_type {
        match category_type {
            CategoryType::Income => income_cents = cents,
            CategoryType::Expense => expense_cents = cents,
        }
    }

    let by_category = connection
        .prepare(
            "SELECT c.name, c.type, SUM(t.amount)
             FROM \"transaction\" t
             INNER JOIN category c ON t.category_id = c.id
             WHERE t.user_id = ?1
             GROUP BY c.name, c.type
             ORDER BY c.type ASC, c.name ASC",
        )?
        .query_map((user_id.as_i64(),), |row| {
            let raw_name: String = row.get(0)?;
            let cents: i64 = row.get(2)?;

            Ok(CategoryTotal {
                category_name: CategoryName::new_unchecked(&raw_name),
                category_type: row.get(1)?,
                total: Amount::from_cents(cents),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Summary {
        total_income: Amount::from_cents(income_cents),
        total_expense: Amount::from_cents(expense_cents),
        balance: Amount::from_cents(income_cents - expense_cents),
        by_category,
    })
}

/// A route handler for the all-time summary of the user's transactions.
pub async fn get_summary_endpoint(
    State(config): State<AppConfig>,
    claims: Claims,
) -> Result<Json<Summary>, Error> {
    let connection = config.db_connection()?;

    get_summary(claims.user_id, &connection).map(Json)
}
