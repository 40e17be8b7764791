//! The API endpoint URIs.

/// The route for registering a new user.
pub const USERS: &str = "/users";
/// The route for signing in and receiving an auth token.
pub const SIGN_IN: &str = "/sign_in";
/// The route to list and create categories.
pub const CATEGORIES: &str = "/categories";
/// The route to access a single category.
pub const CATEGORY: &str = "/categories/:category_id";
/// The route to list (with optional filters) and create transactions.
pub const TRANSACTIONS: &str = "/transactions";
/// The route to access a single transaction.
pub const TRANSACTION: &str = "/transactions/:transaction_id";
/// The route to list budgets and create-or-update the budget for a month.
pub const BUDGETS: &str = "/budgets";
/// The route for the current month's budget-versus-actual report.
pub const CURRENT_BUDGET: &str = "/budgets/current";
/// The route to access a single budget.
pub const BUDGET: &str = "/budgets/:budget_id";
/// The route for the all-time income/expense summary.
pub const SUMMARY: &str = "/summary";
/// The route to request a cup of coffee (experimental).
pub const COFFEE: &str = "/coffee";
