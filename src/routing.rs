//! Application router configuration.

use axum::{
    http::StatusCode,
    routing::{get, post},
    Router,
};

use crate::{
    auth::sign_in,
    budget::{
        create_budget_endpoint, delete_budget_endpoint, get_budget_endpoint,
        get_budgets_endpoint, get_current_budget_endpoint, patch_budget_endpoint,
        update_budget_endpoint,
    },
    category::{
        create_category_endpoint, delete_category_endpoint, get_categories_endpoint,
        get_category_endpoint, patch_category_endpoint, update_category_endpoint,
    },
    endpoints,
    summary::get_summary_endpoint,
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, get_transaction_endpoint,
        get_transactions_endpoint, patch_transaction_endpoint, update_transaction_endpoint,
    },
    user::register_user,
    AppConfig,
};

/// Return a router with all the app's routes.
///
/// Registration and sign-in are open; every other route requires a bearer
/// token and only ever operates on the authenticated user's rows.
pub fn build_router() -> Router<AppConfig> {
    Router::new()
        .route(endpoints::COFFEE, get(get_coffee))
        .route(endpoints::USERS, post(register_user))
        .route(endpoints::SIGN_IN, post(sign_in))
        .route(
            endpoints::CATEGORIES,
            get(get_categories_endpoint).post(create_category_endpoint),
        )
        .route(
            endpoints::CATEGORY,
            get(get_category_endpoint)
                .put(update_category_endpoint)
                .patch(patch_category_endpoint)
                .delete(delete_category_endpoint),
        )
        .route(
            endpoints::TRANSACTIONS,
            get(get_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            get(get_transaction_endpoint)
                .put(update_transaction_endpoint)
                .patch(patch_transaction_endpoint)
                .delete(delete_transaction_endpoint),
        )
        .route(
            endpoints::BUDGETS,
            get(get_budgets_endpoint).post(create_budget_endpoint),
        )
        .route(endpoints::CURRENT_BUDGET, get(get_current_budget_endpoint))
        .route(
            endpoints::BUDGET,
            get(get_budget_endpoint)
                .put(update_budget_endpoint)
                .patch(patch_budget_endpoint)
                .delete(delete_budget_endpoint),
        )
        .route(endpoints::SUMMARY, get(get_summary_endpoint))
}

/// Attempt to get a cup of coffee from the server.
async fn get_coffee() -> StatusCode {
    StatusCode::IM_A_TEAPOT
}
