//! Fintrack is a multi-tenant personal finance tracking backend.
//!
//! Users record income and expense transactions under categories, set
//! monthly budgets, and retrieve aggregate summaries. This library provides
//! the REST API as a JSON-over-HTTP service backed by SQLite; every data
//! endpoint is scoped to the authenticated user.

#![warn(missing_docs)]

use std::time::Duration;

use axum_server::Handle;
use tokio::signal;

pub mod amount;
pub mod auth;
pub mod budget;
pub mod category;
mod config;
pub mod db;
mod endpoints;
mod error;
mod password;
mod routing;
pub mod summary;
pub mod transaction;
pub mod user;

pub use config::AppConfig;
pub use db::{initialize as initialize_db, DatabaseID};
pub use error::Error;
pub use password::{PasswordHash, RawPassword};
pub use routing::build_router;
pub use user::{User, UserID};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
