//! fintrack is a web service for tracking personal income and expenses.
//!
//! This library provides a JSON REST API for managing users, categories and
//! transactions, along with a dashboard that summarises a month of activity:
//! totals compared against the previous month, a six month trend, a breakdown
//! of expenses by category and a prediction for the next month based on
//! recurring transactions.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod app_state;
mod auth;
mod category;
mod dashboard;
mod database_id;
mod db;
mod endpoints;
mod extract;
mod logging;
mod pagination;
mod period;
mod response;
mod routing;
mod transaction;
mod user;

pub use app_state::AppState;
pub use auth::{PasswordHash, ValidatedPassword};
pub use category::CategoryType;
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use pagination::PaginationConfig;
pub use routing::build_router;
pub use transaction::{Transaction, TransactionBuilder, create_transaction};
pub use user::{User, UserID, create_user};

use crate::response::ErrorResponse;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
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

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The email and password combination did not match a registered user.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The request did not carry a valid session cookie.
    #[error("authentication required")]
    Unauthenticated,

    /// The old password given when changing passwords was wrong.
    #[error("the current password is incorrect")]
    IncorrectPassword,

    /// The user provided a password that is too short.
    #[error("password must be at least {0} characters")]
    PasswordTooShort(usize),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The string is not a valid email address.
    #[error("invalid email address \"{0}\"")]
    InvalidEmail(String),

    /// The email address is already used by another user.
    #[error("Email already registered")]
    DuplicateEmail,

    /// The period token was not in the `MMYYYY` format.
    #[error("Period must be in format MMYYYY (e.g., 012025 for January 2025)")]
    InvalidPeriod(String),

    /// A request field failed validation.
    ///
    /// The message is safe to show to the client.
    #[error("{0}")]
    Validation(String),

    /// A category with the same name and type already exists for the user.
    #[error("A {1} category with name \"{0}\" already exists")]
    DuplicateCategoryName(String, CategoryType),

    /// Default categories are shared by all users and cannot be changed.
    #[error("Cannot modify default categories")]
    DefaultCategoryReadOnly,

    /// A transaction cannot be moved to a category of the other type.
    #[error("Cannot change category to a different type. Current transaction is {0}.")]
    CategoryTypeMismatch(CategoryType),

    /// The category still has transactions and cannot be deleted.
    #[error("Category has transactions and cannot be deleted")]
    CategoryInUse,

    /// The category does not exist or belongs to another user.
    #[error("Category not found")]
    InvalidCategory,

    /// The transaction does not exist or belongs to another user.
    #[error("Transaction not found")]
    TransactionNotFound,

    /// Tried to update a category that does not exist
    #[error("tried to update a category that is not in the database")]
    UpdateMissingCategory,

    /// Tried to delete a category that does not exist
    #[error("tried to delete a category that is not in the database")]
    DeleteMissingCategory,

    /// Tried to update a transaction that does not exist
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// A blocking database task panicked or was cancelled.
    #[error("a background task failed: {0}")]
    TaskFailed(String),

    /// There was an error formatting or parsing a date-time.
    #[error("invalid date-time: {0}")]
    InvalidDateTime(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    /// The HTTP status code the client should see for this error.
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidCredentials | Error::Unauthenticated => StatusCode::UNAUTHORIZED,
            Error::IncorrectPassword
            | Error::PasswordTooShort(_)
            | Error::InvalidEmail(_)
            | Error::InvalidPeriod(_)
            | Error::Validation(_)
            | Error::CategoryTypeMismatch(_) => StatusCode::BAD_REQUEST,
            Error::DefaultCategoryReadOnly => StatusCode::FORBIDDEN,
            Error::InvalidCategory
            | Error::TransactionNotFound
            | Error::UpdateMissingCategory
            | Error::DeleteMissingCategory
            | Error::UpdateMissingTransaction
            | Error::DeleteMissingTransaction
            | Error::NotFound => StatusCode::NOT_FOUND,
            Error::DuplicateEmail | Error::DuplicateCategoryName(..) | Error::CategoryInUse => {
                StatusCode::CONFLICT
            }
            Error::HashingError(_)
            | Error::SqlError(_)
            | Error::DatabaseLockError
            | Error::TaskFailed(_)
            | Error::InvalidDateTime(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message the client should see for this error.
    fn client_message(&self) -> String {
        match self {
            Error::UpdateMissingCategory | Error::DeleteMissingCategory => {
                "Category not found".to_owned()
            }
            Error::UpdateMissingTransaction | Error::DeleteMissingTransaction => {
                "Transaction not found".to_owned()
            }
            Error::NotFound => "The requested resource could not be found".to_owned(),
            Error::DefaultCategoryReadOnly => "Cannot modify default categories".to_owned(),
            error if error.status_code() == StatusCode::INTERNAL_SERVER_ERROR => {
                "An unexpected error occurred, check the server logs for more details.".to_owned()
            }
            error => error.to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        if status_code == StatusCode::INTERNAL_SERVER_ERROR {
            // Any errors that are not handled above are not intended to be shown to the client.
            tracing::error!("An unexpected error occurred: {}", self);
        }

        (status_code, Json(ErrorResponse::new(self.client_message()))).into_response()
    }
}
