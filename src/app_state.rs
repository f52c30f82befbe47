//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use rusqlite::Connection;
use sha2::{Digest, Sha512};
use time::Duration;

use crate::{
    Error,
    auth::DEFAULT_COOKIE_DURATION,
    category::SQLiteCategoryStore,
    dashboard::SQLiteDashboardStore,
    db::initialize,
    pagination::PaginationConfig,
    transaction::SQLiteTransactionStore,
    user::SQLiteUserStore,
};

/// The state of the REST server.
///
/// Every store shares the one database connection it was built from.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,

    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,

    /// The config that controls how to page lists of transactions.
    pub pagination_config: PaginationConfig,

    /// The store for users.
    pub user_store: SQLiteUserStore,

    /// The store for income and expense categories.
    pub category_store: SQLiteCategoryStore,

    /// The store for transactions.
    pub transaction_store: SQLiteTransactionStore,

    /// The read-only store the dashboard aggregates come from.
    pub dashboard_store: SQLiteDashboardStore,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models
    /// and seeding the default categories.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        cookie_secret: &str,
        cookie_duration: Duration,
        pagination_config: PaginationConfig,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        let connection = Arc::new(Mutex::new(db_connection));

        Ok(Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration,
            pagination_config,
            user_store: SQLiteUserStore::new(connection.clone()),
            category_store: SQLiteCategoryStore::new(connection.clone()),
            transaction_store: SQLiteTransactionStore::new(connection.clone()),
            dashboard_store: SQLiteDashboardStore::new(connection),
        })
    }

    /// Create a new [AppState] with the default cookie duration and pagination config.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn with_defaults(db_connection: Connection, cookie_secret: &str) -> Result<Self, Error> {
        Self::new(
            db_connection,
            cookie_secret,
            DEFAULT_COOKIE_DURATION,
            PaginationConfig::default(),
        )
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Create a signing key for cookies from a `secret`s string.
pub fn create_cookie_key(secret: &str) -> Key {
    let hash = Sha512::digest(secret);

    Key::from(&hash)
}

#[cfg(test)]
mod app_state_tests {
    use rusqlite::Connection;

    use crate::AppState;

    use super::create_cookie_key;

    #[test]
    fn same_secret_gives_same_key() {
        let first = create_cookie_key("hunter2");
        let second = create_cookie_key("hunter2");

        assert_eq!(first.master(), second.master());
    }

    #[test]
    fn new_initializes_database() {
        let state = AppState::with_defaults(Connection::open_in_memory().unwrap(), "42").unwrap();

        let connection = state.user_store.connection();
        let connection = connection.lock().unwrap();
        let table_count: i64 = connection
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' \
                 AND name IN ('user', 'category', 'transaction')",
                [],
                |row| row.get(0),
            )
            .unwrap();

        assert_eq!(table_count, 3);
    }
}
