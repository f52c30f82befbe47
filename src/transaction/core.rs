//! Defines the core data models and database queries for transactions.

use rusqlite::{Connection, Row};
use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    Error,
    category::{Category, map_category_row_with_offset},
    database_id::{CategoryId, TransactionId},
    db::{from_unix_millis, to_unix_millis},
    user::UserID,
};

// ============================================================================
// MODELS
// ============================================================================

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// Whether it is income or an expense is decided by its category.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user that recorded the transaction.
    pub user_id: UserID,
    /// The ID of the category the transaction belongs to.
    pub category_id: CategoryId,
    /// The amount of money spent or earned, always positive.
    pub amount: f64,
    /// A text description of what the transaction was for.
    pub description: String,
    /// When the transaction happened.
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    /// Whether the transaction repeats every month, e.g. rent or wages.
    pub is_recurring: bool,
}

/// A transaction together with the category it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionWithCategory {
    /// The transaction.
    #[serde(flatten)]
    pub transaction: Transaction,
    /// The transaction's category.
    pub category: Category,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        user_id: UserID,
        category_id: CategoryId,
        amount: f64,
        date: OffsetDateTime,
        description: &str,
    ) -> TransactionBuilder {
        TransactionBuilder {
            user_id,
            category_id,
            amount,
            date,
            description: description.to_owned(),
            is_recurring: false,
        }
    }
}

/// A builder for creating [Transaction] instances.
///
/// The caller should validate the amount and description beforehand.
///
/// # Examples
///
/// ```ignore
/// use time::macros::datetime;
///
/// use crate::transaction::Transaction;
///
/// let rent = Transaction::build(user_id, category_id, 1200.0, datetime!(2025-01-01 0:00 UTC), "Rent")
///     .recurring(true);
/// ```
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// The user that owns the transaction.
    pub user_id: UserID,
    /// The category of the transaction, e.g. "Food", "Transportation", "Salary".
    pub category_id: CategoryId,
    /// The positive amount of money that moved.
    pub amount: f64,
    /// When the money moved.
    pub date: OffsetDateTime,
    /// A human-readable description of the transaction.
    pub description: String,
    /// Whether the transaction repeats every month.
    ///
    /// Recurring transactions are used to predict the next month.
    pub is_recurring: bool,
}

impl TransactionBuilder {
    /// Mark whether the transaction repeats every month.
    pub fn recurring(mut self, is_recurring: bool) -> Self {
        self.is_recurring = is_recurring;
        self
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// The columns of a transaction, in the order [map_transaction_row] expects.
pub(crate) const TRANSACTION_COLUMNS: &str =
    "id, user_id, category_id, amount, description, date, is_recurring";

/// The columns of a transaction followed by the columns of its category.
pub(crate) const TRANSACTION_WITH_CATEGORY_COLUMNS: &str = "\"transaction\".id, \
    \"transaction\".user_id, \"transaction\".category_id, \"transaction\".amount, \
    \"transaction\".description, \"transaction\".date, \"transaction\".is_recurring, \
    category.id, category.name, category.color, category.type, category.is_default, \
    category.user_id";

/// Create a new transaction in the database from a builder.
///
/// The caller should check that the category is visible to the user.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidCategory] if the category ID does not refer to a real category,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(&format!(
            "INSERT INTO \"transaction\" (user_id, category_id, amount, description, date, is_recurring)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            (
                builder.user_id.as_i64(),
                builder.category_id,
                builder.amount,
                builder.description,
                to_unix_millis(builder.date),
                builder.is_recurring,
            ),
            map_transaction_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::InvalidCategory,
            error => error.into(),
        })
}

/// Create the transaction table in the database.
///
/// Dates are stored as Unix milliseconds.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                category_id INTEGER NOT NULL,
                amount REAL NOT NULL CHECK (amount > 0),
                description TEXT NOT NULL,
                date INTEGER NOT NULL,
                is_recurring INTEGER NOT NULL DEFAULT 0,
                FOREIGN KEY(user_id) REFERENCES user(id) ON DELETE CASCADE,
                FOREIGN KEY(category_id) REFERENCES category(id) ON DELETE RESTRICT
                )",
        (),
    )?;

    // Composite indexes used by the transaction list and the dashboard.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);",
        (),
    )?;
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_category ON \"transaction\"(category_id);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        category_id: row.get(2)?,
        amount: row.get(3)?,
        description: row.get(4)?,
        date: from_unix_millis(row.get(5)?)?,
        is_recurring: row.get(6)?,
    })
}

/// Map a row of [TRANSACTION_WITH_CATEGORY_COLUMNS] to a transaction and its category.
pub fn map_transaction_with_category_row(
    row: &Row,
) -> Result<TransactionWithCategory, rusqlite::Error> {
    Ok(TransactionWithCategory {
        transaction: map_transaction_row(row)?,
        category: map_category_row_with_offset(row, 7)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================
