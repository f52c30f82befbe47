//! Defines the transaction store trait and a SQLite backed implementation.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, OptionalExtension};
use time::{Month, OffsetDateTime};

use crate::{
    Error,
    database_id::{CategoryId, TransactionId},
    db::to_unix_millis,
    pagination::PageRequest,
    period::YearMonth,
    transaction::{
        Transaction, TransactionBuilder, TransactionWithCategory,
        core::{TRANSACTION_COLUMNS, TRANSACTION_WITH_CATEGORY_COLUMNS},
        create_transaction, map_transaction_row, map_transaction_with_category_row,
        query::{FILTERED_TRANSACTIONS, TransactionFilter},
    },
    user::UserID,
};

/// The fields of a transaction to change. `None` leaves a field as it is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionUpdate {
    /// The new category.
    pub category_id: Option<CategoryId>,
    /// The new amount.
    pub amount: Option<f64>,
    /// The new description.
    pub description: Option<String>,
    /// The new date.
    pub date: Option<OffsetDateTime>,
    /// Whether the transaction now repeats every month.
    pub is_recurring: Option<bool>,
}

impl TransactionUpdate {
    /// Whether the update leaves every field unchanged.
    pub fn is_empty(&self) -> bool {
        self.category_id.is_none()
            && self.amount.is_none()
            && self.description.is_none()
            && self.date.is_none()
            && self.is_recurring.is_none()
    }
}

/// The number of transactions matching a filter and the sum of their amounts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterTotals {
    /// How many transactions matched.
    pub count: u64,
    /// The sum of the matching amounts.
    pub sum: f64,
}

/// Handles the creation and retrieval of transactions.
///
/// Every method is scoped to one user. Transactions of other users are reported as missing.
pub trait TransactionStore {
    /// Create a new transaction.
    fn create(&self, builder: TransactionBuilder) -> Result<Transaction, Error>;

    /// Get a transaction and its category.
    fn get(&self, user_id: UserID, id: TransactionId) -> Result<TransactionWithCategory, Error>;

    /// Get one page of the transactions matching `filter`, newest first.
    fn list(
        &self,
        user_id: UserID,
        filter: &TransactionFilter,
        page: PageRequest,
    ) -> Result<Vec<TransactionWithCategory>, Error>;

    /// Count and sum all transactions matching `filter`.
    fn totals(&self, user_id: UserID, filter: &TransactionFilter) -> Result<FilterTotals, Error>;

    /// Change the given fields of a transaction.
    fn update(
        &self,
        user_id: UserID,
        id: TransactionId,
        update: TransactionUpdate,
    ) -> Result<Transaction, Error>;

    /// Delete a transaction.
    fn delete(&self, user_id: UserID, id: TransactionId) -> Result<(), Error>;

    /// The months in which the user has transactions, newest first.
    fn periods(&self, user_id: UserID) -> Result<Vec<YearMonth>, Error>;
}

/// Creates and retrieves transactions to/from a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteTransactionStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteTransactionStore {
    /// Create a new transaction store.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl TransactionStore for SQLiteTransactionStore {
    fn create(&self, builder: TransactionBuilder) -> Result<Transaction, Error> {
        let connection = self
            .connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        create_transaction(builder, &connection)
    }

    fn get(&self, user_id: UserID, id: TransactionId) -> Result<TransactionWithCategory, Error> {
        self.connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?
            .prepare(&format!(
                "SELECT {TRANSACTION_WITH_CATEGORY_COLUMNS} FROM \"transaction\"
                 INNER JOIN category ON category.id = \"transaction\".category_id
                 WHERE \"transaction\".id = ?1 AND \"transaction\".user_id = ?2"
            ))?
            .query_row((id, user_id.as_i64()), map_transaction_with_category_row)
            .map_err(|error| error.into())
    }

    fn list(
        &self,
        user_id: UserID,
        filter: &TransactionFilter,
        page: PageRequest,
    ) -> Result<Vec<TransactionWithCategory>, Error> {
        // Sort by date, and then ID to keep transaction order stable after updates
        let query = format!(
            "SELECT {TRANSACTION_WITH_CATEGORY_COLUMNS} {FILTERED_TRANSACTIONS}
             ORDER BY \"transaction\".date DESC, \"transaction\".id DESC
             LIMIT {} OFFSET {}",
            page.limit,
            page.offset()
        );

        self.connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?
            .prepare(&query)?
            .query_map(
                (
                    user_id.as_i64(),
                    to_unix_millis(filter.range.start),
                    to_unix_millis(filter.range.end),
                    filter.category_id,
                    filter.category_type,
                    filter.search_pattern(),
                ),
                map_transaction_with_category_row,
            )?
            .map(|transaction_result| transaction_result.map_err(Error::SqlError))
            .collect()
    }

    fn totals(&self, user_id: UserID, filter: &TransactionFilter) -> Result<FilterTotals, Error> {
        self.connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?
            .query_row(
                &format!(
                    "SELECT COUNT(\"transaction\".id), COALESCE(SUM(\"transaction\".amount), 0.0)
                     {FILTERED_TRANSACTIONS}"
                ),
                (
                    user_id.as_i64(),
                    to_unix_millis(filter.range.start),
                    to_unix_millis(filter.range.end),
                    filter.category_id,
                    filter.category_type,
                    filter.search_pattern(),
                ),
                |row| {
                    let count: i64 = row.get(0)?;

                    Ok(FilterTotals {
                        count: count as u64,
                        sum: row.get(1)?,
                    })
                },
            )
            .map_err(|error| error.into())
    }

    fn update(
        &self,
        user_id: UserID,
        id: TransactionId,
        update: TransactionUpdate,
    ) -> Result<Transaction, Error> {
        self.connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?
            .prepare(&format!(
                "UPDATE \"transaction\"
                 SET category_id = COALESCE(?1, category_id),
                     amount = COALESCE(?2, amount),
                     description = COALESCE(?3, description),
                     date = COALESCE(?4, date),
                     is_recurring = COALESCE(?5, is_recurring)
                 WHERE id = ?6 AND user_id = ?7
                 RETURNING {TRANSACTION_COLUMNS}"
            ))?
            .query_row(
                (
                    update.category_id,
                    update.amount,
                    update.description,
                    update.date.map(to_unix_millis),
                    update.is_recurring,
                    id,
                    user_id.as_i64(),
                ),
                map_transaction_row,
            )
            .optional()
            .map_err(|error| match error {
                rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error {
                        code: _,
                        extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                    },
                    _,
                ) => Error::InvalidCategory,
                error => error.into(),
            })?
            .ok_or(Error::UpdateMissingTransaction)
    }

    fn delete(&self, user_id: UserID, id: TransactionId) -> Result<(), Error> {
        let rows_affected = self
            .connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?
            .execute(
                "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
                (id, user_id.as_i64()),
            )?;

        match rows_affected {
            0 => Err(Error::DeleteMissingTransaction),
            _ => Ok(()),
        }
    }

    fn periods(&self, user_id: UserID) -> Result<Vec<YearMonth>, Error> {
        self.connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?
            .prepare(
                "SELECT DISTINCT
                    CAST(strftime('%Y', date / 1000.0, 'unixepoch') AS INTEGER) AS year,
                    CAST(strftime('%m', date / 1000.0, 'unixepoch') AS INTEGER) AS month
                 FROM \"transaction\"
                 WHERE user_id = ?1
                 ORDER BY year DESC, month DESC",
            )?
            .query_map([user_id.as_i64()], |row| {
                let year: i32 = row.get(0)?;
                let month: u8 = row.get(1)?;
                let month = Month::try_from(month).map_err(|error| {
                    rusqlite::Error::FromSqlConversionFailure(
                        1,
                        rusqlite::types::Type::Integer,
                        Box::new(error),
                    )
                })?;

                Ok(YearMonth::new(year, month))
            })?
            .map(|period_result| period_result.map_err(Error::SqlError))
            .collect()
    }
}

#[cfg(test)]
mod sqlite_transaction_store_tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;
    use time::{
        Month,
        macros::datetime,
    };

    use crate::{
        Error, PasswordHash,
        category::CategoryType,
        db::initialize,
        pagination::PageRequest,
        period::{DateRange, YearMonth},
        transaction::{Transaction, query::TransactionFilter},
        user::{UserID, create_user},
    };

    use super::{SQLiteTransactionStore, TransactionStore, TransactionUpdate};

    // IDs of seeded default categories.
    const SALARY: i64 = 1;
    const FOOD: i64 = 8;
    const SHOPPING: i64 = 11;

    fn get_test_store() -> (SQLiteTransactionStore, UserID, UserID) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let hash = PasswordHash::new_unchecked("hunter2");
        let ada = create_user("Ada", "ada@example.com", &hash, &connection).unwrap();
        let grace = create_user("Grace", "grace@example.com", &hash, &connection).unwrap();

        (
            SQLiteTransactionStore::new(Arc::new(Mutex::new(connection))),
            ada.id,
            grace.id,
        )
    }

    fn january() -> DateRange {
        YearMonth::new(2025, Month::January).range().unwrap()
    }

    fn seed_january(store: &SQLiteTransactionStore, user_id: UserID) {
        let rows = [
            (SALARY, 3000.0, datetime!(2025-01-01 09:00 UTC), "January wages"),
            (FOOD, 45.5, datetime!(2025-01-10 18:00 UTC), "Supermarket"),
            (FOOD, 12.0, datetime!(2025-01-12 08:00 UTC), "Coffee beans"),
            (SHOPPING, 99.99, datetime!(2025-01-31 23:59:59.999 UTC), "Shoes"),
            (FOOD, 20.0, datetime!(2025-02-01 00:00 UTC), "Bakery"),
        ];

        for (category_id, amount, date, description) in rows {
            store
                .create(Transaction::build(user_id, category_id, amount, date, description))
                .unwrap();
        }
    }

    #[test]
    fn list_is_scoped_to_range_and_user_newest_first() {
        let (store, ada, grace) = get_test_store();
        seed_january(&store, ada);
        seed_january(&store, grace);

        let got = store
            .list(ada, &TransactionFilter::in_range(january()), PageRequest { page: 1, limit: 10 })
            .unwrap();

        let descriptions: Vec<&str> = got
            .iter()
            .map(|row| row.transaction.description.as_str())
            .collect();
        assert_eq!(
            descriptions,
            ["Shoes", "Coffee beans", "Supermarket", "January wages"]
        );
        assert!(got.iter().all(|row| row.transaction.user_id == ada));
        assert_eq!(got[0].category.name.as_ref(), "Shopping");
    }

    #[test]
    fn list_pages_results() {
        let (store, ada, _) = get_test_store();
        seed_january(&store, ada);

        let got = store
            .list(ada, &TransactionFilter::in_range(january()), PageRequest { page: 2, limit: 3 })
            .unwrap();

        assert_eq!(got.len(), 1);
        assert_eq!(got[0].transaction.description, "January wages");
    }

    #[test]
    fn totals_respect_filters() {
        let (store, ada, _) = get_test_store();
        seed_january(&store, ada);

        let expenses = TransactionFilter {
            category_type: Some(CategoryType::Expense),
            ..TransactionFilter::in_range(january())
        };
        let food = TransactionFilter {
            category_id: Some(FOOD),
            ..TransactionFilter::in_range(january())
        };
        let search = TransactionFilter {
            search: Some("COFFEE".to_owned()),
            ..TransactionFilter::in_range(january())
        };

        let expense_totals = store.totals(ada, &expenses).unwrap();
        assert_eq!(expense_totals.count, 3);
        assert!((expense_totals.sum - 157.49).abs() < 1e-9);
        assert_eq!(store.totals(ada, &food).unwrap().count, 2);
        assert_eq!(store.totals(ada, &search).unwrap().count, 1);
    }

    #[test]
    fn totals_of_nothing_are_zero() {
        let (store, ada, _) = get_test_store();

        let got = store.totals(ada, &TransactionFilter::in_range(january())).unwrap();

        assert_eq!(got.count, 0);
        assert_eq!(got.sum, 0.0);
    }

    #[test]
    fn get_other_users_transaction_is_not_found() {
        let (store, ada, grace) = get_test_store();
        let transaction = store
            .create(Transaction::build(grace, FOOD, 5.0, datetime!(2025-01-01 0:00 UTC), "Tea"))
            .unwrap();

        assert_eq!(store.get(ada, transaction.id), Err(Error::NotFound));
        assert_eq!(store.get(grace, transaction.id).unwrap().transaction, transaction);
    }

    #[test]
    fn update_changes_only_given_fields() {
        let (store, ada, _) = get_test_store();
        let transaction = store
            .create(Transaction::build(ada, FOOD, 5.0, datetime!(2025-01-01 0:00 UTC), "Tea"))
            .unwrap();

        let updated = store
            .update(
                ada,
                transaction.id,
                TransactionUpdate {
                    amount: Some(7.5),
                    is_recurring: Some(true),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.amount, 7.5);
        assert!(updated.is_recurring);
        assert_eq!(updated.description, "Tea");
        assert_eq!(updated.date, transaction.date);
    }

    #[test]
    fn update_other_users_transaction_fails() {
        let (store, ada, grace) = get_test_store();
        let transaction = store
            .create(Transaction::build(grace, FOOD, 5.0, datetime!(2025-01-01 0:00 UTC), "Tea"))
            .unwrap();

        let result = store.update(
            ada,
            transaction.id,
            TransactionUpdate {
                amount: Some(1.0),
                ..Default::default()
            },
        );

        assert_eq!(result, Err(Error::UpdateMissingTransaction));
    }

    #[test]
    fn delete_removes_transaction_once() {
        let (store, ada, _) = get_test_store();
        let transaction = store
            .create(Transaction::build(ada, FOOD, 5.0, datetime!(2025-01-01 0:00 UTC), "Tea"))
            .unwrap();

        assert_eq!(store.delete(ada, transaction.id), Ok(()));
        assert_eq!(
            store.delete(ada, transaction.id),
            Err(Error::DeleteMissingTransaction)
        );
    }

    #[test]
    fn periods_are_distinct_and_newest_first() {
        let (store, ada, grace) = get_test_store();
        seed_january(&store, ada);
        store
            .create(Transaction::build(
                ada,
                FOOD,
                1.0,
                datetime!(2024-12-31 23:59:59.999 UTC),
                "Late",
            ))
            .unwrap();
        store
            .create(Transaction::build(grace, FOOD, 1.0, datetime!(2023-06-01 0:00 UTC), "Other"))
            .unwrap();

        let got = store.periods(ada).unwrap();

        assert_eq!(
            got,
            [
                YearMonth::new(2025, Month::February),
                YearMonth::new(2025, Month::January),
                YearMonth::new(2024, Month::December),
            ]
        );
    }
}
