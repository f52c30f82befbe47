//! Reads the aggregates behind the dashboard from the database.

use std::{
    future::Future,
    sync::{Arc, Mutex},
};

use rusqlite::Connection;
use time::Month;

use crate::{
    Error,
    category::CategoryType,
    dashboard::models::{CategoryAggregation, MonthlyAggregation, PeriodSummary, RecurringSummary},
    db::to_unix_millis,
    period::{DateRange, YearMonth},
    user::UserID,
};

/// Computes the totals the dashboard is built from.
///
/// Every method is scoped to one user and only reads. The methods are independent of
/// each other so callers may run them concurrently.
pub trait DashboardStore {
    /// Total income and expenses in `range`.
    fn period_summary(
        &self,
        user_id: UserID,
        range: DateRange,
    ) -> impl Future<Output = Result<PeriodSummary, Error>> + Send;

    /// Totals per month and category type for the `months_count` months ending with `anchor`.
    ///
    /// Months without transactions are omitted.
    fn monthly_aggregations(
        &self,
        user_id: UserID,
        anchor: YearMonth,
        months_count: usize,
    ) -> impl Future<Output = Result<Vec<MonthlyAggregation>, Error>> + Send;

    /// The total spent in each expense category in `range`.
    ///
    /// Categories without expenses in `range` are omitted.
    fn expenses_by_category(
        &self,
        user_id: UserID,
        range: DateRange,
    ) -> impl Future<Output = Result<Vec<CategoryAggregation>, Error>> + Send;

    /// Totals and counts of the recurring transactions in `range`.
    fn recurring_summary(
        &self,
        user_id: UserID,
        range: DateRange,
    ) -> impl Future<Output = Result<RecurringSummary, Error>> + Send;
}

/// Reads dashboard aggregates from a SQLite database.
///
/// Queries run on tokio's blocking thread pool.
#[derive(Debug, Clone)]
pub struct SQLiteDashboardStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteDashboardStore {
    /// Create a new dashboard store.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    /// Run `query` against the database on the blocking thread pool.
    async fn run<T, F>(&self, query: F) -> Result<T, Error>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, Error> + Send + 'static,
    {
        let connection = self.connection.clone();

        tokio::task::spawn_blocking(move || {
            let connection = connection.lock().map_err(|_| Error::DatabaseLockError)?;
            query(&connection)
        })
        .await
        .map_err(|error| Error::TaskFailed(error.to_string()))?
    }
}

impl DashboardStore for SQLiteDashboardStore {
    async fn period_summary(
        &self,
        user_id: UserID,
        range: DateRange,
    ) -> Result<PeriodSummary, Error> {
        self.run(move |connection| {
            connection
                .query_row(
                    "SELECT
                        COALESCE(SUM(CASE WHEN category.type = 'income' THEN \"transaction\".amount ELSE 0.0 END), 0.0),
                        COALESCE(SUM(CASE WHEN category.type = 'expense' THEN \"transaction\".amount ELSE 0.0 END), 0.0)
                     FROM \"transaction\"
                     INNER JOIN category ON category.id = \"transaction\".category_id
                     WHERE \"transaction\".user_id = ?1
                        AND \"transaction\".date BETWEEN ?2 AND ?3",
                    (
                        user_id.as_i64(),
                        to_unix_millis(range.start),
                        to_unix_millis(range.end),
                    ),
                    |row| {
                        Ok(PeriodSummary {
                            total_income: row.get(0)?,
                            total_expenses: row.get(1)?,
                        })
                    },
                )
                .map_err(Error::from)
        })
        .await
    }

    async fn monthly_aggregations(
        &self,
        user_id: UserID,
        anchor: YearMonth,
        months_count: usize,
    ) -> Result<Vec<MonthlyAggregation>, Error> {
        let Some(&first_month) = anchor.trailing(months_count).first() else {
            return Ok(Vec::new());
        };
        let start = to_unix_millis(first_month.start()?);
        let end = to_unix_millis(anchor.end()?);

        self.run(move |connection| {
            connection
                .prepare(
                    "SELECT
                        CAST(strftime('%Y', \"transaction\".date / 1000.0, 'unixepoch') AS INTEGER) AS year,
                        CAST(strftime('%m', \"transaction\".date / 1000.0, 'unixepoch') AS INTEGER) AS month,
                        category.type,
                        SUM(\"transaction\".amount)
                     FROM \"transaction\"
                     INNER JOIN category ON category.id = \"transaction\".category_id
                     WHERE \"transaction\".user_id = ?1
                        AND \"transaction\".date BETWEEN ?2 AND ?3
                     GROUP BY year, month, category.type
                     ORDER BY year ASC, month ASC, category.type ASC",
                )?
                .query_map((user_id.as_i64(), start, end), |row| {
                    let year: i32 = row.get(0)?;
                    let month: u8 = row.get(1)?;
                    let month = Month::try_from(month).map_err(|error| {
                        rusqlite::Error::FromSqlConversionFailure(
                            1,
                            rusqlite::types::Type::Integer,
                            Box::new(error),
                        )
                    })?;
                    let category_type: CategoryType = row.get(2)?;

                    Ok(MonthlyAggregation {
                        month: YearMonth::new(year, month),
                        category_type,
                        total: row.get(3)?,
                    })
                })?
                .map(|aggregation_result| aggregation_result.map_err(Error::SqlError))
                .collect()
        })
        .await
    }

    async fn expenses_by_category(
        &self,
        user_id: UserID,
        range: DateRange,
    ) -> Result<Vec<CategoryAggregation>, Error> {
        self.run(move |connection| {
            connection
                .prepare(
                    "SELECT category.id, category.name, category.color, SUM(\"transaction\".amount)
                     FROM \"transaction\"
                     INNER JOIN category ON category.id = \"transaction\".category_id
                     WHERE \"transaction\".user_id = ?1
                        AND category.type = 'expense'
                        AND \"transaction\".date BETWEEN ?2 AND ?3
                     GROUP BY category.id, category.name, category.color
                     ORDER BY category.id ASC",
                )?
                .query_map(
                    (
                        user_id.as_i64(),
                        to_unix_millis(range.start),
                        to_unix_millis(range.end),
                    ),
                    |row| {
                        Ok(CategoryAggregation {
                            category_id: row.get(0)?,
                            category_name: row.get(1)?,
                            category_color: row.get(2)?,
                            total_amount: row.get(3)?,
                        })
                    },
                )?
                .map(|aggregation_result| aggregation_result.map_err(Error::SqlError))
                .collect()
        })
        .await
    }

    async fn recurring_summary(
        &self,
        user_id: UserID,
        range: DateRange,
    ) -> Result<RecurringSummary, Error> {
        self.run(move |connection| {
            connection
                .query_row(
                    "SELECT
                        COALESCE(SUM(CASE WHEN category.type = 'income' THEN \"transaction\".amount ELSE 0.0 END), 0.0),
                        COALESCE(SUM(CASE WHEN category.type = 'expense' THEN \"transaction\".amount ELSE 0.0 END), 0.0),
                        COALESCE(SUM(CASE WHEN category.type = 'income' THEN 1 ELSE 0 END), 0),
                        COALESCE(SUM(CASE WHEN category.type = 'expense' THEN 1 ELSE 0 END), 0)
                     FROM \"transaction\"
                     INNER JOIN category ON category.id = \"transaction\".category_id
                     WHERE \"transaction\".user_id = ?1
                        AND \"transaction\".is_recurring = 1
                        AND \"transaction\".date BETWEEN ?2 AND ?3",
                    (
                        user_id.as_i64(),
                        to_unix_millis(range.start),
                        to_unix_millis(range.end),
                    ),
                    |row| {
                        let income_count: i64 = row.get(2)?;
                        let expenses_count: i64 = row.get(3)?;

                        Ok(RecurringSummary {
                            total_income: row.get(0)?,
                            total_expenses: row.get(1)?,
                            income_count: income_count as u64,
                            expenses_count: expenses_count as u64,
                        })
                    },
                )
                .map_err(Error::from)
        })
        .await
    }
}

#[cfg(test)]
mod sqlite_dashboard_store_tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;
    use time::{Month, macros::datetime};

    use crate::{
        PasswordHash,
        category::CategoryType,
        dashboard::models::{MonthlyAggregation, PeriodSummary, RecurringSummary},
        db::initialize,
        period::YearMonth,
        transaction::{Transaction, create_transaction},
        user::{UserID, create_user},
    };

    use super::{DashboardStore, SQLiteDashboardStore};

    // IDs of seeded default categories.
    const SALARY: i64 = 1;
    const HOUSING: i64 = 6;
    const FOOD: i64 = 8;

    fn get_test_store() -> (SQLiteDashboardStore, UserID, UserID) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let hash = PasswordHash::new_unchecked("hunter2");
        let ada = create_user("Ada", "ada@example.com", &hash, &connection).unwrap();
        let grace = create_user("Grace", "grace@example.com", &hash, &connection).unwrap();

        let rows = [
            (ada.id, SALARY, 3000.0, datetime!(2025-01-01 09:00 UTC), true),
            (ada.id, HOUSING, 1200.0, datetime!(2025-01-02 09:00 UTC), true),
            (ada.id, FOOD, 50.0, datetime!(2025-01-15 18:00 UTC), false),
            (ada.id, FOOD, 25.0, datetime!(2025-01-31 23:59:59.999 UTC), false),
            (ada.id, FOOD, 40.0, datetime!(2024-12-20 12:00 UTC), false),
            (ada.id, SALARY, 2500.0, datetime!(2024-12-01 09:00 UTC), false),
            (ada.id, FOOD, 10.0, datetime!(2024-06-01 12:00 UTC), false),
            (grace.id, FOOD, 999.0, datetime!(2025-01-15 12:00 UTC), true),
        ];
        for (user_id, category_id, amount, date, is_recurring) in rows {
            create_transaction(
                Transaction::build(user_id, category_id, amount, date, "test")
                    .recurring(is_recurring),
                &connection,
            )
            .unwrap();
        }

        (
            SQLiteDashboardStore::new(Arc::new(Mutex::new(connection))),
            ada.id,
            grace.id,
        )
    }

    fn january() -> YearMonth {
        YearMonth::new(2025, Month::January)
    }

    #[tokio::test]
    async fn period_summary_sums_by_type() {
        let (store, ada, _) = get_test_store();

        let got = store
            .period_summary(ada, january().range().unwrap())
            .await
            .unwrap();

        assert_eq!(
            got,
            PeriodSummary {
                total_income: 3000.0,
                total_expenses: 1275.0,
            }
        );
    }

    #[tokio::test]
    async fn period_summary_is_zero_without_transactions() {
        let (store, ada, _) = get_test_store();

        let got = store
            .period_summary(ada, YearMonth::new(2030, Month::May).range().unwrap())
            .await
            .unwrap();

        assert_eq!(got, PeriodSummary::default());
    }

    #[tokio::test]
    async fn monthly_aggregations_cover_window_only() {
        let (store, ada, _) = get_test_store();

        let got = store.monthly_aggregations(ada, january(), 6).await.unwrap();

        assert_eq!(
            got,
            vec![
                MonthlyAggregation {
                    month: YearMonth::new(2024, Month::December),
                    category_type: CategoryType::Expense,
                    total: 40.0,
                },
                MonthlyAggregation {
                    month: YearMonth::new(2024, Month::December),
                    category_type: CategoryType::Income,
                    total: 2500.0,
                },
                MonthlyAggregation {
                    month: january(),
                    category_type: CategoryType::Expense,
                    total: 1275.0,
                },
                MonthlyAggregation {
                    month: january(),
                    category_type: CategoryType::Income,
                    total: 3000.0,
                },
            ]
        );
    }

    #[tokio::test]
    async fn expenses_by_category_groups_expenses_only() {
        let (store, ada, _) = get_test_store();

        let got = store
            .expenses_by_category(ada, january().range().unwrap())
            .await
            .unwrap();

        let totals: Vec<(i64, &str, f64)> = got
            .iter()
            .map(|row| (row.category_id, row.category_name.as_str(), row.total_amount))
            .collect();
        assert_eq!(totals, [(HOUSING, "Housing", 1200.0), (FOOD, "Food", 75.0)]);
    }

    #[tokio::test]
    async fn recurring_summary_counts_recurring_transactions() {
        let (store, ada, grace) = get_test_store();

        let got = store
            .recurring_summary(ada, january().range().unwrap())
            .await
            .unwrap();
        let other_user = store
            .recurring_summary(grace, january().range().unwrap())
            .await
            .unwrap();

        assert_eq!(
            got,
            RecurringSummary {
                total_income: 3000.0,
                total_expenses: 1200.0,
                income_count: 1,
                expenses_count: 1,
            }
        );
        assert_eq!(other_user.total_expenses, 999.0);
        assert_eq!(other_user.income_count, 0);
    }
}
