/*! This module sets up the application's database and defines helpers shared by the SQLite stores. */

use rusqlite::{Connection, Transaction as SqlTransaction};
use time::OffsetDateTime;

use crate::{
    Error, category::create_category_table, category::seed_default_categories,
    transaction::create_transaction_table, user::create_user_table,
};

/// Create the tables for the domain models and seed the default categories.
///
/// Safe to call on a database that has already been initialized.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_category_table(&transaction)?;
    create_transaction_table(&transaction)?;
    seed_default_categories(&transaction)?;

    transaction.commit()?;

    Ok(())
}

/// Convert a date-time to the integer Unix milliseconds used for date columns.
///
/// Storing dates as integers keeps range filters and month bucketing numeric.
pub fn to_unix_millis(date_time: OffsetDateTime) -> i64 {
    (date_time.unix_timestamp_nanos() / 1_000_000) as i64
}

/// Convert integer Unix milliseconds from a date column back into a UTC date-time.
///
/// # Errors
/// Returns a [rusqlite::Error::FromSqlConversionFailure] if the value is out of range.
pub fn from_unix_millis(millis: i64) -> Result<OffsetDateTime, rusqlite::Error> {
    OffsetDateTime::from_unix_timestamp_nanos(millis as i128 * 1_000_000).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Integer,
            Box::new(error),
        )
    })
}

#[cfg(test)]
mod db_tests {
    use rusqlite::Connection;
    use time::macros::datetime;

    use super::{from_unix_millis, initialize, to_unix_millis};

    #[test]
    fn initialize_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        initialize(&conn).unwrap();
        initialize(&conn).unwrap();

        let default_count: i64 = conn
            .query_row("SELECT COUNT(*) FROM category WHERE is_default = 1", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(default_count, 13);
    }

    #[test]
    fn initialize_enables_foreign_keys() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        let enabled: i64 = conn
            .pragma_query_value(None, "foreign_keys", |row| row.get(0))
            .unwrap();

        assert_eq!(enabled, 1);
    }

    #[test]
    fn unix_millis_keeps_millisecond_precision() {
        let date_time = datetime!(2025-01-31 23:59:59.999 UTC);

        let millis = to_unix_millis(date_time);

        assert_eq!(from_unix_millis(millis).unwrap(), date_time);
    }
}
