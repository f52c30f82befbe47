//! Code for creating the user table and storing and fetching users.

use std::{
    fmt::Display,
    sync::{Arc, Mutex},
};

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error, PasswordHash,
    db::{from_unix_millis, to_unix_millis},
};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A user of the application.
///
/// The password hash is never serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The user's display name.
    pub name: String,
    /// The email address the user logs in with.
    pub email: String,
    /// The user's password hash.
    #[serde(skip_serializing)]
    pub password_hash: PasswordHash,
    /// When the user registered.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Handles the creation and retrieval of users.
pub trait UserStore {
    /// Create a new user.
    fn create(&self, name: &str, email: &str, password_hash: PasswordHash) -> Result<User, Error>;

    /// Get a user by their ID.
    fn get(&self, id: UserID) -> Result<User, Error>;

    /// Get a user by their email.
    ///
    /// Returns [Error::NotFound] if no user with the given email exists.
    fn get_by_email(&self, email: &str) -> Result<User, Error>;

    /// Change a user's name and email.
    fn update_profile(&self, id: UserID, name: &str, email: &str) -> Result<User, Error>;

    /// Replace a user's password hash.
    fn update_password(&self, id: UserID, password_hash: &PasswordHash) -> Result<(), Error>;
}

/// Creates and retrieves users to/from a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteUserStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteUserStore {
    /// Create a new user store.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    #[cfg(test)]
    pub(crate) fn connection(&self) -> &Arc<Mutex<Connection>> {
        &self.connection
    }
}

impl UserStore for SQLiteUserStore {
    /// Create and insert a new user into the database.
    ///
    /// # Errors
    ///
    /// Returns an [Error::DuplicateEmail] if the email is taken, or [Error::SqlError] if an SQL
    /// related error occurred.
    fn create(&self, name: &str, email: &str, password_hash: PasswordHash) -> Result<User, Error> {
        let connection = self
            .connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        create_user(name, email, &password_hash, &connection)
    }

    /// Get the user from the database that has the specified `id`, or return [Error::NotFound] if such user does not exist.
    fn get(&self, id: UserID) -> Result<User, Error> {
        self.connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?
            .prepare(
                "SELECT id, name, email, password, created_at FROM user WHERE id = :id",
            )?
            .query_row(&[(":id", &id.as_i64())], map_user_row)
            .map_err(|error| error.into())
    }

    /// Get the user from the database that has the specified `email` address, or return [Error::NotFound] if such user does not exist.
    fn get_by_email(&self, email: &str) -> Result<User, Error> {
        self.connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?
            .prepare(
                "SELECT id, name, email, password, created_at FROM user WHERE email = :email",
            )?
            .query_row(&[(":email", email)], map_user_row)
            .map_err(|error| error.into())
    }

    /// # Errors
    ///
    /// Returns an [Error::DuplicateEmail] if another user has `email`, or
    /// [Error::NotFound] if there is no user with `id`.
    fn update_profile(&self, id: UserID, name: &str, email: &str) -> Result<User, Error> {
        self.connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?
            .prepare(
                "UPDATE user SET name = ?1, email = ?2 WHERE id = ?3
                 RETURNING id, name, email, password, created_at",
            )?
            .query_row((name, email, id.as_i64()), map_user_row)
            .map_err(map_unique_email_error)
    }

    fn update_password(&self, id: UserID, password_hash: &PasswordHash) -> Result<(), Error> {
        let rows_affected = self
            .connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?
            .execute(
                "UPDATE user SET password = ?1 WHERE id = ?2",
                (password_hash.as_ref(), id.as_i64()),
            )?;

        match rows_affected {
            0 => Err(Error::NotFound),
            _ => Ok(()),
        }
    }
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT UNIQUE NOT NULL,
                password TEXT NOT NULL,
                created_at INTEGER NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new user into the database.
///
/// The caller should validate `name` and `email` beforehand.
///
/// # Errors
///
/// Returns an [Error::DuplicateEmail] if the email is taken, or [Error::SqlError] if an SQL
/// related error occurred.
pub fn create_user(
    name: &str,
    email: &str,
    password_hash: &PasswordHash,
    connection: &Connection,
) -> Result<User, Error> {
    connection
        .prepare(
            "INSERT INTO user (name, email, password, created_at) VALUES (?1, ?2, ?3, ?4)
             RETURNING id, name, email, password, created_at",
        )?
        .query_row(
            (
                name,
                email,
                password_hash.as_ref(),
                to_unix_millis(OffsetDateTime::now_utc()),
            ),
            map_user_row,
        )
        .map_err(map_unique_email_error)
}

fn map_unique_email_error(error: rusqlite::Error) -> Error {
    match error {
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: _,
                extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
            },
            _,
        ) => Error::DuplicateEmail,
        error => error.into(),
    }
}

fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_password_hash: String = row.get(3)?;

    Ok(User {
        id: UserID::new(row.get(0)?),
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
        created_at: from_unix_millis(row.get(4)?)?,
    })
}

#[cfg(test)]
mod user_tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;

    use crate::{Error, PasswordHash};

    use super::{SQLiteUserStore, UserID, UserStore, create_user_table};

    fn get_store() -> SQLiteUserStore {
        let conn =
            Connection::open_in_memory().expect("Could not create in-memory SQLite database");
        create_user_table(&conn).expect("Could not create user table");

        SQLiteUserStore::new(Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn insert_user_succeeds() {
        let store = get_store();
        let password_hash = PasswordHash::new_unchecked("hunter2");

        let user = store
            .create("Ada", "ada@example.com", password_hash.clone())
            .unwrap();

        assert!(user.id.as_i64() > 0);
        assert_eq!(user.name, "Ada");
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.password_hash, password_hash);
    }

    #[test]
    fn insert_user_with_duplicate_email_fails() {
        let store = get_store();
        let password_hash = PasswordHash::new_unchecked("hunter2");
        store
            .create("Ada", "ada@example.com", password_hash.clone())
            .unwrap();

        let result = store.create("Not Ada", "ada@example.com", password_hash);

        assert_eq!(result, Err(Error::DuplicateEmail));
    }

    #[test]
    fn get_user_by_id_and_email() {
        let store = get_store();
        let inserted = store
            .create("Ada", "ada@example.com", PasswordHash::new_unchecked("hunter2"))
            .unwrap();

        assert_eq!(store.get(inserted.id), Ok(inserted.clone()));
        assert_eq!(store.get_by_email("ada@example.com"), Ok(inserted));
    }

    #[test]
    fn get_missing_user_returns_not_found() {
        let store = get_store();

        assert_eq!(store.get(UserID::new(42)), Err(Error::NotFound));
        assert_eq!(store.get_by_email("nobody@example.com"), Err(Error::NotFound));
    }

    #[test]
    fn update_profile_rejects_email_of_other_user() {
        let store = get_store();
        let hash = PasswordHash::new_unchecked("hunter2");
        store.create("Ada", "ada@example.com", hash.clone()).unwrap();
        let grace = store.create("Grace", "grace@example.com", hash).unwrap();

        let result = store.update_profile(grace.id, "Grace", "ada@example.com");

        assert_eq!(result, Err(Error::DuplicateEmail));
    }

    #[test]
    fn update_profile_changes_name_and_email() {
        let store = get_store();
        let user = store
            .create("Ada", "ada@example.com", PasswordHash::new_unchecked("hunter2"))
            .unwrap();

        let updated = store
            .update_profile(user.id, "Ada Lovelace", "lovelace@example.com")
            .unwrap();

        assert_eq!(updated.name, "Ada Lovelace");
        assert_eq!(updated.email, "lovelace@example.com");
        assert_eq!(updated.created_at, user.created_at);
    }

    #[test]
    fn update_password_replaces_hash() {
        let store = get_store();
        let user = store
            .create("Ada", "ada@example.com", PasswordHash::new_unchecked("hunter2"))
            .unwrap();
        let new_hash = PasswordHash::new_unchecked("hunter3");

        store.update_password(user.id, &new_hash).unwrap();

        assert_eq!(store.get(user.id).unwrap().password_hash, new_hash);
    }

    #[test]
    fn serialized_user_hides_password() {
        let store = get_store();
        let user = store
            .create("Ada", "ada@example.com", PasswordHash::new_unchecked("hunter2"))
            .unwrap();

        let json = serde_json::to_value(&user).unwrap();

        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["email"], "ada@example.com");
        assert!(json["createdAt"].is_string());
    }
}
