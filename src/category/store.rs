//! Defines the category store trait and a SQLite backed implementation.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, OptionalExtension};

use crate::{
    Error,
    category::{Category, CategoryName, CategoryType, Color, map_category_row},
    database_id::CategoryId,
    user::UserID,
};

/// Creates, retrieves and changes categories.
///
/// A category is visible to a user if the user owns it or it is a default category.
pub trait CategoryStore {
    /// Create a category owned by `user_id`.
    fn create(
        &self,
        user_id: UserID,
        name: CategoryName,
        category_type: CategoryType,
        color: Color,
    ) -> Result<Category, Error>;

    /// Get a category visible to `user_id`.
    ///
    /// Returns [Error::NotFound] for categories owned by other users.
    fn get(&self, user_id: UserID, category_id: CategoryId) -> Result<Category, Error>;

    /// Get the categories visible to `user_id`, default categories first.
    ///
    /// If `category_type` is `None`, categories of both types are returned.
    fn get_by_type(
        &self,
        user_id: UserID,
        category_type: Option<CategoryType>,
    ) -> Result<Vec<Category>, Error>;

    /// Whether `user_id` already owns a category with `name` and `category_type`.
    fn name_exists(
        &self,
        user_id: UserID,
        name: &CategoryName,
        category_type: CategoryType,
    ) -> Result<bool, Error>;

    /// Change the name and/or colour of a category owned by `user_id`.
    fn update(
        &self,
        user_id: UserID,
        category_id: CategoryId,
        name: Option<CategoryName>,
        color: Option<Color>,
    ) -> Result<Category, Error>;

    /// Delete a category owned by `user_id`.
    ///
    /// Returns [Error::CategoryInUse] if transactions still refer to the category.
    fn delete(&self, user_id: UserID, category_id: CategoryId) -> Result<(), Error>;
}

/// Creates and retrieves categories to/from a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteCategoryStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteCategoryStore {
    /// Create a new category store with a SQLite database.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

const SELECT_CATEGORY: &str = "SELECT id, name, color, type, is_default, user_id FROM category";

impl CategoryStore for SQLiteCategoryStore {
    fn create(
        &self,
        user_id: UserID,
        name: CategoryName,
        category_type: CategoryType,
        color: Color,
    ) -> Result<Category, Error> {
        self.connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?
            .prepare(
                "INSERT INTO category (name, color, type, is_default, user_id)
                 VALUES (?1, ?2, ?3, 0, ?4)
                 RETURNING id, name, color, type, is_default, user_id",
            )?
            .query_row(
                (
                    name.as_ref(),
                    color.as_ref(),
                    category_type,
                    user_id.as_i64(),
                ),
                map_category_row,
            )
            .map_err(|error| error.into())
    }

    fn get(&self, user_id: UserID, category_id: CategoryId) -> Result<Category, Error> {
        self.connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?
            .prepare(&format!(
                "{SELECT_CATEGORY} WHERE id = ?1 AND (user_id = ?2 OR user_id IS NULL)"
            ))?
            .query_row((category_id, user_id.as_i64()), map_category_row)
            .map_err(|error| error.into())
    }

    fn get_by_type(
        &self,
        user_id: UserID,
        category_type: Option<CategoryType>,
    ) -> Result<Vec<Category>, Error> {
        self.connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?
            .prepare(&format!(
                "{SELECT_CATEGORY} WHERE (?1 IS NULL OR type = ?1) AND (user_id = ?2 OR user_id IS NULL)
                 ORDER BY is_default DESC, id ASC"
            ))?
            .query_map((category_type, user_id.as_i64()), map_category_row)?
            .map(|maybe_category| maybe_category.map_err(|error| error.into()))
            .collect()
    }

    fn name_exists(
        &self,
        user_id: UserID,
        name: &CategoryName,
        category_type: CategoryType,
    ) -> Result<bool, Error> {
        let count: i64 = self
            .connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?
            .query_row(
                "SELECT COUNT(id) FROM category WHERE user_id = ?1 AND name = ?2 AND type = ?3",
                (user_id.as_i64(), name.as_ref(), category_type),
                |row| row.get(0),
            )?;

        Ok(count > 0)
    }

    fn update(
        &self,
        user_id: UserID,
        category_id: CategoryId,
        name: Option<CategoryName>,
        color: Option<Color>,
    ) -> Result<Category, Error> {
        self.connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?
            .prepare(
                "UPDATE category
                 SET name = COALESCE(?1, name), color = COALESCE(?2, color)
                 WHERE id = ?3 AND user_id = ?4
                 RETURNING id, name, color, type, is_default, user_id",
            )?
            .query_row(
                (
                    name.as_ref().map(AsRef::as_ref),
                    color.as_ref().map(AsRef::as_ref),
                    category_id,
                    user_id.as_i64(),
                ),
                map_category_row,
            )
            .optional()?
            .ok_or(Error::UpdateMissingCategory)
    }

    fn delete(&self, user_id: UserID, category_id: CategoryId) -> Result<(), Error> {
        let rows_affected = self
            .connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?
            .execute(
                "DELETE FROM category WHERE id = ?1 AND user_id = ?2",
                (category_id, user_id.as_i64()),
            )
            .map_err(|error| match error {
                // `ON DELETE RESTRICT` fails as a trigger constraint rather than a foreign key one.
                rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error {
                        code: _,
                        extended_code:
                            rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY
                            | rusqlite::ffi::SQLITE_CONSTRAINT_TRIGGER,
                    },
                    _,
                ) => Error::CategoryInUse,
                error => error.into(),
            })?;

        match rows_affected {
            0 => Err(Error::DeleteMissingCategory),
            _ => Ok(()),
        }
    }
}
