//! This file defines the `Category` type and the types needed to create a category.
//! Every transaction belongs to exactly one category, and the category's type decides
//! whether the transaction counts as income or an expense.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};

use crate::{Error, database_id::CategoryId, user::UserID};

/// Whether a category holds money coming in or going out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryType {
    /// Money earned, e.g. wages.
    Income,
    /// Money spent, e.g. groceries.
    Expense,
}

impl CategoryType {
    /// The lowercase name used in JSON and in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryType::Income => "income",
            CategoryType::Expense => "expense",
        }
    }
}

impl Display for CategoryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CategoryType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(CategoryType::Income),
            "expense" => Ok(CategoryType::Expense),
            other => Err(Error::Validation(format!(
                "Invalid category type \"{other}\", expected \"income\" or \"expense\""
            ))),
        }
    }
}

impl ToSql for CategoryType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for CategoryType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

/// The name of a category.
///
/// Surrounding whitespace is removed and the rest must be 2 to 100 characters long.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// The fewest characters a category name may have.
    pub const MIN_LENGTH: usize = 2;
    /// The most characters a category name may have.
    pub const MAX_LENGTH: usize = 100;

    /// Create a category name.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Validation] if `name` is too short or too long after trimming.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();
        let length = name.chars().count();

        if length < Self::MIN_LENGTH {
            Err(Error::Validation(format!(
                "Category name must be at least {} characters",
                Self::MIN_LENGTH
            )))
        } else if length > Self::MAX_LENGTH {
            Err(Error::Validation(format!(
                "Category name max characters count is {}",
                Self::MAX_LENGTH
            )))
        } else {
            Ok(Self(name.to_owned()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is a trimmed, valid name.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because if the invariant is violated it will cause incorrect behaviour but not affect memory safety.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A colour in the `#RRGGBB` hex format.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Hash)]
pub struct Color(String);

impl Color {
    /// Create a colour.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Validation] if `color` is not `#` followed by six hex digits.
    pub fn new(color: &str) -> Result<Self, Error> {
        let is_valid = color.len() == 7
            && color.starts_with('#')
            && color[1..].chars().all(|c| c.is_ascii_hexdigit());

        if is_valid {
            Ok(Self(color.to_owned()))
        } else {
            Err(Error::Validation("Invalid color format".to_owned()))
        }
    }

    /// Create a colour without validation.
    pub fn new_unchecked(color: &str) -> Self {
        Self(color.to_owned())
    }
}

impl AsRef<str> for Color {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A category for expenses and income, e.g., 'Food', 'Transportation', 'Salary'.
///
/// Default categories have no owner, are visible to every user and cannot be changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// The ID of the category.
    pub id: CategoryId,
    /// The display name of the category.
    pub name: CategoryName,
    /// The colour used to draw the category in charts.
    pub color: Color,
    /// Whether the category is for income or expenses.
    #[serde(rename = "type")]
    pub category_type: CategoryType,
    /// Whether the category is shared by all users.
    pub is_default: bool,
    /// The owner of the category, `None` for default categories.
    pub user_id: Option<UserID>,
}

/// The categories every user starts with.
pub const DEFAULT_CATEGORIES: [(&str, CategoryType, &str); 13] = [
    ("Salary", CategoryType::Income, "#10B981"),
    ("Rent", CategoryType::Income, "#10B981"),
    ("Freelance", CategoryType::Income, "#3B82F6"),
    ("Investments", CategoryType::Income, "#8B5CF6"),
    ("Other Income", CategoryType::Income, "#6366F1"),
    ("Housing", CategoryType::Expense, "#EF4444"),
    ("Transportation", CategoryType::Expense, "#F59E0B"),
    ("Food", CategoryType::Expense, "#EC4899"),
    ("Utilities", CategoryType::Expense, "#14B8A6"),
    ("Healthcare", CategoryType::Expense, "#F43F5E"),
    ("Shopping", CategoryType::Expense, "#06B6D4"),
    ("Education", CategoryType::Expense, "#84CC16"),
    ("Other Expenses", CategoryType::Expense, "#64748B"),
];

/// Create the category table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            color TEXT NOT NULL,
            type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
            is_default INTEGER NOT NULL DEFAULT 0,
            user_id INTEGER REFERENCES user(id) ON DELETE CASCADE
        );
        CREATE UNIQUE INDEX IF NOT EXISTS default_category_name
            ON category(name, type) WHERE user_id IS NULL;
        CREATE INDEX IF NOT EXISTS category_user_id ON category(user_id);",
    )?;

    Ok(())
}

/// Insert the [DEFAULT_CATEGORIES] that are not in the database yet.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn seed_default_categories(connection: &Connection) -> Result<(), rusqlite::Error> {
    let mut statement = connection.prepare(
        "INSERT OR IGNORE INTO category (name, color, type, is_default, user_id)
         VALUES (?1, ?2, ?3, 1, NULL)",
    )?;

    for (name, category_type, color) in DEFAULT_CATEGORIES {
        statement.execute((name, color, category_type))?;
    }

    Ok(())
}

/// Map a row of `id, name, color, type, is_default, user_id` to a [Category].
pub fn map_category_row(row: &Row) -> Result<Category, rusqlite::Error> {
    map_category_row_with_offset(row, 0)
}

/// Like [map_category_row], but the category columns start at `offset`.
pub fn map_category_row_with_offset(row: &Row, offset: usize) -> Result<Category, rusqlite::Error> {
    let raw_name: String = row.get(offset + 1)?;
    let raw_color: String = row.get(offset + 2)?;
    let raw_user_id: Option<i64> = row.get(offset + 5)?;

    Ok(Category {
        id: row.get(offset)?,
        name: CategoryName::new_unchecked(&raw_name),
        color: Color::new_unchecked(&raw_color),
        category_type: row.get(offset + 3)?,
        is_default: row.get(offset + 4)?,
        user_id: raw_user_id.map(UserID::new),
    })
}

#[cfg(test)]
mod category_name_tests {
    use crate::Error;

    use super::CategoryName;

    #[test]
    fn new_fails_on_short_name() {
        assert!(matches!(CategoryName::new("a"), Err(Error::Validation(_))));
        assert!(matches!(CategoryName::new("  a  "), Err(Error::Validation(_))));
    }

    #[test]
    fn new_fails_on_long_name() {
        let name = "a".repeat(101);

        assert!(matches!(CategoryName::new(&name), Err(Error::Validation(_))));
    }

    #[test]
    fn new_trims_name() {
        let name = CategoryName::new("  Food  ").unwrap();

        assert_eq!(name.as_ref(), "Food");
    }

    #[test]
    fn new_counts_characters() {
        assert!(CategoryName::new("🔥🔥").is_ok());
    }
}


#[cfg(test)]
mod category_type_tests {
    use super::CategoryType;

    #[test]
    fn parses_and_displays_lowercase() {
        assert_eq!("income".parse::<CategoryType>().unwrap(), CategoryType::Income);
        assert_eq!(CategoryType::Expense.to_string(), "expense");
        assert!("Income".parse::<CategoryType>().is_err());
    }

    #[test]
    fn serializes_lowercase() {
        let got = serde_json::to_string(&CategoryType::Expense).unwrap();

        assert_eq!(got, "\"expense\"");
    }
}
