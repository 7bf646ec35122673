//! Categories group transactions, e.g. "Food" for expenses or "Salary" for income.
//!
//! Built-in categories have no owner, are shared by every user and cannot be
//! changed. Users can add their own categories next to the built-in ones.

use rusqlite::{Connection, Row, params};
use serde::Serialize;

use crate::{Error, UserID, transaction::TransactionKind};

/// The database ID of a category.
pub type CategoryId = i64;

/// A label for grouping transactions of one [TransactionKind].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Category {
    /// The ID of the category.
    pub id: CategoryId,
    /// The display name.
    pub name: String,
    /// Whether the category is for income or expenses.
    pub kind: TransactionKind,
    /// The user that created the category, `None` for built-in categories.
    pub user_id: Option<UserID>,
}

impl Category {
    /// Whether the category ships with the app and is read-only.
    pub fn is_built_in(&self) -> bool {
        self.user_id.is_none()
    }
}

/// The categories every user starts with.
pub const BUILT_IN_CATEGORIES: [(&str, TransactionKind); 10] = [
    ("Food", TransactionKind::Expense),
    ("Transport", TransactionKind::Expense),
    ("Housing/Rent", TransactionKind::Expense),
    ("Utilities", TransactionKind::Expense),
    ("Shopping", TransactionKind::Expense),
    ("Health", TransactionKind::Expense),
    ("Entertainment", TransactionKind::Expense),
    ("Salary", TransactionKind::Income),
    ("Bonus", TransactionKind::Income),
    ("Investment", TransactionKind::Income),
];

/// A category name that is not empty or whitespace.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryName(String);

impl CategoryName {
    /// Trim and validate a category name.
    ///
    /// # Errors
    /// Returns [Error::EmptyName] if `name` is empty or only whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyName)
        } else {
            Ok(Self(name.to_owned()))
        }
    }

    /// The validated name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Create the category table.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            user_id INTEGER,
            name TEXT NOT NULL,
            kind TEXT NOT NULL CHECK (kind IN ('income', 'expense')),
            FOREIGN KEY(user_id) REFERENCES user(id) ON DELETE CASCADE
        )",
        (),
    )?;

    Ok(())
}

/// Add the [BUILT_IN_CATEGORIES] that are not in the database yet.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn seed_built_in_categories(connection: &Connection) -> Result<(), rusqlite::Error> {
    let mut statement = connection.prepare(
        "INSERT INTO category (user_id, name, kind)
         SELECT NULL, ?1, ?2
         WHERE NOT EXISTS (
            SELECT 1 FROM category WHERE user_id IS NULL AND name = ?1 AND kind = ?2
         )",
    )?;

    for (name, kind) in BUILT_IN_CATEGORIES {
        statement.execute(params![name, kind])?;
    }

    Ok(())
}

/// Create a category owned by `user_id`.
///
/// # Errors
/// Returns [Error::SqlError] if there is an SQL error.
pub fn create_category(
    name: &CategoryName,
    kind: TransactionKind,
    user_id: UserID,
    connection: &Connection,
) -> Result<Category, Error> {
    let category = connection
        .prepare(
            "INSERT INTO category (user_id, name, kind) VALUES (?1, ?2, ?3)
             RETURNING id, name, kind, user_id",
        )?
        .query_row(
            params![user_id.as_i64(), name.as_str(), kind],
            map_category_row,
        )?;

    Ok(category)
}

/// Get the categories `user_id` can use: the built-in categories followed by
/// the user's own, each in creation order.
///
/// # Errors
/// Returns [Error::SqlError] if there is an SQL error.
pub fn get_categories(user_id: UserID, connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare(
            "SELECT id, name, kind, user_id FROM category
             WHERE user_id IS NULL OR user_id = :user_id
             ORDER BY user_id IS NOT NULL, id",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_category_row)?
        .map(|maybe_category| maybe_category.map_err(Error::from))
        .collect()
}

/// Get a category that `user_id` can use.
///
/// # Errors
/// Returns [Error::NotFound] if the category does not exist or belongs to
/// another user, or [Error::SqlError] if there is some other SQL error.
pub fn get_category(
    id: CategoryId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Category, Error> {
    let category = connection
        .prepare(
            "SELECT id, name, kind, user_id FROM category
             WHERE id = :id AND (user_id IS NULL OR user_id = :user_id)",
        )?
        .query_row(
            &[(":id", &id), (":user_id", &user_id.as_i64())],
            map_category_row,
        )?;

    Ok(category)
}

/// Rename a category owned by `user_id` and change its kind.
///
/// # Errors
/// Returns:
/// - [Error::BuiltInCategory] if `id` refers to a built-in category,
/// - [Error::UpdateMissingCategory] if the category does not exist or belongs to another user,
/// - [Error::SqlError] if there is some other SQL error.
pub fn update_category(
    id: CategoryId,
    name: &CategoryName,
    kind: TransactionKind,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    match get_category(id, user_id, connection) {
        Ok(category) if category.is_built_in() => return Err(Error::BuiltInCategory),
        Ok(_) => {}
        Err(Error::NotFound) => return Err(Error::UpdateMissingCategory),
        Err(error) => return Err(error),
    }

    connection.execute(
        "UPDATE category SET name = ?1, kind = ?2 WHERE id = ?3 AND user_id = ?4",
        params![name.as_str(), kind, id, user_id.as_i64()],
    )?;

    Ok(())
}

/// Delete a category owned by `user_id`.
///
/// Transactions in the category keep their reference and are shown under "Other".
///
/// # Errors
/// Returns:
/// - [Error::BuiltInCategory] if `id` refers to a built-in category,
/// - [Error::DeleteMissingCategory] if the category does not exist or belongs to another user,
/// - [Error::SqlError] if there is some other SQL error.
pub fn delete_category(
    id: CategoryId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    match get_category(id, user_id, connection) {
        Ok(category) if category.is_built_in() => return Err(Error::BuiltInCategory),
        Ok(_) => {}
        Err(Error::NotFound) => return Err(Error::DeleteMissingCategory),
        Err(error) => return Err(error),
    }

    connection.execute(
        "DELETE FROM category WHERE id = ?1 AND user_id = ?2",
        params![id, user_id.as_i64()],
    )?;

    Ok(())
}

/// Map a database row to a [Category].
pub fn map_category_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let user_id: Option<i64> = row.get(3)?;

    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        kind: row.get(2)?,
        user_id: user_id.map(UserID::new),
    })
}
