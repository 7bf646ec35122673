//! Defines the core data models and database queries for transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::{Date, Time, format_description::BorrowedFormatItem, macros::format_description};

use crate::{Error, UserID, account::AccountId, category::CategoryId};

// ============================================================================
// MODELS
// ============================================================================

/// The database ID of a transaction.
pub type TransactionId = i64;

/// Whether money came in or went out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money that was spent.
    #[default]
    Expense,
    /// Money that was earned.
    Income,
}

impl TransactionKind {
    /// The lowercase name used in forms and the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Expense => "expense",
            TransactionKind::Income => "income",
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "expense" => Ok(TransactionKind::Expense),
            "income" => Ok(TransactionKind::Income),
            other => Err(format!("unknown transaction kind \"{other}\"")),
        }
    }
}

impl ToSql for TransactionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: String| FromSqlError::Other(error.into()))
    }
}

/// An income or expense recorded by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// Whether this is income or an expense.
    pub kind: TransactionKind,
    /// How much money moved. Always positive, [TransactionRecord::kind] gives the direction.
    pub amount: f64,
    /// When the transaction happened as `YYYY-MM-DD` or `YYYY-MM-DD HH:MM`.
    ///
    /// Keys in these formats sort chronologically when compared as strings.
    pub date: String,
    /// The account the money moved in or out of.
    pub account_id: AccountId,
    /// The category of the transaction, e.g. "Food" or "Salary".
    pub category_id: Option<CategoryId>,
    /// A free text description.
    pub note: Option<String>,
    /// The blob store key of the photo of the receipt.
    pub image_url: Option<String>,
}

impl TransactionRecord {
    /// Start building a new transaction.
    ///
    /// Shortcut for [NewTransaction] for discoverability.
    pub fn build(
        kind: TransactionKind,
        amount: f64,
        date: &str,
        account_id: AccountId,
    ) -> NewTransaction {
        NewTransaction {
            kind,
            amount,
            date: date.to_owned(),
            account_id,
            category_id: None,
            note: None,
            image_url: None,
        }
    }
}

/// A transaction that has not been saved to the database yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// Whether this is income or an expense.
    pub kind: TransactionKind,
    /// How much money moved.
    pub amount: f64,
    /// The date key, see [TransactionRecord::date].
    pub date: String,
    /// The account the money moved in or out of.
    pub account_id: AccountId,
    /// The category of the transaction.
    pub category_id: Option<CategoryId>,
    /// A free text description.
    pub note: Option<String>,
    /// The blob store key of the photo of the receipt.
    pub image_url: Option<String>,
}

impl NewTransaction {
    /// Set the category.
    pub fn category_id(mut self, category_id: Option<CategoryId>) -> Self {
        self.category_id = category_id;
        self
    }

    /// Set the note.
    pub fn note(mut self, note: Option<&str>) -> Self {
        self.note = note.map(ToOwned::to_owned);
        self
    }

    /// Set the receipt image key.
    pub fn image_url(mut self, image_url: Option<String>) -> Self {
        self.image_url = image_url;
        self
    }
}

/// A transaction together with the names of its account and category.
///
/// The names are `None` when the account or category has been deleted.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRow {
    /// The stored transaction.
    pub record: TransactionRecord,
    /// The name of the linked account.
    pub account_name: Option<String>,
    /// The display colour of the linked account.
    pub account_color: Option<String>,
    /// The name of the linked category.
    pub category_name: Option<String>,
}

const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");
const TIME_FORMAT: &[BorrowedFormatItem] = format_description!("[hour]:[minute]");

/// Build the date key for a transaction from a form's date and time inputs.
///
/// `date` must be `YYYY-MM-DD`. `time` must be `HH:MM` or empty, in which case
/// the key has no time part.
///
/// # Errors
/// Returns [Error::InvalidDate] if either input is malformed.
pub fn parse_date_key(date: &str, time: &str) -> Result<String, Error> {
    let date = date.trim();
    let time = time.trim();

    let parsed_date =
        Date::parse(date, DATE_FORMAT).map_err(|_| Error::InvalidDate(date.to_owned()))?;

    if time.is_empty() {
        return format_date_key(parsed_date, None);
    }

    let parsed_time =
        Time::parse(time, TIME_FORMAT).map_err(|_| Error::InvalidDate(time.to_owned()))?;

    format_date_key(parsed_date, Some(parsed_time))
}

/// Format a date, and optionally a time of day, as a date key.
///
/// # Errors
/// Returns [Error::InvalidDate] if the date cannot be formatted.
pub fn format_date_key(date: Date, time: Option<Time>) -> Result<String, Error> {
    let date_string = date
        .format(DATE_FORMAT)
        .map_err(|error| Error::InvalidDate(error.to_string()))?;

    match time {
        Some(time) => {
            let time_string = time
                .format(TIME_FORMAT)
                .map_err(|error| Error::InvalidDate(error.to_string()))?;
            Ok(format!("{date_string} {time_string}"))
        }
        None => Ok(date_string),
    }
}

/// Split a date key into its date and time parts.
pub fn split_date_key(date_key: &str) -> (&str, Option<&str>) {
    match date_key.split_once(' ') {
        Some((date, time)) => (date, Some(time)),
        None => (date_key, None),
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the transaction table in the database.
///
/// Account and category IDs are plain references without foreign keys, so
/// deleting an account or category leaves its transactions in place.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                kind TEXT NOT NULL CHECK (kind IN ('income', 'expense')),
                amount REAL NOT NULL,
                date TEXT NOT NULL,
                account_id INTEGER NOT NULL,
                category_id INTEGER,
                note TEXT,
                image_url TEXT,
                created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now')),
                FOREIGN KEY(user_id) REFERENCES user(id) ON DELETE CASCADE
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);",
        (),
    )?;

    Ok(())
}

/// Create a new transaction for `user_id`.
///
/// # Errors
/// Returns [Error::SqlError] if there is an SQL error.
pub fn create_transaction(
    transaction: NewTransaction,
    user_id: UserID,
    connection: &Connection,
) -> Result<TransactionRecord, Error> {
    let record = connection
        .prepare(
            "INSERT INTO \"transaction\" \
                (user_id, kind, amount, date, account_id, category_id, note, image_url) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8) \
             RETURNING id, kind, amount, date, account_id, category_id, note, image_url",
        )?
        .query_row(
            (
                user_id.as_i64(),
                transaction.kind,
                transaction.amount,
                transaction.date,
                transaction.account_id,
                transaction.category_id,
                transaction.note,
                transaction.image_url,
            ),
            map_transaction_row,
        )?;

    Ok(record)
}

/// Retrieve one of `user_id`'s transactions by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction owned by `user_id`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<TransactionRecord, Error> {
    let transaction = connection
        .prepare(
            "SELECT id, kind, amount, date, account_id, category_id, note, image_url \
             FROM \"transaction\" WHERE id = :id AND user_id = :user_id",
        )?
        .query_row(
            &[(":id", &id), (":user_id", &user_id.as_i64())],
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Get all of `user_id`'s transactions with their account and category names,
/// newest first.
///
/// Transactions dated the same are ordered by when they were recorded, newest first.
///
/// # Errors
/// Returns [Error::SqlError] if there is an SQL error.
pub fn get_transaction_rows(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<TransactionRow>, Error> {
    connection
        .prepare(
            "SELECT t.id, t.kind, t.amount, t.date, t.account_id, t.category_id, t.note, \
                t.image_url, a.name, a.color, c.name \
             FROM \"transaction\" t \
             LEFT JOIN account a ON a.id = t.account_id AND a.user_id = t.user_id \
             LEFT JOIN category c ON c.id = t.category_id \
                AND (c.user_id IS NULL OR c.user_id = t.user_id) \
             WHERE t.user_id = :user_id \
             ORDER BY t.date DESC, t.created_at DESC, t.id DESC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], |row| {
            Ok(TransactionRow {
                record: map_transaction_row(row)?,
                account_name: row.get(8)?,
                account_color: row.get(9)?,
                category_name: row.get(10)?,
            })
        })?
        .map(|maybe_row| maybe_row.map_err(Error::from))
        .collect()
}

/// The number of rows changed by a query.
pub type RowsAffected = usize;

/// Delete one of `user_id`'s transactions.
///
/// Returns the number of deleted rows, zero if the transaction does not exist
/// or belongs to another user.
///
/// # Errors
/// Returns [Error::SqlError] if there is an SQL error.
pub fn delete_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    connection
        .execute(
            "DELETE FROM \"transaction\" WHERE id = :id AND user_id = :user_id",
            &[(":id", &id), (":user_id", &user_id.as_i64())],
        )
        .map_err(Error::from)
}

/// Whether `user_id` has a transaction with the receipt image `image_url`.
///
/// # Errors
/// Returns [Error::SqlError] if there is an SQL error.
pub fn user_owns_image(
    image_url: &str,
    user_id: UserID,
    connection: &Connection,
) -> Result<bool, Error> {
    connection
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM \"transaction\" \
                WHERE image_url = :image_url AND user_id = :user_id)",
            &[
                (":image_url", &image_url as &dyn ToSql),
                (":user_id", &user_id.as_i64()),
            ],
            |row| row.get(0),
        )
        .map_err(Error::from)
}

/// Map a database row to a [TransactionRecord].
pub fn map_transaction_row(row: &Row) -> Result<TransactionRecord, rusqlite::Error> {
    Ok(TransactionRecord {
        id: row.get(0)?,
        kind: row.get(1)?,
        amount: row.get(2)?,
        date: row.get(3)?,
        account_id: row.get(4)?,
        category_id: row.get(5)?,
        note: row.get(6)?,
        image_url: row.get(7)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================
