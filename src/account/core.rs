//! Accounts are where money is kept, e.g. a wallet, bank account or credit card.

use rusqlite::{Connection, Row, params};
use serde::Serialize;

use crate::{Error, UserID};

/// The database ID of an account.
pub type AccountId = i64;

/// The colour given to new accounts.
pub const DEFAULT_ACCOUNT_COLOR: &str = "#6366F1";

/// A place where a user keeps money.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Account {
    /// The id for the account.
    pub id: AccountId,
    /// The display name of the account.
    pub name: String,
    /// The hex colour used to mark the account in lists, e.g. "#6366F1".
    pub color: String,
}

/// The data needed to create or update an account.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAccount {
    name: String,
    color: String,
}

impl NewAccount {
    /// An account with the default colour.
    ///
    /// The name is validated when the account is saved.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            color: DEFAULT_ACCOUNT_COLOR.to_owned(),
        }
    }

    /// Set the display colour.
    pub fn color(mut self, color: &str) -> Self {
        self.color = color.to_owned();
        self
    }

    /// Check the name is not empty and the colour is a `#RRGGBB` hex colour.
    ///
    /// # Errors
    /// Returns [Error::EmptyName] or [Error::InvalidColor].
    fn validate(&self) -> Result<(&str, &str), Error> {
        let name = self.name.trim();

        if name.is_empty() {
            return Err(Error::EmptyName);
        }

        let color = self.color.trim();
        let is_hex_color = color.len() == 7
            && color.starts_with('#')
            && color[1..].chars().all(|c| c.is_ascii_hexdigit());

        if !is_hex_color {
            return Err(Error::InvalidColor(color.to_owned()));
        }

        Ok((name, color))
    }
}

/// Create the account table.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_account_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS account (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            color TEXT NOT NULL DEFAULT '#6366F1',
            FOREIGN KEY(user_id) REFERENCES user(id) ON DELETE CASCADE
        )",
        (),
    )?;

    Ok(())
}

/// Create an account owned by `user_id`.
///
/// # Errors
/// Returns [Error::EmptyName] or [Error::InvalidColor] if the account data is
/// invalid, or [Error::SqlError] if there is an SQL error.
pub fn create_account(
    account: &NewAccount,
    user_id: UserID,
    connection: &Connection,
) -> Result<Account, Error> {
    let (name, color) = account.validate()?;

    let account = connection
        .prepare(
            "INSERT INTO account (user_id, name, color) VALUES (?1, ?2, ?3)
             RETURNING id, name, color",
        )?
        .query_row(params![user_id.as_i64(), name, color], map_row_to_account)?;

    Ok(account)
}

/// Get `user_id`'s accounts in creation order.
///
/// # Errors
/// Returns [Error::SqlError] if there is an SQL error.
pub fn get_accounts(user_id: UserID, connection: &Connection) -> Result<Vec<Account>, Error> {
    connection
        .prepare("SELECT id, name, color FROM account WHERE user_id = :user_id ORDER BY id")?
        .query_map(&[(":user_id", &user_id.as_i64())], map_row_to_account)?
        .map(|maybe_account| maybe_account.map_err(Error::from))
        .collect()
}

/// Get one of `user_id`'s accounts.
///
/// # Errors
/// Returns [Error::NotFound] if the account does not exist or belongs to
/// another user, or [Error::SqlError] if there is some other SQL error.
pub fn get_account(
    id: AccountId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Account, Error> {
    let account = connection
        .prepare("SELECT id, name, color FROM account WHERE id = :id AND user_id = :user_id")?
        .query_row(
            &[(":id", &id), (":user_id", &user_id.as_i64())],
            map_row_to_account,
        )?;

    Ok(account)
}

/// The number of rows changed by a query.
pub type RowsAffected = usize;

/// Rename or recolour one of `user_id`'s accounts.
///
/// Returns the number of updated rows, zero if the account does not exist.
///
/// # Errors
/// Returns [Error::EmptyName] or [Error::InvalidColor] if the account data is
/// invalid, or [Error::SqlError] if there is an SQL error.
pub fn update_account(
    id: AccountId,
    account: &NewAccount,
    user_id: UserID,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    let (name, color) = account.validate()?;

    connection
        .execute(
            "UPDATE account SET name = ?1, color = ?2 WHERE id = ?3 AND user_id = ?4",
            params![name, color, id, user_id.as_i64()],
        )
        .map_err(Error::from)
}

/// Delete one of `user_id`'s accounts.
///
/// Transactions in the account are kept and shown without an account name.
///
/// # Errors
/// Returns [Error::SqlError] if there is an SQL error.
pub fn delete_account(
    id: AccountId,
    user_id: UserID,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    connection
        .execute(
            "DELETE FROM account WHERE id = ?1 AND user_id = ?2",
            params![id, user_id.as_i64()],
        )
        .map_err(Error::from)
}

pub fn map_row_to_account(row: &Row) -> Result<Account, rusqlite::Error> {
    let id = row.get(0)?;
    let name = row.get(1)?;
    let color = row.get(2)?;

    Ok(Account { id, name, color })
}
