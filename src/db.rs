//! Creates the application's tables in a SQLite database.

use rusqlite::{Connection, Transaction as SqlTransaction};

use crate::{
    Error,
    account::create_account_table,
    auth::create_user_table,
    category::{create_category_table, seed_built_in_categories},
    transaction::create_transaction_table,
};

/// Create the tables for the domain models and seed the built-in categories.
///
/// Safe to call on a database that has already been initialized.
///
/// # Errors
/// Returns an error if a table could not be created or the categories could not be seeded.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_account_table(&transaction)?;
    create_category_table(&transaction)?;
    create_transaction_table(&transaction)?;
    seed_built_in_categories(&transaction)?;

    transaction.commit()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use crate::{
        auth::UserID,
        category::{BUILT_IN_CATEGORIES, get_categories},
    };

    use super::initialize;

    #[test]
    fn initialize_is_idempotent() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).unwrap();
        initialize(&connection).unwrap();

        let categories = get_categories(UserID::new(1), &connection).unwrap();
        assert_eq!(categories.len(), BUILT_IN_CATEGORIES.len());
    }
}
