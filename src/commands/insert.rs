//! Insert command handlers.

use crate::args::{InsertCategoryArgs, InsertTransactionArgs};
use crate::commands::{validate, Out};
use crate::db::is_unique_violation;
use crate::error::{ErrorType, IntoResult};
use crate::model::{Category, NewCategory, NewTransaction, Transaction, DEFAULT_COLOR, DEFAULT_ICON};
use crate::report::Ledger;
use crate::{Config, Result};
use chrono::Local;

/// Inserts a new transaction into the local SQLite database.
///
/// # Arguments
///
/// - `config` - The application configuration containing the database connection.
/// - `args` - The transaction data to insert. When `transaction_date` is not given, today's date
///   is used.
///
/// # Returns
///
/// On success, returns an `Out` containing a message and the stored transaction, including its
/// new ID.
///
/// # Errors
///
/// - Returns a request error if the amount is not greater than zero.
/// - Returns a request error if the category does not exist, belongs to another user, or is of
///   the other type.
/// - Returns an error if a database operation fails.
pub async fn insert_transaction(
    config: Config,
    args: InsertTransactionArgs,
) -> Result<Out<Transaction>> {
    validate::amount(args.amount).pub_result(ErrorType::Request)?;
    validate::category_for(&config, args.category_id, args.user_id, args.kind)
        .await
        .pub_result(ErrorType::Request)?;

    let new = NewTransaction {
        user_id: args.user_id,
        amount: args.amount,
        kind: args.kind,
        category_id: args.category_id,
        description: args.description.unwrap_or_default(),
        transaction_date: args
            .transaction_date
            .unwrap_or_else(|| Local::now().date_naive()),
    };

    let transaction = config
        .db()
        .insert_transaction(&new)
        .await
        .pub_result(ErrorType::Database)?;

    let message = format!(
        "Inserted {} transaction {} of {}",
        transaction.kind, transaction.id, transaction.amount
    );
    Ok(Out::new(message, transaction))
}

/// Inserts a new category owned by `args.user_id` into the local SQLite database.
///
/// # Errors
///
/// - Returns a request error if the name is blank or the color is not `#RRGGBB`.
/// - Returns a request error if the user already has a category (or there is a shared one) with
///   the same name and type.
/// - Returns an error if a database operation fails.
pub async fn insert_category(config: Config, args: InsertCategoryArgs) -> Result<Out<Category>> {
    let name = validate::name(&args.name).pub_result(ErrorType::Request)?;
    let color = args.color.unwrap_or_else(|| DEFAULT_COLOR.to_string());
    validate::color(&color).pub_result(ErrorType::Request)?;

    let shared = config
        .db()
        .list_categories(None)
        .await
        .pub_result(ErrorType::Database)?;
    if shared.iter().any(|c| c.name == name && c.kind == args.kind) {
        return Err(anyhow::anyhow!(
            "Cannot insert category: a shared {} category named '{name}' already exists.",
            args.kind
        ))
        .pub_result(ErrorType::Request);
    }

    let new = NewCategory {
        name: name.clone(),
        kind: args.kind,
        color,
        icon: args.icon.unwrap_or_else(|| DEFAULT_ICON.to_string()),
        user_id: Some(args.user_id),
    };

    let category = match config.db().insert_category(&new).await {
        Ok(category) => category,
        Err(e) if is_unique_violation(&e) => {
            return Err(anyhow::anyhow!(
                "Cannot insert category: '{name}' already exists."
            ))
            .pub_result(ErrorType::Request);
        }
        Err(e) => return Err(e).pub_result(ErrorType::Database),
    };

    let message = format!("Inserted category {}: {}", category.id, category.name);
    Ok(Out::new(message, category))
}
