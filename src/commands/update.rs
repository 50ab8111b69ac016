//! Update command handlers.

use crate::args::{UpdateCategoryArgs, UpdateTransactionArgs};
use crate::commands::{validate, Out};
use crate::db::{is_unique_violation, UpdateOutcome};
use crate::error::{ErrorType, IntoResult};
use crate::model::{Category, Transaction};
use crate::{Config, Result};
use anyhow::anyhow;
use tracing::debug;

/// Updates a transaction by ID with the specified field changes. Fields that are not given keep
/// their current values.
///
/// The transaction as it would look after the update is validated the same way a new transaction
/// is: the amount must be positive and the category must be usable by the user for the
/// transaction's type. This catches, for example, a change of type that no longer matches the
/// existing category.
///
/// # Returns
///
/// On success, returns an `Out` containing a message and the updated `Transaction`.
///
/// # Errors
///
/// - Returns a request error if no updatable field was given.
/// - Returns a request error if the transaction does not exist or belongs to another user.
/// - Returns a request error if the updated transaction would be invalid.
/// - Returns an error if a database operation fails.
pub async fn update_transaction(
    config: Config,
    args: UpdateTransactionArgs,
) -> Result<Out<Transaction>> {
    let UpdateTransactionArgs {
        id,
        user_id,
        updates,
    } = args;

    let current = config
        .db()
        .get_transaction(id, user_id)
        .await
        .pub_result(ErrorType::Database)?
        .ok_or_else(|| anyhow!("Transaction {id} not found"))
        .pub_result(ErrorType::Request)?;

    let merged = updates.apply_to(&current);
    if updates.amount.is_some() {
        validate::amount(merged.amount).pub_result(ErrorType::Request)?;
    }
    if updates.kind.is_some() || updates.category_id.is_some() {
        validate::category_for(&config, merged.category_id, user_id, merged.kind)
            .await
            .pub_result(ErrorType::Request)?;
    }

    let outcome = config
        .db()
        .update_transaction(id, user_id, &updates)
        .await
        .pub_result(ErrorType::Database)?;
    debug!("Update of transaction {id}: {outcome:?}");

    match outcome {
        UpdateOutcome::Updated(transaction) => {
            Ok(Out::new(format!("Updated transaction {id}"), transaction))
        }
        UpdateOutcome::NothingToUpdate => Err(anyhow!(
            "Nothing to update: give at least one of amount, type, category_id, description or \
             transaction_date"
        ))
        .pub_result(ErrorType::Request),
        UpdateOutcome::NotFound => {
            Err(anyhow!("Transaction {id} not found")).pub_result(ErrorType::Request)
        }
    }
}

/// Updates one of the user's own categories. Shared categories cannot be changed.
///
/// # Errors
///
/// - Returns a request error if no updatable field was given.
/// - Returns a request error if the category does not exist, is shared, or belongs to another
///   user.
/// - Returns a request error if the new name is blank, already taken, or the new color is not
///   `#RRGGBB`.
/// - Returns an error if a database operation fails.
pub async fn update_category(config: Config, args: UpdateCategoryArgs) -> Result<Out<Category>> {
    let UpdateCategoryArgs {
        id,
        user_id,
        mut updates,
    } = args;

    if let Some(name) = &updates.name {
        updates.name = Some(validate::name(name).pub_result(ErrorType::Request)?);
    }
    if let Some(color) = &updates.color {
        validate::color(color).pub_result(ErrorType::Request)?;
    }

    let outcome = match config.db().update_category(id, user_id, &updates).await {
        Ok(outcome) => outcome,
        Err(e) if is_unique_violation(&e) => {
            return Err(anyhow!(
                "Cannot update category {id}: the new name is already taken."
            ))
            .pub_result(ErrorType::Request);
        }
        Err(e) => return Err(e).pub_result(ErrorType::Database),
    };

    match outcome {
        UpdateOutcome::Updated(category) => {
            Ok(Out::new(format!("Updated category {id}"), category))
        }
        UpdateOutcome::NothingToUpdate => {
            Err(anyhow!("Nothing to update: give at least one of name, color or icon"))
                .pub_result(ErrorType::Request)
        }
        UpdateOutcome::NotFound => Err(anyhow!(
            "Category {id} not found among the categories of user {user_id}"
        ))
        .pub_result(ErrorType::Request),
    }
}
