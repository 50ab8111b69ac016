//! List command handlers.

use crate::args::{ListCategoriesArgs, ListTransactionsArgs};
use crate::commands::{plural, validate, Out};
use crate::error::{ErrorType, IntoResult};
use crate::model::{Category, Transaction, TransactionFilter};
use crate::report::Ledger;
use crate::{Config, Result};

/// Lists a user's transactions, newest first, optionally restricted to a date range and a
/// category.
pub async fn list_transactions(
    config: Config,
    args: ListTransactionsArgs,
) -> Result<Out<Vec<Transaction>>> {
    validate::date_range(args.start, args.end).pub_result(ErrorType::Request)?;
    let filter = TransactionFilter {
        user_id: args.user_id,
        start: args.start,
        end: args.end,
        category_id: args.category_id,
    };
    let transactions = config
        .db()
        .list_transactions(&filter)
        .await
        .pub_result(ErrorType::Database)?;
    let count = transactions.len();
    Ok(Out::new(
        format!("Found {count} transaction{}", plural(count)),
        transactions,
    ))
}

/// Lists the shared categories and, when a user is given, that user's own categories.
pub async fn list_categories(
    config: Config,
    args: ListCategoriesArgs,
) -> Result<Out<Vec<Category>>> {
    let categories = config
        .db()
        .list_categories(args.user_id)
        .await
        .pub_result(ErrorType::Database)?;
    let count = categories.len();
    let message = format!(
        "Found {count} categor{}",
        if count == 1 { "y" } else { "ies" }
    );
    Ok(Out::new(message, categories))
}
