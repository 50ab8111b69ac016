//! Delete command handlers.

use crate::args::DeleteByIdArgs;
use crate::commands::Out;
use crate::db::is_foreign_key_violation;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use anyhow::anyhow;

/// Deletes one of the user's transactions by ID. The deleted ID is returned on success.
pub async fn delete_transaction(config: Config, args: DeleteByIdArgs) -> Result<Out<i64>> {
    let DeleteByIdArgs { id, user_id } = args;
    let deleted = config
        .db()
        .delete_transaction(id, user_id)
        .await
        .pub_result(ErrorType::Database)?;
    if !deleted {
        return Err(anyhow!("Transaction {id} not found")).pub_result(ErrorType::Request);
    }
    Ok(Out::new(format!("Deleted transaction {id}"), id))
}

/// Deletes one of the user's own categories by ID. The deleted ID is returned on success.
///
/// Due to the `ON DELETE RESTRICT` foreign key constraint, a category cannot be deleted while any
/// transaction references it. Those transactions must be moved to another category or deleted
/// first.
pub async fn delete_category(config: Config, args: DeleteByIdArgs) -> Result<Out<i64>> {
    let DeleteByIdArgs { id, user_id } = args;
    let deleted = match config.db().delete_category(id, user_id).await {
        Ok(deleted) => deleted,
        Err(e) if is_foreign_key_violation(&e) => {
            return Err(anyhow!(
                "Cannot delete category {id}: it is still used by one or more transactions. \
                 Move or delete those transactions first."
            ))
            .pub_result(ErrorType::Request);
        }
        Err(e) => return Err(e).pub_result(ErrorType::Database),
    };
    if !deleted {
        return Err(anyhow!(
            "Category {id} not found among the categories of user {user_id}"
        ))
        .pub_result(ErrorType::Request);
    }
    Ok(Out::new(format!("Deleted category {id}"), id))
}
