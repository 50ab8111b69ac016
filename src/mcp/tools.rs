//! The tools exposed by the MCP server. Each tool is a thin wrapper around a command handler.

use crate::args::{
    DeleteByIdArgs, ForecastArgs, InsertCategoryArgs, InsertTransactionArgs, ListCategoriesArgs,
    ListTransactionsArgs, SummaryArgs, UpdateCategoryArgs, UpdateTransactionArgs,
};
use crate::commands;
use crate::mcp::mcp_utils::tool_result;
use crate::mcp::FinanceServer;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use rmcp::ErrorData as McpError;
use rmcp::{tool, tool_router};
use tracing::info;

#[tool_router(vis = "pub(super)")]
impl FinanceServer {
    #[tool]
    /// Initialize the finance MCP service for this session and return usage instructions. You
    /// **MUST** call this **ONCE** before using other tools so that you have the full usage
    /// instructions. You **MAY** call it more than once if you have forgotten the usage
    /// instructions.
    async fn initialize_service(&self) -> Result<CallToolResult, McpError> {
        let mut initialized = self.initialized.lock().await;
        *initialized = true;
        Ok(CallToolResult::success(vec![rmcp::model::Content::text(
            include_str!("docs/INSTRUCTIONS.md"),
        )]))
    }

    /// List the shared categories and, when `user_id` is given, that user's own categories.
    ///
    /// Each category has an `id`, a `name`, a `type` (`income` or `expense`), a display `color`
    /// and `icon`, and a `user_id` that is null for shared categories.
    #[tool]
    async fn list_categories(
        &self,
        Parameters(args): Parameters<ListCategoriesArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        let config = (*self.config).clone();
        tool_result(commands::list_categories(config, args).await)
    }

    /// List a user's transactions, newest first. `start` and `end` (YYYY-MM-DD, inclusive) and
    /// `category_id` narrow the list.
    #[tool]
    async fn list_transactions(
        &self,
        Parameters(args): Parameters<ListTransactionsArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        let config = (*self.config).clone();
        tool_result(commands::list_transactions(config, args).await)
    }

    /// Record a transaction.
    ///
    /// # Rules
    ///
    /// - `amount` must be greater than zero. Use `type` to say whether it is `income` or
    ///   `expense`; never use a negative amount.
    /// - `category_id` must be a shared category or one owned by `user_id`, and its type must
    ///   match the transaction's `type`.
    /// - `transaction_date` defaults to today.
    ///
    /// # Example
    ///
    /// ```json
    /// {
    ///   "user_id": 1,
    ///   "amount": 42.10,
    ///   "type": "expense",
    ///   "category_id": 1,
    ///   "description": "Groceries",
    ///   "transaction_date": "2026-03-14"
    /// }
    /// ```
    #[tool]
    async fn insert_transaction(
        &self,
        Parameters(args): Parameters<InsertTransactionArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        info!("MCP: insert_transaction called for user {}", args.user_id);
        let config = (*self.config).clone();
        tool_result(commands::insert_transaction(config, args).await)
    }

    /// Create a category owned by `user_id`. `color` (#RRGGBB) and `icon` are optional. The name
    /// must not clash with a shared category or another of the user's categories of the same type.
    #[tool]
    async fn insert_category(
        &self,
        Parameters(args): Parameters<InsertCategoryArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        let config = (*self.config).clone();
        tool_result(commands::insert_category(config, args).await)
    }

    /// Change some fields of a transaction. Only the fields that are given are changed; give at
    /// least one of `amount`, `type`, `category_id`, `description` or `transaction_date`.
    ///
    /// The result must still be a valid transaction, so changing `type` usually means changing
    /// `category_id` in the same call.
    ///
    /// # Example
    ///
    /// ```json
    /// {
    ///   "id": 12,
    ///   "user_id": 1,
    ///   "description": "Weekly shopping"
    /// }
    /// ```
    #[tool]
    async fn update_transaction(
        &self,
        Parameters(args): Parameters<UpdateTransactionArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        let config = (*self.config).clone();
        tool_result(commands::update_transaction(config, args).await)
    }

    /// Change the `name`, `color` or `icon` of a category owned by `user_id`. Shared categories
    /// cannot be changed.
    #[tool]
    async fn update_category(
        &self,
        Parameters(args): Parameters<UpdateCategoryArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        let config = (*self.config).clone();
        tool_result(commands::update_category(config, args).await)
    }

    /// Permanently delete a transaction owned by `user_id`.
    #[tool]
    async fn delete_transaction(
        &self,
        Parameters(args): Parameters<DeleteByIdArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        let config = (*self.config).clone();
        tool_result(commands::delete_transaction(config, args).await)
    }

    /// Permanently delete a category owned by `user_id`.
    ///
    /// Due to an `ON DELETE RESTRICT` foreign key constraint, a category cannot be deleted while
    /// any transaction references it. Move those transactions with `update_transaction` or delete
    /// them first.
    #[tool]
    async fn delete_category(
        &self,
        Parameters(args): Parameters<DeleteByIdArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        let config = (*self.config).clone();
        tool_result(commands::delete_category(config, args).await)
    }

    /// Summarize one calendar month for a user: `total_income`, `total_expense`, `balance`, and
    /// `expenses_by_category` / `income_by_category` as lists of `{category, color, amount}`
    /// ordered from the largest amount down. `month` is from 1 to 12.
    #[tool]
    async fn monthly_summary(
        &self,
        Parameters(args): Parameters<SummaryArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        info!(
            "MCP: monthly_summary called for user {} and {}-{:02}",
            args.user_id, args.year, args.month
        );
        let config = (*self.config).clone();
        tool_result(commands::monthly_summary(config, args).await)
    }

    /// Forecast next month's expenses for a user.
    ///
    /// Expenses are totalled per month over the `months_back` months (default from the config
    /// file, usually 6) ending on `as_of` (default today). Months without expenses are skipped.
    /// A straight line is fitted through the totals: `current_average` is their mean, `trend`
    /// the change per month, and `next_month_prediction` is `current_average + trend`, never
    /// below zero. `historical_data` lists the monthly totals, oldest first.
    ///
    /// Fails with a report error when fewer than two months have expenses. This is a rough
    /// heuristic with no seasonality; present it to the user as such.
    #[tool]
    async fn forecast_expense(
        &self,
        Parameters(args): Parameters<ForecastArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        info!("MCP: forecast_expense called for user {}", args.user_id);
        let config = (*self.config).clone();
        tool_result(commands::forecast_expense(config, args).await)
    }
}
