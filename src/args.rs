//! These structs provide the CLI interface for the finance CLI. Most of them are also the
//! parameter types of the matching MCP tools, which is why they derive `Deserialize` and
//! `JsonSchema` alongside `Parser`.

use crate::model::{Amount, CategoryUpdates, Kind, TransactionUpdates};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// finance: A command-line tool for keeping a personal ledger of income and expenses.
///
/// Transactions and categories are stored in a local SQLite database. From them the program
/// produces monthly summaries by category and a simple forecast of next month's expenses.
///
/// There is also a mode in which an AI agent can use this program through the mcp subcommand.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory, the configuration file and the database.
    ///
    /// This is the first command you should run. By default the data directory is
    /// $HOME/finance; pass --finance-home or set FINANCE_HOME to put it somewhere else.
    Init,
    /// Add a transaction or a category.
    Insert(InsertArgs),
    /// Change some fields of a transaction or a category.
    Update(UpdateArgs),
    /// Delete a transaction or a category.
    Delete(DeleteArgs),
    /// List transactions or categories.
    List(ListArgs),
    /// Show income, expenses and balance for one month, broken down by category.
    Summary(SummaryArgs),
    /// Forecast next month's expenses from the trend of recent months.
    Forecast(ForecastArgs),
    /// Run as an MCP server over stdio.
    Mcp(McpArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where the configuration and the database are held. Defaults to ~/finance
    #[arg(long, env = "FINANCE_HOME", default_value_t = default_finance_home())]
    finance_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, finance_home: PathBuf) -> Self {
        Self {
            log_level,
            finance_home: finance_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn finance_home(&self) -> &DisplayPath {
        &self.finance_home
    }
}

#[derive(Debug, Parser, Clone)]
pub struct InsertArgs {
    #[command(subcommand)]
    entity: InsertSubcommand,
}

impl InsertArgs {
    pub fn entity(&self) -> &InsertSubcommand {
        &self.entity
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum InsertSubcommand {
    /// Add a transaction.
    Transaction(InsertTransactionArgs),
    /// Add a category of your own.
    Category(InsertCategoryArgs),
}

/// Args for inserting a transaction.
#[derive(Debug, Clone, Parser, Serialize, Deserialize, JsonSchema)]
pub struct InsertTransactionArgs {
    /// The ID of the user that owns the transaction.
    #[arg(long = "user")]
    pub user_id: i64,

    /// The amount, which must be greater than zero. Whether money came in or went out is given
    /// by the type.
    #[arg(long)]
    #[schemars(with = "f64")]
    pub amount: Amount,

    /// Either income or expense. Must match the type of the category.
    #[arg(long = "type", value_enum)]
    #[serde(rename = "type")]
    pub kind: Kind,

    /// The ID of the category. It must be a shared category or one of the user's own.
    #[arg(long)]
    pub category_id: i64,

    /// A free-text description.
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// The date of the transaction, formatted as YYYY-MM-DD. Defaults to today.
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<String>")]
    pub transaction_date: Option<NaiveDate>,
}

/// Args for inserting a category.
#[derive(Debug, Clone, Parser, Serialize, Deserialize, JsonSchema)]
pub struct InsertCategoryArgs {
    /// The ID of the user that owns the category.
    #[arg(long = "user")]
    pub user_id: i64,

    /// The name of the category. Must be unique among the user's categories of the same type.
    #[arg(long)]
    pub name: String,

    /// Either income or expense.
    #[arg(long = "type", value_enum)]
    #[serde(rename = "type")]
    pub kind: Kind,

    /// A display color formatted as #RRGGBB. Defaults to #007bff.
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    /// A display icon, e.g. "fas fa-paw". Defaults to "fas fa-circle".
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

#[derive(Debug, Parser, Clone)]
pub struct UpdateArgs {
    #[command(subcommand)]
    entity: UpdateSubcommand,
}

impl UpdateArgs {
    pub fn entity(&self) -> &UpdateSubcommand {
        &self.entity
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum UpdateSubcommand {
    /// Change some fields of a transaction.
    Transaction(UpdateTransactionArgs),
    /// Change some fields of one of your own categories.
    Category(UpdateCategoryArgs),
}

/// Args for updating a transaction. Only the fields that are given are changed.
#[derive(Debug, Clone, Parser, Serialize, Deserialize, JsonSchema)]
pub struct UpdateTransactionArgs {
    /// The ID of the transaction to update.
    pub id: i64,

    /// The ID of the user that owns the transaction.
    #[arg(long = "user")]
    pub user_id: i64,

    #[command(flatten)]
    #[serde(flatten)]
    pub updates: TransactionUpdates,
}

/// Args for updating a category. Only the fields that are given are changed.
#[derive(Debug, Clone, Parser, Serialize, Deserialize, JsonSchema)]
pub struct UpdateCategoryArgs {
    /// The ID of the category to update.
    pub id: i64,

    /// The ID of the user that owns the category. Shared categories cannot be changed.
    #[arg(long = "user")]
    pub user_id: i64,

    #[command(flatten)]
    #[serde(flatten)]
    pub updates: CategoryUpdates,
}

#[derive(Debug, Parser, Clone)]
pub struct DeleteArgs {
    #[command(subcommand)]
    entity: DeleteSubcommand,
}

impl DeleteArgs {
    pub fn entity(&self) -> &DeleteSubcommand {
        &self.entity
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum DeleteSubcommand {
    /// Delete a transaction.
    Transaction(DeleteByIdArgs),
    /// Delete one of your own categories. Fails while any transaction uses it.
    Category(DeleteByIdArgs),
}

/// Args for deleting a transaction or a category.
#[derive(Debug, Clone, Parser, Serialize, Deserialize, JsonSchema)]
pub struct DeleteByIdArgs {
    /// The ID of the row to delete.
    pub id: i64,

    /// The ID of the user that owns the row.
    #[arg(long = "user")]
    pub user_id: i64,
}

#[derive(Debug, Parser, Clone)]
pub struct ListArgs {
    #[command(subcommand)]
    entity: ListSubcommand,
}

impl ListArgs {
    pub fn entity(&self) -> &ListSubcommand {
        &self.entity
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum ListSubcommand {
    /// List a user's transactions, newest first.
    Transactions(ListTransactionsArgs),
    /// List the shared categories and, optionally, a user's own.
    Categories(ListCategoriesArgs),
}

/// Args for listing transactions. Dates are inclusive.
#[derive(Debug, Clone, Parser, Serialize, Deserialize, JsonSchema)]
pub struct ListTransactionsArgs {
    /// The ID of the user whose transactions are listed.
    #[arg(long = "user")]
    pub user_id: i64,

    /// Only transactions on or after this date, formatted as YYYY-MM-DD.
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<String>")]
    pub start: Option<NaiveDate>,

    /// Only transactions on or before this date, formatted as YYYY-MM-DD.
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<String>")]
    pub end: Option<NaiveDate>,

    /// Only transactions in this category.
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
}

/// Args for listing categories.
#[derive(Debug, Clone, Default, Parser, Serialize, Deserialize, JsonSchema)]
pub struct ListCategoriesArgs {
    /// Include the categories owned by this user. Without it only the shared categories are
    /// listed.
    #[arg(long = "user")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
}

/// Args for the monthly summary.
#[derive(Debug, Clone, Parser, Serialize, Deserialize, JsonSchema)]
pub struct SummaryArgs {
    /// The ID of the user to summarize.
    #[arg(long = "user")]
    pub user_id: i64,

    /// The year, e.g. 2026.
    #[arg(long)]
    pub year: i32,

    /// The month, from 1 to 12.
    #[arg(long)]
    pub month: u32,
}

/// Args for the expense forecast.
#[derive(Debug, Clone, Parser, Serialize, Deserialize, JsonSchema)]
pub struct ForecastArgs {
    /// The ID of the user to forecast.
    #[arg(long = "user")]
    pub user_id: i64,

    /// How many trailing months to fit the trend to. Defaults to `forecast_months` in the config
    /// file, which defaults to 6.
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub months_back: Option<u32>,

    /// The last day of the trailing window, formatted as YYYY-MM-DD. Defaults to today.
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<String>")]
    pub as_of: Option<NaiveDate>,
}

/// Args for the `finance mcp` command.
#[derive(Debug, Parser, Clone)]
pub struct McpArgs {}

fn default_finance_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("finance"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --finance-home or FINANCE_HOME instead of relying on the \
                default finance home directory. If you continue using the program right now, you \
                may have problems!",
            );
            PathBuf::from("finance")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}
