//! This module is responsible for reading, writing and managing the SQLite database

mod assign;
mod migrations;

pub(crate) use assign::SqlValue;

use crate::model::{
    Amount, Category, CategoryUpdates, Kind, NewCategory, NewTransaction, Transaction,
    TransactionFilter, TransactionUpdates,
};
use crate::report::Ledger;
use crate::Result;
use anyhow::{bail, Context};
use assign::Assignments;
use chrono::NaiveDate;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

const TRANSACTION_COLUMNS: &str =
    "id, user_id, amount, kind, category_id, description, transaction_date, created_at";

const CATEGORY_COLUMNS: &str = "id, name, kind, color, icon, user_id";

/// The transaction columns that an update may change.
const TRANSACTION_UPDATABLE: &[&str] = &[
    "amount",
    "kind",
    "category_id",
    "description",
    "transaction_date",
];

/// The category columns that an update may change.
const CATEGORY_UPDATABLE: &[&str] = &["name", "color", "icon"];

/// The result of a partial update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome<T> {
    /// The request named no updatable field, so no statement was run.
    NothingToUpdate,
    /// No row matched the ID (and owner).
    NotFound,
    /// The row after the update.
    Updated(T),
}

/// A handle to the SQLite database. Cloning it is cheap and shares the underlying pool.
#[derive(Debug, Clone)]
pub(crate) struct Db {
    pool: SqlitePool,
}

impl Db {
    /// - Validates that no file currently exists at `path`
    /// - Creates a new SQLite file at `path`
    /// - Initializes the database schema
    /// - Returns a constructed `Db` object for further operations
    pub(crate) async fn init(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let exists = tokio::fs::try_exists(path)
            .await
            .with_context(|| format!("Unable to check for {}", path.display()))?;
        if exists {
            bail!("A database already exists at '{}'", path.display());
        }

        let pool = connect(path, true).await?;
        sqlx::query("CREATE TABLE schema_version (version INTEGER NOT NULL)")
            .execute(&pool)
            .await
            .context("Failed to create schema_version table")?;
        sqlx::query("INSERT INTO schema_version (version) VALUES (0)")
            .execute(&pool)
            .await
            .context("Failed to insert initial schema version")?;

        migrations::run(&pool, 0, migrations::CURRENT_VERSION).await?;
        debug!("Created database at {}", path.display());
        Ok(Self { pool })
    }

    /// - Validates that there is a SQLite file at `path`
    /// - Creates a SQLite client
    /// - Updates the database schema with migrations if it is out-of-date
    /// - Returns a constructed `Db` object for further operations
    pub(crate) async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            bail!("The database file is missing '{}'", path.display());
        }

        let pool = connect(path, false).await?;
        let db = Self { pool };
        let version = db.schema_version().await?;
        if version > migrations::CURRENT_VERSION {
            bail!(
                "The database schema version {version} is newer than this program supports ({})",
                migrations::CURRENT_VERSION
            );
        }
        migrations::run(&db.pool, version, migrations::CURRENT_VERSION).await?;
        Ok(db)
    }

    async fn schema_version(&self) -> Result<i32> {
        let row: (i32,) = sqlx::query_as("SELECT MAX(version) FROM schema_version")
            .fetch_one(&self.pool)
            .await
            .context("Failed to query schema version")?;
        Ok(row.0)
    }

    // ---------------------------------------------------------------------------------------------
    // Transactions
    // ---------------------------------------------------------------------------------------------

    pub(crate) async fn insert_transaction(&self, t: &NewTransaction) -> Result<Transaction> {
        let row: TransactionRow = sqlx::query_as(&format!(
            "INSERT INTO transactions \
             (user_id, amount, kind, category_id, description, transaction_date) \
             VALUES (?, ?, ?, ?, ?, ?) \
             RETURNING {TRANSACTION_COLUMNS}"
        ))
        .bind(t.user_id)
        .bind(t.amount.value().to_string())
        .bind(t.kind.to_string())
        .bind(t.category_id)
        .bind(&t.description)
        .bind(t.transaction_date)
        .fetch_one(&self.pool)
        .await
        .context("Failed to insert transaction")?;
        debug!("Inserted transaction {}", row.id);
        row.try_into()
    }

    /// Gets a transaction by ID, but only if it belongs to `user_id`.
    pub(crate) async fn get_transaction(&self, id: i64, user_id: i64) -> Result<Option<Transaction>> {
        let row: Option<TransactionRow> = sqlx::query_as(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = ? AND user_id = ?"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Failed to get transaction {id}"))?;
        row.map(Transaction::try_from).transpose()
    }

    /// Applies the fields present in `updates` to a transaction owned by `user_id`.
    pub(crate) async fn update_transaction(
        &self,
        id: i64,
        user_id: i64,
        updates: &TransactionUpdates,
    ) -> Result<UpdateOutcome<Transaction>> {
        let Some(assignments) = Assignments::build(TRANSACTION_UPDATABLE, updates.fields()) else {
            return Ok(UpdateOutcome::NothingToUpdate);
        };
        debug!(
            "Updating transaction {id} columns {:?}",
            assignments.columns()
        );

        let mut query = QueryBuilder::<Sqlite>::new("UPDATE transactions");
        assignments.push_set(&mut query);
        query
            .push(" WHERE id = ")
            .push_bind(id)
            .push(" AND user_id = ")
            .push_bind(user_id)
            .push(format!(" RETURNING {TRANSACTION_COLUMNS}"));

        let row: Option<TransactionRow> = query
            .build_query_as()
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Failed to update transaction {id}"))?;

        Ok(match row {
            Some(row) => UpdateOutcome::Updated(row.try_into()?),
            None => UpdateOutcome::NotFound,
        })
    }

    /// Deletes a transaction owned by `user_id`. Returns false if there was no such row.
    pub(crate) async fn delete_transaction(&self, id: i64, user_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM transactions WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to delete transaction {id}"))?;
        Ok(result.rows_affected() > 0)
    }

    // ---------------------------------------------------------------------------------------------
    // Categories
    // ---------------------------------------------------------------------------------------------

    pub(crate) async fn insert_category(&self, c: &NewCategory) -> Result<Category> {
        let row: CategoryRow = sqlx::query_as(&format!(
            "INSERT INTO categories (name, kind, color, icon, user_id) \
             VALUES (?, ?, ?, ?, ?) \
             RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(&c.name)
        .bind(c.kind.to_string())
        .bind(&c.color)
        .bind(&c.icon)
        .bind(c.user_id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to insert category")?;
        debug!("Inserted category {}", row.id);
        row.try_into()
    }

    pub(crate) async fn get_category(&self, id: i64) -> Result<Option<Category>> {
        let row: Option<CategoryRow> = sqlx::query_as(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Failed to get category {id}"))?;
        row.map(Category::try_from).transpose()
    }

    /// Applies the fields present in `updates` to a category owned by `user_id`. Shared
    /// categories have no owner and so are never found here.
    pub(crate) async fn update_category(
        &self,
        id: i64,
        user_id: i64,
        updates: &CategoryUpdates,
    ) -> Result<UpdateOutcome<Category>> {
        let Some(assignments) = Assignments::build(CATEGORY_UPDATABLE, updates.fields()) else {
            return Ok(UpdateOutcome::NothingToUpdate);
        };
        debug!("Updating category {id} columns {:?}", assignments.columns());

        let mut query = QueryBuilder::<Sqlite>::new("UPDATE categories");
        assignments.push_set(&mut query);
        query
            .push(" WHERE id = ")
            .push_bind(id)
            .push(" AND user_id = ")
            .push_bind(user_id)
            .push(format!(" RETURNING {CATEGORY_COLUMNS}"));

        let row: Option<CategoryRow> = query
            .build_query_as()
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Failed to update category {id}"))?;

        Ok(match row {
            Some(row) => UpdateOutcome::Updated(row.try_into()?),
            None => UpdateOutcome::NotFound,
        })
    }

    /// Deletes a category owned by `user_id`. Returns false if there was no such row. Fails if
    /// any transaction still references the category.
    pub(crate) async fn delete_category(&self, id: i64, user_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to delete category {id}"))?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait::async_trait]
impl Ledger for Db {
    async fn list_transactions(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>> {
        let mut query = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE user_id = "
        ));
        query.push_bind(filter.user_id);
        if let Some(start) = filter.start {
            query.push(" AND transaction_date >= ").push_bind(start);
        }
        if let Some(end) = filter.end {
            query.push(" AND transaction_date <= ").push_bind(end);
        }
        if let Some(category_id) = filter.category_id {
            query.push(" AND category_id = ").push_bind(category_id);
        }
        query.push(" ORDER BY transaction_date DESC, id DESC");

        let rows: Vec<TransactionRow> = query
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .context("Failed to list transactions")?;
        debug!(
            "Listed {} transactions for user {}",
            rows.len(),
            filter.user_id
        );
        rows.into_iter().map(Transaction::try_from).collect()
    }

    async fn list_categories(&self, user_id: Option<i64>) -> Result<Vec<Category>> {
        let rows: Vec<CategoryRow> = sqlx::query_as(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories \
             WHERE user_id IS NULL OR user_id = ? \
             ORDER BY kind, name, id"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list categories")?;
        rows.into_iter().map(Category::try_from).collect()
    }
}

/// Returns true if `e` was caused by a `UNIQUE` constraint violation.
pub(crate) fn is_unique_violation(e: &anyhow::Error) -> bool {
    database_error(e).is_some_and(|d| d.is_unique_violation())
}

/// Returns true if `e` was caused by a foreign key constraint violation.
pub(crate) fn is_foreign_key_violation(e: &anyhow::Error) -> bool {
    database_error(e).is_some_and(|d| d.is_foreign_key_violation())
}

fn database_error(e: &anyhow::Error) -> Option<&dyn sqlx::error::DatabaseError> {
    e.downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
}

async fn connect(path: &Path, create: bool) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))
        .context("Failed to parse SQLite connection string")?
        .create_if_missing(create)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to open SQLite database at {}", path.display()))
}

/// A row of the `transactions` table as SQLite stores it.
#[derive(sqlx::FromRow)]
struct TransactionRow {
    id: i64,
    user_id: i64,
    amount: String,
    kind: String,
    category_id: i64,
    description: String,
    transaction_date: NaiveDate,
    created_at: String,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = anyhow::Error;

    fn try_from(row: TransactionRow) -> Result<Self> {
        let amount = Amount::from_str(&row.amount)
            .with_context(|| format!("Invalid amount '{}' in transaction {}", row.amount, row.id))?;
        let kind = Kind::from_str(&row.kind)
            .with_context(|| format!("Invalid type '{}' in transaction {}", row.kind, row.id))?;
        Ok(Transaction {
            id: row.id,
            user_id: row.user_id,
            amount,
            kind,
            category_id: row.category_id,
            description: row.description,
            transaction_date: row.transaction_date,
            created_at: row.created_at,
        })
    }
}

/// A row of the `categories` table as SQLite stores it.
#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: i64,
    name: String,
    kind: String,
    color: String,
    icon: String,
    user_id: Option<i64>,
}

impl TryFrom<CategoryRow> for Category {
    type Error = anyhow::Error;

    fn try_from(row: CategoryRow) -> Result<Self> {
        let kind = Kind::from_str(&row.kind)
            .with_context(|| format!("Invalid type '{}' in category {}", row.kind, row.id))?;
        Ok(Category {
            id: row.id,
            name: row.name,
            kind,
            color: row.color,
            icon: row.icon,
            user_id: row.user_id,
        })
    }
}
