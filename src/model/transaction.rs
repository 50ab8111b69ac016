use crate::db::SqlValue;
use crate::model::{Amount, Kind};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single row of the ledger.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    /// Always positive; `kind` says which way the money moved.
    pub amount: Amount,
    #[serde(rename = "type")]
    pub kind: Kind,
    pub category_id: i64,
    pub description: String,
    pub transaction_date: NaiveDate,
    /// When the row was written, as recorded by SQLite (`YYYY-MM-DD HH:MM:SS`, UTC).
    pub created_at: String,
}

/// The data needed to create a transaction. The database assigns `id` and `created_at`.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub user_id: i64,
    pub amount: Amount,
    pub kind: Kind,
    pub category_id: i64,
    pub description: String,
    pub transaction_date: NaiveDate,
}

/// The fields of a transaction that can be changed. Fields left as `None` are not touched.
#[derive(
    Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize, schemars::JsonSchema, clap::Args,
)]
pub struct TransactionUpdates {
    /// A new amount. Must be greater than zero.
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<f64>")]
    pub amount: Option<Amount>,

    /// A new type: income or expense. Must match the kind of the (possibly new) category.
    #[arg(long = "type", value_enum)]
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<Kind>,

    /// A new category ID.
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,

    /// A new description.
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// A new date, formatted as YYYY-MM-DD.
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<String>")]
    pub transaction_date: Option<NaiveDate>,
}

impl TransactionUpdates {
    /// The sparse map of columns to new values.
    pub(crate) fn fields(&self) -> BTreeMap<String, SqlValue> {
        let mut fields = BTreeMap::new();
        if let Some(amount) = self.amount {
            fields.insert("amount".to_string(), SqlValue::from(amount));
        }
        if let Some(kind) = self.kind {
            fields.insert("kind".to_string(), SqlValue::Text(kind.to_string()));
        }
        if let Some(category_id) = self.category_id {
            fields.insert("category_id".to_string(), SqlValue::Integer(category_id));
        }
        if let Some(description) = &self.description {
            fields.insert(
                "description".to_string(),
                SqlValue::Text(description.clone()),
            );
        }
        if let Some(date) = self.transaction_date {
            fields.insert("transaction_date".to_string(), SqlValue::Date(date));
        }
        fields
    }

    /// Returns `current` with these updates applied, without touching the database.
    pub fn apply_to(&self, current: &Transaction) -> Transaction {
        let mut updated = current.clone();
        if let Some(amount) = self.amount {
            updated.amount = amount;
        }
        if let Some(kind) = self.kind {
            updated.kind = kind;
        }
        if let Some(category_id) = self.category_id {
            updated.category_id = category_id;
        }
        if let Some(description) = &self.description {
            updated.description = description.clone();
        }
        if let Some(date) = self.transaction_date {
            updated.transaction_date = date;
        }
        updated
    }
}

/// Selects a user's transactions. Dates are inclusive; `None` means unbounded.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct TransactionFilter {
    pub user_id: i64,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub category_id: Option<i64>,
}

impl TransactionFilter {
    /// All transactions of `user_id`.
    pub fn user(user_id: i64) -> Self {
        Self {
            user_id,
            start: None,
            end: None,
            category_id: None,
        }
    }

    /// Restricts the filter to dates from `start` through `end`.
    pub fn between(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    /// Restricts the filter to a single category.
    pub fn category(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    /// Returns true if `t` is selected by this filter.
    pub fn matches(&self, t: &Transaction) -> bool {
        t.user_id == self.user_id
            && self.start.map_or(true, |start| t.transaction_date >= start)
            && self.end.map_or(true, |end| t.transaction_date <= end)
            && self.category_id.map_or(true, |id| t.category_id == id)
    }
}
