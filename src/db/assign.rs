//! Builds the `SET` clause of partial `UPDATE` statements.
//!
//! An update request names only the fields it wants to change. [`Assignments::build`] keeps the
//! fields that appear in the table's allow-list and drops the rest. Column names come from the
//! allow-list (never from the request) and values are always bound as parameters.

use crate::model::Amount;
use chrono::NaiveDate;
use sqlx::{QueryBuilder, Sqlite};
use std::collections::BTreeMap;

/// A value to be bound into a statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SqlValue {
    Integer(i64),
    Text(String),
    Date(NaiveDate),
}

impl From<Amount> for SqlValue {
    fn from(amount: Amount) -> Self {
        // Stored as text so that no precision is lost to SQLite's REAL type.
        SqlValue::Text(amount.value().to_string())
    }
}

/// An ordered, non-empty list of `(column, value)` pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Assignments {
    pairs: Vec<(&'static str, SqlValue)>,
}

impl Assignments {
    /// Keeps the entries of `updates` whose key is in `allowed`, in the order of `allowed`.
    ///
    /// Returns `None` when no allowed field is present, meaning there is nothing to update.
    pub(crate) fn build(
        allowed: &[&'static str],
        mut updates: BTreeMap<String, SqlValue>,
    ) -> Option<Self> {
        let pairs: Vec<_> = allowed
            .iter()
            .filter_map(|&column| updates.remove(column).map(|value| (column, value)))
            .collect();
        if pairs.is_empty() {
            None
        } else {
            Some(Self { pairs })
        }
    }

    /// The columns that will be assigned, in order.
    pub(crate) fn columns(&self) -> Vec<&'static str> {
        self.pairs.iter().map(|(column, _)| *column).collect()
    }

    /// Appends `SET col1 = ?, col2 = ?` to `query`, binding each value.
    pub(crate) fn push_set(self, query: &mut QueryBuilder<'_, Sqlite>) {
        query.push(" SET ");
        let mut set = query.separated(", ");
        for (column, value) in self.pairs {
            set.push(column);
            set.push_unseparated(" = ");
            match value {
                SqlValue::Integer(v) => set.push_bind_unseparated(v),
                SqlValue::Text(v) => set.push_bind_unseparated(v),
                SqlValue::Date(v) => set.push_bind_unseparated(v),
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALLOWED: &[&str] = &["amount", "kind", "description"];

    fn updates(entries: &[(&str, SqlValue)]) -> BTreeMap<String, SqlValue> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_empty_updates_is_nothing_to_update() {
        assert_eq!(Assignments::build(ALLOWED, BTreeMap::new()), None);
    }

    #[test]
    fn test_only_disallowed_fields_is_nothing_to_update() {
        let u = updates(&[
            ("user_id", SqlValue::Integer(2)),
            ("id", SqlValue::Integer(9)),
        ]);
        assert_eq!(Assignments::build(ALLOWED, u), None);
    }

    #[test]
    fn test_disallowed_fields_are_dropped() {
        let u = updates(&[
            ("description", SqlValue::Text("rent".to_string())),
            ("user_id", SqlValue::Integer(2)),
        ]);
        let assignments = Assignments::build(ALLOWED, u).unwrap();
        assert_eq!(assignments.columns(), vec!["description"]);
    }

    #[test]
    fn test_columns_follow_allow_list_order() {
        let u = updates(&[
            ("description", SqlValue::Text("rent".to_string())),
            ("amount", SqlValue::Text("12.00".to_string())),
        ]);
        let assignments = Assignments::build(ALLOWED, u).unwrap();
        assert_eq!(assignments.columns(), vec!["amount", "description"]);
    }

    #[test]
    fn test_push_set_binds_values() {
        let u = updates(&[
            ("kind", SqlValue::Text("income".to_string())),
            ("amount", SqlValue::Text("12.00".to_string())),
        ]);
        let mut query = QueryBuilder::<Sqlite>::new("UPDATE transactions");
        Assignments::build(ALLOWED, u)
            .unwrap()
            .push_set(&mut query);
        query.push(" WHERE id = ").push_bind(1_i64);
        assert_eq!(
            query.sql(),
            "UPDATE transactions SET amount = ?, kind = ? WHERE id = ?"
        );
    }

    #[test]
    fn test_amount_is_stored_as_exact_text() {
        let amount: Amount = "1234.56".parse().unwrap();
        assert_eq!(
            SqlValue::from(amount),
            SqlValue::Text("1234.56".to_string())
        );
    }
}
