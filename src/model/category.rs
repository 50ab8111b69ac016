use crate::db::SqlValue;
use crate::model::Kind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The color given to categories created without one.
pub const DEFAULT_COLOR: &str = "#007bff";

/// The icon given to categories created without one.
pub const DEFAULT_ICON: &str = "fas fa-circle";

/// A named, colored tag attached to transactions.
///
/// Categories with no `user_id` are the shared defaults that every user sees. A user may add
/// categories of their own, which only they see.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: Kind,
    /// A display hint, formatted as `#RRGGBB`.
    pub color: String,
    /// A display hint, e.g. a Font Awesome class.
    pub icon: String,
    pub user_id: Option<i64>,
}

impl Category {
    /// Returns true if `user_id` may attach this category to a transaction.
    pub fn is_visible_to(&self, user_id: i64) -> bool {
        self.user_id.is_none() || self.user_id == Some(user_id)
    }
}

/// The data needed to create a category. The database assigns the `id`.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    pub kind: Kind,
    pub color: String,
    pub icon: String,
    pub user_id: Option<i64>,
}

/// The fields of a category that can be changed. Fields left as `None` are not touched.
#[derive(
    Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize, schemars::JsonSchema, clap::Args,
)]
pub struct CategoryUpdates {
    /// A new display name.
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// A new color, formatted as #RRGGBB.
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    /// A new icon.
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl CategoryUpdates {
    /// The sparse map of columns to new values.
    pub(crate) fn fields(&self) -> BTreeMap<String, SqlValue> {
        let mut fields = BTreeMap::new();
        if let Some(name) = &self.name {
            fields.insert("name".to_string(), SqlValue::Text(name.trim().to_string()));
        }
        if let Some(color) = &self.color {
            fields.insert("color".to_string(), SqlValue::Text(color.clone()));
        }
        if let Some(icon) = &self.icon {
            fields.insert("icon".to_string(), SqlValue::Text(icon.clone()));
        }
        fields
    }
}

/// Returns true if `color` looks like `#RRGGBB`.
pub fn is_hex_color(color: &str) -> bool {
    color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit())
}
