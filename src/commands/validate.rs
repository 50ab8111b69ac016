//! Checks applied to requests before anything is written.
//!
//! The helpers here return plain errors; callers tag them with `ErrorType::Request`. Lookups that
//! hit the database tag their own failures with `ErrorType::Database` first, and that tag wins.

use crate::error::{ErrorType, IntoResult};
use crate::model::{is_hex_color, Amount, Category, Kind};
use crate::{Config, Result};
use anyhow::bail;
use chrono::NaiveDate;

pub(super) fn amount(amount: Amount) -> Result<()> {
    if !amount.is_positive() {
        bail!("The amount must be greater than zero, got {amount}");
    }
    Ok(())
}

/// Returns the category with `category_id` if `user_id` may use it for a transaction of `kind`.
pub(super) async fn category_for(
    config: &Config,
    category_id: i64,
    user_id: i64,
    kind: Kind,
) -> Result<Category> {
    let category = config
        .db()
        .get_category(category_id)
        .await
        .pub_result(ErrorType::Database)?;

    let Some(category) = category.filter(|c| c.is_visible_to(user_id)) else {
        bail!("Category {category_id} does not exist");
    };
    if category.kind != kind {
        bail!(
            "Category '{}' is an {} category and cannot hold an {kind} transaction",
            category.name,
            category.kind
        );
    }
    Ok(category)
}

/// Returns the trimmed name, which must not be empty.
pub(super) fn name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        bail!("The category name must not be empty");
    }
    Ok(trimmed.to_string())
}

pub(super) fn color(color: &str) -> Result<()> {
    if !is_hex_color(color) {
        bail!("The color must be formatted as #RRGGBB, got '{color}'");
    }
    Ok(())
}

pub(super) fn date_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<()> {
    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            bail!("The start date {start} is after the end date {end}");
        }
    }
    Ok(())
}
