//! The ledger aggregator: monthly summaries by category and a simple expense forecast.
//!
//! The aggregator never writes. It reads a snapshot of one user's transactions through the
//! [`Ledger`] trait and derives everything from it on each call, so two calls against an
//! unchanged ledger return the same result.

mod forecast;
mod summary;

pub use forecast::{forecast, monthly_expense_totals, ForecastResult, MonthTotal};
pub use summary::{summarize, CategoryTotal, MonthlySummary, UNKNOWN_CATEGORY, UNKNOWN_COLOR};

use crate::model::{Category, Month, Transaction, TransactionFilter};
use crate::Result;
use chrono::{Months, NaiveDate};
use tracing::debug;

/// The number of trailing months a forecast looks at when the caller does not say.
pub const DEFAULT_FORECAST_MONTHS: u32 = 6;

/// Failures of the aggregator that a caller is expected to handle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReportError {
    /// Fewer than two months in the window had any expense.
    #[error(
        "Not enough data to forecast: {points} month(s) with expenses were found, at least 2 are needed"
    )]
    InsufficientData { points: usize },

    #[error("Invalid month {month} in year {year}, the month must be from 1 to 12")]
    InvalidWindow { year: i32, month: u32 },

    /// A sum or product of amounts does not fit in a decimal.
    #[error("The amounts are too large to {operation} exactly")]
    Overflow { operation: &'static str },
}

/// Read access to stored transactions and categories.
#[async_trait::async_trait]
pub trait Ledger: Send + Sync {
    /// The transactions selected by `filter`, newest first.
    async fn list_transactions(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>>;

    /// The shared categories, plus the categories of `user_id` when one is given.
    async fn list_categories(&self, user_id: Option<i64>) -> Result<Vec<Category>>;
}

/// Summarizes the income and expenses of `user_id` in `month`.
pub async fn monthly_summary<L>(ledger: &L, user_id: i64, month: Month) -> Result<MonthlySummary>
where
    L: Ledger + ?Sized,
{
    let filter = TransactionFilter::user(user_id).between(month.first_day(), month.last_day());
    let transactions = ledger.list_transactions(&filter).await?;
    let categories = ledger.list_categories(Some(user_id)).await?;
    debug!(
        "Summarizing {} transactions of user {user_id} for {month}",
        transactions.len()
    );
    Ok(summarize(month, &transactions, &categories)?)
}

/// Forecasts next month's expenses of `user_id` from the `months_back` months up to and including
/// `today`.
///
/// Fails with [`ReportError::InsufficientData`] (inside the returned `anyhow::Error`) when fewer
/// than two months of the window have expenses.
pub async fn forecast_expense<L>(
    ledger: &L,
    user_id: i64,
    months_back: u32,
    today: NaiveDate,
) -> Result<ForecastResult>
where
    L: Ledger + ?Sized,
{
    let start = trailing_window_start(today, months_back);
    let filter = TransactionFilter::user(user_id).between(start, today);
    let transactions = ledger.list_transactions(&filter).await?;
    let series = monthly_expense_totals(&transactions)?;
    debug!(
        "Forecasting from {} month(s) of expenses between {start} and {today} for user {user_id}",
        series.len()
    );
    Ok(forecast(&series)?)
}

/// The same day of the month, `months_back` months before `today`. Days that do not exist in the
/// earlier month are clamped to its last day.
fn trailing_window_start(today: NaiveDate, months_back: u32) -> NaiveDate {
    today
        .checked_sub_months(Months::new(months_back))
        .unwrap_or(NaiveDate::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Amount, Kind};
    use std::str::FromStr;

    /// A `Ledger` that holds everything in memory.
    #[derive(Debug, Default)]
    struct MemoryLedger {
        transactions: Vec<Transaction>,
        categories: Vec<Category>,
    }

    impl MemoryLedger {
        fn add(&mut self, user_id: i64, kind: Kind, category_id: i64, amount: &str, day: NaiveDate) {
            let id = self.transactions.len() as i64 + 1;
            self.transactions.push(Transaction {
                id,
                user_id,
                amount: Amount::from_str(amount).unwrap(),
                kind,
                category_id,
                description: String::new(),
                transaction_date: day,
                created_at: String::new(),
            });
        }
    }

    #[async_trait::async_trait]
    impl Ledger for MemoryLedger {
        async fn list_transactions(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>> {
            let mut selected: Vec<Transaction> = self
                .transactions
                .iter()
                .filter(|t| filter.matches(t))
                .cloned()
                .collect();
            selected.sort_by(|a, b| {
                b.transaction_date
                    .cmp(&a.transaction_date)
                    .then(b.id.cmp(&a.id))
            });
            Ok(selected)
        }

        async fn list_categories(&self, user_id: Option<i64>) -> Result<Vec<Category>> {
            Ok(self
                .categories
                .iter()
                .filter(|c| c.user_id.is_none() || c.user_id == user_id)
                .cloned()
                .collect())
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn amount(s: &str) -> Amount {
        Amount::from_str(s).unwrap()
    }

    fn ledger() -> MemoryLedger {
        let category = |id: i64, name: &str, kind: Kind, user_id: Option<i64>| Category {
            id,
            name: name.to_string(),
            kind,
            color: "#007bff".to_string(),
            icon: "fas fa-circle".to_string(),
            user_id,
        };
        MemoryLedger {
            transactions: Vec::new(),
            categories: vec![
                category(1, "Food", Kind::Expense, None),
                category(2, "Salary", Kind::Income, None),
                category(3, "Pets", Kind::Expense, Some(1)),
            ],
        }
    }

    #[tokio::test]
    async fn test_monthly_summary_is_scoped_to_user_and_month() {
        let mut ledger = ledger();
        ledger.add(1, Kind::Income, 2, "2000", date(2026, 3, 1));
        ledger.add(1, Kind::Expense, 1, "120.40", date(2026, 3, 9));
        ledger.add(1, Kind::Expense, 3, "60", date(2026, 3, 31));
        ledger.add(1, Kind::Expense, 1, "999", date(2026, 4, 1));
        ledger.add(2, Kind::Expense, 1, "555", date(2026, 3, 9));

        let march = Month::new(2026, 3).unwrap();
        let summary = monthly_summary(&ledger, 1, march).await.unwrap();
        assert_eq!(summary.total_income, amount("2000"));
        assert_eq!(summary.total_expense, amount("180.40"));
        assert_eq!(summary.balance, amount("1819.60"));
        let names: Vec<_> = summary
            .expenses_by_category
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(names, vec!["Food", "Pets"]);

        let again = monthly_summary(&ledger, 1, march).await.unwrap();
        assert_eq!(summary, again);
    }

    #[tokio::test]
    async fn test_other_users_category_is_unknown() {
        let mut ledger = ledger();
        ledger.add(2, Kind::Expense, 3, "10", date(2026, 3, 9));
        let summary = monthly_summary(&ledger, 2, Month::new(2026, 3).unwrap())
            .await
            .unwrap();
        assert_eq!(summary.expenses_by_category[0].name, UNKNOWN_CATEGORY);
    }

    #[tokio::test]
    async fn test_forecast_expense_uses_trailing_window() {
        let mut ledger = ledger();
        let today = date(2026, 6, 15);
        // before the window
        ledger.add(1, Kind::Expense, 1, "5000", date(2025, 12, 14));
        ledger.add(1, Kind::Expense, 1, "100", date(2025, 12, 15));
        ledger.add(1, Kind::Expense, 1, "200", date(2026, 2, 1));
        ledger.add(1, Kind::Income, 2, "9000", date(2026, 3, 1));
        ledger.add(1, Kind::Expense, 1, "300", date(2026, 6, 15));
        // after today
        ledger.add(1, Kind::Expense, 1, "7000", date(2026, 6, 16));

        let result = forecast_expense(&ledger, 1, 6, today).await.unwrap();
        let months: Vec<String> = result
            .historical_data
            .iter()
            .map(|p| p.month.to_string())
            .collect();
        assert_eq!(months, vec!["2025-12", "2026-02", "2026-06"]);
        assert_eq!(result.current_average, amount("200"));
        assert_eq!(result.trend_slope, amount("100"));
        assert_eq!(result.next_month_prediction, amount("300"));
    }

    #[tokio::test]
    async fn test_forecast_expense_insufficient_data() {
        let mut ledger = ledger();
        let today = date(2026, 6, 15);
        ledger.add(1, Kind::Expense, 1, "100", date(2026, 6, 1));
        ledger.add(1, Kind::Expense, 1, "100", date(2026, 6, 2));

        let err = forecast_expense(&ledger, 1, 6, today).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<ReportError>(),
            Some(&ReportError::InsufficientData { points: 1 })
        );
    }

    #[tokio::test]
    async fn test_forecast_expense_zero_months_back() {
        let mut ledger = ledger();
        let today = date(2026, 6, 15);
        ledger.add(1, Kind::Expense, 1, "100", date(2026, 5, 1));
        ledger.add(1, Kind::Expense, 1, "100", date(2026, 6, 15));

        let err = forecast_expense(&ledger, 1, 0, today).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ReportError>(),
            Some(ReportError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_trailing_window_start_clamps_to_month_end() {
        assert_eq!(trailing_window_start(date(2026, 8, 31), 6), date(2026, 2, 28));
        assert_eq!(trailing_window_start(date(2026, 6, 15), 6), date(2025, 12, 15));
        assert_eq!(trailing_window_start(date(2026, 6, 15), 0), date(2026, 6, 15));
    }
}
