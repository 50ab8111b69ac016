//! Report command handlers: the monthly summary and the expense forecast.

use crate::args::{ForecastArgs, SummaryArgs};
use crate::commands::{plural, Out};
use crate::error::{ErrorType, IntoResult};
use crate::model::Month;
use crate::report::{self, ForecastResult, MonthlySummary, ReportError};
use crate::{Config, Result};
use chrono::Local;

/// Summarizes a user's income and expenses for one calendar month.
///
/// # Errors
///
/// - Returns a request error (`InvalidWindow`) if the month is not from 1 to 12.
/// - Returns a report error (`Overflow`) if the month's totals are too large to add up.
/// - Returns an error if a database operation fails.
pub async fn monthly_summary(config: Config, args: SummaryArgs) -> Result<Out<MonthlySummary>> {
    let month = Month::new(args.year, args.month).pub_result(ErrorType::Request)?;
    let summary = match report::monthly_summary(config.db(), args.user_id, month).await {
        Ok(summary) => summary,
        Err(e) if e.is::<ReportError>() => return Err(e).pub_result(ErrorType::Report),
        Err(e) => return Err(e).pub_result(ErrorType::Database),
    };
    let message = format!(
        "{month}: income {}, expenses {}, balance {}",
        summary.total_income, summary.total_expense, summary.balance
    );
    Ok(Out::new(message, summary))
}

/// Forecasts a user's expenses for next month from the trailing months ending on `as_of`
/// (today by default).
///
/// # Errors
///
/// - Returns a report error (`InsufficientData`) if fewer than two months in the window have
///   any expense.
/// - Returns an error if a database operation fails.
pub async fn forecast_expense(config: Config, args: ForecastArgs) -> Result<Out<ForecastResult>> {
    let months_back = args.months_back.unwrap_or_else(|| config.forecast_months());
    let today = args.as_of.unwrap_or_else(|| Local::now().date_naive());

    let forecast = match report::forecast_expense(config.db(), args.user_id, months_back, today)
        .await
    {
        Ok(forecast) => forecast,
        Err(e) if e.is::<ReportError>() => return Err(e).pub_result(ErrorType::Report),
        Err(e) => return Err(e).pub_result(ErrorType::Database),
    };

    let points = forecast.historical_data.len();
    let message = format!(
        "Next month's expenses are forecast at {} from {points} month{} of history (average {}, \
         trend {} per month)",
        forecast.next_month_prediction,
        plural(points),
        forecast.current_average,
        forecast.trend_slope
    );
    Ok(Out::new(message, forecast))
}
