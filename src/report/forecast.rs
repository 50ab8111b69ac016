use crate::model::{Amount, Kind, Month, Transaction};
use crate::report::ReportError;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// A projection of next month's expenses from the recent monthly totals.
///
/// This is a straight line fitted through the monthly totals. It has no notion of seasonality
/// and carries no confidence interval. Months without any expense are left out of the series
/// rather than counted as zero, so a sparse history skews the slope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForecastResult {
    /// Mean of the monthly totals.
    pub current_average: Amount,
    /// Least-squares slope of the monthly totals, per month.
    #[serde(rename = "trend")]
    pub trend_slope: Amount,
    /// `current_average + trend_slope`, but never below zero.
    pub next_month_prediction: Amount,
    /// The series the forecast was fitted to, oldest month first.
    pub historical_data: Vec<MonthTotal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthTotal {
    pub month: Month,
    pub amount: Amount,
}

/// Sums the expense transactions per calendar month. Income is ignored and months with no
/// expense do not appear.
pub fn monthly_expense_totals(
    transactions: &[Transaction],
) -> Result<BTreeMap<Month, Amount>, ReportError> {
    let mut totals: BTreeMap<Month, Amount> = BTreeMap::new();
    for t in transactions.iter().filter(|t| t.kind == Kind::Expense) {
        let total = totals
            .entry(Month::of(t.transaction_date))
            .or_insert(Amount::ZERO);
        *total = total
            .checked_add(t.amount)
            .ok_or(ReportError::Overflow { operation: "add up" })?;
    }
    Ok(totals)
}

/// Fits the forecast to `series`. At least two months are needed.
///
/// The x-axis is the position of each month in the series (0, 1, 2, ...), not the calendar
/// distance between months. Outputs are rounded to cents after the prediction has been computed
/// from the unrounded mean and slope.
pub fn forecast(series: &BTreeMap<Month, Amount>) -> Result<ForecastResult, ReportError> {
    let points = series.len();
    let insufficient = ReportError::InsufficientData { points };
    if points < 2 {
        return Err(insufficient);
    }

    let fit = ReportError::Overflow {
        operation: "fit a trend",
    };

    let n = Decimal::from(points);
    let ys: Vec<Decimal> = series.values().map(Amount::value).collect();
    let y_mean = ys
        .iter()
        .try_fold(Decimal::ZERO, |acc, y| acc.checked_add(*y))
        .ok_or(ReportError::Overflow { operation: "add up" })?
        .checked_div(n)
        .ok_or(insufficient.clone())?;
    let x_mean = Decimal::from(points - 1)
        .checked_div(Decimal::TWO)
        .ok_or(insufficient.clone())?;

    let mut numerator = Decimal::ZERO;
    let mut denominator = Decimal::ZERO;
    for (i, y) in ys.iter().enumerate() {
        let dx = Decimal::from(i) - x_mean;
        numerator = y
            .checked_sub(y_mean)
            .and_then(|dy| dx.checked_mul(dy))
            .and_then(|term| numerator.checked_add(term))
            .ok_or(fit.clone())?;
        denominator += dx * dx;
    }
    let slope = numerator.checked_div(denominator).ok_or(insufficient)?;
    let next = y_mean.checked_add(slope).ok_or(fit)?;

    let prediction = Amount::new(next).clamp_non_negative();

    Ok(ForecastResult {
        current_average: Amount::new(y_mean).round_cents(),
        trend_slope: Amount::new(slope).round_cents(),
        next_month_prediction: prediction.round_cents(),
        historical_data: series
            .iter()
            .map(|(&month, &amount)| MonthTotal { month, amount })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn amount(s: &str) -> Amount {
        Amount::from_str(s).unwrap()
    }

    fn series(values: &[&str]) -> BTreeMap<Month, Amount> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| (Month::new(2026, i as u32 + 1).unwrap(), amount(v)))
            .collect()
    }

    fn expense(day: (i32, u32, u32), value: &str) -> Transaction {
        Transaction {
            id: 0,
            user_id: 1,
            amount: amount(value),
            kind: Kind::Expense,
            category_id: 1,
            description: String::new(),
            transaction_date: NaiveDate::from_ymd_opt(day.0, day.1, day.2).unwrap(),
            created_at: String::new(),
        }
    }

    #[test]
    fn test_flat_series() {
        let result = forecast(&series(&["100", "100"])).unwrap();
        assert_eq!(result.current_average, amount("100"));
        assert_eq!(result.trend_slope, Amount::ZERO);
        assert_eq!(result.next_month_prediction, amount("100"));
    }

    #[test]
    fn test_increasing_series() {
        let result = forecast(&series(&["100", "200", "300"])).unwrap();
        assert_eq!(result.current_average, amount("200"));
        assert_eq!(result.trend_slope, amount("100"));
        assert_eq!(result.next_month_prediction, amount("300"));
        assert!(result.trend_slope.is_positive());
        assert!(result.next_month_prediction > result.current_average);
    }

    #[test]
    fn test_prediction_is_clamped_at_zero() {
        let result = forecast(&series(&["300", "50"])).unwrap();
        assert_eq!(result.current_average, amount("175"));
        assert_eq!(result.trend_slope, amount("-250"));
        assert_eq!(result.next_month_prediction, Amount::ZERO);

        let result = forecast(&series(&["300", "100"])).unwrap();
        assert_eq!(result.next_month_prediction, Amount::ZERO);
        assert!(!result.next_month_prediction.is_negative());
    }

    #[test]
    fn test_insufficient_data() {
        assert_eq!(
            forecast(&BTreeMap::new()),
            Err(ReportError::InsufficientData { points: 0 })
        );
        assert_eq!(
            forecast(&series(&["100"])),
            Err(ReportError::InsufficientData { points: 1 })
        );
    }

    #[test]
    fn test_outputs_are_rounded_to_cents() {
        // mean 33.333..., slope 5.005 (half rounds to even)
        let result = forecast(&series(&["28.33", "33.33", "38.34"])).unwrap();
        assert_eq!(result.current_average, amount("33.33"));
        assert_eq!(result.trend_slope, amount("5.00"));
        assert_eq!(result.next_month_prediction, amount("38.34"));
    }

    #[test]
    fn test_historical_data_is_chronological() {
        let mut s = BTreeMap::new();
        s.insert(Month::new(2026, 2).unwrap(), amount("20"));
        s.insert(Month::new(2025, 12).unwrap(), amount("10"));
        s.insert(Month::new(2026, 1).unwrap(), amount("15"));
        let result = forecast(&s).unwrap();
        let labels: Vec<String> = result
            .historical_data
            .iter()
            .map(|p| p.month.to_string())
            .collect();
        assert_eq!(labels, vec!["2025-12", "2026-01", "2026-02"]);
    }

    #[test]
    fn test_monthly_totals_skip_income_and_empty_months() {
        let mut income = expense((2026, 2, 1), "5000");
        income.kind = Kind::Income;
        let transactions = vec![
            expense((2026, 1, 3), "10.10"),
            expense((2026, 1, 30), "0.20"),
            income,
            expense((2026, 3, 15), "7"),
        ];
        let totals = monthly_expense_totals(&transactions).unwrap();
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[&Month::new(2026, 1).unwrap()], amount("10.30"));
        assert_eq!(totals[&Month::new(2026, 3).unwrap()], amount("7"));
    }

    #[test]
    fn test_forecast_json_shape() {
        let result = forecast(&series(&["100", "200"])).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["current_average"], 150.0);
        assert_eq!(json["trend"], 100.0);
        assert_eq!(json["next_month_prediction"], 250.0);
        assert_eq!(json["historical_data"][0]["month"], "2026-01");
        assert_eq!(json["historical_data"][1]["amount"], 200.0);
    }

    #[test]
    fn test_totals_too_large_to_add_up() {
        let huge = "50000000000000000000000000000";
        let same_month = vec![expense((2026, 1, 3), huge), expense((2026, 1, 4), huge)];
        assert_eq!(
            monthly_expense_totals(&same_month),
            Err(ReportError::Overflow { operation: "add up" })
        );

        let totals = monthly_expense_totals(&[
            expense((2026, 1, 3), huge),
            expense((2026, 2, 3), huge),
        ])
        .unwrap();
        assert_eq!(
            forecast(&totals),
            Err(ReportError::Overflow { operation: "add up" })
        );
    }
}
