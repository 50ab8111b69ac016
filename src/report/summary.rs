use crate::model::{Amount, Category, Kind, Month, Transaction};
use crate::report::ReportError;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

/// Shown in place of a category that no longer resolves.
pub const UNKNOWN_CATEGORY: &str = "Unknown category";
pub const UNKNOWN_COLOR: &str = "#6c757d";

/// Income, expense and balance for one calendar month, with a per-category breakdown of each
/// side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlySummary {
    pub month: Month,
    pub total_income: Amount,
    pub total_expense: Amount,
    /// `total_income - total_expense`. May be negative.
    pub balance: Amount,
    pub expenses_by_category: Vec<CategoryTotal>,
    pub income_by_category: Vec<CategoryTotal>,
}

/// The sum of one category's transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    /// `None` for the single row that collects every unresolved category.
    #[serde(skip)]
    pub category_id: Option<i64>,
    #[serde(rename = "category")]
    pub name: String,
    pub color: String,
    pub amount: Amount,
}

/// Builds the summary of `month` from `transactions`. Transactions dated outside of `month` are
/// ignored. `categories` is used to look up display names and colors; transactions whose
/// category is not among them are grouped into one [`UNKNOWN_CATEGORY`] row per side.
///
/// Fails with [`ReportError::Overflow`] if the totals do not fit in a decimal.
pub fn summarize(
    month: Month,
    transactions: &[Transaction],
    categories: &[Category],
) -> Result<MonthlySummary, ReportError> {
    let lookup: HashMap<i64, &Category> = categories.iter().map(|c| (c.id, c)).collect();

    let mut expense: BTreeMap<Option<i64>, Amount> = BTreeMap::new();
    let mut income: BTreeMap<Option<i64>, Amount> = BTreeMap::new();
    for t in transactions
        .iter()
        .filter(|t| month.contains(t.transaction_date))
    {
        let side = match t.kind {
            Kind::Income => &mut income,
            Kind::Expense => &mut expense,
        };
        let key = lookup.contains_key(&t.category_id).then_some(t.category_id);
        let total = side.entry(key).or_insert(Amount::ZERO);
        *total = add(*total, t.amount)?;
    }

    let total_income = sum(income.values())?;
    let total_expense = sum(expense.values())?;
    let balance = total_income
        .checked_sub(total_expense)
        .ok_or(ReportError::Overflow {
            operation: "subtract",
        })?;

    Ok(MonthlySummary {
        month,
        total_income,
        total_expense,
        balance,
        expenses_by_category: breakdown(expense, &lookup),
        income_by_category: breakdown(income, &lookup),
    })
}

fn add(a: Amount, b: Amount) -> Result<Amount, ReportError> {
    a.checked_add(b)
        .ok_or(ReportError::Overflow { operation: "add up" })
}

fn sum<'a>(mut amounts: impl Iterator<Item = &'a Amount>) -> Result<Amount, ReportError> {
    amounts.try_fold(Amount::ZERO, |total, &amount| add(total, amount))
}

fn breakdown(
    totals: BTreeMap<Option<i64>, Amount>,
    lookup: &HashMap<i64, &Category>,
) -> Vec<CategoryTotal> {
    let mut rows: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(category_id, amount)| {
            let (name, color) = match category_id.and_then(|id| lookup.get(&id)) {
                Some(c) => (c.name.clone(), c.color.clone()),
                None => (UNKNOWN_CATEGORY.to_string(), UNKNOWN_COLOR.to_string()),
            };
            CategoryTotal {
                category_id,
                name,
                color,
                amount,
            }
        })
        .collect();
    rows.sort_by(row_order);
    rows
}

/// Largest amount first, then by name, then by ID.
fn row_order(a: &CategoryTotal, b: &CategoryTotal) -> Ordering {
    b.amount
        .cmp(&a.amount)
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.category_id.cmp(&b.category_id))
}
