//! Read-only views derived from a store snapshot.
//!
//! Every function here is pure: it takes the records and a reference instant
//! `now` and recomputes from scratch. Divisions with a zero denominator yield
//! zero, and a category id that resolves to nothing is reported under the
//! fallback label.

pub mod period;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::{Budget, Category, CategoryLabel, EntryKind, Transaction};
use period::{trailing_months, DateRange, MonthBucket};

/// History length fed into [`spending_forecast`].
pub const FORECAST_HISTORY_MONTHS: u32 = 6;

/// Longest series any month-based aggregation produces.
pub const MAX_SERIES_MONTHS: u32 = 1200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyAmount {
    pub month: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryAmount {
    pub category: String,
    pub amount: Decimal,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStats {
    pub total_balance: Decimal,
    pub monthly_income: Decimal,
    pub monthly_expenses: Decimal,
    /// Percentage, unclamped: may be negative or above 100.
    pub savings_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub month: String,
    pub income: Decimal,
    pub expenses: Decimal,
    pub savings: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForecastPoint {
    pub month: String,
    pub predicted: Decimal,
    pub confidence: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetPerformance {
    pub category_id: i64,
    pub category_name: String,
    pub budget_amount: Decimal,
    pub actual_amount: Decimal,
    pub variance: Decimal,
    /// Percentage, unclamped: above 100 means over budget.
    pub percentage_used: Decimal,
}

fn sum_where<'a>(
    txns: impl IntoIterator<Item = &'a Transaction>,
    pred: impl Fn(&Transaction) -> bool,
) -> Decimal {
    txns.into_iter()
        .filter(|t| pred(*t))
        .fold(Decimal::ZERO, |acc, t| acc.saturating_add(t.amount))
}

/// `100 * numerator / denominator`, or zero when the denominator is zero.
/// Saturates at the representable range instead of overflowing.
pub fn percentage(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        return Decimal::ZERO;
    }
    numerator
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|scaled| scaled.checked_div(denominator))
        .or_else(|| {
            numerator
                .checked_div(denominator)
                .map(|ratio| ratio.saturating_mul(Decimal::ONE_HUNDRED))
        })
        .unwrap_or_else(|| {
            if numerator.is_sign_negative() == denominator.is_sign_negative() {
                Decimal::MAX
            } else {
                Decimal::MIN
            }
        })
}

/// Expense totals for `months` consecutive calendar months ending with the
/// current one, oldest first. Empty months are present with a zero amount.
pub fn monthly_expenses(txns: &[Transaction], months: u32, now: NaiveDateTime) -> Vec<MonthlyAmount> {
    trailing_months(now, months)
        .into_iter()
        .map(|bucket| MonthlyAmount {
            month: bucket.label().to_string(),
            amount: sum_where(txns, |t| t.is_expense() && bucket.contains(t.date)),
        })
        .collect()
}

/// Expense totals grouped by category, largest first. Categories summing to
/// zero are left out.
pub fn category_expenses(
    txns: &[Transaction],
    categories: &[Category],
    range: Option<DateRange>,
) -> Vec<CategoryAmount> {
    let range = range.unwrap_or_default();
    let mut by_category: BTreeMap<i64, Decimal> = BTreeMap::new();
    for txn in txns
        .iter()
        .filter(|t| t.is_expense() && range.contains(t.date))
    {
        let total = by_category.entry(txn.category_id).or_default();
        *total = total.saturating_add(txn.amount.abs());
    }

    let mut result: Vec<CategoryAmount> = by_category
        .into_iter()
        .filter(|(_, amount)| !amount.is_zero())
        .map(|(category_id, amount)| {
            let label = CategoryLabel::resolve(categories, category_id);
            CategoryAmount {
                category: label.name,
                amount,
                color: label.color,
            }
        })
        .collect();
    result.sort_by(|a, b| b.amount.cmp(&a.amount).then_with(|| a.category.cmp(&b.category)));
    result
}

/// All-time balance plus income, expenses and savings rate for the current
/// month up to `now`.
pub fn summary_stats(txns: &[Transaction], now: NaiveDateTime) -> SummaryStats {
    let total_income = sum_where(txns, Transaction::is_income);
    let total_expenses = sum_where(txns, Transaction::is_expense);

    let month_to_date = DateRange::new(Some(MonthBucket::containing(now).start()), Some(now));
    let monthly_income = sum_where(txns, |t| t.is_income() && month_to_date.contains(t.date));
    let monthly_expenses = sum_where(txns, |t| t.is_expense() && month_to_date.contains(t.date));

    SummaryStats {
        total_balance: total_income - total_expenses,
        monthly_income,
        monthly_expenses,
        savings_rate: percentage(monthly_income - monthly_expenses, monthly_income),
    }
}

/// Income, expenses and their difference per month, oldest first, using the
/// same buckets as [`monthly_expenses`].
pub fn spending_trends(txns: &[Transaction], months: u32, now: NaiveDateTime) -> Vec<TrendPoint> {
    trailing_months(now, months)
        .into_iter()
        .map(|bucket| {
            let in_bucket: Vec<&Transaction> =
                txns.iter().filter(|t| bucket.contains(t.date)).collect();
            let income = sum_where(in_bucket.iter().copied(), Transaction::is_income);
            let expenses = sum_where(in_bucket.iter().copied(), Transaction::is_expense);
            TrendPoint {
                month: bucket.label().to_string(),
                income,
                expenses,
                savings: income - expenses,
            }
        })
        .collect()
}

/// Heuristic projection of monthly expenses for the next `months` months.
///
/// Over the trailing six-month expense series: `mean` is its average and
/// `slope = (last - first) / count`. Month `i` (1-based) is predicted as
/// `max(0, mean + slope * i)` with confidence `max(0.5, 1 - 0.1 * i)`.
pub fn spending_forecast(
    txns: &[Transaction],
    months: u32,
    now: NaiveDateTime,
) -> Vec<ForecastPoint> {
    let history: Vec<Decimal> = spending_trends(txns, FORECAST_HISTORY_MONTHS, now)
        .into_iter()
        .map(|p| p.expenses)
        .collect();

    let count = Decimal::from(history.len());
    let mean = if history.is_empty() {
        Decimal::ZERO
    } else {
        history
            .iter()
            .fold(Decimal::ZERO, |acc, v| acc.saturating_add(*v))
            / count
    };
    let slope = match (history.first(), history.last()) {
        (Some(first), Some(last)) if history.len() > 1 => (*last - *first) / count,
        _ => Decimal::ZERO,
    };

    let step = Decimal::new(1, 1);
    let floor = Decimal::new(5, 1);
    let current = MonthBucket::containing(now);
    (1..=months.min(MAX_SERIES_MONTHS))
        .map(|i| {
            let i_dec = Decimal::from(i);
            let delta = i32::try_from(i).unwrap_or(i32::MAX);
            ForecastPoint {
                month: current.offset(delta).label().to_string(),
                predicted: mean
                    .saturating_add(slope.saturating_mul(i_dec))
                    .max(Decimal::ZERO),
                confidence: (Decimal::ONE - step * i_dec).max(floor),
            }
        })
        .collect()
}

/// Budget versus actual spending for the month containing `now`.
///
/// When several budgets exist for the same category and month, the most
/// recently created one (highest id) is used.
pub fn budget_performance(
    txns: &[Transaction],
    categories: &[Category],
    budgets: &[Budget],
    now: NaiveDateTime,
) -> Vec<BudgetPerformance> {
    let bucket = MonthBucket::containing(now);

    let mut latest: BTreeMap<i64, &Budget> = BTreeMap::new();
    for budget in budgets.iter().filter(|b| b.covers(bucket.month, bucket.year)) {
        match latest.get(&budget.category_id) {
            Some(existing) if existing.id > budget.id => {}
            _ => {
                latest.insert(budget.category_id, budget);
            }
        }
    }

    let mut chosen: Vec<&Budget> = latest.into_values().collect();
    chosen.sort_by_key(|b| b.id);

    chosen
        .into_iter()
        .map(|budget| {
            let actual_amount = sum_where(txns, |t| {
                t.kind == EntryKind::Expense
                    && t.category_id == budget.category_id
                    && bucket.contains(t.date)
            });
            BudgetPerformance {
                category_id: budget.category_id,
                category_name: CategoryLabel::resolve(categories, budget.category_id).name,
                budget_amount: budget.amount,
                actual_amount,
                variance: budget.amount - actual_amount,
                percentage_used: percentage(actual_amount, budget.amount),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests;
