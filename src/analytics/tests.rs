#![allow(clippy::unwrap_used)]

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::period::*;
use super::*;
use crate::models::{NewBudget, NewCategory, FALLBACK_CATEGORY_COLOR, FALLBACK_CATEGORY_NAME};

fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

/// Fixed reference instant used throughout: 20 July 2025, noon.
fn now() -> NaiveDateTime {
    at(2025, 7, 20)
}

struct Fixture {
    txns: Vec<Transaction>,
    next_id: i64,
}

impl Fixture {
    fn new() -> Self {
        Self {
            txns: Vec::new(),
            next_id: 1,
        }
    }

    fn add(
        &mut self,
        amount: Decimal,
        kind: EntryKind,
        category_id: i64,
        date: NaiveDateTime,
    ) -> &mut Self {
        self.txns.push(Transaction {
            id: self.next_id,
            description: format!("txn {}", self.next_id),
            amount,
            category_id,
            date,
            kind,
        });
        self.next_id += 1;
        self
    }

    fn expense(&mut self, amount: Decimal, category_id: i64, date: NaiveDateTime) -> &mut Self {
        self.add(amount, EntryKind::Expense, category_id, date)
    }

    fn income(&mut self, amount: Decimal, date: NaiveDateTime) -> &mut Self {
        self.add(amount, EntryKind::Income, 10, date)
    }
}

fn categories() -> Vec<Category> {
    vec![
        NewCategory::new("Food & Dining", "#f97316", "utensils", EntryKind::Expense).with_id(1),
        NewCategory::new("Housing", "#8b5cf6", "home", EntryKind::Expense).with_id(2),
        NewCategory::new("Salary", "#059669", "bill", EntryKind::Income).with_id(10),
    ]
}

fn months(series: &[MonthlyAmount]) -> Vec<&str> {
    series.iter().map(|m| m.month.as_str()).collect()
}

// ── MonthBucket ───────────────────────────────────────────────

#[test]
fn test_bucket_offset_wraps_years() {
    let jan = MonthBucket { year: 2025, month: 1 };
    assert_eq!(jan.offset(-1), MonthBucket { year: 2024, month: 12 });
    assert_eq!(jan.offset(-13), MonthBucket { year: 2023, month: 12 });
    assert_eq!(jan.offset(11), MonthBucket { year: 2025, month: 12 });
    assert_eq!(jan.offset(12), MonthBucket { year: 2026, month: 1 });
}

#[test]
fn test_bucket_is_half_open() {
    let june = MonthBucket { year: 2025, month: 6 };
    assert!(june.contains(at(2025, 6, 1).date().and_hms_opt(0, 0, 0).unwrap()));
    assert!(june.contains(at(2025, 6, 30).date().and_hms_opt(23, 59, 59).unwrap()));
    assert!(!june.contains(at(2025, 7, 1).date().and_hms_opt(0, 0, 0).unwrap()));
    assert_eq!(june.label(), "Jun");
}

#[test]
fn test_trailing_months_oldest_first() {
    let buckets = trailing_months(now(), 3);
    assert_eq!(
        buckets,
        vec![
            MonthBucket { year: 2025, month: 5 },
            MonthBucket { year: 2025, month: 6 },
            MonthBucket { year: 2025, month: 7 },
        ]
    );
    assert!(trailing_months(now(), 0).is_empty());
}

// ── DateFilter ────────────────────────────────────────────────

#[test]
fn test_date_filter_parse() {
    for f in DateFilter::all() {
        assert_eq!(DateFilter::parse(f.as_str()), Some(*f));
    }
    assert_eq!(DateFilter::parse("This-Month"), Some(DateFilter::ThisMonth));
    assert_eq!(DateFilter::parse("last-week"), None);
}

#[test]
fn test_date_filter_months() {
    assert_eq!(DateFilter::All.months(), None);
    assert_eq!(DateFilter::LastDay.months(), Some(1));
    assert_eq!(DateFilter::LastMonth.months(), Some(1));
    assert_eq!(DateFilter::LastThreeMonths.months(), Some(3));
    assert_eq!(DateFilter::ThisYear.months(), Some(12));
}

#[test]
fn test_date_filter_ranges() {
    let midnight = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(0, 0, 0).unwrap();

    let r = DateFilter::ThisMonth.range(now());
    assert_eq!(r.start, Some(midnight(2025, 7, 1)));
    assert_eq!(
        r.end,
        Some(NaiveDate::from_ymd_opt(2025, 7, 31).unwrap().and_hms_opt(23, 59, 59).unwrap())
    );

    let r = DateFilter::LastMonth.range(now());
    assert_eq!(r.start, Some(midnight(2025, 6, 1)));
    assert!(r.contains(at(2025, 6, 30)));
    assert!(!r.contains(at(2025, 7, 1)));

    let r = DateFilter::LastThreeMonths.range(now());
    assert_eq!(r.start, Some(midnight(2025, 4, 1)));
    assert_eq!(r.end, Some(now()));

    let r = DateFilter::ThisYear.range(now());
    assert_eq!(r.start, Some(midnight(2025, 1, 1)));

    let r = DateFilter::LastDay.range(now());
    assert!(r.contains(at(2025, 7, 19)));
    assert!(!r.contains(at(2025, 7, 18)));

    assert_eq!(DateFilter::All.range(now()), DateRange::default());
}

// ── monthly_expenses ──────────────────────────────────────────

#[test]
fn test_monthly_expenses_fills_empty_months() {
    let mut f = Fixture::new();
    f.expense(dec!(100), 1, at(2025, 5, 10))
        .expense(dec!(50), 1, at(2025, 7, 3));

    let series = monthly_expenses(&f.txns, 3, now());
    assert_eq!(months(&series), ["May", "Jun", "Jul"]);
    let amounts: Vec<Decimal> = series.iter().map(|m| m.amount).collect();
    assert_eq!(amounts, [dec!(100), dec!(0), dec!(50)]);
}

#[test]
fn test_monthly_expenses_ignores_income_and_out_of_window() {
    let mut f = Fixture::new();
    f.income(dec!(5000), at(2025, 7, 1))
        .expense(dec!(75), 2, at(2025, 1, 1))
        .expense(dec!(20.25), 2, at(2025, 7, 19));

    let series = monthly_expenses(&f.txns, 2, now());
    assert_eq!(series.len(), 2);
    assert_eq!(series[0].amount, Decimal::ZERO);
    assert_eq!(series[1].amount, dec!(20.25));
}

#[test]
fn test_monthly_expenses_across_year_boundary() {
    let mut f = Fixture::new();
    f.expense(dec!(30), 1, at(2024, 12, 31));
    let series = monthly_expenses(&f.txns, 3, at(2025, 1, 15));
    assert_eq!(months(&series), ["Nov", "Dec", "Jan"]);
    assert_eq!(series[1].amount, dec!(30));
}

#[test]
fn test_monthly_expenses_window_size() {
    for count in [1, 6, 12, 24] {
        let series = monthly_expenses(&[], count, now());
        assert_eq!(series.len(), count as usize);
        assert_eq!(series.last().unwrap().month, "Jul");
    }
}

// ── category_expenses ─────────────────────────────────────────

#[test]
fn test_category_expenses_groups_and_sorts() {
    let mut f = Fixture::new();
    f.expense(dec!(10), 1, at(2025, 7, 1))
        .expense(dec!(15), 1, at(2025, 6, 1))
        .expense(dec!(1800), 2, at(2025, 7, 1))
        .income(dec!(5000), at(2025, 7, 1));

    let result = category_expenses(&f.txns, &categories(), None);
    assert_eq!(result.len(), 2);
    assert_eq!(result[0].category, "Housing");
    assert_eq!(result[0].amount, dec!(1800));
    assert_eq!(result[0].color, "#8b5cf6");
    assert_eq!(result[1].category, "Food & Dining");
    assert_eq!(result[1].amount, dec!(25));
}

#[test]
fn test_category_expenses_unknown_category() {
    let mut f = Fixture::new();
    f.expense(dec!(12.50), 999, at(2025, 7, 1))
        .expense(dec!(7.50), 999, at(2025, 7, 2));

    let result = category_expenses(&f.txns, &categories(), None);
    assert_eq!(
        result,
        vec![CategoryAmount {
            category: FALLBACK_CATEGORY_NAME.into(),
            amount: dec!(20.00),
            color: FALLBACK_CATEGORY_COLOR.into(),
        }]
    );
}

#[test]
fn test_category_expenses_omits_zero_totals() {
    let mut f = Fixture::new();
    f.expense(Decimal::ZERO, 1, at(2025, 7, 1))
        .expense(dec!(5), 2, at(2025, 7, 1));

    let result = category_expenses(&f.txns, &categories(), None);
    assert_eq!(result.len(), 1);
    assert!(result.iter().all(|c| !c.amount.is_zero()));
}

#[test]
fn test_category_expenses_date_range_is_inclusive() {
    let mut f = Fixture::new();
    f.expense(dec!(1), 1, at(2025, 6, 1))
        .expense(dec!(2), 1, at(2025, 6, 15))
        .expense(dec!(4), 1, at(2025, 6, 30))
        .expense(dec!(8), 1, at(2025, 7, 1));

    let range = DateRange::new(Some(at(2025, 6, 1)), Some(at(2025, 6, 30)));
    let result = category_expenses(&f.txns, &categories(), Some(range));
    assert_eq!(result[0].amount, dec!(7));
}

// ── summary_stats ─────────────────────────────────────────────

#[test]
fn test_summary_stats() {
    let mut f = Fixture::new();
    f.income(dec!(1000), at(2025, 7, 1))
        .expense(dec!(250), 1, at(2025, 7, 10))
        .income(dec!(3000), at(2025, 3, 1))
        .expense(dec!(1200), 2, at(2025, 3, 2));

    let stats = summary_stats(&f.txns, now());
    assert_eq!(stats.total_balance, dec!(2550));
    assert_eq!(stats.monthly_income, dec!(1000));
    assert_eq!(stats.monthly_expenses, dec!(250));
    assert_eq!(stats.savings_rate, dec!(75));
}

#[test]
fn test_summary_stats_zero_income() {
    let mut f = Fixture::new();
    f.expense(dec!(50), 1, at(2025, 7, 10));
    let stats = summary_stats(&f.txns, now());
    assert_eq!(stats.savings_rate, Decimal::ZERO);
    assert_eq!(stats.total_balance, dec!(-50));

    let stats = summary_stats(&[], now());
    assert_eq!(stats.savings_rate, Decimal::ZERO);
    assert_eq!(stats.total_balance, Decimal::ZERO);
}

#[test]
fn test_summary_stats_savings_rate_unclamped() {
    let mut f = Fixture::new();
    f.income(dec!(100), at(2025, 7, 1))
        .expense(dec!(250), 1, at(2025, 7, 2));
    assert_eq!(summary_stats(&f.txns, now()).savings_rate, dec!(-150));
}

#[test]
fn test_summary_stats_month_to_date_only() {
    let mut f = Fixture::new();
    // Later this month: part of the balance but not of month-to-date.
    f.income(dec!(400), at(2025, 7, 28))
        .income(dec!(100), at(2025, 6, 30));
    let stats = summary_stats(&f.txns, now());
    assert_eq!(stats.total_balance, dec!(500));
    assert_eq!(stats.monthly_income, Decimal::ZERO);
}

// ── spending_trends ───────────────────────────────────────────

#[test]
fn test_summary_stats_large_income_does_not_overflow() {
    let mut f = Fixture::new();
    f.income(dec!(1000000000000000000000000000), at(2025, 7, 2));
    let stats = summary_stats(&f.txns, now());
    assert_eq!(stats.total_balance, dec!(1000000000000000000000000000));
    assert_eq!(stats.savings_rate, dec!(100));
}

#[test]
fn test_sums_saturate_at_decimal_max() {
    let mut f = Fixture::new();
    f.expense(Decimal::MAX, 1, at(2025, 7, 2))
        .expense(Decimal::MAX, 1, at(2025, 7, 3));

    let monthly = monthly_expenses(&f.txns, 2, now());
    assert_eq!(monthly[1].amount, Decimal::MAX);
    assert_eq!(spending_trends(&f.txns, 1, now())[0].expenses, Decimal::MAX);
    assert_eq!(category_expenses(&f.txns, &categories(), None)[0].amount, Decimal::MAX);

    let forecast = spending_forecast(&f.txns, 3, now());
    assert_eq!(forecast.len(), 3);
    assert!(forecast.iter().all(|p| p.predicted > Decimal::ZERO));

    let budgets = vec![NewBudget::new(1, dec!(100), 7, 2025).with_id(1)];
    let perf = budget_performance(&f.txns, &categories(), &budgets, now());
    assert_eq!(perf[0].actual_amount, Decimal::MAX);
    assert!(perf[0].percentage_used > dec!(100));
}

#[test]
fn test_percentage_saturates() {
    assert_eq!(percentage(dec!(3), dec!(4)), dec!(75));
    assert_eq!(percentage(dec!(5), Decimal::ZERO), Decimal::ZERO);
    assert_eq!(percentage(Decimal::MAX, dec!(0.0000001)), Decimal::MAX);
    assert_eq!(percentage(Decimal::MIN, dec!(0.0000001)), Decimal::MIN);
}

#[test]
fn test_month_counts_are_capped() {
    let series = trailing_months(now(), u32::MAX);
    assert_eq!(series.len(), MAX_SERIES_MONTHS as usize);
    assert_eq!(series.last(), Some(&MonthBucket::containing(now())));

    let forecast = spending_forecast(&[], u32::MAX, now());
    assert_eq!(forecast.len(), MAX_SERIES_MONTHS as usize);
    assert_eq!(forecast[0].month, "Aug");
}

#[test]
fn test_spending_trends() {
    let mut f = Fixture::new();
    f.income(dec!(5200), at(2025, 6, 1))
        .expense(dec!(1800), 2, at(2025, 6, 1))
        .expense(dec!(300), 1, at(2025, 7, 2));

    let trends = spending_trends(&f.txns, 2, now());
    assert_eq!(trends.len(), 2);
    assert_eq!(trends[0].month, "Jun");
    assert_eq!(trends[0].income, dec!(5200));
    assert_eq!(trends[0].expenses, dec!(1800));
    assert_eq!(trends[0].savings, dec!(3400));
    assert_eq!(trends[1].month, "Jul");
    assert_eq!(trends[1].savings, dec!(-300));
}

// ── spending_forecast ─────────────────────────────────────────

#[test]
fn test_spending_forecast_linear_projection() {
    let mut f = Fixture::new();
    // Trailing six months are Feb..Jul 2025.
    f.expense(dec!(600), 1, at(2025, 2, 10))
        .expense(dec!(1200), 1, at(2025, 7, 10));

    let forecast = spending_forecast(&f.txns, 3, now());
    // mean = 1800 / 6 = 300, slope = (1200 - 600) / 6 = 100
    let predicted: Vec<Decimal> = forecast.iter().map(|p| p.predicted).collect();
    assert_eq!(predicted, [dec!(400), dec!(500), dec!(600)]);
    let labels: Vec<&str> = forecast.iter().map(|p| p.month.as_str()).collect();
    assert_eq!(labels, ["Aug", "Sep", "Oct"]);
}

#[test]
fn test_spending_forecast_floors_at_zero() {
    let mut f = Fixture::new();
    f.expense(dec!(1200), 1, at(2025, 2, 10));

    let forecast = spending_forecast(&f.txns, 2, now());
    // mean = 200, slope = -200
    assert_eq!(forecast[0].predicted, Decimal::ZERO);
    assert_eq!(forecast[1].predicted, Decimal::ZERO);
}

#[test]
fn test_spending_forecast_confidence_decay() {
    let forecast = spending_forecast(&[], 7, now());
    let confidence: Vec<Decimal> = forecast.iter().map(|p| p.confidence).collect();
    assert_eq!(
        confidence,
        [
            dec!(0.9),
            dec!(0.8),
            dec!(0.7),
            dec!(0.6),
            dec!(0.5),
            dec!(0.5),
            dec!(0.5)
        ]
    );
    assert!(forecast.iter().all(|p| p.predicted.is_zero()));
}

// ── budget_performance ────────────────────────────────────────

#[test]
fn test_budget_performance() {
    let mut f = Fixture::new();
    f.expense(dec!(50), 1, at(2025, 7, 5))
        .expense(dec!(100), 1, at(2025, 7, 6))
        .expense(dec!(999), 1, at(2025, 6, 30))
        .expense(dec!(30), 2, at(2025, 7, 6));
    let budgets = vec![
        NewBudget::new(1, dec!(200), 7, 2025).with_id(1),
        NewBudget::new(2, dec!(500), 6, 2025).with_id(2),
    ];

    let result = budget_performance(&f.txns, &categories(), &budgets, now());
    assert_eq!(result.len(), 1);
    let perf = &result[0];
    assert_eq!(perf.category_id, 1);
    assert_eq!(perf.category_name, "Food & Dining");
    assert_eq!(perf.budget_amount, dec!(200));
    assert_eq!(perf.actual_amount, dec!(150));
    assert_eq!(perf.variance, dec!(50));
    assert_eq!(perf.percentage_used, dec!(75));
}

#[test]
fn test_budget_performance_zero_budget() {
    let mut f = Fixture::new();
    f.expense(dec!(20), 1, at(2025, 7, 5));
    let budgets = vec![NewBudget::new(1, Decimal::ZERO, 7, 2025).with_id(1)];

    let result = budget_performance(&f.txns, &categories(), &budgets, now());
    assert_eq!(result[0].variance, dec!(-20));
    assert_eq!(result[0].percentage_used, Decimal::ZERO);
}

#[test]
fn test_budget_performance_over_budget_unclamped() {
    let mut f = Fixture::new();
    f.expense(dec!(300), 2, at(2025, 7, 5));
    let budgets = vec![NewBudget::new(2, dec!(200), 7, 2025).with_id(1)];

    let result = budget_performance(&f.txns, &categories(), &budgets, now());
    assert_eq!(result[0].percentage_used, dec!(150));
    assert_eq!(result[0].variance, dec!(-100));
}

#[test]
fn test_budget_performance_latest_duplicate_wins() {
    let budgets = vec![
        NewBudget::new(1, dec!(300), 7, 2025).with_id(8),
        NewBudget::new(1, dec!(500), 7, 2025).with_id(3),
    ];
    let result = budget_performance(&[], &categories(), &budgets, now());
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].budget_amount, dec!(300));
}

#[test]
fn test_budget_performance_unknown_category() {
    let mut f = Fixture::new();
    f.expense(dec!(40), 404, at(2025, 7, 1));
    let budgets = vec![NewBudget::new(404, dec!(80), 7, 2025).with_id(1)];

    let result = budget_performance(&f.txns, &categories(), &budgets, now());
    assert_eq!(result[0].category_name, FALLBACK_CATEGORY_NAME);
    assert_eq!(result[0].percentage_used, dec!(50));
}
