//! Aggregation engine and budget comparator
//!
//! Every function here is a pure fold over a slice of expenses. Results come
//! back in `BTreeMap`s so callers iterate buckets in chronological order;
//! empty input always produces an empty map, never an error.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::Expense;
use crate::time::{iso_week_bounds, MonthKey, WeekKey};

// ==================== Time-bucket grouping ====================

/// Total spend per (year, month) bucket
pub fn monthly_summary(expenses: &[Expense]) -> BTreeMap<MonthKey, Decimal> {
    let mut totals: BTreeMap<MonthKey, Decimal> = BTreeMap::new();
    for expense in expenses {
        *totals
            .entry(MonthKey::from_date(expense.occurred_on))
            .or_insert(Decimal::ZERO) += expense.amount;
    }
    totals
}

/// Total spend per calendar year
pub fn annual_summary(expenses: &[Expense]) -> BTreeMap<i32, Decimal> {
    let mut totals: BTreeMap<i32, Decimal> = BTreeMap::new();
    for expense in expenses {
        *totals.entry(expense.occurred_on.year()).or_insert(Decimal::ZERO) += expense.amount;
    }
    totals
}

/// Per-category totals inside one month bucket
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub by_category: BTreeMap<String, Decimal>,
}

impl CategoryBreakdown {
    /// Sum of every category in the bucket
    pub fn total(&self) -> Decimal {
        self.by_category.values().copied().sum()
    }

    /// Category with the largest total. Equal totals resolve to the
    /// lexicographically smallest category name.
    pub fn top(&self) -> Option<(&str, Decimal)> {
        let mut best: Option<(&str, Decimal)> = None;
        for (category, &total) in &self.by_category {
            match best {
                Some((_, best_total)) if total <= best_total => {}
                _ => best = Some((category, total)),
            }
        }
        best
    }
}

/// Spend per (year, month) bucket, split by category
pub fn monthly_summary_by_category(expenses: &[Expense]) -> BTreeMap<MonthKey, CategoryBreakdown> {
    let mut buckets: BTreeMap<MonthKey, CategoryBreakdown> = BTreeMap::new();
    for expense in expenses {
        let bucket = buckets
            .entry(MonthKey::from_date(expense.occurred_on))
            .or_default();
        *bucket
            .by_category
            .entry(expense.category.clone())
            .or_insert(Decimal::ZERO) += expense.amount;
    }
    buckets
}

/// One ISO week bucket with its Monday..Sunday bounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekSummary {
    pub total: Decimal,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Total spend per ISO week
pub fn weekly_summary(expenses: &[Expense]) -> BTreeMap<WeekKey, WeekSummary> {
    let mut weeks: BTreeMap<WeekKey, WeekSummary> = BTreeMap::new();
    for expense in expenses {
        let key = WeekKey::from_date(expense.occurred_on);
        let entry = weeks.entry(key).or_insert_with(|| {
            let (start, end) = iso_week_bounds(expense.occurred_on);
            WeekSummary {
                total: Decimal::ZERO,
                start,
                end,
            }
        });
        entry.total += expense.amount;
    }
    weeks
}

/// Average daily spend for one month bucket.
///
/// `days` is the inclusive span between the earliest and latest record in
/// the bucket, not the calendar length of the month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyAverage {
    pub average: Decimal,
    pub total: Decimal,
    pub days: i64,
}

/// Average daily spend per (year, month) bucket over the observed span
pub fn average_daily_spending_by_month(expenses: &[Expense]) -> BTreeMap<MonthKey, DailyAverage> {
    struct Bucket {
        total: Decimal,
        first: NaiveDate,
        last: NaiveDate,
    }

    let mut buckets: BTreeMap<MonthKey, Bucket> = BTreeMap::new();
    for expense in expenses {
        let bucket = buckets
            .entry(MonthKey::from_date(expense.occurred_on))
            .or_insert(Bucket {
                total: Decimal::ZERO,
                first: expense.occurred_on,
                last: expense.occurred_on,
            });
        bucket.total += expense.amount;
        if expense.occurred_on < bucket.first {
            bucket.first = expense.occurred_on;
        }
        if expense.occurred_on > bucket.last {
            bucket.last = expense.occurred_on;
        }
    }

    buckets
        .into_iter()
        .map(|(key, bucket)| {
            let days = (bucket.last - bucket.first).num_days() + 1;
            let average = if days > 0 {
                bucket.total / Decimal::from(days)
            } else {
                Decimal::ZERO
            };
            (
                key,
                DailyAverage {
                    average,
                    total: bucket.total,
                    days,
                },
            )
        })
        .collect()
}

// ==================== Budget comparator ====================

/// Spend-vs-budget metrics for one bucketed total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetComparison {
    pub total: Decimal,
    pub budget: Decimal,
    /// Positive when over budget
    pub diff: Decimal,
    pub percent_of_budget: Decimal,
}

impl BudgetComparison {
    pub fn is_over(&self) -> bool {
        self.diff > Decimal::ZERO
    }
}

/// Compare a bucketed total against a budget.
///
/// A non-positive budget yields a zero percentage instead of dividing; the
/// difference is still reported.
pub fn compare_to_budget(total: Decimal, budget: Decimal) -> BudgetComparison {
    let percent_of_budget = if budget > Decimal::ZERO {
        (total / budget * Decimal::ONE_HUNDRED).round_dp(2)
    } else {
        Decimal::ZERO
    };
    BudgetComparison {
        total,
        budget,
        diff: total - budget,
        percent_of_budget,
    }
}

/// Budget comparison for every month bucket
pub fn monthly_budget_comparison(
    expenses: &[Expense],
    budget: Decimal,
) -> BTreeMap<MonthKey, BudgetComparison> {
    monthly_summary(expenses)
        .into_iter()
        .map(|(key, total)| (key, compare_to_budget(total, budget)))
        .collect()
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn expense(name: &str, amount: &str, date: &str, category: &str) -> Expense {
        Expense::parse(name, amount, date, category).unwrap()
    }

    fn sample_expenses() -> Vec<Expense> {
        vec![
            expense("Coffee", "4.50", "2025-10-01", "Food"),
            expense("Rent", "1200.00", "2025-10-01", "Housing"),
            expense("Coffee", "5.00", "2025-09-15", "Food"),
        ]
    }

    #[test]
    fn test_monthly_summary_groups_by_month() {
        let totals = monthly_summary(&sample_expenses());

        assert_eq!(totals.len(), 2);
        assert_eq!(totals[&MonthKey::new(2025, 10)], dec("1204.50"));
        assert_eq!(totals[&MonthKey::new(2025, 9)], dec("5.00"));
    }

    #[test]
    fn test_monthly_summary_empty_input() {
        assert!(monthly_summary(&[]).is_empty());
        assert!(annual_summary(&[]).is_empty());
        assert!(weekly_summary(&[]).is_empty());
        assert!(monthly_summary_by_category(&[]).is_empty());
        assert!(average_daily_spending_by_month(&[]).is_empty());
    }

    #[test]
    fn test_monthly_summary_preserves_grand_total() {
        let expenses = sample_expenses();
        let grand: Decimal = expenses.iter().map(|e| e.amount).sum();
        let grouped: Decimal = monthly_summary(&expenses).values().copied().sum();
        assert_eq!(grouped, grand);
    }

    #[test]
    fn test_monthly_summary_iterates_chronologically() {
        let keys: Vec<MonthKey> = monthly_summary(&sample_expenses()).into_keys().collect();
        assert_eq!(keys, vec![MonthKey::new(2025, 9), MonthKey::new(2025, 10)]);
    }

    #[test]
    fn test_category_breakdown_matches_monthly_totals() {
        let expenses = sample_expenses();
        let monthly = monthly_summary(&expenses);
        let by_category = monthly_summary_by_category(&expenses);

        for (key, breakdown) in &by_category {
            assert_eq!(breakdown.total(), monthly[key]);
        }

        let october = &by_category[&MonthKey::new(2025, 10)];
        assert_eq!(october.by_category["Food"], dec("4.50"));
        assert_eq!(october.by_category["Housing"], dec("1200.00"));
    }

    #[test]
    fn test_category_top_picks_maximum() {
        let by_category = monthly_summary_by_category(&sample_expenses());
        let october = &by_category[&MonthKey::new(2025, 10)];
        assert_eq!(october.top(), Some(("Housing", dec("1200.00"))));
    }

    #[test]
    fn test_category_top_tie_breaks_lexicographically() {
        let expenses = vec![
            expense("Movie", "20.00", "2025-10-02", "Ent"),
            expense("Groceries", "20.00", "2025-10-03", "Food"),
        ];
        let by_category = monthly_summary_by_category(&expenses);
        let top = by_category[&MonthKey::new(2025, 10)].top();
        assert_eq!(top, Some(("Ent", dec("20.00"))));
    }

    #[test]
    fn test_annual_summary() {
        let mut expenses = sample_expenses();
        expenses.push(expense("Flight", "350.00", "2024-06-10", "Travel"));

        let totals = annual_summary(&expenses);
        assert_eq!(totals[&2024], dec("350.00"));
        assert_eq!(totals[&2025], dec("1209.50"));
    }

    #[test]
    fn test_weekly_summary_bounds_and_containment() {
        let expenses = sample_expenses();
        let weeks = weekly_summary(&expenses);

        for (key, week) in &weeks {
            assert_eq!(week.start.weekday(), Weekday::Mon);
            assert_eq!(week.end.weekday(), Weekday::Sun);
            assert_eq!(week.end - week.start, chrono::Duration::days(6));
            for e in expenses.iter().filter(|e| WeekKey::from_date(e.occurred_on) == *key) {
                assert!(e.occurred_on >= week.start && e.occurred_on <= week.end);
            }
        }
    }

    #[test]
    fn test_weekly_summary_sums_within_week() {
        // Wednesday and Friday of the same ISO week
        let expenses = vec![
            expense("Lunch", "10.00", "2025-10-01", "Food"),
            expense("Dinner", "25.00", "2025-10-03", "Food"),
        ];
        let weeks = weekly_summary(&expenses);
        assert_eq!(weeks.len(), 1);

        let week = weeks.values().next().unwrap();
        assert_eq!(week.total, dec("35.00"));
        assert_eq!(week.start, NaiveDate::from_ymd_opt(2025, 9, 29).unwrap());
        assert_eq!(week.end, NaiveDate::from_ymd_opt(2025, 10, 5).unwrap());
    }

    #[test]
    fn test_weekly_summary_iso_year_boundary() {
        // Both dates sit in ISO week 2025-W01 despite different calendar years
        let expenses = vec![
            expense("Party", "40.00", "2024-12-30", "Ent"),
            expense("Brunch", "15.00", "2025-01-02", "Food"),
        ];
        let weeks = weekly_summary(&expenses);
        assert_eq!(weeks.len(), 1);
        assert_eq!(weeks[&WeekKey::new(2025, 1)].total, dec("55.00"));
    }

    #[test]
    fn test_average_daily_spending_by_month() {
        let expenses = vec![
            expense("Coffee", "10.00", "2025-10-01", "Food"),
            expense("Lunch", "20.00", "2025-10-10", "Food"),
        ];
        let averages = average_daily_spending_by_month(&expenses);
        let october = &averages[&MonthKey::new(2025, 10)];

        assert_eq!(october.days, 10);
        assert_eq!(october.total, dec("30.00"));
        assert_eq!(october.average, dec("3.00"));
    }

    #[test]
    fn test_average_daily_single_record_spans_one_day() {
        let expenses = vec![expense("Coffee", "4.50", "2025-10-01", "Food")];
        let averages = average_daily_spending_by_month(&expenses);
        let october = &averages[&MonthKey::new(2025, 10)];

        assert_eq!(october.days, 1);
        assert_eq!(october.average, october.total);
    }

    #[test]
    fn test_compare_to_budget_over() {
        let comparison = compare_to_budget(dec("1204.50"), dec("1000.00"));

        assert_eq!(comparison.diff, dec("204.50"));
        assert_eq!(comparison.percent_of_budget, dec("120.45"));
        assert!(comparison.is_over());
    }

    #[test]
    fn test_compare_to_budget_under() {
        let comparison = compare_to_budget(dec("800.00"), dec("1000.00"));

        assert_eq!(comparison.diff, dec("-200.00"));
        assert_eq!(comparison.percent_of_budget, dec("80.00"));
        assert!(!comparison.is_over());
    }

    #[test]
    fn test_compare_to_budget_zero_budget_does_not_divide() {
        let comparison = compare_to_budget(dec("50.00"), Decimal::ZERO);

        assert_eq!(comparison.percent_of_budget, Decimal::ZERO);
        assert_eq!(comparison.diff, dec("50.00"));
    }

    #[test]
    fn test_monthly_budget_comparison() {
        let comparisons = monthly_budget_comparison(&sample_expenses(), dec("1000.00"));

        assert!(comparisons[&MonthKey::new(2025, 10)].is_over());
        assert!(!comparisons[&MonthKey::new(2025, 9)].is_over());
        assert_eq!(comparisons[&MonthKey::new(2025, 9)].percent_of_budget, dec("0.50"));
    }
}
