//! Quick-glance metrics
//!
//! Four independent indicators for a single (year, month). Each one
//! re-filters the full collection itself, returns `None` when the month has
//! nothing to report, and carries a `headline()` renderer so the CLI and
//! API share one wording.

use outlay_utils::format_amount;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::models::Expense;
use crate::reports;
use crate::time::MonthKey;

/// On-track / over-budget classification for the budget indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
    OnTrack,
    OverBudget,
}

impl std::fmt::Display for BudgetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BudgetStatus::OnTrack => write!(f, "on track"),
            BudgetStatus::OverBudget => write!(f, "over budget"),
        }
    }
}

/// Direction of a month-over-month spending change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Flat,
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrendDirection::Up => write!(f, "up"),
            TrendDirection::Down => write!(f, "down"),
            TrendDirection::Flat => write!(f, "flat"),
        }
    }
}

/// Spend-vs-budget status for one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetIndicator {
    pub month: MonthKey,
    pub total: Decimal,
    pub budget: Decimal,
    pub percent_of_budget: Decimal,
    pub status: BudgetStatus,
}

impl BudgetIndicator {
    pub fn headline(&self) -> String {
        format!(
            "{}: spent ${} of ${} budget ({}%), {}",
            self.month.label(),
            format_amount(self.total),
            format_amount(self.budget),
            self.percent_of_budget.round_dp(1),
            self.status
        )
    }
}

/// The month's largest spending category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopCategory {
    pub month: MonthKey,
    pub category: String,
    pub amount: Decimal,
    pub percent_of_month: Decimal,
}

impl TopCategory {
    pub fn headline(&self) -> String {
        format!(
            "Top category for {}: {} (${}, {}% of month total)",
            self.month.label(),
            self.category,
            format_amount(self.amount),
            self.percent_of_month
        )
    }
}

/// Spending change relative to the previous calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthOverMonth {
    pub month: MonthKey,
    pub previous_month: MonthKey,
    pub current_total: Decimal,
    pub previous_total: Decimal,
    /// Signed percentage; negative means spending fell
    pub percent_change: Decimal,
    pub direction: TrendDirection,
}

impl MonthOverMonth {
    pub fn headline(&self) -> String {
        match self.direction {
            TrendDirection::Flat => {
                format!("Spending unchanged from {}", self.previous_month.label())
            }
            _ => format!(
                "Spending {} {}% from {}",
                self.direction,
                self.percent_change.abs(),
                self.previous_month.label()
            ),
        }
    }
}

/// Average daily spend over the month's observed span
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurnRate {
    pub month: MonthKey,
    pub average: Decimal,
    pub total: Decimal,
    pub days: i64,
}

impl BurnRate {
    pub fn headline(&self) -> String {
        format!(
            "{}: ${}/day over {} days (total ${})",
            self.month.label(),
            format_amount(self.average),
            self.days,
            format_amount(self.total)
        )
    }
}

/// All four indicators for one month
#[derive(Debug, Clone, Serialize)]
pub struct QuickGlance {
    pub month: MonthKey,
    pub budget: Decimal,
    pub indicator: Option<BudgetIndicator>,
    pub top_category: Option<TopCategory>,
    pub month_change: Option<MonthOverMonth>,
    pub burn_rate: Option<BurnRate>,
}

fn month_total(expenses: &[Expense], key: MonthKey) -> Decimal {
    expenses
        .iter()
        .filter(|e| key.contains(e.occurred_on))
        .map(|e| e.amount)
        .sum()
}

/// Spend-vs-budget indicator for one month.
///
/// The budget must be positive; a missing or non-positive budget is an
/// error here, not a silent zero. A month with no records is `None` so
/// callers can distinguish "spent $0" from "nothing recorded".
pub fn budget_indicator(
    expenses: &[Expense],
    year: i32,
    month: u32,
    budget: Decimal,
) -> CoreResult<Option<BudgetIndicator>> {
    if budget <= Decimal::ZERO {
        return Err(CoreError::InvalidBudget {
            value: budget.to_string(),
        });
    }

    let key = MonthKey::new(year, month);
    if !expenses.iter().any(|e| key.contains(e.occurred_on)) {
        return Ok(None);
    }

    let total = month_total(expenses, key);
    let comparison = reports::compare_to_budget(total, budget);
    let status = if comparison.percent_of_budget <= Decimal::ONE_HUNDRED {
        BudgetStatus::OnTrack
    } else {
        BudgetStatus::OverBudget
    };

    Ok(Some(BudgetIndicator {
        month: key,
        total,
        budget,
        percent_of_budget: comparison.percent_of_budget,
        status,
    }))
}

/// Largest spending category for one month, with its share of the month
/// total. `None` when the month has no records.
pub fn top_category(expenses: &[Expense], year: i32, month: u32) -> Option<TopCategory> {
    let key = MonthKey::new(year, month);
    let breakdown = reports::monthly_summary_by_category(expenses).remove(&key)?;
    let total = breakdown.total();
    let (category, amount) = breakdown.top()?;

    let percent_of_month = if total > Decimal::ZERO {
        (amount / total * Decimal::ONE_HUNDRED).round_dp(1)
    } else {
        Decimal::ZERO
    };

    Some(TopCategory {
        month: key,
        category: category.to_string(),
        amount,
        percent_of_month,
    })
}

/// Spending change from the previous month, wrapping January back to the
/// previous year's December. `None` when the previous month's total is zero,
/// since a percentage change has no baseline.
pub fn month_over_month(expenses: &[Expense], year: i32, month: u32) -> Option<MonthOverMonth> {
    let key = MonthKey::new(year, month);
    let previous_key = key.previous();

    let current = month_total(expenses, key);
    let previous = month_total(expenses, previous_key);
    if previous.is_zero() {
        return None;
    }

    let percent_change = ((current - previous) / previous * Decimal::ONE_HUNDRED).round_dp(1);
    let direction = if percent_change > Decimal::ZERO {
        TrendDirection::Up
    } else if percent_change < Decimal::ZERO {
        TrendDirection::Down
    } else {
        TrendDirection::Flat
    };

    Some(MonthOverMonth {
        month: key,
        previous_month: previous_key,
        current_total: current,
        previous_total: previous,
        percent_change,
        direction,
    })
}

/// Average daily spend for one month over the span between its first and
/// last record. `None` when the month has no records.
pub fn daily_burn_rate(expenses: &[Expense], year: i32, month: u32) -> Option<BurnRate> {
    let key = MonthKey::new(year, month);
    let mut total = Decimal::ZERO;
    let mut span: Option<(chrono::NaiveDate, chrono::NaiveDate)> = None;

    for expense in expenses.iter().filter(|e| key.contains(e.occurred_on)) {
        total += expense.amount;
        span = Some(match span {
            None => (expense.occurred_on, expense.occurred_on),
            Some((first, last)) => (
                first.min(expense.occurred_on),
                last.max(expense.occurred_on),
            ),
        });
    }

    let (first, last) = span?;
    let days = (last - first).num_days() + 1;
    let average = if days > 0 {
        total / Decimal::from(days)
    } else {
        Decimal::ZERO
    };

    Some(BurnRate {
        month: key,
        average,
        total,
        days,
    })
}

/// All four quick-glance metrics for one month. Fails when the budget is
/// not positive, like `budget_indicator`.
pub fn quick_glance(
    expenses: &[Expense],
    year: i32,
    month: u32,
    budget: Decimal,
) -> CoreResult<QuickGlance> {
    Ok(QuickGlance {
        month: MonthKey::new(year, month),
        budget,
        indicator: budget_indicator(expenses, year, month, budget)?,
        top_category: top_category(expenses, year, month),
        month_change: month_over_month(expenses, year, month),
        burn_rate: daily_burn_rate(expenses, year, month),
    })
}

// ==================== Tests ====================
