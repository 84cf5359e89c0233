//! Core expense records and reporting logic
//!
//! Owns the expense model plus the pure aggregation layer built on it:
//! time-bucketed summaries, budget comparison, quick-glance metrics, and
//! search. Everything here works on in-memory slices; persistence and
//! transport live in the sibling crates.

pub mod error;
pub mod filters;
pub mod glance;
pub mod models;
pub mod reports;
pub mod time;

pub use error::{CoreError, CoreResult, ErrorCode, ErrorDetails, ErrorSeverity};
pub use models::Expense;
pub use time::{MonthKey, WeekKey};

// Re-export commonly used report types
pub use filters::{search_filter, SearchQuery, DEFAULT_FUZZY_THRESHOLD};
pub use glance::{
    budget_indicator, daily_burn_rate, month_over_month, quick_glance, top_category,
    BudgetIndicator, BudgetStatus, BurnRate, MonthOverMonth, QuickGlance, TopCategory,
    TrendDirection,
};
pub use reports::{
    annual_summary, average_daily_spending_by_month, compare_to_budget, monthly_budget_comparison,
    monthly_summary, monthly_summary_by_category, weekly_summary, BudgetComparison,
    CategoryBreakdown, DailyAverage, WeekSummary,
};
