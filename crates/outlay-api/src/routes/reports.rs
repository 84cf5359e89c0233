//! Report API endpoints - summaries, budget comparison, quick glance
//!
//! Endpoints:
//! - api_report_summary: Monthly, weekly, and annual totals (JSON)
//! - api_report_categories: Per-month category breakdown (JSON)
//! - api_report_daily_average: Average daily spend per month (JSON)
//! - api_report_budget: Month totals against the budget (JSON)
//! - api_report_quick: Quick-glance metrics for one month (JSON)

use crate::error::ApiError;
use crate::routes::decimal_f64;
use crate::AppState;
use axum::extract::Query;
use outlay_core::{
    annual_summary, average_daily_spending_by_month, monthly_budget_comparison, monthly_summary,
    monthly_summary_by_category, quick_glance, weekly_summary, BudgetIndicator, BurnRate,
    MonthKey, MonthOverMonth, TopCategory,
};
use outlay_store::ExpenseStore;
use serde_json::{json, Map, Value};
use std::collections::HashMap;

/// Monthly, weekly, and annual totals in one payload (JSON API)
///
/// Map keys are `YYYY-MM`, `YYYY-Www`, and `YYYY` strings in chronological
/// order.
pub async fn api_report_summary(state: axum::extract::State<AppState>) -> String {
    let expenses = state.store.list_expenses().await;

    let monthly: Map<String, Value> = monthly_summary(&expenses)
        .into_iter()
        .map(|(key, total)| (key.to_string(), json!(decimal_f64(total))))
        .collect();

    let weekly: Map<String, Value> = weekly_summary(&expenses)
        .into_iter()
        .map(|(key, week)| {
            (
                key.to_string(),
                json!({
                    "total": decimal_f64(week.total),
                    "start": week.start.to_string(),
                    "end": week.end.to_string(),
                }),
            )
        })
        .collect();

    let annual: Map<String, Value> = annual_summary(&expenses)
        .into_iter()
        .map(|(year, total)| (year.to_string(), json!(decimal_f64(total))))
        .collect();

    serde_json::to_string(&json!({
        "monthly_summary": monthly,
        "weekly_summary": weekly,
        "annual_summary": annual,
    }))
    .unwrap_or_default()
}

/// Category totals per month (JSON API)
///
/// With `year` and `month` the payload is filtered to that single bucket.
pub async fn api_report_categories(
    state: axum::extract::State<AppState>,
    params: Query<HashMap<String, String>>,
) -> String {
    let expenses = state.store.list_expenses().await;
    let wanted = month_params(&params).map(|(year, month)| MonthKey::new(year, month));

    let months: Map<String, Value> = monthly_summary_by_category(&expenses)
        .into_iter()
        .filter(|(key, _)| wanted.map_or(true, |target| *key == target))
        .map(|(key, breakdown)| {
            let categories: Map<String, Value> = breakdown
                .by_category
                .iter()
                .map(|(category, total)| (category.clone(), json!(decimal_f64(*total))))
                .collect();
            let top = breakdown.top().map(|(category, amount)| {
                json!({
                    "category": category,
                    "amount": decimal_f64(amount),
                })
            });
            (
                key.to_string(),
                json!({
                    "categories": categories,
                    "top": top,
                    "total": decimal_f64(breakdown.total()),
                }),
            )
        })
        .collect();

    serde_json::to_string(&months).unwrap_or_default()
}

/// Average daily spend per month (JSON API)
///
/// The average divides the month total by days elapsed, not days in the
/// month. With `year` and `month` the payload is filtered to that bucket.
pub async fn api_report_daily_average(
    state: axum::extract::State<AppState>,
    params: Query<HashMap<String, String>>,
) -> String {
    let expenses = state.store.list_expenses().await;
    let wanted = month_params(&params).map(|(year, month)| MonthKey::new(year, month));

    let months: Map<String, Value> = average_daily_spending_by_month(&expenses)
        .into_iter()
        .filter(|(key, _)| wanted.map_or(true, |target| *key == target))
        .map(|(key, daily)| {
            (
                key.to_string(),
                json!({
                    "average": decimal_f64(daily.average),
                    "total": decimal_f64(daily.total),
                    "days": daily.days,
                }),
            )
        })
        .collect();

    serde_json::to_string(&months).unwrap_or_default()
}

/// Every month's spend against the monthly budget (JSON API)
pub async fn api_report_budget(
    state: axum::extract::State<AppState>,
) -> Result<String, ApiError> {
    let expenses = state.store.list_expenses().await;
    let budget = state.store.budget().await.ok_or_else(no_budget)?;

    let months: Map<String, Value> = monthly_budget_comparison(&expenses, budget)
        .into_iter()
        .map(|(key, comparison)| {
            (
                key.to_string(),
                json!({
                    "total": decimal_f64(comparison.total),
                    "budget": decimal_f64(comparison.budget),
                    "diff": decimal_f64(comparison.diff),
                    "percent_of_budget": decimal_f64(comparison.percent_of_budget),
                    "over_budget": comparison.is_over(),
                }),
            )
        })
        .collect();

    Ok(serde_json::to_string(&months).unwrap_or_default())
}

/// Quick-glance metrics for one month (JSON API)
///
/// Requires `year` and `month` plus a configured budget. Metrics that
/// cannot be computed for the month are null.
pub async fn api_report_quick(
    state: axum::extract::State<AppState>,
    params: Query<HashMap<String, String>>,
) -> Result<String, ApiError> {
    let (year, month) = month_params(&params).ok_or_else(|| ApiError::BadRequest {
        message: "year and month query parameters are required".to_string(),
    })?;
    if !(1..=12).contains(&month) {
        return Err(ApiError::BadRequest {
            message: "month must be between 1 and 12".to_string(),
        });
    }

    let budget = state.store.budget().await.ok_or_else(no_budget)?;
    let expenses = state.store.list_expenses().await;
    let glance = quick_glance(&expenses, year, month, budget)?;

    Ok(serde_json::to_string(&json!({
        "year": year,
        "month": month,
        "month_key": MonthKey::new(year, month).to_string(),
        "budget": decimal_f64(budget),
        "indicator": glance.indicator.as_ref().map(indicator_json),
        "top_category": glance.top_category.as_ref().map(top_category_json),
        "month_change": glance.month_change.as_ref().map(month_change_json),
        "burn_rate": glance.burn_rate.as_ref().map(burn_rate_json),
    }))
    .unwrap_or_default())
}

// ==================== Payload helpers ====================

fn month_params(params: &HashMap<String, String>) -> Option<(i32, u32)> {
    let year = params.get("year").and_then(|s| s.parse().ok())?;
    let month = params.get("month").and_then(|s| s.parse().ok())?;
    Some((year, month))
}

fn no_budget() -> ApiError {
    ApiError::BadRequest {
        message: "No budget data found. Please set a monthly budget first.".to_string(),
    }
}

fn indicator_json(indicator: &BudgetIndicator) -> Value {
    json!({
        "total": decimal_f64(indicator.total),
        "budget": decimal_f64(indicator.budget),
        "percent_of_budget": decimal_f64(indicator.percent_of_budget),
        "status": indicator.status,
        "headline": indicator.headline(),
    })
}

fn top_category_json(top: &TopCategory) -> Value {
    json!({
        "category": top.category,
        "amount": decimal_f64(top.amount),
        "percent_of_month": decimal_f64(top.percent_of_month),
        "headline": top.headline(),
    })
}

fn month_change_json(change: &MonthOverMonth) -> Value {
    json!({
        "previous_month": change.previous_month.to_string(),
        "current_total": decimal_f64(change.current_total),
        "previous_total": decimal_f64(change.previous_total),
        "percent_change": decimal_f64(change.percent_change),
        "direction": change.direction,
        "headline": change.headline(),
    })
}

fn burn_rate_json(rate: &BurnRate) -> Value {
    json!({
        "average": decimal_f64(rate.average),
        "total": decimal_f64(rate.total),
        "days": rate.days,
        "headline": rate.headline(),
    })
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Query, State};
    use axum::http::StatusCode;
    use outlay_core::Expense;
    use outlay_store::{JsonStore, StoreLayout};
    use rust_decimal::Decimal;
    use std::sync::Arc;
    use tempfile::TempDir;

    async fn seeded_state(dir: &TempDir) -> AppState {
        let store = JsonStore::open(StoreLayout::new(dir.path())).await.unwrap();
        for (name, amount, date, category) in [
            ("Coffee", "4.50", "2025-10-01", "Food"),
            ("Rent", "900.00", "2025-10-01", "Housing"),
            ("Groceries", "60.00", "2025-10-15", "Food"),
            ("Coffee", "5.00", "2025-09-20", "Food"),
        ] {
            let expense = Expense::parse(name, amount, date, category).unwrap();
            store.add_expense(expense).await.unwrap();
        }
        AppState {
            store: Arc::new(store),
            config: serde_yaml::from_str("{}").unwrap(),
        }
    }

    fn query(pairs: &[(&str, &str)]) -> Query<HashMap<String, String>> {
        Query(
            pairs
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_summary_buckets_by_month_week_and_year() {
        let dir = TempDir::new().unwrap();
        let state = seeded_state(&dir).await;

        let body = api_report_summary(State(state)).await;
        let body: Value = serde_json::from_str(&body).unwrap();

        assert_eq!(body["monthly_summary"]["2025-10"], 964.5);
        assert_eq!(body["monthly_summary"]["2025-09"], 5.0);
        assert_eq!(body["annual_summary"]["2025"], 969.5);

        // 2025-10-01 is a Wednesday in ISO week 40
        let week = &body["weekly_summary"]["2025-W40"];
        assert_eq!(week["total"], 904.5);
        assert_eq!(week["start"], "2025-09-29");
        assert_eq!(week["end"], "2025-10-05");
    }

    #[tokio::test]
    async fn test_categories_filtered_to_one_month() {
        let dir = TempDir::new().unwrap();
        let state = seeded_state(&dir).await;

        let body = api_report_categories(
            State(state),
            query(&[("year", "2025"), ("month", "10")]),
        )
        .await;
        let body: Value = serde_json::from_str(&body).unwrap();

        assert_eq!(body.as_object().unwrap().len(), 1);
        assert_eq!(body["2025-10"]["categories"]["Food"], 64.5);
        assert_eq!(body["2025-10"]["categories"]["Housing"], 900.0);
        assert_eq!(body["2025-10"]["top"]["category"], "Housing");
        assert_eq!(body["2025-10"]["total"], 964.5);
    }

    #[tokio::test]
    async fn test_quick_requires_budget_and_params() {
        let dir = TempDir::new().unwrap();
        let state = seeded_state(&dir).await;

        let missing_params = api_report_quick(State(state.clone()), query(&[]))
            .await
            .unwrap_err();
        assert_eq!(missing_params.status(), StatusCode::BAD_REQUEST);

        let no_budget = api_report_quick(
            State(state.clone()),
            query(&[("year", "2025"), ("month", "10")]),
        )
        .await
        .unwrap_err();
        assert!(no_budget.body().contains("No budget data found"));

        let bad_month = api_report_quick(
            State(state),
            query(&[("year", "2025"), ("month", "13")]),
        )
        .await
        .unwrap_err();
        assert_eq!(bad_month.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_quick_returns_all_metrics() {
        let dir = TempDir::new().unwrap();
        let state = seeded_state(&dir).await;
        state
            .store
            .set_budget(Decimal::new(1000, 0))
            .await
            .unwrap();

        let body = api_report_quick(
            State(state),
            query(&[("year", "2025"), ("month", "10")]),
        )
        .await
        .unwrap();
        let body: Value = serde_json::from_str(&body).unwrap();

        assert_eq!(body["month_key"], "2025-10");
        assert_eq!(body["budget"], 1000.0);
        assert_eq!(body["indicator"]["total"], 964.5);
        assert_eq!(body["indicator"]["status"], "on_track");
        assert_eq!(body["top_category"]["category"], "Housing");
        assert_eq!(body["month_change"]["previous_month"], "2025-09");
        assert_eq!(body["burn_rate"]["days"], 15);
    }

    #[tokio::test]
    async fn test_budget_report_compares_each_month() {
        let dir = TempDir::new().unwrap();
        let state = seeded_state(&dir).await;
        state.store.set_budget(Decimal::new(500, 0)).await.unwrap();

        let body = api_report_budget(State(state)).await.unwrap();
        let body: Value = serde_json::from_str(&body).unwrap();

        assert_eq!(body["2025-10"]["over_budget"], true);
        assert_eq!(body["2025-10"]["diff"], 464.5);
        assert_eq!(body["2025-09"]["over_budget"], false);
        assert_eq!(body["2025-09"]["percent_of_budget"], 1.0);
    }
}
