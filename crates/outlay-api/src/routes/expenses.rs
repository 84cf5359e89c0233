//! Expense API endpoints - CRUD and search
//!
//! Endpoints:
//! - api_expenses: List expenses, newest first (JSON)
//! - api_expenses_search: Filtered search (JSON)
//! - api_expense_detail: Single expense by id (JSON)
//! - api_expense_add: Create an expense (JSON)
//! - api_expense_update: Partial update (JSON)
//! - api_expense_delete: Delete an expense (JSON)

use crate::error::ApiError;
use crate::routes::expense_json;
use crate::AppState;
use axum::extract::Query;
use axum::http::StatusCode;
use log::{debug, info};
use outlay_core::models;
use outlay_core::{search_filter, Expense, SearchQuery};
use outlay_store::{ExpensePatch, ExpenseStore};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;

/// Request body for creating an expense
#[derive(Debug, Deserialize)]
struct NewExpenseBody {
    name: String,
    #[serde(alias = "price")]
    amount: Decimal,
    #[serde(alias = "expense_date", alias = "occurred_on")]
    date: String,
    category: String,
    #[serde(default)]
    note: Option<String>,
}

/// List all expenses, newest first (JSON API)
///
/// `limit` defaults to the configured page size; `offset` to 0.
pub async fn api_expenses(
    state: axum::extract::State<AppState>,
    params: Query<HashMap<String, String>>,
) -> String {
    let mut expenses = state.store.list_expenses().await;
    expenses.sort_by(|a, b| b.occurred_on.cmp(&a.occurred_on));

    let total_count = expenses.len();
    let offset = params.get("offset").and_then(|s| s.parse().ok()).unwrap_or(0);
    let limit = params
        .get("limit")
        .and_then(|s| s.parse().ok())
        .unwrap_or(state.config.pagination.records_per_page)
        .max(1);
    let rows: Vec<_> = expenses.iter().skip(offset).take(limit).map(expense_json).collect();

    serde_json::to_string(&serde_json::json!({
        "expenses": rows,
        "total_count": total_count,
        "page": offset / limit + 1,
        "page_size": limit,
    }))
    .unwrap_or_default()
}

/// Search expenses by name, category, and date (JSON API)
///
/// Name matching is case-insensitive substring plus fuzzy scoring; the
/// score threshold defaults from config and can be overridden per request
/// with `fuzzy_threshold`.
pub async fn api_expenses_search(
    state: axum::extract::State<AppState>,
    params: Query<HashMap<String, String>>,
) -> String {
    let expenses = state.store.list_expenses().await;
    let fuzzy_threshold = params
        .get("fuzzy_threshold")
        .and_then(|s| s.parse().ok())
        .unwrap_or(state.config.search.fuzzy_threshold);

    let query = SearchQuery {
        name: params.get("name").cloned(),
        categories: params
            .get("category")
            .map(|category| vec![category.clone()])
            .unwrap_or_default(),
        date: params.get("date").cloned(),
        fuzzy_threshold,
    };

    let matches = search_filter(&expenses, &query);
    debug!("search matched {} of {} expenses", matches.len(), expenses.len());
    let rows: Vec<_> = matches.iter().map(expense_json).collect();
    serde_json::to_string(&rows).unwrap_or_default()
}

/// Get single expense detail (JSON API)
pub async fn api_expense_detail(
    state: axum::extract::State<AppState>,
    path: axum::extract::Path<String>,
) -> Result<String, ApiError> {
    let expense = state.store.expense(&path.0).await?;
    Ok(serde_json::to_string(&expense_json(&expense)).unwrap_or_default())
}

/// Create a new expense (JSON API)
pub async fn api_expense_add(
    state: axum::extract::State<AppState>,
    body: String,
) -> Result<(StatusCode, String), ApiError> {
    let body: NewExpenseBody = serde_json::from_str(&body).map_err(|err| ApiError::BadRequest {
        message: format!("invalid expense payload: {}", err),
    })?;

    let occurred_on = models::parse_date(&body.date)?;
    let mut expense = Expense::new(&body.name, body.amount, occurred_on, &body.category)?;
    if let Some(note) = &body.note {
        expense = expense.with_note(note);
    }

    let stored = state.store.add_expense(expense).await?;
    info!("added expense {} ({})", stored.id, stored.name);
    Ok((
        StatusCode::CREATED,
        serde_json::to_string(&expense_json(&stored)).unwrap_or_default(),
    ))
}

/// Update fields on an existing expense (JSON API)
pub async fn api_expense_update(
    state: axum::extract::State<AppState>,
    path: axum::extract::Path<String>,
    body: String,
) -> Result<String, ApiError> {
    let patch: ExpensePatch = serde_json::from_str(&body).map_err(|err| ApiError::BadRequest {
        message: format!("invalid update payload: {}", err),
    })?;
    if patch.is_empty() {
        return Err(ApiError::BadRequest {
            message: "no fields to update".to_string(),
        });
    }

    let updated = state.store.update_expense(&path.0, patch).await?;
    info!("updated expense {}", updated.id);
    Ok(serde_json::to_string(&expense_json(&updated)).unwrap_or_default())
}

/// Delete an expense (JSON API)
pub async fn api_expense_delete(
    state: axum::extract::State<AppState>,
    path: axum::extract::Path<String>,
) -> Result<String, ApiError> {
    let removed = state.store.delete_expense(&path.0).await?;
    info!("deleted expense {} ({})", removed.id, removed.name);
    Ok(serde_json::to_string(&serde_json::json!({
        "message": format!("Expense {} deleted successfully.", removed.id),
    }))
    .unwrap_or_default())
}

// ==================== Tests ====================
