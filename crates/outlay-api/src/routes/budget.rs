//! Budget API endpoints
//!
//! Endpoints:
//! - api_budget: Current monthly budget (JSON)
//! - api_budget_set: Set the monthly budget (JSON)

use crate::error::ApiError;
use crate::routes::decimal_f64;
use crate::AppState;
use log::info;
use outlay_store::ExpenseStore;
use rust_decimal::Decimal;
use serde::Deserialize;

/// Request body for setting the budget
#[derive(Debug, Deserialize)]
struct BudgetBody {
    #[serde(alias = "budget")]
    monthly_budget: Decimal,
}

/// Get the configured monthly budget (JSON API)
///
/// `monthly_budget` is null until one has been set.
pub async fn api_budget(state: axum::extract::State<AppState>) -> String {
    let budget = state.store.budget().await;
    serde_json::to_string(&serde_json::json!({
        "monthly_budget": budget.map(decimal_f64),
    }))
    .unwrap_or_default()
}

/// Set the monthly budget (JSON API)
pub async fn api_budget_set(
    state: axum::extract::State<AppState>,
    body: String,
) -> Result<String, ApiError> {
    let body: BudgetBody = serde_json::from_str(&body).map_err(|err| ApiError::BadRequest {
        message: format!("invalid budget payload: {}", err),
    })?;

    let saved = state.store.set_budget(body.monthly_budget).await?;
    info!("monthly budget set to {}", saved);
    Ok(serde_json::to_string(&serde_json::json!({
        "monthly_budget": decimal_f64(saved),
    }))
    .unwrap_or_default())
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::State;
    use axum::http::StatusCode;
    use outlay_store::{JsonStore, StoreLayout};
    use std::sync::Arc;
    use tempfile::TempDir;

    async fn test_state(dir: &TempDir) -> AppState {
        let store = JsonStore::open(StoreLayout::new(dir.path())).await.unwrap();
        AppState {
            store: Arc::new(store),
            config: serde_yaml::from_str("{}").unwrap(),
        }
    }

    #[tokio::test]
    async fn test_budget_round_trip() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir).await;

        let unset = api_budget(State(state.clone())).await;
        let unset: serde_json::Value = serde_json::from_str(&unset).unwrap();
        assert!(unset["monthly_budget"].is_null());

        let saved = api_budget_set(State(state.clone()), r#"{"monthly_budget": 500}"#.to_string())
            .await
            .unwrap();
        let saved: serde_json::Value = serde_json::from_str(&saved).unwrap();
        assert_eq!(saved["monthly_budget"], 500.0);

        let read_back = api_budget(State(state)).await;
        let read_back: serde_json::Value = serde_json::from_str(&read_back).unwrap();
        assert_eq!(read_back["monthly_budget"], 500.0);
    }

    #[tokio::test]
    async fn test_budget_rejects_zero() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir).await;
        let err = api_budget_set(State(state), r#"{"budget": 0}"#.to_string())
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
