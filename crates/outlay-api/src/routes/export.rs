//! Export API endpoints
//!
//! Endpoints:
//! - api_export: Write all expenses to the CSV export file (JSON)

use crate::error::ApiError;
use crate::AppState;
use axum::extract::Query;
use log::info;
use outlay_store::ExpenseStore;
use std::collections::HashMap;

/// Export expenses to CSV (JSON API)
///
/// By default rows already present in the export file are skipped, so
/// repeated calls only append records added since the last export. Pass
/// `append=false` to rewrite the file from the current records.
pub async fn api_export(
    state: axum::extract::State<AppState>,
    params: Query<HashMap<String, String>>,
) -> Result<String, ApiError> {
    let append = params
        .get("append")
        .and_then(|s| s.parse().ok())
        .unwrap_or(true);
    let outcome = state.store.export_csv(append).await?;
    info!(
        "exported {} new rows to {}",
        outcome.new_rows,
        outcome.path.display()
    );
    Ok(serde_json::to_string(&serde_json::json!({
        "message": "Export successful",
        "file_path": outcome.path.display().to_string(),
        "new_rows": outcome.new_rows,
        "appended": outcome.appended,
    }))
    .unwrap_or_default())
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::State;
    use outlay_core::Expense;
    use outlay_store::{JsonStore, StoreLayout};
    use std::sync::Arc;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_export_writes_file_and_skips_duplicates() {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::open(StoreLayout::new(dir.path())).await.unwrap();
        let expense = Expense::parse("Coffee", "4.50", "2025-10-01", "Food").unwrap();
        store.add_expense(expense).await.unwrap();
        let state = AppState {
            store: Arc::new(store),
            config: serde_yaml::from_str("{}").unwrap(),
        };

        let first = api_export(State(state.clone()), Query(HashMap::new()))
            .await
            .unwrap();
        let first: serde_json::Value = serde_json::from_str(&first).unwrap();
        assert_eq!(first["new_rows"], 1);
        let path = first["file_path"].as_str().unwrap().to_string();
        assert!(std::path::Path::new(&path).exists());

        let second = api_export(State(state), Query(HashMap::new()))
            .await
            .unwrap();
        let second: serde_json::Value = serde_json::from_str(&second).unwrap();
        assert_eq!(second["new_rows"], 0);
        assert_eq!(second["appended"], true);
    }
}
