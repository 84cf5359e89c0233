//! HTTP JSON API server
//!
//! Routes are organized into modules:
//! - routes::expenses: Expense CRUD and fuzzy search
//! - routes::budget: Monthly budget get/set
//! - routes::reports: Summaries, budget comparison, quick glance
//! - routes::export: CSV export

pub mod error;
pub mod routes;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use log::{error, info};
use outlay_config::Config;
use outlay_store::StoreRef;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

pub use error::ApiError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub store: StoreRef,
    pub config: Config,
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    // Import route handlers
    use routes::budget::{api_budget, api_budget_set};
    use routes::expenses::{
        api_expense_add, api_expense_delete, api_expense_detail, api_expense_update, api_expenses,
        api_expenses_search,
    };
    use routes::export::api_export;
    use routes::reports::{
        api_report_budget, api_report_categories, api_report_daily_average, api_report_quick,
        api_report_summary,
    };

    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/expenses", get(api_expenses))
        .route("/api/expenses", post(api_expense_add))
        .route("/api/expenses/search", get(api_expenses_search))
        .route("/api/expenses/:id", get(api_expense_detail))
        .route("/api/expenses/:id", put(api_expense_update))
        .route("/api/expenses/:id", delete(api_expense_delete))
        .route("/api/budget", get(api_budget))
        .route("/api/budget", put(api_budget_set))
        .route("/api/reports/summary", get(api_report_summary))
        .route("/api/reports/categories", get(api_report_categories))
        .route("/api/reports/daily-average", get(api_report_daily_average))
        .route("/api/reports/budget", get(api_report_budget))
        .route("/api/reports/quick", get(api_report_quick))
        .route("/api/export", post(api_export))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Start the HTTP server
pub async fn start_server(config: Config, store: StoreRef) {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState { store, config };

    let router = create_router(state);

    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("Failed to bind {}: {}", addr, err);
            return;
        }
    };
    info!("Starting outlay server on http://{}", addr);
    info!("Available routes:");
    info!("  - /api/health (Liveness check)");
    info!("  - /api/expenses (CRUD and search)");
    info!("  - /api/budget (Monthly budget)");
    info!("  - /api/reports/* (Summaries and quick glance)");
    info!("  - /api/export (CSV export)");

    match axum::serve(listener, router).await {
        Ok(_) => info!("Server stopped gracefully"),
        Err(err) => error!("Server error: {}", err),
    }
}

// ==================== Tests ====================
