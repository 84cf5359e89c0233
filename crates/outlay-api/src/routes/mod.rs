//! Route modules for the API server
//!
//! All routes are organized into modules:
//! - expenses: Expense CRUD and fuzzy search
//! - budget: Monthly budget get/set
//! - reports: Time-bucketed summaries, budget comparison, quick glance
//! - export: CSV export

pub mod budget;
pub mod expenses;
pub mod export;
pub mod reports;

use outlay_core::Expense;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Decimal to JSON number; amounts are rescaled to cents upstream
pub(crate) fn decimal_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

/// Wire shape for one expense record
pub(crate) fn expense_json(expense: &Expense) -> serde_json::Value {
    serde_json::json!({
        "id": expense.id,
        "name": expense.name,
        "amount": decimal_f64(expense.amount),
        "date": expense.occurred_on.to_string(),
        "category": expense.category,
        "note": expense.note,
    })
}
