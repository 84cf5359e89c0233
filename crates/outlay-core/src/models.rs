//! Expense record model

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// A single recorded purchase.
///
/// Construction normalizes text fields and validates the amount and date;
/// a value that exists is always well-formed. The aggregation layer treats
/// expenses as read-only and never looks at `id` or `note`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// Opaque identity, assigned at creation
    pub id: String,
    /// Display label, trimmed and title-cased
    pub name: String,
    /// Non-negative amount, two fractional digits
    #[serde(alias = "price")]
    pub amount: Decimal,
    /// Calendar date of the purchase
    #[serde(alias = "expense_date", alias = "date")]
    pub occurred_on: NaiveDate,
    /// Spending category, trimmed and title-cased
    pub category: String,
    /// Optional free-form note, ignored by aggregation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Expense {
    /// Create an expense from typed values, assigning a fresh id
    pub fn new(
        name: &str,
        amount: Decimal,
        occurred_on: NaiveDate,
        category: &str,
    ) -> CoreResult<Self> {
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: normalize_label(name, "name")?,
            amount: validate_amount(amount)?,
            occurred_on,
            category: normalize_label(category, "category")?,
            note: None,
        })
    }

    /// Create an expense from raw text fields, as collected by a prompt or
    /// request
    pub fn parse(name: &str, amount: &str, date: &str, category: &str) -> CoreResult<Self> {
        let amount = parse_amount(amount)?;
        let occurred_on = parse_date(date)?;
        Self::new(name, amount, occurred_on, category)
    }

    /// Attach a note, dropping it when blank
    pub fn with_note(mut self, note: &str) -> Self {
        let trimmed = note.trim();
        self.note = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
        self
    }
}

impl std::fmt::Display for Expense {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} | ${} | {} | {}",
            self.name, self.amount, self.category, self.occurred_on
        )
    }
}

/// Trim, collapse whitespace, and title-case a text label
pub fn title_case(value: &str) -> String {
    value
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalize a label, rejecting blank input
pub fn normalize_label(value: &str, field: &'static str) -> CoreResult<String> {
    let normalized = title_case(value);
    if normalized.is_empty() {
        return Err(CoreError::EmptyField { field });
    }
    Ok(normalized)
}

/// Validate a typed amount: non-negative, rounded and rescaled to cents
pub fn validate_amount(amount: Decimal) -> CoreResult<Decimal> {
    if amount < Decimal::ZERO {
        return Err(CoreError::InvalidAmount {
            value: amount.to_string(),
            reason: "amount must be non-negative".to_string(),
        });
    }
    let mut cents = amount.round_dp(2);
    cents.rescale(2);
    Ok(cents)
}

/// Parse an amount from user text
pub fn parse_amount(value: &str) -> CoreResult<Decimal> {
    let amount = value.trim().parse::<Decimal>().map_err(|_| CoreError::InvalidAmount {
        value: value.to_string(),
        reason: "not a decimal number".to_string(),
    })?;
    validate_amount(amount)
}

/// Parse an ISO `YYYY-MM-DD` date from user text
pub fn parse_date(value: &str) -> CoreResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| CoreError::InvalidDate { value: value.to_string() })
}

// ==================== Tests ====================
