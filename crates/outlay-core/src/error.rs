//! Error types for outlay-core
//!
//! Construction failures and invalid-budget conditions are the only hard
//! errors the core produces. Missing data is modeled as `Option`, never as
//! an error.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Amount is negative or not a decimal number
    InvalidAmount,
    /// Date is not a valid YYYY-MM-DD calendar date
    InvalidDate,
    /// Required text field is empty after normalization
    EmptyField,
    /// Budget is missing or non-positive where one is required
    InvalidBudget,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::InvalidAmount => write!(f, "INVALID_AMOUNT"),
            ErrorCode::InvalidDate => write!(f, "INVALID_DATE"),
            ErrorCode::EmptyField => write!(f, "EMPTY_FIELD"),
            ErrorCode::InvalidBudget => write!(f, "INVALID_BUDGET"),
        }
    }
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Suggestions for resolution
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    /// Create a new error detail
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            details: None,
            suggestions: vec![],
        }
    }

    /// Add detail information
    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.details = Some(detail);
        self
    }

    /// Add a suggestion
    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, "\nDetails: {}", details)?;
        }
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        Ok(())
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Informational
    Info,
    /// Warning - user input needs correcting
    Warning,
    /// Error - operation failed
    Error,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "info"),
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
        }
    }
}

/// Main error type for outlay-core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid amount '{value}': {reason}")]
    InvalidAmount { value: String, reason: String },

    #[error("Invalid date '{value}': expected YYYY-MM-DD")]
    InvalidDate { value: String },

    #[error("Required field is empty: {field}")]
    EmptyField { field: &'static str },

    #[error("Invalid budget '{value}': a positive budget is required")]
    InvalidBudget { value: String },
}

impl CoreError {
    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::InvalidAmount { .. } => ErrorCode::InvalidAmount,
            CoreError::InvalidDate { .. } => ErrorCode::InvalidDate,
            CoreError::EmptyField { .. } => ErrorCode::EmptyField,
            CoreError::InvalidBudget { .. } => ErrorCode::InvalidBudget,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::InvalidAmount { .. } => ErrorSeverity::Warning,
            CoreError::InvalidDate { .. } => ErrorSeverity::Warning,
            CoreError::EmptyField { .. } => ErrorSeverity::Warning,
            CoreError::InvalidBudget { .. } => ErrorSeverity::Info,
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.to_string());

        match self {
            CoreError::InvalidAmount { value, .. } => {
                details = details.with_detail(serde_json::json!({ "value": value }));
                details = details.with_suggestion(
                    "Enter a non-negative decimal amount such as 12.50.".to_string(),
                );
            }
            CoreError::InvalidDate { value } => {
                details = details.with_detail(serde_json::json!({ "value": value }));
                details = details.with_suggestion(
                    "Use the YYYY-MM-DD format, e.g. 2025-10-01.".to_string(),
                );
            }
            CoreError::EmptyField { field } => {
                details = details.with_detail(serde_json::json!({ "field": field }));
            }
            CoreError::InvalidBudget { .. } => {
                details = details.with_suggestion(
                    "Set a positive monthly budget before requesting budget metrics.".to_string(),
                );
            }
        }

        details
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::InvalidAmount.to_string(), "INVALID_AMOUNT");
        assert_eq!(ErrorCode::InvalidDate.to_string(), "INVALID_DATE");
        assert_eq!(ErrorCode::EmptyField.to_string(), "EMPTY_FIELD");
        assert_eq!(ErrorCode::InvalidBudget.to_string(), "INVALID_BUDGET");
    }

    #[test]
    fn test_error_severity_display() {
        assert_eq!(ErrorSeverity::Info.to_string(), "info");
        assert_eq!(ErrorSeverity::Warning.to_string(), "warning");
        assert_eq!(ErrorSeverity::Error.to_string(), "error");
    }

    #[test]
    fn test_core_error_code() {
        let error = CoreError::InvalidDate { value: "2025-13-40".to_string() };
        assert_eq!(error.code(), ErrorCode::InvalidDate);

        let error = CoreError::EmptyField { field: "name" };
        assert_eq!(error.code(), ErrorCode::EmptyField);
    }

    #[test]
    fn test_core_error_severity() {
        let error = CoreError::InvalidAmount {
            value: "-5".to_string(),
            reason: "amount must be non-negative".to_string(),
        };
        assert_eq!(error.severity(), ErrorSeverity::Warning);

        let error = CoreError::InvalidBudget { value: "0".to_string() };
        assert_eq!(error.severity(), ErrorSeverity::Info);
    }

    #[test]
    fn test_error_details_invalid_date() {
        let error = CoreError::InvalidDate { value: "10/01/2025".to_string() };
        let details = error.to_details();

        assert_eq!(details.code, ErrorCode::InvalidDate);
        assert!(details.details.is_some());
        assert!(!details.suggestions.is_empty());
        assert!(details.message.contains("10/01/2025"));
    }

    #[test]
    fn test_error_details_builder() {
        let details = ErrorDetails::new(ErrorCode::EmptyField, "Required field is empty".to_string())
            .with_detail(serde_json::json!({"field": "category"}))
            .with_suggestion("Provide a category name".to_string());

        assert_eq!(details.code, ErrorCode::EmptyField);
        assert!(details.details.is_some());
        assert_eq!(details.suggestions.len(), 1);
    }
}
