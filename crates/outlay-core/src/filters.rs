//! Search and filter layer
//!
//! Filtering is advisory: malformed date expressions degrade to "no
//! filter" instead of erroring, and an empty query matches everything.

use chrono::{Datelike, NaiveDate};
use strsim::normalized_levenshtein;

use crate::models::Expense;

/// Default similarity threshold for fuzzy name matching
pub const DEFAULT_FUZZY_THRESHOLD: u8 = 65;

/// Search criteria; empty or absent fields match everything
#[derive(Debug, Clone)]
pub struct SearchQuery {
    /// Case-insensitive name query, fuzzy or substring
    pub name: Option<String>,
    /// Case-insensitive category membership set
    pub categories: Vec<String>,
    /// Date expression: `YYYY-MM-DD`, `YYYY-MM`, or `YYYY`
    pub date: Option<String>,
    /// Minimum similarity score (0-100) for a fuzzy name match
    pub fuzzy_threshold: u8,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            name: None,
            categories: Vec::new(),
            date: None,
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
        }
    }
}

/// Date constraint parsed from a filter expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFilter {
    /// Exact calendar-date match
    Day(NaiveDate),
    /// Year and month match
    Month { year: i32, month: u32 },
    /// Year match
    Year(i32),
    /// Absent or unparsable expression, matches everything
    Any,
}

impl DateFilter {
    /// Parse progressively: full ISO date, then `YYYY-MM`, then `YYYY`.
    /// Anything else matches everything.
    pub fn parse(query: &str) -> Self {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return DateFilter::Any;
        }
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            return DateFilter::Day(date);
        }

        let parts: Vec<&str> = trimmed.split('-').collect();
        match parts.as_slice() {
            [year, month] => match (year.parse::<i32>(), month.parse::<u32>()) {
                (Ok(year), Ok(month)) => DateFilter::Month { year, month },
                _ => DateFilter::Any,
            },
            [year] => match year.parse::<i32>() {
                Ok(year) => DateFilter::Year(year),
                Err(_) => DateFilter::Any,
            },
            _ => DateFilter::Any,
        }
    }

    /// Whether a record date satisfies the constraint
    pub fn matches(&self, date: NaiveDate) -> bool {
        match *self {
            DateFilter::Day(day) => date == day,
            DateFilter::Month { year, month } => date.year() == year && date.month() == month,
            DateFilter::Year(year) => date.year() == year,
            DateFilter::Any => true,
        }
    }
}

/// Similarity between two strings on a 0-100 scale.
///
/// Slides the shorter string over same-length windows of the longer and
/// keeps the best normalized edit distance, so a short query scores against
/// the part of a name it resembles rather than the whole of it.
pub fn similarity_score(a: &str, b: &str) -> u8 {
    let (short, long) = if a.chars().count() <= b.chars().count() {
        (a, b)
    } else {
        (b, a)
    };
    let short_len = short.chars().count();
    if short_len == 0 {
        return 100;
    }

    let long_chars: Vec<char> = long.chars().collect();
    if long_chars.len() == short_len {
        return to_score(normalized_levenshtein(short, long));
    }

    let mut best = 0.0f64;
    for window in long_chars.windows(short_len) {
        let candidate: String = window.iter().collect();
        let score = normalized_levenshtein(short, &candidate);
        if score > best {
            best = score;
        }
        if best >= 1.0 {
            break;
        }
    }
    to_score(best)
}

fn to_score(normalized: f64) -> u8 {
    (normalized * 100.0).round() as u8
}

/// Records matching every supplied predicate, in their original order
pub fn search_filter(expenses: &[Expense], query: &SearchQuery) -> Vec<Expense> {
    let name_query = query
        .name
        .as_deref()
        .unwrap_or("")
        .trim()
        .to_lowercase();
    let categories: Vec<String> = query
        .categories
        .iter()
        .map(|c| c.trim().to_lowercase())
        .filter(|c| !c.is_empty())
        .collect();
    let date_filter = DateFilter::parse(query.date.as_deref().unwrap_or(""));

    expenses
        .iter()
        .filter(|expense| {
            let name_match = name_query.is_empty() || {
                let name = expense.name.to_lowercase();
                name.contains(&name_query)
                    || similarity_score(&name_query, &name) >= query.fuzzy_threshold
            };
            let category_match = categories.is_empty()
                || categories.contains(&expense.category.to_lowercase());
            let date_match = date_filter.matches(expense.occurred_on);

            name_match && category_match && date_match
        })
        .cloned()
        .collect()
}

// ==================== Tests ====================
