//! Formatting helpers shared by the CLI and API layers

use rust_decimal::Decimal;

/// Format a monetary amount with thousands separators, e.g. `1,204.50`
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    let s = rounded.abs().to_string();
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i.to_string(), f.to_string()),
        None => (s, String::new()),
    };

    let mut grouped = String::new();
    let mut count = 0;
    for c in int_part.chars().rev() {
        if count == 3 {
            grouped.push(',');
            count = 0;
        }
        grouped.push(c);
        count += 1;
    }
    let int_grouped: String = grouped.chars().rev().collect();

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    if frac_part.is_empty() {
        format!("{}{}.00", sign, int_grouped)
    } else if frac_part.len() == 1 {
        format!("{}{}.{}0", sign, int_grouped, frac_part)
    } else {
        format!("{}{}.{}", sign, int_grouped, frac_part)
    }
}

/// English month name for a 1-based month number
pub fn month_name(month: u32) -> Option<&'static str> {
    let name = match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => return None,
    };
    Some(name)
}

/// Human-readable month label, e.g. `October 2025`
pub fn month_label(year: i32, month: u32) -> String {
    match month_name(month) {
        Some(name) => format!("{} {}", name, year),
        None => format!("{}-{:02}", year, month),
    }
}

// ==================== Tests ====================
