// src/format.rs
use chrono::{NaiveDate, NaiveDateTime};

use crate::chart::TimeRange;
use crate::currency::display_prefix;

/// en-US currency formatting with two decimals: `1234.5, "USD"` -> `"$1,234.50"`.
pub fn format_currency(value: f64, currency: &str) -> String {
    format_currency_with(value, currency, 2)
}

/// Whole-unit variant used by chart labels.
pub fn format_currency_whole(value: f64, currency: &str) -> String {
    format_currency_with(value, currency, 0)
}

pub fn format_currency_with(value: f64, currency: &str, decimals: usize) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let sign = if value < 0.0 && round_to(value.abs(), decimals) != 0.0 {
        "-"
    } else {
        ""
    };
    format!(
        "{}{}{}",
        sign,
        display_prefix(currency),
        format_number(value.abs(), decimals)
    )
}

/// `+` in front of non-negative amounts, as in profit/loss columns.
pub fn format_signed_currency(value: f64, currency: &str) -> String {
    let sign = if value >= 0.0 { "+" } else { "" };
    format!("{}{}", sign, format_currency(value, currency))
}

pub fn format_signed_percent(value: f64) -> String {
    let sign = if value >= 0.0 { "+" } else { "" };
    format!("{}{:.2}%", sign, value)
}

/// Thousands-separated number with a fixed number of decimals.
pub fn format_number(value: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };
    let grouped = group_thousands(int_part);
    let sign = if value < 0.0 { "-" } else { "" };
    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}

pub fn format_integer(value: u64) -> String {
    group_thousands(&value.to_string())
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn round_to(value: f64, decimals: usize) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// News card timestamp, e.g. `"Mar 1, 02:00 PM"`.
pub fn format_news_time(ts: &NaiveDateTime) -> String {
    ts.format("%b %-d, %I:%M %p").to_string()
}

/// Stock header timestamp, e.g. `"3/1/2024, 9:30:00 AM"`.
pub fn format_last_updated(ts: &NaiveDateTime) -> String {
    ts.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string()
}

/// Axis label for a chart point; granularity follows the selected range.
pub fn format_chart_date(date: &NaiveDate, range: TimeRange) -> String {
    match range {
        TimeRange::OneDay => date
            .and_hms_opt(0, 0, 0)
            .map(|ts| ts.format("%I:%M %p").to_string())
            .unwrap_or_default(),
        TimeRange::OneWeek | TimeRange::OneMonth => date.format("%b %-d").to_string(),
        TimeRange::ThreeMonths | TimeRange::OneYear | TimeRange::FiveYears => {
            date.format("%b %y").to_string()
        }
    }
}
