pub mod browse;
pub mod setup;
pub mod show;
pub mod ui;

use anyhow::{Context, Result};
use chrono::NaiveDate;

/// Validates a user-entered `YYYY-MM-DD` date and returns it normalized.
pub fn parse_date(input: &str) -> Result<String> {
    let input = input.trim();
    let date = NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{input}', expected YYYY-MM-DD"))?;
    Ok(date.format("%Y-%m-%d").to_string())
}
