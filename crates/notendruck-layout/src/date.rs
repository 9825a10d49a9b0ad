// SPDX-License-Identifier: MIT
//
// German long-form date rendering for printables.

use chrono::{Datelike, NaiveDate};
use notendruck_core::error::{NotendruckError, Result};

const MONTH_NAMES: [&str; 12] = [
    "Januar",
    "Februar",
    "März",
    "April",
    "Mai",
    "Juni",
    "Juli",
    "August",
    "September",
    "Oktober",
    "November",
    "Dezember",
];

/// Render an ISO date string as a German long-form date, e.g.
/// `"2025-06-12"` → `"12. Juni 2025"`.
///
/// Only the date component is considered. A trailing time-of-day (as in
/// `"2025-06-12T00:00:00Z"`) is stripped rather than interpreted, so a
/// midnight timestamp can never shift the printed day across a timezone
/// boundary.
pub fn format_localized_date(iso_date: &str) -> Result<String> {
    let date_part = iso_date.split('T').next().unwrap_or(iso_date).trim();

    let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|err| NotendruckError::Date(format!("{date_part}: {err}")))?;

    let month_name = MONTH_NAMES[date.month0() as usize];
    Ok(format!("{}. {} {}", date.day(), month_name, date.year()))
}
