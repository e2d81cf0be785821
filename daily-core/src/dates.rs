//! Day counters shown in the message.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::{info, warn};

/// Whole days from `start` (`YYYY-MM-DD`) to `now`, floored.
///
/// Returns 0 when `start` is absent or cannot be parsed.
pub fn days_since(start: Option<&str>, now: NaiveDateTime) -> i64 {
    let Some(raw) = start.map(str::trim).filter(|s| !s.is_empty()) else {
        info!("START_DATE not configured, day counter set to 0");
        return 0;
    };

    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        // Start is midnight, so the date difference equals the floored span.
        Ok(start) => (now.date() - start).num_days(),
        Err(err) => {
            warn!(start_date = raw, error = %err, "invalid START_DATE, day counter set to 0");
            0
        }
    }
}

/// Days until the next midnight matching `month_day` (`MM-DD`).
///
/// A birthday whose midnight is already behind `now` rolls to next year, so
/// the result is never negative. Unparsable input yields 0.
pub fn days_until_birthday(month_day: &str, now: NaiveDateTime) -> i64 {
    let raw = month_day.trim();
    let this_year = format!("{}-{}", now.year(), raw);

    let candidate = match NaiveDate::parse_from_str(&this_year, "%Y-%m-%d") {
        Ok(date) => date.and_time(NaiveTime::MIN),
        Err(err) => {
            warn!(birthday = raw, error = %err, "invalid BIRTHDAY, countdown set to 0");
            return 0;
        }
    };

    let next = if candidate < now {
        match candidate.with_year(now.year() + 1) {
            Some(next) => next,
            None => {
                warn!(birthday = raw, year = now.year() + 1, "BIRTHDAY does not exist next year, countdown set to 0");
                return 0;
            }
        }
    } else {
        candidate
    };

    (next - now).num_days()
}
