//! Recency window filter.
//!
//! Best effort, not a guarantee: an article whose date cannot be determined
//! is kept (fail-open), because upstream sources frequently omit timestamps.
//!
//! Date resolution order:
//! 1. `publish_time` when known; a stamp at exactly 00:00:00 UTC is what a
//!    date-only `YYYY-MM-DD` parses to, so it is compared by day like a
//!    date found in text
//! 2. the first valid, non-future date found in title/summary/url, trying
//!    `YYYY年MM月DD日`, `YYYY-MM-DD`, `YYYY/MM/DD`, `MM-DD`, `MM月DD日` in
//!    that order (month-day forms assume the current year)
//! 3. otherwise unknown → keep

use crate::models::Article;
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

struct DatePattern {
    regex: Regex,
    has_year: bool,
}

static DATE_PATTERNS: Lazy<Vec<DatePattern>> = Lazy::new(|| {
    let full = |re: &str| DatePattern {
        regex: Regex::new(re).expect("valid date regex"),
        has_year: true,
    };
    let month_day = |re: &str| DatePattern {
        regex: Regex::new(re).expect("valid date regex"),
        has_year: false,
    };
    vec![
        full(r"(\d{4})年(\d{1,2})月(\d{1,2})日"),
        full(r"(\d{4})-(\d{1,2})-(\d{1,2})"),
        full(r"(\d{4})/(\d{1,2})/(\d{1,2})"),
        // month-day forms must not match inside a full date
        month_day(r"(?:^|[^\d\-/])(\d{1,2})-(\d{1,2})(?:$|[^\d\-])"),
        month_day(r"(?:^|[^\d年])(\d{1,2})月(\d{1,2})日"),
    ]
});

/// First valid, non-future date in `text`, by pattern priority.
pub fn extract_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    for pattern in DATE_PATTERNS.iter() {
        for caps in pattern.regex.captures_iter(text) {
            let nums: Vec<u32> = caps
                .iter()
                .skip(1)
                .flatten()
                .filter_map(|m| m.as_str().parse().ok())
                .collect();
            let date = match (pattern.has_year, nums.as_slice()) {
                (true, [y, m, d]) => NaiveDate::from_ymd_opt(*y as i32, *m, *d),
                (false, [m, d]) => NaiveDate::from_ymd_opt(today.year(), *m, *d),
                _ => None,
            };
            match date {
                Some(date) if date <= today => return Some(date),
                Some(date) => debug!(%date, "Ignoring future date in text"),
                None => {}
            }
        }
    }
    None
}

/// Keep articles published within `window_days` of now.
pub fn restrict(articles: Vec<Article>, window_days: u32) -> Vec<Article> {
    restrict_at(articles, window_days, Utc::now())
}

/// `now` minus `window_days`, clamped to the earliest representable instant.
pub fn cutoff_for(window_days: u32, now: DateTime<Utc>) -> DateTime<Utc> {
    now.checked_sub_signed(Duration::days(i64::from(window_days)))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

fn is_date_only(t: DateTime<Utc>) -> bool {
    t.time() == NaiveTime::MIN
}

pub fn restrict_at(articles: Vec<Article>, window_days: u32, now: DateTime<Utc>) -> Vec<Article> {
    let cutoff = cutoff_for(window_days, now);
    let cutoff_day = cutoff.date_naive();
    let today = now.date_naive();

    articles
        .into_iter()
        .filter(|a| {
            let keep = match a.publish_time {
                Some(t) if is_date_only(t) => t.date_naive() >= cutoff_day,
                Some(t) => t >= cutoff,
                None => match extract_date(&a.date_text(), today) {
                    Some(d) => d >= cutoff_day,
                    None => true,
                },
            };
            if !keep {
                debug!(title = %a.title, "Dropped article outside the time window");
            }
            keep
        })
        .collect()
}
