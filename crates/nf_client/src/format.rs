use chrono::{Local, TimeZone};

use nf_core::Article;

pub const SUMMARY_MAX_CHARS: usize = 100;
pub const ELLIPSIS: &str = "...";
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// `YYYY-MM-DD HH:MM` in local time. Unparseable timestamps are returned as-is.
pub fn format_timestamp(article: &Article) -> String {
    format_timestamp_in(article, &Local)
}

pub fn format_timestamp_in<Tz>(article: &Article, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    match article.published_at() {
        Some(utc) => utc.with_timezone(tz).format(TIME_FORMAT).to_string(),
        None => article.pub_date.clone(),
    }
}

/// Cuts `text` to `max_chars` characters and appends an ellipsis when it was longer.
pub fn truncate_summary(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{}", &text[..cut], ELLIPSIS),
        None => text.to_string(),
    }
}
